use crate::heuristics::{class_matches, id_matches, normalized_text};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

static CONTENT_CLASS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)content|post-content|article-content|entry-content").unwrap());
static BODY_CLASS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)post-body|article-body").unwrap());
static CONTENT_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)content|post-content|article-content").unwrap());
static AUTHOR_CLASS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)author|byline|writer").unwrap());
static DATE_CLASS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)date|published|time").unwrap());

static H1: Lazy<Selector> = Lazy::new(|| Selector::parse("h1").unwrap());
static TITLE: Lazy<Selector> = Lazy::new(|| Selector::parse("title").unwrap());
static DIV: Lazy<Selector> = Lazy::new(|| Selector::parse("div").unwrap());
static PARAGRAPH: Lazy<Selector> = Lazy::new(|| Selector::parse("p").unwrap());
static MAIN: Lazy<Selector> = Lazy::new(|| Selector::parse("main").unwrap());
static ARTICLE: Lazy<Selector> = Lazy::new(|| Selector::parse("article").unwrap());
static AUTHOR_EL: Lazy<Selector> = Lazy::new(|| Selector::parse("span, div, a").unwrap());
static AUTHOR_PROP: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(r#"span[itemprop="author"], div[itemprop="author"], a[itemprop="author"]"#)
        .unwrap()
});
static DATE_EL: Lazy<Selector> = Lazy::new(|| Selector::parse("time, span, div").unwrap());
static DATE_PROP: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(
        r#"time[itemprop="datePublished"], span[itemprop="datePublished"], div[itemprop="datePublished"]"#,
    )
    .unwrap()
});
static DATETIME_EL: Lazy<Selector> =
    Lazy::new(|| Selector::parse("time[datetime], span[datetime], div[datetime]").unwrap());

/// Heuristically extracted article fields. Every field defaults to an empty
/// string when its heuristics miss; a miss is degraded data, never an error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArticleDetails {
    pub title: String,
    pub content: String,
    pub author: String,
    pub published_date: String,
}

pub fn extract_details(html: &str) -> ArticleDetails {
    let document = Html::parse_document(html);
    ArticleDetails {
        title: extract_title(&document),
        content: extract_content(&document),
        author: extract_author(&document),
        published_date: extract_date(&document),
    }
}

fn extract_title(document: &Html) -> String {
    document
        .select(&H1)
        .next()
        .or_else(|| document.select(&TITLE).next())
        .map(|el| normalized_text(&el))
        .unwrap_or_default()
}

/// Ordered container strategies; the first one whose paragraphs join to
/// non-empty text wins.
fn extract_content(document: &Html) -> String {
    let candidates = [
        document
            .select(&DIV)
            .find(|el| class_matches(el, &CONTENT_CLASS)),
        document
            .select(&DIV)
            .find(|el| class_matches(el, &BODY_CLASS)),
        document
            .select(&DIV)
            .find(|el| id_matches(el, &CONTENT_ID)),
    ];

    for container in candidates.into_iter().flatten() {
        let content = join_paragraphs(&container);
        if !content.is_empty() {
            return content;
        }
    }

    document
        .select(&MAIN)
        .next()
        .or_else(|| document.select(&ARTICLE).next())
        .map(|container| join_paragraphs(&container))
        .unwrap_or_default()
}

fn extract_author(document: &Html) -> String {
    document
        .select(&AUTHOR_EL)
        .find(|el| class_matches(el, &AUTHOR_CLASS))
        .or_else(|| document.select(&AUTHOR_PROP).next())
        .map(|el| normalized_text(&el))
        .unwrap_or_default()
}

/// The machine-readable `datetime` attribute wins over element text when
/// both exist.
fn extract_date(document: &Html) -> String {
    let candidates = [
        document
            .select(&DATE_EL)
            .find(|el| class_matches(el, &DATE_CLASS)),
        document.select(&DATE_PROP).next(),
        document.select(&DATETIME_EL).next(),
    ];

    for el in candidates.into_iter().flatten() {
        let value = el
            .value()
            .attr("datetime")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| normalized_text(&el));
        if !value.is_empty() {
            return value;
        }
    }
    String::new()
}

fn join_paragraphs(container: &ElementRef) -> String {
    container
        .select(&PARAGRAPH)
        .map(|p| normalized_text(&p))
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
