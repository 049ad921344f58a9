use crate::heuristics::{class_matches, id_matches, normalized_text};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use url::Url;

static ARTICLE_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)article|blog|post").unwrap());
static CARD_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)card|item|entry").unwrap());

static ARTICLE_EL: Lazy<Selector> = Lazy::new(|| Selector::parse("article").unwrap());
static DIV: Lazy<Selector> = Lazy::new(|| Selector::parse("div").unwrap());
static DIV_OR_SECTION: Lazy<Selector> = Lazy::new(|| Selector::parse("div, section").unwrap());
static ANCHOR: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").unwrap());
static HEADING: Lazy<Selector> = Lazy::new(|| Selector::parse("h1, h2, h3, h4").unwrap());

/// Paths that mark a hyperlink as article-like when no container matched.
const ARTICLE_PATH_HINTS: [&str; 3] = ["/blog/", "/article/", "/post/"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleLink {
    pub url: String,
    pub title: String,
}

/// Collect article links from one index page, deduplicated by URL with
/// insertion order preserved. Container candidates are scanned in order:
/// `<article>` elements, `<div>`s with an article-like class, `<div>`s with
/// an article-like id, then card/item/entry `<div>`/`<section>`s. Each
/// container contributes its first link; the title comes from the first
/// h1–h4 inside it, else the link's own text.
pub fn extract_links(html: &str, page_url: &str) -> Vec<ArticleLink> {
    let document = Html::parse_document(html);
    let base = match Url::parse(page_url) {
        Ok(base) => base,
        Err(_) => return Vec::new(),
    };

    let mut links: Vec<ArticleLink> = Vec::new();

    let containers = document
        .select(&ARTICLE_EL)
        .chain(
            document
                .select(&DIV)
                .filter(|el| class_matches(el, &ARTICLE_PATTERN)),
        )
        .chain(
            document
                .select(&DIV)
                .filter(|el| id_matches(el, &ARTICLE_PATTERN)),
        )
        .chain(
            document
                .select(&DIV_OR_SECTION)
                .filter(|el| class_matches(el, &CARD_PATTERN)),
        );

    for container in containers {
        if let Some(link) = candidate_from_container(&base, container) {
            push_unique(&mut links, link);
        }
    }

    // no recognizable containers; fall back to every link whose path looks
    // like an article
    if links.is_empty() {
        for anchor in document.select(&ANCHOR) {
            if let Some(link) = candidate_from_anchor(&base, anchor) {
                push_unique(&mut links, link);
            }
        }
    }

    links
}

fn candidate_from_container(base: &Url, container: ElementRef) -> Option<ArticleLink> {
    let anchor = container.select(&ANCHOR).next()?;
    let href = anchor.value().attr("href")?;
    let url = resolve(base, href)?;

    let title = container
        .select(&HEADING)
        .next()
        .map(|heading| normalized_text(&heading))
        .filter(|title| !title.is_empty())
        .unwrap_or_else(|| normalized_text(&anchor));
    if title.is_empty() {
        return None;
    }

    Some(ArticleLink { url, title })
}

fn candidate_from_anchor(base: &Url, anchor: ElementRef) -> Option<ArticleLink> {
    let href = anchor.value().attr("href")?;
    if !ARTICLE_PATH_HINTS.iter().any(|hint| href.contains(hint)) {
        return None;
    }

    let title = normalized_text(&anchor);
    if title.is_empty() {
        return None;
    }

    let url = resolve(base, href)?;
    Some(ArticleLink { url, title })
}

fn resolve(base: &Url, href: &str) -> Option<String> {
    if href.is_empty() {
        return None;
    }
    base.join(href).ok().map(|url| url.to_string())
}

fn push_unique(links: &mut Vec<ArticleLink>, link: ArticleLink) {
    if links.iter().any(|existing| existing.url == link.url) {
        return;
    }
    links.push(link);
}
