use crate::fetch::PageSource;
use crate::heuristics::class_matches;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

/// Hard safety cap: never probe past this page number.
const MAX_PAGES: u32 = 100;

static PAGE_PARAM: Lazy<Regex> = Lazy::new(|| Regex::new(r"page=(\d+)").unwrap());
static PAGINATION_CLASS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)pagination|page").unwrap());
static ARTICLE_CLASS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)article|blog|post").unwrap());

static ANCHOR: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").unwrap());
static PAGINATION_CONTAINERS: Lazy<Selector> = Lazy::new(|| Selector::parse("div, nav, ul").unwrap());
static ARTICLE_EL: Lazy<Selector> = Lazy::new(|| Selector::parse("article").unwrap());
static DIV: Lazy<Selector> = Lazy::new(|| Selector::parse("div").unwrap());

/// Index page URL for a given page number. Page 1 is the bare base URL.
pub fn page_url(base_url: &str, page: u32) -> String {
    if page > 1 {
        format!("{}?page={}", base_url, page)
    } else {
        base_url.to_string()
    }
}

/// Walk the index from page 1, following the highest page number the markup
/// advertises until it stops growing. Pagination markup is unknown, so page
/// numbers are read from every link on the page and again from links inside
/// pagination-looking containers. Any fetch failure ends the walk with the
/// best page found so far (minimum 1).
pub async fn find_last_page(source: &dyn PageSource, base_url: &str) -> u32 {
    let mut page = 1;
    let mut last_page = 1;

    loop {
        if page > MAX_PAGES {
            break;
        }

        let url = page_url(base_url, page);
        let html = match source.fetch(&url).await {
            Ok(html) => html,
            Err(_) => break,
        };
        let document = Html::parse_document(&html);

        let mut page_numbers: Vec<u32> = Vec::new();
        for link in document.select(&ANCHOR) {
            if let Some(n) = link_page_number(link) {
                page_numbers.push(n);
            }
        }
        for container in document.select(&PAGINATION_CONTAINERS) {
            if !class_matches(&container, &PAGINATION_CLASS) {
                continue;
            }
            for link in container.select(&ANCHOR) {
                if let Some(n) = link_page_number(link) {
                    page_numbers.push(n);
                }
            }
        }

        match page_numbers.iter().max() {
            Some(&max) if max > last_page => {
                // a higher page is advertised; jump there and look again
                last_page = max;
                page = max;
            }
            Some(_) => break,
            None => {
                // no pagination signals at all; an index page without
                // article-like containers means the walk ran off the end
                if !has_article_containers(&document) {
                    break;
                }
                page += 1;
            }
        }
    }

    last_page.max(1)
}

/// Page number carried by a single link: a `page=N` href parameter, or link
/// text that is purely digits.
fn link_page_number(link: ElementRef) -> Option<u32> {
    let href = link.value().attr("href").unwrap_or_default();
    if let Some(caps) = PAGE_PARAM.captures(href) {
        return caps[1].parse().ok();
    }

    let text = link.text().collect::<String>();
    let text = text.trim();
    if !text.is_empty() && text.chars().all(|c| c.is_ascii_digit()) {
        return text.parse().ok();
    }
    None
}

fn has_article_containers(document: &Html) -> bool {
    document.select(&ARTICLE_EL).next().is_some()
        || document
            .select(&DIV)
            .any(|el| class_matches(&el, &ARTICLE_CLASS))
}
