use crate::details::extract_details;
use crate::fetch::PageSource;
use crate::links::{extract_links, ArticleLink};
use crate::pagination::{find_last_page, page_url};
use bm_core::{NewArticle, Result};
use bm_storage::ArticleStore;
use std::sync::Arc;
use tracing::{info, warn};

/// How many articles one scrape pass stores at most.
const SCRAPE_LIMIT: usize = 5;

/// One full scrape pass over the blog index. The last index page is scraped
/// first on the assumption that later pages hold the oldest posts; that is
/// documented behavior of the target site, not a general guarantee.
#[derive(Clone)]
pub struct ScrapeRunner {
    source: Arc<dyn PageSource>,
    store: ArticleStore,
    blog_url: String,
}

impl ScrapeRunner {
    pub fn new(source: Arc<dyn PageSource>, store: ArticleStore, blog_url: String) -> Self {
        Self {
            source,
            store,
            blog_url,
        }
    }

    /// Scrape up to five articles from the last index page (falling back to
    /// the index root when it yields nothing) and upsert them. Returns the
    /// number stored; a partial batch is still a success.
    pub async fn scrape_and_store(&self) -> Result<usize> {
        info!(blog_url = %self.blog_url, "Finding last index page");
        let last_page = find_last_page(self.source.as_ref(), &self.blog_url).await;
        info!(last_page, "Pagination walk finished");

        let last_page_url = page_url(&self.blog_url, last_page);
        let mut articles = self.collect_articles(&last_page_url).await;

        if articles.is_empty() {
            info!("Last page yielded no articles, retrying the index root");
            articles = self.collect_articles(&self.blog_url).await;
        }

        let mut stored = 0;
        for article in &articles {
            match self.store.upsert(article).await {
                Ok(()) => stored += 1,
                Err(e) => warn!(url = %article.url, error = %e, "Failed to store article"),
            }
        }

        info!(stored, "Scrape pass finished");
        Ok(stored)
    }

    /// Pull article links off one index page and fetch each linked page for
    /// details. A page that fails to fetch contributes nothing.
    async fn collect_articles(&self, index_url: &str) -> Vec<NewArticle> {
        let html = match self.source.fetch(index_url).await {
            Ok(html) => html,
            Err(e) => {
                warn!(url = %index_url, error = %e, "Failed to fetch index page");
                return Vec::new();
            }
        };

        let links = extract_links(&html, index_url);
        let mut articles = Vec::new();
        for link in links.into_iter().take(SCRAPE_LIMIT) {
            articles.push(self.article_from_link(link).await);
        }
        articles
    }

    /// Merge link-derived data with detail extraction. The extracted title
    /// wins over the link title; a failed detail fetch degrades to the link
    /// data with empty fields.
    async fn article_from_link(&self, link: ArticleLink) -> NewArticle {
        match self.source.fetch(&link.url).await {
            Ok(html) => {
                let details = extract_details(&html);
                NewArticle {
                    title: if details.title.is_empty() {
                        link.title
                    } else {
                        details.title
                    },
                    url: link.url,
                    content: details.content,
                    author: details.author,
                    published_date: details.published_date,
                }
            }
            Err(e) => {
                warn!(url = %link.url, error = %e, "Failed to fetch article page");
                NewArticle {
                    title: link.title,
                    url: link.url,
                    ..Default::default()
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bm_core::Error;
    use std::collections::HashMap;

    const BASE: &str = "https://example.com/blogs/";

    struct MockSite {
        pages: HashMap<String, String>,
    }

    impl MockSite {
        fn new() -> Self {
            Self {
                pages: HashMap::new(),
            }
        }

        fn page(mut self, url: &str, html: &str) -> Self {
            self.pages.insert(url.to_string(), html.to_string());
            self
        }
    }

    #[async_trait]
    impl PageSource for MockSite {
        async fn fetch(&self, url: &str) -> Result<String> {
            self.pages
                .get(url)
                .cloned()
                .ok_or_else(|| Error::Fetch(format!("{} returned 404", url)))
        }
    }

    fn article_page(title: &str, body: &str) -> String {
        format!(
            r#"<html><body>
                <h1>{}</h1>
                <span class="byline">Author</span>
                <time class="published" datetime="2020-05-01">May 2020</time>
                <div class="post-content"><p>{}</p></div>
            </body></html>"#,
            title, body
        )
    }

    fn index_with_articles(count: usize) -> String {
        let mut html = String::from(r#"<nav class="pagination"><a href="?page=2">2</a></nav>"#);
        for i in 1..=count {
            html.push_str(&format!(
                r#"<article><a href="/blogs/post-{i}"><h2>Post {i}</h2></a></article>"#
            ));
        }
        html
    }

    async fn runner_for(site: MockSite) -> (ScrapeRunner, ArticleStore) {
        let store = ArticleStore::open_in_memory().await.unwrap();
        let runner = ScrapeRunner::new(Arc::new(site), store.clone(), BASE.to_string());
        (runner, store)
    }

    #[tokio::test]
    async fn test_empty_last_page_falls_back_to_index_root() {
        // page 2 is the last page but carries no articles; the pass must
        // retry the root and store the five articles found there
        let mut site = MockSite::new()
            .page(BASE, &index_with_articles(5))
            .page(
                "https://example.com/blogs/?page=2",
                r#"<nav class="pagination"><a href="?page=1">1</a><a href="?page=2">2</a></nav>"#,
            );
        for i in 1..=5 {
            site = site.page(
                &format!("https://example.com/blogs/post-{}", i),
                &article_page(&format!("Post {} full title", i), "Body text."),
            );
        }

        let (runner, store) = runner_for(site).await;
        let stored = runner.scrape_and_store().await.unwrap();
        assert_eq!(stored, 5);

        let articles = store.list(None, 0).await.unwrap();
        assert_eq!(articles.len(), 5);
        assert!(articles.iter().all(|a| a.content == "Body text."));
        assert!(articles.iter().all(|a| a.author == "Author"));
        assert!(articles.iter().all(|a| a.published_date == "2020-05-01"));
    }

    #[tokio::test]
    async fn test_extracted_title_wins_over_link_title() {
        let site = MockSite::new()
            .page(
                BASE,
                r#"<article><a href="/blogs/one"><h2>Link title</h2></a></article>"#,
            )
            .page(
                "https://example.com/blogs/one",
                &article_page("Extracted title", "Body."),
            );

        let (runner, store) = runner_for(site).await;
        assert_eq!(runner.scrape_and_store().await.unwrap(), 1);

        let articles = store.list(None, 0).await.unwrap();
        assert_eq!(articles[0].title, "Extracted title");
    }

    #[tokio::test]
    async fn test_failed_detail_fetch_keeps_link_data() {
        // article page 404s; the link-derived title is stored with empty
        // fields instead of dropping the article
        let site = MockSite::new().page(
            BASE,
            r#"<article><a href="/blogs/broken"><h2>Broken link</h2></a></article>"#,
        );

        let (runner, store) = runner_for(site).await;
        assert_eq!(runner.scrape_and_store().await.unwrap(), 1);

        let articles = store.list(None, 0).await.unwrap();
        assert_eq!(articles[0].title, "Broken link");
        assert_eq!(articles[0].content, "");
        assert_eq!(articles[0].author, "");
    }

    #[tokio::test]
    async fn test_limit_of_five_articles_per_pass() {
        let mut site = MockSite::new().page(
            BASE,
            &index_with_articles(8).replace(
                r#"<nav class="pagination"><a href="?page=2">2</a></nav>"#,
                "",
            ),
        );
        for i in 1..=8 {
            site = site.page(
                &format!("https://example.com/blogs/post-{}", i),
                &article_page(&format!("Post {}", i), "Body."),
            );
        }

        let (runner, store) = runner_for(site).await;
        assert_eq!(runner.scrape_and_store().await.unwrap(), 5);
        assert_eq!(store.list(None, 0).await.unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_rescrape_is_idempotent() {
        let site = MockSite::new()
            .page(
                BASE,
                r#"<article><a href="/blogs/one"><h2>One</h2></a></article>"#,
            )
            .page(
                "https://example.com/blogs/one",
                &article_page("One", "Body."),
            );

        let (runner, store) = runner_for(site).await;
        assert_eq!(runner.scrape_and_store().await.unwrap(), 1);
        assert_eq!(runner.scrape_and_store().await.unwrap(), 1);
        assert_eq!(store.list(None, 0).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unreachable_site_stores_nothing() {
        let (runner, store) = runner_for(MockSite::new()).await;
        assert_eq!(runner.scrape_and_store().await.unwrap(), 0);
        assert!(store.list(None, 0).await.unwrap().is_empty());
    }
}
