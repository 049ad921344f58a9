use serde::{Deserialize, Serialize};

/// A stored article row. `id` and `scraped_at` are store-assigned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    pub id: i64,
    pub title: String,
    pub url: String,
    pub content: String,
    pub author: String,
    pub published_date: String,
    pub scraped_at: String,
}

/// An article as produced by the scraper or a create request, before the
/// store assigns an id. `url` is the dedup key across scrape runs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NewArticle {
    pub title: String,
    pub url: String,
    pub content: String,
    pub author: String,
    pub published_date: String,
}

/// Partial update payload. Only supplied fields are written.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ArticlePatch {
    pub title: Option<String>,
    pub url: Option<String>,
    pub content: Option<String>,
    pub author: Option<String>,
    pub published_date: Option<String>,
}

impl ArticlePatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.url.is_none()
            && self.content.is_none()
            && self.author.is_none()
            && self.published_date.is_none()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleStats {
    pub total_articles: i64,
    pub articles_with_content: i64,
    pub articles_without_content: i64,
}
