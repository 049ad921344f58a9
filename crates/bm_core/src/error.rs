use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Network failure, timeout, or non-2xx status. Scrape callers treat
    /// this as "no data" and keep going.
    #[error("Fetch failed: {0}")]
    Fetch(String),

    #[error("Scraping error: {0}")]
    Scraping(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Article not found")]
    NotFound,

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Validation(String),
}

pub type Result<T> = std::result::Result<T, Error>;
