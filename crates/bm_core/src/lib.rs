pub mod config;
pub mod error;
pub mod types;

pub use config::Config;
pub use error::Error;
pub use types::{Article, ArticlePatch, ArticleStats, NewArticle};

pub type Result<T> = std::result::Result<T, Error>;
