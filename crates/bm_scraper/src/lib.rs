pub mod details;
pub mod fetch;
mod heuristics;
pub mod links;
pub mod pagination;
pub mod runner;

pub use details::{extract_details, ArticleDetails};
pub use fetch::{HttpFetcher, PageSource};
pub use links::{extract_links, ArticleLink};
pub use pagination::find_last_page;
pub use runner::ScrapeRunner;

pub mod prelude {
    pub use crate::fetch::PageSource;
    pub use crate::runner::ScrapeRunner;
    pub use bm_core::{Error, Result};
}
