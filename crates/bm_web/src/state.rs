use bm_scraper::ScrapeRunner;
use bm_storage::ArticleStore;

pub struct AppState {
    pub store: ArticleStore,
    pub runner: ScrapeRunner,
}
