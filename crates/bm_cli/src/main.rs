use anyhow::Result;
use bm_core::config::DEFAULT_BLOG_URL;
use bm_core::Config;
use bm_scraper::{HttpFetcher, ScrapeRunner};
use bm_storage::ArticleStore;
use bm_web::{create_app, AppState};
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// SQLite database file
    #[arg(long, default_value = "articles.db")]
    db: PathBuf,

    /// Address to serve the API on
    #[arg(long, default_value = "0.0.0.0:5001")]
    listen: SocketAddr,

    /// Blog index to scrape
    #[arg(long, default_value = DEFAULT_BLOG_URL)]
    blog_url: String,

    /// Serve without running the startup scrape pass
    #[arg(long)]
    skip_scrape: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    let config = Config {
        blog_url: cli.blog_url,
        db_path: cli.db,
        listen: cli.listen,
    };

    let store = ArticleStore::open(&config.db_path).await?;
    info!(db = %config.db_path.display(), "Article store initialized");

    let fetcher = HttpFetcher::new()?;
    let runner = ScrapeRunner::new(Arc::new(fetcher), store.clone(), config.blog_url.clone());

    // one scrape pass at startup; a failure degrades to an empty store, the
    // API still comes up
    if !cli.skip_scrape {
        match runner.scrape_and_store().await {
            Ok(count) => info!(count, "Startup scrape finished"),
            Err(e) => error!(error = %e, "Startup scrape failed"),
        }
    }

    let app = create_app(AppState { store, runner }).await;

    info!(listen = %config.listen, "Serving API");
    let listener = tokio::net::TcpListener::bind(config.listen).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
