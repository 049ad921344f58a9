use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

pub mod error;
pub mod handlers;
pub mod state;

pub use state::AppState;

/// Routes the API onto the store and the scrape runner. CORS is wide open:
/// the intended client is a separately hosted frontend.
pub async fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::permissive();

    Router::new()
        .route(
            "/api/articles",
            get(handlers::list_articles).post(handlers::create_article),
        )
        .route("/api/articles/scrape", post(handlers::scrape_articles))
        .route("/api/articles/stats", get(handlers::get_stats))
        .route(
            "/api/articles/:id",
            get(handlers::get_article)
                .put(handlers::update_article)
                .delete(handlers::delete_article),
        )
        .layer(cors)
        .with_state(Arc::new(state))
}

pub mod prelude {
    pub use crate::AppState;
    pub use bm_core::{Error, Result};
}
