use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use bm_core::{ArticlePatch, Error, NewArticle};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::error::ApiError;
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

pub async fn list_articles(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, ApiError> {
    let articles = state
        .store
        .list(params.limit, params.offset.unwrap_or(0))
        .await?;

    Ok(Json(json!({
        "success": true,
        "count": articles.len(),
        "articles": articles,
    })))
}

pub async fn get_article(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let article = state.store.get(id).await?;
    Ok(Json(json!({
        "success": true,
        "article": article,
    })))
}

pub async fn create_article(
    State(state): State<Arc<AppState>>,
    body: Option<Json<NewArticle>>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(article) = body.ok_or_else(|| validation("No data provided"))?;
    if article.title.trim().is_empty() || article.url.trim().is_empty() {
        return Err(validation("Title and URL are required"));
    }

    let article_id = state.store.create(&article).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Article created successfully",
            "article_id": article_id,
        })),
    ))
}

pub async fn update_article(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    body: Option<Json<ArticlePatch>>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(patch) = body.ok_or_else(|| validation("No data provided"))?;
    state.store.update(id, &patch).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Article updated successfully",
    })))
}

pub async fn delete_article(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    state.store.delete(id).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Article deleted successfully",
    })))
}

pub async fn scrape_articles(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let count = state.runner.scrape_and_store().await?;
    Ok(Json(json!({
        "success": true,
        "message": format!("Successfully scraped and stored {} articles", count),
        "count": count,
    })))
}

pub async fn get_stats(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let stats = state.store.stats().await?;
    Ok(Json(json!({
        "success": true,
        "stats": stats,
    })))
}

fn validation(message: &str) -> ApiError {
    Error::Validation(message.to_string()).into()
}
