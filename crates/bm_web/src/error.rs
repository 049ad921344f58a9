use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use bm_core::Error;
use serde_json::json;

/// Core errors rendered as `{success: false, error}` envelopes. Store and
/// scrape failures surface as structured JSON, never as raw traces.
pub struct ApiError(Error);

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            Error::NotFound => StatusCode::NOT_FOUND,
            Error::Conflict(_) | Error::Validation(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "success": false,
            "error": self.0.to_string(),
        }));
        (status, body).into_response()
    }
}
