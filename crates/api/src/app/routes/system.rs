use axum::{Json, http::StatusCode, response::Response};
use serde_json::json;

use crate::app::errors::{self, NOT_FOUND_MESSAGE};

pub async fn welcome() -> Json<serde_json::Value> {
    Json(json!({
        "message": "Welcome to TaskHub API",
    }))
}

pub async fn health() -> StatusCode {
    StatusCode::OK
}

/// Fallback for every unmatched path, under any prefix.
pub async fn not_found() -> Response {
    errors::json_error(StatusCode::NOT_FOUND, NOT_FOUND_MESSAGE)
}
