pub mod docs;
pub mod posts;

use axum::http::StatusCode;
use axum::response::Response;
use serde_json::json;

use crate::response::json_response;

pub const SERVICE_NAME: &str = "Facebook Scraper API";

pub async fn root() -> Response {
    json_response(
        StatusCode::OK,
        &json!({ "message": SERVICE_NAME, "docs": "/docs" }),
    )
}

pub async fn health() -> Response {
    json_response(StatusCode::OK, &json!({ "status": "ok" }))
}

/// Catch-all for unknown paths and for known paths hit with the wrong method.
pub async fn not_found() -> Response {
    json_response(StatusCode::NOT_FOUND, &json!({ "detail": "Not Found" }))
}

/// CORS preflight for `/posts`. Headers come from the router layers.
pub async fn posts_preflight() -> StatusCode {
    StatusCode::NO_CONTENT
}
