use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::Value;
use tracing::info;

use crate::collector::collect;
use crate::error::{ApiError, PostsError};
use crate::request::{Payload, ScrapeRequest};
use crate::response::json_response;
use crate::source::Post;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct ScrapeResponse {
    pub count: usize,
    pub posts: Vec<Post>,
}

pub async fn create_posts(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    if !is_json(&headers) {
        return ApiError::new(
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            "Content-Type must be application/json",
        )
        .into_response();
    }

    let body = match body {
        Ok(body) => body,
        Err(rejection) => {
            return ApiError::new(rejection.status(), rejection.body_text()).into_response()
        }
    };

    match scrape(&state, &body).await {
        Ok(posts) => json_response(
            StatusCode::OK,
            &ScrapeResponse {
                count: posts.len(),
                posts,
            },
        ),
        Err(e) => e.into_response(),
    }
}

async fn scrape(state: &AppState, body: &[u8]) -> Result<Vec<Post>, PostsError> {
    let payload = parse_payload(body)?;
    let request = ScrapeRequest::from_payload(&payload)?;

    info!(
        scrape_target = %request.target,
        limit = request.limit,
        "Scraping posts"
    );
    let posts = collect(
        state.source.as_ref(),
        &request.target,
        &request.options,
        request.limit,
    )
    .await?;
    info!(count = posts.len(), "Fetched posts");

    Ok(posts)
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.to_ascii_lowercase().contains("application/json"))
}

/// Decode a request body that must be a JSON object.
pub fn parse_payload(body: &[u8]) -> Result<Payload, ApiError> {
    if body.is_empty() {
        return Err(ApiError::bad_request("Request body is required"));
    }
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| ApiError::bad_request(format!("Invalid JSON payload: {}", json_error_message(&e))))?;
    match value {
        Value::Object(payload) => Ok(payload),
        _ => Err(ApiError::bad_request("JSON payload must be an object")),
    }
}

/// serde_json's message without the trailing "at line N column M".
fn json_error_message(e: &serde_json::Error) -> String {
    let full = e.to_string();
    let position = format!(" at line {} column {}", e.line(), e.column());
    match full.strip_suffix(&position) {
        Some(message) => message.to_string(),
        None => full,
    }
}
