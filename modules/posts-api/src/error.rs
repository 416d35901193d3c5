use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::response::json_response;

/// Detail returned for every failure that is not the caller's fault.
pub const UPSTREAM_FAILURE_DETAIL: &str = "Failed to fetch posts";

/// A client-facing failure with a safe, specific message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{detail}")]
pub struct ApiError {
    pub status: StatusCode,
    pub detail: String,
}

impl ApiError {
    pub fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: detail.into(),
        }
    }

    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, detail)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        json_response(self.status, &json!({ "detail": self.detail }))
    }
}

/// Failures reported by a post source.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScrapeError {
    /// The supplied session credentials were rejected. The message is shown to the caller.
    #[error("{0}")]
    InvalidCredentials(String),

    #[error("Upstream error: {0}")]
    Upstream(String),
}

/// Everything that can end a `POST /posts` call early.
#[derive(Debug, Error)]
pub enum PostsError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Scrape(#[from] ScrapeError),
}

impl PostsError {
    /// Status code and caller-visible detail for this failure.
    pub fn classify(&self) -> (StatusCode, String) {
        match self {
            PostsError::Api(e) => (e.status, e.detail.clone()),
            PostsError::Scrape(ScrapeError::InvalidCredentials(message)) => {
                (StatusCode::UNAUTHORIZED, message.clone())
            }
            PostsError::Scrape(ScrapeError::Upstream(_)) => {
                (StatusCode::BAD_GATEWAY, UPSTREAM_FAILURE_DETAIL.to_string())
            }
        }
    }
}

impl IntoResponse for PostsError {
    fn into_response(self) -> Response {
        if let PostsError::Scrape(ScrapeError::Upstream(cause)) = &self {
            error!(error = %cause, "Unhandled error while scraping posts");
        }
        let (status, detail) = self.classify();
        json_response(status, &json!({ "detail": detail }))
    }
}
