pub mod apify_source;
pub mod coerce;
pub mod collector;
pub mod config;
pub mod error;
pub mod request;
pub mod response;
pub mod rest;
pub mod source;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::handler::Handler;
use axum::http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
};
use axum::http::HeaderValue;
use axum::routing::{get, post, MethodRouter};
use axum::Router;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::source::PostSource;

/// Per-process router state. Holds no request data.
#[derive(Clone)]
pub struct AppState {
    pub source: Arc<dyn PostSource>,
}

impl AppState {
    pub fn new(source: impl PostSource + 'static) -> Self {
        Self {
            source: Arc::new(source),
        }
    }
}

/// A GET route that answers every other method, HEAD included, with 404.
fn get_only<H, T>(handler: H) -> MethodRouter<AppState>
where
    H: Handler<T, AppState>,
    T: 'static,
{
    get(handler)
        .head(rest::not_found)
        .fallback(rest::not_found)
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get_only(rest::root))
        .route("/health", get_only(rest::health))
        .route("/openapi.json", get_only(rest::docs::openapi))
        .route("/docs", get_only(rest::docs::swagger_ui))
        .route(
            "/posts",
            post(rest::posts::create_posts)
                .options(rest::posts_preflight)
                .fallback(rest::not_found),
        )
        .fallback(rest::not_found)
        // POST bodies are unbounded
        .layer(DefaultBodyLimit::disable())
        .with_state(state)
        // Fixed CORS policy on every response
        .layer(SetResponseHeaderLayer::overriding(
            ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static("GET,POST,OPTIONS"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static("Content-Type"),
        ))
        // Method + path + status + latency only
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    path = %request.uri().path(),
                )
            }),
        )
}
