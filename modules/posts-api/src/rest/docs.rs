use axum::http::StatusCode;
use axum::response::{Html, Response};
use serde_json::{json, Value};

use crate::request::{DEFAULT_LIMIT, MAX_LIMIT};
use crate::response::json_response;

use super::SERVICE_NAME;

const SWAGGER_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8" />
    <title>Facebook Scraper API</title>
    <link rel="stylesheet" href="https://cdn.jsdelivr.net/npm/swagger-ui-dist@5/swagger-ui.css" />
    <style>body { margin: 0; background: #f7f7f7; }</style>
</head>
<body>
<div id="swagger-ui"></div>
<script src="https://cdn.jsdelivr.net/npm/swagger-ui-dist@5/swagger-ui-bundle.js"></script>
<script>
window.onload = () => {
  SwaggerUIBundle({ url: '/openapi.json', dom_id: '#swagger-ui' });
};
</script>
</body>
</html>
"#;

pub async fn openapi() -> Response {
    json_response(StatusCode::OK, &openapi_document())
}

pub async fn swagger_ui() -> Html<&'static str> {
    Html(SWAGGER_HTML)
}

fn json_content(schema: Value) -> Value {
    json!({ "application/json": { "schema": schema } })
}

/// OpenAPI 3.0 description of the HTTP surface.
pub fn openapi_document() -> Value {
    let detail_error = |description: &str| {
        json!({
            "description": description,
            "content": json_content(json!({ "$ref": "#/components/schemas/ErrorResponse" })),
        })
    };

    json!({
        "openapi": "3.0.3",
        "info": {
            "title": SERVICE_NAME,
            "version": env!("CARGO_PKG_VERSION"),
            "description": "Scrape public Facebook posts over HTTP and return them as JSON.",
        },
        "paths": {
            "/health": {
                "get": {
                    "summary": "Health check",
                    "responses": {
                        "200": {
                            "description": "API is ready",
                            "content": json_content(json!({
                                "type": "object",
                                "properties": { "status": { "type": "string" } },
                                "required": ["status"],
                            })),
                        }
                    },
                }
            },
            "/posts": {
                "post": {
                    "summary": "Scrape posts from Facebook",
                    "requestBody": {
                        "required": true,
                        "content": json_content(json!({ "$ref": "#/components/schemas/ScrapePostsRequest" })),
                    },
                    "responses": {
                        "200": {
                            "description": "Scraped posts",
                            "content": json_content(json!({ "$ref": "#/components/schemas/ScrapePostsResponse" })),
                        },
                        "400": detail_error("Invalid payload"),
                        "401": detail_error("Invalid cookies"),
                        "415": detail_error("Body is not JSON"),
                        "502": detail_error("Scraping failed upstream"),
                    },
                }
            },
        },
        "components": {
            "schemas": {
                "ScrapePostsRequest": scrape_request_schema(),
                "ScrapePostsResponse": {
                    "type": "object",
                    "properties": {
                        "count": { "type": "integer" },
                        "posts": { "type": "array", "items": { "type": "object" } },
                    },
                    "required": ["count", "posts"],
                },
                "ErrorResponse": {
                    "type": "object",
                    "properties": { "detail": { "type": "string" } },
                    "required": ["detail"],
                },
            }
        },
    })
}

fn scrape_request_schema() -> Value {
    json!({
        "type": "object",
        "description": "Exactly one of account, group, post_urls, or hashtag must be provided.",
        "properties": {
            "account": { "type": "string", "description": "Page or profile" },
            "group": { "type": "string", "description": "Group ID" },
            "post_urls": {
                "type": "array",
                "items": { "type": "string" },
                "description": "Explicit list of post URLs",
            },
            "hashtag": { "type": "string", "description": "Hashtag to search" },
            "pages": {
                "type": "integer",
                "minimum": 1,
                "description": "How many paginator pages to visit",
            },
            "page_limit": {
                "type": "integer",
                "minimum": 1,
                "description": "Legacy alias for pages",
            },
            "timeout": {
                "type": "integer",
                "minimum": 1,
                "description": "Request timeout in seconds",
            },
            "options": {
                "type": "object",
                "description": "Options passed through to the scraper",
            },
            "cookies": {
                "description": "Cookie mapping or path to a cookies file",
                "oneOf": [
                    { "type": "string" },
                    { "type": "object", "additionalProperties": { "type": "string" } },
                ],
            },
            "extra_info": { "type": "boolean" },
            "youtube_dl": { "type": "boolean" },
            "limit": {
                "type": "integer",
                "minimum": 1,
                "maximum": MAX_LIMIT,
                "default": DEFAULT_LIMIT,
                "description": "Maximum number of posts to return",
            },
        },
    })
}
