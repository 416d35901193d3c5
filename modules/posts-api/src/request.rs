use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::coerce::{coerce_int, is_truthy};
use crate::error::ApiError;

pub const DEFAULT_LIMIT: i64 = 10;
pub const MAX_LIMIT: i64 = 100;

/// A decoded `POST /posts` body.
pub type Payload = Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    Account,
    Group,
    PostUrls,
    Hashtag,
}

impl TargetKind {
    /// Scan order used when resolving a target.
    pub const ALL: [TargetKind; 4] = [
        TargetKind::Account,
        TargetKind::Group,
        TargetKind::PostUrls,
        TargetKind::Hashtag,
    ];

    pub fn field_name(self) -> &'static str {
        match self {
            TargetKind::Account => "account",
            TargetKind::Group => "group",
            TargetKind::PostUrls => "post_urls",
            TargetKind::Hashtag => "hashtag",
        }
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field_name())
    }
}

/// What to scrape: exactly one selector and its raw value.
#[derive(Debug, Clone, PartialEq)]
pub struct Target {
    pub kind: TargetKind,
    pub value: Value,
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.kind, self.value)
    }
}

/// Where session cookies come from.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cookies {
    /// Path to a cookie file on the server.
    Path(String),
    /// Cookie name to value.
    Jar(Map<String, Value>),
}

/// Optional knobs forwarded to the post source. Unset fields are omitted when serialized.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScrapeOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pages: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_limit: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cookies: Option<Cookies>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra_info: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub youtube_dl: Option<bool>,
}

/// A fully validated scrape request.
#[derive(Debug, Clone, PartialEq)]
pub struct ScrapeRequest {
    pub target: Target,
    pub options: ScrapeOptions,
    pub limit: usize,
}

impl ScrapeRequest {
    /// Validate in order: target, options, limit. The first failure wins.
    pub fn from_payload(payload: &Payload) -> Result<Self, ApiError> {
        let target = resolve_target(payload)?;
        let options = extract_options(payload)?;
        let limit = extract_limit(payload)?;
        Ok(Self {
            target,
            options,
            limit,
        })
    }
}

// Empty strings and lists count as absent for targets only.
fn counts_as_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        _ => true,
    }
}

pub fn resolve_target(payload: &Payload) -> Result<Target, ApiError> {
    let mut candidates = TargetKind::ALL.into_iter().filter_map(|kind| {
        payload
            .get(kind.field_name())
            .filter(|v| counts_as_present(v))
            .map(|value| Target {
                kind,
                value: value.clone(),
            })
    });

    let target = match (candidates.next(), candidates.next()) {
        (Some(target), None) => target,
        _ => {
            return Err(ApiError::bad_request(
                "Exactly one of account, group, post_urls, or hashtag is required",
            ))
        }
    };

    if target.kind == TargetKind::PostUrls
        && !matches!(&target.value, Value::Array(urls) if !urls.is_empty())
    {
        return Err(ApiError::bad_request(
            "post_urls must be a non-empty list of URLs",
        ));
    }
    Ok(target)
}

pub fn extract_options(payload: &Payload) -> Result<ScrapeOptions, ApiError> {
    let int_option = |key: &str| {
        payload
            .get(key)
            .map(|value| coerce_int(value, key, 1, None))
            .transpose()
    };

    let options = match payload.get("options") {
        None | Some(Value::Null) => None,
        Some(Value::Object(map)) => Some(map.clone()),
        Some(_) => return Err(ApiError::bad_request("options must be an object")),
    };

    let cookies = match payload.get("cookies") {
        None | Some(Value::Null) => None,
        Some(Value::String(path)) => Some(Cookies::Path(path.clone())),
        Some(Value::Object(jar)) => Some(Cookies::Jar(jar.clone())),
        Some(_) => {
            return Err(ApiError::bad_request(
                "cookies must be a string path or name/value mapping",
            ))
        }
    };

    Ok(ScrapeOptions {
        pages: int_option("pages")?,
        page_limit: int_option("page_limit")?,
        timeout: int_option("timeout")?,
        options,
        cookies,
        extra_info: payload.get("extra_info").map(is_truthy),
        youtube_dl: payload.get("youtube_dl").map(is_truthy),
    })
}

pub fn extract_limit(payload: &Payload) -> Result<usize, ApiError> {
    let limit = match payload.get("limit") {
        Some(value) => coerce_int(value, "limit", 1, Some(MAX_LIMIT))?,
        None => DEFAULT_LIMIT,
    };
    // Bounded to [1, MAX_LIMIT] above.
    Ok(limit as usize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(value: Value) -> Payload {
        match value {
            Value::Object(map) => map,
            other => panic!("test payload must be an object, got {other}"),
        }
    }

    const EXACTLY_ONE: &str = "Exactly one of account, group, post_urls, or hashtag is required";

    #[test]
    fn resolves_each_target_kind() {
        let cases = [
            (json!({"account": "nintendo"}), TargetKind::Account),
            (json!({"group": 1234567890}), TargetKind::Group),
            (json!({"post_urls": ["https://facebook.com/1"]}), TargetKind::PostUrls),
            (json!({"hashtag": "rust"}), TargetKind::Hashtag),
        ];
        for (body, kind) in cases {
            let target = resolve_target(&payload(body)).unwrap();
            assert_eq!(target.kind, kind);
        }
    }

    #[test]
    fn empty_values_do_not_count_as_targets() {
        let target = resolve_target(&payload(json!({
            "account": "",
            "group": null,
            "post_urls": [],
            "hashtag": "rust",
        })))
        .unwrap();
        assert_eq!(target.kind, TargetKind::Hashtag);
        assert_eq!(target.value, json!("rust"));
    }

    #[test]
    fn missing_target_is_rejected() {
        let err = resolve_target(&payload(json!({"limit": 5}))).unwrap_err();
        assert_eq!(err.detail, EXACTLY_ONE);
    }

    #[test]
    fn ambiguous_target_is_rejected() {
        let err = resolve_target(&payload(json!({"account": "a", "group": "b"}))).unwrap_err();
        assert_eq!(err.detail, EXACTLY_ONE);
        assert_eq!(err.status, axum::http::StatusCode::BAD_REQUEST);
    }

    #[test]
    fn post_urls_must_be_a_list() {
        let err = resolve_target(&payload(json!({"post_urls": "x"}))).unwrap_err();
        assert_eq!(err.detail, "post_urls must be a non-empty list of URLs");

        let err = resolve_target(&payload(json!({"post_urls": {"a": 1}}))).unwrap_err();
        assert_eq!(err.detail, "post_urls must be a non-empty list of URLs");
    }

    #[test]
    fn absent_options_are_omitted() {
        let options = extract_options(&payload(json!({"account": "a"}))).unwrap();
        assert_eq!(options, ScrapeOptions::default());
        assert_eq!(serde_json::to_value(&options).unwrap(), json!({}));
    }

    #[test]
    fn present_options_are_normalized() {
        let options = extract_options(&payload(json!({
            "pages": "3",
            "page_limit": 4,
            "timeout": 30,
            "options": {"comments": true},
            "cookies": {"c_user": "1", "xs": "abc"},
            "extra_info": 1,
            "youtube_dl": "",
        })))
        .unwrap();

        assert_eq!(
            serde_json::to_value(&options).unwrap(),
            json!({
                "pages": 3,
                "page_limit": 4,
                "timeout": 30,
                "options": {"comments": true},
                "cookies": {"c_user": "1", "xs": "abc"},
                "extra_info": true,
                "youtube_dl": false,
            })
        );
    }

    #[test]
    fn integer_options_validate_minimum() {
        let err = extract_options(&payload(json!({"pages": 0}))).unwrap_err();
        assert_eq!(err.detail, "pages must be >= 1");

        let err = extract_options(&payload(json!({"timeout": null}))).unwrap_err();
        assert_eq!(err.detail, "timeout must be an integer");
    }

    #[test]
    fn options_must_be_an_object() {
        let err = extract_options(&payload(json!({"options": ["a"]}))).unwrap_err();
        assert_eq!(err.detail, "options must be an object");

        let options = extract_options(&payload(json!({"options": null}))).unwrap();
        assert!(options.options.is_none());
    }

    #[test]
    fn cookies_accept_path_or_mapping_only() {
        let options = extract_options(&payload(json!({"cookies": "/srv/cookies.json"}))).unwrap();
        assert_eq!(options.cookies, Some(Cookies::Path("/srv/cookies.json".into())));

        let err = extract_options(&payload(json!({"cookies": 42}))).unwrap_err();
        assert_eq!(
            err.detail,
            "cookies must be a string path or name/value mapping"
        );
    }

    #[test]
    fn empty_options_and_cookies_are_kept() {
        let options = extract_options(&payload(json!({"options": {}, "cookies": ""}))).unwrap();
        assert_eq!(options.options, Some(Map::new()));
        assert_eq!(options.cookies, Some(Cookies::Path(String::new())));
    }

    #[test]
    fn limit_defaults_and_bounds() {
        assert_eq!(extract_limit(&payload(json!({}))).unwrap(), 10);
        assert_eq!(extract_limit(&payload(json!({"limit": 100}))).unwrap(), 100);
        assert_eq!(
            extract_limit(&payload(json!({"limit": 101}))).unwrap_err().detail,
            "limit must be <= 100"
        );
        assert_eq!(
            extract_limit(&payload(json!({"limit": null}))).unwrap_err().detail,
            "limit must be an integer"
        );
    }

    #[test]
    fn target_is_validated_before_limit() {
        let err = ScrapeRequest::from_payload(&payload(json!({"limit": 0}))).unwrap_err();
        assert_eq!(err.detail, EXACTLY_ONE);
    }

    #[test]
    fn options_are_validated_before_limit() {
        let err = ScrapeRequest::from_payload(&payload(json!({
            "account": "a",
            "options": 1,
            "limit": 0,
        })))
        .unwrap_err();
        assert_eq!(err.detail, "options must be an object");
    }

    #[test]
    fn builds_a_complete_request() {
        let request = ScrapeRequest::from_payload(&payload(json!({
            "account": "nintendo",
            "pages": 2,
            "limit": 5,
        })))
        .unwrap();
        assert_eq!(request.target.kind, TargetKind::Account);
        assert_eq!(request.target.to_string(), "account=\"nintendo\"");
        assert_eq!(request.options.pages, Some(2));
        assert_eq!(request.limit, 5);
    }
}
