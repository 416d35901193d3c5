use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Wrapper for Apify API responses.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse<T> {
    pub data: T,
}

/// Input for the apify Facebook scraper actors (posts, groups, hashtag search).
/// All three accept the same start-URL shaped input.
#[derive(Debug, Clone, Serialize)]
pub struct FacebookScraperInput {
    #[serde(rename = "startUrls")]
    pub start_urls: Vec<StartUrl>,
    #[serde(rename = "resultsLimit")]
    pub results_limit: u32,
    #[serde(rename = "includeReactions", skip_serializing_if = "Option::is_none")]
    pub include_reactions: Option<bool>,
    #[serde(rename = "downloadVideos", skip_serializing_if = "Option::is_none")]
    pub download_videos: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cookies: Option<Vec<FacebookCookie>>,
}

/// A start URL entry for Facebook scraper input.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StartUrl {
    pub url: String,
}

/// A session cookie handed to the actor's browser.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FacebookCookie {
    pub name: String,
    pub value: String,
    pub domain: String,
}

/// Apify actor run metadata.
#[derive(Debug, Clone, Deserialize)]
pub struct RunData {
    pub id: String,
    pub status: String,
    #[serde(rename = "defaultDatasetId")]
    pub default_dataset_id: String,
    #[serde(rename = "startedAt")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(rename = "finishedAt")]
    pub finished_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_data_parses_apify_payload() {
        let json = r#"{
            "data": {
                "id": "HG7ML7M8z78YcAPEB",
                "status": "SUCCEEDED",
                "defaultDatasetId": "wmKPijuyDnPZAPRMk",
                "startedAt": "2025-01-08T00:00:00.000Z",
                "finishedAt": null
            }
        }"#;
        let resp: ApiResponse<RunData> = serde_json::from_str(json).unwrap();
        assert_eq!(resp.data.id, "HG7ML7M8z78YcAPEB");
        assert_eq!(resp.data.status, "SUCCEEDED");
        assert_eq!(resp.data.default_dataset_id, "wmKPijuyDnPZAPRMk");
        assert!(resp.data.started_at.is_some());
        assert!(resp.data.finished_at.is_none());
    }

    #[test]
    fn scraper_input_omits_unset_fields() {
        let input = FacebookScraperInput {
            start_urls: vec![StartUrl {
                url: "https://www.facebook.com/nintendo".into(),
            }],
            results_limit: 100,
            include_reactions: None,
            download_videos: Some(true),
            cookies: None,
        };
        let value = serde_json::to_value(&input).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "startUrls": [{"url": "https://www.facebook.com/nintendo"}],
                "resultsLimit": 100,
                "downloadVideos": true,
            })
        );
    }
}
