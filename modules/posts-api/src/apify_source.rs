//! Post source backed by Apify's Facebook scraper actors.
//!
//! Nothing touches the network until the stream is first polled. The actor run
//! is started then, and its dataset is read one page at a time as the
//! consumer keeps pulling.

use std::collections::VecDeque;

use apify_client::{
    ApifyClient, ApifyError, FacebookCookie, FacebookScraperInput, StartUrl,
    FACEBOOK_GROUPS_SCRAPER, FACEBOOK_HASHTAG_SCRAPER, FACEBOOK_POSTS_SCRAPER,
};
use futures::stream;
use serde_json::{Map, Value};
use tracing::info;

use crate::error::ScrapeError;
use crate::request::{Cookies, ScrapeOptions, Target, TargetKind};
use crate::source::{Post, PostSource, PostStream};

const FACEBOOK_URL: &str = "https://www.facebook.com";
const COOKIE_DOMAIN: &str = ".facebook.com";

/// Items requested per dataset read.
const DATASET_PAGE_SIZE: usize = 25;

/// Paginator pages visited when the request does not say.
const DEFAULT_PAGES: i64 = 10;

/// Posts budgeted per paginator page when sizing the actor run.
const POSTS_PER_PAGE: i64 = 10;

pub struct ApifyPostSource {
    client: ApifyClient,
}

impl ApifyPostSource {
    pub fn new(client: ApifyClient) -> Self {
        Self { client }
    }
}

impl PostSource for ApifyPostSource {
    fn posts(&self, target: &Target, options: &ScrapeOptions) -> PostStream {
        let cursor = DatasetCursor {
            client: self.client.clone(),
            target: target.clone(),
            options: options.clone(),
            dataset_id: None,
            offset: 0,
            buffered: VecDeque::new(),
            exhausted: false,
        };

        Box::pin(stream::try_unfold(cursor, DatasetCursor::next_post))
    }
}

impl From<ApifyError> for ScrapeError {
    fn from(err: ApifyError) -> Self {
        let unauthorized = err.is_unauthorized();
        match err {
            ApifyError::Api { message, .. } if unauthorized => {
                ScrapeError::InvalidCredentials(message)
            }
            other => ScrapeError::Upstream(other.to_string()),
        }
    }
}

struct DatasetCursor {
    client: ApifyClient,
    target: Target,
    options: ScrapeOptions,
    dataset_id: Option<String>,
    offset: usize,
    buffered: VecDeque<Post>,
    exhausted: bool,
}

impl DatasetCursor {
    async fn next_post(mut self) -> Result<Option<(Post, Self)>, ScrapeError> {
        loop {
            if let Some(post) = self.buffered.pop_front() {
                return Ok(Some((post, self)));
            }
            if self.exhausted {
                return Ok(None);
            }
            self.fetch_next_page().await?;
        }
    }

    async fn fetch_next_page(&mut self) -> Result<(), ScrapeError> {
        let dataset_id = match self.dataset_id.clone() {
            Some(id) => id,
            None => {
                let id = self.run_actor().await?;
                self.dataset_id = Some(id.clone());
                id
            }
        };

        let page: Vec<Post> = self
            .client
            .get_dataset_page(&dataset_id, self.offset, DATASET_PAGE_SIZE)
            .await?;
        self.offset += page.len();
        self.exhausted = page.len() < DATASET_PAGE_SIZE;
        self.buffered.extend(page);
        Ok(())
    }

    /// Start the actor for this target, wait for it, and return its dataset id.
    async fn run_actor(&self) -> Result<String, ScrapeError> {
        let cookies = match &self.options.cookies {
            Some(cookies) => load_cookies(cookies).await?,
            None => Vec::new(),
        };
        let input = build_input(&self.target, &self.options, cookies)?;
        let actor = actor_for(self.target.kind);
        let timeout = self
            .options
            .timeout
            .and_then(|secs| u64::try_from(secs).ok());

        info!(actor, scrape_target = %self.target, "Starting Apify run");
        let run = self.client.start_run(actor, &input, timeout).await?;
        let completed = self.client.wait_for_run(&run.id).await?;
        let duration_secs = match (completed.started_at, completed.finished_at) {
            (Some(start), Some(end)) => Some((end - start).num_seconds()),
            _ => None,
        };
        info!(
            run_id = %completed.id,
            dataset_id = %completed.default_dataset_id,
            duration_secs,
            "Run completed, reading dataset"
        );
        Ok(completed.default_dataset_id)
    }
}

fn actor_for(kind: TargetKind) -> &'static str {
    match kind {
        TargetKind::Account | TargetKind::PostUrls => FACEBOOK_POSTS_SCRAPER,
        TargetKind::Group => FACEBOOK_GROUPS_SCRAPER,
        TargetKind::Hashtag => FACEBOOK_HASHTAG_SCRAPER,
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        other => other.to_string(),
    }
}

/// Full URLs are used as given; bare names are placed under `prefix`.
fn facebook_url(prefix: &str, name: &str) -> String {
    if name.starts_with("http://") || name.starts_with("https://") {
        name.to_string()
    } else {
        format!("{FACEBOOK_URL}{prefix}/{}", name.trim_matches('/'))
    }
}

fn start_urls(target: &Target) -> Vec<StartUrl> {
    let urls = match (target.kind, &target.value) {
        (TargetKind::PostUrls, Value::Array(urls)) => {
            urls.iter().map(|url| facebook_url("", &value_text(url))).collect()
        }
        (TargetKind::Group, value) => vec![facebook_url("/groups", &value_text(value))],
        (TargetKind::Hashtag, value) => {
            let tag = value_text(value);
            vec![facebook_url("/hashtag", tag.trim_start_matches('#'))]
        }
        (_, value) => vec![facebook_url("", &value_text(value))],
    };
    urls.into_iter().map(|url| StartUrl { url }).collect()
}

fn results_limit(options: &ScrapeOptions) -> u32 {
    let pages = options.pages.or(options.page_limit).unwrap_or(DEFAULT_PAGES);
    u32::try_from(pages.saturating_mul(POSTS_PER_PAGE)).unwrap_or(u32::MAX)
}

/// Actor input for a target. Keys from the request's `options` bag win.
fn build_input(
    target: &Target,
    options: &ScrapeOptions,
    cookies: Vec<FacebookCookie>,
) -> Result<Value, ScrapeError> {
    let input = FacebookScraperInput {
        start_urls: start_urls(target),
        results_limit: results_limit(options),
        include_reactions: options.extra_info,
        download_videos: options.youtube_dl,
        cookies: (!cookies.is_empty()).then_some(cookies),
    };
    let mut value = serde_json::to_value(&input)
        .map_err(|e| ScrapeError::Upstream(format!("failed to encode actor input: {e}")))?;

    if let (Some(fields), Some(extra)) = (value.as_object_mut(), &options.options) {
        for (key, v) in extra {
            fields.insert(key.clone(), v.clone());
        }
    }
    Ok(value)
}

fn invalid_cookies(reason: impl std::fmt::Display) -> ScrapeError {
    ScrapeError::InvalidCredentials(format!("Cookies are in an invalid format: {reason}"))
}

fn jar_to_cookies(jar: &Map<String, Value>) -> Vec<FacebookCookie> {
    jar.iter()
        .map(|(name, value)| FacebookCookie {
            name: name.clone(),
            value: value_text(value),
            domain: COOKIE_DOMAIN.to_string(),
        })
        .collect()
}

/// Resolve the request's cookie source into concrete cookies.
///
/// A path must point at a JSON file holding either a name/value object or an
/// array of `{"name", "value"}` objects (the browser export format).
async fn load_cookies(cookies: &Cookies) -> Result<Vec<FacebookCookie>, ScrapeError> {
    let path = match cookies {
        Cookies::Jar(jar) => return Ok(jar_to_cookies(jar)),
        Cookies::Path(path) => path,
    };

    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| invalid_cookies(format!("{path}: {e}")))?;
    let parsed: Value = serde_json::from_str(&raw).map_err(invalid_cookies)?;

    match parsed {
        Value::Object(jar) => Ok(jar_to_cookies(&jar)),
        Value::Array(entries) => entries
            .iter()
            .map(|entry| {
                let name = entry["name"].as_str();
                let value = entry["value"].as_str();
                match (name, value) {
                    (Some(name), Some(value)) => Ok(FacebookCookie {
                        name: name.to_string(),
                        value: value.to_string(),
                        domain: entry["domain"]
                            .as_str()
                            .unwrap_or(COOKIE_DOMAIN)
                            .to_string(),
                    }),
                    _ => Err(invalid_cookies("each cookie needs a name and a value")),
                }
            })
            .collect(),
        _ => Err(invalid_cookies("expected an object or an array")),
    }
}
