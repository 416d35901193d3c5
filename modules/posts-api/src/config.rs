use std::env;

use anyhow::{Context, Result};
use tracing::info;

/// Process configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // Listener
    pub host: String,
    pub port: u16,

    // Logging
    pub log_level: String,

    // Apify
    pub apify_api_token: String,
    pub apify_base_url: Option<String>,
}

impl Config {
    /// Load from the environment, after applying a `.env` file if one exists.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let port = match lookup("PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("PORT must be a number, got {raw:?}"))?,
            None => 8000,
        };

        Ok(Self {
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            log_level: lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            apify_api_token: lookup("APIFY_API_TOKEN")
                .filter(|t| !t.is_empty())
                .context("APIFY_API_TOKEN environment variable is required")?,
            apify_base_url: lookup("APIFY_BASE_URL").filter(|u| !u.is_empty()),
        })
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn log_summary(&self) {
        let preview: String = self.apify_api_token.chars().take(5).collect();
        info!(
            addr = %self.listen_addr(),
            log_level = %self.log_level,
            apify_token = %format!("{preview}..."),
            apify_base_url = self.apify_base_url.as_deref().unwrap_or("default"),
            "Configuration loaded"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply() {
        let config = load(&[("APIFY_API_TOKEN", "apify_api_abc")]).unwrap();
        assert_eq!(config.listen_addr(), "0.0.0.0:8000");
        assert_eq!(config.log_level, "info");
        assert!(config.apify_base_url.is_none());
    }

    #[test]
    fn overrides_are_read() {
        let config = load(&[
            ("HOST", "127.0.0.1"),
            ("PORT", "9090"),
            ("LOG_LEVEL", "debug"),
            ("APIFY_API_TOKEN", "apify_api_abc"),
            ("APIFY_BASE_URL", "http://localhost:4000/v2"),
        ])
        .unwrap();
        assert_eq!(config.listen_addr(), "127.0.0.1:9090");
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.apify_base_url.as_deref(), Some("http://localhost:4000/v2"));
    }

    #[test]
    fn bad_port_is_an_error() {
        let err = load(&[("PORT", "eighty"), ("APIFY_API_TOKEN", "t")]).unwrap_err();
        assert!(err.to_string().contains("PORT must be a number"));
    }

    #[test]
    fn token_is_required() {
        let err = load(&[]).unwrap_err();
        assert!(err.to_string().contains("APIFY_API_TOKEN"));
        assert!(load(&[("APIFY_API_TOKEN", "")]).is_err());
    }
}
