//! Fetch configuration and convenience entry points
//!
//! The actual pipeline lives in [`Tool`](crate::Tool); the functions here
//! run it with default collaborators.

use crate::tool::Tool;
use crate::types::FetchUrlRequest;
use crate::DEFAULT_USER_AGENT;
use std::time::Duration;

/// Whole-request timeout applied by the HTTP fetcher
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Bodies larger than this are treated as "no document"
pub const DEFAULT_MAX_BODY_SIZE: usize = 20_000_000;

/// Immutable fetch configuration, built once and passed to every fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchConfig {
    /// User-Agent header sent with every request
    pub user_agent: String,
    /// Timeout for the whole request, body included
    pub timeout: Duration,
    /// Maximum accepted body size in bytes
    pub max_body_size: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: DEFAULT_TIMEOUT,
            max_body_size: DEFAULT_MAX_BODY_SIZE,
        }
    }
}

/// Run `fetch_url` with default settings and return the JSON envelope
pub async fn fetch_url(req: FetchUrlRequest) -> String {
    Tool::default().execute(req).await
}

/// Run `fetch_url` with a custom fetch configuration
pub async fn fetch_url_with_config(req: FetchUrlRequest, config: FetchConfig) -> String {
    Tool::builder().config(config).build().execute(req).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[tokio::test]
    async fn test_fetch_empty_url() {
        let out = fetch_url(FetchUrlRequest::new("   ")).await;
        let json: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(json["error"], "URL is required");
        assert_eq!(json["content"], "");
    }

    #[tokio::test]
    async fn test_fetch_invalid_scheme() {
        let out = fetch_url(FetchUrlRequest::new("ftp://example.com")).await;
        let json: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(
            json["error"],
            "Invalid URL: must start with http:// or https://"
        );
    }

    #[test]
    fn test_fetch_config_default() {
        let config = FetchConfig::default();
        assert!(config.user_agent.starts_with("Mozilla/5.0"));
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.max_body_size, 20_000_000);
    }
}
