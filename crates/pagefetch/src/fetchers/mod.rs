//! Fetch collaborators
//!
//! A [`PageFetcher`] turns a validated URL into the raw document text.
//! "No document" (`Ok(None)`) and transport failures (`Err`) are reported
//! separately so the tool can word them differently.

mod http;

pub use http::HttpFetcher;

use crate::client::FetchConfig;
use crate::error::FetchError;
use async_trait::async_trait;

/// Trait for page fetchers
///
/// Implement this trait to plug a different transport (a cache, a headless
/// browser, a test double) into the tool.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Unique identifier for this fetcher (for logging/debugging)
    fn name(&self) -> &'static str;

    /// Fetch the raw document at `url`
    ///
    /// Returns `Ok(None)` when the page answered but yielded nothing usable
    /// (error status, empty body, oversized body).
    async fn fetch(&self, url: &str, config: &FetchConfig) -> Result<Option<String>, FetchError>;
}
