//! Tool builder and contract for `fetch_url`

use crate::client::FetchConfig;
use crate::convert::filter_excessive_newlines;
use crate::error::FetchError;
use crate::extract::{ContentExtractor, ExtractOptions, ReadabilityExtractor};
use crate::fetchers::{HttpFetcher, PageFetcher};
use crate::links::{extract_links, links_section};
use crate::types::{FetchUrlRequest, FetchUrlResponse, PageMetadata};
use crate::{TOOL_DESCRIPTION, TOOL_LLMTXT, TOOL_NAME};
use schemars::schema_for;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Reported when the fetcher yields no document
pub const FETCH_FAILED_MESSAGE: &str =
    "Failed to fetch URL: page not accessible or returned empty content";

/// Reported when extraction yields nothing
pub const NO_CONTENT_MESSAGE: &str = "No extractable content found on page";

/// Builder for configuring the `fetch_url` tool
#[derive(Default)]
pub struct ToolBuilder {
    config: FetchConfig,
    fetcher: Option<Arc<dyn PageFetcher>>,
    extractor: Option<Arc<dyn ContentExtractor>>,
}

impl ToolBuilder {
    /// Create a new tool builder with default collaborators
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole fetch configuration
    pub fn config(mut self, config: FetchConfig) -> Self {
        self.config = config;
        self
    }

    /// Set custom User-Agent
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.config.user_agent = ua.into();
        self
    }

    /// Set the whole-request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set the maximum accepted body size in bytes
    pub fn max_body_size(mut self, bytes: usize) -> Self {
        self.config.max_body_size = bytes;
        self
    }

    /// Use a custom page fetcher
    pub fn fetcher(mut self, fetcher: impl PageFetcher + 'static) -> Self {
        self.fetcher = Some(Arc::new(fetcher));
        self
    }

    /// Use a custom content extractor
    pub fn extractor(mut self, extractor: impl ContentExtractor + 'static) -> Self {
        self.extractor = Some(Arc::new(extractor));
        self
    }

    /// Build the tool
    pub fn build(self) -> Tool {
        Tool {
            config: Arc::new(self.config),
            fetcher: self
                .fetcher
                .unwrap_or_else(|| Arc::new(HttpFetcher::new())),
            extractor: self
                .extractor
                .unwrap_or_else(|| Arc::new(ReadabilityExtractor::new())),
        }
    }
}

/// Configured `fetch_url` tool
///
/// Cheap to clone; all state is shared and immutable, so one instance can
/// serve concurrent calls.
#[derive(Clone)]
pub struct Tool {
    config: Arc<FetchConfig>,
    fetcher: Arc<dyn PageFetcher>,
    extractor: Arc<dyn ContentExtractor>,
}

impl fmt::Debug for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tool")
            .field("config", &self.config)
            .field("fetcher", &self.fetcher.name())
            .field("extractor", &self.extractor.name())
            .finish()
    }
}

impl Default for Tool {
    fn default() -> Self {
        ToolBuilder::new().build()
    }
}

impl Tool {
    /// Create a new tool builder
    pub fn builder() -> ToolBuilder {
        ToolBuilder::new()
    }

    /// Same collaborators, different fetch configuration
    pub fn with_config(mut self, config: FetchConfig) -> Self {
        self.config = Arc::new(config);
        self
    }

    /// Name the host registers the tool under
    pub fn name(&self) -> &'static str {
        TOOL_NAME
    }

    /// Get tool description
    pub fn description(&self) -> &'static str {
        TOOL_DESCRIPTION
    }

    /// Get full documentation (llmtxt)
    pub fn llmtxt(&self) -> &'static str {
        TOOL_LLMTXT
    }

    /// Active fetch configuration
    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// Get input schema as JSON
    pub fn input_schema(&self) -> serde_json::Value {
        let schema = schema_for!(FetchUrlRequest);
        let mut value = serde_json::to_value(schema).unwrap_or_default();

        // `url` defaults to empty so a missing value still gets an envelope
        if let Some(obj) = value.as_object_mut() {
            obj.insert("required".to_string(), serde_json::json!(["url"]));
        }

        value
    }

    /// Get output schema as JSON
    pub fn output_schema(&self) -> serde_json::Value {
        let schema = schema_for!(FetchUrlResponse);
        serde_json::to_value(schema).unwrap_or_default()
    }

    /// Execute the tool and return the JSON envelope text
    pub async fn execute(&self, req: FetchUrlRequest) -> String {
        self.run(req).await.to_json()
    }

    /// Execute the tool with raw JSON arguments as sent by a host
    pub async fn execute_value(&self, args: serde_json::Value) -> String {
        match serde_json::from_value::<FetchUrlRequest>(args.clone()) {
            Ok(req) => self.execute(req).await,
            Err(e) => {
                let url = args
                    .get("url")
                    .and_then(|v| v.as_str())
                    .unwrap_or_default();
                FetchUrlResponse::failure(url, format!("Invalid arguments: {e}")).to_json()
            }
        }
    }

    /// Execute the tool and return the envelope
    pub async fn run(&self, req: FetchUrlRequest) -> FetchUrlResponse {
        let url = req.url.trim();

        if url.is_empty() {
            return FetchUrlResponse::failure(url, FetchError::MissingUrl.to_string());
        }
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return FetchUrlResponse::failure(url, FetchError::InvalidUrlScheme.to_string());
        }

        debug!(fetcher = self.fetcher.name(), url, "Fetching");
        let document = match self.fetcher.fetch(url, &self.config).await {
            Ok(Some(document)) => document,
            Ok(None) => return FetchUrlResponse::failure(url, FETCH_FAILED_MESSAGE),
            Err(e) => {
                warn!(url, error = %e, "Fetch failed");
                return FetchUrlResponse::failure(url, e.classify(url));
            }
        };

        if req.wants_links_only() {
            let links = extract_links(&document, url);
            debug!(url, count = links.len(), "Extracted links");
            return FetchUrlResponse::with_links(url, links);
        }

        let options = ExtractOptions::for_request(&req);
        let content = match self.extractor.extract(&document, url, &options) {
            Ok(Some(content)) if !content.trim().is_empty() => content,
            Ok(_) => return FetchUrlResponse::failure(url, NO_CONTENT_MESSAGE),
            Err(e) => {
                warn!(url, error = %e, "Extraction failed");
                return FetchUrlResponse::failure(url, e.classify(url));
            }
        };

        let mut content = filter_excessive_newlines(content.trim_end());
        let links = extract_links(&document, url);
        if !links.is_empty() {
            content.push_str(&links_section(&links));
        }

        let metadata = if req.wants_metadata() {
            self.extractor
                .extract_metadata(&document, url)
                .map(PageMetadata::normalized)
                .unwrap_or_default()
        } else {
            PageMetadata::default()
        };

        FetchUrlResponse::with_content(url, metadata, content)
    }
}

/// Registration hook: hands every tool of this crate to the host's registry
pub fn register_tools<F>(mut register: F)
where
    F: FnMut(Tool),
{
    register(Tool::default());
}
