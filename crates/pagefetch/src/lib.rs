//! PageFetch - readable web page extraction as an LLM tool
//!
//! This crate exposes one tool, `fetch_url`: given a URL it fetches the
//! page, extracts the readable main content as markdown, lists the page's
//! links and returns a JSON envelope with `content`, `metadata` and `error`
//! fields. Links-only mode returns the link list instead of content.
//!
//! ## Collaborators
//!
//! The pipeline delegates to two pluggable collaborators:
//! - [`PageFetcher`] - retrieves the raw document ([`HttpFetcher`] by default)
//! - [`ContentExtractor`] - extracts content and metadata
//!   ([`ReadabilityExtractor`] by default)
//!
//! Failures never surface as Rust errors to the caller; every outcome is an
//! envelope whose `error` field is either `null` or a readable message.

pub mod client;
mod convert;
mod error;
mod extract;
pub mod fetchers;
mod links;
mod tool;
mod types;

pub use client::{fetch_url, fetch_url_with_config, FetchConfig};
pub use convert::{html_to_markdown, MarkdownOptions};
pub use error::{classify_message, ExtractError, FailureKind, FetchError};
pub use extract::{ContentExtractor, ExtractOptions, ReadabilityExtractor};
pub use fetchers::{HttpFetcher, PageFetcher};
pub use links::extract_links;
pub use tool::{register_tools, Tool, ToolBuilder, FETCH_FAILED_MESSAGE, NO_CONTENT_MESSAGE};
pub use types::{FetchUrlRequest, FetchUrlResponse, Link, PageMetadata};

/// Browser-like User-Agent sent by default
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

/// Name the tool is registered under
pub const TOOL_NAME: &str = "fetch_url";

/// Tool description for LLM consumption
pub const TOOL_DESCRIPTION: &str = r#"Extract readable text from a webpage URL.

- Returns the main content as markdown, without navigation, ads and boilerplate
- Appends every link on the page as a "Page Links" section
- Includes sitename, title, author, date and description when available
- Set extract_links_only to get just the page links (e.g. to find download URLs)"#;

/// Extended documentation for LLM consumption (llmtxt)
pub const TOOL_LLMTXT: &str = r#"# fetch_url Tool

Extracts clean, readable content from a web page and returns it as JSON.

## Capabilities
- Main-content extraction (readability) rendered as markdown
- Tables, bold/italic and code formatting preserved
- Page link listing, resolved to absolute URLs and deduplicated
- Document metadata (sitename, title, author, date, description)

## Input Parameters
- `url` (required): Full URL to fetch (must start with http:// or https://)
- `include_links` (optional, default true): Keep inline hyperlinks in content
- `include_images` (optional, default false): Include image alt-text
- `include_metadata` (optional, default true): Include the metadata block
- `extract_links_only` (optional, default false): Return only the page links
  (also accepted as `extract_links`)

## Output Fields
- `url`: The requested URL
- `content`: Markdown content ending with a `## Page Links` section
- `metadata`: Object with any of sitename, title, author, date, description
- `links`: Array of {url, text} (links-only mode)
- `link_count`: Number of links (links-only mode)
- `error`: null on success, otherwise a message

## Examples

### Read an article
```json
{"url": "https://example.com/blog/post"}
```

### Find download links
```json
{"url": "https://example.com/downloads", "extract_links_only": true}
```

### Content without inline links or metadata
```json
{"url": "https://example.com", "include_links": false, "include_metadata": false}
```

## Error Handling
- Missing or non-http(s) URLs return an error without fetching
- Unreachable pages, error statuses and empty bodies report that the page was not accessible
- Connection, timeout, TLS, 404, 403 and 5xx failures get a short explanation naming the URL
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_llmtxt_is_complete() {
        assert!(TOOL_LLMTXT.starts_with("# fetch_url Tool"));
        assert!(TOOL_LLMTXT.contains("`## Page Links`"));
        assert!(TOOL_LLMTXT.contains("## Error Handling"));
        assert!(TOOL_LLMTXT
            .trim_end()
            .ends_with("get a short explanation naming the URL"));
    }

    #[test]
    fn test_description_mentions_links_only() {
        assert!(TOOL_DESCRIPTION.contains("\"Page Links\""));
        assert!(TOOL_DESCRIPTION.contains("extract_links_only"));
    }
}
