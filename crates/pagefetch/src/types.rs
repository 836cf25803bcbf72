//! Core types for PageFetch

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Arguments of the `fetch_url` tool
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct FetchUrlRequest {
    /// Full HTTP/HTTPS URL to fetch
    #[serde(default)]
    pub url: String,

    /// Keep inline hyperlinks in extracted content (default: true)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_links: Option<bool>,

    /// Include image alt-text descriptions (default: false)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_images: Option<bool>,

    /// Include sitename, title, author, date and description if available (default: true)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_metadata: Option<bool>,

    /// Return only the page links without content (default: false).
    /// Use for finding download links or navigation URLs.
    #[serde(
        default,
        alias = "extract_links",
        skip_serializing_if = "Option::is_none"
    )]
    pub extract_links_only: Option<bool>,
}

impl FetchUrlRequest {
    /// Create a new request with the given URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Keep or drop inline links in the content
    pub fn include_links(mut self, enable: bool) -> Self {
        self.include_links = Some(enable);
        self
    }

    /// Keep or drop image alt-text in the content
    pub fn include_images(mut self, enable: bool) -> Self {
        self.include_images = Some(enable);
        self
    }

    /// Include or skip the metadata block
    pub fn include_metadata(mut self, enable: bool) -> Self {
        self.include_metadata = Some(enable);
        self
    }

    /// Switch to links-only mode
    pub fn links_only(mut self) -> Self {
        self.extract_links_only = Some(true);
        self
    }

    pub fn wants_links(&self) -> bool {
        self.include_links.unwrap_or(true)
    }

    pub fn wants_images(&self) -> bool {
        self.include_images.unwrap_or(false)
    }

    pub fn wants_metadata(&self) -> bool {
        self.include_metadata.unwrap_or(true)
    }

    pub fn wants_links_only(&self) -> bool {
        self.extract_links_only.unwrap_or(false)
    }
}

/// A link found on the page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Link {
    /// Absolute URL, resolved against the page URL
    pub url: String,
    /// Visible anchor text (may be empty)
    pub text: String,
}

impl Link {
    /// Markdown bullet for the `Page Links` section
    pub fn to_markdown_item(&self) -> String {
        let label = if self.text.is_empty() {
            &self.url
        } else {
            &self.text
        };
        format!("- [{}]({})", label, self.url)
    }
}

/// Document metadata; fields without a non-empty value are omitted
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct PageMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sitename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl PageMetadata {
    /// Keep only values that are non-empty after trimming
    pub fn normalized(self) -> Self {
        fn keep(value: Option<String>) -> Option<String> {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        }

        Self {
            sitename: keep(self.sitename),
            title: keep(self.title),
            author: keep(self.author),
            date: keep(self.date),
            description: keep(self.description),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.sitename.is_none()
            && self.title.is_none()
            && self.author.is_none()
            && self.date.is_none()
            && self.description.is_none()
    }
}

/// Result envelope returned by `fetch_url`, success or failure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FetchUrlResponse {
    /// The requested URL (trimmed)
    pub url: String,

    /// Page metadata (content mode and errors)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<PageMetadata>,

    /// Markdown content with a trailing `Page Links` section (content mode)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    /// Page links (links-only mode)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Vec<Link>>,

    /// Number of entries in `links`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_count: Option<usize>,

    /// Error message, null on success
    pub error: Option<String>,
}

impl FetchUrlResponse {
    /// Failure envelope: data fields reset to empty
    pub fn failure(url: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            metadata: Some(PageMetadata::default()),
            content: Some(String::new()),
            error: Some(error.into()),
            ..Default::default()
        }
    }

    /// Content-mode success envelope
    pub fn with_content(url: impl Into<String>, metadata: PageMetadata, content: String) -> Self {
        Self {
            url: url.into(),
            metadata: Some(metadata),
            content: Some(content),
            ..Default::default()
        }
    }

    /// Links-only success envelope
    pub fn with_links(url: impl Into<String>, links: Vec<Link>) -> Self {
        Self {
            url: url.into(),
            link_count: Some(links.len()),
            links: Some(links),
            ..Default::default()
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Serialize as indented JSON, the text handed back to the host
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|e| {
            format!(
                "{{\n  \"url\": {},\n  \"metadata\": {{}},\n  \"content\": \"\",\n  \"error\": {}\n}}",
                serde_json::Value::String(self.url.clone()),
                serde_json::Value::String(format!("Failed to serialize response: {e}"))
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn test_request_defaults() {
        let req = FetchUrlRequest::new("https://example.com");
        assert!(req.wants_links());
        assert!(!req.wants_images());
        assert!(req.wants_metadata());
        assert!(!req.wants_links_only());
    }

    #[test]
    fn test_request_builder() {
        let req = FetchUrlRequest::new("https://example.com")
            .include_links(false)
            .include_images(true)
            .include_metadata(false)
            .links_only();

        assert!(!req.wants_links());
        assert!(req.wants_images());
        assert!(!req.wants_metadata());
        assert!(req.wants_links_only());
    }

    #[test]
    fn test_request_extract_links_alias() {
        let req: FetchUrlRequest =
            serde_json::from_str(r#"{"url": "https://example.com", "extract_links": true}"#)
                .unwrap();
        assert!(req.wants_links_only());

        let req: FetchUrlRequest =
            serde_json::from_str(r#"{"url": "https://example.com", "extract_links_only": true}"#)
                .unwrap();
        assert!(req.wants_links_only());
    }

    #[test]
    fn test_request_missing_url_deserializes_empty() {
        let req: FetchUrlRequest = serde_json::from_str("{}").unwrap();
        assert!(req.url.is_empty());
    }

    #[test]
    fn test_link_markdown_item() {
        let link = Link {
            url: "https://example.com/a".to_string(),
            text: "A page".to_string(),
        };
        assert_eq!(link.to_markdown_item(), "- [A page](https://example.com/a)");

        let bare = Link {
            url: "https://example.com/b".to_string(),
            text: String::new(),
        };
        assert_eq!(
            bare.to_markdown_item(),
            "- [https://example.com/b](https://example.com/b)"
        );
    }

    #[test]
    fn test_metadata_normalized_drops_blank_fields() {
        let meta = PageMetadata {
            sitename: Some("  ".to_string()),
            title: Some(" Title ".to_string()),
            author: None,
            date: Some(String::new()),
            description: Some("About".to_string()),
        }
        .normalized();

        assert_eq!(meta.sitename, None);
        assert_eq!(meta.title.as_deref(), Some("Title"));
        assert_eq!(meta.date, None);

        let json = serde_json::to_value(&meta).unwrap();
        let keys: Vec<&String> = json.as_object().unwrap().keys().collect();
        assert_eq!(keys.len(), 2);
        assert!(json.get("author").is_none());
    }

    #[test]
    fn test_failure_envelope_shape() {
        let resp = FetchUrlResponse::failure("not-a-url", "Invalid URL");
        let json: Value = serde_json::from_str(&resp.to_json()).unwrap();

        assert_eq!(json["error"], "Invalid URL");
        assert_eq!(json["url"], "not-a-url");
        assert_eq!(json["content"], "");
        assert_eq!(json["metadata"], serde_json::json!({}));
        assert!(json.get("links").is_none());
    }

    #[test]
    fn test_links_envelope_shape() {
        let links = vec![Link {
            url: "https://example.com/".to_string(),
            text: "Home".to_string(),
        }];
        let resp = FetchUrlResponse::with_links("https://example.com", links);
        let json: Value = serde_json::from_str(&resp.to_json()).unwrap();

        assert_eq!(json["link_count"], 1);
        assert_eq!(json["links"][0]["text"], "Home");
        assert!(json["error"].is_null());
        assert!(json.get("content").is_none());
        assert!(json.get("metadata").is_none());
    }

    #[test]
    fn test_content_envelope_is_indented() {
        let resp = FetchUrlResponse::with_content(
            "https://example.com",
            PageMetadata::default(),
            "Hello".to_string(),
        );
        let text = resp.to_json();
        assert!(text.contains("\n  \"content\": \"Hello\""));
        assert!(text.contains("\"error\": null"));
    }
}
