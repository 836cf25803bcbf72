//! HTTP fetcher
//!
//! Default [`PageFetcher`] backed by reqwest. Non-success statuses, binary
//! payloads and empty or oversized bodies all count as "no document".

use crate::client::FetchConfig;
use crate::error::FetchError;
use crate::fetchers::PageFetcher;
use crate::DEFAULT_USER_AGENT;
use async_trait::async_trait;
use bytes::Bytes;
use encoding_rs::{Encoding, UTF_8};
use futures::StreamExt;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE, USER_AGENT};
use tracing::{debug, warn};

/// Binary content type prefixes
const BINARY_PREFIXES: &[&str] = &[
    "image/",
    "audio/",
    "video/",
    "application/octet-stream",
    "application/pdf",
    "application/zip",
    "application/gzip",
    "application/x-tar",
    "application/x-rar",
    "application/x-7z",
    "application/vnd.ms-",
    "application/vnd.openxmlformats",
    "font/",
];

const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

/// reqwest-backed fetcher
///
/// Sends a browser-like request with the configured User-Agent, follows
/// redirects and decodes compressed bodies.
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpFetcher;

impl HttpFetcher {
    /// Create a new HTTP fetcher
    pub fn new() -> Self {
        Self
    }

    fn client(&self, config: &FetchConfig) -> Result<reqwest::Client, FetchError> {
        let user_agent = HeaderValue::from_str(&config.user_agent).unwrap_or_else(|_| {
            warn!(
                user_agent = %config.user_agent,
                "Invalid User-Agent header value, sending the default"
            );
            HeaderValue::from_static(DEFAULT_USER_AGENT)
        });

        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, user_agent);
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_HTML));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));

        reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(FetchError::ClientBuildError)
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn fetch(&self, url: &str, config: &FetchConfig) -> Result<Option<String>, FetchError> {
        let client = self.client(config)?;

        debug!(url, "Fetching page");
        let response = client
            .get(url)
            .send()
            .await
            .map_err(FetchError::from_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            warn!(url, status = status.as_u16(), "Page returned error status");
            return Ok(None);
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        if let Some(ref ct) = content_type {
            if is_binary_content_type(ct) {
                warn!(url, content_type = %ct, "Binary content is not supported");
                return Ok(None);
            }
        }

        if let Some(len) = response.content_length() {
            if len > config.max_body_size as u64 {
                warn!(url, size = len, "Declared body size exceeds limit");
                return Ok(None);
            }
        }

        let Some(body) = read_body_capped(response, config.max_body_size).await? else {
            warn!(url, "Body exceeds size limit");
            return Ok(None);
        };

        let text = decode_body(&body, content_type.as_deref());
        if text.trim().is_empty() {
            debug!(url, "Empty body");
            return Ok(None);
        }

        debug!(url, size = body.len(), "Fetched page");
        Ok(Some(text))
    }
}

/// Check if content type indicates binary content
fn is_binary_content_type(content_type: &str) -> bool {
    let ct_lower = content_type.to_lowercase();
    BINARY_PREFIXES
        .iter()
        .any(|prefix| ct_lower.starts_with(prefix))
}

/// Decode `body` with the declared charset
///
/// The Content-Type parameter wins, then a `<meta charset>` near the top of
/// the document; anything else is read as UTF-8. A BOM overrides both.
fn decode_body(body: &[u8], content_type: Option<&str>) -> String {
    let encoding = content_type
        .and_then(charset_param)
        .or_else(|| meta_charset(body))
        .and_then(|label| Encoding::for_label(label.as_bytes()))
        .unwrap_or(UTF_8);
    let (text, _, _) = encoding.decode(body);
    text.into_owned()
}

/// `charset` parameter of a Content-Type value
fn charset_param(content_type: &str) -> Option<String> {
    content_type.split(';').skip(1).find_map(|param| {
        let (key, value) = param.split_once('=')?;
        key.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim().trim_matches(|c: char| c == '"' || c == '\'').to_string())
    })
}

/// Charset named by a `<meta>` tag in the first kilobyte
fn meta_charset(body: &[u8]) -> Option<String> {
    let head = String::from_utf8_lossy(&body[..body.len().min(1024)]).to_ascii_lowercase();
    let start = head.find("charset=")? + "charset=".len();
    let label: String = head[start..]
        .trim_start_matches(|c: char| c == '"' || c == '\'')
        .chars()
        .take_while(|&c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':' | '.'))
        .collect();
    (!label.is_empty()).then_some(label)
}

/// Stream the response body, giving up once it grows past `limit`
async fn read_body_capped(
    response: reqwest::Response,
    limit: usize,
) -> Result<Option<Bytes>, FetchError> {
    let mut body = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let bytes = chunk.map_err(FetchError::from_reqwest)?;
        if body.len() + bytes.len() > limit {
            return Ok(None);
        }
        body.extend_from_slice(&bytes);
    }

    Ok(Some(Bytes::from(body)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_binary_content_type() {
        assert!(is_binary_content_type("image/png"));
        assert!(is_binary_content_type("application/pdf"));
        assert!(is_binary_content_type("Application/Octet-Stream"));
        assert!(is_binary_content_type("font/woff2"));

        assert!(!is_binary_content_type("text/html; charset=utf-8"));
        assert!(!is_binary_content_type("application/xhtml+xml"));
        assert!(!is_binary_content_type("text/plain"));
    }

    #[test]
    fn test_charset_param() {
        assert_eq!(
            charset_param("text/html; charset=ISO-8859-1").as_deref(),
            Some("ISO-8859-1")
        );
        assert_eq!(
            charset_param("text/html;charset=\"utf-8\"").as_deref(),
            Some("utf-8")
        );
        assert_eq!(charset_param("text/html"), None);
    }

    #[test]
    fn test_meta_charset() {
        let html = b"<html><head><meta charset=\"windows-1251\"></head>";
        assert_eq!(meta_charset(html).as_deref(), Some("windows-1251"));

        let html = b"<meta http-equiv=\"Content-Type\" content=\"text/html; charset=iso-8859-2\">";
        assert_eq!(meta_charset(html).as_deref(), Some("iso-8859-2"));

        assert_eq!(meta_charset(b"<p>no declaration</p>"), None);
    }

    #[test]
    fn test_decode_body() {
        let latin1 = b"<p>Caf\xE9 au lait</p>";
        assert_eq!(
            decode_body(latin1, Some("text/html; charset=iso-8859-1")),
            "<p>Caf\u{e9} au lait</p>"
        );

        let sniffed = b"<meta charset=iso-8859-1><p>Caf\xE9</p>";
        assert!(decode_body(sniffed, Some("text/html")).contains("Caf\u{e9}"));

        // header beats the meta tag
        let utf8 = "<meta charset=iso-8859-1><p>Caf\u{e9}</p>";
        assert!(decode_body(utf8.as_bytes(), Some("text/html; charset=utf-8")).contains("Caf\u{e9}"));

        assert_eq!(decode_body("plain \u{2713}".as_bytes(), None), "plain \u{2713}");
        assert_eq!(decode_body(b"x", Some("text/html; charset=bogus")), "x");
    }

    #[test]
    fn test_invalid_user_agent_falls_back() {
        let config = FetchConfig {
            user_agent: "bad\nagent".to_string(),
            ..Default::default()
        };
        assert!(HttpFetcher::new().client(&config).is_ok());
    }

    #[test]
    fn test_client_accepts_configured_user_agent() {
        let fetcher = HttpFetcher::new();
        let config = FetchConfig {
            user_agent: "TestAgent/1.0".to_string(),
            ..Default::default()
        };
        assert!(fetcher.client(&config).is_ok());
        assert_eq!(fetcher.name(), "http");
    }
}
