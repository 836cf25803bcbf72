//! Error types for PageFetch
//!
//! Errors never reach the tool's caller. [`FetchError::classify`] and
//! [`ExtractError::classify`] turn them into the text placed in the
//! envelope's `error` field.

use std::error::Error as StdError;
use thiserror::Error;

/// Errors that can occur while validating a request or fetching a page
#[derive(Debug, Error)]
pub enum FetchError {
    /// URL is missing or blank
    #[error("URL is required")]
    MissingUrl,

    /// URL has invalid scheme
    #[error("Invalid URL: must start with http:// or https://")]
    InvalidUrlScheme,

    /// Failed to build HTTP client
    #[error("Failed to create HTTP client")]
    ClientBuildError(#[source] reqwest::Error),

    /// Request exceeded the configured timeout
    #[error("Request timeout")]
    Timeout,

    /// Failed to connect to server
    #[error("Connection failed")]
    ConnectError(#[source] reqwest::Error),

    /// TLS handshake or certificate validation failed
    #[error("SSL error: {0}")]
    TlsError(String),

    /// Server answered with an error status
    ///
    /// [`HttpFetcher`](crate::HttpFetcher) reports error statuses as "no
    /// document"; this comes from fetchers that call `error_for_status`.
    #[error("HTTP status {0}")]
    Status(u16),

    /// Other request error
    #[error("Request failed: {0}")]
    RequestError(String),

    /// Free-form failure reported by a custom fetcher
    #[error("{0}")]
    Other(String),
}

impl FetchError {
    /// Create an error from a reqwest error
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        // Causes only: the top-level message embeds the URL
        let causes = err.source().map(error_chain).unwrap_or_default();
        let lower = causes.to_lowercase();
        if err.is_timeout() {
            FetchError::Timeout
        } else if lower.contains("certificate") || lower.contains("tls") || lower.contains("ssl")
        {
            FetchError::TlsError(causes)
        } else if err.is_connect() {
            FetchError::ConnectError(err)
        } else if let Some(status) = err.status() {
            FetchError::Status(status.as_u16())
        } else {
            FetchError::RequestError(error_chain(&err))
        }
    }

    /// Rewrite the error into the message reported for `url`
    pub fn classify(&self, url: &str) -> String {
        match self {
            FetchError::MissingUrl | FetchError::InvalidUrlScheme => self.to_string(),
            FetchError::ConnectError(_) => FailureKind::Connection.message(url),
            FetchError::Timeout => FailureKind::Timeout.message(url),
            FetchError::TlsError(_) => FailureKind::Tls.message(url),
            FetchError::Status(404) => FailureKind::NotFound.message(url),
            FetchError::Status(403) => FailureKind::Forbidden.message(url),
            FetchError::Status(code) if (500..600).contains(code) => {
                FailureKind::ServerError.message(url)
            }
            other => classify_message(&other.to_string(), url),
        }
    }
}

/// Errors raised by a content extractor
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The document could not be parsed
    #[error("Failed to parse document: {0}")]
    Parse(String),

    /// Free-form failure reported by a custom extractor
    #[error("{0}")]
    Other(String),
}

impl ExtractError {
    /// Rewrite the error into the message reported for `url`
    pub fn classify(&self, url: &str) -> String {
        classify_message(&self.to_string(), url)
    }
}

/// Known failure categories, each with a fixed message template
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Connection,
    Timeout,
    Tls,
    NotFound,
    Forbidden,
    ServerError,
}

impl FailureKind {
    /// Detect the category from a free-form error message.
    ///
    /// Checks run in a fixed order, so a message mentioning both a
    /// connection problem and a status code is reported as a connection error.
    pub fn detect(message: &str) -> Option<Self> {
        let lower = message.to_lowercase();
        if lower.contains("connection") {
            Some(FailureKind::Connection)
        } else if lower.contains("timeout") {
            Some(FailureKind::Timeout)
        } else if lower.contains("ssl") || lower.contains("certificate") {
            Some(FailureKind::Tls)
        } else if lower.contains("404") {
            Some(FailureKind::NotFound)
        } else if lower.contains("403") {
            Some(FailureKind::Forbidden)
        } else if ["500", "502", "503"].iter().any(|code| lower.contains(code)) {
            Some(FailureKind::ServerError)
        } else {
            None
        }
    }

    /// Message reported for this category
    pub fn message(self, url: &str) -> String {
        match self {
            FailureKind::Connection => format!("Connection error: unable to reach {url}"),
            FailureKind::Timeout => format!("Request timed out for {url}"),
            FailureKind::Tls => format!("SSL/TLS certificate error for {url}"),
            FailureKind::NotFound => format!("Page not found (404) at {url}"),
            FailureKind::Forbidden => format!("Access forbidden (403) at {url}"),
            FailureKind::ServerError => format!("Server error at {url}"),
        }
    }
}

/// Classify a free-form message; unmatched messages pass through unchanged
pub fn classify_message(message: &str, url: &str) -> String {
    match FailureKind::detect(message) {
        Some(kind) => kind.message(url),
        None => message.to_string(),
    }
}

/// Render an error and all of its sources as one line
fn error_chain(err: &(dyn StdError + 'static)) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        out.push_str(": ");
        out.push_str(&cause.to_string());
        source = cause.source();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "https://example.com/page";

    #[test]
    fn test_error_messages() {
        assert_eq!(FetchError::MissingUrl.to_string(), "URL is required");
        assert_eq!(
            FetchError::InvalidUrlScheme.to_string(),
            "Invalid URL: must start with http:// or https://"
        );
        assert_eq!(FetchError::Status(502).to_string(), "HTTP status 502");
    }

    #[test]
    fn test_classify_structured_errors() {
        assert_eq!(
            FetchError::Timeout.classify(URL),
            "Request timed out for https://example.com/page"
        );
        assert_eq!(
            FetchError::TlsError("invalid peer certificate".to_string()).classify(URL),
            "SSL/TLS certificate error for https://example.com/page"
        );
        assert_eq!(
            FetchError::Status(404).classify(URL),
            "Page not found (404) at https://example.com/page"
        );
        assert_eq!(
            FetchError::Status(403).classify(URL),
            "Access forbidden (403) at https://example.com/page"
        );
        assert_eq!(
            FetchError::Status(503).classify(URL),
            "Server error at https://example.com/page"
        );
        assert_eq!(
            FetchError::InvalidUrlScheme.classify(URL),
            "Invalid URL: must start with http:// or https://"
        );
    }

    #[test]
    fn test_classify_free_form_messages() {
        assert_eq!(
            FetchError::Other("HTTP Error 404: Not Found".to_string()).classify(URL),
            "Page not found (404) at https://example.com/page"
        );
        assert_eq!(
            classify_message("ConnectionError: refused", URL),
            "Connection error: unable to reach https://example.com/page"
        );
        assert_eq!(
            classify_message("read TIMEOUT", URL),
            "Request timed out for https://example.com/page"
        );
        assert_eq!(
            classify_message("bad Certificate chain", URL),
            "SSL/TLS certificate error for https://example.com/page"
        );
        assert_eq!(
            classify_message("upstream said 502", URL),
            "Server error at https://example.com/page"
        );
    }

    #[test]
    fn test_classify_order() {
        // Connection wins over a status code in the same message
        assert_eq!(
            FailureKind::detect("connection reset after 404"),
            Some(FailureKind::Connection)
        );
        assert_eq!(FailureKind::detect("403 and 404"), Some(FailureKind::NotFound));
    }

    #[test]
    fn test_unmatched_message_passes_through() {
        assert_eq!(classify_message("something odd", URL), "something odd");
        assert_eq!(
            ExtractError::Other("weird failure".to_string()).classify(URL),
            "weird failure"
        );
    }
}
