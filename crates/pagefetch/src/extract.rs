//! Content and metadata extraction
//!
//! [`ReadabilityExtractor`] isolates the main content with `dom_smoothie`
//! (a Readability port) and renders it to markdown. With `favor_recall`
//! set, a page readability cannot make sense of is rendered whole instead
//! of being reported as empty.

use crate::convert::{html_to_markdown, MarkdownOptions};
use crate::error::ExtractError;
use crate::types::{FetchUrlRequest, PageMetadata};
use dom_smoothie::{Article, Readability};
use scraper::{Html, Selector};
use tracing::{debug, warn};
use url::Url;

/// Extraction policy handed to a [`ContentExtractor`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractOptions {
    pub include_links: bool,
    pub include_images: bool,
    pub include_tables: bool,
    pub include_formatting: bool,
    /// Prefer keeping doubtful content over dropping it
    pub favor_recall: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            include_links: true,
            include_images: false,
            include_tables: true,
            include_formatting: true,
            favor_recall: true,
        }
    }
}

impl ExtractOptions {
    /// Fixed policy with the caller's link and image toggles
    pub fn for_request(req: &FetchUrlRequest) -> Self {
        Self {
            include_links: req.wants_links(),
            include_images: req.wants_images(),
            ..Default::default()
        }
    }

    fn markdown(&self, url: &str) -> MarkdownOptions {
        MarkdownOptions {
            include_links: self.include_links,
            include_images: self.include_images,
            include_tables: self.include_tables,
            include_formatting: self.include_formatting,
            base_url: Url::parse(url).ok(),
        }
    }
}

/// Trait for content extractors
pub trait ContentExtractor: Send + Sync {
    /// Unique identifier for this extractor (for logging/debugging)
    fn name(&self) -> &'static str;

    /// Extract the readable content of `html` as markdown
    ///
    /// `Ok(None)` means the page has nothing worth returning.
    fn extract(
        &self,
        html: &str,
        url: &str,
        options: &ExtractOptions,
    ) -> Result<Option<String>, ExtractError>;

    /// Extract document metadata; `None` when nothing was found
    fn extract_metadata(&self, html: &str, url: &str) -> Option<PageMetadata>;
}

/// Readability-based extractor
#[derive(Debug, Clone, Copy, Default)]
pub struct ReadabilityExtractor;

impl ReadabilityExtractor {
    pub fn new() -> Self {
        Self
    }

    fn article(&self, html: &str, url: &str) -> Result<Article, ExtractError> {
        let mut readability = Readability::new(html, Some(url), None)
            .map_err(|e| ExtractError::Parse(e.to_string()))?;
        readability
            .parse()
            .map_err(|e| ExtractError::Parse(e.to_string()))
    }
}

impl ContentExtractor for ReadabilityExtractor {
    fn name(&self) -> &'static str {
        "readability"
    }

    fn extract(
        &self,
        html: &str,
        url: &str,
        options: &ExtractOptions,
    ) -> Result<Option<String>, ExtractError> {
        let markdown_options = options.markdown(url);

        match self.article(html, url) {
            Ok(article) => {
                let markdown = html_to_markdown(&article.content, &markdown_options);
                if !markdown.trim().is_empty() {
                    return Ok(Some(markdown));
                }
                debug!(url, "Readability found no content");
            }
            Err(e) if options.favor_recall => {
                warn!(url, error = %e, "Readability failed, rendering whole document");
            }
            Err(e) => return Err(e),
        }

        if !options.favor_recall {
            return Ok(None);
        }

        let markdown = html_to_markdown(html, &markdown_options);
        Ok((!markdown.trim().is_empty()).then_some(markdown))
    }

    fn extract_metadata(&self, html: &str, url: &str) -> Option<PageMetadata> {
        let from_article = match self.article(html, url) {
            Ok(article) => PageMetadata {
                sitename: article.site_name.map(|s| s.to_string()),
                title: Some(article.title.to_string()),
                author: article.byline.map(|s| s.to_string()),
                date: article.published_time.map(|s| s.to_string()),
                description: article.excerpt.map(|s| s.to_string()),
            }
            .normalized(),
            Err(e) => {
                debug!(url, error = %e, "Readability metadata unavailable");
                PageMetadata::default()
            }
        };

        let metadata = fill_missing(from_article, head_metadata(html).normalized());
        (!metadata.is_empty()).then_some(metadata)
    }
}

/// Take each field from `primary`, falling back to `fallback`
fn fill_missing(primary: PageMetadata, fallback: PageMetadata) -> PageMetadata {
    PageMetadata {
        sitename: primary.sitename.or(fallback.sitename),
        title: primary.title.or(fallback.title),
        author: primary.author.or(fallback.author),
        date: primary.date.or(fallback.date),
        description: primary.description.or(fallback.description),
    }
}

/// Metadata from `<title>` and `<meta>` tags
fn head_metadata(html: &str) -> PageMetadata {
    let document = Html::parse_document(html);

    let meta = |keys: &[&str]| -> Option<String> {
        keys.iter().find_map(|key| {
            let selector =
                Selector::parse(&format!(r#"meta[property="{key}"], meta[name="{key}"]"#)).ok()?;
            document
                .select(&selector)
                .filter_map(|el| el.value().attr("content"))
                .map(str::trim)
                .find(|content| !content.is_empty())
                .map(str::to_string)
        })
    };

    let title = meta(&["og:title", "twitter:title"]).or_else(|| {
        let selector = Selector::parse("title").ok()?;
        document
            .select(&selector)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
    });

    PageMetadata {
        sitename: meta(&["og:site_name", "application-name"]),
        title,
        author: meta(&["author", "article:author", "dc.creator"]),
        date: meta(&["article:published_time", "date", "dc.date", "pubdate"]),
        description: meta(&["description", "og:description", "twitter:description"]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "https://example.com/post";

    const ARTICLE: &str = r#"<!DOCTYPE html>
<html>
<head>
    <title>Fallback Title</title>
    <meta name="author" content="Jane Smith">
    <meta name="description" content="An example article.">
    <meta property="og:site_name" content="My Blog">
    <meta property="article:published_time" content="2024-01-15">
</head>
<body>
    <nav><a href="/">Home</a> <a href="/about">About</a></nav>
    <article>
        <h1>Example Article Title</h1>
        <p>This is the first paragraph of the article. It contains meaningful
        content that shows how the extractor keeps the main article text while
        dropping navigation, sidebars and other boilerplate from the page.</p>
        <p>The second paragraph continues with more content, including a
        <a href="/related">related link</a>, so that the page is long enough
        for readability scoring to pick the article element as the main
        content block of this document.</p>
        <p>A third paragraph provides additional context about the subject and
        makes the article comfortably longer than the default thresholds used
        when deciding whether a candidate block is readable.</p>
    </article>
    <footer><p>Copyright 2024</p></footer>
</body>
</html>"#;

    #[test]
    fn test_extract_article_content() {
        let extractor = ReadabilityExtractor::new();
        let content = extractor
            .extract(ARTICLE, URL, &ExtractOptions::default())
            .unwrap()
            .unwrap();

        assert!(content.contains("first paragraph of the article"));
        assert!(content.contains("third paragraph"));
        assert!(!content.contains("\n\n\n"));
    }

    #[test]
    fn test_extract_respects_link_toggle() {
        let extractor = ReadabilityExtractor::new();
        let options = ExtractOptions {
            include_links: false,
            ..Default::default()
        };
        let content = extractor.extract(ARTICLE, URL, &options).unwrap().unwrap();
        assert!(content.contains("related link"));
        assert!(!content.contains("](https://example.com/related)"));
    }

    #[test]
    fn test_extract_recall_fallback_on_tiny_page() {
        let extractor = ReadabilityExtractor::new();
        let html = "<html><body><p>Hello world</p></body></html>";
        let content = extractor
            .extract(html, URL, &ExtractOptions::default())
            .unwrap()
            .unwrap();
        assert!(content.contains("Hello world"));
    }

    #[test]
    fn test_extract_recall_fallback_without_head_end_tag() {
        let extractor = ReadabilityExtractor::new();
        let html = "<html><head><title>T</title><body><p>Hello world</p></body></html>";
        let content = extractor
            .extract(html, URL, &ExtractOptions::default())
            .unwrap()
            .unwrap();
        assert!(content.contains("Hello world"));
    }

    #[test]
    fn test_extract_empty_page() {
        let extractor = ReadabilityExtractor::new();
        let html = "<html><head><title>Empty</title></head><body><script>x()</script></body></html>";
        let result = extractor.extract(html, URL, &ExtractOptions::default());
        assert!(matches!(result, Ok(None)));
    }

    #[test]
    fn test_extract_metadata() {
        let extractor = ReadabilityExtractor::new();
        let meta = extractor.extract_metadata(ARTICLE, URL).unwrap();

        assert_eq!(meta.sitename.as_deref(), Some("My Blog"));
        assert_eq!(meta.author.as_deref(), Some("Jane Smith"));
        assert!(meta.date.unwrap().starts_with("2024-01-15"));
        assert!(meta.title.is_some());
        assert!(meta.description.is_some());
    }

    #[test]
    fn test_extract_metadata_absent() {
        let extractor = ReadabilityExtractor::new();
        let html = "<html><body></body></html>";
        assert!(extractor.extract_metadata(html, URL).is_none());
    }

    #[test]
    fn test_head_metadata() {
        let meta = head_metadata(ARTICLE);
        assert_eq!(meta.title.as_deref(), Some("Fallback Title"));
        assert_eq!(meta.sitename.as_deref(), Some("My Blog"));
        assert_eq!(meta.description.as_deref(), Some("An example article."));
    }

    #[test]
    fn test_options_for_request() {
        let req = FetchUrlRequest::new(URL).include_links(false).include_images(true);
        let options = ExtractOptions::for_request(&req);
        assert!(!options.include_links);
        assert!(options.include_images);
        assert!(options.include_tables);
        assert!(options.include_formatting);
        assert!(options.favor_recall);
    }
}
