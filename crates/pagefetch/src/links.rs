//! Link extraction
//!
//! One routine serves both links-only mode and the `Page Links` section
//! appended to extracted content.

use crate::types::Link;
use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Href prefixes that never point at another page
const SKIPPED_PREFIXES: &[&str] = &["#", "javascript:", "mailto:", "tel:", "data:"];

/// Extract the links of `html`, resolved against `base_url`
///
/// Anchors whose href is empty or uses a skipped prefix are ignored. Links
/// are deduplicated by absolute URL; the first anchor wins and order of first
/// appearance is kept.
pub fn extract_links(html: &str, base_url: &str) -> Vec<Link> {
    let Ok(base) = Url::parse(base_url) else {
        return Vec::new();
    };
    let Ok(selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    let document = Html::parse_document(html);
    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for anchor in document.select(&selector) {
        let href = anchor.value().attr("href").unwrap_or_default().trim();
        if is_skipped_href(href) {
            continue;
        }

        let Ok(absolute) = base.join(href) else {
            continue;
        };
        let absolute = absolute.to_string();
        if !seen.insert(absolute.clone()) {
            continue;
        }

        links.push(Link {
            url: absolute,
            text: anchor_text(anchor.text()),
        });
    }

    links
}

/// Render links as the markdown `Page Links` section
pub fn links_section(links: &[Link]) -> String {
    let mut section = String::from("\n\n## Page Links\n\n");
    for link in links {
        section.push_str(&link.to_markdown_item());
        section.push('\n');
    }
    section
}

fn is_skipped_href(href: &str) -> bool {
    if href.is_empty() {
        return true;
    }
    let lower = href.to_ascii_lowercase();
    SKIPPED_PREFIXES
        .iter()
        .any(|prefix| lower.starts_with(prefix))
}

/// Visible text of an anchor, on a single line
fn anchor_text<'a>(parts: impl Iterator<Item = &'a str>) -> String {
    let joined: String = parts.collect();
    joined.split_whitespace().collect::<Vec<_>>().join(" ")
}
