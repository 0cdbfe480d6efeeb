//! HTML link extraction
//!
//! This module turns a response body into the raw href values found on the
//! page. Resolution and filtering happen later, in the URL resolver.

use scraper::{Html, Selector};
use std::collections::HashSet;

/// Extracts every anchor href from an HTML document
///
/// Values are trimmed and collected into a set, so a link repeated on one
/// page is reported once. Empty values are dropped.
///
/// # Arguments
///
/// * `html` - The HTML content to parse
///
/// # Returns
///
/// The distinct raw href values, unresolved
///
/// # Example
///
/// ```
/// use hostcrawl::crawler::extract_hrefs;
///
/// let html = r#"<a href="/page">One</a><a href=" /page ">Two</a><a href="/other">Three</a>"#;
/// let hrefs = extract_hrefs(html);
/// assert_eq!(hrefs.len(), 2);
/// assert!(hrefs.contains("/page"));
/// ```
pub fn extract_hrefs(html: &str) -> HashSet<String> {
    let document = Html::parse_document(html);
    let mut hrefs = HashSet::new();

    if let Ok(a_selector) = Selector::parse("a[href]") {
        for element in document.select(&a_selector) {
            if let Some(href) = element.value().attr("href") {
                let href = href.trim();
                if !href.is_empty() {
                    hrefs.insert(href.to_string());
                }
            }
        }
    }

    hrefs
}
