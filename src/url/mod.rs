//! URL handling module for Hostcrawl
//!
//! This module provides seed parsing, canonicalization, and resolution of
//! discovered hrefs into same-host crawl targets.

mod normalize;
mod resolve;

use crate::UrlError;
use std::fmt;
use std::hash::{Hash, Hasher};
use url::Url;

// Re-export main functions
pub use normalize::canonicalize;
pub use resolve::Resolver;

/// An absolute, same-host URL in canonical form
///
/// A target has two faces. Its canonical key is the percent-decoded,
/// fragment-free serialization: it is what gets deduplicated and printed.
/// Its URL is the same address still percent-encoded, which is what gets
/// requested, because decoding `%3F` or `%2F` would point somewhere else.
///
/// Two targets are equal exactly when their canonical keys are equal.
#[derive(Debug, Clone)]
pub struct CrawlTarget {
    key: String,
    url: Url,
}

impl CrawlTarget {
    pub(crate) fn new(key: String, url: Url) -> Self {
        Self { key, url }
    }

    /// Returns the canonical key
    pub fn as_str(&self) -> &str {
        &self.key
    }

    /// Returns the encoded URL to request
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Consumes the target, returning the canonical key
    pub fn into_string(self) -> String {
        self.key
    }
}

impl PartialEq for CrawlTarget {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for CrawlTarget {}

impl Hash for CrawlTarget {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl fmt::Display for CrawlTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key)
    }
}

impl AsRef<str> for CrawlTarget {
    fn as_ref(&self) -> &str {
        &self.key
    }
}

/// Parses the seed URL that bounds the crawl
///
/// The seed must be an absolute `http` or `https` URL with a host.
///
/// # Examples
///
/// ```
/// use hostcrawl::url::parse_seed;
///
/// let seed = parse_seed("https://Example.com").unwrap();
/// assert_eq!(seed.as_str(), "https://example.com/");
///
/// assert!(parse_seed("example.com").is_err());
/// assert!(parse_seed("ftp://example.com/").is_err());
/// ```
pub fn parse_seed(raw: &str) -> Result<Url, UrlError> {
    let trimmed = raw.trim();
    let url = Url::parse(trimmed).map_err(|source| UrlError::Parse {
        url: trimmed.to_string(),
        source,
    })?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS seeds are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingHost(trimmed.to_string()));
    }

    Ok(url)
}
