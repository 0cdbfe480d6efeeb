use crate::url::{canonicalize, CrawlTarget};
use crate::UrlError;
use url::{ParseError, Url};

/// Resolves discovered hrefs into same-host crawl targets
///
/// The resolver is bound to the seed URL for the lifetime of a crawl. Only URLs
/// whose host and explicit port match the seed pass; the scheme may differ.
#[derive(Debug, Clone)]
pub struct Resolver {
    seed: Url,
    host: String,
    port: Option<u16>,
    skip_prefixes: Vec<String>,
}

impl Resolver {
    /// Creates a resolver bound to the seed's host
    ///
    /// # Arguments
    ///
    /// * `seed` - The parsed seed URL
    /// * `skip_prefixes` - Href prefixes that are never fetchable (e.g. `mailto:`)
    pub fn new(seed: Url, skip_prefixes: Vec<String>) -> Result<Self, UrlError> {
        let host = seed
            .host_str()
            .filter(|host| !host.is_empty())
            .ok_or_else(|| UrlError::MissingHost(seed.to_string()))?
            .to_string();
        let port = seed.port();

        Ok(Self {
            seed,
            host,
            port,
            skip_prefixes: skip_prefixes
                .into_iter()
                .map(|prefix| prefix.to_ascii_lowercase())
                .collect(),
        })
    }

    /// Returns the seed URL
    pub fn seed(&self) -> &Url {
        &self.seed
    }

    /// Returns the host every crawl target must share
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Resolves a raw href found on the page at `base`
    ///
    /// # Resolution Steps
    ///
    /// 1. Trim; drop empty, fragment-only and skip-listed hrefs
    /// 2. Use the href as-is if it parses as an absolute URL, otherwise join it
    ///    onto `base`
    /// 3. Drop anything that is not `http`/`https` or leaves the seed host
    /// 4. Canonicalize
    ///
    /// Rejections are expected noise and are only traced.
    ///
    /// # Examples
    ///
    /// ```
    /// use hostcrawl::url::{parse_seed, Resolver};
    ///
    /// let seed = parse_seed("https://example.com/").unwrap();
    /// let resolver = Resolver::new(seed.clone(), vec!["mailto:".to_string()]).unwrap();
    ///
    /// let target = resolver.resolve("/a/b", &seed).unwrap();
    /// assert_eq!(target.as_str(), "https://example.com/a/b");
    ///
    /// assert!(resolver.resolve("https://other.com/x", &seed).is_none());
    /// assert!(resolver.resolve("mailto:a@b.com", &seed).is_none());
    /// ```
    pub fn resolve(&self, raw_href: &str, base: &Url) -> Option<CrawlTarget> {
        let href = raw_href.trim();

        if href.is_empty() || href.starts_with('#') {
            tracing::trace!("Skipping empty or fragment-only href {:?}", raw_href);
            return None;
        }

        if self.is_skipped(href) {
            tracing::trace!("Skipping non-fetchable href {}", href);
            return None;
        }

        let resolved = match Url::parse(href) {
            Ok(absolute) => absolute,
            Err(ParseError::RelativeUrlWithoutBase) => match base.join(href) {
                Ok(joined) => joined,
                Err(e) => {
                    tracing::trace!("Failed to resolve {} against {}: {}", href, base, e);
                    return None;
                }
            },
            Err(e) => {
                tracing::trace!("Failed to parse href {}: {}", href, e);
                return None;
            }
        };

        if resolved.scheme() != "http" && resolved.scheme() != "https" {
            tracing::trace!("Skipping non-HTTP URL {}", resolved);
            return None;
        }

        if !self.is_same_host(&resolved) {
            tracing::trace!("Skipping cross-host URL {}", resolved);
            return None;
        }

        Some(canonicalize(&resolved))
    }

    /// Checks an href against the skip list (case-insensitive)
    fn is_skipped(&self, href: &str) -> bool {
        let lowered = href.to_ascii_lowercase();
        self.skip_prefixes
            .iter()
            .any(|prefix| lowered.starts_with(prefix.as_str()))
    }

    /// Checks whether a URL stays on the seed host
    fn is_same_host(&self, url: &Url) -> bool {
        url.host_str() == Some(self.host.as_str()) && url.port() == self.port
    }
}
