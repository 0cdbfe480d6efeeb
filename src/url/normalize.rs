use crate::url::CrawlTarget;
use url::Url;

/// Converts a parsed URL into its canonical crawl target
///
/// # Canonicalization Steps
///
/// 1. Drop the fragment (`#...`), which never changes the fetched resource
/// 2. Serialize; parsing already lowercased the host, removed default
///    ports and resolved dot segments
/// 3. Percent-decode the serialization so that `/a%20b` and `/a b` share a key
///
/// If the decoded bytes are not valid UTF-8 the encoded serialization is kept.
/// The target keeps the encoded URL alongside the key for fetching.
///
/// # Examples
///
/// ```
/// use hostcrawl::url::canonicalize;
/// use url::Url;
///
/// let url = Url::parse("https://EXAMPLE.com:443/a%20b#top").unwrap();
/// assert_eq!(canonicalize(&url).as_str(), "https://example.com/a b");
/// ```
pub fn canonicalize(url: &Url) -> CrawlTarget {
    let mut url = url.clone();
    url.set_fragment(None);

    let serialized = url.as_str();
    let canonical = match urlencoding::decode(serialized) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => serialized.to_string(),
    };

    CrawlTarget::new(canonical, url)
}
