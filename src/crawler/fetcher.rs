//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building the shared HTTP client with timeouts and user agent
//! - GET requests with status classification
//! - Handing response bodies and redirect targets to link extraction
//!
//! Redirects are never followed by the client. Every hop is a separate request
//! to the host, so a redirect target is reported as a discovered link and goes
//! through the rate limiter like any other URL.

use crate::config::HttpConfig;
use crate::crawler::parser::extract_hrefs;
use crate::url::CrawlTarget;
use reqwest::header::LOCATION;
use reqwest::redirect::Policy;
use reqwest::Client;
use std::collections::HashSet;
use thiserror::Error;
use url::Url;

/// Errors from fetching a single page
///
/// Every variant abandons the URL; `is_transient` only decides whether the
/// retry policy may try again.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request to {url} failed: {source}")]
    Transport { url: String, source: reqwest::Error },

    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("Failed to read body of {url}: {source}")]
    Body { url: String, source: reqwest::Error },
}

impl FetchError {
    /// Returns true if the same request might succeed later
    ///
    /// | Condition | Transient |
    /// |-----------|-----------|
    /// | Timeout | yes |
    /// | Connection failure | yes |
    /// | HTTP 429 / 5xx | yes |
    /// | Other HTTP status | no |
    /// | Anything else | no |
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport { source, .. } | Self::Body { source, .. } => {
                source.is_timeout() || source.is_connect()
            }
            Self::Status { status, .. } => *status == 429 || *status >= 500,
        }
    }
}

/// A successfully fetched page
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// The URL that was requested; relative hrefs resolve against it
    pub url: Url,
    /// HTTP status code
    pub status: u16,
    /// Distinct raw href values found on the page, plus any redirect target
    pub hrefs: HashSet<String>,
}

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```
/// use hostcrawl::config::HttpConfig;
/// use hostcrawl::crawler::build_http_client;
///
/// let client = build_http_client(&HttpConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &HttpConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(config.timeout())
        .connect_timeout(config.connect_timeout())
        .redirect(Policy::none())
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches pages and extracts their links
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    /// Creates a fetcher with a client built from the given configuration
    pub fn new(config: &HttpConfig) -> crate::Result<Self> {
        Ok(Self {
            client: build_http_client(config)?,
        })
    }

    /// Fetches a page and returns the hrefs found on it
    ///
    /// # Request Flow
    ///
    /// 1. GET the encoded URL, without following redirects
    /// 2. Reject any status outside 200..=399
    /// 3. Report a 3xx `Location` header as an href
    /// 4. Read the body and extract anchor hrefs
    ///
    /// # Arguments
    ///
    /// * `target` - The URL to fetch
    ///
    /// # Returns
    ///
    /// * `Ok(FetchedPage)` - The page and its distinct hrefs
    /// * `Err(FetchError)` - Transport, status or body failure
    pub async fn fetch(&self, target: &CrawlTarget) -> Result<FetchedPage, FetchError> {
        let url = target.as_str();
        tracing::debug!("Requesting {}", url);

        let response = self
            .client
            .get(target.url().clone())
            .send()
            .await
            .map_err(|source| FetchError::Transport {
                url: url.to_string(),
                source,
            })?;

        let status = response.status().as_u16();
        if !(200..=399).contains(&status) {
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }

        let location = if response.status().is_redirection() {
            response
                .headers()
                .get(LOCATION)
                .and_then(|value| value.to_str().ok())
                .map(|value| value.trim().to_string())
        } else {
            None
        };

        let body = response.text().await.map_err(|source| FetchError::Body {
            url: url.to_string(),
            source,
        })?;

        let mut hrefs = extract_hrefs(&body);
        if let Some(location) = location.filter(|location| !location.is_empty()) {
            tracing::debug!("{} redirects to {}", url, location);
            hrefs.insert(location);
        }
        tracing::debug!("Found {} distinct links on {}", hrefs.len(), url);

        Ok(FetchedPage {
            url: target.url().clone(),
            status,
            hrefs,
        })
    }
}
