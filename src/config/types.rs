use serde::Deserialize;
use std::time::Duration;

/// Href prefixes that never lead to a fetchable page
pub const DEFAULT_SKIP_PREFIXES: &[&str] = &["mailto:", "tel:", "javascript:", "data:"];

/// Workers started per admitted request-per-second
const WORKERS_PER_REQUEST: i64 = 2;

/// Upper bound on the derived worker count
const MAX_DERIVED_WORKERS: i64 = 64;

/// Worker count used when rate limiting is disabled
const UNLIMITED_WORKERS: usize = 8;

/// Main configuration structure for Hostcrawl
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    pub http: HttpConfig,
}

/// Crawl engine configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Requests admitted per rate window; zero or negative disables limiting
    #[serde(rename = "max-requests-per-second")]
    pub max_requests_per_second: i64,

    /// Length of the sliding rate window (milliseconds)
    #[serde(rename = "rate-window-ms")]
    pub rate_window_ms: u64,

    /// Number of concurrent workers (derived from the rate when absent)
    pub workers: Option<usize>,

    /// Number of pending URLs the frontier holds before producers block
    #[serde(rename = "queue-capacity")]
    pub queue_capacity: usize,

    /// Return from the crawl once no work is left instead of idling
    #[serde(rename = "exit-when-idle")]
    pub exit_when_idle: bool,

    /// Extra attempts for a fetch that failed transiently
    #[serde(rename = "max-retries")]
    pub max_retries: u32,

    /// Backoff before the first retry, doubled on each further attempt (milliseconds)
    #[serde(rename = "retry-backoff-ms")]
    pub retry_backoff_ms: u64,

    /// Href prefixes that are dropped before resolution
    #[serde(rename = "skip-prefixes")]
    pub skip_prefixes: Vec<String>,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_requests_per_second: 1,
            rate_window_ms: 1000,
            workers: None,
            queue_capacity: 10_000,
            exit_when_idle: false,
            max_retries: 0,
            retry_backoff_ms: 500,
            skip_prefixes: DEFAULT_SKIP_PREFIXES
                .iter()
                .map(|prefix| prefix.to_string())
                .collect(),
        }
    }
}

impl CrawlerConfig {
    /// Returns true if the configured rate disables limiting
    pub fn is_unlimited(&self) -> bool {
        self.max_requests_per_second <= 0
    }

    /// Returns the number of workers to start
    ///
    /// An explicit `workers` value wins. Otherwise the pool scales with the
    /// rate ceiling so enough fetches are in flight to saturate it.
    pub fn worker_count(&self) -> usize {
        if let Some(workers) = self.workers {
            return workers;
        }

        if self.is_unlimited() {
            return UNLIMITED_WORKERS;
        }

        self.max_requests_per_second
            .saturating_mul(WORKERS_PER_REQUEST)
            .clamp(1, MAX_DERIVED_WORKERS) as usize
    }

    /// Returns the sliding rate window as a Duration
    pub fn rate_window(&self) -> Duration {
        Duration::from_millis(self.rate_window_ms)
    }

    /// Returns the base retry backoff as a Duration
    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }
}

/// HTTP client configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Total per-request timeout (seconds)
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,

    /// Connection establishment timeout (seconds)
    #[serde(rename = "connect-timeout-secs")]
    pub connect_timeout_secs: u64,

    /// User-Agent header sent with every request
    #[serde(rename = "user-agent")]
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            connect_timeout_secs: 5,
            user_agent: format!("hostcrawl/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.crawler.max_requests_per_second, 1);
        assert_eq!(config.crawler.rate_window(), Duration::from_secs(1));
        assert_eq!(config.crawler.max_retries, 0);
        assert!(!config.crawler.exit_when_idle);
        assert_eq!(config.http.timeout(), Duration::from_secs(10));
        assert!(config
            .crawler
            .skip_prefixes
            .contains(&"mailto:".to_string()));
    }

    #[test]
    fn test_worker_count_scales_with_rate() {
        let mut crawler = CrawlerConfig::default();
        assert_eq!(crawler.worker_count(), 2);

        crawler.max_requests_per_second = 10;
        assert_eq!(crawler.worker_count(), 20);

        crawler.max_requests_per_second = 10_000;
        assert_eq!(crawler.worker_count(), 64);
    }

    #[test]
    fn test_worker_count_unlimited() {
        let crawler = CrawlerConfig {
            max_requests_per_second: 0,
            ..CrawlerConfig::default()
        };
        assert!(crawler.is_unlimited());
        assert_eq!(crawler.worker_count(), UNLIMITED_WORKERS);
    }

    #[test]
    fn test_explicit_worker_count_wins() {
        let crawler = CrawlerConfig {
            workers: Some(3),
            max_requests_per_second: 50,
            ..CrawlerConfig::default()
        };
        assert_eq!(crawler.worker_count(), 3);
    }
}
