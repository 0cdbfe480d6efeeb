//! Output handler traits and types
//!
//! This module defines the trait interface for discovery sinks and the
//! summary returned at the end of a crawl.

use crate::url::CrawlTarget;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    /// The reader went away; nothing more can be emitted
    #[error("Output closed by reader")]
    Closed,

    #[error("IO error: {0}")]
    Io(std::io::Error),
}

impl From<std::io::Error> for OutputError {
    fn from(e: std::io::Error) -> Self {
        if e.kind() == std::io::ErrorKind::BrokenPipe {
            Self::Closed
        } else {
            Self::Io(e)
        }
    }
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Trait for discovery sinks
///
/// A sink receives every newly seen URL exactly once, at the moment it is
/// first seen. Implementations are shared by all workers and must be
/// thread-safe.
pub trait LinkSink: Send + Sync {
    /// Emits a newly discovered URL
    ///
    /// # Arguments
    ///
    /// * `target` - The canonical URL that was seen for the first time
    fn emit(&self, target: &CrawlTarget) -> OutputResult<()>;
}

/// How a crawl run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlOutcome {
    /// Every queued URL was handled and no work remains
    Drained,
    /// The crawl was stopped by a shutdown signal
    Shutdown,
    /// The sink reported that its reader is gone
    OutputClosed,
}

/// Summary statistics for a crawl
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlSummary {
    pub outcome: CrawlOutcome,
    pub elapsed: Duration,

    /// Pages fetched successfully
    pub pages_fetched: u64,
    /// URLs abandoned after a failed fetch
    pub fetch_failures: u64,
    /// Retry attempts made for transient failures
    pub retries: u64,
    /// URLs written to the sink
    pub urls_emitted: u64,
    /// Dequeued URLs dropped because they were already visited
    pub duplicates_skipped: u64,
    /// Times a worker was told to wait by the rate limiter
    pub rate_deferrals: u64,
    /// Distinct URLs dispatched for fetching
    pub urls_visited: usize,
}

impl CrawlSummary {
    /// Returns the number of URLs that reached a fetch outcome
    pub fn pages_attempted(&self) -> u64 {
        self.pages_fetched + self.fetch_failures
    }

    /// Returns the success rate as a percentage
    pub fn success_rate(&self) -> f64 {
        let attempted = self.pages_attempted();
        if attempted == 0 {
            return 0.0;
        }
        (self.pages_fetched as f64 / attempted as f64) * 100.0
    }
}
