//! Live crawl statistics
//!
//! Counters are updated by every worker without locking and turned into a
//! `CrawlSummary` when the crawl ends.

use crate::output::traits::{CrawlOutcome, CrawlSummary};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Shared counters for a running crawl
#[derive(Debug)]
pub struct CrawlStats {
    started_at: Instant,
    pages_fetched: AtomicU64,
    fetch_failures: AtomicU64,
    retries: AtomicU64,
    urls_emitted: AtomicU64,
    duplicates_skipped: AtomicU64,
    rate_deferrals: AtomicU64,
}

impl CrawlStats {
    pub fn new() -> Self {
        Self {
            started_at: Instant::now(),
            pages_fetched: AtomicU64::new(0),
            fetch_failures: AtomicU64::new(0),
            retries: AtomicU64::new(0),
            urls_emitted: AtomicU64::new(0),
            duplicates_skipped: AtomicU64::new(0),
            rate_deferrals: AtomicU64::new(0),
        }
    }

    /// Records a successful fetch, returning the new total
    pub fn record_fetched(&self) -> u64 {
        self.pages_fetched.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn record_failure(&self) {
        self.fetch_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_retry(&self) {
        self.retries.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_emitted(&self) {
        self.urls_emitted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_duplicate(&self) {
        self.duplicates_skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_deferral(&self) {
        self.rate_deferrals.fetch_add(1, Ordering::Relaxed);
    }

    pub fn pages_fetched(&self) -> u64 {
        self.pages_fetched.load(Ordering::Relaxed)
    }

    /// Returns fetched pages per second since the crawl started
    pub fn fetch_rate(&self) -> f64 {
        let elapsed = self.started_at.elapsed().as_secs_f64();
        if elapsed <= 0.0 {
            return 0.0;
        }
        self.pages_fetched() as f64 / elapsed
    }

    /// Builds a summary from the current counter values
    pub fn snapshot(&self, outcome: CrawlOutcome, urls_visited: usize) -> CrawlSummary {
        CrawlSummary {
            outcome,
            elapsed: self.started_at.elapsed(),
            pages_fetched: self.pages_fetched.load(Ordering::Relaxed),
            fetch_failures: self.fetch_failures.load(Ordering::Relaxed),
            retries: self.retries.load(Ordering::Relaxed),
            urls_emitted: self.urls_emitted.load(Ordering::Relaxed),
            duplicates_skipped: self.duplicates_skipped.load(Ordering::Relaxed),
            rate_deferrals: self.rate_deferrals.load(Ordering::Relaxed),
            urls_visited,
        }
    }
}

impl Default for CrawlStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Logs a crawl summary on the diagnostic stream
pub fn print_summary(summary: &CrawlSummary) {
    tracing::info!(
        "Crawl finished ({:?}) after {:.1?}",
        summary.outcome,
        summary.elapsed
    );
    tracing::info!(
        "  URLs emitted: {}, URLs visited: {}",
        summary.urls_emitted,
        summary.urls_visited
    );
    tracing::info!(
        "  Pages fetched: {}, failed: {}, retries: {} ({:.1}% success)",
        summary.pages_fetched,
        summary.fetch_failures,
        summary.retries,
        summary.success_rate()
    );
    tracing::info!(
        "  Duplicates skipped: {}, rate limiter deferrals: {}",
        summary.duplicates_skipped,
        summary.rate_deferrals
    );
}
