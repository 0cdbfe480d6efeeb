//! Worker loop
//!
//! Each worker repeatedly takes a target from the frontier, waits for the
//! rate limiter, fetches the page and feeds the links it finds back into the
//! frontier. Workers share everything through one `CrawlContext`.

use crate::crawler::fetcher::{FetchError, FetchedPage, Fetcher};
use crate::crawler::frontier::Frontier;
use crate::crawler::rate_limiter::{Admission, SlidingWindowLimiter};
use crate::output::{CrawlStats, LinkSink, OutputError};
use crate::state::UrlSet;
use crate::url::{CrawlTarget, Resolver};
use std::pin::pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

/// Longest wait between two attempts of the same fetch
const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// Fetched pages between two progress reports
const PROGRESS_INTERVAL: u64 = 10;

/// How transient fetch failures are retried
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Extra attempts after the first; zero disables retries
    pub max_retries: u32,
    /// Wait before the first retry, doubled for each further one
    pub base_backoff: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_backoff: Duration) -> Self {
        Self {
            max_retries,
            base_backoff,
        }
    }

    /// A policy that never retries
    pub fn none() -> Self {
        Self::new(0, Duration::ZERO)
    }

    /// Returns the wait before retry number `attempt` (starting at 1)
    ///
    /// # Example
    ///
    /// ```
    /// use hostcrawl::crawler::RetryPolicy;
    /// use std::time::Duration;
    ///
    /// let policy = RetryPolicy::new(3, Duration::from_millis(100));
    /// assert_eq!(policy.backoff_for(1), Duration::from_millis(100));
    /// assert_eq!(policy.backoff_for(3), Duration::from_millis(400));
    /// ```
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        self.base_backoff
            .saturating_mul(1u32 << exponent)
            .min(MAX_BACKOFF)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::none()
    }
}

/// One-shot flag that ends a crawl early from inside the worker pool
#[derive(Debug, Default)]
pub struct StopSignal {
    raised: AtomicBool,
    notify: Notify,
}

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raises the signal
    ///
    /// # Returns
    ///
    /// `true` for the call that raised it, `false` if it was already raised
    pub fn raise(&self) -> bool {
        if self.raised.swap(true, Ordering::SeqCst) {
            return false;
        }
        self.notify.notify_waiters();
        true
    }

    pub fn is_raised(&self) -> bool {
        self.raised.load(Ordering::SeqCst)
    }

    /// Waits until the signal is raised
    pub async fn wait(&self) {
        loop {
            let mut raised = pin!(self.notify.notified());
            raised.as_mut().enable();
            if self.is_raised() {
                return;
            }
            raised.await;
        }
    }
}

/// State shared by every worker of one crawl
pub struct CrawlContext {
    pub frontier: Frontier,
    pub limiter: SlidingWindowLimiter,
    /// URLs that have been dispatched for fetching
    pub visited: UrlSet,
    /// URLs that have been emitted
    pub seen: UrlSet,
    pub resolver: Resolver,
    pub fetcher: Fetcher,
    pub sink: Arc<dyn LinkSink>,
    pub stats: CrawlStats,
    pub retry: RetryPolicy,
    /// Raised when the sink can no longer accept output
    pub stop: StopSignal,
}

impl CrawlContext {
    /// Emits a target the first time it is seen
    ///
    /// # Returns
    ///
    /// `true` if the target had not been seen before
    pub fn discover(&self, target: &CrawlTarget) -> bool {
        if !self.seen.insert_if_absent(target.as_str()) {
            return false;
        }

        match self.sink.emit(target) {
            Ok(()) => self.stats.record_emitted(),
            Err(OutputError::Closed) => {
                if self.stop.raise() {
                    tracing::warn!("Output closed, stopping crawl");
                }
            }
            Err(e) => tracing::error!("Failed to emit {}: {}", target, e),
        }
        true
    }
}

/// What happened to one dequeued target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    /// The target reached a final outcome
    Handled,
    /// The rate limiter refused; the target was queued again
    Deferred(Duration),
}

/// Runs one worker until the frontier is closed
///
/// # Arguments
///
/// * `id` - Worker number, used in log messages
/// * `ctx` - State shared with the other workers
pub async fn run_worker(id: usize, ctx: Arc<CrawlContext>) {
    tracing::debug!("Worker {} started", id);

    while let Some(target) = ctx.frontier.pop().await {
        let _guard = ctx.frontier.task_guard();
        if ctx.stop.is_raised() {
            break;
        }

        if let Step::Deferred(wait) = process_target(&ctx, target).await {
            tracing::trace!("Worker {} waiting {:?} for a rate slot", id, wait);
            tokio::time::sleep(wait).await;
        }
    }

    tracing::debug!("Worker {} stopped", id);
}

/// Carries one target through rate gating, fetching and link handling
async fn process_target(ctx: &CrawlContext, target: CrawlTarget) -> Step {
    if ctx.visited.contains(target.as_str()) {
        tracing::debug!("Already visited {}, skipping", target);
        ctx.stats.record_duplicate();
        return Step::Handled;
    }

    if let Admission::RetryAfter(wait) = ctx.limiter.admit() {
        ctx.stats.record_deferral();
        ctx.frontier.push(target).await;
        return Step::Deferred(wait);
    }

    if !ctx.visited.insert_if_absent(target.as_str()) {
        tracing::debug!("Already visited {}, skipping", target);
        ctx.stats.record_duplicate();
        return Step::Handled;
    }

    let page = match fetch_with_retry(ctx, &target).await {
        Ok(page) => page,
        Err(e) => {
            tracing::warn!("Failed to fetch {}: {}", target, e);
            ctx.stats.record_failure();
            return Step::Handled;
        }
    };

    let fetched = ctx.stats.record_fetched();
    if fetched % PROGRESS_INTERVAL == 0 {
        tracing::info!(
            "Progress: {} pages fetched, {} in frontier, {:.2} pages/sec",
            fetched,
            ctx.frontier.len(),
            ctx.stats.fetch_rate()
        );
    }

    for href in &page.hrefs {
        let Some(link) = ctx.resolver.resolve(href, &page.url) else {
            continue;
        };

        ctx.discover(&link);

        // Queued even when already seen; dedup happens when it is dequeued
        if !ctx.visited.contains(link.as_str()) {
            ctx.frontier.push(link).await;
        }
    }

    Step::Handled
}

/// Fetches a target, retrying transient failures per the retry policy
async fn fetch_with_retry(
    ctx: &CrawlContext,
    target: &CrawlTarget,
) -> Result<FetchedPage, FetchError> {
    let mut attempt = 0;

    loop {
        match ctx.fetcher.fetch(target).await {
            Ok(page) => return Ok(page),
            Err(e) if e.is_transient() && attempt < ctx.retry.max_retries => {
                attempt += 1;
                let backoff = ctx.retry.backoff_for(attempt);
                tracing::debug!(
                    "Retrying {} in {:?} (attempt {}/{}): {}",
                    target,
                    backoff,
                    attempt,
                    ctx.retry.max_retries,
                    e
                );
                ctx.stats.record_retry();
                tokio::time::sleep(backoff).await;
                ctx.limiter.until_ready().await;
            }
            Err(e) => return Err(e),
        }
    }
}
