//! Crawler coordinator - crawl setup and lifetime
//!
//! This module wires the shared crawl state together and drives a crawl from
//! seed to shutdown, including:
//! - Validating configuration and binding the crawl to the seed host
//! - Emitting and queueing the seed
//! - Spawning the worker pool
//! - Deciding when the crawl has finished and winding workers down

use crate::config::{validate, Config};
use crate::crawler::fetcher::Fetcher;
use crate::crawler::frontier::Frontier;
use crate::crawler::rate_limiter::SlidingWindowLimiter;
use crate::crawler::worker::{run_worker, CrawlContext, RetryPolicy, StopSignal};
use crate::output::{CrawlOutcome, CrawlStats, CrawlSummary, LinkSink};
use crate::state::UrlSet;
use crate::url::{canonicalize, parse_seed, CrawlTarget, Resolver};
use crate::CrawlError;
use std::future::Future;
use std::sync::Arc;
use tokio::task::JoinSet;

/// Main crawler coordinator structure
pub struct Coordinator {
    context: Arc<CrawlContext>,
    seed: CrawlTarget,
    workers: usize,
    exit_when_idle: bool,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `config` - The crawler configuration
    /// * `seed_url` - The URL the crawl starts from; its host bounds the crawl
    /// * `sink` - Receives every newly discovered URL
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to run
    /// * `Err(CrawlError)` - Invalid configuration or seed, or no HTTP client
    pub fn new(config: Config, seed_url: &str, sink: Arc<dyn LinkSink>) -> Result<Self, CrawlError> {
        validate(&config)?;

        let seed_url = parse_seed(seed_url)?;
        let seed = canonicalize(&seed_url);
        let crawler = config.crawler;
        let workers = crawler.worker_count();

        let resolver = Resolver::new(seed_url, crawler.skip_prefixes.clone())?;
        let fetcher = Fetcher::new(&config.http)?;

        let context = CrawlContext {
            frontier: Frontier::new(crawler.queue_capacity, workers),
            limiter: SlidingWindowLimiter::new(
                crawler.max_requests_per_second,
                crawler.rate_window(),
            ),
            visited: UrlSet::new(),
            seen: UrlSet::new(),
            resolver,
            fetcher,
            sink,
            stats: CrawlStats::new(),
            retry: RetryPolicy::new(crawler.max_retries, crawler.retry_backoff()),
            stop: StopSignal::new(),
        };

        Ok(Self {
            context: Arc::new(context),
            seed,
            workers,
            exit_when_idle: crawler.exit_when_idle,
        })
    }

    /// Returns the canonical seed URL
    pub fn seed(&self) -> &CrawlTarget {
        &self.seed
    }

    /// Returns the number of workers the crawl will start
    pub fn worker_count(&self) -> usize {
        self.workers
    }

    /// Returns the live crawl counters
    pub fn stats(&self) -> &CrawlStats {
        &self.context.stats
    }

    /// Runs the crawl until it drains or the process is stopped
    ///
    /// Without `exit-when-idle` this never returns; callers that need a clean
    /// stop should use `run_until`.
    pub async fn run(self) -> CrawlSummary {
        self.run_until(std::future::pending()).await
    }

    /// Runs the crawl until it drains or `shutdown` resolves
    ///
    /// # Crawl Lifecycle
    ///
    /// 1. Emit the seed and queue it
    /// 2. Spawn the worker pool
    /// 3. Wait for outstanding work to reach zero, `shutdown`, or the sink
    ///    closing
    /// 4. Close the frontier and stop the workers
    ///
    /// Once drained, the crawl returns only if `exit-when-idle` is set;
    /// otherwise it stays idle until `shutdown` resolves.
    pub async fn run_until<F>(self, shutdown: F) -> CrawlSummary
    where
        F: Future<Output = ()>,
    {
        let ctx = Arc::clone(&self.context);
        tracing::info!(
            "Starting crawl of {} on host {} with {} workers ({})",
            self.seed,
            ctx.resolver.host(),
            self.workers,
            if ctx.limiter.is_unlimited() {
                "rate limiting disabled".to_string()
            } else {
                format!(
                    "at most {} requests per {:?}",
                    ctx.limiter.max_requests(),
                    ctx.limiter.window()
                )
            }
        );

        if ctx.discover(&self.seed) && !ctx.stop.is_raised() {
            ctx.frontier.push(self.seed.clone()).await;
        }

        let mut workers = JoinSet::new();
        for id in 0..self.workers {
            workers.spawn(run_worker(id, Arc::clone(&ctx)));
        }

        let exit_when_idle = self.exit_when_idle;
        let drained = async {
            ctx.frontier.wait_idle().await;
            if !exit_when_idle {
                tracing::info!(
                    "Crawl drained after {} pages, idling until shutdown",
                    ctx.stats.pages_fetched()
                );
                std::future::pending::<()>().await;
            }
        };

        // A closed sink wins over a drain that happens at the same moment
        let outcome = tokio::select! {
            biased;
            _ = ctx.stop.wait() => {
                tracing::info!("Output closed, stopping workers");
                CrawlOutcome::OutputClosed
            }
            _ = shutdown => {
                tracing::info!("Shutdown requested, stopping workers");
                CrawlOutcome::Shutdown
            }
            _ = drained => {
                tracing::info!("No work left, stopping workers");
                CrawlOutcome::Drained
            }
        };

        ctx.frontier.close();
        match outcome {
            CrawlOutcome::Drained => {
                while let Some(result) = workers.join_next().await {
                    if let Err(e) = result {
                        tracing::error!("Worker task failed: {}", e);
                    }
                }
            }
            CrawlOutcome::Shutdown | CrawlOutcome::OutputClosed => workers.shutdown().await,
        }

        ctx.stats.snapshot(outcome, ctx.visited.len())
    }
}
