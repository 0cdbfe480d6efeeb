//! Crawler module for discovering same-host URLs
//!
//! This module contains the core crawling logic, including:
//! - The bounded frontier shared by all workers
//! - Global sliding-window rate limiting
//! - HTTP fetching and link extraction
//! - The worker loop and overall crawl coordination

mod coordinator;
mod fetcher;
mod frontier;
mod parser;
mod rate_limiter;
mod worker;

pub use coordinator::Coordinator;
pub use fetcher::{build_http_client, FetchError, FetchedPage, Fetcher};
pub use frontier::{Frontier, TaskGuard};
pub use parser::extract_hrefs;
pub use rate_limiter::{Admission, SlidingWindowLimiter};
pub use worker::{run_worker, CrawlContext, RetryPolicy, StopSignal};
