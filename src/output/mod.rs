//! Output module for reporting crawl results
//!
//! This module handles:
//! - Emitting discovered URLs through a `LinkSink`
//! - Counting crawl events while workers run
//! - Summarizing a finished crawl

mod sinks;
pub mod stats;
mod traits;

pub use sinks::{MemorySink, StdoutSink};
pub use stats::{print_summary, CrawlStats};
pub use traits::{CrawlOutcome, CrawlSummary, LinkSink, OutputError, OutputResult};
