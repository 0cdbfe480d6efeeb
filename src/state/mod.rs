//! State module for tracking crawl progress
//!
//! This module provides the shared membership state that deduplicates work
//! and output during a crawl.
//!
//! # Components
//!
//! - `UrlSet`: insert-only set of canonical URLs, used twice per crawl: once as
//!   the visited set (work dedup) and once as the seen set (output dedup)

mod url_set;

// Re-export main types
pub use url_set::UrlSet;
