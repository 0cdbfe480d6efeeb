//! Configuration module for Hostcrawl
//!
//! Configuration comes from three layers: built-in defaults, an optional TOML
//! file, and command-line overrides applied by the binary. Every layer ends in
//! the same validation pass.
//!
//! # Example
//!
//! ```no_run
//! use hostcrawl::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("hostcrawl.toml")).unwrap();
//! println!("Rate ceiling: {}", config.crawler.max_requests_per_second);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig, HttpConfig, DEFAULT_SKIP_PREFIXES};

// Re-export parser and validation functions
pub use parser::{load_config, parse_config};
pub use validation::validate;
