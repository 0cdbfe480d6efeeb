//! Hostcrawl main entry point
//!
//! This is the command-line interface for the Hostcrawl single-host crawler.

use anyhow::Context;
use clap::Parser;
use hostcrawl::config::{load_config, Config};
use hostcrawl::output::print_summary;
use hostcrawl::{Coordinator, StdoutSink};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Hostcrawl: a rate-limited single-host crawler
///
/// Hostcrawl starts from a seed URL, follows every link that stays on the
/// seed's host and prints each URL it discovers exactly once on standard
/// output. Diagnostics are written to standard error.
#[derive(Parser, Debug)]
#[command(name = "hostcrawl")]
#[command(version)]
#[command(about = "A rate-limited single-host crawler", long_about = None)]
struct Cli {
    /// Seed URL; only URLs on its host are crawled
    #[arg(long, value_name = "URL")]
    url: String,

    /// Global request ceiling per second (zero or negative disables limiting)
    #[arg(long, value_name = "INT", allow_negative_numbers = true)]
    max_requests_per_second: Option<i64>,

    /// Path to TOML configuration file
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Number of concurrent workers
    #[arg(long, value_name = "N")]
    workers: Option<usize>,

    /// Per-request timeout in seconds
    #[arg(long, value_name = "N")]
    timeout_secs: Option<u64>,

    /// Extra attempts for transiently failed fetches
    #[arg(long, value_name = "N")]
    max_retries: Option<u32>,

    /// Exit once every discovered URL has been handled
    #[arg(long)]
    exit_when_idle: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

impl Cli {
    /// Applies command-line overrides on top of the loaded configuration
    fn apply_overrides(&self, config: &mut Config) {
        if let Some(rate) = self.max_requests_per_second {
            config.crawler.max_requests_per_second = rate;
        }
        if let Some(workers) = self.workers {
            config.crawler.workers = Some(workers);
        }
        if let Some(timeout) = self.timeout_secs {
            config.http.timeout_secs = timeout;
        }
        if let Some(retries) = self.max_retries {
            config.crawler.max_retries = retries;
        }
        if self.exit_when_idle {
            config.crawler.exit_when_idle = true;
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            load_config(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?
        }
        None => Config::default(),
    };
    cli.apply_overrides(&mut config);

    let coordinator = Coordinator::new(config, &cli.url, Arc::new(StdoutSink))
        .with_context(|| format!("Failed to start crawl of {}", cli.url))?;

    let summary = coordinator.run_until(shutdown_signal()).await;
    print_summary(&summary);

    Ok(())
}

/// Resolves when the process receives Ctrl-C
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// Logs go to standard error; standard output carries only discovered URLs.
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("hostcrawl=info,warn"),
            1 => EnvFilter::new("hostcrawl=debug,info"),
            2 => EnvFilter::new("hostcrawl=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}
