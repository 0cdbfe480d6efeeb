//! Discovery sink implementations

use crate::output::traits::{LinkSink, OutputResult};
use crate::url::CrawlTarget;
use parking_lot::Mutex;
use std::io::Write;

/// Writes each discovered URL as one line on standard output
///
/// Standard output carries nothing else; diagnostics go through `tracing`
/// to standard error.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutSink;

impl LinkSink for StdoutSink {
    fn emit(&self, target: &CrawlTarget) -> OutputResult<()> {
        let stdout = std::io::stdout();
        let mut handle = stdout.lock();
        writeln!(handle, "{}", target)?;
        handle.flush()?;
        Ok(())
    }
}

/// Collects discovered URLs in memory, in emission order
#[derive(Debug, Default)]
pub struct MemorySink {
    urls: Mutex<Vec<String>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of every URL emitted so far
    pub fn urls(&self) -> Vec<String> {
        self.urls.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.urls.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.lock().is_empty()
    }
}

impl LinkSink for MemorySink {
    fn emit(&self, target: &CrawlTarget) -> OutputResult<()> {
        self.urls.lock().push(target.to_string());
        Ok(())
    }
}
