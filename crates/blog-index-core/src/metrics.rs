//! Metrics sink used by the reader, updater and index.

use std::time::Duration;

/// Receives timing and count measurements.
///
/// Every method defaults to doing nothing so sinks only implement what they
/// care about.
pub trait Metrics: Send + Sync {
    /// A reindex finished over `topics` topics and `articles` articles.
    fn indexed(&self, _elapsed: Duration, _topics: usize, _articles: usize) {}

    /// One file's header block was parsed.
    fn parse_headers(&self, _elapsed: Duration) {}

    /// A refresh cycle finished, successfully or not.
    fn content_updated(&self, _elapsed: Duration) {}
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMetrics;

impl Metrics for NoopMetrics {}
