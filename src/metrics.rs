//! Metrics sink that writes measurements to the log.

use std::time::Duration;

use blog_index_core::metrics::Metrics;

#[derive(Debug, Clone, Copy, Default)]
pub struct LogMetrics;

impl Metrics for LogMetrics {
    fn indexed(&self, elapsed: Duration, topics: usize, articles: usize) {
        log::info!(
            "indexed {} topics and {} articles in {:?}",
            topics,
            articles,
            elapsed
        );
    }

    fn parse_headers(&self, elapsed: Duration) {
        log::debug!("parsed headers in {:?}", elapsed);
    }

    fn content_updated(&self, elapsed: Duration) {
        log::info!("content refresh took {:?}", elapsed);
    }
}
