//! File-backed loading of topics and articles.
//!
//! [`FileReader`] opens content files, hands them to the core header parser
//! and entity constructors, and computes checksums. It never fails: a file
//! that cannot be opened is loaded as if it had no headers.

use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use blog_index_core::checksum::Checksum;
use blog_index_core::entity::{article_from_headers, topic_from_headers};
use blog_index_core::headers::{parse_headers, Headers};
use blog_index_core::metrics::{Metrics, NoopMetrics};
use blog_index_core::models::{Article, Topic};

/// What the directory walker needs to turn files into entities.
///
/// [`FileReader`] is the real implementation; tests substitute their own to
/// simulate unreadable files.
pub trait ContentReader: Send + Sync {
    /// Load the topic whose topic file is `path`.
    fn load_topic(&self, path: &Path) -> Topic;

    /// Load an article owned by the already-loaded topic `topic_slug`.
    fn load_article(&self, path: &Path, topic_slug: &str) -> Article;

    /// Content checksum of the file at `path`.
    fn checksum(&self, path: &Path) -> io::Result<Checksum>;
}

pub struct FileReader {
    metrics: Arc<dyn Metrics>,
}

impl FileReader {
    pub fn new(metrics: Arc<dyn Metrics>) -> Self {
        Self { metrics }
    }

    /// Headers of the file at `path`; empty when it has none or cannot be read.
    pub fn parse_file_headers(&self, path: &Path) -> Headers {
        log::debug!("parsing file headers: {}", path.display());
        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) => {
                log::warn!("failed to open {} for headers: {}", path.display(), e);
                return Headers::new();
            }
        };

        let started = Instant::now();
        let parsed = parse_headers(BufReader::new(file));
        self.metrics.parse_headers(started.elapsed());

        match parsed {
            Ok(block) => {
                for line in &block.malformed {
                    log::warn!("invalid header in {}: {:?}", path.display(), line);
                }
                if block.headers.is_empty() {
                    log::debug!("no headers in {}", path.display());
                }
                block.headers
            }
            Err(e) => {
                log::warn!("failed to read headers from {}: {}", path.display(), e);
                Headers::new()
            }
        }
    }
}

impl Default for FileReader {
    fn default() -> Self {
        Self::new(Arc::new(NoopMetrics))
    }
}

impl ContentReader for FileReader {
    fn load_topic(&self, path: &Path) -> Topic {
        topic_from_headers(&self.parse_file_headers(path), path)
    }

    fn load_article(&self, path: &Path, topic_slug: &str) -> Article {
        article_from_headers(&self.parse_file_headers(path), path, topic_slug)
    }

    fn checksum(&self, path: &Path) -> io::Result<Checksum> {
        Checksum::of_reader(BufReader::new(File::open(path)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tempfile::TempDir;

    #[derive(Default)]
    struct CountingMetrics {
        parses: AtomicUsize,
    }

    impl Metrics for CountingMetrics {
        fn parse_headers(&self, _elapsed: Duration) {
            self.parses.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_load_article_with_headers() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("intro.md");
        fs::write(
            &path,
            "<!--\ntitle: Getting Started\npublished: 2024-01-15\nseries: basics\n-->\n# Hello\n",
        )
        .unwrap();

        let metrics = Arc::new(CountingMetrics::default());
        let reader = FileReader::new(metrics.clone());
        let article = reader.load_article(&path, "rust");

        assert_eq!(article.slug, "intro");
        assert_eq!(article.title, "Getting Started");
        assert_eq!(article.uri, "/rust/intro");
        assert!(article.published_at > 0);
        assert_eq!(article.metadata["series"], "basics");
        assert_eq!(metrics.parses.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_file_without_header_uses_defaults() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("Guides");
        fs::create_dir(&dir).unwrap();
        let path = dir.join("README.md");
        fs::write(&path, "# Guides\n\nslug: ignored\n").unwrap();

        let topic = FileReader::default().load_topic(&path);
        assert_eq!(topic.slug, "guides");
        assert_eq!(topic.title, "Guides");
        assert!(topic.metadata.is_empty());
    }

    #[test]
    fn test_missing_file_loads_as_headerless() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("gone.md");
        let reader = FileReader::default();

        let article = reader.load_article(&path, "t");
        assert_eq!(article.slug, "gone");
        assert_eq!(article.published_at, 0);
        assert!(reader.checksum(&path).is_err());
    }

    #[test]
    fn test_checksum_tracks_content() {
        let tmp = TempDir::new().unwrap();
        let a = tmp.path().join("a.md");
        let b = tmp.path().join("b.md");
        fs::write(&a, "same bytes").unwrap();
        fs::write(&b, "same bytes").unwrap();

        let reader = FileReader::default();
        assert_eq!(reader.checksum(&a).unwrap(), reader.checksum(&b).unwrap());

        fs::write(&b, "same byteS").unwrap();
        assert_ne!(reader.checksum(&a).unwrap(), reader.checksum(&b).unwrap());
    }
}
