//! The refresh entry point.
//!
//! An [`Updater`] owns the checksum snapshot of the last successful cycle.
//! Each [`update`](Updater::update):
//!
//! 1. syncs the remote repository, if one is configured;
//! 2. walks the content root against the previous snapshot;
//! 3. installs the new snapshot;
//! 4. calls every receiver, in registration order, with the changed
//!    topics and articles.
//!
//! Cycles are serialised: a second caller blocks until the running cycle,
//! receivers included, has finished.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;

use blog_index_core::checksum::ChecksumSnapshot;
use blog_index_core::delta::Delta;
use blog_index_core::metrics::{Metrics, NoopMetrics};
use blog_index_core::models::{Article, Topic};

use crate::config::{Config, RemoteConfig};
use crate::error::{Result, UpdateError};
use crate::reader::{ContentReader, FileReader};
use crate::remote;
use crate::walker;

/// Callback invoked with each cycle's changed topics and articles.
pub type Receiver = Box<dyn Fn(&[Topic], &[Article]) + Send + Sync>;

pub struct Updater {
    content_path: PathBuf,
    topic_file: String,
    remote: Option<RemoteConfig>,
    reader: Arc<dyn ContentReader>,
    metrics: Arc<dyn Metrics>,
    receivers: Vec<Receiver>,
    checksums: Mutex<ChecksumSnapshot>,
}

impl Updater {
    pub fn new(content_path: impl Into<PathBuf>, topic_file: impl Into<String>) -> Self {
        Self {
            content_path: content_path.into(),
            topic_file: topic_file.into(),
            remote: None,
            reader: Arc::new(FileReader::default()),
            metrics: Arc::new(NoopMetrics),
            receivers: Vec::new(),
            checksums: Mutex::new(ChecksumSnapshot::new()),
        }
    }

    /// Content root, topic file and remote taken from `config`.
    pub fn from_config(config: &Config) -> Self {
        let updater = Self::new(&config.content.path, &config.content.topic_file);
        match &config.remote {
            Some(remote) => updater.with_remote(remote.clone()),
            None => updater,
        }
    }

    pub fn with_remote(mut self, remote: RemoteConfig) -> Self {
        self.remote = Some(remote);
        self
    }

    pub fn with_reader(mut self, reader: Arc<dyn ContentReader>) -> Self {
        self.reader = reader;
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<dyn Metrics>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn with_receiver(mut self, receiver: Receiver) -> Self {
        self.receivers.push(receiver);
        self
    }

    pub fn register_receiver(&mut self, receiver: Receiver) {
        self.receivers.push(receiver);
    }

    pub fn content_path(&self) -> &Path {
        &self.content_path
    }

    /// Number of files recorded by the last successful cycle.
    pub fn tracked_files(&self) -> usize {
        self.lock_checksums().len()
    }

    /// Run one refresh cycle and return its delta.
    ///
    /// `force_fresh` re-clones the remote (when configured) and compares
    /// against an empty snapshot, so every entity is reported as new.
    ///
    /// On error nothing is delivered to receivers and the previous snapshot
    /// stays in place.
    pub fn update(&self, force_fresh: bool) -> Result<Delta> {
        let started = Instant::now();
        let result = self.run_cycle(force_fresh);
        self.metrics.content_updated(started.elapsed());
        result
    }

    fn run_cycle(&self, force_fresh: bool) -> Result<Delta> {
        // Held for the whole cycle so cycles never overlap.
        let mut checksums = self.lock_checksums();

        if let Some(remote) = &self.remote {
            remote::sync(remote, &self.content_path, force_fresh).map_err(UpdateError::Remote)?;
        }

        let empty = ChecksumSnapshot::new();
        let previous = if force_fresh { &empty } else { &*checksums };
        let scan = walker::scan(
            &self.content_path,
            &self.topic_file,
            self.reader.as_ref(),
            previous,
        )?;
        *checksums = scan.checksums;

        let delta = scan.delta;
        log::info!(
            "content updated: {} new / {} updated topics, {} new / {} updated articles",
            delta.new_topics.len(),
            delta.updated_topics.len(),
            delta.new_articles.len(),
            delta.updated_articles.len()
        );

        let topics = delta.topics();
        let articles = delta.articles();
        for receiver in &self.receivers {
            receiver(&topics, &articles);
        }

        Ok(delta)
    }

    fn lock_checksums(&self) -> MutexGuard<'_, ChecksumSnapshot> {
        // The snapshot is only ever replaced whole, never left half-written.
        self.checksums
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    #[test]
    fn test_receivers_run_in_order_with_delta() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("rust")).unwrap();
        fs::write(tmp.path().join("rust/README.md"), "topic").unwrap();
        fs::write(tmp.path().join("rust/a.md"), "a").unwrap();

        let calls = Arc::new(Mutex::new(Vec::new()));
        let first = Arc::clone(&calls);
        let second = Arc::clone(&calls);
        let updater = Updater::new(tmp.path(), "README.md")
            .with_receiver(Box::new(move |topics, articles| {
                first
                    .lock()
                    .unwrap()
                    .push(("first", topics.len(), articles.len()));
            }))
            .with_receiver(Box::new(move |topics, articles| {
                second
                    .lock()
                    .unwrap()
                    .push(("second", topics.len(), articles.len()));
            }));

        updater.update(false).unwrap();
        updater.update(false).unwrap();

        let calls = calls.lock().unwrap();
        assert_eq!(
            *calls,
            vec![
                ("first", 1, 1),
                ("second", 1, 1),
                ("first", 0, 0),
                ("second", 0, 0),
            ]
        );
    }

    #[test]
    fn test_failed_cycle_keeps_snapshot_and_skips_receivers() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("content");
        fs::create_dir_all(root.join("rust")).unwrap();
        fs::write(root.join("rust/README.md"), "topic").unwrap();

        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let updater = Updater::new(&root, "README.md").with_receiver(Box::new(move |_, _| {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        updater.update(false).unwrap();
        assert_eq!(updater.tracked_files(), 1);

        fs::rename(&root, tmp.path().join("moved")).unwrap();
        let err = updater.update(false).unwrap_err();
        assert!(matches!(err, UpdateError::ContentRoot { .. }));
        assert_eq!(updater.tracked_files(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_force_fresh_reports_everything_as_new() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("go")).unwrap();
        fs::write(tmp.path().join("go/README.md"), "topic").unwrap();
        fs::write(tmp.path().join("go/a.md"), "a").unwrap();

        let updater = Updater::new(tmp.path(), "README.md");
        updater.update(false).unwrap();
        assert!(updater.update(false).unwrap().is_empty());

        let delta = updater.update(true).unwrap();
        assert_eq!(delta.new_topics.len(), 1);
        assert_eq!(delta.new_articles.len(), 1);
        assert!(delta.updated_articles.is_empty());
    }

    #[test]
    fn test_root_replaced_by_file_keeps_snapshot() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("content");
        fs::create_dir_all(root.join("go")).unwrap();
        fs::write(root.join("go/README.md"), "topic").unwrap();
        fs::write(root.join("go/a.md"), "a").unwrap();

        let updater = Updater::new(&root, "README.md");
        updater.update(false).unwrap();

        fs::remove_dir_all(&root).unwrap();
        fs::write(&root, "oops").unwrap();
        let err = updater.update(false).unwrap_err();
        assert!(matches!(err, UpdateError::ContentRoot { .. }));
        assert_eq!(updater.tracked_files(), 2);
    }
}
