//! Derived lookup structures over the complete entity set.
//!
//! An [`IndexSnapshot`] is built in one go from every known topic and
//! article and never modified afterwards. [`Index`] holds the current
//! snapshot behind an `Arc` and swaps in a freshly built one on each
//! reindex, so a reader sees either the old snapshot or the new one in
//! full.
//!
//! | Structure | Key | Value |
//! |-----------|-----|-------|
//! | by identifier | topic slug / (topic slug, article slug) | entity |
//! | by time | publish date | published articles, newest first |
//! | by URI | `topic/article` | article |
//! | by file | source path | URI |

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, RwLock};
use std::time::Instant;

use anyhow::Result;
use chrono::{DateTime, Utc};

use crate::metrics::Metrics;
use crate::models::{Article, Topic};
use crate::store::ContentStore;

/// One immutable generation of the index.
#[derive(Debug, Default)]
pub struct IndexSnapshot {
    topics_by_slug: HashMap<String, Arc<Topic>>,
    articles_by_slug: HashMap<String, HashMap<String, Arc<Article>>>,
    articles_by_time: Vec<Arc<Article>>,
    articles_by_uri: HashMap<String, Arc<Article>>,
    uris_by_file: HashMap<PathBuf, String>,
    indexed_at: Option<DateTime<Utc>>,
}

impl IndexSnapshot {
    /// Build every structure from the complete entity set.
    ///
    /// `now` decides which articles count as published for the by-time list.
    pub fn build(topics: Vec<Topic>, articles: Vec<Article>, now: DateTime<Utc>) -> Self {
        let mut snapshot = Self {
            indexed_at: Some(now),
            ..Self::default()
        };

        for topic in topics {
            snapshot
                .uris_by_file
                .insert(topic.file_path.clone(), topic.uri.clone());
            snapshot
                .topics_by_slug
                .insert(topic.slug.clone(), Arc::new(topic));
        }

        let now_ts = now.timestamp();
        for article in articles {
            let article = Arc::new(article);
            snapshot
                .uris_by_file
                .insert(article.file_path.clone(), article.uri.clone());
            snapshot
                .articles_by_uri
                .insert(uri_key(&article.uri).to_string(), Arc::clone(&article));
            if article.is_published_at(now_ts) {
                snapshot.articles_by_time.push(Arc::clone(&article));
            }
            snapshot
                .articles_by_slug
                .entry(article.topic_slug.clone())
                .or_default()
                .insert(article.slug.clone(), article);
        }

        // Stable: equal timestamps keep their relative input order.
        snapshot
            .articles_by_time
            .sort_by(|a, b| b.published_at.cmp(&a.published_at));

        snapshot
    }

    pub fn topic(&self, slug: &str) -> Option<Arc<Topic>> {
        self.topics_by_slug.get(slug).cloned()
    }

    pub fn article(&self, topic_slug: &str, slug: &str) -> Option<Arc<Article>> {
        self.articles_by_slug.get(topic_slug)?.get(slug).cloned()
    }

    /// Look up an article by URI; leading and trailing slashes are ignored.
    pub fn article_by_uri(&self, uri: &str) -> Option<Arc<Article>> {
        self.articles_by_uri.get(uri_key(uri)).cloned()
    }

    /// All topics in unspecified order.
    pub fn topics(&self) -> Vec<Arc<Topic>> {
        self.topics_by_slug.values().cloned().collect()
    }

    /// All articles of a topic in unspecified order; empty for unknown topics.
    pub fn articles_for_topic(&self, topic_slug: &str) -> Vec<Arc<Article>> {
        self.articles_by_slug
            .get(topic_slug)
            .map(|articles| articles.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Up to `limit` published articles, newest first.
    pub fn recent_articles(&self, limit: usize) -> Vec<Arc<Article>> {
        let end = limit.min(self.articles_by_time.len());
        self.articles_by_time[..end].to_vec()
    }

    /// URI of the entity loaded from `path`, empty when unknown.
    pub fn uri_for_file(&self, path: &Path) -> String {
        self.uris_by_file.get(path).cloned().unwrap_or_default()
    }

    pub fn indexed_at(&self) -> Option<DateTime<Utc>> {
        self.indexed_at
    }

    pub fn topic_count(&self) -> usize {
        self.topics_by_slug.len()
    }

    pub fn article_count(&self) -> usize {
        self.articles_by_uri.len()
    }
}

fn uri_key(uri: &str) -> &str {
    uri.trim_matches('/')
}

/// The serving-side index. Cheap to share behind an `Arc`.
pub struct Index {
    current: RwLock<Arc<IndexSnapshot>>,
    // Held from reading the entity set until the new snapshot is installed.
    reindexing: Mutex<()>,
    metrics: Arc<dyn Metrics>,
}

impl Index {
    /// An empty index; every lookup misses until the first reindex.
    pub fn new(metrics: Arc<dyn Metrics>) -> Self {
        Self {
            current: RwLock::new(Arc::new(IndexSnapshot::default())),
            reindexing: Mutex::new(()),
            metrics,
        }
    }

    /// Rebuild from the complete entity set and install the result.
    pub fn reindex(&self, topics: Vec<Topic>, articles: Vec<Article>) {
        self.reindex_at(topics, articles, Utc::now());
    }

    /// [`reindex`](Self::reindex) with an explicit clock.
    pub fn reindex_at(&self, topics: Vec<Topic>, articles: Vec<Article>, now: DateTime<Utc>) {
        let _guard = self.lock_reindex();
        self.install(topics, articles, now);
    }

    /// Reindex from everything `store` holds.
    ///
    /// The store is read under the reindex lock, so snapshots are installed
    /// in the order their entity sets were read.
    pub fn reindex_from_store(&self, store: &dyn ContentStore) -> Result<()> {
        let _guard = self.lock_reindex();
        let topics = store.all_topics()?;
        let articles = store.all_articles()?;
        self.install(topics, articles, Utc::now());
        Ok(())
    }

    fn install(&self, topics: Vec<Topic>, articles: Vec<Article>, now: DateTime<Utc>) {
        let started = Instant::now();
        let (topic_count, article_count) = (topics.len(), articles.len());

        let snapshot = Arc::new(IndexSnapshot::build(topics, articles, now));
        *self
            .current
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = snapshot;

        log::info!(
            "reindexed {} topics and {} articles",
            topic_count,
            article_count
        );
        self.metrics
            .indexed(started.elapsed(), topic_count, article_count);
    }

    fn lock_reindex(&self) -> MutexGuard<'_, ()> {
        self.reindexing
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// The current snapshot. Holding it keeps a consistent view across
    /// several lookups even if a reindex happens meanwhile.
    pub fn snapshot(&self) -> Arc<IndexSnapshot> {
        // The lock only guards a pointer swap, never a partial write.
        Arc::clone(
            &self
                .current
                .read()
                .unwrap_or_else(|poisoned| poisoned.into_inner()),
        )
    }

    pub fn get_topic_by_identifier(&self, slug: &str) -> Option<Arc<Topic>> {
        self.snapshot().topic(slug)
    }

    pub fn get_article_by_identifier(&self, topic_slug: &str, slug: &str) -> Option<Arc<Article>> {
        self.snapshot().article(topic_slug, slug)
    }

    pub fn get_article_by_uri(&self, uri: &str) -> Option<Arc<Article>> {
        self.snapshot().article_by_uri(uri)
    }

    pub fn get_all_topics(&self) -> Vec<Arc<Topic>> {
        self.snapshot().topics()
    }

    pub fn get_all_articles_for_topic(&self, topic_slug: &str) -> Vec<Arc<Article>> {
        self.snapshot().articles_for_topic(topic_slug)
    }

    pub fn get_recent_articles(&self, limit: usize) -> Vec<Arc<Article>> {
        self.snapshot().recent_articles(limit)
    }

    pub fn get_uri_for_file(&self, path: &Path) -> String {
        self.snapshot().uri_for_file(path)
    }

    /// When the current snapshot was built; `None` before the first reindex.
    pub fn get_last_indexed_time(&self) -> Option<DateTime<Utc>> {
        self.snapshot().indexed_at()
    }
}
