//! Storage abstraction for indexed content.
//!
//! The [`ContentStore`] trait is the backing store receivers write deltas
//! into and the [`Index`](crate::index::Index) rebuilds itself from. It
//! holds the complete entity set, not just the latest delta.
//!
//! Implementations must be `Send + Sync`: receivers write from the refresh
//! task while the serving layer may read from request tasks.

pub mod memory;

use anyhow::Result;

use crate::models::{Article, Topic};

/// Abstract backing store for topics and articles.
///
/// # Operations
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`store_topic`](ContentStore::store_topic) | Insert or replace a topic by slug |
/// | [`store_article`](ContentStore::store_article) | Insert or replace an article by `(topic_slug, slug)` |
/// | [`all_topics`](ContentStore::all_topics) | Every stored topic, unordered |
/// | [`all_articles`](ContentStore::all_articles) | Every stored article, unordered |
/// | [`articles_for_topic`](ContentStore::articles_for_topic) | Articles of one topic, unordered |
pub trait ContentStore: Send + Sync {
    /// Insert a topic, replacing any stored topic with the same slug.
    fn store_topic(&self, topic: Topic) -> Result<()>;

    /// Insert an article, replacing any stored article with the same key.
    fn store_article(&self, article: Article) -> Result<()>;

    fn all_topics(&self) -> Result<Vec<Topic>>;

    fn all_articles(&self) -> Result<Vec<Article>>;

    /// Articles whose `topic_slug` is `topic_slug`; empty when none.
    fn articles_for_topic(&self, topic_slug: &str) -> Result<Vec<Article>>;
}
