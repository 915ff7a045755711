//! In-memory [`ContentStore`] implementation.
//!
//! Uses `HashMap`s behind `std::sync::RwLock`. Listing order follows map
//! iteration and is unspecified.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use anyhow::Result;

use crate::models::{Article, Topic};

use super::ContentStore;

/// Articles keyed by topic slug, then article slug.
type ArticleMap = HashMap<String, HashMap<String, Article>>;

/// In-memory store, the default backend for the refresh pipeline.
pub struct InMemoryStore {
    topics: RwLock<HashMap<String, Topic>>,
    articles: RwLock<ArticleMap>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            topics: RwLock::new(HashMap::new()),
            articles: RwLock::new(HashMap::new()),
        }
    }

    pub fn topic_count(&self) -> usize {
        read(&self.topics).len()
    }

    pub fn article_count(&self) -> usize {
        read(&self.articles).values().map(HashMap::len).sum()
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

// Every mutation is a single insert, so a poisoned map is still consistent.
fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl ContentStore for InMemoryStore {
    fn store_topic(&self, topic: Topic) -> Result<()> {
        write(&self.topics).insert(topic.slug.clone(), topic);
        Ok(())
    }

    fn store_article(&self, article: Article) -> Result<()> {
        write(&self.articles)
            .entry(article.topic_slug.clone())
            .or_default()
            .insert(article.slug.clone(), article);
        Ok(())
    }

    fn all_topics(&self) -> Result<Vec<Topic>> {
        Ok(read(&self.topics).values().cloned().collect())
    }

    fn all_articles(&self) -> Result<Vec<Article>> {
        Ok(read(&self.articles)
            .values()
            .flat_map(|articles| articles.values().cloned())
            .collect())
    }

    fn articles_for_topic(&self, topic_slug: &str) -> Result<Vec<Article>> {
        Ok(read(&self.articles)
            .get(topic_slug)
            .map(|articles| articles.values().cloned().collect())
            .unwrap_or_default())
    }
}
