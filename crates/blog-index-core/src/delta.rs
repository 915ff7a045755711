//! The set of entities a refresh cycle found new or changed.

use crate::checksum::Change;
use crate::models::{Article, Topic};

/// New and updated entities of one refresh cycle, in discovery order.
///
/// Unchanged files never appear. Removals are not tracked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Delta {
    pub new_topics: Vec<Topic>,
    pub updated_topics: Vec<Topic>,
    pub new_articles: Vec<Article>,
    pub updated_articles: Vec<Article>,
}

impl Delta {
    pub fn new() -> Self {
        Self::default()
    }

    /// File a topic under `change`. Unchanged topics are dropped.
    pub fn push_topic(&mut self, change: Change, topic: Topic) {
        match change {
            Change::New => self.new_topics.push(topic),
            Change::Updated => self.updated_topics.push(topic),
            Change::Unchanged => {}
        }
    }

    /// File an article under `change`. Unchanged articles are dropped.
    pub fn push_article(&mut self, change: Change, article: Article) {
        match change {
            Change::New => self.new_articles.push(article),
            Change::Updated => self.updated_articles.push(article),
            Change::Unchanged => {}
        }
    }

    /// New topics followed by updated topics.
    pub fn topics(&self) -> Vec<Topic> {
        self.new_topics
            .iter()
            .chain(&self.updated_topics)
            .cloned()
            .collect()
    }

    /// New articles followed by updated articles.
    pub fn articles(&self) -> Vec<Article> {
        self.new_articles
            .iter()
            .chain(&self.updated_articles)
            .cloned()
            .collect()
    }

    pub fn topic_count(&self) -> usize {
        self.new_topics.len() + self.updated_topics.len()
    }

    pub fn article_count(&self) -> usize {
        self.new_articles.len() + self.updated_articles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.topic_count() == 0 && self.article_count() == 0
    }
}
