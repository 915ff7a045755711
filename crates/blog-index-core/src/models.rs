//! Core data models shared by the loader, the store and the index.
//!
//! A [`Topic`] is backed by one directory and its designated topic file;
//! an [`Article`] is any other markdown file inside that directory.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// A directory-level content category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    /// Lower-cased identifier, unique across topics.
    pub slug: String,
    /// Always `/{slug}`.
    pub uri: String,
    pub title: String,
    pub description: String,
    pub image: String,
    pub priority: i64,
    /// Unix seconds, `0` when never published.
    pub published_at: i64,
    /// Unix seconds, `0` when never updated.
    pub updated_at: i64,
    pub hidden: bool,
    /// Header keys that are not one of the recognized fields.
    pub metadata: BTreeMap<String, String>,
    /// Source file on disk.
    pub file_path: PathBuf,
}

/// A single content file owned by exactly one topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    /// Lower-cased identifier, unique within the owning topic.
    pub slug: String,
    /// Slug of the owning topic. Never used to reach back into the topic.
    pub topic_slug: String,
    /// Always `/{topic_slug}/{slug}`.
    pub uri: String,
    pub title: String,
    pub description: String,
    pub image: String,
    pub priority: i64,
    pub published_at: i64,
    pub updated_at: i64,
    pub hidden: bool,
    pub metadata: BTreeMap<String, String>,
    pub file_path: PathBuf,
}

impl Article {
    /// Published at the given instant: has a publish date, is not hidden and
    /// the publish date is not in the future.
    pub fn is_published_at(&self, now: i64) -> bool {
        self.published_at > 0 && !self.hidden && self.published_at <= now
    }

    /// [`is_published_at`](Self::is_published_at) evaluated against the wall clock.
    pub fn is_published(&self) -> bool {
        self.is_published_at(chrono::Utc::now().timestamp())
    }

    /// `(topic_slug, slug)`, unique across all articles of a snapshot.
    pub fn key(&self) -> (&str, &str) {
        (&self.topic_slug, &self.slug)
    }
}

/// Topic URI for a slug.
pub fn topic_uri(slug: &str) -> String {
    format!("/{}", slug)
}

/// Article URI for a topic slug and article slug.
pub fn article_uri(topic_slug: &str, slug: &str) -> String {
    format!("/{}/{}", topic_slug, slug)
}
