//! Construction of [`Topic`]s and [`Article`]s from parsed headers.
//!
//! Recognized keys map onto typed fields; anything else lands in the
//! entity's metadata map unchanged. Unparsable values degrade to their
//! defaults instead of failing the load.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::NaiveDate;

use crate::headers::Headers;
use crate::models::{article_uri, topic_uri, Article, Topic};

/// Date format accepted by the `published` and `updated` headers.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Fields shared by topics and articles.
#[derive(Debug, Default)]
struct CommonFields {
    slug: String,
    title: String,
    description: String,
    image: String,
    priority: i64,
    published_at: i64,
    updated_at: i64,
    hidden: bool,
    metadata: BTreeMap<String, String>,
}

impl CommonFields {
    fn from_headers(headers: &Headers, path: &Path) -> Self {
        let mut fields = Self::default();
        for (key, value) in headers {
            match key.as_str() {
                "slug" => fields.slug = value.to_lowercase(),
                "title" => fields.title = value.clone(),
                "description" => fields.description = value.clone(),
                "image" => fields.image = value.clone(),
                "priority" => fields.priority = value.parse().unwrap_or(0),
                "published" => fields.published_at = date_header(value, key, path),
                "updated" => fields.updated_at = date_header(value, key, path),
                "hidden" => fields.hidden = value == "true",
                _ => {
                    fields.metadata.insert(key.clone(), value.clone());
                }
            }
        }
        fields
    }

    /// Fill slug and title from `base_name` when the headers left them empty.
    fn apply_defaults(&mut self, base_name: &str) {
        if self.slug.is_empty() {
            self.slug = base_name.to_lowercase();
        }
        if self.title.is_empty() {
            self.title = base_name.to_string();
        }
    }
}

/// Build a topic from the headers of its topic file.
///
/// Slug and title default to the name of the directory holding `file_path`.
pub fn topic_from_headers(headers: &Headers, file_path: &Path) -> Topic {
    let mut fields = CommonFields::from_headers(headers, file_path);
    fields.apply_defaults(&topic_base_name(file_path));

    Topic {
        uri: topic_uri(&fields.slug),
        slug: fields.slug,
        title: fields.title,
        description: fields.description,
        image: fields.image,
        priority: fields.priority,
        published_at: fields.published_at,
        updated_at: fields.updated_at,
        hidden: fields.hidden,
        metadata: fields.metadata,
        file_path: file_path.to_path_buf(),
    }
}

/// Build an article owned by the topic whose resolved slug is `topic_slug`.
///
/// Slug and title default to the file name without its `.md` extension.
pub fn article_from_headers(headers: &Headers, file_path: &Path, topic_slug: &str) -> Article {
    let mut fields = CommonFields::from_headers(headers, file_path);
    fields.apply_defaults(&article_base_name(file_path));

    Article {
        uri: article_uri(topic_slug, &fields.slug),
        slug: fields.slug,
        topic_slug: topic_slug.to_string(),
        title: fields.title,
        description: fields.description,
        image: fields.image,
        priority: fields.priority,
        published_at: fields.published_at,
        updated_at: fields.updated_at,
        hidden: fields.hidden,
        metadata: fields.metadata,
        file_path: file_path.to_path_buf(),
    }
}

/// Convert a `YYYY-MM-DD` date to unix seconds at midnight UTC.
pub fn parse_date(value: &str) -> Option<i64> {
    let date = NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).ok()?;
    Some(date.and_hms_opt(0, 0, 0)?.and_utc().timestamp())
}

fn date_header(value: &str, key: &str, path: &Path) -> i64 {
    parse_date(value).unwrap_or_else(|| {
        log::warn!(
            "invalid {} date '{}' in {}, treating as unset",
            key,
            value,
            path.display()
        );
        0
    })
}

/// Name of the directory containing a topic file.
pub fn topic_base_name(file_path: &Path) -> String {
    file_path
        .parent()
        .and_then(|dir| dir.file_name())
        .map(|name| strip_md(&name.to_string_lossy()).to_string())
        .unwrap_or_default()
}

/// File name of an article without the `.md` extension.
pub fn article_base_name(file_path: &Path) -> String {
    file_path
        .file_name()
        .map(|name| strip_md(&name.to_string_lossy()).to_string())
        .unwrap_or_default()
}

fn strip_md(name: &str) -> &str {
    name.strip_suffix(".md").unwrap_or(name)
}
