//! TOML configuration.
//!
//! ```toml
//! [content]
//! path = "./content"
//! topic_file = "README.md"
//!
//! [remote]
//! url = "https://example.com/blog-content.git"
//! branch = "main"
//!
//! [refresh]
//! interval_secs = 300
//! reindex_at = "00:01:00"
//!
//! [site]
//! host = "https://blog.example.com"
//! secret = "change-me"
//!
//! [log]
//! level = "info"
//! ```

use anyhow::{Context, Result};
use chrono::NaiveTime;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub content: ContentConfig,
    #[serde(default)]
    pub remote: Option<RemoteConfig>,
    #[serde(default)]
    pub refresh: RefreshConfig,
    #[serde(default)]
    pub site: Option<SiteConfig>,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ContentConfig {
    /// Content root. Also the clone target when a remote is configured.
    pub path: PathBuf,
    /// File name that marks a directory as a topic.
    #[serde(default = "default_topic_file")]
    pub topic_file: String,
}

fn default_topic_file() -> String {
    "README.md".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct RemoteConfig {
    pub url: String,
    #[serde(default = "default_branch")]
    pub branch: String,
}

fn default_branch() -> String {
    "main".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct RefreshConfig {
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    /// Daily wall-clock time for the scheduled reindex, `HH:MM` or `HH:MM:SS`.
    #[serde(default = "default_reindex_at")]
    pub reindex_at: String,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            reindex_at: default_reindex_at(),
        }
    }
}

fn default_interval_secs() -> u64 {
    300
}
fn default_reindex_at() -> String {
    "00:01:00".to_string()
}

impl RefreshConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn reindex_time(&self) -> Result<NaiveTime> {
        parse_time_of_day(&self.reindex_at)
    }
}

/// Blog front-end whose page cache is revalidated after content changes.
#[derive(Debug, Deserialize, Clone)]
pub struct SiteConfig {
    pub host: String,
    pub secret: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LogConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// A config with every default and the given content root.
    pub fn minimal(content_path: &Path) -> Self {
        Self {
            content: ContentConfig {
                path: content_path.to_path_buf(),
                topic_file: default_topic_file(),
            },
            remote: None,
            refresh: RefreshConfig::default(),
            site: None,
            log: LogConfig::default(),
        }
    }
}

pub fn parse_time_of_day(value: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(value, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
        .with_context(|| format!("Invalid time of day '{}', expected HH:MM[:SS]", value))
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config = parse_config(&content)?;
    validate(&config)?;
    Ok(config)
}

pub fn parse_config(content: &str) -> Result<Config> {
    toml::from_str(content).with_context(|| "Failed to parse config file")
}

pub fn validate(config: &Config) -> Result<()> {
    let topic_file = &config.content.topic_file;
    if topic_file.is_empty() {
        anyhow::bail!("content.topic_file must not be empty");
    }
    if topic_file.contains('/') || topic_file.contains('\\') {
        anyhow::bail!("content.topic_file must be a file name, got '{}'", topic_file);
    }

    if config.refresh.interval_secs == 0 {
        anyhow::bail!("refresh.interval_secs must be > 0");
    }
    config.refresh.reindex_time()?;

    if let Some(remote) = &config.remote {
        if remote.url.trim().is_empty() {
            anyhow::bail!("remote.url must not be empty");
        }
    }

    Ok(())
}
