//! Errors that abort a refresh cycle.
//!
//! Per-file problems (unreadable file, bad header, checksum failure) are
//! logged and degraded where they happen; only the variants here reach the
//! caller of [`Updater::update`](crate::updater::Updater::update). When one
//! is returned no receiver ran and the checksum snapshot is untouched.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, UpdateError>;

#[derive(Error, Debug)]
pub enum UpdateError {
    #[error("failed to read content directory {path}: {source}")]
    ContentRoot {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read topic directory {path}: {source}")]
    TopicDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to sync remote repository: {0:#}")]
    Remote(anyhow::Error),
}
