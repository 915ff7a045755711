//! Directory walk over the content root.
//!
//! Layout consumed:
//!
//! ```text
//! content/
//! ├── rust/
//! │   ├── README.md        ← topic file
//! │   ├── ownership.md     ← article
//! │   └── traits.md        ← article
//! └── drafts/              ← no topic file, skipped
//!     └── idea.md
//! ```
//!
//! Only immediate subdirectories of the root are topics and only files
//! directly inside a topic directory are articles. Entries are visited in
//! file-name order.

use std::io;
use std::path::{Path, PathBuf};

use blog_index_core::checksum::{Change, ChecksumSnapshot, ChecksumTracker};
use blog_index_core::delta::Delta;
use walkdir::WalkDir;

use crate::error::{Result, UpdateError};
use crate::reader::ContentReader;

/// Extension of article files.
pub const ARTICLE_EXTENSION: &str = "md";

/// Outcome of one walk: what changed, and the checksums to keep.
#[derive(Debug)]
pub struct Scan {
    pub delta: Delta,
    pub checksums: ChecksumSnapshot,
}

/// Walk `root`, compare every topic and article file against `previous`
/// and collect the changed entities.
///
/// Fails only when the root or a topic directory cannot be listed; in that
/// case nothing from the partial walk is returned.
pub fn scan(
    root: &Path,
    topic_file: &str,
    reader: &dyn ContentReader,
    previous: &ChecksumSnapshot,
) -> Result<Scan> {
    let mut tracker = ChecksumTracker::new(previous);
    let mut delta = Delta::new();

    for topic_dir in list_entries(root, |e| e.path().is_dir())
        .map_err(|source| UpdateError::ContentRoot {
            path: root.to_path_buf(),
            source,
        })?
    {
        let topic_path = topic_dir.join(topic_file);
        if !topic_path.is_file() {
            log::debug!("skipping {}: no {}", topic_dir.display(), topic_file);
            continue;
        }

        // The topic is always loaded: its resolved slug is an input to
        // every article below, changed or not.
        let topic = reader.load_topic(&topic_path);
        let topic_slug = topic.slug.clone();
        let change = observe(&mut tracker, reader, &topic_path);
        delta.push_topic(change, topic);

        let article_paths = list_entries(&topic_dir, |e| {
            e.path().is_file() && is_article(e.path(), topic_file)
        })
        .map_err(|source| UpdateError::TopicDirectory {
            path: topic_dir.clone(),
            source,
        })?;

        for article_path in article_paths {
            let change = observe(&mut tracker, reader, &article_path);
            if change.is_changed() {
                delta.push_article(change, reader.load_article(&article_path, &topic_slug));
            }
        }
    }

    Ok(Scan {
        delta,
        checksums: tracker.finish(),
    })
}

fn observe(tracker: &mut ChecksumTracker<'_>, reader: &dyn ContentReader, path: &Path) -> Change {
    let checksum = match reader.checksum(path) {
        Ok(checksum) => Some(checksum),
        Err(e) => {
            log::warn!(
                "failed to checksum {}, treating as unchanged: {}",
                path.display(),
                e
            );
            None
        }
    };
    tracker.observe(path, checksum)
}

/// Immediate children of `dir` that satisfy `keep`, sorted by file name.
///
/// `keep` sees symlinks resolved. `dir` itself must be a directory.
fn list_entries(
    dir: &Path,
    keep: impl Fn(&walkdir::DirEntry) -> bool,
) -> io::Result<Vec<PathBuf>> {
    if !std::fs::metadata(dir)?.is_dir() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{} is not a directory", dir.display()),
        ));
    }

    let mut paths = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry?;
        if keep(&entry) {
            paths.push(entry.into_path());
        }
    }
    Ok(paths)
}

fn is_article(path: &Path, topic_file: &str) -> bool {
    let is_topic_file = path
        .file_name()
        .map(|name| name == topic_file)
        .unwrap_or(false);
    let is_markdown = path
        .extension()
        .map(|ext| ext == ARTICLE_EXTENSION)
        .unwrap_or(false);
    is_markdown && !is_topic_file
}
