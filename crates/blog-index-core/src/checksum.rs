//! Content checksums and change classification between refresh cycles.
//!
//! A [`ChecksumSnapshot`] records what each file hashed to when it was last
//! indexed. Each cycle builds a fresh snapshot through a [`ChecksumTracker`]
//! and replaces the previous one wholesale.

use std::collections::HashMap;
use std::fmt;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

/// SHA-256 digest of a file's bytes, lower-case hex.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Checksum(String);

impl Checksum {
    pub fn of_bytes(bytes: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        Self(format!("{:x}", hasher.finalize()))
    }

    /// Hash everything `reader` yields, streaming.
    pub fn of_reader<R: Read>(mut reader: R) -> io::Result<Self> {
        let mut hasher = Sha256::new();
        io::copy(&mut reader, &mut hasher)?;
        Ok(Self(format!("{:x}", hasher.finalize())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How a file compares to the previous cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    /// Path was not in the previous snapshot.
    New,
    /// Path was recorded with a different checksum.
    Updated,
    Unchanged,
}

impl Change {
    pub fn is_changed(self) -> bool {
        self != Change::Unchanged
    }
}

/// Path to checksum mapping for one completed cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChecksumSnapshot {
    entries: HashMap<PathBuf, Checksum>,
}

impl ChecksumSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &Path) -> Option<&Checksum> {
        self.entries.get(path)
    }

    pub fn classify(&self, path: &Path, checksum: &Checksum) -> Change {
        match self.entries.get(path) {
            None => Change::New,
            Some(previous) if previous != checksum => Change::Updated,
            Some(_) => Change::Unchanged,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Compares files against a previous snapshot while recording the next one.
#[derive(Debug)]
pub struct ChecksumTracker<'a> {
    previous: &'a ChecksumSnapshot,
    next: ChecksumSnapshot,
}

impl<'a> ChecksumTracker<'a> {
    pub fn new(previous: &'a ChecksumSnapshot) -> Self {
        Self {
            previous,
            next: ChecksumSnapshot::new(),
        }
    }

    /// Record `path` for this cycle and classify it.
    ///
    /// `None` means the checksum could not be computed: the file counts as
    /// unchanged and keeps whatever checksum it had last cycle, so it is
    /// neither re-emitted now nor forgotten for the next comparison.
    pub fn observe(&mut self, path: &Path, checksum: Option<Checksum>) -> Change {
        match checksum {
            Some(checksum) => {
                let change = self.previous.classify(path, &checksum);
                self.next.entries.insert(path.to_path_buf(), checksum);
                change
            }
            None => {
                if let Some(previous) = self.previous.get(path) {
                    self.next
                        .entries
                        .insert(path.to_path_buf(), previous.clone());
                }
                Change::Unchanged
            }
        }
    }

    /// The snapshot to install once the cycle completes.
    pub fn finish(self) -> ChecksumSnapshot {
        self.next
    }
}
