//! Remote content repository synchronisation.
//!
//! When a remote is configured the content root is a git working copy that
//! is brought up to date before every refresh cycle:
//!
//! 1. `force_fresh` removes the working copy entirely.
//! 2. A missing working copy is cloned (`--branch <b> --single-branch`).
//! 3. An existing one is fetched and hard-reset to `origin/<b>`.
//!
//! Local edits inside the content root are discarded by step 3.

use anyhow::{bail, Context, Result};
use std::path::Path;
use std::process::Command;

use crate::config::RemoteConfig;

/// Bring `content_path` in line with the remote repository.
pub fn sync(remote: &RemoteConfig, content_path: &Path, force_fresh: bool) -> Result<()> {
    if force_fresh && content_path.exists() {
        log::info!("removing {} for a fresh clone", content_path.display());
        std::fs::remove_dir_all(content_path).with_context(|| {
            format!("Failed to remove content directory: {}", content_path.display())
        })?;
    }

    if needs_clone(content_path) {
        log::info!("cloning {} into {}", remote.url, content_path.display());
        git_clone(&remote.url, &remote.branch, content_path)?;
    } else {
        log::info!("pulling changes from {}", remote.url);
        git_pull(content_path, &remote.branch)?;
    }

    match git_head_sha(content_path) {
        Ok(sha) => log::info!("content at {}", sha),
        Err(e) => log::warn!("could not resolve content HEAD: {:#}", e),
    }
    Ok(())
}

/// A directory without a `.git` entry is not a working copy yet.
pub fn needs_clone(content_path: &Path) -> bool {
    !content_path.join(".git").exists()
}

fn git_clone(url: &str, branch: &str, dest: &Path) -> Result<()> {
    if dest.exists() {
        let is_empty = std::fs::read_dir(dest)
            .map(|mut entries| entries.next().is_none())
            .unwrap_or(false);
        if !is_empty {
            bail!(
                "Content directory {} exists but is not a git working copy",
                dest.display()
            );
        }
    }
    std::fs::create_dir_all(dest)
        .with_context(|| format!("Failed to create content directory: {}", dest.display()))?;

    let output = Command::new("git")
        .args(["clone", "--branch", branch, "--single-branch"])
        .arg(url)
        .arg(dest)
        .output()
        .with_context(|| "Failed to execute 'git clone'. Is git installed?")?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!("git clone failed: {}", stderr.trim());
    }

    Ok(())
}

fn git_pull(repo_dir: &Path, branch: &str) -> Result<()> {
    let output = Command::new("git")
        .args(["fetch", "origin", branch])
        .current_dir(repo_dir)
        .output()
        .with_context(|| "Failed to execute 'git fetch'")?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!("git fetch failed: {}", stderr.trim());
    }

    let remote_ref = format!("origin/{}", branch);
    let output = Command::new("git")
        .args(["reset", "--hard", &remote_ref])
        .current_dir(repo_dir)
        .output()
        .with_context(|| "Failed to execute 'git reset'")?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!("git reset failed: {}", stderr.trim());
    }

    Ok(())
}

fn git_head_sha(repo_dir: &Path) -> Result<String> {
    let output = Command::new("git")
        .args(["rev-parse", "HEAD"])
        .current_dir(repo_dir)
        .output()
        .with_context(|| "Failed to get HEAD SHA")?;

    if !output.status.success() {
        bail!("git rev-parse HEAD failed");
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}
