//! Git repository support.
//!
//! Remote repositories are cloned into a temporary directory that is
//! removed when the returned [`ClonedRepo`] is dropped. Only available
//! with the `git` feature.
//!
//! # Example
//!
//! ```rust,ignore
//! use repo2html::git::clone_repository;
//!
//! let cloned = clone_repository("https://github.com/user/repo")?;
//! // cloned.path() points at the checkout until `cloned` goes out of scope
//! ```

use anyhow::{Context, Result};
use git2::{FetchOptions, RemoteCallbacks, Repository, build::RepoBuilder};
use log::{debug, info};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A shallow clone living in a temporary directory.
pub struct ClonedRepo {
    /// Dropping this deletes the checkout.
    pub temp_dir: TempDir,
    pub path: PathBuf,
}

impl ClonedRepo {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Clones the default branch of `url` (depth 1) into a fresh temporary directory.
///
/// # Errors
///
/// Fails if the temporary directory cannot be created or the clone fails
/// (bad URL, network, authentication).
pub fn clone_repository(url: &str) -> Result<ClonedRepo> {
    info!("Cloning repository: {}", url);

    let temp_dir = TempDir::new().context("Failed to create temporary directory for git clone")?;

    let name = repo_name_from_url(url).unwrap_or_else(|| "repo".to_string());
    let clone_path = temp_dir.path().join(name);
    debug!("Clone target: {}", clone_path.display());

    let mut callbacks = RemoteCallbacks::new();
    callbacks.transfer_progress(|progress| {
        if progress.received_objects() == progress.total_objects() {
            debug!(
                "Resolving deltas: {}/{}",
                progress.indexed_deltas(),
                progress.total_deltas()
            );
        } else {
            debug!(
                "Receiving objects: {}/{} ({} bytes)",
                progress.received_objects(),
                progress.total_objects(),
                progress.received_bytes()
            );
        }
        true
    });

    let mut fetch_opts = FetchOptions::new();
    fetch_opts.remote_callbacks(callbacks);
    fetch_opts.depth(1);

    RepoBuilder::new()
        .fetch_options(fetch_opts)
        .clone(url, &clone_path)
        .with_context(|| format!("Failed to clone repository: {}", url))?;

    info!("Clone complete: {}", clone_path.display());

    Ok(ClonedRepo {
        temp_dir,
        path: clone_path,
    })
}

/// Commit id of `HEAD` if `path` is the root of a git repository with at least one commit.
pub fn head_revision(path: &Path) -> Option<String> {
    let repo = match Repository::open(path) {
        Ok(repo) => repo,
        Err(err) => {
            debug!("No git repository at {}: {}", path.display(), err.message());
            return None;
        }
    };

    let commit = repo.head().ok()?.peel_to_commit().ok()?;
    Some(commit.id().to_string())
}

/// Extracts the repository name from a git URL.
///
/// ```rust,ignore
/// assert_eq!(repo_name_from_url("https://github.com/user/repo.git"), Some("repo".into()));
/// assert_eq!(repo_name_from_url("git@github.com:user/repo.git"), Some("repo".into()));
/// ```
pub fn repo_name_from_url(url: &str) -> Option<String> {
    let url = url.trim_end_matches('/');
    let path = if url.contains("://") {
        url.rsplit('/').next()?
    } else if url.contains(':') {
        url.rsplit(':').next()?.rsplit('/').next()?
    } else {
        return None;
    };

    let name = path.strip_suffix(".git").unwrap_or(path);

    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}
