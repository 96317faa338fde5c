//! Turning the user's repository locator into a local directory.

use anyhow::{Context, Result, bail};
use log::info;
use std::fs;
use std::path::{Path, PathBuf};

/// Revision label used when the root is not a git checkout.
pub const UNKNOWN_REVISION: &str = "unknown";

/// A local directory to render, plus the labels shown in the page header.
pub struct Snapshot {
    pub root: PathBuf,
    /// Short name used for the default output file.
    pub name: String,
    pub revision: String,
    // Keeps a temporary clone alive until the snapshot is dropped.
    #[cfg(feature = "git")]
    _clone: Option<crate::git::ClonedRepo>,
}

/// True when `locator` looks like a remote URL rather than a local path.
pub fn is_git_url(locator: &str) -> bool {
    locator.contains("://") || (locator.starts_with("git@") && locator.contains(':'))
}

/// Resolves `locator`, cloning it first when it is a git URL.
pub fn acquire(locator: &str) -> Result<Snapshot> {
    if is_git_url(locator) {
        return clone_remote(locator);
    }

    let root = fs::canonicalize(locator)
        .with_context(|| format!("Repository path not found: {locator}"))?;
    if !root.is_dir() {
        bail!("Not a directory: {}", root.display());
    }

    let name = root
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("repo")
        .to_string();
    let revision = local_revision(&root);
    info!("Using local directory {} at {}", root.display(), revision);

    Ok(Snapshot {
        root,
        name,
        revision,
        #[cfg(feature = "git")]
        _clone: None,
    })
}

#[cfg(feature = "git")]
fn clone_remote(url: &str) -> Result<Snapshot> {
    let cloned = crate::git::clone_repository(url)?;
    let root = cloned.path().to_path_buf();
    let name = crate::git::repo_name_from_url(url).unwrap_or_else(|| "repo".to_string());
    let revision = local_revision(&root);

    Ok(Snapshot {
        root,
        name,
        revision,
        _clone: Some(cloned),
    })
}

#[cfg(not(feature = "git"))]
fn clone_remote(url: &str) -> Result<Snapshot> {
    bail!("Cannot clone {url}: repo2html was built without the `git` feature")
}

#[cfg(feature = "git")]
fn local_revision(root: &Path) -> String {
    crate::git::head_revision(root).unwrap_or_else(|| UNKNOWN_REVISION.to_string())
}

#[cfg(not(feature = "git"))]
fn local_revision(_root: &Path) -> String {
    UNKNOWN_REVISION.to_string()
}

/// `<name>.html`, unless `name` already carries that extension.
pub fn html_file_name(name: &str) -> String {
    if name.to_lowercase().ends_with(".html") {
        name.to_string()
    } else {
        format!("{name}.html")
    }
}

/// Where the page goes when no `--out` is given.
pub fn default_output_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(html_file_name(name))
}
