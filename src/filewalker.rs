use crate::classify::{ClassifyPolicy, Decision, classify};
use anyhow::{Context, Result, bail};
use ignore::WalkBuilder;
use log::{debug, warn};
use std::fs;
use std::path::{Component, Path, PathBuf};

/// One regular file found under the repository root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    pub absolute_path: PathBuf,
    /// Forward-slash path relative to the root.
    pub relative_path: String,
    pub size_bytes: u64,
    pub decision: Decision,
}

impl FileRecord {
    pub fn is_included(&self) -> bool {
        self.decision.is_included()
    }
}

/// Joins the normal components of `rel` with `/` regardless of platform.
pub fn normalize_relative(rel: &Path) -> String {
    rel.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Collects and classifies every regular file under `root`.
///
/// Symlinks are neither followed nor recorded. The result is sorted by
/// relative path so repeated runs over the same tree agree. Failing to
/// list the root itself is an error; problems further down are logged
/// and skipped.
pub fn collect_records(root: &Path, policy: &ClassifyPolicy) -> Result<Vec<FileRecord>> {
    if !root.is_dir() {
        bail!("Not a directory: {}", root.display());
    }
    fs::read_dir(root).with_context(|| format!("Failed to read directory: {}", root.display()))?;

    let mut builder = WalkBuilder::new(root);

    // Every file counts, so switch off all ignore sources.
    builder
        .standard_filters(false)
        .hidden(false)
        .follow_links(false)
        .sort_by_file_path(|a, b| a.cmp(b));

    let mut records = Vec::new();

    for result in builder.build() {
        let entry = match result {
            Ok(entry) => entry,
            Err(err) => {
                warn!("Error walking path: {err}");
                continue;
            }
        };

        if !entry.file_type().is_some_and(|ft| ft.is_file()) {
            continue;
        }

        let path = entry.path();
        let rel = path.strip_prefix(root).unwrap_or(path);
        let (decision, size_bytes) = classify(path, root, policy);
        debug!("{} -> {decision}", rel.display());

        records.push(FileRecord {
            absolute_path: path.to_path_buf(),
            relative_path: normalize_relative(rel),
            size_bytes,
            decision,
        });
    }

    records.sort_by(|a, b| a.absolute_path.cmp(&b.absolute_path));
    Ok(records)
}
