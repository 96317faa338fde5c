//! Per-file inclusion decisions.
//!
//! Every file gets exactly one [`Decision`]. Checks run cheapest first:
//! version-control metadata, size, extension, then a bounded read of the
//! file's first bytes.

use log::warn;
use std::ffi::OsStr;
use std::fmt;
use std::fs::{self, File};
use std::io::Read;
use std::path::{Component, Path};

/// Name of the version-control metadata directory that is never rendered.
pub const VCS_DIR: &str = ".git";

/// How many leading bytes are inspected when sniffing for binary content.
pub const SNIFF_LEN: usize = 8192;

/// Default `--max-bytes` threshold.
pub const DEFAULT_MAX_BYTES: u64 = 50 * 1024;

/// Extensions treated as binary without reading the file.
pub const BINARY_EXTENSIONS: &[&str] = &[
    // images
    "png", "jpg", "jpeg", "gif", "webp", "bmp", "svg", "ico", "pdf",
    // archives
    "zip", "tar", "gz", "bz2", "xz", "7z", "rar",
    // audio / video
    "mp3", "mp4", "mov", "avi", "mkv", "wav", "ogg", "flac",
    // fonts
    "ttf", "otf", "eot", "woff", "woff2",
    // compiled
    "so", "dll", "dylib", "class", "jar", "exe", "bin",
];

/// Outcome of classifying one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Decision {
    /// Rendered in both views.
    Included,
    Binary,
    TooLarge,
    /// Inside a `.git` directory.
    Ignored,
}

impl Decision {
    pub fn is_included(self) -> bool {
        matches!(self, Decision::Included)
    }

    /// Stable reason code.
    pub fn reason(self) -> &'static str {
        match self {
            Decision::Included => "ok",
            Decision::Binary => "binary",
            Decision::TooLarge => "too_large",
            Decision::Ignored => "ignored",
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.reason())
    }
}

/// Inputs that, together with the filesystem, fully determine a decision.
#[derive(Debug, Clone)]
pub struct ClassifyPolicy {
    pub max_bytes: u64,
    pub binary_extensions: &'static [&'static str],
}

impl ClassifyPolicy {
    pub fn new(max_bytes: u64) -> Self {
        Self {
            max_bytes,
            binary_extensions: BINARY_EXTENSIONS,
        }
    }

    fn has_binary_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(OsStr::to_str)
            .map(|ext| {
                let ext = ext.to_lowercase();
                self.binary_extensions.iter().any(|b| *b == ext)
            })
            .unwrap_or(false)
    }
}

impl Default for ClassifyPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_BYTES)
    }
}

/// True when any component of `rel_path` is the `.git` directory.
pub fn in_vcs_dir(rel_path: &Path) -> bool {
    rel_path
        .components()
        .any(|c| matches!(c, Component::Normal(name) if name == VCS_DIR))
}

/// File size, or `0` when metadata cannot be read.
pub fn file_size(path: &Path) -> u64 {
    match fs::metadata(path) {
        Ok(meta) => meta.len(),
        Err(err) => {
            warn!("Could not stat {}: {err}", path.display());
            0
        }
    }
}

/// Classifies `path` (which lives under `root`). Returns the decision and the size read.
pub fn classify(path: &Path, root: &Path, policy: &ClassifyPolicy) -> (Decision, u64) {
    let rel_path = path.strip_prefix(root).unwrap_or(path);
    let size = file_size(path);

    let decision = if in_vcs_dir(rel_path) {
        Decision::Ignored
    } else if size > policy.max_bytes {
        Decision::TooLarge
    } else if looks_binary(path, policy) {
        Decision::Binary
    } else {
        Decision::Included
    };

    (decision, size)
}

/// Extension check, then NUL and UTF-8 checks on the first [`SNIFF_LEN`] bytes.
/// An unreadable file counts as binary.
pub fn looks_binary(path: &Path, policy: &ClassifyPolicy) -> bool {
    if policy.has_binary_extension(path) {
        return true;
    }

    // One byte past the limit tells a cut-off prefix from a file that ends there.
    let mut prefix = match read_prefix(path, SNIFF_LEN + 1) {
        Ok(prefix) => prefix,
        Err(err) => {
            warn!("Prefix read failed for {}, treating as binary: {err}", path.display());
            return true;
        }
    };
    let truncated = prefix.len() > SNIFF_LEN;
    prefix.truncate(SNIFF_LEN);

    prefix_is_binary(&prefix, truncated)
}

fn prefix_is_binary(prefix: &[u8], truncated: bool) -> bool {
    if prefix.contains(&0) {
        return true;
    }

    match std::str::from_utf8(prefix) {
        Ok(_) => false,
        // error_len() == None means the input ended mid-sequence; only acceptable
        // when the file continues past the prefix.
        Err(err) => !(err.error_len().is_none() && truncated),
    }
}

fn read_prefix(path: &Path, limit: usize) -> std::io::Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(limit);
    File::open(path)?.take(limit as u64).read_to_end(&mut buf)?;
    Ok(buf)
}
