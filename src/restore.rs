//! Restoring files from a machine document.
//!
//! Accepts either the raw `<documents>` text or a full generated page, in
//! which case the document is pulled out of the LLM view first. Only
//! available with the `restore` feature.
//!
//! Files that did not end in a newline come back with one, since the
//! document always closes content on its own line.

use anyhow::{Context, Result};
use log::{info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs;
use std::path::{Component, Path, PathBuf};

static DOCUMENT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?s)<document index="\d+">\n<source>(.*?)</source>\n<document_content( read_error="true")?>\n(.*?)</document_content>\n</document>"#,
    )
    .unwrap()
});

static TEXTAREA_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?s)<textarea id="llm-text"[^>]*>(.*?)</textarea>"#).unwrap());

fn unescape_html(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

/// The machine document inside `input`, unescaping it if `input` is a generated page.
///
/// The LLM view comes after every file section, so its textarea is the last match.
pub fn extract_document(input: &str) -> String {
    match TEXTAREA_RE.captures_iter(input).last() {
        Some(caps) => unescape_html(&caps[1]),
        None => input.to_string(),
    }
}

fn is_safe_relative(path: &Path) -> bool {
    path.components().count() > 0 && path.components().all(|c| matches!(c, Component::Normal(_)))
}

/// Writes every document in `text` below `out_dir`. Returns the paths written.
///
/// Absolute paths, `..` components and read-failure placeholders are skipped.
pub fn restore_from_document(text: &str, out_dir: &Path) -> Result<Vec<PathBuf>> {
    let document = extract_document(text);
    let mut written = Vec::new();

    for caps in DOCUMENT_RE.captures_iter(&document) {
        let source = &caps[1];
        let content = &caps[3];
        let rel = Path::new(source);

        if !is_safe_relative(rel) {
            warn!("Skipping unsafe path: {source}");
            continue;
        }
        if caps.get(2).is_some() {
            warn!("Skipping {source}: it could not be read when the document was made");
            continue;
        }

        let target = out_dir.join(rel);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create dir: {}", parent.display()))?;
        }
        fs::write(&target, content)
            .with_context(|| format!("Failed to write {}", target.display()))?;
        written.push(target);
    }

    info!("Restored {} files into {}", written.len(), out_dir.display());
    Ok(written)
}

/// Reads `input` and restores into `out_dir`, or the current directory.
pub async fn restore_from_file(input: &Path, out_dir: Option<&Path>) -> Result<Vec<PathBuf>> {
    let text = tokio::fs::read_to_string(input)
        .await
        .with_context(|| format!("Failed to read {}", input.display()))?;

    let out_dir = match out_dir {
        Some(dir) => dir.to_path_buf(),
        None => std::env::current_dir()?,
    };

    restore_from_document(&text, &out_dir)
}
