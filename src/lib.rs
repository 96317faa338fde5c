//! # repo2html Library
//!
//! Flattens a source tree into one self-contained HTML page with two views:
//!
//! - a human view with a directory tree, a table of contents and one
//!   section per file (Markdown rendered, code escaped)
//! - an LLM view holding a flat `<documents>` listing of every included
//!   file, ready to paste into a model's context
//!
//! Each file is classified once ([`classify::Decision`]); both views are
//! rendered from that single record set.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use repo2html::{Config, run_repo2html};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let mut config = Config::for_repo("https://github.com/user/repo");
//!     config.output_path = Some("repo.html".into());
//!     run_repo2html(config).await?;
//!     Ok(())
//! }
//! ```
//!
//! The pipeline can also be driven without the CLI layer:
//!
//! ```rust,no_run
//! use repo2html::classify::ClassifyPolicy;
//! use repo2html::page::{PageMeta, PageRenderer};
//! use repo2html::tree::NoTree;
//! use repo2html::RenderedRepo;
//! use std::path::Path;
//!
//! let repo = RenderedRepo::scan(Path::new("."), &ClassifyPolicy::default(), &NoTree)?;
//! let meta = PageMeta {
//!     source: ".".into(),
//!     revision: "unknown".into(),
//!     generated_at: String::new(),
//! };
//! let html = PageRenderer::default().render(&meta, &repo);
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod classify;
pub mod cli;
pub mod document;
pub mod filewalker;
#[cfg(feature = "git")]
pub mod git;
pub mod page;
#[cfg(feature = "restore")]
pub mod restore;
pub mod source;
pub mod tree;
pub mod utils;
pub mod writer;

pub use classify::{ClassifyPolicy, Decision};
pub use cli::Config;
pub use filewalker::{FileRecord, collect_records};
pub use page::{PageMeta, PageRenderer, RenderStats};
#[cfg(feature = "restore")]
pub use restore::{restore_from_document, restore_from_file};

use anyhow::{Context, Result};
use chrono::Utc;
use log::info;
use std::path::{Path, PathBuf};
use tree::{ExternalTree, TreeLister, render_tree};

/// Everything the page needs from one scan. Built once, then only read.
#[derive(Debug, Clone)]
pub struct RenderedRepo {
    /// Every regular file, sorted by path.
    pub records: Vec<FileRecord>,
    pub tree: String,
    /// The LLM view.
    pub document: String,
    pub stats: RenderStats,
}

impl RenderedRepo {
    /// Scans `root`, lists its tree through `lister` and renders the machine document.
    pub fn scan(root: &Path, policy: &ClassifyPolicy, lister: &dyn TreeLister) -> Result<Self> {
        let records = collect_records(root, policy)?;
        let tree = render_tree(root, lister);
        Ok(Self::from_parts(records, tree))
    }

    pub fn from_parts(records: Vec<FileRecord>, tree: String) -> Self {
        let included: Vec<FileRecord> = records.iter().filter(|r| r.is_included()).cloned().collect();
        let document = document::render_document(&included);
        let stats = RenderStats::from_records(&records);
        Self {
            records,
            tree,
            document,
            stats,
        }
    }

    pub fn included(&self) -> impl Iterator<Item = &FileRecord> {
        self.records.iter().filter(|r| r.is_included())
    }
}

/// Acquires the repository, renders the page and writes it. Returns the output path.
pub async fn run_repo2html(config: Config) -> Result<PathBuf> {
    let locator = config
        .repo
        .as_deref()
        .context("No repository given")?;

    let snapshot = source::acquire(locator)?;
    let policy = ClassifyPolicy::new(config.max_bytes);

    info!("Scanning {}", snapshot.root.display());
    let repo = RenderedRepo::scan(&snapshot.root, &policy, &ExternalTree)?;
    info!(
        "Found {} files: {} included, {} skipped ({} binary, {} too large, {} ignored)",
        repo.stats.total,
        repo.stats.included,
        repo.stats.skipped(),
        repo.stats.binary,
        repo.stats.too_large,
        repo.stats.ignored
    );

    let meta = PageMeta {
        source: locator.to_string(),
        revision: snapshot.revision.clone(),
        generated_at: Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string(),
    };
    let html = PageRenderer::default().render(&meta, &repo);

    let output_path = config
        .output_path
        .clone()
        .unwrap_or_else(|| source::default_output_path(&snapshot.name));
    writer::write_output(&output_path, &html).await?;
    info!("Wrote {} ({})", output_path.display(), utils::human_size(html.len() as u64));

    if config.open_browser {
        utils::open_in_browser(&output_path);
    }

    Ok(output_path)
}
