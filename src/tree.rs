//! Directory tree listing.
//!
//! The external `tree` utility is preferred when it is installed; otherwise
//! the listing is built here with the same connectors.

use crate::classify::VCS_DIR;
use log::{debug, info, warn};
use std::cmp::Ordering;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

const BRANCH: &str = "├── ";
const CORNER: &str = "└── ";
const PIPE: &str = "│   ";
const BLANK: &str = "    ";

/// Something that can produce a directory listing, or decline to.
pub trait TreeLister {
    /// Returns `None` when the listing is unavailable.
    fn list(&self, root: &Path) -> Option<String>;
}

/// Runs `tree -a -I .git --noreport` in the root directory.
#[derive(Debug, Default, Clone, Copy)]
pub struct ExternalTree;

impl TreeLister for ExternalTree {
    fn list(&self, root: &Path) -> Option<String> {
        let output = Command::new("tree")
            .args(["-a", "-I", VCS_DIR, "--noreport"])
            .current_dir(root)
            .output();

        match output {
            Ok(out) if out.status.success() => {
                let text = String::from_utf8_lossy(&out.stdout).into_owned();
                if text.trim().is_empty() { None } else { Some(text) }
            }
            Ok(out) => {
                debug!("tree exited with {}", out.status);
                None
            }
            Err(err) => {
                debug!("tree unavailable: {err}");
                None
            }
        }
    }
}

/// Never lists anything, forcing the built-in fallback.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoTree;

impl TreeLister for NoTree {
    fn list(&self, _root: &Path) -> Option<String> {
        None
    }
}

/// Lists `root` through `lister`, falling back to [`fallback_tree`].
pub fn render_tree(root: &Path, lister: &dyn TreeLister) -> String {
    match lister.list(root) {
        Some(text) => text,
        None => {
            info!("External tree listing unavailable, building it in-process");
            fallback_tree(root)
        }
    }
}

/// Builds the listing without external tools.
///
/// Directories come before files, each group ordered by case-insensitive
/// name. `.git` is left out and symlinks are shown but not followed.
pub fn fallback_tree(root: &Path) -> String {
    let mut lines = vec![".".to_string()];
    walk(root, "", &mut lines);
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

struct Child {
    name: String,
    path: PathBuf,
    is_dir: bool,
}

fn sorted_children(dir: &Path) -> Vec<Child> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            warn!("Cannot list {}: {err}", dir.display());
            return Vec::new();
        }
    };

    let mut children: Vec<Child> = entries
        .filter_map(Result::ok)
        .filter(|e| e.file_name() != VCS_DIR)
        .map(|e| {
            // file_type() does not traverse symlinks, so linked dirs stay leaves.
            let is_dir = e.file_type().map(|ft| ft.is_dir()).unwrap_or(false);
            Child {
                name: e.file_name().to_string_lossy().into_owned(),
                path: e.path(),
                is_dir,
            }
        })
        .collect();

    children.sort_by(compare_children);
    children
}

fn compare_children(a: &Child, b: &Child) -> Ordering {
    b.is_dir
        .cmp(&a.is_dir)
        .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
        .then_with(|| a.name.cmp(&b.name))
}

fn walk(dir: &Path, prefix: &str, lines: &mut Vec<String>) {
    let children = sorted_children(dir);
    let last = children.len().saturating_sub(1);

    for (i, child) in children.iter().enumerate() {
        let is_last = i == last;
        let connector = if is_last { CORNER } else { BRANCH };
        lines.push(format!("{prefix}{connector}{}", child.name));

        if child.is_dir {
            let extension = if is_last { BLANK } else { PIPE };
            walk(&child.path, &format!("{prefix}{extension}"), lines);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    struct Canned(&'static str);

    impl TreeLister for Canned {
        fn list(&self, _root: &Path) -> Option<String> {
            Some(self.0.to_string())
        }
    }

    #[test]
    fn test_directories_before_files_with_corner_last() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("src")).unwrap();
        fs::write(dir.path().join("src/a.txt"), "a").unwrap();
        fs::write(dir.path().join("b.txt"), "b").unwrap();

        let tree = fallback_tree(dir.path());
        assert_eq!(tree, ".\n├── src\n│   └── a.txt\n└── b.txt\n");
    }

    #[test]
    fn test_case_insensitive_order_and_blank_continuation() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("zeta/inner")).unwrap();
        fs::write(dir.path().join("zeta/inner/x.rs"), "").unwrap();
        fs::write(dir.path().join("Beta.md"), "").unwrap();
        fs::write(dir.path().join("alpha.md"), "").unwrap();
        fs::create_dir(dir.path().join("Docs")).unwrap();

        let tree = fallback_tree(dir.path());
        let expected = "\
.
├── Docs
├── zeta
│   └── inner
│       └── x.rs
├── alpha.md
└── Beta.md
";
        assert_eq!(tree, expected);
    }

    #[test]
    fn test_last_directory_uses_blank_prefix() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("only/child")).unwrap();
        fs::write(dir.path().join("only/child/leaf.txt"), "").unwrap();

        let tree = fallback_tree(dir.path());
        assert_eq!(tree, ".\n└── only\n    └── child\n        └── leaf.txt\n");
    }

    #[test]
    fn test_vcs_dir_excluded() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();
        fs::write(dir.path().join(".git/HEAD"), "").unwrap();
        fs::write(dir.path().join(".gitignore"), "").unwrap();

        let tree = fallback_tree(dir.path());
        assert_eq!(tree, ".\n└── .gitignore\n");
    }

    #[test]
    fn test_render_tree_prefers_lister() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("file.txt"), "").unwrap();

        assert_eq!(render_tree(dir.path(), &Canned("external\n")), "external\n");
        assert_eq!(
            render_tree(dir.path(), &NoTree),
            ".\n└── file.txt\n"
        );
    }
}
