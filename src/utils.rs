use anyhow::{Context, Result};
use log::{debug, warn};
use memmap2::MmapOptions;
use std::ffi::OsStr;
use std::fs::File;
use std::path::Path;
use std::process::Command;

const SIZE_UNITS: [&str; 5] = ["B", "KiB", "MiB", "GiB", "TiB"];

const MARKDOWN_EXTENSIONS: [&str; 5] = ["md", "markdown", "mdown", "mkd", "mkdn"];

fn lowercase_extension(path: &Path) -> String {
    path.extension()
        .and_then(OsStr::to_str)
        .unwrap_or("")
        .to_lowercase()
}

pub fn get_language_tag(path: &Path) -> &'static str {
    match lowercase_extension(path).as_str() {
        "rs" => "rust",
        "js" | "mjs" | "cjs" => "javascript",
        "jsx" => "jsx",
        "ts" => "typescript",
        "tsx" => "tsx",
        "py" => "python",
        "rb" => "ruby",
        "go" => "go",
        "java" => "java",
        "kt" => "kotlin",
        "c" => "c",
        "cpp" | "cc" | "cxx" | "hpp" => "cpp",
        "h" => "c",
        "cs" => "csharp",
        "sh" | "bash" => "bash",
        "html" | "htm" => "html",
        "css" => "css",
        "md" => "markdown",
        "json" => "json",
        "toml" => "toml",
        "yaml" | "yml" => "yaml",
        "xml" => "xml",
        "sql" => "sql",
        _ => "",
    }
}

/// True for the Markdown family of extensions, case-insensitive.
pub fn is_markdown(path: &Path) -> bool {
    MARKDOWN_EXTENSIONS.contains(&lowercase_extension(path).as_str())
}

/// Formats a byte count with binary units: `1023 B`, `1.0 KiB`, `3.4 MiB`.
pub fn human_size(bytes: u64) -> String {
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    if unit == 0 {
        format!("{} {}", bytes, SIZE_UNITS[0])
    } else {
        format!("{:.1} {}", value, SIZE_UNITS[unit])
    }
}

/// Minimal HTML escaping for text and double-quoted attribute values.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Reads a whole file through a memory map.
pub fn read_file_bytes(path: &Path) -> Result<Vec<u8>> {
    let file =
        File::open(path).with_context(|| format!("Failed to open file: {}", path.display()))?;

    // Zero-length files cannot be mapped on every platform.
    let len = file
        .metadata()
        .with_context(|| format!("Failed to stat file: {}", path.display()))?
        .len();
    if len == 0 {
        debug!("Empty file: {}", path.display());
        return Ok(Vec::new());
    }

    let mmap = unsafe {
        MmapOptions::new()
            .map(&file)
            .with_context(|| format!("Failed to mmap file: {}", path.display()))?
    };

    Ok(mmap.to_vec())
}

/// Decodes bytes as UTF-8, falling back to Latin-1 so every byte survives as one char.
pub fn decode_text(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(err) => {
            debug!("Invalid UTF-8, falling back to Latin-1: {}", err.utf8_error());
            err.into_bytes().iter().map(|&b| char::from(b)).collect()
        }
    }
}

/// Reads a file as text using [`decode_text`].
pub fn read_text(path: &Path) -> Result<String> {
    read_file_bytes(path).map(decode_text)
}

/// Opens `path` with the platform's default handler. Failure is only logged.
pub fn open_in_browser(path: &Path) {
    let mut command = if cfg!(target_os = "macos") {
        Command::new("open")
    } else if cfg!(target_os = "windows") {
        let mut cmd = Command::new("cmd");
        cmd.args(["/C", "start", ""]);
        cmd
    } else {
        Command::new("xdg-open")
    };

    match command.arg(path).status() {
        Ok(status) if status.success() => debug!("Opened {}", path.display()),
        Ok(status) => warn!("Browser opener exited with {status} for {}", path.display()),
        Err(err) => warn!("Could not open {} in a browser: {err}", path.display()),
    }
}
