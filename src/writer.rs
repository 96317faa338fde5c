use anyhow::{Context, Result};
use log::debug;
use std::path::Path;
use tokio::fs::{self, File};
use tokio::io::{AsyncWriteExt, BufWriter};

/// Writes the finished page, creating parent directories as needed.
pub async fn write_output(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create dir: {}", parent.display()))?;
    }

    let file = File::create(path)
        .await
        .with_context(|| format!("Failed to create output file: {}", path.display()))?;
    let mut writer = BufWriter::new(file);

    writer
        .write_all(contents.as_bytes())
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;
    writer.flush().await.context("Failed to flush output")?;

    debug!("Wrote {} bytes to {}", contents.len(), path.display());
    Ok(())
}
