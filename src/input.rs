//! URL source: reading the input list and dumping failed URLs
//!
//! The input is a text file with one URL per line. Blank lines are ignored;
//! everything else is taken verbatim after trimming. Failed URLs can be
//! written back out in the same format so a follow-up run can target just
//! the leftovers.

use crate::error::{Error, Result};
use std::path::Path;

/// Read URLs from a text file, one per line
///
/// # Errors
///
/// Fails fast if the file cannot be read or contains no URLs, since a run
/// without input is always a caller mistake.
pub async fn read_urls(path: &Path) -> Result<Vec<String>> {
    let contents = tokio::fs::read_to_string(path).await.map_err(|e| {
        Error::Io(std::io::Error::new(
            e.kind(),
            format!("failed to read URL file '{}': {}", path.display(), e),
        ))
    })?;

    let urls: Vec<String> = contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect();

    if urls.is_empty() {
        return Err(Error::EmptyInput {
            path: path.to_path_buf(),
        });
    }

    tracing::info!(count = urls.len(), path = %path.display(), "loaded URLs");
    Ok(urls)
}

/// Write failed URLs to a text file, one per line
///
/// # Errors
///
/// Returns an I/O error if the file cannot be written.
pub async fn write_failed_urls(path: &Path, urls: &[String]) -> Result<()> {
    let mut contents = urls.join("\n");
    if !contents.is_empty() {
        contents.push('\n');
    }
    tokio::fs::write(path, contents).await.map_err(|e| {
        Error::Io(std::io::Error::new(
            e.kind(),
            format!("failed to write failed URLs to '{}': {}", path.display(), e),
        ))
    })?;
    tracing::warn!(count = urls.len(), path = %path.display(), "dumped failed URLs");
    Ok(())
}
