//! Batch input: one URL per line.

use std::path::Path;

use crate::ConfigError;

/// Parses a newline-delimited URL list.
///
/// Lines are trimmed; blank lines and lines starting with `#` are skipped.
#[must_use]
pub fn parse_url_list(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

/// Reads and parses a URL list file.
///
/// # Errors
///
/// Returns [`ConfigError::UrlListIo`] if the file cannot be read.
pub fn load_url_list(path: &Path) -> Result<Vec<String>, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::UrlListIo {
        path: path.display().to_string(),
        source: e,
    })?;
    Ok(parse_url_list(&content))
}
