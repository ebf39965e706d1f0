//! Utility functions shared across the crate.
//!
//! - Atomic file writes for configuration
//! - Text helpers for the report renderer

use std::io::{self, Write};
use std::path::Path;

use tempfile::NamedTempFile;

use crate::error::{Result, TimelensError};

/// Atomically write content to a file.
///
/// Writes to a temporary file in the target directory, flushes it, then
/// renames it over the target. If any step fails the original file (if it
/// exists) remains unchanged. Missing parent directories are created.
///
/// # Example
///
/// ```rust,no_run
/// use timelens::util::atomic_write;
///
/// atomic_write("config.toml", b"[sprint]\nlength_days = 14\n").unwrap();
/// ```
pub fn atomic_write(path: impl AsRef<Path>, content: &[u8]) -> Result<()> {
    let path = path.as_ref();

    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        Some(_) => Path::new("."),
        None => {
            return Err(TimelensError::IoError {
                context: format!("Cannot determine parent directory for: {}", path.display()),
                source: io::Error::new(io::ErrorKind::InvalidInput, "No parent directory"),
            })
        }
    };

    if !parent.exists() {
        std::fs::create_dir_all(parent).map_err(|e| {
            TimelensError::io(format!("Failed to create directory: {}", parent.display()), e)
        })?;
    }

    // Same directory keeps the rename on one filesystem
    let mut temp_file = NamedTempFile::new_in(parent).map_err(|e| {
        TimelensError::io(
            format!("Failed to create temporary file in: {}", parent.display()),
            e,
        )
    })?;

    temp_file.write_all(content).map_err(|e| {
        TimelensError::io(
            format!("Failed to write to temporary file for: {}", path.display()),
            e,
        )
    })?;

    temp_file.flush().map_err(|e| {
        TimelensError::io(
            format!("Failed to flush temporary file for: {}", path.display()),
            e,
        )
    })?;

    temp_file.persist(path).map_err(|e| {
        TimelensError::io(format!("Failed to atomically write file: {}", path.display()), e.error)
    })?;

    Ok(())
}

/// Truncate text to `max_chars` characters, appending an ellipsis when cut.
#[must_use]
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let kept: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    format!("{kept}…")
}

/// Format a float with a fixed number of decimal places.
#[must_use]
pub fn fixed(value: f64, decimals: usize) -> String {
    format!("{value:.decimals$}")
}
