//! Common utility functions and validation helpers
//!
//! Path helpers for media and subtitle files, progress formatting and
//! input validation used by the library and the CLI.

use std::path::{Path, PathBuf};

use crate::config::{IGNORE_EXTENSIONS, MAX_CONCURRENT_DOWNLOADS, SUBTITLE_EXTENSION};

/// Common utility functions used throughout the application
pub struct Utils;

impl Utils {
    /// Safely get the file name from a path, returning a default if not available
    pub fn get_file_name(path: &Path) -> String {
        path.file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("Unknown")
            .to_string()
    }

    /// Truncate a string to a maximum length, adding ellipsis if needed
    pub fn truncate_string(s: &str, max_len: usize) -> String {
        if s.chars().count() <= max_len {
            s.to_string()
        } else {
            let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
            format!("{}...", kept)
        }
    }

    /// Whether a file is excluded from media scanning by its extension.
    /// Files without an extension are never ignored.
    pub fn is_ignored(path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| IGNORE_EXTENSIONS.iter().any(|&i| i.eq_ignore_ascii_case(ext)))
            .unwrap_or(false)
    }

    /// `<dir>/<stem>.srt` next to the media file
    pub fn subtitle_path_for(media: &Path) -> PathBuf {
        media.with_extension(SUBTITLE_EXTENSION)
    }

    /// Create a progress percentage string
    pub fn format_progress(current: usize, total: usize) -> String {
        if total == 0 {
            "0%".to_string()
        } else {
            let percentage = (current as f32 / total as f32 * 100.0) as usize;
            format!("{}%", percentage)
        }
    }
}

/// Input validation utilities
pub struct Validation;

impl Validation {
    /// Validate that a folder path exists and is a directory
    pub fn is_valid_folder(path: &Path) -> bool {
        !path.as_os_str().is_empty() && path.is_dir()
    }

    /// Validate concurrent downloads setting
    pub fn is_valid_concurrent_downloads(value: usize) -> bool {
        value > 0 && value <= MAX_CONCURRENT_DOWNLOADS
    }
}
