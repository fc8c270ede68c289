//! Folder scanning
//!
//! Lists the files of one directory (no recursion) and keeps everything
//! whose extension is not in the ignore set.

use std::path::Path;

use log::{debug, info, warn};

use crate::errors::Result;
use crate::hashing::MediaFile;
use crate::helper_functions::Utils;

/// Candidate media files directly inside `dir`, sorted by path.
pub fn collect_media(dir: &Path) -> Result<Vec<MediaFile>> {
    info!("Scanning folder: {}", dir.display());
    let mut paths = Vec::new();
    for entry in dir.read_dir()? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        if Utils::is_ignored(&path) {
            debug!("Ignoring {}", path.display());
            continue;
        }
        paths.push(path);
    }
    paths.sort();

    let mut media = Vec::with_capacity(paths.len());
    for path in paths {
        match MediaFile::open(&path) {
            Ok(file) => media.push(file),
            Err(e) => warn!("Skipping {}: {}", path.display(), e),
        }
    }
    info!("Folder scan completed - found {} media files", media.len());
    Ok(media)
}
