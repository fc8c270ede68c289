//! Movie fingerprinting
//!
//! SubDB identifies a movie by the MD5 of its first and last 64 KiB. The
//! two windows are copied into one fixed-size buffer which is hashed as a
//! whole, so the digest only depends on those 128 KiB.
//!
//! Files between 64 KiB and 128 KiB have overlapping windows; the layout is
//! still `file[..64K] ++ file[len - 64K..]`. Files under 64 KiB cannot be
//! hashed because the tail window would start before the beginning of the
//! file.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use md5::{Digest, Md5};
use once_cell::sync::OnceCell;

use crate::config::{HASH_BUFFER_SIZE, HASH_CHUNK_SIZE};
use crate::errors::{Result, SubDbError};

/// Compute the SubDB hash of a movie file.
pub fn movie_hash(path: &Path) -> Result<String> {
    let mut file = File::open(path)?;
    let len = file.metadata()?.len();
    let chunk = HASH_CHUNK_SIZE as u64;
    if len < chunk {
        return Err(SubDbError::FileTooSmall {
            path: path.to_path_buf(),
            size: len,
            min: chunk,
        });
    }

    // Fresh zeroed buffer per call, never shared between files
    let mut buffer = vec![0u8; HASH_BUFFER_SIZE];
    let (head, tail) = buffer.split_at_mut(HASH_CHUNK_SIZE);
    file.read_exact(head)?;
    file.seek(SeekFrom::End(-(chunk as i64)))?;
    file.read_exact(tail)?;

    Ok(hash_buffer(&buffer))
}

/// MD5 of `buffer` rendered as lowercase hex.
pub fn hash_buffer(buffer: &[u8]) -> String {
    hex::encode(Md5::digest(buffer))
}

/// A candidate media file whose hash is computed on first access
#[derive(Debug)]
pub struct MediaFile {
    path: PathBuf,
    size: u64,
    hash: OnceCell<String>,
}

impl MediaFile {
    /// Stat `path` and wrap it; the hash is not computed yet.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let size = std::fs::metadata(&path)?.len();
        Ok(Self {
            path,
            size,
            hash: OnceCell::new(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    /// Hash of the file, computed once and cached afterwards.
    pub fn hash(&self) -> Result<&str> {
        self.hash
            .get_or_try_init(|| movie_hash(&self.path))
            .map(String::as_str)
    }

    /// Name of the file, or "Unknown" when the path has none
    pub fn file_name(&self) -> String {
        crate::helper_functions::Utils::get_file_name(&self.path)
    }
}
