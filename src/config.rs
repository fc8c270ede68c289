//! Configuration constants for the SubDB client
//!
//! Protocol identifiers, API addresses, hashing window sizes and the
//! extension policy used when scanning a folder for media files.

use std::time::Duration;

/// The current application version (keep in sync with Cargo.toml)
pub const APP_VERSION: &str = "0.3.0";

/// Name of the CLI when it identifies itself to the API
pub const APP_NAME: &str = "subdb-cli";

/// Homepage sent in the user agent
pub const APP_URL: &str = "http://thesubdb.com/api/";

/// Protocol name used as the first token of the user agent
pub const PROTOCOL_NAME: &str = "SubDB";

/// Protocol version used in the user agent
pub const PROTOCOL_VERSION: &str = "1.0";

/// Production API root
pub const API_URL: &str = "http://api.thesubdb.com/";

/// Sandbox API root, same protocol as production
pub const SANDBOX_API_URL: &str = "http://sandbox.thesubdb.com/";

/// Environment variable overriding the API root
pub const API_URL_ENV: &str = "SUBDB_API_URL";

/// Size of each window read from the head and the tail of a movie file
pub const HASH_CHUNK_SIZE: usize = 64 * 1024;

/// Fixed size of the hashed buffer (head window followed by tail window)
pub const HASH_BUFFER_SIZE: usize = HASH_CHUNK_SIZE * 2;

/// Upload requests are the only ones with a bounded duration
pub const UPLOAD_TIMEOUT: Duration = Duration::from_secs(10);

/// Default language requested when the user has not picked one
pub const DEFAULT_LANGUAGE: &str = "en";

/// Default encoding used to write downloaded subtitles
pub const DEFAULT_OUTPUT_ENCODING: &str = "utf-8";

/// Extension given to downloaded subtitles
pub const SUBTITLE_EXTENSION: &str = "srt";

/// Files with these extensions are never treated as media (compared case-insensitively)
pub static IGNORE_EXTENSIONS: &[&str] = &["srt", "txt", "nfo", "mp3", "jpg", "rar", "zip", "7zip"];

/// Default concurrent downloads (one worker reproduces the sequential behavior)
pub static DEFAULT_CONCURRENT_DOWNLOADS: usize = 1;

/// Maximum concurrent downloads
pub static MAX_CONCURRENT_DOWNLOADS: usize = 8;
