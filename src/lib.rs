//! SubDB - Subtitle Client Library
//!
//! This library provides the core functionality for identifying movies by
//! their partial-content hash and exchanging subtitles with the SubDB API.

pub mod config;
pub mod errors;
pub mod logging;
pub mod settings;
pub mod hashing;
pub mod protocol;
pub mod languages;
pub mod encoding;
pub mod client;
pub mod data_structures;
pub mod helper_functions;
pub mod scanner;
pub mod downloader;

// Re-export commonly used items
pub use client::{ApiResponse, ClientConfig, ProductInfo, SubDbClient, UploadOutcome};
pub use data_structures::{BatchEvent, BatchSummary, CancelToken, DownloadJob, JobStatus};
pub use downloader::{BatchDownloader, DownloadOptions, SubtitleSource};
pub use encoding::OutputEncoding;
pub use errors::{Result, SubDbError};
pub use hashing::{movie_hash, MediaFile};
pub use helper_functions::{Utils, Validation};
pub use languages::language_name;
pub use protocol::{Action, SearchHit};
pub use scanner::collect_media;
pub use settings::Settings;
