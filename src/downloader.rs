//! Batch subtitle downloads
//!
//! For every media file: hash it, ask the API for a subtitle in the chosen
//! language and, when the API answers 200, write `<stem>.srt` next to the
//! file in the chosen output encoding. A failing file never stops the
//! batch. With one worker (the default) files are handled strictly in
//! order on the calling thread; more workers run as scoped threads that
//! report back over a channel.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::thread;

use log::{debug, info, warn};
use reqwest::StatusCode;

use crate::client::{ApiResponse, SubDbClient};
use crate::config::{DEFAULT_CONCURRENT_DOWNLOADS, DEFAULT_LANGUAGE, MAX_CONCURRENT_DOWNLOADS};
use crate::data_structures::{BatchEvent, BatchSummary, CancelToken, DownloadJob, JobStatus};
use crate::encoding::{transcode, OutputEncoding};
use crate::errors::Result;
use crate::hashing::MediaFile;
use crate::helper_functions::Utils;

/// Anything that can fetch a subtitle by hash and language
pub trait SubtitleSource: Sync {
    fn download(&self, hash: &str, language: &str) -> Result<ApiResponse>;
}

impl SubtitleSource for SubDbClient {
    fn download(&self, hash: &str, language: &str) -> Result<ApiResponse> {
        SubDbClient::download(self, hash, language)
    }
}

/// What to download and how to write it
#[derive(Clone, Debug)]
pub struct DownloadOptions {
    pub language: String,
    pub output_encoding: OutputEncoding,
    pub concurrent_downloads: usize,
    pub overwrite_existing: bool,
}

impl Default for DownloadOptions {
    fn default() -> Self {
        Self {
            language: DEFAULT_LANGUAGE.to_string(),
            output_encoding: OutputEncoding::default(),
            concurrent_downloads: DEFAULT_CONCURRENT_DOWNLOADS,
            overwrite_existing: true,
        }
    }
}

/// Runs a batch of downloads against a [`SubtitleSource`]
pub struct BatchDownloader<'a, S: SubtitleSource> {
    source: &'a S,
    options: DownloadOptions,
    cancel: CancelToken,
}

impl<'a, S: SubtitleSource> BatchDownloader<'a, S> {
    pub fn new(source: &'a S, options: DownloadOptions) -> Self {
        Self {
            source,
            options,
            cancel: CancelToken::new(),
        }
    }

    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn options(&self) -> &DownloadOptions {
        &self.options
    }

    /// Process every file, calling `on_event` once per processed file and
    /// once more when the batch is complete.
    pub fn run(&self, media: &[MediaFile], mut on_event: impl FnMut(BatchEvent)) -> BatchSummary {
        let workers = self
            .options
            .concurrent_downloads
            .clamp(1, MAX_CONCURRENT_DOWNLOADS)
            .min(media.len().max(1));
        info!(
            "Starting subtitle downloads for {} files, language={}, encoding={}, workers={}",
            media.len(),
            self.options.language,
            self.options.output_encoding.name(),
            workers
        );

        let mut summary = BatchSummary {
            total: media.len(),
            ..Default::default()
        };
        if workers == 1 {
            self.run_sequential(media, &mut summary, &mut on_event);
        } else {
            self.run_pool(media, workers, &mut summary, &mut on_event);
        }
        if summary.cancelled > 0 {
            info!("Download cancelled, {} files left untouched", summary.cancelled);
        }

        info!(
            "Download session completed: {} saved, {} not found, {} skipped, {} failed",
            summary.saved, summary.not_found, summary.skipped, summary.failed
        );
        on_event(BatchEvent::Completed(summary.clone()));
        summary
    }

    fn run_sequential(
        &self,
        media: &[MediaFile],
        summary: &mut BatchSummary,
        on_event: &mut impl FnMut(BatchEvent),
    ) {
        for file in media {
            let job = if self.cancel.is_cancelled() {
                Self::cancelled(file)
            } else {
                self.process(file)
            };
            Self::report(job, summary, on_event);
        }
    }

    fn run_pool(
        &self,
        media: &[MediaFile],
        workers: usize,
        summary: &mut BatchSummary,
        on_event: &mut impl FnMut(BatchEvent),
    ) {
        let next = AtomicUsize::new(0);
        let (tx, rx) = mpsc::channel::<DownloadJob>();

        thread::scope(|scope| {
            for _ in 0..workers {
                let tx = tx.clone();
                let next = &next;
                scope.spawn(move || loop {
                    if self.cancel.is_cancelled() {
                        break;
                    }
                    let Some(file) = media.get(next.fetch_add(1, Ordering::SeqCst)) else {
                        break;
                    };
                    if tx.send(self.process(file)).is_err() {
                        break;
                    }
                });
            }
            drop(tx);

            for job in rx {
                Self::report(job, summary, on_event);
            }
        });

        // Indices past the counter were never claimed by a worker
        let claimed = next.load(Ordering::SeqCst).min(media.len());
        for file in &media[claimed..] {
            Self::report(Self::cancelled(file), summary, on_event);
        }
    }

    fn cancelled(file: &MediaFile) -> DownloadJob {
        DownloadJob {
            video_path: file.path().to_path_buf(),
            hash: None,
            status: JobStatus::Cancelled,
        }
    }

    fn report(job: DownloadJob, summary: &mut BatchSummary, on_event: &mut impl FnMut(BatchEvent)) {
        summary.record(&job.status);
        on_event(BatchEvent::Processed {
            done: summary.reported(),
            total: summary.total,
            job,
        });
    }

    /// Hash, download and write the subtitle of a single file.
    pub fn process(&self, media: &MediaFile) -> DownloadJob {
        let mut hash = None;
        let status = self.process_inner(media, &mut hash);
        debug!("SUBTITLE JOB: {} - {:?}", media.file_name(), status);
        DownloadJob {
            video_path: media.path().to_path_buf(),
            hash,
            status,
        }
    }

    fn process_inner(&self, media: &MediaFile, hash_out: &mut Option<String>) -> JobStatus {
        let subtitle_path = Utils::subtitle_path_for(media.path());
        if !self.options.overwrite_existing && subtitle_path.exists() {
            debug!("Subtitle already exists: {}", subtitle_path.display());
            return JobStatus::SkippedExisting;
        }

        let hash = match media.hash() {
            Ok(hash) => hash.to_string(),
            Err(e) => {
                warn!("Cannot hash {}: {}", media.path().display(), e);
                return JobStatus::Failed(e.to_string());
            }
        };
        *hash_out = Some(hash.clone());

        let response = match self.source.download(&hash, &self.options.language) {
            Ok(response) => response,
            Err(e) => {
                warn!("Download failed for {}: {}", media.path().display(), e);
                return JobStatus::Failed(e.to_string());
            }
        };
        if response.status != StatusCode::OK {
            debug!("No subtitle for {} ({})", media.path().display(), response.status);
            return JobStatus::NotFound(response.status.as_u16());
        }

        match self.write_subtitle(&subtitle_path, &response.body) {
            Ok(()) => {
                info!("Saved {}", subtitle_path.display());
                JobStatus::Saved(subtitle_path)
            }
            Err(e) => {
                warn!("Cannot write {}: {}", subtitle_path.display(), e);
                JobStatus::Failed(e.to_string())
            }
        }
    }

    fn write_subtitle(&self, path: &Path, body: &[u8]) -> Result<()> {
        let bytes = transcode(body, &self.options.output_encoding);
        std::fs::write(path, bytes)?;
        Ok(())
    }
}
