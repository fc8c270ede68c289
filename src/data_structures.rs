//! Data structures shared by the batch downloader and its callers
//!
//! Per-file job results, batch summaries, progress events and the
//! cancellation token handed to worker threads.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Outcome of one media file
#[derive(Clone, Debug, PartialEq)]
pub enum JobStatus {
    /// Subtitle written to the given path
    Saved(PathBuf),
    /// The API had no subtitle (status it answered with)
    NotFound(u16),
    /// A subtitle already exists and overwriting is disabled
    SkippedExisting,
    Failed(String),
    Cancelled,
}

/// Represents a single subtitle download job
#[derive(Clone, Debug)]
pub struct DownloadJob {
    pub video_path: PathBuf,
    pub hash: Option<String>,
    pub status: JobStatus,
}

/// Aggregate counts of a finished batch
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub total: usize,
    pub saved: usize,
    pub not_found: usize,
    pub skipped: usize,
    pub failed: usize,
    pub cancelled: usize,
}

impl BatchSummary {
    pub fn record(&mut self, status: &JobStatus) {
        match status {
            JobStatus::Saved(_) => self.saved += 1,
            JobStatus::NotFound(_) => self.not_found += 1,
            JobStatus::SkippedExisting => self.skipped += 1,
            JobStatus::Failed(_) => self.failed += 1,
            JobStatus::Cancelled => self.cancelled += 1,
        }
    }

    /// Files that went through the pipeline, whatever the result
    pub fn processed(&self) -> usize {
        self.saved + self.not_found + self.skipped + self.failed
    }

    /// Every file with a result so far, cancelled ones included
    pub fn reported(&self) -> usize {
        self.processed() + self.cancelled
    }
}

/// Progress notifications emitted while a batch runs
#[derive(Clone, Debug)]
pub enum BatchEvent {
    /// One file finished or was cancelled; `done` counts reported files so far
    Processed {
        done: usize,
        total: usize,
        job: DownloadJob,
    },
    /// Every file has been handled
    Completed(BatchSummary),
}

/// Shared flag telling workers to stop picking new files
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_counts() {
        let mut summary = BatchSummary {
            total: 4,
            ..Default::default()
        };
        summary.record(&JobStatus::Saved(PathBuf::from("a.srt")));
        summary.record(&JobStatus::NotFound(404));
        summary.record(&JobStatus::Failed("boom".into()));
        summary.record(&JobStatus::Cancelled);
        assert_eq!(summary.processed(), 3);
        assert_eq!(summary.cancelled, 1);
        assert_eq!(summary.reported(), 4);
    }

    #[test]
    fn cancel_token_is_shared() {
        let token = CancelToken::new();
        let clone = token.clone();
        assert!(!clone.is_cancelled());
        token.cancel();
        assert!(clone.is_cancelled());
    }
}
