//! Per-entry outcomes and the structured records persisted at the end of a run.

use crate::extract::PlaylistEntry;
use chrono::{Local, SecondsFormat};
use plaudio_dl::audio::AudioFormat;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Current local time as an RFC 3339 timestamp.
pub fn timestamp() -> String {
    Local::now().to_rfc3339_opts(SecondsFormat::Millis, false)
}

/// Outcome of processing one entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    AlreadyExists,
    SuccessPrimary,
    SuccessFallback,
    Failure,
}

impl Outcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AlreadyExists => "already-exists",
            Self::SuccessPrimary => "success/primary",
            Self::SuccessFallback => "success/fallback",
            Self::Failure => "failure",
        }
    }

    /// Whether the entry ends the run with an audio file on disk.
    pub fn is_success(self) -> bool {
        !matches!(self, Self::Failure)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one entry, created once and appended to the run's ordered results.
#[derive(Clone, Debug)]
pub struct DownloadResult {
    pub index: usize,
    pub title: String,
    pub url: String,
    /// Format that produced the file; `None` when skipped or failed
    pub format: Option<AudioFormat>,
    pub outcome: Outcome,
    pub error: Option<String>,
    pub path: Option<PathBuf>,
    pub timestamp: String,
}

impl DownloadResult {
    pub fn already_exists(entry: &PlaylistEntry, path: PathBuf) -> Self {
        Self::new(entry, Outcome::AlreadyExists, None, Some(path), None)
    }

    pub fn success(entry: &PlaylistEntry, format: AudioFormat, path: PathBuf) -> Self {
        let outcome = match format {
            AudioFormat::Primary => Outcome::SuccessPrimary,
            AudioFormat::Fallback => Outcome::SuccessFallback,
        };
        Self::new(entry, outcome, Some(format), Some(path), None)
    }

    pub fn failure(entry: &PlaylistEntry, error: String) -> Self {
        Self::new(entry, Outcome::Failure, None, None, Some(error))
    }

    fn new(
        entry: &PlaylistEntry,
        outcome: Outcome,
        format: Option<AudioFormat>,
        path: Option<PathBuf>,
        error: Option<String>,
    ) -> Self {
        Self {
            index: entry.index,
            title: entry.title.clone(),
            url: entry.url.clone(),
            format,
            outcome,
            error,
            path,
            timestamp: timestamp(),
        }
    }
}

/// Entry that failed in both formats. Persisted to `failed_downloads_<timestamp>.json`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FailureRecord {
    pub index: usize,
    pub title: String,
    pub url: String,
    pub error: String,
    pub timestamp: String,
}

impl FailureRecord {
    pub fn new(entry: &PlaylistEntry, error: String) -> Self {
        Self {
            index: entry.index,
            title: entry.title.clone(),
            url: entry.url.clone(),
            error,
            timestamp: timestamp(),
        }
    }
}

/// One failed format attempt. Persisted to `format_attempts_<timestamp>.json`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FormatAttempt {
    pub index: usize,
    pub title: String,
    /// Codec of the attempt (`wav` or `mp3`)
    pub format: String,
    pub error: String,
    pub timestamp: String,
}

impl FormatAttempt {
    pub fn new(entry: &PlaylistEntry, format: AudioFormat, error: String) -> Self {
        Self {
            index: entry.index,
            title: entry.title.clone(),
            format: format.codec().to_string(),
            error,
            timestamp: timestamp(),
        }
    }
}

/// Counts over a finished run.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RunSummary {
    pub total: usize,
    pub already_existing: usize,
    pub primary: usize,
    pub fallback: usize,
    pub failed: usize,
}

impl RunSummary {
    pub fn from_results(results: &[DownloadResult]) -> Self {
        results.iter().fold(
            Self {
                total: results.len(),
                ..Default::default()
            },
            |mut summary, result| {
                match result.outcome {
                    Outcome::AlreadyExists => summary.already_existing += 1,
                    Outcome::SuccessPrimary => summary.primary += 1,
                    Outcome::SuccessFallback => summary.fallback += 1,
                    Outcome::Failure => summary.failed += 1,
                }
                summary
            },
        )
    }

    /// Entries with an audio file on disk, including ones skipped as existing.
    pub fn succeeded(&self) -> usize {
        self.already_existing + self.primary + self.fallback
    }

    /// Share of processed entries that succeeded, in percent.
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.succeeded() as f64 / self.total as f64 * 100.0
        }
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "succeeded: {}/{}", self.succeeded(), self.total)?;
        writeln!(f, "  lossless (wav): {}", self.primary)?;
        writeln!(f, "  fallback (mp3): {}", self.fallback)?;
        writeln!(f, "  already present: {}", self.already_existing)?;
        writeln!(f, "failed: {}", self.failed)?;
        write!(f, "success rate: {:.1}%", self.success_rate())
    }
}
