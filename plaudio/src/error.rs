//! Error types for plaudio organized by run stage.

use std::path::PathBuf;
use thiserror::Error;

/// Fatal run errors. Anything here aborts the whole run.
#[derive(Debug, Error)]
pub enum Error {
    /// Playlist resolution stage error
    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    /// Range validation stage error
    #[error(transparent)]
    Range(#[from] RangeError),

    /// Output directory or log artifact could not be written
    #[error("failed to write {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Record serialization error
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| Self::Io { path, source }
    }
}

/// Playlist could not be resolved (invalid URL, unreachable, private).
#[derive(Debug, Error)]
#[error("failed to resolve playlist {url:?}: {message}")]
pub struct ResolutionError {
    pub url: String,
    pub message: String,
}

/// Invalid numeric range.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RangeError {
    #[error("start index must be at least 1, got {0}")]
    StartBelowOne(usize),

    #[error("start index {start} is after end index {end}")]
    StartAfterEnd { start: usize, end: usize },

    #[error("start index {start} exceeds playlist length {total}")]
    StartBeyondTotal { start: usize, total: usize },

    #[error("playlist has no entries")]
    EmptyPlaylist,

    #[error("invalid index {input:?}: expected a positive integer")]
    Parse { input: String },
}

/// Per-entry acquisition failure. Recovered locally: logged, recorded, and the run continues.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum FetchError {
    /// Stream could not be fetched
    #[error("download failed: {0}")]
    Download(String),

    /// FFmpeg post-processing failed after the stream was fetched
    #[error("conversion failed: {0}")]
    Conversion(String),
}

impl FetchError {
    /// Classify a raw yt-dlp error message.
    ///
    /// yt-dlp reports post-processor failures as `Postprocessing: ...` and missing
    /// binaries by naming ffmpeg/ffprobe.
    pub fn classify(message: impl Into<String>) -> Self {
        let message = message.into();
        let lower = message.to_lowercase();

        if lower.contains("postprocessing") || lower.contains("ffmpeg") || lower.contains("ffprobe") {
            Self::Conversion(message)
        } else {
            Self::Download(message)
        }
    }

    /// Captured error message without the stage prefix.
    pub fn message(&self) -> &str {
        match self {
            Self::Download(message) | Self::Conversion(message) => message,
        }
    }
}

/// Result type alias for plaudio operations.
pub type Result<T> = std::result::Result<T, Error>;
