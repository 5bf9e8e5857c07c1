//! yt-dlp Python API wrappers.
//!
//! Type-safe bindings to [yt-dlp](https://github.com/yt-dlp/yt-dlp) `YoutubeDL` parameters.
//!
//! ```no_run
//! use plaudio_dl::dl::{DownloadOptions, extract_playlist};
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let playlist = extract_playlist(
//!     "https://youtube.com/playlist?list=example",
//!     DownloadOptions::flat_playlist(),
//! )?;
//! println!("{}: {} entries", playlist.title.unwrap_or_default(), playlist.entries.len());
//! # Ok(())
//! # }
//! ```

use pyo3::ffi::c_str;
use pyo3::prelude::*;
use std::collections::HashMap;
use std::path::PathBuf;

/// Filename templates using `%(field)s` syntax. Key `default` required.
#[derive(Clone, Debug, Default, IntoPyObject)]
pub struct OutputTemplates(pub Option<HashMap<String, String>>);

impl OutputTemplates {
    /// Create with a single default template.
    pub fn simple(default: String) -> Self {
        Self(Some(HashMap::from([("default".to_string(), default)])))
    }
}

/// Post-download operation: `key` (e.g., `"FFmpegExtractAudio"`) plus its keyword arguments.
///
/// Unset fields are dropped before the dict reaches yt-dlp, so a processor only
/// receives the arguments it accepts.
#[derive(Clone, Debug, Default, IntoPyObject)]
pub struct PostProcessor {
    pub key: String,
    pub preferredcodec: Option<String>,
    pub preferredquality: Option<String>,
    pub add_metadata: Option<bool>,
}

impl PostProcessor {
    /// `FFmpegExtractAudio` with a target codec and quality (VBR `0..=9` or a bitrate in kbit/s).
    pub fn extract_audio(codec: &str, quality: String) -> Self {
        Self {
            key: "FFmpegExtractAudio".to_string(),
            preferredcodec: Some(codec.to_string()),
            preferredquality: Some(quality),
            ..Default::default()
        }
    }

    /// `FFmpegMetadata`, embedding title and uploader tags into the output.
    pub fn metadata() -> Self {
        Self {
            key: "FFmpegMetadata".to_string(),
            add_metadata: Some(true),
            ..Default::default()
        }
    }
}

/// CLI arguments passed to yt-dlp post-processors.
///
/// The `ffmpeg` field contains arguments passed to FFmpeg during post-processing.
/// Example: `["-threads", "0"]` to let FFmpeg use every available core.
#[derive(Clone, Debug, Default, IntoPyObject)]
pub struct PostProcessorArgs {
    pub ffmpeg: Vec<String>,
}

/// yt-dlp configuration passed to `YoutubeDL(params)`.
#[derive(Clone, Debug, Default, IntoPyObject)]
pub struct DownloadOptions {
    pub format: Option<String>,
    pub outtmpl: Option<OutputTemplates>,
    pub postprocessors: Option<Vec<PostProcessor>>,
    pub postprocessor_args: Option<PostProcessorArgs>,
    /// `"in_playlist"` lists playlist entries without resolving each video.
    pub extract_flat: Option<String>,
    pub noplaylist: Option<bool>,
    pub writeinfojson: Option<bool>,
    pub quiet: Option<bool>,
    pub no_warnings: Option<bool>,
    /// Print percent, speed and ETA to stderr while downloading.
    pub progress: Option<bool>,
}

impl DownloadOptions {
    /// Metadata-only options for listing playlist entries.
    pub fn flat_playlist() -> Self {
        Self {
            extract_flat: Some("in_playlist".to_string()),
            quiet: Some(true),
            no_warnings: Some(true),
            ..Default::default()
        }
    }
}

/// One playlist item as listed by a flat extraction.
///
/// Unavailable (deleted or private) items keep their position but carry no metadata.
#[derive(Clone, Debug, FromPyObject)]
#[pyo3(from_item_all)]
pub struct EntryInfo {
    /// 1-based position in the playlist
    pub index: usize,
    /// Video identifier
    pub id: Option<String>,
    /// Video title
    pub title: Option<String>,
    /// URL to the video webpage
    pub url: Option<String>,
}

/// Playlist metadata with its ordered entries.
///
/// A single video URL resolves to a playlist of one entry.
#[derive(Clone, Debug, FromPyObject)]
#[pyo3(from_item_all)]
pub struct PlaylistInfo {
    pub id: Option<String>,
    pub title: Option<String>,
    pub uploader: Option<String>,
    pub entries: Vec<EntryInfo>,
}

/// Essential metadata from yt-dlp info dict of a downloaded video.
#[derive(Clone, Debug, FromPyObject)]
#[pyo3(from_item_all)]
pub struct DownloadInfo {
    /// Video identifier (required by yt-dlp)
    pub id: String,
    /// Video title (required by yt-dlp)
    pub title: String,
    /// Extractor name (e.g., "Youtube")
    pub extractor_key: Option<String>,
    /// Full name of the video uploader
    pub uploader: Option<String>,
    /// Length of the video in seconds
    pub duration: Option<f64>,
    /// URL to the video webpage
    pub webpage_url: Option<String>,
}

fn load_module(py: Python<'_>) -> PyResult<Bound<'_, PyModule>> {
    PyModule::from_code(py, c_str!(include_str!("./dl.py")), c"dl.py", c"dl")
}

/// List the entries of a playlist without downloading anything.
///
/// Uses `extract_info(url, download=False)`; pair with [`DownloadOptions::flat_playlist`].
pub fn extract_playlist(url: &str, opts: DownloadOptions) -> Result<PlaylistInfo, PyErr> {
    Python::attach(|py| {
        let module = load_module(py)?;

        let py_params = opts.into_pyobject(py)?;

        let info = module
            .getattr("extract_playlist")?
            .call1((url, py_params))?;

        info.extract()
    })
}

/// Download a single URL, returning the final file path (after post-processing) and the info dict.
///
/// Uses `extract_info(url, download=True)` to download and get metadata in one request.
pub fn download(url: &str, opts: DownloadOptions) -> Result<(Option<PathBuf>, DownloadInfo), PyErr> {
    Python::attach(|py| {
        let module = load_module(py)?;

        let py_params = opts.into_pyobject(py)?;

        let result = module.getattr("download")?.call1((url, py_params))?;

        result.extract()
    })
}
