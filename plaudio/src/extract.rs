//! Extraction collaborator: playlist resolution and per-entry audio acquisition.

use crate::error::{FetchError, ResolutionError};
use plaudio_dl::audio::ExtractOptions;
use plaudio_dl::dl::{DownloadOptions, EntryInfo, PlaylistInfo, download, extract_playlist};
use std::path::PathBuf;
use url::Url;

/// Title used when the source omits one.
const UNKNOWN_TITLE: &str = "unknown title";

/// One playlist item.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlaylistEntry {
    /// 1-based position in the playlist
    pub index: usize,
    pub title: String,
    /// Source URL; empty when the item is unavailable
    pub url: String,
}

/// Resolved playlist metadata.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Playlist {
    pub title: String,
    pub uploader: Option<String>,
    /// Ordered by `index`
    pub entries: Vec<PlaylistEntry>,
}

/// Black-box extraction backend.
///
/// `fetch` blocks until the audio file is written (including any transcoding)
/// or the attempt fails.
pub trait Extractor {
    /// Resolve a playlist URL into its ordered entries.
    fn resolve(&mut self, url: &str) -> Result<Playlist, ResolutionError>;

    /// Download one entry as audio, returning the written file.
    fn fetch(&mut self, url: &str, options: &ExtractOptions) -> Result<PathBuf, FetchError>;
}

/// [`Extractor`] backed by the yt-dlp Python library.
#[derive(Clone, Copy, Debug, Default)]
pub struct YtDlp;

impl Extractor for YtDlp {
    fn resolve(&mut self, url: &str) -> Result<Playlist, ResolutionError> {
        tracing::debug!(url, "extracting playlist");

        let info =
            extract_playlist(url, DownloadOptions::flat_playlist()).map_err(|e| ResolutionError {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        Ok(info.into())
    }

    fn fetch(&mut self, url: &str, options: &ExtractOptions) -> Result<PathBuf, FetchError> {
        if url.is_empty() {
            return Err(FetchError::Download("entry is unavailable".to_string()));
        }

        tracing::debug!(url, format = %options.preferred_format, "fetching audio");

        let (file_path, info) =
            download(url, options.into()).map_err(|e| FetchError::classify(e.to_string()))?;

        tracing::debug!(id = info.id, path = ?file_path, "yt-dlp finished");

        file_path.ok_or_else(|| {
            FetchError::Conversion("yt-dlp did not report an output file".to_string())
        })
    }
}

impl From<EntryInfo> for PlaylistEntry {
    fn from(info: EntryInfo) -> Self {
        Self {
            index: info.index,
            title: info.title.unwrap_or_else(|| UNKNOWN_TITLE.to_string()),
            url: info.url.unwrap_or_default(),
        }
    }
}

impl From<PlaylistInfo> for Playlist {
    fn from(info: PlaylistInfo) -> Self {
        let title = info.title.or(info.id).unwrap_or_else(|| UNKNOWN_TITLE.to_string());

        let mut entries: Vec<PlaylistEntry> = info.entries.into_iter().map(Into::into).collect();
        entries.sort_by_key(|e| e.index);

        Self {
            title,
            uploader: info.uploader,
            entries,
        }
    }
}

/// What a URL points at, judged from the URL alone.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UrlKind {
    /// YouTube URL with a `list` parameter
    Playlist(String),
    /// YouTube URL without one
    Video,
    /// Anything else; left for the extractor to interpret
    Other,
}

fn is_youtube_host(host: &str) -> bool {
    host == "youtu.be" || host == "youtube.com" || host.ends_with(".youtube.com")
}

/// Classify a URL by host and `list` query parameter.
pub fn url_kind(url: &str) -> UrlKind {
    let Ok(parsed) = Url::parse(url) else {
        return UrlKind::Other;
    };

    if !parsed.host_str().is_some_and(is_youtube_host) {
        return UrlKind::Other;
    }

    parsed
        .query_pairs()
        .find(|(key, value)| key == "list" && !value.is_empty())
        .map_or(UrlKind::Video, |(_, value)| {
            UrlKind::Playlist(value.into_owned())
        })
}

/// YouTube playlist ID from the `list` query parameter.
pub fn playlist_id(url: &str) -> Option<String> {
    match url_kind(url) {
        UrlKind::Playlist(id) => Some(id),
        _ => None,
    }
}
