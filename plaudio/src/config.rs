//! Configuration resolved from CLI arguments.
//!
//! [`Cli`] stays in cli.rs; this module turns it into a [`Config`] via `TryFrom`.

use crate::cli::Cli;
use crate::extract::{UrlKind, url_kind};
use crate::orchestrator::RunConfig;
use crate::range::RangeRequest;
use eyre::{OptionExt, Result};
use plaudio_dl::audio::AudioQuality;
use std::path::PathBuf;

/// Directory created under the system audio directory by default.
const DEFAULT_DIR_NAME: &str = "plaudio";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    /// Every entry in range, into a playlist-named directory
    Playlist,
    /// One video, into the output root
    Single,
}

/// Resolved run configuration.
#[derive(Debug)]
pub struct Config {
    pub url: String,
    pub mode: Mode,
    pub run: RunConfig,
}

impl TryFrom<Cli> for Config {
    type Error = eyre::Error;

    fn try_from(cli: Cli) -> Result<Self> {
        let url = cli.url.ok_or_eyre("no playlist URL given")?;

        let range = RangeRequest::new(cli.start, cli.end)?;
        let audio_quality = AudioQuality::try_from(cli.quality)?;
        let output_root = cli.output.unwrap_or_else(default_output_root);

        let mode = match url_kind(&url) {
            UrlKind::Video => Mode::Single,
            UrlKind::Playlist(_) | UrlKind::Other => Mode::Playlist,
        };

        if mode == Mode::Single && range != RangeRequest::all() {
            tracing::warn!(url, "range ignored for a single video");
        }

        Ok(Self {
            url,
            mode,
            run: RunConfig::new(output_root)
                .with_range(range)
                .with_audio_quality(audio_quality)
                .with_progress(!cli.no_progress),
        })
    }
}

/// `<audio dir>/plaudio`, falling back to the download directory, then the working directory.
pub fn default_output_root() -> PathBuf {
    dirs::audio_dir()
        .or_else(dirs::download_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_DIR_NAME)
}
