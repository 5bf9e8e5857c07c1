//! Audio extraction presets: lossless WAV with a fixed-bitrate MP3 fallback.
//!
//! **Formats:** [`AudioFormat::Primary`] (WAV, lossless), [`AudioFormat::Fallback`] (MP3 at 320 kbit/s)
//!
//! ```no_run
//! use plaudio_dl::audio::{AudioFormat, AudioQuality, ExtractOptions};
//! use plaudio_dl::dl::download;
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let opts = ExtractOptions::new(
//!     AudioFormat::Primary,
//!     AudioQuality::BEST,
//!     "/music/01 - Intro.%(ext)s".to_string(),
//! );
//! download("https://youtube.com/watch?v=example", (&opts).into())?;
//! # Ok(())
//! # }
//! ```

use crate::dl::{DownloadOptions, OutputTemplates, PostProcessor, PostProcessorArgs};
use std::fmt;
use thiserror::Error;

/// Source stream selection: best audio-only stream, preferring containers FFmpeg reads fastest.
pub const SOURCE_FORMAT: &str = "bestaudio[ext=m4a]/bestaudio[ext=webm]/bestaudio/best";

/// Fixed bitrate of the lossy fallback, in kbit/s.
pub const FALLBACK_BITRATE_KBPS: u32 = 320;

/// Target audio format of an extraction attempt.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum AudioFormat {
    /// Lossless WAV
    #[default]
    Primary,
    /// Lossy MP3 at [`FALLBACK_BITRATE_KBPS`]
    Fallback,
}

impl AudioFormat {
    /// FFmpeg codec name handed to `FFmpegExtractAudio`, also the output extension.
    pub fn codec(self) -> &'static str {
        match self {
            Self::Primary => "wav",
            Self::Fallback => "mp3",
        }
    }

    /// Role of the format in the fallback chain.
    pub fn label(self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Fallback => "fallback",
        }
    }
}

impl fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Audio quality out of range.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid audio quality: {0} (expected 0 (best) to 9 (worst))")]
pub struct InvalidQuality(pub u8);

/// FFmpeg VBR quality, `0` (best) to `9` (worst).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct AudioQuality(u8);

impl AudioQuality {
    pub const BEST: Self = Self(0);
    pub const WORST: Self = Self(9);

    pub fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for AudioQuality {
    type Error = InvalidQuality;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if value <= Self::WORST.0 {
            Ok(Self(value))
        } else {
            Err(InvalidQuality(value))
        }
    }
}

/// Recognized extraction options for one download attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtractOptions {
    pub preferred_format: AudioFormat,
    /// Applied to the primary format; the fallback always uses a fixed bitrate.
    pub audio_quality: AudioQuality,
    /// yt-dlp output template, e.g. `/music/List/01 - Title.%(ext)s`
    pub output_template: String,
    /// Show download progress on stderr
    pub progress: bool,
}

impl ExtractOptions {
    pub fn new(
        preferred_format: AudioFormat,
        audio_quality: AudioQuality,
        output_template: String,
    ) -> Self {
        Self {
            preferred_format,
            audio_quality,
            output_template,
            progress: false,
        }
    }

    pub fn with_progress(self, progress: bool) -> Self {
        Self { progress, ..self }
    }

    /// Same options retargeted to another format.
    pub fn with_format(&self, preferred_format: AudioFormat) -> Self {
        Self {
            preferred_format,
            ..self.clone()
        }
    }

    /// `preferredquality` value for `FFmpegExtractAudio`.
    fn preferred_quality(&self) -> String {
        match self.preferred_format {
            AudioFormat::Primary => self.audio_quality.get().to_string(),
            AudioFormat::Fallback => FALLBACK_BITRATE_KBPS.to_string(),
        }
    }
}

impl From<&ExtractOptions> for DownloadOptions {
    /// Best audio stream → `preferred_format` via FFmpeg using all cores, with metadata tags.
    fn from(opts: &ExtractOptions) -> Self {
        Self {
            format: Some(SOURCE_FORMAT.to_string()),
            outtmpl: Some(OutputTemplates::simple(opts.output_template.clone())),
            postprocessors: Some(vec![
                PostProcessor::extract_audio(
                    opts.preferred_format.codec(),
                    opts.preferred_quality(),
                ),
                PostProcessor::metadata(),
            ]),
            postprocessor_args: Some(PostProcessorArgs {
                ffmpeg: vec!["-threads".to_string(), "0".to_string()],
            }),
            noplaylist: Some(true),
            writeinfojson: Some(false),
            quiet: Some(true),
            no_warnings: Some(true),
            progress: opts.progress.then_some(true),
            ..Default::default()
        }
    }
}
