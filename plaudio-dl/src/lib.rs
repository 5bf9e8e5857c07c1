//! Type-safe Rust bindings to [yt-dlp](https://github.com/yt-dlp/yt-dlp) Python library.
//!
//! ## Modules
//!
//! - [`dl`] - Core yt-dlp API wrappers (playlist listing, download)
//! - [`audio`] - Audio extraction presets with a lossless primary and lossy fallback format
//!
//! ## Quick Start
//!
//! **List a playlist**:
//! ```no_run
//! use plaudio_dl::dl::{DownloadOptions, extract_playlist};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let playlist = extract_playlist(
//!     "https://youtube.com/playlist?list=example",
//!     DownloadOptions::flat_playlist(),
//! )?;
//!
//! for entry in &playlist.entries {
//!     println!("{:02} {:?}", entry.index, entry.title);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! **Extract one entry as audio**:
//! ```no_run
//! use plaudio_dl::audio::{AudioFormat, AudioQuality, ExtractOptions};
//! use plaudio_dl::dl::download;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let opts = ExtractOptions::new(
//!     AudioFormat::Fallback,
//!     AudioQuality::BEST,
//!     "/music/%(title)s.%(ext)s".to_string(),
//! );
//!
//! let (path, info) = download("https://youtube.com/watch?v=example", (&opts).into())?;
//! println!("{} -> {:?}", info.title, path);
//! # Ok(())
//! # }
//! ```

pub mod audio;
pub mod dl;
