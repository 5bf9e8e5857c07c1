//! plaudio: download YouTube playlists as audio.
//!
//! Each entry is extracted as lossless WAV, falling back to 320 kbit/s MP3 when
//! that fails. Entries already on disk are skipped, and every run leaves a
//! human-readable log plus JSON records of failed entries and failed format
//! attempts.
//!
//! # Quick Start
//!
//! ```no_run
//! use plaudio::extract::YtDlp;
//! use plaudio::orchestrator::{Orchestrator, RunConfig};
//! use plaudio::range::RangeRequest;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = RunConfig::new("/music").with_range(RangeRequest::new(Some(5), Some(10))?);
//!
//! let report = Orchestrator::new(YtDlp, config)
//!     .run("https://www.youtube.com/playlist?list=example")?;
//!
//! println!("{}", report.summary());
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod extract;
pub mod naming;
pub mod orchestrator;
pub mod prompt;
pub mod range;
pub mod record;
pub mod runlog;
