//! CLI argument definitions using clap.

use crate::config::{Config, Mode};
use crate::error::Error;
use crate::extract::YtDlp;
use crate::orchestrator::{Orchestrator, RunReport};
use crate::prompt::{Prompter, Terminal};
use clap::Parser;
use color_eyre::Section;
use eyre::Result;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "plaudio")]
#[command(about = "Download YouTube playlists as lossless audio with an MP3 fallback")]
#[command(version)]
pub struct Cli {
    /// Playlist or video URL (prompted for when omitted)
    pub url: Option<String>,

    /// Output root directory (default: system audio directory)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// First playlist entry to download, 1-based
    #[arg(long)]
    pub start: Option<usize>,

    /// Last playlist entry to download, inclusive
    #[arg(long)]
    pub end: Option<usize>,

    /// WAV conversion quality, 0 (best) to 9 (worst)
    #[arg(short, long, default_value_t = 0)]
    pub quality: u8,

    /// Hide per-download progress
    #[arg(long)]
    pub no_progress: bool,
}

/// Execute CLI command - separated for testing.
pub fn run_cli(mut cli: Cli) -> Result<()> {
    tracing::debug!(?cli, "parsed arguments");

    if cli.url.is_none() {
        Prompter::new(Terminal::default()).complete(&mut cli)?;
    }

    execute(cli.try_into()?)
}

pub fn execute(config: Config) -> Result<()> {
    tracing::info!(
        url = config.url,
        mode = ?config.mode,
        output = ?config.run.output_root.display(),
        "starting download"
    );

    let orchestrator = Orchestrator::new(YtDlp, config.run);

    let result = match config.mode {
        Mode::Playlist => orchestrator.run(&config.url),
        Mode::Single => orchestrator.run_single(&config.url),
    };

    let report = result.map_err(|e| match e {
        Error::Resolution(_) => eyre::Report::new(e)
            .suggestion("check that the URL is correct and the playlist is public"),
        Error::Range(_) => {
            eyre::Report::new(e).suggestion("pick --start/--end within the playlist length")
        }
        e => eyre::Report::new(e),
    })?;

    print!("{}", render_report(&report));

    Ok(())
}

/// Final run summary with the failed entries listed.
fn render_report(report: &RunReport) -> String {
    let mut out = format!(
        "playlist: {}\nsaved to: {}\n\n{}\n",
        report.playlist_title,
        report.output_dir.display(),
        report.summary()
    );

    if !report.failures.is_empty() {
        out.push_str("\nfailed:\n");
        for failed in &report.failures {
            out.push_str(&format!("  {:02}. {}\n", failed.index, failed.title));
            out.push_str(&format!("      {}\n", failed.error));
        }
    }

    out.push_str(&format!("\nlog: {}\n", report.log_path.display()));
    out
}
