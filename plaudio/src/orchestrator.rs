//! Playlist download orchestration.
//!
//! Entries are processed strictly in ascending index order, one at a time:
//!
//! 1. skip if `<NN> - <title>.<ext>` already exists for any supported extension
//! 2. try the lossless primary format
//! 3. on failure, try the lossy fallback format once
//! 4. record the outcome and continue; only resolution and range errors abort
//!
//! Each entry ends with one run log line carrying its outcome label, e.g.
//! `[3/6] success/fallback: Track 7 (<path>)`.
//!
//! The run log, failed entries, and failed format attempts are written under
//! `<output_root>/logs` after the last entry.

use crate::error::{Error, FetchError, ResolutionError, Result};
use crate::extract::{Extractor, Playlist, PlaylistEntry};
use crate::naming;
use crate::range::{DownloadRange, RangeRequest};
use crate::record::{DownloadResult, FailureRecord, FormatAttempt, RunSummary};
use crate::runlog::RunLog;
use chrono::Local;
use plaudio_dl::audio::{AudioFormat, AudioQuality, ExtractOptions};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Directory under the output root holding log artifacts.
pub const LOG_DIR: &str = "logs";

/// Error recorded for playlist items without a source URL.
pub const UNAVAILABLE: &str = "entry is unavailable";

/// Explicit configuration of one run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunConfig {
    pub output_root: PathBuf,
    pub range: RangeRequest,
    pub audio_quality: AudioQuality,
    /// Per-download percent, speed and ETA on stderr
    pub progress: bool,
}

impl RunConfig {
    pub fn new(output_root: impl Into<PathBuf>) -> Self {
        Self {
            output_root: output_root.into(),
            range: RangeRequest::all(),
            audio_quality: AudioQuality::BEST,
            progress: false,
        }
    }

    pub fn with_range(self, range: RangeRequest) -> Self {
        Self { range, ..self }
    }

    pub fn with_audio_quality(self, audio_quality: AudioQuality) -> Self {
        Self {
            audio_quality,
            ..self
        }
    }

    pub fn with_progress(self, progress: bool) -> Self {
        Self { progress, ..self }
    }

    pub fn log_dir(&self) -> PathBuf {
        self.output_root.join(LOG_DIR)
    }
}

/// Everything a finished run produced.
#[derive(Clone, Debug)]
pub struct RunReport {
    pub playlist_title: String,
    /// Directory the audio files were written to
    pub output_dir: PathBuf,
    pub results: Vec<DownloadResult>,
    pub failures: Vec<FailureRecord>,
    pub format_attempts: Vec<FormatAttempt>,
    pub log_path: PathBuf,
    /// Written only when at least one entry failed
    pub failures_path: Option<PathBuf>,
    /// Written only when at least one format attempt failed
    pub format_attempts_path: Option<PathBuf>,
}

impl RunReport {
    pub fn summary(&self) -> RunSummary {
        RunSummary::from_results(&self.results)
    }
}

/// How entries map onto the filesystem.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Layout {
    /// `<root>/<playlist>/<NN> - <title>.<ext>`, restricted to the configured range
    Playlist,
    /// `<root>/<title>.<ext>`, first entry only
    Single,
}

pub struct Orchestrator<E> {
    extractor: E,
    config: RunConfig,
    /// `%Y%m%d_%H%M%S` stamp shared by this run's log artifacts
    stamp: String,
    log: RunLog,
    results: Vec<DownloadResult>,
    failures: Vec<FailureRecord>,
    format_attempts: Vec<FormatAttempt>,
}

impl<E: Extractor> Orchestrator<E> {
    pub fn new(extractor: E, config: RunConfig) -> Self {
        Self {
            extractor,
            config,
            stamp: Local::now().format("%Y%m%d_%H%M%S").to_string(),
            log: RunLog::new(),
            results: Vec::new(),
            failures: Vec::new(),
            format_attempts: Vec::new(),
        }
    }

    /// Download every entry of the playlist at `url` within the configured range.
    pub fn run(self, url: &str) -> Result<RunReport> {
        self.execute(url, Layout::Playlist)
    }

    /// Download a single video into the output root.
    pub fn run_single(self, url: &str) -> Result<RunReport> {
        self.execute(url, Layout::Single)
    }

    fn execute(mut self, url: &str, layout: Layout) -> Result<RunReport> {
        self.log.info(format!("starting download: {url}"));

        let playlist = self.resolve(url)?;

        let (output_dir, entries) = match layout {
            Layout::Playlist => {
                let range = DownloadRange::resolve(self.config.range, playlist.entries.len())?;
                self.log.info(format!(
                    "download range: {} - {} ({} entries)",
                    range.start(),
                    range.end(),
                    range.len()
                ));

                let dir = self
                    .config
                    .output_root
                    .join(naming::playlist_dir_name(&playlist.title));
                let entries: Vec<_> = playlist
                    .entries
                    .iter()
                    .filter(|e| range.contains(e.index))
                    .cloned()
                    .collect();

                (dir, entries)
            }
            Layout::Single => {
                let entries: Vec<_> = playlist.entries.iter().take(1).cloned().collect();
                (self.config.output_root.clone(), entries)
            }
        };

        std::fs::create_dir_all(&output_dir).map_err(Error::io(&output_dir))?;
        self.log.info(format!("output directory: {}", output_dir.display()));

        let total = entries.len();
        for (position, entry) in entries.iter().enumerate() {
            let stem = match layout {
                Layout::Playlist => naming::entry_stem(entry.index, &entry.title),
                Layout::Single => naming::sanitize(&entry.title),
            };

            self.process(&output_dir, &stem, entry, position + 1, total);
        }

        self.finish(playlist.title, output_dir)
    }

    fn resolve(&mut self, url: &str) -> std::result::Result<Playlist, ResolutionError> {
        match self.extractor.resolve(url) {
            Ok(playlist) => {
                self.log.info(format!(
                    "resolved playlist: {} ({} entries)",
                    playlist.title,
                    playlist.entries.len()
                ));
                Ok(playlist)
            }
            Err(e) => {
                self.log.error(e.to_string());
                Err(e)
            }
        }
    }

    /// Handle one entry. Never fails: every outcome becomes a result.
    fn process(
        &mut self,
        dir: &Path,
        stem: &str,
        entry: &PlaylistEntry,
        position: usize,
        total: usize,
    ) {
        let progress = format!("[{position}/{total}]");

        if let Some(existing) = naming::find_existing(dir, stem) {
            self.record(DownloadResult::already_exists(entry, existing), &progress);
            return;
        }

        if entry.url.is_empty() {
            self.fail(entry, UNAVAILABLE.to_string(), &progress);
            return;
        }

        self.log.info(format!("{progress} downloading: {}", entry.title));

        let primary = ExtractOptions::new(
            AudioFormat::Primary,
            self.config.audio_quality,
            naming::output_template(dir, stem),
        )
        .with_progress(self.config.progress);

        let primary_err = match self.attempt(entry, &primary) {
            Ok(path) => {
                return self.record(
                    DownloadResult::success(entry, AudioFormat::Primary, path),
                    &progress,
                );
            }
            Err(e) => e,
        };

        self.log.warn(format!(
            "{progress} {} failed, retrying as {}: {} - {primary_err}",
            AudioFormat::Primary.codec(),
            AudioFormat::Fallback.codec(),
            entry.title
        ));

        let fallback = primary.with_format(AudioFormat::Fallback);

        let fallback_err = match self.attempt(entry, &fallback) {
            Ok(path) => {
                return self.record(
                    DownloadResult::success(entry, AudioFormat::Fallback, path),
                    &progress,
                );
            }
            Err(e) => e,
        };

        let error = format!(
            "{}: {}; {}: {}",
            AudioFormat::Primary.codec(),
            primary_err.message(),
            AudioFormat::Fallback.codec(),
            fallback_err.message()
        );

        match naming::remove_leftovers(dir, stem) {
            Ok(removed) => {
                for path in removed {
                    self.log
                        .info(format!("{progress} removed leftover: {}", path.display()));
                }
            }
            Err(e) => self
                .log
                .warn(format!("{progress} could not remove leftovers of {stem}: {e}")),
        }

        self.fail(entry, error, &progress);
    }

    fn fail(&mut self, entry: &PlaylistEntry, error: String, progress: &str) {
        self.failures.push(FailureRecord::new(entry, error.clone()));
        self.record(DownloadResult::failure(entry, error), progress);
    }

    /// Fetch in one format, recording the attempt if it fails.
    fn attempt(
        &mut self,
        entry: &PlaylistEntry,
        options: &ExtractOptions,
    ) -> std::result::Result<PathBuf, FetchError> {
        self.extractor.fetch(&entry.url, options).inspect_err(|e| {
            self.format_attempts.push(FormatAttempt::new(
                entry,
                options.preferred_format,
                e.message().to_string(),
            ));
        })
    }

    /// Log the entry's outcome and append it to the results.
    fn record(&mut self, result: DownloadResult, progress: &str) {
        let line = match (&result.path, &result.error) {
            (Some(path), _) => format!(
                "{progress} {}: {} ({})",
                result.outcome,
                result.title,
                path.display()
            ),
            (None, Some(error)) => {
                format!("{progress} {}: {} - {error}", result.outcome, result.title)
            }
            (None, None) => format!("{progress} {}: {}", result.outcome, result.title),
        };

        if result.outcome.is_success() {
            self.log.info(line);
        } else {
            self.log.error(line);
        }

        self.results.push(result);
    }

    /// Write the log artifacts and hand back the report.
    fn finish(mut self, playlist_title: String, output_dir: PathBuf) -> Result<RunReport> {
        let summary = RunSummary::from_results(&self.results);
        self.log.info(format!(
            "run finished - succeeded: {}, failed: {}, success rate: {:.1}%",
            summary.succeeded(),
            summary.failed,
            summary.success_rate()
        ));

        let log_dir = self.config.log_dir();
        std::fs::create_dir_all(&log_dir).map_err(Error::io(&log_dir))?;

        let failures_path = self.write_records("failed_downloads", &self.failures)?;
        if let Some(path) = &failures_path {
            self.log
                .info(format!("failed downloads saved to {}", path.display()));
        }

        let format_attempts_path = self.write_records("format_attempts", &self.format_attempts)?;
        if let Some(path) = &format_attempts_path {
            self.log
                .info(format!("format attempts saved to {}", path.display()));
        }

        let log_path = log_dir.join(format!("download_log_{}.log", self.stamp));
        self.log.write(&log_path).map_err(Error::io(&log_path))?;

        Ok(RunReport {
            playlist_title,
            output_dir,
            results: self.results,
            failures: self.failures,
            format_attempts: self.format_attempts,
            log_path,
            failures_path,
            format_attempts_path,
        })
    }

    /// Write `<log_dir>/<name>_<stamp>.json`, skipped for empty records.
    fn write_records<T: Serialize>(&self, name: &str, records: &[T]) -> Result<Option<PathBuf>> {
        if records.is_empty() {
            return Ok(None);
        }

        let path = self
            .config
            .log_dir()
            .join(format!("{name}_{}.json", self.stamp));

        let json = serde_json::to_string_pretty(records)?;
        std::fs::write(&path, json).map_err(Error::io(&path))?;

        Ok(Some(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RangeError;
    use crate::record::Outcome;
    use std::collections::HashSet;

    /// Scripted extractor: writes the requested file unless the entry/format is set to fail.
    #[derive(Default)]
    struct Scripted {
        entries: usize,
        failing: HashSet<(usize, AudioFormat)>,
        calls: Vec<(usize, AudioFormat)>,
    }

    impl Scripted {
        fn new(entries: usize) -> Self {
            Self {
                entries,
                ..Default::default()
            }
        }

        fn failing(mut self, index: usize, format: AudioFormat) -> Self {
            self.failing.insert((index, format));
            self
        }
    }

    fn index_of(url: &str) -> usize {
        url.rsplit('=').next().unwrap().parse().unwrap()
    }

    impl Extractor for Scripted {
        fn resolve(&mut self, url: &str) -> std::result::Result<Playlist, ResolutionError> {
            Ok(Playlist {
                title: format!("List {url}"),
                uploader: None,
                entries: (1..=self.entries)
                    .map(|index| PlaylistEntry {
                        index,
                        title: format!("Song {index}"),
                        url: format!("https://www.youtube.com/watch?v={index}"),
                    })
                    .collect(),
            })
        }

        fn fetch(
            &mut self,
            url: &str,
            options: &ExtractOptions,
        ) -> std::result::Result<PathBuf, FetchError> {
            let index = index_of(url);
            let format = options.preferred_format;
            self.calls.push((index, format));

            if self.failing.contains(&(index, format)) {
                return Err(FetchError::Download(format!("{} broke", format.codec())));
            }

            let path = PathBuf::from(options.output_template.replace("%(ext)s", format.codec()));
            std::fs::write(&path, b"audio").unwrap();
            Ok(path)
        }
    }

    #[test]
    fn records_fallback_and_failure() {
        let root = tempfile::tempdir().unwrap();
        let extractor = Scripted::new(3)
            .failing(2, AudioFormat::Primary)
            .failing(3, AudioFormat::Primary)
            .failing(3, AudioFormat::Fallback);

        let report = Orchestrator::new(extractor, RunConfig::new(root.path()))
            .run("x")
            .unwrap();

        let outcomes: Vec<_> = report.results.iter().map(|r| r.outcome).collect();
        assert_eq!(
            outcomes,
            [Outcome::SuccessPrimary, Outcome::SuccessFallback, Outcome::Failure]
        );

        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].error, "wav: wav broke; mp3: mp3 broke");

        let attempts: Vec<_> = report
            .format_attempts
            .iter()
            .map(|a| (a.index, a.format.as_str()))
            .collect();
        assert_eq!(attempts, [(2, "wav"), (3, "wav"), (3, "mp3")]);

        let dir = root.path().join("List x");
        assert!(dir.join("01 - Song 1.wav").is_file());
        assert!(dir.join("02 - Song 2.mp3").is_file());
        assert!(report.failures_path.unwrap().is_file());
        assert!(report.format_attempts_path.unwrap().is_file());
    }

    #[test]
    fn clean_run_writes_only_run_log() {
        let root = tempfile::tempdir().unwrap();

        let report = Orchestrator::new(Scripted::new(2), RunConfig::new(root.path()))
            .run("x")
            .unwrap();

        assert!(report.log_path.is_file());
        assert!(report.log_path.starts_with(root.path().join(LOG_DIR)));
        assert_eq!(report.failures_path, None);
        assert_eq!(report.format_attempts_path, None);
    }

    #[test]
    fn range_error_aborts_before_any_entry() {
        let root = tempfile::tempdir().unwrap();
        let config = RunConfig::new(root.path()).with_range(RangeRequest {
            start: Some(4),
            end: None,
        });

        let err = Orchestrator::new(Scripted::new(3), config)
            .run("x")
            .unwrap_err();

        assert!(matches!(
            err,
            Error::Range(RangeError::StartBeyondTotal { start: 4, total: 3 })
        ));
        assert_eq!(std::fs::read_dir(root.path()).unwrap().count(), 0);
    }

    #[test]
    fn single_video_lands_in_output_root() {
        let root = tempfile::tempdir().unwrap();

        let report = Orchestrator::new(Scripted::new(1), RunConfig::new(root.path()))
            .run_single("x")
            .unwrap();

        assert_eq!(report.output_dir, root.path());
        assert!(root.path().join("Song 1.wav").is_file());
        assert_eq!(report.results.len(), 1);
    }

    #[test]
    fn audio_quality_reaches_primary_attempt() {
        struct Capture(Vec<ExtractOptions>);

        impl Extractor for Capture {
            fn resolve(&mut self, url: &str) -> std::result::Result<Playlist, ResolutionError> {
                Scripted::new(1).resolve(url)
            }

            fn fetch(
                &mut self,
                _url: &str,
                options: &ExtractOptions,
            ) -> std::result::Result<PathBuf, FetchError> {
                self.0.push(options.clone());
                Err(FetchError::Download("offline".to_string()))
            }
        }

        let root = tempfile::tempdir().unwrap();
        let quality = AudioQuality::try_from(5).unwrap();
        let config = RunConfig::new(root.path()).with_audio_quality(quality);

        let mut orchestrator = Orchestrator::new(Capture(Vec::new()), config);
        let dir = root.path().to_path_buf();
        let entry = PlaylistEntry {
            index: 1,
            title: "Song".to_string(),
            url: "https://www.youtube.com/watch?v=1".to_string(),
        };
        orchestrator.process(&dir, "01 - Song", &entry, 1, 1);

        let captured = &orchestrator.extractor.0;
        assert_eq!(captured.len(), 2);
        assert_eq!(captured[0].audio_quality, quality);
        assert_eq!(captured[0].preferred_format, AudioFormat::Primary);
        assert_eq!(captured[1].preferred_format, AudioFormat::Fallback);
        assert_eq!(captured[0].output_template, captured[1].output_template);
        assert!(!captured[0].progress);
        assert_eq!(orchestrator.results[0].outcome, Outcome::Failure);
    }

    #[test]
    fn unavailable_entry_fails_without_attempts() {
        let root = tempfile::tempdir().unwrap();
        let mut orchestrator = Orchestrator::new(Scripted::new(1), RunConfig::new(root.path()));
        let entry = PlaylistEntry {
            index: 4,
            title: "[Private video]".to_string(),
            url: String::new(),
        };

        orchestrator.process(root.path(), "04 - [Private video]", &entry, 1, 1);

        assert!(orchestrator.extractor.calls.is_empty());
        assert!(orchestrator.format_attempts.is_empty());
        assert_eq!(orchestrator.results[0].outcome, Outcome::Failure);
        assert_eq!(orchestrator.failures[0].error, UNAVAILABLE);

        let lines: Vec<_> = orchestrator.log.events().iter().map(|e| &e.message).collect();
        assert_eq!(
            lines,
            ["[1/1] failure: [Private video] - entry is unavailable"]
        );
    }

    #[test]
    fn double_failure_removes_leftover_source() {
        struct Leaky;

        impl Extractor for Leaky {
            fn resolve(&mut self, url: &str) -> std::result::Result<Playlist, ResolutionError> {
                Scripted::new(1).resolve(url)
            }

            fn fetch(
                &mut self,
                _url: &str,
                options: &ExtractOptions,
            ) -> std::result::Result<PathBuf, FetchError> {
                // the source stream survives a failed conversion
                std::fs::write(options.output_template.replace("%(ext)s", "webm"), b"src").unwrap();
                Err(FetchError::Conversion("Postprocessing: ffmpeg exited".to_string()))
            }
        }

        let root = tempfile::tempdir().unwrap();
        let report = Orchestrator::new(Leaky, RunConfig::new(root.path()))
            .run("x")
            .unwrap();

        assert_eq!(report.results[0].outcome, Outcome::Failure);
        let dir = root.path().join("List x");
        assert_eq!(naming::find_existing(&dir, "01 - Song 1"), None);

        let rerun = Orchestrator::new(Scripted::new(1), RunConfig::new(root.path()))
            .run("x")
            .unwrap();
        assert_eq!(rerun.results[0].outcome, Outcome::SuccessPrimary);
    }

    #[test]
    fn playlist_named_logs_stays_out_of_log_dir() {
        struct Named;

        impl Extractor for Named {
            fn resolve(&mut self, _url: &str) -> std::result::Result<Playlist, ResolutionError> {
                Ok(Playlist {
                    title: "logs".to_string(),
                    ..Scripted::new(1).resolve("")?
                })
            }

            fn fetch(
                &mut self,
                url: &str,
                options: &ExtractOptions,
            ) -> std::result::Result<PathBuf, FetchError> {
                Scripted::new(1).fetch(url, options)
            }
        }

        let root = tempfile::tempdir().unwrap();
        let report = Orchestrator::new(Named, RunConfig::new(root.path()))
            .run("x")
            .unwrap();

        assert_eq!(report.output_dir, root.path().join("logs_"));
        assert!(report.output_dir.join("01 - Song 1.wav").is_file());
        assert!(!root.path().join(LOG_DIR).join("01 - Song 1.wav").exists());
    }

    #[test]
    fn long_cjk_titles_download() {
        struct Cjk;

        impl Extractor for Cjk {
            fn resolve(&mut self, _url: &str) -> std::result::Result<Playlist, ResolutionError> {
                Ok(Playlist {
                    title: "歌".repeat(150),
                    uploader: None,
                    entries: vec![PlaylistEntry {
                        index: 1,
                        title: "曲".repeat(100),
                        url: "https://www.youtube.com/watch?v=1".to_string(),
                    }],
                })
            }

            fn fetch(
                &mut self,
                url: &str,
                options: &ExtractOptions,
            ) -> std::result::Result<PathBuf, FetchError> {
                Scripted::new(1).fetch(url, options)
            }
        }

        let root = tempfile::tempdir().unwrap();
        let report = Orchestrator::new(Cjk, RunConfig::new(root.path()))
            .run("x")
            .unwrap();

        assert_eq!(report.results[0].outcome, Outcome::SuccessPrimary);
        assert!(report.results[0].path.as_ref().unwrap().is_file());
    }
}
