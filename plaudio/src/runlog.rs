//! Human-readable run log.
//!
//! Events are kept in memory for the duration of a run and written once at the
//! end as `download_log_<timestamp>.log`, one `<time> - <LEVEL> - <message>` line
//! per event. Each event is forwarded to `tracing` as it happens.

use chrono::{DateTime, Local, SecondsFormat};
use std::fmt;
use std::path::Path;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    Info,
    Warn,
    Error,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Info => "INFO",
            Self::Warn => "WARNING",
            Self::Error => "ERROR",
        })
    }
}

#[derive(Clone, Debug)]
pub struct LogEvent {
    pub time: DateTime<Local>,
    pub level: Level,
    pub message: String,
}

impl fmt::Display for LogEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {} - {}",
            self.time.to_rfc3339_opts(SecondsFormat::Millis, false),
            self.level,
            self.message
        )
    }
}

#[derive(Clone, Debug, Default)]
pub struct RunLog {
    events: Vec<LogEvent>,
}

impl RunLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(Level::Info, message.into());
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.push(Level::Warn, message.into());
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(Level::Error, message.into());
    }

    fn push(&mut self, level: Level, message: String) {
        // one line per event, even for multi-line yt-dlp errors
        let message = message.lines().collect::<Vec<_>>().join(" | ");

        match level {
            Level::Info => tracing::info!(target: "plaudio::run", "{message}"),
            Level::Warn => tracing::warn!(target: "plaudio::run", "{message}"),
            Level::Error => tracing::error!(target: "plaudio::run", "{message}"),
        }

        self.events.push(LogEvent {
            time: Local::now(),
            level,
            message,
        });
    }

    pub fn events(&self) -> &[LogEvent] {
        &self.events
    }

    /// Render all events, newline-terminated.
    pub fn render(&self) -> String {
        self.events.iter().map(|e| format!("{e}\n")).collect()
    }

    pub fn write(&self, path: &Path) -> std::io::Result<()> {
        std::fs::write(path, self.render())
    }
}
