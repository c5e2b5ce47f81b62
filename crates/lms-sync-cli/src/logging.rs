//! Logger installation.
//!
//! The engine only emits `tracing` events; where they go is decided here,
//! once, from a [`LogSettings`] value built at startup.

use anyhow::{anyhow, Context, Result};
use lms_sync_core::AppConfig;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Destination for log events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogSink {
    Stderr,
    /// Appended to, never truncated
    File(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    pub verbose: bool,
    pub sink: LogSink,
    /// One JSON object per event instead of text lines
    pub json: bool,
}

impl LogSettings {
    /// Verbose runs log everything to a file; quiet runs only report errors
    /// on stderr.
    pub fn new(verbose: bool, log_file: Option<PathBuf>, json: bool) -> Self {
        let sink = if verbose {
            LogSink::File(log_file.unwrap_or_else(|| PathBuf::from(AppConfig::LOG_FILE_NAME)))
        } else {
            LogSink::Stderr
        };
        Self {
            verbose,
            sink,
            json,
        }
    }

    /// Whether `error!` events already reach the terminal.
    pub fn errors_on_stderr(&self) -> bool {
        self.sink == LogSink::Stderr
    }

    pub fn level(&self) -> LevelFilter {
        if self.verbose {
            LevelFilter::DEBUG
        } else {
            LevelFilter::ERROR
        }
    }

    fn env_filter(&self) -> EnvFilter {
        // RUST_LOG overrides the default level
        EnvFilter::builder()
            .with_default_directive(self.level().into())
            .from_env_lossy()
    }
}

/// Install the global subscriber described by `settings`.
pub fn init(settings: &LogSettings) -> Result<()> {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(settings.env_filter())
        .with_target(false);

    let installed = match (&settings.sink, settings.json) {
        (LogSink::Stderr, false) => builder.with_writer(std::io::stderr).compact().try_init(),
        (LogSink::Stderr, true) => builder.with_writer(std::io::stderr).json().try_init(),
        (LogSink::File(path), json) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            let builder = builder.with_writer(Mutex::new(file)).with_ansi(false);
            if json {
                builder.json().try_init()
            } else {
                builder.try_init()
            }
        }
    };

    installed.map_err(|e| anyhow!("Failed to install logger: {e}"))
}
