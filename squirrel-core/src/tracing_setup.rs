//! Logging for squirrel runs.
//!
//! The console shows what the user asked for while a file next to the run
//! keeps every event, including each reactor callback, for later inspection.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use tracing::Level;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, fmt};

/// Name of the trace file, replaced on every run.
pub const TRACE_FILE_NAME: &str = "squirrel-last-run.log";

/// Directory used for the trace file when none is given.
pub const DEFAULT_LOGS_DIR: &str = "logs";

/// Installs the global subscriber: console output at `console_level`
/// (`RUST_LOG` takes precedence) plus a trace-level file in `logs_dir`.
///
/// Returns the path of the trace file.
///
/// # Errors
///
/// - `Box<dyn std::error::Error>` - If the trace file cannot be created or a
///   global subscriber is already installed
pub fn init_tracing(
    console_level: Level,
    logs_dir: Option<&Path>,
) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let trace_path = trace_file_path(logs_dir);
    if let Some(parent) = trace_path.parent() {
        fs::create_dir_all(parent)?;
    }
    let trace_file = File::create(&trace_path)?;

    let console = fmt::layer()
        .compact()
        .with_target(false)
        .with_filter(console_filter(console_level));

    let trace = fmt::layer()
        .with_ansi(false)
        .with_file(true)
        .with_line_number(true)
        .with_writer(trace_file)
        .with_filter(LevelFilter::TRACE);

    tracing_subscriber::registry()
        .with(console)
        .with(trace)
        .try_init()?;

    tracing::debug!(
        console = %console_level,
        trace_file = %trace_path.display(),
        "Tracing initialized"
    );
    Ok(trace_path)
}

/// Where the trace file of a run lands.
pub fn trace_file_path(logs_dir: Option<&Path>) -> PathBuf {
    logs_dir
        .unwrap_or_else(|| Path::new(DEFAULT_LOGS_DIR))
        .join(TRACE_FILE_NAME)
}

fn console_filter(level: Level) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(level).into())
        .from_env_lossy()
}

/// Console verbosity selectable on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum CliLogLevel {
    Error,
    Warn,
    #[default]
    Info,
    /// Also shows every file placed or removed
    Debug,
    /// Also shows trie restructuring
    Trace,
}

impl From<CliLogLevel> for Level {
    /// # Examples
    /// ```
    /// use squirrel_core::tracing_setup::CliLogLevel;
    ///
    /// assert_eq!(tracing::Level::from(CliLogLevel::Warn), tracing::Level::WARN);
    /// ```
    fn from(level: CliLogLevel) -> Self {
        match level {
            CliLogLevel::Error => Level::ERROR,
            CliLogLevel::Warn => Level::WARN,
            CliLogLevel::Info => Level::INFO,
            CliLogLevel::Debug => Level::DEBUG,
            CliLogLevel::Trace => Level::TRACE,
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::ValueEnum;

    use super::*;

    #[test]
    fn test_trace_file_path() {
        assert_eq!(
            trace_file_path(None),
            Path::new("logs").join("squirrel-last-run.log")
        );
        assert_eq!(
            trace_file_path(Some(Path::new("/tmp/run"))),
            Path::new("/tmp/run/squirrel-last-run.log")
        );
    }

    #[test]
    fn test_cli_log_level_names() {
        assert_eq!(CliLogLevel::from_str("warn", true), Ok(CliLogLevel::Warn));
        assert_eq!(CliLogLevel::from_str("TRACE", true), Ok(CliLogLevel::Trace));
        assert!(CliLogLevel::from_str("verbose", true).is_err());
        assert_eq!(Level::from(CliLogLevel::default()), Level::INFO);
    }
}
