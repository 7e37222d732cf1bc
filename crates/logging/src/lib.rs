//! Logging initialization for the typenav host.
//!
//! It supports two modes:
//! - CLI mode: logs to STDERR, keeping STDOUT clean for listings and JSON output.
//! - File mode: logs JSON lines to a rolling file in the given directory.
//!
//! File logs are rolled over when they reach 5 MB. Rotated logs are
//! compressed. The maximum number of rotated logs is 20.

use anyhow::{Context, Result};
use file_rotate::{ContentLimit, FileRotate, compression::Compression, suffix::AppendCount};
use std::io::IsTerminal;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt::writer::MakeWriterExt};

pub const LOG_FILE_NAME: &str = "typenav.log";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogMode {
    Cli,
    File { directory: PathBuf },
}

/// Guard that keeps background logging workers alive.
pub struct LoggingGuards {
    _guards: Vec<WorkerGuard>,
}

fn build_filter(verbose: bool, default_level: &str) -> EnvFilter {
    if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
    }
}

pub fn init(mode: LogMode, verbose: bool) -> Result<Option<LoggingGuards>> {
    match mode {
        LogMode::Cli => {
            tracing_subscriber::fmt()
                .with_env_filter(build_filter(verbose, "warn"))
                .with_writer(std::io::stderr)
                .with_ansi(std::io::stderr().is_terminal())
                .with_target(false)
                .compact()
                .init();
            Ok(None)
        }
        LogMode::File { directory } => {
            std::fs::create_dir_all(&directory).with_context(|| {
                format!("Failed to create log directory {}", directory.display())
            })?;

            let writer = FileRotate::new(
                directory.join(LOG_FILE_NAME),
                AppendCount::new(20),
                ContentLimit::Bytes(5 * 1024 * 1024),
                Compression::OnRotate(1),
                None,
            );

            let (non_blocking, guard) = tracing_appender::non_blocking(writer);

            tracing_subscriber::fmt()
                .with_env_filter(build_filter(verbose, "info"))
                .with_writer(non_blocking.with_max_level(tracing::Level::DEBUG))
                .with_ansi(false)
                .json()
                .init();

            Ok(Some(LoggingGuards {
                _guards: vec![guard],
            }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbose_forces_debug() {
        let filter = build_filter(true, "warn");
        assert_eq!(filter.to_string(), "debug");
    }
}
