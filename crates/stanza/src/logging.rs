//! Tracing setup. The TUI owns the terminal, so logs go to a file unless the
//! viewer runs in print mode.

use anyhow::{Context, Result};
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Build the filter from an explicit directive, then `RUST_LOG`, then `fallback`
pub fn filter(explicit: Option<&str>, fallback: &str) -> EnvFilter {
    if let Some(directive) = explicit {
        if let Ok(filter) = EnvFilter::try_new(directive) {
            return filter;
        }
        eprintln!("Warning: invalid log level {directive:?}, using {fallback:?}");
    }
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(fallback))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Log to `path`, creating its directory. Keep the guard alive until exit so
/// buffered lines are flushed.
pub fn init_file(filter: EnvFilter, path: &Path) -> Result<WorkerGuard> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .context(format!("Log path has no file name: {}", path.display()))?;

    std::fs::create_dir_all(dir)
        .context(format!("Failed to create log directory: {}", dir.display()))?;
    let appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(name)
        .build(dir)
        .context(format!("Failed to open log file: {}", path.display()))?;
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_ansi(false).with_writer(writer))
        .try_init()
        .context("Failed to install tracing subscriber")?;
    Ok(guard)
}

/// Log to stderr, used when nothing else is drawing on the terminal
pub fn init_stderr(filter: EnvFilter) -> Result<()> {
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .try_init()
        .context("Failed to install tracing subscriber")?;
    Ok(())
}
