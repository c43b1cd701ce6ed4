//! Logging setup.
//!
//! The filter comes from `ODSGRID_LOG` (e.g. `ODSGRID_LOG=odsgrid_core=debug`)
//! and defaults to `warn`. While the terminal UI owns the screen, log lines
//! go to a file instead of stderr.

use anyhow::{Context, Result};
use std::io;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub const LOG_ENV: &str = "ODSGRID_LOG";
const DEFAULT_FILTER: &str = "warn";

/// Where log lines are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogOutput {
    Stderr,
    File(PathBuf),
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the global subscriber.
///
/// The returned guard flushes buffered file output on drop and must be held
/// for the life of the program.
pub fn init_logging(output: &LogOutput) -> Result<WorkerGuard> {
    let (writer, guard) = match output {
        LogOutput::Stderr => {
            let (non_blocking, guard) = tracing_appender::non_blocking(io::stderr());
            (non_blocking, guard)
        }
        LogOutput::File(path) => {
            let (dir, file_name) = split_log_path(path)?;
            std::fs::create_dir_all(&dir).context("Failed to create log directory")?;
            let file_appender = tracing_appender::rolling::never(&dir, file_name);
            tracing_appender::non_blocking(file_appender)
        }
    };

    let fmt_layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(matches!(output, LogOutput::Stderr))
        .with_target(true)
        .with_filter(env_filter());

    tracing_subscriber::registry()
        .with(fmt_layer)
        .try_init()
        .context("Failed to install log subscriber")?;

    Ok(guard)
}

fn split_log_path(path: &Path) -> Result<(PathBuf, &std::ffi::OsStr)> {
    let file_name = path
        .file_name()
        .with_context(|| format!("Log path has no file name: {}", path.display()))?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    Ok((dir, file_name))
}
