//! File logging for the dashboard. The TUI owns stdout, so everything goes
//! to a log file in the data directory unless `--log-file` says otherwise.

use anyhow::{Context, Result};
use flexi_logger::{FileSpec, Logger, LoggerHandle};
use std::path::{Path, PathBuf};

const LOG_FILE_NAME: &str = "homedash.log";

/// Where log lines are written for `data_dir`, honoring an explicit override.
pub fn resolve_log_path(data_dir: &Path, log_file: Option<&Path>) -> PathBuf {
    match log_file {
        Some(path) => path.to_path_buf(),
        None => data_dir.join(LOG_FILE_NAME),
    }
}

/// Starts the logger. `RUST_LOG` takes precedence over `level`. The returned
/// handle must stay alive for the lifetime of the process.
pub fn init_logging(level: &str, path: &Path) -> Result<LoggerHandle> {
    let spec = FileSpec::try_from(path)
        .with_context(|| format!("invalid log file path {}", path.display()))?;
    let handle = Logger::try_with_env_or_str(level)
        .with_context(|| format!("invalid log level `{level}`"))?
        .log_to_file(spec)
        .append()
        .format_for_files(flexi_logger::detailed_format)
        .start()
        .context("failed to start logger")?;
    Ok(handle)
}
