//! Logging setup.
//!
//! The terminal UI owns stdout/stderr while it runs, so records are written
//! to a file. Without a file, no logger is installed and `log` macros are
//! no-ops.

use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};
use env_logger::{Builder, Env, Target};
use super::config::AppConfig;

/// Filter directives, e.g. `debug` or `formulary=trace`.
pub const LOG_FILTER_ENV: &str = "FORMULARY_LOG";

/// Overrides `log_file` from the config.
pub const LOG_FILE_ENV: &str = "FORMULARY_LOG_FILE";

/// The log file to use: `override_path` if set, else the config's `log_file`.
pub fn log_file_path(override_path: Option<PathBuf>, config: &AppConfig) -> Option<PathBuf> {
    override_path.or_else(|| config.log_file.as_ref().map(PathBuf::from))
}

/// Installs the global logger writing to `log_file`, appending.
///
/// Returns `Ok(false)` when no file is given.
pub fn init(log_file: Option<&Path>) -> io::Result<bool> {
    let Some(path) = log_file else {
        return Ok(false);
    };

    let file = OpenOptions::new().create(true).append(true).open(path)?;

    Builder::from_env(Env::default().filter_or(LOG_FILTER_ENV, "info"))
        .target(Target::Pipe(Box::new(file)))
        .format_timestamp_millis()
        .try_init()
        .map_err(io::Error::other)?;

    Ok(true)
}
