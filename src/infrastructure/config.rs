//! Read-only startup configuration.
//!
//! The file is JSON; every field is optional and falls back to the
//! defaults below.
//!
//! ```json
//! {
//!   "formulas": [{ "name": "Circle area", "expression": "pi * r * r" }],
//!   "export_filename": "history.csv",
//!   "log_file": "formulary.log"
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use crate::domain::Formula;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "FORMULARY_CONFIG";

/// Config file looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "formulary.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormulaSeed {
    pub name: String,
    pub expression: String,
}

impl FormulaSeed {
    fn new(name: &str, expression: &str) -> Self {
        Self {
            name: name.to_string(),
            expression: expression.to_string(),
        }
    }

    pub fn to_formula(&self) -> Formula {
        Formula::new(self.name.clone(), self.expression.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Formulas placed in the book at startup.
    pub formulas: Vec<FormulaSeed>,
    /// Default file name offered by the history export prompt.
    pub export_filename: String,
    /// Where log records go; logging is off when unset.
    pub log_file: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            formulas: vec![
                FormulaSeed::new("Quadratic root", "(-b + sqrt(b*b - 4*a*c)) / (2*a)"),
                FormulaSeed::new("Circle area", "pi * r * r"),
                FormulaSeed::new("Hypotenuse", "sqrt(a*a + b*b)"),
                FormulaSeed::new("Continuous interest", "p * exp(r * t)"),
            ],
            export_filename: "history.csv".to_string(),
            log_file: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

pub struct ConfigRepository;

impl ConfigRepository {
    /// Picks the config file: the explicit path if given, otherwise
    /// [`DEFAULT_CONFIG_FILE`] inside `dir` when it exists.
    pub fn resolve_path(explicit: Option<PathBuf>, dir: &Path) -> Option<PathBuf> {
        explicit.or_else(|| {
            let candidate = dir.join(DEFAULT_CONFIG_FILE);
            candidate.is_file().then_some(candidate)
        })
    }

    pub fn load(path: &Path) -> Result<AppConfig, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Loads the resolved config file, or the defaults when there is none.
    pub fn load_or_default(explicit: Option<PathBuf>, dir: &Path) -> Result<AppConfig, ConfigError> {
        match Self::resolve_path(explicit, dir) {
            Some(path) => Self::load(&path),
            None => Ok(AppConfig::default()),
        }
    }
}
