//! Configuration with JSON file support.
//!
//! Every field has a default, so an empty object `{}` is a valid file.
//! Values are layered: built-in defaults, then the file given with
//! `--config`, then command-line flags (see [`Args::apply_to`]).
//!
//! [`Args::apply_to`]: crate::cli::Args::apply_to

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::csv_handler::HeaderPolicy;
use crate::error::VoterRegistryError;
use crate::persistence::DEFAULT_DATA_FILE;
use crate::session::SessionOptions;
use crate::view::DEFAULT_ROWS_PER_PAGE;

/// Settings for the voter registry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// JSON file holding the stored record set.
    #[serde(default = "default_data_file")]
    pub data_file: PathBuf,

    /// Write the record set after every change.
    #[serde(default = "default_true")]
    pub auto_persist: bool,

    /// Rows per page in listings and the browser.
    #[serde(default = "default_rows_per_page")]
    pub rows_per_page: usize,

    /// How imported CSV headers are checked: "strict" or "positional".
    #[serde(default)]
    pub header_policy: HeaderPolicy,

    /// Log filter, e.g. "warn" or "info,voter_registry=debug".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Emit logs as JSON lines.
    #[serde(default)]
    pub json_logs: bool,

    /// Write logs to this file instead of stderr.
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

fn default_data_file() -> PathBuf {
    PathBuf::from(DEFAULT_DATA_FILE)
}

fn default_true() -> bool {
    true
}

fn default_rows_per_page() -> usize {
    DEFAULT_ROWS_PER_PAGE
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_file: default_data_file(),
            auto_persist: default_true(),
            rows_per_page: default_rows_per_page(),
            header_policy: HeaderPolicy::default(),
            log_level: default_log_level(),
            json_logs: false,
            log_file: None,
        }
    }
}

impl Config {
    /// Loads configuration from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self, VoterRegistryError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            VoterRegistryError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json_str(&content)
    }

    /// Parses configuration from a JSON string.
    pub fn from_json_str(s: &str) -> Result<Self, VoterRegistryError> {
        serde_json::from_str(s).map_err(|e| VoterRegistryError::Config(e.to_string()))
    }

    /// Rejects values no session can run with.
    pub fn validate(&self) -> Result<(), VoterRegistryError> {
        if self.rows_per_page == 0 {
            return Err(VoterRegistryError::InvalidArgument(
                "rows_per_page must be greater than zero".to_string(),
            ));
        }
        if self.data_file.as_os_str().is_empty() {
            return Err(VoterRegistryError::InvalidArgument(
                "data_file must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Options for opening a [`Session`](crate::session::Session).
    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            auto_persist: self.auto_persist,
            rows_per_page: self.rows_per_page,
            header_policy: self.header_policy,
        }
    }
}
