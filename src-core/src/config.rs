//! Application Configuration
//!
//! Where the store and logs live, plus a few tunables. Read from an optional
//! `settings.json` in the data directory; every field has a default.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::domain::{DomainError, DomainResult};
use crate::repository::STORE_FILE;

/// Name of the optional settings file inside the data directory
pub const SETTINGS_FILE: &str = "settings.json";

/// Application directory name under the platform data directory
pub const APP_DIR: &str = "CoreTasks";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Private data directory holding the store file. Empty in `Default`;
    /// `load` and `with_data_dir` always set it.
    pub data_dir: PathBuf,
    /// Store file name inside `data_dir`
    pub store_file: String,
    /// Log directory; `<data_dir>/logs` when unset
    pub log_dir: Option<PathBuf>,
    /// Minimum log level: error, warn, info, debug or trace
    pub log_level: String,
    /// Rotate the log file once it grows past this many bytes
    pub log_max_bytes: u64,
    /// Rotated log files to keep
    pub log_max_files: usize,
    /// Capacity of the working-set change channel
    pub change_buffer: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::new(),
            store_file: STORE_FILE.to_string(),
            log_dir: None,
            log_level: "info".to_string(),
            log_max_bytes: 1024 * 1024,
            log_max_files: 3,
            change_buffer: 1024,
        }
    }
}

impl AppConfig {
    /// Defaults rooted at `data_dir`
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Default::default()
        }
    }

    /// Load `settings.json` from `data_dir` if present.
    ///
    /// A missing file yields defaults; a malformed one is an error. The
    /// directory the file was found in always wins over a `data_dir` value
    /// inside it.
    pub fn load(data_dir: &Path) -> DomainResult<Self> {
        let path = data_dir.join(SETTINGS_FILE);
        let mut config = match std::fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str::<AppConfig>(&raw).map_err(|e| {
                DomainError::InvalidInput(format!("{}: {}", path.display(), e))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => AppConfig::default(),
            Err(e) => return Err(DomainError::Internal(format!("{}: {}", path.display(), e))),
        };
        config.data_dir = data_dir.to_path_buf();

        if config.change_buffer == 0 {
            return Err(DomainError::InvalidInput("change_buffer must be at least 1".into()));
        }
        Ok(config)
    }

    /// Full path of the store file
    pub fn store_path(&self) -> PathBuf {
        self.data_dir.join(&self.store_file)
    }

    pub fn log_dir(&self) -> PathBuf {
        self.log_dir
            .clone()
            .unwrap_or_else(|| self.data_dir.join("logs"))
    }
}

/// Platform private data directory for the application.
///
/// Fails with `StoreUnavailable` when the platform has no data directory;
/// the store is never placed relative to the working directory.
pub fn default_data_dir() -> DomainResult<PathBuf> {
    app_dir_under(dirs::data_dir())
}

fn app_dir_under(data_home: Option<PathBuf>) -> DomainResult<PathBuf> {
    data_home
        .map(|dir| dir.join(APP_DIR))
        .ok_or_else(|| DomainError::store_unavailable("Could not determine the data directory"))
}
