//! Store and logging settings.
//!
//! Nothing is read from files, flags or the environment; callers start from
//! `StoreConfig::default()` and adjust fields in code.

use crate::db::SequenceReset;
use crate::logging::default_log_level;
use std::path::{Path, PathBuf};

/// Default database file, relative to the working directory.
pub const DEFAULT_DB_FILE: &str = "escuela.db";
/// Default log directory, relative to the working directory.
pub const DEFAULT_LOG_DIR: &str = "logs";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub db_path: PathBuf,
    pub sequence_reset: SequenceReset,
    pub log_level: &'static str,
    pub log_dir: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_FILE),
            sequence_reset: SequenceReset::default(),
            log_level: default_log_level(),
            log_dir: PathBuf::from(DEFAULT_LOG_DIR),
        }
    }
}

impl StoreConfig {
    /// Resolves relative paths against `base`.
    pub fn resolved_against(mut self, base: &Path) -> Self {
        if self.db_path.is_relative() {
            self.db_path = base.join(&self.db_path);
        }
        if self.log_dir.is_relative() {
            self.log_dir = base.join(&self.log_dir);
        }
        self
    }
}
