//! Editor configuration
//!
//! Defaults are baked in; a JSON file may override any subset of fields and
//! command-line flags override the file.

use std::fs;
use std::path::{Path, PathBuf};

use editor_core::alloc_guard::DEFAULT_ALLOC_RETRIES;
use editor_core::clipboard::DEFAULT_CLIPBOARD_CAPACITY;
use editor_core::core::DEFAULT_TAB_WIDTH;
use editor_core::CoreConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("{0} must be greater than zero")]
    Zero(&'static str),
}

/// Editor preferences
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EditorConfig {
    /// Columns a tab expands to
    pub tab_width: usize,
    /// Clipboard size in bytes
    pub clipboard_capacity: usize,
    /// Allocation retries before aborting
    pub alloc_retries: u32,
    /// Reserve the bottom terminal row for mode and file status
    pub status_line: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            tab_width: DEFAULT_TAB_WIDTH,
            clipboard_capacity: DEFAULT_CLIPBOARD_CAPACITY,
            alloc_retries: DEFAULT_ALLOC_RETRIES,
            status_line: true,
        }
    }
}

impl EditorConfig {
    /// Parse and validate a JSON document
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON config file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json(&text)?;
        log::debug!("loaded config from {}: {:?}", path.display(), config);
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tab_width == 0 {
            return Err(ConfigError::Zero("tab_width"));
        }
        if self.clipboard_capacity == 0 {
            return Err(ConfigError::Zero("clipboard_capacity"));
        }
        Ok(())
    }

    pub fn core_config(&self) -> CoreConfig {
        CoreConfig {
            tab_width: self.tab_width,
            clipboard_capacity: self.clipboard_capacity,
            alloc_retries: self.alloc_retries,
        }
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
