//! Pipeline configuration.
//!
//! All knobs are carried in an explicit [`Config`] value handed to the
//! pipeline at construction. There is no global or module-level state.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default cadence of progress log lines in the annotation phase.
pub const DEFAULT_PROGRESS_BATCH_SIZE: usize = 25;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Root directory of the image asset tree to scan.
    pub asset_root: PathBuf,
    /// Location of the SQLite catalog database.
    pub store_location: PathBuf,
    /// Identifier of the captioning model, persisted with each result.
    pub caption_model: String,
    /// How many annotated records between progress log lines. Logging
    /// cadence only; selection and transactions are unaffected.
    #[serde(default = "default_progress_batch_size")]
    pub progress_batch_size: usize,
}

fn default_progress_batch_size() -> usize {
    DEFAULT_PROGRESS_BATCH_SIZE
}

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    load_config_from_str(&content)
}

pub fn load_config_from_str(content: &str) -> Result<Config, ConfigError> {
    let config: Config = serde_json::from_str(content)?;

    validate_config(&config)?;

    Ok(config)
}

fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.caption_model.trim().is_empty() {
        return Err(ConfigError::Validation {
            message: "captionModel must not be empty".to_string(),
        });
    }

    if config.asset_root.as_os_str().is_empty() {
        return Err(ConfigError::Validation {
            message: "assetRoot must not be empty".to_string(),
        });
    }

    if config.progress_batch_size == 0 {
        return Err(ConfigError::Validation {
            message: "progressBatchSize must be at least 1".to_string(),
        });
    }

    Ok(())
}
