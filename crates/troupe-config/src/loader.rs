//! Config file loading and validation.

use crate::error::ConfigError;
use crate::model::TroupeConfig;
use log::debug;
use std::path::Path;

/// Load and validate a config file, applying defaults for absent fields.
///
/// Files are parsed as json5, so comments and trailing commas are allowed.
pub fn load_config(path: impl AsRef<Path>) -> Result<TroupeConfig, ConfigError> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path)?;
    let value: serde_json::Value = json5::from_str(&raw)?;
    let config: TroupeConfig = serde_json::from_value(value)?;
    validate(&config)?;
    debug!("loaded config (path={})", path.display());
    Ok(config)
}

/// Reject configs that cannot produce a working memory store.
fn validate(config: &TroupeConfig) -> Result<(), ConfigError> {
    if config.memory.embedding_dimension == 0 {
        return Err(ConfigError::InvalidField {
            path: "memory.embedding_dimension".to_string(),
            message: "must be greater than zero".to_string(),
        });
    }
    if config.memory.storage_path.as_os_str().is_empty() {
        return Err(ConfigError::InvalidField {
            path: "memory.storage_path".to_string(),
            message: "must not be empty".to_string(),
        });
    }
    if config.memory.embeddings_path.as_os_str().is_empty() {
        return Err(ConfigError::InvalidField {
            path: "memory.embeddings_path".to_string(),
            message: "must not be empty".to_string(),
        });
    }
    Ok(())
}
