use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Tunables of the payload transform.
///
/// Every field has a default so an empty JSON object is a valid config.
///
/// # Examples
/// ```
/// use bucketparse_core::ParserOptions;
///
/// let options = ParserOptions::from_json_str(r#"{"copy_time": true}"#)?;
/// assert!(options.copy_time);
/// assert!(!ParserOptions::default().copy_time);
/// # Ok::<(), bucketparse_core::ConfigError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParserOptions {
    /// Copy the source record's `time` onto decoded fields.
    #[serde(default = "default_copy_time")]
    pub copy_time: bool,
}

fn default_copy_time() -> bool {
    false
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            copy_time: default_copy_time(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Json(#[from] serde_json::Error),
}

impl ParserOptions {
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&text)
    }
}
