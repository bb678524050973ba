//! Session defaults.
//!
//! A [`SessionConfig`] holds the read and write consistency used by every command
//! that does not set its own. It can be built in code or loaded from JSON:
//!
//! ```
//! use riakmap::SessionConfig;
//!
//! let config = SessionConfig::from_json(r#"{ "write": { "w": 3, "dw": 2 } }"#).unwrap();
//! assert_eq!(config.write.w, Some(3));
//! assert_eq!(config.read.r, None);
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::Result;
use crate::transport::{ReadOptions, WriteOptions};

/// Default consistency options for a [`Session`](crate::Session).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub read: ReadOptions,
    pub write: WriteOptions,
}

impl SessionConfig {
    /// Parse a configuration from JSON. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|err| {
            ConfigError::Parse {
                reason: err.to_string(),
            }
            .into()
        })
    }

    pub fn with_read(mut self, read: ReadOptions) -> Self {
        self.read = read;
        self
    }

    pub fn with_write(mut self, write: WriteOptions) -> Self {
        self.write = write;
        self
    }
}

/// Configuration errors.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration could not be parsed.
    #[error("Invalid session configuration: {reason}")]
    Parse { reason: String },
}

impl From<ConfigError> for crate::Error {
    fn from(err: ConfigError) -> Self {
        crate::Error::Config(err)
    }
}
