//! Dispatcher configuration.
//!
//! Loadable from TOML:
//!
//! ```toml
//! [cache]
//! enabled = true
//! max_entries = 4096
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Configuration for a [`Dispatcher`](crate::Dispatcher).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Dispatch cache configuration.
    pub cache: CacheConfig,
}

/// Dispatch cache configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Memoize resolutions. When disabled every call recomputes.
    pub enabled: bool,

    /// Upper bound on cached entries. A store that would exceed it clears
    /// the cache first; `Some(0)` stores nothing.
    pub max_entries: Option<usize>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_entries: None,
        }
    }
}

impl DispatchConfig {
    /// Parse a configuration from TOML source.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    /// Read and parse a TOML configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    /// A configuration with memoization turned off.
    pub fn uncached() -> Self {
        Self {
            cache: CacheConfig {
                enabled: false,
                max_entries: None,
            },
        }
    }
}
