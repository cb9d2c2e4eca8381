//! Configuration
//!
//! Layered with the `config` crate. Precedence: built-in defaults (lowest),
//! optional config file, then `FILEQ__`-prefixed environment variables with
//! `__` separating nested keys (e.g. `FILEQ__HANDLES__CREATE_PARENTS=false`).

use crate::encoding::Encoding;
use crate::error::ConfigError;
use crate::logging::LoggingConfig;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

fn default_true() -> bool {
    true
}

/// Behavior shared by every handle a registry creates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandleConfig {
    /// Encoding used by `read()` and `write()`
    #[serde(default)]
    pub default_encoding: Encoding,

    /// Whether `create()` makes missing parent directories
    #[serde(default = "default_true")]
    pub create_parents: bool,
}

impl Default for HandleConfig {
    fn default() -> Self {
        Self {
            default_encoding: Encoding::default(),
            create_parents: default_true(),
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileqConfig {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub handles: HandleConfig,
}

/// Configuration loader facade.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load from the environment only.
    pub fn load() -> Result<FileqConfig, ConfigError> {
        Self::build(None, None)
    }

    /// Load from a config file (format by extension) with environment overlay.
    pub fn load_from_file(path: &Path) -> Result<FileqConfig, ConfigError> {
        Self::build(Some(path), None)
    }

    fn build(
        file: Option<&Path>,
        env: Option<config::Map<String, String>>,
    ) -> Result<FileqConfig, ConfigError> {
        let mut builder = Config::builder();
        if let Some(path) = file {
            builder = builder.add_source(File::from(path).required(true));
        }
        builder = builder.add_source(
            Environment::with_prefix("FILEQ")
                .separator("__")
                .try_parsing(true)
                .source(env),
        );

        let config: FileqConfig = builder.build()?.try_deserialize()?;
        config.logging.validate()?;
        Ok(config)
    }
}
