use std::{fs, path::Path};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sql::{Binder, Dialect};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading config: {0}")]
    Io(#[from] std::io::Error),
    #[error("parsing config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Mapper and binder configuration.
///
/// - `max_depth` bounds how deep inline and embedded records may nest
///   before a destination type is rejected as recursive.
/// - `dialect` is the placeholder style used by `binder()`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub max_depth: usize,
    pub dialect: Dialect,
}

impl Default for Config {
    fn default() -> Self {
        Self { max_depth: 32, dialect: Dialect::default() }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Convenience: default config with the dialect picked from a driver name.
    pub fn for_driver(driver: &str) -> Self {
        Self::default().with_dialect(Dialect::for_driver(driver))
    }

    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Missing keys keep their defaults.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn binder(&self) -> Binder {
        Binder::new(self.dialect)
    }
}
