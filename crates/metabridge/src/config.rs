//! Connector configuration, read from TOML. Every field has a default, so an
//! empty document is a valid configuration.

use metabridge_core::catalog::CatalogVersion;
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fs, path::Path};
use thiserror::Error as ThisError;

///
/// ConfigError
///

#[derive(Debug, ThisError)]
#[remain::sorted]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Invalid(String),

    #[error("failed to read config file '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

///
/// ConnectorConfig
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConnectorConfig {
    pub catalog_version: CatalogVersion,

    /// Page size used when a caller asks for an unbounded result.
    pub max_page_size: usize,

    /// Catalog fields left out of free-text search, keyed by release
    /// string (e.g. "11.7.0.2").
    pub free_text_exclusions: BTreeMap<String, Vec<String>>,

    /// Generic types skipped by searches that name no type.
    pub search_all_excludes: Vec<String>,

    pub logging: LoggingConfig,
}

impl Default for ConnectorConfig {
    fn default() -> Self {
        Self {
            catalog_version: CatalogVersion::default(),
            max_page_size: 100,
            free_text_exclusions: BTreeMap::from([(
                CatalogVersion::V11702.to_string(),
                vec!["long_description".to_string()],
            )]),
            search_all_excludes: vec!["Referenceable".to_string()],
            logging: LoggingConfig::default(),
        }
    }
}

impl ConnectorConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;

        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;

        Self::from_toml_str(&source)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_page_size == 0 {
            return Err(ConfigError::Invalid("max_page_size cannot be 0".to_string()));
        }
        if self.logging.level.parse::<log::LevelFilter>().is_err() {
            return Err(ConfigError::Invalid(format!(
                "unknown log level '{}'",
                self.logging.level
            )));
        }
        for release in self.free_text_exclusions.keys() {
            if !CatalogVersion::ALL.iter().any(|v| v.to_string() == *release) {
                return Err(ConfigError::Invalid(format!(
                    "unknown catalog release '{release}' in free_text_exclusions"
                )));
            }
        }

        Ok(())
    }

    /// Free-text exclusions for the configured release.
    #[must_use]
    pub fn exclusions(&self) -> &[String] {
        self.free_text_exclusions
            .get(&self.catalog_version.to_string())
            .map_or(&[][..], Vec::as_slice)
    }
}

///
/// LoggingConfig
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}
