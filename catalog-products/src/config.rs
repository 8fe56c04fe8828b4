//! Catalog session configuration
//!
//! Sources, later ones overriding earlier ones:
//! 1. Built-in defaults
//! 2. An optional configuration file (TOML, YAML or JSON, by extension)
//! 3. Environment variables prefixed `CATALOG_`

use std::path::Path;

use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ConfigError;
use crate::query::DEFAULT_PAGE_SIZE;

/// Environment variable prefix for configuration overrides.
pub const ENV_PREFIX: &str = "CATALOG_";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Products per page
    pub page_size: usize,
    /// Seed the repository with the demo products
    pub seed_sample_products: bool,
    /// Seed the field registry with the built-in product fields
    pub builtin_fields: bool,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            seed_sample_products: false,
            builtin_fields: true,
        }
    }
}

impl CatalogConfig {
    /// Load from defaults, then `file` if given, then the environment.
    pub fn load(file: Option<&Path>) -> Result<Self, ConfigError> {
        let mut figment = Figment::new().merge(Serialized::defaults(Self::default()));

        if let Some(path) = file {
            if !path.is_file() {
                return Err(ConfigError::NotFound {
                    path: path.to_path_buf(),
                });
            }
            debug!(path = %path.display(), "loading catalog config file");
            figment = match path.extension().and_then(|e| e.to_str()) {
                Some("yaml") | Some("yml") => figment.merge(Yaml::file(path)),
                Some("json") => figment.merge(Json::file(path)),
                _ => figment.merge(Toml::file(path)),
            };
        }

        let config: Self = figment.merge(Env::prefixed(ENV_PREFIX)).extract()?;
        config.validate()?;
        debug!(?config, "catalog config loaded");
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.page_size == 0 {
            return Err(ConfigError::InvalidValue {
                key: "page_size".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}
