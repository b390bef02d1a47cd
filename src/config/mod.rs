//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment
//! variables using the `config` and `dotenvy` crates. Configuration is
//! loaded with the `PAYWALL_` prefix and nested values use double
//! underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use paywall_session::config::PaywallConfig;
//!
//! let config = PaywallConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Requesting {} products", config.catalog.product_ids.len());
//! ```

mod catalog;
mod error;

pub use catalog::CatalogConfig;
pub use error::{ConfigError, ValidationError};

use serde::Deserialize;

/// Root paywall configuration
///
/// Load using [`PaywallConfig::load()`] which reads from environment
/// variables, or rely on [`Default`] for the shipped store setup.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaywallConfig {
    /// Catalog configuration (product set, settling delay, status group)
    #[serde(default)]
    pub catalog: CatalogConfig,
}

impl PaywallConfig {
    /// Load configuration from environment variables
    ///
    /// Reads variables prefixed with `PAYWALL`, e.g.
    /// `PAYWALL__CATALOG__SETTLING_DELAY_MS=100`. A `.env` file is
    /// honored in development.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("PAYWALL")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.catalog.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = PaywallConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validation_surfaces_catalog_errors() {
        let mut config = PaywallConfig::default();
        config.catalog.product_ids.clear();
        assert!(config.validate().is_err());
    }
}
