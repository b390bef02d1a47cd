//! Catalog configuration

use std::time::Duration;

use serde::Deserialize;

use super::error::ValidationError;
use crate::domain::foundation::StatusGroupId;
use crate::domain::paywall::{ProductCatalogRequest, DEFAULT_PRODUCT_IDS};

/// Default settling delay between full catalog resolution and Ready.
///
/// Chosen so the reveal reads as a deliberate fade rather than an
/// abrupt flash.
const DEFAULT_SETTLING_DELAY_MS: u64 = 100;

/// Default subscription group queried for status snapshots.
const DEFAULT_STATUS_GROUP_ID: &str = "445DECC7";

/// Catalog configuration (product set, settling delay, status group)
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    /// Product identifiers to resolve, in picker order.
    #[serde(default = "default_product_ids")]
    pub product_ids: Vec<String>,

    /// Delay in milliseconds between full catalog resolution and Ready.
    #[serde(default = "default_settling_delay_ms")]
    pub settling_delay_ms: u64,

    /// Subscription group identifier for status queries.
    #[serde(default = "default_status_group_id")]
    pub status_group_id: String,
}

fn default_product_ids() -> Vec<String> {
    DEFAULT_PRODUCT_IDS
        .iter()
        .map(|id| id.as_str().to_string())
        .collect()
}

fn default_settling_delay_ms() -> u64 {
    DEFAULT_SETTLING_DELAY_MS
}

fn default_status_group_id() -> String {
    DEFAULT_STATUS_GROUP_ID.to_string()
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            product_ids: default_product_ids(),
            settling_delay_ms: default_settling_delay_ms(),
            status_group_id: default_status_group_id(),
        }
    }
}

impl CatalogConfig {
    /// Validate catalog configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.product_ids.is_empty() {
            return Err(ValidationError::MissingRequired("PAYWALL__CATALOG__PRODUCT_IDS"));
        }
        for (index, id) in self.product_ids.iter().enumerate() {
            if id.trim().is_empty() {
                return Err(ValidationError::EmptyProductId);
            }
            if self.product_ids[..index].contains(id) {
                return Err(ValidationError::DuplicateProductId(id.clone()));
            }
        }
        if self.status_group_id.trim().is_empty() {
            return Err(ValidationError::EmptyStatusGroupId);
        }
        Ok(())
    }

    /// The configured products as a domain catalog request.
    ///
    /// Infallible after `validate()`; before that the domain constructor
    /// re-checks the same constraints.
    pub fn catalog_request(&self) -> Result<ProductCatalogRequest, crate::domain::foundation::ValidationError> {
        ProductCatalogRequest::from_raw(&self.product_ids)
    }

    /// The configured status group as a domain identifier.
    pub fn group_id(&self) -> Result<StatusGroupId, crate::domain::foundation::ValidationError> {
        StatusGroupId::new(self.status_group_id.clone())
    }

    /// The settling delay as a std duration.
    pub fn settling_delay(&self) -> Duration {
        Duration::from_millis(self.settling_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_store_setup() {
        let config = CatalogConfig::default();
        assert_eq!(
            config.product_ids,
            vec!["pro_weekly", "pro_monthly", "pro_yearly"]
        );
        assert_eq!(config.settling_delay_ms, 100);
        assert_eq!(config.status_group_id, "445DECC7");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn settling_delay_converts_to_duration() {
        let config = CatalogConfig::default();
        assert_eq!(config.settling_delay(), Duration::from_millis(100));
    }

    #[test]
    fn validation_rejects_empty_product_list() {
        let config = CatalogConfig {
            product_ids: vec![],
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn validation_rejects_blank_product_id() {
        let config = CatalogConfig {
            product_ids: vec!["pro_weekly".to_string(), "  ".to_string()],
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn validation_rejects_duplicate_product_id() {
        let config = CatalogConfig {
            product_ids: vec!["pro_weekly".to_string(), "pro_weekly".to_string()],
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::DuplicateProductId(id)) if id == "pro_weekly"
        ));
    }

    #[test]
    fn validation_rejects_empty_status_group() {
        let config = CatalogConfig {
            status_group_id: "".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn catalog_request_carries_configured_order() {
        let config = CatalogConfig::default();
        let request = config.catalog_request().unwrap();
        let ids: Vec<&str> = request.ids().iter().map(|id| id.as_str()).collect();
        assert_eq!(ids, vec!["pro_weekly", "pro_monthly", "pro_yearly"]);
    }
}
