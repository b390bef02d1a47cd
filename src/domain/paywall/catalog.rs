//! Catalog request and resolution value objects.
//!
//! A catalog request names the products the paywall wants to present;
//! resolution fetches their display metadata from the purchasing
//! service. Resolution is complete only when every requested product
//! came back: a partial catalog must never reach the picker.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{ProductId, ValidationError};

/// The subscription products offered on the paywall, one per tier.
pub static DEFAULT_PRODUCT_IDS: Lazy<[ProductId; 3]> = Lazy::new(|| {
    [
        ProductId::new("pro_weekly").expect("static product id"),
        ProductId::new("pro_monthly").expect("static product id"),
        ProductId::new("pro_yearly").expect("static product id"),
    ]
});

/// Billing period of a recurring subscription product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionPeriod {
    Weekly,
    Monthly,
    Yearly,
}

/// An ordered, duplicate-free set of product identifiers to resolve.
///
/// Order is preserved because it is the order the picker presents the
/// tiers in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductCatalogRequest {
    ids: Vec<ProductId>,
}

impl ProductCatalogRequest {
    /// Creates a request from an ordered list of identifiers.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if the list is empty or contains a
    /// duplicate identifier.
    pub fn new(ids: Vec<ProductId>) -> Result<Self, ValidationError> {
        if ids.is_empty() {
            return Err(ValidationError::empty_field("product_ids"));
        }
        for (index, id) in ids.iter().enumerate() {
            if ids[..index].contains(id) {
                return Err(ValidationError::duplicate_value("product_ids", id.as_str()));
            }
        }
        Ok(Self { ids })
    }

    /// Parses raw identifier strings into a request.
    pub fn from_raw(raw: &[String]) -> Result<Self, ValidationError> {
        let ids = raw
            .iter()
            .map(|s| ProductId::new(s.clone()))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(ids)
    }

    /// The requested identifiers, in presentation order.
    pub fn ids(&self) -> &[ProductId] {
        &self.ids
    }

    /// Number of requested products.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// A valid request is never empty; kept for clippy's sake.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Resolved metadata for a single purchasable product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Store identifier.
    pub id: ProductId,

    /// Localized display name (e.g. "Pro Weekly").
    pub display_name: String,

    /// Localized, formatted price string (e.g. "$1.99").
    pub display_price: String,

    /// Billing period of the subscription.
    pub period: SubscriptionPeriod,
}

/// Outcome of one catalog resolution for a session.
///
/// Transitions at most once per session presentation:
/// `Unresolved -> Resolved` on success or `Unresolved -> Failed` on
/// service failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogResolution {
    /// No response from the purchasing service yet.
    Unresolved,

    /// The service returned these products (possibly fewer than asked).
    Resolved(Vec<Product>),

    /// The service could not resolve any products.
    Failed,
}

impl CatalogResolution {
    /// True when every requested product was resolved.
    ///
    /// A partial catalog is deliberately not complete: the paywall
    /// stays in its loading state rather than presenting a
    /// partially-populated picker.
    pub fn is_complete(&self, request: &ProductCatalogRequest) -> bool {
        match self {
            CatalogResolution::Resolved(products) => products.len() == request.len(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn request_of(ids: &[&str]) -> ProductCatalogRequest {
        ProductCatalogRequest::new(
            ids.iter().map(|s| ProductId::new(*s).unwrap()).collect(),
        )
        .unwrap()
    }

    fn product(id: &str) -> Product {
        Product {
            id: ProductId::new(id).unwrap(),
            display_name: id.to_string(),
            display_price: "$1.99".to_string(),
            period: SubscriptionPeriod::Weekly,
        }
    }

    #[test]
    fn default_product_ids_cover_the_three_tiers() {
        let ids: Vec<&str> = DEFAULT_PRODUCT_IDS.iter().map(|id| id.as_str()).collect();
        assert_eq!(ids, vec!["pro_weekly", "pro_monthly", "pro_yearly"]);
    }

    #[test]
    fn request_preserves_order() {
        let request = request_of(&["pro_weekly", "pro_monthly", "pro_yearly"]);
        let ids: Vec<&str> = request.ids().iter().map(|id| id.as_str()).collect();
        assert_eq!(ids, vec!["pro_weekly", "pro_monthly", "pro_yearly"]);
    }

    #[test]
    fn request_rejects_empty_list() {
        assert!(ProductCatalogRequest::new(vec![]).is_err());
    }

    #[test]
    fn request_rejects_duplicates() {
        let result = ProductCatalogRequest::new(vec![
            ProductId::new("pro_weekly").unwrap(),
            ProductId::new("pro_weekly").unwrap(),
        ]);
        assert_eq!(
            result,
            Err(ValidationError::duplicate_value("product_ids", "pro_weekly"))
        );
    }

    #[test]
    fn from_raw_rejects_empty_identifier() {
        let raw = vec!["pro_weekly".to_string(), "".to_string()];
        assert!(ProductCatalogRequest::from_raw(&raw).is_err());
    }

    #[test]
    fn full_resolution_is_complete() {
        let request = request_of(&["pro_weekly", "pro_monthly", "pro_yearly"]);
        let resolution = CatalogResolution::Resolved(vec![
            product("pro_weekly"),
            product("pro_monthly"),
            product("pro_yearly"),
        ]);
        assert!(resolution.is_complete(&request));
    }

    #[test]
    fn partial_resolution_is_not_complete() {
        let request = request_of(&["pro_weekly", "pro_monthly", "pro_yearly"]);
        let resolution =
            CatalogResolution::Resolved(vec![product("pro_weekly"), product("pro_monthly")]);
        assert!(!resolution.is_complete(&request));
    }

    #[test]
    fn failed_and_unresolved_are_never_complete() {
        let request = request_of(&["pro_weekly"]);
        assert!(!CatalogResolution::Failed.is_complete(&request));
        assert!(!CatalogResolution::Unresolved.is_complete(&request));
    }

    proptest! {
        /// Any accepted request holds pairwise-distinct, non-empty ids.
        #[test]
        fn accepted_requests_are_unique_and_non_empty(raw in proptest::collection::vec("[a-z_]{1,12}", 1..8)) {
            if let Ok(request) = ProductCatalogRequest::from_raw(&raw) {
                let ids = request.ids();
                for (index, id) in ids.iter().enumerate() {
                    prop_assert!(!id.as_str().is_empty());
                    prop_assert!(!ids[..index].contains(id));
                }
            }
        }

        /// A request with a repeated identifier is always rejected.
        #[test]
        fn duplicate_ids_are_always_rejected(id in "[a-z_]{1,12}", extra in proptest::collection::vec("[a-z_]{1,12}", 0..4)) {
            let mut raw = vec![id.clone()];
            raw.extend(extra);
            raw.push(id);
            prop_assert!(ProductCatalogRequest::from_raw(&raw).is_err());
        }
    }
}
