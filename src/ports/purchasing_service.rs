//! Purchasing service port for the platform commerce backend.
//!
//! Defines the three operations the paywall core requires from the
//! platform's in-app-purchase framework. The transport and wire format
//! are owned by the platform adapter; the core only sees domain types.
//!
//! # Design
//!
//! - **Platform agnostic**: the session never names a concrete store
//! - **Push-based status**: subscription status arrives as a stream of
//!   snapshots, not a poll
//! - **No retries**: the core never retries a failed call; recovery is
//!   the user re-entering the screen

use async_trait::async_trait;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::StatusGroupId;
use crate::domain::paywall::{Product, ProductCatalogRequest, PurchaseOutcome, SubscriptionStatusSnapshot};

/// Potentially-infinite sequence of status snapshots, pushed on change.
pub type StatusStream = BoxStream<'static, SubscriptionStatusSnapshot>;

/// Port for the platform's commerce backend.
#[async_trait]
pub trait PurchasingService: Send + Sync {
    /// Resolve display metadata for a set of product identifiers.
    ///
    /// May return fewer products than requested when some identifiers
    /// are unknown to the store; the caller decides what a partial
    /// catalog means.
    async fn resolve_catalog(
        &self,
        request: &ProductCatalogRequest,
    ) -> Result<Vec<Product>, PurchasingError>;

    /// Run the platform purchase flow for a product to completion.
    ///
    /// A `Err` is a transport-level failure to even reach an outcome;
    /// user cancellation and platform-side purchase errors arrive as
    /// `Ok` outcomes.
    async fn initiate_purchase(&self, product: &Product)
        -> Result<PurchaseOutcome, PurchasingError>;

    /// Subscribe to status snapshots for a subscription group.
    ///
    /// The platform pushes a new snapshot whenever the group's renewal
    /// states change. The stream ends when the service shuts down.
    fn status_stream(&self, group_id: &StatusGroupId) -> StatusStream;
}

/// Errors from purchasing service operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchasingError {
    /// Error code for categorization.
    pub code: PurchasingErrorCode,

    /// Human-readable message.
    pub message: String,

    /// Whether the operation could be retried. Informational only; the
    /// paywall core never retries.
    pub retryable: bool,
}

impl PurchasingError {
    /// Create a new purchasing error.
    pub fn new(code: PurchasingErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            retryable: code.is_retryable(),
        }
    }

    /// Create a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(PurchasingErrorCode::NetworkError, message)
    }

    /// Create a not found error.
    pub fn not_found(resource: &str) -> Self {
        Self::new(
            PurchasingErrorCode::NotFound,
            format!("{} not found", resource),
        )
    }

    /// Create a provider error.
    pub fn provider(message: impl Into<String>) -> Self {
        Self::new(PurchasingErrorCode::ProviderError, message)
    }
}

impl std::fmt::Display for PurchasingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for PurchasingError {}

/// Purchasing error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PurchasingErrorCode {
    /// Network connectivity issue.
    NetworkError,

    /// Resource not found.
    NotFound,

    /// Store API error.
    ProviderError,

    /// Unknown error.
    Unknown,
}

impl PurchasingErrorCode {
    /// Check if this error type is typically retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(self, PurchasingErrorCode::NetworkError)
    }
}

impl std::fmt::Display for PurchasingErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PurchasingErrorCode::NetworkError => "network_error",
            PurchasingErrorCode::NotFound => "not_found",
            PurchasingErrorCode::ProviderError => "provider_error",
            PurchasingErrorCode::Unknown => "unknown",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Trait object safety test
    #[test]
    fn purchasing_service_is_object_safe() {
        fn _accepts_dyn(_service: &dyn PurchasingService) {}
    }

    #[test]
    fn purchasing_error_retryable() {
        assert!(PurchasingErrorCode::NetworkError.is_retryable());

        assert!(!PurchasingErrorCode::NotFound.is_retryable());
        assert!(!PurchasingErrorCode::ProviderError.is_retryable());
        assert!(!PurchasingErrorCode::Unknown.is_retryable());
    }

    #[test]
    fn purchasing_error_display() {
        let err = PurchasingError::network("store unreachable");
        assert!(err.to_string().contains("network_error"));
        assert!(err.to_string().contains("store unreachable"));
    }

    #[test]
    fn not_found_names_the_resource() {
        let err = PurchasingError::not_found("product 'pro_weekly'");
        assert!(err.to_string().contains("pro_weekly"));
    }
}
