//! Paywall domain errors.

use thiserror::Error;

use crate::domain::foundation::{ProductId, ValidationError};

/// Errors surfaced by the paywall session to its caller.
///
/// Catalog resolution failures are deliberately absent: they surface
/// only as the loading state never reaching Ready (the screen keeps its
/// indefinite spinner), never as an error to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaywallError {
    /// A value object failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// `begin_purchase` called while an attempt is already outstanding.
    /// Simultaneous purchases are not a supported scenario.
    #[error("a purchase of '{product_id}' is already in flight")]
    PurchaseAlreadyInFlight { product_id: ProductId },

    /// `complete_purchase` called with no outstanding attempt.
    #[error("no purchase is in flight to complete")]
    NoPurchaseInFlight,
}
