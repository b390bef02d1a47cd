//! Paywall domain module.
//!
//! Covers the catalog/loading lifecycle that gates when the paywall
//! becomes interactive, the purchase attempt lifecycle, and the
//! subscription status snapshots the premium flag is derived from.
//!
//! # Module Structure
//!
//! - `catalog` - Catalog request/resolution value objects
//! - `loading` - LoadingState state machine
//! - `purchase` - PurchaseAttempt lifecycle and PurchaseOutcome
//! - `status` - Subscription status snapshots
//! - `errors` - PaywallError

mod catalog;
mod errors;
mod loading;
mod purchase;
mod status;

pub use catalog::{
    CatalogResolution, Product, ProductCatalogRequest, SubscriptionPeriod, DEFAULT_PRODUCT_IDS,
};
pub use errors::PaywallError;
pub use loading::LoadingState;
pub use purchase::{PurchaseAttempt, PurchaseAttemptState, PurchaseOutcome, ReceiptToken};
pub use status::{SubscriptionState, SubscriptionStatusSnapshot};
