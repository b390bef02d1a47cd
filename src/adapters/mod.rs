//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `purchasing` - purchasing service doubles (in-memory mock)

pub mod purchasing;

pub use purchasing::{MethodCall, MockPurchasingService};
