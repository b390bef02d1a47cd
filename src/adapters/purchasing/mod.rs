//! Purchasing service adapters.
//!
//! The real purchasing service is the platform's in-app-purchase
//! framework, bridged in by the host application. This module provides
//! the in-memory double used by tests and local development.
//!
//! Adapters deliver purchase completions by decoding the platform's
//! wire-level outcome codes through `PurchaseOutcome::from_wire_code`,
//! which aborts on any code outside the contract; the mock takes the
//! same path.

mod mock_purchasing_service;

pub use mock_purchasing_service::{MethodCall, MockPurchasingService};
