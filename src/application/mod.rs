//! Application layer - session orchestration.
//!
//! This layer coordinates the domain lifecycle with the purchasing
//! service port and exposes read-only observable state to the
//! presentation layer.

mod session;

pub use session::PaywallSession;
