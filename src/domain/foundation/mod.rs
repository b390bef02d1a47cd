//! Foundation module containing shared domain primitives.
//!
//! Value objects used across the paywall domain: strongly-typed
//! identifiers, timestamps, validation errors, and the state machine
//! trait implemented by lifecycle status enums.

mod errors;
mod ids;
mod state_machine;
mod timestamp;

pub use errors::ValidationError;
pub use ids::{AttemptId, ProductId, StatusGroupId};
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
