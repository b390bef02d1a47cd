//! Domain layer containing the paywall lifecycle types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (value objects, IDs, errors)
//! - `paywall` - Catalog resolution, loading state, purchase lifecycle,
//!   subscription status

pub mod foundation;
pub mod paywall;
