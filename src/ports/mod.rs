//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `PurchasingService` - the platform commerce backend the session
//!   consumes (catalog resolution, purchase initiation, status stream)

mod purchasing_service;

pub use purchasing_service::{PurchasingError, PurchasingErrorCode, PurchasingService, StatusStream};
