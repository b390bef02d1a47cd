//! Paywall Session - Product catalog and purchase lifecycle core.
//!
//! This crate implements the loading/ready lifecycle of a subscription
//! paywall: resolving product metadata from an external purchasing
//! service, gating readiness behind a settling delay, relaying purchase
//! lifecycle events, and deriving a premium flag from the platform's
//! subscription-status stream.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
