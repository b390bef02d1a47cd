//! Loading state machine for the paywall screen.
//!
//! The screen stays hidden behind a spinner until the full product
//! catalog has resolved; a short settling delay is inserted before the
//! flip to Ready so the reveal reads as a deliberate fade rather than
//! an abrupt flash.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::StateMachine;

/// Readiness of the paywall for a single session presentation.
///
/// `Unloaded --[catalog resolves with full count]--> Settling
/// --[settling delay elapses]--> Ready`. Ready is terminal for the
/// session's lifetime; a failed or partial catalog fetch leaves the
/// session in Unloaded with no retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadingState {
    /// Catalog not resolved (or resolution failed/partial). The screen
    /// shows an indefinite loading indicator.
    Unloaded,

    /// Full catalog resolved; waiting out the settling delay.
    Settling,

    /// The screen is interactive. Never reverts.
    Ready,
}

impl LoadingState {
    /// True once the settling delay has elapsed after a full resolution.
    pub fn is_ready(&self) -> bool {
        matches!(self, LoadingState::Ready)
    }
}

impl StateMachine for LoadingState {
    fn can_transition_to(&self, target: &Self) -> bool {
        use LoadingState::*;
        matches!((self, target), (Unloaded, Settling) | (Settling, Ready))
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use LoadingState::*;
        match self {
            Unloaded => vec![Settling],
            Settling => vec![Ready],
            Ready => vec![],
        }
    }
}
