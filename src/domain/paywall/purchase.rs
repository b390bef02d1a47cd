//! Purchase attempt lifecycle and outcomes.
//!
//! One `PurchaseAttempt` exists per in-flight purchase; it is created
//! when the user initiates a purchase and discarded once a terminal
//! outcome has been reported. The purchasing service's completion
//! result is a closed set of four outcomes; anything outside that set
//! is a contract violation and aborts (see [`PurchaseOutcome::from_wire_code`]).

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::{AttemptId, ProductId, StateMachine, Timestamp, ValidationError};

/// Opaque receipt token returned by a succeeded purchase.
///
/// Possession of a token does not grant entitlement: the caller must
/// perform server-side or cryptographic receipt verification before
/// unlocking premium features. This core only signals that verification
/// is now required.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReceiptToken(String);

impl ReceiptToken {
    /// Wraps a raw token from the purchasing service.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the raw token for the verifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReceiptToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Terminal result of a purchase flow, as reported by the purchasing
/// service.
///
/// The service's contract is exhaustive over these four cases. The type
/// is closed: there is no catch-all variant, so exhaustive matching is
/// checked at compile time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PurchaseOutcome {
    /// Purchase went through; receipt verification is now required.
    Succeeded { receipt: ReceiptToken },

    /// Purchase awaits external approval (e.g. Ask to Buy).
    Pending,

    /// The user cancelled the purchase sheet.
    Cancelled,

    /// The platform reported an error completing the purchase.
    PlatformError { message: String },
}

impl PurchaseOutcome {
    /// Decodes a wire-level outcome code from the purchasing service.
    ///
    /// The service contract guarantees the code set is exhaustive, so an
    /// unknown code is an internal-consistency violation severe enough
    /// to abort rather than mask.
    ///
    /// # Panics
    ///
    /// Panics on any code outside the contract.
    pub fn from_wire_code(code: &str, detail: Option<&str>) -> Self {
        match code {
            "succeeded" => PurchaseOutcome::Succeeded {
                receipt: ReceiptToken::new(detail.unwrap_or_default()),
            },
            "pending" => PurchaseOutcome::Pending,
            "cancelled" => PurchaseOutcome::Cancelled,
            "platform_error" => PurchaseOutcome::PlatformError {
                message: detail.unwrap_or("unspecified platform error").to_string(),
            },
            other => panic!(
                "purchasing service returned out-of-contract outcome code '{}'",
                other
            ),
        }
    }

    /// The attempt state this outcome terminates in.
    pub fn attempt_state(&self) -> PurchaseAttemptState {
        match self {
            PurchaseOutcome::Succeeded { .. } => PurchaseAttemptState::Succeeded,
            PurchaseOutcome::Pending => PurchaseAttemptState::Pending,
            PurchaseOutcome::Cancelled => PurchaseAttemptState::Cancelled,
            PurchaseOutcome::PlatformError { .. } => PurchaseAttemptState::Failed,
        }
    }
}

impl fmt::Display for PurchaseOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PurchaseOutcome::Succeeded { .. } => write!(f, "succeeded"),
            PurchaseOutcome::Pending => write!(f, "pending"),
            PurchaseOutcome::Cancelled => write!(f, "cancelled"),
            PurchaseOutcome::PlatformError { message } => {
                write!(f, "platform error: {}", message)
            }
        }
    }
}

/// State of a single purchase attempt.
///
/// `Started -> {Succeeded, Pending, Cancelled, Failed}`; all four
/// terminal. Pending is terminal for the attempt — external approval
/// resolves through a later status snapshot, not through this attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PurchaseAttemptState {
    Started,
    Succeeded,
    Pending,
    Cancelled,
    Failed,
}

impl StateMachine for PurchaseAttemptState {
    fn can_transition_to(&self, target: &Self) -> bool {
        use PurchaseAttemptState::*;
        matches!(
            (self, target),
            (Started, Succeeded) | (Started, Pending) | (Started, Cancelled) | (Started, Failed)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use PurchaseAttemptState::*;
        match self {
            Started => vec![Succeeded, Pending, Cancelled, Failed],
            Succeeded | Pending | Cancelled | Failed => vec![],
        }
    }
}

/// One in-flight purchase for a given product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseAttempt {
    id: AttemptId,
    product_id: ProductId,
    state: PurchaseAttemptState,
    started_at: Timestamp,
}

impl PurchaseAttempt {
    /// Starts a new attempt for a product.
    pub fn start(product_id: ProductId) -> Self {
        Self {
            id: AttemptId::new(),
            product_id,
            state: PurchaseAttemptState::Started,
            started_at: Timestamp::now(),
        }
    }

    pub fn id(&self) -> AttemptId {
        self.id
    }

    pub fn product_id(&self) -> &ProductId {
        &self.product_id
    }

    pub fn state(&self) -> PurchaseAttemptState {
        self.state
    }

    pub fn started_at(&self) -> Timestamp {
        self.started_at
    }

    /// Moves the attempt to the outcome's terminal state.
    pub fn complete(&mut self, outcome: &PurchaseOutcome) -> Result<(), ValidationError> {
        self.state = self.state.transition_to(outcome.attempt_state())?;
        Ok(())
    }

    /// True once a terminal outcome has been recorded.
    pub fn is_settled(&self) -> bool {
        self.state.is_terminal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn weekly() -> ProductId {
        ProductId::new("pro_weekly").unwrap()
    }

    #[test]
    fn attempt_starts_in_started_state() {
        let attempt = PurchaseAttempt::start(weekly());
        assert_eq!(attempt.state(), PurchaseAttemptState::Started);
        assert!(!attempt.is_settled());
    }

    #[test]
    fn attempt_settles_on_success() {
        let mut attempt = PurchaseAttempt::start(weekly());
        let outcome = PurchaseOutcome::Succeeded {
            receipt: ReceiptToken::new("txn_123"),
        };
        attempt.complete(&outcome).unwrap();
        assert_eq!(attempt.state(), PurchaseAttemptState::Succeeded);
        assert!(attempt.is_settled());
    }

    #[test]
    fn attempt_cannot_settle_twice() {
        let mut attempt = PurchaseAttempt::start(weekly());
        attempt.complete(&PurchaseOutcome::Cancelled).unwrap();
        assert!(attempt.complete(&PurchaseOutcome::Pending).is_err());
    }

    #[test]
    fn every_outcome_maps_to_a_terminal_state() {
        let outcomes = [
            PurchaseOutcome::Succeeded {
                receipt: ReceiptToken::new("txn_123"),
            },
            PurchaseOutcome::Pending,
            PurchaseOutcome::Cancelled,
            PurchaseOutcome::PlatformError {
                message: "declined".to_string(),
            },
        ];
        for outcome in outcomes {
            assert!(outcome.attempt_state().is_terminal());
        }
    }

    #[test]
    fn wire_codes_within_contract_decode() {
        assert_eq!(
            PurchaseOutcome::from_wire_code("succeeded", Some("txn_9")),
            PurchaseOutcome::Succeeded {
                receipt: ReceiptToken::new("txn_9")
            }
        );
        assert_eq!(
            PurchaseOutcome::from_wire_code("pending", None),
            PurchaseOutcome::Pending
        );
        assert_eq!(
            PurchaseOutcome::from_wire_code("cancelled", None),
            PurchaseOutcome::Cancelled
        );
        assert_eq!(
            PurchaseOutcome::from_wire_code("platform_error", Some("declined")),
            PurchaseOutcome::PlatformError {
                message: "declined".to_string()
            }
        );
    }

    #[test]
    #[should_panic(expected = "out-of-contract outcome code")]
    fn unknown_wire_code_aborts() {
        let _ = PurchaseOutcome::from_wire_code("deferred", None);
    }

    proptest! {
        /// No terminal attempt state accepts a further transition.
        #[test]
        fn terminal_states_are_closed(from in 0usize..5, to in 0usize..5) {
            use PurchaseAttemptState::*;
            let states = [Started, Succeeded, Pending, Cancelled, Failed];
            let (from, to) = (states[from], states[to]);
            if from != Started {
                prop_assert!(!from.can_transition_to(&to));
            }
        }
    }
}
