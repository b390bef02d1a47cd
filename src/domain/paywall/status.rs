//! Subscription status snapshots.
//!
//! The platform pushes a snapshot of the subscription group's renewal
//! states whenever something changes. The core keeps no history: each
//! snapshot supersedes the previous one, and the only derived value is
//! the premium flag.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::domain::foundation::StatusGroupId;

/// Renewal state of a subscription within a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionState {
    /// The subscription is active.
    Subscribed,

    /// The subscription lapsed.
    Expired,

    /// Access was revoked (e.g. refund).
    Revoked,

    /// Billing issue, still within the grace period.
    InGracePeriod,

    /// Billing issue, platform is retrying the charge.
    InBillingRetry,
}

/// Point-in-time view of a subscription group's states.
///
/// A group can carry several states at once when the user holds more
/// than one product in the family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionStatusSnapshot {
    group_id: StatusGroupId,
    states: BTreeSet<SubscriptionState>,
}

impl SubscriptionStatusSnapshot {
    /// Creates a snapshot for a group.
    pub fn new(group_id: StatusGroupId, states: impl IntoIterator<Item = SubscriptionState>) -> Self {
        Self {
            group_id,
            states: states.into_iter().collect(),
        }
    }

    /// A snapshot with no states, as seen before any subscription exists.
    pub fn empty(group_id: StatusGroupId) -> Self {
        Self::new(group_id, [])
    }

    pub fn group_id(&self) -> &StatusGroupId {
        &self.group_id
    }

    pub fn states(&self) -> &BTreeSet<SubscriptionState> {
        &self.states
    }

    /// Premium access holds exactly when some product in the group is
    /// currently subscribed.
    pub fn is_premium(&self) -> bool {
        self.states.contains(&SubscriptionState::Subscribed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group() -> StatusGroupId {
        StatusGroupId::new("445DECC7").unwrap()
    }

    #[test]
    fn empty_snapshot_is_not_premium() {
        assert!(!SubscriptionStatusSnapshot::empty(group()).is_premium());
    }

    #[test]
    fn subscribed_state_grants_premium() {
        let snapshot =
            SubscriptionStatusSnapshot::new(group(), [SubscriptionState::Subscribed]);
        assert!(snapshot.is_premium());
    }

    #[test]
    fn premium_holds_when_subscribed_among_other_states() {
        let snapshot = SubscriptionStatusSnapshot::new(
            group(),
            [SubscriptionState::Expired, SubscriptionState::Subscribed],
        );
        assert!(snapshot.is_premium());
    }

    #[test]
    fn non_subscribed_states_do_not_grant_premium() {
        for state in [
            SubscriptionState::Expired,
            SubscriptionState::Revoked,
            SubscriptionState::InGracePeriod,
            SubscriptionState::InBillingRetry,
        ] {
            let snapshot = SubscriptionStatusSnapshot::new(group(), [state]);
            assert!(!snapshot.is_premium(), "{:?} should not be premium", state);
        }
    }

    #[test]
    fn duplicate_states_collapse() {
        let snapshot = SubscriptionStatusSnapshot::new(
            group(),
            [SubscriptionState::Subscribed, SubscriptionState::Subscribed],
        );
        assert_eq!(snapshot.states().len(), 1);
    }
}
