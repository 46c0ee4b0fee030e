//! Per-connection subscription manager.
//!
//! Tracks which giveaways a WebSocket client follows and provides
//! server-side event filtering.

use std::collections::HashSet;

use crate::domain::GiveawayId;

/// Manages the set of giveaway subscriptions for a single WebSocket connection.
#[derive(Debug, Default)]
pub struct SubscriptionManager {
    /// Followed giveaway IDs. Ignored while `subscribe_all` is set.
    giveaway_ids: HashSet<GiveawayId>,
    /// Whether the client follows every giveaway (wildcard `"*"`).
    subscribe_all: bool,
}

impl SubscriptionManager {
    /// Creates a new empty subscription manager.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds giveaway IDs to the subscription set.
    pub fn subscribe(&mut self, ids: &[GiveawayId], wildcard: bool) {
        if wildcard {
            self.subscribe_all = true;
        }
        self.giveaway_ids.extend(ids.iter().copied());
    }

    /// Removes giveaway IDs from the subscription set.
    pub fn unsubscribe(&mut self, ids: &[GiveawayId]) {
        for id in ids {
            self.giveaway_ids.remove(id);
        }
    }

    /// Returns `true` if events of `giveaway_id` should be forwarded.
    #[must_use]
    pub fn matches(&self, giveaway_id: GiveawayId) -> bool {
        self.subscribe_all || self.giveaway_ids.contains(&giveaway_id)
    }

    /// Returns the number of explicitly followed giveaways.
    #[must_use]
    pub fn count(&self) -> usize {
        self.giveaway_ids.len()
    }

    /// Returns `true` if the wildcard subscription is active.
    #[must_use]
    pub const fn is_subscribed_all(&self) -> bool {
        self.subscribe_all
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_matches_nothing() {
        assert!(!SubscriptionManager::new().matches(GiveawayId::new()));
    }

    #[test]
    fn specific_subscription_filters_others() {
        let mut mgr = SubscriptionManager::new();
        let id = GiveawayId::new();
        mgr.subscribe(&[id], false);
        assert!(mgr.matches(id));
        assert!(!mgr.matches(GiveawayId::new()));
        assert_eq!(mgr.count(), 1);
    }

    #[test]
    fn wildcard_matches_everything() {
        let mut mgr = SubscriptionManager::new();
        mgr.subscribe(&[], true);
        assert!(mgr.is_subscribed_all());
        assert!(mgr.matches(GiveawayId::new()));
    }

    #[test]
    fn unsubscribe_stops_forwarding() {
        let mut mgr = SubscriptionManager::new();
        let id = GiveawayId::new();
        mgr.subscribe(&[id], false);
        mgr.unsubscribe(&[id]);
        assert!(!mgr.matches(id));
        assert_eq!(mgr.count(), 0);
    }
}
