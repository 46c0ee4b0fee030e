//! Reroll: redraws the winner set of a completed giveaway.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::config::RerollPolicy;
use crate::domain::{
    GiveawayEvent, GiveawayId, GiveawayStatus, NotificationSink, UserId, WinnerSelector,
};
use crate::error::GiveawayError;
use crate::persistence::GiveawayStore;

/// Replaces the winners of a completed giveaway with a fresh draw.
///
/// With [`RerollPolicy::FullPool`] every entrant is a candidate, previous
/// winners included. With [`RerollPolicy::ExcludePrevious`] current winners
/// are removed from the pool first and the sufficiency check applies to
/// what is left.
#[derive(Debug, Clone)]
pub struct RerollService {
    store: Arc<dyn GiveawayStore>,
    selector: Arc<WinnerSelector>,
    sink: Arc<dyn NotificationSink>,
    policy: RerollPolicy,
}

impl RerollService {
    /// Creates a new `RerollService`.
    #[must_use]
    pub fn new(
        store: Arc<dyn GiveawayStore>,
        selector: Arc<WinnerSelector>,
        sink: Arc<dyn NotificationSink>,
        policy: RerollPolicy,
    ) -> Self {
        Self {
            store,
            selector,
            sink,
            policy,
        }
    }

    /// Returns the active candidate policy.
    #[must_use]
    pub const fn policy(&self) -> RerollPolicy {
        self.policy
    }

    /// Redraws winners and returns the new set.
    ///
    /// # Errors
    ///
    /// - [`GiveawayError::NotFound`] for an unknown giveaway.
    /// - [`GiveawayError::NotCompleted`] while the giveaway is still active.
    /// - [`GiveawayError::InsufficientEntries`] when the candidate pool is
    ///   smaller than the requested winner count; existing winners are kept.
    /// - [`GiveawayError::StoreUnavailable`] on storage failure.
    pub async fn reroll(
        &self,
        giveaway_id: GiveawayId,
        now: DateTime<Utc>,
    ) -> Result<Vec<UserId>, GiveawayError> {
        let giveaway = self.store.get_giveaway(giveaway_id).await?;
        if giveaway.status != GiveawayStatus::Completed {
            return Err(GiveawayError::NotCompleted(giveaway_id));
        }

        let mut candidates = self.store.list_entries(giveaway_id).await?;
        if self.policy == RerollPolicy::ExcludePrevious {
            let previous: HashSet<UserId> = self
                .store
                .list_winners(giveaway_id)
                .await?
                .into_iter()
                .map(|w| w.user_id)
                .collect();
            candidates.retain(|user| !previous.contains(user));
        }

        let want = usize::try_from(giveaway.winners_requested).unwrap_or(usize::MAX);
        if candidates.len() < want {
            return Err(GiveawayError::InsufficientEntries {
                available: candidates.len(),
                requested: giveaway.winners_requested,
            });
        }

        let winners = self.selector.select(&candidates, want);
        self.store
            .replace_winners(giveaway_id, &winners, now)
            .await?;

        tracing::info!(
            %giveaway_id,
            winners = winners.len(),
            policy = ?self.policy,
            "giveaway rerolled"
        );

        self.sink.notify(GiveawayEvent::GiveawayRerolled {
            giveaway_id,
            winners: winners.clone(),
        });

        Ok(winners)
    }
}
