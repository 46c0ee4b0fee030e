//! Entry manager: validates and records a user's participation.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::domain::{GiveawayId, UserId};
use crate::error::GiveawayError;
use crate::persistence::GiveawayStore;

/// The only path by which entries are created.
///
/// Holds no state of its own; every call re-reads the giveaway. Emitting
/// the "entry confirmed" notification is left to the caller.
#[derive(Debug, Clone)]
pub struct EntryManager {
    store: Arc<dyn GiveawayStore>,
}

impl EntryManager {
    /// Creates a new `EntryManager`.
    #[must_use]
    pub fn new(store: Arc<dyn GiveawayStore>) -> Self {
        Self { store }
    }

    /// Enters `user_id` into a giveaway and returns the new entry count.
    ///
    /// # Errors
    ///
    /// - [`GiveawayError::NotFound`] for an unknown giveaway.
    /// - [`GiveawayError::NotActive`] if the giveaway is completed or
    ///   `now` is at or past its end time.
    /// - [`GiveawayError::DuplicateEntry`] if the user already entered.
    /// - [`GiveawayError::StoreUnavailable`] on storage failure.
    pub async fn enter(
        &self,
        giveaway_id: GiveawayId,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> Result<u64, GiveawayError> {
        let giveaway = self.store.get_giveaway(giveaway_id).await?;
        if !giveaway.is_open_at(now) {
            return Err(GiveawayError::NotActive(giveaway_id));
        }

        self.store.add_entry(giveaway_id, user_id, now).await?;
        let entry_count = self.store.count_entries(giveaway_id).await?;

        tracing::debug!(%giveaway_id, user_id, entry_count, "entry recorded");
        Ok(entry_count)
    }
}
