//! In-process giveaway store.
//!
//! [`MemoryGiveawayStore`] keeps every giveaway together with its entries
//! and winners in one `HashMap` behind a [`tokio::sync::RwLock`]. All
//! mutations happen under the write lock, which serializes conflicting
//! writes the same way row locks do in a database, and makes the
//! `(giveaway_id, user_id)` uniqueness check and insert a single step.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::{CompletionFlip, GiveawayStore};
use crate::domain::{
    Entry, Giveaway, GiveawayDraft, GiveawayId, GiveawayStatus, GuildId, MessageId, UserId, Winner,
};
use crate::error::GiveawayError;

/// A giveaway with its participation rows.
#[derive(Debug)]
struct GiveawayRecord {
    giveaway: Giveaway,
    entries: Vec<Entry>,
    entrants: HashSet<UserId>,
    winners: Vec<Winner>,
}

/// Giveaway store held entirely in memory.
///
/// # Concurrency
///
/// - Reads of any giveaway run concurrently.
/// - Writes are serialized by the outer lock, so duplicate entries race
///   into [`GiveawayError::DuplicateEntry`] instead of a second row.
#[derive(Debug, Default)]
pub struct MemoryGiveawayStore {
    records: RwLock<HashMap<GiveawayId, GiveawayRecord>>,
}

impl MemoryGiveawayStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of giveaways in the store.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Returns `true` if the store holds no giveaways.
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

fn sorted_by_end_time(mut giveaways: Vec<Giveaway>) -> Vec<Giveaway> {
    giveaways.sort_by_key(|g| (g.end_time, g.created_at));
    giveaways
}

#[async_trait]
impl GiveawayStore for MemoryGiveawayStore {
    async fn create_giveaway(&self, draft: GiveawayDraft) -> Result<GiveawayId, GiveawayError> {
        let id = GiveawayId::new();
        let mut map = self.records.write().await;
        map.insert(
            id,
            GiveawayRecord {
                giveaway: Giveaway::from_draft(id, draft),
                entries: Vec::new(),
                entrants: HashSet::new(),
                winners: Vec::new(),
            },
        );
        Ok(id)
    }

    async fn get_giveaway(&self, id: GiveawayId) -> Result<Giveaway, GiveawayError> {
        let map = self.records.read().await;
        map.get(&id)
            .map(|record| record.giveaway.clone())
            .ok_or(GiveawayError::NotFound(id))
    }

    async fn list_expired_active(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<Giveaway>, GiveawayError> {
        let map = self.records.read().await;
        let expired = map
            .values()
            .filter(|record| record.giveaway.is_expired_at(now))
            .map(|record| record.giveaway.clone())
            .collect();
        Ok(sorted_by_end_time(expired))
    }

    async fn list_active_in_guild(
        &self,
        guild_id: GuildId,
    ) -> Result<Vec<Giveaway>, GiveawayError> {
        let map = self.records.read().await;
        let active = map
            .values()
            .filter(|record| {
                record.giveaway.guild_id == guild_id
                    && record.giveaway.status == GiveawayStatus::Active
            })
            .map(|record| record.giveaway.clone())
            .collect();
        Ok(sorted_by_end_time(active))
    }

    async fn set_message_id(
        &self,
        id: GiveawayId,
        message_id: MessageId,
    ) -> Result<(), GiveawayError> {
        let mut map = self.records.write().await;
        let record = map.get_mut(&id).ok_or(GiveawayError::NotFound(id))?;
        record.giveaway.message_id = Some(message_id);
        Ok(())
    }

    async fn mark_completed(
        &self,
        id: GiveawayId,
        completed_at: DateTime<Utc>,
    ) -> Result<CompletionFlip, GiveawayError> {
        let mut map = self.records.write().await;
        let record = map.get_mut(&id).ok_or(GiveawayError::NotFound(id))?;
        if record.giveaway.status == GiveawayStatus::Completed {
            return Ok(CompletionFlip::AlreadyCompleted);
        }
        record.giveaway.status = GiveawayStatus::Completed;
        record.giveaway.completed_at = Some(completed_at);
        Ok(CompletionFlip::Flipped)
    }

    async fn add_entry(
        &self,
        id: GiveawayId,
        user_id: UserId,
        entered_at: DateTime<Utc>,
    ) -> Result<(), GiveawayError> {
        let mut map = self.records.write().await;
        let record = map.get_mut(&id).ok_or(GiveawayError::NotFound(id))?;
        if !record.giveaway.is_open_at(entered_at) {
            return Err(GiveawayError::NotActive(id));
        }
        if !record.entrants.insert(user_id) {
            return Err(GiveawayError::DuplicateEntry {
                giveaway_id: id,
                user_id,
            });
        }
        record.entries.push(Entry {
            giveaway_id: id,
            user_id,
            entered_at,
        });
        Ok(())
    }

    async fn count_entries(&self, id: GiveawayId) -> Result<u64, GiveawayError> {
        let map = self.records.read().await;
        Ok(map
            .get(&id)
            .map_or(0, |record| record.entries.len() as u64))
    }

    async fn list_entries(&self, id: GiveawayId) -> Result<Vec<UserId>, GiveawayError> {
        let map = self.records.read().await;
        Ok(map
            .get(&id)
            .map(|record| record.entries.iter().map(|e| e.user_id).collect())
            .unwrap_or_default())
    }

    async fn replace_winners(
        &self,
        id: GiveawayId,
        winners: &[UserId],
        won_at: DateTime<Utc>,
    ) -> Result<(), GiveawayError> {
        let mut map = self.records.write().await;
        let record = map.get_mut(&id).ok_or(GiveawayError::NotFound(id))?;
        record.winners = winners
            .iter()
            .map(|&user_id| Winner {
                giveaway_id: id,
                user_id,
                prize_claimed: false,
                won_at,
            })
            .collect();
        Ok(())
    }

    async fn list_winners(&self, id: GiveawayId) -> Result<Vec<Winner>, GiveawayError> {
        let map = self.records.read().await;
        Ok(map
            .get(&id)
            .map(|record| record.winners.clone())
            .unwrap_or_default())
    }

    async fn list_winnerless_completed(
        &self,
        completed_before: DateTime<Utc>,
    ) -> Result<Vec<Giveaway>, GiveawayError> {
        let map = self.records.read().await;
        let stranded = map
            .values()
            .filter(|record| {
                record.giveaway.status == GiveawayStatus::Completed
                    && record
                        .giveaway
                        .completed_at
                        .is_some_and(|at| at <= completed_before)
                    && !record.entries.is_empty()
                    && record.winners.is_empty()
            })
            .map(|record| record.giveaway.clone())
            .collect();
        Ok(sorted_by_end_time(stranded))
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::sync::Arc;

    use chrono::Duration;

    use super::*;

    fn draft(guild_id: GuildId, end_in: Duration) -> GiveawayDraft {
        let now = Utc::now();
        GiveawayDraft {
            guild_id,
            channel_id: 10,
            creator_id: 20,
            prize: "Steam key".to_string(),
            winners_requested: 1,
            end_time: now + end_in,
            requirements: None,
            created_at: now,
        }
    }

    async fn store_with_giveaway(end_in: Duration) -> (MemoryGiveawayStore, GiveawayId) {
        let store = MemoryGiveawayStore::new();
        let Ok(id) = store.create_giveaway(draft(1, end_in)).await else {
            panic!("create failed");
        };
        (store, id)
    }

    #[tokio::test]
    async fn create_and_get() {
        let (store, id) = store_with_giveaway(Duration::hours(1)).await;
        let Ok(g) = store.get_giveaway(id).await else {
            panic!("giveaway should exist");
        };
        assert_eq!(g.id, id);
        assert_eq!(g.status, GiveawayStatus::Active);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn each_create_gets_its_own_record() {
        let store = MemoryGiveawayStore::new();
        let mut ids = HashSet::new();
        for _ in 0..16 {
            let Ok(id) = store.create_giveaway(draft(1, Duration::hours(1))).await else {
                panic!("create failed");
            };
            ids.insert(id);
        }
        assert_eq!(ids.len(), 16);
        assert_eq!(store.len().await, 16);
    }

    #[tokio::test]
    async fn get_unknown_is_not_found() {
        let store = MemoryGiveawayStore::new();
        assert!(store.is_empty().await);
        let id = GiveawayId::new();
        assert!(matches!(
            store.get_giveaway(id).await,
            Err(GiveawayError::NotFound(missing)) if missing == id
        ));
    }

    #[tokio::test]
    async fn duplicate_entry_is_rejected() {
        let (store, id) = store_with_giveaway(Duration::hours(1)).await;
        let now = Utc::now();
        assert!(store.add_entry(id, 5, now).await.is_ok());
        assert!(matches!(
            store.add_entry(id, 5, now).await,
            Err(GiveawayError::DuplicateEntry { user_id: 5, .. })
        ));
        assert_eq!(store.count_entries(id).await.unwrap_or_default(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_duplicate_entries_race_into_one_row() {
        let (store, id) = store_with_giveaway(Duration::hours(1)).await;
        let store = Arc::new(store);

        let mut handles = Vec::new();
        for _ in 0..32 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store.add_entry(id, 77, Utc::now()).await
            }));
        }

        let mut ok = 0;
        let mut dup = 0;
        for handle in handles {
            match handle.await {
                Ok(Ok(())) => ok += 1,
                Ok(Err(GiveawayError::DuplicateEntry { .. })) => dup += 1,
                other => panic!("unexpected outcome: {other:?}"),
            }
        }
        assert_eq!(ok, 1);
        assert_eq!(dup, 31);
        assert_eq!(store.list_entries(id).await.unwrap_or_default(), vec![77]);
    }

    #[tokio::test]
    async fn entries_rejected_after_end_time() {
        let (store, id) = store_with_giveaway(Duration::minutes(1)).await;
        let later = Utc::now() + Duration::minutes(2);
        assert!(matches!(
            store.add_entry(id, 1, later).await,
            Err(GiveawayError::NotActive(_))
        ));
    }

    #[tokio::test]
    async fn mark_completed_flips_once() {
        let (store, id) = store_with_giveaway(Duration::hours(1)).await;
        let now = Utc::now();
        assert!(matches!(
            store.mark_completed(id, now).await,
            Ok(CompletionFlip::Flipped)
        ));
        assert!(matches!(
            store.mark_completed(id, now).await,
            Ok(CompletionFlip::AlreadyCompleted)
        ));
        assert!(matches!(
            store.add_entry(id, 1, now).await,
            Err(GiveawayError::NotActive(_))
        ));
    }

    #[tokio::test]
    async fn expired_listing_ignores_future_and_completed() {
        let store = MemoryGiveawayStore::new();
        let Ok(past) = store.create_giveaway(draft(1, Duration::minutes(-5))).await else {
            panic!("create failed");
        };
        let Ok(done) = store.create_giveaway(draft(1, Duration::minutes(-10))).await else {
            panic!("create failed");
        };
        let Ok(_future) = store.create_giveaway(draft(1, Duration::hours(1))).await else {
            panic!("create failed");
        };
        let _ = store.mark_completed(done, Utc::now()).await;

        let Ok(expired) = store.list_expired_active(Utc::now()).await else {
            panic!("listing failed");
        };
        let ids: Vec<GiveawayId> = expired.iter().map(|g| g.id).collect();
        assert_eq!(ids, vec![past]);
    }

    #[tokio::test]
    async fn active_listing_is_scoped_to_guild_and_ordered() {
        let store = MemoryGiveawayStore::new();
        let Ok(late) = store.create_giveaway(draft(1, Duration::hours(3))).await else {
            panic!("create failed");
        };
        let Ok(soon) = store.create_giveaway(draft(1, Duration::hours(1))).await else {
            panic!("create failed");
        };
        let _ = store.create_giveaway(draft(2, Duration::hours(2))).await;

        let Ok(listed) = store.list_active_in_guild(1).await else {
            panic!("listing failed");
        };
        let ids: Vec<GiveawayId> = listed.iter().map(|g| g.id).collect();
        assert_eq!(ids, vec![soon, late]);
    }

    #[tokio::test]
    async fn replace_winners_overwrites_previous_set() {
        let (store, id) = store_with_giveaway(Duration::hours(1)).await;
        let now = Utc::now();
        let _ = store.replace_winners(id, &[1, 2], now).await;
        let _ = store.replace_winners(id, &[3], now).await;

        let Ok(winners) = store.list_winners(id).await else {
            panic!("listing failed");
        };
        let users: Vec<UserId> = winners.iter().map(|w| w.user_id).collect();
        assert_eq!(users, vec![3]);
        assert!(winners.iter().all(|w| !w.prize_claimed));
    }

    #[tokio::test]
    async fn winnerless_completed_requires_entries_and_age() {
        let (store, id) = store_with_giveaway(Duration::hours(1)).await;
        let now = Utc::now();
        let _ = store.add_entry(id, 9, now).await;
        let _ = store.mark_completed(id, now).await;

        let Ok(too_young) = store.list_winnerless_completed(now - Duration::minutes(1)).await
        else {
            panic!("listing failed");
        };
        assert!(too_young.is_empty());

        let Ok(stranded) = store.list_winnerless_completed(now).await else {
            panic!("listing failed");
        };
        assert_eq!(stranded.len(), 1);

        let _ = store.replace_winners(id, &[9], now).await;
        let Ok(healed) = store.list_winnerless_completed(now).await else {
            panic!("listing failed");
        };
        assert!(healed.is_empty());
    }

    #[tokio::test]
    async fn set_message_id_on_unknown_is_not_found() {
        let store = MemoryGiveawayStore::new();
        assert!(matches!(
            store.set_message_id(GiveawayId::new(), 1).await,
            Err(GiveawayError::NotFound(_))
        ));
    }
}
