//! Periodic sweep that completes expired giveaways.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::error::GiveawayError;
use crate::persistence::GiveawayStore;
use crate::service::{CompletionOutcome, CompletionProcessor};

/// Counters from one sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Expired active giveaways found.
    pub expired: usize,
    /// Giveaways this sweep completed.
    pub completed: usize,
    /// Giveaways someone else completed first.
    pub skipped: usize,
    /// Winnerless completions redrawn.
    pub repaired: usize,
    /// Per-giveaway failures, logged and left for the next sweep.
    pub failed: usize,
    /// `true` if the store could not be queried at all.
    pub store_unavailable: bool,
}

impl SweepReport {
    /// Returns `true` if the sweep found nothing to do.
    #[must_use]
    pub const fn is_idle(&self) -> bool {
        self.expired == 0 && self.repaired == 0 && self.failed == 0 && !self.store_unavailable
    }
}

/// Drives expired giveaways through the [`CompletionProcessor`].
///
/// Holds no state between ticks; everything is re-read from the store, so
/// a restart loses nothing.
#[derive(Debug, Clone)]
pub struct ExpirySweeper {
    store: Arc<dyn GiveawayStore>,
    completion: Arc<CompletionProcessor>,
    interval: Duration,
    repair_grace: chrono::Duration,
}

impl ExpirySweeper {
    /// Creates a sweeper ticking every `interval`.
    #[must_use]
    pub fn new(
        store: Arc<dyn GiveawayStore>,
        completion: Arc<CompletionProcessor>,
        interval: Duration,
        repair_grace: chrono::Duration,
    ) -> Self {
        Self {
            store,
            completion,
            interval,
            repair_grace,
        }
    }

    /// Runs one sweep at `now`.
    ///
    /// A failure on one giveaway is logged and counted; the rest of the
    /// sweep continues. If the store cannot list expired giveaways the
    /// tick ends early and the next one retries.
    pub async fn tick(&self, now: DateTime<Utc>) -> SweepReport {
        let mut report = SweepReport::default();

        let expired = match self.store.list_expired_active(now).await {
            Ok(expired) => expired,
            Err(e) => {
                tracing::warn!(error = %e, "expiry sweep skipped");
                report.store_unavailable = true;
                return report;
            }
        };
        report.expired = expired.len();

        for giveaway in expired {
            match self.completion.complete(giveaway.id, now).await {
                Ok(CompletionOutcome::Completed(_)) => report.completed += 1,
                Ok(CompletionOutcome::AlreadyCompleted) => report.skipped += 1,
                Err(e) => {
                    tracing::error!(
                        giveaway_id = %giveaway.id,
                        error = %e,
                        "failed to complete expired giveaway"
                    );
                    report.failed += 1;
                }
            }
        }

        if let Err(e) = self.repair(now, &mut report).await {
            tracing::warn!(error = %e, "repair pass skipped");
        }

        report
    }

    async fn repair(
        &self,
        now: DateTime<Utc>,
        report: &mut SweepReport,
    ) -> Result<(), GiveawayError> {
        let Some(cutoff) = now.checked_sub_signed(self.repair_grace) else {
            return Ok(());
        };

        for giveaway in self.store.list_winnerless_completed(cutoff).await? {
            match self.completion.redraw_stranded(&giveaway, now).await {
                Ok(_) => report.repaired += 1,
                Err(e) => {
                    tracing::error!(
                        giveaway_id = %giveaway.id,
                        error = %e,
                        "failed to repair winnerless giveaway"
                    );
                    report.failed += 1;
                }
            }
        }
        Ok(())
    }

    /// Sweeps forever, once per interval, starting immediately.
    ///
    /// Ticks never overlap: a slow sweep delays the next one instead of
    /// queueing a burst.
    pub async fn run(self) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(interval_secs = self.interval.as_secs(), "expiry sweeper started");

        loop {
            ticker.tick().await;
            let report = self.tick(Utc::now()).await;
            if report.is_idle() {
                tracing::debug!("expiry sweep idle");
            } else {
                tracing::info!(
                    expired = report.expired,
                    completed = report.completed,
                    skipped = report.skipped,
                    repaired = report.repaired,
                    failed = report.failed,
                    "expiry sweep finished"
                );
            }
        }
    }

    /// Detaches [`Self::run`] onto the tokio runtime.
    #[must_use]
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicBool, Ordering};

    use async_trait::async_trait;
    use chrono::Duration as ChronoDuration;

    use super::*;
    use crate::domain::{
        EventBus, Giveaway, GiveawayDraft, GiveawayId, GiveawayStatus, GuildId, MessageId,
        UserId, Winner, WinnerSelector,
    };
    use crate::persistence::{CompletionFlip, MemoryGiveawayStore};

    /// Delegates to a memory store but fails chosen operations.
    #[derive(Debug, Default)]
    struct FlakyStore {
        inner: MemoryGiveawayStore,
        poisoned: HashSet<GiveawayId>,
        listing_down: bool,
        winners_down: AtomicBool,
    }

    fn outage() -> GiveawayError {
        GiveawayError::StoreUnavailable("simulated outage".into())
    }

    #[async_trait]
    impl GiveawayStore for FlakyStore {
        async fn create_giveaway(&self, draft: GiveawayDraft) -> Result<GiveawayId, GiveawayError> {
            self.inner.create_giveaway(draft).await
        }
        async fn get_giveaway(&self, id: GiveawayId) -> Result<Giveaway, GiveawayError> {
            if self.poisoned.contains(&id) {
                return Err(outage());
            }
            self.inner.get_giveaway(id).await
        }
        async fn list_expired_active(
            &self,
            now: DateTime<Utc>,
        ) -> Result<Vec<Giveaway>, GiveawayError> {
            if self.listing_down {
                return Err(outage());
            }
            self.inner.list_expired_active(now).await
        }
        async fn list_active_in_guild(
            &self,
            guild_id: GuildId,
        ) -> Result<Vec<Giveaway>, GiveawayError> {
            self.inner.list_active_in_guild(guild_id).await
        }
        async fn set_message_id(
            &self,
            id: GiveawayId,
            message_id: MessageId,
        ) -> Result<(), GiveawayError> {
            self.inner.set_message_id(id, message_id).await
        }
        async fn mark_completed(
            &self,
            id: GiveawayId,
            completed_at: DateTime<Utc>,
        ) -> Result<CompletionFlip, GiveawayError> {
            self.inner.mark_completed(id, completed_at).await
        }
        async fn add_entry(
            &self,
            id: GiveawayId,
            user_id: UserId,
            entered_at: DateTime<Utc>,
        ) -> Result<(), GiveawayError> {
            self.inner.add_entry(id, user_id, entered_at).await
        }
        async fn count_entries(&self, id: GiveawayId) -> Result<u64, GiveawayError> {
            self.inner.count_entries(id).await
        }
        async fn list_entries(&self, id: GiveawayId) -> Result<Vec<UserId>, GiveawayError> {
            self.inner.list_entries(id).await
        }
        async fn replace_winners(
            &self,
            id: GiveawayId,
            winners: &[UserId],
            won_at: DateTime<Utc>,
        ) -> Result<(), GiveawayError> {
            if self.winners_down.load(Ordering::SeqCst) {
                return Err(outage());
            }
            self.inner.replace_winners(id, winners, won_at).await
        }
        async fn list_winners(&self, id: GiveawayId) -> Result<Vec<Winner>, GiveawayError> {
            self.inner.list_winners(id).await
        }
        async fn list_winnerless_completed(
            &self,
            completed_before: DateTime<Utc>,
        ) -> Result<Vec<Giveaway>, GiveawayError> {
            self.inner.list_winnerless_completed(completed_before).await
        }
    }

    fn sweeper(store: Arc<dyn GiveawayStore>) -> ExpirySweeper {
        let completion = CompletionProcessor::new(
            Arc::clone(&store),
            Arc::new(WinnerSelector::seeded(3)),
            Arc::new(EventBus::new(64)),
        );
        ExpirySweeper::new(
            store,
            Arc::new(completion),
            Duration::from_secs(60),
            ChronoDuration::seconds(60),
        )
    }

    async fn seed(
        store: &dyn GiveawayStore,
        created: DateTime<Utc>,
        lasts: ChronoDuration,
        entrants: &[UserId],
    ) -> GiveawayId {
        let Ok(id) = store
            .create_giveaway(GiveawayDraft {
                guild_id: 1,
                channel_id: 2,
                creator_id: 3,
                prize: "Headset".to_string(),
                winners_requested: 1,
                end_time: created + lasts,
                requirements: None,
                created_at: created,
            })
            .await
        else {
            panic!("create failed");
        };
        for &user in entrants {
            let _ = store.add_entry(id, user, created).await;
        }
        id
    }

    async fn status(store: &dyn GiveawayStore, id: GiveawayId) -> GiveawayStatus {
        let Ok(g) = store.get_giveaway(id).await else {
            panic!("giveaway should exist");
        };
        g.status
    }

    #[tokio::test]
    async fn completes_expired_and_leaves_future_untouched() {
        let store: Arc<dyn GiveawayStore> = Arc::new(MemoryGiveawayStore::new());
        let now = Utc::now();
        let past = seed(store.as_ref(), now - ChronoDuration::hours(2), ChronoDuration::hours(1), &[1, 2]).await;
        let future = seed(store.as_ref(), now, ChronoDuration::hours(1), &[1]).await;

        let report = sweeper(Arc::clone(&store)).tick(now).await;
        assert_eq!(report.expired, 1);
        assert_eq!(report.completed, 1);

        assert_eq!(status(store.as_ref(), past).await, GiveawayStatus::Completed);
        assert_eq!(store.list_winners(past).await.unwrap_or_default().len(), 1);
        assert_eq!(status(store.as_ref(), future).await, GiveawayStatus::Active);
    }

    #[tokio::test]
    async fn second_tick_finds_nothing() {
        let store: Arc<dyn GiveawayStore> = Arc::new(MemoryGiveawayStore::new());
        let now = Utc::now();
        seed(store.as_ref(), now - ChronoDuration::hours(2), ChronoDuration::hours(1), &[1]).await;

        let sweeper = sweeper(Arc::clone(&store));
        assert_eq!(sweeper.tick(now).await.completed, 1);
        assert!(sweeper.tick(now).await.is_idle());
    }

    #[tokio::test]
    async fn one_failure_does_not_abort_the_sweep() {
        let base = FlakyStore::default();
        let now = Utc::now();
        let bad = seed(&base, now - ChronoDuration::hours(3), ChronoDuration::hours(1), &[1]).await;
        let good = seed(&base, now - ChronoDuration::hours(2), ChronoDuration::hours(1), &[2]).await;

        let mut poisoned = HashSet::new();
        poisoned.insert(bad);
        let store: Arc<dyn GiveawayStore> = Arc::new(FlakyStore { poisoned, ..base });

        let report = sweeper(Arc::clone(&store)).tick(now).await;
        assert_eq!(report.expired, 2);
        assert_eq!(report.failed, 1);
        assert_eq!(report.completed, 1);
        assert_eq!(status(store.as_ref(), good).await, GiveawayStatus::Completed);
    }

    #[tokio::test]
    async fn unavailable_store_ends_tick_early() {
        let store: Arc<dyn GiveawayStore> = Arc::new(FlakyStore {
            listing_down: true,
            ..FlakyStore::default()
        });
        let report = sweeper(store).tick(Utc::now()).await;
        assert!(report.store_unavailable);
        assert_eq!(report.expired, 0);
    }

    #[tokio::test]
    async fn repair_pass_redraws_winnerless_completion() {
        let now = Utc::now();
        let flaky = Arc::new(FlakyStore::default());
        flaky.winners_down.store(true, Ordering::SeqCst);
        let id = seed(flaky.as_ref(), now - ChronoDuration::hours(2), ChronoDuration::hours(1), &[5, 6]).await;

        let store: Arc<dyn GiveawayStore> = Arc::clone(&flaky) as Arc<dyn GiveawayStore>;
        let sweeper = sweeper(store);

        let report = sweeper.tick(now).await;
        assert_eq!(report.failed, 1);
        assert_eq!(status(flaky.as_ref(), id).await, GiveawayStatus::Completed);
        assert!(flaky.list_winners(id).await.unwrap_or_default().is_empty());

        flaky.winners_down.store(false, Ordering::SeqCst);
        let later = now + ChronoDuration::minutes(5);
        let report = sweeper.tick(later).await;
        assert_eq!(report.repaired, 1);
        assert_eq!(flaky.list_winners(id).await.unwrap_or_default().len(), 1);
    }

    #[tokio::test]
    async fn repair_waits_for_grace_period() {
        let store: Arc<dyn GiveawayStore> = Arc::new(MemoryGiveawayStore::new());
        let now = Utc::now();
        let id = seed(store.as_ref(), now - ChronoDuration::hours(2), ChronoDuration::hours(1), &[5]).await;
        let _ = store.mark_completed(id, now - ChronoDuration::seconds(10)).await;

        let report = sweeper(Arc::clone(&store)).tick(now).await;
        assert_eq!(report.repaired, 0);
        assert!(store.list_winners(id).await.unwrap_or_default().is_empty());
    }

    #[tokio::test]
    async fn spawned_sweeper_recovers_on_startup() {
        let store: Arc<dyn GiveawayStore> = Arc::new(MemoryGiveawayStore::new());
        let now = Utc::now();
        let id = seed(store.as_ref(), now - ChronoDuration::days(1), ChronoDuration::hours(1), &[9]).await;

        let handle = sweeper(Arc::clone(&store)).spawn();
        let mut recovered = false;
        for _ in 0..100 {
            if status(store.as_ref(), id).await == GiveawayStatus::Completed {
                recovered = true;
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        handle.abort();
        assert!(recovered, "startup sweep should complete the overdue giveaway");
    }
}
