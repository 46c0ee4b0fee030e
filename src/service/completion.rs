//! Completion processor: the `Active -> Completed` transition and the
//! winner draw that follows it.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::{
    Giveaway, GiveawayEvent, GiveawayId, GiveawayStatus, NotificationSink, UserId, WinnerSelector,
};
use crate::error::GiveawayError;
use crate::persistence::{CompletionFlip, GiveawayStore};

/// What a completed draw produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompletionSummary {
    /// Giveaway identifier.
    pub giveaway_id: GiveawayId,
    /// Prize description.
    pub prize: String,
    /// Drawn winners.
    pub winners: Vec<UserId>,
    /// Entries at draw time.
    pub entry_count: u64,
}

/// Result of [`CompletionProcessor::complete`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionOutcome {
    /// This call completed the giveaway and drew winners.
    Completed(CompletionSummary),
    /// The giveaway had already been completed; nothing was drawn.
    AlreadyCompleted,
}

/// Ends giveaways, whether by expiry or by an administrator.
///
/// Completion is idempotent: the status flip is conditional in the store,
/// so a giveaway is never drawn twice even when a manual end races a
/// scheduler sweep.
#[derive(Debug, Clone)]
pub struct CompletionProcessor {
    store: Arc<dyn GiveawayStore>,
    selector: Arc<WinnerSelector>,
    sink: Arc<dyn NotificationSink>,
}

impl CompletionProcessor {
    /// Creates a new `CompletionProcessor`.
    #[must_use]
    pub fn new(
        store: Arc<dyn GiveawayStore>,
        selector: Arc<WinnerSelector>,
        sink: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            store,
            selector,
            sink,
        }
    }

    /// Completes a giveaway at `now` and draws its winners.
    ///
    /// # Errors
    ///
    /// Returns [`GiveawayError::NotFound`] for an unknown giveaway and
    /// [`GiveawayError::StoreUnavailable`] on storage failure. If winner
    /// persistence fails after the status flip, the giveaway stays
    /// completed without winners until the sweeper's repair pass redraws it.
    pub async fn complete(
        &self,
        giveaway_id: GiveawayId,
        now: DateTime<Utc>,
    ) -> Result<CompletionOutcome, GiveawayError> {
        let giveaway = self.store.get_giveaway(giveaway_id).await?;
        if giveaway.status == GiveawayStatus::Completed {
            tracing::debug!(%giveaway_id, "giveaway already completed");
            return Ok(CompletionOutcome::AlreadyCompleted);
        }

        if self.store.mark_completed(giveaway_id, now).await? == CompletionFlip::AlreadyCompleted
        {
            tracing::debug!(%giveaway_id, "giveaway completed concurrently");
            return Ok(CompletionOutcome::AlreadyCompleted);
        }

        let summary = self.draw(&giveaway, now).await?;
        tracing::info!(
            %giveaway_id,
            entries = summary.entry_count,
            winners = summary.winners.len(),
            "giveaway completed"
        );
        Ok(CompletionOutcome::Completed(summary))
    }

    /// Draws winners for a giveaway that was completed but never got any.
    ///
    /// # Errors
    ///
    /// Returns [`GiveawayError::NotCompleted`] if the giveaway is still
    /// active, and [`GiveawayError::StoreUnavailable`] on storage failure.
    pub async fn redraw_stranded(
        &self,
        giveaway: &Giveaway,
        now: DateTime<Utc>,
    ) -> Result<CompletionSummary, GiveawayError> {
        if giveaway.status != GiveawayStatus::Completed {
            return Err(GiveawayError::NotCompleted(giveaway.id));
        }
        let summary = self.draw(giveaway, now).await?;
        tracing::info!(
            giveaway_id = %giveaway.id,
            winners = summary.winners.len(),
            "winnerless giveaway repaired"
        );
        Ok(summary)
    }

    async fn draw(
        &self,
        giveaway: &Giveaway,
        now: DateTime<Utc>,
    ) -> Result<CompletionSummary, GiveawayError> {
        let entries = self.store.list_entries(giveaway.id).await?;
        let want = usize::try_from(giveaway.winners_requested).unwrap_or(usize::MAX);
        let winners = self.selector.select(&entries, want);

        if let Err(e) = self.store.replace_winners(giveaway.id, &winners, now).await {
            tracing::error!(
                giveaway_id = %giveaway.id,
                error = %e,
                "winner persistence failed; giveaway left without winners"
            );
            return Err(e);
        }

        let summary = CompletionSummary {
            giveaway_id: giveaway.id,
            prize: giveaway.prize.clone(),
            winners,
            entry_count: entries.len() as u64,
        };

        self.sink.notify(GiveawayEvent::GiveawayCompleted {
            giveaway_id: summary.giveaway_id,
            prize: summary.prize.clone(),
            winners: summary.winners.clone(),
            entry_count: summary.entry_count,
        });

        Ok(summary)
    }
}
