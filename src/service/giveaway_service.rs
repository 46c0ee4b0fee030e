//! Giveaway service: creation path and read-side lookups.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::config::GiveawayLimits;
use crate::domain::{
    ChannelId, Giveaway, GiveawayDraft, GiveawayEvent, GiveawayId, GiveawaySummary, GuildId,
    MessageId, NotificationSink, UserId, Winner, parse_duration,
};
use crate::error::GiveawayError;
use crate::persistence::GiveawayStore;

/// Parameters for [`GiveawayService::create`].
#[derive(Debug, Clone)]
pub struct NewGiveaway {
    /// Guild the giveaway runs in.
    pub guild_id: GuildId,
    /// Channel where it is announced.
    pub channel_id: ChannelId,
    /// Administrator creating it.
    pub creator_id: UserId,
    /// Prize description.
    pub prize: String,
    /// Number of winners to draw.
    pub winners: u32,
    /// Raw duration text such as `"1h30m"` or `"45"`.
    pub duration: String,
    /// Optional entry requirements.
    pub requirements: Option<String>,
}

/// A giveaway with its live statistics.
#[derive(Debug, Clone, Serialize)]
pub struct GiveawayDetails {
    /// The giveaway row.
    pub giveaway: Giveaway,
    /// Entries recorded so far.
    pub entry_count: u64,
    /// Current winner set; empty while active.
    pub winners: Vec<Winner>,
}

/// Creates giveaways and serves lookups over the store.
#[derive(Debug, Clone)]
pub struct GiveawayService {
    store: Arc<dyn GiveawayStore>,
    sink: Arc<dyn NotificationSink>,
    limits: GiveawayLimits,
}

impl GiveawayService {
    /// Creates a new `GiveawayService`.
    #[must_use]
    pub fn new(
        store: Arc<dyn GiveawayStore>,
        sink: Arc<dyn NotificationSink>,
        limits: GiveawayLimits,
    ) -> Self {
        Self {
            store,
            sink,
            limits,
        }
    }

    /// Returns the creation bounds in force.
    #[must_use]
    pub const fn limits(&self) -> GiveawayLimits {
        self.limits
    }

    /// Validates `request` and stores a new active giveaway ending at
    /// `now + duration`.
    ///
    /// # Errors
    ///
    /// Returns [`GiveawayError::Validation`] for an unparsable or
    /// out-of-bounds duration, a winner count outside
    /// `1..=max_winners`, or a blank prize. Returns
    /// [`GiveawayError::StoreUnavailable`] on storage failure.
    pub async fn create(
        &self,
        request: NewGiveaway,
        now: DateTime<Utc>,
    ) -> Result<Giveaway, GiveawayError> {
        let prize = request.prize.trim();
        if prize.is_empty() {
            return Err(GiveawayError::Validation("prize must not be empty".into()));
        }

        if request.winners == 0 || request.winners > self.limits.max_winners {
            return Err(GiveawayError::Validation(format!(
                "winners must be between 1 and {}",
                self.limits.max_winners
            )));
        }

        let seconds = parse_duration(&request.duration)?;
        if seconds < self.limits.min_duration_secs || seconds > self.limits.max_duration_secs {
            return Err(GiveawayError::Validation(format!(
                "duration must be between {}s and {}s, got {seconds}s",
                self.limits.min_duration_secs, self.limits.max_duration_secs
            )));
        }
        let end_time = i64::try_from(seconds)
            .ok()
            .and_then(Duration::try_seconds)
            .and_then(|d| now.checked_add_signed(d))
            .ok_or_else(|| GiveawayError::Validation("duration is too long".into()))?;

        let draft = GiveawayDraft {
            guild_id: request.guild_id,
            channel_id: request.channel_id,
            creator_id: request.creator_id,
            prize: prize.to_string(),
            winners_requested: request.winners,
            end_time,
            requirements: request
                .requirements
                .map(|r| r.trim().to_string())
                .filter(|r| !r.is_empty()),
            created_at: now,
        };

        let id = self.store.create_giveaway(draft.clone()).await?;
        let giveaway = Giveaway::from_draft(id, draft);

        tracing::info!(
            giveaway_id = %id,
            guild_id = giveaway.guild_id,
            winners = giveaway.winners_requested,
            end_time = %giveaway.end_time,
            "giveaway created"
        );

        self.sink.notify(GiveawayEvent::GiveawayCreated {
            giveaway_id: id,
            prize: giveaway.prize.clone(),
            winners_requested: giveaway.winners_requested,
            end_time: giveaway.end_time,
        });

        Ok(giveaway)
    }

    /// Records the announcement message for a giveaway.
    ///
    /// # Errors
    ///
    /// Returns [`GiveawayError::NotFound`] for an unknown giveaway.
    pub async fn set_message_id(
        &self,
        giveaway_id: GiveawayId,
        message_id: MessageId,
    ) -> Result<(), GiveawayError> {
        self.store.set_message_id(giveaway_id, message_id).await?;
        tracing::debug!(%giveaway_id, message_id, "announcement message recorded");
        Ok(())
    }

    /// Returns a giveaway with its entry count and current winners.
    ///
    /// # Errors
    ///
    /// Returns [`GiveawayError::NotFound`] for an unknown giveaway.
    pub async fn get_details(
        &self,
        giveaway_id: GiveawayId,
    ) -> Result<GiveawayDetails, GiveawayError> {
        let giveaway = self.store.get_giveaway(giveaway_id).await?;
        let entry_count = self.store.count_entries(giveaway_id).await?;
        let winners = self.store.list_winners(giveaway_id).await?;
        Ok(GiveawayDetails {
            giveaway,
            entry_count,
            winners,
        })
    }

    /// Lists a guild's active giveaways, soonest-ending first.
    ///
    /// # Errors
    ///
    /// Returns [`GiveawayError::StoreUnavailable`] on storage failure.
    pub async fn list_active(
        &self,
        guild_id: GuildId,
    ) -> Result<Vec<GiveawaySummary>, GiveawayError> {
        let giveaways = self.store.list_active_in_guild(guild_id).await?;
        let mut summaries = Vec::with_capacity(giveaways.len());
        for giveaway in giveaways {
            let entry_count = self.store.count_entries(giveaway.id).await?;
            summaries.push(GiveawaySummary {
                giveaway,
                entry_count,
            });
        }
        Ok(summaries)
    }

    /// Lists the current winners of a giveaway.
    ///
    /// # Errors
    ///
    /// Returns [`GiveawayError::NotFound`] for an unknown giveaway.
    pub async fn list_winners(&self, giveaway_id: GiveawayId) -> Result<Vec<Winner>, GiveawayError> {
        self.store.get_giveaway(giveaway_id).await?;
        self.store.list_winners(giveaway_id).await
    }
}
