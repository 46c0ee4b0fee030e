//! Giveaway aggregate, its participation rows and lifecycle status.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{ChannelId, GiveawayId, GuildId, MessageId, UserId};

/// Lifecycle status of a giveaway.
///
/// The only transition is `Active -> Completed`; `Completed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum GiveawayStatus {
    /// Accepting entries until its end time.
    Active,
    /// Winners have been drawn; only the winner set may still change.
    Completed,
}

impl GiveawayStatus {
    /// Returns the storage representation of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for GiveawayStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GiveawayStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "completed" => Ok(Self::Completed),
            other => Err(format!("unknown giveaway status: {other}")),
        }
    }
}

/// Everything needed to insert a new giveaway.
///
/// Built by the creation path after the duration and winner count have
/// been validated.
#[derive(Debug, Clone)]
pub struct GiveawayDraft {
    /// Guild the giveaway runs in.
    pub guild_id: GuildId,
    /// Channel where the announcement is posted.
    pub channel_id: ChannelId,
    /// Administrator who created the giveaway.
    pub creator_id: UserId,
    /// Prize description.
    pub prize: String,
    /// Number of winners to draw (at least one).
    pub winners_requested: u32,
    /// Instant at which the giveaway stops accepting entries.
    pub end_time: DateTime<Utc>,
    /// Free-form entry requirements shown to users.
    pub requirements: Option<String>,
    /// Creation instant.
    pub created_at: DateTime<Utc>,
}

/// A time-boxed giveaway as persisted by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Giveaway {
    /// Unique identifier (immutable after creation).
    pub id: GiveawayId,
    /// Guild the giveaway runs in.
    pub guild_id: GuildId,
    /// Channel where the announcement is posted.
    pub channel_id: ChannelId,
    /// Announcement message, set once it has been rendered.
    pub message_id: Option<MessageId>,
    /// Administrator who created the giveaway.
    pub creator_id: UserId,
    /// Prize description.
    pub prize: String,
    /// Number of winners to draw.
    pub winners_requested: u32,
    /// Fixed at creation; never moved by the scheduler.
    pub end_time: DateTime<Utc>,
    /// Free-form entry requirements.
    pub requirements: Option<String>,
    /// Current lifecycle status.
    pub status: GiveawayStatus,
    /// Creation instant.
    pub created_at: DateTime<Utc>,
    /// Instant the status flipped to `Completed`.
    pub completed_at: Option<DateTime<Utc>>,
}

impl Giveaway {
    /// Materializes a freshly created giveaway from its draft.
    #[must_use]
    pub fn from_draft(id: GiveawayId, draft: GiveawayDraft) -> Self {
        Self {
            id,
            guild_id: draft.guild_id,
            channel_id: draft.channel_id,
            message_id: None,
            creator_id: draft.creator_id,
            prize: draft.prize,
            winners_requested: draft.winners_requested,
            end_time: draft.end_time,
            requirements: draft.requirements,
            status: GiveawayStatus::Active,
            created_at: draft.created_at,
            completed_at: None,
        }
    }

    /// Returns `true` if the giveaway accepts entries at `now`.
    #[must_use]
    pub fn is_open_at(&self, now: DateTime<Utc>) -> bool {
        self.status == GiveawayStatus::Active && now < self.end_time
    }

    /// Returns `true` if the scheduler should complete this giveaway at `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.status == GiveawayStatus::Active && self.end_time <= now
    }
}

/// One user's participation in one giveaway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entry {
    /// Giveaway entered.
    pub giveaway_id: GiveawayId,
    /// Entrant.
    pub user_id: UserId,
    /// Entry instant.
    pub entered_at: DateTime<Utc>,
}

/// A user drawn from a giveaway's entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Winner {
    /// Giveaway won.
    pub giveaway_id: GiveawayId,
    /// Winning user.
    pub user_id: UserId,
    /// Whether the prize has been handed out.
    pub prize_claimed: bool,
    /// Draw instant.
    pub won_at: DateTime<Utc>,
}

/// Lightweight view of an active giveaway for list endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct GiveawaySummary {
    /// The giveaway row.
    pub giveaway: Giveaway,
    /// Number of entries recorded so far.
    pub entry_count: u64,
}
