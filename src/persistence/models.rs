//! Database row models for giveaways and winners.
//!
//! Snowflakes are stored as `BIGINT`; the `u64 <-> i64` casts below are
//! bit-preserving, so every snowflake survives a round trip.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{Giveaway, GiveawayId, GiveawayStatus, Winner};
use crate::error::GiveawayError;

/// A row from the `giveaways` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct GiveawayRow {
    /// Primary key.
    pub id: Uuid,
    /// Guild snowflake.
    pub guild_id: i64,
    /// Channel snowflake.
    pub channel_id: i64,
    /// Announcement message snowflake.
    pub message_id: Option<i64>,
    /// Creator snowflake.
    pub creator_id: i64,
    /// Prize description.
    pub prize: String,
    /// Winners requested.
    pub winners_requested: i32,
    /// Entry deadline.
    pub end_time: DateTime<Utc>,
    /// Free-form requirements.
    pub requirements: Option<String>,
    /// `"active"` or `"completed"`.
    pub status: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Completion timestamp.
    pub completed_at: Option<DateTime<Utc>>,
}

impl TryFrom<GiveawayRow> for Giveaway {
    type Error = GiveawayError;

    fn try_from(row: GiveawayRow) -> Result<Self, Self::Error> {
        let status = row
            .status
            .parse::<GiveawayStatus>()
            .map_err(GiveawayError::Internal)?;
        let winners_requested = u32::try_from(row.winners_requested).map_err(|_| {
            GiveawayError::Internal(format!(
                "giveaway {} has invalid winner count {}",
                row.id, row.winners_requested
            ))
        })?;

        Ok(Self {
            id: GiveawayId::from_uuid(row.id),
            guild_id: from_db(row.guild_id),
            channel_id: from_db(row.channel_id),
            message_id: row.message_id.map(from_db),
            creator_id: from_db(row.creator_id),
            prize: row.prize,
            winners_requested,
            end_time: row.end_time,
            requirements: row.requirements,
            status,
            created_at: row.created_at,
            completed_at: row.completed_at,
        })
    }
}

/// A row from the `giveaway_winners` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct WinnerRow {
    /// Giveaway won.
    pub giveaway_id: Uuid,
    /// Winner snowflake.
    pub user_id: i64,
    /// Whether the prize was handed out.
    pub prize_claimed: bool,
    /// Draw timestamp.
    pub won_at: DateTime<Utc>,
}

impl From<WinnerRow> for Winner {
    fn from(row: WinnerRow) -> Self {
        Self {
            giveaway_id: GiveawayId::from_uuid(row.giveaway_id),
            user_id: from_db(row.user_id),
            prize_claimed: row.prize_claimed,
            won_at: row.won_at,
        }
    }
}

/// Converts a snowflake to its `BIGINT` column value.
#[allow(clippy::cast_possible_wrap)]
#[must_use]
pub const fn to_db(snowflake: u64) -> i64 {
    snowflake as i64
}

/// Converts a `BIGINT` column value back to a snowflake.
#[allow(clippy::cast_sign_loss)]
#[must_use]
pub const fn from_db(value: i64) -> u64 {
    value as u64
}
