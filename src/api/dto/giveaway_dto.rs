//! Giveaway DTOs for create, get, list, message id, end and reroll.
//!
//! Snowflakes travel as decimal strings; JavaScript clients lose
//! precision on integers above 2^53.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::common_dto::{PaginationMeta, PaginationParams, default_page, default_per_page};
use crate::domain::{Giveaway, GiveawayId, GiveawayStatus, GiveawaySummary, UserId, Winner};
use crate::service::{CompletionSummary, GiveawayDetails};

/// Request body for `POST /giveaways`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateGiveawayRequest {
    /// Guild snowflake.
    pub guild_id: String,
    /// Announcement channel snowflake.
    pub channel_id: String,
    /// Creating administrator's snowflake.
    pub creator_id: String,
    /// Prize description.
    pub prize: String,
    /// Winners to draw.
    #[serde(default = "default_winners")]
    pub winners: u32,
    /// Duration such as `"1h30m"`, `"2d"` or `"45"` (minutes).
    pub duration: String,
    /// Optional entry requirements.
    #[serde(default)]
    pub requirements: Option<String>,
}

fn default_winners() -> u32 {
    1
}

/// A giveaway as returned by the API.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct GiveawayDto {
    /// Giveaway identifier.
    pub giveaway_id: GiveawayId,
    /// Guild snowflake.
    pub guild_id: String,
    /// Channel snowflake.
    pub channel_id: String,
    /// Announcement message snowflake, once recorded.
    pub message_id: Option<String>,
    /// Creator snowflake.
    pub creator_id: String,
    /// Prize description.
    pub prize: String,
    /// Winners to draw.
    pub winners_requested: u32,
    /// Entry deadline.
    pub end_time: DateTime<Utc>,
    /// Entry requirements.
    pub requirements: Option<String>,
    /// Lifecycle status.
    pub status: GiveawayStatus,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Completion timestamp.
    pub completed_at: Option<DateTime<Utc>>,
}

impl From<&Giveaway> for GiveawayDto {
    fn from(g: &Giveaway) -> Self {
        Self {
            giveaway_id: g.id,
            guild_id: g.guild_id.to_string(),
            channel_id: g.channel_id.to_string(),
            message_id: g.message_id.map(|m| m.to_string()),
            creator_id: g.creator_id.to_string(),
            prize: g.prize.clone(),
            winners_requested: g.winners_requested,
            end_time: g.end_time,
            requirements: g.requirements.clone(),
            status: g.status,
            created_at: g.created_at,
            completed_at: g.completed_at,
        }
    }
}

/// A drawn winner.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct WinnerDto {
    /// Winner snowflake.
    pub user_id: String,
    /// Whether the prize was handed out.
    pub prize_claimed: bool,
    /// Draw timestamp.
    pub won_at: DateTime<Utc>,
}

impl From<&Winner> for WinnerDto {
    fn from(w: &Winner) -> Self {
        Self {
            user_id: w.user_id.to_string(),
            prize_claimed: w.prize_claimed,
            won_at: w.won_at,
        }
    }
}

/// Response body for `GET /giveaways/{id}`.
#[derive(Debug, Serialize, ToSchema)]
pub struct GiveawayDetailResponse {
    /// The giveaway.
    #[serde(flatten)]
    pub giveaway: GiveawayDto,
    /// Entries recorded so far.
    pub entry_count: u64,
    /// Current winners; empty while active.
    pub winners: Vec<WinnerDto>,
}

impl From<&GiveawayDetails> for GiveawayDetailResponse {
    fn from(d: &GiveawayDetails) -> Self {
        Self {
            giveaway: GiveawayDto::from(&d.giveaway),
            entry_count: d.entry_count,
            winners: d.winners.iter().map(WinnerDto::from).collect(),
        }
    }
}

/// Active giveaway row in list responses.
#[derive(Debug, Serialize, ToSchema)]
pub struct ActiveGiveawayDto {
    /// The giveaway.
    #[serde(flatten)]
    pub giveaway: GiveawayDto,
    /// Entries recorded so far.
    pub entry_count: u64,
}

impl From<&GiveawaySummary> for ActiveGiveawayDto {
    fn from(s: &GiveawaySummary) -> Self {
        Self {
            giveaway: GiveawayDto::from(&s.giveaway),
            entry_count: s.entry_count,
        }
    }
}

/// Query parameters for `GET /giveaways`.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListActiveParams {
    /// Guild snowflake whose active giveaways are listed.
    pub guild_id: String,
    /// Page number (1-indexed).
    #[serde(default = "default_page")]
    pub page: u32,
    /// Items per page (max 100).
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

impl ListActiveParams {
    /// Extracts the pagination part.
    #[must_use]
    pub const fn pagination(&self) -> PaginationParams {
        PaginationParams {
            page: self.page,
            per_page: self.per_page,
        }
    }
}

/// Paginated list response for `GET /giveaways`.
#[derive(Debug, Serialize, ToSchema)]
pub struct GiveawayListResponse {
    /// Active giveaways, soonest-ending first.
    pub data: Vec<ActiveGiveawayDto>,
    /// Pagination metadata.
    pub pagination: PaginationMeta,
}

/// Request body for `PUT /giveaways/{id}/message`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SetMessageRequest {
    /// Announcement message snowflake.
    pub message_id: String,
}

/// Response body for `POST /giveaways/{id}/end`.
#[derive(Debug, Serialize, ToSchema)]
pub struct EndGiveawayResponse {
    /// Giveaway identifier.
    pub giveaway_id: GiveawayId,
    /// `true` if the giveaway had already ended before this call.
    pub already_completed: bool,
    /// Winners drawn by this call.
    pub winners: Vec<String>,
    /// Entries at draw time, when this call drew.
    pub entry_count: Option<u64>,
}

impl EndGiveawayResponse {
    /// Response for a call that drew winners.
    #[must_use]
    pub fn drawn(summary: &CompletionSummary) -> Self {
        Self {
            giveaway_id: summary.giveaway_id,
            already_completed: false,
            winners: snowflakes(&summary.winners),
            entry_count: Some(summary.entry_count),
        }
    }

    /// Response for a giveaway that had already ended.
    #[must_use]
    pub const fn already_completed(giveaway_id: GiveawayId) -> Self {
        Self {
            giveaway_id,
            already_completed: true,
            winners: Vec::new(),
            entry_count: None,
        }
    }
}

/// Response body for `POST /giveaways/{id}/reroll`.
#[derive(Debug, Serialize, ToSchema)]
pub struct RerollResponse {
    /// Giveaway identifier.
    pub giveaway_id: GiveawayId,
    /// Replacement winners.
    pub winners: Vec<String>,
}

/// Renders user snowflakes as strings.
#[must_use]
pub fn snowflakes(ids: &[UserId]) -> Vec<String> {
    ids.iter().map(ToString::to_string).collect()
}
