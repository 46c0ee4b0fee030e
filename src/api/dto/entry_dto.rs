//! Entry DTOs.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::GiveawayId;

/// Request body for `POST /giveaways/{id}/entries`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct EnterRequest {
    /// Entrant snowflake.
    pub user_id: String,
}

/// Response body for a recorded entry.
#[derive(Debug, Serialize, ToSchema)]
pub struct EnterResponse {
    /// Giveaway entered.
    pub giveaway_id: GiveawayId,
    /// Entrant snowflake.
    pub user_id: String,
    /// Entries recorded including this one.
    pub entry_count: u64,
}
