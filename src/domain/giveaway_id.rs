//! Type-safe giveaway identifier and chat-platform snowflake aliases.
//!
//! [`GiveawayId`] is a newtype wrapper around [`uuid::Uuid`] (v4) so that
//! giveaway identifiers cannot be confused with other UUIDs. Users, guilds,
//! channels and messages are identified by the platform's 64-bit snowflakes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Chat-platform user snowflake.
pub type UserId = u64;

/// Chat-platform guild (server) snowflake.
pub type GuildId = u64;

/// Chat-platform channel snowflake.
pub type ChannelId = u64;

/// Chat-platform message snowflake.
pub type MessageId = u64;

/// Opaque identifier of a giveaway.
///
/// Generated once at creation time and immutable thereafter. Used as the
/// key in every store, event discriminator and WebSocket subscription target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct GiveawayId(uuid::Uuid);

impl GiveawayId {
    /// Creates a new random `GiveawayId` (UUID v4).
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }

    /// Creates a `GiveawayId` from an existing [`uuid::Uuid`].
    #[must_use]
    pub const fn from_uuid(uuid: uuid::Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner [`uuid::Uuid`].
    #[must_use]
    pub const fn as_uuid(&self) -> &uuid::Uuid {
        &self.0
    }
}

impl Default for GiveawayId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for GiveawayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for GiveawayId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<uuid::Uuid>().map(Self)
    }
}

impl From<uuid::Uuid> for GiveawayId {
    fn from(uuid: uuid::Uuid) -> Self {
        Self(uuid)
    }
}

impl From<GiveawayId> for uuid::Uuid {
    fn from(id: GiveawayId) -> Self {
        id.0
    }
}
