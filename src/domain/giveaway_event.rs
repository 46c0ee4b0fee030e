//! Domain events reflecting giveaway lifecycle changes.
//!
//! The engine emits a [`GiveawayEvent`] through a
//! [`super::NotificationSink`] after every user-visible change. Rendering
//! them as chat messages, buttons or message edits is the presentation
//! layer's job.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{GiveawayId, UserId};

/// Domain event emitted after a giveaway state change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum GiveawayEvent {
    /// A giveaway was created and is accepting entries.
    GiveawayCreated {
        /// Giveaway identifier.
        giveaway_id: GiveawayId,
        /// Prize description.
        prize: String,
        /// Number of winners that will be drawn.
        winners_requested: u32,
        /// Instant entries close.
        end_time: DateTime<Utc>,
    },

    /// A user's entry was recorded.
    EntryConfirmed {
        /// Giveaway identifier.
        giveaway_id: GiveawayId,
        /// Entrant.
        user_id: UserId,
        /// Entries recorded after this one.
        entry_count: u64,
    },

    /// The giveaway ended and winners were drawn.
    GiveawayCompleted {
        /// Giveaway identifier.
        giveaway_id: GiveawayId,
        /// Prize description.
        prize: String,
        /// Drawn winners; empty when nobody entered.
        winners: Vec<UserId>,
        /// Total entries at draw time.
        entry_count: u64,
    },

    /// The winner set of a completed giveaway was redrawn.
    GiveawayRerolled {
        /// Giveaway identifier.
        giveaway_id: GiveawayId,
        /// Replacement winners.
        winners: Vec<UserId>,
    },
}

impl GiveawayEvent {
    /// Returns the giveaway ID associated with this event.
    #[must_use]
    pub fn giveaway_id(&self) -> GiveawayId {
        match self {
            Self::GiveawayCreated { giveaway_id, .. }
            | Self::EntryConfirmed { giveaway_id, .. }
            | Self::GiveawayCompleted { giveaway_id, .. }
            | Self::GiveawayRerolled { giveaway_id, .. } => *giveaway_id,
        }
    }

    /// Returns the event type as a static string slice.
    #[must_use]
    pub const fn event_type_str(&self) -> &'static str {
        match self {
            Self::GiveawayCreated { .. } => "giveaway_created",
            Self::EntryConfirmed { .. } => "entry_confirmed",
            Self::GiveawayCompleted { .. } => "giveaway_completed",
            Self::GiveawayRerolled { .. } => "giveaway_rerolled",
        }
    }
}
