//! Domain layer: giveaway model, pure algorithms and the event system.
//!
//! This module contains the giveaway entities and identifiers, the
//! duration parser, the winner selector, and the event bus that carries
//! lifecycle notifications to the presentation layer.

pub mod duration;
pub mod event_bus;
pub mod giveaway;
pub mod giveaway_event;
pub mod giveaway_id;
pub mod winner_selector;

pub use duration::parse_duration;
pub use event_bus::{EventBus, NotificationSink};
pub use giveaway::{Entry, Giveaway, GiveawayDraft, GiveawayStatus, GiveawaySummary, Winner};
pub use giveaway_event::GiveawayEvent;
pub use giveaway_id::{ChannelId, GiveawayId, GuildId, MessageId, UserId};
pub use winner_selector::{WinnerSelector, select_winners};
