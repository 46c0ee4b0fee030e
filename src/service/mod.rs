//! Service layer: business logic orchestration.
//!
//! Each service holds shared handles to the [`crate::persistence::GiveawayStore`]
//! and, where it emits events, to a [`crate::domain::NotificationSink`]:
//!
//! - [`GiveawayService`] creates giveaways and serves lookups.
//! - [`EntryManager`] records entries.
//! - [`CompletionProcessor`] ends giveaways and draws winners.
//! - [`RerollService`] redraws winners of completed giveaways.

pub mod completion;
pub mod entry_manager;
pub mod giveaway_service;
pub mod reroll;

pub use completion::{CompletionOutcome, CompletionProcessor, CompletionSummary};
pub use entry_manager::EntryManager;
pub use giveaway_service::{GiveawayDetails, GiveawayService, NewGiveaway};
pub use reroll::RerollService;
