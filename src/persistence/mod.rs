//! Persistence layer: the giveaway store boundary and its backends.
//!
//! [`GiveawayStore`] is the single source of truth for giveaways, entries
//! and winners. No other component caches entity state across calls; every
//! operation re-reads the rows it needs.
//!
//! Two backends exist: [`MemoryGiveawayStore`] for tests and
//! persistence-disabled deployments, and [`PostgresGiveawayStore`] backed
//! by `sqlx::PgPool`.

pub mod memory;
pub mod models;
pub mod postgres;

use std::fmt::Debug;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{Giveaway, GiveawayDraft, GiveawayId, GuildId, MessageId, UserId, Winner};
use crate::error::GiveawayError;

pub use memory::MemoryGiveawayStore;
pub use postgres::PostgresGiveawayStore;

/// Result of asking the store to flip a giveaway to `Completed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionFlip {
    /// This call performed the `Active -> Completed` transition.
    Flipped,
    /// The giveaway was already completed; nothing changed.
    AlreadyCompleted,
}

/// Storage contract for giveaways, entries and winners.
///
/// Implementations must enforce uniqueness of `(giveaway_id, user_id)` in
/// entry storage themselves: two concurrent [`GiveawayStore::add_entry`]
/// calls for the same pair must produce exactly one row and one
/// [`GiveawayError::DuplicateEntry`].
///
/// Unreachable storage is reported as [`GiveawayError::StoreUnavailable`].
#[async_trait]
pub trait GiveawayStore: Debug + Send + Sync {
    /// Inserts a new active giveaway and returns its ID.
    async fn create_giveaway(&self, draft: GiveawayDraft) -> Result<GiveawayId, GiveawayError>;

    /// Fetches a giveaway, or [`GiveawayError::NotFound`].
    async fn get_giveaway(&self, id: GiveawayId) -> Result<Giveaway, GiveawayError>;

    /// Lists active giveaways whose end time is at or before `now`,
    /// oldest end time first.
    async fn list_expired_active(&self, now: DateTime<Utc>)
    -> Result<Vec<Giveaway>, GiveawayError>;

    /// Lists active giveaways of a guild ordered by end time.
    async fn list_active_in_guild(&self, guild_id: GuildId)
    -> Result<Vec<Giveaway>, GiveawayError>;

    /// Records the announcement message of a giveaway.
    async fn set_message_id(
        &self,
        id: GiveawayId,
        message_id: MessageId,
    ) -> Result<(), GiveawayError>;

    /// Flips an active giveaway to `Completed` at `completed_at`.
    ///
    /// The flip is conditional on the current status, so at most one
    /// caller ever observes [`CompletionFlip::Flipped`].
    async fn mark_completed(
        &self,
        id: GiveawayId,
        completed_at: DateTime<Utc>,
    ) -> Result<CompletionFlip, GiveawayError>;

    /// Records an entry.
    ///
    /// Fails with [`GiveawayError::DuplicateEntry`] on a repeat entry,
    /// [`GiveawayError::NotActive`] when the giveaway is completed or its
    /// end time is not after `entered_at`, and [`GiveawayError::NotFound`]
    /// for an unknown giveaway.
    async fn add_entry(
        &self,
        id: GiveawayId,
        user_id: UserId,
        entered_at: DateTime<Utc>,
    ) -> Result<(), GiveawayError>;

    /// Counts the entries of a giveaway.
    async fn count_entries(&self, id: GiveawayId) -> Result<u64, GiveawayError>;

    /// Lists the entrants of a giveaway in entry order.
    async fn list_entries(&self, id: GiveawayId) -> Result<Vec<UserId>, GiveawayError>;

    /// Atomically replaces the winner set of a giveaway.
    async fn replace_winners(
        &self,
        id: GiveawayId,
        winners: &[UserId],
        won_at: DateTime<Utc>,
    ) -> Result<(), GiveawayError>;

    /// Lists the current winners of a giveaway.
    async fn list_winners(&self, id: GiveawayId) -> Result<Vec<Winner>, GiveawayError>;

    /// Lists completed giveaways that were flipped at or before
    /// `completed_before`, have at least one entry and no winners.
    async fn list_winnerless_completed(
        &self,
        completed_before: DateTime<Utc>,
    ) -> Result<Vec<Giveaway>, GiveawayError>;
}
