//! PostgreSQL implementation of the giveaway store.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use super::models::{GiveawayRow, WinnerRow, from_db, to_db};
use super::{CompletionFlip, GiveawayStore};
use crate::config::GatewayConfig;
use crate::domain::{Giveaway, GiveawayDraft, GiveawayId, GuildId, MessageId, UserId, Winner};
use crate::error::GiveawayError;

macro_rules! select_giveaways {
    ($tail:literal) => {
        concat!(
            "SELECT id, guild_id, channel_id, message_id, creator_id, prize, winners_requested, \
             end_time, requirements, status, created_at, completed_at FROM giveaways ",
            $tail
        )
    };
}

/// PostgreSQL-backed giveaway store using `sqlx::PgPool`.
///
/// Entry uniqueness is enforced by the `UNIQUE (giveaway_id, user_id)`
/// constraint; a violation surfaces as [`GiveawayError::DuplicateEntry`].
#[derive(Debug, Clone)]
pub struct PostgresGiveawayStore {
    pool: PgPool,
}

impl PostgresGiveawayStore {
    /// Creates a store over an existing connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens a connection pool using the database settings in `config`.
    ///
    /// # Errors
    ///
    /// Returns [`GiveawayError::StoreUnavailable`] if the database cannot
    /// be reached.
    pub async fn connect(config: &GatewayConfig) -> Result<Self, GiveawayError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .min_connections(config.database_min_connections)
            .acquire_timeout(Duration::from_secs(config.database_connect_timeout_secs))
            .connect(&config.database_url)
            .await?;
        Ok(Self::new(pool))
    }

    /// Applies the embedded schema migrations.
    ///
    /// # Errors
    ///
    /// Returns [`GiveawayError::StoreUnavailable`] if a migration fails.
    pub async fn migrate(&self) -> Result<(), GiveawayError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    async fn exists(&self, id: GiveawayId) -> Result<bool, GiveawayError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM giveaways WHERE id = $1)",
        )
        .bind(id.as_uuid())
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }
}

fn into_giveaways(rows: Vec<GiveawayRow>) -> Result<Vec<Giveaway>, GiveawayError> {
    rows.into_iter().map(Giveaway::try_from).collect()
}

#[async_trait]
impl GiveawayStore for PostgresGiveawayStore {
    async fn create_giveaway(&self, draft: GiveawayDraft) -> Result<GiveawayId, GiveawayError> {
        let id = GiveawayId::new();
        let winners_requested = i32::try_from(draft.winners_requested).map_err(|_| {
            GiveawayError::Validation(format!(
                "winner count {} is out of range",
                draft.winners_requested
            ))
        })?;

        sqlx::query(
            "INSERT INTO giveaways (id, guild_id, channel_id, creator_id, prize, \
             winners_requested, end_time, requirements, status, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 'active', $9)",
        )
        .bind(id.as_uuid())
        .bind(to_db(draft.guild_id))
        .bind(to_db(draft.channel_id))
        .bind(to_db(draft.creator_id))
        .bind(&draft.prize)
        .bind(winners_requested)
        .bind(draft.end_time)
        .bind(&draft.requirements)
        .bind(draft.created_at)
        .execute(&self.pool)
        .await?;

        Ok(id)
    }

    async fn get_giveaway(&self, id: GiveawayId) -> Result<Giveaway, GiveawayError> {
        let row = sqlx::query_as::<_, GiveawayRow>(select_giveaways!("WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        row.ok_or(GiveawayError::NotFound(id))?.try_into()
    }

    async fn list_expired_active(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<Giveaway>, GiveawayError> {
        let rows = sqlx::query_as::<_, GiveawayRow>(select_giveaways!(
            "WHERE status = 'active' AND end_time <= $1 ORDER BY end_time ASC"
        ))
        .bind(now)
        .fetch_all(&self.pool)
        .await?;

        into_giveaways(rows)
    }

    async fn list_active_in_guild(
        &self,
        guild_id: GuildId,
    ) -> Result<Vec<Giveaway>, GiveawayError> {
        let rows = sqlx::query_as::<_, GiveawayRow>(select_giveaways!(
            "WHERE guild_id = $1 AND status = 'active' ORDER BY end_time ASC"
        ))
        .bind(to_db(guild_id))
        .fetch_all(&self.pool)
        .await?;

        into_giveaways(rows)
    }

    async fn set_message_id(
        &self,
        id: GiveawayId,
        message_id: MessageId,
    ) -> Result<(), GiveawayError> {
        let result = sqlx::query("UPDATE giveaways SET message_id = $2 WHERE id = $1")
            .bind(id.as_uuid())
            .bind(to_db(message_id))
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(GiveawayError::NotFound(id));
        }
        Ok(())
    }

    async fn mark_completed(
        &self,
        id: GiveawayId,
        completed_at: DateTime<Utc>,
    ) -> Result<CompletionFlip, GiveawayError> {
        let result = sqlx::query(
            "UPDATE giveaways SET status = 'completed', completed_at = $2 \
             WHERE id = $1 AND status = 'active'",
        )
        .bind(id.as_uuid())
        .bind(completed_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 1 {
            return Ok(CompletionFlip::Flipped);
        }
        if self.exists(id).await? {
            Ok(CompletionFlip::AlreadyCompleted)
        } else {
            Err(GiveawayError::NotFound(id))
        }
    }

    async fn add_entry(
        &self,
        id: GiveawayId,
        user_id: UserId,
        entered_at: DateTime<Utc>,
    ) -> Result<(), GiveawayError> {
        let result = sqlx::query(
            "INSERT INTO giveaway_entries (giveaway_id, user_id, entered_at) \
             SELECT id, $2, $3 FROM giveaways \
             WHERE id = $1 AND status = 'active' AND end_time > $3",
        )
        .bind(id.as_uuid())
        .bind(to_db(user_id))
        .bind(entered_at)
        .execute(&self.pool)
        .await;

        let result = match result {
            Ok(result) => result,
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                return Err(GiveawayError::DuplicateEntry {
                    giveaway_id: id,
                    user_id,
                });
            }
            Err(e) => return Err(e.into()),
        };

        if result.rows_affected() == 1 {
            return Ok(());
        }
        if self.exists(id).await? {
            Err(GiveawayError::NotActive(id))
        } else {
            Err(GiveawayError::NotFound(id))
        }
    }

    async fn count_entries(&self, id: GiveawayId) -> Result<u64, GiveawayError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM giveaway_entries WHERE giveaway_id = $1",
        )
        .bind(id.as_uuid())
        .fetch_one(&self.pool)
        .await?;

        Ok(u64::try_from(count).unwrap_or_default())
    }

    async fn list_entries(&self, id: GiveawayId) -> Result<Vec<UserId>, GiveawayError> {
        let rows = sqlx::query_scalar::<_, i64>(
            "SELECT user_id FROM giveaway_entries WHERE giveaway_id = $1 ORDER BY id ASC",
        )
        .bind(id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(from_db).collect())
    }

    async fn replace_winners(
        &self,
        id: GiveawayId,
        winners: &[UserId],
        won_at: DateTime<Utc>,
    ) -> Result<(), GiveawayError> {
        let user_ids: Vec<i64> = winners.iter().copied().map(to_db).collect();

        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM giveaway_winners WHERE giveaway_id = $1")
            .bind(id.as_uuid())
            .execute(&mut *tx)
            .await?;
        sqlx::query(
            "INSERT INTO giveaway_winners (giveaway_id, user_id, won_at) \
             SELECT $1, u, $3 FROM UNNEST($2::BIGINT[]) AS u",
        )
        .bind(id.as_uuid())
        .bind(&user_ids)
        .bind(won_at)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        Ok(())
    }

    async fn list_winners(&self, id: GiveawayId) -> Result<Vec<Winner>, GiveawayError> {
        let rows = sqlx::query_as::<_, WinnerRow>(
            "SELECT giveaway_id, user_id, prize_claimed, won_at FROM giveaway_winners \
             WHERE giveaway_id = $1 ORDER BY id ASC",
        )
        .bind(id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Winner::from).collect())
    }

    async fn list_winnerless_completed(
        &self,
        completed_before: DateTime<Utc>,
    ) -> Result<Vec<Giveaway>, GiveawayError> {
        let rows = sqlx::query_as::<_, GiveawayRow>(select_giveaways!(
            "WHERE status = 'completed' AND completed_at <= $1 \
             AND EXISTS (SELECT 1 FROM giveaway_entries e WHERE e.giveaway_id = giveaways.id) \
             AND NOT EXISTS (SELECT 1 FROM giveaway_winners w WHERE w.giveaway_id = giveaways.id) \
             ORDER BY end_time ASC"
        ))
        .bind(completed_before)
        .fetch_all(&self.pool)
        .await?;

        into_giveaways(rows)
    }
}

// These run against a real database: set DATABASE_URL and pass `--ignored`.
// Each test gets a fresh database with the migrations applied.
#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::sync::Arc;

    use chrono::Duration;

    use super::*;
    use crate::domain::GiveawayStatus;

    fn draft(end_in: Duration) -> GiveawayDraft {
        let now = Utc::now();
        GiveawayDraft {
            guild_id: 1,
            channel_id: 10,
            creator_id: 20,
            prize: "Steam key".to_string(),
            winners_requested: 2,
            end_time: now + end_in,
            requirements: None,
            created_at: now,
        }
    }

    async fn store_with_giveaway(
        pool: PgPool,
        end_in: Duration,
    ) -> (PostgresGiveawayStore, GiveawayId) {
        let store = PostgresGiveawayStore::new(pool);
        let id = match store.create_giveaway(draft(end_in)).await {
            Ok(id) => id,
            Err(e) => panic!("create failed: {e}"),
        };
        (store, id)
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL"]
    async fn create_round_trips_snowflakes(pool: PgPool) {
        let store = PostgresGiveawayStore::new(pool);
        let mut giveaway = draft(Duration::hours(1));
        giveaway.guild_id = u64::MAX;
        let Ok(id) = store.create_giveaway(giveaway).await else {
            panic!("create failed");
        };
        let Ok(g) = store.get_giveaway(id).await else {
            panic!("giveaway should exist");
        };
        assert_eq!(g.guild_id, u64::MAX);
        assert_eq!(g.status, GiveawayStatus::Active);
        assert!(matches!(
            store.get_giveaway(GiveawayId::new()).await,
            Err(GiveawayError::NotFound(_))
        ));
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL"]
    async fn unique_violation_maps_to_duplicate_entry(pool: PgPool) {
        let (store, id) = store_with_giveaway(pool, Duration::hours(1)).await;
        let now = Utc::now();
        assert!(store.add_entry(id, 5, now).await.is_ok());
        assert!(matches!(
            store.add_entry(id, 5, now).await,
            Err(GiveawayError::DuplicateEntry { user_id: 5, .. })
        ));
        assert_eq!(store.count_entries(id).await.unwrap_or_default(), 1);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL"]
    async fn concurrent_duplicate_entries_leave_one_row(pool: PgPool) {
        let (store, id) = store_with_giveaway(pool, Duration::hours(1)).await;
        let store = Arc::new(store);

        let mut handles = Vec::new();
        for _ in 0..16 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store.add_entry(id, 77, Utc::now()).await
            }));
        }

        let mut ok = 0;
        let mut dup = 0;
        for handle in handles {
            match handle.await {
                Ok(Ok(())) => ok += 1,
                Ok(Err(GiveawayError::DuplicateEntry { .. })) => dup += 1,
                other => panic!("unexpected outcome: {other:?}"),
            }
        }
        assert_eq!(ok, 1);
        assert_eq!(dup, 15);
        assert_eq!(store.list_entries(id).await.unwrap_or_default(), vec![77]);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL"]
    async fn entry_outcome_distinguishes_ended_from_missing(pool: PgPool) {
        let (store, id) = store_with_giveaway(pool, Duration::minutes(1)).await;
        let later = Utc::now() + Duration::minutes(2);
        assert!(matches!(
            store.add_entry(id, 1, later).await,
            Err(GiveawayError::NotActive(missing)) if missing == id
        ));

        let unknown = GiveawayId::new();
        assert!(matches!(
            store.add_entry(unknown, 1, Utc::now()).await,
            Err(GiveawayError::NotFound(missing)) if missing == unknown
        ));
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL"]
    async fn mark_completed_flips_once(pool: PgPool) {
        let (store, id) = store_with_giveaway(pool, Duration::hours(1)).await;
        let now = Utc::now();
        assert!(matches!(
            store.mark_completed(id, now).await,
            Ok(CompletionFlip::Flipped)
        ));
        assert!(matches!(
            store.mark_completed(id, now).await,
            Ok(CompletionFlip::AlreadyCompleted)
        ));
        assert!(matches!(
            store.add_entry(id, 1, now).await,
            Err(GiveawayError::NotActive(_))
        ));
        assert!(matches!(
            store.mark_completed(GiveawayId::new(), now).await,
            Err(GiveawayError::NotFound(_))
        ));

        let Ok(g) = store.get_giveaway(id).await else {
            panic!("giveaway should exist");
        };
        assert_eq!(g.status, GiveawayStatus::Completed);
        assert!(g.completed_at.is_some());
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL"]
    async fn replace_winners_swaps_the_whole_set(pool: PgPool) {
        let (store, id) = store_with_giveaway(pool, Duration::hours(1)).await;
        let now = Utc::now();
        assert!(store.replace_winners(id, &[1, 2], now).await.is_ok());
        assert!(store.replace_winners(id, &[3, u64::MAX], now).await.is_ok());

        let Ok(winners) = store.list_winners(id).await else {
            panic!("listing failed");
        };
        let users: Vec<UserId> = winners.iter().map(|w| w.user_id).collect();
        assert_eq!(users, vec![3, u64::MAX]);
        assert!(winners.iter().all(|w| w.giveaway_id == id && !w.prize_claimed));

        assert!(store.replace_winners(id, &[], now).await.is_ok());
        assert!(store.list_winners(id).await.unwrap_or_default().is_empty());
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL"]
    async fn winnerless_listing_needs_entries_and_no_winners(pool: PgPool) {
        let (store, id) = store_with_giveaway(pool, Duration::hours(1)).await;
        let now = Utc::now();
        let _ = store.add_entry(id, 9, now).await;
        let _ = store.mark_completed(id, now).await;

        let Ok(stranded) = store.list_winnerless_completed(now + Duration::seconds(1)).await
        else {
            panic!("listing failed");
        };
        assert_eq!(stranded.iter().map(|g| g.id).collect::<Vec<_>>(), vec![id]);

        let _ = store.replace_winners(id, &[9], now).await;
        let Ok(stranded) = store.list_winnerless_completed(now + Duration::seconds(1)).await
        else {
            panic!("listing failed");
        };
        assert!(stranded.is_empty());
    }
}
