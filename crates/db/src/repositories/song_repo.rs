//! Repository for the `songs` table.
//!
//! Callers are expected to have checked that the owning setlist is active;
//! every statement is still scoped by `setlist_id` so a song id from another
//! setlist never matches.

use setlist_core::models::{Song, SongPosition, UpdateSong};
use setlist_core::types::DbId;
use sqlx::{PgExecutor, PgPool};

use crate::store::ReorderOutcome;

/// Column list for `songs` queries.
const COLUMNS: &str = "id, setlist_id, title, position, created_at";

/// Canonical display order, ties broken by creation time then id.
const ORDER: &str = "ORDER BY position ASC, created_at ASC, id ASC";

/// Provides data access for songs.
pub struct SongRepo;

impl SongRepo {
    /// List the songs of a setlist in display order.
    pub async fn list_by_setlist<'e, E>(executor: E, setlist_id: DbId) -> Result<Vec<Song>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!("SELECT {COLUMNS} FROM songs WHERE setlist_id = $1 {ORDER}");
        sqlx::query_as::<_, Song>(&query)
            .bind(setlist_id)
            .fetch_all(executor)
            .await
    }

    /// Insert a song.
    ///
    /// When `position` is `None` the song is appended after the current
    /// maximum position of the setlist (1 for an empty setlist). The max is
    /// computed in the same statement as the insert.
    pub async fn insert<'e, E>(
        executor: E,
        setlist_id: DbId,
        title: &str,
        position: Option<i32>,
    ) -> Result<Song, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "INSERT INTO songs (id, setlist_id, title, position) \
             VALUES ($1, $2, $3, COALESCE($4, \
                 (SELECT LEAST(COALESCE(MAX(position), 0), 2147483646) + 1 \
                  FROM songs WHERE setlist_id = $2))) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Song>(&query)
            .bind(DbId::new_v4())
            .bind(setlist_id)
            .bind(title)
            .bind(position)
            .fetch_one(executor)
            .await
    }

    /// Partially update a song. Returns `None` if it is not in the setlist.
    pub async fn update(
        pool: &PgPool,
        setlist_id: DbId,
        song_id: DbId,
        input: &UpdateSong,
    ) -> Result<Option<Song>, sqlx::Error> {
        let query = format!(
            "UPDATE songs SET \
                 title = COALESCE($3, title), \
                 position = COALESCE($4, position) \
             WHERE id = $1 AND setlist_id = $2 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Song>(&query)
            .bind(song_id)
            .bind(setlist_id)
            .bind(&input.title)
            .bind(input.position)
            .fetch_optional(pool)
            .await
    }

    /// Delete a song. Returns `true` if a row was deleted.
    pub async fn delete(pool: &PgPool, setlist_id: DbId, song_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM songs WHERE id = $1 AND setlist_id = $2")
            .bind(song_id)
            .bind(setlist_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete every song of a setlist. Returns the number of rows deleted.
    pub async fn delete_all(pool: &PgPool, setlist_id: DbId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM songs WHERE setlist_id = $1")
            .bind(setlist_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Apply a batch of position changes atomically.
    ///
    /// If any entry names a song outside the setlist the transaction is
    /// rolled back and no position changes. On success the canonical list
    /// is re-read after commit.
    pub async fn reorder(
        pool: &PgPool,
        setlist_id: DbId,
        positions: &[SongPosition],
    ) -> Result<ReorderOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;

        for entry in positions {
            let result =
                sqlx::query("UPDATE songs SET position = $1 WHERE id = $2 AND setlist_id = $3")
                    .bind(entry.position)
                    .bind(entry.id)
                    .bind(setlist_id)
                    .execute(&mut *tx)
                    .await?;

            if result.rows_affected() == 0 {
                tx.rollback().await?;
                return Ok(ReorderOutcome::UnknownSong(entry.id));
            }
        }

        tx.commit().await?;

        let songs = Self::list_by_setlist(pool, setlist_id).await?;
        Ok(ReorderOutcome::Reordered(songs))
    }
}
