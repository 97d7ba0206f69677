//! Repository for the `setlists` table.

use setlist_core::models::{CreateSetlist, Setlist, SetlistWithSongs, UpdateSetlist};
use setlist_core::types::DbId;
use sqlx::PgPool;

use crate::repositories::SongRepo;
use crate::store::RemoveOutcome;

/// Column list for `setlists` queries.
const COLUMNS: &str = "id, title, date, logo_url, is_active, created_at, updated_at";

/// Provides data access for setlists.
pub struct SetlistRepo;

impl SetlistRepo {
    /// List active setlists, newest first.
    pub async fn list_active(pool: &PgPool) -> Result<Vec<Setlist>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM setlists \
             WHERE is_active = true \
             ORDER BY created_at DESC, id"
        );
        sqlx::query_as::<_, Setlist>(&query).fetch_all(pool).await
    }

    /// Find an active setlist by id.
    pub async fn find_active(pool: &PgPool, id: DbId) -> Result<Option<Setlist>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM setlists WHERE id = $1 AND is_active = true");
        sqlx::query_as::<_, Setlist>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Insert a new setlist with an already-resolved title.
    pub async fn create(
        pool: &PgPool,
        title: &str,
        input: &CreateSetlist,
    ) -> Result<Setlist, sqlx::Error> {
        let query = format!(
            "INSERT INTO setlists (id, title, date, logo_url) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Setlist>(&query)
            .bind(DbId::new_v4())
            .bind(title)
            .bind(&input.date)
            .bind(&input.logo_url)
            .fetch_one(pool)
            .await
    }

    /// Deep-copy `source` and its songs under a new id, in one transaction.
    ///
    /// Song positions are preserved; every copied song gets a new id.
    pub async fn copy(
        pool: &PgPool,
        source: &Setlist,
        title: &str,
    ) -> Result<SetlistWithSongs, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO setlists (id, title, date, logo_url) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );
        let setlist = sqlx::query_as::<_, Setlist>(&query)
            .bind(DbId::new_v4())
            .bind(title)
            .bind(&source.date)
            .bind(&source.logo_url)
            .fetch_one(&mut *tx)
            .await?;

        let originals = SongRepo::list_by_setlist(&mut *tx, source.id).await?;
        let mut songs = Vec::with_capacity(originals.len());
        for original in &originals {
            let song = SongRepo::insert(
                &mut *tx,
                setlist.id,
                &original.title,
                Some(original.position),
            )
            .await?;
            songs.push(song);
        }

        tx.commit().await?;
        Ok(SetlistWithSongs { setlist, songs })
    }

    /// Partially update an active setlist.
    ///
    /// Uses `COALESCE` so only provided fields are changed.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateSetlist,
    ) -> Result<Option<Setlist>, sqlx::Error> {
        let query = format!(
            "UPDATE setlists SET \
                 title = COALESCE($2, title), \
                 date = COALESCE($3, date), \
                 logo_url = COALESCE($4, logo_url) \
             WHERE id = $1 AND is_active = true \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Setlist>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.date)
            .bind(&input.logo_url)
            .fetch_optional(pool)
            .await
    }

    /// Set `logo_url` back to NULL on an active setlist.
    pub async fn clear_logo(pool: &PgPool, id: DbId) -> Result<Option<Setlist>, sqlx::Error> {
        let query = format!(
            "UPDATE setlists SET logo_url = NULL \
             WHERE id = $1 AND is_active = true \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Setlist>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Soft-delete a setlist unless it is the last active one.
    ///
    /// Locks every active row first so a concurrent removal cannot slip
    /// between the count check and the update.
    pub async fn deactivate(pool: &PgPool, id: DbId) -> Result<RemoveOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let active: Vec<DbId> =
            sqlx::query_scalar("SELECT id FROM setlists WHERE is_active = true FOR UPDATE")
                .fetch_all(&mut *tx)
                .await?;

        if !active.contains(&id) {
            return Ok(RemoveOutcome::NotFound);
        }
        if active.len() <= 1 {
            return Ok(RemoveOutcome::LastActive);
        }

        sqlx::query("UPDATE setlists SET is_active = false WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(RemoveOutcome::Removed)
    }

    /// Insert a default setlist if no active one exists.
    ///
    /// Returns the created setlist, or `None` if one already existed.
    pub async fn ensure_active(pool: &PgPool, title: &str) -> Result<Option<Setlist>, sqlx::Error> {
        let query = format!(
            "INSERT INTO setlists (id, title) \
             SELECT $1, $2 \
             WHERE NOT EXISTS (SELECT 1 FROM setlists WHERE is_active = true) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Setlist>(&query)
            .bind(DbId::new_v4())
            .bind(title)
            .fetch_optional(pool)
            .await
    }
}
