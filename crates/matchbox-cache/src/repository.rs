//! SQLite implementation of IBrowseRepository
//!
//! ## Type Mapping
//!
//! | Domain Type      | SQL Type     | Strategy                                   |
//! |------------------|--------------|--------------------------------------------|
//! | ItemId           | TEXT         | `.as_str()` / `ItemId::new()`              |
//! | BrowsePath       | TEXT         | `.as_str()` / `BrowsePath::new()`          |
//! | EntryKind        | TEXT         | `"file"` / `"folder"`                      |
//! | u64 sizes        | INTEGER      | cast through `i64`                         |
//! | Cursor           | TEXT NULL    | NULL when not recorded, `""` is a value    |
//! | has_more         | INTEGER NULL | 0 / 1, NULL when not recorded              |

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, Sqlite, SqlitePool, Transaction};

use matchbox_core::domain::{
    BrowsePath, Cursor, DirectoryEntry, EntryKind, ItemId, PaginationState,
};
use matchbox_core::ports::IBrowseRepository;

use crate::CacheError;

/// SQLite-based implementation of the browse repository port
///
/// Cloning is cheap: clones share the connection pool.
#[derive(Debug, Clone)]
pub struct SqliteBrowseRepository {
    pool: SqlitePool,
}

impl SqliteBrowseRepository {
    /// Creates a new repository instance with the given connection pool
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

// ============================================================================
// Row conversion
// ============================================================================

fn entry_from_row(row: &SqliteRow) -> Result<DirectoryEntry, CacheError> {
    let item_id: String = row.try_get("item_id")?;
    let name: String = row.try_get("name")?;
    let display_path: String = row.try_get("display_path")?;
    let parent_path: String = row.try_get("parent_path")?;
    let kind: String = row.try_get("kind")?;
    let size_bytes: i64 = row.try_get("size_bytes")?;

    Ok(DirectoryEntry {
        item_id: ItemId::new(item_id).map_err(|e| CacheError::CorruptRow(e.to_string()))?,
        name,
        display_path,
        parent_path: BrowsePath::new(parent_path)
            .map_err(|e| CacheError::CorruptRow(e.to_string()))?,
        kind: EntryKind::parse(&kind).map_err(|e| CacheError::CorruptRow(e.to_string()))?,
        size_bytes: u64::try_from(size_bytes)
            .map_err(|_| CacheError::CorruptRow(format!("negative size {size_bytes}")))?,
    })
}

fn size_to_sql(size: u64) -> Result<i64, CacheError> {
    i64::try_from(size).map_err(|_| CacheError::QueryFailed(format!("size {size} out of range")))
}

// ============================================================================
// Transaction helpers
// ============================================================================

async fn upsert_in(
    tx: &mut Transaction<'_, Sqlite>,
    entries: &[DirectoryEntry],
) -> Result<(), CacheError> {
    for entry in entries {
        sqlx::query(
            "INSERT INTO entries (item_id, name, display_path, parent_path, kind, size_bytes) \
             VALUES (?, ?, ?, ?, ?, ?) \
             ON CONFLICT(item_id) DO UPDATE SET \
                name = excluded.name, \
                display_path = excluded.display_path, \
                parent_path = excluded.parent_path, \
                kind = excluded.kind, \
                size_bytes = excluded.size_bytes",
        )
        .bind(entry.item_id.as_str())
        .bind(&entry.name)
        .bind(&entry.display_path)
        .bind(entry.parent_path.as_str())
        .bind(entry.kind.as_str())
        .bind(size_to_sql(entry.size_bytes)?)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}

async fn save_pagination_in(
    tx: &mut Transaction<'_, Sqlite>,
    path: &BrowsePath,
    state: &PaginationState,
) -> Result<(), CacheError> {
    if state.is_empty() {
        sqlx::query("DELETE FROM pagination_state WHERE path = ?")
            .bind(path.as_str())
            .execute(&mut **tx)
            .await?;
        return Ok(());
    }

    sqlx::query(
        "INSERT INTO pagination_state (path, cursor, has_more) VALUES (?, ?, ?) \
         ON CONFLICT(path) DO UPDATE SET cursor = excluded.cursor, has_more = excluded.has_more",
    )
    .bind(path.as_str())
    .bind(state.cursor.as_ref().map(Cursor::as_str))
    .bind(state.has_more)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

// ============================================================================
// IBrowseRepository
// ============================================================================

#[async_trait::async_trait]
impl IBrowseRepository for SqliteBrowseRepository {
    async fn upsert_entries(&self, entries: &[DirectoryEntry]) -> anyhow::Result<()> {
        let mut tx = self.pool.begin().await.map_err(CacheError::from)?;
        upsert_in(&mut tx, entries).await?;
        tx.commit().await.map_err(CacheError::from)?;

        tracing::trace!(count = entries.len(), "Upserted entries");
        Ok(())
    }

    async fn commit_page(
        &self,
        path: &BrowsePath,
        entries: &[DirectoryEntry],
        state: &PaginationState,
    ) -> anyhow::Result<()> {
        let mut tx = self.pool.begin().await.map_err(CacheError::from)?;
        upsert_in(&mut tx, entries).await?;
        save_pagination_in(&mut tx, path, state).await?;
        tx.commit().await.map_err(CacheError::from)?;

        tracing::debug!(
            path = %path,
            count = entries.len(),
            has_more = ?state.has_more,
            "Committed page"
        );
        Ok(())
    }

    async fn save_pagination(
        &self,
        path: &BrowsePath,
        state: &PaginationState,
    ) -> anyhow::Result<()> {
        let mut tx = self.pool.begin().await.map_err(CacheError::from)?;
        save_pagination_in(&mut tx, path, state).await?;
        tx.commit().await.map_err(CacheError::from)?;
        Ok(())
    }

    async fn reset_path(&self, path: &BrowsePath) -> anyhow::Result<u64> {
        let mut tx = self.pool.begin().await.map_err(CacheError::from)?;

        let removed = sqlx::query("DELETE FROM entries WHERE parent_path = ?")
            .bind(path.as_str())
            .execute(&mut *tx)
            .await
            .map_err(CacheError::from)?
            .rows_affected();

        sqlx::query("DELETE FROM pagination_state WHERE path = ?")
            .bind(path.as_str())
            .execute(&mut *tx)
            .await
            .map_err(CacheError::from)?;

        tx.commit().await.map_err(CacheError::from)?;

        tracing::debug!(path = %path, removed, "Reset path");
        Ok(removed)
    }

    async fn reset_all(&self) -> anyhow::Result<()> {
        let mut tx = self.pool.begin().await.map_err(CacheError::from)?;
        sqlx::query("DELETE FROM entries")
            .execute(&mut *tx)
            .await
            .map_err(CacheError::from)?;
        sqlx::query("DELETE FROM pagination_state")
            .execute(&mut *tx)
            .await
            .map_err(CacheError::from)?;
        tx.commit().await.map_err(CacheError::from)?;

        tracing::info!("Cleared cache");
        Ok(())
    }

    async fn get_entry(&self, item_id: &ItemId) -> anyhow::Result<Option<DirectoryEntry>> {
        let row = sqlx::query("SELECT * FROM entries WHERE item_id = ?")
            .bind(item_id.as_str())
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(ref r) => Ok(Some(entry_from_row(r)?)),
            None => Ok(None),
        }
    }

    async fn list_children(&self, path: &BrowsePath) -> anyhow::Result<Vec<DirectoryEntry>> {
        let rows = sqlx::query(
            "SELECT * FROM entries WHERE parent_path = ? ORDER BY name ASC, item_id ASC",
        )
        .bind(path.as_str())
        .fetch_all(&self.pool)
        .await?;

        let entries = rows
            .iter()
            .map(entry_from_row)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    async fn count_children(&self, path: &BrowsePath) -> anyhow::Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM entries WHERE parent_path = ?")
            .bind(path.as_str())
            .fetch_one(&self.pool)
            .await?;
        Ok(u64::try_from(count).unwrap_or_default())
    }

    async fn child_at(
        &self,
        path: &BrowsePath,
        index: u64,
    ) -> anyhow::Result<Option<DirectoryEntry>> {
        let Ok(offset) = i64::try_from(index) else {
            return Ok(None);
        };

        let row = sqlx::query(
            "SELECT * FROM entries WHERE parent_path = ? \
             ORDER BY name ASC, item_id ASC LIMIT 1 OFFSET ?",
        )
        .bind(path.as_str())
        .bind(offset)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(ref r) => Ok(Some(entry_from_row(r)?)),
            None => Ok(None),
        }
    }

    async fn get_pagination(&self, path: &BrowsePath) -> anyhow::Result<PaginationState> {
        let row = sqlx::query("SELECT cursor, has_more FROM pagination_state WHERE path = ?")
            .bind(path.as_str())
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(PaginationState::empty());
        };

        let cursor: Option<String> = row.try_get("cursor")?;
        let has_more: Option<bool> = row.try_get("has_more")?;

        Ok(PaginationState {
            cursor: cursor.map(Cursor::from),
            has_more,
        })
    }
}
