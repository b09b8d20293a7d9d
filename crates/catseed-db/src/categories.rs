//! Database operations for the `ecom_categories` table.

use catseed_core::{CategoryContext, CategoryRecord};
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row type
// ---------------------------------------------------------------------------

/// A row from the `ecom_categories` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CategoryRow {
    pub id: Uuid,
    pub parent_id: Option<Uuid>,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub updated_at: DateTime<Utc>,
}

impl CategoryRow {
    #[must_use]
    pub fn context(&self) -> CategoryContext {
        CategoryContext {
            name: self.name.clone(),
            description: self.description.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Writes
// ---------------------------------------------------------------------------

/// Upserts flattened category records keyed by `id`.
///
/// Records are written in chunks of at most `batch_size` rows, in input
/// order, so parents are always written before their children. Each chunk is
/// a single `INSERT … SELECT * FROM UNNEST(…)` with one array bind per
/// column, so the statement's bind count does not grow with the chunk. On an
/// `id` conflict every mutable column is overwritten. All chunks share one
/// transaction; if any statement fails nothing is written.
///
/// Returns the number of records written.
///
/// # Errors
///
/// Returns [`DbError::InvalidBatchSize`] if `batch_size` is zero, or
/// [`DbError::Sqlx`] if any statement or the commit fails.
pub async fn upsert_categories(
    pool: &PgPool,
    records: &[CategoryRecord],
    batch_size: usize,
) -> Result<usize, DbError> {
    if batch_size == 0 {
        return Err(DbError::InvalidBatchSize);
    }
    if records.is_empty() {
        return Ok(0);
    }

    let mut tx = pool.begin().await?;

    for (batch, chunk) in records.chunks(batch_size).enumerate() {
        // Collect each column into a parallel Vec for UNNEST binding.
        let mut ids: Vec<Uuid> = Vec::with_capacity(chunk.len());
        let mut parent_ids: Vec<Option<Uuid>> = Vec::with_capacity(chunk.len());
        let mut names: Vec<&str> = Vec::with_capacity(chunk.len());
        let mut slugs: Vec<&str> = Vec::with_capacity(chunk.len());
        let mut actives: Vec<bool> = Vec::with_capacity(chunk.len());
        let mut updated: Vec<DateTime<Utc>> = Vec::with_capacity(chunk.len());

        for record in chunk {
            ids.push(record.id);
            parent_ids.push(record.parent_id);
            names.push(&record.name);
            slugs.push(&record.slug);
            actives.push(record.is_active);
            updated.push(record.updated_at);
        }

        sqlx::query(
            "INSERT INTO ecom_categories (id, parent_id, name, slug, is_active, updated_at) \
             SELECT * FROM UNNEST(\
                  $1::uuid[], $2::uuid[], $3::text[], $4::text[], $5::bool[], $6::timestamptz[]) \
             ON CONFLICT (id) DO UPDATE SET \
                 parent_id  = EXCLUDED.parent_id, \
                 name       = EXCLUDED.name, \
                 slug       = EXCLUDED.slug, \
                 is_active  = EXCLUDED.is_active, \
                 updated_at = EXCLUDED.updated_at",
        )
        .bind(&ids)
        .bind(&parent_ids)
        .bind(&names)
        .bind(&slugs)
        .bind(&actives)
        .bind(&updated)
        .execute(&mut *tx)
        .await?;

        tracing::debug!(batch, rows = chunk.len(), "upserted category batch");
    }

    tx.commit().await?;
    Ok(records.len())
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Returns up to `limit` active categories, ordered by name.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_active_categories(
    pool: &PgPool,
    limit: i64,
) -> Result<Vec<CategoryRow>, DbError> {
    let rows = sqlx::query_as::<_, CategoryRow>(
        "SELECT id, parent_id, name, slug, description, is_active, updated_at \
         FROM ecom_categories \
         WHERE is_active = true \
         ORDER BY name, id \
         LIMIT $1",
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
