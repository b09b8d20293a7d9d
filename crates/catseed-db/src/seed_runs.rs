//! Database operations for `seed_runs`.
//!
//! Every command that writes catalog data records one run:
//! `queued` -> `running` -> `succeeded` | `failed`.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

const SEED_RUN_COLUMNS: &str = "id, public_id, run_type, status, started_at, completed_at, \
                                records_processed, error_message, created_at";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedRunType {
    Categories,
    Variants,
    OptionLinks,
}

impl SeedRunType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SeedRunType::Categories => "categories",
            SeedRunType::Variants => "variants",
            SeedRunType::OptionLinks => "option_links",
        }
    }
}

impl std::fmt::Display for SeedRunType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A row from the `seed_runs` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SeedRunRow {
    pub id: i64,
    pub public_id: Uuid,
    pub run_type: String,
    pub status: String,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub records_processed: i32,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Creates a new seed run in `queued` status and returns it.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn create_seed_run(pool: &PgPool, run_type: SeedRunType) -> Result<SeedRunRow, DbError> {
    let row = sqlx::query_as::<_, SeedRunRow>(&format!(
        "INSERT INTO seed_runs (public_id, run_type, status) \
         VALUES ($1, $2, 'queued') \
         RETURNING {SEED_RUN_COLUMNS}"
    ))
    .bind(Uuid::new_v4())
    .bind(run_type.as_str())
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Marks a run as `running` and sets `started_at = NOW()`.
///
/// # Errors
///
/// Returns [`DbError::InvalidSeedRunTransition`] if the run is not `queued`,
/// or [`DbError::Sqlx`] if the update fails.
pub async fn start_seed_run(pool: &PgPool, id: i64) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE seed_runs \
         SET status = 'running', started_at = NOW() \
         WHERE id = $1 AND status = 'queued'",
    )
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::InvalidSeedRunTransition {
            id,
            expected_status: "queued",
        });
    }

    Ok(())
}

/// Marks a run as `succeeded` with the number of records it wrote.
///
/// # Errors
///
/// Returns [`DbError::InvalidSeedRunTransition`] if the run is not
/// `running`, or [`DbError::Sqlx`] if the update fails.
pub async fn complete_seed_run(
    pool: &PgPool,
    id: i64,
    records_processed: i32,
) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE seed_runs \
         SET status = 'succeeded', completed_at = NOW(), records_processed = $1 \
         WHERE id = $2 AND status = 'running'",
    )
    .bind(records_processed)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::InvalidSeedRunTransition {
            id,
            expected_status: "running",
        });
    }

    Ok(())
}

/// Marks a run as `failed` with an error message.
///
/// # Errors
///
/// Returns [`DbError::InvalidSeedRunTransition`] if the run is not
/// `running`, or [`DbError::Sqlx`] if the update fails.
pub async fn fail_seed_run(pool: &PgPool, id: i64, error_message: &str) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE seed_runs \
         SET status = 'failed', completed_at = NOW(), error_message = $1 \
         WHERE id = $2 AND status = 'running'",
    )
    .bind(error_message)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::InvalidSeedRunTransition {
            id,
            expected_status: "running",
        });
    }

    Ok(())
}

/// Fetches a single run by its internal `id`.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no row exists with the given `id`, or
/// [`DbError::Sqlx`] if the query fails.
pub async fn get_seed_run(pool: &PgPool, id: i64) -> Result<SeedRunRow, DbError> {
    sqlx::query_as::<_, SeedRunRow>(&format!(
        "SELECT {SEED_RUN_COLUMNS} FROM seed_runs WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)
}

/// Returns the most recent `limit` runs, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_seed_runs(pool: &PgPool, limit: i64) -> Result<Vec<SeedRunRow>, DbError> {
    let rows = sqlx::query_as::<_, SeedRunRow>(&format!(
        "SELECT {SEED_RUN_COLUMNS} FROM seed_runs \
         ORDER BY created_at DESC, id DESC \
         LIMIT $1"
    ))
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
