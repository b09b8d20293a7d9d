//! Embedded schema migrations from the workspace `migrations/` directory.

use std::collections::HashSet;

use sqlx::migrate::Migrator;
use sqlx::PgPool;

use crate::DbError;

// Relative to this crate's Cargo.toml.
static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

/// Applies every pending migration and returns how many ran.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the applied versions cannot be read, or
/// [`DbError::Migration`] if a migration fails to apply.
pub async fn run_migrations(pool: &PgPool) -> Result<usize, DbError> {
    let applied = applied_versions(pool).await?;
    let pending: Vec<_> = MIGRATOR
        .iter()
        .filter(|m| !applied.contains(&m.version))
        .collect();

    for migration in &pending {
        tracing::info!(
            version = migration.version,
            description = %migration.description,
            "applying migration"
        );
    }

    MIGRATOR.run(pool).await?;
    Ok(pending.len())
}

/// Versions already recorded as successful. A fresh database has no
/// `_sqlx_migrations` table yet, which reads as none applied.
async fn applied_versions(pool: &PgPool) -> Result<HashSet<i64>, DbError> {
    let result = sqlx::query_scalar::<_, i64>("SELECT version FROM _sqlx_migrations WHERE success")
        .fetch_all(pool)
        .await;

    match result {
        Ok(versions) => Ok(versions.into_iter().collect()),
        Err(sqlx::Error::Database(err)) if is_undefined_table(err.code().as_deref()) => {
            Ok(HashSet::new())
        }
        Err(err) => Err(err.into()),
    }
}

// SQLSTATE 42P01: undefined_table.
fn is_undefined_table(code: Option<&str>) -> bool {
    code == Some("42P01")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_undefined_table_reads_as_fresh_database() {
        assert!(is_undefined_table(Some("42P01")));
        assert!(!is_undefined_table(Some("42501")));
        assert!(!is_undefined_table(Some("08006")));
        assert!(!is_undefined_table(None));
    }
}
