//! Database operations for `ecom_options` and `ecom_option_values`.
//!
//! Writers take a `PgConnection` so callers can group a whole run into one
//! transaction.

use catseed_core::OptionChoice;
use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::DbError;

/// A row from the `ecom_options` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OptionRow {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OptionRow {
    #[must_use]
    pub fn choice(&self) -> OptionChoice {
        OptionChoice {
            code: self.code.clone(),
            name: self.name.clone(),
        }
    }
}

/// Returns the id of the option with `code`, creating it if absent.
///
/// New options get the description `"<name> option"` and are active. An
/// existing option is returned untouched, even if `name` differs.
///
/// Returns `(id, created)`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the lookup or insert fails.
pub async fn get_or_create_option(
    conn: &mut PgConnection,
    code: &str,
    name: &str,
) -> Result<(Uuid, bool), DbError> {
    let existing: Option<Uuid> =
        sqlx::query_scalar::<_, Uuid>("SELECT id FROM ecom_options WHERE code = $1")
            .bind(code)
            .fetch_optional(&mut *conn)
            .await?;

    if let Some(id) = existing {
        return Ok((id, false));
    }

    let id = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO ecom_options (id, code, name, description, is_active, created_at, updated_at) \
         VALUES ($1, $2, $3, $4, true, NOW(), NOW())",
    )
    .bind(id)
    .bind(code)
    .bind(name)
    .bind(format!("{name} option"))
    .execute(&mut *conn)
    .await?;

    Ok((id, true))
}

/// Inserts the values of an option, skipping ones already stored.
///
/// `position` is the 1-based index of the value in `values`, whether or not
/// earlier values were skipped.
///
/// Returns how many values were newly inserted.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any insert fails.
pub async fn insert_option_values(
    conn: &mut PgConnection,
    option_id: Uuid,
    values: &[String],
) -> Result<usize, DbError> {
    let mut inserted = 0usize;

    for (index, value) in values.iter().enumerate() {
        let position = i32::try_from(index + 1).unwrap_or(i32::MAX);
        let result = sqlx::query(
            "INSERT INTO ecom_option_values (id, option_id, value, position) \
             VALUES ($1, $2, $3, $4) \
             ON CONFLICT (option_id, value) DO NOTHING",
        )
        .bind(Uuid::new_v4())
        .bind(option_id)
        .bind(value)
        .bind(position)
        .execute(&mut *conn)
        .await?;

        if result.rows_affected() > 0 {
            inserted += 1;
        }
    }

    Ok(inserted)
}

/// Returns all active options, ordered by name.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_active_options(pool: &PgPool) -> Result<Vec<OptionRow>, DbError> {
    let rows = sqlx::query_as::<_, OptionRow>(
        "SELECT id, code, name, description, is_active, created_at, updated_at \
         FROM ecom_options \
         WHERE is_active = true \
         ORDER BY name, code",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
