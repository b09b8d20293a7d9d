//! Database operations for `ecom_category_option_suggestions`.

use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::DbError;

/// Links a category to a suggested option.
///
/// Returns `true` if the link was created and `false` if it already existed.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn link_category_to_option(
    conn: &mut PgConnection,
    category_id: Uuid,
    option_id: Uuid,
) -> Result<bool, DbError> {
    let result = sqlx::query(
        "INSERT INTO ecom_category_option_suggestions (category_id, option_id) \
         VALUES ($1, $2) \
         ON CONFLICT (category_id, option_id) DO NOTHING",
    )
    .bind(category_id)
    .bind(option_id)
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Returns the codes of every option linked to a category, ordered by code.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_option_codes_for_category(
    pool: &PgPool,
    category_id: Uuid,
) -> Result<Vec<String>, DbError> {
    let codes = sqlx::query_scalar::<_, String>(
        "SELECT o.code \
         FROM ecom_category_option_suggestions s \
         JOIN ecom_options o ON o.id = s.option_id \
         WHERE s.category_id = $1 \
         ORDER BY o.code",
    )
    .bind(category_id)
    .fetch_all(pool)
    .await?;

    Ok(codes)
}
