//! Postgres persistence for the catalog seeding commands.
//!
//! Writers that take `&mut PgConnection` are meant to be called inside a
//! caller-owned transaction; the rest take the pool directly.

use thiserror::Error;

pub mod categories;
pub mod migrate;
pub mod options;
pub mod pool;
pub mod seed_runs;
pub mod suggestions;

pub use categories::{list_active_categories, upsert_categories, CategoryRow};
pub use migrate::run_migrations;
pub use options::{get_or_create_option, insert_option_values, list_active_options, OptionRow};
pub use pool::{connect_pool, ping, PoolConfig};
pub use seed_runs::{
    complete_seed_run, create_seed_run, fail_seed_run, get_seed_run, list_seed_runs,
    start_seed_run, SeedRunRow, SeedRunType,
};
pub use suggestions::{link_category_to_option, list_option_codes_for_category};

#[derive(Debug, Error)]
pub enum DbError {
    #[error("record not found")]
    NotFound,
    #[error("seed run {id} is not in '{expected_status}' status")]
    InvalidSeedRunTransition {
        id: i64,
        expected_status: &'static str,
    },
    #[error("batch size must be greater than zero")]
    InvalidBatchSize,
    #[error("could not connect to database: {0}")]
    Connect(#[source] sqlx::Error),
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
    #[error(transparent)]
    Migration(#[from] sqlx::migrate::MigrateError),
}
