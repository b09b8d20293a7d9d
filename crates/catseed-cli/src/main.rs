mod categories;
mod options;
mod runs;
mod variants;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use categories::CategoriesCommands;
use options::OptionsCommands;
use runs::RunsCommands;
use variants::VariantsCommands;

#[derive(Debug, Parser)]
#[command(name = "catseed")]
#[command(about = "Seed the e-commerce catalog: categories, variant options and option links")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Database connectivity and schema
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
    /// Import the category tree export
    Categories {
        #[command(subcommand)]
        command: CategoriesCommands,
    },
    /// Generate variant options with the model
    Variants {
        #[command(subcommand)]
        command: VariantsCommands,
    },
    /// Link categories to existing options with the model
    Options {
        #[command(subcommand)]
        command: OptionsCommands,
    },
    /// Inspect recorded seed runs
    Runs {
        #[command(subcommand)]
        command: RunsCommands,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Check that the database is reachable
    Ping,
    /// Apply pending migrations
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = catseed_core::load_app_config()?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
    tracing::info!(env = %config.env, "configuration loaded");

    match cli.command {
        Some(Commands::Db { command }) => run_db(&config, command).await,
        Some(Commands::Categories { command }) => match command {
            CategoriesCommands::Import {
                file,
                batch_size,
                dry_run,
            } => {
                categories::run_categories_import(
                    &config,
                    file.as_deref(),
                    batch_size,
                    dry_run,
                )
                .await
            }
        },
        Some(Commands::Variants { command }) => match command {
            VariantsCommands::Generate { limit, dry_run } => {
                variants::run_variants_generate(&config, limit, dry_run).await
            }
        },
        Some(Commands::Options { command }) => match command {
            OptionsCommands::Link { limit, dry_run } => {
                options::run_options_link(&config, limit, dry_run).await
            }
        },
        Some(Commands::Runs { command }) => match command {
            RunsCommands::List { limit } => {
                let pool = connect(&config).await?;
                runs::run_runs_list(&pool, limit).await
            }
        },
        None => {
            println!("catseed: nothing to do; see `catseed --help`");
            Ok(())
        }
    }
}

async fn run_db(config: &catseed_core::AppConfig, command: DbCommands) -> anyhow::Result<()> {
    let pool = connect(config).await?;
    match command {
        DbCommands::Ping => {
            catseed_db::ping(&pool).await?;
            println!("database ok");
        }
        DbCommands::Migrate => {
            let applied = catseed_db::run_migrations(&pool).await?;
            println!("applied {applied} migration(s)");
        }
    }
    Ok(())
}

/// Open a pool sized from config.
pub(crate) async fn connect(config: &catseed_core::AppConfig) -> anyhow::Result<sqlx::PgPool> {
    let pool_config = catseed_db::PoolConfig::from_app_config(config);
    let pool = catseed_db::connect_pool(&config.database_url, pool_config).await?;
    Ok(pool)
}

/// Mark a seed run as failed, logging (not returning) any error doing so.
pub(crate) async fn fail_run_best_effort(
    pool: &sqlx::PgPool,
    run_id: i64,
    context: &'static str,
    message: String,
) {
    if let Err(mark_err) = catseed_db::fail_seed_run(pool, run_id, &message).await {
        tracing::error!(
            run_id,
            error = %mark_err,
            "failed to mark {context} run as failed"
        );
    }
}

/// Finish a seed run from the outcome of its body.
///
/// On success the run is completed with `records`; on failure it is marked
/// failed and the original error is returned.
pub(crate) async fn finish_run(
    pool: &sqlx::PgPool,
    run_id: i64,
    context: &'static str,
    result: anyhow::Result<i32>,
) -> anyhow::Result<i32> {
    match result {
        Ok(records) => {
            if let Err(err) = catseed_db::complete_seed_run(pool, run_id, records).await {
                fail_run_best_effort(pool, run_id, context, format!("{err:#}")).await;
                return Err(err.into());
            }
            Ok(records)
        }
        Err(err) => {
            fail_run_best_effort(pool, run_id, context, format!("{err:#}")).await;
            Err(err)
        }
    }
}

#[cfg(test)]
mod canned;
