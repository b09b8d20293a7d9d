//! `categories import`: load the tree export, flatten it, upsert it.

use std::path::{Path, PathBuf};

use clap::Subcommand;

use crate::{connect, finish_run};

/// How many records a dry run prints.
const PREVIEW_ROWS: usize = 10;

#[derive(Debug, Subcommand)]
pub enum CategoriesCommands {
    /// Flatten the category tree export and upsert it into `ecom_categories`
    Import {
        /// Path to the export (defaults to `CATSEED_CATEGORIES_PATH`)
        #[arg(long)]
        file: Option<PathBuf>,
        /// Rows per insert statement (defaults to `CATSEED_CATEGORY_BATCH_SIZE`)
        #[arg(long)]
        batch_size: Option<usize>,
        /// Parse and flatten only; do not touch the database
        #[arg(long)]
        dry_run: bool,
    },
}

/// Import the category tree.
///
/// The whole import is one transaction: the file is parsed and flattened
/// before any connection is opened, and a failed batch rolls back every
/// earlier batch.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, the batch size is
/// zero, the database is unreachable, or any insert fails.
pub(crate) async fn run_categories_import(
    config: &catseed_core::AppConfig,
    file: Option<&Path>,
    batch_size: Option<usize>,
    dry_run: bool,
) -> anyhow::Result<()> {
    let path = file.unwrap_or(config.categories_path.as_path());
    let batch_size = batch_size.unwrap_or(config.category_batch_size);
    if batch_size == 0 {
        anyhow::bail!("--batch-size must be at least 1");
    }

    let loaded = catseed_core::load_category_tree(path)?;
    let records = catseed_core::flatten_categories(&loaded.root);
    tracing::info!(
        path = %path.display(),
        encoding = %loaded.encoding,
        bytes = loaded.bytes,
        count = records.len(),
        "flattened category tree"
    );

    if dry_run {
        println!(
            "dry-run: would upsert {} categories from {} ({})",
            records.len(),
            path.display(),
            loaded.encoding
        );
        for record in records.iter().take(PREVIEW_ROWS) {
            let parent = record
                .parent_id
                .map_or_else(|| "-".to_string(), |id| id.to_string());
            println!("  {}  {:<40} parent={parent}", record.id, record.slug);
        }
        return Ok(());
    }

    let pool = connect(config).await?;
    let run = catseed_db::create_seed_run(&pool, catseed_db::SeedRunType::Categories).await?;
    catseed_db::start_seed_run(&pool, run.id).await?;

    let result: anyhow::Result<i32> = async {
        let written = catseed_db::upsert_categories(&pool, &records, batch_size).await?;
        Ok(i32::try_from(written).unwrap_or(i32::MAX))
    }
    .await;

    let written = finish_run(&pool, run.id, "categories", result).await?;
    println!("imported {written} categories from {}", path.display());
    Ok(())
}
