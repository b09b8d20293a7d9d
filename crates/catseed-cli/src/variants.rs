//! `variants generate`: ask the model for variant options per category and
//! store them with their values.

use std::collections::HashSet;

use catseed_ai::{CategorySuggester, OpenAiClient, OpenAiSettings};
use catseed_core::{VariantOption, VariantOptions};
use catseed_db::CategoryRow;
use clap::Subcommand;

use crate::{connect, finish_run};

#[derive(Debug, Subcommand)]
pub enum VariantsCommands {
    /// Generate variant options for active categories
    Generate {
        /// Number of categories to process (defaults to `CATSEED_AI_CATEGORY_LIMIT`)
        #[arg(long)]
        limit: Option<u32>,
        /// List the categories that would be sent; no model calls, no writes
        #[arg(long)]
        dry_run: bool,
    },
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct VariantTotals {
    pub categories: i32,
    pub options_created: i32,
    pub options_reused: i32,
    pub values_inserted: i32,
}

/// Generate variant options for the first `limit` active categories.
///
/// # Errors
///
/// Returns an error if the API key is missing, the database is unreachable,
/// or any category fails. A failure rolls back everything written by the run.
pub(crate) async fn run_variants_generate(
    config: &catseed_core::AppConfig,
    limit: Option<u32>,
    dry_run: bool,
) -> anyhow::Result<()> {
    let limit = limit.unwrap_or(config.ai_category_limit);
    let pool = connect(config).await?;
    let categories = catseed_db::list_active_categories(&pool, i64::from(limit)).await?;

    if categories.is_empty() {
        tracing::warn!("no active categories; run `categories import` first");
        println!("no active categories found; nothing to generate");
        return Ok(());
    }

    if dry_run {
        println!(
            "dry-run: would generate variants for {} categories",
            categories.len()
        );
        for category in &categories {
            println!("  {}", category.name);
        }
        return Ok(());
    }

    let settings = OpenAiSettings::from_app_config(config)?;
    let client = OpenAiClient::new(&settings)?;

    let run = catseed_db::create_seed_run(&pool, catseed_db::SeedRunType::Variants).await?;
    catseed_db::start_seed_run(&pool, run.id).await?;
    tracing::info!(
        run_id = run.id,
        env = %config.env,
        model = client.model(),
        categories = categories.len(),
        "starting variants run"
    );

    let mut totals = VariantTotals::default();
    let result = generate_variants(&pool, &client, &categories, &mut totals)
        .await
        .map(|()| totals.categories);
    finish_run(&pool, run.id, "variants", result).await?;

    println!(
        "generated variants for {} categories: {} options created, {} reused, {} values inserted",
        totals.categories, totals.options_created, totals.options_reused, totals.values_inserted
    );
    Ok(())
}

/// Ask `suggester` about each category and store the options it proposes.
///
/// Everything happens in one transaction that is committed only when every
/// category succeeded.
pub(crate) async fn generate_variants<S: CategorySuggester>(
    pool: &sqlx::PgPool,
    suggester: &S,
    categories: &[CategoryRow],
    totals: &mut VariantTotals,
) -> anyhow::Result<()> {
    let mut tx = pool.begin().await?;

    for category in categories {
        println!("generating variants for: {}", category.name);
        let proposal = suggester
            .suggest_variants(&category.context())
            .await
            .map_err(|e| anyhow::anyhow!("category '{}': {e}", category.name))?;

        for option in usable_options(proposal) {
            let (option_id, created) =
                catseed_db::get_or_create_option(&mut *tx, &option.code, &option.name).await?;
            let inserted = catseed_db::insert_option_values(&mut *tx, option_id, &option.values)
                .await?;

            if created {
                totals.options_created += 1;
            } else {
                totals.options_reused += 1;
            }
            totals.values_inserted += i32::try_from(inserted).unwrap_or(i32::MAX);
            tracing::debug!(
                category = %category.name,
                code = %option.code,
                created,
                inserted,
                "stored variant option"
            );
        }

        totals.categories += 1;
    }

    tx.commit().await?;
    Ok(())
}

/// Clean up a model proposal before it is stored.
///
/// Options without a code or name are dropped with a warning. Codes, names
/// and values are trimmed; blank and repeated values are dropped, keeping
/// first-seen order.
pub(crate) fn usable_options(proposal: VariantOptions) -> Vec<VariantOption> {
    proposal
        .options
        .into_iter()
        .filter_map(|option| {
            if !option.is_usable() {
                tracing::warn!(
                    code = %option.code,
                    name = %option.name,
                    "skipping option without code or name"
                );
                return None;
            }
            let mut seen = HashSet::new();
            let values = option
                .values
                .iter()
                .map(String::as_str)
                .map(str::trim)
                .filter(|v| !v.is_empty() && seen.insert(*v))
                .map(str::to_string)
                .collect();
            Some(VariantOption {
                code: option.code.trim().to_string(),
                name: option.name.trim().to_string(),
                values,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn option(code: &str, name: &str, values: &[&str]) -> VariantOption {
        VariantOption {
            code: code.to_string(),
            name: name.to_string(),
            values: values.iter().map(|v| (*v).to_string()).collect(),
        }
    }

    #[test]
    fn unusable_options_are_dropped() {
        let proposal = VariantOptions {
            options: vec![
                option("", "Color", &["Red"]),
                option("size", "  ", &["S"]),
                option("material", "Material", &["Cotton"]),
            ],
        };
        let kept = usable_options(proposal);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].code, "material");
    }

    #[test]
    fn values_are_trimmed_and_deduplicated_in_order() {
        let proposal = VariantOptions {
            options: vec![option(
                " shoe_size ",
                "Shoe Size ",
                &["9", " 8", "9", "", "10 "],
            )],
        };
        let kept = usable_options(proposal);
        assert_eq!(kept[0].code, "shoe_size");
        assert_eq!(kept[0].name, "Shoe Size");
        assert_eq!(kept[0].values, vec!["9", "8", "10"]);
    }

    #[test]
    fn empty_proposal_yields_nothing() {
        assert!(usable_options(VariantOptions::default()).is_empty());
    }
}

#[cfg(test)]
#[path = "variants_test.rs"]
mod db_tests;
