//! `options link`: ask the model which stored options fit each category and
//! record the links in `ecom_category_option_suggestions`.

use std::collections::HashMap;

use catseed_ai::{CategorySuggester, OpenAiClient, OpenAiSettings};
use catseed_core::OptionChoice;
use catseed_db::CategoryRow;
use clap::Subcommand;
use uuid::Uuid;

use crate::{connect, finish_run};

#[derive(Debug, Subcommand)]
pub enum OptionsCommands {
    /// Link active categories to the options the model suggests
    Link {
        /// Number of categories to process (defaults to `CATSEED_AI_CATEGORY_LIMIT`)
        #[arg(long)]
        limit: Option<u32>,
        /// List categories and options only; no model calls, no writes
        #[arg(long)]
        dry_run: bool,
    },
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct LinkTotals {
    pub created: i32,
    pub existing: i32,
    pub failed_categories: i32,
}

/// Suggested codes split into known option ids and codes with no option.
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct ResolvedCodes {
    pub option_ids: Vec<(String, Uuid)>,
    pub unknown: Vec<String>,
}

/// Link the first `limit` active categories to suggested options.
///
/// # Errors
///
/// Returns an error if the API key is missing, the database is unreachable,
/// or a database write fails. Model failures for a single category are
/// logged and that category is skipped.
pub(crate) async fn run_options_link(
    config: &catseed_core::AppConfig,
    limit: Option<u32>,
    dry_run: bool,
) -> anyhow::Result<()> {
    let limit = limit.unwrap_or(config.ai_category_limit);
    let pool = connect(config).await?;

    let categories = catseed_db::list_active_categories(&pool, i64::from(limit)).await?;
    println!("found {} categories", categories.len());
    if categories.is_empty() {
        tracing::warn!("no active categories; run `categories import` first");
        return Ok(());
    }

    let options = catseed_db::list_active_options(&pool).await?;
    println!("found {} options", options.len());
    if options.is_empty() {
        tracing::warn!("no active options; run `variants generate` first");
        return Ok(());
    }

    let code_to_id: HashMap<String, Uuid> = options
        .iter()
        .map(|option| (option.code.clone(), option.id))
        .collect();
    let choices: Vec<OptionChoice> = options.iter().map(catseed_db::OptionRow::choice).collect();

    if dry_run {
        println!(
            "dry-run: would ask for option links for {} categories against {} options",
            categories.len(),
            choices.len()
        );
        for category in &categories {
            println!("  {}", category.name);
        }
        return Ok(());
    }

    let settings = OpenAiSettings::from_app_config(config)?;
    let client = OpenAiClient::new(&settings)?;

    let run = catseed_db::create_seed_run(&pool, catseed_db::SeedRunType::OptionLinks).await?;
    catseed_db::start_seed_run(&pool, run.id).await?;
    tracing::info!(
        run_id = run.id,
        env = %config.env,
        model = client.model(),
        categories = categories.len(),
        "starting option_links run"
    );

    let mut totals = LinkTotals::default();
    let result = link_options(&pool, &client, &categories, &choices, &code_to_id, &mut totals)
        .await
        .map(|()| totals.created);
    finish_run(&pool, run.id, "option_links", result).await?;

    println!("category-option linking completed");
    println!("  created {} new links", totals.created);
    println!("  skipped {} existing links", totals.existing);
    if totals.failed_categories > 0 {
        println!(
            "  {} categories failed; see log for details",
            totals.failed_categories
        );
    }
    Ok(())
}

/// Ask `suggester` about each category and write the resulting links in one
/// transaction.
pub(crate) async fn link_options<S: CategorySuggester>(
    pool: &sqlx::PgPool,
    suggester: &S,
    categories: &[CategoryRow],
    choices: &[OptionChoice],
    code_to_id: &HashMap<String, Uuid>,
    totals: &mut LinkTotals,
) -> anyhow::Result<()> {
    let mut tx = pool.begin().await?;

    for category in categories {
        println!("processing category: {}", category.name);

        let suggestions = match suggester.suggest_options(&category.context(), choices).await {
            Ok(s) => s,
            Err(e) => {
                tracing::error!(category = %category.name, error = %e, "skipping category");
                totals.failed_categories += 1;
                continue;
            }
        };

        if suggestions.suggested_option_codes.is_empty() {
            println!("  no options suggested");
            continue;
        }

        let resolved = resolve_codes(&suggestions.suggested_option_codes, code_to_id);
        for code in &resolved.unknown {
            tracing::warn!(
                category = %category.name,
                code = %code,
                "suggested option code not found, skipping"
            );
        }

        let mut linked = 0;
        for (code, option_id) in &resolved.option_ids {
            if catseed_db::link_category_to_option(&mut *tx, category.id, *option_id).await? {
                linked += 1;
                totals.created += 1;
                tracing::debug!(category = %category.name, code = %code, "linked option");
            } else {
                totals.existing += 1;
                tracing::debug!(category = %category.name, code = %code, "already linked");
            }
        }
        println!("  created {linked} new links");
    }

    tx.commit().await?;
    Ok(())
}

/// Map suggested codes to option ids.
///
/// Codes are trimmed; repeats collapse to their first occurrence so one
/// reply cannot link the same option twice.
pub(crate) fn resolve_codes(
    codes: &[String],
    code_to_id: &HashMap<String, Uuid>,
) -> ResolvedCodes {
    let mut resolved = ResolvedCodes::default();
    for code in codes {
        let code = code.trim();
        if resolved.option_ids.iter().any(|(c, _)| c == code)
            || resolved.unknown.iter().any(|c| c == code)
        {
            continue;
        }
        match code_to_id.get(code) {
            Some(id) => resolved.option_ids.push((code.to_string(), *id)),
            None => resolved.unknown.push(code.to_string()),
        }
    }
    resolved
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> (HashMap<String, Uuid>, Uuid, Uuid) {
        let color = Uuid::new_v4();
        let size = Uuid::new_v4();
        let map = HashMap::from([("color".to_string(), color), ("size".to_string(), size)]);
        (map, color, size)
    }

    #[test]
    fn known_codes_resolve_in_order() {
        let (map, color, size) = catalog();
        let codes = vec!["size".to_string(), "color".to_string()];
        let resolved = resolve_codes(&codes, &map);
        assert_eq!(
            resolved.option_ids,
            vec![("size".to_string(), size), ("color".to_string(), color)]
        );
        assert!(resolved.unknown.is_empty());
    }

    #[test]
    fn unknown_codes_are_reported() {
        let (map, _, _) = catalog();
        let codes = vec!["color".to_string(), "flavor".to_string()];
        let resolved = resolve_codes(&codes, &map);
        assert_eq!(resolved.option_ids.len(), 1);
        assert_eq!(resolved.unknown, vec!["flavor"]);
    }

    #[test]
    fn repeated_and_padded_codes_collapse() {
        let (map, color, _) = catalog();
        let codes = vec![
            "color".to_string(),
            " color ".to_string(),
            "flavor".to_string(),
            "flavor".to_string(),
        ];
        let resolved = resolve_codes(&codes, &map);
        assert_eq!(resolved.option_ids, vec![("color".to_string(), color)]);
        assert_eq!(resolved.unknown, vec!["flavor"]);
    }
}

#[cfg(test)]
#[path = "options_test.rs"]
mod db_tests;
