//! A scripted `CategorySuggester` and category seeding for command tests.

use std::collections::{HashMap, HashSet};
use std::future::{ready, Future};
use std::sync::Mutex;

use catseed_ai::{AiError, CategorySuggester};
use catseed_core::{
    CategoryContext, CategoryRecord, OptionChoice, OptionSuggestions, VariantOption,
    VariantOptions,
};
use catseed_db::CategoryRow;
use chrono::Utc;
use uuid::Uuid;

/// Answers by category name. Names with no script get an empty answer;
/// names marked failing get a malformed-reply error.
#[derive(Default)]
pub(crate) struct CannedSuggester {
    variants: HashMap<String, Vec<VariantOption>>,
    links: HashMap<String, Vec<String>>,
    failing: HashSet<String>,
    asked: Mutex<Vec<String>>,
}

impl CannedSuggester {
    pub(crate) fn with_variants(mut self, category: &str, options: Vec<VariantOption>) -> Self {
        self.variants.insert(category.to_string(), options);
        self
    }

    pub(crate) fn with_links(mut self, category: &str, codes: &[&str]) -> Self {
        self.links.insert(
            category.to_string(),
            codes.iter().map(|c| (*c).to_string()).collect(),
        );
        self
    }

    pub(crate) fn failing_on(mut self, category: &str) -> Self {
        self.failing.insert(category.to_string());
        self
    }

    /// Category names asked about so far, in order.
    pub(crate) fn asked(&self) -> Vec<String> {
        self.asked.lock().unwrap().clone()
    }

    fn record(&self, category: &CategoryContext) -> Result<(), AiError> {
        self.asked.lock().unwrap().push(category.name.clone());
        if self.failing.contains(&category.name) {
            return Err(AiError::malformed("expected value", "not json"));
        }
        Ok(())
    }
}

impl CategorySuggester for CannedSuggester {
    fn suggest_variants(
        &self,
        category: &CategoryContext,
    ) -> impl Future<Output = Result<VariantOptions, AiError>> + Send {
        let result = self.record(category).map(|()| VariantOptions {
            options: self
                .variants
                .get(&category.name)
                .cloned()
                .unwrap_or_default(),
        });
        ready(result)
    }

    fn suggest_options(
        &self,
        category: &CategoryContext,
        _options: &[OptionChoice],
    ) -> impl Future<Output = Result<OptionSuggestions, AiError>> + Send {
        let result = self.record(category).map(|()| OptionSuggestions {
            suggested_option_codes: self
                .links
                .get(&category.name)
                .cloned()
                .unwrap_or_default(),
        });
        ready(result)
    }
}

pub(crate) fn option(code: &str, name: &str, values: &[&str]) -> VariantOption {
    VariantOption {
        code: code.to_string(),
        name: name.to_string(),
        values: values.iter().map(|v| (*v).to_string()).collect(),
    }
}

/// Store one top-level active category per name and return them as listed
/// by the commands (ordered by name).
pub(crate) async fn seed_categories(pool: &sqlx::PgPool, names: &[&str]) -> Vec<CategoryRow> {
    let now = Utc::now();
    let records: Vec<CategoryRecord> = names
        .iter()
        .map(|name| CategoryRecord {
            id: Uuid::new_v4(),
            parent_id: None,
            name: (*name).to_string(),
            slug: name.to_lowercase(),
            is_active: true,
            updated_at: now,
        })
        .collect();

    catseed_db::upsert_categories(pool, &records, 100)
        .await
        .expect("seeding categories failed");
    catseed_db::list_active_categories(pool, 100)
        .await
        .expect("listing categories failed")
}

pub(crate) async fn count_rows(pool: &sqlx::PgPool, table: &str) -> i64 {
    sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(pool)
        .await
        .unwrap_or_else(|e| panic!("count on {table} failed: {e}"))
}
