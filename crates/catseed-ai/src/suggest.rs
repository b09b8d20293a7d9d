//! The suggestion capability the seeding commands depend on.

use std::future::Future;

use catseed_core::{CategoryContext, OptionChoice, OptionSuggestions, VariantOptions};
use serde::de::DeserializeOwned;

use crate::client::OpenAiClient;
use crate::error::AiError;
use crate::parse::parse_payload;
use crate::prompts::{option_prompt, variant_prompt};
use crate::retry::retry_with_backoff;

/// Something that can propose variant options and option links for a
/// category. Seeding commands take this instead of a concrete client so
/// they can run against a canned implementation in tests.
pub trait CategorySuggester {
    /// Proposes variant options (with values) for `category`.
    fn suggest_variants(
        &self,
        category: &CategoryContext,
    ) -> impl Future<Output = Result<VariantOptions, AiError>> + Send;

    /// Picks the codes from `options` that apply to `category`.
    fn suggest_options(
        &self,
        category: &CategoryContext,
        options: &[OptionChoice],
    ) -> impl Future<Output = Result<OptionSuggestions, AiError>> + Send;
}

impl OpenAiClient {
    /// Requests a completion for `prompt` and parses it as `T`, retrying
    /// transient failures and unparseable replies.
    async fn ask<T: DeserializeOwned>(&self, prompt: &str) -> Result<T, AiError> {
        let this = self;
        retry_with_backoff(self.max_retries, self.retry_backoff_base_ms, || async move {
            let reply = this.complete_json(prompt).await?;
            parse_payload::<T>(&reply)
        })
        .await
    }
}

impl CategorySuggester for OpenAiClient {
    fn suggest_variants(
        &self,
        category: &CategoryContext,
    ) -> impl Future<Output = Result<VariantOptions, AiError>> + Send {
        async move {
            let prompt = variant_prompt(category);
            let parsed: VariantOptions = self.ask(&prompt).await?;
            tracing::debug!(
                category = %category.name,
                options = parsed.options.len(),
                "model proposed variant options"
            );
            Ok(parsed)
        }
    }

    fn suggest_options(
        &self,
        category: &CategoryContext,
        options: &[OptionChoice],
    ) -> impl Future<Output = Result<OptionSuggestions, AiError>> + Send {
        async move {
            let prompt = option_prompt(category, options);
            let parsed: OptionSuggestions = self.ask(&prompt).await?;
            tracing::debug!(
                category = %category.name,
                suggested = parsed.suggested_option_codes.len(),
                "model suggested option codes"
            );
            Ok(parsed)
        }
    }
}
