//! Chat-completions client used to propose variant options and option
//! links for catalog categories.

pub mod client;
pub mod error;
pub mod parse;
pub mod prompts;
pub(crate) mod retry;
pub mod suggest;

pub use client::{OpenAiClient, OpenAiSettings, DEFAULT_BASE_URL, DEFAULT_MODEL};
pub use error::AiError;
pub use parse::{extract_json, parse_payload};
pub use prompts::{option_prompt, variant_prompt};
pub use suggest::CategorySuggester;
