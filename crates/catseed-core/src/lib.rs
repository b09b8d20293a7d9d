pub mod app_config;
pub mod categories;
pub mod config;
pub mod slug;
pub mod source;
pub mod variants;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use categories::{flatten_categories, flatten_categories_with, CategoryNode, CategoryRecord};
pub use config::{load_app_config, load_app_config_from_env};
pub use slug::{slugify, SlugTracker};
pub use source::{
    load_category_tree, parse_category_tree, LoadedTree, ParseFailure, SourceEncoding, SourceError,
};
pub use variants::{
    CategoryContext, OptionChoice, OptionSuggestions, VariantOption, VariantOptions,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
