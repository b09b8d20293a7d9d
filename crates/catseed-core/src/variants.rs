//! Payloads exchanged with the model when generating and linking variant
//! options.

use serde::{Deserialize, Serialize};

/// The category facts a prompt is built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryContext {
    pub name: String,
    pub description: Option<String>,
}

/// An option already stored in the catalog, offered to the model by code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionChoice {
    pub code: String,
    pub name: String,
}

/// One generated variant option, e.g. `size` with values `S`, `M`, `L`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantOption {
    /// Stable `snake_case` key, unique across the catalog.
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub values: Vec<String>,
}

impl VariantOption {
    /// `true` when the option carries a usable code and name.
    #[must_use]
    pub fn is_usable(&self) -> bool {
        !self.code.trim().is_empty() && !self.name.trim().is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantOptions {
    #[serde(default)]
    pub options: Vec<VariantOption>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionSuggestions {
    #[serde(default)]
    pub suggested_option_codes: Vec<String>,
}
