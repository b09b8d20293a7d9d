//! URL slug derivation for category names.
//!
//! Slugs are Unicode-aware: letters and digits from any script survive,
//! lowercased with [`str::to_lowercase`]. Only punctuation and symbols are
//! dropped, so `"Café Noir"` becomes `"café-noir"` rather than `"caf-noir"`.

use std::collections::{HashMap, HashSet};

use uuid::Uuid;

/// Normalize a display name into a URL-safe slug.
///
/// 1. Lowercase.
/// 2. Keep word characters (alphanumerics and `_`), whitespace and `-`.
/// 3. Collapse each run of whitespace and `-` into a single `-`.
/// 4. Trim leading and trailing `-`.
///
/// An empty or all-punctuation name yields an empty slug.
#[must_use]
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;

    for c in name.chars().flat_map(char::to_lowercase) {
        if c.is_alphanumeric() || c == '_' {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else if c.is_whitespace() || c == '-' {
            pending_dash = true;
        }
    }

    slug
}

/// Hands out sibling-unique slugs during a single tree traversal.
///
/// The first category with a given base slug under a parent keeps the base
/// slug unchanged; later ones get `-2`, `-3`, ... appended. A suffixed
/// candidate that is already taken under the same parent (for example a
/// sibling literally named "Shoes 2") is skipped.
#[derive(Debug, Default)]
pub struct SlugTracker {
    counters: HashMap<(Option<Uuid>, String), u32>,
    taken: HashMap<Option<Uuid>, HashSet<String>>,
}

impl SlugTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the slug to use for a category named with `base_slug` under
    /// `parent` (`None` for top-level categories), and records it as taken.
    pub fn assign(&mut self, parent: Option<Uuid>, base_slug: &str) -> String {
        let taken = self.taken.entry(parent).or_default();
        let counter = self
            .counters
            .entry((parent, base_slug.to_string()))
            .or_insert(0);

        let mut candidate = if *counter == 0 {
            *counter = 1;
            base_slug.to_string()
        } else {
            *counter += 1;
            format!("{base_slug}-{counter}")
        };

        while taken.contains(&candidate) {
            *counter += 1;
            candidate = format!("{base_slug}-{counter}");
        }

        taken.insert(candidate.clone());
        candidate
    }
}
