//! Category tree input and the flattened records that get persisted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::slug::{slugify, SlugTracker};

/// Identifier of the artificial top node of an exported category tree.
pub const ROOT_SENTINEL: &str = "root";

/// One node of the nested category export.
///
/// Missing or `null` names read as empty; missing or `null` child lists read
/// as a leaf. Numeric ids are accepted and kept as their decimal string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryNode {
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "childNodes", default)]
    pub child_nodes: Option<Vec<CategoryNode>>,
}

impl CategoryNode {
    /// `true` for the artificial top node, which is never persisted.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.id.as_deref() == Some(ROOT_SENTINEL)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }

    #[must_use]
    pub fn children(&self) -> &[CategoryNode] {
        self.child_nodes.as_deref().unwrap_or_default()
    }

    /// Number of nodes in this subtree, the root sentinel excluded.
    #[must_use]
    pub fn count_persistable(&self) -> usize {
        let own = usize::from(!self.is_root());
        own + self
            .children()
            .iter()
            .map(CategoryNode::count_persistable)
            .sum::<usize>()
    }
}

/// A flattened, persistable category row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRecord {
    pub id: Uuid,
    pub parent_id: Option<Uuid>,
    pub name: String,
    /// Unique among records sharing the same `parent_id`.
    pub slug: String,
    pub is_active: bool,
    pub updated_at: DateTime<Utc>,
}

/// Flatten a category tree into pre-order records with fresh v4 ids.
///
/// Every record is stamped with the same capture time.
#[must_use]
pub fn flatten_categories(root: &CategoryNode) -> Vec<CategoryRecord> {
    flatten_categories_with(root, Utc::now(), Uuid::new_v4)
}

/// Flatten a category tree with an explicit capture time and id source.
///
/// Parents precede their children and siblings keep input order. A node
/// whose id is `"root"` is skipped and its children become top-level
/// records with no parent.
#[must_use]
pub fn flatten_categories_with<F>(
    root: &CategoryNode,
    captured_at: DateTime<Utc>,
    mut next_id: F,
) -> Vec<CategoryRecord>
where
    F: FnMut() -> Uuid,
{
    let mut records = Vec::with_capacity(root.count_persistable());
    let mut slugs = SlugTracker::new();
    visit(
        root,
        None,
        captured_at,
        &mut next_id,
        &mut slugs,
        &mut records,
    );
    records
}

fn visit<F>(
    node: &CategoryNode,
    parent_id: Option<Uuid>,
    captured_at: DateTime<Utc>,
    next_id: &mut F,
    slugs: &mut SlugTracker,
    out: &mut Vec<CategoryRecord>,
) where
    F: FnMut() -> Uuid,
{
    if node.is_root() {
        for child in node.children() {
            visit(child, None, captured_at, next_id, slugs, out);
        }
        return;
    }

    let id = next_id();
    let name = node.name().to_string();
    let slug = slugs.assign(parent_id, &slugify(&name));

    out.push(CategoryRecord {
        id,
        parent_id,
        name,
        slug,
        is_active: true,
        updated_at: captured_at,
    });

    for child in node.children() {
        visit(child, Some(id), captured_at, next_id, slugs, out);
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Int(i64),
        Uint(u64),
    }

    Ok(
        Option::<RawId>::deserialize(deserializer)?.map(|raw| match raw {
            RawId::Text(s) => s,
            RawId::Int(n) => n.to_string(),
            RawId::Uint(n) => n.to_string(),
        }),
    )
}

#[cfg(test)]
#[path = "categories_test.rs"]
mod tests;
