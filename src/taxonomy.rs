//! Two-level category map resolved from menu-taxonomy records.
//!
//! Categories are data, not an enum: a site's menu records decide which
//! main categories exist and which sub-categories roll up into them. The
//! map is built once per aggregation pass and passed to every rollup step.
//!
//! Sub-categories whose parent cannot be found are kept out of the map.
//! Activities filed under them still count toward global totals but are
//! left out of every per-category breakdown.

use std::collections::{BTreeSet, HashMap};

use crate::core::{TaxonomyLevel, TaxonomyNode};

/// Resolved category map for one snapshot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Taxonomy {
    main_key_by_id: HashMap<String, String>,
    sub_to_main: HashMap<String, String>,
    all_main_keys: BTreeSet<String>,
    main_names: HashMap<String, String>,
    sub_names: HashMap<String, String>,
    orphaned_subs: usize,
}

/// Key for a main category: lowercased name, whitespace runs become `-`.
///
/// Leading and trailing whitespace is dropped and inner runs collapse to a
/// single `-` on purpose, so `"Civil  Works "` and `"Civil Works"` share a key.
///
/// ```rust
/// use siteprogress::taxonomy::main_key;
///
/// assert_eq!(main_key("Civil Works"), "civil-works");
/// assert_eq!(main_key(" Civil \t Works "), "civil-works");
/// assert_eq!(main_key("Cabling"), "cabling");
/// ```
pub fn main_key(name: &str) -> String {
    name.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

/// Key for a sub-category or a record's sub-category reference.
pub fn sub_key(raw: &str) -> String {
    raw.trim().to_lowercase()
}

impl Taxonomy {
    /// Build the map from a flat list of menu records.
    pub fn resolve(nodes: &[TaxonomyNode]) -> Self {
        let mut taxonomy = Self::default();

        for node in nodes.iter().filter(|n| n.level == TaxonomyLevel::Main) {
            let key = main_key(&node.name);
            taxonomy
                .main_names
                .entry(key.clone())
                .or_insert_with(|| node.name.trim().to_string());
            taxonomy.main_key_by_id.insert(node.id.clone(), key.clone());
            taxonomy.all_main_keys.insert(key);
        }

        for node in nodes.iter().filter(|n| n.level == TaxonomyLevel::Sub) {
            let key = sub_key(node.key.as_deref().unwrap_or(&node.name));
            taxonomy
                .sub_names
                .entry(key.clone())
                .or_insert_with(|| node.name.trim().to_string());

            let parent = node
                .parent_main_id
                .as_deref()
                .and_then(|id| taxonomy.main_key_by_id.get(id))
                .cloned();
            match parent {
                Some(main) => {
                    taxonomy.sub_to_main.insert(key, main);
                }
                None => {
                    tracing::debug!(sub = %key, "sub-category has no resolvable main category");
                    taxonomy.orphaned_subs += 1;
                }
            }
        }

        taxonomy
    }

    /// Main category key for a sub-category reference, if it resolves.
    pub fn main_for(&self, sub_category: &str) -> Option<&str> {
        self.sub_to_main
            .get(&sub_key(sub_category))
            .map(String::as_str)
    }

    pub fn main_key_by_id(&self, id: &str) -> Option<&str> {
        self.main_key_by_id.get(id).map(String::as_str)
    }

    pub fn all_main_keys(&self) -> &BTreeSet<String> {
        &self.all_main_keys
    }

    /// Display name of a main category; falls back to the key.
    pub fn main_name<'a>(&'a self, main_key: &'a str) -> &'a str {
        self.main_names
            .get(main_key)
            .map(String::as_str)
            .unwrap_or(main_key)
    }

    /// Display name of a sub-category; falls back to the reference as given.
    pub fn sub_name<'a>(&'a self, sub_category: &'a str) -> &'a str {
        self.sub_names
            .get(&sub_key(sub_category))
            .map(String::as_str)
            .unwrap_or(sub_category)
    }

    /// Number of sub-category records dropped for lack of a parent.
    pub fn orphaned_subs(&self) -> usize {
        self.orphaned_subs
    }

    pub fn is_empty(&self) -> bool {
        self.all_main_keys.is_empty()
    }
}
