use std::collections::BTreeSet;

use super::dimension_tree::DimensionTree;

/// Keys of the expanded tree nodes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpandState {
    keys: BTreeSet<String>,
}

impl ExpandState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keys: keys.into_iter().map(Into::into).collect(),
        }
    }

    /// Initial state for a freshly loaded tree: roots and their direct children open.
    pub fn seeded(tree: &DimensionTree) -> Self {
        Self::from_keys(tree.auto_expand_keys())
    }

    /// Flip one key. Returns `true` when the node is now expanded.
    pub fn toggle(&mut self, key: &str) -> bool {
        if self.keys.remove(key) {
            false
        } else {
            self.keys.insert(key.to_string());
            true
        }
    }

    pub fn expand(&mut self, key: &str) {
        self.keys.insert(key.to_string());
    }

    pub fn collapse(&mut self, key: &str) {
        self.keys.remove(key);
    }

    pub fn is_expanded(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    pub fn expand_all(&mut self, tree: &DimensionTree) {
        self.keys
            .extend(tree.iter().filter(|n| n.has_children()).map(|n| n.key.clone()));
    }

    pub fn collapse_all(&mut self) {
        self.keys.clear();
    }

    /// Drop keys that no longer exist in `tree` (after a refetch).
    pub fn retain_known(&mut self, tree: &DimensionTree) {
        self.keys.retain(|k| tree.contains(k));
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}
