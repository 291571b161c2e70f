use std::collections::HashMap;

use crate::models::dimension::{DimensionGroups, ManageDimension, RawDimensionNode};

use super::expand_state::ExpandState;

/// Index of a node inside its [`DimensionTree`].
pub type NodeId = usize;

/// A dimension lifted out of the server's `{data, children}` wrapper.
#[derive(Debug, Clone, PartialEq)]
pub struct DimensionNode {
    /// Tree key; the dimension id.
    pub key: String,
    /// Display label; the dimension name.
    pub label: String,
    pub dimension: ManageDimension,
    pub parent: Option<NodeId>,
    /// In server order.
    pub children: Vec<NodeId>,
    /// 0 for roots.
    pub depth: usize,
}

impl DimensionNode {
    pub fn md_id(&self) -> &str {
        &self.dimension.md_id
    }

    pub fn group_id(&self) -> &str {
        &self.dimension.dimension_group_id
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Secondary line under the label: group name, area and order number,
    /// each only when known (`"Buildings • 120㎡ • #3"`).
    pub fn meta_line(&self, groups: &DimensionGroups) -> String {
        let mut parts = Vec::new();
        if let Some(name) = groups
            .get(self.group_id())
            .or(self.dimension.dimension_group_name.as_ref())
        {
            parts.push(name.clone());
        }
        if let Some(area) = self.dimension.area.filter(|a| *a != 0.0) {
            parts.push(format!("{area}㎡"));
        }
        if let Some(order) = self.dimension.order_no {
            parts.push(format!("#{order}"));
        }
        parts.join(" • ")
    }
}

/// One line of the rendered tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeRow {
    pub id: NodeId,
    pub depth: usize,
    pub expanded: bool,
    pub has_children: bool,
}

/// Dimension hierarchy stored as an arena.
///
/// Nodes are kept in pre-order, parents and children refer to each other by
/// [`NodeId`], and a key index gives direct lookup by dimension id. Built fresh
/// from every server response; never mutated in place.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DimensionTree {
    nodes: Vec<DimensionNode>,
    roots: Vec<NodeId>,
    index: HashMap<String, NodeId>,
}

impl DimensionTree {
    /// Build the tree from the server's nested nodes, optionally scoped to one
    /// dimension group.
    ///
    /// With a group filter:
    /// - a root is kept when its own group matches or any node anywhere below
    ///   it matches;
    /// - below the root, a child is kept only when its own group matches, and a
    ///   dropped child takes its whole subtree with it, matching grandchildren
    ///   included.
    ///
    /// `None` or an empty filter keeps everything. Nodes without a `data`
    /// payload are skipped along with their subtrees.
    pub fn build(raw: &[RawDimensionNode], group_filter: Option<&str>) -> Self {
        let filter = group_filter.filter(|g| !g.is_empty());
        let mut tree = Self::default();

        for root in raw {
            if let Some(group) = filter {
                if !Self::root_matches(root, group) {
                    continue;
                }
            }
            tree.insert(root, None, filter, 0);
        }
        tree
    }

    fn root_matches(root: &RawDimensionNode, group: &str) -> bool {
        root.group_id() == Some(group) || Self::any_descendant_matches(&root.children, group)
    }

    fn any_descendant_matches(children: &[RawDimensionNode], group: &str) -> bool {
        children.iter().any(|child| {
            child.group_id() == Some(group) || Self::any_descendant_matches(&child.children, group)
        })
    }

    fn insert(
        &mut self,
        raw: &RawDimensionNode,
        parent: Option<NodeId>,
        filter: Option<&str>,
        depth: usize,
    ) -> Option<NodeId> {
        let data = raw.data.as_ref()?;
        let id = self.nodes.len();
        self.nodes.push(DimensionNode {
            key: data.md_id.clone(),
            label: data.md_name.clone(),
            dimension: data.clone(),
            parent,
            children: Vec::new(),
            depth,
        });
        // First occurrence wins if the server repeats an id.
        self.index.entry(data.md_id.clone()).or_insert(id);
        match parent {
            None => self.roots.push(id),
            Some(p) => self.nodes[p].children.push(id),
        }

        for child in &raw.children {
            if let Some(group) = filter {
                if child.group_id() != Some(group) {
                    continue;
                }
            }
            self.insert(child, Some(id), filter, depth + 1);
        }
        Some(id)
    }

    // ── Lookups ─────────────────────────────────────────────────────

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn root_count(&self) -> usize {
        self.roots.len()
    }

    pub fn roots(&self) -> impl Iterator<Item = &DimensionNode> {
        self.roots.iter().map(|&id| &self.nodes[id])
    }

    pub fn root_ids(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn node(&self, id: NodeId) -> Option<&DimensionNode> {
        self.nodes.get(id)
    }

    pub fn get(&self, key: &str) -> Option<&DimensionNode> {
        self.index.get(key).map(|&id| &self.nodes[id])
    }

    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    pub fn children(&self, id: NodeId) -> impl Iterator<Item = &DimensionNode> {
        self.nodes
            .get(id)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
            .iter()
            .map(|&c| &self.nodes[c])
    }

    pub fn parent(&self, id: NodeId) -> Option<&DimensionNode> {
        self.nodes.get(id)?.parent.map(|p| &self.nodes[p])
    }

    /// Every node in pre-order.
    pub fn iter(&self) -> impl Iterator<Item = &DimensionNode> {
        self.nodes.iter()
    }

    // ── Derived views ───────────────────────────────────────────────

    /// Keys expanded when the tree is first shown: every root and each root's
    /// direct children. Deeper levels start collapsed.
    pub fn auto_expand_keys(&self) -> Vec<String> {
        let mut keys = Vec::new();
        for &root in &self.roots {
            let node = &self.nodes[root];
            keys.push(node.key.clone());
            keys.extend(node.children.iter().map(|&c| self.nodes[c].key.clone()));
        }
        keys
    }

    /// All dimension payloads in pre-order.
    pub fn flatten(&self) -> Vec<&ManageDimension> {
        self.nodes.iter().map(|n| &n.dimension).collect()
    }

    /// Dimensions a node of `group_id` may hang under: every node of that group
    /// except the one being edited. Empty until a group is chosen.
    pub fn parent_candidates(
        &self,
        group_id: Option<&str>,
        editing: Option<&str>,
    ) -> Vec<&ManageDimension> {
        let Some(group) = group_id.filter(|g| !g.is_empty()) else {
            return Vec::new();
        };
        self.nodes
            .iter()
            .map(|n| &n.dimension)
            .filter(|d| d.dimension_group_id == group)
            .filter(|d| editing != Some(d.md_id.as_str()))
            .collect()
    }

    /// Rows to render: pre-order, descending only into expanded nodes.
    pub fn visible_rows(&self, expanded: &ExpandState) -> Vec<TreeRow> {
        let mut rows = Vec::new();
        let mut stack: Vec<NodeId> = self.roots.iter().rev().copied().collect();

        while let Some(id) = stack.pop() {
            let node = &self.nodes[id];
            let is_open = expanded.is_expanded(&node.key);
            rows.push(TreeRow {
                id,
                depth: node.depth,
                expanded: is_open,
                has_children: node.has_children(),
            });
            if is_open {
                stack.extend(node.children.iter().rev().copied());
            }
        }
        rows
    }

    /// Ids from the root down to `key`, inclusive. Empty if the key is unknown.
    pub fn path_to(&self, key: &str) -> Vec<NodeId> {
        let mut path = Vec::new();
        let mut cursor = self.index.get(key).copied();
        while let Some(id) = cursor {
            path.push(id);
            cursor = self.nodes[id].parent;
        }
        path.reverse();
        path
    }
}
