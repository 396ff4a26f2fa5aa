use serde::{Deserialize, Serialize};

/// Id of the placeholder node produced for an empty department list.
pub const SENTINEL_ID: &str = "1";
/// Label of the placeholder node.
pub const SENTINEL_LABEL: &str = "⚠ No department set";
/// `full_label` of the placeholder node; selecting it lists every user.
pub const SENTINEL_FULL_LABEL: &str = "allusers";

/// One segment of a department path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeNode {
    /// Unique within one build.
    pub id: String,
    /// The single path segment shown in the tree.
    pub label: String,
    /// Space-joined path from the root, i.e. the department value to query.
    pub full_label: String,
    /// In first-seen order.
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    pub fn new(id: impl Into<String>, label: impl Into<String>, full_label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            full_label: full_label.into(),
            children: Vec::new(),
        }
    }

    /// The placeholder shown when no user has a department.
    pub fn sentinel() -> Self {
        Self::new(SENTINEL_ID, SENTINEL_LABEL, SENTINEL_FULL_LABEL)
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn is_sentinel(&self) -> bool {
        self.full_label == SENTINEL_FULL_LABEL && self.label == SENTINEL_LABEL
    }

    pub fn node_ref(&self) -> NodeRef {
        NodeRef {
            id: self.id.clone(),
            full_label: self.full_label.clone(),
        }
    }
}

/// Depth-first search for a node by id.
pub fn find_by_id<'a>(nodes: &'a [TreeNode], id: &str) -> Option<&'a TreeNode> {
    nodes.iter().find_map(|node| {
        if node.id == id {
            Some(node)
        } else {
            find_by_id(&node.children, id)
        }
    })
}

/// Identifies the selected tree node without borrowing the tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NodeRef {
    pub id: String,
    pub full_label: String,
}

impl NodeRef {
    pub fn is_sentinel(&self) -> bool {
        self.full_label == SENTINEL_FULL_LABEL
    }
}
