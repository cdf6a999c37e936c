//! Node type and related structures.
//!
//! Nodes are the entries of the canonical tree. Each node has:
//! - A unique identifier (assigned at normalization, never reused)
//! - A display name and optional scalar attributes
//! - A back-reference to its parent's identifier
//! - Its owned, ordered children and a collapsed flag

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable node identifier.
///
/// Valid for the lifetime of one data version. It wraps a u32 for efficient
/// storage and WebAssembly interop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Create a new NodeId from a raw u32.
    #[inline]
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw u32 value.
    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node({})", self.0)
    }
}

impl From<u32> for NodeId {
    #[inline]
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl From<NodeId> for u32 {
    #[inline]
    fn from(id: NodeId) -> Self {
        id.0
    }
}

/// Scalar attribute value supplied by the domain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Bool(b) => write!(f, "{b}"),
            AttrValue::Number(n) => write!(f, "{n}"),
            AttrValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        AttrValue::Text(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        AttrValue::Text(value)
    }
}

impl From<f64> for AttrValue {
    fn from(value: f64) -> Self {
        AttrValue::Number(value)
    }
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        AttrValue::Bool(value)
    }
}

/// Ordered attribute mapping.
pub type Attributes = BTreeMap<String, AttrValue>;

/// A node of the canonical tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeNode {
    pub id: NodeId,
    pub name: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: Attributes,
    pub parent_id: Option<NodeId>,
    pub children: Vec<TreeNode>,
    pub collapsed: bool,
    /// Link target opened when the name label is clicked.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_link: Option<String>,
    /// Attribute keys drawn as the bare value, without a `key: ` prefix.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unlabeled_attributes: Vec<String>,
}

impl TreeNode {
    /// Create an expanded leaf node.
    pub fn new(id: NodeId, name: impl Into<String>, parent_id: Option<NodeId>) -> Self {
        Self {
            id,
            name: name.into(),
            attributes: Attributes::new(),
            parent_id,
            children: Vec::new(),
            collapsed: false,
            name_link: None,
            unlabeled_attributes: Vec::new(),
        }
    }

    /// True when the node has no children at all, shown or hidden.
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Collapse this node and every descendant, whatever their prior state.
    pub fn collapse(&mut self) {
        self.collapsed = true;
        for child in &mut self.children {
            child.collapse();
        }
    }

    /// Expand this node only. Descendant flags are left as they are.
    pub fn expand(&mut self) {
        self.collapsed = false;
    }

    /// Depth-first search for `id`, stopping at the first match.
    pub fn find(&self, id: NodeId) -> Option<&TreeNode> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(id))
    }

    /// Mutable variant of [`TreeNode::find`].
    pub fn find_mut(&mut self, id: NodeId) -> Option<&mut TreeNode> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter_mut().find_map(|child| child.find_mut(id))
    }

    /// Pre-order iterator over this node and all of its descendants,
    /// ignoring collapse state.
    pub fn iter(&self) -> PreOrder<'_> {
        PreOrder { stack: vec![(0, self)] }
    }

    /// Number of nodes in this subtree, including `self`.
    pub fn node_count(&self) -> usize {
        self.iter().count()
    }
}

/// Pre-order traversal yielding `(depth, node)`, depth relative to the start.
pub struct PreOrder<'a> {
    stack: Vec<(usize, &'a TreeNode)>,
}

impl<'a> Iterator for PreOrder<'a> {
    type Item = (usize, &'a TreeNode);

    fn next(&mut self) -> Option<Self::Item> {
        let (depth, node) = self.stack.pop()?;
        // Push children in reverse order for left-to-right traversal
        for child in node.children.iter().rev() {
            self.stack.push((depth + 1, child));
        }
        Some((depth, node))
    }
}
