//! Canonical tree model: node types, normalization of raw input and the
//! collapse/expand state that owns the tree.

pub mod node;
pub mod normalize;
pub mod state;

pub use node::{AttrValue, Attributes, NodeId, PreOrder, TreeNode};
pub use normalize::{LinkField, LinkRecord, Normalizer, RawHierarchy, RawNode};
pub use state::TreeState;
