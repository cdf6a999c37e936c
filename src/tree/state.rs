//! Authoritative tree state.
//!
//! [`TreeState`] exclusively owns the canonical tree of the current data
//! version. Collapse/expand mutate it in place; readers (the projector) only
//! ever see it through a shared borrow, so a mutation always completes before
//! the next projection reads the tree.

use tracing::{debug, info, instrument, warn};

use super::node::{NodeId, TreeNode};
use super::normalize::{LinkRecord, Normalizer, RawHierarchy};
use crate::error::{LookupMiss, NormalizeResult};

/// Owner of the canonical tree and its collapsed flags.
#[derive(Debug, Default)]
pub struct TreeState {
    root: Option<TreeNode>,
    normalizer: Normalizer,
    initial_depth_applied: bool,
    version: u64,
}

impl TreeState {
    /// Create a state with no data loaded.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the tree with normalized nested input.
    ///
    /// On error the previously installed tree stays in place.
    #[instrument(level = "debug", skip_all)]
    pub fn load_hierarchy(&mut self, input: &RawHierarchy) -> NormalizeResult<()> {
        let root = self.normalizer.normalize(input)?;
        self.install(root);
        Ok(())
    }

    /// Replace the tree with normalized flat links.
    #[instrument(level = "debug", skip_all)]
    pub fn load_links(
        &mut self,
        links: &[LinkRecord],
        attribute_fields: Option<&[String]>,
    ) -> NormalizeResult<()> {
        let root = self.normalizer.from_links(links, attribute_fields)?;
        self.install(root);
        Ok(())
    }

    fn install(&mut self, root: TreeNode) {
        self.version += 1;
        self.initial_depth_applied = false;
        info!(version = self.version, root = %root.name, nodes = root.node_count(), "tree installed");
        self.root = Some(root);
    }

    /// The root node, if data has been loaded.
    pub fn root(&self) -> Option<&TreeNode> {
        self.root.as_ref()
    }

    /// Incremented on every successful load.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Number of loaded nodes, collapsed ones included; 0 before any load.
    pub fn node_count(&self) -> usize {
        self.root.as_ref().map_or(0, TreeNode::node_count)
    }

    /// Depth-first lookup from the root.
    pub fn find_by_id(&self, id: NodeId) -> Option<&TreeNode> {
        self.root.as_ref()?.find(id)
    }

    /// Mutable variant of [`TreeState::find_by_id`].
    pub fn find_by_id_mut(&mut self, id: NodeId) -> Option<&mut TreeNode> {
        self.root.as_mut()?.find_mut(id)
    }

    /// Collapse `id` and all of its descendants.
    pub fn collapse(&mut self, id: NodeId) -> Result<(), LookupMiss> {
        self.resolve_mut(id)?.collapse();
        Ok(())
    }

    /// Expand `id` only; descendants keep their own flags.
    pub fn expand(&mut self, id: NodeId) -> Result<(), LookupMiss> {
        self.resolve_mut(id)?.expand();
        Ok(())
    }

    /// Expand `id` if it is collapsed, otherwise collapse it.
    ///
    /// Returns the node after the change.
    #[instrument(level = "debug", skip(self))]
    pub fn toggle(&mut self, id: NodeId) -> Result<&TreeNode, LookupMiss> {
        let node = self.resolve_mut(id)?;
        if node.collapsed {
            node.expand();
        } else {
            node.collapse();
        }
        debug!(%id, collapsed = node.collapsed, "toggled");
        Ok(node)
    }

    /// Collapse every node at depth `max_depth` or deeper.
    ///
    /// One-shot per data load: returns `false` without touching anything if
    /// it already ran since the last load, or if nothing is loaded.
    #[instrument(level = "debug", skip(self))]
    pub fn apply_initial_depth_limit(&mut self, max_depth: usize) -> bool {
        if self.initial_depth_applied {
            return false;
        }
        let Some(root) = self.root.as_mut() else {
            return false;
        };
        self.initial_depth_applied = true;
        collapse_from_depth(root, 0, max_depth);
        true
    }

    fn resolve_mut(&mut self, id: NodeId) -> Result<&mut TreeNode, LookupMiss> {
        let version = self.version;
        self.find_by_id_mut(id).ok_or_else(|| {
            warn!(%id, version, "node id not found in current tree");
            LookupMiss(id)
        })
    }
}

fn collapse_from_depth(node: &mut TreeNode, depth: usize, max_depth: usize) {
    if depth >= max_depth {
        node.collapse();
        return;
    }
    for child in &mut node.children {
        collapse_from_depth(child, depth + 1, max_depth);
    }
}
