//! Projection of the visible tree into positioned nodes and edges.
//!
//! The projector never mutates the canonical tree: it prunes collapsed
//! subtrees, runs [`TidyTreeLayout`] over what is left and maps each
//! (breadth, depth) pair onto the configured orientation.

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::tidy_tree::{TidyTreeConfig, TidyTreeLayout};
use crate::tree::{Attributes, NodeId, TreeNode};

/// Which screen axis the tree grows along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// Root on the left, depth grows along x.
    #[default]
    Horizontal,
    /// Root on top, depth grows along y.
    Vertical,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Space reserved per node, in tree units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodeSize {
    pub x: f32,
    pub y: f32,
}

impl Default for NodeSize {
    fn default() -> Self {
        Self { x: 140.0, y: 140.0 }
    }
}

/// Gap multipliers between neighbouring nodes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Separation {
    pub siblings: f32,
    pub non_siblings: f32,
}

impl Default for Separation {
    fn default() -> Self {
        Self {
            siblings: 1.0,
            non_siblings: 2.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ProjectionOptions {
    pub orientation: Orientation,
    pub node_size: NodeSize,
    pub separation: Separation,
    /// Fixed distance per level along the depth axis, replacing the node size.
    /// Zero counts as unset.
    pub depth_factor: Option<f32>,
}

/// A visible node with its computed coordinates.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionedNode {
    pub id: NodeId,
    pub parent_id: Option<NodeId>,
    pub name: String,
    #[serde(skip_serializing_if = "Attributes::is_empty")]
    pub attributes: Attributes,
    pub depth: u32,
    pub x: f32,
    pub y: f32,
    pub collapsed: bool,
    /// True when the canonical node has children, whether or not they are shown.
    pub has_children: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_link: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unlabeled_attributes: Vec<String>,
}

impl PositionedNode {
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// A drawn parent → child connection.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub source: NodeId,
    pub target: NodeId,
    pub source_point: Point,
    pub target_point: Point,
}

/// Output of one projection: nodes in pre-order, edges grouped by parent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Projection {
    pub nodes: Vec<PositionedNode>,
    pub edges: Vec<Edge>,
}

impl Projection {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn node(&self, id: NodeId) -> Option<&PositionedNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn position_of(&self, id: NodeId) -> Option<Point> {
        self.node(id).map(PositionedNode::position)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Computes [`Projection`]s from a canonical tree.
#[derive(Debug, Clone, Default)]
pub struct LayoutProjector {
    options: ProjectionOptions,
}

impl LayoutProjector {
    pub fn new(options: ProjectionOptions) -> Self {
        Self { options }
    }

    /// Lay out the visible part of `root`.
    #[instrument(level = "debug", skip_all, fields(root = %root.id))]
    pub fn project(&self, root: &TreeNode) -> Projection {
        let visible = visible_pre_order(root);
        let parents: Vec<Option<usize>> = visible.iter().map(|(parent, _)| *parent).collect();

        let layout = TidyTreeLayout::new(TidyTreeConfig {
            sibling_separation: self.options.separation.siblings,
            non_sibling_separation: self.options.separation.non_siblings,
        });
        let result = layout.compute(&parents);

        let nodes: Vec<PositionedNode> = visible
            .iter()
            .enumerate()
            .map(|(i, (_, node))| {
                let point = self.place(result.breadth[i], result.depth[i]);
                PositionedNode {
                    id: node.id,
                    parent_id: node.parent_id,
                    name: node.name.clone(),
                    attributes: node.attributes.clone(),
                    depth: result.depth[i],
                    x: point.x,
                    y: point.y,
                    collapsed: node.collapsed,
                    has_children: !node.is_leaf(),
                    name_link: node.name_link.clone(),
                    unlabeled_attributes: node.unlabeled_attributes.clone(),
                }
            })
            .collect();

        let edges = Self::edges(&visible, &nodes);
        debug!(nodes = nodes.len(), edges = edges.len(), "projected visible tree");
        Projection { nodes, edges }
    }

    fn place(&self, breadth: f32, depth: u32) -> Point {
        let NodeSize { x: size_x, y: size_y } = self.options.node_size;
        let depth = depth as f32;
        let factor = self.options.depth_factor.filter(|f| *f != 0.0);
        match self.options.orientation {
            Orientation::Vertical => {
                let y = factor.map_or(depth * size_y, |f| depth * f);
                Point::new(breadth * size_x, y)
            }
            Orientation::Horizontal => {
                let x = factor.map_or(depth * size_x, |f| depth * f);
                Point::new(x, breadth * size_y)
            }
        }
    }

    /// One edge per visible child, grouped under each parent in node order.
    fn edges(visible: &[(Option<usize>, &TreeNode)], nodes: &[PositionedNode]) -> Vec<Edge> {
        let mut children: Vec<Vec<usize>> = vec![Vec::new(); visible.len()];
        for (index, (parent, _)) in visible.iter().enumerate() {
            if let Some(p) = parent {
                children[*p].push(index);
            }
        }

        children
            .iter()
            .enumerate()
            .flat_map(|(parent, kids)| {
                kids.iter().map(move |&child| Edge {
                    source: nodes[parent].id,
                    target: nodes[child].id,
                    source_point: nodes[parent].position(),
                    target_point: nodes[child].position(),
                })
            })
            .collect()
    }
}

/// Pre-order listing of the visible subtree as `(parent index, node)`.
fn visible_pre_order(root: &TreeNode) -> Vec<(Option<usize>, &TreeNode)> {
    let mut out = Vec::new();
    let mut stack: Vec<(Option<usize>, &TreeNode)> = vec![(None, root)];

    while let Some((parent, node)) = stack.pop() {
        let index = out.len();
        out.push((parent, node));
        if !node.collapsed {
            stack.extend(node.children.iter().rev().map(|child| (Some(index), child)));
        }
    }
    out
}
