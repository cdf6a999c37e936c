//! R-tree based hit index using the rstar crate.
//!
//! Provides O(log n) spatial queries over projected node positions:
//! - Nearest node within a radius (pointer hit testing)
//! - Rectangle intersection (viewport culling)

use rstar::{AABB, PointDistance, RTree, RTreeObject};

use crate::layout::{Point, Projection};
use crate::tree::NodeId;

/// A projected node position with its id.
#[derive(Debug, Clone, Copy, PartialEq)]
struct NodePoint {
    id: NodeId,
    x: f32,
    y: f32,
}

impl RTreeObject for NodePoint {
    type Envelope = AABB<[f32; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point([self.x, self.y])
    }
}

impl PointDistance for NodePoint {
    fn distance_2(&self, point: &[f32; 2]) -> f32 {
        let dx = self.x - point[0];
        let dy = self.y - point[1];
        dx * dx + dy * dy
    }
}

/// Spatial index over one projection.
///
/// Rebuilt wholesale after every projection; it never outlives the layout it
/// was loaded from.
#[derive(Default)]
pub struct HitIndex {
    tree: RTree<NodePoint>,
}

impl HitIndex {
    /// Bulk-load the positions of every projected node.
    pub fn from_projection(projection: &Projection) -> Self {
        let points: Vec<NodePoint> = projection
            .nodes
            .iter()
            .map(|node| NodePoint {
                id: node.id,
                x: node.x,
                y: node.y,
            })
            .collect();

        Self {
            tree: RTree::bulk_load(points),
        }
    }

    /// Nearest node whose position lies within `max_distance` of `(x, y)`.
    pub fn nearest_within(&self, x: f32, y: f32, max_distance: f32) -> Option<NodeId> {
        let max_distance_sq = max_distance * max_distance;
        self.tree
            .nearest_neighbor(&[x, y])
            .filter(|point| point.distance_2(&[x, y]) <= max_distance_sq)
            .map(|point| point.id)
    }

    /// All nodes inside the rectangle spanned by two corners, in no
    /// particular order.
    pub fn in_rect(&self, min: Point, max: Point) -> Vec<NodeId> {
        let envelope = AABB::from_corners([min.x, min.y], [max.x, max.y]);
        self.tree
            .locate_in_envelope(&envelope)
            .map(|point| point.id)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}

impl std::fmt::Debug for HitIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HitIndex").field("len", &self.len()).finish()
    }
}
