//! Layout of the visible tree.
//!
//! [`tidy_tree`] computes abstract (breadth, depth) coordinates; [`projection`]
//! prunes collapsed subtrees, scales the result by node size and orientation
//! and emits the node and edge lists the renderer consumes.

pub mod projection;
pub mod tidy_tree;

pub use projection::{
    Edge, LayoutProjector, NodeSize, Orientation, Point, PositionedNode, Projection,
    ProjectionOptions, Separation,
};
pub use tidy_tree::{TidyTreeConfig, TidyTreeLayout, TidyTreeResult};
