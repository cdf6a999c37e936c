//! Spatial indexing for O(log n) hit testing.
//!
//! This module provides an R-tree based index over projected node positions
//! for pointer hit testing and viewport culling.

mod rtree;

pub use rtree::HitIndex;
