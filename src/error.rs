//! Error types for normalization, lookup and configuration.

use thiserror::Error;

use crate::tree::NodeId;

/// Malformed or ambiguous hierarchy input.
///
/// Raised by the normalizer before any tree is installed, so a failed load
/// never leaves a partially built tree behind.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("hierarchy input is empty")]
    EmptyInput,

    #[error("link set is empty")]
    EmptyLinks,

    #[error("no root candidate: every node appears as a child")]
    NoRoot,

    #[error("multiple root candidates: {}", .0.join(", "))]
    MultipleRoots(Vec<String>),

    #[error("node {child:?} is linked under both {first:?} and {second:?}")]
    DuplicateChild {
        child: String,
        first: String,
        second: String,
    },

    #[error("cycle detected in links at node {0:?}")]
    Cycle(String),
}

/// An id that does not resolve to a node in the current tree.
///
/// Usually a stale reference from the rendering layer, e.g. an event fired
/// after a data reload. Non-fatal; state is left unchanged.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("no node with id {0} in the current tree")]
pub struct LookupMiss(pub NodeId);

/// Rejected widget configuration.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("node size must be positive, got {x}x{y}")]
    NodeSize { x: f32, y: f32 },

    #[error("separation must be positive, got siblings={siblings} nonSiblings={non_siblings}")]
    Separation { siblings: f32, non_siblings: f32 },

    #[error("invalid scale extent: min={min} max={max}")]
    ScaleExtent { min: f32, max: f32 },

    #[error("depth factor must not be negative, got {0}")]
    DepthFactor(f32),
}

/// Result type for normalization.
pub type NormalizeResult<T> = Result<T, ValidationError>;
