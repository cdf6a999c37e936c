//! Widget configuration.
//!
//! Deserialized straight from the JavaScript options object. Every field has
//! a default, so callers only pass what they want to change.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::layout::{NodeSize, Orientation, Point, ProjectionOptions, Separation};
use crate::viewport::ScaleExtent;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TreeViewConfig {
    pub orientation: Orientation,
    pub node_size: NodeSize,
    pub separation: Separation,
    pub depth_factor: Option<f32>,
    /// Nodes at this depth or deeper start collapsed after each data load.
    pub initial_depth: Option<usize>,
    pub collapsible: bool,
    pub zoomable: bool,
    pub zoom: f32,
    pub scale_extent: ScaleExtent,
    pub translate: Point,
}

impl Default for TreeViewConfig {
    fn default() -> Self {
        Self {
            orientation: Orientation::Horizontal,
            node_size: NodeSize::default(),
            separation: Separation::default(),
            depth_factor: None,
            initial_depth: None,
            collapsible: true,
            zoomable: true,
            zoom: 1.0,
            scale_extent: ScaleExtent::default(),
            translate: Point::ORIGIN,
        }
    }
}

impl TreeViewConfig {
    /// Reject values the layout or viewport cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let NodeSize { x, y } = self.node_size;
        if !(x > 0.0 && y > 0.0) {
            return Err(ConfigError::NodeSize { x, y });
        }

        let Separation {
            siblings,
            non_siblings,
        } = self.separation;
        if !(siblings > 0.0 && non_siblings > 0.0) {
            return Err(ConfigError::Separation {
                siblings,
                non_siblings,
            });
        }

        let ScaleExtent { min, max } = self.scale_extent;
        if !(min > 0.0 && min <= max) {
            return Err(ConfigError::ScaleExtent { min, max });
        }

        match self.depth_factor {
            Some(factor) if factor.is_nan() || factor < 0.0 => Err(ConfigError::DepthFactor(factor)),
            _ => Ok(()),
        }
    }

    pub fn projection_options(&self) -> ProjectionOptions {
        ProjectionOptions {
            orientation: self.orientation,
            node_size: self.node_size,
            separation: self.separation,
            depth_factor: self.depth_factor,
        }
    }

    /// Whether switching to `other` changes the initial viewport.
    pub(crate) fn viewport_changed(&self, other: &TreeViewConfig) -> bool {
        self.zoom != other.zoom
            || self.scale_extent != other.scale_extent
            || self.translate != other.translate
    }
}
