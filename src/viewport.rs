//! Pan/zoom transform between tree space and screen space.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::config::TreeViewConfig;
use crate::layout::Point;

/// Allowed zoom range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScaleExtent {
    pub min: f32,
    pub max: f32,
}

impl ScaleExtent {
    /// `min` wins when the extent is inverted.
    pub fn clamp(&self, scale: f32) -> f32 {
        scale.min(self.max).max(self.min)
    }
}

impl Default for ScaleExtent {
    fn default() -> Self {
        Self { min: 0.1, max: 1.0 }
    }
}

/// Current pan and zoom. `screen = tree * scale + translate`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Viewport {
    pub translate: Point,
    pub scale: f32,
    #[serde(skip)]
    extent: ScaleExtent,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            translate: Point::ORIGIN,
            scale: 1.0,
            extent: ScaleExtent::default(),
        }
    }
}

impl Viewport {
    /// Initial transform from a validated config.
    pub fn from_config(config: &TreeViewConfig) -> Self {
        let extent = config.scale_extent;
        Self {
            translate: config.translate,
            scale: extent.clamp(config.zoom),
            extent,
        }
    }

    /// Move to `scale` and `translate`; the scale is clamped into the extent.
    pub fn zoom_to(&mut self, scale: f32, translate: Point) {
        self.scale = self.extent.clamp(scale);
        self.translate = translate;
        trace!(scale = self.scale, x = translate.x, y = translate.y, "viewport moved");
    }

    pub fn to_screen(&self, point: Point) -> Point {
        Point::new(
            point.x * self.scale + self.translate.x,
            point.y * self.scale + self.translate.y,
        )
    }

    pub fn to_tree(&self, point: Point) -> Point {
        Point::new(
            (point.x - self.translate.x) / self.scale,
            (point.y - self.translate.y) / self.scale,
        )
    }

    /// Tree-space corners of a `width` x `height` screen.
    pub fn visible_region(&self, width: f32, height: f32) -> (Point, Point) {
        (
            self.to_tree(Point::ORIGIN),
            self.to_tree(Point::new(width, height)),
        )
    }

    /// SVG/CSS transform for the diagram root group.
    pub fn transform_attribute(&self) -> String {
        format!(
            "translate({},{}) scale({})",
            self.translate.x, self.translate.y, self.scale
        )
    }
}
