//! Tree view controller.
//!
//! [`TreeView`] is the widget model the facade drives. It pairs the tree
//! state with the current configuration, keeps the last projection and its
//! hit index, and turns interaction ids back into node snapshots.

use std::collections::HashSet;

use serde::Serialize;
use tracing::{debug, instrument};

use crate::config::TreeViewConfig;
use crate::error::{ConfigError, LookupMiss, NormalizeResult};
use crate::layout::{LayoutProjector, Point, PositionedNode, Projection};
use crate::spatial::HitIndex;
use crate::tree::{LinkRecord, NodeId, RawHierarchy, TreeNode, TreeState};
use crate::viewport::Viewport;

/// What the host hears after a toggle or a pan/zoom.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewUpdate {
    /// The toggled node; `None` for viewport changes.
    pub node: Option<TreeNode>,
    pub zoom: f32,
    pub translate: Point,
}

#[derive(Debug)]
pub struct TreeView {
    state: TreeState,
    config: TreeViewConfig,
    projector: LayoutProjector,
    viewport: Viewport,
    projection: Projection,
    hit_index: HitIndex,
}

impl TreeView {
    pub fn new(config: TreeViewConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            state: TreeState::new(),
            projector: LayoutProjector::new(config.projection_options()),
            viewport: Viewport::from_config(&config),
            config,
            projection: Projection::empty(),
            hit_index: HitIndex::default(),
        })
    }

    /// Swap in a new configuration.
    ///
    /// The viewport is only reset when zoom, translate or scale extent change,
    /// so a pan survives unrelated updates. Takes effect on the next
    /// [`TreeView::project`].
    pub fn set_config(&mut self, config: TreeViewConfig) -> Result<(), ConfigError> {
        config.validate()?;
        if self.config.viewport_changed(&config) {
            self.viewport = Viewport::from_config(&config);
        }
        self.projector = LayoutProjector::new(config.projection_options());
        self.config = config;
        Ok(())
    }

    pub fn load_hierarchy(&mut self, input: &RawHierarchy) -> NormalizeResult<()> {
        self.state.load_hierarchy(input)?;
        self.invalidate();
        Ok(())
    }

    pub fn load_links(
        &mut self,
        links: &[LinkRecord],
        attribute_fields: Option<&[String]>,
    ) -> NormalizeResult<()> {
        self.state.load_links(links, attribute_fields)?;
        self.invalidate();
        Ok(())
    }

    fn invalidate(&mut self) {
        self.projection = Projection::empty();
        self.hit_index = HitIndex::default();
    }

    /// Recompute the layout of the visible tree.
    ///
    /// The first call after a load applies `initialDepth`.
    #[instrument(level = "debug", skip(self), fields(version = self.state.version()))]
    pub fn project(&mut self) -> &Projection {
        if let Some(depth) = self.config.initial_depth {
            if self.state.apply_initial_depth_limit(depth) {
                debug!(depth, "applied initial depth");
            }
        }

        self.projection = match self.state.root() {
            Some(root) => self.projector.project(root),
            None => Projection::empty(),
        };
        self.hit_index = HitIndex::from_projection(&self.projection);
        &self.projection
    }

    /// The last computed projection.
    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    pub fn find_by_id(&self, id: NodeId) -> Option<&TreeNode> {
        self.state.find_by_id(id)
    }

    /// Toggle `id` and return a snapshot of it.
    ///
    /// `Ok(None)` when the widget is not collapsible; nothing is looked up or
    /// changed in that case.
    pub fn toggle(&mut self, id: NodeId) -> Result<Option<TreeNode>, LookupMiss> {
        if !self.config.collapsible {
            debug!(%id, "toggle ignored, not collapsible");
            return Ok(None);
        }
        self.state.toggle(id).map(|node| Some(node.clone()))
    }

    pub fn hover(&self, id: NodeId) -> Result<TreeNode, LookupMiss> {
        self.snapshot(id)
    }

    pub fn hover_end(&self, id: NodeId) -> Result<TreeNode, LookupMiss> {
        self.snapshot(id)
    }

    fn snapshot(&self, id: NodeId) -> Result<TreeNode, LookupMiss> {
        self.state.find_by_id(id).cloned().ok_or_else(|| {
            debug!(%id, "hover target not in current tree");
            LookupMiss(id)
        })
    }

    /// Node under a screen-space point, within `radius` screen pixels.
    pub fn node_at(&self, screen: Point, radius: f32) -> Option<&PositionedNode> {
        let tree = self.viewport.to_tree(screen);
        let id = self
            .hit_index
            .nearest_within(tree.x, tree.y, radius / self.viewport.scale)?;
        self.projection.node(id)
    }

    /// Ids of projected nodes visible on a `width` x `height` screen, in
    /// projection order.
    pub fn nodes_in_view(&self, width: f32, height: f32) -> Vec<NodeId> {
        let (min, max) = self.viewport.visible_region(width, height);
        let hits: HashSet<NodeId> = self.hit_index.in_rect(min, max).into_iter().collect();
        self.projection
            .nodes
            .iter()
            .map(|node| node.id)
            .filter(|id| hits.contains(id))
            .collect()
    }

    /// Returns `false` and leaves the viewport alone when not zoomable.
    pub fn zoom_to(&mut self, scale: f32, translate: Point) -> bool {
        if !self.config.zoomable {
            return false;
        }
        self.viewport.zoom_to(scale, translate);
        true
    }

    /// Pair `node` with the current viewport.
    pub fn update(&self, node: Option<TreeNode>) -> ViewUpdate {
        ViewUpdate {
            node,
            zoom: self.viewport.scale,
            translate: self.viewport.translate,
        }
    }

    pub fn state(&self) -> &TreeState {
        &self.state
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Orientation;
    use crate::test_support::init_test_setup;
    use crate::tree::RawNode;

    fn view_with(config: TreeViewConfig) -> TreeView {
        let raw = RawNode::new("root")
            .with_child(RawNode::new("a").with_child(RawNode::new("a1")))
            .with_child(RawNode::new("b"));
        let mut view = TreeView::new(config).unwrap();
        view.load_hierarchy(&raw.into()).unwrap();
        view
    }

    fn id_of(view: &TreeView, name: &str) -> NodeId {
        view.state()
            .root()
            .unwrap()
            .iter()
            .find(|(_, n)| n.name == name)
            .map(|(_, n)| n.id)
            .unwrap()
    }

    fn visible(view: &mut TreeView) -> Vec<String> {
        view.project().nodes.iter().map(|n| n.name.clone()).collect()
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = TreeViewConfig {
            zoom: 1.0,
            scale_extent: crate::viewport::ScaleExtent { min: 3.0, max: 1.0 },
            ..Default::default()
        };
        assert!(TreeView::new(config).is_err());
    }

    #[test]
    fn test_initial_depth_applied_once() {
        init_test_setup();
        let mut view = view_with(TreeViewConfig {
            initial_depth: Some(1),
            ..Default::default()
        });
        assert_eq!(visible(&mut view), vec!["root", "a", "b"]);

        let a = id_of(&view, "a");
        view.toggle(a).unwrap();
        assert_eq!(visible(&mut view), vec!["root", "a", "a1", "b"]);
    }

    #[test]
    fn test_toggle_not_collapsible_is_noop() {
        let mut view = view_with(TreeViewConfig {
            collapsible: false,
            ..Default::default()
        });
        let a = id_of(&view, "a");

        assert_eq!(view.toggle(a), Ok(None));
        assert_eq!(view.toggle(NodeId(9_999)), Ok(None));
        assert!(!view.find_by_id(a).unwrap().collapsed);
    }

    #[test]
    fn test_toggle_returns_snapshot() {
        let mut view = view_with(TreeViewConfig::default());
        let a = id_of(&view, "a");

        let snapshot = view.toggle(a).unwrap().unwrap();
        assert_eq!(snapshot.name, "a");
        assert!(snapshot.collapsed);
        assert_eq!(view.toggle(NodeId(9_999)), Err(LookupMiss(NodeId(9_999))));
    }

    #[test]
    fn test_hover_resolves_ids() {
        let view = view_with(TreeViewConfig::default());
        let b = id_of(&view, "b");

        assert_eq!(view.hover(b).unwrap().name, "b");
        assert_eq!(view.hover_end(b).unwrap().name, "b");
        assert_eq!(view.hover(NodeId(9_999)), Err(LookupMiss(NodeId(9_999))));
    }

    #[test]
    fn test_load_invalidates_projection() {
        let mut view = view_with(TreeViewConfig::default());
        view.project();
        assert_eq!(view.projection().len(), 4);

        view.load_hierarchy(&RawNode::new("solo").into()).unwrap();
        assert!(view.projection().is_empty());
        assert_eq!(view.project().len(), 1);
    }

    #[test]
    fn test_node_at_and_nodes_in_view() {
        let mut view = view_with(TreeViewConfig {
            orientation: Orientation::Vertical,
            ..Default::default()
        });
        view.zoom_to(0.5, Point::new(200.0, 0.0));
        view.project();

        // root at tree (0, 0) → screen (200, 0)
        let hit = view.node_at(Point::new(203.0, 4.0), 10.0).unwrap();
        assert_eq!(hit.name, "root");
        assert!(view.node_at(Point::new(0.0, 300.0), 10.0).is_none());

        // 400x50 px covers tree x in [-400, 400] and y in [0, 100]
        let in_view = view.nodes_in_view(400.0, 50.0);
        assert_eq!(in_view, vec![id_of(&view, "root")]);
    }

    #[test]
    fn test_zoom_respects_zoomable() {
        let mut view = view_with(TreeViewConfig {
            zoomable: false,
            ..Default::default()
        });
        assert!(!view.zoom_to(0.5, Point::new(1.0, 1.0)));
        assert_eq!(view.viewport().scale, 1.0);
    }

    #[test]
    fn test_update_reports_viewport_and_node() {
        let mut view = view_with(TreeViewConfig::default());
        let b = id_of(&view, "b");

        let toggled = view.toggle(b).unwrap();
        let update = view.update(toggled);
        assert_eq!(update.node.as_ref().map(|n| n.name.as_str()), Some("b"));
        assert_eq!((update.zoom, update.translate), (1.0, Point::ORIGIN));

        view.zoom_to(5.0, Point::new(30.0, -10.0));
        let update = view.update(None);
        assert_eq!(update.node, None);
        assert_eq!(update.zoom, 1.0, "clamped to the default extent");
        assert_eq!(update.translate, Point::new(30.0, -10.0));

        let json = serde_json::to_string(&update).unwrap();
        assert_eq!(json, r#"{"node":null,"zoom":1.0,"translate":{"x":30.0,"y":-10.0}}"#);
    }

    #[test]
    fn test_set_config_keeps_pan_unless_viewport_changes() {
        let mut view = view_with(TreeViewConfig::default());
        view.zoom_to(0.5, Point::new(10.0, 10.0));

        view.set_config(TreeViewConfig {
            orientation: Orientation::Vertical,
            ..Default::default()
        })
        .unwrap();
        assert_eq!(view.viewport().scale, 0.5);

        view.set_config(TreeViewConfig {
            zoom: 0.25,
            orientation: Orientation::Vertical,
            ..Default::default()
        })
        .unwrap();
        assert_eq!(view.viewport().scale, 0.25);
        assert_eq!(view.viewport().translate, Point::ORIGIN);
    }
}
