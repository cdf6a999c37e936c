//! Treeview - WASM Module
//!
//! This module provides the core tree model and layout for an interactive,
//! collapsible tree diagram. It is compiled to WebAssembly and exposes a
//! JavaScript-friendly API via wasm-bindgen; the host page draws what the
//! core projects and feeds interaction events back in.
//!
//! # Architecture
//!
//! - `tree`: canonical tree, normalization of nested or flat input, collapse state
//! - `layout`: Buchheim tidy tree and projection into positioned nodes and edges
//! - `spatial`: R-tree hit index for O(log n) pointer and viewport queries
//! - `viewport`: pan/zoom transform
//! - `render`: draw instructions and the per-widget stylesheet
//! - `view`: the widget controller tying the pieces together

use serde::Serialize;
use wasm_bindgen::prelude::*;

pub mod config;
pub mod error;
pub mod layout;
pub mod render;
pub mod spatial;
pub mod tree;
pub mod view;
pub mod viewport;

#[cfg(test)]
mod test_support;

pub use config::TreeViewConfig;
pub use error::{ConfigError, LookupMiss, ValidationError};
pub use view::{TreeView, ViewUpdate};

use layout::Point;
use render::StyleRegistry;
use tree::{LinkRecord, NodeId, RawHierarchy, TreeNode};

/// Initialize the WASM module.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Main entry point for the tree widget.
///
/// This struct wraps the internal [`TreeView`] and provides the public API
/// exposed to JavaScript.
#[wasm_bindgen]
pub struct TreeViewWasm {
    view: TreeView,
    styles: StyleRegistry,
    on_toggle: Option<js_sys::Function>,
    on_hover: Option<js_sys::Function>,
    on_hover_end: Option<js_sys::Function>,
    on_update: Option<js_sys::Function>,
}

#[wasm_bindgen]
impl TreeViewWasm {
    /// Create a widget from a (possibly partial) options object.
    ///
    /// `undefined` or `null` selects every default.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<TreeViewWasm, JsValue> {
        let view = TreeView::new(parse_config(config)?).map_err(to_js_error)?;
        Ok(Self {
            view,
            styles: StyleRegistry::with_defaults(),
            on_toggle: None,
            on_hover: None,
            on_hover_end: None,
            on_update: None,
        })
    }

    /// Replace the configuration. Takes effect on the next `project()`.
    #[wasm_bindgen(js_name = setConfig)]
    pub fn set_config(&mut self, config: JsValue) -> Result<(), JsValue> {
        let config = parse_config(config)?;
        self.view.set_config(config).map_err(to_js_error)
    }

    // =========================================================================
    // Data Loading
    // =========================================================================

    /// Load nested data: a root object or a single-element array of one.
    ///
    /// Returns the number of nodes in the new tree.
    #[wasm_bindgen(js_name = loadData)]
    pub fn load_data(&mut self, data: JsValue) -> Result<u32, JsValue> {
        let input: RawHierarchy = serde_wasm_bindgen::from_value(data)?;
        self.view.load_hierarchy(&input).map_err(to_js_error)?;
        Ok(self.node_count())
    }

    /// Load flat `{parent, child, ...}` records.
    ///
    /// `attributeFields` names the extra record fields copied onto each child.
    #[wasm_bindgen(js_name = loadLinks)]
    pub fn load_links(
        &mut self,
        links: JsValue,
        attribute_fields: Option<Vec<String>>,
    ) -> Result<u32, JsValue> {
        let links: Vec<LinkRecord> = serde_wasm_bindgen::from_value(links)?;
        self.view
            .load_links(&links, attribute_fields.as_deref())
            .map_err(to_js_error)?;
        Ok(self.node_count())
    }

    /// Number of nodes in the loaded tree, collapsed ones included.
    #[wasm_bindgen(js_name = nodeCount)]
    pub fn node_count(&self) -> u32 {
        self.view.state().node_count() as u32
    }

    // =========================================================================
    // Projection
    // =========================================================================

    /// Lay out the visible tree and return `{nodes, edges}`.
    pub fn project(&mut self) -> Result<JsValue, JsValue> {
        to_js(self.view.project())
    }

    /// Draw instructions for the last projection: `{links, nodes}`.
    #[wasm_bindgen(js_name = drawList)]
    pub fn draw_list(&self) -> Result<JsValue, JsValue> {
        to_js(&render::draw(self.view.projection()))
    }

    /// Snapshot of a node, or `undefined`.
    #[wasm_bindgen(js_name = findById)]
    pub fn find_by_id(&self, id: u32) -> Result<JsValue, JsValue> {
        match self.view.find_by_id(NodeId(id)) {
            Some(node) => to_js(node),
            None => Ok(JsValue::UNDEFINED),
        }
    }

    // =========================================================================
    // Interaction
    // =========================================================================

    /// Collapse or expand a node, then call the toggle callback with
    /// `(node, event)` and the update callback with `{node, zoom, translate}`.
    ///
    /// Returns false when nothing changed: the widget is not collapsible or
    /// the id is not in the current tree.
    #[wasm_bindgen(js_name = handleToggle)]
    pub fn handle_toggle(&mut self, id: u32, event: JsValue) -> Result<bool, JsValue> {
        match self.view.toggle(NodeId(id)) {
            Ok(Some(node)) => {
                notify(self.on_toggle.as_ref(), &node, &event)?;
                self.notify_update(Some(node))?;
                Ok(true)
            }
            Ok(None) => Ok(false),
            Err(miss) => {
                warn_console(&miss);
                Ok(false)
            }
        }
    }

    #[wasm_bindgen(js_name = handleHover)]
    pub fn handle_hover(&self, id: u32, event: JsValue) -> Result<bool, JsValue> {
        match self.view.hover(NodeId(id)) {
            Ok(node) => notify(self.on_hover.as_ref(), &node, &event).map(|_| true),
            Err(miss) => {
                warn_console(&miss);
                Ok(false)
            }
        }
    }

    #[wasm_bindgen(js_name = handleHoverEnd)]
    pub fn handle_hover_end(&self, id: u32, event: JsValue) -> Result<bool, JsValue> {
        match self.view.hover_end(NodeId(id)) {
            Ok(node) => notify(self.on_hover_end.as_ref(), &node, &event).map(|_| true),
            Err(miss) => {
                warn_console(&miss);
                Ok(false)
            }
        }
    }

    #[wasm_bindgen(js_name = setOnToggle)]
    pub fn set_on_toggle(&mut self, callback: Option<js_sys::Function>) {
        self.on_toggle = callback;
    }

    #[wasm_bindgen(js_name = setOnHover)]
    pub fn set_on_hover(&mut self, callback: Option<js_sys::Function>) {
        self.on_hover = callback;
    }

    #[wasm_bindgen(js_name = setOnHoverEnd)]
    pub fn set_on_hover_end(&mut self, callback: Option<js_sys::Function>) {
        self.on_hover_end = callback;
    }

    /// Called with `{node, zoom, translate}` after a toggle, and with
    /// `node: null` after every pan or zoom.
    #[wasm_bindgen(js_name = setOnUpdate)]
    pub fn set_on_update(&mut self, callback: Option<js_sys::Function>) {
        self.on_update = callback;
    }

    // =========================================================================
    // Hit Testing & Viewport
    // =========================================================================

    /// Id of the node within `radius` screen pixels of a screen point.
    #[wasm_bindgen(js_name = nodeAt)]
    pub fn node_at(&self, x: f32, y: f32, radius: f32) -> Option<u32> {
        self.view
            .node_at(Point::new(x, y), radius)
            .map(|node| node.id.raw())
    }

    /// Ids of the projected nodes visible on a `width` x `height` screen.
    #[wasm_bindgen(js_name = nodesInView)]
    pub fn nodes_in_view(&self, width: f32, height: f32) -> Vec<u32> {
        self.view
            .nodes_in_view(width, height)
            .into_iter()
            .map(NodeId::raw)
            .collect()
    }

    /// Pan and zoom, then call the update callback. Returns false when the
    /// widget is not zoomable.
    #[wasm_bindgen(js_name = zoomTo)]
    pub fn zoom_to(&mut self, scale: f32, x: f32, y: f32) -> Result<bool, JsValue> {
        if !self.view.zoom_to(scale, Point::new(x, y)) {
            return Ok(false);
        }
        self.notify_update(None)?;
        Ok(true)
    }

    /// `translate(x,y) scale(k)` for the diagram's root group.
    #[wasm_bindgen(js_name = getTransform)]
    pub fn get_transform(&self) -> String {
        self.view.viewport().transform_attribute()
    }

    // =========================================================================
    // Styles
    // =========================================================================

    /// CSS for every registered style block.
    pub fn stylesheet(&self) -> String {
        self.styles.stylesheet()
    }

    /// Add a style block under `key`; false if the key is already taken.
    #[wasm_bindgen(js_name = registerStyle)]
    pub fn register_style(&mut self, key: String, css: String) -> bool {
        self.styles.register(key, css)
    }
}

impl TreeViewWasm {
    fn notify_update(&self, node: Option<TreeNode>) -> Result<(), JsValue> {
        if let Some(callback) = &self.on_update {
            callback.call1(&JsValue::NULL, &to_js(&self.view.update(node))?)?;
        }
        Ok(())
    }
}

fn parse_config(config: JsValue) -> Result<TreeViewConfig, JsValue> {
    if config.is_undefined() || config.is_null() {
        return Ok(TreeViewConfig::default());
    }
    Ok(serde_wasm_bindgen::from_value(config)?)
}

/// Serialize with plain JS objects for maps, so attributes read as `node.attributes.key`.
fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    let serializer = serde_wasm_bindgen::Serializer::json_compatible();
    Ok(value.serialize(&serializer)?)
}

fn to_js_error(err: impl std::error::Error) -> JsValue {
    JsError::new(&err.to_string()).into()
}

fn notify(
    callback: Option<&js_sys::Function>,
    node: &TreeNode,
    event: &JsValue,
) -> Result<(), JsValue> {
    if let Some(callback) = callback {
        callback.call2(&JsValue::NULL, &to_js(node)?, event)?;
    }
    Ok(())
}

fn warn_console(miss: &LookupMiss) {
    web_sys::console::warn_1(&JsValue::from_str(&miss.to_string()));
}
