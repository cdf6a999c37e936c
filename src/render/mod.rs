//! Draw instructions for the JavaScript renderer.
//!
//! [`draw`] is a pure function of a [`Projection`]: it decides glyph classes,
//! transforms and label text but leaves the drawing itself to the host.

mod style;

pub use style::StyleRegistry;

use serde::Serialize;

use crate::layout::{Point, PositionedNode, Projection};
use crate::tree::NodeId;

pub const NODE_CLASS: &str = "nodeBase";
pub const COLLAPSED_NODE_CLASS: &str = "nodeBase collapsed";
pub const LEAF_CLASS: &str = "leafNodeBase";
pub const LINK_CLASS: &str = "linkBase";
pub const NAME_CLASS: &str = "nodeNameBase";
pub const NAME_LINK_CLASS: &str = "nodeNameLink";
pub const LONG_NAME_CLASS: &str = "longNodeName";

/// Names longer than this get [`LONG_NAME_CLASS`].
const LONG_NAME_CHARS: usize = 40;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkSegment {
    pub source: NodeId,
    pub target: NodeId,
    pub from: Point,
    pub to: Point,
    pub class: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeGlyph {
    pub id: NodeId,
    pub class: &'static str,
    pub transform: String,
    pub label: String,
    pub label_class: String,
    /// Where a click on the label should navigate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_link: Option<String>,
    pub attribute_lines: Vec<String>,
}

/// Everything needed to paint one frame; links come first so nodes sit on top.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DrawList {
    pub links: Vec<LinkSegment>,
    pub nodes: Vec<NodeGlyph>,
}

pub fn node_class(node: &PositionedNode) -> &'static str {
    match (node.has_children, node.collapsed) {
        (true, true) => COLLAPSED_NODE_CLASS,
        (true, false) => NODE_CLASS,
        (false, _) => LEAF_CLASS,
    }
}

/// Class list of the name label.
pub fn label_class(node: &PositionedNode) -> String {
    let mut class = String::from(NAME_CLASS);
    if node.name_link.is_some() {
        class.push(' ');
        class.push_str(NAME_LINK_CLASS);
    }
    if node.name.chars().count() > LONG_NAME_CHARS {
        class.push(' ');
        class.push_str(LONG_NAME_CLASS);
    }
    class
}

/// `key: value` per attribute, or just the value for unlabeled keys.
pub fn attribute_lines(node: &PositionedNode) -> Vec<String> {
    node.attributes
        .iter()
        .map(|(key, value)| {
            if node.unlabeled_attributes.contains(key) {
                value.to_string()
            } else {
                format!("{key}: {value}")
            }
        })
        .collect()
}

pub fn draw(projection: &Projection) -> DrawList {
    let links = projection
        .edges
        .iter()
        .map(|edge| LinkSegment {
            source: edge.source,
            target: edge.target,
            from: edge.source_point,
            to: edge.target_point,
            class: LINK_CLASS,
        })
        .collect();

    let nodes = projection
        .nodes
        .iter()
        .map(|node| NodeGlyph {
            id: node.id,
            class: node_class(node),
            transform: format!("translate({},{})", node.x, node.y),
            label: node.name.clone(),
            label_class: label_class(node),
            name_link: node.name_link.clone(),
            attribute_lines: attribute_lines(node),
        })
        .collect();

    DrawList { links, nodes }
}
