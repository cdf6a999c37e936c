//! Hierarchy normalization.
//!
//! Converts raw input into one canonical [`TreeNode`] tree:
//!
//! - **Nested input** ([`RawHierarchy`]): walked recursively, every node gets
//!   a fresh id and starts expanded.
//! - **Flat links** ([`LinkRecord`]): endpoint names are interned into
//!   records, validated as a strict hierarchy (single parent per child, one
//!   root, no cycles), and only then materialized with fresh ids.
//!
//! Identifiers come from the [`Normalizer`]'s counter, which never rewinds,
//! so ids from an earlier load can never resolve against a later one.

use std::collections::{BTreeMap, HashMap};

use petgraph::algo::toposort;
use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use serde::Deserialize;
use serde::de::IgnoredAny;
use tracing::{debug, instrument, trace};

use super::node::{AttrValue, Attributes, NodeId, TreeNode};
use crate::error::{NormalizeResult, ValidationError};

/// One node of nested input, without internal bookkeeping fields.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawNode {
    pub name: String,
    #[serde(default)]
    pub attributes: Attributes,
    #[serde(default)]
    pub children: Vec<RawNode>,
    #[serde(default)]
    pub name_link: Option<String>,
    #[serde(default)]
    pub unlabeled_attributes: Vec<String>,
}

impl RawNode {
    /// Create a leaf with no attributes.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Attributes::new(),
            children: Vec::new(),
            name_link: None,
            unlabeled_attributes: Vec::new(),
        }
    }

    /// Append `child` after the existing children.
    pub fn with_child(mut self, child: RawNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }
}

/// Nested input: either a bare root object or a sequence that must hold
/// exactly one root.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawHierarchy {
    Forest(Vec<RawNode>),
    Single(RawNode),
}

impl From<RawNode> for RawHierarchy {
    fn from(node: RawNode) -> Self {
        RawHierarchy::Single(node)
    }
}

impl From<Vec<RawNode>> for RawHierarchy {
    fn from(nodes: Vec<RawNode>) -> Self {
        RawHierarchy::Forest(nodes)
    }
}

/// Extra value carried on a link record.
///
/// Only scalars can become attributes; anything else (null, arrays, objects)
/// is accepted and skipped, so unrequested fields never fail a load.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum LinkField {
    Scalar(AttrValue),
    Other(IgnoredAny),
}

/// A flat parent → child record. Any extra fields are kept in `fields` and
/// can be promoted to child attributes.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LinkRecord {
    pub parent: String,
    pub child: String,
    #[serde(flatten)]
    pub fields: BTreeMap<String, LinkField>,
}

impl LinkRecord {
    /// Create a record with no extra fields.
    pub fn new(parent: impl Into<String>, child: impl Into<String>) -> Self {
        Self {
            parent: parent.into(),
            child: child.into(),
            fields: BTreeMap::new(),
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.fields.insert(key.into(), LinkField::Scalar(value.into()));
        self
    }

    /// Scalar value of an extra field, if present.
    pub fn field(&self, key: &str) -> Option<&AttrValue> {
        match self.fields.get(key)? {
            LinkField::Scalar(value) => Some(value),
            LinkField::Other(_) => None,
        }
    }
}

/// Interned endpoint while links are being validated.
#[derive(Debug)]
struct LinkedRecord<'a> {
    name: &'a str,
    parent: Option<usize>,
    children: Vec<usize>,
    attributes: Attributes,
}

impl<'a> LinkedRecord<'a> {
    fn new(name: &'a str) -> Self {
        Self {
            name,
            parent: None,
            children: Vec::new(),
            attributes: Attributes::new(),
        }
    }
}

/// Builds canonical trees and hands out node identifiers.
#[derive(Debug, Default)]
pub struct Normalizer {
    next_id: u32,
}

impl Normalizer {
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate(&mut self) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Normalize nested input.
    #[instrument(level = "debug", skip_all)]
    pub fn normalize(&mut self, input: &RawHierarchy) -> NormalizeResult<TreeNode> {
        let root = match input {
            RawHierarchy::Single(node) => node,
            RawHierarchy::Forest(nodes) => match nodes.as_slice() {
                [] => return Err(ValidationError::EmptyInput),
                [root] => root,
                many => {
                    return Err(ValidationError::MultipleRoots(
                        many.iter().map(|n| n.name.clone()).collect(),
                    ));
                }
            },
        };

        let tree = self.assign(root, None);
        debug!(root = %tree.name, nodes = tree.node_count(), "normalized nested hierarchy");
        Ok(tree)
    }

    fn assign(&mut self, raw: &RawNode, parent_id: Option<NodeId>) -> TreeNode {
        let id = self.allocate();
        let mut node = TreeNode::new(id, raw.name.clone(), parent_id);
        node.attributes = raw.attributes.clone();
        node.name_link = raw.name_link.clone();
        node.unlabeled_attributes = raw.unlabeled_attributes.clone();
        node.children = raw
            .children
            .iter()
            .map(|child| self.assign(child, Some(id)))
            .collect();
        node
    }

    /// Normalize flat parent/child links.
    ///
    /// With `attribute_fields`, those fields are copied from the link that
    /// creates the child's record. A record first seen as a parent keeps no
    /// attributes.
    #[instrument(level = "debug", skip_all, fields(links = links.len()))]
    pub fn from_links(
        &mut self,
        links: &[LinkRecord],
        attribute_fields: Option<&[String]>,
    ) -> NormalizeResult<TreeNode> {
        if links.is_empty() {
            return Err(ValidationError::EmptyLinks);
        }

        let mut records: Vec<LinkedRecord<'_>> = Vec::new();
        let mut by_name: HashMap<&str, usize> = HashMap::new();

        for link in links {
            if link.parent == link.child {
                return Err(ValidationError::Cycle(link.child.clone()));
            }

            let (parent, _) = Self::intern(&link.parent, &mut records, &mut by_name);
            let (child, created) = Self::intern(&link.child, &mut records, &mut by_name);

            match records[child].parent {
                Some(existing) if existing == parent => {
                    trace!(parent = %link.parent, child = %link.child, "ignoring repeated link");
                    continue;
                }
                Some(existing) => {
                    return Err(ValidationError::DuplicateChild {
                        child: link.child.clone(),
                        first: records[existing].name.to_string(),
                        second: link.parent.clone(),
                    });
                }
                None => {}
            }

            records[child].parent = Some(parent);
            records[parent].children.push(child);
            if let Some(fields) = attribute_fields.filter(|_| created) {
                records[child].attributes = Self::extract_fields(link, fields);
            }
        }

        let roots: Vec<usize> = (0..records.len())
            .filter(|&i| records[i].parent.is_none())
            .collect();
        let root = match roots.as_slice() {
            [] => return Err(ValidationError::NoRoot),
            [root] => *root,
            many => {
                return Err(ValidationError::MultipleRoots(
                    many.iter().map(|&i| records[i].name.to_string()).collect(),
                ));
            }
        };

        Self::check_acyclic(&records)?;

        // Validation is done; ids follow record creation order.
        let ids: Vec<NodeId> = records.iter().map(|_| self.allocate()).collect();
        let tree = Self::assemble(root, &mut records, &ids);
        debug!(root = %tree.name, nodes = tree.node_count(), "normalized flat links");
        Ok(tree)
    }

    fn intern<'a>(
        name: &'a str,
        records: &mut Vec<LinkedRecord<'a>>,
        by_name: &mut HashMap<&'a str, usize>,
    ) -> (usize, bool) {
        if let Some(&index) = by_name.get(name) {
            return (index, false);
        }
        records.push(LinkedRecord::new(name));
        by_name.insert(name, records.len() - 1);
        (records.len() - 1, true)
    }

    fn extract_fields(link: &LinkRecord, fields: &[String]) -> Attributes {
        fields
            .iter()
            .filter_map(|field| match link.fields.get(field)? {
                LinkField::Scalar(value) => Some((field.clone(), value.clone())),
                LinkField::Other(_) => {
                    trace!(%field, child = %link.child, "skipping non-scalar field");
                    None
                }
            })
            .collect()
    }

    /// Reject loops detached from the root, which survive the single-parent
    /// and single-root checks.
    fn check_acyclic(records: &[LinkedRecord<'_>]) -> NormalizeResult<()> {
        let mut graph: StableDiGraph<usize, ()> =
            StableDiGraph::with_capacity(records.len(), records.len());
        let indices: Vec<NodeIndex> = (0..records.len()).map(|i| graph.add_node(i)).collect();

        for (i, record) in records.iter().enumerate() {
            for &child in &record.children {
                graph.add_edge(indices[i], indices[child], ());
            }
        }

        toposort(&graph, None).map(|_| ()).map_err(|cycle| {
            let record = graph[cycle.node_id()];
            ValidationError::Cycle(records[record].name.to_string())
        })
    }

    fn assemble(index: usize, records: &mut [LinkedRecord<'_>], ids: &[NodeId]) -> TreeNode {
        let record = &mut records[index];
        let mut node = TreeNode::new(ids[index], record.name, record.parent.map(|p| ids[p]));
        node.attributes = std::mem::take(&mut record.attributes);
        let children = std::mem::take(&mut record.children);

        node.children = children
            .into_iter()
            .map(|child| Self::assemble(child, records, ids))
            .collect();
        node
    }
}
