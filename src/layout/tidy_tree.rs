//! Buchheim-Junger-Leipert tidy tree layout algorithm.
//!
//! Implements the O(n) algorithm from "Improving Walker's Algorithm to Run in
//! Linear Time" (Buchheim, Junger, Leipert, 2002) for laying out arbitrary
//! m-ary trees with compact, aesthetically pleasing positioning.
//!
//! The algorithm produces a (breadth, depth) pair per node. Breadth is in
//! separation units with the root at 0; the projector scales it by the node
//! size and maps it onto the configured orientation.
//!
//! # Algorithm Overview
//!
//! 1. **First walk (bottom-up):** Assign preliminary breadths to each node by
//!    merging subtree contours. Threads give O(1) amortized contour traversal.
//! 2. **Second walk (top-down):** Apply accumulated modifiers to convert
//!    preliminary breadths into final positions.
//!
//! Both walks are iterative over the pre-order node array, so deep chains do
//! not grow the call stack.

use tracing::trace;

/// Configuration for the tidy tree layout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TidyTreeConfig {
    /// Gap between two nodes that share a parent.
    pub sibling_separation: f32,
    /// Gap between two neighbouring nodes with different parents.
    pub non_sibling_separation: f32,
}

impl Default for TidyTreeConfig {
    fn default() -> Self {
        Self {
            sibling_separation: 1.0,
            non_sibling_separation: 2.0,
        }
    }
}

/// Internal node data used during the Buchheim algorithm.
#[derive(Debug)]
struct LayoutNode {
    parent: Option<usize>,
    children: Vec<usize>,
    /// Left-to-right index among siblings.
    number: usize,
    /// Preliminary breadth (from first walk).
    prelim: f32,
    /// Modifier for subtree shift (accumulated in first walk, applied in second).
    modifier: f32,
    shift: f32,
    change: f32,
    /// Contour thread for leaves.
    thread: Option<usize>,
    ancestor: usize,
}

impl LayoutNode {
    fn new(index: usize, parent: Option<usize>) -> Self {
        Self {
            parent,
            children: Vec::new(),
            number: 0,
            prelim: 0.0,
            modifier: 0.0,
            shift: 0.0,
            change: 0.0,
            thread: None,
            ancestor: index,
        }
    }
}

/// Result of the tidy tree layout computation, indexed like the input.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TidyTreeResult {
    /// Breadth in separation units; the root sits at 0.
    pub breadth: Vec<f32>,
    /// Distance from the root in levels.
    pub depth: Vec<u32>,
}

/// The tidy tree layout engine.
#[derive(Debug, Clone, Default)]
pub struct TidyTreeLayout {
    config: TidyTreeConfig,
}

impl TidyTreeLayout {
    /// Create a new tidy tree layout with the given configuration.
    pub fn new(config: TidyTreeConfig) -> Self {
        Self { config }
    }

    /// Create a tidy tree layout with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(TidyTreeConfig::default())
    }

    /// Compute the tidy tree layout.
    ///
    /// `parents[i]` is the parent index of node `i`. Index 0 is the root and
    /// every other entry must point to an earlier index, which any pre-order
    /// listing satisfies. Children are ordered by index. Entries breaking that
    /// rule are left at the origin and do not take part in the layout.
    pub fn compute(&self, parents: &[Option<usize>]) -> TidyTreeResult {
        let count = parents.len();
        if count == 0 {
            return TidyTreeResult::default();
        }

        let mut nodes: Vec<LayoutNode> = Vec::with_capacity(count);
        let mut depth = vec![0u32; count];
        nodes.push(LayoutNode::new(0, None));

        for (index, &parent) in parents.iter().enumerate().skip(1) {
            match parent {
                Some(p) if p < index && (p == 0 || nodes[p].parent.is_some()) => {
                    nodes.push(LayoutNode::new(index, Some(p)));
                    nodes[index].number = nodes[p].children.len();
                    nodes[p].children.push(index);
                    depth[index] = depth[p] + 1;
                }
                _ => {
                    trace!(index, ?parent, "node not attached to the root, skipping");
                    nodes.push(LayoutNode::new(index, None));
                }
            }
        }

        // Reverse pre-order visits every descendant before its ancestor.
        for v in (0..count).rev() {
            self.place_children(v, &mut nodes);
        }
        Self::execute_shifts(0, &mut nodes);
        if let (Some(&first), Some(&last)) = (nodes[0].children.first(), nodes[0].children.last()) {
            nodes[0].prelim = (nodes[first].prelim + nodes[last].prelim) / 2.0;
        }

        let breadth = Self::second_walk(&nodes);
        TidyTreeResult { breadth, depth }
    }

    /// First walk for each child of `v`, left to right.
    ///
    /// Every child's own subtree has already been placed.
    fn place_children(&self, v: usize, nodes: &mut [LayoutNode]) {
        let children = nodes[v].children.clone();
        let Some(&first) = children.first() else {
            return;
        };

        let mut default_ancestor = first;
        for (i, &child) in children.iter().enumerate() {
            let left_sibling = i.checked_sub(1).map(|j| children[j]);

            Self::execute_shifts(child, nodes);
            let midpoint = match (nodes[child].children.first(), nodes[child].children.last()) {
                (Some(&a), Some(&b)) => Some((nodes[a].prelim + nodes[b].prelim) / 2.0),
                _ => None,
            };

            match (left_sibling, midpoint) {
                (Some(w), Some(mid)) => {
                    nodes[child].prelim = nodes[w].prelim + self.separation(child, w, nodes);
                    nodes[child].modifier = nodes[child].prelim - mid;
                }
                (Some(w), None) => {
                    nodes[child].prelim = nodes[w].prelim + self.separation(child, w, nodes);
                }
                (None, Some(mid)) => nodes[child].prelim = mid,
                (None, None) => {}
            }

            if let Some(w) = left_sibling {
                default_ancestor = self.apportion(child, w, default_ancestor, nodes);
            }
        }
    }

    fn separation(&self, a: usize, b: usize, nodes: &[LayoutNode]) -> f32 {
        if nodes[a].parent == nodes[b].parent {
            self.config.sibling_separation
        } else {
            self.config.non_sibling_separation
        }
    }

    /// Next node on the left contour of a subtree.
    fn next_left(v: usize, nodes: &[LayoutNode]) -> Option<usize> {
        nodes[v].children.first().copied().or(nodes[v].thread)
    }

    /// Next node on the right contour of a subtree.
    fn next_right(v: usize, nodes: &[LayoutNode]) -> Option<usize> {
        nodes[v].children.last().copied().or(nodes[v].thread)
    }

    /// Push `v`'s subtree clear of every subtree to its left.
    ///
    /// `vim`/`vom` walk the inner and outer right contours on the left side,
    /// `vip`/`vop` the inner and outer left contours of `v`. Returns the new
    /// default ancestor.
    fn apportion(&self, v: usize, w: usize, mut ancestor: usize, nodes: &mut [LayoutNode]) -> usize {
        let leftmost = nodes[v]
            .parent
            .and_then(|p| nodes[p].children.first().copied())
            .unwrap_or(w);

        let (mut vip, mut vop, mut vim, mut vom) = (v, v, w, leftmost);
        let mut sip = nodes[vip].modifier;
        let mut sop = nodes[vop].modifier;
        let mut sim = nodes[vim].modifier;
        let mut som = nodes[vom].modifier;

        let mut next_im = Self::next_right(vim, nodes);
        let mut next_ip = Self::next_left(vip, nodes);

        while let (Some(im), Some(ip)) = (next_im, next_ip) {
            vim = im;
            vip = ip;
            vom = Self::next_left(vom, nodes).unwrap_or(vom);
            vop = Self::next_right(vop, nodes).unwrap_or(vop);
            nodes[vop].ancestor = v;

            let shift = nodes[vim].prelim + sim - nodes[vip].prelim - sip
                + self.separation(vim, vip, nodes);
            if shift > 0.0 {
                let wm = Self::next_ancestor(vim, v, ancestor, nodes);
                Self::move_subtree(wm, v, shift, nodes);
                sip += shift;
                sop += shift;
            }

            sim += nodes[vim].modifier;
            sip += nodes[vip].modifier;
            som += nodes[vom].modifier;
            sop += nodes[vop].modifier;

            next_im = Self::next_right(vim, nodes);
            next_ip = Self::next_left(vip, nodes);
        }

        // Thread the shallower side's contour into the deeper one.
        if let Some(im) = next_im {
            if Self::next_right(vop, nodes).is_none() {
                nodes[vop].thread = Some(im);
                nodes[vop].modifier += sim - sop;
            }
        }
        if let Some(ip) = next_ip {
            if Self::next_left(vom, nodes).is_none() {
                nodes[vom].thread = Some(ip);
                nodes[vom].modifier += sip - som;
                ancestor = v;
            }
        }

        ancestor
    }

    /// The sibling of `v` whose subtree contains `vim`, or the default ancestor.
    fn next_ancestor(vim: usize, v: usize, ancestor: usize, nodes: &[LayoutNode]) -> usize {
        let candidate = nodes[vim].ancestor;
        if nodes[candidate].parent == nodes[v].parent {
            candidate
        } else {
            ancestor
        }
    }

    /// Shift subtree `wr` right and record how the shift spreads over the
    /// siblings between `wl` and `wr`.
    fn move_subtree(wl: usize, wr: usize, shift: f32, nodes: &mut [LayoutNode]) {
        let subtrees = nodes[wr].number.saturating_sub(nodes[wl].number).max(1) as f32;
        let per_subtree = shift / subtrees;

        nodes[wr].change -= per_subtree;
        nodes[wr].shift += shift;
        nodes[wl].change += per_subtree;
        nodes[wr].prelim += shift;
        nodes[wr].modifier += shift;
    }

    /// Execute accumulated shifts for children of node v.
    fn execute_shifts(v: usize, nodes: &mut [LayoutNode]) {
        let mut shift = 0.0f32;
        let mut change = 0.0f32;

        for i in (0..nodes[v].children.len()).rev() {
            let child = nodes[v].children[i];
            nodes[child].prelim += shift;
            nodes[child].modifier += shift;
            change += nodes[child].change;
            shift += nodes[child].shift + change;
        }
    }

    /// Second walk: sum modifiers down the tree. The root is pinned to 0.
    fn second_walk(nodes: &[LayoutNode]) -> Vec<f32> {
        let mut breadth = vec![0.0f32; nodes.len()];
        let mut offset = vec![0.0f32; nodes.len()];
        offset[0] = nodes[0].modifier - nodes[0].prelim;

        for (index, node) in nodes.iter().enumerate().skip(1) {
            if let Some(parent) = node.parent {
                breadth[index] = node.prelim + offset[parent];
                offset[index] = node.modifier + offset[parent];
            }
        }
        breadth
    }
}
