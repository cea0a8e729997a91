//! Ordered node set with range queries.

use crate::arc::Node;
use std::collections::BTreeSet;
use std::ops::Bound;

/// Ascending set of length coordinates. Grows monotonically while a network
/// is built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeSet {
    nodes: BTreeSet<Node>,
}

impl NodeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `node`, returning whether it was new.
    pub fn insert(&mut self, node: Node) -> bool {
        self.nodes.insert(node)
    }

    pub fn contains(&self, node: Node) -> bool {
        self.nodes.contains(&node)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = Node> + '_ {
        self.nodes.iter().copied()
    }

    pub fn iter_desc(&self) -> impl Iterator<Item = Node> + '_ {
        self.nodes.iter().rev().copied()
    }

    /// Descending copy of the current contents, detached from later inserts.
    pub fn snapshot_desc(&self) -> Vec<Node> {
        self.iter_desc().collect()
    }

    /// Nodes in `[lo, hi]`, ascending. Empty when `lo > hi`.
    pub fn range(&self, lo: Node, hi: Node) -> impl DoubleEndedIterator<Item = Node> + '_ {
        let upper = if lo <= hi {
            Bound::Included(hi)
        } else {
            Bound::Excluded(lo)
        };
        self.nodes.range((Bound::Included(lo), upper)).copied()
    }

    /// Nodes in `[lo, hi]`, descending.
    pub fn range_desc(&self, lo: Node, hi: Node) -> impl Iterator<Item = Node> + '_ {
        self.range(lo, hi).rev()
    }

    pub fn min(&self) -> Option<Node> {
        self.nodes.first().copied()
    }

    pub fn max(&self) -> Option<Node> {
        self.nodes.last().copied()
    }
}

impl FromIterator<Node> for NodeSet {
    fn from_iter<I: IntoIterator<Item = Node>>(iter: I) -> Self {
        Self {
            nodes: iter.into_iter().collect(),
        }
    }
}
