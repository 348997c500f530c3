//! Search node representation.

use std::fmt;

use super::DeltaSet;

/// Reference to a node of the search tree.
///
/// The number is the node's slot; slots are reused after deletion, so a
/// reference also carries the generation of the slot it was issued for.
/// Using a reference to a deleted node panics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeRef {
    pub(crate) slot: usize,
    pub(crate) generation: u32,
}

impl NodeRef {
    /// Reference number (slot index, the root is 1).
    pub fn number(&self) -> usize {
        self.slot
    }
}

impl fmt::Display for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.slot)
    }
}

/// A node in the B&B search tree.
#[derive(Debug, Clone)]
pub struct SearchNode {
    /// Parent slot (None for root).
    pub(crate) parent: Option<usize>,

    /// Depth in the tree (root = 0).
    pub(crate) level: usize,

    /// Number of children; zero for active (leaf) nodes.
    pub(crate) count: usize,

    /// Attribute changes versus the parent, filled by freeze.
    pub(crate) delta: DeltaSet,

    /// Local bound on the objective of the subtree.
    pub(crate) bound: f64,

    /// Number of integer infeasibilities of the last solution.
    pub(crate) ii_cnt: usize,

    /// Sum of integer infeasibilities of the last solution.
    pub(crate) ii_sum: f64,

    /// Previous node in the active list.
    pub(crate) prev: Option<usize>,

    /// Next node in the active list.
    pub(crate) next: Option<usize>,
}

impl SearchNode {
    /// Root node with the given local bound.
    pub(crate) fn root(bound: f64) -> Self {
        Self {
            parent: None,
            level: 0,
            count: 0,
            delta: DeltaSet::new(),
            bound,
            ii_cnt: 0,
            ii_sum: 0.0,
            prev: None,
            next: None,
        }
    }

    /// Fresh child of the node stored in `parent`.
    pub(crate) fn child(parent: usize, of: &SearchNode) -> Self {
        Self {
            parent: Some(parent),
            level: of.level + 1,
            ..Self::root(of.bound)
        }
    }

    /// Depth in the tree.
    pub fn level(&self) -> usize {
        self.level
    }

    /// Number of children.
    pub fn children(&self) -> usize {
        self.count
    }

    /// True for active (leaf) nodes.
    pub fn is_active(&self) -> bool {
        self.count == 0
    }

    /// Stored attribute changes versus the parent.
    pub fn delta(&self) -> &DeltaSet {
        &self.delta
    }

    /// Local bound.
    pub fn bound(&self) -> f64 {
        self.bound
    }

    /// Number of fractional integer columns at the last solve.
    pub fn ii_cnt(&self) -> usize {
        self.ii_cnt
    }

    /// Sum of integer infeasibilities at the last solve.
    pub fn ii_sum(&self) -> f64 {
        self.ii_sum
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_child_inherits_bound() {
        let mut root = SearchNode::root(-f64::MAX);
        root.bound = 3.5;
        root.ii_cnt = 2;
        root.ii_sum = 0.7;

        let child = SearchNode::child(1, &root);
        assert_eq!(child.parent, Some(1));
        assert_eq!(child.level(), 1);
        assert_eq!(child.bound(), 3.5);
        assert_eq!(child.ii_cnt(), 0);
        assert!(child.is_active());
        assert!(child.delta().is_empty());
    }
}
