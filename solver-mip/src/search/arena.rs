//! Slot table holding the nodes of the search tree.

use super::{NodeRef, SearchNode};

struct Slot {
    generation: u32,
    node: Option<SearchNode>,
}

/// Growable slot table; slot 0 is never used.
///
/// Freed slots go on a stack and are handed out again most recently
/// freed first.
pub(crate) struct NodeArena {
    slots: Vec<Slot>,
    avail: Vec<usize>,
    len: usize,
}

impl NodeArena {
    pub(crate) fn new() -> Self {
        Self {
            slots: vec![Slot {
                generation: 0,
                node: None,
            }],
            avail: Vec::new(),
            len: 0,
        }
    }

    /// Number of stored nodes.
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn insert(&mut self, node: SearchNode) -> NodeRef {
        let slot = match self.avail.pop() {
            Some(p) => p,
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    node: None,
                });
                self.slots.len() - 1
            }
        };
        debug_assert!(self.slots[slot].node.is_none());
        self.slots[slot].node = Some(node);
        self.len += 1;
        NodeRef {
            slot,
            generation: self.slots[slot].generation,
        }
    }

    pub(crate) fn remove(&mut self, p: usize) -> SearchNode {
        let slot = &mut self.slots[p];
        let Some(node) = slot.node.take() else {
            panic!("node {} does not exist", p);
        };
        slot.generation = slot.generation.wrapping_add(1);
        self.avail.push(p);
        self.len -= 1;
        node
    }

    /// Slot of a live reference.
    pub(crate) fn resolve(&self, r: NodeRef) -> usize {
        match self.slots.get(r.slot) {
            Some(slot) if slot.node.is_some() && slot.generation == r.generation => r.slot,
            _ => panic!("node reference {} is stale or invalid", r),
        }
    }

    /// Reference to the node stored in slot `p`.
    pub(crate) fn node_ref(&self, p: usize) -> NodeRef {
        NodeRef {
            slot: p,
            generation: self.slots[p].generation,
        }
    }

    pub(crate) fn contains(&self, p: usize) -> bool {
        self.slots.get(p).map_or(false, |s| s.node.is_some())
    }

    pub(crate) fn get(&self, p: usize) -> &SearchNode {
        match self.slots.get(p).and_then(|s| s.node.as_ref()) {
            Some(node) => node,
            None => panic!("node {} does not exist", p),
        }
    }

    pub(crate) fn get_mut(&mut self, p: usize) -> &mut SearchNode {
        match self.slots.get_mut(p).and_then(|s| s.node.as_mut()) {
            Some(node) => node,
            None => panic!("node {} does not exist", p),
        }
    }
}
