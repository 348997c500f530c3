//! Chronological list of active subproblems.

use super::arena::NodeArena;

/// Doubly linked list threaded through the `prev`/`next` fields of the
/// nodes; head is the oldest active node, tail the newest.
#[derive(Debug, Default)]
pub(crate) struct ActiveList {
    head: Option<usize>,
    tail: Option<usize>,
    len: usize,
}

impl ActiveList {
    pub(crate) fn head(&self) -> Option<usize> {
        self.head
    }

    pub(crate) fn tail(&self) -> Option<usize> {
        self.tail
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn push_back(&mut self, arena: &mut NodeArena, p: usize) {
        let node = arena.get_mut(p);
        node.prev = self.tail;
        node.next = None;
        match self.tail {
            Some(t) => arena.get_mut(t).next = Some(p),
            None => self.head = Some(p),
        }
        self.tail = Some(p);
        self.len += 1;
    }

    pub(crate) fn unlink(&mut self, arena: &mut NodeArena, p: usize) {
        let node = arena.get_mut(p);
        let (prev, next) = (node.prev.take(), node.next.take());
        match prev {
            Some(q) => arena.get_mut(q).next = next,
            None => self.head = next,
        }
        match next {
            Some(q) => arena.get_mut(q).prev = prev,
            None => self.tail = prev,
        }
        self.len -= 1;
    }

    /// Slots from head to tail.
    pub(crate) fn iter<'a>(&self, arena: &'a NodeArena) -> impl Iterator<Item = usize> + 'a {
        std::iter::successors(self.head, move |&p| arena.get(p).next)
    }
}
