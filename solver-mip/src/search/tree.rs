//! Branch-and-bound tree.
//!
//! Only active (leaf) subproblems are ever solved. Every node stores the
//! changes of row/column attributes relative to its parent, so the state
//! of any node is rebuilt by resetting the LP to a standard state and
//! replaying the deltas on the path from the root. At most one node is
//! live (its state loaded into the LP) at any time.

use solver_lp::{Direction, SolveExit};

use super::active::ActiveList;
use super::arena::NodeArena;
use super::{NodeRef, SearchNode, Snapshot};
use crate::error::MipResult;
use crate::master::MasterBackend;
use crate::model::Incumbent;

/// Slot of the root node.
const ROOT: usize = 1;

/// Search tree together with the LP relaxation it drives.
pub struct SearchTree<L> {
    /// Number of rows.
    pub(super) m: usize,

    /// Number of columns.
    pub(super) n: usize,

    /// Optimization direction.
    pub(super) dir: Direction,

    /// LP relaxation holding the state of the live node.
    pub(super) lp: L,

    /// Node slots.
    pub(super) arena: NodeArena,

    /// Active (leaf) nodes in creation order.
    pub(super) active: ActiveList,

    /// Nodes created since the tree was built.
    created: u64,

    /// Slot of the live node.
    pub(super) curr: Option<usize>,

    /// Attributes of the live node's parent, captured by revive.
    baseline: Option<Snapshot>,

    /// State every revive starts from.
    standard: Snapshot,

    /// Integer column flags.
    pub(super) int_col: Vec<bool>,

    /// The objective takes integral values on integer feasible points.
    pub(super) int_obj: bool,

    /// Columns found fractional by the last integrality check.
    pub(super) fractional: Vec<bool>,

    /// Best integer feasible solution.
    pub(super) incumbent: Option<Incumbent>,

    /// Number of times the incumbent was replaced.
    pub(super) incumbent_updates: u64,
}

impl<L: MasterBackend> SearchTree<L> {
    /// Create a tree whose frozen root holds the LP's current attributes.
    ///
    /// All columns start continuous.
    pub fn new(lp: L) -> Self {
        let (m, n, dir) = (lp.num_rows(), lp.num_cols(), lp.direction());
        assert!(m >= 1, "create: invalid number of rows {}", m);
        assert!(n >= 1, "create: invalid number of columns {}", n);

        let standard = Snapshot::standard(m, n);
        let mut root = SearchNode::root(dir.no_bound());
        root.delta = standard.diff(&lp);

        let mut arena = NodeArena::new();
        let r = arena.insert(root);
        debug_assert_eq!(r.slot, ROOT);
        let mut active = ActiveList::default();
        active.push_back(&mut arena, r.slot);

        Self {
            m,
            n,
            dir,
            lp,
            arena,
            active,
            created: 1,
            curr: None,
            baseline: None,
            standard,
            int_col: vec![false; n],
            int_obj: false,
            fractional: vec![false; n],
            incumbent: None,
            incumbent_updates: 0,
        }
    }

    /// Number of rows.
    pub fn num_rows(&self) -> usize {
        self.m
    }

    /// Number of columns.
    pub fn num_cols(&self) -> usize {
        self.n
    }

    /// Optimization direction.
    pub fn direction(&self) -> Direction {
        self.dir
    }

    /// LP relaxation.
    pub fn lp(&self) -> &L {
        &self.lp
    }

    /// Mutable LP relaxation; changes made while a node is live are
    /// recorded by the next freeze.
    pub fn lp_mut(&mut self) -> &mut L {
        &mut self.lp
    }

    /// Take the LP relaxation out of the tree.
    pub fn into_lp(self) -> L {
        self.lp
    }

    /// Mark column `j` as integer or continuous.
    pub fn set_int_col(&mut self, j: usize, integer: bool) {
        self.int_col[j] = integer;
    }

    /// True if column `j` is integer.
    pub fn is_int_col(&self, j: usize) -> bool {
        self.int_col[j]
    }

    /// Declare that the objective is integral on integer feasible points.
    pub fn set_int_obj(&mut self, integral: bool) {
        self.int_obj = integral;
    }

    /// True if local bounds may be rounded.
    pub fn int_obj(&self) -> bool {
        self.int_obj
    }

    /// Root node, unless the tree is empty.
    pub fn root(&self) -> Option<NodeRef> {
        self.arena
            .contains(ROOT)
            .then(|| self.arena.node_ref(ROOT))
    }

    /// Node behind a reference.
    pub fn node(&self, r: NodeRef) -> &SearchNode {
        self.arena.get(self.arena.resolve(r))
    }

    /// Parent of a node.
    pub fn parent(&self, r: NodeRef) -> Option<NodeRef> {
        self.node(r).parent.map(|p| self.arena.node_ref(p))
    }

    /// Live node.
    pub fn current(&self) -> Option<NodeRef> {
        self.curr.map(|p| self.arena.node_ref(p))
    }

    /// Active nodes from oldest to newest.
    pub fn active_nodes(&self) -> impl Iterator<Item = NodeRef> + '_ {
        self.active
            .iter(&self.arena)
            .map(move |p| self.arena.node_ref(p))
    }

    /// Oldest active node.
    pub fn head(&self) -> Option<NodeRef> {
        self.active.head().map(|p| self.arena.node_ref(p))
    }

    /// Newest active node.
    pub fn tail(&self) -> Option<NodeRef> {
        self.active.tail().map(|p| self.arena.node_ref(p))
    }

    /// Number of active nodes.
    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Number of nodes in the tree (active and inactive).
    pub fn alive_count(&self) -> usize {
        self.arena.len()
    }

    /// Number of nodes created so far.
    pub fn created_count(&self) -> u64 {
        self.created
    }

    /// Number of nodes removed from the tree so far.
    pub fn explored_count(&self) -> u64 {
        self.created - self.arena.len() as u64
    }

    /// Load the state of active node `r` into the LP and make it live.
    pub fn revive(&mut self, r: NodeRef) {
        let p = self.arena.resolve(r);
        if let Some(c) = self.curr {
            panic!("revive: node {} requested while node {} is current", p, c);
        }
        if self.arena.get(p).count != 0 {
            panic!("revive: node {} is not active", p);
        }

        let mut path = Vec::with_capacity(self.arena.get(p).level + 1);
        let mut q = Some(p);
        while let Some(s) = q {
            path.push(s);
            q = self.arena.get(s).parent;
        }
        path.reverse();

        self.standard.restore(&mut self.lp);
        for &s in &path {
            if s == p {
                self.baseline = Some(Snapshot::capture(&self.lp));
            }
            self.arena.get(s).delta.apply(&mut self.lp);
        }

        self.arena.get_mut(p).delta.clear();
        self.curr = Some(p);
        log::trace!("revived node {} at level {}", p, path.len() - 1);
    }

    /// Store the live node's changes as its delta and make it frozen.
    pub fn freeze(&mut self) {
        let Some(p) = self.curr.take() else {
            panic!("freeze: no current node");
        };
        let Some(baseline) = self.baseline.take() else {
            panic!("freeze: node {} has no baseline", p);
        };
        let delta = baseline.diff(&self.lp);
        self.arena.get_mut(p).delta = delta;
    }

    /// Replace active node `r` by `k` new active children.
    ///
    /// Children inherit the local bound and are appended to the active
    /// list in creation order.
    pub fn clone_node(&mut self, r: NodeRef, k: usize) -> Vec<NodeRef> {
        let p = self.arena.resolve(r);
        if self.arena.get(p).count != 0 {
            panic!("clone: node {} is not active", p);
        }
        if self.curr == Some(p) {
            panic!("clone: node {} is current", p);
        }
        if k < 1 {
            panic!("clone: invalid number of children {}", k);
        }

        self.active.unlink(&mut self.arena, p);
        self.arena.get_mut(p).count = k;

        (0..k)
            .map(|_| {
                let child = SearchNode::child(p, self.arena.get(p));
                let c = self.arena.insert(child);
                self.active.push_back(&mut self.arena, c.slot);
                self.created += 1;
                c
            })
            .collect()
    }

    /// Remove active node `r`; parents left without children go too.
    pub fn delete(&mut self, r: NodeRef) {
        let mut p = self.arena.resolve(r);
        if self.arena.get(p).count != 0 {
            panic!("delete: node {} is not active", p);
        }
        if self.curr == Some(p) {
            panic!("delete: node {} is current", p);
        }

        self.active.unlink(&mut self.arena, p);
        loop {
            let node = self.arena.remove(p);
            let Some(parent) = node.parent else {
                break;
            };
            let up = self.arena.get_mut(parent);
            debug_assert!(up.count > 0);
            up.count -= 1;
            if up.count > 0 {
                break;
            }
            p = parent;
        }
    }

    /// Highest-level common ancestor of all active nodes.
    ///
    /// Walking down from the root, the first node with a child count
    /// other than one; `None` for an empty tree.
    pub fn pseudo_root(&self) -> Option<NodeRef> {
        if !self.arena.contains(ROOT) {
            return None;
        }
        let head = self.active.head()?;

        let mut path = Vec::new();
        let mut q = Some(head);
        while let Some(s) = q {
            path.push(s);
            q = self.arena.get(s).parent;
        }
        path.into_iter()
            .rev()
            .find(|&s| self.arena.get(s).count != 1)
            .map(|s| self.arena.node_ref(s))
    }

    /// Active node with the best local bound (first one on ties).
    pub fn best_node(&self) -> Option<NodeRef> {
        let mut best: Option<usize> = None;
        for p in self.active.iter(&self.arena) {
            let bound = self.arena.get(p).bound;
            if best.map_or(true, |b| self.dir.better(bound, self.arena.get(b).bound)) {
                best = Some(p);
            }
        }
        best.map(|p| self.arena.node_ref(p))
    }

    /// Best local bound over the active nodes.
    pub fn best_bound(&self) -> Option<f64> {
        self.best_node().map(|r| self.node(r).bound)
    }

    /// Relative gap `|best - bound| / (|best| + eps)` between incumbent
    /// and best local bound.
    ///
    /// Zero for an empty tree and `f64::MAX` before an incumbent exists.
    pub fn relative_gap(&self) -> f64 {
        let Some(best) = self.best() else {
            return f64::MAX;
        };
        match self.best_bound() {
            None => 0.0,
            Some(bound) => (best - bound).abs() / (best.abs() + f64::EPSILON),
        }
    }

    /// Best integer feasible solution found so far.
    pub fn incumbent(&self) -> Option<&Incumbent> {
        self.incumbent.as_ref()
    }

    /// Objective value of the incumbent.
    pub fn best(&self) -> Option<f64> {
        self.incumbent.as_ref().map(|inc| inc.obj_val)
    }

    /// Number of times the incumbent was replaced.
    pub fn incumbent_updates(&self) -> u64 {
        self.incumbent_updates
    }

    /// Take the incumbent out of the tree.
    pub fn take_incumbent(&mut self) -> Option<Incumbent> {
        self.incumbent.take()
    }

    /// Solve the relaxation of the live node.
    ///
    /// Once an incumbent exists, the LP may stop early when the node
    /// cannot beat it.
    pub fn solve_node(&mut self) -> MipResult<SolveExit> {
        if self.curr.is_none() {
            panic!("solve: no current node");
        }
        self.lp.set_objective_limit(self.best());
        self.lp.solve()
    }
}
