//! Attribute deltas stored by frozen subproblems.

use std::collections::BTreeMap;

use solver_lp::{Bounds, VarStatus};

use crate::master::MasterBackend;

/// Changes of row/column attributes of a node relative to its parent.
///
/// At most one bound change and one status change is kept per variable.
/// Changes are replayed in ordinal order, bounds before statuses.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeltaSet {
    bounds: BTreeMap<usize, Bounds>,
    status: BTreeMap<usize, VarStatus>,
}

impl DeltaSet {
    /// Create an empty delta.
    pub fn new() -> Self {
        Self::default()
    }

    /// True if nothing changed.
    pub fn is_empty(&self) -> bool {
        self.bounds.is_empty() && self.status.is_empty()
    }

    /// Number of bound changes.
    pub fn num_bounds(&self) -> usize {
        self.bounds.len()
    }

    /// Number of status changes.
    pub fn num_status(&self) -> usize {
        self.status.len()
    }

    /// Record new bounds of variable `k`.
    pub fn set_bounds(&mut self, k: usize, bounds: Bounds) {
        self.bounds.insert(k, bounds);
    }

    /// Record a new status of variable `k`.
    pub fn set_status(&mut self, k: usize, status: VarStatus) {
        self.status.insert(k, status);
    }

    /// Recorded bounds of variable `k`.
    pub fn bounds(&self, k: usize) -> Option<Bounds> {
        self.bounds.get(&k).copied()
    }

    /// Recorded status of variable `k`.
    pub fn status(&self, k: usize) -> Option<VarStatus> {
        self.status.get(&k).copied()
    }

    /// Drop all changes.
    pub fn clear(&mut self) {
        self.bounds.clear();
        self.status.clear();
    }

    /// Replay the changes on the LP.
    pub fn apply<L: MasterBackend + ?Sized>(&self, lp: &mut L) {
        for (&k, &b) in &self.bounds {
            lp.set_bounds(k, b);
        }
        for (&k, &s) in &self.status {
            lp.set_status(k, s);
        }
    }
}

/// Bounds and statuses of every row and column of an LP.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    bounds: Vec<Bounds>,
    status: Vec<VarStatus>,
}

impl Snapshot {
    /// Copy the attributes out of the LP.
    pub fn capture<L: MasterBackend + ?Sized>(lp: &L) -> Self {
        let total = lp.num_rows() + lp.num_cols();
        Self {
            bounds: (0..total).map(|k| lp.bounds(k)).collect(),
            status: (0..total).map(|k| lp.status(k)).collect(),
        }
    }

    /// Standard attributes every revive starts from: free basic rows and
    /// columns fixed at zero.
    pub fn standard(m: usize, n: usize) -> Self {
        let mut bounds = vec![Bounds::free(); m];
        bounds.extend(std::iter::repeat(Bounds::fixed(0.0)).take(n));
        let mut status = vec![VarStatus::Basic; m];
        status.extend(std::iter::repeat(VarStatus::Fixed).take(n));
        Self { bounds, status }
    }

    /// Write the attributes back into the LP.
    pub fn restore<L: MasterBackend + ?Sized>(&self, lp: &mut L) {
        for (k, &b) in self.bounds.iter().enumerate() {
            lp.set_bounds(k, b);
        }
        for (k, &s) in self.status.iter().enumerate() {
            lp.set_status(k, s);
        }
    }

    /// Changes that turn this snapshot into the LP's current attributes.
    pub fn diff<L: MasterBackend + ?Sized>(&self, lp: &L) -> DeltaSet {
        let mut delta = DeltaSet::new();
        for k in 0..self.bounds.len() {
            let b = lp.bounds(k);
            if b != self.bounds[k] {
                delta.set_bounds(k, b);
            }
            let s = lp.status(k);
            if s != self.status[k] {
                delta.set_status(k, s);
            }
        }
        delta
    }
}
