//! Local bounds, integrality, incumbent and pruning.

use solver_lp::{Bounds, Direction, VarStatus};

use super::SearchTree;
use crate::master::MasterBackend;
use crate::model::Incumbent;

/// Tolerance within which an LP objective counts as already integral.
const INT_OBJ_TOL: f64 = 1e-5;

impl<L: MasterBackend> SearchTree<L> {
    fn live_slot(&self, op: &str) -> usize {
        match self.curr {
            Some(p) => p,
            None => panic!("{}: no current node", op),
        }
    }

    /// Set the live node's local bound from the LP objective.
    ///
    /// With an integral objective a fractional value is rounded towards
    /// the worse side. The bound never improves on the one inherited from
    /// the parent.
    pub fn set_local_bound(&mut self) -> f64 {
        let p = self.live_slot("set_local_bound");
        let mut bound = self.lp.objective_value();
        if self.int_obj {
            let nearest = (bound + 0.5).floor();
            if (bound - nearest).abs() <= INT_OBJ_TOL {
                bound = nearest;
            } else {
                bound = match self.dir {
                    Direction::Minimize => bound.ceil(),
                    Direction::Maximize => bound.floor(),
                };
            }
        }
        let node = self.arena.get_mut(p);
        if self.dir.better(bound, node.bound) {
            bound = node.bound;
        }
        node.bound = bound;
        log::debug!("node {}: local bound {:.9e}", p, bound);
        bound
    }

    /// True unless the local bound of `p` proves the subtree cannot beat
    /// the incumbent by more than `tol_obj * (1 + |best|)`.
    pub(crate) fn is_hopeful(&self, p: usize, tol_obj: f64) -> bool {
        let Some(best) = self.best() else {
            return true;
        };
        let bound = self.arena.get(p).bound;
        let eps = tol_obj * (1.0 + best.abs());
        match self.dir {
            Direction::Minimize => bound < best - eps,
            Direction::Maximize => bound > best + eps,
        }
    }

    /// Check the integer columns of the live node's basic solution.
    ///
    /// Basic integer columns further than `tol_int` from both their bounds
    /// and the nearest integer are flagged fractional; the count and the
    /// sum of their distances to the nearest integer are stored on the
    /// node. Returns the count.
    pub fn check_integrality(&mut self, tol_int: f64) -> usize {
        let p = self.live_slot("check_integrality");
        let m = self.m;
        let mut ii_cnt = 0;
        let mut ii_sum = 0.0;

        for j in 0..self.n {
            self.fractional[j] = false;
            if !self.int_col[j] || self.lp.status(m + j) != VarStatus::Basic {
                continue;
            }
            let b = self.lp.bounds(m + j);
            let x = self.lp.primal(m + j);
            if b.has_lower() && (x - b.lb()).abs() <= tol_int {
                continue;
            }
            if b.has_upper() && (x - b.ub()).abs() <= tol_int {
                continue;
            }
            if (x - (x + 0.5).floor()).abs() <= tol_int {
                continue;
            }
            self.fractional[j] = true;
            ii_cnt += 1;
            ii_sum += (x - x.floor()).min(x.ceil() - x);
        }

        let node = self.arena.get_mut(p);
        node.ii_cnt = ii_cnt;
        node.ii_sum = ii_sum;
        match ii_cnt {
            0 => log::debug!("node {}: no fractional columns", p),
            _ => log::debug!(
                "node {}: {} fractional column(s), integer infeasibility {:.3e}",
                p,
                ii_cnt,
                ii_sum
            ),
        }
        ii_cnt
    }

    /// True if column `j` was fractional at the last integrality check.
    pub fn is_fractional(&self, j: usize) -> bool {
        self.fractional[j]
    }

    /// Columns flagged by the last integrality check, in index order.
    pub fn fractional_columns(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.n).filter(move |&j| self.fractional[j])
    }

    /// Copy the live basic solution into the incumbent.
    ///
    /// Integer columns are rounded. Does nothing and returns false when
    /// the solution does not improve on the current incumbent.
    pub fn record_solution(&mut self) -> bool {
        self.live_slot("record_solution");
        let obj_val = self.lp.objective_value();
        if let Some(best) = self.best() {
            if !self.dir.better(obj_val, best) {
                return false;
            }
        }

        let m = self.m;
        let row_values = (0..m).map(|i| self.lp.primal(i)).collect();
        let col_values = (0..self.n)
            .map(|j| {
                let x = self.lp.primal(m + j);
                if self.int_col[j] {
                    (x + 0.5).floor()
                } else {
                    x
                }
            })
            .collect();

        self.incumbent = Some(Incumbent {
            obj_val,
            row_values,
            col_values,
        });
        self.incumbent_updates += 1;
        true
    }

    /// Fix non-basic integer columns of the live node whose reduced cost
    /// shows that leaving their current bound cannot beat the incumbent.
    ///
    /// The basic solution stays optimal. Returns the number of columns
    /// fixed.
    pub fn fix_by_red_cost(&mut self) -> usize {
        self.live_slot("fix_by_red_cost");
        let Some(best) = self.best() else {
            return 0;
        };
        let obj = self.lp.objective_value();
        let m = self.m;
        let mut fixed = 0;

        for j in 0..self.n {
            if !self.int_col[j] {
                continue;
            }
            let k = m + j;
            let b = self.lp.bounds(k);
            let dj = self.lp.dual(k);
            let target = match (self.dir, self.lp.status(k)) {
                (Direction::Minimize, VarStatus::AtLower) => {
                    (obj + dj.max(0.0) >= best).then(|| b.lb())
                }
                (Direction::Minimize, VarStatus::AtUpper) => {
                    (obj - dj.min(0.0) >= best).then(|| b.ub())
                }
                (Direction::Maximize, VarStatus::AtLower) => {
                    (obj + dj.min(0.0) <= best).then(|| b.lb())
                }
                (Direction::Maximize, VarStatus::AtUpper) => {
                    (obj - dj.max(0.0) <= best).then(|| b.ub())
                }
                _ => None,
            };
            if let Some(value) = target {
                self.lp.set_bounds(k, Bounds::fixed(value));
                fixed += 1;
            }
        }

        if fixed > 0 {
            log::debug!("{} column(s) fixed by reduced cost", fixed);
        }
        fixed
    }

    /// Delete every active node that cannot beat the incumbent.
    ///
    /// Returns the number of active nodes removed.
    pub fn cleanup(&mut self, tol_obj: f64) -> usize {
        if self.incumbent.is_none() {
            return 0;
        }
        let hopeless: Vec<usize> = self
            .active
            .iter(&self.arena)
            .filter(|&p| Some(p) != self.curr && !self.is_hopeful(p, tol_obj))
            .collect();
        for &p in &hopeless {
            self.delete(self.arena.node_ref(p));
        }
        if !hopeless.is_empty() {
            log::debug!("{} hopeless branch(es) pruned", hopeless.len());
        }
        hopeless.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use solver_lp::{sparse, SimplexLp, SolveExit};

    // max 5 x1 + 4 x2  s.t.  3 x1 + 2 x2 <= 4,  x1, x2 in [0, 1]
    // LP optimum: x2 = 1, x1 = 2/3, objective 22/3.
    fn knapsack() -> SearchTree<SimplexLp> {
        let mut lp = SimplexLp::new(1, 2, Direction::Maximize).unwrap();
        lp.load_matrix(&sparse::from_dense_rows(&[vec![3.0, 2.0]])).unwrap();
        lp.set_obj_coef(0, 5.0);
        lp.set_obj_coef(1, 4.0);
        lp.set_bounds(0, Bounds::upper(4.0));
        lp.set_bounds(1, Bounds::double(0.0, 1.0));
        lp.set_bounds(2, Bounds::double(0.0, 1.0));

        let mut tree = SearchTree::new(lp);
        tree.set_int_col(0, true);
        tree.set_int_col(1, true);
        tree
    }

    fn solved_root() -> SearchTree<SimplexLp> {
        let mut tree = knapsack();
        tree.revive(tree.root().unwrap());
        assert_eq!(tree.solve_node().unwrap(), SolveExit::Ok);
        tree
    }

    fn incumbent(obj_val: f64) -> Option<Incumbent> {
        Some(Incumbent {
            obj_val,
            row_values: vec![0.0],
            col_values: vec![0.0, 0.0],
        })
    }

    #[test]
    fn test_check_integrality() {
        let mut tree = solved_root();
        assert_eq!(tree.check_integrality(1e-5), 1);
        assert!(tree.is_fractional(0));
        assert!(!tree.is_fractional(1));
        assert_eq!(tree.fractional_columns().collect::<Vec<_>>(), vec![0]);

        let root = tree.node(tree.root().unwrap());
        assert_eq!(root.ii_cnt(), 1);
        assert!((root.ii_sum() - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_continuous_columns_are_ignored() {
        let mut tree = solved_root();
        tree.set_int_col(0, false);
        assert_eq!(tree.check_integrality(1e-5), 0);
        assert!(!tree.is_fractional(0));
    }

    #[test]
    fn test_local_bound_rounding() {
        let mut tree = solved_root();
        let bound = tree.set_local_bound();
        assert!((bound - 22.0 / 3.0).abs() < 1e-9);

        tree.set_int_obj(true);
        assert_eq!(tree.set_local_bound(), 7.0);
        assert_eq!(tree.node(tree.root().unwrap()).bound(), 7.0);
    }

    #[test]
    fn test_child_bound_never_beats_parent() {
        let mut tree = knapsack();
        let root = tree.root().unwrap();
        let kids = tree.clone_node(root, 1);
        tree.arena.get_mut(kids[0].slot).bound = 7.0;

        tree.revive(kids[0]);
        tree.solve_node().unwrap();
        assert!(tree.lp().objective_value() > 7.0);
        assert_eq!(tree.set_local_bound(), 7.0);
    }

    #[test]
    fn test_hopefulness() {
        let mut tree = solved_root();
        tree.set_int_obj(true);
        tree.set_local_bound();
        let root = tree.root().unwrap().number();
        assert!(tree.is_hopeful(root, 1e-7));

        tree.incumbent = incumbent(6.0);
        assert!(tree.is_hopeful(root, 1e-7));
        tree.incumbent = incumbent(7.0);
        assert!(!tree.is_hopeful(root, 1e-7));
    }

    #[test]
    fn test_record_solution_rounds_integer_columns() {
        let mut tree = solved_root();
        assert!(tree.record_solution());
        let inc = tree.incumbent().unwrap();
        assert_eq!(inc.col_values, vec![1.0, 1.0]);
        assert!((inc.row_values[0] - 4.0).abs() < 1e-9);
        assert_eq!(tree.incumbent_updates(), 1);

        // Same objective again is no improvement.
        assert!(!tree.record_solution());
        assert_eq!(tree.incumbent_updates(), 1);
    }

    #[test]
    fn test_fix_by_red_cost() {
        // x2 sits at its upper bound with reduced cost 2/3.
        let mut tree = solved_root();
        tree.incumbent = incumbent(6.0);
        assert_eq!(tree.fix_by_red_cost(), 0);

        tree.incumbent = incumbent(7.0);
        assert_eq!(tree.fix_by_red_cost(), 1);
        assert_eq!(tree.lp().bounds(2), Bounds::fixed(1.0));
        assert_eq!(tree.lp().status(2), VarStatus::Fixed);

        // The fixing is part of the node's delta.
        tree.freeze();
        assert_eq!(
            tree.node(tree.root().unwrap()).delta().bounds(2),
            Some(Bounds::fixed(1.0))
        );
    }

    #[test]
    fn test_cleanup_prunes_hopeless_nodes() {
        let mut tree = knapsack();
        let root = tree.root().unwrap();
        let kids = tree.clone_node(root, 3);
        for (r, bound) in kids.iter().zip([9.0, 6.5, 8.0]) {
            tree.arena.get_mut(r.slot).bound = bound;
        }
        assert_eq!(tree.cleanup(1e-7), 0);

        tree.incumbent = incumbent(8.0);
        assert_eq!(tree.cleanup(1e-7), 2);
        assert_eq!(tree.active_nodes().collect::<Vec<_>>(), vec![kids[0]]);
        assert_eq!(tree.node(root).children(), 1);
    }
}
