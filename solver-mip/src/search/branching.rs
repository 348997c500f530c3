//! Branching variable selection.
//!
//! Every rule picks one fractional integer column of the live node and
//! the child to continue with; [`SearchTree::branch_on`] then splits the
//! node into a down branch (`x <= floor(beta)`) and an up branch
//! (`x >= ceil(beta)`).

use solver_lp::{BoundType, Bounds, Direction, Shift, VarStatus};

use super::{NodeRef, SearchTree};
use crate::error::MipResult;
use crate::master::MasterBackend;
use crate::settings::BranchingRule;

/// Pivot tolerance of the dual ratio test used for penalties.
const DRTOM_TOL: f64 = 1e-8;

/// A branching decision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BranchDecision {
    /// Column to branch on.
    pub col: usize,

    /// Child to solve next.
    pub next: Shift,

    /// Estimated objective degradation of the down and up branches
    /// (Driebeck-Tomlin only).
    pub degradation: Option<(f64, f64)>,
}

impl BranchDecision {
    fn closer_rounding(col: usize, beta: f64) -> Self {
        let next = if beta - beta.floor() < beta.ceil() - beta {
            Shift::Decrease
        } else {
            Shift::Increase
        };
        Self {
            col,
            next,
            degradation: None,
        }
    }
}

impl<L: MasterBackend> SearchTree<L> {
    /// Choose a branching column among the fractional ones.
    ///
    /// Returns `None` if the last integrality check found no fractional
    /// column.
    pub fn choose_branch(
        &self,
        rule: BranchingRule,
        max_candidates: Option<usize>,
    ) -> MipResult<Option<BranchDecision>> {
        let decision = match rule {
            BranchingRule::FirstFractional => self.branch_first(),
            BranchingRule::LastFractional => self.branch_last(),
            BranchingRule::MostFractional => self.branch_most_fractional(),
            BranchingRule::DriebeckTomlin => self.branch_drtom(max_candidates)?,
        };
        Ok(decision)
    }

    fn col_value(&self, j: usize) -> f64 {
        self.lp.primal(self.m + j)
    }

    fn branch_first(&self) -> Option<BranchDecision> {
        let j = self.fractional_columns().next()?;
        Some(BranchDecision::closer_rounding(j, self.col_value(j)))
    }

    fn branch_last(&self) -> Option<BranchDecision> {
        let j = self.fractional_columns().last()?;
        Some(BranchDecision::closer_rounding(j, self.col_value(j)))
    }

    fn branch_most_fractional(&self) -> Option<BranchDecision> {
        let mut best: Option<(usize, f64)> = None;
        for j in self.fractional_columns() {
            let beta = self.col_value(j);
            let dist = (beta - (beta.floor() + 0.5)).abs();
            if best.map_or(true, |(_, most)| dist < most) {
                best = Some((j, dist));
            }
        }
        best.map(|(j, _)| BranchDecision::closer_rounding(j, self.col_value(j)))
    }

    /// Driebeck-Tomlin penalties.
    ///
    /// For each candidate one implicit dual simplex step per direction
    /// bounds the degradation of the objective in that branch. The column
    /// whose smaller degradation is largest wins (ties go to the larger
    /// one) and the less degraded branch is solved next. A branch without
    /// an entering candidate is infeasible and counts as `f64::MAX`.
    fn branch_drtom(&self, max_candidates: Option<usize>) -> MipResult<Option<BranchDecision>> {
        let limit = max_candidates.unwrap_or(usize::MAX);
        let mut best: Option<(BranchDecision, f64, f64)> = None;

        for j in self.fractional_columns().take(limit) {
            let beta = self.col_value(j);
            let row = self.lp.tableau_row(self.m + j)?;
            let dz_dn = self.degradation(&row, beta, Shift::Decrease);
            let dz_up = self.degradation(&row, beta, Shift::Increase);

            let (low, high) = (dz_dn.min(dz_up), dz_dn.max(dz_up));
            let better = match best {
                None => true,
                Some((_, b_low, b_high)) => low > b_low || (low == b_low && high > b_high),
            };
            if better {
                let next = if dz_dn < dz_up {
                    Shift::Decrease
                } else {
                    Shift::Increase
                };
                let decision = BranchDecision {
                    col: j,
                    next,
                    degradation: Some((dz_dn, dz_up)),
                };
                best = Some((decision, low, high));
            }
        }

        if let Some((d, _, _)) = &best {
            log::debug!(
                "drtom: column {} chosen, down {:.3e}, up {:.3e}",
                d.col,
                d.degradation.map_or(0.0, |g| g.0),
                d.degradation.map_or(0.0, |g| g.1)
            );
        }
        Ok(best.map(|(d, _, _)| d))
    }

    /// Magnitude of the objective change when the basic column with value
    /// `beta` and tableau row `row` is driven to `floor(beta)` (decrease)
    /// or `ceil(beta)` (increase); `f64::MAX` if the branch is infeasible.
    fn degradation(&self, row: &[(usize, f64)], beta: f64, how: Shift) -> f64 {
        let Some(k) = self.lp.dual_ratio_test(row, how, DRTOM_TOL) else {
            return f64::MAX;
        };
        let Some(&(_, alfa)) = row.iter().find(|&&(q, _)| q == k) else {
            return f64::MAX;
        };

        let delta_j = match how {
            Shift::Decrease => beta.floor(),
            Shift::Increase => beta.ceil(),
        } - beta;
        let mut delta_k = delta_j / alfa;

        // An integer variable moves by at least one unit.
        if k >= self.m && self.int_col[k - self.m] {
            if (delta_k - (delta_k + 0.5).floor()).abs() > 1e-3 {
                delta_k = if delta_k > 0.0 {
                    delta_k.ceil()
                } else {
                    delta_k.floor()
                };
            }
            if delta_k.abs() < 1.0 {
                delta_k = delta_k.signum();
            }
        }

        // Round-off in a dual degenerate basis may flip the sign of d_k.
        let stat = self.lp.status(k);
        let mut dk = self.lp.dual(k);
        let wrong_sign = match self.dir {
            Direction::Minimize => {
                (stat == VarStatus::AtLower && dk < 0.0) || (stat == VarStatus::AtUpper && dk > 0.0)
            }
            Direction::Maximize => {
                (stat == VarStatus::AtLower && dk > 0.0) || (stat == VarStatus::AtUpper && dk < 0.0)
            }
        };
        if wrong_sign || stat == VarStatus::Free {
            dk = 0.0;
        }

        (dk * delta_k).abs()
    }

    /// Split the live node on column `j` and revive the child `next`.
    ///
    /// The down child gets `x_j <= floor(beta)`, the up child
    /// `x_j >= ceil(beta)`, where `beta` is the column's current value.
    /// Returns the two children (down, up).
    pub fn branch_on(&mut self, j: usize, next: Shift) -> (NodeRef, NodeRef) {
        let Some(p) = self.curr else {
            panic!("branch: no current node");
        };
        if !self.fractional[j] {
            panic!("branch: column {} of node {} is not fractional", j, p);
        }
        let k = self.m + j;
        let beta = self.lp.primal(k);
        let r = self.arena.node_ref(p);

        self.freeze();
        let kids = self.clone_node(r, 2);
        let (down, up) = (kids[0], kids[1]);
        log::debug!(
            "node {}: branch on column {} = {:.9e}, down {}, up {}",
            p,
            j,
            beta,
            down,
            up
        );

        self.revive(down);
        let b = self.lp.bounds(k);
        self.lp.set_bounds(k, narrow_down(b, beta.floor(), j));
        self.freeze();

        self.revive(up);
        let b = self.lp.bounds(k);
        self.lp.set_bounds(k, narrow_up(b, beta.ceil(), j));
        self.freeze();

        self.revive(match next {
            Shift::Decrease => down,
            Shift::Increase => up,
        });
        (down, up)
    }
}

fn narrow_down(b: Bounds, new_ub: f64, j: usize) -> Bounds {
    match b.kind() {
        BoundType::Free => Bounds::upper(new_ub),
        BoundType::Lower if b.lb() <= new_ub => Bounds::double(b.lb(), new_ub),
        BoundType::Upper if new_ub <= b.ub() - 1.0 => Bounds::upper(new_ub),
        BoundType::Double if b.lb() <= new_ub && new_ub <= b.ub() - 1.0 => {
            Bounds::double(b.lb(), new_ub)
        }
        _ => panic!("branch: cannot narrow {} of column {} to <= {}", b, j, new_ub),
    }
}

fn narrow_up(b: Bounds, new_lb: f64, j: usize) -> Bounds {
    match b.kind() {
        BoundType::Free => Bounds::lower(new_lb),
        BoundType::Lower if b.lb() + 1.0 <= new_lb => Bounds::lower(new_lb),
        BoundType::Upper if new_lb <= b.ub() => Bounds::double(new_lb, b.ub()),
        BoundType::Double if b.lb() + 1.0 <= new_lb && new_lb <= b.ub() => {
            Bounds::double(new_lb, b.ub())
        }
        _ => panic!("branch: cannot narrow {} of column {} to >= {}", b, j, new_lb),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use solver_lp::{sparse, DualStatus, PrimalStatus, SimplexLp, SolveExit};

    // max 5 x1 + 4 x2  s.t.  3 x1 + 2 x2 <= 4,  x1, x2 binary
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
        tree.revive(tree.root().unwrap());
        assert_eq!(tree.solve_node().unwrap(), SolveExit::Ok);
        tree.set_local_bound();
        tree.check_integrality(1e-5);
        tree
    }

    #[test]
    fn test_first_fractional_children() {
        let mut tree = knapsack();
        let root = tree.root().unwrap();
        let root_bound = tree.node(root).bound();

        let d = tree
            .choose_branch(BranchingRule::FirstFractional, None)
            .unwrap()
            .unwrap();
        // x1 = 2/3 is closer to 1.
        assert_eq!(d.col, 0);
        assert_eq!(d.next, Shift::Increase);

        let (down, up) = tree.branch_on(d.col, d.next);
        assert_eq!(tree.current(), Some(up));
        assert_eq!(tree.node(root).children(), 2);
        assert_eq!(tree.node(down).bound(), root_bound);
        assert_eq!(tree.node(up).bound(), root_bound);
        assert_eq!(tree.lp().bounds(1), Bounds::fixed(1.0));

        tree.freeze();
        tree.revive(down);
        assert_eq!(tree.lp().bounds(1), Bounds::fixed(0.0));
        assert_eq!(tree.lp().bounds(2), Bounds::double(0.0, 1.0));
    }

    #[test]
    fn test_rules_agree_on_single_candidate() {
        let tree = knapsack();
        for rule in [
            BranchingRule::FirstFractional,
            BranchingRule::LastFractional,
            BranchingRule::MostFractional,
            BranchingRule::DriebeckTomlin,
        ] {
            let d = tree.choose_branch(rule, None).unwrap().unwrap();
            assert_eq!(d.col, 0, "{:?}", rule);
        }
    }

    #[test]
    fn test_drtom_penalties() {
        // Down: the row slack absorbs the step, loss 5/3 * 2 = 10/3.
        // Up: x2 has to drop by 1/2, rounded to a whole unit, loss 2/3.
        let tree = knapsack();
        let d = tree
            .choose_branch(BranchingRule::DriebeckTomlin, None)
            .unwrap()
            .unwrap();
        let (dn, up) = d.degradation.unwrap();
        assert!((dn - 10.0 / 3.0).abs() < 1e-9);
        assert!((up - 2.0 / 3.0).abs() < 1e-9);
        assert_eq!(d.next, Shift::Increase);
    }

    /// Relaxation with a scripted basis: fixed tableau rows, values and
    /// reduced costs. The ratio test takes the first entry whose sign
    /// moves the basic variable in the requested direction.
    struct ScriptedLp {
        m: usize,
        bounds: Vec<Bounds>,
        status: Vec<VarStatus>,
        values: Vec<f64>,
        duals: Vec<f64>,
        rows: Vec<Vec<(usize, f64)>>,
    }

    impl ScriptedLp {
        // One row and four columns; columns 0 and 1 are basic at 0.5,
        // column 2 is integer and non-basic, column 3 continuous.
        fn new(duals: [f64; 5], rows: [Vec<(usize, f64)>; 2]) -> Self {
            let [row0, row1] = rows;
            Self {
                m: 1,
                bounds: vec![Bounds::double(0.0, 1.0); 5],
                status: vec![
                    VarStatus::AtLower,
                    VarStatus::Basic,
                    VarStatus::Basic,
                    VarStatus::AtLower,
                    VarStatus::AtLower,
                ],
                values: vec![0.0, 0.5, 0.5, 0.0, 0.0],
                duals: duals.to_vec(),
                rows: vec![Vec::new(), row0, row1, Vec::new(), Vec::new()],
            }
        }

        fn into_tree(self) -> SearchTree<ScriptedLp> {
            let mut tree = SearchTree::new(self);
            for j in 0..3 {
                tree.set_int_col(j, true);
            }
            tree.revive(tree.root().unwrap());
            assert_eq!(tree.check_integrality(1e-5), 2);
            tree
        }
    }

    impl MasterBackend for ScriptedLp {
        fn num_rows(&self) -> usize {
            self.m
        }

        fn num_cols(&self) -> usize {
            self.bounds.len() - self.m
        }

        fn direction(&self) -> Direction {
            Direction::Minimize
        }

        fn bounds(&self, k: usize) -> Bounds {
            self.bounds[k]
        }

        fn set_bounds(&mut self, k: usize, bounds: Bounds) {
            self.bounds[k] = bounds;
        }

        fn status(&self, k: usize) -> VarStatus {
            self.status[k]
        }

        fn set_status(&mut self, k: usize, status: VarStatus) {
            self.status[k] = status;
        }

        fn solve(&mut self) -> MipResult<SolveExit> {
            Ok(SolveExit::Ok)
        }

        fn primal_status(&self) -> PrimalStatus {
            PrimalStatus::Feasible
        }

        fn dual_status(&self) -> DualStatus {
            DualStatus::Feasible
        }

        fn objective_value(&self) -> f64 {
            0.0
        }

        fn primal(&self, k: usize) -> f64 {
            self.values[k]
        }

        fn dual(&self, k: usize) -> f64 {
            self.duals[k]
        }

        fn iteration_count(&self) -> u64 {
            0
        }

        fn tableau_row(&self, k: usize) -> MipResult<Vec<(usize, f64)>> {
            Ok(self.rows[k].clone())
        }

        fn dual_ratio_test(&self, row: &[(usize, f64)], how: Shift, _tol: f64) -> Option<usize> {
            row.iter()
                .find(|&&(_, alfa)| match how {
                    Shift::Decrease => alfa > 0.0,
                    Shift::Increase => alfa < 0.0,
                })
                .map(|&(q, _)| q)
        }
    }

    #[test]
    fn test_drtom_maximizes_smaller_degradation() {
        // Column 0 loses 5 either way. Column 1 has no down branch but
        // loses only 1.5 going up, so its smaller degradation is worse.
        let tree = ScriptedLp::new(
            [5.0, 0.0, 0.0, 0.0, 5.0],
            [vec![(0, 0.5), (4, -0.5)], vec![(4, -5.0 / 3.0)]],
        )
        .into_tree();

        let d = tree
            .choose_branch(BranchingRule::DriebeckTomlin, None)
            .unwrap()
            .unwrap();
        assert_eq!(d.col, 0);
        let (dn, up) = d.degradation.unwrap();
        assert!((dn - 5.0).abs() < 1e-9);
        assert!((up - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_drtom_infeasible_branch_wins_on_larger_smaller_degradation() {
        // Column 1 has no down branch and loses 7.5 going up, beating the
        // (5, 5) of column 0.
        let tree = ScriptedLp::new(
            [5.0, 0.0, 0.0, 0.0, 5.0],
            [vec![(0, 0.5), (4, -0.5)], vec![(4, -1.0 / 3.0)]],
        )
        .into_tree();

        let d = tree
            .choose_branch(BranchingRule::DriebeckTomlin, None)
            .unwrap()
            .unwrap();
        assert_eq!(d.col, 1);
        assert_eq!(d.next, Shift::Increase);
        let (dn, up) = d.degradation.unwrap();
        assert_eq!(dn, f64::MAX);
        assert!((up - 7.5).abs() < 1e-9);
    }

    #[test]
    fn test_drtom_integer_step_is_at_least_one() {
        // Driving column 0 down needs integer column 2 to move by only
        // 0.5 / 1000; the step is widened to one unit.
        let tree = ScriptedLp::new(
            [0.0, 0.0, 0.0, 2.0, 5.0],
            [vec![(3, 1000.0), (4, -0.5)], vec![(4, -0.5)]],
        )
        .into_tree();

        let d = tree
            .choose_branch(BranchingRule::DriebeckTomlin, Some(1))
            .unwrap()
            .unwrap();
        assert_eq!(d.col, 0);
        let (dn, up) = d.degradation.unwrap();
        assert!((dn - 2.0).abs() < 1e-9);
        assert!((up - 5.0).abs() < 1e-9);
        assert_eq!(d.next, Shift::Decrease);
    }

    #[test]
    fn test_no_fractional_column() {
        let mut tree = knapsack();
        tree.set_int_col(0, false);
        tree.check_integrality(1e-5);
        for rule in [BranchingRule::FirstFractional, BranchingRule::DriebeckTomlin] {
            assert!(tree.choose_branch(rule, None).unwrap().is_none());
        }
    }

    #[test]
    #[should_panic(expected = "not fractional")]
    fn test_branch_on_integral_column_panics() {
        let mut tree = knapsack();
        tree.branch_on(1, Shift::Decrease);
    }

    #[test]
    fn test_narrowing() {
        assert_eq!(narrow_down(Bounds::free(), 2.0, 0), Bounds::upper(2.0));
        assert_eq!(narrow_down(Bounds::lower(2.0), 2.0, 0), Bounds::fixed(2.0));
        assert_eq!(narrow_up(Bounds::upper(5.0), 3.0, 0), Bounds::double(3.0, 5.0));
        assert_eq!(narrow_up(Bounds::lower(0.0), 3.0, 0), Bounds::lower(3.0));
    }

    #[test]
    #[should_panic(expected = "cannot narrow")]
    fn test_inconsistent_narrowing_panics() {
        narrow_down(Bounds::double(0.0, 1.0), 1.0, 0);
    }
}
