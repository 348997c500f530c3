//! Bounded dual simplex.
//!
//! Runs from a dual feasible basis: the leaving row is the largest bound
//! violation, the entering column comes from the dual ratio test. The
//! objective of a dual feasible basis bounds the optimum, so the search
//! can stop as soon as it is worse than the objective limit.

use super::SimplexLp;
use crate::error::LpResult;
use crate::problem::{DualStatus, PrimalStatus, Shift, SolveExit, VarStatus};

/// Pivot tolerance of the dual ratio test.
const RATIO_TOL: f64 = 1e-9;

impl SimplexLp {
    /// Returns `None` when the dual simplex gives up and the primal
    /// simplex should take over.
    pub(super) fn dual_simplex(&mut self) -> LpResult<Option<SolveExit>> {
        let budget = 1000 + 20 * (self.m + self.n);
        for _ in 0..budget {
            self.compute_primal()?;
            let d = self.reduced_costs(|k| self.cost(k));
            if !self.is_dual_feasible(&d) {
                return Ok(None);
            }

            let Some((row, how)) = self.choose_leaving() else {
                self.finish(PrimalStatus::Feasible, DualStatus::Feasible);
                return Ok(Some(SolveExit::Ok));
            };

            if let Some(limit) = self.obj_limit {
                if self.dir.better(limit, self.objective()) {
                    self.finish(PrimalStatus::Infeasible, DualStatus::Feasible);
                    return Ok(Some(SolveExit::ObjectiveLimit));
                }
            }

            if self.iteration_limit_reached() {
                self.finish(PrimalStatus::Infeasible, DualStatus::Feasible);
                return Ok(Some(SolveExit::IterationLimit));
            }

            let alfa = self.row_of(row);
            let Some(q) = self.ratio_test(&alfa, how, RATIO_TOL, &d) else {
                self.finish(PrimalStatus::NoFeasible, DualStatus::Feasible);
                return Ok(Some(SolveExit::Ok));
            };

            let to = match how {
                Shift::Increase => VarStatus::AtLower,
                Shift::Decrease => VarStatus::AtUpper,
            };
            self.pivot(row, q, to);
            self.refactor_if_due();
        }
        Ok(None)
    }

    /// Basic row with the largest bound violation.
    fn choose_leaving(&self) -> Option<(usize, Shift)> {
        let mut best: Option<(usize, Shift, f64)> = None;
        for i in 0..self.m {
            let k = self.basis.head(i);
            let x = self.prim[k];
            let Some(how) = self.violation(k, x) else {
                continue;
            };
            let b = self.bounds[k];
            let amount = match how {
                Shift::Increase => b.lb() - x,
                Shift::Decrease => x - b.ub(),
            };
            if best.map_or(true, |(_, _, a)| amount > a) {
                best = Some((i, how, amount));
            }
        }
        best.map(|(i, how, _)| (i, how))
    }
}
