//! Master backend using the solver-lp simplex engine.

use solver_lp::{
    Bounds, Direction, DualStatus, PrimalStatus, Shift, SimplexLp, SolveExit, VarStatus,
};

use super::MasterBackend;
use crate::error::MipResult;

impl MasterBackend for SimplexLp {
    fn num_rows(&self) -> usize {
        SimplexLp::num_rows(self)
    }

    fn num_cols(&self) -> usize {
        SimplexLp::num_cols(self)
    }

    fn direction(&self) -> Direction {
        SimplexLp::direction(self)
    }

    fn bounds(&self, k: usize) -> Bounds {
        SimplexLp::bounds(self, k)
    }

    fn set_bounds(&mut self, k: usize, bounds: Bounds) {
        SimplexLp::set_bounds(self, k, bounds)
    }

    fn status(&self, k: usize) -> VarStatus {
        SimplexLp::status(self, k)
    }

    fn set_status(&mut self, k: usize, status: VarStatus) {
        SimplexLp::set_status(self, k, status)
    }

    fn set_objective_limit(&mut self, limit: Option<f64>) {
        SimplexLp::set_objective_limit(self, limit)
    }

    fn set_iteration_limit(&mut self, limit: Option<u64>) {
        SimplexLp::set_iteration_limit(self, limit)
    }

    fn solve(&mut self) -> MipResult<SolveExit> {
        Ok(SimplexLp::solve(self)?)
    }

    fn primal_status(&self) -> PrimalStatus {
        SimplexLp::primal_status(self)
    }

    fn dual_status(&self) -> DualStatus {
        SimplexLp::dual_status(self)
    }

    fn objective_value(&self) -> f64 {
        SimplexLp::objective_value(self)
    }

    fn primal(&self, k: usize) -> f64 {
        SimplexLp::primal(self, k)
    }

    fn dual(&self, k: usize) -> f64 {
        SimplexLp::dual(self, k)
    }

    fn iteration_count(&self) -> u64 {
        SimplexLp::iteration_count(self)
    }

    fn tableau_row(&self, k: usize) -> MipResult<Vec<(usize, f64)>> {
        Ok(SimplexLp::tableau_row(self, k)?)
    }

    fn dual_ratio_test(&self, row: &[(usize, f64)], how: Shift, tol: f64) -> Option<usize> {
        SimplexLp::dual_ratio_test(self, row, how, tol)
    }
}
