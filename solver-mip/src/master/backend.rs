//! Master problem backend trait.

use solver_lp::{Bounds, Direction, DualStatus, PrimalStatus, Shift, SolveExit, VarStatus};

use crate::error::MipResult;

/// Trait for master problem backends (LP relaxation solvers).
///
/// The master backend holds the LP relaxation of the subproblem that is
/// currently live in the search tree. Variables are addressed by ordinal:
/// `0..m` for rows (auxiliary variables), `m..m+n` for columns. It
/// supports:
/// - Reading and changing bounds and basis statuses (revive/freeze/branch)
/// - Warm-started solves of the relaxation
/// - Basis information for the Driebeck-Tomlin penalties
pub trait MasterBackend {
    /// Number of rows.
    fn num_rows(&self) -> usize;

    /// Number of columns.
    fn num_cols(&self) -> usize;

    /// Optimization direction.
    fn direction(&self) -> Direction;

    /// Bounds of variable `k`.
    fn bounds(&self, k: usize) -> Bounds;

    /// Set the bounds of variable `k`.
    ///
    /// A non-basic status must be re-derived from the new bound kind.
    fn set_bounds(&mut self, k: usize, bounds: Bounds);

    /// Basis status of variable `k`.
    fn status(&self, k: usize) -> VarStatus;

    /// Set the basis status of variable `k`.
    fn set_status(&mut self, k: usize, status: VarStatus);

    /// Stop the solve once the objective provably cannot beat `limit`.
    ///
    /// Backends without early termination ignore it.
    fn set_objective_limit(&mut self, _limit: Option<f64>) {}

    /// Set the cumulative simplex iteration limit.
    fn set_iteration_limit(&mut self, _limit: Option<u64>) {}

    /// Solve the current relaxation starting from the stored basis.
    fn solve(&mut self) -> MipResult<SolveExit>;

    /// Primal status of the last basic solution.
    fn primal_status(&self) -> PrimalStatus;

    /// Dual status of the last basic solution.
    fn dual_status(&self) -> DualStatus;

    /// Objective value of the last basic solution.
    fn objective_value(&self) -> f64;

    /// Primal value of variable `k`.
    fn primal(&self, k: usize) -> f64;

    /// Reduced cost of variable `k` (zero for basic variables).
    fn dual(&self, k: usize) -> f64;

    /// Simplex iterations over all solves.
    fn iteration_count(&self) -> u64;

    /// Tableau row of basic variable `k`: `x_k = sum alfa_j x_j` over
    /// non-basic `j`.
    fn tableau_row(&self, k: usize) -> MipResult<Vec<(usize, f64)>>;

    /// Dual ratio test on a tableau row; `how` is the direction the basic
    /// variable has to move.
    fn dual_ratio_test(&self, row: &[(usize, f64)], how: Shift, tol: f64) -> Option<usize>;
}
