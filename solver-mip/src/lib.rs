//! Branch-and-bound search for mixed-integer linear programs.
//!
//! The search keeps a tree of subproblems. Only the leaves (active
//! subproblems) are ever solved, one at a time, against a single LP
//! relaxation owned by the tree; every node stores how its row and column
//! attributes differ from its parent's, and reviving a node replays those
//! differences from the root down.
//!
//! - [`model`]: the inbound problem description and the solution report
//! - [`master`]: the LP relaxation interface ([`MasterBackend`])
//! - [`search`]: node store, branching, backtracking, pruning and driver
//!
//! # Example
//!
//! ```
//! use solver_lp::{Bounds, Direction};
//! use solver_mip::{solve_mip, MipProblem, MipSettings, MipStatus, VarKind};
//!
//! // max 5 x1 + 4 x2  s.t.  3 x1 + 2 x2 <= 4,  x binary
//! let prob = MipProblem::from_dense(Direction::Maximize, vec![5.0, 4.0], &[vec![3.0, 2.0]])
//!     .with_row_bounds(0, Bounds::upper(4.0))
//!     .with_kind(0, VarKind::Binary)
//!     .with_kind(1, VarKind::Binary);
//!
//! let sol = solve_mip(&prob, &MipSettings::default()).unwrap();
//! assert_eq!(sol.status, MipStatus::Optimal);
//! assert!((sol.obj_val().unwrap() - 5.0).abs() < 1e-9);
//! assert_eq!(sol.x().unwrap(), &[1.0, 0.0]);
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod master;
pub mod model;
pub mod search;
pub mod settings;

pub use error::{MipError, MipResult};
pub use master::MasterBackend;
pub use model::{Incumbent, MipProblem, MipSolution, MipStatus, VarKind};
pub use search::{BranchAndBound, NodeRef, SearchExit, SearchTree};
pub use settings::{BranchingRule, MipSettings, NodeSelection};

use solver_lp::SimplexSettings;

/// Solve a MIP with the built-in simplex relaxation.
///
/// Problem errors are returned as [`MipError`]; everything that happens
/// during the search (limits, relaxation failures) is reported through
/// [`MipSolution::status`] with the best incumbent kept.
pub fn solve_mip(problem: &MipProblem, settings: &MipSettings) -> MipResult<MipSolution> {
    let problem = problem.snapped();
    problem.validate()?;
    let lp = problem.to_relaxation(SimplexSettings::default())?;
    solve_with(&problem, lp, settings)
}

/// Solve a MIP against a caller-supplied relaxation.
///
/// `lp` must already hold the problem's rows, columns, bounds and
/// objective; `problem` only provides the column kinds and the objective
/// integrality.
pub fn solve_with<L: MasterBackend>(
    problem: &MipProblem,
    mut lp: L,
    settings: &MipSettings,
) -> MipResult<MipSolution> {
    problem.validate()?;
    if lp.num_rows() != problem.num_rows() || lp.num_cols() != problem.num_cols() {
        return Err(MipError::InvalidProblem(format!(
            "relaxation is {}x{}, problem is {}x{}",
            lp.num_rows(),
            lp.num_cols(),
            problem.num_rows(),
            problem.num_cols()
        )));
    }
    lp.set_iteration_limit(settings.iteration_limit);

    let mut tree = SearchTree::new(lp);
    for (j, kind) in problem.kinds.iter().enumerate() {
        tree.set_int_col(j, kind.is_integer());
    }
    tree.set_int_obj(problem.objective_is_integral());

    if settings.verbose {
        log::info!(
            "Integer optimization begins: {} rows, {} columns ({} integer)",
            problem.num_rows(),
            problem.num_cols(),
            problem.num_integers()
        );
    }

    let mut bnb = BranchAndBound::new(tree, settings.clone());
    let exit = bnb.run();
    let solution = bnb.solution(exit);

    if settings.verbose {
        log::info!(
            "Search finished: {:?}, {} nodes, {} LP iterations, {} ms",
            solution.status,
            solution.nodes_created,
            solution.lp_iterations,
            solution.solve_time_ms
        );
    }
    Ok(solution)
}
