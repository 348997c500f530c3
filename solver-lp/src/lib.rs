//! Dense bounded-variable simplex engine for LP relaxations.
//!
//! `solver-lp` provides the basis-level LP operations a branch-and-bound
//! search needs: per-variable bounds and basis statuses, warm-started
//! primal and dual simplex, primal values and reduced costs, tableau rows
//! and the dual ratio test.
//!
//! # Numbering
//!
//! For an `m x n` problem, ordinals `0..m` are the auxiliary (row)
//! variables defined by `x_row = A x_col`, and `m..m+n` are the structural
//! (column) variables.
//!
//! # Example
//!
//! ```
//! use solver_lp::{sparse, Bounds, Direction, SimplexLp, SolveExit};
//!
//! // max x + y  s.t.  x + 2y <= 4,  0 <= x <= 3,  y >= 0
//! let mut lp = SimplexLp::new(1, 2, Direction::Maximize).unwrap();
//! lp.load_matrix(&sparse::from_dense_rows(&[vec![1.0, 2.0]])).unwrap();
//! lp.set_obj_coef(0, 1.0);
//! lp.set_obj_coef(1, 1.0);
//! lp.set_bounds(0, Bounds::upper(4.0));
//! lp.set_bounds(1, Bounds::double(0.0, 3.0));
//! lp.set_bounds(2, Bounds::lower(0.0));
//!
//! assert_eq!(lp.solve().unwrap(), SolveExit::Ok);
//! assert!((lp.objective_value() - 3.5).abs() < 1e-9);
//! ```

pub mod error;
pub mod problem;
pub mod simplex;
pub mod sparse;

pub use error::{LpError, LpResult};
pub use problem::{
    BoundType, Bounds, Direction, DualStatus, PrimalStatus, Shift, SimplexSettings, SolveExit,
    VarStatus,
};
pub use simplex::SimplexLp;
