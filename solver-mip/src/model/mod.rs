//! Problem and solution types for MIP solver.

mod problem;
mod solution;

pub use problem::{MipProblem, VarKind};
pub use solution::{Incumbent, MipSolution, MipStatus};
