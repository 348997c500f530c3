//! Error types for the MIP solver.

use solver_lp::LpError;
use thiserror::Error;

/// Errors that can occur during MIP solving.
#[derive(Error, Debug)]
pub enum MipError {
    /// Problem validation failed
    #[error("Invalid problem: {0}")]
    InvalidProblem(String),

    /// LP relaxation could not be built or solved
    #[error("Relaxation failed: {0}")]
    Relaxation(#[from] LpError),

    /// Internal solver error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type for MIP operations.
pub type MipResult<T> = Result<T, MipError>;
