//! Error types for the simplex engine.

use thiserror::Error;

/// Errors reported by [`SimplexLp`](crate::SimplexLp).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LpError {
    /// Problem dimensions are unusable.
    #[error("Invalid dimensions: {rows} rows, {cols} columns")]
    InvalidDimensions {
        /// Number of rows requested.
        rows: usize,
        /// Number of columns requested.
        cols: usize,
    },

    /// Constraint matrix shape does not match the problem.
    #[error("Matrix shape {actual:?} does not match problem shape {expected:?}")]
    ShapeMismatch {
        /// Shape of the problem (rows, columns).
        expected: (usize, usize),
        /// Shape of the supplied matrix.
        actual: (usize, usize),
    },

    /// Bounds are inverted or not finite where required.
    #[error("Invalid bounds for variable {0}")]
    InvalidBounds(usize),

    /// Basis information requested while no factorised basis exists.
    #[error("Basis is not available")]
    BasisUnavailable,

    /// Variable expected to be basic is not.
    #[error("Variable {0} is not basic")]
    NotBasic(usize),

    /// Numerical breakdown during the simplex iterations.
    #[error("Numerical failure: {0}")]
    NumericalFailure(String),
}

/// Result type for simplex operations.
pub type LpResult<T> = Result<T, LpError>;
