//! Row/column attribute types shared with the branch-and-bound layer.
//!
//! Variables are addressed by a single ordinal `k`: `0..m` are the
//! auxiliary variables (rows, `x_row = A x_col`), `m..m+n` are the
//! structural variables (columns).

use std::fmt;

/// Optimization direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    /// Minimize the objective.
    #[default]
    Minimize,

    /// Maximize the objective.
    Maximize,
}

impl Direction {
    /// `+1.0` for minimization, `-1.0` for maximization.
    pub fn sign(self) -> f64 {
        match self {
            Direction::Minimize => 1.0,
            Direction::Maximize => -1.0,
        }
    }

    /// Objective value no subproblem can be worse than.
    pub fn worst(self) -> f64 {
        match self {
            Direction::Minimize => f64::MAX,
            Direction::Maximize => -f64::MAX,
        }
    }

    /// Objective value meaning "nothing known yet" for a local bound.
    pub fn no_bound(self) -> f64 {
        -self.worst()
    }

    /// True if `a` is strictly better than `b`.
    pub fn better(self, a: f64, b: f64) -> bool {
        match self {
            Direction::Minimize => a < b,
            Direction::Maximize => a > b,
        }
    }
}

/// Kind of bounds imposed on a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoundType {
    /// -inf < x < +inf
    Free,
    /// lb <= x < +inf
    Lower,
    /// -inf < x <= ub
    Upper,
    /// lb <= x <= ub
    Double,
    /// x = lb = ub
    Fixed,
}

/// Bound kind together with the bound values.
///
/// Missing sides are stored as infinities so that two `Bounds` compare
/// equal exactly when kind, lower and upper all match.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    kind: BoundType,
    lb: f64,
    ub: f64,
}

impl Bounds {
    /// No bounds at all.
    pub fn free() -> Self {
        Self {
            kind: BoundType::Free,
            lb: f64::NEG_INFINITY,
            ub: f64::INFINITY,
        }
    }

    /// `x >= lb`.
    pub fn lower(lb: f64) -> Self {
        Self {
            kind: BoundType::Lower,
            lb,
            ub: f64::INFINITY,
        }
    }

    /// `x <= ub`.
    pub fn upper(ub: f64) -> Self {
        Self {
            kind: BoundType::Upper,
            lb: f64::NEG_INFINITY,
            ub,
        }
    }

    /// `lb <= x <= ub`; collapses to [`Bounds::fixed`] when `lb == ub`.
    pub fn double(lb: f64, ub: f64) -> Self {
        if lb == ub {
            return Self::fixed(lb);
        }
        Self {
            kind: BoundType::Double,
            lb,
            ub,
        }
    }

    /// `x = value`.
    pub fn fixed(value: f64) -> Self {
        Self {
            kind: BoundType::Fixed,
            lb: value,
            ub: value,
        }
    }

    /// Build bounds from optional sides.
    pub fn from_options(lb: Option<f64>, ub: Option<f64>) -> Self {
        match (lb, ub) {
            (None, None) => Self::free(),
            (Some(l), None) => Self::lower(l),
            (None, Some(u)) => Self::upper(u),
            (Some(l), Some(u)) => Self::double(l, u),
        }
    }

    /// Bound kind.
    pub fn kind(&self) -> BoundType {
        self.kind
    }

    /// Lower bound (`-inf` when absent).
    pub fn lb(&self) -> f64 {
        self.lb
    }

    /// Upper bound (`+inf` when absent).
    pub fn ub(&self) -> f64 {
        self.ub
    }

    /// True if the lower side is present.
    pub fn has_lower(&self) -> bool {
        matches!(
            self.kind,
            BoundType::Lower | BoundType::Double | BoundType::Fixed
        )
    }

    /// True if the upper side is present.
    pub fn has_upper(&self) -> bool {
        matches!(
            self.kind,
            BoundType::Upper | BoundType::Double | BoundType::Fixed
        )
    }

    /// Non-basic status a variable with these bounds should take,
    /// keeping `current` when it already fits.
    pub fn nonbasic_status(&self, current: VarStatus) -> VarStatus {
        match self.kind {
            BoundType::Free => VarStatus::Free,
            BoundType::Lower => VarStatus::AtLower,
            BoundType::Upper => VarStatus::AtUpper,
            BoundType::Double => {
                if current == VarStatus::AtUpper {
                    VarStatus::AtUpper
                } else {
                    VarStatus::AtLower
                }
            }
            BoundType::Fixed => VarStatus::Fixed,
        }
    }

    /// Value of a non-basic variable with the given status.
    pub fn nonbasic_value(&self, status: VarStatus) -> f64 {
        match status {
            VarStatus::AtLower | VarStatus::Fixed => self.lb,
            VarStatus::AtUpper => self.ub,
            VarStatus::Free | VarStatus::Basic => 0.0,
        }
    }
}

impl fmt::Display for Bounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            BoundType::Free => write!(f, "free"),
            BoundType::Lower => write!(f, ">= {}", self.lb),
            BoundType::Upper => write!(f, "<= {}", self.ub),
            BoundType::Double => write!(f, "[{}, {}]", self.lb, self.ub),
            BoundType::Fixed => write!(f, "= {}", self.lb),
        }
    }
}

/// Basis status of a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VarStatus {
    /// Basic variable.
    Basic,
    /// Non-basic on its lower bound.
    AtLower,
    /// Non-basic on its upper bound.
    AtUpper,
    /// Non-basic free variable (value zero).
    Free,
    /// Non-basic fixed variable.
    Fixed,
}

impl VarStatus {
    /// True for [`VarStatus::Basic`].
    pub fn is_basic(self) -> bool {
        self == VarStatus::Basic
    }
}

/// Primal status of the stored basic solution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PrimalStatus {
    /// No solution computed since the last change.
    #[default]
    Undefined,
    /// Basic solution is primal feasible.
    Feasible,
    /// Basic solution is primal infeasible.
    Infeasible,
    /// The problem has no primal feasible solution.
    NoFeasible,
}

/// Dual status of the stored basic solution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DualStatus {
    /// No solution computed since the last change.
    #[default]
    Undefined,
    /// Basic solution is dual feasible.
    Feasible,
    /// Basic solution is dual infeasible.
    Infeasible,
    /// The problem has no dual feasible solution (primal unbounded).
    NoFeasible,
}

/// How a call to `solve` ended when it did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveExit {
    /// Search finished; inspect primal/dual status.
    Ok,
    /// Dual simplex proved the objective cannot beat the configured limit.
    ObjectiveLimit,
    /// Cumulative iteration limit reached.
    IterationLimit,
}

/// Direction in which a basic variable is pushed by a dual ratio test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shift {
    /// The basic variable decreases.
    Decrease,
    /// The basic variable increases.
    Increase,
}

impl Shift {
    /// `-1.0` or `+1.0`.
    pub fn sign(self) -> f64 {
        match self {
            Shift::Decrease => -1.0,
            Shift::Increase => 1.0,
        }
    }
}

/// Simplex settings.
#[derive(Debug, Clone)]
pub struct SimplexSettings {
    /// Absolute tolerance on bound violations.
    pub tol_bnd: f64,

    /// Absolute tolerance on reduced-cost sign violations.
    pub tol_dj: f64,

    /// Smallest tableau entry accepted as a pivot.
    pub tol_piv: f64,

    /// Cumulative iteration limit over all solves (None = unlimited).
    pub iteration_limit: Option<u64>,

    /// Re-factorise the tableau after this many pivots.
    pub refactor_every: usize,

    /// Switch to Bland's rule after this many consecutive degenerate steps.
    pub degenerate_switch: usize,
}

impl Default for SimplexSettings {
    fn default() -> Self {
        Self {
            tol_bnd: 1e-7,
            tol_dj: 1e-7,
            tol_piv: 1e-9,
            iteration_limit: None,
            refactor_every: 100,
            degenerate_switch: 50,
        }
    }
}
