//! MIP solution types.

/// Status of the MIP solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MipStatus {
    /// Search completed and an integer feasible solution was found; it is
    /// optimal within the objective tolerance.
    Optimal,

    /// Search completed without finding an integer feasible solution.
    Infeasible,

    /// The root LP relaxation is unbounded.
    Unbounded,

    /// Simplex iteration limit reached, best solution returned.
    IterationLimit,

    /// Time limit reached, best solution returned.
    TimeLimit,

    /// An LP relaxation failed or ended in an unexpected state.
    Error,
}

impl MipStatus {
    /// Returns true if the search ran to completion.
    pub fn is_complete(&self) -> bool {
        matches!(self, MipStatus::Optimal | MipStatus::Infeasible)
    }

    /// Returns true if optimality was proven.
    pub fn is_optimal(&self) -> bool {
        matches!(self, MipStatus::Optimal)
    }
}

/// Best integer feasible solution found so far.
#[derive(Debug, Clone, PartialEq)]
pub struct Incumbent {
    /// Objective value.
    pub obj_val: f64,

    /// Row activities (length m).
    pub row_values: Vec<f64>,

    /// Column values (length n); integer columns are exact integers.
    pub col_values: Vec<f64>,
}

/// Complete MIP solution with diagnostics.
#[derive(Debug, Clone)]
pub struct MipSolution {
    /// Solve status.
    pub status: MipStatus,

    /// Best integer feasible solution (if found).
    pub incumbent: Option<Incumbent>,

    /// Best local bound over the remaining active subproblems.
    pub bound: f64,

    /// Relative gap between incumbent and bound.
    pub gap: f64,

    /// Subproblems created.
    pub nodes_created: u64,

    /// Subproblems removed from the tree.
    pub nodes_explored: u64,

    /// Subproblems still waiting when the search stopped.
    pub active_nodes: usize,

    /// Number of times the incumbent was updated.
    pub incumbent_updates: u64,

    /// Total simplex iterations.
    pub lp_iterations: u64,

    /// Total solve time in milliseconds.
    pub solve_time_ms: u64,
}

impl MipSolution {
    /// Create a solution with no incumbent and empty statistics.
    pub fn empty(status: MipStatus, bound: f64) -> Self {
        Self {
            status,
            incumbent: None,
            bound,
            gap: f64::MAX,
            nodes_created: 0,
            nodes_explored: 0,
            active_nodes: 0,
            incumbent_updates: 0,
            lp_iterations: 0,
            solve_time_ms: 0,
        }
    }

    /// Returns true if an integer feasible solution was found.
    pub fn has_solution(&self) -> bool {
        self.incumbent.is_some()
    }

    /// Objective value of the incumbent.
    pub fn obj_val(&self) -> Option<f64> {
        self.incumbent.as_ref().map(|inc| inc.obj_val)
    }

    /// Column values of the incumbent.
    pub fn x(&self) -> Option<&[f64]> {
        self.incumbent.as_ref().map(|inc| inc.col_values.as_slice())
    }
}
