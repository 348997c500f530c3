//! Configuration settings for the MIP solver.

/// Branching variable selection rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BranchingRule {
    /// Lowest-numbered fractional column.
    FirstFractional,

    /// Highest-numbered fractional column.
    LastFractional,

    /// Column whose value is closest to the midpoint between two integers.
    MostFractional,

    /// Driebeck-Tomlin penalties: one dual ratio test per direction
    /// estimates the objective degradation of each branch, and the
    /// column with the largest degradation is chosen.
    #[default]
    DriebeckTomlin,
}

/// Node selection strategy used when the current subproblem is fathomed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NodeSelection {
    /// Most recently created active node.
    DepthFirst,

    /// Oldest active node.
    BreadthFirst,

    /// Best projection once an incumbent exists, before that the node
    /// whose parent was closest to integer feasible.
    #[default]
    BestProjection,

    /// Active node with the best local bound.
    BestBound,
}

/// MIP solver settings.
#[derive(Debug, Clone)]
pub struct MipSettings {
    // === Search strategy ===
    /// Branching variable selection rule.
    pub branching_rule: BranchingRule,

    /// Node selection strategy.
    pub node_selection: NodeSelection,

    /// Examine at most this many fractional columns with Driebeck-Tomlin
    /// (None = all of them). `Some(0)` leaves no branching candidate and
    /// ends the search with an error.
    pub max_drtom_candidates: Option<usize>,

    /// Fix non-basic integer columns whose reduced cost proves that
    /// moving them cannot beat the incumbent.
    pub reduced_cost_fixing: bool,

    // === Tolerances ===
    /// Integer feasibility tolerance.
    /// A column is integral if it is within int_feas_tol of an integer
    /// or of one of its bounds.
    pub int_feas_tol: f64,

    /// Relative objective tolerance used to decide whether a subproblem
    /// can still improve on the incumbent.
    pub rel_obj_tol: f64,

    // === Termination criteria ===
    /// Time limit in milliseconds (None = unlimited).
    pub time_limit_ms: Option<u64>,

    /// Cumulative simplex iteration limit (None = unlimited).
    pub iteration_limit: Option<u64>,

    // === Output ===
    /// Print progress information.
    pub verbose: bool,

    /// Minimum time between two progress lines in milliseconds.
    pub progress_interval_ms: u64,
}

impl Default for MipSettings {
    fn default() -> Self {
        Self {
            // Search
            branching_rule: BranchingRule::default(),
            node_selection: NodeSelection::default(),
            max_drtom_candidates: None,
            reduced_cost_fixing: true,

            // Tolerances
            int_feas_tol: 1e-5,
            rel_obj_tol: 1e-7,

            // Termination
            time_limit_ms: None,
            iteration_limit: None,

            // Output
            verbose: false,
            progress_interval_ms: 5000,
        }
    }
}

impl MipSettings {
    /// Create settings with verbose output enabled.
    pub fn verbose() -> Self {
        Self {
            verbose: true,
            ..Self::default()
        }
    }

    /// Set time limit in seconds.
    pub fn with_time_limit(mut self, seconds: f64) -> Self {
        self.time_limit_ms = Some((seconds * 1000.0) as u64);
        self
    }

    /// Set the simplex iteration limit.
    pub fn with_iteration_limit(mut self, limit: u64) -> Self {
        self.iteration_limit = Some(limit);
        self
    }

    /// Set the branching rule.
    pub fn with_branching(mut self, rule: BranchingRule) -> Self {
        self.branching_rule = rule;
        self
    }

    /// Set the node selection strategy.
    pub fn with_node_selection(mut self, selection: NodeSelection) -> Self {
        self.node_selection = selection;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let s = MipSettings::default();
        assert_eq!(s.branching_rule, BranchingRule::DriebeckTomlin);
        assert_eq!(s.node_selection, NodeSelection::BestProjection);
        assert_eq!(s.int_feas_tol, 1e-5);
        assert_eq!(s.rel_obj_tol, 1e-7);
        assert!(s.reduced_cost_fixing);
        assert!(s.time_limit_ms.is_none());
    }

    #[test]
    fn test_builders() {
        let s = MipSettings::verbose()
            .with_time_limit(1.5)
            .with_iteration_limit(10)
            .with_branching(BranchingRule::FirstFractional)
            .with_node_selection(NodeSelection::DepthFirst);
        assert!(s.verbose);
        assert_eq!(s.time_limit_ms, Some(1500));
        assert_eq!(s.iteration_limit, Some(10));
        assert_eq!(s.branching_rule, BranchingRule::FirstFractional);
        assert_eq!(s.node_selection, NodeSelection::DepthFirst);
    }
}
