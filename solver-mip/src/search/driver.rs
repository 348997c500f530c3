//! Branch-and-bound driver.

use std::time::Instant;

use solver_lp::{Direction, DualStatus, PrimalStatus, SolveExit};

use super::SearchTree;
use crate::error::MipError;
use crate::master::MasterBackend;
use crate::model::{MipSolution, MipStatus};
use crate::settings::MipSettings;

/// How the search ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchExit {
    /// The active list ran empty.
    Finished,

    /// The root relaxation is unbounded.
    Unbounded,

    /// The simplex iteration limit was hit.
    IterationLimit,

    /// The time limit was hit.
    TimeLimit,

    /// A relaxation failed or ended in a state the search cannot use.
    Error,
}

/// What to do with the live node after its relaxation was analysed.
enum Step {
    Branch,
    Fathom,
    Stop(SearchExit),
}

/// Branch-and-bound controller.
///
/// Runs the search over a [`SearchTree`] and keeps timing and progress
/// reporting.
pub struct BranchAndBound<L> {
    tree: SearchTree<L>,
    settings: MipSettings,
    start: Instant,
    last_progress: Instant,
}

impl<L: MasterBackend> BranchAndBound<L> {
    /// Create a controller for a fresh tree.
    pub fn new(tree: SearchTree<L>, settings: MipSettings) -> Self {
        let now = Instant::now();
        Self {
            tree,
            settings,
            start: now,
            last_progress: now,
        }
    }

    /// Search tree.
    pub fn tree(&self) -> &SearchTree<L> {
        &self.tree
    }

    /// Take the search tree back.
    pub fn into_tree(self) -> SearchTree<L> {
        self.tree
    }

    /// Get elapsed time in milliseconds.
    pub fn elapsed_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }

    /// Check if time limit is exceeded.
    pub fn time_limit_exceeded(&self) -> bool {
        self.settings
            .time_limit_ms
            .map_or(false, |limit| self.elapsed_ms() >= limit)
    }

    /// Run the search until the active list is empty or a limit stops it.
    ///
    /// Calling it again after the search finished returns
    /// [`SearchExit::Finished`] right away.
    pub fn run(&mut self) -> SearchExit {
        if self.tree.current().is_none() {
            match self.tree.select_node(self.settings.node_selection) {
                Some(r) => self.tree.revive(r),
                None => return SearchExit::Finished,
            }
        }

        let exit = loop {
            let Some(r) = self.tree.current() else {
                break SearchExit::Error;
            };
            let p = r.number();
            log::debug!("processing node {} at level {}", p, self.tree.node(r).level());

            if self.time_limit_exceeded() {
                log::debug!("time limit exceeded; search terminated");
                break SearchExit::TimeLimit;
            }
            if self.settings.verbose
                && self.last_progress.elapsed().as_millis() as u64
                    >= self.settings.progress_interval_ms
            {
                self.show_progress();
            }

            let step = self.process_node();
            match step {
                Step::Stop(exit) => break exit,
                Step::Branch => continue,
                Step::Fathom => {}
            }

            log::debug!("node {} fathomed", p);
            self.tree.freeze();
            self.tree.delete(r);
            self.tree.cleanup(self.settings.rel_obj_tol);

            match self.tree.select_node(self.settings.node_selection) {
                Some(next) => self.tree.revive(next),
                None => {
                    log::debug!("active list is empty");
                    break SearchExit::Finished;
                }
            }
        };

        if self.settings.verbose {
            self.show_progress();
        }
        exit
    }

    /// Solve the live node and either branch on it (leaving a child live)
    /// or mark it for fathoming.
    fn process_node(&mut self) -> Step {
        match self.tree.solve_node() {
            Ok(SolveExit::Ok) | Ok(SolveExit::ObjectiveLimit) => {}
            Ok(SolveExit::IterationLimit) => {
                log::debug!("iteration limit exceeded; search terminated");
                return Step::Stop(SearchExit::IterationLimit);
            }
            Err(e) => {
                log::warn!("cannot solve LP relaxation: {}", e);
                return Step::Stop(SearchExit::Error);
            }
        }

        let lp = self.tree.lp();
        match (lp.primal_status(), lp.dual_status()) {
            (PrimalStatus::Feasible, DualStatus::Feasible) => {}
            (PrimalStatus::Feasible, DualStatus::NoFeasible) => {
                let at_root = self.tree.current() == self.tree.root()
                    && self.tree.active_count() == 1
                    && self.tree.alive_count() == 1;
                if at_root {
                    log::debug!("root LP relaxation is unbounded");
                    return Step::Stop(SearchExit::Unbounded);
                }
                log::warn!("LP relaxation of a subproblem is unbounded");
                return Step::Stop(SearchExit::Error);
            }
            (PrimalStatus::Infeasible, DualStatus::Feasible) if self.tree.best().is_some() => {
                log::debug!("LP relaxation cannot beat the incumbent");
                return Step::Fathom;
            }
            (PrimalStatus::NoFeasible, _) => {
                log::debug!("LP relaxation has no feasible solution");
                return Step::Fathom;
            }
            (p_stat, d_stat) => {
                log::warn!("unexpected LP relaxation status {:?}/{:?}", p_stat, d_stat);
                return Step::Stop(SearchExit::Error);
            }
        }

        self.tree.set_local_bound();
        let p = match self.tree.curr {
            Some(p) => p,
            None => return Step::Stop(SearchExit::Error),
        };
        if !self.tree.is_hopeful(p, self.settings.rel_obj_tol) {
            log::debug!("node {} is hopeless", p);
            return Step::Fathom;
        }

        if self.tree.check_integrality(self.settings.int_feas_tol) == 0 {
            if self.tree.record_solution() {
                log::debug!("new integer feasible solution found at node {}", p);
                if self.settings.verbose {
                    self.show_progress();
                }
            }
            return Step::Fathom;
        }

        if self.settings.reduced_cost_fixing && self.tree.best().is_some() {
            self.tree.fix_by_red_cost();
        }

        let decision = self
            .tree
            .choose_branch(self.settings.branching_rule, self.settings.max_drtom_candidates)
            .and_then(|d| {
                d.ok_or_else(|| {
                    MipError::Internal(format!("node {} has no branching candidate", p))
                })
            });
        match decision {
            Ok(d) => {
                self.tree.branch_on(d.col, d.next);
                Step::Branch
            }
            Err(e) => {
                log::warn!("branching on node {} failed: {}", p, e);
                Step::Stop(SearchExit::Error)
            }
        }
    }

    /// Log one progress line.
    pub fn show_progress(&mut self) {
        log::info!("{}", self.progress_line());
        self.last_progress = Instant::now();
    }

    /// Progress line: iterations, incumbent, best bound, gap, active
    /// nodes and nodes removed so far.
    pub fn progress_line(&self) -> String {
        let best_mip = match self.tree.best() {
            Some(best) => format!("{:17.9e}", best),
            None => format!("{:>17}", "not found yet"),
        };
        let best_bound = match self.tree.best_bound() {
            None => format!("{:>17}", "tree is empty"),
            Some(b) if b == -f64::MAX => format!("{:>17}", "-inf"),
            Some(b) if b == f64::MAX => format!("{:>17}", "+inf"),
            Some(b) => format!("{:17.9e}", b),
        };
        let rho = match self.tree.direction() {
            Direction::Minimize => ">=",
            Direction::Maximize => "<=",
        };
        let gap = self.tree.relative_gap();
        let rel_gap = if gap == 0.0 {
            "  0.0%".to_string()
        } else if gap < 0.001 {
            "< 0.1%".to_string()
        } else if gap <= 9.999 {
            format!("{:5.1}%", 100.0 * gap)
        } else {
            format!("{:6}", "")
        };
        format!(
            "+{:>6}: mip = {} {} {} {} ({}; {})",
            self.tree.lp().iteration_count(),
            best_mip,
            rho,
            best_bound,
            rel_gap,
            self.tree.active_count(),
            self.tree.explored_count()
        )
    }

    /// Summary of the search for the given exit.
    pub fn solution(&self, exit: SearchExit) -> MipSolution {
        let tree = &self.tree;
        let status = match exit {
            SearchExit::Finished if tree.best().is_some() => MipStatus::Optimal,
            SearchExit::Finished => MipStatus::Infeasible,
            SearchExit::Unbounded => MipStatus::Unbounded,
            SearchExit::IterationLimit => MipStatus::IterationLimit,
            SearchExit::TimeLimit => MipStatus::TimeLimit,
            SearchExit::Error => MipStatus::Error,
        };
        let bound = match (tree.best_bound(), tree.best()) {
            (Some(b), _) => b,
            (None, Some(best)) => best,
            (None, None) => tree.direction().worst(),
        };

        MipSolution {
            status,
            incumbent: tree.incumbent().cloned(),
            bound,
            gap: tree.relative_gap(),
            nodes_created: tree.created_count(),
            nodes_explored: tree.explored_count(),
            active_nodes: tree.active_count(),
            incumbent_updates: tree.incumbent_updates(),
            lp_iterations: tree.lp().iteration_count(),
            solve_time_ms: self.elapsed_ms(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{BranchingRule, NodeSelection};
    use solver_lp::{sparse, Bounds, SimplexLp};

    // max 8 x1 + 11 x2 + 6 x3 + 4 x4  s.t.  5 x1 + 7 x2 + 4 x3 + 3 x4 <= 14,
    // x binary. LP optimum 22 at (1, 1, 0.5, 0), integer optimum 21 at
    // (0, 1, 1, 1).
    fn example(dir: Direction) -> SearchTree<SimplexLp> {
        let mut lp = SimplexLp::new(1, 4, dir).unwrap();
        lp.load_matrix(&sparse::from_dense_rows(&[vec![5.0, 7.0, 4.0, 3.0]]))
            .unwrap();
        let sign = -dir.sign();
        for (j, c) in [8.0, 11.0, 6.0, 4.0].into_iter().enumerate() {
            lp.set_obj_coef(j, sign * c);
        }
        lp.set_bounds(0, Bounds::upper(14.0));
        for j in 0..4 {
            lp.set_bounds(1 + j, Bounds::double(0.0, 1.0));
        }
        let mut tree = SearchTree::new(lp);
        for j in 0..4 {
            tree.set_int_col(j, true);
        }
        tree
    }

    #[test]
    fn test_solves_to_optimality() {
        for rule in [
            BranchingRule::FirstFractional,
            BranchingRule::LastFractional,
            BranchingRule::MostFractional,
            BranchingRule::DriebeckTomlin,
        ] {
            for selection in [
                NodeSelection::DepthFirst,
                NodeSelection::BreadthFirst,
                NodeSelection::BestProjection,
                NodeSelection::BestBound,
            ] {
                let settings = MipSettings::default()
                    .with_branching(rule)
                    .with_node_selection(selection);
                let mut bnb = BranchAndBound::new(example(Direction::Maximize), settings);
                let exit = bnb.run();
                assert_eq!(exit, SearchExit::Finished, "{:?}/{:?}", rule, selection);

                let sol = bnb.solution(exit);
                assert_eq!(sol.status, MipStatus::Optimal);
                assert!((sol.obj_val().unwrap() - 21.0).abs() < 1e-6);
                assert_eq!(sol.x().unwrap(), &[0.0, 1.0, 1.0, 1.0]);
                assert_eq!(sol.active_nodes, 0);
                assert_eq!(sol.nodes_created, sol.nodes_explored);
                assert_eq!(sol.gap, 0.0);
            }
        }
    }

    #[test]
    fn test_minimization() {
        let mut bnb = BranchAndBound::new(example(Direction::Minimize), MipSettings::default());
        let exit = bnb.run();
        let sol = bnb.solution(exit);
        assert_eq!(sol.status, MipStatus::Optimal);
        assert!((sol.obj_val().unwrap() + 21.0).abs() < 1e-6);
        assert_eq!(sol.x().unwrap(), &[0.0, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_fathoming_is_idempotent() {
        let mut bnb = BranchAndBound::new(example(Direction::Maximize), MipSettings::default());
        assert_eq!(bnb.run(), SearchExit::Finished);
        assert_eq!(bnb.run(), SearchExit::Finished);
        assert_eq!(bnb.run(), SearchExit::Finished);
        assert!(bnb.tree().root().is_none());
    }

    #[test]
    fn test_infeasible() {
        // x1 + x2 = 1.5 has no integer point.
        let mut lp = SimplexLp::new(1, 2, Direction::Minimize).unwrap();
        lp.load_matrix(&sparse::from_dense_rows(&[vec![1.0, 1.0]])).unwrap();
        lp.set_bounds(0, Bounds::fixed(1.5));
        lp.set_bounds(1, Bounds::double(0.0, 1.0));
        lp.set_bounds(2, Bounds::double(0.0, 1.0));
        let mut tree = SearchTree::new(lp);
        tree.set_int_col(0, true);
        tree.set_int_col(1, true);

        let mut bnb = BranchAndBound::new(tree, MipSettings::default());
        let exit = bnb.run();
        let sol = bnb.solution(exit);
        assert_eq!(sol.status, MipStatus::Infeasible);
        assert!(!sol.has_solution());
        assert_eq!(sol.bound, f64::MAX);
    }

    #[test]
    fn test_unbounded_root() {
        let mut lp = SimplexLp::new(1, 2, Direction::Maximize).unwrap();
        lp.load_matrix(&sparse::from_dense_rows(&[vec![1.0, -1.0]])).unwrap();
        lp.set_obj_coef(0, 1.0);
        lp.set_bounds(0, Bounds::upper(0.5));
        lp.set_bounds(1, Bounds::lower(0.0));
        lp.set_bounds(2, Bounds::lower(0.0));
        let mut tree = SearchTree::new(lp);
        tree.set_int_col(0, true);

        let mut bnb = BranchAndBound::new(tree, MipSettings::default());
        let exit = bnb.run();
        assert_eq!(exit, SearchExit::Unbounded);
        assert_eq!(bnb.solution(exit).status, MipStatus::Unbounded);
    }

    #[test]
    fn test_time_limit() {
        let settings = MipSettings {
            time_limit_ms: Some(0),
            ..MipSettings::default()
        };
        let mut bnb = BranchAndBound::new(example(Direction::Maximize), settings);
        let exit = bnb.run();
        assert_eq!(exit, SearchExit::TimeLimit);
        let sol = bnb.solution(exit);
        assert_eq!(sol.status, MipStatus::TimeLimit);
        assert!(!sol.has_solution());
        assert_eq!(sol.active_nodes, 1);
    }

    #[test]
    fn test_no_candidate_examined_is_an_error() {
        let settings = MipSettings {
            branching_rule: BranchingRule::DriebeckTomlin,
            max_drtom_candidates: Some(0),
            ..MipSettings::default()
        };
        let mut bnb = BranchAndBound::new(example(Direction::Maximize), settings);
        let exit = bnb.run();
        assert_eq!(exit, SearchExit::Error);
        let sol = bnb.solution(exit);
        assert_eq!(sol.status, MipStatus::Error);
        assert!(!sol.has_solution());
        assert_eq!(sol.nodes_created, 1);
    }

    #[test]
    fn test_progress_line() {
        let bnb = BranchAndBound::new(example(Direction::Maximize), MipSettings::default());
        let line = bnb.progress_line();
        assert!(line.starts_with("+     0: mip =     not found yet <= "));
        assert!(line.ends_with("(1; 0)"));
        assert!(line.contains("+inf"));
    }
}
