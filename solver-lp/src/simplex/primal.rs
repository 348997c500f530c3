//! Composite primal simplex.
//!
//! Phase 1 minimises the sum of bound violations of the basic variables,
//! phase 2 the objective. Both use Dantzig pricing and switch to Bland's
//! rule after a run of degenerate steps. The ratio test stops at the first
//! breakpoint, including the entering variable's own opposite bound.

use super::SimplexLp;
use crate::error::{LpError, LpResult};
use crate::problem::{DualStatus, PrimalStatus, Shift, SolveExit, VarStatus};

/// Step length below which an iteration counts as degenerate.
const DEGENERATE_STEP: f64 = 1e-12;

/// Result of the primal ratio test.
enum Step {
    /// Basic variable in row `row` reaches a bound after `t`.
    Pivot { row: usize, t: f64, to: VarStatus },
    /// Entering variable reaches its opposite bound first.
    Flip,
    /// Nothing limits the step.
    Unbounded,
}

impl SimplexLp {
    pub(super) fn primal_simplex(&mut self) -> LpResult<SolveExit> {
        let mut degenerate = 0usize;
        loop {
            self.compute_primal()?;

            let phase1 = !self.is_primal_feasible();
            let d = if phase1 {
                self.reduced_costs(|k| self.phase1_cost(k))
            } else {
                let s = self.dir.sign();
                self.reduced_costs(|k| s * self.cost(k))
            };

            let bland = degenerate > self.settings.degenerate_switch;
            let Some((q, dir)) = self.choose_entering(&d, bland) else {
                if phase1 {
                    self.finish(PrimalStatus::NoFeasible, DualStatus::Undefined);
                } else {
                    self.finish(PrimalStatus::Feasible, DualStatus::Feasible);
                }
                return Ok(SolveExit::Ok);
            };

            if self.iteration_limit_reached() {
                self.finish_interrupted();
                return Ok(SolveExit::IterationLimit);
            }

            match self.primal_ratio_test(q, dir, phase1, bland) {
                Step::Pivot { row, t, to } => {
                    self.pivot(row, q, to);
                    if t < DEGENERATE_STEP {
                        degenerate += 1;
                    } else {
                        degenerate = 0;
                    }
                    self.refactor_if_due();
                }
                Step::Flip => {
                    self.status[q] = match self.status[q] {
                        VarStatus::AtLower => VarStatus::AtUpper,
                        _ => VarStatus::AtLower,
                    };
                    self.it_cnt += 1;
                    degenerate = 0;
                }
                Step::Unbounded => {
                    if phase1 {
                        return Err(LpError::NumericalFailure(format!(
                            "phase 1 ray along variable {}",
                            q
                        )));
                    }
                    self.finish(PrimalStatus::Feasible, DualStatus::NoFeasible);
                    return Ok(SolveExit::Ok);
                }
            }
        }
    }

    /// Phase 1 cost: pull infeasible basic variables toward their bounds.
    fn phase1_cost(&self, k: usize) -> f64 {
        if !self.status[k].is_basic() {
            return 0.0;
        }
        match self.violation(k, self.prim[k]) {
            Some(Shift::Increase) => -1.0,
            Some(Shift::Decrease) => 1.0,
            None => 0.0,
        }
    }

    /// Pick the entering variable and the direction it moves in.
    fn choose_entering(&self, d: &[f64], bland: bool) -> Option<(usize, Shift)> {
        let tol = self.settings.tol_dj;
        let mut best: Option<(usize, Shift, f64)> = None;
        for (k, &dk) in d.iter().enumerate() {
            let dir = match self.status[k] {
                VarStatus::AtLower if dk < -tol => Shift::Increase,
                VarStatus::AtUpper if dk > tol => Shift::Decrease,
                VarStatus::Free if dk.abs() > tol => {
                    if dk < 0.0 {
                        Shift::Increase
                    } else {
                        Shift::Decrease
                    }
                }
                _ => continue,
            };
            if bland {
                return Some((k, dir));
            }
            if best.map_or(true, |(_, _, score)| dk.abs() > score) {
                best = Some((k, dir, dk.abs()));
            }
        }
        best.map(|(k, dir, _)| (k, dir))
    }

    fn primal_ratio_test(&self, q: usize, dir: Shift, phase1: bool, bland: bool) -> Step {
        let tol_piv = self.settings.tol_piv;
        let mut best: Option<(usize, f64, VarStatus, f64)> = None;

        for i in 0..self.m {
            // Rate of change of the basic variable per unit step.
            let g = -self.basis.entry(i, q) * dir.sign();
            if g.abs() <= tol_piv {
                continue;
            }
            let k = self.basis.head(i);
            let b = self.bounds[k];
            let x = self.prim[k];

            let hit = match (phase1, self.violation(k, x)) {
                (true, Some(Shift::Increase)) if g > 0.0 => Some(((b.lb() - x) / g, VarStatus::AtLower)),
                (true, Some(Shift::Decrease)) if g < 0.0 => Some(((b.ub() - x) / g, VarStatus::AtUpper)),
                (true, Some(_)) => None,
                _ => {
                    if g < 0.0 && b.has_lower() {
                        Some((((x - b.lb()) / -g).max(0.0), VarStatus::AtLower))
                    } else if g > 0.0 && b.has_upper() {
                        Some((((b.ub() - x) / g).max(0.0), VarStatus::AtUpper))
                    } else {
                        None
                    }
                }
            };
            let Some((t, to)) = hit else { continue };

            let better = match best {
                None => true,
                Some((bi, bt, _, bg)) => {
                    if t < bt - DEGENERATE_STEP {
                        true
                    } else if t <= bt + DEGENERATE_STEP {
                        if bland {
                            k < self.basis.head(bi)
                        } else {
                            g.abs() > bg
                        }
                    } else {
                        false
                    }
                }
            };
            if better {
                best = Some((i, t, to, g.abs()));
            }
        }

        let own = {
            let b = self.bounds[q];
            if b.has_lower() && b.has_upper() {
                b.ub() - b.lb()
            } else {
                f64::INFINITY
            }
        };

        match best {
            Some((_, t, _, _)) if own <= t => Step::Flip,
            Some((row, t, to, _)) => Step::Pivot { row, t, to },
            None if own.is_finite() => Step::Flip,
            None => Step::Unbounded,
        }
    }
}
