//! Bounded-variable simplex engine.
//!
//! [`SimplexLp`] keeps an explicit dense tableau of the current basis and
//! warm-starts every [`SimplexLp::solve`] from the stored variable
//! statuses. A dual feasible starting basis is handed to the dual simplex
//! (which honours the objective limit), anything else to the composite
//! primal simplex.

mod basis;
mod dual;
mod primal;

use sprs::CsMat;

use crate::error::{LpError, LpResult};
use crate::problem::{
    BoundType, Bounds, Direction, DualStatus, PrimalStatus, Shift, SimplexSettings, SolveExit,
    VarStatus,
};
use basis::Basis;

/// LP problem together with its current basis and basic solution.
///
/// Variables are numbered `0..m` for rows and `m..m+n` for columns.
/// A freshly created problem has free basic rows and columns fixed at
/// zero.
pub struct SimplexLp {
    /// Number of rows.
    m: usize,

    /// Number of columns.
    n: usize,

    /// Optimization direction.
    dir: Direction,

    /// Objective coefficients of the columns.
    obj: Vec<f64>,

    /// Objective constant term.
    obj_const: f64,

    /// Constraint matrix, dense row-major `m x n`.
    a: Vec<f64>,

    /// Bounds of all `m+n` variables.
    bounds: Vec<Bounds>,

    /// Basis statuses of all `m+n` variables.
    status: Vec<VarStatus>,

    /// Factorised basis.
    basis: Basis,

    /// Primal values of the last basic solution.
    prim: Vec<f64>,

    /// Reduced costs of the last basic solution.
    dual: Vec<f64>,

    /// Objective value of the last basic solution.
    obj_val: f64,

    p_stat: PrimalStatus,
    d_stat: DualStatus,

    /// Simplex iterations over all solves.
    it_cnt: u64,

    /// Dual simplex stops once the objective is worse than this.
    obj_limit: Option<f64>,

    settings: SimplexSettings,
}

impl SimplexLp {
    /// Create an empty `m x n` problem with default settings.
    pub fn new(m: usize, n: usize, dir: Direction) -> LpResult<Self> {
        Self::with_settings(m, n, dir, SimplexSettings::default())
    }

    /// Create an empty `m x n` problem.
    pub fn with_settings(
        m: usize,
        n: usize,
        dir: Direction,
        settings: SimplexSettings,
    ) -> LpResult<Self> {
        if m == 0 || n == 0 {
            return Err(LpError::InvalidDimensions { rows: m, cols: n });
        }
        let mut bounds = vec![Bounds::free(); m];
        bounds.extend(std::iter::repeat(Bounds::fixed(0.0)).take(n));
        let mut status = vec![VarStatus::Basic; m];
        status.extend(std::iter::repeat(VarStatus::Fixed).take(n));

        Ok(Self {
            m,
            n,
            dir,
            obj: vec![0.0; n],
            obj_const: 0.0,
            a: vec![0.0; m * n],
            bounds,
            status,
            basis: Basis::new(m, n),
            prim: vec![0.0; m + n],
            dual: vec![0.0; m + n],
            obj_val: 0.0,
            p_stat: PrimalStatus::Undefined,
            d_stat: DualStatus::Undefined,
            it_cnt: 0,
            obj_limit: None,
            settings,
        })
    }

    /// Number of rows.
    pub fn num_rows(&self) -> usize {
        self.m
    }

    /// Number of columns.
    pub fn num_cols(&self) -> usize {
        self.n
    }

    /// Optimization direction.
    pub fn direction(&self) -> Direction {
        self.dir
    }

    /// Replace the constraint matrix.
    ///
    /// Any storage order is accepted. The basis must be re-factorised, so
    /// the next solve starts from the stored statuses.
    pub fn load_matrix(&mut self, a: &CsMat<f64>) -> LpResult<()> {
        if a.shape() != (self.m, self.n) {
            return Err(LpError::ShapeMismatch {
                expected: (self.m, self.n),
                actual: a.shape(),
            });
        }
        self.a.fill(0.0);
        for (&v, (i, j)) in a.iter() {
            self.a[i * self.n + j] += v;
        }
        self.basis.invalidate();
        self.clear_solution();
        Ok(())
    }

    /// Objective coefficient of column `j`.
    pub fn obj_coef(&self, j: usize) -> f64 {
        self.obj[j]
    }

    /// Set the objective coefficient of column `j`.
    pub fn set_obj_coef(&mut self, j: usize, coef: f64) {
        self.obj[j] = coef;
        self.clear_solution();
    }

    /// Objective constant term.
    pub fn obj_const(&self) -> f64 {
        self.obj_const
    }

    /// Set the objective constant term.
    pub fn set_obj_const(&mut self, value: f64) {
        self.obj_const = value;
    }

    /// Bounds of variable `k`.
    pub fn bounds(&self, k: usize) -> Bounds {
        self.bounds[k]
    }

    /// Set the bounds of variable `k`.
    ///
    /// A non-basic status is re-derived from the new bound kind. The
    /// factorisation and the stored solution are left untouched.
    pub fn set_bounds(&mut self, k: usize, bounds: Bounds) {
        self.bounds[k] = bounds;
        if !self.status[k].is_basic() {
            self.status[k] = bounds.nonbasic_status(self.status[k]);
        }
    }

    /// Basis status of variable `k`.
    pub fn status(&self, k: usize) -> VarStatus {
        self.status[k]
    }

    /// Set the basis status of variable `k`.
    ///
    /// Non-basic statuses that do not fit the bound kind are corrected.
    /// The factorisation stays usable as long as the set of basic
    /// variables ends up unchanged.
    pub fn set_status(&mut self, k: usize, status: VarStatus) {
        self.status[k] = if status.is_basic() {
            status
        } else {
            self.bounds[k].nonbasic_status(status)
        };
    }

    /// Primal value of variable `k` in the last basic solution.
    pub fn primal(&self, k: usize) -> f64 {
        self.prim[k]
    }

    /// Reduced cost of variable `k` in the last basic solution.
    ///
    /// Zero for basic variables.
    pub fn dual(&self, k: usize) -> f64 {
        self.dual[k]
    }

    /// Objective value of the last basic solution.
    pub fn objective_value(&self) -> f64 {
        self.obj_val
    }

    /// Primal status of the last basic solution.
    pub fn primal_status(&self) -> PrimalStatus {
        self.p_stat
    }

    /// Dual status of the last basic solution.
    pub fn dual_status(&self) -> DualStatus {
        self.d_stat
    }

    /// Simplex iterations performed over all solves.
    pub fn iteration_count(&self) -> u64 {
        self.it_cnt
    }

    /// Set the cumulative iteration limit.
    pub fn set_iteration_limit(&mut self, limit: Option<u64>) {
        self.settings.iteration_limit = limit;
    }

    /// Set the objective limit used by the dual simplex.
    pub fn set_objective_limit(&mut self, limit: Option<f64>) {
        self.obj_limit = limit;
    }

    /// Solve the LP starting from the stored basis.
    pub fn solve(&mut self) -> LpResult<SolveExit> {
        self.check_bounds()?;
        self.clear_solution();
        if !self.basis_is_current() {
            self.refactor();
        }
        self.compute_primal()?;

        let d = self.reduced_costs(|k| self.cost(k));
        if !self.is_primal_feasible() && self.is_dual_feasible(&d) {
            if let Some(exit) = self.dual_simplex()? {
                return Ok(exit);
            }
            log::debug!("dual simplex gave up, switching to primal");
        }
        self.primal_simplex()
    }

    /// Row of the current simplex tableau for basic variable `k`.
    ///
    /// Returns `(j, alfa_j)` over non-basic `j` with non-zero `alfa_j` such
    /// that `x_k = sum alfa_j x_j`.
    pub fn tableau_row(&self, k: usize) -> LpResult<Vec<(usize, f64)>> {
        if !self.basis_is_current() {
            return Err(LpError::BasisUnavailable);
        }
        let i = self.basis.posn(k).ok_or(LpError::NotBasic(k))?;
        Ok(self.row_of(i))
    }

    /// Dual ratio test on a tableau row against the stored reduced costs.
    ///
    /// `row` expresses a basic variable through non-basic ones (as
    /// returned by [`SimplexLp::tableau_row`]); `how` is the direction
    /// the basic variable has to move. Returns the non-basic variable
    /// that reaches a zero reduced cost first, or `None` if no variable
    /// can absorb the change.
    pub fn dual_ratio_test(&self, row: &[(usize, f64)], how: Shift, tol: f64) -> Option<usize> {
        self.ratio_test(row, how, tol, &self.dual)
    }

    fn clear_solution(&mut self) {
        self.p_stat = PrimalStatus::Undefined;
        self.d_stat = DualStatus::Undefined;
    }

    fn check_bounds(&self) -> LpResult<()> {
        for (k, b) in self.bounds.iter().enumerate() {
            let ok = match b.kind() {
                BoundType::Free => true,
                BoundType::Lower => b.lb().is_finite(),
                BoundType::Upper => b.ub().is_finite(),
                BoundType::Double | BoundType::Fixed => {
                    b.lb().is_finite() && b.ub().is_finite() && b.lb() <= b.ub()
                }
            };
            if !ok {
                return Err(LpError::InvalidBounds(k));
            }
        }
        Ok(())
    }

    /// Cost of variable `k` in the original objective.
    fn cost(&self, k: usize) -> f64 {
        if k < self.m {
            0.0
        } else {
            self.obj[k - self.m]
        }
    }

    /// The factorised basis matches the requested basic variables.
    fn basis_is_current(&self) -> bool {
        self.basis.is_valid()
            && self
                .status
                .iter()
                .enumerate()
                .all(|(k, s)| s.is_basic() == self.basis.posn(k).is_some())
    }

    fn refactor(&mut self) {
        self.basis
            .factorize(&self.a, &self.bounds, &mut self.status, self.settings.tol_piv);
    }

    fn refactor_if_due(&mut self) {
        if self.basis.pivots() >= self.settings.refactor_every {
            self.refactor();
        }
    }

    fn iteration_limit_reached(&self) -> bool {
        self.settings
            .iteration_limit
            .map_or(false, |limit| self.it_cnt >= limit)
    }

    /// `(j, -T[i][j])` over non-basic `j`.
    fn row_of(&self, i: usize) -> Vec<(usize, f64)> {
        self.basis
            .row(i)
            .iter()
            .enumerate()
            .filter(|&(j, &t)| t != 0.0 && self.basis.posn(j).is_none())
            .map(|(j, &t)| (j, -t))
            .collect()
    }

    /// Recompute all primal values from the non-basic ones.
    fn compute_primal(&mut self) -> LpResult<()> {
        for k in 0..self.m + self.n {
            if !self.status[k].is_basic() {
                self.prim[k] = self.bounds[k].nonbasic_value(self.status[k]);
            }
        }
        for i in 0..self.m {
            let mut x = 0.0;
            for (j, &t) in self.basis.row(i).iter().enumerate() {
                if t != 0.0 && !self.status[j].is_basic() {
                    x -= t * self.prim[j];
                }
            }
            if !x.is_finite() {
                return Err(LpError::NumericalFailure(format!(
                    "basic variable {} is not finite",
                    self.basis.head(i)
                )));
            }
            self.prim[self.basis.head(i)] = x;
        }
        Ok(())
    }

    /// Reduced costs of the non-basic variables for the given costs.
    ///
    /// Basic entries are zero.
    fn reduced_costs<F>(&self, cost: F) -> Vec<f64>
    where
        F: Fn(usize) -> f64,
    {
        let cb: Vec<f64> = (0..self.m).map(|i| cost(self.basis.head(i))).collect();
        (0..self.m + self.n)
            .map(|k| {
                if self.status[k].is_basic() {
                    return 0.0;
                }
                let mut d = cost(k);
                for (i, &c) in cb.iter().enumerate() {
                    if c != 0.0 {
                        d -= c * self.basis.entry(i, k);
                    }
                }
                d
            })
            .collect()
    }

    /// Bound violation of `x` scaled for the tolerance test.
    fn violation(&self, k: usize, x: f64) -> Option<Shift> {
        let b = self.bounds[k];
        let tol = self.settings.tol_bnd;
        if b.has_lower() && x < b.lb() - tol * (1.0 + b.lb().abs()) {
            Some(Shift::Increase)
        } else if b.has_upper() && x > b.ub() + tol * (1.0 + b.ub().abs()) {
            Some(Shift::Decrease)
        } else {
            None
        }
    }

    fn is_primal_feasible(&self) -> bool {
        (0..self.m).all(|i| {
            let k = self.basis.head(i);
            self.violation(k, self.prim[k]).is_none()
        })
    }

    /// Reduced costs `d` in the original sense have the right signs.
    fn is_dual_feasible(&self, d: &[f64]) -> bool {
        let s = self.dir.sign();
        let tol = self.settings.tol_dj;
        (0..self.m + self.n).all(|k| {
            let dk = s * d[k];
            match self.status[k] {
                VarStatus::Basic | VarStatus::Fixed => true,
                VarStatus::AtLower => dk >= -tol,
                VarStatus::AtUpper => dk <= tol,
                VarStatus::Free => dk.abs() <= tol,
            }
        })
    }

    fn ratio_test(&self, row: &[(usize, f64)], how: Shift, tol: f64, d: &[f64]) -> Option<usize> {
        let big = row.iter().fold(0.0_f64, |acc, &(_, v)| acc.max(v.abs()));
        let eps = tol * (1.0 + big);
        let dir = self.dir.sign();

        let mut best: Option<usize> = None;
        let mut teta = f64::MAX;
        let mut best_alfa = 0.0;
        for &(k, val) in row {
            let alfa = how.sign() * val;
            let temp = match self.status[k] {
                VarStatus::AtLower => {
                    if alfa < eps {
                        continue;
                    }
                    dir * d[k] / alfa
                }
                VarStatus::AtUpper => {
                    if alfa > -eps {
                        continue;
                    }
                    dir * d[k] / alfa
                }
                VarStatus::Free => {
                    if alfa.abs() < eps {
                        continue;
                    }
                    0.0
                }
                VarStatus::Fixed | VarStatus::Basic => continue,
            };
            let temp = temp.max(0.0);
            if temp < teta || (temp == teta && alfa.abs() > best_alfa) {
                best = Some(k);
                teta = temp;
                best_alfa = alfa.abs();
            }
        }
        best
    }

    /// Store duals and objective and set the final statuses.
    fn finish(&mut self, p_stat: PrimalStatus, d_stat: DualStatus) {
        self.dual = self.reduced_costs(|k| self.cost(k));
        self.obj_val = self.objective();
        self.p_stat = p_stat;
        self.d_stat = d_stat;
    }

    /// Objective of the current primal values.
    fn objective(&self) -> f64 {
        self.obj_const
            + self
                .obj
                .iter()
                .zip(&self.prim[self.m..])
                .map(|(c, x)| c * x)
                .sum::<f64>()
    }

    /// Pivot `q` into row `i`; the leaving variable goes to the bound
    /// given by `to`.
    fn pivot(&mut self, i: usize, q: usize, to: VarStatus) {
        let leaving = self.basis.head(i);
        self.basis.pivot(i, q);
        self.status[q] = VarStatus::Basic;
        self.status[leaving] = self.bounds[leaving].nonbasic_status(to);
        self.it_cnt += 1;
    }

    /// Statuses after an interrupted solve.
    fn finish_interrupted(&mut self) {
        let p = if self.is_primal_feasible() {
            PrimalStatus::Feasible
        } else {
            PrimalStatus::Infeasible
        };
        let d = self.reduced_costs(|k| self.cost(k));
        let ds = if self.is_dual_feasible(&d) {
            DualStatus::Feasible
        } else {
            DualStatus::Infeasible
        };
        self.finish(p, ds);
    }
}
