//! MIP problem representation.

use solver_lp::{sparse, Bounds, Direction, SimplexLp, SimplexSettings, VarStatus};
use sprs::CsMat;

use crate::error::{MipError, MipResult};

/// Relative distance below which a value is snapped to the nearest integer.
const SNAP_TOL: f64 = 1e-12;

/// Kind of a structural variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VarKind {
    /// Real-valued column.
    #[default]
    Continuous,

    /// Integer column.
    Integer,

    /// Integer column restricted to `{0, 1}`.
    Binary,
}

impl VarKind {
    /// True for integer and binary columns.
    pub fn is_integer(self) -> bool {
        !matches!(self, VarKind::Continuous)
    }
}

/// Mixed-integer linear problem.
///
/// ```text
/// minimize/maximize  c'x + c0
/// subject to         x_row = A x
///                    row and column bounds
///                    x_j integer for integer columns
/// ```
#[derive(Clone)]
pub struct MipProblem {
    /// Optimization direction.
    pub direction: Direction,

    /// Objective coefficients (length n).
    pub obj: Vec<f64>,

    /// Objective constant term.
    pub obj_const: f64,

    /// Constraint matrix (m x n).
    pub a: CsMat<f64>,

    /// Bounds on the row activities (length m).
    pub row_bounds: Vec<Bounds>,

    /// Bounds on the columns (length n).
    pub col_bounds: Vec<Bounds>,

    /// Column kinds (length n).
    pub kinds: Vec<VarKind>,

    /// Optional starting basis for the root relaxation (length m+n,
    /// rows first).
    pub basis: Option<Vec<VarStatus>>,
}

impl MipProblem {
    /// Create a problem with free rows and continuous non-negative columns.
    pub fn new(direction: Direction, obj: Vec<f64>, a: CsMat<f64>) -> Self {
        let (m, n) = a.shape();
        Self {
            direction,
            obj,
            obj_const: 0.0,
            a,
            row_bounds: vec![Bounds::free(); m],
            col_bounds: vec![Bounds::lower(0.0); n],
            kinds: vec![VarKind::Continuous; n],
            basis: None,
        }
    }

    /// Create a problem from dense constraint rows.
    pub fn from_dense(direction: Direction, obj: Vec<f64>, rows: &[Vec<f64>]) -> Self {
        Self::new(direction, obj, sparse::from_dense_rows(rows))
    }

    /// Set the bounds of row `i`.
    pub fn with_row_bounds(mut self, i: usize, bounds: Bounds) -> Self {
        self.row_bounds[i] = bounds;
        self
    }

    /// Set the bounds of column `j`.
    pub fn with_col_bounds(mut self, j: usize, bounds: Bounds) -> Self {
        self.col_bounds[j] = bounds;
        self
    }

    /// Set the kind of column `j`.
    pub fn with_kind(mut self, j: usize, kind: VarKind) -> Self {
        self.kinds[j] = kind;
        self
    }

    /// Mark every column as integer.
    pub fn all_integer(mut self) -> Self {
        self.kinds.fill(VarKind::Integer);
        self
    }

    /// Set the objective constant term.
    pub fn with_obj_const(mut self, c0: f64) -> Self {
        self.obj_const = c0;
        self
    }

    /// Number of rows.
    pub fn num_rows(&self) -> usize {
        self.a.rows()
    }

    /// Number of columns.
    pub fn num_cols(&self) -> usize {
        self.a.cols()
    }

    /// Number of integer columns (including binary).
    pub fn num_integers(&self) -> usize {
        self.kinds.iter().filter(|k| k.is_integer()).count()
    }

    /// Effective bounds of column `j`; binary columns are clipped to `[0, 1]`.
    pub fn effective_col_bounds(&self, j: usize) -> Bounds {
        let b = self.col_bounds[j];
        if self.kinds[j] != VarKind::Binary {
            return b;
        }
        let lb = if b.has_lower() { b.lb().max(0.0) } else { 0.0 };
        let ub = if b.has_upper() { b.ub().min(1.0) } else { 1.0 };
        Bounds::double(lb, ub)
    }

    /// Check dimensions, bounds and integrality requirements.
    pub fn validate(&self) -> MipResult<()> {
        let (m, n) = self.a.shape();
        if m < 1 || n < 1 {
            return Err(MipError::InvalidProblem(format!(
                "problem must have at least one row and one column, got {}x{}",
                m, n
            )));
        }
        if self.obj.len() != n || self.col_bounds.len() != n || self.kinds.len() != n {
            return Err(MipError::InvalidProblem(format!(
                "column data has lengths obj={}, bounds={}, kinds={}, expected {}",
                self.obj.len(),
                self.col_bounds.len(),
                self.kinds.len(),
                n
            )));
        }
        if self.row_bounds.len() != m {
            return Err(MipError::InvalidProblem(format!(
                "{} row bounds for {} rows",
                self.row_bounds.len(),
                m
            )));
        }
        if let Some(basis) = &self.basis {
            if basis.len() != m + n {
                return Err(MipError::InvalidProblem(format!(
                    "initial basis has {} entries, expected {}",
                    basis.len(),
                    m + n
                )));
            }
        }
        if self.num_integers() == 0 {
            return Err(MipError::InvalidProblem(
                "problem has no integer columns".to_string(),
            ));
        }

        for (i, b) in self.row_bounds.iter().enumerate() {
            check_bounds(b).map_err(|msg| MipError::InvalidProblem(format!("row {}: {}", i, msg)))?;
        }
        for j in 0..n {
            let b = self.effective_col_bounds(j);
            check_bounds(&b)
                .map_err(|msg| MipError::InvalidProblem(format!("column {}: {}", j, msg)))?;
            if self.kinds[j].is_integer() {
                let integral = |v: f64| !v.is_finite() || v == v.floor();
                if !(integral(b.lb()) && integral(b.ub())) {
                    return Err(MipError::InvalidProblem(format!(
                        "integer column {} has non-integer bounds {}",
                        j, b
                    )));
                }
            }
        }
        Ok(())
    }

    /// Copy of the problem with near-integral data snapped to integers.
    ///
    /// Bounds, matrix entries, objective coefficients and the constant
    /// term within a relative `1e-12` of an integer are rounded to it.
    pub fn snapped(&self) -> Self {
        let mut prob = self.clone();
        for b in prob.row_bounds.iter_mut().chain(prob.col_bounds.iter_mut()) {
            *b = snap_bounds(*b);
        }
        for v in prob.a.data_mut() {
            *v = snap(*v);
        }
        for c in &mut prob.obj {
            *c = snap(*c);
        }
        prob.obj_const = snap(prob.obj_const);
        prob
    }

    /// True if every feasible point has an integral objective value.
    ///
    /// Holds when the constant term is integral and every non-zero
    /// objective coefficient is integral and belongs to an integer column.
    pub fn objective_is_integral(&self) -> bool {
        if self.obj_const != self.obj_const.floor() {
            return false;
        }
        self.obj
            .iter()
            .zip(&self.kinds)
            .all(|(&c, kind)| c == 0.0 || (kind.is_integer() && c == c.floor()))
    }

    /// Build the LP relaxation of this problem.
    pub fn to_relaxation(&self, settings: SimplexSettings) -> MipResult<SimplexLp> {
        let (m, n) = self.a.shape();
        let mut lp = SimplexLp::with_settings(m, n, self.direction, settings)?;
        lp.load_matrix(&self.a)?;
        for (j, &c) in self.obj.iter().enumerate() {
            lp.set_obj_coef(j, c);
        }
        lp.set_obj_const(self.obj_const);
        for (i, &b) in self.row_bounds.iter().enumerate() {
            lp.set_bounds(i, b);
        }
        for j in 0..n {
            lp.set_bounds(m + j, self.effective_col_bounds(j));
        }

        for k in 0..m + n {
            let status = match &self.basis {
                Some(basis) => basis[k],
                None if k < m => VarStatus::Basic,
                None => VarStatus::AtLower,
            };
            lp.set_status(k, status);
        }
        Ok(lp)
    }
}

fn snap(v: f64) -> f64 {
    let temp = (v + 0.5).floor();
    if (v - temp).abs() / (1.0 + v.abs()) <= SNAP_TOL {
        temp
    } else {
        v
    }
}

fn snap_bounds(b: Bounds) -> Bounds {
    let lb = b.has_lower().then(|| snap(b.lb()));
    let ub = b.has_upper().then(|| snap(b.ub()));
    Bounds::from_options(lb, ub)
}

fn check_bounds(b: &Bounds) -> Result<(), String> {
    if (b.has_lower() && b.lb().is_nan()) || (b.has_upper() && b.ub().is_nan()) {
        return Err("bound is NaN".to_string());
    }
    if (b.has_lower() && !b.lb().is_finite()) || (b.has_upper() && !b.ub().is_finite()) {
        return Err(format!("infinite bound {}", b));
    }
    if b.lb() > b.ub() {
        return Err(format!("inverted bounds {}", b));
    }
    Ok(())
}
