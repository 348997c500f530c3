//! Explicit simplex tableau `T = B^{-1} [I | -A]`.
//!
//! The tableau is dense and updated by Gauss-Jordan pivots. A requested
//! basis is installed by starting from the slack basis (all rows basic,
//! `T = [I | -A]`) and pivoting the requested structurals in one by one.
//! Structurals that find no acceptable pivot stay non-basic, so the
//! result is always a valid basis.

use crate::problem::{Bounds, VarStatus};

pub(crate) struct Basis {
    m: usize,
    width: usize,

    /// `head[i]` is the ordinal of the variable basic in row `i`.
    head: Vec<usize>,

    /// `posn[k]` is the tableau row of `k` when it is basic.
    posn: Vec<Option<usize>>,

    /// Row-major `m x (m+n)`.
    tab: Vec<f64>,

    valid: bool,

    /// Pivots since the last factorisation.
    pivots: usize,
}

impl Basis {
    pub(crate) fn new(m: usize, n: usize) -> Self {
        Self {
            m,
            width: m + n,
            head: (0..m).collect(),
            posn: (0..m + n).map(|k| if k < m { Some(k) } else { None }).collect(),
            tab: vec![0.0; m * (m + n)],
            valid: false,
            pivots: 0,
        }
    }

    pub(crate) fn is_valid(&self) -> bool {
        self.valid
    }

    pub(crate) fn invalidate(&mut self) {
        self.valid = false;
    }

    pub(crate) fn pivots(&self) -> usize {
        self.pivots
    }

    pub(crate) fn head(&self, i: usize) -> usize {
        self.head[i]
    }

    pub(crate) fn posn(&self, k: usize) -> Option<usize> {
        self.posn[k]
    }

    pub(crate) fn row(&self, i: usize) -> &[f64] {
        &self.tab[i * self.width..(i + 1) * self.width]
    }

    pub(crate) fn entry(&self, i: usize, k: usize) -> f64 {
        self.tab[i * self.width + k]
    }

    /// Install the basis described by `status`, repairing it if needed.
    ///
    /// `a` is the dense row-major `m x n` constraint matrix. On return
    /// `status` marks exactly the `m` basic variables as `Basic`, and every
    /// non-basic status fits its bounds.
    pub(crate) fn factorize(
        &mut self,
        a: &[f64],
        bounds: &[Bounds],
        status: &mut [VarStatus],
        tol_piv: f64,
    ) -> usize {
        let m = self.m;
        let n = self.width - m;

        self.tab.fill(0.0);
        for i in 0..m {
            self.tab[i * self.width + i] = 1.0;
            for j in 0..n {
                self.tab[i * self.width + m + j] = -a[i * n + j];
            }
        }
        self.head = (0..m).collect();
        for (k, p) in self.posn.iter_mut().enumerate() {
            *p = if k < m { Some(k) } else { None };
        }

        let mut rejected = 0;
        for k in m..self.width {
            if !status[k].is_basic() {
                continue;
            }
            // Only rows the caller wants non-basic may leave.
            let mut best: Option<(usize, f64)> = None;
            for i in 0..m {
                let r = self.head[i];
                if r >= m || status[r].is_basic() {
                    continue;
                }
                let v = self.entry(i, k).abs();
                if v > tol_piv && best.map_or(true, |(_, bv)| v > bv) {
                    best = Some((i, v));
                }
            }
            match best {
                Some((i, _)) => self.pivot(i, k),
                None => {
                    status[k] = bounds[k].nonbasic_status(VarStatus::AtLower);
                    rejected += 1;
                }
            }
        }

        for k in 0..self.width {
            match self.posn[k] {
                Some(_) => status[k] = VarStatus::Basic,
                None => {
                    let current = if status[k].is_basic() {
                        VarStatus::AtLower
                    } else {
                        status[k]
                    };
                    status[k] = bounds[k].nonbasic_status(current);
                }
            }
        }

        self.valid = true;
        self.pivots = 0;
        if rejected > 0 {
            log::debug!("factorize: {} structural(s) could not enter the basis", rejected);
        }
        rejected
    }

    /// Gauss-Jordan pivot: `k` enters the basis in row `i`.
    pub(crate) fn pivot(&mut self, i: usize, k: usize) {
        let w = self.width;
        let piv = self.tab[i * w + k];
        debug_assert!(piv != 0.0);

        for v in &mut self.tab[i * w..(i + 1) * w] {
            *v /= piv;
        }
        let pivot_row: Vec<f64> = self.tab[i * w..(i + 1) * w].to_vec();

        for r in 0..self.m {
            if r == i {
                continue;
            }
            let f = self.tab[r * w + k];
            if f == 0.0 {
                continue;
            }
            for (v, p) in self.tab[r * w..(r + 1) * w].iter_mut().zip(&pivot_row) {
                *v -= f * p;
            }
            // Exact zero in the entering column.
            self.tab[r * w + k] = 0.0;
        }

        let leaving = self.head[i];
        self.posn[leaving] = None;
        self.head[i] = k;
        self.posn[k] = Some(i);
        self.pivots += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn free_bounds(count: usize) -> Vec<Bounds> {
        vec![Bounds::free(); count]
    }

    #[test]
    fn test_slack_basis() {
        // x_r = 2 x_0 + x_1
        let a = vec![2.0, 1.0];
        let mut basis = Basis::new(1, 2);
        let mut status = vec![VarStatus::Basic, VarStatus::AtLower, VarStatus::AtLower];
        let bounds = vec![Bounds::free(), Bounds::lower(0.0), Bounds::lower(0.0)];

        assert_eq!(basis.factorize(&a, &bounds, &mut status, 1e-9), 0);
        assert_eq!(basis.head(0), 0);
        assert_eq!(basis.row(0), &[1.0, -2.0, -1.0]);
    }

    #[test]
    fn test_structural_enters() {
        let a = vec![2.0, 1.0];
        let mut basis = Basis::new(1, 2);
        let mut status = vec![VarStatus::Free, VarStatus::Basic, VarStatus::Free];
        let bounds = free_bounds(3);

        assert_eq!(basis.factorize(&a, &bounds, &mut status, 1e-9), 0);
        assert_eq!(basis.head(0), 1);
        assert_eq!(basis.posn(0), None);
        // Row normalised on x_0: x_0 column is 1.
        assert!((basis.entry(0, 1) - 1.0).abs() < 1e-12);
        assert!((basis.entry(0, 0) + 0.5).abs() < 1e-12);
        assert!((basis.entry(0, 2) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_singular_request_is_repaired() {
        // Two structurals requested basic in a single-row problem.
        let a = vec![1.0, 1.0];
        let mut basis = Basis::new(1, 2);
        let mut status = vec![VarStatus::AtLower, VarStatus::Basic, VarStatus::Basic];
        let bounds = vec![Bounds::fixed(0.0), Bounds::lower(0.0), Bounds::lower(0.0)];

        assert_eq!(basis.factorize(&a, &bounds, &mut status, 1e-9), 1);
        let basic = status.iter().filter(|s| s.is_basic()).count();
        assert_eq!(basic, 1);
        assert_eq!(status[0], VarStatus::Fixed);
        assert_eq!(status[2], VarStatus::AtLower);
    }
}
