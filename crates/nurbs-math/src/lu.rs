//! Dense LU decomposition with partial pivoting.
//!
//! Decompose once, then solve for any number of right-hand sides via
//! forward/back substitution. The global interpolation solver uses this to
//! fit every dependent channel against the same collocation matrix.

use nalgebra::{DMatrix, DVector};
use nurbs_core::{Result, SplineError};

/// A square matrix factored as `P * A = L * U`.
///
/// `L` (unit lower triangular) and `U` (upper triangular) share the
/// factored storage; `pivots` records the row permutation.
#[derive(Debug, Clone)]
pub struct LuDecomposition {
    lu: DMatrix<f64>,
    pivots: Vec<usize>,
}

impl LuDecomposition {
    /// Factor a square matrix, consuming it.
    ///
    /// Fails with [`SplineError::SingularSystem`] when no nonzero pivot can
    /// be found for a column.
    pub fn new(mut a: DMatrix<f64>) -> Result<Self> {
        let n = a.nrows();
        if n == 0 || a.ncols() != n {
            return Err(SplineError::Precondition(format!(
                "LU decomposition requires a non-empty square matrix, got {}x{}",
                a.nrows(),
                a.ncols()
            )));
        }

        let mut pivots = vec![0usize; n];

        for k in 0..n {
            // Partial pivoting: pick the largest magnitude in column k.
            let mut pivot_row = k;
            let mut pivot_val = a[(k, k)].abs();
            for r in (k + 1)..n {
                let v = a[(r, k)].abs();
                if v > pivot_val {
                    pivot_val = v;
                    pivot_row = r;
                }
            }

            if pivot_val == 0.0 {
                return Err(SplineError::SingularSystem { pivot_row: k });
            }

            if pivot_row != k {
                a.swap_rows(pivot_row, k);
            }
            pivots[k] = pivot_row;

            let pivot = a[(k, k)];
            for r in (k + 1)..n {
                let factor = a[(r, k)] / pivot;
                a[(r, k)] = factor;
                for c in (k + 1)..n {
                    a[(r, c)] -= factor * a[(k, c)];
                }
            }
        }

        Ok(Self { lu: a, pivots })
    }

    pub fn len(&self) -> usize {
        self.lu.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.lu.nrows() == 0
    }

    /// Solve `A * x = b` in place using the stored permutation and factors.
    pub fn solve_in_place(&self, b: &mut DVector<f64>) -> Result<()> {
        let n = self.len();
        if b.len() != n {
            return Err(SplineError::Precondition(format!(
                "right-hand side has length {}, expected {}",
                b.len(),
                n
            )));
        }

        // Apply the row permutation.
        for k in 0..n {
            let p = self.pivots[k];
            if p != k {
                b.swap_rows(k, p);
            }
        }

        // Forward substitution with unit lower triangle.
        for k in 1..n {
            let mut sum = b[k];
            for c in 0..k {
                sum -= self.lu[(k, c)] * b[c];
            }
            b[k] = sum;
        }

        // Back substitution with upper triangle.
        for k in (0..n).rev() {
            let mut sum = b[k];
            for c in (k + 1)..n {
                sum -= self.lu[(k, c)] * b[c];
            }
            b[k] = sum / self.lu[(k, k)];
        }

        Ok(())
    }

    /// Solve `A * x = b`, returning a fresh solution vector.
    pub fn solve(&self, b: &DVector<f64>) -> Result<DVector<f64>> {
        let mut x = b.clone();
        self.solve_in_place(&mut x)?;
        Ok(x)
    }
}
