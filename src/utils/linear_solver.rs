//! Dense linear solves with graceful degradation.
//!
//! Neither solver ever panics or returns non-finite entries. When a
//! factorization fails the next, more tolerant one is tried, and the method
//! that produced the answer is reported so callers can count fallbacks.

use log::warn;
use nalgebra::{DMatrix, DVector};
use ndarray::{Array1, Array2};

use crate::utils::matrix_convert::{
    nalgebra_vec_to_ndarray, ndarray_to_nalgebra, ndarray_vec_to_nalgebra,
};

/// Singular values below this (relative to machine epsilon scaling) are
/// treated as zero by the least-squares fallback.
const SVD_EPSILON: f64 = 1e-14;

/// Which factorization produced a solution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveMethod {
    Cholesky,
    Lu,
    /// Minimum-norm least squares via SVD; the system was singular.
    LeastSquares,
    /// Nothing worked; the solution is the zero vector.
    Failed,
}

impl SolveMethod {
    /// True when the primary factorization could not be used.
    pub fn is_fallback(self) -> bool {
        matches!(self, SolveMethod::LeastSquares | SolveMethod::Failed)
    }
}

/// Solution of a linear system together with how it was obtained.
#[derive(Debug, Clone)]
pub struct LinearSolution {
    pub x: Array1<f64>,
    pub method: SolveMethod,
}

fn all_finite(x: &DVector<f64>) -> bool {
    x.iter().all(|v| v.is_finite())
}

fn least_squares(a: DMatrix<f64>, b: &DVector<f64>) -> Option<DVector<f64>> {
    a.svd(true, true)
        .solve(b, SVD_EPSILON)
        .ok()
        .filter(all_finite)
}

/// Solve a symmetric system `A·x = b`.
///
/// Cholesky first, then full-pivot LU, then SVD least squares, then zeros.
pub fn solve_symmetric(a: &Array2<f64>, b: &Array1<f64>) -> LinearSolution {
    let n = b.len();
    if a.nrows() != n || a.ncols() != n {
        warn!(
            "linear system shape {}x{} does not match right-hand side of length {}",
            a.nrows(),
            a.ncols(),
            n
        );
        return LinearSolution {
            x: Array1::zeros(n),
            method: SolveMethod::Failed,
        };
    }

    let a_mat = ndarray_to_nalgebra(a);
    let b_vec = ndarray_vec_to_nalgebra(b);

    if let Some(chol) = a_mat.clone().cholesky() {
        let x = chol.solve(&b_vec);
        if all_finite(&x) {
            return LinearSolution {
                x: nalgebra_vec_to_ndarray(&x),
                method: SolveMethod::Cholesky,
            };
        }
    }

    let (x, method) = solve_general(a_mat, &b_vec);
    LinearSolution {
        x: nalgebra_vec_to_ndarray(&x),
        method,
    }
}

/// Solve a general square system `A·x = b`: full-pivot LU, then SVD least
/// squares, then the zero vector.
pub fn solve_general(a: DMatrix<f64>, b: &DVector<f64>) -> (DVector<f64>, SolveMethod) {
    let n = b.len();
    if a.nrows() != n || a.ncols() != n {
        return (DVector::zeros(n), SolveMethod::Failed);
    }

    if let Some(x) = a.clone().full_piv_lu().solve(b).filter(all_finite) {
        return (x, SolveMethod::Lu);
    }

    match least_squares(a, b) {
        Some(x) => (x, SolveMethod::LeastSquares),
        None => (DVector::zeros(n), SolveMethod::Failed),
    }
}
