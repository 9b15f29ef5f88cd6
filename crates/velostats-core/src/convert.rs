// =============================================================================
// ndarray <-> nalgebra Conversion Utilities
// =============================================================================
//
// Arrays are stored as ndarray types (the public API of the crate), while
// the actual linear algebra runs on nalgebra. These helpers keep the
// boundary between the two in one place.
//
// =============================================================================

use nalgebra::{DMatrix, DVector};
use ndarray::{Array1, Array2};

/// Convert an ndarray matrix to a nalgebra one.
#[inline]
pub fn to_dmatrix(a: &Array2<f64>) -> DMatrix<f64> {
    // ndarray iterates in logical row-major order for any memory layout
    DMatrix::from_row_iterator(a.nrows(), a.ncols(), a.iter().copied())
}

/// Convert an ndarray vector to a nalgebra one.
#[inline]
pub fn to_dvector(v: &Array1<f64>) -> DVector<f64> {
    DVector::from_iterator(v.len(), v.iter().copied())
}

/// Convert a nalgebra vector back to ndarray.
#[inline]
pub fn to_array1(v: &DVector<f64>) -> Array1<f64> {
    Array1::from_vec(v.as_slice().to_vec())
}

/// Convert a nalgebra matrix back to ndarray.
#[inline]
pub fn to_array2(m: &DMatrix<f64>) -> Array2<f64> {
    let (nrows, ncols) = m.shape();
    let mut result = Array2::zeros((nrows, ncols));
    for i in 0..nrows {
        for j in 0..ncols {
            result[[i, j]] = m[(i, j)];
        }
    }
    result
}

/// Solve Ax = b and also return A^-1, using Cholesky if possible.
///
/// This is the pattern the OLS solver needs: the normal equations give the
/// coefficients, and the inverse is kept for covariance computation.
/// Falls back to LU when A is not positive definite; returns None when the
/// system is singular.
pub fn solve_and_invert(
    a: &DMatrix<f64>,
    b: &DVector<f64>,
    p: usize,
) -> Option<(Array1<f64>, Array2<f64>)> {
    if let Some(chol) = a.clone().cholesky() {
        let solution = chol.solve(b);
        let identity = DMatrix::identity(p, p);
        let inverse = chol.solve(&identity);
        Some((to_array1(&solution), to_array2(&inverse)))
    } else {
        let solution = a.clone().lu().solve(b)?;
        let inverse = a.clone().try_inverse()?;
        Some((to_array1(&solution), to_array2(&inverse)))
    }
}
