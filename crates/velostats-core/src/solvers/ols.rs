// =============================================================================
// Ordinary Least Squares
// =============================================================================
//
// THE BIG PICTURE
// ---------------
// We want coefficients b that minimize the squared prediction error
// ||y - X b||^2. Setting the gradient to zero gives the normal equations:
//
//     (X'X) b = X'y
//
// X'X is symmetric positive definite whenever X has full column rank, so a
// Cholesky factorization solves the system and also hands us (X'X)^-1,
// which is what standard errors and the coefficient table are built from:
//
//     Var(b) = s^2 (X'X)^-1,    s^2 = RSS / (n - p)
//
// WHEN IT FAILS
// -------------
// A singular X'X means collinear predictors - for dummy-coded factors that
// usually means a redundant column (e.g. a factor level that never varies,
// or full dummy coding next to an intercept). The solver reports this as a
// LinearAlgebra error rather than silently dropping columns.
//
// =============================================================================

use ndarray::{Array1, Array2};

use crate::convert::{solve_and_invert, to_dmatrix, to_dvector};
use crate::error::{Result, VeloStatsError};

/// Results from an ordinary least squares fit.
///
/// Contains everything needed for inference and diagnostics.
#[derive(Debug, Clone)]
pub struct OLSResult {
    /// The fitted coefficients b, in design-matrix column order.
    pub coefficients: Array1<f64>,

    /// Fitted values X b.
    pub fitted_values: Array1<f64>,

    /// Residuals y - X b.
    pub residuals: Array1<f64>,

    /// Residual sum of squares.
    pub rss: f64,

    /// Residual degrees of freedom, n - p.
    pub df_resid: f64,

    /// Error-variance estimate s^2 = RSS / df_resid.
    pub sigma2: f64,

    /// The (X'X)^-1 matrix - needed for standard errors.
    pub covariance_unscaled: Array2<f64>,
}

impl OLSResult {
    /// Standard error of coefficient j: sqrt(s^2 * (X'X)^-1_jj).
    pub fn std_error(&self, j: usize) -> f64 {
        (self.sigma2 * self.covariance_unscaled[[j, j]]).sqrt()
    }
}

/// Fit a linear model by ordinary least squares.
///
/// # Arguments
/// * `y` - Response variable (n)
/// * `x` - Design matrix (n x p), including the intercept column if desired
///
/// # Returns
/// * `Ok(OLSResult)` - Fitted model
/// * `Err(VeloStatsError)` - Dimension mismatch, empty input, no residual
///   degrees of freedom, or a singular normal-equations matrix
pub fn fit_ols(y: &Array1<f64>, x: &Array2<f64>) -> Result<OLSResult> {
    let n = y.len();
    let p = x.ncols();

    if x.nrows() != n {
        return Err(VeloStatsError::DimensionMismatch(format!(
            "X has {} rows but y has {} elements",
            x.nrows(),
            n
        )));
    }
    if n == 0 {
        return Err(VeloStatsError::EmptyInput("y is empty".to_string()));
    }
    if p == 0 {
        return Err(VeloStatsError::EmptyInput("X has no columns".to_string()));
    }
    if p >= n {
        return Err(VeloStatsError::InvalidValue(format!(
            "model has no residual degrees of freedom ({} parameters, {} observations)",
            p, n
        )));
    }

    // Normal equations: (X'X) b = X'y
    let x_nalg = to_dmatrix(x);
    let y_nalg = to_dvector(y);
    let xtx = x_nalg.transpose() * &x_nalg;
    let xty = x_nalg.transpose() * y_nalg;

    let (coefficients, covariance_unscaled) =
        solve_and_invert(&xtx, &xty, p).ok_or_else(|| {
            VeloStatsError::LinearAlgebra(
                "normal equations are singular; predictors are collinear".to_string(),
            )
        })?;

    let fitted_values = x.dot(&coefficients);
    let residuals = y - &fitted_values;
    let rss: f64 = residuals.iter().map(|r| r * r).sum();
    let df_resid = (n - p) as f64;
    let sigma2 = rss / df_resid;

    log::debug!(
        "OLS fit: n = {}, p = {}, rss = {:.6}, sigma2 = {:.6}",
        n,
        p,
        rss,
        sigma2
    );

    Ok(OLSResult {
        coefficients,
        fitted_values,
        residuals,
        rss,
        df_resid,
        sigma2,
        covariance_unscaled,
    })
}
