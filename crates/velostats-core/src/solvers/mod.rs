// =============================================================================
// Model Solvers
// =============================================================================
//
// This module contains the fitting algorithm for the linear models the
// analysis needs. ANOVA is a linear model with a Gaussian error and an
// identity link, so ordinary least squares is the whole story here:
//
//     y = X b + e,   b = argmin ||y - X b||^2
//
// solved through the normal equations (X'X) b = X'y with a Cholesky
// factorization (LU as fallback). The fitted model carries everything the
// ANOVA decomposition and the residual diagnostics need: fitted values,
// residuals, the residual sum of squares and (X'X)^-1.
//
// =============================================================================

mod ols;

pub use ols::{fit_ols, OLSResult};
