// =============================================================================
// velostats Core Library
// =============================================================================
//
// This is the entry point for the pure statistics library behind the
// `velostats` CLI. All the numerical work happens here - no terminal output,
// no plotting, no argument parsing.
//
// STRUCTURE:
// ----------
// The library is organized into modules, each handling a specific concern:
//
//   - frame:       Loading delimited files into a small column-typed table
//   - summary:     Descriptive statistics (overall, per factor level, cells)
//   - formula:     R-style model formulas ("points ~ C(a) * C(b)")
//   - design:      Dummy coding and design matrix construction
//   - solvers:     Ordinary least squares fitting
//   - anova:       Type II analysis-of-variance decomposition
//   - inference:   P-values, confidence intervals, coefficient tables
//   - diagnostics: Residual diagnostics and the Shapiro-Wilk normality test
//   - error:       Error types used throughout the library
//
// FOR MAINTAINERS:
// ----------------
// When adding new functionality:
//   1. Add it to the appropriate module (or create a new one)
//   2. Write tests in that module (see existing tests for examples)
//   3. Re-export public items here so users can access them easily
//
// =============================================================================

pub mod anova;
mod convert;
pub mod design;
pub mod diagnostics;
pub mod error;
pub mod formula;
pub mod frame;
pub mod inference;
pub mod solvers;
pub mod summary;

// Re-export commonly used items at the top level for convenience
pub use anova::{anova_type2, AnovaRow, AnovaTable};
pub use design::{build_design, Design, TermSpan};
pub use diagnostics::{qq_points, shapiro_wilk, standardized_residuals, ShapiroWilk};
pub use error::{Result, VeloStatsError};
pub use formula::{parse_formula, ParsedFormula};
pub use frame::{Column, Frame};
pub use inference::{coef_table, pvalue_f, pvalue_t, significance_stars, CoefRow};
pub use solvers::{fit_ols, OLSResult};
pub use summary::{cell_means, describe, describe_by, Describe};
