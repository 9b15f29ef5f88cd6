// =============================================================================
// Statistical Inference
// =============================================================================
//
// This module provides the inference side of the analysis:
//   - F-test p-values for the ANOVA table
//   - t-test p-values and confidence intervals for the coefficient table
//
// FOR ANALYSTS:
// -------------
// A p-value answers one narrow question: how surprising would a test
// statistic this extreme be if the term had no effect at all?
//
//   - p < 0.05   traditionally "significant" at the 5% level
//   - p < 0.01   "highly significant"
//
// IMPORTANT CAVEATS:
// - Statistical significance is not practical significance
// - With large samples, tiny effects become "significant"
// - Always look at effect magnitudes alongside the p-values
//
// =============================================================================

use statrs::distribution::{ContinuousCDF, FisherSnedecor, StudentsT};

use crate::error::{Result, VeloStatsError};
use crate::solvers::OLSResult;

// =============================================================================
// P-Values
// =============================================================================

/// Upper-tail p-value of an F statistic.
///
/// This is the "PR(>F)" column of the ANOVA table: the probability of an
/// F ratio at least this large under the null hypothesis that the term
/// explains nothing.
///
/// # Arguments
/// * `f` - The F statistic (term mean square / residual mean square)
/// * `df_num` - Numerator degrees of freedom (the term's)
/// * `df_den` - Denominator degrees of freedom (residual)
pub fn pvalue_f(f: f64, df_num: f64, df_den: f64) -> f64 {
    if !f.is_finite() || f < 0.0 || df_num <= 0.0 || df_den <= 0.0 {
        return f64::NAN;
    }

    match FisherSnedecor::new(df_num, df_den) {
        Ok(dist) => 1.0 - dist.cdf(f),
        Err(_) => f64::NAN,
    }
}

/// Calculate two-tailed p-value from a t-statistic.
///
/// Uses Student's t-distribution with specified degrees of freedom.
///
/// # Arguments
/// * `t` - The t-statistic (coefficient / standard_error)
/// * `df` - Degrees of freedom (n - p for OLS)
pub fn pvalue_t(t: f64, df: f64) -> f64 {
    if !t.is_finite() || df <= 0.0 {
        return f64::NAN;
    }

    let t_dist = match StudentsT::new(0.0, 1.0, df) {
        Ok(d) => d,
        Err(_) => return f64::NAN,
    };

    // Two-tailed test
    2.0 * (1.0 - t_dist.cdf(t.abs()))
}

// =============================================================================
// Confidence Intervals
// =============================================================================

/// Calculate confidence interval using the t-distribution.
///
/// # Arguments
/// * `estimate` - Point estimate (coefficient value)
/// * `std_error` - Standard error of the estimate
/// * `df` - Degrees of freedom
/// * `confidence` - Confidence level (e.g., 0.95 for 95% CI)
///
/// # Returns
/// (lower_bound, upper_bound)
pub fn confidence_interval_t(
    estimate: f64,
    std_error: f64,
    df: f64,
    confidence: f64,
) -> (f64, f64) {
    if !estimate.is_finite() || !std_error.is_finite() || std_error <= 0.0 || df <= 0.0 {
        return (f64::NAN, f64::NAN);
    }

    let t_dist = match StudentsT::new(0.0, 1.0, df) {
        Ok(d) => d,
        Err(_) => return (f64::NAN, f64::NAN),
    };

    let alpha = 1.0 - confidence;
    let t_critical = t_dist.inverse_cdf(1.0 - alpha / 2.0);

    let margin = t_critical * std_error;
    (estimate - margin, estimate + margin)
}

// =============================================================================
// Significance Stars (for summary tables)
// =============================================================================

/// Get significance stars for a p-value.
///
/// Returns a string of stars indicating significance level:
/// - "***" : p < 0.001
/// - "**"  : p < 0.01
/// - "*"   : p < 0.05
/// - "."   : p < 0.1
/// - ""    : p >= 0.1
pub fn significance_stars(pvalue: f64) -> &'static str {
    if pvalue < 0.001 {
        "***"
    } else if pvalue < 0.01 {
        "**"
    } else if pvalue < 0.05 {
        "*"
    } else if pvalue < 0.1 {
        "."
    } else {
        ""
    }
}

// =============================================================================
// Coefficient Table
// =============================================================================

/// One row of the fitted-model summary.
#[derive(Debug, Clone)]
pub struct CoefRow {
    pub name: String,
    pub estimate: f64,
    pub std_error: f64,
    pub t: f64,
    pub p: f64,
    pub ci: (f64, f64),
}

/// Build the coefficient summary of a fitted model.
///
/// One row per design-matrix column: estimate, standard error, t statistic,
/// two-tailed p-value and the confidence interval at `confidence`.
pub fn coef_table(
    fit: &OLSResult,
    column_names: &[String],
    confidence: f64,
) -> Result<Vec<CoefRow>> {
    if column_names.len() != fit.coefficients.len() {
        return Err(VeloStatsError::DimensionMismatch(format!(
            "{} names for {} coefficients",
            column_names.len(),
            fit.coefficients.len()
        )));
    }
    if confidence <= 0.0 || confidence >= 1.0 {
        return Err(VeloStatsError::InvalidValue(format!(
            "confidence level must be in (0, 1), got {}",
            confidence
        )));
    }

    Ok(column_names
        .iter()
        .enumerate()
        .map(|(j, name)| {
            let estimate = fit.coefficients[j];
            let std_error = fit.std_error(j);
            let t = estimate / std_error;
            CoefRow {
                name: name.clone(),
                estimate,
                std_error,
                t,
                p: pvalue_t(t, fit.df_resid),
                ci: confidence_interval_t(estimate, std_error, fit.df_resid, confidence),
            }
        })
        .collect())
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_pvalue_f_zero_statistic() {
        // F = 0 means the term explains nothing: p = 1
        assert_abs_diff_eq!(pvalue_f(0.0, 2.0, 10.0), 1.0, epsilon = 1e-10);
    }

    #[test]
    fn test_pvalue_f_large_statistic() {
        assert!(pvalue_f(50.0, 2.0, 20.0) < 1e-6);
    }

    #[test]
    fn test_pvalue_f_matches_squared_t() {
        // With 1 numerator df, F(1, df) is the square of t(df):
        // the two tests must agree
        let t = 2.3;
        let df = 14.0;
        let p_f = pvalue_f(t * t, 1.0, df);
        let p_t = pvalue_t(t, df);
        assert_abs_diff_eq!(p_f, p_t, epsilon = 1e-8);
    }

    #[test]
    fn test_pvalue_f_invalid_inputs() {
        assert!(pvalue_f(-1.0, 2.0, 10.0).is_nan());
        assert!(pvalue_f(1.0, 0.0, 10.0).is_nan());
        assert!(pvalue_f(f64::NAN, 2.0, 10.0).is_nan());
    }

    #[test]
    fn test_pvalue_t_zero() {
        // t = 0 should give p = 1 (no evidence against null)
        assert_abs_diff_eq!(pvalue_t(0.0, 10.0), 1.0, epsilon = 1e-10);
    }

    #[test]
    fn test_pvalue_t_symmetric() {
        let p_pos = pvalue_t(2.0, 12.0);
        let p_neg = pvalue_t(-2.0, 12.0);
        assert_abs_diff_eq!(p_pos, p_neg, epsilon = 1e-10);
    }

    #[test]
    fn test_confidence_interval_symmetric() {
        let (lower, upper) = confidence_interval_t(0.0, 1.0, 20.0, 0.95);
        assert_abs_diff_eq!(-lower, upper, epsilon = 1e-10);
        // t critical for df=20 at 95% is about 2.086
        assert_abs_diff_eq!(upper, 2.086, epsilon = 0.001);
    }

    #[test]
    fn test_significance_stars() {
        assert_eq!(significance_stars(0.0001), "***");
        assert_eq!(significance_stars(0.005), "**");
        assert_eq!(significance_stars(0.03), "*");
        assert_eq!(significance_stars(0.08), ".");
        assert_eq!(significance_stars(0.5), "");
    }

    #[test]
    fn test_coef_table_name_mismatch() {
        use ndarray::{array, Array2};
        let x = Array2::from_shape_vec((4, 1), vec![1.0; 4]).unwrap();
        let y = array![1.0, 2.0, 3.0, 4.0];
        let fit = crate::solvers::fit_ols(&y, &x).unwrap();
        assert!(coef_table(&fit, &["a".to_string(), "b".to_string()], 0.95).is_err());
    }

    #[test]
    fn test_coef_table_intercept_only() {
        use ndarray::{array, Array2};
        let x = Array2::from_shape_vec((4, 1), vec![1.0; 4]).unwrap();
        let y = array![1.0, 2.0, 3.0, 6.0];
        let fit = crate::solvers::fit_ols(&y, &x).unwrap();
        let rows = coef_table(&fit, &["Intercept".to_string()], 0.95).unwrap();
        assert_eq!(rows.len(), 1);
        // Estimate is the sample mean; SE is s/sqrt(n)
        assert_abs_diff_eq!(rows[0].estimate, 3.0, epsilon = 1e-12);
        let s = (14.0f64 / 3.0).sqrt();
        assert_abs_diff_eq!(rows[0].std_error, s / 2.0, epsilon = 1e-10);
        assert!(rows[0].ci.0 < 3.0 && rows[0].ci.1 > 3.0);
    }
}
