// =============================================================================
// Residual Diagnostics
// =============================================================================
//
// The ANOVA F-tests assume roughly normal, equal-variance residuals. This
// module produces the material for checking that assumption:
//
//   - standardized residuals (for the Q-Q plot's 45-degree reference line
//     to be meaningful, residuals must be on the unit-variance scale)
//   - theoretical normal quantiles with Blom plotting positions, paired
//     with the sorted sample quantiles
//   - the Shapiro-Wilk normality test (see shapiro.rs)
//
// =============================================================================

mod shapiro;

pub use shapiro::{shapiro_wilk, ShapiroWilk};

use ndarray::Array1;
use statrs::distribution::{ContinuousCDF, Normal};

use crate::error::{Result, VeloStatsError};

/// Residuals divided by their sample standard deviation.
pub fn standardized_residuals(residuals: &Array1<f64>) -> Result<Array1<f64>> {
    let n = residuals.len();
    if n < 2 {
        return Err(VeloStatsError::EmptyInput(
            "need at least two residuals to standardize".to_string(),
        ));
    }
    let mean = residuals.sum() / n as f64;
    let ss: f64 = residuals.iter().map(|r| (r - mean).powi(2)).sum();
    let std = (ss / (n - 1) as f64).sqrt();
    if std == 0.0 {
        return Err(VeloStatsError::InvalidValue(
            "residuals have zero variance".to_string(),
        ));
    }
    Ok(residuals.mapv(|r| (r - mean) / std))
}

/// Theoretical normal quantiles for a sample of size n, using Blom
/// plotting positions (i - 3/8) / (n + 1/4) - the convention statsmodels
/// uses for its Q-Q plots.
pub fn normal_quantiles(n: usize) -> Array1<f64> {
    let normal = Normal::new(0.0, 1.0).unwrap();
    (1..=n)
        .map(|i| normal.inverse_cdf((i as f64 - 0.375) / (n as f64 + 0.25)))
        .collect()
}

/// The points of a normal Q-Q plot: (theoretical quantile, sample quantile)
/// pairs over the standardized, sorted residuals. Plotted against the line
/// y = x, departures from normality show up as curvature in the tails.
pub fn qq_points(residuals: &Array1<f64>) -> Result<Vec<(f64, f64)>> {
    let standardized = standardized_residuals(residuals)?;
    let mut sample: Vec<f64> = standardized.to_vec();
    sample.sort_by(f64::total_cmp);

    let theoretical = normal_quantiles(sample.len());
    Ok(theoretical.iter().copied().zip(sample).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_standardized_residuals_unit_scale() {
        let r = array![2.0, -2.0, 4.0, -4.0];
        let z = standardized_residuals(&r).unwrap();
        let mean = z.sum() / 4.0;
        let var: f64 = z.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / 3.0;
        assert_abs_diff_eq!(mean, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(var, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_standardized_residuals_zero_variance() {
        let r = array![1.0, 1.0, 1.0];
        assert!(standardized_residuals(&r).is_err());
    }

    #[test]
    fn test_normal_quantiles_antisymmetric() {
        let q = normal_quantiles(9);
        for i in 0..9 {
            assert_abs_diff_eq!(q[i], -q[8 - i], epsilon = 1e-10);
        }
        // Middle of an odd sample sits at the median
        assert_abs_diff_eq!(q[4], 0.0, epsilon = 1e-10);
    }

    #[test]
    fn test_normal_quantiles_increasing() {
        let q = normal_quantiles(20);
        for i in 1..20 {
            assert!(q[i] > q[i - 1]);
        }
    }

    #[test]
    fn test_qq_points_sorted_pairs() {
        let r = array![3.0, -1.0, 0.5, -2.5, 1.0];
        let pts = qq_points(&r).unwrap();
        assert_eq!(pts.len(), 5);
        // Both coordinates increase together
        for w in pts.windows(2) {
            assert!(w[1].0 > w[0].0);
            assert!(w[1].1 >= w[0].1);
        }
    }

    #[test]
    fn test_qq_points_of_normal_scores_hug_the_line() {
        // If the sample IS the set of normal scores, the Q-Q plot should
        // lie almost exactly on y = x
        let sample = normal_quantiles(25);
        let pts = qq_points(&sample).unwrap();
        for (theo, samp) in pts {
            assert_abs_diff_eq!(theo, samp, epsilon = 0.05);
        }
    }
}
