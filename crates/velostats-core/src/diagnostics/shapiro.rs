// =============================================================================
// Shapiro-Wilk Normality Test
// =============================================================================
//
// Implements Royston's AS R94 algorithm (Royston, 1995), the same method
// behind `scipy.stats.shapiro` and R's `shapiro.test`.
//
// THE STATISTIC
// -------------
// W measures how well the sorted sample correlates with the quantiles a
// normal sample of the same size is expected to have:
//
//     W = (sum a_i * x_(i))^2 / sum (x_i - mean)^2
//
// The weights a_i come from the expected normal order statistics (Blom
// scores), normalized, with polynomial corrections to the two tail weights
// for n > 5. W = 1 means a perfectly normal-looking sample; small W means
// the ordered sample bends away from the normal quantiles.
//
// THE P-VALUE
// -----------
// For n >= 12, ln(1 - W) is approximately normal with mean and standard
// deviation given by polynomials in ln(n); for 4 <= n <= 11 a different
// transformation and polynomials in n apply; n = 3 has an exact formula.
// The p-value is the upper tail of the resulting z statistic.
//
// =============================================================================

use statrs::distribution::{ContinuousCDF, Normal};

use crate::error::{Result, VeloStatsError};

/// Outcome of the Shapiro-Wilk test.
#[derive(Debug, Clone, Copy)]
pub struct ShapiroWilk {
    /// The W statistic, in (0, 1].
    pub statistic: f64,
    /// Probability of a W this small under normality.
    pub p_value: f64,
}

// Polynomial corrections for the largest weight (powers of 1/sqrt(n),
// highest first), Royston 1995.
const C1: [f64; 6] = [-2.706056, 4.434685, -2.071190, -0.147981, 0.221157, 0.0];
// Corrections for the second-largest weight.
const C2: [f64; 6] = [-3.582633, 5.682633, -1.752461, -0.293762, 0.042981, 0.0];
// Mean of the transformed statistic, 4 <= n <= 11 (powers of n).
const C3: [f64; 4] = [0.544, -0.39978, 0.025054, -6.714e-4];
// Log standard deviation, 4 <= n <= 11.
const C4: [f64; 4] = [1.3822, -0.77857, 0.062767, -2.0322e-3];
// Mean of ln(1 - W), n >= 12 (powers of ln n).
const C5: [f64; 4] = [-1.5861, -0.31082, -0.083751, 3.8915e-3];
// Log standard deviation, n >= 12.
const C6: [f64; 3] = [-0.4803, -0.082676, 3.0302e-3];
// Small-sample transform: gamma = -2.273 + 0.459 n.
const G: [f64; 2] = [-2.273, 0.459];

/// Evaluate a polynomial with coefficients in ascending order of power.
fn poly(coeffs: &[f64], x: f64) -> f64 {
    coeffs
        .iter()
        .rev()
        .fold(0.0, |acc, &c| acc * x + c)
}

/// Evaluate the tail-weight correction (C1/C2), whose coefficients are
/// stored highest power first with no constant term.
fn tail_poly(coeffs: &[f64; 6], u: f64) -> f64 {
    coeffs.iter().fold(0.0, |acc, &c| acc * u + c)
}

/// Run the Shapiro-Wilk test on a sample.
///
/// # Errors
/// Fewer than 3 observations, non-finite values, or a zero-range sample.
/// Samples beyond n = 5000 are accepted but the p-value approximation
/// degrades (a warning is logged), matching scipy's behavior.
pub fn shapiro_wilk(sample: &[f64]) -> Result<ShapiroWilk> {
    let n = sample.len();
    if n < 3 {
        return Err(VeloStatsError::EmptyInput(format!(
            "Shapiro-Wilk needs at least 3 observations, got {}",
            n
        )));
    }
    if sample.iter().any(|v| !v.is_finite()) {
        return Err(VeloStatsError::InvalidValue(
            "sample contains non-finite values".to_string(),
        ));
    }
    if n > 5000 {
        log::warn!(
            "Shapiro-Wilk p-value may be inaccurate for n = {} (> 5000)",
            n
        );
    }

    let mut x: Vec<f64> = sample.to_vec();
    x.sort_by(f64::total_cmp);
    if x[n - 1] - x[0] == 0.0 {
        return Err(VeloStatsError::InvalidValue(
            "sample has zero range; all values identical".to_string(),
        ));
    }

    let normal = Normal::new(0.0, 1.0).unwrap();

    // Expected normal order statistics (Blom scores)
    let m: Vec<f64> = (1..=n)
        .map(|i| normal.inverse_cdf((i as f64 - 0.375) / (n as f64 + 0.25)))
        .collect();
    let m_sum_sq: f64 = m.iter().map(|v| v * v).sum();

    // Weights: normalized scores with corrected tails
    let mut a = vec![0.0; n];
    if n == 3 {
        a[0] = -std::f64::consts::FRAC_1_SQRT_2;
        a[2] = std::f64::consts::FRAC_1_SQRT_2;
    } else {
        let u = 1.0 / (n as f64).sqrt();
        let norm = m_sum_sq.sqrt();
        let a_n = m[n - 1] / norm + tail_poly(&C1, u);

        if n > 5 {
            let a_n1 = m[n - 2] / norm + tail_poly(&C2, u);
            let phi = (m_sum_sq - 2.0 * m[n - 1] * m[n - 1] - 2.0 * m[n - 2] * m[n - 2])
                / (1.0 - 2.0 * a_n * a_n - 2.0 * a_n1 * a_n1);
            let phi_sqrt = phi.sqrt();
            a[n - 1] = a_n;
            a[n - 2] = a_n1;
            a[0] = -a_n;
            a[1] = -a_n1;
            for i in 2..n - 2 {
                a[i] = m[i] / phi_sqrt;
            }
        } else {
            let phi = (m_sum_sq - 2.0 * m[n - 1] * m[n - 1]) / (1.0 - 2.0 * a_n * a_n);
            let phi_sqrt = phi.sqrt();
            a[n - 1] = a_n;
            a[0] = -a_n;
            for i in 1..n - 1 {
                a[i] = m[i] / phi_sqrt;
            }
        }
    }

    // W = (sum a_i x_(i))^2 / sum (x - mean)^2
    let mean = x.iter().sum::<f64>() / n as f64;
    let numerator: f64 = a.iter().zip(&x).map(|(ai, xi)| ai * xi).sum();
    let denominator: f64 = x.iter().map(|xi| (xi - mean).powi(2)).sum();
    let w = (numerator * numerator / denominator).min(1.0);

    // P-value via Royston's normalizing transformations
    let p_value = if n == 3 {
        let stqr = (0.75f64).sqrt().asin();
        let p = 6.0 / std::f64::consts::PI * (w.sqrt().asin() - stqr);
        p.clamp(0.0, 1.0)
    } else if n <= 11 {
        let nf = n as f64;
        let gamma = poly(&G, nf);
        let y = -(gamma - (1.0 - w).ln()).ln();
        let mu = poly(&C3, nf);
        let sigma = poly(&C4, nf).exp();
        1.0 - normal.cdf((y - mu) / sigma)
    } else {
        let ln_n = (n as f64).ln();
        let y = (1.0 - w).ln();
        let mu = poly(&C5, ln_n);
        let sigma = poly(&C6, ln_n).exp();
        1.0 - normal.cdf((y - mu) / sigma)
    };

    Ok(ShapiroWilk {
        statistic: w,
        p_value,
    })
}
