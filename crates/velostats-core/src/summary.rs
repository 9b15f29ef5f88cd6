// =============================================================================
// Descriptive Statistics
// =============================================================================
//
// Numeric summaries of the outcome variable: overall, per level of a single
// factor, and as a two-way table of cell means. The eight-number summary
// (count, mean, std, min, quartiles, max) matches what pandas' `describe()`
// prints, including its quartile convention: linear interpolation between
// order statistics, so the summaries here are directly comparable with ones
// produced in a notebook.
//
// =============================================================================

use ndarray::{Array1, Array2};

use crate::error::{Result, VeloStatsError};

/// Eight-number summary of a numeric sample.
#[derive(Debug, Clone, PartialEq)]
pub struct Describe {
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation (n - 1 denominator). NaN for a single value.
    pub std: f64,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

/// Summarize a numeric sample.
pub fn describe(values: &Array1<f64>) -> Result<Describe> {
    let n = values.len();
    if n == 0 {
        return Err(VeloStatsError::EmptyInput(
            "cannot describe an empty sample".to_string(),
        ));
    }
    if values.iter().any(|v| !v.is_finite()) {
        return Err(VeloStatsError::InvalidValue(
            "sample contains non-finite values".to_string(),
        ));
    }

    let mut sorted: Vec<f64> = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let mean = values.sum() / n as f64;
    let std = if n > 1 {
        let ss: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
        (ss / (n - 1) as f64).sqrt()
    } else {
        f64::NAN
    };

    Ok(Describe {
        count: n,
        mean,
        std,
        min: sorted[0],
        q1: percentile(&sorted, 0.25),
        median: percentile(&sorted, 0.50),
        q3: percentile(&sorted, 0.75),
        max: sorted[n - 1],
    })
}

/// Quantile of a sorted sample with linear interpolation between
/// order statistics (the pandas/NumPy default).
pub fn percentile(sorted: &[f64], q: f64) -> f64 {
    debug_assert!(!sorted.is_empty());
    debug_assert!((0.0..=1.0).contains(&q));
    let pos = q * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    if lower == upper {
        sorted[lower]
    } else {
        let frac = pos - lower as f64;
        sorted[lower] + frac * (sorted[upper] - sorted[lower])
    }
}

/// One `Describe` per factor level, in level order.
///
/// `codes[i]` is the level index of observation i, as produced by
/// `Frame::factorize`.
pub fn describe_by(
    values: &Array1<f64>,
    codes: &[usize],
    levels: &[String],
) -> Result<Vec<(String, Describe)>> {
    if values.len() != codes.len() {
        return Err(VeloStatsError::DimensionMismatch(format!(
            "{} values for {} codes",
            values.len(),
            codes.len()
        )));
    }

    let mut groups: Vec<Vec<f64>> = vec![Vec::new(); levels.len()];
    for (&v, &c) in values.iter().zip(codes) {
        let group = groups.get_mut(c).ok_or_else(|| {
            VeloStatsError::InvalidValue(format!("level code {} out of range", c))
        })?;
        group.push(v);
    }

    levels
        .iter()
        .zip(groups)
        .map(|(level, group)| {
            let d = describe(&Array1::from_vec(group))?;
            Ok((level.clone(), d))
        })
        .collect()
}

/// Two-way table of cell means: rows follow `levels_a`, columns `levels_b`.
///
/// Empty cells come out as NaN, which is how a pivot table renders a factor
/// combination with no observations.
pub fn cell_means(
    values: &Array1<f64>,
    codes_a: &[usize],
    levels_a: &[String],
    codes_b: &[usize],
    levels_b: &[String],
) -> Result<Array2<f64>> {
    if values.len() != codes_a.len() || values.len() != codes_b.len() {
        return Err(VeloStatsError::DimensionMismatch(
            "values and factor codes must have the same length".to_string(),
        ));
    }

    let mut sums = Array2::<f64>::zeros((levels_a.len(), levels_b.len()));
    let mut counts = Array2::<f64>::zeros((levels_a.len(), levels_b.len()));
    for ((&v, &a), &b) in values.iter().zip(codes_a).zip(codes_b) {
        sums[[a, b]] += v;
        counts[[a, b]] += 1.0;
    }

    let mut means = Array2::<f64>::zeros((levels_a.len(), levels_b.len()));
    for i in 0..levels_a.len() {
        for j in 0..levels_b.len() {
            means[[i, j]] = if counts[[i, j]] > 0.0 {
                sums[[i, j]] / counts[[i, j]]
            } else {
                f64::NAN
            };
        }
    }
    Ok(means)
}
