// =============================================================================
// Analysis of Variance (Type II)
// =============================================================================
//
// THE BIG PICTURE
// ---------------
// An ANOVA table splits the variation in the response between the model
// terms. Each term's sum of squares is measured by model comparison: fit
// the model without the term, fit it with the term, and the drop in the
// residual sum of squares is the variation that term accounts for.
//
// WHY TYPE II
// -----------
// With unbalanced data (unequal cell counts - race results are never
// balanced) the classic sequential decomposition depends on the order the
// terms are written in the formula. Type II removes that order dependence:
// every term is tested after all other terms that do not contain it.
// For the two-factor model A * B this means:
//
//     SS(A)   = RSS(B)    - RSS(A + B)
//     SS(B)   = RSS(A)    - RSS(A + B)
//     SS(A:B) = RSS(A + B) - RSS(A + B + A:B)
//
// The F statistic for each term uses the full model's residual mean square
// as the denominator, matching `anova_lm(model, typ=2)` in statsmodels and
// `car::Anova` in R.
//
// =============================================================================

use ndarray::Axis;

use crate::design::Design;
use crate::error::Result;
use crate::inference::pvalue_f;
use crate::solvers::fit_ols;

/// One row of the ANOVA table.
///
/// The residual row has `f` and `p` set to None.
#[derive(Debug, Clone)]
pub struct AnovaRow {
    pub term: String,
    pub sum_sq: f64,
    pub df: f64,
    pub f: Option<f64>,
    pub p: Option<f64>,
}

/// A complete Type II ANOVA table: one row per model term, in model order,
/// followed by the residual row.
#[derive(Debug, Clone)]
pub struct AnovaTable {
    pub rows: Vec<AnovaRow>,
}

impl AnovaTable {
    /// The residual row (always last).
    pub fn residual(&self) -> &AnovaRow {
        self.rows.last().expect("table always has a residual row")
    }
}

/// Residual sum of squares of the model built from a subset of terms.
///
/// An empty subset without an intercept is the null model that predicts
/// zero everywhere, so its RSS is just y'y.
fn rss_of_subset(design: &Design, term_indices: &[usize]) -> Result<f64> {
    let mut cols: Vec<usize> = Vec::new();
    if design.has_intercept {
        cols.push(0);
    }
    for &t in term_indices {
        cols.extend(design.terms[t].columns.clone());
    }

    if cols.is_empty() {
        return Ok(design.response.iter().map(|y| y * y).sum());
    }

    let x = design.matrix.select(Axis(1), &cols);
    Ok(fit_ols(&design.response, &x)?.rss)
}

/// Compute the Type II ANOVA table for a built design.
///
/// The full model (all terms) is fitted once for the residual row and the
/// F denominators; each term then gets its pair of reduced-model fits.
pub fn anova_type2(design: &Design) -> Result<AnovaTable> {
    let full = fit_ols(&design.response, &design.matrix)?;
    let mse_full = full.sigma2;

    let mut rows = Vec::with_capacity(design.terms.len() + 1);

    for (idx, term) in design.terms.iter().enumerate() {
        // Terms that do not contain this one stay in both models.
        let base: Vec<usize> = design
            .terms
            .iter()
            .enumerate()
            .filter(|&(j, other)| j != idx && !other.contains(term))
            .map(|(j, _)| j)
            .collect();

        let mut with_term = base.clone();
        with_term.push(idx);
        with_term.sort_unstable();

        let rss_without = rss_of_subset(design, &base)?;
        let rss_with = rss_of_subset(design, &with_term)?;

        // Floating-point cancellation can leave a tiny negative difference
        let sum_sq = (rss_without - rss_with).max(0.0);
        let df = term.df() as f64;
        let f = (sum_sq / df) / mse_full;
        let p = pvalue_f(f, df, full.df_resid);

        log::debug!(
            "ANOVA term {}: sum_sq = {:.6}, df = {}, F = {:.6}",
            term.term,
            sum_sq,
            df,
            f
        );

        rows.push(AnovaRow {
            term: term.term.clone(),
            sum_sq,
            df,
            f: Some(f),
            p: Some(p),
        });
    }

    rows.push(AnovaRow {
        term: "Residual".to_string(),
        sum_sq: full.rss,
        df: full.df_resid,
        f: None,
        p: None,
    });

    Ok(AnovaTable { rows })
}
