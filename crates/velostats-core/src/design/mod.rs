// =============================================================================
// Design Matrix Construction
// =============================================================================
//
// Turns a parsed formula plus a data frame into the numeric matrix an OLS
// solver can work with:
//
//   - Categorical variables become dummy (0/1) columns, one per
//     non-reference level. Column names follow the "C(var)[T.level]"
//     convention so tables line up with what statsmodels/patsy print.
//   - Interactions become elementwise products of the component columns.
//   - Each model term remembers which columns it owns (`TermSpan`), which
//     is what the ANOVA decomposition later removes term by term.
//
// REFERENCE CODING:
// -----------------
// With an intercept in the model, every categorical drops its first level:
// the intercept absorbs the reference cell and the dummies measure offsets
// from it. Without an intercept, the first categorical keeps all its levels
// so the model stays full rank.
//
// =============================================================================

use std::ops::Range;

use ndarray::{Array1, Array2};

use crate::error::{Result, VeloStatsError};
use crate::formula::ParsedFormula;
use crate::frame::Frame;

/// Dummy encoding of one categorical variable.
#[derive(Debug, Clone)]
pub struct EncodedFactor {
    /// n x k matrix of 0/1 indicator columns.
    pub matrix: Array2<f64>,
    /// One name per column, "C(var)[T.level]".
    pub names: Vec<String>,
}

/// The columns one model term contributes to the design matrix.
#[derive(Debug, Clone)]
pub struct TermSpan {
    /// Term label as it appears in the ANOVA table, e.g. "C(rider_class)".
    pub term: String,
    /// Half-open column range within the design matrix.
    pub columns: Range<usize>,
    /// Variables involved in the term (used for Type II containment).
    pub variables: Vec<String>,
}

impl TermSpan {
    /// Degrees of freedom the term contributes.
    pub fn df(&self) -> usize {
        self.columns.len()
    }

    /// Whether this term contains all of `other`'s variables (and more).
    /// "C(a):C(b)" contains "C(a)"; no term contains itself.
    pub fn contains(&self, other: &TermSpan) -> bool {
        self.variables.len() > other.variables.len()
            && other.variables.iter().all(|v| self.variables.contains(v))
    }
}

/// A fully built regression problem.
#[derive(Debug, Clone)]
pub struct Design {
    pub response: Array1<f64>,
    pub matrix: Array2<f64>,
    pub column_names: Vec<String>,
    pub terms: Vec<TermSpan>,
    pub has_intercept: bool,
}

/// Encode a categorical variable as dummy columns.
///
/// `codes` and `levels` come from `Frame::factorize`. With `drop_first`,
/// the first level becomes the reference and contributes no column.
pub fn encode_categorical(
    codes: &[usize],
    levels: &[String],
    var_name: &str,
    drop_first: bool,
) -> EncodedFactor {
    let skip = usize::from(drop_first);
    let kept: Vec<usize> = (skip..levels.len()).collect();

    let mut matrix = Array2::zeros((codes.len(), kept.len()));
    for (row, &code) in codes.iter().enumerate() {
        if let Some(col) = kept.iter().position(|&k| k == code) {
            matrix[[row, col]] = 1.0;
        }
    }

    let names = kept
        .iter()
        .map(|&k| format!("C({})[T.{}]", var_name, levels[k]))
        .collect();

    EncodedFactor { matrix, names }
}

/// One variable's contribution to the design: its columns and their names.
struct Block {
    names: Vec<String>,
    columns: Vec<Vec<f64>>,
}

fn variable_block(
    frame: &Frame,
    var: &str,
    categorical: bool,
    drop_first: bool,
) -> Result<Block> {
    if categorical {
        let (levels, codes) = frame.factorize(var)?;
        if levels.len() < 2 {
            return Err(VeloStatsError::InvalidValue(format!(
                "factor '{}' has a single level; nothing to contrast",
                var
            )));
        }
        let enc = encode_categorical(&codes, &levels, var, drop_first);
        let columns = (0..enc.matrix.ncols())
            .map(|j| enc.matrix.column(j).to_vec())
            .collect();
        Ok(Block {
            names: enc.names,
            columns,
        })
    } else {
        Ok(Block {
            names: vec![var.to_string()],
            columns: vec![frame.numeric(var)?.to_vec()],
        })
    }
}

/// Elementwise products of two blocks, names joined with ':'.
fn product_block(a: &Block, b: &Block) -> Block {
    let mut names = Vec::with_capacity(a.names.len() * b.names.len());
    let mut columns = Vec::with_capacity(a.columns.len() * b.columns.len());
    for (an, ac) in a.names.iter().zip(&a.columns) {
        for (bn, bc) in b.names.iter().zip(&b.columns) {
            names.push(format!("{}:{}", an, bn));
            columns.push(ac.iter().zip(bc).map(|(x, y)| x * y).collect());
        }
    }
    Block { names, columns }
}

fn term_label(var: &str, categorical: bool) -> String {
    if categorical {
        format!("C({})", var)
    } else {
        var.to_string()
    }
}

/// Build the design matrix for a parsed formula against a frame.
pub fn build_design(frame: &Frame, formula: &ParsedFormula) -> Result<Design> {
    let response = frame.numeric(&formula.response)?;
    let n = response.len();
    if n == 0 {
        return Err(VeloStatsError::EmptyInput(
            "frame has no rows".to_string(),
        ));
    }

    let mut column_names: Vec<String> = Vec::new();
    let mut columns: Vec<Vec<f64>> = Vec::new();
    let mut terms: Vec<TermSpan> = Vec::new();

    if formula.has_intercept {
        column_names.push("Intercept".to_string());
        columns.push(vec![1.0; n]);
    }

    // Without an intercept the first categorical keeps all levels.
    let mut seen_categorical = false;

    for var in &formula.main_effects {
        let categorical = formula.categorical_vars.contains(var);
        let drop_first = !categorical || formula.has_intercept || seen_categorical;
        if categorical {
            seen_categorical = true;
        }

        let block = variable_block(frame, var, categorical, drop_first)?;
        let start = columns.len();
        column_names.extend(block.names);
        columns.extend(block.columns);
        terms.push(TermSpan {
            term: term_label(var, categorical),
            columns: start..columns.len(),
            variables: vec![var.clone()],
        });
    }

    for interaction in &formula.interactions {
        let mut block: Option<Block> = None;
        for (var, &categorical) in interaction
            .factors
            .iter()
            .zip(&interaction.categorical_flags)
        {
            let next = variable_block(frame, var, categorical, true)?;
            block = Some(match block {
                None => next,
                Some(prev) => product_block(&prev, &next),
            });
        }
        let block = block.ok_or_else(|| {
            VeloStatsError::InvalidFormula("interaction with no factors".to_string())
        })?;

        let label = interaction
            .factors
            .iter()
            .zip(&interaction.categorical_flags)
            .map(|(v, &c)| term_label(v, c))
            .collect::<Vec<_>>()
            .join(":");

        let start = columns.len();
        column_names.extend(block.names);
        columns.extend(block.columns);
        terms.push(TermSpan {
            term: label,
            columns: start..columns.len(),
            variables: interaction.factors.clone(),
        });
    }

    let p = columns.len();
    let mut matrix = Array2::zeros((n, p));
    for (j, col) in columns.iter().enumerate() {
        for (i, &v) in col.iter().enumerate() {
            matrix[[i, j]] = v;
        }
    }

    Ok(Design {
        response,
        matrix,
        column_names,
        terms,
        has_intercept: formula.has_intercept,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formula::parse_formula;
    use crate::frame::Column;

    fn race_frame() -> Frame {
        // 2 rider classes x 2 stage classes, 2 observations per cell
        let rider = vec![
            "climber", "climber", "climber", "climber", "sprinter", "sprinter", "sprinter",
            "sprinter",
        ];
        let stage = vec![
            "flat", "flat", "mountain", "mountain", "flat", "flat", "mountain", "mountain",
        ];
        let points = vec![10.0, 12.0, 30.0, 34.0, 40.0, 44.0, 8.0, 6.0];
        Frame::new(
            vec![
                "rider_class".to_string(),
                "stage_class".to_string(),
                "points".to_string(),
            ],
            vec![
                Column::Str(rider.into_iter().map(String::from).collect()),
                Column::Str(stage.into_iter().map(String::from).collect()),
                Column::Float(points),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_encode_categorical_drop_first() {
        let levels = vec!["climber".to_string(), "sprinter".to_string()];
        let codes = vec![0, 1, 1, 0];
        let enc = encode_categorical(&codes, &levels, "rider_class", true);
        assert_eq!(enc.names, vec!["C(rider_class)[T.sprinter]"]);
        assert_eq!(
            enc.matrix.column(0).to_vec(),
            vec![0.0, 1.0, 1.0, 0.0]
        );
    }

    #[test]
    fn test_encode_categorical_full() {
        let levels = vec!["a".to_string(), "b".to_string()];
        let codes = vec![0, 1];
        let enc = encode_categorical(&codes, &levels, "x", false);
        assert_eq!(enc.matrix.ncols(), 2);
        assert_eq!(enc.matrix[[0, 0]], 1.0);
        assert_eq!(enc.matrix[[1, 1]], 1.0);
    }

    #[test]
    fn test_build_design_two_way() {
        let frame = race_frame();
        let formula = parse_formula("points ~ C(rider_class) * C(stage_class)").unwrap();
        let design = build_design(&frame, &formula).unwrap();

        // Intercept + 1 rider dummy + 1 stage dummy + 1 interaction column
        assert_eq!(design.matrix.ncols(), 4);
        assert_eq!(
            design.column_names,
            vec![
                "Intercept",
                "C(rider_class)[T.sprinter]",
                "C(stage_class)[T.mountain]",
                "C(rider_class)[T.sprinter]:C(stage_class)[T.mountain]",
            ]
        );
        assert_eq!(design.terms.len(), 3);
        assert_eq!(design.terms[0].term, "C(rider_class)");
        assert_eq!(design.terms[1].term, "C(stage_class)");
        assert_eq!(design.terms[2].term, "C(rider_class):C(stage_class)");
        assert_eq!(design.terms[2].columns, 3..4);

        // Interaction column is the product of the two dummies:
        // only sprinter-on-mountain rows are 1
        assert_eq!(
            design.matrix.column(3).to_vec(),
            vec![0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 1.0]
        );
    }

    #[test]
    fn test_term_containment() {
        let frame = race_frame();
        let formula = parse_formula("points ~ C(rider_class) * C(stage_class)").unwrap();
        let design = build_design(&frame, &formula).unwrap();
        let (a, b, ab) = (&design.terms[0], &design.terms[1], &design.terms[2]);
        assert!(ab.contains(a));
        assert!(ab.contains(b));
        assert!(!a.contains(b));
        assert!(!a.contains(a));
    }

    #[test]
    fn test_single_level_factor_rejected() {
        let frame = Frame::new(
            vec!["cls".to_string(), "points".to_string()],
            vec![
                Column::Str(vec!["only".to_string(), "only".to_string()]),
                Column::Float(vec![1.0, 2.0]),
            ],
        )
        .unwrap();
        let formula = parse_formula("points ~ C(cls)").unwrap();
        assert!(build_design(&frame, &formula).is_err());
    }

    #[test]
    fn test_unknown_variable_is_missing_column() {
        let frame = race_frame();
        let formula = parse_formula("points ~ C(team)").unwrap();
        assert!(matches!(
            build_design(&frame, &formula).unwrap_err(),
            VeloStatsError::MissingColumn(_)
        ));
    }
}
