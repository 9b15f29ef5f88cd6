// =============================================================================
// Terminal Tables
// =============================================================================
//
// Everything printed to the terminal goes through comfy-table so previews,
// summaries and the ANOVA table line up the same way. Numbers are rendered
// with six decimals where precision matters (test statistics, p-values) and
// shorter elsewhere.
//
// =============================================================================

use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Cell, CellAlignment, ContentArrangement, Table};
use ndarray::Array2;
use velostats_core::{significance_stars, AnovaTable, CoefRow, Describe, Frame};

fn base_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn num(v: f64) -> Cell {
    let text = if v.is_nan() {
        "NaN".to_string()
    } else {
        format!("{:.6}", v)
    };
    Cell::new(text).set_alignment(CellAlignment::Right)
}

/// First `n` rows of the frame.
pub fn preview(frame: &Frame, n: usize) -> Table {
    let mut table = base_table();
    table.set_header(frame.names().iter().map(String::as_str));
    for row in frame.head(n) {
        table.add_row(row);
    }
    table
}

/// Column name / inferred type listing.
pub fn dtypes(frame: &Frame) -> Table {
    let mut table = base_table();
    table.set_header(["column", "dtype"]);
    for (name, dtype) in frame.dtypes() {
        table.add_row([name, dtype]);
    }
    table
}

fn describe_header(table: &mut Table, label: &str) {
    table.set_header([
        label, "count", "mean", "std", "min", "25%", "50%", "75%", "max",
    ]);
}

fn describe_row(label: &str, d: &Describe) -> Vec<Cell> {
    vec![
        Cell::new(label),
        Cell::new(d.count).set_alignment(CellAlignment::Right),
        num(d.mean),
        num(d.std),
        num(d.min),
        num(d.q1),
        num(d.median),
        num(d.q3),
        num(d.max),
    ]
}

/// Overall summary of one numeric column.
pub fn describe_single(name: &str, d: &Describe) -> Table {
    let mut table = base_table();
    describe_header(&mut table, "");
    table.add_row(describe_row(name, d));
    table
}

/// Per-level summaries of the outcome grouped by a factor.
pub fn describe_groups(factor: &str, groups: &[(String, Describe)]) -> Table {
    let mut table = base_table();
    describe_header(&mut table, factor);
    for (level, d) in groups {
        table.add_row(describe_row(level, d));
    }
    table
}

/// Two-way table of cell means: factor A levels down, factor B across.
pub fn cell_means(
    factor_a: &str,
    levels_a: &[String],
    levels_b: &[String],
    means: &Array2<f64>,
) -> Table {
    let mut table = base_table();
    let mut header = vec![factor_a.to_string()];
    header.extend(levels_b.iter().cloned());
    table.set_header(header);
    for (i, level) in levels_a.iter().enumerate() {
        let mut row = vec![Cell::new(level)];
        for j in 0..levels_b.len() {
            row.push(num(means[[i, j]]));
        }
        table.add_row(row);
    }
    table
}

/// The ANOVA table in statsmodels' column layout, plus significance codes.
pub fn anova(table_data: &AnovaTable) -> Table {
    let mut table = base_table();
    table.set_header(["", "sum_sq", "df", "F", "PR(>F)", ""]);
    for row in &table_data.rows {
        let f_cell = row.f.map(num).unwrap_or_else(|| Cell::new(""));
        let (p_cell, stars) = match row.p {
            Some(p) => (num(p), significance_stars(p)),
            None => (Cell::new(""), ""),
        };
        table.add_row(vec![
            Cell::new(&row.term),
            num(row.sum_sq),
            Cell::new(format!("{:.1}", row.df)).set_alignment(CellAlignment::Right),
            f_cell,
            p_cell,
            Cell::new(stars),
        ]);
    }
    table
}

/// Coefficient summary of the fitted model.
pub fn coef_summary(rows: &[CoefRow], confidence: f64) -> Table {
    let mut table = base_table();
    let lower = (1.0 - confidence) / 2.0 * 100.0;
    let upper = (1.0 + confidence) / 2.0 * 100.0;
    table.set_header([
        "".to_string(),
        "coef".to_string(),
        "std err".to_string(),
        "t".to_string(),
        "P>|t|".to_string(),
        format!("[{:.1}%", lower),
        format!("{:.1}%]", upper),
    ]);
    for row in rows {
        table.add_row(vec![
            Cell::new(&row.name),
            num(row.estimate),
            num(row.std_error),
            num(row.t),
            num(row.p),
            num(row.ci.0),
            num(row.ci.1),
        ]);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use velostats_core::{anova_type2, build_design, parse_formula, Column};

    fn race_frame() -> Frame {
        Frame::new(
            vec![
                "rider_class".to_string(),
                "stage_class".to_string(),
                "points".to_string(),
            ],
            vec![
                Column::Str(
                    ["climber", "climber", "climber", "climber", "sprinter", "sprinter",
                     "sprinter", "sprinter"]
                        .iter()
                        .map(|s| s.to_string())
                        .collect(),
                ),
                Column::Str(
                    ["flat", "flat", "mountain", "mountain", "flat", "flat", "mountain",
                     "mountain"]
                        .iter()
                        .map(|s| s.to_string())
                        .collect(),
                ),
                Column::Float(vec![10.0, 12.0, 30.0, 34.0, 40.0, 44.0, 8.0, 6.0]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_preview_contains_header_and_rows() {
        let frame = race_frame();
        let rendered = preview(&frame, 2).to_string();
        assert!(rendered.contains("rider_class"));
        assert!(rendered.contains("climber"));
        // Only the first two rows requested
        assert!(!rendered.contains("sprinter"));
    }

    #[test]
    fn test_anova_table_layout() {
        let frame = race_frame();
        let formula = parse_formula("points ~ C(rider_class) * C(stage_class)").unwrap();
        let design = build_design(&frame, &formula).unwrap();
        let table = anova_type2(&design).unwrap();
        let rendered = anova(&table).to_string();
        assert!(rendered.contains("sum_sq"));
        assert!(rendered.contains("PR(>F)"));
        assert!(rendered.contains("C(rider_class):C(stage_class)"));
        assert!(rendered.contains("Residual"));
    }

    #[test]
    fn test_cell_means_nan_rendered() {
        let means = Array2::from_shape_vec((1, 2), vec![1.5, f64::NAN]).unwrap();
        let rendered = cell_means(
            "rider_class",
            &["climber".to_string()],
            &["flat".to_string(), "mountain".to_string()],
            &means,
        )
        .to_string();
        assert!(rendered.contains("NaN"));
    }
}
