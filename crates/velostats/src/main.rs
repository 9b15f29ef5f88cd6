// =============================================================================
// velostats CLI
// =============================================================================
//
// Runs the full race-results analysis over a delimited data file:
// preview and column types, factor levels, outcome summaries (overall, per
// factor, two-way cell means), boxplots, a Type II two-way ANOVA with
// interaction, residual diagnostics plots, and a Shapiro-Wilk normality
// test on the residuals.
//
// =============================================================================

mod plots;
mod report;

use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use velostats_core::{
    anova_type2, build_design, cell_means, coef_table, describe, describe_by, fit_ols,
    parse_formula, qq_points, shapiro_wilk, Frame,
};

const PREVIEW_ROWS: usize = 5;
const CONFIDENCE: f64 = 0.95;

/// Exploratory and inferential analysis of cycling race results.
#[derive(Debug, Parser)]
#[command(name = "velostats", version, about)]
struct Args {
    /// Delimited data file (delimiter is auto-detected)
    #[arg(default_value = "cycling.txt")]
    data: PathBuf,

    /// Numeric outcome column
    #[arg(long, default_value = "points")]
    response: String,

    /// First categorical factor
    #[arg(long, default_value = "rider_class")]
    factor_a: String,

    /// Second categorical factor
    #[arg(long, default_value = "stage_class")]
    factor_b: String,

    /// Directory the PNG plots are written to
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// Also print the fitted model's coefficient table
    #[arg(long)]
    summary: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();
    run(&args)
}

fn run(args: &Args) -> anyhow::Result<()> {
    let frame = Frame::read_delimited(&args.data)
        .with_context(|| format!("failed to load {}", args.data.display()))?;

    // --- Exploration: preview, types, shape ---------------------------------
    println!("{}", report::preview(&frame, PREVIEW_ROWS));
    println!();
    println!("{}", report::dtypes(&frame));
    println!();
    let (rows, cols) = frame.shape();
    println!("({}, {})", rows, cols);
    println!();

    // --- Factor levels ------------------------------------------------------
    let (levels_a, codes_a) = frame.factorize(&args.factor_a)?;
    let (levels_b, codes_b) = frame.factorize(&args.factor_b)?;
    println!("{} levels: {:?}", args.factor_a, levels_a);
    println!("{} levels: {:?}", args.factor_b, levels_b);
    println!();

    // --- Outcome summaries --------------------------------------------------
    let outcome = frame.numeric(&args.response)?;
    println!("Summary of {}:", args.response);
    println!("{}", report::describe_single(&args.response, &describe(&outcome)?));
    println!();

    println!("Summary of {} by {}:", args.response, args.factor_a);
    let by_a = describe_by(&outcome, &codes_a, &levels_a)?;
    println!("{}", report::describe_groups(&args.factor_a, &by_a));
    println!();

    println!("Summary of {} by {}:", args.response, args.factor_b);
    let by_b = describe_by(&outcome, &codes_b, &levels_b)?;
    println!("{}", report::describe_groups(&args.factor_b, &by_b));
    println!();

    println!(
        "Mean {} by {} and {}:",
        args.response, args.factor_a, args.factor_b
    );
    let means = cell_means(&outcome, &codes_a, &levels_a, &codes_b, &levels_b)?;
    println!(
        "{}",
        report::cell_means(&args.factor_a, &levels_a, &levels_b, &means)
    );
    println!();

    // --- Boxplots -----------------------------------------------------------
    fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("failed to create {}", args.out_dir.display()))?;

    let groups_a = group_values(&outcome.to_vec(), &codes_a, levels_a.len());
    let box_a = args.out_dir.join(format!("box_{}_{}.png", short(&args.factor_a), args.response));
    plots::boxplot_by_factor(
        &box_a,
        &format!("Distribution of {} by {}", args.response, pretty(&args.factor_a)),
        &pretty_capitalized(&args.factor_a),
        &pretty_capitalized(&args.response),
        &levels_a,
        &groups_a,
    )
    .map_err(|e| anyhow::anyhow!("rendering {}: {}", box_a.display(), e))?;

    let groups_b = group_values(&outcome.to_vec(), &codes_b, levels_b.len());
    let box_b = args.out_dir.join(format!("box_{}_{}.png", short(&args.factor_b), args.response));
    plots::boxplot_by_factor(
        &box_b,
        &format!("Distribution of {} by {}", args.response, pretty(&args.factor_b)),
        &pretty_capitalized(&args.factor_b),
        &pretty_capitalized(&args.response),
        &levels_b,
        &groups_b,
    )
    .map_err(|e| anyhow::anyhow!("rendering {}: {}", box_b.display(), e))?;

    // --- Two-way ANOVA with interaction -------------------------------------
    let formula_text = format!(
        "{} ~ C({}) * C({})",
        args.response, args.factor_a, args.factor_b
    );
    log::info!("fitting {}", formula_text);
    let formula = parse_formula(&formula_text)?;
    let design = build_design(&frame, &formula)?;
    let fit = fit_ols(&design.response, &design.matrix)?;

    let anova = anova_type2(&design)?;
    println!("{}", report::anova(&anova));
    println!();

    if args.summary {
        let rows = coef_table(&fit, &design.column_names, CONFIDENCE)?;
        println!("{}", report::coef_summary(&rows, CONFIDENCE));
        println!();
    }

    // --- Residual diagnostics -----------------------------------------------
    let resid_path = args.out_dir.join("resid_vs_fitted.png");
    let fitted = fit.fitted_values.to_vec();
    let residuals = fit.residuals.to_vec();
    plots::residuals_vs_fitted(&resid_path, &fitted, &residuals)
        .map_err(|e| anyhow::anyhow!("rendering {}: {}", resid_path.display(), e))?;

    let qq_path = args.out_dir.join("qq_resid.png");
    let qq = qq_points(&fit.residuals)?;
    plots::qq_plot(&qq_path, &qq)
        .map_err(|e| anyhow::anyhow!("rendering {}: {}", qq_path.display(), e))?;

    let normality = shapiro_wilk(&residuals)?;
    println!(
        "Shapiro-Wilk test: statistic = {:.6}, p-value = {:.6}",
        normality.statistic, normality.p_value
    );

    Ok(())
}

/// Split the outcome into per-level groups, in level order.
fn group_values(values: &[f64], codes: &[usize], n_levels: usize) -> Vec<Vec<f64>> {
    let mut groups = vec![Vec::new(); n_levels];
    for (&v, &c) in values.iter().zip(codes) {
        groups[c].push(v);
    }
    groups
}

/// "rider_class" -> "rider" (for the plot file names the analysis has
/// always produced: box_rider_points.png, box_stage_points.png).
fn short(factor: &str) -> &str {
    factor.split('_').next().unwrap_or(factor)
}

/// "rider_class" -> "rider class"
fn pretty(name: &str) -> String {
    name.replace('_', " ")
}

/// "rider_class" -> "Rider class"
fn pretty_capitalized(name: &str) -> String {
    let text = pretty(name);
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_factor_name() {
        assert_eq!(short("rider_class"), "rider");
        assert_eq!(short("stage_class"), "stage");
        assert_eq!(short("team"), "team");
    }

    #[test]
    fn test_pretty_capitalized() {
        assert_eq!(pretty_capitalized("rider_class"), "Rider class");
        assert_eq!(pretty_capitalized("points"), "Points");
    }

    #[test]
    fn test_end_to_end_run() {
        use std::io::Write;

        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("cycling.txt");
        let mut f = std::fs::File::create(&data).unwrap();
        writeln!(f, "rider_class,stage_class,points").unwrap();
        for (rider, stage, points) in [
            ("climber", "flat", 10.0),
            ("climber", "flat", 12.0),
            ("climber", "mountain", 30.0),
            ("climber", "mountain", 34.0),
            ("sprinter", "flat", 40.0),
            ("sprinter", "flat", 44.0),
            ("sprinter", "mountain", 8.0),
            ("sprinter", "mountain", 6.0),
        ] {
            writeln!(f, "{},{},{}", rider, stage, points).unwrap();
        }

        let args = Args {
            data,
            response: "points".to_string(),
            factor_a: "rider_class".to_string(),
            factor_b: "stage_class".to_string(),
            out_dir: dir.path().to_path_buf(),
            summary: true,
        };
        run(&args).unwrap();

        for name in [
            "box_rider_points.png",
            "box_stage_points.png",
            "resid_vs_fitted.png",
            "qq_resid.png",
        ] {
            assert!(dir.path().join(name).exists(), "{} missing", name);
        }
    }
}
