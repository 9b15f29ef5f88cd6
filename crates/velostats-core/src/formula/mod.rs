//! Formula parsing for R-style model specifications.
//!
//! This module parses formulas like "points ~ C(rider_class) * C(stage_class)"
//! into structured components for design matrix construction.

use std::collections::HashSet;

use crate::error::{Result, VeloStatsError};

/// Parsed interaction term
#[derive(Debug, Clone, PartialEq)]
pub struct InteractionTerm {
    pub factors: Vec<String>,
    pub categorical_flags: Vec<bool>,
}

/// Result of parsing a formula
#[derive(Debug, Clone)]
pub struct ParsedFormula {
    pub response: String,
    pub main_effects: Vec<String>,
    pub interactions: Vec<InteractionTerm>,
    pub categorical_vars: HashSet<String>,
    pub has_intercept: bool,
}

/// Split formula RHS by '+', respecting parentheses
fn split_terms(rhs: &str) -> Vec<String> {
    let mut terms = Vec::new();
    let mut current = String::new();
    let mut depth = 0;

    for c in rhs.chars() {
        match c {
            '(' => {
                depth += 1;
                current.push(c);
            }
            ')' => {
                depth -= 1;
                current.push(c);
            }
            '+' if depth == 0 => {
                let term = current.trim().to_string();
                if !term.is_empty() {
                    terms.push(term);
                }
                current = String::new();
            }
            _ => {
                current.push(c);
            }
        }
    }

    let term = current.trim().to_string();
    if !term.is_empty() {
        terms.push(term);
    }

    terms
}

/// Clean variable name: "C(var)" -> "var"
fn clean_var_name(term: &str) -> String {
    let term = term.trim();
    if term.starts_with("C(") && term.ends_with(')') {
        term[2..term.len() - 1].to_string()
    } else {
        term.to_string()
    }
}

/// Check if term is categorical
fn is_categorical(term: &str, categorical_vars: &HashSet<String>) -> bool {
    let term = term.trim();
    if term.starts_with("C(") {
        return true;
    }
    categorical_vars.contains(&clean_var_name(term))
}

/// Parse a formula string into structured components.
///
/// Handles:
/// - Main effects: x1, x2, C(cat)
/// - Two-way interactions: x1:x2, x1*x2, C(cat):x
/// - Higher-order: x1:x2:x3
/// - Intercept removal: 0 + ... or -1
///
/// # Arguments
/// * `formula` - R-style formula like "points ~ C(rider_class) * C(stage_class)"
///
/// # Returns
/// Parsed formula structure with all terms identified
pub fn parse_formula(formula: &str) -> Result<ParsedFormula> {
    // Split into response and predictors
    let parts: Vec<&str> = formula.split('~').collect();
    if parts.len() != 2 {
        return Err(VeloStatsError::InvalidFormula(format!(
            "formula must contain exactly one '~': {}",
            formula
        )));
    }

    let response = parts[0].trim().to_string();
    if response.is_empty() {
        return Err(VeloStatsError::InvalidFormula(
            "formula has no response variable".to_string(),
        ));
    }
    let mut rhs = parts[1].trim().to_string();

    // Check for intercept removal
    let mut has_intercept = true;

    // Handle "0 +" or "0+"
    if rhs.starts_with("0 +") || rhs.starts_with("0+") {
        has_intercept = false;
        rhs = rhs[if rhs.starts_with("0 +") { 3 } else { 2 }..]
            .trim()
            .to_string();
    }

    // Handle "- 1" or "-1" at end
    if rhs.ends_with("- 1") || rhs.ends_with("-1") {
        has_intercept = false;
        let len = rhs.len();
        rhs = rhs[..len - if rhs.ends_with("- 1") { 3 } else { 2 }]
            .trim()
            .to_string();
        // Remove trailing +
        if rhs.ends_with('+') {
            rhs = rhs[..rhs.len() - 1].trim().to_string();
        }
    }

    // Find all C(...) categorical markers
    let mut categorical_vars = HashSet::new();
    let mut pos = 0;
    while let Some(start) = rhs[pos..].find("C(") {
        let abs_start = pos + start + 2;
        if let Some(end) = rhs[abs_start..].find(')') {
            let var = rhs[abs_start..abs_start + end].trim().to_string();
            categorical_vars.insert(var);
            pos = abs_start + end + 1;
        } else {
            break;
        }
    }

    // Split into terms
    let terms = split_terms(&rhs);
    if terms.is_empty() {
        return Err(VeloStatsError::InvalidFormula(
            "formula has no predictor terms".to_string(),
        ));
    }

    let mut main_effects = Vec::new();
    let mut interactions = Vec::new();

    for term in terms {
        if term.contains('*') {
            // Full interaction: a*b = a + b + a:b
            let factor_strs: Vec<&str> = term.split('*').collect();

            // Add main effects
            for f in &factor_strs {
                let clean = clean_var_name(f);
                if !main_effects.contains(&clean) {
                    main_effects.push(clean);
                }
            }

            // Add interaction
            let factors: Vec<String> = factor_strs.iter().map(|f| clean_var_name(f)).collect();
            let categorical_flags: Vec<bool> = factor_strs
                .iter()
                .map(|f| is_categorical(f, &categorical_vars))
                .collect();

            interactions.push(InteractionTerm {
                factors,
                categorical_flags,
            });
        } else if term.contains(':') {
            // Pure interaction: a:b (no main effects)
            let factor_strs: Vec<&str> = term.split(':').collect();
            let factors: Vec<String> = factor_strs.iter().map(|f| clean_var_name(f)).collect();
            let categorical_flags: Vec<bool> = factor_strs
                .iter()
                .map(|f| is_categorical(f, &categorical_vars))
                .collect();

            interactions.push(InteractionTerm {
                factors,
                categorical_flags,
            });
        } else {
            // Main effect
            let clean = clean_var_name(&term);
            if !clean.is_empty() && !main_effects.contains(&clean) {
                main_effects.push(clean);
            }
        }
    }

    Ok(ParsedFormula {
        response,
        main_effects,
        interactions,
        categorical_vars,
        has_intercept,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_formula() {
        let parsed = parse_formula("y ~ x1 + x2").unwrap();
        assert_eq!(parsed.response, "y");
        assert_eq!(parsed.main_effects, vec!["x1", "x2"]);
        assert!(parsed.interactions.is_empty());
        assert!(parsed.has_intercept);
    }

    #[test]
    fn test_parse_categorical() {
        let parsed = parse_formula("y ~ x1 + C(region)").unwrap();
        assert_eq!(parsed.main_effects, vec!["x1", "region"]);
        assert!(parsed.categorical_vars.contains("region"));
    }

    #[test]
    fn test_parse_interaction() {
        let parsed = parse_formula("y ~ x1*x2").unwrap();
        assert_eq!(parsed.main_effects, vec!["x1", "x2"]);
        assert_eq!(parsed.interactions.len(), 1);
        assert_eq!(parsed.interactions[0].factors, vec!["x1", "x2"]);
    }

    #[test]
    fn test_parse_two_way_categorical_star() {
        // The formula the race analysis fits
        let parsed = parse_formula("points ~ C(rider_class) * C(stage_class)").unwrap();
        assert_eq!(parsed.response, "points");
        assert_eq!(parsed.main_effects, vec!["rider_class", "stage_class"]);
        assert!(parsed.categorical_vars.contains("rider_class"));
        assert!(parsed.categorical_vars.contains("stage_class"));
        assert_eq!(parsed.interactions.len(), 1);
        assert_eq!(
            parsed.interactions[0].factors,
            vec!["rider_class", "stage_class"]
        );
        assert_eq!(parsed.interactions[0].categorical_flags, vec![true, true]);
    }

    #[test]
    fn test_no_intercept() {
        let parsed = parse_formula("y ~ 0 + x1 + x2").unwrap();
        assert!(!parsed.has_intercept);

        let parsed2 = parse_formula("y ~ x1 + x2 - 1").unwrap();
        assert!(!parsed2.has_intercept);
    }

    #[test]
    fn test_pure_interaction_adds_no_main_effects() {
        let parsed = parse_formula("y ~ x1:x2").unwrap();
        assert!(parsed.main_effects.is_empty());
        assert_eq!(parsed.interactions.len(), 1);
    }

    #[test]
    fn test_missing_tilde_is_error() {
        assert!(parse_formula("points + x1").is_err());
        assert!(parse_formula("a ~ b ~ c").is_err());
    }

    #[test]
    fn test_empty_response_is_error() {
        assert!(parse_formula(" ~ x1").is_err());
    }
}
