//! Precondition checks for epic records
//!
//! The engine itself scores any finite input. Producers that want stricter
//! handling run these checks first and refuse records that fail them.

use crate::epic::{Epic, NdrDimension, VufbFactor};
use crate::npv::HORIZON_YEARS;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Lowest meaningful score
pub const MIN_SCORE: f64 = 1.0;
/// Highest meaningful score
pub const MAX_SCORE: f64 = 10.0;

/// One violated precondition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub epic_id: u64,
    /// Dotted field path, e.g. `ndr.layer.score`
    pub field: String,
    pub message: String,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "epic {}: {}: {}", self.epic_id, self.field, self.message)
    }
}

/// Collect every precondition the epic violates
pub fn check_epic(epic: &Epic) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    let mut push = |field: String, message: String| {
        issues.push(ValidationIssue {
            epic_id: epic.id,
            field,
            message,
        })
    };

    if epic.name.trim().is_empty() {
        push("name".to_string(), "must not be empty".to_string());
    }

    for factor in VufbFactor::ALL {
        let score = epic.spot_test1.factor(factor).score;
        if let Some(message) = score_problem(score) {
            push(format!("spotTest1.{}.score", factor.as_str()), message);
        }
    }

    for dimension in NdrDimension::ALL {
        let score = epic.ndr.dimension(dimension).score;
        if let Some(message) = score_problem(score) {
            push(format!("ndr.{}.score", dimension.as_str()), message);
        }
    }

    let financial = &epic.financial;
    for (field, value) in [
        ("financial.fixedCosts", financial.fixed_costs),
        ("financial.variableCosts", financial.variable_costs),
    ] {
        if !value.is_finite() {
            push(field.to_string(), format!("must be finite (got {})", value));
        } else if value < 0.0 {
            push(field.to_string(), format!("must be non-negative (got {})", value));
        }
    }

    if let Some(stated) = financial.total_investment_mismatch() {
        push(
            "financial.totalInvestment".to_string(),
            format!(
                "must equal fixedCosts + variableCosts ({}) (got {})",
                financial.total_investment(),
                stated
            ),
        );
    }

    let rate = financial.discount_rate;
    if !rate.is_finite() || rate <= -1.0 {
        push(
            "financial.discountRate".to_string(),
            format!("must be a finite rate above -1 (got {})", rate),
        );
    }

    for year in 1..=HORIZON_YEARS {
        for (series, value) in [
            ("yearlyRevenue", financial.revenue(year)),
            ("yearlyOpex", financial.opex(year)),
        ] {
            if !value.is_finite() {
                push(
                    format!("financial.{}[{}]", series, year),
                    format!("must be finite (got {})", value),
                );
            }
        }
    }

    issues
}

/// Check a batch, including that ids are unique
pub fn check_epics(epics: &[Epic]) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    let mut seen = HashSet::new();

    for epic in epics {
        if !seen.insert(epic.id) {
            issues.push(ValidationIssue {
                epic_id: epic.id,
                field: "id".to_string(),
                message: "duplicate id".to_string(),
            });
        }
        issues.extend(check_epic(epic));
    }

    issues
}

/// Fail with every issue listed if the batch violates any precondition
pub fn ensure_valid(epics: &[Epic]) -> Result<()> {
    let issues = check_epics(epics);
    if issues.is_empty() {
        return Ok(());
    }

    let listed = issues
        .iter()
        .map(|issue| format!("  - {}", issue))
        .collect::<Vec<_>>()
        .join("\n");
    anyhow::bail!("{} invalid field(s):\n{}", issues.len(), listed)
}

fn score_problem(score: f64) -> Option<String> {
    if !score.is_finite() {
        Some(format!("must be finite (got {})", score))
    } else if !(MIN_SCORE..=MAX_SCORE).contains(&score) {
        Some(format!(
            "must be within [{}, {}] (got {})",
            MIN_SCORE, MAX_SCORE, score
        ))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(id: u64) -> Epic {
        let mut epic = Epic::template(id);
        epic.name = "Checkout".to_string();
        epic
    }

    #[test]
    fn test_template_with_name_is_valid() {
        assert!(check_epic(&named(1)).is_empty());
        assert!(ensure_valid(&[named(1), named(2)]).is_ok());
    }

    #[test]
    fn test_empty_name_flagged() {
        let issues = check_epic(&Epic::template(1));
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].field, "name");
    }

    #[test]
    fn test_out_of_range_scores_flagged() {
        let mut epic = named(4);
        epic.ndr.layer.score = 11.0;
        epic.spot_test1.value.score = 0.5;
        epic.ndr.ai.score = f64::NAN;

        let fields: Vec<String> = check_epic(&epic).into_iter().map(|i| i.field).collect();
        assert_eq!(
            fields,
            vec!["spotTest1.value.score", "ndr.ai.score", "ndr.layer.score"]
        );
    }

    #[test]
    fn test_boundary_scores_accepted() {
        let mut epic = named(1);
        epic.ndr.layer.score = 1.0;
        epic.ndr.vcrm.score = 10.0;
        assert!(check_epic(&epic).is_empty());
    }

    #[test]
    fn test_financial_preconditions() {
        let mut epic = named(2);
        epic.financial.fixed_costs = -5.0;
        epic.financial.discount_rate = -1.0;
        epic.financial.yearly_opex = vec![0.0, f64::INFINITY];

        let fields: Vec<String> = check_epic(&epic).into_iter().map(|i| i.field).collect();
        assert_eq!(
            fields,
            vec![
                "financial.fixedCosts",
                "financial.discountRate",
                "financial.yearlyOpex[1]"
            ]
        );
    }

    #[test]
    fn test_stated_total_investment_checked_against_parts() {
        let mut epic = named(3);
        epic.financial.stated_total_investment = Some(120_000.0);
        assert!(check_epic(&epic).is_empty());

        epic.financial.stated_total_investment = Some(99.0);
        let issues = check_epic(&epic);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].field, "financial.totalInvestment");
        assert_eq!(
            issues[0].message,
            "must equal fixedCosts + variableCosts (120000) (got 99)"
        );
    }

    #[test]
    fn test_duplicate_ids_flagged() {
        let issues = check_epics(&[named(7), named(7)]);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].message, "duplicate id");
    }

    #[test]
    fn test_ensure_valid_lists_issues() {
        let err = ensure_valid(&[Epic::template(9)]).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("1 invalid field(s)"));
        assert!(message.contains("epic 9: name: must not be empty"));
    }
}
