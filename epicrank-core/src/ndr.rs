//! NDR (Need / Desirability / Return) composite score
//!
//! Global invariants enforced:
//! - Benefit and financial sides are weighted equally
//! - The feasibility multiplier never drops below 0.5, so LAYER dampens the
//!   composite but cannot zero it
//! - Weights are fixed policy constants

use crate::epic::{NdrDimension, NdrScores};
use serde::{Deserialize, Serialize};

/// Weight of the benefit-side average in the composite
pub const BENEFIT_WEIGHT: f64 = 0.5;
/// Weight of the VCRM financial score in the composite
pub const FINANCE_WEIGHT: f64 = 0.5;
/// Feasibility multiplier at LAYER = 0
pub const FEASIBILITY_FLOOR: f64 = 0.5;

/// Percent split used when the composite is not positive
const EVEN_SPLIT_PERCENT: f64 = 50.0;

/// Score components of the NDR composite
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NdrBreakdown {
    pub benefit_score: f64,
    pub financial_score: f64,
    pub feas_mult: f64,
    pub ndr_score: f64,
}

/// How much of the composite comes from each side
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributionSplit {
    pub benefit_contribution: f64,
    pub finance_contribution: f64,
    pub benefit_percent: f64,
    pub finance_percent: f64,
}

/// Mean of the five benefit-side dimensions
pub fn calculate_benefit_score(scores: &NdrScores) -> f64 {
    let total: f64 = NdrDimension::BENEFIT
        .iter()
        .map(|d| scores.dimension(*d).score)
        .sum();
    total / NdrDimension::BENEFIT.len() as f64
}

/// Map LAYER in [1,10] onto [0.55, 1.0]
///
/// Formula: feasMult = 0.5 + 0.5 × (LAYER / 10)
pub fn calculate_feasibility_multiplier(layer_score: f64) -> f64 {
    FEASIBILITY_FLOOR + (1.0 - FEASIBILITY_FLOOR) * (layer_score / 10.0)
}

/// Calculate the full NDR breakdown
///
/// Formula:
/// NDR = (0.5 × benefit + 0.5 × VCRM) × feasMult
pub fn calculate_ndr(scores: &NdrScores) -> NdrBreakdown {
    let benefit_score = calculate_benefit_score(scores);
    let financial_score = scores.vcrm.score;
    let feas_mult = calculate_feasibility_multiplier(scores.layer.score);
    let ndr_score =
        (BENEFIT_WEIGHT * benefit_score + FINANCE_WEIGHT * financial_score) * feas_mult;

    NdrBreakdown {
        benefit_score,
        financial_score,
        feas_mult,
        ndr_score,
    }
}

impl NdrBreakdown {
    /// Split the composite into benefit and finance contributions
    ///
    /// Falls back to 50/50 when the composite is not positive.
    pub fn contribution_split(&self) -> ContributionSplit {
        let benefit_contribution = BENEFIT_WEIGHT * self.benefit_score * self.feas_mult;
        let finance_contribution = FINANCE_WEIGHT * self.financial_score * self.feas_mult;

        let (benefit_percent, finance_percent) = if self.ndr_score > 0.0 {
            (
                benefit_contribution / self.ndr_score * 100.0,
                finance_contribution / self.ndr_score * 100.0,
            )
        } else {
            (EVEN_SPLIT_PERCENT, EVEN_SPLIT_PERCENT)
        };

        ContributionSplit {
            benefit_contribution,
            finance_contribution,
            benefit_percent,
            finance_percent,
        }
    }
}
