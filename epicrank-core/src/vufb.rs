//! VUFB strategic-fit gate
//!
//! Global invariants enforced:
//! - Scores are taken as given (no clamping)
//! - A score of exactly 5.0 passes

use crate::epic::{VufbFactor, VufbScores};
use serde::{Deserialize, Serialize};

/// Minimum VUFB average an epic needs to get past the hard stop
pub const VUFB_PASS_THRESHOLD: f64 = 5.0;

/// Gate outcome
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VufbResult {
    pub score: f64,
    pub passed: bool,
}

/// Mean of value, usability, feasibility and business
pub fn calculate_vufb(scores: &VufbScores) -> f64 {
    let total: f64 = VufbFactor::ALL
        .iter()
        .map(|f| scores.factor(*f).score)
        .sum();
    total / VufbFactor::ALL.len() as f64
}

/// Compute the VUFB average and apply the pass threshold
pub fn evaluate_vufb(scores: &VufbScores) -> VufbResult {
    let score = calculate_vufb(scores);
    VufbResult {
        score,
        passed: passes_gate(score),
    }
}

pub fn passes_gate(vufb_score: f64) -> bool {
    vufb_score >= VUFB_PASS_THRESHOLD
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::epic::FactorScore;

    fn scores(v: f64, u: f64, f: f64, b: f64) -> VufbScores {
        VufbScores {
            value: FactorScore::new(v),
            usability: FactorScore::new(u),
            feasibility: FactorScore::new(f),
            business: FactorScore::new(b),
        }
    }

    #[test]
    fn test_vufb_is_plain_mean() {
        let result = evaluate_vufb(&scores(4.0, 6.0, 8.0, 2.0));
        assert_eq!(result.score, 5.0);
        assert!(result.passed);
    }

    #[test]
    fn test_exactly_five_passes() {
        assert!(evaluate_vufb(&VufbScores::uniform(5.0)).passed);
    }

    #[test]
    fn test_below_five_fails() {
        let result = evaluate_vufb(&scores(5.0, 5.0, 5.0, 4.5));
        assert_eq!(result.score, 4.875);
        assert!(!result.passed);
    }

    #[test]
    fn test_out_of_range_not_clamped() {
        let result = evaluate_vufb(&scores(20.0, 0.0, 0.0, 0.0));
        assert_eq!(result.score, 5.0);
    }
}
