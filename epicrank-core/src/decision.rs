//! Lifecycle-aware decision classifier
//!
//! Maps (VUFB, NDR, LAYER, NPV) onto a verdict with a rationale.
//!
//! Global invariants enforced:
//! - Exactly one verdict per evaluation, first matching rule wins
//! - The VUFB hard stop is evaluated before any lifecycle rule
//! - `gated` marks a structural policy block; a weak score alone never sets it
//! - Verdicts are tags only; display treatment belongs to the caller

use crate::epic::Lifecycle;
use crate::vufb::VUFB_PASS_THRESHOLD;
use serde::{Deserialize, Serialize};

/// BUILD phase requires at least this LAYER score
pub const BUILD_MIN_LAYER: f64 = 7.0;
/// NDR at or above this is a build-now candidate
pub const BUILD_IMMEDIATELY_NDR: f64 = 8.0;
/// NDR at or above this earns a prototype
pub const PROTOTYPE_NDR: f64 = 5.0;
/// DEFEND phase requires at least this NDR
pub const DEFEND_MIN_NDR: f64 = 8.0;

/// Recommendation tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    BuildImmediately,
    Prototype,
    HoldKill,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::BuildImmediately => "BUILD_IMMEDIATELY",
            Verdict::Prototype => "PROTOTYPE",
            Verdict::HoldKill => "HOLD_KILL",
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            Verdict::BuildImmediately => "BUILD IMMEDIATELY",
            Verdict::Prototype => "PROTOTYPE",
            Verdict::HoldKill => "HOLD/KILL",
        }
    }
}

/// Classifier output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub verdict: Verdict,
    pub rationale: String,
    pub gated: bool,
}

impl Decision {
    fn new(verdict: Verdict, rationale: impl Into<String>, gated: bool) -> Self {
        Decision {
            verdict,
            rationale: rationale.into(),
            gated,
        }
    }
}

/// Everything the rule table looks at
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecisionInputs {
    pub lifecycle: Lifecycle,
    pub vufb_score: f64,
    pub ndr_score: f64,
    pub layer_score: f64,
    pub npv: f64,
}

/// Classify an epic
///
/// Evaluation order:
/// 1. Global VUFB hard stop
/// 2. Lifecycle rule set (BUILD, DEFEND, GROW)
pub fn classify(inputs: &DecisionInputs) -> Decision {
    if inputs.vufb_score < VUFB_PASS_THRESHOLD {
        return Decision::new(Verdict::HoldKill, "Failed VUFB hard stop filter", true);
    }

    match inputs.lifecycle {
        Lifecycle::Build => classify_build(inputs),
        Lifecycle::Defend => classify_defend(inputs),
        Lifecycle::Grow => classify_grow(inputs),
    }
}

/// BUILD: LAYER gate, then NDR bands
fn classify_build(inputs: &DecisionInputs) -> Decision {
    let ndr = inputs.ndr_score;
    let layer = inputs.layer_score;

    if layer < BUILD_MIN_LAYER {
        return Decision::new(
            Verdict::HoldKill,
            format!(
                "BUILD phase requires LAYER ≥ {:.1} (current: {:.1}). Execution feasibility too risky.",
                BUILD_MIN_LAYER, layer
            ),
            true,
        );
    }
    if ndr >= BUILD_IMMEDIATELY_NDR {
        return Decision::new(
            Verdict::BuildImmediately,
            format!(
                "High NDR ({:.2}) + strong LAYER ({:.1}) justifies BUILD investment.",
                ndr, layer
            ),
            false,
        );
    }
    if ndr >= PROTOTYPE_NDR {
        return Decision::new(
            Verdict::Prototype,
            "Moderate NDR for BUILD phase. Start with pilot to validate assumptions.",
            false,
        );
    }
    Decision::new(
        Verdict::HoldKill,
        format!("NDR too low ({:.2}) for BUILD risk profile.", ndr),
        false,
    )
}

/// DEFEND: NDR gate, then NPV gate
fn classify_defend(inputs: &DecisionInputs) -> Decision {
    if inputs.ndr_score < DEFEND_MIN_NDR {
        return Decision::new(
            Verdict::HoldKill,
            format!(
                "DEFEND epics require NDR ≥ {:.1} (current: {:.2}).",
                DEFEND_MIN_NDR, inputs.ndr_score
            ),
            true,
        );
    }
    if inputs.npv < 0.0 {
        return Decision::new(
            Verdict::HoldKill,
            format!(
                "DEFEND epics require positive NPV (current: {:.0}K).",
                inputs.npv / 1000.0
            ),
            true,
        );
    }
    Decision::new(
        Verdict::BuildImmediately,
        "DEFEND criteria met: NDR ≥ 8.0 + positive NPV.",
        false,
    )
}

/// GROW: NDR bands only, never gated
fn classify_grow(inputs: &DecisionInputs) -> Decision {
    let ndr = inputs.ndr_score;

    if ndr >= BUILD_IMMEDIATELY_NDR {
        return Decision::new(
            Verdict::BuildImmediately,
            "High-confidence investment for growth phase.",
            false,
        );
    }
    if ndr >= PROTOTYPE_NDR {
        return Decision::new(
            Verdict::Prototype,
            "Phase-dependent rollout recommended.",
            false,
        );
    }
    Decision::new(
        Verdict::HoldKill,
        "Improve Fit/Feasibility before scaling.",
        false,
    )
}
