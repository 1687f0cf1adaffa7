//! Evaluation pipeline - ties together VUFB, NDR, NPV and the decision classifier

use crate::decision::{self, DecisionInputs};
use crate::epic::Epic;
use crate::ndr;
use crate::npv;
use crate::report::{EpicAnalysis, EvaluatedEpic};
use crate::vufb;

/// Run every calculator on one epic
///
/// Pure: reads the epic, never mutates it, and returns the same result for
/// the same input.
pub fn evaluate_epic(epic: &Epic) -> EvaluatedEpic {
    let vufb = vufb::evaluate_vufb(&epic.spot_test1);
    let ndr = ndr::calculate_ndr(&epic.ndr);
    let cash_flow = npv::build_cash_flow_table(&epic.financial);
    let decision = decision::classify(&DecisionInputs {
        lifecycle: epic.lifecycle,
        vufb_score: vufb.score,
        ndr_score: ndr.ndr_score,
        layer_score: epic.ndr.layer.score,
        npv: cash_flow.npv,
    });

    tracing::debug!(
        epic_id = epic.id,
        vufb = vufb.score,
        ndr = ndr.ndr_score,
        npv = cash_flow.npv,
        verdict = decision.verdict.as_str(),
        gated = decision.gated,
        "evaluated epic"
    );

    EvaluatedEpic::new(
        epic,
        EpicAnalysis {
            vufb,
            ndr,
            cash_flow,
            decision,
        },
    )
}

/// Evaluate every epic, preserving input order
pub fn evaluate_epics(epics: &[Epic]) -> Vec<EvaluatedEpic> {
    epics.iter().map(evaluate_epic).collect()
}
