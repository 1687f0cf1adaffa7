//! epicrank core library - scoring and decision engine for epic triage

#![deny(warnings)]

// Global invariants enforced in this crate:
// - Every calculation is a pure function of its inputs
// - No global mutable state; the caller owns the epic collection
// - No randomness, clocks, threads, or async
// - The engine never fails on malformed numbers; strictness is opt-in
// - Identical input yields byte-for-byte identical output

pub mod analysis;
pub mod config;
pub mod decision;
pub mod draft;
pub mod epic;
pub mod input;
pub mod ndr;
pub mod npv;
pub mod report;
pub mod validate;
pub mod vufb;

pub use analysis::evaluate_epic;
pub use config::ResolvedConfig;
pub use decision::{Decision, Verdict};
pub use draft::EpicDraft;
pub use epic::{Epic, Lifecycle};
pub use report::{render_explain, render_json, render_text, sort_evaluated, EvaluatedEpic};

use anyhow::Result;

/// Evaluate and rank every epic
///
/// Gated epics sink to the bottom; the rest are ordered by NDR score
/// descending, ties keeping input order.
pub fn rank_epics(epics: &[Epic]) -> Vec<EvaluatedEpic> {
    sort_evaluated(analysis::evaluate_epics(epics))
}

/// Rank epics, then apply config filters
///
/// With `strict` set, any precondition violation fails the whole batch.
/// Otherwise violations are logged and the epics are scored as given.
/// Filters run on the ranked list; `top_n` is applied last.
pub fn rank_with_config(epics: &[Epic], config: &ResolvedConfig) -> Result<Vec<EvaluatedEpic>> {
    config.validate()?;

    if config.strict {
        validate::ensure_valid(epics)?;
    } else {
        for issue in validate::check_epics(epics) {
            tracing::warn!(
                epic_id = issue.epic_id,
                field = %issue.field,
                "{}",
                issue.message
            );
        }
    }

    let filtered = rank_epics(epics)
        .into_iter()
        .filter(|evaluated| config.should_include(evaluated));

    let final_epics = if let Some(top_n) = config.top_n {
        filtered.take(top_n).collect()
    } else {
        filtered.collect()
    };

    Ok(final_epics)
}
