//! Ranking and output generation
//!
//! Global invariants enforced:
//! - Gated epics never precede non-gated ones
//! - Among equals, input order is preserved (stable sort)
//! - Byte-for-byte identical output across runs

use crate::decision::Decision;
use crate::epic::{Epic, NdrDimension, VufbFactor};
use crate::ndr::NdrBreakdown;
use crate::npv::{CashFlowTable, Payback};
use crate::vufb::VufbResult;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Number of epics in the top-priorities summary
pub const TOP_PRIORITIES: usize = 3;

/// An epic plus everything derived from it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluatedEpic {
    #[serde(flatten)]
    pub epic: Epic,
    pub vufb_score: f64,
    pub vufb_passed: bool,
    pub benefit_score: f64,
    pub financial_score: f64,
    pub feas_mult: f64,
    pub ndr_score: f64,
    pub npv: f64,
    pub decision: Decision,
    pub benefit_percent: f64,
    pub finance_percent: f64,
    pub cash_flow: CashFlowTable,
}

/// Grouped calculator outputs for constructing an EvaluatedEpic
pub struct EpicAnalysis {
    pub vufb: VufbResult,
    pub ndr: NdrBreakdown,
    pub cash_flow: CashFlowTable,
    pub decision: Decision,
}

impl EvaluatedEpic {
    pub fn new(epic: &Epic, analysis: EpicAnalysis) -> Self {
        let split = analysis.ndr.contribution_split();

        EvaluatedEpic {
            epic: epic.clone(),
            vufb_score: analysis.vufb.score,
            vufb_passed: analysis.vufb.passed,
            benefit_score: analysis.ndr.benefit_score,
            financial_score: analysis.ndr.financial_score,
            feas_mult: analysis.ndr.feas_mult,
            ndr_score: analysis.ndr.ndr_score,
            npv: analysis.cash_flow.npv,
            decision: analysis.decision,
            benefit_percent: split.benefit_percent,
            finance_percent: split.finance_percent,
            cash_flow: analysis.cash_flow,
        }
    }

    pub fn gated(&self) -> bool {
        self.decision.gated
    }

    pub fn payback(&self) -> Payback {
        self.cash_flow.payback
    }
}

/// Rank evaluated epics
///
/// 1. Non-gated before gated
/// 2. NDR score descending
///
/// The sort is stable, so epics with equal keys keep their input order.
pub fn sort_evaluated(mut epics: Vec<EvaluatedEpic>) -> Vec<EvaluatedEpic> {
    epics.sort_by(compare_ranked);
    epics
}

fn compare_ranked(a: &EvaluatedEpic, b: &EvaluatedEpic) -> Ordering {
    a.gated()
        .cmp(&b.gated())
        .then_with(|| b.ndr_score.total_cmp(&a.ndr_score))
}

/// The first few ranked epics
pub fn top_priorities(ranked: &[EvaluatedEpic]) -> &[EvaluatedEpic] {
    &ranked[..ranked.len().min(TOP_PRIORITIES)]
}

/// Render the ranked table
pub fn render_text(epics: &[EvaluatedEpic]) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "{:<5} {:<18} {:<7} {:<6} {:<7} {:>14} {:<30}\n",
        "RANK", "VERDICT", "GATED", "NDR", "VUFB", "NPV", "EPIC"
    ));

    for (index, evaluated) in epics.iter().enumerate() {
        output.push_str(&format!(
            "{:<5} {:<18} {:<7} {:<6} {:<7} {:>14} {:<30}\n",
            index + 1,
            evaluated.decision.verdict.label(),
            if evaluated.gated() { "yes" } else { "no" },
            format!("{:.2}", evaluated.ndr_score),
            format!("{:.2}", evaluated.vufb_score),
            format_currency(evaluated.npv),
            truncate_or_pad(
                &format!("{} ({})", evaluated.epic.name, evaluated.epic.lifecycle.as_str()),
                30
            ),
        ));
    }

    let top = top_priorities(epics);
    if !top.is_empty() {
        output.push_str("\nTop priorities:\n");
        for (index, evaluated) in top.iter().enumerate() {
            output.push_str(&format!(
                "  {}. {} - {} (NDR {:.2})\n",
                index + 1,
                evaluated.epic.name,
                evaluated.decision.verdict.label(),
                evaluated.ndr_score
            ));
        }
    }

    output
}

/// Render evaluated epics as JSON
pub fn render_json(epics: &[EvaluatedEpic]) -> String {
    serde_json::to_string_pretty(epics).unwrap_or_else(|_| "[]".to_string())
}

/// Render the full breakdown of one epic
pub fn render_explain(evaluated: &EvaluatedEpic) -> String {
    let epic = &evaluated.epic;
    let mut output = String::new();

    output.push_str(&format!("{} (#{})\n", epic.name, epic.id));
    output.push_str(&format!("{}\n", "=".repeat(80)));
    if !epic.description.is_empty() {
        output.push_str(&format!("{}\n", epic.description));
    }
    output.push_str(&format!("{}\n", epic.lifecycle_context()));
    output.push_str(&format!(
        "Spot test 0: impact {:?}, effort {:?}\n",
        epic.spot_test0.impact, epic.spot_test0.effort
    ));

    output.push_str(&format!(
        "\nDecision: {}{}\n  {}\n",
        evaluated.decision.verdict.label(),
        if evaluated.gated() { " (gated)" } else { "" },
        evaluated.decision.rationale
    ));

    output.push_str(&format!(
        "\nVUFB: {:.2} ({})\n",
        evaluated.vufb_score,
        if evaluated.vufb_passed { "pass" } else { "fail" }
    ));
    for factor in VufbFactor::ALL {
        let score = epic.spot_test1.factor(factor);
        output.push_str(&format!(
            "  {:<12} {:>5.1}  {}\n",
            factor.as_str(),
            score.score,
            score.rationale
        ));
    }

    output.push_str(&format!(
        "\nNDR: {:.2} = (0.5 × {:.2} + 0.5 × {:.2}) × {:.3}\n",
        evaluated.ndr_score, evaluated.benefit_score, evaluated.financial_score, evaluated.feas_mult
    ));
    output.push_str(&format!(
        "  benefit {:.1}% / finance {:.1}%\n",
        evaluated.benefit_percent, evaluated.finance_percent
    ));
    for dimension in NdrDimension::ALL {
        let score = epic.ndr.dimension(dimension);
        output.push_str(&format!(
            "  {:<6} {:>5.1}  {}\n",
            dimension.as_str().to_uppercase(),
            score.score,
            dimension.display_name()
        ));
    }

    output.push_str(&render_cash_flow(&evaluated.cash_flow));

    if !epic.sensitivity.is_empty() {
        output.push_str(&format!("\nSensitivity: {}\n", epic.sensitivity));
    }

    output
}

fn render_cash_flow(table: &CashFlowTable) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "\nCash flow (investment {}, discount rate {:.1}%)\n",
        format_currency(table.total_investment),
        table.discount_rate * 100.0
    ));
    output.push_str(&format!(
        "  {:<5} {:>12} {:>12} {:>12} {:>14} {:>8} {:>12} {:>14}\n",
        "YEAR", "REVENUE", "OPEX", "NET", "CUMULATIVE", "FACTOR", "DISCOUNTED", "CUM. DISC."
    ));
    for row in &table.rows {
        output.push_str(&format!(
            "  {:<5} {:>12} {:>12} {:>12} {:>14} {:>8.4} {:>12} {:>14}\n",
            row.year,
            format_currency(row.revenue),
            format_currency(row.opex),
            format_currency(row.net_cash_flow),
            format_currency(row.cumulative),
            row.discount_factor,
            format_currency(row.discounted_flow),
            format_currency(row.cumulative_discounted),
        ));
    }

    output.push_str(&format!(
        "  Total cash in (undiscounted): {}\n",
        format_currency(table.total_undiscounted)
    ));
    output.push_str(&format!(
        "  Time value adjustment:        -{}\n",
        format_currency(table.time_value_cost)
    ));
    output.push_str(&format!(
        "  Present value of cash flows:  {}\n",
        format_currency(table.total_discounted)
    ));
    output.push_str(&format!(
        "  NPV:                          {}\n",
        format_currency(table.npv)
    ));
    output.push_str(&format!(
        "  ROI (undiscounted):           {:.1}×\n",
        table.roi_undiscounted
    ));
    output.push_str(&format!(
        "  ROI (NPV-based):              {:.1}×\n",
        table.roi_npv
    ));
    output.push_str(&format!("  Payback period:               {}\n", table.payback));

    output
}

/// Format as whole US dollars with thousands separators, e.g. `-$1,234`
///
/// Non-finite values render as `$0`.
pub fn format_currency(value: f64) -> String {
    if !value.is_finite() {
        return "$0".to_string();
    }

    let rounded = value.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if rounded < 0.0 {
        format!("-${}", grouped)
    } else {
        format!("${}", grouped)
    }
}

/// Truncate or pad string to fixed width
fn truncate_or_pad(s: &str, width: usize) -> String {
    if s.chars().count() > width {
        let kept: String = s.chars().take(width.saturating_sub(3)).collect();
        format!("{}...", kept)
    } else {
        format!("{:<width$}", s, width = width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::evaluate_epic;
    use crate::epic::Lifecycle;

    fn evaluated(id: u64, uniform: f64, lifecycle: Lifecycle, layer: f64) -> EvaluatedEpic {
        let mut epic = Epic::template(id);
        epic.name = format!("epic-{}", id);
        epic.lifecycle = lifecycle;
        epic.ndr = crate::epic::NdrScores::uniform(uniform);
        epic.ndr.layer.score = layer;
        evaluate_epic(&epic)
    }

    fn ids(epics: &[EvaluatedEpic]) -> Vec<u64> {
        epics.iter().map(|e| e.epic.id).collect()
    }

    #[test]
    fn test_gated_sink_below_higher_scores() {
        // BUILD with layer 6 is gated even with high NDR
        let ranked = sort_evaluated(vec![
            evaluated(1, 10.0, Lifecycle::Build, 6.0),
            evaluated(2, 3.0, Lifecycle::Grow, 5.0),
            evaluated(3, 7.0, Lifecycle::Grow, 5.0),
        ]);
        assert_eq!(ids(&ranked), vec![3, 2, 1]);
        assert!(ranked[2].gated());
    }

    #[test]
    fn test_ties_keep_input_order() {
        let ranked = sort_evaluated(vec![
            evaluated(5, 6.0, Lifecycle::Grow, 8.0),
            evaluated(2, 6.0, Lifecycle::Grow, 8.0),
            evaluated(9, 6.0, Lifecycle::Grow, 8.0),
        ]);
        assert_eq!(ids(&ranked), vec![5, 2, 9]);
    }

    #[test]
    fn test_top_priorities_caps_at_three() {
        let ranked: Vec<EvaluatedEpic> = (1..=5)
            .map(|i| evaluated(i, 6.0, Lifecycle::Grow, 8.0))
            .collect();
        assert_eq!(top_priorities(&ranked).len(), 3);
        assert_eq!(top_priorities(&ranked[..1]).len(), 1);
        assert!(top_priorities(&[]).is_empty());
    }

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(0.0), "$0");
        assert_eq!(format_currency(999.4), "$999");
        assert_eq!(format_currency(1234.5), "$1,235");
        assert_eq!(format_currency(-120_000.0), "-$120,000");
        assert_eq!(format_currency(1_000_000.0), "$1,000,000");
        assert_eq!(format_currency(f64::NAN), "$0");
    }

    #[test]
    fn test_render_text_lists_every_epic() {
        let ranked = sort_evaluated(vec![
            evaluated(1, 9.0, Lifecycle::Grow, 10.0),
            evaluated(2, 2.0, Lifecycle::Grow, 10.0),
        ]);
        let text = render_text(&ranked);
        assert!(text.starts_with("RANK"));
        assert!(text.contains("epic-1 (GROW)"));
        assert!(text.contains("BUILD IMMEDIATELY"));
        assert!(text.contains("Top priorities:"));
    }

    #[test]
    fn test_render_json_carries_derived_fields() {
        let ranked = vec![evaluated(1, 9.0, Lifecycle::Grow, 10.0)];
        let json = render_json(&ranked);
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let first = &value[0];
        assert_eq!(first["id"], 1);
        assert_eq!(first["ndrScore"], 9.0);
        assert_eq!(first["decision"]["verdict"], "BUILD_IMMEDIATELY");
        assert_eq!(first["decision"]["gated"], false);
        assert!(first["cashFlow"]["rows"].is_array());
    }

    #[test]
    fn test_render_explain_sections() {
        let text = render_explain(&evaluated(4, 8.0, Lifecycle::Build, 8.0));
        assert!(text.contains("Decision: PROTOTYPE"));
        assert!(text.contains("VUFB: 5.00 (pass)"));
        assert!(text.contains("UPAR"));
        assert!(text.contains("Payback period:"));
        assert!(text.contains("BUILD + EFFICIENCY"));
    }

    #[test]
    fn test_cash_flow_shows_both_cumulative_series() {
        let text = render_explain(&evaluated(5, 6.0, Lifecycle::Grow, 6.0));
        assert!(text.contains("CUMULATIVE"));
        assert!(text.contains("CUM. DISC."));

        let year_one = text
            .lines()
            .find(|line| line.trim_start().starts_with("1 "))
            .unwrap();
        assert!(year_one.contains("-$50,000"), "undiscounted: {}", year_one);
        assert!(year_one.contains("-$56,364"), "discounted: {}", year_one);
    }
}
