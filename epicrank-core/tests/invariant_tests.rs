//! Engine Invariant Tests
//!
//! These tests pin down properties that must hold for every input, not just
//! hand-picked scenarios.

use epicrank_core::epic::{
    Epic, FactorScore, Financial, Lifecycle, NdrDimension, NdrScores, VufbScores,
};
use epicrank_core::ndr::calculate_ndr;
use epicrank_core::vufb::evaluate_vufb;
use epicrank_core::{evaluate_epic, rank_epics, render_json, Verdict};
use proptest::prelude::*;

fn lifecycle_strategy() -> impl Strategy<Value = Lifecycle> {
    prop_oneof![
        Just(Lifecycle::Build),
        Just(Lifecycle::Grow),
        Just(Lifecycle::Defend),
    ]
}

/// Scores on the half-point grid of [1, 10]
fn score_strategy() -> impl Strategy<Value = f64> {
    (2u32..=20).prop_map(|half_points| half_points as f64 / 2.0)
}

fn financial_strategy() -> impl Strategy<Value = Financial> {
    (
        0.0..500_000.0f64,
        0.0..100_000.0f64,
        prop::collection::vec(0.0..300_000.0f64, 0..=6),
        prop::collection::vec(0.0..100_000.0f64, 0..=6),
        0.0..0.3f64,
    )
        .prop_map(|(fixed, variable, revenue, opex, rate)| Financial {
            fixed_costs: fixed,
            variable_costs: variable,
            stated_total_investment: None,
            yearly_revenue: revenue,
            yearly_opex: opex,
            discount_rate: rate,
        })
}

fn epic_strategy() -> impl Strategy<Value = Epic> {
    (
        any::<u64>(),
        lifecycle_strategy(),
        prop::array::uniform4(score_strategy()),
        prop::array::uniform7(score_strategy()),
        financial_strategy(),
    )
        .prop_map(|(id, lifecycle, vufb, ndr, financial)| {
            let mut epic = Epic::template(id);
            epic.name = format!("epic-{}", id);
            epic.lifecycle = lifecycle;
            epic.spot_test1 = VufbScores {
                value: FactorScore::new(vufb[0]),
                usability: FactorScore::new(vufb[1]),
                feasibility: FactorScore::new(vufb[2]),
                business: FactorScore::new(vufb[3]),
            };
            epic.ndr = NdrScores::uniform(5.0);
            for (dimension, score) in NdrDimension::ALL.iter().zip(ndr) {
                epic.ndr.dimension_mut(*dimension).score = score;
            }
            epic.financial = financial;
            epic
        })
}

proptest! {
    #[test]
    fn ndr_components_stay_in_range(epic in epic_strategy()) {
        let ndr = calculate_ndr(&epic.ndr);
        prop_assert!((1.0..=10.0).contains(&ndr.benefit_score));
        prop_assert!((1.0..=10.0).contains(&ndr.financial_score));
        prop_assert!(ndr.feas_mult >= 0.55 - 1e-12 && ndr.feas_mult <= 1.0);
        prop_assert!(ndr.ndr_score >= 0.55 - 1e-12 && ndr.ndr_score <= 10.0);
    }

    #[test]
    fn vufb_pass_matches_threshold(epic in epic_strategy()) {
        let vufb = evaluate_vufb(&epic.spot_test1);
        prop_assert!((1.0..=10.0).contains(&vufb.score));
        prop_assert_eq!(vufb.passed, vufb.score >= 5.0);
    }

    #[test]
    fn vufb_failure_always_gates(epic in epic_strategy()) {
        let evaluated = evaluate_epic(&epic);
        if evaluated.vufb_score < 5.0 {
            prop_assert_eq!(evaluated.decision.verdict, Verdict::HoldKill);
            prop_assert!(evaluated.decision.gated);
        }
    }

    #[test]
    fn evaluation_is_deterministic(epic in epic_strategy()) {
        let first = evaluate_epic(&epic);
        let second = evaluate_epic(&epic);
        prop_assert_eq!(first.ndr_score.to_bits(), second.ndr_score.to_bits());
        prop_assert_eq!(first.npv.to_bits(), second.npv.to_bits());
        prop_assert_eq!(&first, &second);
    }

    #[test]
    fn percent_split_sums_to_hundred(epic in epic_strategy()) {
        let evaluated = evaluate_epic(&epic);
        let total = evaluated.benefit_percent + evaluated.finance_percent;
        prop_assert!((total - 100.0).abs() < 1e-9);
    }

    #[test]
    fn ranking_orders_gated_last_then_ndr(
        epics in prop::collection::vec(epic_strategy(), 0..20)
    ) {
        let ranked = rank_epics(&epics);
        prop_assert_eq!(ranked.len(), epics.len());

        for pair in ranked.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            prop_assert!(!(a.decision.gated && !b.decision.gated));
            if a.decision.gated == b.decision.gated {
                prop_assert!(a.ndr_score >= b.ndr_score);
            }
        }
    }
}

#[test]
fn test_ranked_json_is_byte_identical_across_runs() {
    let mut epics = Vec::new();
    for id in 0..8u64 {
        let mut epic = Epic::template(id);
        epic.name = format!("epic-{}", id);
        epic.ndr = NdrScores::uniform(3.0 + (id % 4) as f64 * 2.0);
        epic.ndr.layer.score = 7.0 + (id % 3) as f64;
        epics.push(epic);
    }

    let first = render_json(&rank_epics(&epics));
    let second = render_json(&rank_epics(&epics));
    assert_eq!(first, second, "ranking must be reproducible byte for byte");
}

#[test]
fn test_equal_keys_keep_input_order() {
    let epics: Vec<Epic> = [30u64, 10, 20]
        .iter()
        .map(|id| {
            let mut epic = Epic::template(*id);
            epic.name = format!("epic-{}", id);
            epic
        })
        .collect();

    let ids: Vec<u64> = rank_epics(&epics).iter().map(|e| e.epic.id).collect();
    assert_eq!(ids, vec![30, 10, 20]);
}
