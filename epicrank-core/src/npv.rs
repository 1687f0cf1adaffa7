//! Five-year discounted cash-flow valuation
//!
//! Global invariants enforced:
//! - Fixed horizon of years 1..=5, one discount rate
//! - Missing yearly entries are treated as 0
//! - Degenerate divisions yield explicit fallbacks, never NaN or infinity
//! - NPV, the cash-flow table and payback all share one per-year computation

use crate::epic::Financial;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Projection horizon in years
pub const HORIZON_YEARS: usize = 5;

const MONTHS_PER_YEAR: u32 = 12;

/// One projected year of the cash-flow table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashFlowRow {
    pub year: u32,
    pub revenue: f64,
    pub opex: f64,
    pub net_cash_flow: f64,
    pub discount_factor: f64,
    pub discounted_flow: f64,
    /// Running undiscounted total, starting from -totalInvestment
    pub cumulative: f64,
    /// Running discounted total, starting from -totalInvestment
    pub cumulative_discounted: f64,
}

/// When cumulative undiscounted cash flow turns non-negative
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Payback {
    Achieved { year: u32, months: u32 },
    NotAchieved,
}

impl Payback {
    pub fn months(&self) -> Option<u32> {
        match self {
            Payback::Achieved { months, .. } => Some(*months),
            Payback::NotAchieved => None,
        }
    }
}

impl fmt::Display for Payback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Payback::Achieved { months, .. } => write!(f, "~{} months", months),
            Payback::NotAchieved => write!(
                f,
                ">{} months",
                HORIZON_YEARS as u32 * MONTHS_PER_YEAR
            ),
        }
    }
}

/// Full valuation of an epic's financial case
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashFlowTable {
    pub total_investment: f64,
    pub discount_rate: f64,
    pub rows: Vec<CashFlowRow>,
    pub total_undiscounted: f64,
    /// Present value of the yearly flows (investment excluded)
    pub total_discounted: f64,
    pub npv: f64,
    /// Value lost to discounting: undiscounted total minus present value
    pub time_value_cost: f64,
    pub roi_undiscounted: f64,
    pub roi_npv: f64,
    pub payback: Payback,
}

/// 1 / (1 + rate)^year
pub fn discount_factor(discount_rate: f64, year: u32) -> f64 {
    1.0 / (1.0 + discount_rate).powi(year as i32)
}

/// Build the year-by-year table and every summary figure
pub fn build_cash_flow_table(financial: &Financial) -> CashFlowTable {
    let total_investment = financial.total_investment();
    let mut rows = Vec::with_capacity(HORIZON_YEARS);
    let mut cumulative = -total_investment;
    let mut cumulative_discounted = -total_investment;

    for year in 1..=HORIZON_YEARS {
        let revenue = financial.revenue(year);
        let opex = financial.opex(year);
        let net_cash_flow = revenue - opex;
        let factor = discount_factor(financial.discount_rate, year as u32);
        let discounted_flow = net_cash_flow * factor;
        cumulative += net_cash_flow;
        cumulative_discounted += discounted_flow;

        rows.push(CashFlowRow {
            year: year as u32,
            revenue,
            opex,
            net_cash_flow,
            discount_factor: factor,
            discounted_flow,
            cumulative,
            cumulative_discounted,
        });
    }

    let total_undiscounted: f64 = rows.iter().map(|r| r.net_cash_flow).sum();
    let total_discounted: f64 = rows.iter().map(|r| r.discounted_flow).sum();
    let npv = total_discounted - total_investment;
    let payback = payback_from_rows(total_investment, &rows);

    CashFlowTable {
        total_investment,
        discount_rate: financial.discount_rate,
        total_undiscounted,
        total_discounted,
        npv,
        time_value_cost: total_undiscounted - total_discounted,
        roi_undiscounted: guarded_ratio(total_undiscounted, total_investment),
        roi_npv: guarded_ratio(npv + total_investment, total_investment),
        payback,
        rows,
    }
}

/// Net present value over the fixed horizon
///
/// Formula:
/// NPV = -totalInvestment + Σ_{t=1..5} (revenue[t] - opex[t]) / (1 + rate)^t
pub fn calculate_npv(financial: &Financial) -> f64 {
    build_cash_flow_table(financial).npv
}

/// Payback period with month precision
pub fn payback_period(financial: &Financial) -> Payback {
    build_cash_flow_table(financial).payback
}

/// First year where cumulative flow crosses from negative to non-negative
///
/// Within that year: months = ceil(|prevCumulative| / net × 12), clamped to
/// [1, 12] when net > 0, otherwise the full 12.
fn payback_from_rows(total_investment: f64, rows: &[CashFlowRow]) -> Payback {
    let mut prev_cumulative = -total_investment;

    for row in rows {
        if prev_cumulative < 0.0 && row.cumulative >= 0.0 {
            let months_in_year = if row.net_cash_flow > 0.0 {
                let fraction = prev_cumulative.abs() / row.net_cash_flow;
                (fraction * MONTHS_PER_YEAR as f64)
                    .ceil()
                    .clamp(1.0, MONTHS_PER_YEAR as f64) as u32
            } else {
                MONTHS_PER_YEAR
            };
            return Payback::Achieved {
                year: row.year,
                months: (row.year - 1) * MONTHS_PER_YEAR + months_in_year,
            };
        }
        prev_cumulative = row.cumulative;
    }

    Payback::NotAchieved
}

/// numerator / denominator, or 0 when the denominator is 0
fn guarded_ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn financial(investment: f64, revenue: Vec<f64>, opex: Vec<f64>, rate: f64) -> Financial {
        Financial {
            fixed_costs: investment,
            variable_costs: 0.0,
            stated_total_investment: None,
            yearly_revenue: revenue,
            yearly_opex: opex,
            discount_rate: rate,
        }
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn test_zero_rate_npv_is_plain_sum() {
        let f = financial(
            1000.0,
            vec![0.0, 300.0, 300.0, 300.0, 300.0, 300.0],
            vec![],
            0.0,
        );
        let table = build_cash_flow_table(&f);
        assert_eq!(table.npv, 500.0);
        assert_eq!(table.total_undiscounted, 1500.0);
        assert_eq!(table.time_value_cost, 0.0);
        assert_eq!(table.roi_undiscounted, 1.5);
        assert_eq!(table.roi_npv, 1.5);
    }

    #[test]
    fn test_discounting_single_year() {
        let f = financial(100.0, vec![0.0, 110.0], vec![0.0, 0.0], 0.10);
        let table = build_cash_flow_table(&f);
        assert!(approx(table.rows[0].discount_factor, 1.0 / 1.1));
        assert!(approx(table.rows[0].discounted_flow, 100.0));
        assert!(approx(table.npv, 0.0));
        assert_eq!(table.rows.len(), HORIZON_YEARS);
    }

    #[test]
    fn test_cumulative_series_start_at_negative_investment() {
        let f = financial(500.0, vec![0.0, 100.0, 100.0], vec![0.0, 50.0], 0.0);
        let table = build_cash_flow_table(&f);
        let cumulative: Vec<f64> = table.rows.iter().map(|r| r.cumulative).collect();
        assert_eq!(cumulative, vec![-450.0, -350.0, -350.0, -350.0, -350.0]);
        assert_eq!(table.rows[4].cumulative_discounted, -350.0);
    }

    #[test]
    fn test_all_zero_flows() {
        let f = financial(120_000.0, vec![], vec![], 0.10);
        let table = build_cash_flow_table(&f);
        assert_eq!(table.npv, -120_000.0);
        assert_eq!(table.payback, Payback::NotAchieved);
        assert_eq!(table.payback.to_string(), ">60 months");
    }

    #[test]
    fn test_zero_investment_roi_fallback() {
        let f = financial(0.0, vec![0.0, 500.0, 500.0], vec![], 0.10);
        let table = build_cash_flow_table(&f);
        assert_eq!(table.roi_undiscounted, 0.0);
        assert_eq!(table.roi_npv, 0.0);
        assert!(table.npv > 0.0);
    }

    #[test]
    fn test_payback_interpolates_months() {
        // -120k, then +70k, +115k: crosses in year 2 with 50k remaining
        // months = ceil(50/115 × 12) = ceil(5.217) = 6 → 18 total
        let f = financial(
            120_000.0,
            vec![0.0, 100_000.0, 150_000.0],
            vec![0.0, 30_000.0, 35_000.0],
            0.10,
        );
        let payback = payback_period(&f);
        assert_eq!(payback, Payback::Achieved { year: 2, months: 18 });
        assert_eq!(payback.to_string(), "~18 months");
    }

    #[test]
    fn test_payback_first_year_not_fixed_constant() {
        // Crosses in year 1 after 6 months; no fixed 11-month answer
        let f = financial(60.0, vec![0.0, 120.0], vec![], 0.0);
        assert_eq!(payback_period(&f), Payback::Achieved { year: 1, months: 6 });
    }

    #[test]
    fn test_payback_exact_recovery_is_full_year() {
        let f = financial(100.0, vec![0.0, 100.0], vec![], 0.0);
        assert_eq!(
            payback_period(&f),
            Payback::Achieved {
                year: 1,
                months: 12
            }
        );
    }

    #[test]
    fn test_payback_tiny_remainder_clamped_to_one_month() {
        let f = financial(1.0, vec![0.0, 1_000_000.0], vec![], 0.0);
        assert_eq!(payback_period(&f), Payback::Achieved { year: 1, months: 1 });
    }

    #[test]
    fn test_payback_not_achieved_within_horizon() {
        let f = financial(
            1_000_000.0,
            vec![0.0, 10.0, 10.0, 10.0, 10.0, 10.0],
            vec![],
            0.0,
        );
        assert_eq!(payback_period(&f), Payback::NotAchieved);
        assert_eq!(payback_period(&f).months(), None);
    }

    #[test]
    fn test_calculate_npv_matches_table() {
        let f = Financial::default();
        assert_eq!(calculate_npv(&f), build_cash_flow_table(&f).npv);
    }
}
