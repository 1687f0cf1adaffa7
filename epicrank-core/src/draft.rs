//! Typed draft editor for new epics
//!
//! Every edit consumes the draft and returns an updated one; nothing becomes
//! an [`Epic`] until [`EpicDraft::commit`] is called.

use crate::analysis::evaluate_epic;
use crate::epic::{Altitude, Effort, Epic, Impact, Lifecycle, NdrDimension, VufbFactor};
use crate::npv::HORIZON_YEARS;
use crate::report::EvaluatedEpic;

/// Discount rate used when an entered percentage is not a number
pub const FALLBACK_DISCOUNT_PERCENT: f64 = 10.0;

/// Work-in-progress epic, pre-filled with template defaults
#[derive(Debug, Clone, PartialEq)]
pub struct EpicDraft {
    epic: Epic,
}

impl Default for EpicDraft {
    fn default() -> Self {
        Self::new()
    }
}

impl EpicDraft {
    pub fn new() -> Self {
        EpicDraft {
            epic: Epic::template(0),
        }
    }

    /// Read-only view of the current draft values
    pub fn current(&self) -> &Epic {
        &self.epic
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.epic.name = name.into();
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.epic.description = description.into();
        self
    }

    #[must_use]
    pub fn with_lifecycle(mut self, lifecycle: Lifecycle) -> Self {
        self.epic.lifecycle = lifecycle;
        self
    }

    #[must_use]
    pub fn with_altitude(mut self, altitude: Altitude) -> Self {
        self.epic.altitude = altitude;
        self
    }

    #[must_use]
    pub fn with_spot_test0(mut self, impact: Impact, effort: Effort) -> Self {
        self.epic.spot_test0.impact = impact;
        self.epic.spot_test0.effort = effort;
        self
    }

    #[must_use]
    pub fn with_vufb_score(mut self, factor: VufbFactor, score: f64) -> Self {
        self.epic.spot_test1.factor_mut(factor).score = score;
        self
    }

    #[must_use]
    pub fn with_vufb_rationale(mut self, factor: VufbFactor, rationale: impl Into<String>) -> Self {
        self.epic.spot_test1.factor_mut(factor).rationale = rationale.into();
        self
    }

    #[must_use]
    pub fn with_ndr_score(mut self, dimension: NdrDimension, score: f64) -> Self {
        self.epic.ndr.dimension_mut(dimension).score = score;
        self
    }

    #[must_use]
    pub fn with_ndr_rationale(
        mut self,
        dimension: NdrDimension,
        rationale: impl Into<String>,
    ) -> Self {
        self.epic.ndr.dimension_mut(dimension).rationale = rationale.into();
        self
    }

    /// Non-finite input is entered as 0
    #[must_use]
    pub fn with_fixed_costs(mut self, amount: f64) -> Self {
        self.epic.financial.fixed_costs = finite_or_zero(amount);
        self
    }

    /// Non-finite input is entered as 0
    #[must_use]
    pub fn with_variable_costs(mut self, amount: f64) -> Self {
        self.epic.financial.variable_costs = finite_or_zero(amount);
        self
    }

    /// Set revenue for `year` in 1..=5; other years leave the draft unchanged
    #[must_use]
    pub fn with_year_revenue(mut self, year: usize, amount: f64) -> Self {
        if let Some(slot) = year_slot(&mut self.epic.financial.yearly_revenue, year) {
            *slot = finite_or_zero(amount);
        }
        self
    }

    /// Set opex for `year` in 1..=5; other years leave the draft unchanged
    #[must_use]
    pub fn with_year_opex(mut self, year: usize, amount: f64) -> Self {
        if let Some(slot) = year_slot(&mut self.epic.financial.yearly_opex, year) {
            *slot = finite_or_zero(amount);
        }
        self
    }

    /// Set the discount rate as a fraction (0.10 for 10%)
    #[must_use]
    pub fn with_discount_rate(mut self, rate: f64) -> Self {
        self.epic.financial.discount_rate = rate;
        self
    }

    /// Set the discount rate as a percentage, the way it is entered on a form
    ///
    /// Non-finite input falls back to 10%.
    #[must_use]
    pub fn with_discount_rate_percent(self, percent: f64) -> Self {
        let percent = if percent.is_finite() {
            percent
        } else {
            FALLBACK_DISCOUNT_PERCENT
        };
        self.with_discount_rate(percent / 100.0)
    }

    #[must_use]
    pub fn with_sensitivity(mut self, sensitivity: impl Into<String>) -> Self {
        self.epic.sensitivity = sensitivity.into();
        self
    }

    /// Evaluate the draft as it stands, without committing it
    pub fn preview(&self) -> EvaluatedEpic {
        evaluate_epic(&self.epic)
    }

    /// Turn the draft into an epic with the given id
    ///
    /// Returns `None` while the name is blank.
    pub fn commit(self, id: u64) -> Option<Epic> {
        if self.epic.name.trim().is_empty() {
            return None;
        }
        let mut epic = self.epic;
        epic.id = id;
        Some(epic)
    }
}

fn year_slot(series: &mut Vec<f64>, year: usize) -> Option<&mut f64> {
    if year == 0 || year > HORIZON_YEARS {
        tracing::debug!(year, "ignoring edit outside the projection horizon");
        return None;
    }
    if series.len() <= year {
        series.resize(year + 1, 0.0);
    }
    series.get_mut(year)
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}
