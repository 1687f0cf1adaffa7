//! Epic data model
//!
//! An epic is created fully formed by its producer and is only ever read by the
//! engine. Derived values (scores, NPV, decision) are never stored here.

use serde::{Deserialize, Serialize};

/// Default sensitivity prompt shown on a fresh epic
pub const DEFAULT_SENSITIVITY: &str =
    "What assumptions could change this score? (e.g., 'If LAYER drops below 6, decision flips to HOLD')";

/// Mid-range score every dimension starts with
pub const DEFAULT_SCORE: f64 = 5.0;

/// Product lifecycle phase; selects the decision rule set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Lifecycle {
    /// 0 → 1
    Build,
    /// 1 → N
    Grow,
    /// N → ∞
    Defend,
}

impl Lifecycle {
    pub fn as_str(&self) -> &'static str {
        match self {
            Lifecycle::Build => "BUILD",
            Lifecycle::Grow => "GROW",
            Lifecycle::Defend => "DEFEND",
        }
    }
}

/// Competitive-strategy classification (context only, never scored)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Altitude {
    Efficiency,
    Differentiation,
    Expansion,
    Frontier,
}

impl Altitude {
    pub fn as_str(&self) -> &'static str {
        match self {
            Altitude::Efficiency => "EFFICIENCY",
            Altitude::Differentiation => "DIFFERENTIATION",
            Altitude::Expansion => "EXPANSION",
            Altitude::Frontier => "FRONTIER",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Impact {
    High,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Effort {
    Low,
    High,
}

/// Informal impact/effort pre-filter. Advisory only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpotTest0 {
    pub impact: Impact,
    pub effort: Effort,
}

/// A single VUFB factor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorScore {
    pub score: f64,
    #[serde(default)]
    pub rationale: String,
}

impl FactorScore {
    pub fn new(score: f64) -> Self {
        FactorScore {
            score,
            rationale: String::new(),
        }
    }
}

/// Value / Usability / Feasibility / Business spot test
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VufbScores {
    pub value: FactorScore,
    pub usability: FactorScore,
    pub feasibility: FactorScore,
    pub business: FactorScore,
}

impl VufbScores {
    pub fn uniform(score: f64) -> Self {
        VufbScores {
            value: FactorScore::new(score),
            usability: FactorScore::new(score),
            feasibility: FactorScore::new(score),
            business: FactorScore::new(score),
        }
    }

    pub fn factor(&self, factor: VufbFactor) -> &FactorScore {
        match factor {
            VufbFactor::Value => &self.value,
            VufbFactor::Usability => &self.usability,
            VufbFactor::Feasibility => &self.feasibility,
            VufbFactor::Business => &self.business,
        }
    }

    pub fn factor_mut(&mut self, factor: VufbFactor) -> &mut FactorScore {
        match factor {
            VufbFactor::Value => &mut self.value,
            VufbFactor::Usability => &mut self.usability,
            VufbFactor::Feasibility => &mut self.feasibility,
            VufbFactor::Business => &mut self.business,
        }
    }
}

/// Key into [`VufbScores`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VufbFactor {
    Value,
    Usability,
    Feasibility,
    Business,
}

impl VufbFactor {
    pub const ALL: [VufbFactor; 4] = [
        VufbFactor::Value,
        VufbFactor::Usability,
        VufbFactor::Feasibility,
        VufbFactor::Business,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            VufbFactor::Value => "value",
            VufbFactor::Usability => "usability",
            VufbFactor::Feasibility => "feasibility",
            VufbFactor::Business => "business",
        }
    }
}

/// A single NDR dimension
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionScore {
    pub score: f64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub rationale: String,
}

/// The seven NDR dimensions
///
/// `vcrm` already encodes Value × Confidence × (1 − Risk) × Money; the engine
/// uses it as given.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NdrScores {
    pub upar: DimensionScore,
    pub map: DimensionScore,
    pub cev: DimensionScore,
    pub star: DimensionScore,
    pub ai: DimensionScore,
    pub vcrm: DimensionScore,
    pub layer: DimensionScore,
}

impl NdrScores {
    /// All dimensions at `score`, with their display names filled in
    pub fn uniform(score: f64) -> Self {
        let dim = |d: NdrDimension| DimensionScore {
            score,
            name: d.display_name().to_string(),
            rationale: String::new(),
        };
        NdrScores {
            upar: dim(NdrDimension::Upar),
            map: dim(NdrDimension::Map),
            cev: dim(NdrDimension::Cev),
            star: dim(NdrDimension::Star),
            ai: dim(NdrDimension::Ai),
            vcrm: dim(NdrDimension::Vcrm),
            layer: dim(NdrDimension::Layer),
        }
    }

    pub fn dimension(&self, dimension: NdrDimension) -> &DimensionScore {
        match dimension {
            NdrDimension::Upar => &self.upar,
            NdrDimension::Map => &self.map,
            NdrDimension::Cev => &self.cev,
            NdrDimension::Star => &self.star,
            NdrDimension::Ai => &self.ai,
            NdrDimension::Vcrm => &self.vcrm,
            NdrDimension::Layer => &self.layer,
        }
    }

    pub fn dimension_mut(&mut self, dimension: NdrDimension) -> &mut DimensionScore {
        match dimension {
            NdrDimension::Upar => &mut self.upar,
            NdrDimension::Map => &mut self.map,
            NdrDimension::Cev => &mut self.cev,
            NdrDimension::Star => &mut self.star,
            NdrDimension::Ai => &mut self.ai,
            NdrDimension::Vcrm => &mut self.vcrm,
            NdrDimension::Layer => &mut self.layer,
        }
    }
}

/// Key into [`NdrScores`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NdrDimension {
    Upar,
    Map,
    Cev,
    Star,
    Ai,
    Vcrm,
    Layer,
}

impl NdrDimension {
    pub const ALL: [NdrDimension; 7] = [
        NdrDimension::Upar,
        NdrDimension::Map,
        NdrDimension::Cev,
        NdrDimension::Star,
        NdrDimension::Ai,
        NdrDimension::Vcrm,
        NdrDimension::Layer,
    ];

    /// Benefit-side dimensions averaged into the benefit score
    pub const BENEFIT: [NdrDimension; 5] = [
        NdrDimension::Upar,
        NdrDimension::Map,
        NdrDimension::Cev,
        NdrDimension::Star,
        NdrDimension::Ai,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NdrDimension::Upar => "upar",
            NdrDimension::Map => "map",
            NdrDimension::Cev => "cev",
            NdrDimension::Star => "star",
            NdrDimension::Ai => "ai",
            NdrDimension::Vcrm => "vcrm",
            NdrDimension::Layer => "layer",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            NdrDimension::Upar => "User Pain, Alternatives, Relevance",
            NdrDimension::Map => "Market Activation Potential",
            NdrDimension::Cev => "Core Experience Value",
            NdrDimension::Star => "Scalability, Transferability, Adjacent, Reuse",
            NdrDimension::Ai => "AI Enhancement Potential",
            NdrDimension::Vcrm => "Value × Confidence × (1-Risk) × Money",
            NdrDimension::Layer => "Legal, Alignment, Yield, Explainability, Risk",
        }
    }
}

/// Absolute slack allowed between a stated total investment and its parts
pub const TOTAL_TOLERANCE: f64 = 0.005;

/// Investment and 5-year projections
///
/// The total investment is always derived from the two cost components.
/// A stated `totalInvestment` is kept only so validation can flag a
/// record whose total disagrees with its parts; scoring never reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Financial {
    pub fixed_costs: f64,
    pub variable_costs: f64,
    #[serde(
        rename = "totalInvestment",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub stated_total_investment: Option<f64>,
    /// Indexed by year; index 0 is unused
    #[serde(default)]
    pub yearly_revenue: Vec<f64>,
    /// Indexed by year; index 0 is unused
    #[serde(default)]
    pub yearly_opex: Vec<f64>,
    pub discount_rate: f64,
}

impl Financial {
    pub fn total_investment(&self) -> f64 {
        self.fixed_costs + self.variable_costs
    }

    /// Projected revenue for `year`; missing entries read as 0
    pub fn revenue(&self, year: usize) -> f64 {
        self.yearly_revenue.get(year).copied().unwrap_or(0.0)
    }

    /// Projected opex for `year`; missing entries read as 0
    pub fn opex(&self, year: usize) -> f64 {
        self.yearly_opex.get(year).copied().unwrap_or(0.0)
    }

    pub fn net_cash_flow(&self, year: usize) -> f64 {
        self.revenue(year) - self.opex(year)
    }

    /// Stated total that differs from `fixedCosts + variableCosts`, if any
    pub fn total_investment_mismatch(&self) -> Option<f64> {
        self.stated_total_investment.filter(|stated| {
            !stated.is_finite() || (stated - self.total_investment()).abs() > TOTAL_TOLERANCE
        })
    }
}

impl Default for Financial {
    fn default() -> Self {
        Financial {
            fixed_costs: 100_000.0,
            variable_costs: 20_000.0,
            stated_total_investment: None,
            yearly_revenue: vec![0.0, 100_000.0, 150_000.0, 200_000.0, 250_000.0],
            yearly_opex: vec![0.0, 30_000.0, 35_000.0, 40_000.0, 45_000.0],
            discount_rate: 0.10,
        }
    }
}

/// The unit of evaluation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Epic {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub lifecycle: Lifecycle,
    pub altitude: Altitude,
    pub spot_test0: SpotTest0,
    /// VUFB
    pub spot_test1: VufbScores,
    pub ndr: NdrScores,
    pub financial: Financial,
    #[serde(default)]
    pub sensitivity: String,
}

impl Epic {
    /// Entry-form defaults: mid-range scores and placeholder financials
    pub fn template(id: u64) -> Self {
        Epic {
            id,
            name: String::new(),
            description: String::new(),
            lifecycle: Lifecycle::Build,
            altitude: Altitude::Efficiency,
            spot_test0: SpotTest0 {
                impact: Impact::High,
                effort: Effort::Low,
            },
            spot_test1: VufbScores::uniform(DEFAULT_SCORE),
            ndr: NdrScores::uniform(DEFAULT_SCORE),
            financial: Financial::default(),
            sensitivity: DEFAULT_SENSITIVITY.to_string(),
        }
    }

    /// Strategic positioning label, e.g. `BUILD + EFFICIENCY → ...`
    pub fn lifecycle_context(&self) -> String {
        format!(
            "{} + {} → Strategic positioning for this phase",
            self.lifecycle.as_str(),
            self.altitude.as_str()
        )
    }
}
