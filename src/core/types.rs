use serde::Serialize;

/// Raw inputs to one evaluation. All fields are plain nominal amounts; the
/// engine treats non-finite values as zero rather than rejecting them.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SimulationInput {
    pub current_assets: f64,
    pub monthly_income: f64,
    pub monthly_expense: f64,
    /// Expected annual yield in percent, e.g. 3.5 means 3.5%/year.
    pub annual_yield_rate_percent: f64,
    /// Nest-egg goal. Callers derive the default (monthly expense x 12 x 25)
    /// before handing the input over; the engine uses whatever it is given.
    pub target_amount: f64,
}

impl SimulationInput {
    pub fn normalized(self) -> Self {
        Self {
            current_assets: finite_or_zero(self.current_assets),
            monthly_income: finite_or_zero(self.monthly_income),
            monthly_expense: finite_or_zero(self.monthly_expense),
            annual_yield_rate_percent: finite_or_zero(self.annual_yield_rate_percent),
            target_amount: finite_or_zero(self.target_amount),
        }
    }

    pub fn annual_savings(&self) -> f64 {
        (self.monthly_income - self.monthly_expense) * 12.0
    }

    pub fn annual_return_rate(&self) -> f64 {
        self.annual_yield_rate_percent / 100.0
    }

    pub fn passive_monthly_income(&self) -> f64 {
        self.current_assets * self.annual_return_rate() / 12.0
    }
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}

/// Terminal state of a simulation. The unreachable case carries no year
/// count at all; "effectively infinite" is the variant itself, not a
/// sentinel number.
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum Outcome {
    /// Passive income already covers expenses; no saving phase needed.
    Free,
    /// The target is reached after `years` full years of compounding.
    Calculated { years: u32 },
    /// The target is provably unreachable under constant-rate assumptions.
    LifeSentence,
}

impl Outcome {
    /// Years until the target is reached, when that ever happens.
    pub fn years_to_freedom(self) -> Option<u32> {
        match self {
            Outcome::Free => Some(0),
            Outcome::Calculated { years } => Some(years),
            Outcome::LifeSentence => None,
        }
    }
}

/// One sampled point of a projected balance curve. Label text is a
/// presentation concern; the engine only exposes the offset.
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartPoint {
    pub year_offset: u32,
    pub asset_value: f64,
}

/// Post-threshold extension of the horizon: the balance keeps compounding
/// while a fixed 4%-of-target withdrawal is taken each year.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionSummary {
    /// Sampled curve from year 0 through the full projection horizon,
    /// including the withdrawal phase.
    pub chart: Vec<ChartPoint>,
    pub balance_at_threshold: f64,
    pub final_balance: f64,
    /// Annualized post-threshold growth in percent; 0 when no
    /// extrapolation was possible.
    pub growth_rate_percent: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationResult {
    #[serde(flatten)]
    pub outcome: Outcome,
    /// Balance at the terminal simulated year.
    pub final_assets: f64,
    /// Sampled balances from year 0 through the terminal year. Empty only
    /// for `LifeSentence`.
    pub chart: Vec<ChartPoint>,
    /// Extended-horizon projection; absent for `LifeSentence`.
    pub projection: Option<ProjectionSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalized_zeroes_non_finite_fields() {
        let input = SimulationInput {
            current_assets: f64::NAN,
            monthly_income: f64::INFINITY,
            monthly_expense: 1_000.0,
            annual_yield_rate_percent: f64::NEG_INFINITY,
            target_amount: 300_000.0,
        };

        let normalized = input.normalized();
        assert_eq!(normalized.current_assets, 0.0);
        assert_eq!(normalized.monthly_income, 0.0);
        assert_eq!(normalized.monthly_expense, 1_000.0);
        assert_eq!(normalized.annual_yield_rate_percent, 0.0);
        assert_eq!(normalized.target_amount, 300_000.0);
    }

    #[test]
    fn derived_quantities_match_definitions() {
        let input = SimulationInput {
            current_assets: 120_000.0,
            monthly_income: 20_000.0,
            monthly_expense: 10_000.0,
            annual_yield_rate_percent: 3.5,
            target_amount: 3_000_000.0,
        };

        assert_eq!(input.annual_savings(), 120_000.0);
        assert_eq!(input.annual_return_rate(), 0.035);
        assert!((input.passive_monthly_income() - 350.0).abs() < 1e-9);
    }

    #[test]
    fn outcome_serializes_with_status_tag() {
        let free = serde_json::to_string(&Outcome::Free).expect("serializes");
        assert_eq!(free, r#"{"status":"free"}"#);

        let calc = serde_json::to_string(&Outcome::Calculated { years: 19 }).expect("serializes");
        assert_eq!(calc, r#"{"status":"calculated","years":19}"#);

        let life = serde_json::to_string(&Outcome::LifeSentence).expect("serializes");
        assert_eq!(life, r#"{"status":"lifeSentence"}"#);
    }

    #[test]
    fn years_to_freedom_maps_variants() {
        assert_eq!(Outcome::Free.years_to_freedom(), Some(0));
        assert_eq!(Outcome::Calculated { years: 7 }.years_to_freedom(), Some(7));
        assert_eq!(Outcome::LifeSentence.years_to_freedom(), None);
    }
}
