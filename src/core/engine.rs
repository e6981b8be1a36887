use super::types::{ChartPoint, Outcome, ProjectionSummary, SimulationInput, SimulationResult};

/// Hard bound on the saving-phase loop. Termination must not depend on the
/// inputs behaving; pathological savings/yield combinations still return.
pub const MAX_YEARS: u32 = 100;

/// Total horizon of the extended projection, in years from today.
pub const PROJECTION_YEARS: u32 = 40;

/// Fixed annual withdrawal after the threshold, as a share of the target.
pub const SAFE_WITHDRAWAL_RATE: f64 = 0.04;

/// At most this many post-threshold years feed the annualized growth rate.
const GROWTH_WINDOW_YEARS: u32 = 20;

/// The engine's sole entry point: a pure function of the input tuple.
/// Callers that re-evaluate on every UI change are expected to memoize on
/// the full input; the engine itself holds no state.
pub fn compute_freedom_timeline(input: &SimulationInput) -> SimulationResult {
    let input = input.normalized();
    let rate = input.annual_return_rate();

    if already_free(input.current_assets, rate, input.monthly_expense) {
        let projection = build_projection(
            vec![input.current_assets],
            input.current_assets,
            rate,
            input.target_amount,
            0,
        );
        return SimulationResult {
            outcome: Outcome::Free,
            final_assets: input.current_assets,
            chart: vec![ChartPoint {
                year_offset: 0,
                asset_value: input.current_assets,
            }],
            projection: Some(projection),
        };
    }

    let run = simulate_compounding(
        input.current_assets,
        input.annual_savings(),
        rate,
        input.target_amount,
    );

    match run.outcome {
        CompoundingOutcome::Unreachable => SimulationResult {
            outcome: Outcome::LifeSentence,
            final_assets: run.final_balance,
            chart: Vec::new(),
            projection: None,
        },
        CompoundingOutcome::Reached { years } => {
            let mut dense = Vec::with_capacity(run.yearly_balances.len() + 1);
            dense.push(input.current_assets);
            dense.extend_from_slice(&run.yearly_balances);

            let chart = sample_projection(&dense, Some(years));
            let projection =
                build_projection(dense, run.final_balance, rate, input.target_amount, years);

            SimulationResult {
                outcome: Outcome::Calculated { years },
                final_assets: run.final_balance,
                chart,
                projection: Some(projection),
            }
        }
    }
}

/// Passive income alone covers a positive monthly expense, boundary
/// inclusive. A zero or negative expense never counts as free.
fn already_free(assets: f64, annual_return_rate: f64, monthly_expense: f64) -> bool {
    monthly_expense > 0.0 && monthly_expense <= assets * annual_return_rate / 12.0
}

enum CompoundingOutcome {
    Reached { years: u32 },
    Unreachable,
}

struct CompoundingRun {
    outcome: CompoundingOutcome,
    final_balance: f64,
    /// Committed end-of-year balances; index i is the balance after year
    /// i + 1 of saving.
    yearly_balances: Vec<f64>,
}

fn simulate_compounding(
    assets: f64,
    annual_savings: f64,
    annual_return_rate: f64,
    target_amount: f64,
) -> CompoundingRun {
    // A non-positive target is trivially satisfied: declared policy, not an
    // error. Reported as reached in zero years with the balance untouched.
    if target_amount <= 0.0 || assets >= target_amount {
        return CompoundingRun {
            outcome: CompoundingOutcome::Reached { years: 0 },
            final_balance: assets,
            yearly_balances: Vec::new(),
        };
    }

    let mut balance = assets;
    let mut yearly_balances = Vec::new();

    for year in 1..=MAX_YEARS {
        let next = balance * (1.0 + annual_return_rate) + annual_savings;

        // Shrinking while still below the goal: under constant rates the
        // trend only steepens, so the target is unreachable in finite time.
        if next < balance && balance < target_amount {
            return CompoundingRun {
                outcome: CompoundingOutcome::Unreachable,
                final_balance: balance,
                yearly_balances,
            };
        }

        balance = next;
        yearly_balances.push(balance);

        if balance >= target_amount {
            return CompoundingRun {
                outcome: CompoundingOutcome::Reached { years: year },
                final_balance: balance,
                yearly_balances,
            };
        }
    }

    CompoundingRun {
        outcome: CompoundingOutcome::Unreachable,
        final_balance: balance,
        yearly_balances,
    }
}

struct PostThresholdRun {
    balances: Vec<f64>,
    final_balance: f64,
    growth_rate_percent: f64,
}

/// Extends the horizon past the threshold year: the remainder keeps
/// compounding while a fixed 4%-of-target withdrawal is taken each year.
fn extend_past_threshold(
    balance_at_threshold: f64,
    annual_return_rate: f64,
    target_amount: f64,
    freedom_years: u32,
) -> PostThresholdRun {
    let withdrawal = (target_amount * SAFE_WITHDRAWAL_RATE).max(0.0);
    let mut balance = balance_at_threshold;
    let mut balances = Vec::new();

    for _ in freedom_years..PROJECTION_YEARS {
        balance = balance + balance * annual_return_rate - withdrawal;
        balances.push(balance);
    }

    let window = PROJECTION_YEARS
        .saturating_sub(freedom_years)
        .min(GROWTH_WINDOW_YEARS) as usize;
    let growth_rate_percent = if balance_at_threshold > 0.0 && window > 0 {
        let window_end = balances[window - 1];
        if window_end > 0.0 {
            ((window_end / balance_at_threshold).powf(1.0 / window as f64) - 1.0) * 100.0
        } else {
            // A drained balance has no meaningful annualized rate.
            0.0
        }
    } else {
        0.0
    };

    PostThresholdRun {
        final_balance: balance,
        balances,
        growth_rate_percent,
    }
}

fn build_projection(
    mut dense_balances: Vec<f64>,
    balance_at_threshold: f64,
    annual_return_rate: f64,
    target_amount: f64,
    freedom_years: u32,
) -> ProjectionSummary {
    let post = extend_past_threshold(
        balance_at_threshold,
        annual_return_rate,
        target_amount,
        freedom_years,
    );
    dense_balances.extend_from_slice(&post.balances);

    ProjectionSummary {
        chart: sample_projection(&dense_balances, Some(freedom_years)),
        balance_at_threshold,
        final_balance: post.final_balance,
        growth_rate_percent: post.growth_rate_percent,
    }
}

/// Thins a dense per-year sequence (index = year offset, index 0 = today)
/// into a bounded chart: year 0, every year through 10, multiples of 5
/// after that, plus the final year and the exact freedom year.
fn sample_projection(dense_balances: &[f64], freedom_year: Option<u32>) -> Vec<ChartPoint> {
    let last = dense_balances.len().saturating_sub(1);

    dense_balances
        .iter()
        .enumerate()
        .filter(|(offset, _)| keep_offset(*offset, last, freedom_year))
        .map(|(offset, balance)| ChartPoint {
            year_offset: offset as u32,
            asset_value: *balance,
        })
        .collect()
}

fn keep_offset(offset: usize, last: usize, freedom_year: Option<u32>) -> bool {
    offset <= 10
        || offset % 5 == 0
        || offset == last
        || freedom_year.is_some_and(|year| year as usize == offset)
}
