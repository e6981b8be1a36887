mod engine;
mod types;
mod verdict;

pub use engine::{MAX_YEARS, PROJECTION_YEARS, SAFE_WITHDRAWAL_RATE, compute_freedom_timeline};
pub use types::{ChartPoint, Outcome, ProjectionSummary, SimulationInput, SimulationResult};
pub use verdict::{GrowthTier, SentenceTier, classify_growth, classify_sentence};
