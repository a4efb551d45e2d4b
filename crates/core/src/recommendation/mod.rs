//! Rule-based store scoring. Four calculators produce `[0, 100]` scores that are
//! combined with persona weights into one final score per candidate store.

pub mod calculators;
pub mod context;
pub mod geo;
pub mod normalize;
pub mod result;
pub mod service;
pub mod weights;

use serde::{Deserialize, Serialize};

pub use calculators::{ScoreCalculator, ScoreComponent};
pub use context::CalculationContext;
pub use result::{ComponentScores, RecommendationResult, ScoreDetail};
pub use service::RecommendationDomainService;
pub use weights::PersonaWeights;

/// Tunables shared by the calculators.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringParameters {
    /// Exponential decay rate applied to expenditure amounts, per day of age.
    pub decay_per_day: f64,
    /// Members with fewer trailing records than this are treated as new.
    pub cold_start_min_records: usize,
    /// Reference budget in KRW for members without enough history.
    pub default_reference_budget: u32,
    pub history_window_days: i64,
    pub freshness_window_days: i64,
}

impl Default for ScoringParameters {
    fn default() -> Self {
        Self {
            decay_per_day: 0.01,
            cold_start_min_records: 3,
            default_reference_budget: 10_000,
            history_window_days: 180,
            freshness_window_days: 30,
        }
    }
}
