//! The four scoring strategies. Each is a pure function of store, profile and
//! context, returning a score in `[0, 100]`.

pub mod accessibility;
pub mod budget;
pub mod exploration;
pub mod stability;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::profile::UserProfile;
use crate::domain::store::Store;
use crate::recommendation::context::CalculationContext;
use crate::recommendation::result::ComponentScores;

pub use accessibility::AccessibilityScoreCalculator;
pub use budget::BudgetEfficiencyScoreCalculator;
pub use exploration::ExplorationScoreCalculator;
pub use stability::StabilityScoreCalculator;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreComponent {
    Stability,
    Exploration,
    BudgetEfficiency,
    Accessibility,
}

impl ScoreComponent {
    pub const ALL: [ScoreComponent; 4] =
        [Self::Stability, Self::Exploration, Self::BudgetEfficiency, Self::Accessibility];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stability => "stability",
            Self::Exploration => "exploration",
            Self::BudgetEfficiency => "budget_efficiency",
            Self::Accessibility => "accessibility",
        }
    }
}

impl fmt::Display for ScoreComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ComponentScores {
    pub fn set(&mut self, component: ScoreComponent, score: f64) {
        match component {
            ScoreComponent::Stability => self.stability = score,
            ScoreComponent::Exploration => self.exploration = score,
            ScoreComponent::BudgetEfficiency => self.budget_efficiency = score,
            ScoreComponent::Accessibility => self.accessibility = score,
        }
    }
}

pub trait ScoreCalculator: Send + Sync {
    fn component(&self) -> ScoreComponent;

    fn calculate(&self, store: &Store, profile: &UserProfile, context: &CalculationContext) -> f64;
}

/// One calculator per component, in `ScoreComponent::ALL` order.
pub fn default_calculators() -> Vec<Box<dyn ScoreCalculator>> {
    vec![
        Box::new(StabilityScoreCalculator),
        Box::new(ExplorationScoreCalculator),
        Box::new(BudgetEfficiencyScoreCalculator),
        Box::new(AccessibilityScoreCalculator),
    ]
}
