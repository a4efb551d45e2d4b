use serde::{Deserialize, Serialize};

use crate::domain::member::RecommendationType;
use crate::recommendation::result::ComponentScores;

/// Share of each component score in the final score. Every row sums to 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PersonaWeights {
    pub stability: f64,
    pub exploration: f64,
    pub budget_efficiency: f64,
    pub accessibility: f64,
}

pub const SAVER_WEIGHTS: PersonaWeights = PersonaWeights {
    stability: 0.30,
    exploration: 0.15,
    budget_efficiency: 0.50,
    accessibility: 0.05,
};

pub const ADVENTURER_WEIGHTS: PersonaWeights = PersonaWeights {
    stability: 0.30,
    exploration: 0.50,
    budget_efficiency: 0.10,
    accessibility: 0.10,
};

pub const BALANCED_WEIGHTS: PersonaWeights = PersonaWeights {
    stability: 0.30,
    exploration: 0.25,
    budget_efficiency: 0.30,
    accessibility: 0.15,
};

impl RecommendationType {
    pub const fn weights(&self) -> PersonaWeights {
        match self {
            Self::Saver => SAVER_WEIGHTS,
            Self::Adventurer => ADVENTURER_WEIGHTS,
            Self::Balanced => BALANCED_WEIGHTS,
        }
    }
}

impl PersonaWeights {
    pub fn sum(&self) -> f64 {
        self.stability + self.exploration + self.budget_efficiency + self.accessibility
    }

    /// Per-component contributions to the final score.
    pub fn apply(&self, raw: &ComponentScores) -> ComponentScores {
        ComponentScores {
            stability: raw.stability * self.stability,
            exploration: raw.exploration * self.exploration,
            budget_efficiency: raw.budget_efficiency * self.budget_efficiency,
            accessibility: raw.accessibility * self.accessibility,
        }
    }

    pub fn combine(&self, raw: &ComponentScores) -> f64 {
        self.apply(raw).total()
    }
}
