use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::category::CategoryId;
use crate::domain::member::RecommendationType;
use crate::domain::store::{Store, StoreId};
use crate::recommendation::weights::PersonaWeights;

/// The four heuristic scores, each in `[0, 100]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ComponentScores {
    pub stability: f64,
    pub exploration: f64,
    pub budget_efficiency: f64,
    pub accessibility: f64,
}

impl ComponentScores {
    pub fn uniform(score: f64) -> Self {
        Self { stability: score, exploration: score, budget_efficiency: score, accessibility: score }
    }

    pub fn total(&self) -> f64 {
        self.stability + self.exploration + self.budget_efficiency + self.accessibility
    }
}

/// Breakdown of how a store's final score was assembled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreDetail {
    pub recommendation_type: RecommendationType,
    pub final_score: f64,
    pub raw: ComponentScores,
    pub weighted: ComponentScores,
    pub weights: PersonaWeights,
}

impl ScoreDetail {
    pub fn assemble(recommendation_type: RecommendationType, raw: ComponentScores) -> Self {
        let weights = recommendation_type.weights();
        let weighted = weights.apply(&raw);
        Self { recommendation_type, final_score: weighted.total(), raw, weighted, weights }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationResult {
    pub store_id: StoreId,
    pub store_name: String,
    pub category_id: Option<CategoryId>,
    pub address: Option<String>,
    pub final_score: f64,
    /// Kilometres from the member's current position.
    pub distance: f64,
    pub average_price: Option<u32>,
    pub review_count: u32,
    pub image_url: Option<String>,
    pub latitude: Decimal,
    pub longitude: Decimal,
    pub score_detail: Option<ScoreDetail>,
}

impl RecommendationResult {
    pub fn from_store(store: &Store, distance: f64, score_detail: ScoreDetail) -> Self {
        Self {
            store_id: store.id,
            store_name: store.name.clone(),
            category_id: store.primary_category_id(),
            address: store.address.clone(),
            final_score: score_detail.final_score,
            distance,
            average_price: store.average_price,
            review_count: store.review_count,
            image_url: store.image_url.clone(),
            latitude: store.latitude,
            longitude: store.longitude,
            score_detail: Some(score_detail),
        }
    }
}
