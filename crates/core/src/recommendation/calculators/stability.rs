use crate::domain::profile::UserProfile;
use crate::domain::store::Store;
use crate::recommendation::calculators::{ScoreCalculator, ScoreComponent};
use crate::recommendation::context::CalculationContext;
use crate::recommendation::normalize::{bounded, linear, min_max, MAX_SCORE, NEUTRAL_SCORE};

const PREFERENCE_WEIGHT: f64 = 0.40;
const EXPENDITURE_WEIGHT: f64 = 0.40;
const REVIEW_WEIGHT: f64 = 0.20;

/// How reliably the member will enjoy a store: stated taste, where their money
/// actually goes, and how established the store is.
#[derive(Debug, Clone, Copy, Default)]
pub struct StabilityScoreCalculator;

impl StabilityScoreCalculator {
    pub fn preference_score(store: &Store, profile: &UserProfile) -> f64 {
        match store.primary_category_id() {
            Some(category_id) => {
                linear(f64::from(profile.category_preference(category_id)), -100.0, 100.0)
            }
            None => NEUTRAL_SCORE,
        }
    }

    /// Decayed share of spending in the store's primary category or at the store.
    pub fn expenditure_score(store: &Store, context: &CalculationContext) -> f64 {
        if context.is_cold_start() || context.decayed_total <= 0.0 {
            return 0.0;
        }

        let primary = store.primary_category_id();
        let in_category =
            primary.and_then(|id| context.decayed_by_category.get(&id)).copied().unwrap_or(0.0);
        let at_store_elsewhere: f64 = context
            .decayed_by_store
            .get(&store.id)
            .map(|by_category| {
                by_category
                    .iter()
                    .filter(|(category_id, _)| Some(**category_id) != primary)
                    .map(|(_, amount)| amount)
                    .sum()
            })
            .unwrap_or(0.0);

        bounded((in_category + at_store_elsewhere) / context.decayed_total * MAX_SCORE)
    }

    pub fn review_score(store: &Store, context: &CalculationContext) -> f64 {
        min_max(f64::from(store.review_count), context.min_reviews, context.max_reviews)
    }
}

impl ScoreCalculator for StabilityScoreCalculator {
    fn component(&self) -> ScoreComponent {
        ScoreComponent::Stability
    }

    fn calculate(&self, store: &Store, profile: &UserProfile, context: &CalculationContext) -> f64 {
        bounded(
            PREFERENCE_WEIGHT * Self::preference_score(store, profile)
                + EXPENDITURE_WEIGHT * Self::expenditure_score(store, context)
                + REVIEW_WEIGHT * Self::review_score(store, context),
        )
    }
}
