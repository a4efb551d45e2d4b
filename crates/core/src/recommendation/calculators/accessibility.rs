use crate::domain::profile::UserProfile;
use crate::domain::store::Store;
use crate::recommendation::calculators::{ScoreCalculator, ScoreComponent};
use crate::recommendation::context::CalculationContext;
use crate::recommendation::normalize::{bounded, min_max, MAX_SCORE};

/// Closer is better, relative to the rest of the candidate set.
#[derive(Debug, Clone, Copy, Default)]
pub struct AccessibilityScoreCalculator;

impl ScoreCalculator for AccessibilityScoreCalculator {
    fn component(&self) -> ScoreComponent {
        ScoreComponent::Accessibility
    }

    fn calculate(&self, store: &Store, profile: &UserProfile, context: &CalculationContext) -> f64 {
        if context.max_distance <= context.min_distance {
            return MAX_SCORE;
        }
        let distance = profile.location().distance_km(&store.location());
        bounded(MAX_SCORE - min_max(distance, context.min_distance, context.max_distance))
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::AccessibilityScoreCalculator;
    use crate::recommendation::calculators::fixtures::{context, profile, store};
    use crate::recommendation::calculators::ScoreCalculator;

    #[test]
    fn nearest_scores_full_and_farthest_scores_zero() {
        let near = store(1, 1);
        let mut middle = store(2, 1);
        middle.latitude = Decimal::new(376000, 4);
        let mut far = store(3, 1);
        far.latitude = Decimal::new(377000, 4);
        let stores = vec![near, middle, far];
        let profile = profile();
        let context = context(&stores, &profile);

        let scores: Vec<f64> = stores
            .iter()
            .map(|store| AccessibilityScoreCalculator.calculate(store, &profile, &context))
            .collect();
        assert_eq!(scores[0], 100.0);
        assert_eq!(scores[2], 0.0);
        assert!(scores[1] > 0.0 && scores[1] < 100.0);
    }

    #[test]
    fn single_candidate_is_never_penalized() {
        let mut lone = store(1, 1);
        lone.latitude = Decimal::new(380000, 4);
        let stores = vec![lone];
        let profile = profile();

        assert_eq!(AccessibilityScoreCalculator.calculate(&stores[0], &profile, &context(&stores, &profile)), 100.0);
    }
}
