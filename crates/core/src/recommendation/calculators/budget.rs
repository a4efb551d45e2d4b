use crate::domain::profile::UserProfile;
use crate::domain::store::Store;
use crate::recommendation::calculators::{ScoreCalculator, ScoreComponent};
use crate::recommendation::context::{value_for_money, CalculationContext};
use crate::recommendation::normalize::{bounded, min_max, MAX_SCORE, MIN_SCORE, NEUTRAL_SCORE};

const VALUE_FOR_MONEY_WEIGHT: f64 = 0.60;
const BUDGET_FIT_WEIGHT: f64 = 0.40;

#[derive(Debug, Clone, Copy, Default)]
pub struct BudgetEfficiencyScoreCalculator;

impl BudgetEfficiencyScoreCalculator {
    pub fn value_for_money_score(store: &Store, context: &CalculationContext) -> f64 {
        match (value_for_money(store), context.value_for_money_range) {
            (Some(ratio), Some((min, max))) => min_max(ratio, min, max),
            _ => NEUTRAL_SCORE,
        }
    }

    /// 100 up to the reference budget, falling linearly to 0 at twice the reference.
    pub fn budget_fit_score(store: &Store, context: &CalculationContext) -> f64 {
        let Some(price) = store.priced() else {
            return NEUTRAL_SCORE;
        };
        let reference = context.reference_budget;
        if reference <= 0.0 {
            return NEUTRAL_SCORE;
        }

        let price = f64::from(price);
        if price <= reference {
            MAX_SCORE
        } else if price >= 2.0 * reference {
            MIN_SCORE
        } else {
            bounded((2.0 * reference - price) / reference * MAX_SCORE)
        }
    }
}

impl ScoreCalculator for BudgetEfficiencyScoreCalculator {
    fn component(&self) -> ScoreComponent {
        ScoreComponent::BudgetEfficiency
    }

    fn calculate(&self, store: &Store, _profile: &UserProfile, context: &CalculationContext) -> f64 {
        bounded(
            VALUE_FOR_MONEY_WEIGHT * Self::value_for_money_score(store, context)
                + BUDGET_FIT_WEIGHT * Self::budget_fit_score(store, context),
        )
    }
}
