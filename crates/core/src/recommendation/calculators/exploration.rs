use chrono::NaiveDate;

use crate::domain::profile::UserProfile;
use crate::domain::store::Store;
use crate::recommendation::calculators::{ScoreCalculator, ScoreComponent};
use crate::recommendation::context::CalculationContext;
use crate::recommendation::normalize::{bounded, log_scaled, MAX_SCORE, MIN_SCORE, NEUTRAL_SCORE};

const CATEGORY_FRESHNESS_WEIGHT: f64 = 0.40;
const STORE_NEWNESS_WEIGHT: f64 = 0.30;
const RECENT_INTEREST_WEIGHT: f64 = 0.30;

const VISIT_WEIGHT: f64 = 0.6;
const REGISTRATION_WEIGHT: f64 = 0.4;
/// A store unvisited for this long counts as new again.
const VISIT_RECOVERY_DAYS: f64 = 180.0;
/// Registration newness loses 10 points per 30 days.
const REGISTRATION_DECAY_PER_DAY: f64 = 10.0 / 30.0;

/// Rewards categories and stores the member has not been frequenting lately, and
/// stores that are drawing attention.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExplorationScoreCalculator;

impl ExplorationScoreCalculator {
    pub fn category_freshness(store: &Store, profile: &UserProfile, context: &CalculationContext) -> f64 {
        let Some(category_id) = store.primary_category_id() else {
            return NEUTRAL_SCORE;
        };

        let history = if context.recent_record_count == 0 {
            NEUTRAL_SCORE
        } else {
            let visits = context.recent_by_category.get(&category_id).copied().unwrap_or(0);
            let share = visits as f64 / context.recent_record_count as f64;
            (1.0 - share) * MAX_SCORE
        };

        let novelty = match profile.category_preference(category_id) {
            0 => MAX_SCORE,
            weight if weight > 0 => NEUTRAL_SCORE,
            _ => MIN_SCORE,
        };

        bounded((history + novelty) / 2.0)
    }

    pub fn store_newness(store: &Store, profile: &UserProfile, as_of: NaiveDate) -> f64 {
        let visit = match profile.last_visit_date(store.id) {
            None => MAX_SCORE,
            Some(visited) => {
                let days = (as_of - visited).num_days().max(0) as f64;
                (days / VISIT_RECOVERY_DAYS * MAX_SCORE).min(MAX_SCORE)
            }
        };

        let registration = match store.registered_at {
            None => NEUTRAL_SCORE,
            Some(registered) => {
                let days = (as_of - registered.date()).num_days().max(0) as f64;
                (MAX_SCORE - days * REGISTRATION_DECAY_PER_DAY).max(MIN_SCORE)
            }
        };

        bounded(VISIT_WEIGHT * visit + REGISTRATION_WEIGHT * registration)
    }

    pub fn recent_interest(store: &Store, context: &CalculationContext) -> f64 {
        log_scaled(f64::from(store.view_count), context.min_views, context.max_views)
    }
}

impl ScoreCalculator for ExplorationScoreCalculator {
    fn component(&self) -> ScoreComponent {
        ScoreComponent::Exploration
    }

    fn calculate(&self, store: &Store, profile: &UserProfile, context: &CalculationContext) -> f64 {
        bounded(
            CATEGORY_FRESHNESS_WEIGHT * Self::category_freshness(store, profile, context)
                + STORE_NEWNESS_WEIGHT * Self::store_newness(store, profile, context.as_of)
                + RECENT_INTEREST_WEIGHT * Self::recent_interest(store, context),
        )
    }
}
