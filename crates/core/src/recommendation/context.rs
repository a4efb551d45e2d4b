use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::domain::category::CategoryId;
use crate::domain::profile::UserProfile;
use crate::domain::store::{Store, StoreId};
use crate::recommendation::ScoringParameters;

/// Candidate-set statistics and member aggregates, computed once per request.
#[derive(Debug, Clone, PartialEq)]
pub struct CalculationContext {
    pub as_of: NaiveDate,
    pub parameters: ScoringParameters,
    pub min_reviews: f64,
    pub max_reviews: f64,
    pub min_views: f64,
    pub max_views: f64,
    /// `None` when no candidate carries a positive price.
    pub value_for_money_range: Option<(f64, f64)>,
    pub min_distance: f64,
    pub max_distance: f64,
    pub reference_budget: f64,
    /// Records inside the history window.
    pub history_record_count: usize,
    pub decayed_total: f64,
    pub decayed_by_category: BTreeMap<CategoryId, f64>,
    pub decayed_by_store: BTreeMap<StoreId, BTreeMap<CategoryId, f64>>,
    /// Records inside the freshness window.
    pub recent_record_count: usize,
    pub recent_by_category: BTreeMap<CategoryId, usize>,
}

#[derive(Debug, Clone, Copy)]
struct Span {
    min: f64,
    max: f64,
}

impl Span {
    fn observe(span: Option<Span>, value: f64) -> Option<Span> {
        Some(match span {
            Some(span) => Span { min: span.min.min(value), max: span.max.max(value) },
            None => Span { min: value, max: value },
        })
    }

    fn or_zero(span: Option<Span>) -> (f64, f64) {
        span.map(|span| (span.min, span.max)).unwrap_or((0.0, 0.0))
    }
}

/// `ln(1 + reviews) / price`, for stores with a positive average price.
pub fn value_for_money(store: &Store) -> Option<f64> {
    store.priced().map(|price| f64::from(store.review_count).ln_1p() / f64::from(price))
}

impl CalculationContext {
    pub fn build(
        stores: &[Store],
        profile: &UserProfile,
        as_of: NaiveDate,
        parameters: ScoringParameters,
    ) -> Self {
        let origin = profile.location();
        let mut reviews = None;
        let mut views = None;
        let mut value = None;
        let mut distance = None;

        for store in stores {
            reviews = Span::observe(reviews, f64::from(store.review_count));
            views = Span::observe(views, f64::from(store.view_count));
            distance = Span::observe(distance, origin.distance_km(&store.location()));
            if let Some(ratio) = value_for_money(store) {
                value = Span::observe(value, ratio);
            }
        }

        let (min_reviews, max_reviews) = Span::or_zero(reviews);
        let (min_views, max_views) = Span::or_zero(views);
        let (min_distance, max_distance) = Span::or_zero(distance);

        let mut history_record_count = 0usize;
        let mut history_amount = 0.0;
        let mut decayed_total = 0.0;
        let mut decayed_by_category = BTreeMap::new();
        let mut decayed_by_store: BTreeMap<StoreId, BTreeMap<CategoryId, f64>> = BTreeMap::new();
        for record in profile.expenditures_within(parameters.history_window_days, as_of) {
            let days_ago = (as_of - record.expended_at).num_days().max(0) as f64;
            let decayed = f64::from(record.amount) * (-parameters.decay_per_day * days_ago).exp();

            history_record_count += 1;
            history_amount += f64::from(record.amount);
            decayed_total += decayed;
            *decayed_by_category.entry(record.category_id).or_insert(0.0) += decayed;
            if let Some(store_id) = record.store_id {
                *decayed_by_store
                    .entry(store_id)
                    .or_default()
                    .entry(record.category_id)
                    .or_insert(0.0) += decayed;
            }
        }

        let reference_budget = if history_record_count >= parameters.cold_start_min_records
            && history_record_count > 0
        {
            history_amount / history_record_count as f64
        } else {
            f64::from(parameters.default_reference_budget)
        };

        let mut recent_record_count = 0usize;
        let mut recent_by_category = BTreeMap::new();
        for record in profile.expenditures_within(parameters.freshness_window_days, as_of) {
            recent_record_count += 1;
            *recent_by_category.entry(record.category_id).or_insert(0) += 1;
        }

        Self {
            as_of,
            parameters,
            min_reviews,
            max_reviews,
            min_views,
            max_views,
            value_for_money_range: value.map(|span| (span.min, span.max)),
            min_distance,
            max_distance,
            reference_budget,
            history_record_count,
            decayed_total,
            decayed_by_category,
            decayed_by_store,
            recent_record_count,
            recent_by_category,
        }
    }

    pub fn is_cold_start(&self) -> bool {
        self.history_record_count < self.parameters.cold_start_min_records
    }
}
