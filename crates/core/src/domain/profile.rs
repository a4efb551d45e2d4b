use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::category::CategoryId;
use crate::domain::expenditure::ExpenditureRecord;
use crate::domain::member::{MemberId, RecommendationType};
use crate::domain::store::StoreId;
use crate::recommendation::geo::Coordinate;

/// Everything the scorer knows about a member for one request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub member_id: MemberId,
    pub recommendation_type: RecommendationType,
    pub current_latitude: Decimal,
    pub current_longitude: Decimal,
    /// Weight in `[-100, 100]`: 100 like, -100 dislike, 0 or absent neutral.
    #[serde(default)]
    pub category_preferences: BTreeMap<CategoryId, i32>,
    #[serde(default)]
    pub recent_expenditures: BTreeMap<NaiveDate, ExpenditureRecord>,
    #[serde(default)]
    pub store_last_visit_dates: BTreeMap<StoreId, NaiveDate>,
}

impl UserProfile {
    pub fn new(
        member_id: MemberId,
        recommendation_type: RecommendationType,
        current_latitude: Decimal,
        current_longitude: Decimal,
    ) -> Self {
        Self {
            member_id,
            recommendation_type,
            current_latitude,
            current_longitude,
            category_preferences: BTreeMap::new(),
            recent_expenditures: BTreeMap::new(),
            store_last_visit_dates: BTreeMap::new(),
        }
    }

    pub fn with_preferences(mut self, preferences: BTreeMap<CategoryId, i32>) -> Self {
        self.category_preferences = preferences;
        self
    }

    pub fn with_expenditures(mut self, expenditures: BTreeMap<NaiveDate, ExpenditureRecord>) -> Self {
        self.recent_expenditures = expenditures;
        self
    }

    pub fn with_last_visits(mut self, visits: BTreeMap<StoreId, NaiveDate>) -> Self {
        self.store_last_visit_dates = visits;
        self
    }

    /// Copy of the profile positioned at another coordinate.
    pub fn relocated(&self, latitude: Decimal, longitude: Decimal) -> Self {
        Self { current_latitude: latitude, current_longitude: longitude, ..self.clone() }
    }

    pub fn location(&self) -> Coordinate {
        Coordinate::from_decimal(self.current_latitude, self.current_longitude)
    }

    /// Explicit preference weight, clamped to `[-100, 100]`.
    pub fn preference_for(&self, category_id: CategoryId) -> Option<i32> {
        self.category_preferences.get(&category_id).map(|weight| (*weight).clamp(-100, 100))
    }

    pub fn category_preference(&self, category_id: CategoryId) -> i32 {
        self.preference_for(category_id).unwrap_or(0)
    }

    pub fn disliked_category_ids(&self) -> Vec<CategoryId> {
        self.category_preferences
            .iter()
            .filter(|(_, weight)| **weight <= -100)
            .map(|(category_id, _)| *category_id)
            .collect()
    }

    /// Records dated from `as_of - days` through `as_of`, both inclusive.
    pub fn expenditures_within(
        &self,
        days: i64,
        as_of: NaiveDate,
    ) -> impl Iterator<Item = &ExpenditureRecord> + '_ {
        let start = as_of - Duration::days(days.max(0));
        self.recent_expenditures.range(start..=as_of).map(|(_, record)| record)
    }

    pub fn last_visit_date(&self, store_id: StoreId) -> Option<NaiveDate> {
        self.store_last_visit_dates.get(&store_id).copied()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    use super::UserProfile;
    use crate::domain::category::CategoryId;
    use crate::domain::expenditure::ExpenditureRecord;
    use crate::domain::member::{MemberId, RecommendationType};

    fn date(month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, month, day).expect("valid date")
    }

    fn profile() -> UserProfile {
        UserProfile::new(
            MemberId(1),
            RecommendationType::Balanced,
            Decimal::new(375665, 4),
            Decimal::new(1269780, 4),
        )
    }

    #[test]
    fn absent_preference_is_neutral() {
        let profile = profile().with_preferences(BTreeMap::from([(CategoryId(1), 100)]));
        assert_eq!(profile.category_preference(CategoryId(1)), 100);
        assert_eq!(profile.category_preference(CategoryId(2)), 0);
        assert_eq!(profile.preference_for(CategoryId(2)), None);
    }

    #[test]
    fn only_explicit_dislikes_are_excluded() {
        let profile = profile().with_preferences(BTreeMap::from([
            (CategoryId(1), 100),
            (CategoryId(2), -100),
            (CategoryId(3), -40),
        ]));
        assert_eq!(profile.disliked_category_ids(), vec![CategoryId(2)]);
    }

    #[test]
    fn expenditure_window_is_inclusive_of_its_start() {
        let record = |day: NaiveDate| ExpenditureRecord {
            category_id: CategoryId(1),
            store_id: None,
            amount: 9_000,
            expended_at: day,
        };
        let profile = profile().with_expenditures(BTreeMap::from([
            (date(9, 18), record(date(9, 18))),
            (date(9, 17), record(date(9, 17))),
            (date(10, 10), record(date(10, 10))),
        ]));

        let within: Vec<_> = profile.expenditures_within(30, date(10, 18)).collect();
        assert_eq!(within.len(), 2);
    }

    #[test]
    fn relocation_keeps_everything_else() {
        let original = profile().with_preferences(BTreeMap::from([(CategoryId(4), 100)]));
        let moved = original.relocated(Decimal::new(375, 1), Decimal::new(127, 0));

        assert_eq!(moved.current_latitude, Decimal::new(375, 1));
        assert_eq!(moved.category_preferences, original.category_preferences);
        assert_eq!(moved.member_id, original.member_id);
    }
}
