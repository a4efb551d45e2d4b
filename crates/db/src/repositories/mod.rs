use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::{Duration, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use thiserror::Error;

use mealtable_core::domain::category::{Category, CategoryId};
use mealtable_core::domain::member::{Member, MemberId, RecommendationType};
use mealtable_core::domain::profile::UserProfile;
use mealtable_core::domain::store::{Store, StoreId, StoreType};

pub mod memory;

pub use memory::InMemoryRepositories;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },
    #[error("decode error: {0}")]
    Decode(String),
    #[error("fixture error: {0}")]
    Fixture(String),
}

/// Candidate lookup parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct StoreSearch {
    pub latitude: Decimal,
    pub longitude: Decimal,
    pub radius_km: f64,
    /// Stores carrying any of these categories are skipped.
    pub excluded_category_ids: BTreeSet<CategoryId>,
    pub open_only: bool,
    pub store_type: Option<StoreType>,
    /// Moment used for the open-only filter.
    pub at: NaiveDateTime,
}

/// Expenditure dates a loaded profile keeps: `as_of - days ..= as_of`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HistoryWindow {
    pub as_of: NaiveDate,
    pub days: i64,
}

impl HistoryWindow {
    pub fn new(as_of: NaiveDate, days: i64) -> Self {
        Self { as_of, days }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        let start = self.as_of - Duration::days(self.days.max(0));
        (start..=self.as_of).contains(&date)
    }
}

#[async_trait]
pub trait RecommendationDataRepository: Send + Sync {
    /// Store visits are derived from the full history; expenditures are trimmed to `window`.
    async fn load_user_profile(
        &self,
        member_id: MemberId,
        window: HistoryWindow,
    ) -> Result<UserProfile, RepositoryError>;

    async fn find_stores_in_radius(&self, search: &StoreSearch) -> Result<Vec<Store>, RepositoryError>;
}

#[async_trait]
pub trait StoreRepository: Send + Sync {
    async fn find_by_id(&self, store_id: StoreId) -> Result<Option<Store>, RepositoryError>;
}

#[async_trait]
pub trait CategoryRepository: Send + Sync {
    async fn find_by_ids(&self, ids: &[CategoryId]) -> Result<Vec<Category>, RepositoryError>;
}

#[async_trait]
pub trait FavoriteRepository: Send + Sync {
    /// The subset of `store_ids` the member has marked as favorite.
    async fn find_store_ids_by_member(
        &self,
        member_id: MemberId,
        store_ids: &[StoreId],
    ) -> Result<Vec<StoreId>, RepositoryError>;
}

#[async_trait]
pub trait MemberRepository: Send + Sync {
    async fn find_by_id(&self, member_id: MemberId) -> Result<Option<Member>, RepositoryError>;

    async fn update_recommendation_type(
        &self,
        member_id: MemberId,
        recommendation_type: RecommendationType,
    ) -> Result<Member, RepositoryError>;
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::HistoryWindow;

    fn day(month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, month, day).expect("valid date")
    }

    #[test]
    fn window_is_inclusive_at_both_ends() {
        let window = HistoryWindow::new(day(10, 19), 30);
        assert!(window.contains(day(10, 19)));
        assert!(window.contains(day(9, 19)));
        assert!(!window.contains(day(9, 18)));
        assert!(!window.contains(day(10, 20)));
    }

    #[test]
    fn negative_days_keep_only_the_reference_date() {
        let window = HistoryWindow::new(day(10, 19), -5);
        assert!(window.contains(day(10, 19)));
        assert!(!window.contains(day(10, 18)));
    }
}
