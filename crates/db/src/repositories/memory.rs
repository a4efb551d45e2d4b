use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use mealtable_core::domain::category::{Category, CategoryId};
use mealtable_core::domain::expenditure::{DailyExpenditures, ExpenditureRecord};
use mealtable_core::domain::member::{Member, MemberId, RecommendationType};
use mealtable_core::domain::profile::UserProfile;
use mealtable_core::domain::store::{Store, StoreId};
use mealtable_core::recommendation::geo::Coordinate;

use super::{
    CategoryRepository, FavoriteRepository, HistoryWindow, MemberRepository, RecommendationDataRepository,
    RepositoryError, StoreRepository, StoreSearch,
};

#[derive(Clone, Debug)]
struct MemberRecord {
    member: Member,
    latitude: Decimal,
    longitude: Decimal,
    preferences: BTreeMap<CategoryId, i32>,
    expenditures: Vec<ExpenditureRecord>,
}

/// Process-local backing for every repository trait, seeded from fixtures or tests.
#[derive(Default)]
pub struct InMemoryRepositories {
    members: RwLock<BTreeMap<MemberId, MemberRecord>>,
    stores: RwLock<BTreeMap<StoreId, Store>>,
    categories: RwLock<BTreeMap<CategoryId, Category>>,
    favorites: RwLock<BTreeMap<MemberId, BTreeSet<StoreId>>>,
}

fn member_not_found(member_id: MemberId) -> RepositoryError {
    RepositoryError::NotFound { entity: "member", id: member_id.to_string() }
}

impl InMemoryRepositories {
    /// Registers a member with the coordinate of their primary address.
    pub async fn insert_member(&self, member: Member, latitude: Decimal, longitude: Decimal) {
        let mut members = self.members.write().await;
        members.insert(
            member.id,
            MemberRecord {
                member,
                latitude,
                longitude,
                preferences: BTreeMap::new(),
                expenditures: Vec::new(),
            },
        );
    }

    pub async fn set_preference(
        &self,
        member_id: MemberId,
        category_id: CategoryId,
        weight: i32,
    ) -> Result<(), RepositoryError> {
        let mut members = self.members.write().await;
        let record = members.get_mut(&member_id).ok_or_else(|| member_not_found(member_id))?;
        record.preferences.insert(category_id, weight);
        Ok(())
    }

    pub async fn record_expenditure(
        &self,
        member_id: MemberId,
        expenditure: ExpenditureRecord,
    ) -> Result<(), RepositoryError> {
        let mut members = self.members.write().await;
        let record = members.get_mut(&member_id).ok_or_else(|| member_not_found(member_id))?;
        record.expenditures.push(expenditure);
        Ok(())
    }

    pub async fn insert_store(&self, store: Store) {
        self.stores.write().await.insert(store.id, store);
    }

    pub async fn insert_category(&self, category: Category) {
        self.categories.write().await.insert(category.id, category);
    }

    pub async fn add_favorite(&self, member_id: MemberId, store_id: StoreId) {
        self.favorites.write().await.entry(member_id).or_default().insert(store_id);
    }
}

fn last_visits(records: &[ExpenditureRecord]) -> BTreeMap<StoreId, NaiveDate> {
    let mut visits: BTreeMap<StoreId, NaiveDate> = BTreeMap::new();
    for record in records {
        let Some(store_id) = record.store_id else {
            continue;
        };
        visits
            .entry(store_id)
            .and_modify(|latest| *latest = (*latest).max(record.expended_at))
            .or_insert(record.expended_at);
    }
    visits
}

#[async_trait::async_trait]
impl RecommendationDataRepository for InMemoryRepositories {
    async fn load_user_profile(
        &self,
        member_id: MemberId,
        window: HistoryWindow,
    ) -> Result<UserProfile, RepositoryError> {
        let members = self.members.read().await;
        let record = members.get(&member_id).ok_or_else(|| member_not_found(member_id))?;

        let daily = DailyExpenditures::index(
            record
                .expenditures
                .iter()
                .filter(|expenditure| window.contains(expenditure.expended_at))
                .cloned(),
        );
        if daily.collisions > 0 {
            warn!(
                event_name = "recommendation.profile.expenditure_collision",
                member_id = member_id.0,
                dropped = daily.collisions,
                "multiple expenditures on one date, keeping the first"
            );
        }

        Ok(UserProfile::new(
            member_id,
            record.member.recommendation_type,
            record.latitude,
            record.longitude,
        )
        .with_preferences(record.preferences.clone())
        .with_expenditures(daily.by_date)
        .with_last_visits(last_visits(&record.expenditures)))
    }

    async fn find_stores_in_radius(&self, search: &StoreSearch) -> Result<Vec<Store>, RepositoryError> {
        let origin = Coordinate::from_decimal(search.latitude, search.longitude);
        let stores = self.stores.read().await;

        let found: Vec<Store> = stores
            .values()
            .filter(|store| origin.distance_km(&store.location()) <= search.radius_km)
            .filter(|store| {
                !store.category_ids.iter().any(|id| search.excluded_category_ids.contains(id))
            })
            .filter(|store| search.store_type.map_or(true, |kind| store.store_type == kind))
            .filter(|store| !search.open_only || store.operation_status(search.at).is_open)
            .cloned()
            .collect();

        debug!(
            event_name = "recommendation.candidates.loaded",
            radius_km = search.radius_km,
            open_only = search.open_only,
            candidate_count = found.len(),
            "candidate stores loaded"
        );
        Ok(found)
    }
}

#[async_trait::async_trait]
impl StoreRepository for InMemoryRepositories {
    async fn find_by_id(&self, store_id: StoreId) -> Result<Option<Store>, RepositoryError> {
        Ok(self.stores.read().await.get(&store_id).cloned())
    }
}

#[async_trait::async_trait]
impl CategoryRepository for InMemoryRepositories {
    async fn find_by_ids(&self, ids: &[CategoryId]) -> Result<Vec<Category>, RepositoryError> {
        let categories = self.categories.read().await;
        let unique: BTreeSet<&CategoryId> = ids.iter().collect();
        Ok(unique.into_iter().filter_map(|id| categories.get(id).cloned()).collect())
    }
}

#[async_trait::async_trait]
impl FavoriteRepository for InMemoryRepositories {
    async fn find_store_ids_by_member(
        &self,
        member_id: MemberId,
        store_ids: &[StoreId],
    ) -> Result<Vec<StoreId>, RepositoryError> {
        let favorites = self.favorites.read().await;
        let Some(marked) = favorites.get(&member_id) else {
            return Ok(Vec::new());
        };
        Ok(store_ids.iter().filter(|id| marked.contains(id)).copied().collect())
    }
}

#[async_trait::async_trait]
impl MemberRepository for InMemoryRepositories {
    async fn find_by_id(&self, member_id: MemberId) -> Result<Option<Member>, RepositoryError> {
        Ok(self.members.read().await.get(&member_id).map(|record| record.member.clone()))
    }

    async fn update_recommendation_type(
        &self,
        member_id: MemberId,
        recommendation_type: RecommendationType,
    ) -> Result<Member, RepositoryError> {
        let mut members = self.members.write().await;
        let record = members.get_mut(&member_id).ok_or_else(|| member_not_found(member_id))?;
        record.member.change_recommendation_type(recommendation_type);
        Ok(record.member.clone())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use chrono::{NaiveDate, NaiveTime, Weekday};
    use rust_decimal::Decimal;

    use mealtable_core::domain::category::{Category, CategoryId};
    use mealtable_core::domain::expenditure::ExpenditureRecord;
    use mealtable_core::domain::member::{Member, MemberId, RecommendationType};
    use mealtable_core::domain::store::{OpeningHour, Store, StoreId, StoreType};

    use crate::repositories::{
        CategoryRepository, FavoriteRepository, HistoryWindow, InMemoryRepositories, MemberRepository,
        RecommendationDataRepository, RepositoryError, StoreSearch,
    };

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, day).expect("valid date")
    }

    fn window() -> HistoryWindow {
        HistoryWindow::new(date(19), 180)
    }

    fn store(id: i64, category: i64, latitude: Decimal) -> Store {
        Store {
            id: StoreId(id),
            name: format!("store-{id}"),
            category_ids: vec![CategoryId(category)],
            address: None,
            latitude,
            longitude: Decimal::new(1269780, 4),
            review_count: 10,
            average_price: Some(9_000),
            view_count: 10,
            favorite_count: 0,
            store_type: StoreType::Restaurant,
            image_url: None,
            registered_at: None,
            opening_hours: vec![OpeningHour {
                day_of_week: Weekday::Mon,
                open_time: NaiveTime::from_hms_opt(11, 0, 0),
                close_time: NaiveTime::from_hms_opt(20, 0, 0),
                break_start_time: None,
                break_end_time: None,
                holiday: false,
            }],
        }
    }

    fn search(radius_km: f64) -> StoreSearch {
        StoreSearch {
            latitude: Decimal::new(375665, 4),
            longitude: Decimal::new(1269780, 4),
            radius_km,
            excluded_category_ids: BTreeSet::new(),
            open_only: false,
            store_type: None,
            // Monday
            at: date(19).and_hms_opt(12, 0, 0).expect("valid time"),
        }
    }

    async fn seeded() -> InMemoryRepositories {
        let repos = InMemoryRepositories::default();
        repos
            .insert_member(
                Member {
                    id: MemberId(1),
                    nickname: "runner".to_string(),
                    recommendation_type: RecommendationType::Saver,
                },
                Decimal::new(375665, 4),
                Decimal::new(1269780, 4),
            )
            .await;
        // ~0.1 km, ~1.1 km and ~5.5 km north of the member.
        repos.insert_store(store(1, 1, Decimal::new(375675, 4))).await;
        repos.insert_store(store(2, 2, Decimal::new(375765, 4))).await;
        repos.insert_store(store(3, 1, Decimal::new(376165, 4))).await;
        repos
    }

    #[tokio::test]
    async fn missing_member_is_not_found() {
        let repos = InMemoryRepositories::default();
        let error = repos.load_user_profile(MemberId(9), window()).await.expect_err("no such member");
        assert!(matches!(error, RepositoryError::NotFound { entity: "member", .. }));
    }

    #[tokio::test]
    async fn profile_keeps_first_expenditure_per_date_and_derives_visits() {
        let repos = seeded().await;
        for (day, amount, store_id) in [(10, 9_000, Some(1)), (10, 50_000, None), (14, 7_000, Some(1))] {
            repos
                .record_expenditure(
                    MemberId(1),
                    ExpenditureRecord {
                        category_id: CategoryId(1),
                        store_id: store_id.map(StoreId),
                        amount,
                        expended_at: date(day),
                    },
                )
                .await
                .expect("member exists");
        }
        repos.set_preference(MemberId(1), CategoryId(2), -100).await.expect("member exists");

        let profile = repos.load_user_profile(MemberId(1), window()).await.expect("profile");
        assert_eq!(profile.recent_expenditures.len(), 2);
        assert_eq!(profile.recent_expenditures[&date(10)].amount, 9_000);
        assert_eq!(profile.last_visit_date(StoreId(1)), Some(date(14)));
        assert_eq!(profile.disliked_category_ids(), vec![CategoryId(2)]);
        assert_eq!(profile.recommendation_type, RecommendationType::Saver);
    }

    #[tokio::test]
    async fn profile_drops_expenditures_outside_the_window() {
        let repos = seeded().await;
        for (day, store_id) in [(2, 2), (12, 1), (18, 1)] {
            repos
                .record_expenditure(
                    MemberId(1),
                    ExpenditureRecord {
                        category_id: CategoryId(1),
                        store_id: Some(StoreId(store_id)),
                        amount: 8_000,
                        expended_at: date(day),
                    },
                )
                .await
                .expect("member exists");
        }

        let week = HistoryWindow::new(date(19), 7);
        let profile = repos.load_user_profile(MemberId(1), week).await.expect("profile");
        let kept: Vec<NaiveDate> = profile.recent_expenditures.keys().copied().collect();
        assert_eq!(kept, vec![date(12), date(18)]);
        assert_eq!(profile.last_visit_date(StoreId(2)), Some(date(2)));
    }

    #[tokio::test]
    async fn radius_and_exclusions_filter_candidates() {
        let repos = seeded().await;

        let near = repos.find_stores_in_radius(&search(0.5)).await.expect("search");
        assert_eq!(near.iter().map(|store| store.id).collect::<Vec<_>>(), vec![StoreId(1)]);

        let wide = repos.find_stores_in_radius(&search(2.0)).await.expect("search");
        assert_eq!(wide.len(), 2);

        let mut without_korean = search(10.0);
        without_korean.excluded_category_ids.insert(CategoryId(1));
        let filtered = repos.find_stores_in_radius(&without_korean).await.expect("search");
        assert_eq!(filtered.iter().map(|store| store.id).collect::<Vec<_>>(), vec![StoreId(2)]);
    }

    #[tokio::test]
    async fn open_only_uses_the_search_moment() {
        let repos = seeded().await;
        let mut late = search(10.0);
        late.open_only = true;
        late.at = date(19).and_hms_opt(22, 0, 0).expect("valid time");
        assert!(repos.find_stores_in_radius(&late).await.expect("search").is_empty());

        let mut lunch = search(10.0);
        lunch.open_only = true;
        assert_eq!(repos.find_stores_in_radius(&lunch).await.expect("search").len(), 3);
    }

    #[tokio::test]
    async fn favorites_are_intersected_with_the_request() {
        let repos = seeded().await;
        repos.add_favorite(MemberId(1), StoreId(1)).await;
        repos.add_favorite(MemberId(1), StoreId(3)).await;

        let marked = repos
            .find_store_ids_by_member(MemberId(1), &[StoreId(1), StoreId(2)])
            .await
            .expect("favorites");
        assert_eq!(marked, vec![StoreId(1)]);
        assert!(repos
            .find_store_ids_by_member(MemberId(2), &[StoreId(1)])
            .await
            .expect("favorites")
            .is_empty());
    }

    #[tokio::test]
    async fn categories_resolve_once_per_id() {
        let repos = seeded().await;
        repos.insert_category(Category { id: CategoryId(1), name: "Korean".to_string() }).await;

        let found = repos
            .find_by_ids(&[CategoryId(1), CategoryId(1), CategoryId(4)])
            .await
            .expect("categories");
        assert_eq!(found.len(), 1);
    }

    #[tokio::test]
    async fn recommendation_type_update_persists() {
        let repos = seeded().await;
        let updated = repos
            .update_recommendation_type(MemberId(1), RecommendationType::Adventurer)
            .await
            .expect("update");
        assert_eq!(updated.recommendation_type, RecommendationType::Adventurer);

        let profile = repos.load_user_profile(MemberId(1), window()).await.expect("profile");
        assert_eq!(profile.recommendation_type, RecommendationType::Adventurer);
        assert!(repos
            .update_recommendation_type(MemberId(5), RecommendationType::Saver)
            .await
            .is_err());
    }
}
