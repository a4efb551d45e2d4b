use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Instant;

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use tracing::{debug, info};

use mealtable_core::config::{AppConfig, RecommendationConfig};
use mealtable_core::domain::category::CategoryId;
use mealtable_core::domain::member::{MemberId, RecommendationType};
use mealtable_core::domain::profile::UserProfile;
use mealtable_core::domain::store::{OperationStatus, Store, StoreId};
use mealtable_core::errors::{ApplicationError, DomainError};
use mealtable_core::recommendation::result::RecommendationResult;
use mealtable_core::recommendation::RecommendationDomainService;
use mealtable_db::{
    CategoryRepository, FavoriteRepository, HistoryWindow, InMemoryRepositories, MemberRepository,
    RecommendationDataRepository, RepositoryError, StoreRepository, StoreSearch,
};

use crate::business_hours::BusinessHours;
use crate::clock::Clock;
use crate::request::{validate_coordinate, RecommendationRequest, SortBy};
use crate::response::{
    RecommendationPage, RecommendationResponse, RecommendationTypeResponse, ScoreDetailResponse,
};

/// Data sources the application service reads from.
#[derive(Clone)]
pub struct RecommendationRepositories {
    pub data: Arc<dyn RecommendationDataRepository>,
    pub stores: Arc<dyn StoreRepository>,
    pub categories: Arc<dyn CategoryRepository>,
    pub favorites: Arc<dyn FavoriteRepository>,
    pub members: Arc<dyn MemberRepository>,
}

impl RecommendationRepositories {
    pub fn in_memory(repositories: Arc<InMemoryRepositories>) -> Self {
        Self {
            data: repositories.clone(),
            stores: repositories.clone(),
            categories: repositories.clone(),
            favorites: repositories.clone(),
            members: repositories,
        }
    }
}

pub(crate) fn map_repository_error(error: RepositoryError) -> ApplicationError {
    match error {
        RepositoryError::NotFound { entity, id } => ApplicationError::NotFound { entity, id },
        other => ApplicationError::Persistence(other.to_string()),
    }
}

pub struct RecommendationApplicationService {
    repositories: RecommendationRepositories,
    domain: RecommendationDomainService,
    hours: BusinessHours,
    limits: RecommendationConfig,
}

impl RecommendationApplicationService {
    pub fn new(repositories: RecommendationRepositories, config: &AppConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            repositories,
            domain: RecommendationDomainService::new(config.scoring.parameters()),
            hours: BusinessHours::new(clock),
            limits: config.recommendation.clone(),
        }
    }

    pub async fn get_recommendations(
        &self,
        member_id: MemberId,
        request: &RecommendationRequest,
    ) -> Result<RecommendationPage, ApplicationError> {
        request.validate(&self.limits)?;
        let started = Instant::now();
        let at = request.at.unwrap_or_else(|| self.hours.now());

        let mut profile = self.load_profile(member_id, at.date()).await?;
        if let Some((latitude, longitude)) = request.coordinate_override() {
            profile = profile.relocated(latitude, longitude);
        }

        let excluded_category_ids: BTreeSet<CategoryId> = if request.include_disliked {
            BTreeSet::new()
        } else {
            profile.disliked_category_ids().into_iter().collect()
        };
        let search = StoreSearch {
            latitude: profile.current_latitude,
            longitude: profile.current_longitude,
            radius_km: request.radius_km,
            excluded_category_ids,
            open_only: request.open_now,
            store_type: request.store_type.store_type(),
            at,
        };
        let stores = self
            .repositories
            .data
            .find_stores_in_radius(&search)
            .await
            .map_err(map_repository_error)?;

        let mut results = if self.limits.parallel_scoring {
            self.domain.calculate_recommendations_parallel(&stores, &profile, at.date())
        } else {
            self.domain.calculate_recommendations_at(&stores, &profile, at.date())
        };
        sort_results(&mut results, request.sort_by);

        let total = results.len();
        let offset = request.offset().min(total);
        let end = offset.saturating_add(request.size as usize).min(total);
        let page: Vec<RecommendationResult> = results.drain(offset..end).collect();

        let by_id: HashMap<StoreId, &Store> = stores.iter().map(|store| (store.id, store)).collect();
        let items = self.decorate(member_id, page, &by_id, at).await?;

        info!(
            event_name = "recommendation.request.completed",
            member_id = member_id.0,
            sort_by = request.sort_by.as_str(),
            radius_km = request.radius_km,
            candidate_count = total,
            returned = items.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "recommendations served"
        );

        Ok(RecommendationPage {
            items,
            page: request.page,
            size: request.size,
            total,
            has_next: end < total,
        })
    }

    pub async fn get_score_detail(
        &self,
        member_id: MemberId,
        store_id: StoreId,
        latitude: Option<Decimal>,
        longitude: Option<Decimal>,
    ) -> Result<ScoreDetailResponse, ApplicationError> {
        validate_coordinate(latitude, longitude)?;
        let store = self
            .repositories
            .stores
            .find_by_id(store_id)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| ApplicationError::NotFound { entity: "store", id: store_id.to_string() })?;

        let as_of = self.hours.now().date();
        let mut profile = self.load_profile(member_id, as_of).await?;
        if let Some((latitude, longitude)) = latitude.zip(longitude) {
            profile = profile.relocated(latitude, longitude);
        }

        let result = self
            .domain
            .calculate_recommendations_at(std::slice::from_ref(&store), &profile, as_of)
            .into_iter()
            .next()
            .ok_or_else(|| {
                ApplicationError::Domain(DomainError::InvariantViolation(
                    "scoring produced no result for a single store".to_string(),
                ))
            })?;
        let detail = result.score_detail.as_ref().ok_or_else(|| {
            ApplicationError::Domain(DomainError::InvariantViolation(
                "score detail missing".to_string(),
            ))
        })?;

        info!(
            event_name = "recommendation.score_detail.served",
            member_id = member_id.0,
            store_id = store_id.0,
            final_score = detail.final_score,
            "score detail served"
        );
        Ok(ScoreDetailResponse::from_detail(store.id, store.name.clone(), detail, result.distance))
    }

    pub async fn update_recommendation_type(
        &self,
        member_id: MemberId,
        recommendation_type: RecommendationType,
    ) -> Result<RecommendationTypeResponse, ApplicationError> {
        let current = self
            .repositories
            .members
            .find_by_id(member_id)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| ApplicationError::NotFound { entity: "member", id: member_id.to_string() })?;
        if current.recommendation_type == recommendation_type {
            debug!(
                event_name = "member.recommendation_type.unchanged",
                member_id = member_id.0,
                recommendation_type = recommendation_type.as_str(),
                "recommendation type already set"
            );
            return Ok(current.into());
        }

        let member = self
            .repositories
            .members
            .update_recommendation_type(member_id, recommendation_type)
            .await
            .map_err(map_repository_error)?;

        info!(
            event_name = "member.recommendation_type.updated",
            member_id = member_id.0,
            previous = current.recommendation_type.as_str(),
            recommendation_type = recommendation_type.as_str(),
            "recommendation type updated"
        );
        Ok(member.into())
    }

    async fn load_profile(
        &self,
        member_id: MemberId,
        as_of: NaiveDate,
    ) -> Result<UserProfile, ApplicationError> {
        let window = HistoryWindow::new(as_of, self.domain.parameters().history_window_days);
        self.repositories.data.load_user_profile(member_id, window).await.map_err(map_repository_error)
    }

    async fn decorate(
        &self,
        member_id: MemberId,
        page: Vec<RecommendationResult>,
        stores: &HashMap<StoreId, &Store>,
        at: NaiveDateTime,
    ) -> Result<Vec<RecommendationResponse>, ApplicationError> {
        let category_ids: Vec<CategoryId> = page.iter().filter_map(|result| result.category_id).collect();
        let category_names: BTreeMap<CategoryId, String> = self
            .repositories
            .categories
            .find_by_ids(&category_ids)
            .await
            .map_err(map_repository_error)?
            .into_iter()
            .map(|category| (category.id, category.name))
            .collect();

        let store_ids: Vec<StoreId> = page.iter().map(|result| result.store_id).collect();
        let favorites: BTreeSet<StoreId> = self
            .repositories
            .favorites
            .find_store_ids_by_member(member_id, &store_ids)
            .await
            .map_err(map_repository_error)?
            .into_iter()
            .collect();

        Ok(page
            .into_iter()
            .map(|result| {
                let category_name =
                    result.category_id.and_then(|id| category_names.get(&id).cloned());
                let is_favorite = favorites.contains(&result.store_id);
                let status = match stores.get(&result.store_id) {
                    Some(store) => self.hours.status_at(store, at),
                    None => OperationStatus::evaluate(&[], at),
                };
                RecommendationResponse::decorate(result, category_name, is_favorite, status)
            })
            .collect())
    }
}

fn price_order(left: Option<u32>, right: Option<u32>, descending: bool) -> Ordering {
    match (left, right) {
        (Some(left), Some(right)) if descending => right.cmp(&left),
        (Some(left), Some(right)) => left.cmp(&right),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Stable sort by the requested key, ties broken by store id.
pub fn sort_results(results: &mut [RecommendationResult], sort_by: SortBy) {
    results.sort_by(|left, right| {
        let primary = match sort_by {
            SortBy::Score => right.final_score.total_cmp(&left.final_score),
            SortBy::Distance => left.distance.total_cmp(&right.distance),
            SortBy::Review => right.review_count.cmp(&left.review_count),
            SortBy::PriceLow => price_order(left.average_price, right.average_price, false),
            SortBy::PriceHigh => price_order(left.average_price, right.average_price, true),
        };
        primary.then_with(|| left.store_id.cmp(&right.store_id))
    });
}
