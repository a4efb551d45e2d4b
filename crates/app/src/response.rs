use rust_decimal::Decimal;
use serde::Serialize;

use mealtable_core::domain::category::CategoryId;
use mealtable_core::domain::member::{Member, MemberId, RecommendationType};
use mealtable_core::domain::store::{OperationStatus, StoreId};
use mealtable_core::recommendation::geo::{format_distance, DistanceClass};
use mealtable_core::recommendation::result::{RecommendationResult, ScoreDetail};

/// One recommended store as shown to the member.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RecommendationResponse {
    pub store_id: StoreId,
    pub store_name: String,
    pub category_id: Option<CategoryId>,
    pub category_name: Option<String>,
    pub address: Option<String>,
    pub score: f64,
    pub distance_km: f64,
    pub distance_text: String,
    pub distance_class: DistanceClass,
    pub average_price: Option<u32>,
    pub review_count: u32,
    pub image_url: Option<String>,
    pub latitude: Decimal,
    pub longitude: Decimal,
    pub is_favorite: bool,
    pub is_open: bool,
    pub operation_status: String,
}

impl RecommendationResponse {
    pub fn decorate(
        result: RecommendationResult,
        category_name: Option<String>,
        is_favorite: bool,
        status: OperationStatus,
    ) -> Self {
        Self {
            store_id: result.store_id,
            store_name: result.store_name,
            category_id: result.category_id,
            category_name,
            address: result.address,
            score: result.final_score,
            distance_km: result.distance,
            distance_text: format_distance(result.distance),
            distance_class: DistanceClass::classify(result.distance),
            average_price: result.average_price,
            review_count: result.review_count,
            image_url: result.image_url,
            latitude: result.latitude,
            longitude: result.longitude,
            is_favorite,
            is_open: status.is_open,
            operation_status: status.label().to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RecommendationPage {
    pub items: Vec<RecommendationResponse>,
    pub page: u32,
    pub size: u32,
    /// Candidates scored before pagination.
    pub total: usize,
    pub has_next: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ComponentBreakdown {
    pub score: f64,
    pub weight: f64,
    pub weighted: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ScoreDetailResponse {
    pub store_id: StoreId,
    pub store_name: String,
    pub recommendation_type: RecommendationType,
    pub final_score: f64,
    pub stability: ComponentBreakdown,
    pub exploration: ComponentBreakdown,
    pub budget_efficiency: ComponentBreakdown,
    pub accessibility: ComponentBreakdown,
    pub distance_km: f64,
    pub distance_text: String,
}

impl ScoreDetailResponse {
    pub fn from_detail(store_id: StoreId, store_name: String, detail: &ScoreDetail, distance_km: f64) -> Self {
        let breakdown = |score: f64, weight: f64, weighted: f64| ComponentBreakdown { score, weight, weighted };
        Self {
            store_id,
            store_name,
            recommendation_type: detail.recommendation_type,
            final_score: detail.final_score,
            stability: breakdown(detail.raw.stability, detail.weights.stability, detail.weighted.stability),
            exploration: breakdown(
                detail.raw.exploration,
                detail.weights.exploration,
                detail.weighted.exploration,
            ),
            budget_efficiency: breakdown(
                detail.raw.budget_efficiency,
                detail.weights.budget_efficiency,
                detail.weighted.budget_efficiency,
            ),
            accessibility: breakdown(
                detail.raw.accessibility,
                detail.weights.accessibility,
                detail.weighted.accessibility,
            ),
            distance_km,
            distance_text: format_distance(distance_km),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RecommendationTypeResponse {
    pub member_id: MemberId,
    pub nickname: String,
    pub recommendation_type: RecommendationType,
}

impl From<Member> for RecommendationTypeResponse {
    fn from(member: Member) -> Self {
        Self {
            member_id: member.id,
            nickname: member.nickname,
            recommendation_type: member.recommendation_type,
        }
    }
}
