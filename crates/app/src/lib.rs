//! Request handling around the recommendation engine: validation, candidate
//! lookup, sorting, pagination and presentation.

pub mod business_hours;
pub mod clock;
pub mod request;
pub mod response;
pub mod service;

pub use business_hours::BusinessHours;
pub use clock::{Clock, FixedClock, SystemClock};
pub use request::{RecommendationRequest, SortBy, StoreTypeFilter};
pub use response::{
    ComponentBreakdown, RecommendationPage, RecommendationResponse, RecommendationTypeResponse,
    ScoreDetailResponse,
};
pub use service::{sort_results, RecommendationApplicationService, RecommendationRepositories};
