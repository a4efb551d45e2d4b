pub mod config;
pub mod domain;
pub mod errors;
pub mod recommendation;

pub use config::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};
pub use domain::category::{Category, CategoryId};
pub use domain::expenditure::{DailyExpenditures, ExpenditureRecord};
pub use domain::member::{Member, MemberId, RecommendationType};
pub use domain::profile::UserProfile;
pub use domain::store::{OpeningHour, OperationState, OperationStatus, Store, StoreId, StoreType};
pub use errors::{ApplicationError, DomainError, InterfaceError};
pub use recommendation::{
    CalculationContext, ComponentScores, PersonaWeights, RecommendationDomainService,
    RecommendationResult, ScoreCalculator, ScoreComponent, ScoreDetail, ScoringParameters,
};
