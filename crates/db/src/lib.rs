pub mod fixtures;
pub mod repositories;

pub use fixtures::{FixtureDataset, MemberFixture, SeedSummary};
pub use repositories::{
    CategoryRepository, FavoriteRepository, HistoryWindow, InMemoryRepositories, MemberRepository,
    RecommendationDataRepository, RepositoryError, StoreRepository, StoreSearch,
};
