use std::fs;
use std::path::Path;

use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::info;

use mealtable_core::domain::category::{Category, CategoryId};
use mealtable_core::domain::expenditure::ExpenditureRecord;
use mealtable_core::domain::member::{Member, MemberId, RecommendationType};
use mealtable_core::domain::store::{Store, StoreId};

use crate::repositories::{InMemoryRepositories, RepositoryError};

const SAMPLE_DATASET: &str = include_str!("../../../config/fixtures/sample_dataset.json");

/// JSON dataset of categories, stores and members used to seed the in-memory
/// repositories.
#[derive(Clone, Debug, Deserialize)]
pub struct FixtureDataset {
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub stores: Vec<Store>,
    #[serde(default)]
    pub members: Vec<MemberFixture>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct MemberFixture {
    pub id: MemberId,
    pub nickname: String,
    pub recommendation_type: RecommendationType,
    pub latitude: Decimal,
    pub longitude: Decimal,
    #[serde(default)]
    pub preferences: Vec<PreferenceFixture>,
    #[serde(default)]
    pub expenditures: Vec<ExpenditureRecord>,
    #[serde(default)]
    pub favorites: Vec<StoreId>,
}

#[derive(Clone, Copy, Debug, Deserialize)]
pub struct PreferenceFixture {
    pub category_id: CategoryId,
    pub weight: i32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub categories: usize,
    pub stores: usize,
    pub members: usize,
    pub expenditures: usize,
    pub favorites: usize,
}

impl FixtureDataset {
    /// Bundled dataset around Seoul City Hall.
    pub fn sample() -> Result<Self, RepositoryError> {
        Self::from_json(SAMPLE_DATASET)
    }

    pub fn from_json(raw: &str) -> Result<Self, RepositoryError> {
        serde_json::from_str(raw).map_err(|error| RepositoryError::Decode(error.to_string()))
    }

    pub fn load(path: &Path) -> Result<Self, RepositoryError> {
        let raw = fs::read_to_string(path).map_err(|error| {
            RepositoryError::Fixture(format!("could not read `{}`: {error}", path.display()))
        })?;
        Self::from_json(&raw)
    }

    pub async fn seed(&self, repositories: &InMemoryRepositories) -> Result<SeedSummary, RepositoryError> {
        let mut summary = SeedSummary::default();

        for category in &self.categories {
            repositories.insert_category(category.clone()).await;
            summary.categories += 1;
        }
        for store in &self.stores {
            repositories.insert_store(store.clone()).await;
            summary.stores += 1;
        }

        for fixture in &self.members {
            let member = Member {
                id: fixture.id,
                nickname: fixture.nickname.clone(),
                recommendation_type: fixture.recommendation_type,
            };
            repositories.insert_member(member, fixture.latitude, fixture.longitude).await;
            for preference in &fixture.preferences {
                repositories
                    .set_preference(fixture.id, preference.category_id, preference.weight)
                    .await?;
            }
            for expenditure in &fixture.expenditures {
                repositories.record_expenditure(fixture.id, expenditure.clone()).await?;
                summary.expenditures += 1;
            }
            for store_id in &fixture.favorites {
                repositories.add_favorite(fixture.id, *store_id).await;
                summary.favorites += 1;
            }
            summary.members += 1;
        }

        info!(
            event_name = "fixtures.seed.completed",
            categories = summary.categories,
            stores = summary.stores,
            members = summary.members,
            expenditures = summary.expenditures,
            "fixture dataset seeded"
        );
        Ok(summary)
    }
}
