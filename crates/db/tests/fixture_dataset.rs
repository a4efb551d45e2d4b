use std::collections::BTreeSet;
use std::fs;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tempfile::TempDir;

use mealtable_core::domain::category::CategoryId;
use mealtable_core::domain::member::{MemberId, RecommendationType};
use mealtable_core::domain::store::{StoreId, StoreType};
use mealtable_db::{
    FavoriteRepository, FixtureDataset, HistoryWindow, InMemoryRepositories, RecommendationDataRepository,
    RepositoryError, StoreSearch,
};

type FixtureTestResult<T = ()> = Result<T, String>;

macro_rules! require {
    ($cond:expr) => {
        if !$cond {
            return Err(format!("assertion failed: `{}`", stringify!($cond)));
        }
    };
    ($cond:expr, $($arg:tt)*) => {
        if !$cond {
            return Err(format!($($arg)*));
        }
    };
}

macro_rules! require_eq {
    ($left:expr, $right:expr) => {
        if $left != $right {
            return Err(format!(
                "assertion failed: `left == right` (`{:?}` != `{:?}`)",
                $left,
                $right
            ));
        }
    };
}

fn october(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, day).unwrap_or_default()
}

async fn seeded() -> FixtureTestResult<InMemoryRepositories> {
    let dataset = FixtureDataset::sample().map_err(|err| format!("sample must parse: {err}"))?;
    let repositories = InMemoryRepositories::default();
    dataset.seed(&repositories).await.map_err(|err| format!("seed failed: {err}"))?;
    Ok(repositories)
}

#[test]
fn sample_dataset_is_internally_consistent() -> FixtureTestResult {
    let dataset = FixtureDataset::sample().map_err(|err| err.to_string())?;
    let category_ids: BTreeSet<CategoryId> =
        dataset.categories.iter().map(|category| category.id).collect();
    let store_ids: BTreeSet<StoreId> = dataset.stores.iter().map(|store| store.id).collect();

    require_eq!(store_ids.len(), dataset.stores.len());
    for store in &dataset.stores {
        require!(!store.category_ids.is_empty(), "store {} has no category", store.id);
        for category_id in &store.category_ids {
            require!(category_ids.contains(category_id), "store {} uses unknown category", store.id);
        }
    }
    for member in &dataset.members {
        for favorite in &member.favorites {
            require!(store_ids.contains(favorite), "member {} favors unknown store", member.id);
        }
        for expenditure in &member.expenditures {
            require!(category_ids.contains(&expenditure.category_id));
        }
    }
    require!(dataset.stores.iter().any(|store| store.store_type == StoreType::CampusRestaurant));
    Ok(())
}

#[tokio::test]
async fn seeded_profile_reflects_the_fixture() -> FixtureTestResult {
    let repositories = seeded().await?;
    let profile = repositories
        .load_user_profile(MemberId(1), HistoryWindow::new(october(19), 180))
        .await
        .map_err(|err| err.to_string())?;

    require_eq!(profile.recommendation_type, RecommendationType::Saver);
    require_eq!(profile.current_latitude, Decimal::new(375665, 4));
    require_eq!(profile.recent_expenditures.len(), 6);
    require_eq!(profile.disliked_category_ids(), vec![CategoryId(4)]);
    require_eq!(
        profile.last_visit_date(StoreId(101)),
        NaiveDate::from_ymd_opt(2026, 10, 16)
    );

    let favorites = repositories
        .find_store_ids_by_member(MemberId(1), &[StoreId(101), StoreId(102), StoreId(104)])
        .await
        .map_err(|err| err.to_string())?;
    require_eq!(favorites, vec![StoreId(101), StoreId(104)]);
    Ok(())
}

#[tokio::test]
async fn short_history_window_trims_the_fixture_profile() -> FixtureTestResult {
    let repositories = seeded().await?;
    let profile = repositories
        .load_user_profile(MemberId(1), HistoryWindow::new(october(19), 30))
        .await
        .map_err(|err| err.to_string())?;

    require_eq!(profile.recent_expenditures.len(), 4);
    let earliest = october(19) - chrono::Duration::days(30);
    require!(profile.recent_expenditures.keys().all(|date| *date >= earliest));
    require_eq!(profile.last_visit_date(StoreId(106)), NaiveDate::from_ymd_opt(2026, 9, 2));
    Ok(())
}

#[tokio::test]
async fn campus_filter_keeps_only_campus_restaurants() -> FixtureTestResult {
    let repositories = seeded().await?;
    let search = StoreSearch {
        latitude: Decimal::new(375665, 4),
        longitude: Decimal::new(1269780, 4),
        radius_km: 3.0,
        excluded_category_ids: BTreeSet::new(),
        open_only: false,
        store_type: Some(StoreType::CampusRestaurant),
        at: NaiveDate::from_ymd_opt(2026, 10, 19)
            .and_then(|date| date.and_hms_opt(12, 0, 0))
            .ok_or("valid timestamp")?,
    };

    let stores = repositories.find_stores_in_radius(&search).await.map_err(|err| err.to_string())?;
    require_eq!(stores.iter().map(|store| store.id).collect::<Vec<_>>(), vec![StoreId(106)]);
    Ok(())
}

#[test]
fn fixture_file_errors_are_reported() -> FixtureTestResult {
    let dir = TempDir::new().map_err(|err| err.to_string())?;
    let path = dir.path().join("broken.json");
    fs::write(&path, "{ \"stores\": [ { \"id\": 1 } ] }").map_err(|err| err.to_string())?;

    require!(matches!(FixtureDataset::load(&path), Err(RepositoryError::Decode(_))));
    require!(matches!(
        FixtureDataset::load(&dir.path().join("absent.json")),
        Err(RepositoryError::Fixture(_))
    ));
    Ok(())
}
