use std::fmt;

use chrono::NaiveDateTime;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use mealtable_core::config::RecommendationConfig;
use mealtable_core::domain::store::StoreType;
use mealtable_core::errors::{ApplicationError, DomainError};
use mealtable_core::recommendation::geo::Coordinate;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SortBy {
    #[default]
    Score,
    Distance,
    Review,
    PriceLow,
    PriceHigh,
}

impl SortBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Score => "SCORE",
            Self::Distance => "DISTANCE",
            Self::Review => "REVIEW",
            Self::PriceLow => "PRICE_LOW",
            Self::PriceHigh => "PRICE_HIGH",
        }
    }
}

impl fmt::Display for SortBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SortBy {
    type Err = ApplicationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().replace('-', "_").as_str() {
            "SCORE" => Ok(Self::Score),
            "DISTANCE" => Ok(Self::Distance),
            "REVIEW" => Ok(Self::Review),
            "PRICE_LOW" => Ok(Self::PriceLow),
            "PRICE_HIGH" => Ok(Self::PriceHigh),
            other => Err(ApplicationError::InvalidRequest(format!(
                "unsupported sort `{other}` (expected SCORE|DISTANCE|REVIEW|PRICE_LOW|PRICE_HIGH)"
            ))),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StoreTypeFilter {
    #[default]
    All,
    Restaurant,
    CampusRestaurant,
}

impl StoreTypeFilter {
    pub fn store_type(&self) -> Option<StoreType> {
        match self {
            Self::All => None,
            Self::Restaurant => Some(StoreType::Restaurant),
            Self::CampusRestaurant => Some(StoreType::CampusRestaurant),
        }
    }
}

impl std::str::FromStr for StoreTypeFilter {
    type Err = ApplicationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().replace('-', "_").as_str() {
            "ALL" => Ok(Self::All),
            "RESTAURANT" => Ok(Self::Restaurant),
            "CAMPUS_RESTAURANT" => Ok(Self::CampusRestaurant),
            other => Err(ApplicationError::InvalidRequest(format!(
                "unsupported store type `{other}` (expected ALL|RESTAURANT|CAMPUS_RESTAURANT)"
            ))),
        }
    }
}

/// Query for one page of recommendations.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RecommendationRequest {
    /// Overrides the member's registered location when given together with `longitude`.
    pub latitude: Option<Decimal>,
    pub longitude: Option<Decimal>,
    pub radius_km: f64,
    pub sort_by: SortBy,
    pub include_disliked: bool,
    pub open_now: bool,
    pub store_type: StoreTypeFilter,
    pub page: u32,
    pub size: u32,
    /// Evaluation moment; the service clock when absent.
    pub at: Option<NaiveDateTime>,
}

impl Default for RecommendationRequest {
    fn default() -> Self {
        Self {
            latitude: None,
            longitude: None,
            radius_km: 0.5,
            sort_by: SortBy::Score,
            include_disliked: false,
            open_now: false,
            store_type: StoreTypeFilter::All,
            page: 0,
            size: 20,
            at: None,
        }
    }
}

impl RecommendationRequest {
    pub fn with_defaults(config: &RecommendationConfig) -> Self {
        Self { radius_km: config.default_radius_km, size: config.default_page_size, ..Self::default() }
    }

    /// Both coordinates, or neither.
    pub fn coordinate_override(&self) -> Option<(Decimal, Decimal)> {
        self.latitude.zip(self.longitude)
    }

    pub fn offset(&self) -> usize {
        self.page as usize * self.size as usize
    }

    pub fn validate(&self, limits: &RecommendationConfig) -> Result<(), ApplicationError> {
        validate_coordinate(self.latitude, self.longitude)?;

        let radius_ok = self.radius_km.is_finite()
            && self.radius_km >= limits.min_radius_km
            && self.radius_km <= limits.max_radius_km;
        if !radius_ok {
            return Err(ApplicationError::InvalidRequest(format!(
                "radius must be between {} and {} km",
                limits.min_radius_km, limits.max_radius_km
            )));
        }

        if self.size == 0 || self.size > limits.max_page_size {
            return Err(ApplicationError::InvalidRequest(format!(
                "size must be between 1 and {}",
                limits.max_page_size
            )));
        }

        Ok(())
    }
}

/// Range-checks a request coordinate. A missing half is checked as zero.
pub(crate) fn validate_coordinate(
    latitude: Option<Decimal>,
    longitude: Option<Decimal>,
) -> Result<(), ApplicationError> {
    if latitude.is_none() && longitude.is_none() {
        return Ok(());
    }

    let degrees = |value: Option<Decimal>| value.map_or(Some(0.0), |value| value.to_f64());
    let coordinate = Coordinate::new(
        degrees(latitude).unwrap_or(f64::NAN),
        degrees(longitude).unwrap_or(f64::NAN),
    );
    if coordinate.is_valid() {
        return Ok(());
    }

    let shown = |value: Option<Decimal>| value.map_or_else(|| "-".to_string(), |value| value.to_string());
    Err(DomainError::InvalidCoordinate { latitude: shown(latitude), longitude: shown(longitude) }.into())
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use mealtable_core::config::AppConfig;
    use mealtable_core::errors::{ApplicationError, DomainError};

    use super::{RecommendationRequest, SortBy, StoreTypeFilter};

    fn limits() -> mealtable_core::config::RecommendationConfig {
        AppConfig::default().recommendation
    }

    #[test]
    fn defaults_are_valid() {
        let request = RecommendationRequest::default();
        assert_eq!(request.radius_km, 0.5);
        assert_eq!(request.size, 20);
        assert_eq!(request.sort_by, SortBy::Score);
        assert!(request.validate(&limits()).is_ok());
    }

    #[test]
    fn radius_outside_limits_is_rejected() {
        for radius_km in [0.05, 10.5, f64::NAN] {
            let request = RecommendationRequest { radius_km, ..RecommendationRequest::default() };
            assert!(matches!(request.validate(&limits()), Err(ApplicationError::InvalidRequest(_))));
        }
        let edge = RecommendationRequest { radius_km: 10.0, ..RecommendationRequest::default() };
        assert!(edge.validate(&limits()).is_ok());
    }

    #[test]
    fn page_size_bounds() {
        for size in [0, 101] {
            let request = RecommendationRequest { size, ..RecommendationRequest::default() };
            assert!(request.validate(&limits()).is_err());
        }
    }

    #[test]
    fn coordinates_must_be_on_the_globe() {
        let request = RecommendationRequest {
            latitude: Some(Decimal::new(91, 0)),
            longitude: Some(Decimal::new(127, 0)),
            ..RecommendationRequest::default()
        };
        assert_eq!(
            request.validate(&limits()),
            Err(ApplicationError::Domain(DomainError::InvalidCoordinate {
                latitude: "91".to_string(),
                longitude: "127".to_string(),
            }))
        );

        let half = RecommendationRequest {
            longitude: Some(Decimal::new(-181, 0)),
            ..RecommendationRequest::default()
        };
        assert!(matches!(
            half.validate(&limits()),
            Err(ApplicationError::Domain(DomainError::InvalidCoordinate { ref latitude, .. }))
                if latitude == "-"
        ));

        let busan = RecommendationRequest {
            latitude: Some(Decimal::new(351796, 4)),
            longitude: Some(Decimal::new(1290756, 4)),
            ..RecommendationRequest::default()
        };
        assert!(busan.validate(&limits()).is_ok());
    }

    #[test]
    fn override_needs_both_coordinates() {
        let half = RecommendationRequest {
            latitude: Some(Decimal::new(375, 1)),
            ..RecommendationRequest::default()
        };
        assert_eq!(half.coordinate_override(), None);
    }

    #[test]
    fn sort_and_store_type_parse_leniently() {
        assert_eq!("price-low".parse::<SortBy>().ok(), Some(SortBy::PriceLow));
        assert_eq!("campus_restaurant".parse::<StoreTypeFilter>().ok(), Some(StoreTypeFilter::CampusRestaurant));
        assert!("cheapest".parse::<SortBy>().is_err());
    }
}
