//! Great-circle distance helpers.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Mean Earth radius in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    pub fn from_decimal(latitude: Decimal, longitude: Decimal) -> Self {
        Self {
            latitude: latitude.to_f64().unwrap_or_default(),
            longitude: longitude.to_f64().unwrap_or_default(),
        }
    }

    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }

    pub fn distance_km(&self, other: &Coordinate) -> f64 {
        haversine_km(*self, *other)
    }
}

/// Haversine distance in kilometres.
///
/// Deltas are taken as absolute values so the result is bit-for-bit symmetric,
/// and the intermediate term is clamped so rounding never yields NaN.
pub fn haversine_km(from: Coordinate, to: Coordinate) -> f64 {
    let delta_lat = (to.latitude - from.latitude).abs().to_radians();
    let delta_lon = (to.longitude - from.longitude).abs().to_radians();

    let sin_lat = (delta_lat / 2.0).sin();
    let sin_lon = (delta_lon / 2.0).sin();
    let cos_product = from.latitude.to_radians().cos() * to.latitude.to_radians().cos();

    let a = (sin_lat * sin_lat + cos_product * sin_lon * sin_lon).clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Human readable distance: metres below one kilometre, otherwise kilometres.
pub fn format_distance(distance_km: f64) -> String {
    if !distance_km.is_finite() {
        return "unknown".to_string();
    }
    if distance_km < 1.0 {
        format!("{}m", (distance_km * 1000.0).round() as i64)
    } else {
        format!("{distance_km:.2}km")
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceClass {
    VeryNear,
    Near,
    Moderate,
    Far,
    VeryFar,
}

impl DistanceClass {
    pub fn classify(distance_km: f64) -> Self {
        if distance_km <= 0.5 {
            Self::VeryNear
        } else if distance_km <= 1.0 {
            Self::Near
        } else if distance_km <= 3.0 {
            Self::Moderate
        } else if distance_km <= 5.0 {
            Self::Far
        } else {
            Self::VeryFar
        }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{format_distance, haversine_km, Coordinate, DistanceClass};

    const SEOUL_CITY_HALL: Coordinate = Coordinate { latitude: 37.5665, longitude: 126.9780 };
    const GANGNAM_STATION: Coordinate = Coordinate { latitude: 37.4979, longitude: 127.0276 };

    #[test]
    fn distance_to_self_is_zero() {
        assert_eq!(haversine_km(SEOUL_CITY_HALL, SEOUL_CITY_HALL), 0.0);
    }

    #[test]
    fn distance_is_symmetric() {
        assert_eq!(
            haversine_km(SEOUL_CITY_HALL, GANGNAM_STATION),
            haversine_km(GANGNAM_STATION, SEOUL_CITY_HALL)
        );
    }

    #[test]
    fn city_hall_to_gangnam_is_about_nine_km() {
        let distance = haversine_km(SEOUL_CITY_HALL, GANGNAM_STATION);
        assert!((8.5..9.2).contains(&distance), "unexpected distance {distance}");
    }

    #[test]
    fn antipodal_points_stay_finite() {
        let distance = haversine_km(Coordinate::new(0.0, 0.0), Coordinate::new(0.0, 180.0));
        assert!(distance.is_finite());
        assert!((distance - std::f64::consts::PI * 6371.0).abs() < 1e-3);
    }

    #[test]
    fn decimal_coordinates_convert() {
        let coordinate = Coordinate::from_decimal(Decimal::new(375665, 4), Decimal::new(1269780, 4));
        assert!((coordinate.latitude - 37.5665).abs() < 1e-12);
        assert!(coordinate.is_valid());
        assert!(!Coordinate::new(91.0, 0.0).is_valid());
    }

    #[test]
    fn formats_and_classifies_distances() {
        assert_eq!(format_distance(0.35), "350m");
        assert_eq!(format_distance(1.254), "1.25km");
        assert_eq!(DistanceClass::classify(0.5), DistanceClass::VeryNear);
        assert_eq!(DistanceClass::classify(2.0), DistanceClass::Moderate);
        assert_eq!(DistanceClass::classify(12.0), DistanceClass::VeryFar);
    }
}
