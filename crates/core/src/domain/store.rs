use std::fmt;

use chrono::{Datelike, NaiveDateTime, NaiveTime, Weekday};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::category::CategoryId;
use crate::recommendation::geo::Coordinate;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StoreId(pub i64);

impl fmt::Display for StoreId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StoreType {
    Restaurant,
    CampusRestaurant,
}

/// Read-only projection of a store as handed to the scorer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Store {
    pub id: StoreId,
    pub name: String,
    /// First entry is the primary category.
    pub category_ids: Vec<CategoryId>,
    #[serde(default)]
    pub address: Option<String>,
    pub latitude: Decimal,
    pub longitude: Decimal,
    #[serde(default)]
    pub review_count: u32,
    /// Average menu price in KRW.
    #[serde(default)]
    pub average_price: Option<u32>,
    #[serde(default)]
    pub view_count: u32,
    #[serde(default)]
    pub favorite_count: u32,
    pub store_type: StoreType,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub registered_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub opening_hours: Vec<OpeningHour>,
}

impl Store {
    pub fn primary_category_id(&self) -> Option<CategoryId> {
        self.category_ids.first().copied()
    }

    pub fn location(&self) -> Coordinate {
        Coordinate::from_decimal(self.latitude, self.longitude)
    }

    /// Positive average price, if one is known.
    pub fn priced(&self) -> Option<u32> {
        self.average_price.filter(|price| *price > 0)
    }

    pub fn operation_status(&self, at: NaiveDateTime) -> OperationStatus {
        OperationStatus::evaluate(&self.opening_hours, at)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpeningHour {
    pub day_of_week: Weekday,
    #[serde(default)]
    pub open_time: Option<NaiveTime>,
    #[serde(default)]
    pub close_time: Option<NaiveTime>,
    #[serde(default)]
    pub break_start_time: Option<NaiveTime>,
    #[serde(default)]
    pub break_end_time: Option<NaiveTime>,
    #[serde(default)]
    pub holiday: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationState {
    Open,
    Closed,
    BreakTime,
    Holiday,
    HoursUnknown,
    NoInfo,
}

impl OperationState {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
            Self::BreakTime => "break",
            Self::Holiday => "holiday",
            Self::HoursUnknown => "hours unknown",
            Self::NoInfo => "no info",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationStatus {
    pub state: OperationState,
    pub is_open: bool,
}

impl OperationStatus {
    fn closed(state: OperationState) -> Self {
        Self { state, is_open: false }
    }

    pub fn label(&self) -> &'static str {
        self.state.label()
    }

    /// Evaluates the opening hours registered for the weekday of `at`.
    pub fn evaluate(hours: &[OpeningHour], at: NaiveDateTime) -> Self {
        let Some(today) = hours.iter().find(|hour| hour.day_of_week == at.weekday()) else {
            return Self::closed(OperationState::NoInfo);
        };

        if today.holiday {
            return Self::closed(OperationState::Holiday);
        }

        let (Some(open), Some(close)) = (today.open_time, today.close_time) else {
            return Self::closed(OperationState::HoursUnknown);
        };

        let now = at.time();
        if let (Some(break_start), Some(break_end)) = (today.break_start_time, today.break_end_time)
        {
            if now >= break_start && now < break_end {
                return Self::closed(OperationState::BreakTime);
            }
        }

        if now >= open && now < close {
            return Self { state: OperationState::Open, is_open: true };
        }

        Self::closed(OperationState::Closed)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Weekday};

    use super::{OpeningHour, OperationState, OperationStatus};

    fn hm(hour: u32, minute: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, minute, 0).expect("valid time")
    }

    // 2026-10-19 is a Monday.
    fn monday_at(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 19).expect("valid date").and_time(hm(hour, minute))
    }

    fn weekday_hours() -> Vec<OpeningHour> {
        vec![OpeningHour {
            day_of_week: Weekday::Mon,
            open_time: Some(hm(11, 0)),
            close_time: Some(hm(21, 0)),
            break_start_time: Some(hm(15, 0)),
            break_end_time: Some(hm(16, 30)),
            holiday: false,
        }]
    }

    #[test]
    fn open_between_open_and_close() {
        let status = OperationStatus::evaluate(&weekday_hours(), monday_at(12, 30));
        assert!(status.is_open);
        assert_eq!(status.label(), "open");
    }

    #[test]
    fn break_time_is_closed() {
        let status = OperationStatus::evaluate(&weekday_hours(), monday_at(15, 10));
        assert_eq!(status.state, OperationState::BreakTime);
        assert!(!status.is_open);
    }

    #[test]
    fn close_time_is_exclusive() {
        let status = OperationStatus::evaluate(&weekday_hours(), monday_at(21, 0));
        assert_eq!(status.state, OperationState::Closed);
    }

    #[test]
    fn holiday_and_missing_entries_are_closed() {
        let mut hours = weekday_hours();
        hours[0].holiday = true;
        assert_eq!(
            OperationStatus::evaluate(&hours, monday_at(12, 0)).state,
            OperationState::Holiday
        );

        hours[0].holiday = false;
        hours[0].close_time = None;
        assert_eq!(
            OperationStatus::evaluate(&hours, monday_at(12, 0)).state,
            OperationState::HoursUnknown
        );

        assert_eq!(OperationStatus::evaluate(&[], monday_at(12, 0)).state, OperationState::NoInfo);
    }
}
