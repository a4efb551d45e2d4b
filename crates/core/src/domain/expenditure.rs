use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::category::CategoryId;
use crate::domain::store::StoreId;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenditureRecord {
    pub category_id: CategoryId,
    #[serde(default)]
    pub store_id: Option<StoreId>,
    /// Amount in KRW.
    pub amount: u32,
    pub expended_at: NaiveDate,
}

/// Expenditures keyed by calendar date, at most one record per date.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DailyExpenditures {
    pub by_date: BTreeMap<NaiveDate, ExpenditureRecord>,
    /// Records dropped because an earlier record already claimed their date.
    pub collisions: usize,
}

impl DailyExpenditures {
    /// Keeps the first record seen for each date.
    pub fn index<I>(records: I) -> Self
    where
        I: IntoIterator<Item = ExpenditureRecord>,
    {
        let mut indexed = Self::default();
        for record in records {
            if indexed.by_date.contains_key(&record.expended_at) {
                indexed.collisions += 1;
                continue;
            }
            indexed.by_date.insert(record.expended_at, record);
        }
        indexed
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::{DailyExpenditures, ExpenditureRecord};
    use crate::domain::category::CategoryId;

    fn record(day: u32, amount: u32) -> ExpenditureRecord {
        ExpenditureRecord {
            category_id: CategoryId(1),
            store_id: None,
            amount,
            expended_at: NaiveDate::from_ymd_opt(2026, 10, day).expect("valid date"),
        }
    }

    #[test]
    fn same_day_records_keep_the_first_and_count_collisions() {
        let indexed = DailyExpenditures::index(vec![record(3, 8_000), record(3, 12_000), record(4, 9_000)]);

        assert_eq!(indexed.by_date.len(), 2);
        assert_eq!(indexed.collisions, 1);
        let kept = indexed
            .by_date
            .get(&NaiveDate::from_ymd_opt(2026, 10, 3).expect("valid date"))
            .expect("record for the 3rd");
        assert_eq!(kept.amount, 8_000);
    }
}
