//! Inner join of the actual and forecast series, plus the derived indexes.
//!
//! One pass over the sorted merged collection also produces:
//! - the `HashMap` date index (O(1) average exact-match lookup)
//! - the month buckets used by menu-driven front-ends
//!
//! so nothing is recomputed per request.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;

use crate::domain::{Forecast, MergedRecord, MonthBucket, MonthKey, Observation};

/// Everything the merge pass produces.
#[derive(Debug, Clone)]
pub struct MergeOutput {
    /// Merged records, ascending by date.
    pub records: Vec<MergedRecord>,
    /// Date -> position in `records`.
    pub index: HashMap<NaiveDate, usize>,
    /// Distinct year-months, ascending, each with its dates ascending.
    pub months: Vec<MonthBucket>,
}

/// Inner-join the two sources on calendar date.
///
/// A date present in only one source is silently excluded. Zero overlap
/// yields empty outputs, which is valid.
pub fn merge_sources(observations: &[Observation], forecasts: &[Forecast]) -> MergeOutput {
    let forecast_by_date: HashMap<NaiveDate, &Forecast> =
        forecasts.iter().map(|f| (f.date, f)).collect();

    let mut records: Vec<MergedRecord> = observations
        .iter()
        .filter_map(|obs| {
            forecast_by_date.get(&obs.date).map(|f| MergedRecord {
                date: obs.date,
                actual_price: obs.actual_price,
                predicted_price: f.predicted_price,
                recommended_weeks: f.recommended_weeks,
            })
        })
        .collect();
    records.sort_by_key(|r| r.date);

    let mut index = HashMap::with_capacity(records.len());
    let mut buckets: BTreeMap<MonthKey, Vec<NaiveDate>> = BTreeMap::new();
    for (pos, record) in records.iter().enumerate() {
        index.insert(record.date, pos);
        // Records are already sorted, so each bucket's dates stay ascending.
        buckets
            .entry(MonthKey::from_date(record.date))
            .or_default()
            .push(record.date);
    }

    let months = buckets
        .into_iter()
        .map(|(month, dates)| MonthBucket { month, dates })
        .collect();

    MergeOutput {
        records,
        index,
        months,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn obs(date: NaiveDate, price: f64) -> Observation {
        Observation {
            date,
            actual_price: price,
        }
    }

    fn fc(date: NaiveDate, price: f64, weeks: u32) -> Forecast {
        Forecast {
            date,
            predicted_price: price,
            recommended_weeks: weeks,
        }
    }

    #[test]
    fn inner_join_keeps_only_shared_dates() {
        let out = merge_sources(
            &[obs(d(2024, 1, 1), 100.0), obs(d(2024, 1, 2), 110.0)],
            &[fc(d(2024, 1, 1), 105.0, 2), fc(d(2024, 1, 3), 120.0, 4)],
        );

        assert_eq!(out.records.len(), 1);
        let r = out.records[0];
        assert_eq!(r.date, d(2024, 1, 1));
        assert_eq!(r.actual_price, 100.0);
        assert_eq!(r.predicted_price, 105.0);
        assert_eq!(out.index.get(&d(2024, 1, 2)), None);
        assert_eq!(out.index.get(&d(2024, 1, 3)), None);
    }

    #[test]
    fn records_come_out_ascending_regardless_of_input_order() {
        let out = merge_sources(
            &[
                obs(d(2024, 3, 4), 3.0),
                obs(d(2024, 1, 1), 1.0),
                obs(d(2024, 2, 5), 2.0),
            ],
            &[
                fc(d(2024, 1, 1), 1.5, 1),
                fc(d(2024, 2, 5), 2.5, 1),
                fc(d(2024, 3, 4), 3.5, 1),
            ],
        );

        let dates: Vec<_> = out.records.iter().map(|r| r.date).collect();
        assert_eq!(dates, vec![d(2024, 1, 1), d(2024, 2, 5), d(2024, 3, 4)]);

        // Index positions agree with the sorted order.
        for (pos, r) in out.records.iter().enumerate() {
            assert_eq!(out.index[&r.date], pos);
        }
    }

    #[test]
    fn empty_overlap_yields_empty_outputs() {
        let out = merge_sources(&[obs(d(2024, 1, 1), 1.0)], &[fc(d(2024, 1, 2), 2.0, 1)]);
        assert!(out.records.is_empty());
        assert!(out.index.is_empty());
        assert!(out.months.is_empty());
    }

    #[test]
    fn month_buckets_partition_the_merged_date_set() {
        let dates = [
            d(2024, 1, 8),
            d(2024, 1, 15),
            d(2024, 2, 5),
            d(2024, 3, 4),
            d(2024, 3, 11),
        ];
        let observations: Vec<_> = dates.iter().map(|&dt| obs(dt, 100.0)).collect();
        let forecasts: Vec<_> = dates.iter().map(|&dt| fc(dt, 101.0, 1)).collect();

        let out = merge_sources(&observations, &forecasts);
        assert_eq!(out.months.len(), 3);

        // Ascending months, ascending dates within each.
        let keys: Vec<_> = out.months.iter().map(|b| b.month).collect();
        let mut sorted_keys = keys.clone();
        sorted_keys.sort();
        assert_eq!(keys, sorted_keys);
        for bucket in &out.months {
            let mut sorted = bucket.dates.clone();
            sorted.sort();
            assert_eq!(bucket.dates, sorted);
        }

        // Union of buckets equals the merged date set, no date twice.
        let mut seen = HashSet::new();
        for bucket in &out.months {
            for &date in &bucket.dates {
                assert!(seen.insert(date), "{date} appears in two buckets");
                assert_eq!(MonthKey::from_date(date), bucket.month);
            }
        }
        let merged: HashSet<_> = out.records.iter().map(|r| r.date).collect();
        assert_eq!(seen, merged);
    }
}
