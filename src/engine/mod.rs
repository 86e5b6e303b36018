//! The date-indexed comparison engine.
//!
//! An `Engine` is built exactly once per process, in the initialization
//! phase (`app::pipeline`), from the loader's already-typed records. After
//! `build` returns, every field is read-only: lookups, metrics and month
//! listings never mutate state, so the engine can be shared freely across
//! front-end sessions.

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::domain::{
    Forecast, LookupOutcome, MergedRecord, MetricsSnapshot, MonthBucket, Observation,
};

pub mod merge;
pub mod metrics;
pub mod query;

/// Immutable comparison state: merged series, date index, cached metrics
/// and month buckets.
#[derive(Debug, Clone)]
pub struct Engine {
    records: Vec<MergedRecord>,
    index: HashMap<NaiveDate, usize>,
    metrics: Option<MetricsSnapshot>,
    months: Vec<MonthBucket>,
}

impl Engine {
    /// Join the two sources and derive everything the front-ends will ask
    /// for. Zero overlapping dates is a valid (empty) engine, not an error.
    pub fn build(observations: &[Observation], forecasts: &[Forecast]) -> Self {
        let merge::MergeOutput {
            records,
            index,
            months,
        } = merge::merge_sources(observations, forecasts);
        let metrics = metrics::compute_metrics(&records);

        Self {
            records,
            index,
            metrics,
            months,
        }
    }

    /// Merged comparison rows, ascending by date.
    pub fn records(&self) -> &[MergedRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.records.first().map(|r| r.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.records.last().map(|r| r.date)
    }

    /// Point-in-time query from user-supplied text.
    ///
    /// The text is normalized to a calendar date first (any supported
    /// format, time-of-day discarded), then resolved against the index.
    pub fn lookup(&self, input: &str) -> LookupOutcome {
        match query::parse_date_input(input) {
            None => LookupOutcome::InvalidInput {
                input: input.to_string(),
            },
            Some(date) => match self.lookup_date(date) {
                Some(record) => LookupOutcome::Found(*record),
                None => LookupOutcome::NotFound { date },
            },
        }
    }

    /// Exact-match lookup by canonical date. O(1) average case.
    pub fn lookup_date(&self, date: NaiveDate) -> Option<&MergedRecord> {
        self.index.get(&date).map(|&i| &self.records[i])
    }

    /// Cached accuracy metrics; `None` when the merged collection is empty.
    pub fn metrics(&self) -> Option<&MetricsSnapshot> {
        self.metrics.as_ref()
    }

    /// Month buckets, ascending. Computed once at build time.
    pub fn months(&self) -> &[MonthBucket] {
        &self.months
    }

    /// Restartable iteration over the month buckets (each call starts over).
    pub fn available_months(&self) -> impl Iterator<Item = &MonthBucket> {
        self.months.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn obs(y: i32, m: u32, day: u32, price: f64) -> Observation {
        Observation {
            date: d(y, m, day),
            actual_price: price,
        }
    }

    fn fc(y: i32, m: u32, day: u32, price: f64, weeks: u32) -> Forecast {
        Forecast {
            date: d(y, m, day),
            predicted_price: price,
            recommended_weeks: weeks,
        }
    }

    #[test]
    fn lookup_distinguishes_found_not_found_invalid() {
        // Observations {2024-01-01: 100, 2024-01-02: 110},
        // Forecasts {2024-01-01: 105, 2024-01-03: 120}.
        let engine = Engine::build(
            &[obs(2024, 1, 1, 100.0), obs(2024, 1, 2, 110.0)],
            &[fc(2024, 1, 1, 105.0, 2), fc(2024, 1, 3, 120.0, 4)],
        );

        assert_eq!(engine.len(), 1);
        match engine.lookup("2024-01-01") {
            LookupOutcome::Found(r) => {
                assert_eq!(r.actual_price, 100.0);
                assert_eq!(r.predicted_price, 105.0);
                assert_eq!(r.recommended_weeks, 2);
            }
            other => panic!("expected Found, got {other:?}"),
        }

        // Present in only one source.
        assert_eq!(
            engine.lookup("2024-01-02"),
            LookupOutcome::NotFound { date: d(2024, 1, 2) }
        );
        assert_eq!(
            engine.lookup("2024-01-03"),
            LookupOutcome::NotFound { date: d(2024, 1, 3) }
        );

        assert_eq!(
            engine.lookup("not-a-date"),
            LookupOutcome::InvalidInput {
                input: "not-a-date".to_string()
            }
        );
    }

    #[test]
    fn bot_style_date_format_hits_the_same_record() {
        let engine = Engine::build(&[obs(2024, 1, 1, 100.0)], &[fc(2024, 1, 1, 105.0, 2)]);
        assert_eq!(engine.lookup("01-01-2024"), engine.lookup("2024-01-01"));
    }

    #[test]
    fn repeated_calls_are_bit_identical() {
        let engine = Engine::build(
            &[obs(2024, 1, 1, 100.0), obs(2024, 2, 5, 200.0)],
            &[fc(2024, 1, 1, 105.0, 2), fc(2024, 2, 5, 190.0, 3)],
        );

        assert_eq!(engine.lookup("2024-02-05"), engine.lookup("2024-02-05"));
        assert_eq!(engine.metrics().copied(), engine.metrics().copied());
        let a: Vec<_> = engine.available_months().collect();
        let b: Vec<_> = engine.available_months().collect();
        assert_eq!(a, b);
    }

    #[test]
    fn empty_overlap_is_valid() {
        let engine = Engine::build(&[obs(2024, 1, 1, 100.0)], &[fc(2024, 1, 2, 105.0, 1)]);
        assert!(engine.is_empty());
        assert!(engine.metrics().is_none());
        assert_eq!(engine.months().len(), 0);
        assert_eq!(
            engine.lookup("2024-01-01"),
            LookupOutcome::NotFound { date: d(2024, 1, 1) }
        );
    }
}
