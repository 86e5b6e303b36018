//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory by the engine and the front-ends
//! - exported to JSON/CSV
//! - reloaded later for side-by-side comparisons

use std::path::PathBuf;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// A single observed value from the actuals source.
///
/// Dates are unique within the source; the loader rejects duplicates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub date: NaiveDate,
    pub actual_price: f64,
}

/// A single row from the forecast source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub date: NaiveDate,
    pub predicted_price: f64,
    /// How many weeks of supply the model recommends buying at this date's
    /// forecast price.
    pub recommended_weeks: u32,
}

/// One comparison row: a date present in *both* sources.
///
/// Produced by the inner join in `engine::merge`; the merged collection's
/// date set is always a subset of each input's date set and contains no
/// duplicates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MergedRecord {
    pub date: NaiveDate,
    pub actual_price: f64,
    pub predicted_price: f64,
    pub recommended_weeks: u32,
}

impl MergedRecord {
    /// Signed forecast error (`actual - predicted`).
    pub fn error(&self) -> f64 {
        self.actual_price - self.predicted_price
    }

    /// Absolute error as a percentage of the actual price, if defined.
    pub fn pct_error(&self) -> Option<f64> {
        if self.actual_price == 0.0 {
            None
        } else {
            Some(self.error().abs() / self.actual_price.abs() * 100.0)
        }
    }
}

/// Aggregate forecast accuracy over the merged collection.
///
/// Computed once at engine build time. `mape` is `None` when every merged
/// record has a zero actual price (such records are excluded from the MAPE
/// mean entirely; MAE/RMSE still include them).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// Mean absolute error.
    pub mae: f64,
    /// Root mean squared error. Always `>= mae`.
    pub rmse: f64,
    /// Mean absolute percentage error, in percent.
    pub mape: Option<f64>,
    /// Number of merged records the snapshot covers.
    pub n: usize,
    /// Number of records included in the MAPE mean (non-zero actuals).
    pub n_mape: usize,
}

/// A year-month bucket key. Ordering is year-major, so sorted keys are in
/// calendar order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MonthKey {
    pub year: i32,
    pub month: u32,
}

impl MonthKey {
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }
}

impl std::fmt::Display for MonthKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// All merged dates falling in one calendar month, ascending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthBucket {
    pub month: MonthKey,
    pub dates: Vec<NaiveDate>,
}

/// Outcome of a point-in-time query.
///
/// `NotFound` and `InvalidInput` are normal results, not errors: front-ends
/// must render them distinctly because they require different corrective
/// action (pick another date vs fix the format).
#[derive(Debug, Clone, PartialEq)]
pub enum LookupOutcome {
    Found(MergedRecord),
    /// The date parsed fine but is absent from the merged index.
    NotFound { date: NaiveDate },
    /// The text could not be parsed as a date in any supported format.
    InvalidInput { input: String },
}

/// Where a tabular source comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceArg {
    Url(String),
    Path(PathBuf),
}

impl SourceArg {
    /// Interpret a CLI/env value: anything with an http(s) scheme is remote,
    /// everything else is a filesystem path.
    pub fn parse(raw: &str) -> Self {
        if raw.starts_with("http://") || raw.starts_with("https://") {
            SourceArg::Url(raw.to_string())
        } else {
            SourceArg::Path(PathBuf::from(raw))
        }
    }
}

impl std::fmt::Display for SourceArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceArg::Url(url) => write!(f, "{url}"),
            SourceArg::Path(path) => write!(f, "{}", path.display()),
        }
    }
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags plus env defaults (see `app.rs`).
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub actuals: SourceArg,
    pub forecast: SourceArg,

    /// When true, skip the loader and build the engine from a seeded
    /// synthetic series pair.
    pub sample: bool,
    pub sample_seed: u64,
    pub sample_weeks: usize,
    pub sample_base_price: f64,

    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,
}

/// A saved comparison file (JSON).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonFile {
    pub tool: String,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    pub metrics: Option<MetricsSnapshot>,
    pub records: Vec<MergedRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn month_key_orders_year_major() {
        let a = MonthKey::from_date(d(2023, 12, 31));
        let b = MonthKey::from_date(d(2024, 1, 1));
        let c = MonthKey::from_date(d(2024, 2, 1));
        assert!(a < b && b < c);
        assert_eq!(b.to_string(), "2024-01");
    }

    #[test]
    fn pct_error_undefined_for_zero_actual() {
        let r = MergedRecord {
            date: d(2024, 1, 1),
            actual_price: 0.0,
            predicted_price: 105.0,
            recommended_weeks: 2,
        };
        assert_eq!(r.pct_error(), None);

        let r = MergedRecord {
            actual_price: 100.0,
            ..r
        };
        assert_eq!(r.error(), -5.0);
        assert!((r.pct_error().unwrap() - 5.0).abs() < 1e-12);
    }

    #[test]
    fn source_arg_detects_scheme() {
        assert!(matches!(SourceArg::parse("https://example.com/a.csv"), SourceArg::Url(_)));
        assert!(matches!(SourceArg::parse("data/actuals.csv"), SourceArg::Path(_)));
    }
}
