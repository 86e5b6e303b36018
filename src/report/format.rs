//! Terminal formatting for summaries, lookups, metrics and month listings.

use chrono::NaiveDate;

use crate::app::pipeline::LoadSummary;
use crate::domain::{MergedRecord, MetricsSnapshot, MonthBucket};
use crate::engine::Engine;
use crate::engine::query::supported_formats_hint;

/// Format the startup summary (sources + merge stats + metrics block).
pub fn format_run_summary(summary: &LoadSummary, engine: &Engine) -> String {
    let mut out = String::new();

    out.push_str("=== fva - Forecast vs Actuals ===\n");
    out.push_str(&format!(
        "Actuals : {} ({} rows)\n",
        summary.actuals_label, summary.n_actuals
    ));
    out.push_str(&format!(
        "Forecast: {} ({} rows)\n",
        summary.forecast_label, summary.n_forecasts
    ));
    if summary.rows_skipped > 0 {
        out.push_str(&format!(
            "Skipped : {} row(s) with empty values\n",
            summary.rows_skipped
        ));
    }

    match (engine.first_date(), engine.last_date()) {
        (Some(first), Some(last)) => {
            out.push_str(&format!(
                "Merged  : {} date(s) | {first} .. {last}\n",
                engine.len()
            ));
        }
        _ => {
            out.push_str("Merged  : 0 dates (no overlap between the sources)\n");
        }
    }

    out.push('\n');
    out.push_str(&format_metrics(engine.metrics()));
    out
}

/// Format the metrics block. An absent snapshot renders a placeholder,
/// never zeros.
pub fn format_metrics(metrics: Option<&MetricsSnapshot>) -> String {
    let mut out = String::new();
    out.push_str("Forecast accuracy:\n");

    let Some(m) = metrics else {
        out.push_str("  (no overlapping dates - metrics unavailable)\n");
        return out;
    };

    out.push_str(&format!("  MAE : {:>12.2}\n", m.mae));
    out.push_str(&format!("  RMSE: {:>12.2}\n", m.rmse));
    match m.mape {
        Some(mape) => out.push_str(&format!("  MAPE: {:>11.2}%\n", mape)),
        None => out.push_str("  MAPE:          n/a (all actuals are zero)\n"),
    }
    out.push_str(&format!("  over {} date(s)", m.n));
    if m.n_mape < m.n {
        out.push_str(&format!(" ({} in MAPE)", m.n_mape));
    }
    out.push('\n');
    out
}

/// Format a single comparison row for detail views.
pub fn format_record(record: &MergedRecord) -> String {
    let mut out = String::new();
    out.push_str(&format!("Date            : {}\n", record.date));
    out.push_str(&format!("Actual price    : {:>12.2}\n", record.actual_price));
    out.push_str(&format!(
        "Forecast price  : {:>12.2}\n",
        record.predicted_price
    ));
    out.push_str(&format!("Error           : {:>12.2}", record.error()));
    match record.pct_error() {
        Some(pct) => out.push_str(&format!(" ({pct:.2}%)\n")),
        None => out.push('\n'),
    }
    out.push_str(&format!(
        "Recommended buy : {} week(s) of supply\n",
        record.recommended_weeks
    ));
    out
}

/// The "no data" message: the date parsed fine, it just isn't covered.
pub fn format_not_found(date: NaiveDate) -> String {
    format!("No data for {date}: the date is valid but not present in both sources.")
}

/// The "bad format" message: the user has to fix the input, not the date.
pub fn format_invalid_input(input: &str) -> String {
    format!(
        "Unrecognized date '{input}'. Expected {}.",
        supported_formats_hint()
    )
}

/// Format the month listing (bucket key + count + span).
pub fn format_months(months: &[MonthBucket]) -> String {
    if months.is_empty() {
        return "No months available (no overlapping dates).\n".to_string();
    }

    let mut out = String::new();
    out.push_str(&format!("{:<8} {:>6}  {}\n", "month", "dates", "span"));
    for bucket in months {
        let (Some(first), Some(last)) = (bucket.dates.first(), bucket.dates.last()) else {
            continue;
        };
        out.push_str(&format!(
            "{:<8} {:>6}  {first} .. {last}\n",
            bucket.month.to_string(),
            bucket.dates.len(),
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Forecast, Observation};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn metrics_block_renders_placeholder_without_data() {
        let txt = format_metrics(None);
        assert!(txt.contains("metrics unavailable"), "{txt}");
        assert!(!txt.contains("0.00"), "{txt}");
    }

    #[test]
    fn metrics_block_renders_numbers() {
        let engine = Engine::build(
            &[
                Observation {
                    date: d(2024, 1, 1),
                    actual_price: 100.0,
                },
                Observation {
                    date: d(2024, 1, 8),
                    actual_price: 200.0,
                },
            ],
            &[
                Forecast {
                    date: d(2024, 1, 1),
                    predicted_price: 105.0,
                    recommended_weeks: 2,
                },
                Forecast {
                    date: d(2024, 1, 8),
                    predicted_price: 190.0,
                    recommended_weeks: 3,
                },
            ],
        );
        let txt = format_metrics(engine.metrics());
        assert!(txt.contains("MAE"), "{txt}");
        assert!(txt.contains("7.50"), "{txt}");
        assert!(txt.contains("5.00%"), "{txt}");
    }

    #[test]
    fn record_detail_contains_every_field() {
        let record = MergedRecord {
            date: d(2024, 1, 1),
            actual_price: 100.0,
            predicted_price: 105.0,
            recommended_weeks: 2,
        };
        let txt = format_record(&record);
        assert!(txt.contains("2024-01-01"));
        assert!(txt.contains("100.00"));
        assert!(txt.contains("105.00"));
        assert!(txt.contains("-5.00"));
        assert!(txt.contains("2 week(s)"));
    }

    #[test]
    fn not_found_and_invalid_messages_differ() {
        let not_found = format_not_found(d(2024, 1, 2));
        let invalid = format_invalid_input("garbage");
        assert!(not_found.contains("No data"));
        assert!(invalid.contains("Unrecognized date"));
        assert_ne!(not_found, invalid);
    }
}
