//! CSV source acquisition and normalization.
//!
//! This module is responsible for turning the two tabular sources into
//! clean, well-typed record collections the engine can join. Design goals:
//!
//! - **Strict schema** for required columns (clear errors + exit code 2)
//! - **Line-numbered failures** for bad cells (exit code 4)
//! - **Canonical dates**: timestamped cells are truncated to the calendar
//!   day before they ever reach the engine
//!
//! A source argument with an http(s) scheme is fetched with a blocking
//! client; anything else is read from the filesystem. Rows with an empty
//! value cell are skipped and counted, mirroring how sparse exports mark
//! missing observations.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use chrono::NaiveDate;
use csv::StringRecord;
use reqwest::blocking::Client;

use crate::domain::{Forecast, Observation, RunConfig, SourceArg};
use crate::engine::query::parse_date_input;
use crate::error::AppError;

const DATE_ALIASES: &[&str] = &["dt", "date"];
const ACTUAL_ALIASES: &[&str] = &["price", "actual_price", "actual"];
const PREDICTED_ALIASES: &[&str] = &["predicted_price", "forecast_price", "predicted"];
const WEEKS_ALIASES: &[&str] = &["n", "weeks", "n_weeks", "recommended_weeks"];

/// Per-source ingest counters, for the startup summary.
#[derive(Debug, Clone, Copy, Default)]
pub struct SourceReport {
    pub rows_read: usize,
    pub rows_used: usize,
    /// Rows dropped because a value cell was empty.
    pub rows_skipped: usize,
}

/// Loader output: both record collections, already typed and deduplicated.
#[derive(Debug, Clone)]
pub struct LoadedData {
    pub observations: Vec<Observation>,
    pub forecasts: Vec<Forecast>,
    pub actuals_report: SourceReport,
    pub forecast_report: SourceReport,
}

/// Acquire and parse both sources. Any failure here aborts startup; the
/// engine is never built from partial data.
pub fn load_sources(config: &RunConfig) -> Result<LoadedData, AppError> {
    let actuals_text = fetch_text(&config.actuals, "actuals")?;
    let forecast_text = fetch_text(&config.forecast, "forecast")?;

    let (observations, actuals_report) = parse_actuals(&actuals_text)
        .map_err(|e| prefixed(e, &format!("actuals source '{}'", config.actuals)))?;
    let (forecasts, forecast_report) = parse_forecasts(&forecast_text)
        .map_err(|e| prefixed(e, &format!("forecast source '{}'", config.forecast)))?;

    Ok(LoadedData {
        observations,
        forecasts,
        actuals_report,
        forecast_report,
    })
}

fn prefixed(err: AppError, context: &str) -> AppError {
    AppError::new(err.exit_code(), format!("{context}: {err}"))
}

fn fetch_text(source: &SourceArg, label: &str) -> Result<String, AppError> {
    match source {
        SourceArg::Url(url) => {
            let client = Client::new();
            let resp = client
                .get(url)
                .send()
                .map_err(|e| AppError::data(format!("Fetching {label} from {url} failed: {e}")))?;
            if !resp.status().is_success() {
                return Err(AppError::data(format!(
                    "Fetching {label} from {url} failed with status {}.",
                    resp.status()
                )));
            }
            resp.text()
                .map_err(|e| AppError::data(format!("Reading {label} response body failed: {e}")))
        }
        SourceArg::Path(path) => std::fs::read_to_string(path).map_err(|e| {
            AppError::usage(format!(
                "Failed to open {label} CSV '{}': {e}",
                path.display()
            ))
        }),
    }
}

/// Parse the actuals source: date column + actual price column.
pub fn parse_actuals(text: &str) -> Result<(Vec<Observation>, SourceReport), AppError> {
    let mut report = SourceReport::default();
    let mut out = Vec::new();
    let mut seen: HashMap<NaiveDate, usize> = HashMap::new();

    for_each_row(text, &[DATE_ALIASES, ACTUAL_ALIASES], |line, cells| {
        report.rows_read += 1;
        let [date_cell, price_cell] = cells;
        if price_cell.is_empty() {
            report.rows_skipped += 1;
            return Ok(());
        }

        let date = parse_date_cell(date_cell, line)?;
        let actual_price = parse_price_cell(price_cell, "price", line)?;
        check_unique(&mut seen, date, line)?;

        out.push(Observation { date, actual_price });
        report.rows_used += 1;
        Ok(())
    })?;

    Ok((out, report))
}

/// Parse the forecast source: date + predicted price + recommended weeks.
pub fn parse_forecasts(text: &str) -> Result<(Vec<Forecast>, SourceReport), AppError> {
    let mut report = SourceReport::default();
    let mut out = Vec::new();
    let mut seen: HashMap<NaiveDate, usize> = HashMap::new();

    for_each_row(
        text,
        &[DATE_ALIASES, PREDICTED_ALIASES, WEEKS_ALIASES],
        |line, cells| {
            report.rows_read += 1;
            let [date_cell, price_cell, weeks_cell] = cells;
            if price_cell.is_empty() {
                report.rows_skipped += 1;
                return Ok(());
            }

            let date = parse_date_cell(date_cell, line)?;
            let predicted_price = parse_price_cell(price_cell, "predicted_price", line)?;
            let recommended_weeks = parse_weeks_cell(weeks_cell, line)?;
            check_unique(&mut seen, date, line)?;

            out.push(Forecast {
                date,
                predicted_price,
                recommended_weeks,
            });
            report.rows_used += 1;
            Ok(())
        },
    )?;

    Ok((out, report))
}

/// Drive the CSV reader: resolve each alias group to a column once, then
/// hand every row's resolved cells to `handle` with a 1-based line number.
fn for_each_row<const N: usize>(
    text: &str,
    columns: &[&[&str]; N],
    mut handle: impl FnMut(usize, [&str; N]) -> Result<(), AppError>,
) -> Result<(), AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| AppError::data(format!("Failed to read CSV headers: {e}")))?
        .clone();
    let header_map = build_header_map(&headers);

    let mut positions = [0usize; N];
    for (slot, aliases) in positions.iter_mut().zip(columns.iter()) {
        *slot = resolve_column(&header_map, aliases)?;
    }

    for (idx, result) in reader.records().enumerate() {
        // Header is line 1; records start on line 2.
        let line = idx + 2;
        let record = match result {
            Ok(r) => r,
            Err(e) => return Err(AppError::data(format!("CSV parse error at line {line}: {e}"))),
        };

        let mut cells = [""; N];
        for (slot, &pos) in cells.iter_mut().zip(positions.iter()) {
            *slot = record.get(pos).unwrap_or("");
        }
        handle(line, cells)?;
    }

    Ok(())
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(i, name)| (name.trim().to_lowercase(), i))
        .collect()
}

fn resolve_column(header_map: &HashMap<String, usize>, aliases: &[&str]) -> Result<usize, AppError> {
    for alias in aliases {
        if let Some(&pos) = header_map.get(*alias) {
            return Ok(pos);
        }
    }
    Err(AppError::usage(format!(
        "Missing required column (expected one of: {}).",
        aliases.join(", ")
    )))
}

fn parse_date_cell(raw: &str, line: usize) -> Result<NaiveDate, AppError> {
    parse_date_input(raw)
        .ok_or_else(|| AppError::data(format!("Invalid date '{raw}' at line {line}.")))
}

fn parse_price_cell(raw: &str, field: &str, line: usize) -> Result<f64, AppError> {
    let value = raw
        .parse::<f64>()
        .map_err(|e| AppError::data(format!("Invalid {field} '{raw}' at line {line}: {e}")))?;
    if !value.is_finite() {
        return Err(AppError::data(format!(
            "Non-finite {field} '{raw}' at line {line}."
        )));
    }
    Ok(value)
}

/// Weeks cells may come from float-typed exports ("3.0"); accept those but
/// reject genuine fractions and negatives.
fn parse_weeks_cell(raw: &str, line: usize) -> Result<u32, AppError> {
    let bad = || AppError::data(format!("Invalid week count '{raw}' at line {line}."));

    if let Ok(v) = raw.parse::<u32>() {
        return Ok(v);
    }
    let v = raw.parse::<f64>().map_err(|_| bad())?;
    if !v.is_finite() || v < 0.0 || v.fract() != 0.0 || v > u32::MAX as f64 {
        return Err(bad());
    }
    Ok(v as u32)
}

fn check_unique(
    seen: &mut HashMap<NaiveDate, usize>,
    date: NaiveDate,
    line: usize,
) -> Result<(), AppError> {
    match seen.entry(date) {
        Entry::Vacant(e) => {
            e.insert(line);
            Ok(())
        }
        Entry::Occupied(e) => Err(AppError::data(format!(
            "Duplicate date {date} at line {line} (first seen at line {}).",
            e.get()
        ))),
    }
}
