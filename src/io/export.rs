//! Export the merged comparison to CSV and JSON.
//!
//! The CSV is meant to be easy to consume in spreadsheets or downstream
//! scripts; the JSON (`domain::ComparisonFile`) is the portable
//! representation, carrying the metrics snapshot alongside the records.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::domain::ComparisonFile;
use crate::engine::Engine;
use crate::error::AppError;

/// Write the merged comparison rows to a CSV file.
pub fn write_results_csv(path: &Path, engine: &Engine) -> Result<(), AppError> {
    let mut file = File::create(path).map_err(|e| {
        AppError::usage(format!(
            "Failed to create export CSV '{}': {e}",
            path.display()
        ))
    })?;

    writeln!(
        file,
        "date,actual_price,predicted_price,error,abs_pct_error,recommended_weeks"
    )
    .map_err(|e| AppError::usage(format!("Failed to write export CSV header: {e}")))?;

    for r in engine.records() {
        writeln!(
            file,
            "{},{:.4},{:.4},{:.4},{},{}",
            r.date,
            r.actual_price,
            r.predicted_price,
            r.error(),
            r.pct_error().map(|v| format!("{v:.4}")).unwrap_or_default(),
            r.recommended_weeks,
        )
        .map_err(|e| AppError::usage(format!("Failed to write export CSV row: {e}")))?;
    }

    Ok(())
}

/// Write the comparison JSON file.
pub fn write_comparison_json(path: &Path, engine: &Engine) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::usage(format!(
            "Failed to create comparison JSON '{}': {e}",
            path.display()
        ))
    })?;

    let comparison = ComparisonFile {
        tool: "fva".to_string(),
        first_date: engine.first_date(),
        last_date: engine.last_date(),
        metrics: engine.metrics().copied(),
        records: engine.records().to_vec(),
    };

    serde_json::to_writer_pretty(file, &comparison)
        .map_err(|e| AppError::usage(format!("Failed to write comparison JSON: {e}")))?;

    Ok(())
}
