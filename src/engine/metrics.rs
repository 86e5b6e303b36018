//! Forecast accuracy metrics over the merged collection.
//!
//! Pure computation over immutable input; the engine calls this once at
//! build time and caches the snapshot.

use crate::domain::{MergedRecord, MetricsSnapshot};

/// Compute MAE / RMSE / MAPE over the merged records.
///
/// Returns `None` for an empty collection: metrics are undefined there and
/// must never surface as zeros or NaN.
///
/// Zero-actual policy: a record with `actual_price == 0` is excluded from
/// the MAPE mean (numerator and denominator) so division by zero cannot
/// leak into the result. MAE and RMSE still include the record. If the
/// exclusion leaves nothing to average, `mape` is `None`.
pub fn compute_metrics(records: &[MergedRecord]) -> Option<MetricsSnapshot> {
    if records.is_empty() {
        return None;
    }

    let mut abs_sum = 0.0;
    let mut sq_sum = 0.0;
    let mut pct_sum = 0.0;
    let mut n_mape = 0usize;

    for r in records {
        let err = r.actual_price - r.predicted_price;
        abs_sum += err.abs();
        sq_sum += err * err;
        if r.actual_price != 0.0 {
            pct_sum += err.abs() / r.actual_price.abs();
            n_mape += 1;
        }
    }

    let n = records.len();
    let mape = if n_mape > 0 {
        Some(pct_sum / n_mape as f64 * 100.0)
    } else {
        None
    };

    Some(MetricsSnapshot {
        mae: abs_sum / n as f64,
        rmse: (sq_sum / n as f64).sqrt(),
        mape,
        n,
        n_mape,
    })
}
