//! The shared initialization phase used by every front-end.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! load (or sample) -> merge/index -> metrics -> month buckets
//!
//! The phase either fully succeeds, yielding an immutable `Engine`, or
//! aborts startup; a partially built index is never exposed to queries.

use crate::data::{generate_sample, load_sources};
use crate::domain::RunConfig;
use crate::engine::Engine;
use crate::error::AppError;

/// What the sources looked like, for the startup summary.
#[derive(Debug, Clone)]
pub struct LoadSummary {
    pub actuals_label: String,
    pub forecast_label: String,
    pub n_actuals: usize,
    pub n_forecasts: usize,
    /// Rows dropped across both sources because of empty value cells.
    pub rows_skipped: usize,
}

/// Output of a successful initialization.
#[derive(Debug, Clone)]
pub struct Bootstrap {
    pub engine: Engine,
    pub summary: LoadSummary,
}

/// Run the initialization phase once, before any query is served.
pub fn bootstrap(config: &RunConfig) -> Result<Bootstrap, AppError> {
    let (observations, forecasts, summary) = if config.sample {
        let (observations, forecasts) = generate_sample(config)?;
        let label = format!(
            "synthetic sample (seed {}, {} weeks)",
            config.sample_seed, config.sample_weeks
        );
        let summary = LoadSummary {
            actuals_label: label.clone(),
            forecast_label: label,
            n_actuals: observations.len(),
            n_forecasts: forecasts.len(),
            rows_skipped: 0,
        };
        (observations, forecasts, summary)
    } else {
        let loaded = load_sources(config)?;
        let summary = LoadSummary {
            actuals_label: config.actuals.to_string(),
            forecast_label: config.forecast.to_string(),
            n_actuals: loaded.observations.len(),
            n_forecasts: loaded.forecasts.len(),
            rows_skipped: loaded.actuals_report.rows_skipped + loaded.forecast_report.rows_skipped,
        };
        (loaded.observations, loaded.forecasts, summary)
    };

    let engine = Engine::build(&observations, &forecasts);

    Ok(Bootstrap { engine, summary })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SourceArg;

    #[test]
    fn sample_bootstrap_builds_a_full_engine() {
        let config = RunConfig {
            actuals: SourceArg::parse("unused.csv"),
            forecast: SourceArg::parse("unused.csv"),
            sample: true,
            sample_seed: 42,
            sample_weeks: 12,
            sample_base_price: 50_000.0,
            plot: false,
            plot_width: 100,
            plot_height: 25,
        };

        let boot = bootstrap(&config).unwrap();
        // Inner join drops the forecast-only horizon tail.
        assert_eq!(boot.engine.len(), 12);
        assert_eq!(boot.summary.n_actuals, 12);
        assert!(boot.summary.n_forecasts > 12);
        assert!(boot.engine.metrics().is_some());
        assert!(!boot.engine.months().is_empty());
    }

    #[test]
    fn missing_file_aborts_startup() {
        let config = RunConfig {
            actuals: SourceArg::parse("/definitely/not/here.csv"),
            forecast: SourceArg::parse("/definitely/not/here.csv"),
            sample: false,
            sample_seed: 42,
            sample_weeks: 12,
            sample_base_price: 50_000.0,
            plot: false,
            plot_width: 100,
            plot_height: 25,
        };
        let err = bootstrap(&config).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
