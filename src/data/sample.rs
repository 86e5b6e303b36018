//! Synthetic weekly series generation for demo runs.
//!
//! `--sample` produces a seeded actual/forecast pair so the tool can be
//! tried without any input files: log-normal random-walk actuals, a noisy
//! forecast around them, and a procurement-weeks recommendation derived
//! from the forecast trend. The forecast horizon extends a few weeks past
//! the actuals, so the inner join visibly drops the tail.

use chrono::{Duration, NaiveDate};
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::{Forecast, Observation, RunConfig};
use crate::error::AppError;

/// Monday; keeps the synthetic series on the weekly grid real exports use.
const SAMPLE_START: (i32, u32, u32) = (2024, 1, 1);

/// Weekly log-return volatility of the actual series.
const WALK_SIGMA: f64 = 0.02;

/// Log-noise of the forecast around the actual path.
const FORECAST_SIGMA: f64 = 0.03;

/// Forecast rows emitted beyond the last actual date.
const HORIZON_EXTRA_WEEKS: usize = 4;

/// Generate the synthetic pair. Deterministic for a given seed.
pub fn generate_sample(config: &RunConfig) -> Result<(Vec<Observation>, Vec<Forecast>), AppError> {
    if config.sample_weeks == 0 {
        return Err(AppError::usage("Sample week count must be > 0."));
    }
    if !(config.sample_base_price.is_finite() && config.sample_base_price > 0.0) {
        return Err(AppError::usage("Sample base price must be positive."));
    }

    let mut rng = StdRng::seed_from_u64(config.sample_seed);
    let walk_noise = Normal::new(0.0, WALK_SIGMA)
        .map_err(|e| AppError::data(format!("Noise distribution error: {e}")))?;
    let forecast_noise = Normal::new(0.0, FORECAST_SIGMA)
        .map_err(|e| AppError::data(format!("Noise distribution error: {e}")))?;

    let (y, m, day) = SAMPLE_START;
    let start = NaiveDate::from_ymd_opt(y, m, day)
        .ok_or_else(|| AppError::data("Invalid sample start date."))?;

    let total_weeks = config.sample_weeks + HORIZON_EXTRA_WEEKS;

    // One continuous walk covers the whole horizon; actuals only exist for
    // the observed prefix.
    let mut actual_path = Vec::with_capacity(total_weeks);
    let mut price = config.sample_base_price;
    for _ in 0..total_weeks {
        actual_path.push(price);
        price *= walk_noise.sample(&mut rng).exp();
    }

    let predicted: Vec<f64> = actual_path
        .iter()
        .map(|&p| p * forecast_noise.sample(&mut rng).exp())
        .collect();

    let mut observations = Vec::with_capacity(config.sample_weeks);
    let mut forecasts = Vec::with_capacity(total_weeks);
    for week in 0..total_weeks {
        let date = start + Duration::weeks(week as i64);
        if week < config.sample_weeks {
            observations.push(Observation {
                date,
                actual_price: actual_path[week],
            });
        }
        forecasts.push(Forecast {
            date,
            predicted_price: predicted[week],
            recommended_weeks: recommend_weeks(&predicted, week),
        });
    }

    Ok((observations, forecasts))
}

/// Derive a buy-horizon from the forecast trend: the more the price is
/// expected to rise over the next month, the more weeks to lock in now.
fn recommend_weeks(predicted: &[f64], week: usize) -> u32 {
    let current = predicted[week];
    let ahead = &predicted[week + 1..(week + 5).min(predicted.len())];
    if ahead.is_empty() || current <= 0.0 {
        return 1;
    }

    let mean_ahead = ahead.iter().sum::<f64>() / ahead.len() as f64;
    let drift = (mean_ahead - current) / current;

    match drift {
        d if d > 0.02 => 6,
        d if d > 0.01 => 4,
        d if d > 0.0 => 2,
        _ => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SourceArg;

    fn config(seed: u64, weeks: usize) -> RunConfig {
        RunConfig {
            actuals: SourceArg::parse("actuals.csv"),
            forecast: SourceArg::parse("forecast.csv"),
            sample: true,
            sample_seed: seed,
            sample_weeks: weeks,
            sample_base_price: 50_000.0,
            plot: false,
            plot_width: 100,
            plot_height: 25,
        }
    }

    #[test]
    fn same_seed_same_series() {
        let (obs_a, fc_a) = generate_sample(&config(42, 20)).unwrap();
        let (obs_b, fc_b) = generate_sample(&config(42, 20)).unwrap();
        assert_eq!(obs_a, obs_b);
        assert_eq!(fc_a, fc_b);
    }

    #[test]
    fn different_seed_different_series() {
        let (obs_a, _) = generate_sample(&config(1, 20)).unwrap();
        let (obs_b, _) = generate_sample(&config(2, 20)).unwrap();
        assert_ne!(obs_a, obs_b);
    }

    #[test]
    fn forecast_horizon_extends_past_the_actuals() {
        let (obs, fcs) = generate_sample(&config(42, 10)).unwrap();
        assert_eq!(obs.len(), 10);
        assert_eq!(fcs.len(), 10 + HORIZON_EXTRA_WEEKS);
        assert!(fcs.last().unwrap().date > obs.last().unwrap().date);
    }

    #[test]
    fn series_values_are_sane() {
        let (obs, fcs) = generate_sample(&config(7, 30)).unwrap();
        for o in &obs {
            assert!(o.actual_price.is_finite() && o.actual_price > 0.0);
        }
        for f in &fcs {
            assert!(f.predicted_price.is_finite() && f.predicted_price > 0.0);
            assert!((1..=6).contains(&f.recommended_weeks));
        }
        // Weekly grid.
        for pair in obs.windows(2) {
            assert_eq!(pair[1].date - pair[0].date, Duration::weeks(1));
        }
    }

    #[test]
    fn zero_weeks_rejected() {
        assert!(generate_sample(&config(42, 0)).is_err());
    }
}
