//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - loaded source records (`Observation`, `Forecast`)
//! - the merged comparison row (`MergedRecord`)
//! - derived results (`MetricsSnapshot`, `MonthBucket`)
//! - query outcomes (`LookupOutcome`)
//! - run configuration (`RunConfig`, `SourceArg`)

pub mod types;

pub use types::*;
