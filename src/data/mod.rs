//! Dataset acquisition.
//!
//! - `source`: fetch + parse the two CSV sources (actuals, forecasts)
//! - `sample`: seeded synthetic series pair for demo runs

pub mod sample;
pub mod source;

pub use sample::generate_sample;
pub use source::{LoadedData, SourceReport, load_sources};
