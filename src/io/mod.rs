//! Result exports.
//!
//! - merged comparison CSV (spreadsheet-friendly)
//! - comparison JSON (portable: records + metrics, reloadable elsewhere)

pub mod export;

pub use export::*;
