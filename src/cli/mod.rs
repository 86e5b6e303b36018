//! Command-line parsing for the forecast-vs-actuals review tool.
//!
//! The goal of this module is to keep **argument parsing** and **command
//! dispatch** separate from the engine code.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub mod picker;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "fva", version, about = "Forecast-vs-Actuals price review")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Look up one date and print its comparison, the accuracy metrics and
    /// (by default) the series plot.
    Show(ShowArgs),
    /// Interactive month -> date menu in the terminal.
    Menu(DataArgs),
    /// Print the accuracy metrics only (useful for scripting).
    Metrics(DataArgs),
    /// List the months covered by the merged series.
    Months(DataArgs),
    /// Render the full-series ASCII plot.
    Plot(DataArgs),
    /// Export the merged comparison to CSV and/or JSON.
    Export(ExportArgs),
    /// Launch the interactive TUI.
    ///
    /// This uses the same underlying engine as every other subcommand, but
    /// renders the series and per-date details in a terminal UI.
    Tui(DataArgs),
}

/// Common options for acquiring the two sources and rendering output.
#[derive(Debug, Parser, Clone)]
pub struct DataArgs {
    /// Actuals CSV: a path or an http(s) URL.
    /// Falls back to $FVA_ACTUALS, then `actuals.csv`.
    #[arg(short = 'a', long)]
    pub actuals: Option<String>,

    /// Forecast CSV: a path or an http(s) URL.
    /// Falls back to $FVA_FORECAST, then `forecast.csv`.
    #[arg(short = 'f', long)]
    pub forecast: Option<String>,

    /// Use a seeded synthetic dataset instead of reading any source.
    #[arg(long)]
    pub sample: bool,

    /// Random seed for --sample.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Number of observed weeks generated by --sample.
    #[arg(long, default_value_t = 52)]
    pub sample_weeks: usize,

    /// Starting price level for --sample.
    #[arg(long, default_value_t = 50_000.0)]
    pub base_price: f64,

    /// Render an ASCII plot where applicable (enabled by default).
    #[arg(long, default_value_t = true)]
    pub plot: bool,

    /// Disable the terminal plot.
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,
}

/// Options for the one-shot lookup.
#[derive(Debug, Parser)]
pub struct ShowArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Date to look up (YYYY-MM-DD or DD-MM-YYYY).
    #[arg(short = 'd', long)]
    pub date: String,
}

/// Options for exporting the merged comparison.
#[derive(Debug, Parser)]
pub struct ExportArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Write the merged rows to this CSV file.
    #[arg(long, value_name = "CSV")]
    pub out: Option<PathBuf>,

    /// Write the comparison (records + metrics) to this JSON file.
    #[arg(long, value_name = "JSON")]
    pub json: Option<PathBuf>,
}
