//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments (with env fallbacks for the two sources)
//! - runs the shared initialization pipeline
//! - dispatches to the chosen front-end adapter

use clap::Parser;

use crate::cli::{Command, DataArgs, ExportArgs, ShowArgs};
use crate::domain::{LookupOutcome, RunConfig, SourceArg};
use crate::error::AppError;
use crate::{plot, report};

pub mod pipeline;

/// Entry point for the `fva` binary.
pub fn run() -> Result<(), AppError> {
    // We want bare `fva` and `fva --sample` to behave like `fva tui ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of
    // the argv list before parsing. This preserves a clean clap structure
    // while keeping the zero-argument UX.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Show(args) => handle_show(args),
        Command::Menu(args) => handle_menu(args),
        Command::Metrics(args) => handle_metrics(args),
        Command::Months(args) => handle_months(args),
        Command::Plot(args) => handle_plot(args),
        Command::Export(args) => handle_export(args),
        Command::Tui(args) => handle_tui(args),
    }
}

fn handle_show(args: ShowArgs) -> Result<(), AppError> {
    let config = run_config_from_args(&args.data);
    let boot = pipeline::bootstrap(&config)?;

    match boot.engine.lookup(&args.date) {
        LookupOutcome::Found(record) => {
            print!("{}", report::format_record(&record));
            println!();
            print!("{}", report::format_metrics(boot.engine.metrics()));
            if config.plot {
                println!();
                print!(
                    "{}",
                    plot::render_series_plot(
                        boot.engine.records(),
                        Some(record.date),
                        config.plot_width,
                        config.plot_height,
                    )
                );
            }
            Ok(())
        }
        // A valid but uncovered date is a normal outcome, not a failure.
        LookupOutcome::NotFound { date } => {
            println!("{}", report::format_not_found(date));
            Ok(())
        }
        LookupOutcome::InvalidInput { input } => {
            Err(AppError::usage(report::format_invalid_input(&input)))
        }
    }
}

fn handle_menu(args: DataArgs) -> Result<(), AppError> {
    let config = run_config_from_args(&args);
    let boot = pipeline::bootstrap(&config)?;

    print!("{}", report::format_run_summary(&boot.summary, &boot.engine));
    println!();
    crate::cli::picker::run_menu(&boot.engine, &config)
}

fn handle_metrics(args: DataArgs) -> Result<(), AppError> {
    let config = run_config_from_args(&args);
    let boot = pipeline::bootstrap(&config)?;
    print!("{}", report::format_metrics(boot.engine.metrics()));
    Ok(())
}

fn handle_months(args: DataArgs) -> Result<(), AppError> {
    let config = run_config_from_args(&args);
    let boot = pipeline::bootstrap(&config)?;
    print!("{}", report::format_months(boot.engine.months()));
    Ok(())
}

fn handle_plot(args: DataArgs) -> Result<(), AppError> {
    let config = run_config_from_args(&args);
    let boot = pipeline::bootstrap(&config)?;
    print!(
        "{}",
        plot::render_series_plot(
            boot.engine.records(),
            None,
            config.plot_width,
            config.plot_height,
        )
    );
    Ok(())
}

fn handle_export(args: ExportArgs) -> Result<(), AppError> {
    if args.out.is_none() && args.json.is_none() {
        return Err(AppError::usage(
            "Nothing to export: pass --out <csv> and/or --json <json>.",
        ));
    }

    let config = run_config_from_args(&args.data);
    let boot = pipeline::bootstrap(&config)?;

    if let Some(path) = &args.out {
        crate::io::write_results_csv(path, &boot.engine)?;
        println!("Wrote {} row(s) to {}", boot.engine.len(), path.display());
    }
    if let Some(path) = &args.json {
        crate::io::write_comparison_json(path, &boot.engine)?;
        println!("Wrote comparison JSON to {}", path.display());
    }

    Ok(())
}

fn handle_tui(args: DataArgs) -> Result<(), AppError> {
    let config = run_config_from_args(&args);
    crate::tui::run(config)
}

/// Resolve flags + env into the pipeline configuration.
///
/// Source precedence: explicit flag, then `FVA_ACTUALS` / `FVA_FORECAST`
/// from the environment (a `.env` file works too), then the conventional
/// filenames.
pub fn run_config_from_args(args: &DataArgs) -> RunConfig {
    dotenvy::dotenv().ok();

    let actuals = resolve_source(args.actuals.as_deref(), "FVA_ACTUALS", "actuals.csv");
    let forecast = resolve_source(args.forecast.as_deref(), "FVA_FORECAST", "forecast.csv");

    RunConfig {
        actuals,
        forecast,
        sample: args.sample,
        sample_seed: args.seed,
        sample_weeks: args.sample_weeks,
        sample_base_price: args.base_price,
        plot: args.plot && !args.no_plot,
        plot_width: args.width,
        plot_height: args.height,
    }
}

fn resolve_source(flag: Option<&str>, env_key: &str, fallback: &str) -> SourceArg {
    match flag {
        Some(raw) => SourceArg::parse(raw),
        None => match std::env::var(env_key) {
            Ok(raw) if !raw.trim().is_empty() => SourceArg::parse(raw.trim()),
            _ => SourceArg::parse(fallback),
        },
    }
}

/// Rewrite argv so `fva` defaults to `fva tui`.
///
/// Rules:
/// - `fva`                     -> `fva tui`
/// - `fva --sample ...`        -> `fva tui --sample ...`
/// - `fva --help/--version/-h` -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version =
        matches!(arg1.as_str(), "-h" | "--help" | "-V" | "--version" | "help");
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(
        arg1.as_str(),
        "show" | "menu" | "metrics" | "months" | "plot" | "export" | "tui"
    );
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_defaults_to_tui() {
        assert_eq!(rewrite_args(argv(&["fva"])), argv(&["fva", "tui"]));
        assert_eq!(
            rewrite_args(argv(&["fva", "--sample"])),
            argv(&["fva", "tui", "--sample"])
        );
    }

    #[test]
    fn subcommands_and_help_pass_through() {
        assert_eq!(
            rewrite_args(argv(&["fva", "metrics"])),
            argv(&["fva", "metrics"])
        );
        assert_eq!(
            rewrite_args(argv(&["fva", "--help"])),
            argv(&["fva", "--help"])
        );
    }
}
