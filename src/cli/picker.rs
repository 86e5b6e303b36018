//! Interactive month -> date menu.
//!
//! This is intentionally kept separate from clap parsing:
//! - clap handles structured flags/subcommands
//! - the picker provides the "run `fva menu` and browse" UX
//!
//! The two-level navigation (month list, then the month's dates) mirrors
//! what menu-driven chat front-ends need, and it runs entirely off the
//! engine's precomputed month buckets. Which month is currently open is
//! state owned here, never by the engine.

use std::io::{self, Write};

use chrono::NaiveDate;

use crate::domain::{LookupOutcome, MonthBucket, RunConfig};
use crate::engine::Engine;
use crate::error::AppError;
use crate::{plot, report};

/// Dates are shown the way the chat menu historically rendered them.
const MENU_DATE_FORMAT: &str = "%d-%m-%Y";

enum Flow {
    Back,
    Quit,
}

/// Run the menu loop until the user quits (or stdin closes).
pub fn run_menu(engine: &Engine, config: &RunConfig) -> Result<(), AppError> {
    if engine.is_empty() {
        println!("No overlapping dates between the sources; nothing to browse.");
        return Ok(());
    }

    loop {
        let months = engine.months();
        println!("Available months:");
        for (idx, bucket) in months.iter().enumerate() {
            println!("{:>3}) {}  ({} dates)", idx + 1, bucket.month, bucket.dates.len());
        }

        print!(
            "Select a month by number (1-{}), type a date, or q to quit: ",
            months.len()
        );
        let Some(input) = read_input()? else {
            return Ok(());
        };

        if input.eq_ignore_ascii_case("q") {
            return Ok(());
        }

        if let Ok(choice) = input.parse::<usize>() {
            if (1..=months.len()).contains(&choice) {
                match browse_month(engine, config, &months[choice - 1])? {
                    Flow::Back => continue,
                    Flow::Quit => return Ok(()),
                }
            }
            println!(
                "Invalid choice: {choice}. Enter a number between 1 and {}.",
                months.len()
            );
            continue;
        }

        // Not a number: treat it as a typed date.
        lookup_and_print(engine, config, &input);
    }
}

fn browse_month(
    engine: &Engine,
    config: &RunConfig,
    bucket: &MonthBucket,
) -> Result<Flow, AppError> {
    loop {
        println!("Dates in {}:", bucket.month);
        for (idx, date) in bucket.dates.iter().enumerate() {
            println!("{:>3}) {}", idx + 1, date.format(MENU_DATE_FORMAT));
        }

        print!(
            "Select a date by number (1-{}), b to go back, q to quit: ",
            bucket.dates.len()
        );
        let Some(input) = read_input()? else {
            return Ok(Flow::Quit);
        };

        if input.eq_ignore_ascii_case("q") {
            return Ok(Flow::Quit);
        }
        if input.eq_ignore_ascii_case("b") {
            return Ok(Flow::Back);
        }

        if let Ok(choice) = input.parse::<usize>() {
            if (1..=bucket.dates.len()).contains(&choice) {
                print_record(engine, config, bucket.dates[choice - 1]);
                continue;
            }
            println!(
                "Invalid choice: {choice}. Enter a number between 1 and {}.",
                bucket.dates.len()
            );
            continue;
        }

        lookup_and_print(engine, config, &input);
    }
}

/// Resolve typed text through the query service and render each outcome
/// distinctly.
fn lookup_and_print(engine: &Engine, config: &RunConfig, input: &str) {
    match engine.lookup(input) {
        LookupOutcome::Found(record) => print_record(engine, config, record.date),
        LookupOutcome::NotFound { date } => println!("{}", report::format_not_found(date)),
        LookupOutcome::InvalidInput { input } => {
            println!("{}", report::format_invalid_input(&input));
        }
    }
}

fn print_record(engine: &Engine, config: &RunConfig, date: NaiveDate) {
    let Some(record) = engine.lookup_date(date) else {
        println!("{}", report::format_not_found(date));
        return;
    };

    println!();
    print!("{}", report::format_record(record));
    println!();
    print!("{}", report::format_metrics(engine.metrics()));
    if config.plot {
        println!();
        print!(
            "{}",
            plot::render_series_plot(
                engine.records(),
                Some(date),
                config.plot_width,
                config.plot_height,
            )
        );
    }
    println!();
}

/// Read one trimmed line from stdin. `None` means EOF (quit cleanly).
fn read_input() -> Result<Option<String>, AppError> {
    io::stdout()
        .flush()
        .map_err(|e| AppError::usage(format!("Failed to write prompt: {e}")))?;

    let mut input = String::new();
    let bytes = io::stdin()
        .read_line(&mut input)
        .map_err(|e| AppError::usage(format!("Failed to read input: {e}")))?;

    if bytes == 0 {
        return Ok(None);
    }
    Ok(Some(input.trim().to_string()))
}
