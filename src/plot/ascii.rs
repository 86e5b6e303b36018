//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output
//!
//! Plot elements:
//! - actual prices: `o` markers on a `-` line
//! - forecast prices: `+` markers on a `.` line
//! - selected date: a `|` column, with `O` / `*` where it crosses the series

use chrono::NaiveDate;

use crate::domain::MergedRecord;

/// Render the merged series, optionally highlighting one date.
pub fn render_series_plot(
    records: &[MergedRecord],
    selected: Option<NaiveDate>,
    width: usize,
    height: usize,
) -> String {
    if records.is_empty() {
        return "(nothing to plot: no overlapping dates)\n".to_string();
    }

    let width = width.max(10);
    let height = height.max(5);

    let first = records[0].date;
    let last = records[records.len() - 1].date;
    let span_days = ((last - first).num_days()).max(1) as f64;

    let (y_min, y_max) = price_range(records);
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    // Lines first, markers after, so markers overlay the connecting strokes.
    let actual: Vec<(usize, usize)> = records
        .iter()
        .map(|r| {
            (
                map_x((r.date - first).num_days() as f64, span_days, width),
                map_y(r.actual_price, y_min, y_max, height),
            )
        })
        .collect();
    let forecast: Vec<(usize, usize)> = records
        .iter()
        .map(|r| {
            (
                map_x((r.date - first).num_days() as f64, span_days, width),
                map_y(r.predicted_price, y_min, y_max, height),
            )
        })
        .collect();

    draw_polyline(&mut grid, &actual, '-');
    draw_polyline(&mut grid, &forecast, '.');

    // Selected-date column (only over blank cells; the markers win).
    let selected_x = selected
        .filter(|date| (first..=last).contains(date))
        .map(|date| map_x((date - first).num_days() as f64, span_days, width));
    if let Some(x) = selected_x {
        for row in grid.iter_mut() {
            if row[x] == ' ' {
                row[x] = '|';
            }
        }
    }

    for (i, &(x, y)) in actual.iter().enumerate() {
        let is_selected = selected.is_some_and(|s| records[i].date == s);
        grid[y][x] = if is_selected { 'O' } else { 'o' };
    }
    for (i, &(x, y)) in forecast.iter().enumerate() {
        let is_selected = selected.is_some_and(|s| records[i].date == s);
        if is_selected {
            grid[y][x] = '*';
        } else if grid[y][x] != 'o' && grid[y][x] != 'O' {
            grid[y][x] = '+';
        }
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: {first} .. {last} | price=[{y_min:.2}, {y_max:.2}] | o actual  + forecast\n"
    ));
    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }
    out
}

fn price_range(records: &[MergedRecord]) -> (f64, f64) {
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for r in records {
        min_y = min_y.min(r.actual_price).min(r.predicted_price);
        max_y = max_y.max(r.actual_price).max(r.predicted_price);
    }
    if !(min_y.is_finite() && max_y.is_finite() && max_y > min_y) {
        // Flat or single-point series still needs a non-degenerate range.
        let level = if min_y.is_finite() { min_y } else { 0.0 };
        return (level - 1.0, level + 1.0);
    }
    (min_y, max_y)
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(day_offset: f64, span_days: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = (day_offset / span_days).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_polyline(grid: &mut [Vec<char>], points: &[(usize, usize)], ch: char) {
    for pair in points.windows(2) {
        let (x0, y0) = pair[0];
        let (x1, y1) = pair[1];
        draw_line(grid, x0, y0, x1, y1, ch);
    }
}

/// Integer line drawing (Bresenham-ish). Only blank cells are written so
/// earlier layers shine through.
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(day: u32, actual: f64, predicted: f64) -> MergedRecord {
        MergedRecord {
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            actual_price: actual,
            predicted_price: predicted,
            recommended_weeks: 1,
        }
    }

    #[test]
    fn empty_series_renders_a_note() {
        let txt = render_series_plot(&[], None, 40, 10);
        assert!(txt.contains("nothing to plot"));
    }

    #[test]
    fn grid_has_requested_dimensions_and_markers() {
        let records = vec![rec(1, 100.0, 105.0), rec(8, 120.0, 110.0), rec(15, 90.0, 95.0)];
        let txt = render_series_plot(&records, None, 40, 10);

        let lines: Vec<&str> = txt.lines().collect();
        // Header + grid rows.
        assert_eq!(lines.len(), 11);
        for row in &lines[1..] {
            assert_eq!(row.chars().count(), 40);
        }
        assert!(txt.contains('o'));
        assert!(txt.contains('+'));
        assert!(txt.contains("2024-01-01 .. 2024-01-15"));
    }

    #[test]
    fn selected_date_draws_a_column() {
        let records = vec![rec(1, 100.0, 105.0), rec(8, 120.0, 110.0), rec(15, 90.0, 95.0)];
        let with = render_series_plot(&records, Some(records[1].date), 40, 10);
        assert!(with.contains('|'), "{with}");
        assert!(with.contains('O') || with.contains('*'), "{with}");

        let without = render_series_plot(&records, None, 40, 10);
        assert!(!without.contains('|'), "{without}");
    }

    #[test]
    fn selection_outside_the_span_is_ignored() {
        let records = vec![rec(1, 100.0, 105.0), rec(8, 120.0, 110.0)];
        let date = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let txt = render_series_plot(&records, Some(date), 40, 10);
        assert!(!txt.contains('|'), "{txt}");
    }

    #[test]
    fn flat_series_does_not_divide_by_zero() {
        let records = vec![rec(1, 100.0, 100.0), rec(8, 100.0, 100.0)];
        let txt = render_series_plot(&records, None, 30, 8);
        assert!(txt.contains('o'));
    }

    #[test]
    fn output_is_deterministic() {
        let records = vec![rec(1, 100.0, 105.0), rec(8, 120.0, 110.0)];
        let a = render_series_plot(&records, None, 40, 10);
        let b = render_series_plot(&records, None, 40, 10);
        assert_eq!(a, b);
    }
}
