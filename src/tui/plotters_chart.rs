//! Plotters-powered series chart widget for Ratatui.
//!
//! Why Plotters instead of Ratatui's built-in `Chart` widget?
//! - nicer axis + tick rendering
//! - less manual work for labels
//! - easy to extend later (legend, annotations, exportable backends, etc.)
//!
//! We render Plotters output into the Ratatui buffer using
//! `plotters-ratatui-backend`.

use chrono::{Duration, NaiveDate};
use plotters::prelude::*;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

/// A lightweight, render-only chart description.
///
/// All series and bounds are computed outside the render call; the x axis
/// is day offsets from `base_date`, so tick labels can show calendar dates
/// while Plotters works in plain f64 coordinates.
pub struct SeriesChart<'a> {
    /// Actual price line, as (day offset, price).
    pub actual: &'a [(f64, f64)],
    /// Forecast price line, as (day offset, price).
    pub forecast: &'a [(f64, f64)],
    /// Day offset of the highlighted date, if any.
    pub selected_x: Option<f64>,
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
    /// Date at day offset 0; used only for tick label formatting.
    pub base_date: NaiveDate,
}

impl<'a> Widget for SeriesChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // When the available area is too small, Plotters may fail to build a
        // chart. In that case, render a small hint rather than panicking.
        if area.width < 20 || area.height < 8 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let x0 = self.x_bounds[0];
        let x1 = self.x_bounds[1];
        let y0 = self.y_bounds[0];
        let y1 = self.y_bounds[1];

        if !(x0.is_finite() && x1.is_finite() && y0.is_finite() && y1.is_finite())
            || x1 <= x0
            || y1 <= y0
        {
            return;
        }

        let base_date = self.base_date;

        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                // Terminal cells are low-res, so keep label areas compact.
                .set_label_area_size(LabelAreaPosition::Left, 9)
                .set_label_area_size(LabelAreaPosition::Bottom, 3)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .x_desc("date")
                .y_desc("price")
                .x_labels(5)
                .y_labels(5)
                .x_label_formatter(&|v| fmt_date_offset(base_date, *v))
                .y_label_formatter(&|v| format!("{v:.0}"))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .bold_line_style(&WHITE)
                .draw()?;

            let actual_color = RGBColor(0, 255, 255); // cyan
            let forecast_color = RGBColor(255, 255, 0); // yellow
            let selected_color = RGBColor(255, 0, 0); // red

            // 1) Selected-date column first, so the series draw over it.
            if let Some(x) = self.selected_x {
                chart.draw_series(LineSeries::new(
                    [(x, y0), (x, y1)].into_iter(),
                    &selected_color,
                ))?;
            }

            // 2) Actual and forecast lines.
            chart.draw_series(LineSeries::new(self.actual.iter().copied(), &actual_color))?;
            chart.draw_series(LineSeries::new(
                self.forecast.iter().copied(),
                &forecast_color,
            ))?;

            // 3) Highlight the selected points.
            //
            // Colored `Pixel`s rather than `Circle`s: the ratatui backend maps
            // circle radii into normalized canvas units, which produces huge
            // blobs at terminal resolution.
            if let Some(x) = self.selected_x {
                let hits = self
                    .actual
                    .iter()
                    .chain(self.forecast.iter())
                    .filter(|(px, _)| *px == x)
                    .map(|&(px, py)| Pixel::new((px, py), WHITE));
                chart.draw_series(hits)?;
            }

            Ok(())
        });

        widget.render(area, buf);
    }
}

fn fmt_date_offset(base: NaiveDate, offset: f64) -> String {
    let date = base + Duration::days(offset.round() as i64);
    date.format("%m-%d").to_string()
}
