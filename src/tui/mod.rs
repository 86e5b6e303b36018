//! Ratatui-based terminal UI.
//!
//! The TUI is the form-style front-end: a date list on the left, the series
//! chart and the selected date's comparison on the right, and a jump box
//! that routes typed dates through the engine's lookup (so "bad format" and
//! "no data" surface exactly like they do everywhere else). All navigation
//! state lives here; the engine stays read-only.

use std::io;
use std::time::Duration;

use chrono::NaiveDate;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph},
};

use crate::app::pipeline::{self, Bootstrap};
use crate::domain::{LookupOutcome, MonthKey, RunConfig};
use crate::error::AppError;
use crate::report;

mod plotters_chart;

use plotters_chart::SeriesChart;

/// Start the TUI. The engine is built once, before the terminal is taken
/// over, so load failures print normally.
pub fn run(config: RunConfig) -> Result<(), AppError> {
    let boot = pipeline::bootstrap(&config)?;

    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::data(format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(config, boot);
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::data(format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::data(format!(
                "Failed to enter alternate screen: {e}"
            )));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

struct App {
    config: RunConfig,
    boot: Bootstrap,
    selected: usize,
    editing_date: bool,
    date_input: String,
    status: String,
}

impl App {
    fn new(config: RunConfig, boot: Bootstrap) -> Self {
        let status = if boot.engine.is_empty() {
            "No overlapping dates between the sources.".to_string()
        } else {
            format!("{} date(s) loaded.", boot.engine.len())
        };
        Self {
            config,
            boot,
            selected: 0,
            editing_date: false,
            date_input: String::new(),
            status,
        }
    }

    fn event_loop<B: ratatui::backend::Backend>(
        &mut self,
        terminal: &mut Terminal<B>,
    ) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::data(format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::data(format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::data(format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Returns true when the app should quit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        if self.editing_date {
            self.handle_date_edit(code);
            return false;
        }

        let len = self.boot.engine.len();
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected = self.selected.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if len > 0 && self.selected + 1 < len {
                    self.selected += 1;
                }
            }
            KeyCode::Home | KeyCode::Char('g') => self.selected = 0,
            KeyCode::End | KeyCode::Char('G') => {
                self.selected = len.saturating_sub(1);
            }
            KeyCode::PageUp => self.jump_month(-1),
            KeyCode::PageDown => self.jump_month(1),
            KeyCode::Char('r') => self.reload(),
            KeyCode::Char('/') => {
                self.editing_date = true;
                self.date_input.clear();
                self.status =
                    "Jump to date (YYYY-MM-DD or DD-MM-YYYY). Enter to go, Esc to cancel."
                        .to_string();
            }
            _ => {}
        }

        false
    }

    fn handle_date_edit(&mut self, code: KeyCode) {
        match code {
            KeyCode::Esc => {
                self.editing_date = false;
                self.status = "Jump canceled.".to_string();
            }
            KeyCode::Enter => {
                self.editing_date = false;
                self.apply_date_input();
            }
            KeyCode::Backspace => {
                self.date_input.pop();
            }
            KeyCode::Char(c) => {
                if c.is_ascii_digit() || c == '-' || c == '.' {
                    self.date_input.push(c);
                }
            }
            _ => {}
        }
    }

    /// Route the typed date through the engine and surface every outcome
    /// distinctly in the status line.
    fn apply_date_input(&mut self) {
        let input = self.date_input.trim().to_string();
        if input.is_empty() {
            self.status = "Jump canceled (empty input).".to_string();
            return;
        }

        match self.boot.engine.lookup(&input) {
            LookupOutcome::Found(record) => {
                if let Some(pos) = self.position_of(record.date) {
                    self.selected = pos;
                    self.status = format!("Jumped to {}.", record.date);
                }
            }
            LookupOutcome::NotFound { date } => {
                self.status = report::format_not_found(date);
            }
            LookupOutcome::InvalidInput { input } => {
                self.status = report::format_invalid_input(&input);
            }
        }
    }

    /// Re-run the initialization pipeline, swapping in a fresh immutable
    /// engine. In sample mode the seed advances, so `r` resamples.
    fn reload(&mut self) {
        if self.config.sample {
            self.config.sample_seed = self.config.sample_seed.wrapping_add(1);
        }
        match pipeline::bootstrap(&self.config) {
            Ok(boot) => {
                self.selected = self.selected.min(boot.engine.len().saturating_sub(1));
                self.boot = boot;
                self.status = "Reloaded.".to_string();
            }
            Err(err) => {
                self.status = format!("Reload failed: {err}");
            }
        }
    }

    /// Move the selection to the first date of the previous/next month
    /// bucket.
    fn jump_month(&mut self, delta: i32) {
        let months = self.boot.engine.months();
        let Some(current) = self.selected_date() else {
            return;
        };
        let key = MonthKey::from_date(current);
        let Some(pos) = months.iter().position(|b| b.month == key) else {
            return;
        };

        let target = if delta < 0 {
            pos.checked_sub(1)
        } else if pos + 1 < months.len() {
            Some(pos + 1)
        } else {
            None
        };

        if let Some(target) = target {
            if let Some(&first) = months[target].dates.first() {
                if let Some(idx) = self.position_of(first) {
                    self.selected = idx;
                    self.status = format!("Month {}.", months[target].month);
                }
            }
        }
    }

    fn selected_date(&self) -> Option<NaiveDate> {
        self.boot
            .engine
            .records()
            .get(self.selected)
            .map(|r| r.date)
    }

    fn position_of(&self, date: NaiveDate) -> Option<usize> {
        self.boot
            .engine
            .records()
            .binary_search_by_key(&date, |r| r.date)
            .ok()
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(5),
                Constraint::Min(0),
                Constraint::Length(3),
            ])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_body(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let mut lines: Vec<Line> = Vec::new();
        lines.push(Line::from(vec![
            Span::styled("fva", Style::default().fg(Color::Cyan)),
            Span::raw(" — forecast vs actuals"),
        ]));

        let span = match (self.boot.engine.first_date(), self.boot.engine.last_date()) {
            (Some(first), Some(last)) => format!("{first} .. {last}"),
            _ => "-".to_string(),
        };
        lines.push(Line::from(Span::styled(
            format!(
                "actuals: {} | forecast: {} | merged: {} | {span}",
                self.boot.summary.actuals_label,
                self.boot.summary.forecast_label,
                self.boot.engine.len(),
            ),
            Style::default().fg(Color::Gray),
        )));

        let metrics_line = match self.boot.engine.metrics() {
            Some(m) => {
                let mape = match m.mape {
                    Some(v) => format!("{v:.2}%"),
                    None => "n/a".to_string(),
                };
                format!("mae={:.2} | rmse={:.2} | mape={mape}", m.mae, m.rmse)
            }
            None => "metrics unavailable (no overlapping dates)".to_string(),
        };
        lines.push(Line::from(Span::styled(
            metrics_line,
            Style::default().fg(Color::Gray),
        )));

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(26), Constraint::Min(0)])
            .split(area);

        self.draw_date_list(frame, chunks[0]);

        let right = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(8)])
            .split(chunks[1]);

        self.draw_chart(frame, right[0]);
        self.draw_detail(frame, right[1]);
    }

    fn draw_date_list(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let records = self.boot.engine.records();
        let items: Vec<ListItem> = records
            .iter()
            .map(|r| ListItem::new(format!("{}  {:>9.2}", r.date, r.actual_price)))
            .collect();

        let list = List::new(items)
            .block(Block::default().title("Dates").borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let mut state = ratatui::widgets::ListState::default();
        if !records.is_empty() {
            state.select(Some(self.selected.min(records.len() - 1)));
        }
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default()
            .title("Actual vs Forecast")
            .borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let records = self.boot.engine.records();
        if records.is_empty() {
            let msg = Paragraph::new("No overlapping dates to chart.")
                .style(Style::default().fg(Color::Yellow))
                .block(Block::default());
            frame.render_widget(msg, inner);
            return;
        }

        let (actual, forecast, selected_x, x_bounds, y_bounds, base_date) =
            chart_series(&self.boot, self.selected);

        let widget = SeriesChart {
            actual: &actual,
            forecast: &forecast,
            selected_x,
            x_bounds,
            y_bounds,
            base_date,
        };
        frame.render_widget(widget, inner);
    }

    fn draw_detail(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title("Selected").borders(Borders::ALL);

        let body = match self.boot.engine.records().get(self.selected) {
            Some(record) => report::format_record(record),
            None => "Nothing selected.".to_string(),
        };

        let p = Paragraph::new(body).block(block);
        frame.render_widget(p, area);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "↑/↓ select  PgUp/PgDn month  / jump to date  r reload  q quit";
        let status = if self.editing_date {
            format!("date: {}_", self.date_input)
        } else {
            self.status.clone()
        };
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(
                status,
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

/// Build chart series for Plotters: day offsets on x, prices on y.
fn chart_series(
    boot: &Bootstrap,
    selected: usize,
) -> (
    Vec<(f64, f64)>,
    Vec<(f64, f64)>,
    Option<f64>,
    [f64; 2],
    [f64; 2],
    NaiveDate,
) {
    let records = boot.engine.records();
    let base_date = records[0].date;

    let offset = |date: NaiveDate| (date - base_date).num_days() as f64;

    let actual: Vec<(f64, f64)> = records
        .iter()
        .map(|r| (offset(r.date), r.actual_price))
        .collect();
    let forecast: Vec<(f64, f64)> = records
        .iter()
        .map(|r| (offset(r.date), r.predicted_price))
        .collect();

    let selected_x = records.get(selected).map(|r| offset(r.date));

    let x_max = offset(records[records.len() - 1].date).max(1.0);
    let x_bounds = [0.0, x_max];

    let (mut y_min, mut y_max) = (f64::INFINITY, f64::NEG_INFINITY);
    for &(_, y) in actual.iter().chain(forecast.iter()) {
        y_min = y_min.min(y);
        y_max = y_max.max(y);
    }
    if !y_min.is_finite() || !y_max.is_finite() || y_max <= y_min {
        y_min = 0.0;
        y_max = 1.0;
    }
    let pad = ((y_max - y_min).abs() * 0.05).max(1e-12);
    let y_bounds = [y_min - pad, y_max + pad];

    (actual, forecast, selected_x, x_bounds, y_bounds, base_date)
}
