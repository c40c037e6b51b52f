//! Ratatui-based terminal UI.
//!
//! The TUI provides a settings panel for choosing a prefecture and the two
//! statistic ids, then renders the dual-axis chart, the correlation metric and
//! the advisory message.

use std::io;
use std::time::Duration;

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
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
};

use crate::app::pipeline::{AnalysisOutcome, AnalysisRun, FETCH_FAILED_NOTICE, run_analysis};
use crate::cli::AnalyzeArgs;
use crate::data::{HttpStatsSource, StatFetcher};
use crate::domain::{AnalysisRequest, Band, MergedRecord};
use crate::error::AppError;
use crate::report::format_correlation;

mod plotters_chart;

use plotters_chart::DualSeriesChart;

const FIELD_PREFECTURE: usize = 0;
const FIELD_DEMAND: usize = 1;
const FIELD_SUPPLY: usize = 2;
const FIELD_COUNT: usize = 3;

/// Start the TUI.
pub fn run(args: AnalyzeArgs) -> Result<(), AppError> {
    // Resolve configuration before touching the terminal so errors print normally.
    let fetcher = StatFetcher::new(HttpStatsSource::from_env(args.app_id.clone())?);
    let mut app = App::new(args.request(), fetcher);

    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::io(format!("Failed to initialize terminal: {e}")))?;

    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::io(format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::io(format!("Failed to enter alternate screen: {e}")));
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

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    None,
    Quit,
    Analyze,
}

struct App {
    request: AnalysisRequest,
    selected_field: usize,
    /// Edit buffer while an id field is being typed into.
    editing: Option<String>,
    status: String,
    notice: Option<String>,
    fetcher: StatFetcher,
    run: Option<AnalysisRun>,
}

impl App {
    fn new(request: AnalysisRequest, fetcher: StatFetcher) -> Self {
        Self {
            request,
            selected_field: FIELD_PREFECTURE,
            editing: None,
            status: "Press a to analyze.".to_string(),
            notice: None,
            fetcher,
            run: None,
        }
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                self.redraw(terminal)?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::io(format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::io(format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    match self.handle_key(key.code) {
                        Action::Quit => break,
                        Action::Analyze => {
                            self.status = "Fetching e-Stat data...".to_string();
                            self.redraw(terminal)?;
                            self.analyze();
                        }
                        Action::None => {}
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

    fn redraw<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        terminal
            .draw(|f| self.draw(f))
            .map(|_| ())
            .map_err(|e| AppError::io(format!("Terminal draw error: {e}")))
    }

    fn handle_key(&mut self, code: KeyCode) -> Action {
        if self.editing.is_some() {
            self.handle_edit(code);
            return Action::None;
        }

        match code {
            KeyCode::Char('q') | KeyCode::Esc => return Action::Quit,
            KeyCode::Char('a') => return Action::Analyze,
            KeyCode::Up => {
                self.selected_field = self.selected_field.saturating_sub(1);
            }
            KeyCode::Down => {
                if self.selected_field + 1 < FIELD_COUNT {
                    self.selected_field += 1;
                }
            }
            KeyCode::Left | KeyCode::Right if self.selected_field == FIELD_PREFECTURE => {
                self.request.prefecture = if code == KeyCode::Right {
                    self.request.prefecture.next()
                } else {
                    self.request.prefecture.prev()
                };
                self.status = format!("prefecture: {}", self.request.prefecture.display_name());
            }
            KeyCode::Enter => {
                if self.selected_field == FIELD_PREFECTURE {
                    return Action::Analyze;
                }
                self.editing = Some(self.selected_id().to_string());
                self.status = "Editing id. Enter to apply, Esc to cancel.".to_string();
            }
            _ => {}
        }

        Action::None
    }

    fn handle_edit(&mut self, code: KeyCode) {
        let Some(buffer) = self.editing.as_mut() else {
            return;
        };
        match code {
            KeyCode::Esc => {
                self.editing = None;
                self.status = "Edit canceled.".to_string();
            }
            KeyCode::Enter => {
                let value = buffer.trim().to_string();
                self.editing = None;
                if value.is_empty() {
                    self.status = "Statistic id cannot be empty.".to_string();
                    return;
                }
                self.status = format!("id set: {value}");
                *self.selected_id_mut() = value;
            }
            KeyCode::Backspace => {
                buffer.pop();
            }
            KeyCode::Char(c) => {
                if c.is_ascii_alphanumeric() {
                    buffer.push(c);
                }
            }
            _ => {}
        }
    }

    fn selected_id(&self) -> &str {
        match self.selected_field {
            FIELD_SUPPLY => &self.request.supply_id,
            _ => &self.request.demand_id,
        }
    }

    fn selected_id_mut(&mut self) -> &mut String {
        match self.selected_field {
            FIELD_SUPPLY => &mut self.request.supply_id,
            _ => &mut self.request.demand_id,
        }
    }

    fn analyze(&mut self) {
        match run_analysis(&self.fetcher, &self.request) {
            AnalysisOutcome::Ready(run) => {
                self.status = format!(
                    "Loaded {} merged rows for {}.",
                    run.result.merged.len(),
                    run.request.prefecture.display_name()
                );
                self.notice = None;
                self.run = Some(run);
            }
            AnalysisOutcome::Unavailable { .. } => {
                self.status = "Fetch failed.".to_string();
                self.notice = Some(FETCH_FAILED_NOTICE.to_string());
                self.run = None;
            }
        }
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_body(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let mut lines: Vec<Line> = Vec::new();
        lines.push(Line::from(vec![
            Span::styled("estat", Style::default().fg(Color::Cyan)),
            Span::raw(" - prefecture tourism correlation (e-Stat)"),
        ]));

        let title = match &self.run {
            Some(run) => format!(
                "{}: guest nights vs occupancy | {} vs {}",
                run.request.prefecture.display_name(),
                run.request.demand_id,
                run.request.supply_id
            ),
            None => "no analysis yet".to_string(),
        };
        lines.push(Line::from(Span::styled(title, Style::default().fg(Color::Gray))));

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(7)])
            .split(area);

        self.draw_chart(frame, chunks[0]);

        let bottom = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
            .split(chunks[1]);

        self.draw_settings(frame, bottom[0]);
        self.draw_result(frame, bottom[1]);
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title("Demand / supply").borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        if let Some(notice) = &self.notice {
            let msg = Paragraph::new(notice.as_str())
                .style(Style::default().fg(Color::Red).add_modifier(Modifier::BOLD))
                .wrap(Wrap { trim: true });
            frame.render_widget(msg, inner);
            return;
        }

        let Some(run) = &self.run else {
            let msg = Paragraph::new("Choose a prefecture and press a to analyze.")
                .style(Style::default().fg(Color::Yellow));
            frame.render_widget(msg, inner);
            return;
        };

        if run.result.merged.is_empty() {
            let msg = Paragraph::new("The two series share no time codes.")
                .style(Style::default().fg(Color::Yellow));
            frame.render_widget(msg, inner);
            return;
        }

        let series = chart_series(&run.result.merged);
        let widget = DualSeriesChart {
            demand: &series.demand,
            supply: &series.supply,
            periods: &series.periods,
            x_bounds: series.x_bounds,
            demand_bounds: series.demand_bounds,
            supply_bounds: series.supply_bounds,
            demand_label: "guest nights",
            supply_label: "occupancy %",
        };
        frame.render_widget(widget, inner);
    }

    fn draw_settings(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let id_label = |field: usize, value: &str| -> String {
            match &self.editing {
                Some(buffer) if self.selected_field == field => format!("{buffer}_"),
                _ => value.to_string(),
            }
        };

        let p = self.request.prefecture;
        let items = vec![
            ListItem::new(format!("Prefecture: {} ({})", p.display_name(), p.area_code())),
            ListItem::new(format!("Demand id: {}", id_label(FIELD_DEMAND, &self.request.demand_id))),
            ListItem::new(format!("Supply id: {}", id_label(FIELD_SUPPLY, &self.request.supply_id))),
        ];

        let list = List::new(items)
            .block(Block::default().title("Settings").borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let mut state = ratatui::widgets::ListState::default();
        state.select(Some(self.selected_field));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_result(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let mut lines: Vec<Line> = Vec::new();
        if let Some(run) = &self.run {
            let result = &run.result;
            lines.push(Line::from(vec![
                Span::raw("Correlation: "),
                Span::styled(
                    format_correlation(result.correlation),
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!("  (n={}, {})", result.complete_rows(), result.band.display_name()),
                    Style::default().fg(Color::Gray),
                ),
            ]));
            if let Some(msg) = result.band.advisory() {
                lines.push(Line::from(Span::styled(msg, band_style(result.band))));
            }
        } else {
            lines.push(Line::from(Span::styled("-", Style::default().fg(Color::Gray))));
        }

        let p = Paragraph::new(Text::from(lines))
            .wrap(Wrap { trim: true })
            .block(Block::default().title("Result").borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "↑/↓ select  ←/→ prefecture  Enter edit/run  a analyze  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

fn band_style(band: Band) -> Style {
    match band {
        Band::StrongPositive => Style::default().fg(Color::Green),
        Band::Weak => Style::default().fg(Color::Yellow),
        Band::Neutral => Style::default().fg(Color::Gray),
    }
}

/// Chart-ready data derived from the merged table.
#[derive(Debug, Clone, PartialEq)]
struct ChartSeries {
    periods: Vec<String>,
    demand: Vec<Vec<(f64, f64)>>,
    supply: Vec<Vec<(f64, f64)>>,
    x_bounds: [f64; 2],
    demand_bounds: [f64; 2],
    supply_bounds: [f64; 2],
}

fn chart_series(rows: &[MergedRecord]) -> ChartSeries {
    let periods = rows.iter().map(|r| r.display_period.clone()).collect();
    let demand: Vec<Option<f64>> = rows.iter().map(|r| r.demand_value).collect();
    let supply: Vec<Option<f64>> = rows.iter().map(|r| r.supply_value).collect();

    let x_bounds = if rows.len() < 2 {
        [-0.5, 0.5]
    } else {
        [0.0, (rows.len() - 1) as f64]
    };

    ChartSeries {
        periods,
        demand_bounds: padded_bounds(&demand),
        supply_bounds: padded_bounds(&supply),
        demand: split_runs(&demand),
        supply: split_runs(&supply),
        x_bounds,
    }
}

/// Split a column into runs of consecutive present values, keyed by row index.
fn split_runs(values: &[Option<f64>]) -> Vec<Vec<(f64, f64)>> {
    let mut runs = Vec::new();
    let mut current = Vec::new();
    for (idx, value) in values.iter().enumerate() {
        match value {
            Some(v) => current.push((idx as f64, *v)),
            None => {
                if !current.is_empty() {
                    runs.push(std::mem::take(&mut current));
                }
            }
        }
    }
    if !current.is_empty() {
        runs.push(current);
    }
    runs
}

fn padded_bounds(values: &[Option<f64>]) -> [f64; 2] {
    let (mut y_min, mut y_max) = (f64::INFINITY, f64::NEG_INFINITY);
    for v in values.iter().flatten() {
        y_min = y_min.min(*v);
        y_max = y_max.max(*v);
    }

    if !y_min.is_finite() || !y_max.is_finite() {
        return [0.0, 1.0];
    }

    let span = y_max - y_min;
    let pad = if span > 0.0 {
        span * 0.05
    } else {
        (y_min.abs() * 0.05).max(1.0)
    };
    [y_min - pad, y_max + pad]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(time: &str, d: Option<f64>, s: Option<f64>) -> MergedRecord {
        MergedRecord {
            time_code: time.to_string(),
            demand_value: d,
            supply_value: s,
            display_period: time[..6].to_string(),
        }
    }

    #[test]
    fn runs_break_on_missing_values() {
        let runs = split_runs(&[Some(1.0), Some(2.0), None, Some(4.0), None]);
        assert_eq!(runs, vec![vec![(0.0, 1.0), (1.0, 2.0)], vec![(3.0, 4.0)]]);
        assert!(split_runs(&[None, None]).is_empty());
    }

    #[test]
    fn bounds_are_padded_and_never_empty() {
        assert_eq!(padded_bounds(&[Some(0.0), Some(100.0)]), [-5.0, 105.0]);
        assert_eq!(padded_bounds(&[Some(80.0), Some(80.0)]), [76.0, 84.0]);
        assert_eq!(padded_bounds(&[Some(0.0)]), [-1.0, 1.0]);
        assert_eq!(padded_bounds(&[None]), [0.0, 1.0]);
    }

    #[test]
    fn chart_series_uses_row_index_and_periods() {
        let rows = vec![
            record("20230101", Some(10.0), Some(50.0)),
            record("20230201", Some(20.0), None),
            record("20230301", Some(30.0), Some(70.0)),
        ];
        let series = chart_series(&rows);
        assert_eq!(series.periods, vec!["202301", "202302", "202303"]);
        assert_eq!(series.x_bounds, [0.0, 2.0]);
        assert_eq!(series.demand.len(), 1);
        assert_eq!(series.supply, vec![vec![(0.0, 50.0)], vec![(2.0, 70.0)]]);

        let single = chart_series(&rows[..1]);
        assert_eq!(single.x_bounds, [-0.5, 0.5]);
    }
}
