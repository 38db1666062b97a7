//! Ratatui-based terminal UI.
//!
//! The TUI provides multi-select filter lists (month-year, category, city)
//! and two views toggled with Tab: a Dashboard (KPIs, trend chart, rankings)
//! and a Forecasting view (observed + projected monthly sales).
//!
//! Every interaction recomputes the whole pipeline synchronously from the
//! in-memory dataset; there are no background tasks.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph},
    Terminal,
};

use crate::app::pipeline::{self, RunOutput};
use crate::domain::{ForecastOutcome, PointSource, ReportConfig};
use crate::error::AppError;
use crate::filter::{build_catalog, FilterCatalog};
use crate::io::ingest::Dataset;
use crate::report::{fmt_money, format_filters, month_label};

mod plotters_chart;

use plotters_chart::SalesTrendChart;

/// Start the TUI with an already-parsed configuration.
pub fn run(config: ReportConfig) -> Result<(), AppError> {
    // Load before touching the terminal so startup errors print normally.
    let dataset = pipeline::load_session(&config)?;
    let mut app = App::new(dataset, config)?;

    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(4, format!("Failed to initialize terminal: {e}")))?;

    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::new(4, format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::new(4, format!("Failed to enter alternate screen: {e}")));
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

/// Which main view is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Page {
    Dashboard,
    Forecasting,
}

/// Filter panes, in left-panel order.
const PANES: [&str; 3] = ["Month-Year", "Category", "City"];

struct App {
    dataset: Dataset,
    catalog: FilterCatalog,
    config: ReportConfig,
    page: Page,
    /// Index into [`PANES`].
    pane: usize,
    /// Cursor position per pane.
    cursors: [usize; 3],
    run: RunOutput,
    status: String,
}

impl App {
    fn new(dataset: Dataset, config: ReportConfig) -> Result<Self, AppError> {
        let catalog = build_catalog(&dataset.records);
        let run = pipeline::run_cycle(&dataset, &config)?;
        Ok(Self {
            dataset,
            catalog,
            config,
            page: Page::Dashboard,
            pane: 0,
            cursors: [0; 3],
            run,
            status: "Ready.".to_string(),
        })
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::new(4, format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::new(4, format!("Event poll error: {e}")))? {
                continue;
            }

            match event::read().map_err(|e| AppError::new(4, format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code)? {
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

    fn handle_key(&mut self, code: KeyCode) -> Result<bool, AppError> {
        match code {
            KeyCode::Char('q') => return Ok(true),
            KeyCode::Tab => {
                self.page = match self.page {
                    Page::Dashboard => Page::Forecasting,
                    Page::Forecasting => Page::Dashboard,
                };
            }
            KeyCode::Left => {
                if self.pane > 0 {
                    self.pane -= 1;
                }
            }
            KeyCode::Right => {
                if self.pane + 1 < PANES.len() {
                    self.pane += 1;
                }
            }
            KeyCode::Up => {
                let cursor = &mut self.cursors[self.pane];
                if *cursor > 0 {
                    *cursor -= 1;
                }
            }
            KeyCode::Down => {
                let len = self.pane_values(self.pane).len();
                let cursor = &mut self.cursors[self.pane];
                if len > 0 && *cursor + 1 < len {
                    *cursor += 1;
                }
            }
            KeyCode::Char(' ') | KeyCode::Enter => {
                self.toggle_current()?;
            }
            KeyCode::Char('c') => {
                self.config.filters = Default::default();
                self.recompute()?;
                self.status = "Cleared all filters.".to_string();
            }
            KeyCode::Char('e') => {
                self.export_view();
            }
            _ => {}
        }

        Ok(false)
    }

    fn pane_values(&self, pane: usize) -> &[String] {
        match pane {
            0 => &self.catalog.months,
            1 => &self.catalog.categories,
            _ => &self.catalog.cities,
        }
    }

    fn toggle_current(&mut self) -> Result<(), AppError> {
        let cursor = self.cursors[self.pane];
        let Some(value) = self.pane_values(self.pane).get(cursor).cloned() else {
            return Ok(());
        };

        let set = match self.pane {
            0 => &mut self.config.filters.months,
            1 => &mut self.config.filters.categories,
            _ => &mut self.config.filters.cities,
        };

        if !set.remove(&value) {
            set.insert(value.clone());
        }
        self.recompute()?;
        self.status = format!("{}: toggled '{value}'", PANES[self.pane]);
        Ok(())
    }

    fn recompute(&mut self) -> Result<(), AppError> {
        self.run = pipeline::run_cycle(&self.dataset, &self.config)?;
        Ok(())
    }

    fn export_view(&mut self) {
        let path: PathBuf = self
            .config
            .export
            .clone()
            .unwrap_or_else(|| PathBuf::from("filtered_ecommerce_data.csv"));
        match crate::io::export::write_filtered_csv(&path, &self.run.view) {
            Ok(()) => {
                self.status = format!("Exported {} row(s) to '{}'.", self.run.view.len(), path.display());
            }
            Err(err) => {
                self.status = format!("Export failed: {err}");
            }
        }
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(5), Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_body(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let page_name = match self.page {
            Page::Dashboard => "Dashboard",
            Page::Forecasting => "Forecasting",
        };

        let mut lines: Vec<Line> = Vec::new();
        lines.push(Line::from(vec![
            Span::styled("pulse", Style::default().fg(Color::Cyan)),
            Span::raw(" — E-Commerce Sales Dashboard | "),
            Span::styled(page_name, Style::default().fg(Color::Yellow)),
        ]));

        lines.push(Line::from(Span::styled(
            format!(
                "records: {} of {} | filters: {}",
                self.run.view.len(),
                self.dataset.stats.n_records,
                format_filters(&self.config.filters),
            ),
            Style::default().fg(Color::Gray),
        )));

        let kpis = &self.run.kpis;
        lines.push(Line::from(Span::styled(
            format!(
                "sales: {} | profit: {} | orders: {} | avg order: {}",
                fmt_money(kpis.total_sales),
                fmt_money(kpis.total_profit),
                kpis.total_orders,
                fmt_money(kpis.avg_order_value),
            ),
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

        self.draw_filters(frame, chunks[0]);
        match self.page {
            Page::Dashboard => self.draw_dashboard(frame, chunks[1]),
            Page::Forecasting => self.draw_forecasting(frame, chunks[1]),
        }
    }

    fn draw_filters(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Ratio(1, 3),
                Constraint::Ratio(1, 3),
                Constraint::Ratio(1, 3),
            ])
            .split(area);

        for (pane, &title) in PANES.iter().enumerate() {
            let selected_set = match pane {
                0 => &self.config.filters.months,
                1 => &self.config.filters.categories,
                _ => &self.config.filters.cities,
            };

            let items: Vec<ListItem> = self
                .pane_values(pane)
                .iter()
                .map(|v| {
                    let mark = if selected_set.contains(v) { "[x]" } else { "[ ]" };
                    ListItem::new(format!("{mark} {v}"))
                })
                .collect();

            let active = pane == self.pane;
            let border_style = if active {
                Style::default().fg(Color::Cyan)
            } else {
                Style::default()
            };

            let list = List::new(items)
                .block(
                    Block::default()
                        .title(title)
                        .borders(Borders::ALL)
                        .border_style(border_style),
                )
                .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
                .highlight_symbol("» ");

            let mut state = ratatui::widgets::ListState::default();
            if active {
                state.select(Some(self.cursors[pane]));
            }
            frame.render_stateful_widget(list, chunks[pane], &mut state);
        }
    }

    fn draw_dashboard(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(12)])
            .split(area);

        self.draw_chart(frame, chunks[0], "Monthly Sales Trend", false);
        self.draw_rankings(frame, chunks[1]);
    }

    fn draw_forecasting(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(9)])
            .split(area);

        self.draw_chart(frame, chunks[0], "Sales Forecast (next 3 months)", true);
        self.draw_forecast_table(frame, chunks[1]);
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect, title: &str, with_projection: bool) {
        let block = Block::default().title(title).borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let Some(series) = self.chart_series(with_projection) else {
            let msg = Paragraph::new("No data for the current filters.")
                .style(Style::default().fg(Color::Yellow))
                .block(Block::default());
            frame.render_widget(msg, inner);
            return;
        };

        let (chart_rect, insets) = chart_layout(inner);
        let widget = SalesTrendChart {
            observed: &series.observed,
            projected: &series.projected,
            x_bounds: series.x_bounds,
            y_bounds: series.y_bounds,
            x_label: "month",
            y_label: "sales ($)",
            fmt_x: fmt_axis_x,
            fmt_y: fmt_axis_y,
        };

        frame.render_widget(widget, chart_rect);
        if let Some(insets) = insets {
            draw_axis_ticks(frame, inner, chart_rect, insets, &series.labels, series.y_bounds);
        }
    }

    fn draw_rankings(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Ratio(1, 2), Constraint::Ratio(1, 2)])
            .split(area);

        let tables = [
            ("Top Selling Categories", &self.run.top_categories),
            ("Top Cities by Sales", &self.run.top_cities),
        ];

        for (i, (title, groups)) in tables.into_iter().enumerate() {
            let items: Vec<ListItem> = if groups.is_empty() {
                vec![ListItem::new("(no records)")]
            } else {
                groups
                    .iter()
                    .map(|g| ListItem::new(format!("{:<18} {:>12}", clip(&g.key, 18), fmt_money(g.total))))
                    .collect()
            };
            let list = List::new(items).block(Block::default().title(title).borders(Borders::ALL));
            frame.render_widget(list, chunks[i]);
        }
    }

    fn draw_forecast_table(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title("Forecast").borders(Borders::ALL);

        match &self.run.forecast {
            ForecastOutcome::InsufficientData { observed } => {
                let msg = Paragraph::new(format!(
                    "Not enough data to generate a forecast ({observed} monthly point(s), need at least 2)."
                ))
                .style(Style::default().fg(Color::Yellow))
                .block(block);
                frame.render_widget(msg, area);
            }
            ForecastOutcome::Forecast(fc) => {
                let mut items: Vec<ListItem> = Vec::new();
                items.push(ListItem::new(format!(
                    "Holt additive trend | alpha={:.3} beta={:.3} | rmse={:.1}",
                    fc.model.alpha, fc.model.beta, fc.quality.rmse,
                )));
                for p in fc.projected() {
                    items.push(ListItem::new(format!(
                        "{:<9} {:>14}  (projected)",
                        month_label(p.month),
                        fmt_money(p.amount),
                    )));
                }
                let list = List::new(items).block(block);
                frame.render_widget(list, area);
            }
        }
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "Tab view  ←/→ pane  ↑/↓ move  Space toggle  c clear  e export  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    /// Build the chart series (x = month index) for the current page.
    fn chart_series(&self, with_projection: bool) -> Option<ChartSeries> {
        let observed: Vec<(f64, f64)> = self
            .run
            .monthly
            .iter()
            .enumerate()
            .map(|(i, m)| (i as f64, m.total))
            .collect();

        if observed.is_empty() {
            return None;
        }

        let mut labels: Vec<String> = self.run.monthly.iter().map(|m| month_label(m.month)).collect();

        let mut projected: Vec<(f64, f64)> = Vec::new();
        if with_projection {
            if let ForecastOutcome::Forecast(fc) = &self.run.forecast {
                // Start from the last observed point so the lines join up.
                if let Some(&last) = observed.last() {
                    projected.push(last);
                }
                for p in fc.points.iter().filter(|p| p.source == PointSource::Projected) {
                    projected.push((labels.len() as f64, p.amount));
                    labels.push(month_label(p.month));
                }
            }
        }

        let x_max = (labels.len().saturating_sub(1)).max(1) as f64;

        let mut y_min = f64::INFINITY;
        let mut y_max = f64::NEG_INFINITY;
        for &(_, y) in observed.iter().chain(projected.iter()) {
            y_min = y_min.min(y);
            y_max = y_max.max(y);
        }
        if !y_min.is_finite() || !y_max.is_finite() {
            return None;
        }
        if y_max <= y_min {
            y_min -= 1.0;
            y_max += 1.0;
        }
        let pad = ((y_max - y_min).abs() * 0.05).max(1e-12);

        Some(ChartSeries {
            observed,
            projected,
            labels,
            x_bounds: [0.0, x_max],
            y_bounds: [y_min - pad, y_max + pad],
        })
    }
}

struct ChartSeries {
    observed: Vec<(f64, f64)>,
    projected: Vec<(f64, f64)>,
    labels: Vec<String>,
    x_bounds: [f64; 2],
    y_bounds: [f64; 2],
}

fn fmt_axis_x(v: f64) -> String {
    format!("{v:.0}")
}

fn fmt_axis_y(v: f64) -> String {
    format!("{v:.0}")
}

fn clip(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('.');
    out
}

#[derive(Debug, Clone, Copy)]
struct AxisInsets {
    left: u16,
    right: u16,
    top: u16,
    bottom: u16,
}

fn chart_layout(inner: Rect) -> (Rect, Option<AxisInsets>) {
    let insets = AxisInsets {
        left: 10,
        right: 2,
        top: 1,
        bottom: 2,
    };

    if inner.width <= insets.left + insets.right + 10
        || inner.height <= insets.top + insets.bottom + 5
    {
        return (inner, None);
    }

    let rect = Rect {
        x: inner.x + insets.left,
        y: inner.y + insets.top,
        width: inner.width - insets.left - insets.right,
        height: inner.height - insets.top - insets.bottom,
    };

    (rect, Some(insets))
}

fn draw_axis_ticks(
    frame: &mut ratatui::Frame<'_>,
    inner: Rect,
    chart: Rect,
    insets: AxisInsets,
    x_labels: &[String],
    y_bounds: [f64; 2],
) {
    let style = Style::default().fg(Color::Gray);

    // X ticks: up to 5 month labels, evenly spread over the index range.
    let n = x_labels.len();
    if n > 0 {
        let ticks = n.min(5);
        for i in 0..ticks {
            let pos = if ticks == 1 {
                0
            } else {
                i * (n - 1) / (ticks - 1)
            };
            let u = if n > 1 { pos as f64 / (n - 1) as f64 } else { 0.0 };
            let x = chart.x + ((chart.width - 1) as f64 * u).round() as u16;
            let label = x_labels[pos].clone();
            let start = x.saturating_sub((label.len() / 2) as u16).max(inner.x);
            let right = inner.x + inner.width;
            if start >= right {
                continue;
            }
            let width = (label.len() as u16).min(right - start);
            let y = chart.y + chart.height;
            if y >= inner.y + inner.height - 1 {
                continue;
            }
            frame.render_widget(
                Paragraph::new(label).style(style),
                Rect {
                    x: start,
                    y,
                    width,
                    height: 1,
                },
            );
        }
    }

    // Y ticks: 5 numeric labels.
    let ticks = 5usize;
    for i in 0..ticks {
        let u = i as f64 / (ticks as f64 - 1.0);
        let y_val = y_bounds[0] + u * (y_bounds[1] - y_bounds[0]);
        let y = chart.y + (chart.height - 1) - ((chart.height - 1) as f64 * u).round() as u16;
        let label = format!("{y_val:.0}");
        let label_len = label.len() as u16;
        let x = inner.x + insets.left.saturating_sub(1);
        let start = x.saturating_sub(label.len() as u16);
        if start < inner.x {
            continue;
        }
        frame.render_widget(
            Paragraph::new(label).style(style),
            Rect {
                x: start,
                y,
                width: label_len,
                height: 1,
            },
        );
    }

    let x_label = Paragraph::new("month")
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Gray));
    let x_rect = Rect {
        x: chart.x,
        y: chart.y + chart.height + 1,
        width: chart.width,
        height: 1,
    };
    if x_rect.y < inner.y + inner.height {
        frame.render_widget(x_label, x_rect);
    }

    let y_label = Paragraph::new("sales ($)")
        .style(Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD));
    let y_rect = Rect {
        x: inner.x,
        y: inner.y,
        width: insets.left.saturating_sub(1),
        height: 1,
    };
    frame.render_widget(y_label, y_rect);
}
