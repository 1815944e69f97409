//! Ratatui-based terminal dashboard.
//!
//! Left: one card per indicator (latest print, delta). Right: a chart of the
//! selected indicator over the lookback window, and the release calendar.

use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{Local, Utc};
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
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
};
use tracing::info;

use crate::app::pipeline::{IndicatorView, Pipeline, ViewStatus};
use crate::app::refresh::auto_refresh_interval_now;
use crate::config::{MAX_LOOKBACK_YEARS, MIN_LOOKBACK_YEARS, Settings};
use crate::data::calendar::{self, CalendarClient, CalendarEvent, UPCOMING_LIMIT};
use crate::data::FredClient;
use crate::domain::IndicatorDefinition;
use crate::error::{AppError, FetchError};
use crate::registry::INDICATORS;
use crate::report::{CALENDAR_DISABLED_MESSAGE, card_line, chart_caption};

mod plotters_chart;

use plotters_chart::{ChartData, SeriesChart};

/// Start the TUI.
pub fn run(settings: Settings) -> Result<(), AppError> {
    let mut app = App::new(settings)?;

    let _guard = TerminalGuard::new()?;
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(4, format!("Failed to initialize terminal: {e}")))?;

    app.reload();
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

/// What the calendar panel shows.
enum CalendarPanel {
    Disabled,
    Loaded(Arc<Vec<CalendarEvent>>),
    Failed(FetchError),
}

struct App {
    settings: Settings,
    pipeline: Pipeline<FredClient>,
    calendar: CalendarClient,
    definitions: Vec<&'static IndicatorDefinition>,
    views: Vec<IndicatorView>,
    calendar_panel: CalendarPanel,
    selected: usize,
    lookback_years: u32,
    status: String,
    last_refresh: Instant,
}

impl App {
    fn new(settings: Settings) -> Result<Self, AppError> {
        let pipeline = Pipeline::from_settings(&settings)?;
        let calendar = CalendarClient::from_settings(&settings)?;
        Ok(Self {
            lookback_years: settings.lookback_years,
            settings,
            pipeline,
            calendar,
            definitions: INDICATORS.iter().collect(),
            views: Vec::new(),
            calendar_panel: CalendarPanel::Disabled,
            selected: 0,
            status: "Fetching FRED data...".to_string(),
            last_refresh: Instant::now(),
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

            if let Some(interval) = auto_refresh_interval_now() {
                if self.last_refresh.elapsed() >= interval {
                    self.pipeline.clear_cache();
                    self.calendar.clear();
                    self.reload();
                    self.status = format!("Auto-refreshed at {}", Local::now().format("%H:%M:%S"));
                    needs_redraw = true;
                }
            }

            if !event::poll(Duration::from_millis(250))
                .map_err(|e| AppError::new(4, format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::new(4, format!("Event read error: {e}")))? {
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

    /// Returns `true` when the app should exit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Up => {
                self.selected = self.selected.saturating_sub(1);
            }
            KeyCode::Down => {
                if self.selected + 1 < self.views.len() {
                    self.selected += 1;
                }
            }
            KeyCode::Left => {
                self.lookback_years = self.lookback_years.saturating_sub(1).max(MIN_LOOKBACK_YEARS);
                self.status = format!("lookback: {}y", self.lookback_years);
            }
            KeyCode::Right => {
                self.lookback_years = (self.lookback_years + 1).min(MAX_LOOKBACK_YEARS);
                self.status = format!("lookback: {}y", self.lookback_years);
            }
            KeyCode::Char('r') => {
                self.reload();
                self.status = "Reloaded (cached series reused).".to_string();
            }
            KeyCode::Char('c') => {
                self.pipeline.clear_cache();
                self.calendar.clear();
                self.reload();
                self.status = "Cache cleared; refetched all series.".to_string();
            }
            _ => {}
        }
        false
    }

    fn reload(&mut self) {
        self.views = self.pipeline.load_all(&self.definitions);
        let failed = self.views.iter().filter(|v| v.status() == ViewStatus::Failed).count();
        info!(indicators = self.views.len(), failed, "dashboard reloaded");

        self.calendar_panel = if self.calendar.is_enabled() {
            let (d1, d2) = calendar::default_range(Local::now().date_naive(), 1, 7);
            match self.calendar.events(d1, d2) {
                Ok(events) => CalendarPanel::Loaded(events),
                Err(err) => CalendarPanel::Failed(err),
            }
        } else {
            CalendarPanel::Disabled
        };

        self.selected = self.selected.min(self.views.len().saturating_sub(1));
        self.last_refresh = Instant::now();
        self.status = format!("Updated {}", Local::now().format("%H:%M:%S"));
    }

    fn draw(&self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_body(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let refresh = match auto_refresh_interval_now() {
            Some(iv) => format!("auto-refresh ON ({}s, market hours)", iv.as_secs()),
            None => "auto-refresh off".to_string(),
        };
        let line = Line::from(vec![
            Span::styled("U.S. Macro Dashboard", Style::default().fg(Color::Cyan)),
            Span::raw(" | "),
            Span::styled(
                format!(
                    "lookback: {}y | FRED key: {} | calendar key: {} | {refresh}",
                    self.lookback_years,
                    yes_no(self.settings.has_fred_key()),
                    yes_no(self.settings.has_calendar_key()),
                ),
                Style::default().fg(Color::Gray),
            ),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
            .split(area);
        let right = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(columns[1]);

        self.draw_cards(frame, columns[0]);
        self.draw_chart(frame, right[0]);
        self.draw_calendar(frame, right[1]);
    }

    fn draw_cards(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let items: Vec<ListItem> = self
            .views
            .iter()
            .map(|view| {
                let style = match view.status() {
                    ViewStatus::Ready => Style::default(),
                    ViewStatus::NoData => Style::default().fg(Color::Yellow),
                    ViewStatus::Failed => Style::default().fg(Color::Red),
                };
                ListItem::new(Text::from(vec![
                    Line::from(Span::styled(
                        view.definition.name,
                        Style::default().add_modifier(Modifier::BOLD),
                    )),
                    Line::from(Span::styled(format!("  {}", card_line(view)), style)),
                ]))
            })
            .collect();

        let list = List::new(items)
            .block(Block::default().title("Latest prints").borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let mut state = ListState::default();
        if !self.views.is_empty() {
            state.select(Some(self.selected));
        }
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let Some(view) = self.views.get(self.selected) else {
            let block = Block::default().title("Time series").borders(Borders::ALL);
            frame.render_widget(Paragraph::new("Waiting for data...").block(block), area);
            return;
        };

        let name = view.definition.name;
        let today = Local::now().date_naive();
        let series = view.chart(self.lookback_years, today);
        let caption = match &series {
            Some(s) => chart_caption(name, s),
            None => format!("No data for {name}."),
        };

        let block = Block::default().title(caption).borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let Some(data) = series.as_ref().and_then(ChartData::from_series) else {
            let msg = match &view.error {
                Some(err) => err.to_string(),
                None => "No data.".to_string(),
            };
            frame.render_widget(
                Paragraph::new(msg)
                    .style(Style::default().fg(Color::Yellow))
                    .wrap(Wrap { trim: true }),
                inner,
            );
            return;
        };

        let widget = SeriesChart {
            line: &data.line,
            x_bounds: data.x_bounds,
            y_bounds: data.y_bounds,
            y_label: name,
        };
        frame.render_widget(widget, inner);
    }

    fn draw_calendar(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title("Next up (ET)").borders(Borders::ALL);
        let lines: Vec<Line> = match &self.calendar_panel {
            CalendarPanel::Disabled => vec![Line::from(Span::styled(
                CALENDAR_DISABLED_MESSAGE,
                Style::default().fg(Color::Blue),
            ))],
            CalendarPanel::Failed(err) => vec![Line::from(Span::styled(
                format!("Calendar unavailable: {err}"),
                Style::default().fg(Color::Red),
            ))],
            CalendarPanel::Loaded(events) if events.is_empty() => {
                vec![Line::from(Span::styled("No events returned.", Style::default().fg(Color::Yellow)))]
            }
            CalendarPanel::Loaded(events) => calendar::upcoming(events, Utc::now(), UPCOMING_LIMIT)
                .into_iter()
                .map(event_line)
                .collect(),
        };

        let p = Paragraph::new(Text::from(lines))
            .block(block)
            .wrap(Wrap { trim: true });
        frame.render_widget(p, area);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "↑/↓ select  ←/→ lookback  r reload  c clear cache  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

fn event_line(event: &CalendarEvent) -> Line<'static> {
    let stars = event.importance.map(|i| "*".repeat(i.clamp(0, 3) as usize)).unwrap_or_default();
    let mut detail = format!("{} {}", event.display_time(), event.event);
    if !event.forecast.is_empty() {
        detail.push_str(&format!(" (f {})", event.forecast));
    }
    if !event.actual.is_empty() {
        detail.push_str(&format!(" = {}", event.actual));
    }
    Line::from(vec![
        Span::styled(format!("{stars:<3} "), Style::default().fg(Color::Yellow)),
        Span::raw(detail),
    ])
}

fn yes_no(flag: bool) -> &'static str {
    if flag { "set" } else { "missing" }
}
