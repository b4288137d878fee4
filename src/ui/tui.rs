//! Ratatui interface over the polled leaderboard and detail views.

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use crossterm::{ExecutableCommand, execute};
use ratatui::backend::TestBackend;
use ratatui::prelude::*;
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Bar, BarChart, BarGroup, Block, Borders, Cell, Paragraph, Row, Table, TableState, Wrap,
};
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::api::client::BenchmarkApi;
use crate::config::ClientConfig;
use crate::leaderboard::PipelineDetail;
use crate::leaderboard::chart::bar_height;
use crate::polling::{
    Clock, DetailSnapshot, DetailStatus, LeaderboardSnapshot, SystemClock, ViewHandle,
    spawn_detail, spawn_leaderboard,
};
use crate::ui::components::theme::ThemePalette;
use crate::ui::data::{
    InputMode, LeaderboardRow, MISMATCH_HEADERS, format_pct, last_updated_label,
    leaderboard_rows, mismatch_cells,
};
use crate::ui::shortcuts;

const FRAME_POLL: Duration = Duration::from_millis(100);
const FIRST_LOAD_TIMEOUT: Duration = Duration::from_secs(30);

/// Presentation state that lives outside the polled snapshots.
struct UiState {
    input_mode: InputMode,
    search_buffer: String,
    table: TableState,
    palette: ThemePalette,
    dark: bool,
    show_chart: bool,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            input_mode: InputMode::Browse,
            search_buffer: String::new(),
            table: TableState::default().with_selected(Some(0)),
            palette: ThemePalette::dark(),
            dark: true,
            show_chart: true,
        }
    }
}

impl UiState {
    fn toggle_theme(&mut self) {
        self.dark = !self.dark;
        self.palette = if self.dark {
            ThemePalette::dark()
        } else {
            ThemePalette::light()
        };
    }

    fn clamp_selection(&mut self, len: usize) {
        let selected = match (self.table.selected(), len) {
            (_, 0) => None,
            (Some(i), n) => Some(i.min(n - 1)),
            (None, _) => Some(0),
        };
        self.table.select(selected);
    }

    fn move_selection(&mut self, delta: isize, len: usize) {
        if len == 0 {
            return;
        }
        let current = self.table.selected().unwrap_or(0) as isize;
        let next = (current + delta).clamp(0, len as isize - 1);
        self.table.select(Some(next as usize));
    }
}

/// What a key press asks the loop to do.
#[derive(Debug, PartialEq, Eq)]
enum Action {
    None,
    Quit,
    OpenDetail(String),
    CloseDetail,
}

pub fn footer_legend(in_detail: bool) -> String {
    if in_detail {
        format!(
            "{} back | {} refresh | {} theme",
            shortcuts::DETAIL_CLOSE,
            shortcuts::REFRESH,
            shortcuts::THEME
        )
    } else {
        format!(
            "{} move | {} detail | {} search | {} clear | {} refresh | {} chart | {} theme | {} quit",
            shortcuts::MOVE,
            shortcuts::DETAIL_OPEN,
            shortcuts::FOCUS_SEARCH,
            shortcuts::CLEAR_SEARCH,
            shortcuts::REFRESH,
            shortcuts::TOGGLE_CHART,
            shortcuts::THEME,
            shortcuts::QUIT
        )
    }
}

pub async fn run_tui<A: BenchmarkApi>(api: Arc<A>, config: ClientConfig, once: bool) -> Result<()> {
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    if once
        && std::env::var("TUI_HEADLESS")
            .map(|v| v == "1")
            .unwrap_or(false)
    {
        return run_tui_headless(api, &config, clock).await;
    }

    let board = spawn_leaderboard(Arc::clone(&api), &config, Arc::clone(&clock));
    info!(base_url = %config.base_url, poll_secs = config.poll_interval.as_secs(), "tui_start");

    let mut stdout = io::stdout();
    enable_raw_mode()?;
    stdout.execute(EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = if once {
        draw_once(&mut terminal, &board).await
    } else {
        event_loop(&mut terminal, &api, &board, &clock).await
    };

    let teardown = teardown_terminal();
    if let Err(err) = board.shutdown().await {
        warn!(error = %err, "leaderboard_shutdown_failed");
    }
    result.and(teardown)
}

async fn draw_once<B: Backend>(
    terminal: &mut Terminal<B>,
    board: &ViewHandle<LeaderboardSnapshot>,
) -> Result<()> {
    let snapshot = wait_for_first_load(board).await?;
    let mut ui = UiState::default();
    ui.clamp_selection(snapshot.board.rows.len());
    terminal.draw(|f| render_leaderboard(f, &snapshot, &mut ui))?;
    Ok(())
}

async fn event_loop<B: Backend, A: BenchmarkApi>(
    terminal: &mut Terminal<B>,
    api: &Arc<A>,
    board: &ViewHandle<LeaderboardSnapshot>,
    clock: &Arc<dyn Clock>,
) -> Result<()> {
    let mut ui = UiState::default();
    let mut detail: Option<ViewHandle<DetailSnapshot>> = None;

    loop {
        let board_snap = board.snapshot();
        ui.clamp_selection(board_snap.board.rows.len());
        match &detail {
            Some(handle) => {
                let detail_snap = handle.snapshot();
                terminal.draw(|f| render_detail(f, &detail_snap, ui.palette))?;
            }
            None => {
                terminal.draw(|f| render_leaderboard(f, &board_snap, &mut ui))?;
            }
        }

        let Some(key) = tokio::task::block_in_place(next_key)? else {
            continue;
        };

        let action = match &detail {
            Some(handle) => handle_detail_key(key, handle, &mut ui),
            None => handle_board_key(key, board, &board_snap, &mut ui),
        };
        match action {
            Action::None => {}
            Action::Quit => break,
            Action::OpenDetail(name) => {
                info!(pipeline = %name, "detail_open");
                detail = Some(spawn_detail(Arc::clone(api), name, Arc::clone(clock)));
            }
            Action::CloseDetail => {
                if let Some(handle) = detail.take()
                    && let Err(err) = handle.shutdown().await
                {
                    warn!(error = %err, "detail_shutdown_failed");
                }
            }
        }
    }

    if let Some(handle) = detail.take() {
        handle.shutdown().await?;
    }
    Ok(())
}

fn next_key() -> Result<Option<KeyEvent>> {
    if event::poll(FRAME_POLL)?
        && let Event::Key(key) = event::read()?
        && key.kind == KeyEventKind::Press
    {
        return Ok(Some(key));
    }
    Ok(None)
}

fn handle_board_key(
    key: KeyEvent,
    board: &ViewHandle<LeaderboardSnapshot>,
    snapshot: &LeaderboardSnapshot,
    ui: &mut UiState,
) -> Action {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            KeyCode::Char('c') => return Action::Quit,
            KeyCode::Char('u') => {
                ui.search_buffer.clear();
                board.search("");
                return Action::None;
            }
            _ => {}
        }
    }

    let len = snapshot.board.rows.len();
    match ui.input_mode {
        InputMode::Search => match key.code {
            KeyCode::Esc | KeyCode::Enter => ui.input_mode = InputMode::Browse,
            KeyCode::Backspace => {
                ui.search_buffer.pop();
                board.search(ui.search_buffer.clone());
            }
            KeyCode::Char(c) => {
                ui.search_buffer.push(c);
                board.search(ui.search_buffer.clone());
            }
            _ => {}
        },
        InputMode::Browse => match key.code {
            KeyCode::Char('q') | KeyCode::Esc | KeyCode::F(10) => return Action::Quit,
            KeyCode::Char('/') => ui.input_mode = InputMode::Search,
            KeyCode::Char('r') => board.refresh(),
            KeyCode::Char('c') => ui.show_chart = !ui.show_chart,
            KeyCode::F(2) => ui.toggle_theme(),
            KeyCode::Up | KeyCode::Char('k') => ui.move_selection(-1, len),
            KeyCode::Down | KeyCode::Char('j') => ui.move_selection(1, len),
            KeyCode::PageUp => ui.move_selection(-10, len),
            KeyCode::PageDown => ui.move_selection(10, len),
            KeyCode::Home => ui.table.select((len > 0).then_some(0)),
            KeyCode::End => ui.table.select(len.checked_sub(1)),
            KeyCode::Enter => {
                if let Some(row) = ui.table.selected().and_then(|i| snapshot.board.rows.get(i)) {
                    return Action::OpenDetail(row.name().to_string());
                }
            }
            _ => {}
        },
    }
    Action::None
}

fn handle_detail_key(
    key: KeyEvent,
    detail: &ViewHandle<DetailSnapshot>,
    ui: &mut UiState,
) -> Action {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Action::Quit;
    }
    match key.code {
        KeyCode::Esc | KeyCode::Backspace | KeyCode::Char('q') => Action::CloseDetail,
        KeyCode::Char('r') => {
            detail.refresh();
            Action::None
        }
        KeyCode::F(2) => {
            ui.toggle_theme();
            Action::None
        }
        _ => Action::None,
    }
}

fn render_leaderboard(f: &mut Frame, snap: &LeaderboardSnapshot, ui: &mut UiState) {
    let palette = ui.palette;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(1),
        ])
        .split(f.area());

    f.render_widget(header_block(snap, palette), chunks[0]);

    let search_style = if ui.input_mode == InputMode::Search {
        palette.border_focus_style()
    } else {
        palette.border_style()
    };
    let search = Paragraph::new(ui.search_buffer.as_str()).block(
        Block::default()
            .title(Span::styled("Search pipelines", palette.hint_style()))
            .borders(Borders::ALL)
            .border_style(search_style),
    );
    f.render_widget(search, chunks[1]);

    let body = if ui.show_chart && !snap.board.rows.is_empty() {
        Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(chunks[2])
    } else {
        Layout::default()
            .constraints([Constraint::Min(0)])
            .split(chunks[2])
    };

    if snap.board.rows.is_empty() {
        f.render_widget(empty_board(snap, palette), body[0]);
    } else {
        let rows = leaderboard_rows(&snap.board.rows);
        f.render_stateful_widget(board_table(&rows, palette), body[0], &mut ui.table);
        if body.len() > 1 {
            f.render_widget(accuracy_chart(snap, palette), body[1]);
        }
    }

    f.render_widget(
        Paragraph::new(footer_legend(false)).style(palette.hint_style()),
        chunks[3],
    );
}

fn header_block(snap: &LeaderboardSnapshot, palette: ThemePalette) -> Paragraph<'static> {
    let stats = &snap.board.stats;
    let mut summary = vec![
        Span::styled("Pipeline Leaderboard  ", palette.title()),
        Span::raw(format!("Pipelines: {}  ", stats.count)),
        Span::raw("Mean accuracy: "),
        Span::styled(
            format!("{:.1}%  ", stats.mean_accuracy * 100.0),
            palette.accuracy_style(stats.mean_accuracy),
        ),
        Span::raw("Mean schema: "),
        Span::styled(
            format!("{:.1}%  ", stats.mean_schema_accuracy * 100.0),
            palette.accuracy_style(stats.mean_schema_accuracy),
        ),
        Span::raw(format!("Leader: {}", stats.leading_name)),
    ];
    if snap.is_loading() {
        summary.push(Span::styled("  Loading...", palette.info_style()));
    }

    let status = match &snap.error {
        Some(err) if err.is_retryable() => Line::from(Span::styled(
            format!("{} (press {} to retry)", err.user_message(), shortcuts::REFRESH),
            palette.error_banner(),
        )),
        Some(err) => Line::from(Span::styled(err.user_message(), palette.error_banner())),
        None => Line::from(Span::styled(
            last_updated_label(snap.last_updated),
            palette.hint_style(),
        )),
    };

    Paragraph::new(vec![Line::from(summary), status]).block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(palette.border_style()),
    )
}

fn empty_board(snap: &LeaderboardSnapshot, palette: ThemePalette) -> Paragraph<'static> {
    let text = if snap.board.ranked.is_empty() {
        if snap.is_loading() && snap.last_updated.is_none() {
            "Loading benchmark results...".to_string()
        } else {
            "No benchmark data available".to_string()
        }
    } else {
        format!("No pipelines match \"{}\"", snap.board.query)
    };
    Paragraph::new(text)
        .style(palette.hint_style())
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).border_style(palette.border_style()))
}

fn board_table(rows: &[LeaderboardRow], palette: ThemePalette) -> Table<'static> {
    let header = Row::new(["Rank", "Pipeline", "Accuracy", "Schema", "Tests", "Wrong"])
        .style(palette.title());
    let body: Vec<Row> = rows
        .iter()
        .enumerate()
        .map(|(idx, row)| {
            Row::new(vec![
                Cell::from(row.rank.clone()).style(palette.tier_style(row.tier)),
                Cell::from(row.name.clone()),
                Cell::from(row.accuracy_label.clone()).style(palette.accuracy_style(row.accuracy)),
                Cell::from(row.schema_accuracy_label.clone())
                    .style(palette.accuracy_style(row.schema_accuracy)),
                Cell::from(row.total_tests.clone()),
                Cell::from(row.wrong_matches.clone()),
            ])
            .style(palette.stripe(idx))
        })
        .collect();
    Table::new(
        body,
        [
            Constraint::Length(6),
            Constraint::Min(20),
            Constraint::Length(10),
            Constraint::Length(10),
            Constraint::Length(7),
            Constraint::Length(7),
        ],
    )
    .header(header)
    .row_highlight_style(palette.selected_style())
    .highlight_symbol("> ")
    .block(
        Block::default()
            .title(Span::styled("Rankings", palette.title()))
            .borders(Borders::ALL)
            .border_style(palette.border_style()),
    )
}

fn accuracy_chart(snap: &LeaderboardSnapshot, palette: ThemePalette) -> BarChart<'static> {
    let mut chart = BarChart::default()
        .block(
            Block::default()
                .title(Span::styled("Accuracy / Schema accuracy", palette.title()))
                .borders(Borders::ALL)
                .border_style(palette.border_style()),
        )
        .bar_width(4)
        .bar_gap(1)
        .group_gap(3)
        .max(1000);
    for point in snap.board.chart() {
        let bars = [
            Bar::default()
                .value(bar_height(point.accuracy_pct))
                .text_value(format!("{:.0}", point.accuracy_pct))
                .style(Style::default().fg(palette.accent)),
            Bar::default()
                .value(bar_height(point.schema_accuracy_pct))
                .text_value(format!("{:.0}", point.schema_accuracy_pct))
                .style(Style::default().fg(palette.accent_alt)),
        ];
        chart = chart.data(
            BarGroup::default()
                .label(Line::from(point.name.clone()))
                .bars(&bars),
        );
    }
    chart
}

fn render_detail(f: &mut Frame, snap: &DetailSnapshot, palette: ThemePalette) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(f.area());

    let mut header = vec![Line::from(vec![
        Span::styled(format!("Pipeline: {}", snap.pipeline), palette.title()),
        Span::styled(
            if snap.is_loading() { "  Loading..." } else { "" },
            palette.info_style(),
        ),
    ])];

    match snap.status() {
        DetailStatus::Loading => {
            f.render_widget(Paragraph::new(header), chunks[0]);
            f.render_widget(
                Paragraph::new("Loading pipeline details...").style(palette.hint_style()),
                chunks[1],
            );
        }
        DetailStatus::NoData => {
            f.render_widget(Paragraph::new(header), chunks[0]);
            f.render_widget(
                Paragraph::new(vec![
                    Line::from("No data available for this pipeline."),
                    Line::from(Span::styled(
                        format!("Press {} to go back", shortcuts::DETAIL_CLOSE),
                        palette.hint_style(),
                    )),
                ])
                .alignment(Alignment::Center),
                chunks[1],
            );
        }
        DetailStatus::Failed(err) => {
            header.push(Line::from(Span::styled(
                format!("{} (press {} to retry)", err.user_message(), shortcuts::REFRESH),
                palette.error_banner(),
            )));
            f.render_widget(Paragraph::new(header), chunks[0]);
            if let Some(detail) = &snap.detail {
                render_mismatches(f, chunks[1], detail, palette);
            }
        }
        DetailStatus::Ready(detail) => {
            let record = &detail.record;
            header.push(Line::from(vec![
                Span::raw("Accuracy: "),
                Span::styled(
                    format_pct(record.metrics.accuracy, 2),
                    palette.accuracy_style(record.effective_accuracy()),
                ),
                Span::raw("  Schema accuracy: "),
                Span::styled(
                    format_pct(record.metrics.schema_accuracy, 2),
                    palette.accuracy_style(record.effective_schema_accuracy()),
                ),
                Span::raw(format!(
                    "  Total tests: {}  Wrong matches: {}",
                    record.effective_total_tests(),
                    detail.mismatch_count
                )),
            ]));
            header.push(Line::from(Span::styled(
                last_updated_label(snap.last_updated),
                palette.hint_style(),
            )));
            f.render_widget(Paragraph::new(header), chunks[0]);
            render_mismatches(f, chunks[1], detail, palette);
        }
    }

    f.render_widget(
        Paragraph::new(footer_legend(true)).style(palette.hint_style()),
        chunks[2],
    );
}

fn render_mismatches(f: &mut Frame, area: Rect, detail: &PipelineDetail, palette: ThemePalette) {
    let block = Block::default()
        .title(Span::styled("Wrong matches", palette.title()))
        .borders(Borders::ALL)
        .border_style(palette.border_style());
    if detail.mismatches().is_empty() {
        let message = Paragraph::new(Span::styled(
            "All predictions were correct",
            Style::default().fg(palette.good),
        ))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(block);
        f.render_widget(message, area);
        return;
    }
    let rows: Vec<Row> = detail
        .mismatches()
        .iter()
        .enumerate()
        .map(|(idx, entry)| Row::new(mismatch_cells(entry)).style(palette.stripe(idx)))
        .collect();
    let table = Table::new(
        rows,
        [
            Constraint::Percentage(12),
            Constraint::Percentage(12),
            Constraint::Percentage(10),
            Constraint::Percentage(12),
            Constraint::Percentage(10),
            Constraint::Percentage(8),
            Constraint::Percentage(10),
            Constraint::Percentage(26),
        ],
    )
    .header(Row::new(MISMATCH_HEADERS).style(palette.title()))
    .block(block);
    f.render_widget(table, area);
}

async fn wait_for_first_load(
    board: &ViewHandle<LeaderboardSnapshot>,
) -> Result<LeaderboardSnapshot> {
    let mut rx = board.subscribe();
    let snapshot = tokio::time::timeout(
        FIRST_LOAD_TIMEOUT,
        rx.wait_for(|s| s.last_updated.is_some() || s.error.is_some()),
    )
    .await
    .context("timed out waiting for the first leaderboard fetch")?
    .context("leaderboard view stopped before loading")?
    .clone();
    Ok(snapshot)
}

/// Fetch once, render into an off-screen buffer, and report failures.
async fn run_tui_headless<A: BenchmarkApi>(
    api: Arc<A>,
    config: &ClientConfig,
    clock: Arc<dyn Clock>,
) -> Result<()> {
    let board = spawn_leaderboard(api, config, clock);
    let snapshot = wait_for_first_load(&board).await;
    board.shutdown().await?;
    let snapshot = snapshot?;

    let mut terminal = Terminal::new(TestBackend::new(120, 40))?;
    let mut ui = UiState::default();
    ui.clamp_selection(snapshot.board.rows.len());
    terminal.draw(|f| render_leaderboard(f, &snapshot, &mut ui))?;
    info!(
        pipelines = snapshot.board.stats.count,
        leader = %snapshot.board.stats.leading_name,
        "tui_headless_rendered"
    );

    if let Some(err) = snapshot.error {
        anyhow::bail!(err.user_message());
    }
    Ok(())
}

fn teardown_terminal() -> Result<()> {
    let mut stdout = io::stdout();
    disable_raw_mode()?;
    execute!(stdout, LeaveAlternateScreen)?;
    Ok(())
}
