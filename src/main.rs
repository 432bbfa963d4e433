use std::io;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
};
use crossterm::execute;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use xp_terminal::config::Config;
use xp_terminal::leaderboard::{RankDelta, participant_count_label};
use xp_terminal::provider::spawn_provider;
use xp_terminal::state::{AppState, BoardView, Delta, ProviderCommand, apply_delta};

struct App {
    state: AppState,
    chain: String,
    compare_label: String,
    should_quit: bool,
    cmd_tx: mpsc::Sender<ProviderCommand>,
    poll_interval: Duration,
    last_refresh: Instant,
}

impl App {
    fn new(config: &Config, cmd_tx: mpsc::Sender<ProviderCommand>) -> Self {
        Self {
            state: AppState::new(config.focal_wallet.clone(), config.window),
            chain: config.chain.clone(),
            compare_label: format!("{}h", config.compare_hours),
            should_quit: false,
            cmd_tx,
            poll_interval: config.poll_interval,
            last_refresh: Instant::now(),
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('r') | KeyCode::Char('R') => self.request_refresh(true),
            KeyCode::Char('?') => self.state.help_overlay = !self.state.help_overlay,
            KeyCode::Esc => self.state.help_overlay = false,
            _ => {}
        }
    }

    fn request_refresh(&mut self, announce: bool) {
        let generation = self.state.begin_refresh();
        if self
            .cmd_tx
            .send(ProviderCommand::Refresh { generation })
            .is_err()
        {
            self.state.refreshing = false;
            self.state.push_log("[WARN] Refresh request failed");
        } else if announce {
            self.state
                .push_log(format!("[INFO] Refresh #{generation} requested"));
        }
        self.last_refresh = Instant::now();
    }

    fn maybe_auto_refresh(&mut self) {
        if self.last_refresh.elapsed() >= self.poll_interval {
            self.request_refresh(false);
        }
    }

    fn request_handles(&mut self) {
        let participant_ids = self.state.take_unrequested_handles();
        if participant_ids.is_empty() {
            return;
        }
        if self
            .cmd_tx
            .send(ProviderCommand::ResolveHandles { participant_ids })
            .is_err()
        {
            self.state.push_log("[WARN] Handle request failed");
        }
    }
}

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
    let config = Config::from_env();

    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)
        .context("failed to enter alternate screen")?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend).context("failed to create terminal")?;

    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    spawn_provider(config.clone(), tx, cmd_rx);

    let mut app = App::new(&config, cmd_tx);
    app.request_refresh(false);
    let res = run_app(&mut terminal, &mut app, rx);

    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )
    .context("failed to leave alternate screen")?;
    terminal.show_cursor().context("failed to restore cursor")?;

    res
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    rx: mpsc::Receiver<Delta>,
) -> Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        while let Ok(delta) = rx.try_recv() {
            apply_delta(&mut app.state, delta);
        }

        app.maybe_auto_refresh();
        app.request_handles();

        terminal
            .draw(|f| ui(f, app))
            .context("failed to draw frame")?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout).context("failed to poll terminal events")? {
            if let Event::Key(key) = event::read().context("failed to read terminal event")? {
                if key.kind == KeyEventKind::Press {
                    app.on_key(key);
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(5),
            Constraint::Length(1),
        ])
        .split(frame.size());

    let header = Paragraph::new(header_text(app))
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    let state = &app.state;
    match state.view() {
        BoardView::Loading => render_message(frame, chunks[1], "Loading...", Color::DarkGray),
        BoardView::Error => {
            let msg = state
                .last_error
                .as_deref()
                .map(|err| format!("Failed to load leaderboard data\n\n{err}"))
                .unwrap_or_else(|| "Failed to load leaderboard data".to_string());
            render_message(frame, chunks[1], &msg, Color::Red);
        }
        BoardView::NoPoints => render_no_points(frame, chunks[1]),
        BoardView::Empty => render_message(
            frame,
            chunks[1],
            "No leaderboard data available",
            Color::DarkGray,
        ),
        BoardView::Board => render_board(frame, chunks[1], state, &app.compare_label),
    }

    let console = Paragraph::new(console_text(state))
        .block(Block::default().title("Console").borders(Borders::ALL));
    frame.render_widget(console, chunks[2]);

    let footer = Paragraph::new("r Refresh | ? Help | q Quit")
        .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(footer, chunks[3]);

    if state.help_overlay {
        render_help_overlay(frame, frame.size(), &app.compare_label);
    }
}

fn header_text(app: &App) -> String {
    let state = &app.state;
    let mut title = format!("XP LEADERBOARD | {}", app.chain);
    if state.loaded {
        title.push_str(&format!(" | {}", participant_count_label(state.entries.len())));
    }
    if let Some(rank) = state.focal_rank() {
        title.push_str(&format!(" | You: #{rank}"));
    }
    let status = if state.refreshing {
        "refreshing...".to_string()
    } else if let Some(updated) = state.last_updated {
        format!("updated {}", updated.format("%H:%M:%S"))
    } else {
        String::new()
    };
    format!("  *  {title}\n     {status}")
}

fn render_message(frame: &mut Frame, area: Rect, text: &str, color: Color) {
    let paragraph = Paragraph::new(text.to_string())
        .alignment(Alignment::Center)
        .style(Style::default().fg(color))
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

fn render_no_points(frame: &mut Frame, area: Rect) {
    let text = [
        "No Points Yet",
        "",
        "You haven't earned any points yet. Start your journey to the top of the leaderboard!",
        "",
        "How to earn points:",
        "  Complete Quests      Embark on quests to earn points and rewards.",
        "  Win Battles          Challenge other players and climb the ranks.",
        "  Weekly Challenges    Join special events for bonus points.",
        "",
        "Press r to refresh once you've started.",
    ]
    .join("\n");
    let paragraph = Paragraph::new(text)
        .block(Block::default().title("Welcome to the Leaderboard!").borders(Borders::ALL))
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn board_columns() -> [Constraint; 5] {
    [
        Constraint::Length(7),
        Constraint::Min(20),
        Constraint::Length(6),
        Constraint::Length(6),
        Constraint::Length(16),
    ]
}

fn render_board(frame: &mut Frame, area: Rect, state: &AppState, compare_label: &str) {
    let block = Block::default().title("Leaderboard").borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let banner_height = if state.last_error.is_some() { 1 } else { 0 };
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(banner_height),
            Constraint::Length(1),
            Constraint::Min(1),
        ])
        .split(inner);

    if let Some(err) = state.last_error.as_deref() {
        let banner = Paragraph::new(format!("Refresh failed, showing last data: {err}"))
            .style(Style::default().fg(Color::Red));
        frame.render_widget(banner, sections[0]);
    }

    let widths = board_columns();
    render_board_header(frame, sections[1], &widths, compare_label);

    let list_area = sections[2];
    let first_rank = state.visible_first_rank();
    let dim = state.refreshing;
    for (i, entry) in state.visible_entries().iter().enumerate() {
        if i as u16 >= list_area.height {
            break;
        }
        let row_area = Rect {
            x: list_area.x,
            y: list_area.y + i as u16,
            width: list_area.width,
            height: 1,
        };

        let focal = state.is_focal(entry);
        let mut row_style = if focal {
            Style::default().fg(Color::White).bg(Color::Magenta)
        } else {
            Style::default()
        };
        if dim {
            row_style = row_style.add_modifier(Modifier::DIM);
        }
        if focal {
            frame.render_widget(Block::default().style(row_style), row_area);
        }

        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(widths)
            .split(row_area);

        let rank = format!("#{}", first_rank + i);
        let handle = state.display_handle(entry);
        let you = if focal { "(You)" } else { "" };
        let change = entry
            .rank_delta
            .map(|d| d.to_string())
            .unwrap_or_default();
        let xp = format!("{} XP", entry.score);

        render_cell_text(frame, cols[0], &rank, row_style.fg(Color::Magenta));
        render_cell_text(frame, cols[1], &handle, row_style);
        render_cell_text(frame, cols[2], you, row_style.fg(Color::Gray));
        render_cell_text(
            frame,
            cols[3],
            &change,
            row_style.fg(delta_color(entry.rank_delta)),
        );
        render_cell_text(frame, cols[4], &xp, row_style.fg(Color::Magenta));
    }
}

fn render_board_header(frame: &mut Frame, area: Rect, widths: &[Constraint], compare_label: &str) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(widths)
        .split(area);
    let style = Style::default().add_modifier(Modifier::BOLD);

    render_cell_text(frame, cols[0], "Rank", style);
    render_cell_text(frame, cols[1], "Player", style);
    render_cell_text(frame, cols[3], compare_label, style);
    render_cell_text(frame, cols[4], "XP", style);
}

fn render_cell_text(frame: &mut Frame, area: Rect, text: &str, style: Style) {
    let paragraph = Paragraph::new(text.to_string()).style(style);
    frame.render_widget(paragraph, area);
}

fn delta_color(delta: Option<RankDelta>) -> Color {
    match delta {
        Some(RankDelta::New) => Color::Cyan,
        Some(RankDelta::Moved(d)) if d > 0 => Color::Green,
        Some(RankDelta::Moved(d)) if d < 0 => Color::Red,
        _ => Color::DarkGray,
    }
}

fn console_text(state: &AppState) -> String {
    if state.logs.is_empty() {
        return "No alerts yet".to_string();
    }
    let start = state.logs.len().saturating_sub(3);
    state
        .logs
        .iter()
        .skip(start)
        .cloned()
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_help_overlay(frame: &mut Frame, area: Rect, compare_label: &str) {
    let popup_area = centered_rect(60, 50, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "XP Terminal - Help".to_string(),
        String::new(),
        "  r            Refresh now".to_string(),
        "  ?            Toggle help".to_string(),
        "  Esc          Close help".to_string(),
        "  q            Quit".to_string(),
        String::new(),
        "Change column: ▲ climbed, ▼ dropped, NEW first appearance".to_string(),
        format!("compared with the leaderboard as it stood {compare_label} ago."),
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .style(Style::default());
    frame.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}
