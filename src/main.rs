use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame, Terminal,
};
use std::{
    fs::File,
    io::{stdout, Stdout},
    time::Instant,
};

use blockfall::{config::Config, Game, GameStatus, Intent, Snapshot, TetrominoKind};

// ============================================================================
// Visual Constants
// ============================================================================

const CELL_WIDTH: u16 = 2;
const BLOCK_CHAR: &str = "██";
const EMPTY_CHAR: &str = " ·";
const INFO_WIDTH: u16 = 16;

// ============================================================================
// Color Mapping
// ============================================================================

fn kind_color(kind: TetrominoKind) -> Color {
    match kind {
        TetrominoKind::O => Color::Yellow,
        TetrominoKind::T => Color::Magenta,
        TetrominoKind::S => Color::Green,
        TetrominoKind::Z => Color::Cyan,
        TetrominoKind::I => Color::Rgb(255, 165, 0),
        TetrominoKind::L => Color::Blue,
        TetrominoKind::J => Color::Red,
    }
}

// ============================================================================
// Input Mapping
// ============================================================================

fn intent_for(code: KeyCode) -> Option<Intent> {
    match code {
        KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') => Some(Intent::MoveLeft),
        KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') => Some(Intent::MoveRight),
        KeyCode::Down | KeyCode::Char('s') | KeyCode::Char('S') => Some(Intent::SoftDrop),
        KeyCode::Up | KeyCode::Char('w') | KeyCode::Char('W') => Some(Intent::Rotate),
        _ => None,
    }
}

// ============================================================================
// Rendering
// ============================================================================

fn render(frame: &mut Frame, game: &Game) {
    let area = frame.size();
    let snapshot = game.snapshot();

    render_game(frame, game, &snapshot, area);
    if snapshot.status == GameStatus::GameOver {
        render_game_over(frame, area);
    }
}

fn render_game(frame: &mut Frame, game: &Game, snapshot: &Snapshot, area: Rect) {
    let grid_display_width = (snapshot.width() as u16 * CELL_WIDTH) + 2;
    let grid_display_height = snapshot.height() as u16 + 2;
    let total_width = grid_display_width + INFO_WIDTH + 2;
    let total_height = grid_display_height + 2;

    let main_area = centered_rect(total_width, total_height, area);

    let vertical = Layout::vertical([
        Constraint::Length(grid_display_height),
        Constraint::Fill(1),
    ])
    .split(main_area);

    let game_row = vertical[0];

    // Layout: [Grid][Info]
    let horizontal = Layout::horizontal([
        Constraint::Length(grid_display_width),
        Constraint::Length(INFO_WIDTH),
    ])
    .split(game_row);

    render_grid(frame, game, horizontal[0]);
    render_info(frame, snapshot, horizontal[1]);

    let controls_area = Rect {
        x: area.x,
        y: game_row.y + game_row.height,
        width: area.width,
        height: 2,
    };

    if controls_area.y + 1 < area.height {
        let controls = Paragraph::new(vec![Line::from(
            "←→/AD: Move | ↓/S: Drop | ↑/W: Rotate | Q/ESC: Quit",
        )])
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(controls, controls_area);
    }
}

fn render_grid(frame: &mut Frame, game: &Game, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Blockfall ")
        .title_alignment(Alignment::Center);

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let lines: Vec<Line> = game
        .render_grid()
        .iter()
        .map(|row| {
            let spans: Vec<Span> = row
                .iter()
                .map(|&code| match TetrominoKind::from_code(code) {
                    Some(kind) => Span::styled(BLOCK_CHAR, Style::default().fg(kind_color(kind))),
                    None => Span::styled(EMPTY_CHAR, Style::default().fg(Color::DarkGray)),
                })
                .collect();
            Line::from(spans)
        })
        .collect();

    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_info(frame: &mut Frame, snapshot: &Snapshot, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Info ")
        .title_alignment(Alignment::Center);

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let (piece, color) = match snapshot.active {
        Some(active) => (format!("{:?}", active.kind()), kind_color(active.kind())),
        None => ("-".to_string(), Color::DarkGray),
    };
    let status = match snapshot.status {
        GameStatus::Running => Span::styled("Running", Style::default().fg(Color::Green)),
        GameStatus::GameOver => Span::styled("Game Over", Style::default().fg(Color::Red)),
    };

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled("Piece", Style::default().fg(Color::Yellow))),
        Line::from(Span::styled(piece, Style::default().fg(color))),
        Line::from(""),
        Line::from(Span::styled("Status", Style::default().fg(Color::Cyan))),
        Line::from(status),
        Line::from(""),
        Line::from(Span::styled("Filled", Style::default().fg(Color::Green))),
        Line::from(format!("{}", snapshot.grid.total_filled_cells())),
    ];

    let paragraph = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(paragraph, inner);
}

fn render_game_over(frame: &mut Frame, area: Rect) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled("Game Over!", Style::default().fg(Color::Red))),
        Line::from(""),
        Line::from(Span::styled(
            "Press R for a new game",
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(Span::styled(
            "Press ESC to quit",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let paragraph = Paragraph::new(text).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Game Over ")
            .title_alignment(Alignment::Center)
            .style(Style::default().bg(Color::Black)),
    );

    let popup_area = centered_rect(26, 8, area);
    frame.render_widget(paragraph, popup_area);
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let horizontal = Layout::horizontal([
        Constraint::Fill(1),
        Constraint::Length(width.min(area.width)),
        Constraint::Fill(1),
    ])
    .split(area);

    let vertical = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(height.min(area.height)),
        Constraint::Fill(1),
    ])
    .split(horizontal[1]);

    vertical[1]
}

// ============================================================================
// Main Loop
// ============================================================================

fn init_logging(config: &Config) -> Result<()> {
    let Some(path) = &config.log_file else {
        return Ok(());
    };
    let file = File::create(path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .try_init()
        .context("failed to install logger")?;
    Ok(())
}

fn run(terminal: &mut Terminal<CrosstermBackend<Stdout>>, config: &Config) -> Result<()> {
    let mut game = config.new_game()?;
    let tick_duration = config.tick_interval();
    let mut last_tick = Instant::now();
    let mut dirty = true;

    loop {
        if dirty {
            terminal.draw(|frame| render(frame, &game))?;
            dirty = false;
        }

        let timeout = tick_duration.saturating_sub(last_tick.elapsed());

        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                    KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => break,
                    KeyCode::Char('r') | KeyCode::Char('R') if game.is_game_over() => {
                        game.new_session()?;
                        last_tick = Instant::now();
                    }
                    code => {
                        if let Some(intent) = intent_for(code) {
                            game.apply(intent)?;
                        }
                    }
                },
                Event::Resize(_, _) => dirty = true,
                _ => {}
            }
        }

        // Gravity only runs while the session does
        if game.status() == GameStatus::Running && last_tick.elapsed() >= tick_duration {
            game.apply(Intent::Tick)?;
            last_tick = Instant::now();
        }

        if !game.take_events().is_empty() {
            dirty = true;
        }
    }

    Ok(())
}

fn main() -> Result<()> {
    let config = Config::parse();
    init_logging(&config)?;

    enable_raw_mode().context("failed to enable raw mode")?;
    stdout()
        .execute(EnterAlternateScreen)
        .context("failed to enter alternate screen")?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let result = run(&mut terminal, &config);

    // Always restore the terminal, even if the session failed
    let _ = disable_raw_mode();
    let _ = stdout().execute(LeaveAlternateScreen);

    result
}
