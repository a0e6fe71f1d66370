use std::fs::File;
use std::io::{self, stdout};
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use log::{debug, info};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame, Terminal,
};

use tetris_engine::config::{
    EngineConfig, DEFAULT_GRAVITY_BASE_MS, DEFAULT_HEIGHT, DEFAULT_PREVIEW_COUNT, DEFAULT_WIDTH,
};
use tetris_engine::{Cell, Command, Game, Shape};

// ============================================================================
// CLI
// ============================================================================

#[derive(Debug, Parser)]
#[command(name = "tetris")]
#[command(about = "Terminal Tetris")]
struct Cli {
    #[arg(long, default_value_t = DEFAULT_WIDTH)]
    width: usize,
    #[arg(long, default_value_t = DEFAULT_HEIGHT)]
    height: usize,
    /// Number of upcoming pieces shown
    #[arg(long, default_value_t = DEFAULT_PREVIEW_COUNT)]
    preview: usize,
    /// Gravity interval at level 1, in milliseconds
    #[arg(long, default_value_t = DEFAULT_GRAVITY_BASE_MS)]
    gravity_ms: u64,
    /// Seed for a reproducible piece sequence
    #[arg(long)]
    seed: Option<u64>,
    /// Write log output here (the terminal is taken by the game)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

impl Cli {
    fn engine_config(&self) -> EngineConfig {
        let defaults = EngineConfig::default();
        EngineConfig {
            width: self.width,
            height: self.height,
            preview_count: self.preview,
            gravity_base_ms: self.gravity_ms,
            gravity_min_ms: defaults.gravity_min_ms.min(self.gravity_ms),
            seed: self.seed,
            ..defaults
        }
    }
}

fn init_logging(log_file: Option<&PathBuf>) -> Result<()> {
    let mut builder = match log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("creating log file {}", path.display()))?;
            let mut builder =
                env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug"));
            builder.target(env_logger::Target::Pipe(Box::new(file)));
            builder
        }
        None => env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("off")),
    };
    builder.try_init().context("initialising logger")?;
    Ok(())
}

// ============================================================================
// Visual Constants
// ============================================================================

const CELL_WIDTH: u16 = 2;
const BLOCK_CHAR: &str = "██";
const EMPTY_CHAR: &str = "  ";

// ============================================================================
// Color Mapping
// ============================================================================

fn shape_color(shape: Shape) -> Color {
    match shape {
        Shape::I => Color::Cyan,
        Shape::O => Color::Yellow,
        Shape::T => Color::Magenta,
        Shape::S => Color::Green,
        Shape::Z => Color::Red,
        Shape::J => Color::Blue,
        Shape::L => Color::Rgb(255, 165, 0),
    }
}

// ============================================================================
// Rendering
// ============================================================================

fn render(frame: &mut Frame, game: &Game, paused: bool) {
    let area = frame.size();

    render_game(frame, game, area);
    if game.is_game_over() {
        render_game_over(frame, game, area);
    } else if paused {
        render_paused(frame, area);
    }
}

fn render_game(frame: &mut Frame, game: &Game, area: Rect) {
    let grid = game.grid();
    let grid_display_width = (grid.width() as u16 * CELL_WIDTH) + 2;
    let grid_display_height = grid.height() as u16 + 2;
    let preview_width = 12;
    let info_width = 14;
    let total_width = grid_display_width + preview_width + info_width + 4;
    let total_height = grid_display_height + 3;

    let main_area = centered_rect(total_width, total_height, area);

    let vertical = Layout::vertical([
        Constraint::Length(grid_display_height),
        Constraint::Fill(1),
    ])
    .split(main_area);

    let game_row = vertical[0];

    // Layout: [Grid][Preview][Info]
    let horizontal = Layout::horizontal([
        Constraint::Length(grid_display_width),
        Constraint::Length(preview_width),
        Constraint::Length(info_width),
    ])
    .split(game_row);

    render_grid(frame, game, horizontal[0]);
    render_preview(frame, game, horizontal[1]);
    render_info(frame, game, horizontal[2]);

    let controls_area = Rect {
        x: area.x,
        y: game_row.y + game_row.height,
        width: area.width,
        height: 2,
    };

    if controls_area.y + 1 < area.height {
        let controls = Paragraph::new(vec![Line::from(
            "←→/AD: Move | ↓/S: Drop | ↑/W: Rotate | Space: Hard drop | P: Pause | Q/ESC: Quit",
        )])
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(controls, controls_area);
    }
}

fn render_grid(frame: &mut Frame, game: &Game, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Tetris ")
        .title_alignment(Alignment::Center);

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let lines: Vec<Line> = game
        .render_grid()
        .iter()
        .map(|row| {
            let spans: Vec<Span> = row
                .iter()
                .map(|cell| match cell {
                    Cell::Empty => Span::raw(EMPTY_CHAR),
                    Cell::Filled(shape) => {
                        Span::styled(BLOCK_CHAR, Style::default().fg(shape_color(*shape)))
                    }
                })
                .collect();
            Line::from(spans)
        })
        .collect();

    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_preview(frame: &mut Frame, game: &Game, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Next ")
        .title_alignment(Alignment::Center);

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut lines: Vec<Line> = Vec::new();

    for (i, shape) in game.preview().enumerate() {
        if i > 0 {
            lines.push(Line::from(""));
        }

        let offsets = shape.offsets(0);
        let color = shape_color(shape);

        // Bounding box of the spawn state
        let min_row = offsets.iter().map(|&(r, _)| r).min().unwrap_or(0);
        let max_row = offsets.iter().map(|&(r, _)| r).max().unwrap_or(0);
        let min_col = offsets.iter().map(|&(_, c)| c).min().unwrap_or(0);
        let max_col = offsets.iter().map(|&(_, c)| c).max().unwrap_or(0);

        for row in min_row..=max_row {
            let mut spans: Vec<Span> = vec![Span::raw(" ")];
            for col in min_col..=max_col {
                if offsets.contains(&(row, col)) {
                    spans.push(Span::styled(BLOCK_CHAR, Style::default().fg(color)));
                } else {
                    spans.push(Span::raw(EMPTY_CHAR));
                }
            }
            lines.push(Line::from(spans));
        }
    }

    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_info(frame: &mut Frame, game: &Game, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Info ")
        .title_alignment(Alignment::Center);

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled("Score", Style::default().fg(Color::Yellow))),
        Line::from(format!("{}", game.score())),
        Line::from(""),
        Line::from(Span::styled("Lines", Style::default().fg(Color::Cyan))),
        Line::from(format!("{}", game.lines_cleared())),
        Line::from(""),
        Line::from(Span::styled("Level", Style::default().fg(Color::Green))),
        Line::from(format!("{}", game.level())),
    ];

    let paragraph = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(paragraph, inner);
}

fn render_game_over(frame: &mut Frame, game: &Game, area: Rect) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled("GAME OVER", Style::default().fg(Color::Red))),
        Line::from(""),
        Line::from(format!("Score: {}", game.score())),
        Line::from(format!("Lines: {}", game.lines_cleared())),
        Line::from(format!("Level: {}", game.level())),
        Line::from(""),
        Line::from(Span::styled(
            "R: restart | ESC: quit",
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

    let popup_area = centered_rect(26, 12, area);
    frame.render_widget(paragraph, popup_area);
}

fn render_paused(frame: &mut Frame, area: Rect) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled("PAUSED", Style::default().fg(Color::Yellow))),
        Line::from(""),
        Line::from(Span::styled(
            "Press P to continue",
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
            .title(" Paused ")
            .title_alignment(Alignment::Center)
            .style(Style::default().bg(Color::Black)),
    );

    let popup_area = centered_rect(24, 10, area);
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
// Input
// ============================================================================

fn key_command(code: KeyCode) -> Option<Command> {
    match code {
        KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') => Some(Command::MoveLeft),
        KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') => Some(Command::MoveRight),
        KeyCode::Down | KeyCode::Char('s') | KeyCode::Char('S') => Some(Command::SoftDrop),
        KeyCode::Up | KeyCode::Char('w') | KeyCode::Char('W') => Some(Command::Rotate),
        KeyCode::Char(' ') => Some(Command::HardDrop),
        _ => None,
    }
}

fn log_events(game: &mut Game) {
    for event in game.take_events() {
        debug!("{event:?}");
    }
}

// ============================================================================
// Main Loop
// ============================================================================

fn run(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, game: &mut Game) -> Result<()> {
    let mut paused = false;
    let mut last_tick = Instant::now();
    game.start();

    loop {
        terminal.draw(|frame| render(frame, game, paused))?;

        let tick_duration = game.gravity_interval();
        let timeout = tick_duration.saturating_sub(last_tick.elapsed());

        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => break,
                        KeyCode::Char('p') | KeyCode::Char('P') if !game.is_game_over() => {
                            paused = !paused;
                            info!("{}", if paused { "paused" } else { "resumed" });
                        }
                        KeyCode::Char('r') | KeyCode::Char('R') if game.is_game_over() => {
                            game.restart();
                            last_tick = Instant::now();
                        }
                        code if !paused => {
                            if let Some(command) = key_command(code) {
                                game.command(command);
                            }
                        }
                        _ => {}
                    }
                }
            }
        }

        // Pausing just stops gravity.
        if last_tick.elapsed() >= tick_duration {
            if !paused {
                game.tick();
            }
            last_tick = Instant::now();
        }

        log_events(game);
    }

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_file.as_ref())?;

    let config = cli.engine_config();
    let mut game = Game::new(config.clone()).context("invalid game configuration")?;
    info!(
        "starting {}x{} game, preview {}, seed {:?}",
        config.width, config.height, config.preview_count, config.seed
    );

    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout());
    let mut terminal = Terminal::new(backend)?;

    let result = run(&mut terminal, &mut game);

    // Always restore the terminal, even when the loop failed.
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    info!("final score {} after {} lines", game.score(), game.lines_cleared());
    result
}
