use anyhow::{Context, Result};
use clap::Parser;
use covid_map::app::{App, Tab, WEEK};
use covid_map::config::{Config, LoggingConfig};
use covid_map::data::load_dataset;
use covid_map::map::ColorScale;
use covid_map::temporal::TemporalIndex;
use covid_map::ui;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind, MouseButton,
    MouseEvent, MouseEventKind,
};
use crossterm::execute;
use ratatui::DefaultTerminal;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "covid-map")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "COVID-19 positive rate by US state, day by day, in the terminal")]
struct Cli {
    /// TOML configuration file (defaults to ./covid-map.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory holding the boundary GeoJSON and the CSV tables
    #[arg(short, long)]
    data_dir: Option<String>,

    /// Write logs here instead of the configured file
    #[arg(long)]
    log_file: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = Config::load_or_default(cli.config.as_deref())?;
    if let Some(dir) = cli.data_dir {
        config.data.dir = dir;
    }
    if let Some(file) = cli.log_file {
        config.logging.file = Some(file);
    }
    init_logging(&config.logging)?;

    tracing::info!("covid-map v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Data directory: {}", config.data.dir);

    // Everything is loaded before the terminal is taken over so failures print normally
    let (start, end) = config.dates.range()?;
    let dates = TemporalIndex::build(start, end)?;
    let dataset = load_dataset(&config.data).with_context(|| format!("loading data from {}", config.data.dir))?;
    let scale = config.map.color_scale();

    // Initialize terminal
    let mut terminal = ratatui::init();
    terminal.clear()?;
    execute!(std::io::stdout(), EnableMouseCapture)?;

    let result = run(&mut terminal, dataset, dates, scale);

    let _ = execute!(std::io::stdout(), DisableMouseCapture);
    ratatui::restore();

    if let Err(ref e) = result {
        tracing::error!("{e:#}");
    }
    result
}

/// Logs go to a file or nowhere: the terminal belongs to the UI
fn init_logging(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::new(std::env::var("RUST_LOG").unwrap_or_else(|_| config.level.clone()));
    let registry = tracing_subscriber::registry().with(filter);

    match &config.file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("opening log file {path}"))?;
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_ansi(false)
                        .with_writer(Mutex::new(file)),
                )
                .init();
        }
        None => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::sink))
            .init(),
    }
    Ok(())
}

fn run(
    terminal: &mut DefaultTerminal,
    dataset: covid_map::data::Dataset,
    dates: TemporalIndex,
    scale: ColorScale,
) -> Result<()> {
    let size = terminal.size()?;
    let mut app = App::new(dataset, dates, scale, size.width, size.height);

    loop {
        terminal.draw(|frame| ui::render(frame, &app))?;

        if event::poll(Duration::from_millis(16))? {
            match event::read()? {
                // Only handle key press events (not release)
                Event::Key(key) if key.kind == KeyEventKind::Press => handle_key(&mut app, key),
                Event::Mouse(mouse) => handle_mouse(&mut app, mouse),
                Event::Resize(width, height) => app.resize(width, height),
                _ => {}
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.quit(),

        KeyCode::Char('1') => app.select_tab(Tab::Map),
        KeyCode::Char('2') => app.select_tab(Tab::Exploratory),
        KeyCode::Char('3') => app.select_tab(Tab::WhatIf),
        KeyCode::Tab => app.next_tab(),

        _ if app.tab == Tab::WhatIf => handle_whatif_key(app, key.code),
        _ => handle_map_key(app, key.code),
    }
}

fn handle_map_key(app: &mut App, code: KeyCode) {
    match code {
        // Time slider
        KeyCode::Left | KeyCode::Char('h') => app.step_date(-1),
        KeyCode::Right | KeyCode::Char('l') => app.step_date(1),
        KeyCode::PageUp => app.step_date(-WEEK),
        KeyCode::PageDown => app.step_date(WEEK),
        KeyCode::Home => app.first_date(),
        KeyCode::End => app.last_date(),

        // Pan with wasd
        KeyCode::Char('a') => app.pan(-10, 0),
        KeyCode::Char('d') => app.pan(10, 0),
        KeyCode::Char('w') => app.pan(0, -8),
        KeyCode::Char('s') => app.pan(0, 8),

        // Zoom
        KeyCode::Char('+') | KeyCode::Char('=') => app.zoom_in(),
        KeyCode::Char('-') | KeyCode::Char('_') => app.zoom_out(),

        // Reset view
        KeyCode::Char('r') | KeyCode::Char('0') => app.reset_view(),

        _ => {}
    }
}

fn handle_whatif_key(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Up | KeyCode::Down => app.whatif.toggle_focus(),
        KeyCode::Left => app.whatif.adjust(-1.0),
        KeyCode::Right => app.whatif.adjust(1.0),
        KeyCode::Char('r') => app.whatif.reset(),
        _ => {}
    }
}

/// Hover on move, wheel to zoom, drag to pan
fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    match mouse.kind {
        MouseEventKind::Moved => app.hover_at(mouse.column, mouse.row),
        MouseEventKind::ScrollUp if app.tab == Tab::Map => app.zoom_in_at(mouse.column, mouse.row),
        MouseEventKind::ScrollDown if app.tab == Tab::Map => app.zoom_out_at(mouse.column, mouse.row),
        MouseEventKind::Down(MouseButton::Left) => {
            app.last_mouse = Some((mouse.column, mouse.row));
        }
        MouseEventKind::Drag(MouseButton::Left) if app.tab == Tab::Map => {
            app.handle_drag(mouse.column, mouse.row);
        }
        MouseEventKind::Up(MouseButton::Left) => app.end_drag(),
        _ => {}
    }
}
