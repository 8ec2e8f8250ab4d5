use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, MouseButton,
    MouseEvent, MouseEventKind,
};
use crossterm::execute;
use doctor_map::app::App;
use doctor_map::config::AppConfig;
use doctor_map::districts::DistrictTable;
use doctor_map::ui;
use ratatui::DefaultTerminal;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Terminal map of doctors per district
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// TOML file overriding the view, boundary overlay, markers or district table
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// District boundary GeoJSON (FeatureCollection)
    #[arg(long, value_name = "PATH")]
    boundary: Option<PathBuf>,
    /// Skip the boundary overlay
    #[arg(long, action = clap::ArgAction::SetTrue, conflicts_with = "boundary")]
    no_boundary: bool,
    /// Log destination; the terminal itself is taken by the map
    #[arg(long, value_name = "PATH", default_value = "doctor-map.log")]
    log_file: PathBuf,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli)?;

    let mut config = match &cli.config {
        Some(path) => AppConfig::load_from_file(path)?,
        None => AppConfig::default(),
    };
    if let Some(path) = cli.boundary {
        config.boundary.path = path;
        config.boundary.enabled = true;
    }
    if cli.no_boundary {
        config.boundary.enabled = false;
    }
    let table = config.district_table().context("invalid district table")?;

    // Initialize terminal
    let mut terminal = ratatui::init();
    terminal.clear()?;

    // Enable mouse capture
    execute!(std::io::stdout(), EnableMouseCapture)?;

    let result = run(&mut terminal, config, table);

    // Disable mouse capture and restore terminal
    let _ = execute!(std::io::stdout(), DisableMouseCapture);
    ratatui::restore();

    result
}

fn init_tracing(cli: &Cli) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&cli.log_file)
        .with_context(|| format!("Failed to open log file: {:?}", cli.log_file))?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

/// Handle mouse events for hovering, panning and zooming
fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    // Always track mouse position for hover and the cursor marker
    app.set_mouse_pos(mouse.column, mouse.row);

    match mouse.kind {
        // Scroll wheel for zooming towards mouse position
        MouseEventKind::ScrollUp => app.zoom_in_at(mouse.column, mouse.row),
        MouseEventKind::ScrollDown => app.zoom_out_at(mouse.column, mouse.row),
        // Horizontal scroll for panning (trackpad two-finger swipe)
        MouseEventKind::ScrollLeft => app.pan(-15, 0),
        MouseEventKind::ScrollRight => app.pan(15, 0),
        // Click and drag to pan
        MouseEventKind::Down(MouseButton::Left) => {
            app.last_mouse = Some((mouse.column, mouse.row));
        }
        MouseEventKind::Drag(MouseButton::Left) => {
            app.handle_drag(mouse.column, mouse.row);
        }
        MouseEventKind::Up(MouseButton::Left) => {
            app.end_drag();
        }
        _ => {}
    }
}

fn run(terminal: &mut DefaultTerminal, config: AppConfig, table: DistrictTable) -> Result<()> {
    let size = terminal.size()?;
    let mut app = App::new(config, table, size.width, size.height);
    info!(districts = app.summary.districts, doctors = app.summary.doctors, "district map started");

    // Main loop
    loop {
        app.tick();

        // Draw
        terminal.draw(|frame| ui::render(frame, &app))?;

        // Handle events with ~60fps target
        if event::poll(Duration::from_millis(16))? {
            match event::read()? {
                Event::Key(key) => {
                    // Only handle key press events (not release)
                    if key.kind == KeyEventKind::Press {
                        match key.code {
                            KeyCode::Char('q') | KeyCode::Esc => app.quit(),

                            // Pan with hjkl or arrow keys
                            KeyCode::Left | KeyCode::Char('h') => app.pan(-10, 0),
                            KeyCode::Right | KeyCode::Char('l') => app.pan(10, 0),
                            KeyCode::Up | KeyCode::Char('k') => app.pan(0, -8),
                            KeyCode::Down | KeyCode::Char('j') => app.pan(0, 8),

                            // Zoom
                            KeyCode::Char('+') | KeyCode::Char('=') => app.zoom_in(),
                            KeyCode::Char('-') | KeyCode::Char('_') => app.zoom_out(),

                            // Layer toggles
                            KeyCode::Char('b') | KeyCode::Char('B') => {
                                if let Some(instance) = app.host.instance_mut() {
                                    instance.renderer.toggle_boundaries();
                                }
                            }
                            KeyCode::Char('m') | KeyCode::Char('M') => {
                                if let Some(instance) = app.host.instance_mut() {
                                    instance.renderer.toggle_markers();
                                }
                            }
                            KeyCode::Char('n') | KeyCode::Char('N') => {
                                if let Some(instance) = app.host.instance_mut() {
                                    instance.renderer.toggle_names();
                                }
                            }

                            // Reset view: dispose and remount
                            KeyCode::Char('r') | KeyCode::Char('0') => app.reset(),

                            _ => {}
                        }
                    }
                }
                Event::Mouse(mouse) => {
                    handle_mouse(&mut app, mouse);
                }
                Event::Resize(width, height) => {
                    app.resize(width, height);
                }
                _ => {}
            }
        }

        if app.should_quit {
            break;
        }
    }

    info!("district map closed");
    Ok(())
}
