//! imview TUI - terminal layer browser
//!
//! Loads the image files given on the command line as layers and lets the
//! user toggle their visibility and take screenshots.

mod app;
mod keybindings;
mod views;
mod widgets;

use std::io;
use std::path::PathBuf;

use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing_subscriber::EnvFilter;

use imview_core::ViewerConfig;

use app::App;

#[derive(Parser, Debug)]
#[command(name = "imview", version, about = "Browse image layers in the terminal")]
struct Cli {
    /// Image files (.npy, .npz) to load as layers
    #[arg(value_name = "FILE")]
    paths: Vec<PathBuf>,

    /// Configuration file (TOML or JSON)
    #[arg(long, env = "IMVIEW_CONFIG")]
    config: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Log to a file so the terminal stays clean
    init_logging()?;

    let config = load_config(cli.config);
    let mut app = App::new(config);
    app.load(&cli.paths)?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("Error: {err:?}");
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| app.render(f))?;

        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press && app.handle_key(key.code) {
                return Ok(());
            }
        }
    }
}

fn init_logging() -> io::Result<()> {
    let path = std::env::temp_dir().join("imview.log");
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::sync::Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

/// `--config` (or `$IMVIEW_CONFIG`), then `<config_dir>/imview/config.toml`
fn config_path(explicit: Option<PathBuf>) -> Option<PathBuf> {
    if explicit.is_some() {
        return explicit;
    }
    let path = dirs::config_dir()?.join("imview").join("config.toml");
    path.exists().then_some(path)
}

fn load_config(explicit: Option<PathBuf>) -> ViewerConfig {
    let Some(path) = config_path(explicit) else {
        return ViewerConfig::default();
    };

    match ViewerConfig::load(&path) {
        Ok(config) => {
            tracing::info!(path = %path.display(), "loaded configuration");
            config
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "using default configuration");
            ViewerConfig::default()
        }
    }
}
