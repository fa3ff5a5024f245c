//! Worry Journal TUI
//!
//! Terminal front end for the worry journal: the shell's screens painted
//! with ratatui, worries kept as files in the platform data directory.

mod app;
mod keybindings;
mod mode;
mod widgets;

use std::fs::OpenOptions;
use std::io;
use std::path::Path;
use std::sync::{Arc, Mutex};

use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing_subscriber::EnvFilter;
use worry_core::{FileBackend, JournalConfig, MemoryLocation, Shell, SystemClock, UuidGenerator};

use app::App;

const APP_DIR: &str = "worry-journal";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config()?;
    let backend = match &config.data_dir {
        Some(dir) => FileBackend::new(dir),
        None => FileBackend::default_for_app(APP_DIR),
    };
    init_logging(backend.dir())?;
    tracing::info!(data_dir = %backend.dir().display(), "Worry Journal v{} starting", env!("CARGO_PKG_VERSION"));

    let shell = Shell::new(
        config,
        backend,
        MemoryLocation::new(),
        Arc::new(SystemClock),
        UuidGenerator,
    );
    let mut app = App::new(shell);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app);
    app.shell.shutdown();

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        tracing::error!(error = %err, "Event loop failed");
        eprintln!("Error: {err:?}");
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    loop {
        app.shell.pump();
        terminal.draw(|f| app.render(f))?;

        if event::poll(app.poll_timeout())? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press && app.handle_key(key.code, key.modifiers) {
                    return Ok(());
                }
            }
        }
    }
}

/// `<config dir>/worry-journal/config.toml`, or defaults when absent.
fn load_config() -> Result<JournalConfig, worry_core::ConfigError> {
    match dirs::config_dir() {
        Some(dir) => JournalConfig::load_or_default(&dir.join(APP_DIR).join("config.toml")),
        None => Ok(JournalConfig::default()),
    }
}

/// Log to a file since the terminal is in raw mode. `WORRY_LOG` overrides
/// the default `info` filter.
fn init_logging(dir: &Path) -> io::Result<()> {
    std::fs::create_dir_all(dir)?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join("worry.log"))?;

    let filter = EnvFilter::try_from_env("WORRY_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_target(false)
        .with_ansi(false)
        .init();
    Ok(())
}
