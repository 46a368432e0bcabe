//! Formulary - Terminal Formula Calculator
//!
//! A terminal-based calculator for named formulas. Variables are detected
//! from each expression, filled in on the calculation tab, and every result
//! is kept in a session history.

use std::io;
use std::path::PathBuf;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::info;
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};

use formulary::application::{App, AppMode};
use formulary::infrastructure::{logging, AppConfig, ConfigRepository, CONFIG_ENV};
use formulary::presentation::{render_ui, InputHandler};

/// Entry point for the formulary terminal application.
///
/// Loads the configuration, sets up logging and the terminal interface,
/// and runs the main event loop until the user quits.
///
/// # Errors
///
/// Returns an error if the log file cannot be opened, if terminal setup
/// fails, or if there are issues with the terminal interface during runtime.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config()?;

    let log_file = logging::log_file_path(std::env::var_os(logging::LOG_FILE_ENV).map(PathBuf::from), &config);
    logging::init(log_file.as_deref())?;
    info!("starting with {} formulas", config.formulas.len());

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::from_config(&config);
    let res = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{err:?}");
    }

    info!("exiting after {} calculations", app.history.len());
    Ok(())
}

/// Reads the config file, falling back to the defaults when it is unusable.
fn load_config() -> io::Result<AppConfig> {
    let explicit = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
    let dir = std::env::current_dir()?;

    Ok(ConfigRepository::load_or_default(explicit, &dir).unwrap_or_else(|err| {
        println!("{err}; using default configuration");
        AppConfig::default()
    }))
}

/// Main application event loop.
///
/// Handles terminal rendering and keyboard input processing.
/// Continues running until the user presses 'q' in normal mode.
fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    loop {
        terminal.draw(|f| render_ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press {
                match key.code {
                    KeyCode::Char('q') if matches!(app.mode, AppMode::Normal) => return Ok(()),
                    _ => InputHandler::handle_key_event(app, key.code, key.modifiers),
                }
            }
        }
    }
}
