//! TUI module - Terminal user interface for leftovers
//!
//! A Tools menu, the Food Waste Preventer screen, and the alarm overlay that
//! takes over the terminal when a reminder fires.

#![cfg(feature = "tui")]

mod types;
mod state;
mod utils;
mod render;
mod input;

pub use types::*;
pub use state::*;
pub use utils::centered_rect;

use std::io;
use std::time::{Duration, Instant};

use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use crate::app::open_local;
use crate::config::Config;
use crate::error::Result;
use crate::notifier::{local_now, DeliveryMode, ForegroundLock};
use crate::vibration::TerminalBell;

/// Run the TUI
pub fn run(config: &Config) -> Result<()> {
    let lock = ForegroundLock::acquire(Config::foreground_lock_path()?)?;
    let mut controller = open_local(config, DeliveryMode::Foreground, TerminalBell::new(config.bell))?;
    controller.start(Instant::now())?;
    let mut app = App::new(controller);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = event_loop(&mut terminal, &mut app, &lock);

    // Stop the pulse and restore the terminal whichever way the loop ended
    app.controller.shutdown();
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(ref e) = result {
        log::error!("ui exited with error: {}", e);
    }
    result
}

fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut LocalApp,
    lock: &ForegroundLock,
) -> Result<()> {
    let mut last_tick = Instant::now();
    let mut last_lock_refresh = Instant::now();

    loop {
        terminal.draw(|f| render::ui(f, app))?;

        if last_tick.elapsed() >= Duration::from_millis(100) {
            app.tick(local_now(), Instant::now());
            last_tick = Instant::now();
        }

        if last_lock_refresh.elapsed() >= Duration::from_secs(10) {
            if let Err(e) = lock.refresh() {
                log::warn!("could not refresh foreground lock: {}", e);
            }
            last_lock_refresh = Instant::now();
        }

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    input::handle_key_event(app, key.code, key.modifiers)?;
                }
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}
