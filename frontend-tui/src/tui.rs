//! Raw-mode screen handling for the monitor.
//!
//! The monitor owns the whole terminal while it runs: no echo, no line
//! buffering, alternate screen, no visible cursor. `leave` puts all of that back
//! and also runs from the panic hook, so a crash does not leave the shell raw.

use color_eyre::Result;
use crossterm::{
    cursor::{Hide, Show},
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Stdout};

pub type Tui = Terminal<CrosstermBackend<Stdout>>;

pub fn enter() -> Result<Tui> {
    terminal::enable_raw_mode()?;
    crossterm::execute!(io::stdout(), EnterAlternateScreen, Hide)?;
    Ok(Terminal::new(CrosstermBackend::new(io::stdout()))?)
}

pub fn leave() -> Result<()> {
    crossterm::execute!(io::stdout(), Show, LeaveAlternateScreen)?;
    terminal::disable_raw_mode()?;
    Ok(())
}

/// Chains onto the current hook; the screen is restored before the report prints.
pub fn leave_on_panic() {
    let report = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = leave();
        report(info);
    }));
}
