//! Terminal session for the address book.
//!
//! Entering switches to the alternate screen in raw mode with bracketed
//! paste on. Leaving undoes all of it, whether through `exit`, `Drop`, an
//! error report, or a panic.

use std::io::{Stdout, Write, stdout};

use color_eyre::eyre::Result;
use crossterm::{
    cursor,
    event::{DisableBracketedPaste, EnableBracketedPaste},
    execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen, SetTitle},
};
use ratatui::{Frame, Terminal, backend::CrosstermBackend};

pub type Backend = CrosstermBackend<Stdout>;

const WINDOW_TITLE: &str = "addrtree";

pub struct Tui {
    pub terminal: Terminal<Backend>,
    active: bool,
}

impl Tui {
    /// Wrap stdout. The screen is left untouched until `enter`.
    pub fn new() -> Result<Self> {
        Ok(Self {
            terminal: Terminal::new(CrosstermBackend::new(stdout()))?,
            active: false,
        })
    }

    pub fn enter(&mut self) -> Result<()> {
        terminal::enable_raw_mode()?;
        self.active = true;
        execute!(
            stdout(),
            EnterAlternateScreen,
            EnableBracketedPaste,
            SetTitle(WINDOW_TITLE),
            cursor::Hide
        )?;
        self.terminal.clear()?;
        Ok(())
    }

    /// Restore the screen. Safe to call more than once.
    pub fn exit(&mut self) {
        if std::mem::take(&mut self.active) {
            restore_terminal();
        }
    }

    pub fn draw(&mut self, render: impl FnOnce(&mut Frame)) -> Result<()> {
        self.terminal.draw(render)?;
        Ok(())
    }
}

impl Drop for Tui {
    fn drop(&mut self) {
        self.exit();
    }
}

/// Best effort; errors are ignored.
fn restore_terminal() {
    let mut out = stdout();
    let _ = execute!(out, DisableBracketedPaste, LeaveAlternateScreen, cursor::Show);
    let _ = terminal::disable_raw_mode();
    let _ = out.flush();
}

/// Install color-eyre report and panic hooks that put the terminal back
/// first. Call before `Tui::enter` so setup failures print cleanly too.
pub fn install_hooks() -> Result<()> {
    let (panic_hook, eyre_hook) = color_eyre::config::HookBuilder::default()
        .display_env_section(false)
        .panic_section("Logs may have more detail; rerun with -vv for debug output.")
        .into_hooks();

    eyre_hook.install()?;

    let panic_hook = panic_hook.into_panic_hook();
    std::panic::set_hook(Box::new(move |info| {
        restore_terminal();
        panic_hook(info);
    }));

    Ok(())
}
