//! Terminal input for the address book.
//!
//! A background task merges crossterm input with two clocks: a slow one that
//! advances the loading spinners and a fast one that paces redraws. Pasted
//! text arrives whole (bracketed paste) so an address list copied from a
//! mail client lands in one field edit.

use std::time::Duration;

use crossterm::event::{Event as CrosstermEvent, EventStream, KeyEvent, KeyEventKind};
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio::time::{MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Spinner frame interval.
pub const SPINNER_TICK: Duration = Duration::from_millis(250);

/// Redraw interval (~30 FPS).
pub const FRAME_INTERVAL: Duration = Duration::from_millis(33);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Key press, or auto-repeat while held.
    Key(KeyEvent),
    /// Bracketed paste, delivered as one string.
    Paste(String),
    Resize(u16, u16),
    /// Advance spinners.
    Tick,
    /// Draw a frame.
    Render,
}

/// Keep the terminal events the panes act on. Releases, mouse and focus
/// changes are dropped.
pub fn from_terminal(event: CrosstermEvent) -> Option<Event> {
    match event {
        CrosstermEvent::Key(key) if key.kind != KeyEventKind::Release => Some(Event::Key(key)),
        CrosstermEvent::Paste(text) if !text.is_empty() => Some(Event::Paste(text)),
        CrosstermEvent::Resize(cols, rows) => Some(Event::Resize(cols, rows)),
        _ => None,
    }
}

pub struct EventReader {
    rx: mpsc::UnboundedReceiver<Event>,
    cancel: CancellationToken,
}

impl EventReader {
    /// Spawn the reader task with the given spinner and frame clocks.
    pub fn new(tick_rate: Duration, frame_rate: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        tokio::spawn(read_loop(tx, cancel.clone(), tick_rate, frame_rate));
        Self { rx, cancel }
    }

    /// `None` once the reader has stopped.
    pub async fn next(&mut self) -> Option<Event> {
        self.rx.recv().await
    }

    pub fn stop(&self) {
        self.cancel.cancel();
    }
}

impl Drop for EventReader {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn read_loop(
    tx: mpsc::UnboundedSender<Event>,
    cancel: CancellationToken,
    tick_rate: Duration,
    frame_rate: Duration,
) {
    let mut input = EventStream::new();
    let mut spinner = interval(tick_rate);
    let mut frames = interval(frame_rate);
    spinner.set_missed_tick_behavior(MissedTickBehavior::Skip);
    frames.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        let event = tokio::select! {
            () = cancel.cancelled() => break,
            _ = spinner.tick() => Event::Tick,
            _ = frames.tick() => Event::Render,
            next = input.next() => match next {
                Some(Ok(raw)) => match from_terminal(raw) {
                    Some(event) => event,
                    None => continue,
                },
                Some(Err(e)) => {
                    warn!(error = %e, "terminal read failed");
                    continue;
                }
                None => {
                    debug!("terminal input closed");
                    break;
                }
            },
        };

        if tx.send(event).is_err() {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyCode, KeyEventState, KeyModifiers, MouseEvent, MouseEventKind};
    use pretty_assertions::assert_eq;

    use super::*;

    fn key(kind: KeyEventKind) -> KeyEvent {
        KeyEvent {
            code: KeyCode::Char('x'),
            modifiers: KeyModifiers::NONE,
            kind,
            state: KeyEventState::NONE,
        }
    }

    #[test]
    fn presses_and_repeats_pass_releases_drop() {
        let press = key(KeyEventKind::Press);
        let repeat = key(KeyEventKind::Repeat);
        assert_eq!(from_terminal(CrosstermEvent::Key(press)), Some(Event::Key(press)));
        assert_eq!(from_terminal(CrosstermEvent::Key(repeat)), Some(Event::Key(repeat)));
        assert_eq!(from_terminal(CrosstermEvent::Key(key(KeyEventKind::Release))), None);
    }

    #[test]
    fn paste_and_resize_pass_through() {
        assert_eq!(
            from_terminal(CrosstermEvent::Paste("a@x.com; b@x.com".into())),
            Some(Event::Paste("a@x.com; b@x.com".into()))
        );
        assert_eq!(from_terminal(CrosstermEvent::Paste(String::new())), None);
        assert_eq!(from_terminal(CrosstermEvent::Resize(120, 40)), Some(Event::Resize(120, 40)));
    }

    #[test]
    fn mouse_and_focus_are_ignored() {
        let mouse = MouseEvent {
            kind: MouseEventKind::Moved,
            column: 0,
            row: 0,
            modifiers: KeyModifiers::NONE,
        };
        assert_eq!(from_terminal(CrosstermEvent::Mouse(mouse)), None);
        assert_eq!(from_terminal(CrosstermEvent::FocusGained), None);
    }
}
