//! UI actions. Everything that changes the screen goes through one of these.

use addrtree_core::AppEvent;

use crate::panes::Focus;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    // ── Lifecycle ──────────────────────────────────────────────────
    Quit,
    Tick,
    Render,
    Resize(u16, u16),

    // ── Navigation ────────────────────────────────────────────────
    FocusNext,
    FocusPrev,
    Focus(Focus),

    // ── Overlays ──────────────────────────────────────────────────
    ToggleAbout,

    // ── Directory state ───────────────────────────────────────────
    /// Applied to `AppState` by the reducer, then seen by every pane.
    State(AppEvent),
}

impl From<AppEvent> for Action {
    fn from(event: AppEvent) -> Self {
        Self::State(event)
    }
}
