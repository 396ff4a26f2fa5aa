//! Component trait implemented by every pane.

use addrtree_core::AppState;
use color_eyre::eyre::Result;
use crossterm::event::KeyEvent;
use ratatui::{Frame, layout::Rect};
use tokio::sync::mpsc::UnboundedSender;

use crate::action::Action;
use crate::theme::Theme;

/// What a component reads while drawing.
pub struct RenderCtx<'a> {
    pub state: &'a AppState,
    pub theme: &'a Theme,
}

/// Lifecycle: `init` → (`handle_key_event` | `handle_paste` | `update` | `render`)*
///
/// `update` runs after the reducer, so `state` already reflects the action.
pub trait Component: Send {
    fn init(&mut self, _action_tx: UnboundedSender<Action>) -> Result<()> {
        Ok(())
    }

    /// Handle a key while focused. Return an action to dispatch, or None.
    fn handle_key_event(&mut self, _key: KeyEvent, _state: &AppState) -> Result<Option<Action>> {
        Ok(None)
    }

    /// Handle pasted text while focused.
    fn handle_paste(&mut self, _text: &str, _state: &AppState) -> Result<Option<Action>> {
        Ok(None)
    }

    /// React to a dispatched action. May return a follow-up action.
    fn update(&mut self, _action: &Action, _state: &AppState) -> Result<Option<Action>> {
        Ok(None)
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, ctx: &RenderCtx<'_>);

    fn set_focused(&mut self, _focused: bool) {}
}
