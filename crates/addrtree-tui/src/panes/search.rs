//! Name-prefix search box.

use addrtree_core::{AppEvent, AppState};
use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{Frame, layout::Rect};
use tui_input::Input;

use crate::action::Action;
use crate::component::{Component, RenderCtx};
use crate::widgets::input::{edit, paste, render_input};

#[derive(Default)]
pub struct SearchPane {
    input: Input,
    focused: bool,
}

impl SearchPane {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Component for SearchPane {
    fn handle_key_event(&mut self, key: KeyEvent, _state: &AppState) -> Result<Option<Action>> {
        if key.code == KeyCode::Enter {
            return Ok(Some(AppEvent::SearchSubmitted.into()));
        }
        Ok(edit(&mut self.input, key).map(|value| AppEvent::SearchEdited(value).into()))
    }

    fn handle_paste(&mut self, text: &str, _state: &AppState) -> Result<Option<Action>> {
        Ok(paste(&mut self.input, text, " ").map(|value| AppEvent::SearchEdited(value).into()))
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, ctx: &RenderCtx<'_>) {
        render_input(
            frame,
            area,
            &self.input,
            "Search by name (Enter)",
            self.focused,
            ctx.theme,
        );
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use crossterm::event::KeyModifiers;
    use pretty_assertions::assert_eq;

    use super::*;

    fn press(pane: &mut SearchPane, code: KeyCode) -> Option<Action> {
        pane.handle_key_event(KeyEvent::new(code, KeyModifiers::NONE), &AppState::new())
            .unwrap()
    }

    #[test]
    fn typing_edits_then_enter_submits() {
        let mut pane = SearchPane::new();
        assert_eq!(
            press(&mut pane, KeyCode::Char('q')),
            Some(Action::State(AppEvent::SearchEdited("q".into())))
        );
        assert_eq!(
            press(&mut pane, KeyCode::Enter),
            Some(Action::State(AppEvent::SearchSubmitted))
        );
    }

    #[test]
    fn pasted_name_becomes_one_line() {
        let mut pane = SearchPane::new();
        assert_eq!(
            pane.handle_paste("Jane\nDoe\n", &AppState::new()).unwrap(),
            Some(Action::State(AppEvent::SearchEdited("Jane Doe".into())))
        );
    }
}
