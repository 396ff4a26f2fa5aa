//! To / Cc / Bcc lines. Editable by hand; additions from the table arrive
//! through the state and are mirrored back into the inputs.

use addrtree_core::{AppEvent, AppState, RecipientKind};
use color_eyre::eyre::Result;
use crossterm::event::KeyEvent;
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
};
use strum::IntoEnumIterator;
use tui_input::Input;

use crate::action::Action;
use crate::component::{Component, RenderCtx};
use crate::widgets::input::{edit, paste, render_input};

#[derive(Default)]
pub struct RecipientsPane {
    to: Input,
    cc: Input,
    bcc: Input,
    focused: Option<RecipientKind>,
}

impl RecipientsPane {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn focus_field(&mut self, kind: Option<RecipientKind>) {
        self.focused = kind;
    }

    fn input(&self, kind: RecipientKind) -> &Input {
        match kind {
            RecipientKind::To => &self.to,
            RecipientKind::Cc => &self.cc,
            RecipientKind::Bcc => &self.bcc,
        }
    }

    fn input_mut(&mut self, kind: RecipientKind) -> &mut Input {
        match kind {
            RecipientKind::To => &mut self.to,
            RecipientKind::Cc => &mut self.cc,
            RecipientKind::Bcc => &mut self.bcc,
        }
    }
}

impl Component for RecipientsPane {
    fn handle_key_event(&mut self, key: KeyEvent, _state: &AppState) -> Result<Option<Action>> {
        let Some(kind) = self.focused else {
            return Ok(None);
        };
        Ok(edit(self.input_mut(kind), key).map(|value| AppEvent::FieldEdited(kind, value).into()))
    }

    /// One address per pasted line becomes one `;`-separated entry.
    fn handle_paste(&mut self, text: &str, _state: &AppState) -> Result<Option<Action>> {
        let Some(kind) = self.focused else {
            return Ok(None);
        };
        Ok(paste(self.input_mut(kind), text, "; ")
            .map(|value| AppEvent::FieldEdited(kind, value).into()))
    }

    /// Mirror changes made outside the inputs. Typing reaches the state as
    /// `FieldEdited`, so other events must not touch an input mid-edit.
    fn update(&mut self, action: &Action, state: &AppState) -> Result<Option<Action>> {
        if let Action::State(
            AppEvent::AddSelected(_) | AppEvent::UserInvoked(_) | AppEvent::FieldsCleared,
        ) = action
        {
            for kind in RecipientKind::iter() {
                let current = state.recipients.field(kind);
                if self.input(kind).value() != current {
                    *self.input_mut(kind) = Input::new(current.to_owned());
                }
            }
        }
        Ok(None)
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, ctx: &RenderCtx<'_>) {
        let rows = Layout::vertical([Constraint::Length(3); 3]).split(area);
        for (kind, row) in RecipientKind::iter().zip(rows.iter()) {
            render_input(
                frame,
                *row,
                self.input(kind),
                &kind.to_string(),
                self.focused == Some(kind),
                ctx.theme,
            );
        }
    }

    fn set_focused(&mut self, focused: bool) {
        if !focused {
            self.focused = None;
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use addrtree_core::User;
    use crossterm::event::{KeyCode, KeyModifiers};
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn typing_goes_to_focused_line() {
        let mut pane = RecipientsPane::new();
        let key = KeyEvent::new(KeyCode::Char('x'), KeyModifiers::NONE);
        assert_eq!(pane.handle_key_event(key, &AppState::new()).unwrap(), None);

        pane.focus_field(Some(RecipientKind::Cc));
        assert_eq!(
            pane.handle_key_event(key, &AppState::new()).unwrap(),
            Some(Action::State(AppEvent::FieldEdited(RecipientKind::Cc, "x".into())))
        );
    }

    #[test]
    fn mirrors_additions_from_state() {
        let mut pane = RecipientsPane::new();
        let mut state = AppState::new();
        let event = AppEvent::UserInvoked(User {
            display_name: "Jane Doe".into(),
            mail: "jane@x.com".into(),
            ..User::default()
        });
        state.reduce(event.clone());
        pane.update(&event.into(), &state).unwrap();

        assert_eq!(pane.input(RecipientKind::To).value(), "Jane Doe <jane@x.com>");
        assert_eq!(pane.input(RecipientKind::Bcc).value(), "");

        state.reduce(AppEvent::FieldsCleared);
        pane.update(&AppEvent::FieldsCleared.into(), &state).unwrap();
        assert_eq!(pane.input(RecipientKind::To).value(), "");
    }

    #[test]
    fn pasted_lines_become_entries() {
        let mut pane = RecipientsPane::new();
        let state = AppState::new();
        assert_eq!(pane.handle_paste("a@x.com", &state).unwrap(), None);

        pane.focus_field(Some(RecipientKind::Bcc));
        assert_eq!(
            pane.handle_paste("a@x.com\nb@x.com", &state).unwrap(),
            Some(Action::State(AppEvent::FieldEdited(
                RecipientKind::Bcc,
                "a@x.com; b@x.com".into()
            )))
        );
    }

    #[test]
    fn unrelated_events_keep_edit_in_progress() {
        let mut pane = RecipientsPane::new();
        let state = AppState::new();
        pane.focus_field(Some(RecipientKind::To));
        for code in [KeyCode::Char('a'), KeyCode::Char('b'), KeyCode::Left] {
            pane.handle_key_event(KeyEvent::new(code, KeyModifiers::NONE), &state)
                .unwrap();
        }

        // The state has not seen the keystrokes yet.
        pane.update(&AppEvent::QueryStarted.into(), &state).unwrap();

        let input = pane.input(RecipientKind::To);
        assert_eq!(input.value(), "ab");
        assert_eq!(input.cursor(), 1);
    }
}
