//! Result table: users of the selected department or search.

use addrtree_core::{AppEvent, AppState, SelectionModel, User};
use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    text::Span,
    widgets::{Block, BorderType, Borders, Cell, Paragraph, Row, Table, TableState},
};
use tokio::sync::mpsc::UnboundedSender;

use crate::action::Action;
use crate::component::{Component, RenderCtx};

#[derive(Default)]
pub struct UsersPane {
    selection: SelectionModel<User>,
    table_state: TableState,
    focused: bool,
    throbber: throbber_widgets_tui::ThrobberState,
}

impl UsersPane {
    pub fn new() -> Self {
        Self::default()
    }

    fn cursor(&self) -> Option<usize> {
        self.table_state.selected().filter(|&i| i < self.selection.len())
    }

    /// Take the state's rows. A finished query always replaces them so marks
    /// never outlive the selection the reducer dropped.
    fn sync_rows(&mut self, users: &[User], fresh_results: bool) {
        if !fresh_results && self.selection.items() == users {
            return;
        }
        self.selection.set_items(users.to_vec());
        self.table_state.select((!users.is_empty()).then_some(0));
    }

    fn move_cursor(&mut self, delta: isize) {
        let len = self.selection.len();
        if len == 0 {
            return;
        }
        let current = self.cursor().unwrap_or(0);
        let next = current.saturating_add_signed(delta).min(len - 1);
        self.table_state.select(Some(next));
    }
}

impl Component for UsersPane {
    fn init(&mut self, action_tx: UnboundedSender<Action>) -> Result<()> {
        self.selection.on_change(move |users: &[User]| {
            let _ = action_tx.send(AppEvent::SelectionChanged(users.to_vec()).into());
        });
        Ok(())
    }

    fn handle_key_event(&mut self, key: KeyEvent, _state: &AppState) -> Result<Option<Action>> {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.move_cursor(-1),
            KeyCode::Down | KeyCode::Char('j') => self.move_cursor(1),
            KeyCode::PageUp => self.move_cursor(-10),
            KeyCode::PageDown => self.move_cursor(10),
            KeyCode::Home | KeyCode::Char('g') => self.move_cursor(isize::MIN),
            KeyCode::End | KeyCode::Char('G') => self.move_cursor(isize::MAX),
            KeyCode::Char(' ') => {
                if let Some(i) = self.cursor() {
                    self.selection.toggle(i);
                }
            }
            KeyCode::Char('a') => {
                let all = self.selection.selected_count() == self.selection.len();
                self.selection.set_all_selected(!all);
            }
            KeyCode::Enter => {
                if let Some(user) = self.cursor().and_then(|i| self.selection.items().get(i)) {
                    return Ok(Some(AppEvent::UserInvoked(user.clone()).into()));
                }
            }
            _ => {}
        }
        Ok(None)
    }

    fn update(&mut self, action: &Action, state: &AppState) -> Result<Option<Action>> {
        match action {
            Action::State(AppEvent::FieldsCleared) => self.selection.set_all_selected(false),
            Action::State(
                AppEvent::QuerySucceeded(_) | AppEvent::QueryFailed(_) | AppEvent::ResultsCleared,
            ) => self.sync_rows(&state.users, true),
            Action::State(AppEvent::SearchSubmitted) => self.sync_rows(&state.users, false),
            Action::Tick if state.query_loading => self.throbber.calc_next(),
            _ => {}
        }
        Ok(None)
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, ctx: &RenderCtx<'_>) {
        let theme = ctx.theme;
        let total = self.selection.len();
        let marked = self.selection.selected_count();
        let title = if marked > 0 {
            format!(" Users ({total}) · {marked} selected ")
        } else {
            format!(" Users ({total}) ")
        };
        let block = Block::default()
            .title(title)
            .title_style(theme.title())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme.border(self.focused));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let table_area = if ctx.state.query_loading {
            let layout = Layout::vertical([Constraint::Length(1), Constraint::Min(0)]).split(inner);
            let throbber = throbber_widgets_tui::Throbber::default()
                .label(" Fetching users...")
                .style(theme.text())
                .throbber_style(theme.key_hint_key());
            frame.render_stateful_widget(throbber, layout[0], &mut self.throbber.clone());
            layout[1]
        } else {
            inner
        };

        if total == 0 {
            if !ctx.state.query_loading && ctx.state.error.is_none() {
                frame.render_widget(
                    Paragraph::new(Span::styled(
                        "Pick a department or search by name.",
                        theme.muted(),
                    )),
                    table_area,
                );
            }
            return;
        }

        let header = Row::new(
            ["", "Name", "Department", "Mail", "Job title"]
                .into_iter()
                .map(|h| Cell::from(h).style(theme.table_header())),
        );

        let rows: Vec<Row> = self
            .selection
            .items()
            .iter()
            .enumerate()
            .map(|(i, user)| {
                let is_marked = self.selection.is_selected(i);
                let style = if is_marked { theme.marked() } else { theme.text() };
                Row::new(vec![
                    Cell::from(if is_marked { "✓" } else { " " }),
                    Cell::from(user.display_name.clone()),
                    Cell::from(user.department.clone()),
                    Cell::from(user.mail.clone()),
                    Cell::from(user.job_title.clone()),
                ])
                .style(style)
            })
            .collect();

        let widths = [
            Constraint::Length(1),
            Constraint::Fill(3),
            Constraint::Fill(2),
            Constraint::Fill(3),
            Constraint::Fill(2),
        ];

        let table = Table::new(rows, widths)
            .header(header)
            .row_highlight_style(theme.selected())
            .highlight_symbol("▸");

        frame.render_stateful_widget(table, table_area, &mut self.table_state);
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
    use tokio::sync::mpsc;

    use super::*;

    fn user(name: &str) -> User {
        User {
            id: name.to_owned(),
            display_name: name.to_owned(),
            mail: format!("{}@contoso.com", name.to_lowercase()),
            ..User::default()
        }
    }

    fn press(pane: &mut UsersPane, code: KeyCode) -> Option<Action> {
        pane.handle_key_event(KeyEvent::new(code, KeyModifiers::NONE), &AppState::new())
            .unwrap()
    }

    fn with_results(users: Vec<User>) -> (UsersPane, mpsc::UnboundedReceiver<Action>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut pane = UsersPane::new();
        pane.init(tx).unwrap();

        let mut state = AppState::new();
        let event = AppEvent::QuerySucceeded(users);
        state.reduce(event.clone());
        pane.update(&event.into(), &state).unwrap();
        (pane, rx)
    }

    #[test]
    fn marking_rows_reports_selection() {
        let (mut pane, mut rx) = with_results(vec![user("Ann"), user("Bob")]);

        press(&mut pane, KeyCode::Down);
        press(&mut pane, KeyCode::Char(' '));

        assert_eq!(
            rx.try_recv().unwrap(),
            Action::State(AppEvent::SelectionChanged(vec![user("Bob")]))
        );
    }

    #[test]
    fn identical_rerun_drops_marks() {
        let users = vec![user("Ann"), user("Bob")];
        let (mut pane, mut rx) = with_results(users.clone());
        let mut state = AppState::new();
        state.reduce(AppEvent::QuerySucceeded(users.clone()));

        press(&mut pane, KeyCode::Char(' '));
        let marked = rx.try_recv().unwrap();
        assert_eq!(marked, Action::State(AppEvent::SelectionChanged(vec![user("Ann")])));
        let Action::State(event) = marked else { unreachable!() };
        state.reduce(event);

        let rerun = AppEvent::QuerySucceeded(users);
        state.reduce(rerun.clone());
        pane.update(&rerun.into(), &state).unwrap();

        assert!(state.selection.is_empty());
        assert_eq!(pane.selection.selected_count(), 0);
        assert_eq!(
            rx.try_recv().unwrap(),
            Action::State(AppEvent::SelectionChanged(vec![]))
        );
    }

    #[test]
    fn mark_all_then_none() {
        let (mut pane, mut rx) = with_results(vec![user("Ann"), user("Bob")]);

        press(&mut pane, KeyCode::Char('a'));
        assert_eq!(
            rx.try_recv().unwrap(),
            Action::State(AppEvent::SelectionChanged(vec![user("Ann"), user("Bob")]))
        );
        press(&mut pane, KeyCode::Char('a'));
        assert_eq!(
            rx.try_recv().unwrap(),
            Action::State(AppEvent::SelectionChanged(vec![]))
        );
    }

    #[test]
    fn enter_invokes_row_under_cursor() {
        let (mut pane, _rx) = with_results(vec![user("Ann"), user("Bob")]);
        press(&mut pane, KeyCode::End);
        assert_eq!(
            press(&mut pane, KeyCode::Enter),
            Some(Action::State(AppEvent::UserInvoked(user("Bob"))))
        );
    }

    #[test]
    fn cleared_fields_unmark_rows() {
        let (mut pane, mut rx) = with_results(vec![user("Ann")]);
        press(&mut pane, KeyCode::Char(' '));
        let _ = rx.try_recv();

        pane.update(&AppEvent::FieldsCleared.into(), &AppState::new())
            .unwrap();
        assert_eq!(pane.selection.selected_count(), 0);
        assert_eq!(
            rx.try_recv().unwrap(),
            Action::State(AppEvent::SelectionChanged(vec![]))
        );
    }

    #[test]
    fn enter_on_empty_table_does_nothing() {
        let (mut pane, _rx) = with_results(Vec::new());
        assert_eq!(press(&mut pane, KeyCode::Enter), None);
    }
}
