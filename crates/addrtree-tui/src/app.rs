//! Application core: event loop, focus, action dispatch, and layout.

use addrtree_core::{AppEvent, AppState, Directory, RecipientKind};
use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    text::{Line, Span},
    widgets::Paragraph,
};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::action::Action;
use crate::component::{Component, RenderCtx};
use crate::event::{Event, EventReader, FRAME_INTERVAL, SPINNER_TICK};
use crate::panes::{Focus, RecipientsPane, SearchPane, TreePane, UsersPane};
use crate::theme::Theme;
use crate::tui::Tui;
use crate::widgets::overlay::render_overlay;
use crate::worker::Worker;

pub struct App {
    state: AppState,
    focus: Focus,
    search: SearchPane,
    tree: TreePane,
    users: UsersPane,
    recipients: RecipientsPane,
    worker: Worker,
    theme: Theme,
    about_visible: bool,
    running: bool,
    action_tx: mpsc::UnboundedSender<Action>,
    action_rx: mpsc::UnboundedReceiver<Action>,
}

impl App {
    /// `action_tx`/`action_rx` are created by the caller so the sign-in
    /// prompt can post into the same channel.
    pub fn new(
        directory: Directory,
        theme: Theme,
        action_tx: mpsc::UnboundedSender<Action>,
        action_rx: mpsc::UnboundedReceiver<Action>,
    ) -> Self {
        Self {
            state: AppState::new(),
            focus: Focus::default(),
            search: SearchPane::new(),
            tree: TreePane::new(),
            users: UsersPane::new(),
            recipients: RecipientsPane::new(),
            worker: Worker::new(directory, action_tx.clone()),
            theme,
            about_visible: false,
            running: true,
            action_tx,
            action_rx,
        }
    }

    fn panes_mut(&mut self) -> [&mut dyn Component; 4] {
        [
            &mut self.search,
            &mut self.tree,
            &mut self.users,
            &mut self.recipients,
        ]
    }

    fn init_panes(&mut self) -> Result<()> {
        let tx = self.action_tx.clone();
        for pane in self.panes_mut() {
            pane.init(tx.clone())?;
        }
        self.set_focus(self.focus);
        Ok(())
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut tui = Tui::new()?;
        tui.enter()?;
        self.init_panes()?;

        let mut events = EventReader::new(SPINNER_TICK, FRAME_INTERVAL);

        self.action_tx
            .send(AppEvent::LoadRequested { reload: false }.into())?;
        info!("event loop started");

        while self.running {
            let Some(event) = events.next().await else {
                break;
            };

            match event {
                Event::Key(key) => {
                    if let Some(action) = self.handle_key_event(key)? {
                        self.action_tx.send(action)?;
                    }
                }
                Event::Paste(text) => {
                    if let Some(action) = self.handle_paste(&text)? {
                        self.action_tx.send(action)?;
                    }
                }
                Event::Resize(w, h) => self.action_tx.send(Action::Resize(w, h))?,
                Event::Tick => self.action_tx.send(Action::Tick)?,
                Event::Render => self.action_tx.send(Action::Render)?,
            }

            while let Ok(action) = self.action_rx.try_recv() {
                self.process_action(&action)?;

                if action == Action::Render {
                    tui.draw(|frame| self.render(frame))?;
                }
            }
        }

        events.stop();
        tui.exit();
        info!("event loop ended");
        Ok(())
    }

    /// Map a key to an action. Modal overlays swallow keys first, then global
    /// chords, then the focused pane.
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        if ctrl && key.code == KeyCode::Char('c') {
            return Ok(Some(Action::Quit));
        }

        if self.state.notice.is_some() {
            return Ok(match key.code {
                KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ') => {
                    Some(AppEvent::NoticeDismissed.into())
                }
                _ => None,
            });
        }

        if self.about_visible {
            return Ok(match key.code {
                KeyCode::Esc | KeyCode::Enter | KeyCode::Char('?' | 'q') => {
                    Some(Action::ToggleAbout)
                }
                _ => None,
            });
        }

        match key.code {
            KeyCode::Tab => return Ok(Some(Action::FocusNext)),
            KeyCode::BackTab => return Ok(Some(Action::FocusPrev)),
            KeyCode::Char('e') if ctrl => return Ok(Some(AppEvent::ComposeEmail.into())),
            KeyCode::Char('o') if ctrl => return Ok(Some(AppEvent::ComposeEvent.into())),
            KeyCode::Char('l') if ctrl => return Ok(Some(AppEvent::FieldsCleared.into())),
            KeyCode::Char('r') if ctrl => {
                return Ok(Some(AppEvent::LoadRequested { reload: true }.into()));
            }
            _ => {}
        }

        if self.focus.is_text_entry() {
            if key.code == KeyCode::Esc {
                return Ok(Some(Action::Focus(Focus::Tree)));
            }
        } else if key.modifiers.difference(KeyModifiers::SHIFT).is_empty() {
            let global = match key.code {
                KeyCode::Char('q') => Some(Action::Quit),
                KeyCode::Char('?') => Some(Action::ToggleAbout),
                KeyCode::Char('/') => Some(Action::Focus(Focus::Search)),
                KeyCode::Char('R') => Some(AppEvent::LoadRequested { reload: true }.into()),
                KeyCode::Char('t') => Some(AppEvent::AddSelected(RecipientKind::To).into()),
                KeyCode::Char('c') => Some(AppEvent::AddSelected(RecipientKind::Cc).into()),
                KeyCode::Char('b') => Some(AppEvent::AddSelected(RecipientKind::Bcc).into()),
                _ => None,
            };
            if global.is_some() {
                return Ok(global);
            }
        }

        let state = &self.state;
        match self.focus {
            Focus::Search => self.search.handle_key_event(key, state),
            Focus::Tree => self.tree.handle_key_event(key, state),
            Focus::Users => self.users.handle_key_event(key, state),
            Focus::Field(_) => self.recipients.handle_key_event(key, state),
        }
    }

    /// Pasted text goes to the focused text field. Overlays and list panes
    /// ignore it.
    fn handle_paste(&mut self, text: &str) -> Result<Option<Action>> {
        if self.state.notice.is_some() || self.about_visible {
            return Ok(None);
        }
        let state = &self.state;
        match self.focus {
            Focus::Search => self.search.handle_paste(text, state),
            Focus::Field(_) => self.recipients.handle_paste(text, state),
            Focus::Tree | Focus::Users => Ok(None),
        }
    }

    fn set_focus(&mut self, focus: Focus) {
        self.focus = focus;
        self.search.set_focused(focus == Focus::Search);
        self.tree.set_focused(focus == Focus::Tree);
        self.users.set_focused(focus == Focus::Users);
        match focus {
            Focus::Field(kind) => self.recipients.focus_field(Some(kind)),
            _ => self.recipients.set_focused(false),
        }
    }

    /// Apply one action: reduce state, run the resulting effect, then let
    /// every pane react.
    fn process_action(&mut self, action: &Action) -> Result<()> {
        match action {
            Action::Quit => self.running = false,
            Action::FocusNext => self.set_focus(self.focus.next()),
            Action::FocusPrev => self.set_focus(self.focus.prev()),
            Action::Focus(target) => self.set_focus(*target),
            Action::ToggleAbout => self.about_visible = !self.about_visible,
            Action::State(event) => {
                debug!(?event, "reduce");
                if let Some(effect) = self.state.reduce(event.clone()) {
                    self.worker.run(effect);
                }
            }
            Action::Tick | Action::Render | Action::Resize(..) => {}
        }

        let state = &self.state;
        let follow_ups = [
            self.search.update(action, state)?,
            self.tree.update(action, state)?,
            self.users.update(action, state)?,
            self.recipients.update(action, state)?,
        ];
        for follow_up in follow_ups.into_iter().flatten() {
            self.action_tx.send(follow_up)?;
        }
        Ok(())
    }

    fn render(&mut self, frame: &mut Frame) {
        let area = frame.area();
        let banner_height = u16::from(self.state.error.is_some());

        let layout = Layout::vertical([
            Constraint::Length(3),             // search
            Constraint::Length(banner_height), // error banner
            Constraint::Min(6),                // tree + users
            Constraint::Length(9),             // recipients
            Constraint::Length(1),             // compose bar
        ])
        .split(area);

        let middle =
            Layout::horizontal([Constraint::Percentage(30), Constraint::Percentage(70)])
                .split(layout[2]);

        let theme = self.theme;
        let ctx = RenderCtx {
            state: &self.state,
            theme: &theme,
        };
        self.search.render(frame, layout[0], &ctx);
        self.tree.render(frame, middle[0], &ctx);
        self.users.render(frame, middle[1], &ctx);
        self.recipients.render(frame, layout[3], &ctx);

        if let Some(error) = &self.state.error {
            frame.render_widget(
                Paragraph::new(Span::styled(format!(" ✗ {error}"), theme.error_banner())),
                layout[1],
            );
        }
        self.render_compose_bar(frame, layout[4]);

        if self.about_visible {
            render_overlay(frame, area, "About addrtree", about_lines(&theme), &theme);
        }
        if let Some(notice) = &self.state.notice {
            let lines = vec![
                Line::from(Span::styled(notice.clone(), theme.warning())),
                Line::from(""),
                Line::from(Span::styled("Enter to dismiss", theme.key_hint())),
            ];
            render_overlay(frame, area, "Notice", lines, &theme);
        }
    }

    fn render_compose_bar(&self, frame: &mut Frame, area: Rect) {
        let theme = &self.theme;
        let button = |key: &'static str, label: &'static str, enabled: bool| {
            Span::styled(format!("[{key} {label}]"), theme.button(enabled))
        };

        let mut spans = vec![
            Span::raw(" "),
            button("^E", "Email", self.state.can_compose_email()),
            Span::raw(" "),
            button("^O", "Meeting", self.state.can_compose_event()),
            Span::raw(" "),
            button("^L", "Clear", !self.state.recipients.is_empty()),
            Span::styled(" │ ", theme.key_hint()),
        ];

        let hints: &[(&str, &str)] = if self.focus.is_text_entry() {
            &[("Tab", "next"), ("Esc", "leave field"), ("^C", "quit")]
        } else {
            &[
                ("Tab", "focus"),
                ("Space", "mark"),
                ("t/c/b", "add"),
                ("R", "reload"),
                ("?", "about"),
                ("q", "quit"),
            ]
        };
        for (key, label) in hints {
            spans.push(Span::styled(*key, theme.key_hint_key()));
            spans.push(Span::styled(format!(" {label}  "), theme.key_hint()));
        }

        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }
}

fn about_lines(theme: &Theme) -> Vec<Line<'static>> {
    let key = |k: &'static str, what: &'static str| {
        Line::from(vec![
            Span::styled(format!("  {k:<10}"), theme.key_hint_key()),
            Span::styled(what, theme.text()),
        ])
    };

    vec![
        Line::from(Span::styled(
            "Browse the organization by department and build recipient",
            theme.text(),
        )),
        Line::from(Span::styled(
            "lists for mail and meeting invitations.",
            theme.text(),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Provided as is, without warranty of any kind.",
            theme.muted(),
        )),
        Line::from(Span::styled(
            "Requires the delegated Graph permission User.Read.All.",
            theme.muted(),
        )),
        Line::from(""),
        key("Enter", "query department / add user to To"),
        key("Space", "expand node / mark user"),
        key("t c b", "add marked users to To, Cc, Bcc"),
        key("^E ^O", "compose email / meeting"),
        key("^L", "clear recipient lines"),
        key("paste", "one address per line into To, Cc, Bcc"),
        key("R", "reload departments from Graph"),
        key("/", "search by name"),
    ]
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use addrtree_api::{Credential, GraphClient, StaticTokenCredential, TransportConfig};
    use addrtree_core::build_tree;
    use pretty_assertions::assert_eq;
    use ratatui::{Terminal, backend::TestBackend};
    use secrecy::SecretString;

    use super::*;

    fn app() -> App {
        let client = GraphClient::new("http://127.0.0.1:9/v1.0", &TransportConfig::default()).unwrap();
        let credential =
            Credential::Static(StaticTokenCredential::new(&SecretString::from("t".to_owned())));
        let directory = Directory::new(client, credential, None, Vec::new());
        let (tx, rx) = mpsc::unbounded_channel();
        let mut app = App::new(directory, Theme::default(), tx, rx);
        app.init_panes().unwrap();
        app
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn screen_text(app: &mut App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 32)).unwrap();
        terminal.draw(|frame| app.render(frame)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(ratatui::buffer::Cell::symbol)
            .collect()
    }

    #[test]
    fn shortcuts_outside_text_fields() {
        let mut app = app();
        assert_eq!(app.handle_key_event(key(KeyCode::Char('q'))).unwrap(), Some(Action::Quit));
        assert_eq!(
            app.handle_key_event(key(KeyCode::Char('b'))).unwrap(),
            Some(Action::State(AppEvent::AddSelected(RecipientKind::Bcc)))
        );
        assert_eq!(
            app.handle_key_event(KeyEvent::new(KeyCode::Char('R'), KeyModifiers::SHIFT))
                .unwrap(),
            Some(Action::State(AppEvent::LoadRequested { reload: true }))
        );
    }

    #[test]
    fn paste_reaches_focused_field_only() {
        let mut app = app();
        assert_eq!(app.handle_paste("a@x.com").unwrap(), None);

        app.process_action(&Action::Focus(Focus::Field(RecipientKind::Cc))).unwrap();
        let edited = app.handle_paste("a@x.com\nb@x.com").unwrap().unwrap();
        assert_eq!(
            edited,
            Action::State(AppEvent::FieldEdited(RecipientKind::Cc, "a@x.com; b@x.com".into()))
        );
        app.process_action(&edited).unwrap();
        assert_eq!(app.state.recipients.cc, "a@x.com; b@x.com");

        app.process_action(&Action::ToggleAbout).unwrap();
        assert_eq!(app.handle_paste("c@x.com").unwrap(), None);
    }

    #[test]
    fn text_fields_take_letters() {
        let mut app = app();
        app.process_action(&Action::Focus(Focus::Search)).unwrap();
        assert_eq!(
            app.handle_key_event(key(KeyCode::Char('q'))).unwrap(),
            Some(Action::State(AppEvent::SearchEdited("q".into())))
        );
        assert_eq!(
            app.handle_key_event(key(KeyCode::Esc)).unwrap(),
            Some(Action::Focus(Focus::Tree))
        );
    }

    #[test]
    fn notice_blocks_until_dismissed() {
        let mut app = app();
        app.process_action(&AppEvent::AddSelected(RecipientKind::To).into())
            .unwrap();
        assert!(app.state.notice.is_some());

        assert_eq!(app.handle_key_event(key(KeyCode::Char('q'))).unwrap(), None);
        let dismiss = app.handle_key_event(key(KeyCode::Enter)).unwrap().unwrap();
        app.process_action(&dismiss).unwrap();
        assert_eq!(app.state.notice, None);
    }

    #[test]
    fn focus_ring_reaches_recipient_lines() {
        let mut app = app();
        app.process_action(&Action::FocusNext).unwrap();
        app.process_action(&Action::FocusNext).unwrap();
        assert_eq!(app.focus, Focus::Field(RecipientKind::To));

        let typed = app.handle_key_event(key(KeyCode::Char('x'))).unwrap().unwrap();
        assert_eq!(
            typed,
            Action::State(AppEvent::FieldEdited(RecipientKind::To, "x".into()))
        );
        app.process_action(&typed).unwrap();
        assert!(app.state.can_compose_email());
    }

    #[test]
    fn renders_panes_and_banner() {
        let mut app = app();
        let tree = build_tree(&["Sales Japan"]);
        app.process_action(&AppEvent::LoadSucceeded(tree).into()).unwrap();
        let failed = AppEvent::QueryFailed("Graph API request failed: 403 Forbidden: denied".into());
        app.process_action(&failed.into()).unwrap();

        let text = screen_text(&mut app);
        assert!(text.contains("Departments"));
        assert!(text.contains("Sales"));
        assert!(text.contains("403 Forbidden"));
        assert!(text.contains("[^E Email]"));
    }

    #[test]
    fn about_overlay_mentions_permission() {
        let mut app = app();
        let toggle = app.handle_key_event(key(KeyCode::Char('?'))).unwrap().unwrap();
        app.process_action(&toggle).unwrap();
        assert!(screen_text(&mut app).contains("User.Read.All"));
    }
}
