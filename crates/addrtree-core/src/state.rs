// ── Application state ──
//
// All UI-visible state lives in `AppState` and changes only through
// `AppState::reduce`. Side effects (network, opening URLs) are returned as
// `Effect`s for the caller to run; their outcomes come back as events.

use crate::compose;
use crate::model::{NodeRef, TreeNode, User};
use crate::query::UserFilter;
use crate::recipients::{RecipientKind, Recipients};

/// Banner text when the department tree cannot be loaded.
pub const LOAD_ERROR_MESSAGE: &str = "Failed to load the department tree";
/// Banner text when a query fails without a message of its own.
pub const QUERY_ERROR_MESSAGE: &str = "Failed to fetch users";
/// Notice shown when adding recipients with nothing selected.
pub const EMPTY_SELECTION_NOTICE: &str = "Select at least one user.";

/// Everything that can happen to the state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    // ── Department tree ──
    LoadRequested { reload: bool },
    LoadStarted,
    LoadSucceeded(Vec<TreeNode>),
    LoadFailed(String),
    NodeSelected(NodeRef),

    // ── Search & results ──
    SearchEdited(String),
    SearchSubmitted,
    QueryStarted,
    QuerySucceeded(Vec<User>),
    QueryFailed(String),
    ResultsCleared,
    SelectionChanged(Vec<User>),

    // ── Recipients ──
    FieldEdited(RecipientKind, String),
    AddSelected(RecipientKind),
    UserInvoked(User),
    FieldsCleared,

    // ── Compose ──
    ComposeEmail,
    ComposeEvent,

    // ── Notices ──
    Notice(String),
    NoticeDismissed,
}

/// Work the caller must perform after a state change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Load the department tree; `reload` drops the cache first.
    LoadDepartments { reload: bool },
    QueryUsers(UserFilter),
    /// Hand a URL to the OS handler.
    OpenUrl(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppState {
    pub tree: Vec<TreeNode>,
    pub tree_loading: bool,
    pub selected_node: Option<NodeRef>,
    pub users: Vec<User>,
    pub query_loading: bool,
    /// Error banner: a failed load or query.
    pub error: Option<String>,
    pub search: String,
    /// Users currently marked in the result list.
    pub selection: Vec<User>,
    pub recipients: Recipients,
    /// Dismissible notice that blocks input until acknowledged.
    pub notice: Option<String>,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn can_compose_email(&self) -> bool {
        compose::can_compose_email(&self.recipients)
    }

    pub fn can_compose_event(&self) -> bool {
        compose::can_compose_event(&self.recipients)
    }

    /// Apply one event. Returns the side effect it calls for, if any.
    pub fn reduce(&mut self, event: AppEvent) -> Option<Effect> {
        match event {
            AppEvent::LoadRequested { reload } => {
                return Some(Effect::LoadDepartments { reload });
            }
            AppEvent::LoadStarted => {
                self.tree_loading = true;
            }
            AppEvent::LoadSucceeded(tree) => {
                self.tree = tree;
                self.tree_loading = false;
            }
            AppEvent::LoadFailed(_) => {
                self.tree.clear();
                self.tree_loading = false;
                self.error = Some(LOAD_ERROR_MESSAGE.to_owned());
            }
            AppEvent::NodeSelected(node) => {
                let filter = UserFilter::for_node_ref(&node);
                self.selected_node = Some(node);
                return Some(Effect::QueryUsers(filter));
            }
            AppEvent::SearchEdited(value) => {
                self.search = value;
            }
            AppEvent::SearchSubmitted => {
                if let Some(filter) = UserFilter::from_search(&self.search) {
                    return Some(Effect::QueryUsers(filter));
                }
                self.clear_results();
            }
            AppEvent::QueryStarted => {
                self.query_loading = true;
                self.error = None;
            }
            AppEvent::QuerySucceeded(users) => {
                self.users = users;
                self.selection.clear();
                self.query_loading = false;
            }
            AppEvent::QueryFailed(message) => {
                self.clear_results();
                self.query_loading = false;
                self.error = Some(if message.is_empty() {
                    QUERY_ERROR_MESSAGE.to_owned()
                } else {
                    message
                });
            }
            AppEvent::ResultsCleared => self.clear_results(),
            AppEvent::SelectionChanged(users) => {
                self.selection = users;
            }
            AppEvent::FieldEdited(kind, value) => self.recipients.set(kind, value),
            AppEvent::AddSelected(kind) => {
                if self.selection.is_empty() {
                    self.notice = Some(EMPTY_SELECTION_NOTICE.to_owned());
                } else {
                    self.recipients.add(kind, &self.selection);
                }
            }
            AppEvent::UserInvoked(user) => {
                self.recipients.add(RecipientKind::To, &[user]);
            }
            AppEvent::FieldsCleared => {
                self.recipients.clear();
                self.selection.clear();
            }
            AppEvent::ComposeEmail => {
                return compose::mailto_url(&self.recipients).map(Effect::OpenUrl);
            }
            AppEvent::ComposeEvent => {
                return compose::event_url(&self.recipients).map(|u| Effect::OpenUrl(u.into()));
            }
            AppEvent::Notice(message) => {
                self.notice = Some(message);
            }
            AppEvent::NoticeDismissed => {
                self.notice = None;
            }
        }
        None
    }

    fn clear_results(&mut self) {
        self.users.clear();
        self.selection.clear();
    }
}
