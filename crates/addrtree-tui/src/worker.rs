//! Runs reducer effects off the UI task.
//!
//! Network work is spawned onto tokio; outcomes come back as actions over the
//! app channel, so `AppState` is only ever touched by the UI loop. Overlapping
//! queries are not cancelled; whichever finishes last is applied last.

use addrtree_core::{AppEvent, Directory, Effect, UserFilter};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, error, info, warn};

use crate::action::Action;

pub struct Worker {
    directory: Directory,
    action_tx: UnboundedSender<Action>,
}

impl Worker {
    pub fn new(directory: Directory, action_tx: UnboundedSender<Action>) -> Self {
        Self {
            directory,
            action_tx,
        }
    }

    pub fn run(&self, effect: Effect) {
        match effect {
            Effect::LoadDepartments { reload } => self.load_departments(reload),
            Effect::QueryUsers(filter) => self.query_users(filter),
            Effect::OpenUrl(url) => self.open_url(&url),
        }
    }

    fn send(&self, event: AppEvent) {
        let _ = self.action_tx.send(event.into());
    }

    fn load_departments(&self, reload: bool) {
        self.send(AppEvent::LoadStarted);
        let directory = self.directory.clone();
        let tx = self.action_tx.clone();

        tokio::spawn(async move {
            let result = if reload {
                directory.reload_departments().await
            } else {
                directory.load_departments().await
            };
            let event = match result {
                Ok(tree) => {
                    info!(roots = tree.len(), "department tree ready");
                    AppEvent::LoadSucceeded(tree)
                }
                Err(e) => {
                    error!(error = %e, "department load failed");
                    AppEvent::LoadFailed(e.to_string())
                }
            };
            let _ = tx.send(event.into());
        });
    }

    fn query_users(&self, filter: UserFilter) {
        self.send(AppEvent::QueryStarted);
        let directory = self.directory.clone();
        let tx = self.action_tx.clone();

        tokio::spawn(async move {
            debug!(?filter, "querying users");
            let event = match directory.query_users(&filter).await {
                Ok(users) => {
                    info!(count = users.len(), "user query complete");
                    AppEvent::QuerySucceeded(users)
                }
                Err(e) => {
                    error!(error = %e, "user query failed");
                    AppEvent::QueryFailed(e.to_string())
                }
            };
            let _ = tx.send(event.into());
        });
    }

    fn open_url(&self, url: &str) {
        debug!(url, "opening compose link");
        if let Err(e) = open::that_detached(url) {
            warn!(error = %e, "could not open compose link");
            self.send(AppEvent::Notice(format!(
                "Could not open the default handler: {e}"
            )));
        }
    }
}
