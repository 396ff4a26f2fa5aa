// addrtree-core: Department tree, user queries, and recipient handling over Microsoft Graph.

pub mod auth;
pub mod cache;
pub mod compose;
pub mod config;
pub mod directory;
pub mod error;
pub mod loader;
pub mod model;
pub mod query;
pub mod recipients;
pub mod selection;
pub mod state;
pub mod tree;

// ── Primary re-exports ──────────────────────────────────────────────
pub use auth::acquire_token;
pub use cache::{CacheStore, FileStore, KeyValueStore, MemoryStore};
pub use config::{AuthCredentials, DirectoryConfig};
pub use directory::Directory;
pub use error::CoreError;
pub use loader::{DepartmentLoader, LoadSource};
pub use model::{NodeRef, TreeNode, User};
pub use query::{UserFilter, UserQueryService, escape_odata_literal};
pub use recipients::{RecipientKind, Recipients};
pub use selection::SelectionModel;
pub use state::{AppEvent, AppState, Effect};
pub use tree::build_tree;
