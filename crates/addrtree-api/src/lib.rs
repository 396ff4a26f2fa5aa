// addrtree-api: Async Rust client for the Microsoft Graph users collection

pub mod auth;
pub mod device_code;
pub mod error;
pub mod graph;
pub mod transport;

pub use auth::{AccessToken, Credential, StaticTokenCredential, TokenCredential};
pub use device_code::{DeviceCodeCredential, DeviceCodePrompt, PromptCallback};
pub use error::Error;
pub use graph::{GraphClient, Paged, UsersQuery};
pub use transport::{TlsMode, TransportConfig};

/// Graph v1.0 root used when no profile overrides it.
pub const DEFAULT_GRAPH_URL: &str = "https://graph.microsoft.com/v1.0";

/// Delegated permission needed to list every user in the tenant.
pub const USER_READ_ALL_SCOPE: &str = "https://graph.microsoft.com/User.Read.All";
