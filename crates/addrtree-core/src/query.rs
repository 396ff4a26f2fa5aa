// ── User queries ──
//
// OData filter construction and the paged `/users` query behind the table.

use addrtree_api::{GraphClient, TokenCredential};
use tracing::{debug, warn};

use crate::auth::acquire_token;
use crate::error::CoreError;
use crate::model::tree_node::SENTINEL_FULL_LABEL;
use crate::model::{NodeRef, TreeNode, User};

/// Double every single quote for use inside an OData string literal.
pub fn escape_odata_literal(value: &str) -> String {
    value.replace('\'', "''")
}

/// Which users to list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserFilter {
    /// Everyone; no `$filter` at all.
    All,
    /// Exact department match.
    Department(String),
    /// Prefix match on department, display name, or mail.
    Prefix(String),
}

impl UserFilter {
    /// A search box submission. Blank input means "clear results".
    pub fn from_search(input: &str) -> Option<Self> {
        let trimmed = input.trim();
        (!trimmed.is_empty()).then(|| Self::Prefix(trimmed.to_owned()))
    }

    pub fn for_node(node: &TreeNode) -> Self {
        Self::for_full_label(&node.full_label)
    }

    pub fn for_node_ref(node: &NodeRef) -> Self {
        Self::for_full_label(&node.full_label)
    }

    fn for_full_label(full_label: &str) -> Self {
        if full_label == SENTINEL_FULL_LABEL {
            Self::All
        } else {
            Self::Department(full_label.to_owned())
        }
    }

    /// The `$filter` expression, unencoded.
    pub fn to_odata(&self) -> Option<String> {
        match self {
            Self::All => None,
            Self::Department(label) => {
                Some(format!("department eq '{}'", escape_odata_literal(label)))
            }
            Self::Prefix(value) => {
                let v = escape_odata_literal(value);
                Some(format!(
                    "startsWith(department,'{v}') OR startsWith(displayName,'{v}') OR startsWith(mail,'{v}')"
                ))
            }
        }
    }
}

pub struct UserQueryService<'a, C> {
    client: &'a GraphClient,
    credential: &'a C,
    scopes: &'a [String],
}

impl<'a, C: TokenCredential> UserQueryService<'a, C> {
    pub fn new(client: &'a GraphClient, credential: &'a C, scopes: &'a [String]) -> Self {
        Self {
            client,
            credential,
            scopes,
        }
    }

    /// Every user matching `filter`, across all pages, in server order.
    pub async fn query_users(&self, filter: &UserFilter) -> Result<Vec<User>, CoreError> {
        let token = acquire_token(self.credential, self.scopes).await?;
        debug!(?filter, "querying users");

        let users = self
            .client
            .list_users(&token, filter.to_odata())?
            .collect_all()
            .await
            .inspect_err(|e| warn!(error = %e, "user query failed"))?;

        Ok(users.into_iter().map(User::from).collect())
    }
}
