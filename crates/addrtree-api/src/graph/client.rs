// Async client for the Microsoft Graph users collection.
//
// Base URL: https://graph.microsoft.com/v1.0/
// Auth: `Authorization: Bearer <token>` per request; the client itself holds
// no credentials so one instance serves every signed-in session.

use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use super::paging::Paged;
use super::types::{DepartmentRecord, ErrorEnvelope, GraphUser, Page};
use crate::auth::AccessToken;
use crate::error::Error;
use crate::transport::TransportConfig;

/// Largest page size Graph accepts for `/users`.
pub const MAX_PAGE_SIZE: u32 = 999;

const USER_FIELDS: &[&str] = &["id", "displayName", "department", "mail", "jobTitle"];

// ── Query ────────────────────────────────────────────────────────────

/// OData query options for `GET /users`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsersQuery {
    select: Vec<&'static str>,
    filter: Option<String>,
    top: u32,
}

impl UsersQuery {
    /// Every user, projected to `department` only.
    pub fn departments() -> Self {
        Self {
            select: vec!["department"],
            filter: None,
            top: MAX_PAGE_SIZE,
        }
    }

    /// Users matching an optional `$filter` expression, projected to the
    /// fields the directory lists.
    pub fn users(filter: Option<String>) -> Self {
        Self {
            select: USER_FIELDS.to_vec(),
            filter,
            top: MAX_PAGE_SIZE,
        }
    }

    /// Render as a query string. `$select` and `$top` are emitted verbatim;
    /// the filter expression is percent-encoded with `%20` for spaces.
    pub fn to_query_string(&self) -> String {
        let mut qs = format!("$select={}", self.select.join(","));
        if let Some(filter) = &self.filter {
            qs.push_str("&$filter=");
            qs.push_str(&urlencoding::encode(filter));
        }
        qs.push_str(&format!("&$top={}", self.top));
        qs
    }
}

// ── Client ───────────────────────────────────────────────────────────

/// Async client for Graph `/users`.
///
/// Cheap to clone: the underlying `reqwest::Client` is reference-counted,
/// which lets every [`Paged`] stream own its copy.
#[derive(Debug, Clone)]
pub struct GraphClient {
    http: reqwest::Client,
    base_url: Url,
}

impl GraphClient {
    // ── Constructors ─────────────────────────────────────────────────

    pub fn new(base_url: &str, transport: &TransportConfig) -> Result<Self, Error> {
        Self::from_reqwest(base_url, transport.build_client()?)
    }

    /// Wrap an existing `reqwest::Client`.
    pub fn from_reqwest(base_url: &str, http: reqwest::Client) -> Result<Self, Error> {
        Ok(Self {
            http,
            base_url: Self::normalize_base_url(base_url)?,
        })
    }

    /// Ensure the path ends in `/` so relative joins append instead of
    /// replacing the last segment (`.../v1.0` + `users`).
    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw)?;
        let path = url.path().trim_end_matches('/').to_owned();
        url.set_path(&format!("{path}/"));
        Ok(url)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builder ──────────────────────────────────────────────────

    fn users_url(&self, query: &UsersQuery) -> Result<Url, Error> {
        let mut url = self.base_url.join("users")?;
        url.set_query(Some(&query.to_query_string()));
        Ok(url)
    }

    // ── Request plumbing ─────────────────────────────────────────────

    /// Fetch a single page from an absolute URL (first page or `nextLink`).
    pub(crate) async fn get_page<T: DeserializeOwned>(
        &self,
        url: Url,
        token: &AccessToken,
    ) -> Result<Page<T>, Error> {
        debug!("GET {url}");
        let resp = self
            .http
            .get(url)
            .bearer_auth(token.secret())
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;
        Self::handle_response(resp).await
    }

    async fn handle_response<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
        let status = resp.status();
        if status.is_success() {
            let body = resp.text().await?;
            serde_json::from_str(&body).map_err(|e| {
                let preview = body.chars().take(200).collect::<String>();
                Error::Deserialization {
                    message: format!("{e} (body preview: {preview:?})"),
                    body,
                }
            })
        } else {
            Err(Self::parse_error(status, resp).await)
        }
    }

    async fn parse_error(status: reqwest::StatusCode, resp: reqwest::Response) -> Error {
        let reason = status.canonical_reason().unwrap_or_default().to_owned();
        let raw = resp.text().await.unwrap_or_default();

        match serde_json::from_str::<ErrorEnvelope>(&raw) {
            Ok(env) => Error::Graph {
                status: status.as_u16(),
                message: env.error.message.unwrap_or_else(|| reason.clone()),
                reason,
                code: env.error.code,
            },
            Err(_) => Error::Graph {
                status: status.as_u16(),
                message: if raw.is_empty() { reason.clone() } else { raw },
                reason,
                code: None,
            },
        }
    }

    // ━━ Public API ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    /// Lazily page through `/users` with arbitrary query options.
    pub fn users<T>(&self, token: &AccessToken, query: &UsersQuery) -> Result<Paged<T>, Error>
    where
        T: DeserializeOwned + Send + 'static,
    {
        Ok(Paged::new(self.clone(), self.users_url(query)?, token.clone()))
    }

    /// The `department` of every user in the tenant.
    pub fn list_departments(&self, token: &AccessToken) -> Result<Paged<DepartmentRecord>, Error> {
        self.users(token, &UsersQuery::departments())
    }

    /// Users matching `filter`, or every user when `None`.
    pub fn list_users(
        &self,
        token: &AccessToken,
        filter: Option<String>,
    ) -> Result<Paged<GraphUser>, Error> {
        self.users(token, &UsersQuery::users(filter))
    }
}
