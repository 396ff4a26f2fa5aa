// ── Directory facade ──
//
// The single entry point for consumers: owns the Graph client, the
// credential, and the optional department cache. Cheaply cloneable so each
// background task can hold its own handle.

use std::sync::Arc;

use addrtree_api::transport::{TlsMode, TransportConfig};
use addrtree_api::{
    Credential, DeviceCodeCredential, GraphClient, PromptCallback, StaticTokenCredential,
    TokenCredential,
};
use secrecy::SecretString;
use tracing::debug;

use crate::cache::{CacheStore, DEPARTMENTS_CACHE_KEY, FileStore};
use crate::config::{AuthCredentials, DirectoryConfig};
use crate::error::CoreError;
use crate::loader::DepartmentLoader;
use crate::model::{TreeNode, User};
use crate::query::{UserFilter, UserQueryService};

pub struct Directory<C = Credential> {
    inner: Arc<DirectoryInner<C>>,
}

struct DirectoryInner<C> {
    client: GraphClient,
    credential: C,
    cache: Option<CacheStore>,
    scopes: Vec<String>,
}

impl<C> Clone for Directory<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<C: TokenCredential> Directory<C> {
    pub fn new(
        client: GraphClient,
        credential: C,
        cache: Option<CacheStore>,
        scopes: Vec<String>,
    ) -> Self {
        Self {
            inner: Arc::new(DirectoryInner {
                client,
                credential,
                cache,
                scopes,
            }),
        }
    }

    /// Department tree, served from cache when fresh.
    pub async fn load_departments(&self) -> Result<Vec<TreeNode>, CoreError> {
        let inner = &*self.inner;
        DepartmentLoader::new(&inner.client, &inner.credential, &inner.scopes)
            .with_cache(inner.cache.as_ref())
            .load()
            .await
    }

    /// Drop the cached department list, then load from the network.
    pub async fn reload_departments(&self) -> Result<Vec<TreeNode>, CoreError> {
        if let Some(cache) = &self.inner.cache {
            debug!("invalidating department cache");
            cache.invalidate(DEPARTMENTS_CACHE_KEY);
        }
        self.load_departments().await
    }

    pub async fn query_users(&self, filter: &UserFilter) -> Result<Vec<User>, CoreError> {
        let inner = &*self.inner;
        UserQueryService::new(&inner.client, &inner.credential, &inner.scopes)
            .query_users(filter)
            .await
    }
}

impl Directory<Credential> {
    /// Wire up transport, credential, and cache from configuration.
    ///
    /// `prompt` is shown the device code when interactive sign-in is needed.
    pub fn from_config(config: &DirectoryConfig, prompt: PromptCallback) -> Result<Self, CoreError> {
        let transport = TransportConfig {
            tls: config
                .ca_cert
                .clone()
                .map_or(TlsMode::System, TlsMode::CustomCa),
            timeout: config.timeout,
        };

        let client = GraphClient::new(config.graph_url.as_str(), &transport)?;

        let credential = match &config.auth {
            AuthCredentials::Token(token) => Credential::Static(StaticTokenCredential::new(token)),
            AuthCredentials::DeviceCode {
                tenant,
                client_id,
                refresh_token,
            } => {
                let cred = DeviceCodeCredential::new(tenant, client_id, prompt, &transport)?;
                Credential::DeviceCode(match refresh_token {
                    Some(rt) => cred.with_refresh_token(rt.clone()),
                    None => cred,
                })
            }
        };

        let cache = config
            .cache_dir
            .as_ref()
            .map(|dir| CacheStore::new(Arc::new(FileStore::new(dir.clone())), config.cache_ttl));

        Ok(Self::new(client, credential, cache, config.scopes.clone()))
    }

    /// The device-code refresh token currently held, for persisting.
    pub async fn refresh_token(&self) -> Option<SecretString> {
        match &self.inner.credential {
            Credential::DeviceCode(cred) => cred.refresh_token().await,
            Credential::Static(_) => None,
        }
    }
}
