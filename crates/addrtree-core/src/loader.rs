// ── Department loader ──
//
// Cache first; on a miss, page through every user's department, dedupe and
// sort, refresh the cache, and build the tree.

use std::collections::BTreeSet;

use addrtree_api::{GraphClient, TokenCredential};
use futures_util::{TryStreamExt, pin_mut};
use tracing::{debug, error, info};

use crate::auth::acquire_token;
use crate::cache::{CacheStore, DEPARTMENTS_CACHE_KEY};
use crate::error::CoreError;
use crate::model::TreeNode;
use crate::tree::build_tree;

/// Where a department list came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum LoadSource {
    Cache,
    Network,
}

pub struct DepartmentLoader<'a, C> {
    client: &'a GraphClient,
    credential: &'a C,
    scopes: &'a [String],
    cache: Option<&'a CacheStore>,
}

impl<'a, C: TokenCredential> DepartmentLoader<'a, C> {
    pub fn new(client: &'a GraphClient, credential: &'a C, scopes: &'a [String]) -> Self {
        Self {
            client,
            credential,
            scopes,
            cache: None,
        }
    }

    #[must_use]
    pub fn with_cache(mut self, cache: Option<&'a CacheStore>) -> Self {
        self.cache = cache;
        self
    }

    /// Build the department tree, from cache when possible.
    pub async fn load(&self) -> Result<Vec<TreeNode>, CoreError> {
        let (departments, source) = self.departments().await?;
        info!(count = departments.len(), %source, "departments loaded");
        Ok(build_tree(&departments))
    }

    /// The sorted, deduplicated department list and where it came from.
    pub async fn departments(&self) -> Result<(Vec<String>, LoadSource), CoreError> {
        if let Some(lines) = self.cache.and_then(|c| c.get(DEPARTMENTS_CACHE_KEY)) {
            return Ok((lines, LoadSource::Cache));
        }

        let departments = self.fetch_departments().await.inspect_err(|e| {
            error!(error = %e, "department fetch failed");
        })?;

        if let Some(cache) = self.cache {
            if departments.is_empty() {
                debug!("no departments found, cache left untouched");
            } else {
                cache.put(DEPARTMENTS_CACHE_KEY, &departments);
            }
        }

        Ok((departments, LoadSource::Network))
    }

    /// Page through `/users?$select=department`, keeping non-blank values.
    pub async fn fetch_departments(&self) -> Result<Vec<String>, CoreError> {
        let token = acquire_token(self.credential, self.scopes).await?;
        let paged = self.client.list_departments(&token)?;
        let pages = paged.pages();
        pin_mut!(pages);

        let mut seen = BTreeSet::new();
        while let Some(records) = pages.try_next().await? {
            seen.extend(
                records
                    .into_iter()
                    .filter_map(|r| r.department)
                    .map(|d| d.trim().to_owned())
                    .filter(|d| !d.is_empty()),
            );
        }
        Ok(seen.into_iter().collect())
    }
}
