//! Listing aggregation across all federation sources.
//!
//! Every configured source is listed concurrently on the caller's task
//! (`join_all`, no spawning). Each source resolves to its own
//! [`SourceOutcome`]; the outcomes are concatenated after the join, so no
//! shared accumulator is needed. A source's failure never leaves its own
//! future: it degrades to the stale cached listing, or to nothing.
//!
//! ```text
//! registry -> per source: cache lookup -> (fresh? done) -> index fetch
//!                                                        -> ok: cache write
//!                                                        -> err: stale or empty
//! ```

use std::io;
use std::sync::Arc;

use futures_util::future::join_all;

use crate::cache::{CacheLookup, ListingCache};
use crate::clock::Clock;
use crate::config::{FederationConfig, SourceRegistry};
use crate::remote::RemoteDirectoryClient;
use crate::types::{FileMeta, IndexEntry};

/// How one source's contribution to a listing was obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceOutcome {
    /// Served from a cache entry younger than the TTL.
    Cached(Vec<FileMeta>),
    /// Fetched from the remote and written back to the cache.
    Fetched(Vec<FileMeta>),
    /// Fetch failed; served from an expired cache entry.
    Stale(Vec<FileMeta>),
    /// Fetch failed with nothing cached.
    Failed,
}

impl SourceOutcome {
    pub fn into_items(self) -> Vec<FileMeta> {
        match self {
            SourceOutcome::Cached(items)
            | SourceOutcome::Fetched(items)
            | SourceOutcome::Stale(items) => items,
            SourceOutcome::Failed => Vec::new(),
        }
    }
}

/// Keep the entries under `config`'s prefix, renamed to `<rootUri>/<name>`
/// and given the source's permission.
pub fn map_index_entries(config: &FederationConfig, entries: Vec<IndexEntry>) -> Vec<FileMeta> {
    let root = config.root_uri();
    let prefix = config.prefix();
    let perm = config.permission();
    entries
        .into_iter()
        .filter(|entry| entry.name.starts_with(prefix))
        .map(|entry| FileMeta {
            name: format!("{}/{}", root, entry.name),
            size: entry.size,
            content_type: entry.content_type,
            perm,
            last_modified: entry.last_modified,
        })
        .collect()
}

pub struct Aggregator {
    registry: Arc<dyn SourceRegistry>,
    client: RemoteDirectoryClient,
    cache: ListingCache,
    clock: Arc<dyn Clock>,
}

impl Aggregator {
    pub fn new(
        registry: Arc<dyn SourceRegistry>,
        client: RemoteDirectoryClient,
        cache: ListingCache,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            registry,
            client,
            cache,
            clock,
        }
    }

    /// All files visible across all sources. Never fails: unreachable
    /// sources contribute their stale listing or nothing, and a registry
    /// failure yields an empty list. Order across sources is unspecified.
    pub async fn list_files(&self) -> Vec<FileMeta> {
        match self.list_outcomes().await {
            Ok(outcomes) => outcomes
                .into_iter()
                .flat_map(|(_, outcome)| outcome.into_items())
                .collect(),
            Err(e) => {
                log::error!("failed to list federated files: {}", e);
                Vec::new()
            }
        }
    }

    /// Per-source outcomes, in registry order.
    pub async fn list_outcomes(&self) -> io::Result<Vec<(FederationConfig, SourceOutcome)>> {
        let configs = self.registry.federations().await?;
        let outcomes = join_all(configs.iter().map(|config| self.list_source(config))).await;
        Ok(configs.into_iter().zip(outcomes).collect())
    }

    async fn list_source(&self, config: &FederationConfig) -> SourceOutcome {
        let fallback = match self.cache.lookup(config, self.clock.now_ms()).await {
            CacheLookup::Fresh(items) => {
                log::debug!("{}: serving {} cached items", config.uri, items.len());
                return SourceOutcome::Cached(items);
            }
            CacheLookup::Stale(entry) => Some(entry.items),
            CacheLookup::Missing => None,
        };

        match self.fetch_source(config).await {
            Ok(items) => {
                log::debug!("{}: fetched {} items", config.uri, items.len());
                if let Err(e) = self.cache.put(config, &items, self.clock.now_ms()).await {
                    log::warn!("{}: failed to cache listing: {}", config.uri, e);
                }
                SourceOutcome::Fetched(items)
            }
            Err(e) => {
                log::warn!("{}: failed to fetch listing: {}", config.uri, e);
                match fallback {
                    Some(items) => SourceOutcome::Stale(items),
                    None => SourceOutcome::Failed,
                }
            }
        }
    }

    async fn fetch_source(&self, config: &FederationConfig) -> io::Result<Vec<FileMeta>> {
        let response = self.client.fetch_index(config).await?;
        if response.status != 200 {
            return Err(io::Error::other(format!(
                "HTTP {} fetching index of '{}'",
                response.status,
                config.root_uri()
            )));
        }
        Ok(map_index_entries(config, response.entries))
    }
}
