//! Per-source listing cache on top of a [`KvStore`].
//!
//! Each federation's listing is stored under `federationListCache:<uri>` as a
//! [`FileListingCacheEntry`]. Entries younger than [`LISTING_TTL_MS`] are
//! served without touching the network; older ones are only kept around as a
//! fallback for failed fetches. Nothing is ever deleted.

use std::io;
use std::sync::Arc;

use crate::config::FederationConfig;
use crate::store::KvStore;
use crate::types::{FileListingCacheEntry, FileMeta};

/// Key prefix for listing cache entries.
pub const CACHE_KEY_PREFIX: &str = "federationListCache:";

/// Maximum age of a listing before it is refreshed.
pub const LISTING_TTL_MS: u64 = 30_000;

/// Result of consulting the cache for one source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheLookup {
    /// Younger than the TTL; use as is.
    Fresh(Vec<FileMeta>),
    /// Too old to serve, usable as a fallback.
    Stale(FileListingCacheEntry),
    Missing,
}

pub struct ListingCache {
    store: Arc<dyn KvStore>,
}

impl ListingCache {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    /// Read the entry for `config`. Store failures and undecodable values
    /// count as a miss.
    pub async fn get(&self, config: &FederationConfig) -> Option<FileListingCacheEntry> {
        let key = config.cache_key();
        let value = match self.store.get(&key).await {
            Ok(Some(value)) => value,
            Ok(None) => return None,
            Err(e) => {
                log::warn!("failed to read listing cache {}: {}", key, e);
                return None;
            }
        };
        match serde_json::from_value(value) {
            Ok(entry) => Some(entry),
            Err(e) => {
                log::warn!("ignoring undecodable listing cache {}: {}", key, e);
                None
            }
        }
    }

    /// Classify the entry for `config` against the TTL at time `now`.
    pub async fn lookup(&self, config: &FederationConfig, now: u64) -> CacheLookup {
        match self.get(config).await {
            Some(entry) if now.saturating_sub(entry.last_updated) < LISTING_TTL_MS => {
                CacheLookup::Fresh(entry.items)
            }
            Some(entry) => CacheLookup::Stale(entry),
            None => CacheLookup::Missing,
        }
    }

    /// Overwrite the entry for `config`, stamped with `now`.
    pub async fn put(&self, config: &FederationConfig, items: &[FileMeta], now: u64) -> io::Result<()> {
        let entry = FileListingCacheEntry {
            items: items.to_vec(),
            last_updated: now,
        };
        let value = serde_json::to_value(&entry).map_err(io::Error::other)?;
        self.store.set(&config.cache_key(), value).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::types::Permission;
    use serde_json::json;

    fn item(name: &str) -> FileMeta {
        FileMeta {
            name: name.to_string(),
            size: 1,
            content_type: "text/markdown".to_string(),
            perm: Permission::Ro,
            last_modified: 0,
        }
    }

    fn setup() -> (Arc<MemoryStore>, ListingCache) {
        let store = Arc::new(MemoryStore::new());
        let cache = ListingCache::new(store.clone());
        (store, cache)
    }

    #[tokio::test]
    async fn test_missing() {
        let (_store, cache) = setup();
        let config = FederationConfig::new("a", None);
        assert_eq!(cache.lookup(&config, 1000).await, CacheLookup::Missing);
    }

    #[tokio::test]
    async fn test_fresh_within_ttl() {
        let (_store, cache) = setup();
        let config = FederationConfig::new("a", None);
        cache.put(&config, &[item("a/x.md")], 1_000).await.unwrap();
        assert_eq!(
            cache.lookup(&config, 1_000 + LISTING_TTL_MS - 1).await,
            CacheLookup::Fresh(vec![item("a/x.md")])
        );
    }

    #[tokio::test]
    async fn test_stale_at_exactly_ttl() {
        let (_store, cache) = setup();
        let config = FederationConfig::new("a", None);
        cache.put(&config, &[item("a/x.md")], 1_000).await.unwrap();
        let CacheLookup::Stale(entry) = cache.lookup(&config, 1_000 + LISTING_TTL_MS).await else {
            panic!("expected stale entry");
        };
        assert_eq!(entry.last_updated, 1_000);
        assert_eq!(entry.items, vec![item("a/x.md")]);
    }

    #[tokio::test]
    async fn test_entry_stored_under_prefixed_uri() {
        let (store, cache) = setup();
        let config = FederationConfig::new("example.com/docs", None);
        cache.put(&config, &[], 5).await.unwrap();
        let raw = store
            .get("federationListCache:example.com/docs")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(raw, json!({"items": [], "lastUpdated": 5}));
    }

    #[tokio::test]
    async fn test_undecodable_entry_is_missing() {
        let (store, cache) = setup();
        let config = FederationConfig::new("a", None);
        store.set(&config.cache_key(), json!("garbage")).await.unwrap();
        assert_eq!(cache.lookup(&config, 0).await, CacheLookup::Missing);
    }

    #[tokio::test]
    async fn test_keys_are_private_per_source() {
        let (_store, cache) = setup();
        let a = FederationConfig::new("a", None);
        let b = FederationConfig::new("b", None);
        cache.put(&a, &[item("a/x.md")], 0).await.unwrap();
        assert_eq!(cache.lookup(&b, 0).await, CacheLookup::Missing);
    }
}
