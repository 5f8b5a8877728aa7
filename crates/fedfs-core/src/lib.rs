//! fedfs-core: federated file listings and file access.
//!
//! Aggregates the directory listings of several remote "federated" sources
//! into one namespace, each remote file addressed as `<rootUri>/<name>`.
//! Listings are cached per source for 30 seconds and fall back to the stale
//! cache when a source is unreachable.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use fedfs_core::{
//!     DefaultUrlResolver, FederatedSource, FederationConfig, FileSource, HttpConfig,
//!     MemoryStore, ReqwestTransport, StaticRegistry, SystemClock,
//! };
//!
//! #[tokio::main]
//! async fn main() -> std::io::Result<()> {
//!     let registry = StaticRegistry::new(vec![FederationConfig::new("example.com/docs", None)]);
//!     let source = FederatedSource::connect(
//!         Arc::new(registry),
//!         Arc::new(ReqwestTransport::new(&HttpConfig::default())?),
//!         Arc::new(DefaultUrlResolver),
//!         Arc::new(MemoryStore::new()),
//!         Arc::new(SystemClock),
//!     );
//!     for file in source.list_files().await? {
//!         println!("{} {}", file.perm.as_str(), file.name);
//!     }
//!     Ok(())
//! }
//! ```

use std::future::Future;
use std::pin::Pin;

pub mod accessor;
pub mod aggregator;
pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod local;
pub mod name;
pub mod permissions;
pub mod remote;
pub mod resolve;
pub mod source;
pub mod space;
pub mod store;
pub mod transport;
pub mod types;

/// Boxed, Send future returned by every injectable trait method.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub use accessor::FileAccessor;
pub use aggregator::{Aggregator, SourceOutcome};
pub use cache::{CacheLookup, LISTING_TTL_MS, ListingCache};
pub use clock::{Clock, SystemClock};
pub use config::{FederationConfig, FedfsConfig, FileRegistry, HttpConfig, SourceRegistry, StaticRegistry};
pub use error::{FsError, FsResult};
pub use local::LocalSource;
pub use name::FileName;
pub use remote::RemoteDirectoryClient;
pub use resolve::{DefaultUrlResolver, UrlResolver};
pub use source::{Capability, FederatedSource, FileSource};
pub use space::Space;
pub use store::{JsonFileStore, KvStore, MemoryStore};
pub use transport::{HttpResponse, HttpTransport, ReqwestTransport};
pub use types::{FileData, FileListingCacheEntry, FileMeta, Permission};

#[cfg(test)]
pub(crate) mod test_support;
