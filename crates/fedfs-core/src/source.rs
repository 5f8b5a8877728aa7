//! File source trait: the storage abstraction behind a [`crate::Space`].
//!
//! Sources receive validated [`FileName`] values and carry no routing logic.
//! Each reports a [`Capability`]; read-only sources refuse writes and deletes
//! outright instead of silently ignoring them.
//!
//! Methods return `Pin<Box<dyn Future>>` so that `Box<dyn FileSource>` works.

use std::sync::Arc;

use crate::BoxFuture;
use crate::accessor::FileAccessor;
use crate::aggregator::Aggregator;
use crate::cache::ListingCache;
use crate::clock::Clock;
use crate::config::SourceRegistry;
use crate::error::FsResult;
use crate::name::FileName;
use crate::remote::RemoteDirectoryClient;
use crate::resolve::UrlResolver;
use crate::store::KvStore;
use crate::transport::HttpTransport;
use crate::types::{FileData, FileMeta};

/// What a source allows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    ReadOnly,
    ReadWrite,
}

pub trait FileSource: Send + Sync {
    fn capability(&self) -> Capability;

    /// Every file in the source.
    fn list_files<'a>(&'a self) -> BoxFuture<'a, FsResult<Vec<FileMeta>>>;

    fn read_file<'a>(&'a self, name: &'a FileName) -> BoxFuture<'a, FsResult<FileData>>;

    fn get_file_meta<'a>(&'a self, name: &'a FileName) -> BoxFuture<'a, FsResult<FileMeta>>;

    /// Create or overwrite a file, returning its new metadata.
    fn write_file<'a>(
        &'a self,
        name: &'a FileName,
        data: &'a [u8],
    ) -> BoxFuture<'a, FsResult<FileMeta>>;

    fn delete_file<'a>(&'a self, name: &'a FileName) -> BoxFuture<'a, FsResult<()>>;
}

/// Remote federated files: aggregated listing plus single-file access.
pub struct FederatedSource {
    aggregator: Arc<Aggregator>,
    accessor: Arc<FileAccessor>,
}

impl FederatedSource {
    pub fn new(aggregator: Arc<Aggregator>, accessor: Arc<FileAccessor>) -> Self {
        Self {
            aggregator,
            accessor,
        }
    }

    /// Wire the aggregator and accessor over shared collaborators.
    pub fn connect(
        registry: Arc<dyn SourceRegistry>,
        transport: Arc<dyn HttpTransport>,
        resolver: Arc<dyn UrlResolver>,
        store: Arc<dyn KvStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let client = RemoteDirectoryClient::new(transport.clone(), resolver.clone());
        let aggregator = Aggregator::new(
            registry.clone(),
            client,
            ListingCache::new(store),
            clock,
        );
        let accessor = FileAccessor::new(registry, transport, resolver);
        Self::new(Arc::new(aggregator), Arc::new(accessor))
    }
}

impl FileSource for FederatedSource {
    fn capability(&self) -> Capability {
        Capability::ReadOnly
    }

    fn list_files<'a>(&'a self) -> BoxFuture<'a, FsResult<Vec<FileMeta>>> {
        Box::pin(async move { Ok(self.aggregator.list_files().await) })
    }

    fn read_file<'a>(&'a self, name: &'a FileName) -> BoxFuture<'a, FsResult<FileData>> {
        Box::pin(async move { self.accessor.read_file(name.as_str()).await })
    }

    fn get_file_meta<'a>(&'a self, name: &'a FileName) -> BoxFuture<'a, FsResult<FileMeta>> {
        Box::pin(async move { self.accessor.get_file_meta(name.as_str()).await })
    }

    fn write_file<'a>(
        &'a self,
        name: &'a FileName,
        data: &'a [u8],
    ) -> BoxFuture<'a, FsResult<FileMeta>> {
        Box::pin(async move { self.accessor.write_file(name.as_str(), data).await })
    }

    fn delete_file<'a>(&'a self, name: &'a FileName) -> BoxFuture<'a, FsResult<()>> {
        Box::pin(async move { self.accessor.delete_file(name.as_str()).await })
    }
}
