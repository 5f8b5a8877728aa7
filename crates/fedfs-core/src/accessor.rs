//! Single-file access to federated files.
//!
//! Each call resolves the logical name to a URL and performs one request; the
//! listing cache is never consulted. Writes and deletes are refused without
//! touching the network.

use std::sync::Arc;

use crate::config::SourceRegistry;
use crate::error::{FsError, FsResult};
use crate::permissions::resolve_permission;
use crate::resolve::UrlResolver;
use crate::transport::{HttpResponse, HttpTransport};
use crate::types::{FileData, FileMeta, Permission};

/// Content type of the placeholder returned for unreadable files.
pub const ERROR_CONTENT_TYPE: &str = "text/markdown";

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Renderable stand-in for a file that could not be loaded.
pub fn error_document(name: &str, reason: &str) -> FileData {
    let data = format!(
        "**Error**: Could not load federated file `{}`: {}\n",
        name, reason
    )
    .into_bytes();
    FileData {
        data,
        meta: FileMeta {
            name: name.to_string(),
            size: 0,
            content_type: ERROR_CONTENT_TYPE.to_string(),
            perm: Permission::Ro,
            last_modified: 0,
        },
    }
}

fn header_u64(response: &HttpResponse, name: &str) -> Option<u64> {
    response.header(name).and_then(|v| v.trim().parse().ok())
}

pub struct FileAccessor {
    registry: Arc<dyn SourceRegistry>,
    transport: Arc<dyn HttpTransport>,
    resolver: Arc<dyn UrlResolver>,
}

impl FileAccessor {
    pub fn new(
        registry: Arc<dyn SourceRegistry>,
        transport: Arc<dyn HttpTransport>,
        resolver: Arc<dyn UrlResolver>,
    ) -> Self {
        Self {
            registry,
            transport,
            resolver,
        }
    }

    /// Metadata from a HEAD request.
    ///
    /// 503 raises `Offline`; any other non-success status raises `NotFound`.
    pub async fn get_file_meta(&self, name: &str) -> FsResult<FileMeta> {
        let url = self.resolver.resolve(name);
        let response = self.transport.head(&url).await?;
        if response.status == 503 {
            return Err(FsError::Offline);
        }
        if !response.is_success() {
            return Err(FsError::NotFound(name.to_string()));
        }
        let size = header_u64(&response, "Content-length").unwrap_or(0);
        Ok(self.meta_from_headers(name, &response, size).await)
    }

    /// Contents and metadata from a GET request.
    ///
    /// 503 raises `Offline` and 404 raises `NotFound`. Transport failures and
    /// any other non-success status come back as an [`error_document`].
    pub async fn read_file(&self, name: &str) -> FsResult<FileData> {
        let url = self.resolver.resolve(name);
        let response = match self.transport.get(&url, &[]).await {
            Ok(response) => response,
            Err(e) => {
                log::warn!("failed to fetch {}: {}", url, e);
                return Ok(error_document(name, &e.to_string()));
            }
        };
        match response.status {
            503 => return Err(FsError::Offline),
            404 => return Err(FsError::NotFound(name.to_string())),
            status if !(200..300).contains(&status) => {
                log::warn!("HTTP {} fetching {}", status, url);
                return Ok(error_document(name, &format!("HTTP status {}", status)));
            }
            _ => {}
        }
        let size = header_u64(&response, "Content-length").unwrap_or(response.body.len() as u64);
        let meta = self.meta_from_headers(name, &response, size).await;
        Ok(FileData {
            data: response.body,
            meta,
        })
    }

    pub async fn write_file(&self, _name: &str, _data: &[u8]) -> FsResult<FileMeta> {
        Err(FsError::NotSupported("write"))
    }

    pub async fn delete_file(&self, _name: &str) -> FsResult<()> {
        Err(FsError::NotSupported("delete"))
    }

    async fn meta_from_headers(&self, name: &str, response: &HttpResponse, size: u64) -> FileMeta {
        FileMeta {
            name: name.to_string(),
            size,
            content_type: response
                .header("Content-type")
                .unwrap_or(DEFAULT_CONTENT_TYPE)
                .to_string(),
            perm: self.permission_of(name).await,
            last_modified: header_u64(response, "X-Last-Modified").unwrap_or(0),
        }
    }

    async fn permission_of(&self, name: &str) -> Permission {
        match self.registry.federations().await {
            Ok(configs) => resolve_permission(&configs, name),
            Err(e) => {
                log::warn!("failed to read federation config, treating {} as ro: {}", name, e);
                Permission::Ro
            }
        }
    }
}
