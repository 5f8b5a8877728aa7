//! Space: the name-routing front of the file system.
//!
//! Validates names, picks a source, and enforces the source's capability
//! before delegating. A name whose first segment is the `rootUri` of a
//! configured federation goes to the federated source; everything else goes
//! to the local source.
//!
//! ```text
//! caller  ->  Space (name validation + routing + capability)  ->  FileSource
//! ```

use std::sync::Arc;

use crate::config::SourceRegistry;
use crate::error::FsResult;
use crate::name::FileName;
use crate::permissions;
use crate::source::FileSource;
use crate::types::{FileData, FileMeta};

pub struct Space {
    local: Box<dyn FileSource>,
    federated: Box<dyn FileSource>,
    registry: Arc<dyn SourceRegistry>,
}

impl Space {
    pub fn new(
        local: Box<dyn FileSource>,
        federated: Box<dyn FileSource>,
        registry: Arc<dyn SourceRegistry>,
    ) -> Self {
        Self {
            local,
            federated,
            registry,
        }
    }

    async fn route(&self, name: &FileName) -> &dyn FileSource {
        match self.registry.federations().await {
            Ok(configs) if configs.iter().any(|c| c.root_uri() == name.root()) => {
                self.federated.as_ref()
            }
            Ok(_) => self.local.as_ref(),
            Err(e) => {
                log::warn!("failed to read federation config, routing {} locally: {}", name, e);
                self.local.as_ref()
            }
        }
    }

    // -- read operations --

    /// Local files followed by federated ones. A failing local listing is an
    /// error; the federated listing never fails.
    pub async fn list_files(&self) -> FsResult<Vec<FileMeta>> {
        let mut files = self.local.list_files().await?;
        files.extend(self.federated.list_files().await?);
        Ok(files)
    }

    pub async fn read_file(&self, name: &str) -> FsResult<FileData> {
        let name = FileName::new(name)?;
        self.route(&name).await.read_file(&name).await
    }

    pub async fn get_file_meta(&self, name: &str) -> FsResult<FileMeta> {
        let name = FileName::new(name)?;
        self.route(&name).await.get_file_meta(&name).await
    }

    // -- write operations (capability-checked) --

    pub async fn write_file(&self, name: &str, data: &[u8]) -> FsResult<FileMeta> {
        let name = FileName::new(name)?;
        let source = self.route(&name).await;
        permissions::check_write(source.capability(), "write")?;
        source.write_file(&name, data).await
    }

    pub async fn delete_file(&self, name: &str) -> FsResult<()> {
        let name = FileName::new(name)?;
        let source = self.route(&name).await;
        permissions::check_write(source.capability(), "delete")?;
        source.delete_file(&name).await
    }
}
