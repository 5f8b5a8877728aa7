//! Data types shared across the crate.

use serde::{Deserialize, Serialize};

/// Access rights of a file in the aggregated namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    #[default]
    Ro,
    Rw,
}

impl Permission {
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::Ro => "ro",
            Permission::Rw => "rw",
        }
    }
}

/// Identity and access rights of one file.
///
/// `name` is unique within the aggregated namespace. For federated files it
/// has the form `<rootUri>/<remote-relative-name>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMeta {
    pub name: String,
    pub size: u64,
    pub content_type: String,
    pub perm: Permission,
    /// Epoch milliseconds.
    pub last_modified: u64,
}

/// Contents of a file together with its metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileData {
    pub data: Vec<u8>,
    pub meta: FileMeta,
}

/// A cached listing of one federation source.
///
/// `last_updated` is the time the entry was written, never the time it was read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileListingCacheEntry {
    pub items: Vec<FileMeta>,
    pub last_updated: u64,
}

/// One record of a remote `index.json`, before name rewriting and
/// permission assignment.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexEntry {
    pub name: String,
    pub size: u64,
    pub content_type: String,
    pub last_modified: u64,
}
