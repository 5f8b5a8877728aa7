//! Configuration: federation sources, HTTP settings, and the source registry.
//!
//! The config file lives at `<home>/config.toml`:
//!
//! ```toml
//! local_root = "/home/me/notes"
//!
//! [http]
//! timeout_secs = 30
//!
//! [[federate]]
//! uri = "example.com/docs"
//! perm = "rw"
//! ```

use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::BoxFuture;
use crate::cache::CACHE_KEY_PREFIX;
use crate::types::Permission;

/// One federated source: `uri` is `<rootUri>/<optional-prefix>`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FederationConfig {
    pub uri: String,
    #[serde(default)]
    pub perm: Option<Permission>,
}

impl FederationConfig {
    pub fn new(uri: impl Into<String>, perm: Option<Permission>) -> Self {
        Self {
            uri: uri.into(),
            perm,
        }
    }

    /// First path segment of `uri`.
    pub fn root_uri(&self) -> &str {
        match self.uri.split_once('/') {
            Some((root, _)) => root,
            None => &self.uri,
        }
    }

    /// Everything after the first segment of `uri`; empty when there is none.
    pub fn prefix(&self) -> &str {
        match self.uri.split_once('/') {
            Some((_, prefix)) => prefix,
            None => "",
        }
    }

    /// Whether the rewritten name `name` comes from this source's listing:
    /// its first segment is the root and the rest starts with the prefix.
    pub fn covers(&self, name: &str) -> bool {
        match name.split_once('/') {
            Some((root, rest)) => root == self.root_uri() && rest.starts_with(self.prefix()),
            None => false,
        }
    }

    /// Effective permission, `ro` unless configured otherwise.
    pub fn permission(&self) -> Permission {
        self.perm.unwrap_or_default()
    }

    /// Key of this source's listing in the cache store.
    pub fn cache_key(&self) -> String {
        format!("{}{}", CACHE_KEY_PREFIX, self.uri)
    }
}

/// Transport settings. Unset fields keep the HTTP client's defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct HttpConfig {
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub user_agent: Option<String>,
}

/// Top-level config from `config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FedfsConfig {
    #[serde(default)]
    pub local_root: Option<PathBuf>,
    #[serde(default)]
    pub cache_path: Option<PathBuf>,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub federate: Vec<FederationConfig>,
}

impl FedfsConfig {
    pub const FILE_NAME: &'static str = "config.toml";

    /// Parse a config file. A missing file yields the defaults; a malformed
    /// one is an `InvalidData` error.
    pub fn load(path: &Path) -> io::Result<Self> {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(e),
        };
        toml::from_str(&content).map_err(|e| {
            io::Error::new(
                ErrorKind::InvalidData,
                format!("invalid config {}: {}", path.display(), e),
            )
        })
    }

    /// Directory holding local files, defaulting to `<home>/space`.
    pub fn local_root(&self, home: &Path) -> PathBuf {
        self.local_root
            .clone()
            .unwrap_or_else(|| home.join("space"))
    }

    /// Listing cache file, defaulting to `<home>/federation-cache.json`.
    pub fn cache_path(&self, home: &Path) -> PathBuf {
        self.cache_path
            .clone()
            .unwrap_or_else(|| home.join("federation-cache.json"))
    }
}

/// Supplies the ordered set of federation sources.
pub trait SourceRegistry: Send + Sync {
    fn federations<'a>(&'a self) -> BoxFuture<'a, io::Result<Vec<FederationConfig>>>;
}

/// A fixed list of sources.
pub struct StaticRegistry {
    configs: Vec<FederationConfig>,
}

impl StaticRegistry {
    pub fn new(configs: Vec<FederationConfig>) -> Self {
        Self { configs }
    }
}

impl SourceRegistry for StaticRegistry {
    fn federations<'a>(&'a self) -> BoxFuture<'a, io::Result<Vec<FederationConfig>>> {
        Box::pin(async move { Ok(self.configs.clone()) })
    }
}

/// Re-reads the `[[federate]]` table of a config file on every call.
pub struct FileRegistry {
    path: PathBuf,
}

impl FileRegistry {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl SourceRegistry for FileRegistry {
    fn federations<'a>(&'a self) -> BoxFuture<'a, io::Result<Vec<FederationConfig>>> {
        Box::pin(async move {
            let path = self.path.clone();
            let config = tokio::task::spawn_blocking(move || FedfsConfig::load(&path))
                .await
                .map_err(|e| io::Error::other(format!("join error: {}", e)))??;
            Ok(config.federate)
        })
    }
}
