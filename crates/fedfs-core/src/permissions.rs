//! Permission resolution and write checks.
//!
//! A file's permission is `ro` unless the federation whose listing carries
//! the file name declares `perm = "rw"`. Writes are only routed to sources with
//! the `ReadWrite` capability.

use crate::config::FederationConfig;
use crate::error::{FsError, FsResult};
use crate::source::Capability;
use crate::types::Permission;

/// Effective permission of `name`, using the first matching federation.
pub fn resolve_permission(configs: &[FederationConfig], name: &str) -> Permission {
    configs
        .iter()
        .find(|c| c.covers(name))
        .map(FederationConfig::permission)
        .unwrap_or_default()
}

/// Check that a source with `capability` may perform `op`.
pub fn check_write(capability: Capability, op: &'static str) -> FsResult<()> {
    match capability {
        Capability::ReadWrite => Ok(()),
        Capability::ReadOnly => Err(FsError::NotSupported(op)),
    }
}
