//! Failure taxonomy for file operations.
//!
//! Listing never fails (see [`crate::Aggregator::list_files`]); only the
//! single-file operations surface these to their caller.

use std::io::{self, ErrorKind};

/// Error raised by a file operation.
#[derive(Debug, thiserror::Error)]
pub enum FsError {
    /// The remote answered 503.
    #[error("Offline")]
    Offline,

    #[error("Not found: {0}")]
    NotFound(String),

    /// The operation is not available on this source.
    #[error("{0} is not supported on federated files")]
    NotSupported(&'static str),

    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type FsResult<T> = Result<T, FsError>;

impl From<FsError> for io::Error {
    fn from(err: FsError) -> Self {
        match err {
            FsError::Io(e) => e,
            FsError::Offline => io::Error::new(ErrorKind::NotConnected, err.to_string()),
            FsError::NotFound(_) => io::Error::new(ErrorKind::NotFound, err.to_string()),
            FsError::NotSupported(_) => io::Error::new(ErrorKind::Unsupported, err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_kind_mapping() {
        let e: io::Error = FsError::Offline.into();
        assert_eq!(e.kind(), ErrorKind::NotConnected);
        let e: io::Error = FsError::NotFound("a/x.md".into()).into();
        assert_eq!(e.kind(), ErrorKind::NotFound);
        assert!(e.to_string().contains("a/x.md"));
        let e: io::Error = FsError::NotSupported("write").into();
        assert_eq!(e.kind(), ErrorKind::Unsupported);
    }

    #[test]
    fn test_io_error_passes_through() {
        let e: io::Error = FsError::from(io::Error::new(ErrorKind::TimedOut, "slow")).into();
        assert_eq!(e.kind(), ErrorKind::TimedOut);
    }
}
