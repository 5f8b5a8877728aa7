//! File name newtype: the validated form of a logical name.
//!
//! Names are relative, `/`-separated, and may never escape a source's root.
//! Backends translate `FileName` to their own addressing (URLs, OS paths).

use std::fmt;
use std::io::{self, ErrorKind};

/// Validated logical file name such as `notes/today.md` or `example.com/x.md`.
///
/// Invariants (enforced at construction):
/// - Not empty
/// - No leading or trailing `/`
/// - No `//` sequences
/// - No `.` or `..` components
/// - No null bytes
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileName(String);

impl FileName {
    pub fn new(name: &str) -> io::Result<Self> {
        let invalid = |msg: String| -> io::Result<Self> {
            Err(io::Error::new(ErrorKind::InvalidInput, msg))
        };
        if name.is_empty() {
            return invalid("file name cannot be empty".to_string());
        }
        if name.contains('\0') {
            return invalid("file name cannot contain null bytes".to_string());
        }
        if name.starts_with('/') || name.ends_with('/') {
            return invalid(format!("file name cannot start or end with '/': {}", name));
        }
        if name.contains("//") {
            return invalid(format!("file name cannot contain '//': {}", name));
        }
        if name.split('/').any(|c| c == "." || c == "..") {
            return invalid(format!("file name cannot contain '.' or '..': {}", name));
        }
        Ok(Self(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First path segment.
    pub fn root(&self) -> &str {
        self.0.split('/').next().unwrap_or(&self.0)
    }
}

impl fmt::Display for FileName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
