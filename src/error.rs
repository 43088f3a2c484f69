//! Error types for the `metagrab` crate.
//!
//! This module defines [`ExtractError`], the unified error type returned by
//! all fallible operations in the crate. The taxonomy is deliberately small:
//! callers dispatch on the variant, and "attribute not present" is never an
//! error — it is modeled as `Ok(None)` throughout the API.

use std::{collections::TryReserveError, io::Error as IoError, path::PathBuf};

use thiserror::Error;

/// The unified error type for all `metagrab` operations.
///
/// Every public method that can fail returns `Result<T, ExtractError>`.
/// The first failing step of an operation short-circuits and propagates
/// unchanged; no error is silently downgraded.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ExtractError {
    /// A malformed input was passed: an empty path or buffer, or a read
    /// attempted before any source was set.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(&'static str),

    /// The path does not resolve to a readable regular file, or the
    /// underlying probe reported the source missing.
    #[error("File not found: {}", path.display())]
    FileNotFound {
        /// Path that failed to resolve.
        path: PathBuf,
    },

    /// The OS denied access to the source file.
    ///
    /// Surfaced from storage-access checks; never generated by crate logic.
    #[error("Permission denied: {}", path.display())]
    PermissionDenied {
        /// Path that was refused.
        path: PathBuf,
    },

    /// A caller-owned output buffer could not be allocated.
    #[error("Out of memory: failed to reserve {requested} bytes")]
    OutOfMemory {
        /// Number of bytes the failed reservation asked for.
        requested: usize,
    },

    /// Any other collaborator failure: malformed or corrupt media, a decode
    /// that produced nothing, or an internal parser error.
    #[error("Extraction failed: {0}")]
    OperationFailed(String),
}

impl ExtractError {
    /// Map an I/O error observed while validating `path` onto the taxonomy.
    pub(crate) fn from_io(error: &IoError, path: &std::path::Path) -> Self {
        match error.kind() {
            std::io::ErrorKind::PermissionDenied => ExtractError::PermissionDenied {
                path: path.to_path_buf(),
            },
            _ => ExtractError::FileNotFound {
                path: path.to_path_buf(),
            },
        }
    }

    /// Map a failed `try_reserve` of `requested` bytes.
    pub(crate) fn from_reserve(_: TryReserveError, requested: usize) -> Self {
        ExtractError::OutOfMemory { requested }
    }
}
