//! Media source representation.
//!
//! A context reads from exactly one source at a time: a file path or an
//! in-memory buffer. [`Source`] is a sum type so the mutual exclusion cannot
//! be violated. A path is duplicated into owned storage; a buffer is held by
//! reference, so the borrow checker enforces that the caller's buffer
//! outlives the context's use of it.

use std::path::{Path, PathBuf};

use crate::error::ExtractError;

/// The media source an extraction context reads from.
#[derive(Debug, Clone)]
pub enum Source<'data> {
    /// A file on disk, owned by the context.
    Path(PathBuf),
    /// An in-memory media buffer, borrowed from the caller.
    Buffer(&'data [u8]),
}

impl<'data> Source<'data> {
    /// Validate `path` and build an owned path source.
    ///
    /// # Errors
    ///
    /// - [`ExtractError::InvalidParameter`] if the path is empty.
    /// - [`ExtractError::FileNotFound`] if it does not reference a regular
    ///   file.
    /// - [`ExtractError::PermissionDenied`] if the OS refuses to stat it.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ExtractError> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(ExtractError::InvalidParameter("path is empty"));
        }

        let file_metadata =
            std::fs::metadata(path).map_err(|error| ExtractError::from_io(&error, path))?;
        if !file_metadata.is_file() {
            return Err(ExtractError::FileNotFound {
                path: path.to_path_buf(),
            });
        }

        Ok(Source::Path(path.to_path_buf()))
    }

    /// Build a buffer source borrowing the caller's bytes.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::InvalidParameter`] if the buffer is empty.
    pub fn from_buffer(buffer: &'data [u8]) -> Result<Self, ExtractError> {
        if buffer.is_empty() {
            return Err(ExtractError::InvalidParameter("buffer is empty"));
        }
        Ok(Source::Buffer(buffer))
    }

    /// The path, when this is a path source.
    pub fn as_path(&self) -> Option<&Path> {
        match self {
            Source::Path(path) => Some(path),
            Source::Buffer(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_path_is_invalid() {
        let result = Source::from_path("");
        assert!(matches!(result, Err(ExtractError::InvalidParameter(_))));
    }

    #[test]
    fn missing_file_is_not_found() {
        let result = Source::from_path("no/such/file.mp4");
        assert!(matches!(result, Err(ExtractError::FileNotFound { .. })));
    }

    #[test]
    fn directory_is_not_a_source() {
        let directory = tempfile::tempdir().expect("Failed to create temp dir");
        let result = Source::from_path(directory.path());
        assert!(matches!(result, Err(ExtractError::FileNotFound { .. })));
    }

    #[test]
    fn empty_buffer_is_invalid() {
        let result = Source::from_buffer(&[]);
        assert!(matches!(result, Err(ExtractError::InvalidParameter(_))));
    }
}
