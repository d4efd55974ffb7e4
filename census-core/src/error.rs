//! Error types for scanning operations
//!
//! Every variant describes a failure local to one folder, document or
//! collaborator call. The batch scanner decides per variant whether the
//! folder still yields a row.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Main error type for scan, extraction and write-back operations
#[derive(Debug, Error)]
pub enum ScanError {
    /// A README or supporting document does not exist
    #[error("File not found: {path:?}")]
    NotFound { path: PathBuf },

    /// None of the candidate encodings decoded the document
    #[error("Could not decode {path:?} with any of: {tried}")]
    DecodeFailure { path: PathBuf, tried: String },

    /// The folder is not a git repository
    #[error("{path:?} is not a git repository")]
    NotARepository { path: PathBuf },

    /// The folder or one of its files cannot be read or written
    #[error("Permission denied for {path:?}")]
    PermissionDenied { path: PathBuf },

    /// A document exists but cannot be inspected
    #[error("Malformed document {path:?}: {reason}")]
    MalformedDocument { path: PathBuf, reason: String },

    /// Git failure other than a missing repository
    #[error("Git error in {path:?}: {message}")]
    Vcs { path: PathBuf, message: String },

    /// Any other I/O failure
    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Output table could not be read or written
    #[error("Report error: {message}")]
    Report { message: String },

    /// Invalid configuration
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl ScanError {
    /// Classify an I/O error raised while touching `path`
    pub fn from_io(path: impl AsRef<Path>, source: io::Error) -> Self {
        let path = path.as_ref().to_path_buf();
        match source.kind() {
            io::ErrorKind::NotFound => Self::NotFound { path },
            io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            _ => Self::Io { path, source },
        }
    }

    /// Classify a directory-walk error
    pub fn from_walk(root: &Path, err: walkdir::Error) -> Self {
        let path = err.path().map(Path::to_path_buf).unwrap_or_else(|| root.to_path_buf());
        match err.into_io_error() {
            Some(source) => Self::from_io(path, source),
            None => Self::Io {
                path,
                source: io::Error::other("filesystem loop detected"),
            },
        }
    }

    /// Wrap a CSV failure
    pub fn report(err: impl std::fmt::Display) -> Self {
        Self::Report { message: err.to_string() }
    }

    /// Whether the folder still produces a partial row after this error
    pub fn keeps_partial_row(&self) -> bool {
        matches!(self, Self::NotARepository { .. } | Self::PermissionDenied { .. })
    }
}

/// Result alias for scan operations
pub type ScanResult<T> = std::result::Result<T, ScanError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_classification() {
        let err = ScanError::from_io("a", io::Error::from(io::ErrorKind::NotFound));
        assert!(matches!(err, ScanError::NotFound { .. }));

        let err = ScanError::from_io("a", io::Error::from(io::ErrorKind::PermissionDenied));
        assert!(matches!(err, ScanError::PermissionDenied { .. }));
        assert!(err.keeps_partial_row());

        let err = ScanError::from_io("a", io::Error::other("boom"));
        assert!(matches!(err, ScanError::Io { .. }));
        assert!(!err.keeps_partial_row());
    }

    #[test]
    fn test_error_display() {
        let err = ScanError::DecodeFailure { path: PathBuf::from("README.md"), tried: "utf-8".into() };
        assert_eq!(err.to_string(), "Could not decode \"README.md\" with any of: utf-8");
    }
}
