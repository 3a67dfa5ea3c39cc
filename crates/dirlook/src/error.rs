//! Error types for filesystem access.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors raised while resolving, listing or opening a requested path.
///
/// Every variant is surfaced to the client as an HTTP 500 whose body is the
/// `Display` text of the error.
#[derive(Debug, Error)]
pub enum FsError {
    /// The requested path does not exist.
    #[error("path does not exist: {0}")]
    NotFound(PathBuf),

    /// The process may not read the requested path.
    #[error("permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// A listing was requested for something that is not a directory.
    #[error("path is not a directory: {0}")]
    NotADirectory(PathBuf),

    /// A download was requested for a directory.
    #[error("path is a directory: {0}")]
    IsADirectory(PathBuf),

    /// The request names a root that is not currently browsable.
    #[error("no such root: {0}")]
    UnknownRoot(String),

    /// The remainder escapes its root or contains a malformed segment.
    #[error("invalid path: {0}")]
    InvalidPath(String),

    /// The blocking task performing the filesystem access did not finish.
    #[error("filesystem task failed: {0}")]
    TaskFailed(String),

    /// Any other I/O failure.
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl FsError {
    /// Classify an I/O error raised while touching `path`.
    pub fn from_io(err: io::Error, path: &Path) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => FsError::NotFound(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => FsError::PermissionDenied(path.to_path_buf()),
            io::ErrorKind::NotADirectory => FsError::NotADirectory(path.to_path_buf()),
            io::ErrorKind::IsADirectory => FsError::IsADirectory(path.to_path_buf()),
            _ => FsError::Io {
                path: path.to_path_buf(),
                source: err,
            },
        }
    }
}
