//! Error types for svcs_core.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using svcs_core's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during repository operations.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error occurred during file operations.
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// A path given to `add` does not exist.
    #[error("Can't find '{}'", .path.display())]
    FileNotFound { path: PathBuf },

    /// Committing requires a configured username.
    #[error("No username given")]
    NoUsername,

    /// Committing requires at least one tracked file.
    #[error("No tracked files")]
    NoTrackedFiles,

    /// Commit id is not present in the log.
    #[error("Commit does not exist: {id}")]
    CommitNotFound { id: String },

    /// Commit id is malformed.
    #[error("Invalid commit id: {reason}")]
    InvalidCommitId { reason: String },

    /// Invalid hash format or encoding.
    #[error("Invalid hash: {reason}")]
    InvalidHash { reason: String },

    /// File name cannot be stored in the index.
    #[error("Invalid file name: {reason}")]
    InvalidFileName { reason: String },

    /// Username cannot be stored.
    #[error("Invalid username: {reason}")]
    InvalidUsername { reason: String },
}

impl Error {
    /// Create a FileNotFound error.
    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Error::FileNotFound { path: path.into() }
    }

    /// Create a CommitNotFound error.
    pub fn commit_not_found(id: impl Into<String>) -> Self {
        Error::CommitNotFound { id: id.into() }
    }

    /// Create an InvalidCommitId error.
    pub fn invalid_commit_id(reason: impl Into<String>) -> Self {
        Error::InvalidCommitId {
            reason: reason.into(),
        }
    }

    /// Create an InvalidHash error.
    pub fn invalid_hash(reason: impl Into<String>) -> Self {
        Error::InvalidHash {
            reason: reason.into(),
        }
    }

    /// Create an InvalidFileName error.
    pub fn invalid_file_name(reason: impl Into<String>) -> Self {
        Error::InvalidFileName {
            reason: reason.into(),
        }
    }

    /// Create an InvalidUsername error.
    pub fn invalid_username(reason: impl Into<String>) -> Self {
        Error::InvalidUsername {
            reason: reason.into(),
        }
    }

    /// Whether this is an expected precondition failure rather than an
    /// environmental one.
    ///
    /// User errors are reported as plain messages and do not fail the
    /// process; everything else propagates.
    pub fn is_user_error(&self) -> bool {
        !matches!(self, Error::Io { .. })
    }
}

impl From<tempfile::PersistError> for Error {
    fn from(err: tempfile::PersistError) -> Self {
        Error::Io { source: err.error }
    }
}
