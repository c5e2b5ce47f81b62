//! Error types for the sync engine.
//!
//! Discovery and root-resolution errors indicate misconfiguration and are
//! meant to be shown to the user verbatim. Link/unlink errors describe a
//! single artifact and are collected per item by the batch operations.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the sync engine.
#[derive(Debug, Error)]
pub enum SyncError {
    // Root resolution errors
    #[error("Could not determine the home directory and no cache override is set")]
    HomeDirectoryUnavailable,

    #[error("{role} directory does not exist or is not a directory: {}", .path.display())]
    DirectoryNotFound { role: String, path: PathBuf },

    // Link operator errors
    #[error("Source path {} does not exist or is not a directory", .0.display())]
    SourceMissing(PathBuf),

    #[error("Snapshots directory {} does not exist", .0.display())]
    SnapshotsMissing(PathBuf),

    #[error("Failed to resolve symlink for {}: {source}", .path.display())]
    SymlinkResolutionFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to create symlink from {} to {}: {source}", .src.display(), .dest.display())]
    SymlinkCreationFailed {
        src: PathBuf,
        dest: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Target directory {} exists and is not managed by hf-lms-sync", .0.display())]
    TargetNotOwned(PathBuf),

    #[error("Failed to write marker file {}: {message}", .path.display())]
    MetadataWriteFailed { path: PathBuf, message: String },

    // Stale scan errors
    #[error("Failed to walk target directory {}: {source}", .path.display())]
    WalkFailed {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    // File system errors
    #[error("IO error at {path:?}: {message}")]
    Io {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<std::io::Error>,
    },

    // Settings errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    #[error("Configuration error: {message}")]
    Config { message: String },
}

/// Result type alias for sync engine operations.
pub type Result<T> = std::result::Result<T, SyncError>;

impl From<std::io::Error> for SyncError {
    fn from(err: std::io::Error) -> Self {
        SyncError::Io {
            message: err.to_string(),
            path: None,
            source: Some(err),
        }
    }
}

impl From<serde_json::Error> for SyncError {
    fn from(err: serde_json::Error) -> Self {
        SyncError::Json {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl SyncError {
    /// Create an IO error with path context.
    pub fn io_with_path(err: std::io::Error, path: impl Into<PathBuf>) -> Self {
        SyncError::Io {
            message: err.to_string(),
            path: Some(path.into()),
            source: Some(err),
        }
    }

    /// Create a `DirectoryNotFound` error for the named root.
    pub fn directory_not_found(role: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        SyncError::DirectoryNotFound {
            role: role.into(),
            path: path.into(),
        }
    }

    /// True for errors that describe the environment rather than one artifact.
    ///
    /// These abort the calling operation: a missing root, an unknown home
    /// directory, a failed stale walk or a broken settings file.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            SyncError::HomeDirectoryUnavailable
                | SyncError::DirectoryNotFound { .. }
                | SyncError::WalkFailed { .. }
                | SyncError::Json { .. }
                | SyncError::Config { .. }
        )
    }

    /// Process exit code for the command-line front end.
    ///
    /// - 2: misconfiguration (see [`SyncError::is_configuration_error`])
    /// - 1: an operation on a single artifact failed
    pub fn exit_code(&self) -> i32 {
        if self.is_configuration_error() {
            2
        } else {
            1
        }
    }
}
