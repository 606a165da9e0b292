//! Error types shared across the sync pipeline.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SyncError>;

/// Errors that abort a sync run.
///
/// Per-file problems (unreadable tags, failed copies) are reported and
/// skipped by the orchestrator instead of being raised through this type.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The device music directory is missing even after mount activation.
    #[error("device music directory not available: {root} (is the device mounted?)")]
    DeviceNotReady { root: PathBuf },

    /// A configured root exists but is not a directory, or is missing.
    #[error("not a directory: {path}")]
    NotADirectory { path: PathBuf },

    /// Generic I/O error with path context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A directory walk could not continue.
    #[error("failed to walk {root}: {source}")]
    Walk {
        root: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    /// The push service reported failure for one transfer.
    #[error("push to {uri} failed: {reason}")]
    Push { uri: String, reason: String },

    /// The device catalog could not be read.
    #[error("cannot parse catalog at {path}: {source}")]
    CatalogParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The device catalog could not be persisted.
    #[error("cannot write catalog at {path}: {source}")]
    CatalogWrite {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl SyncError {
    /// Attach path context to an I/O error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn walk(root: impl Into<PathBuf>, source: walkdir::Error) -> Self {
        Self::Walk {
            root: root.into(),
            source,
        }
    }
}
