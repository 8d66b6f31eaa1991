//! Error types for paceline-sync.

use std::path::PathBuf;

use thiserror::Error;

use paceline_core::CoreError;

/// All errors that can abort a sync run.
///
/// Per-item failures (a deleted remote activity, a transient fetch failure
/// that exhausted its retries) are NOT errors at this level — they are
/// carried inside [`crate::FetchReport`] so partial progress survives.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Credential rejected by the remote side. Never retried.
    #[error("authentication rejected by remote: {0}")]
    Auth(String),

    /// The summary listing itself failed after retries.
    #[error("failed to list remote activities: {0}")]
    List(String),

    /// Local I/O failure, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An error from the core storage layer.
    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Convenience constructor for [`SyncError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}
