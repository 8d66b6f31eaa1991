//! Error types for paceline-core.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise from core configuration and storage operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Underlying I/O failure, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization/deserialization error (activity collection).
    #[error("collection JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parse error on config load — includes file path context.
    #[error("failed to parse config at {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// SQLite failure in the structured store.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// `dirs::home_dir()` returned `None` — cannot locate the user config.
    #[error("cannot determine home directory; set $HOME or equivalent")]
    HomeNotFound,

    /// No usable credential secret was found from any source.
    #[error(
        "no credential secret found; supply one via:\n  \
         1. the --secret flag\n  \
         2. the GARMIN_SECRET environment variable\n  \
         3. a secret.txt file next to the data directory"
    )]
    SecretMissing,
}

/// Convenience constructor for [`CoreError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> CoreError {
    CoreError::Io {
        path: path.into(),
        source,
    }
}
