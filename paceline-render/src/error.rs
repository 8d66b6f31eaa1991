//! Error types for paceline-render.

use std::path::PathBuf;

use thiserror::Error;

use paceline_core::CoreError;

/// All errors that can arise from poster generation.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Tera template engine error.
    #[error("template engine error: {0}")]
    Tera(#[from] tera::Error),

    /// Filesystem error writing the artifact.
    #[error("render io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The collection (or the selected year range) holds no activities.
    #[error("no activities match the requested filter")]
    EmptyDataset,

    /// A malformed option value, e.g. a year range like `2024-`.
    #[error("invalid option: {0}")]
    InvalidOption(String),

    /// An error from the core storage layer.
    #[error(transparent)]
    Core(#[from] CoreError),
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> RenderError {
    RenderError::Io {
        path: path.into(),
        source,
    }
}
