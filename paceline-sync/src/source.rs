//! Remote Activity Source — the collaborator interface the engine fetches
//! through.
//!
//! The concrete implementation (paceline-connect) owns the credential,
//! the regional endpoint, and its own internal pagination; this trait
//! exposes "give me all summaries" as a single logical call.

use thiserror::Error;

use paceline_core::{ActivityId, ActivitySummary, FileFormat};

/// Failures a remote source can report for one call.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The remote no longer has the requested detail (deleted between
    /// list and fetch). Non-fatal; the engine skips the item.
    #[error("activity {0} not found on remote")]
    NotFound(ActivityId),

    /// Timeout, 5xx, connection reset. Retried with backoff.
    #[error("transient network failure: {0}")]
    Transient(String),

    /// Credential rejected. Fatal; never retried.
    #[error("authentication rejected: {0}")]
    Auth(String),
}

/// Lists and fetches remote activities for one authenticated account.
#[allow(async_fn_in_trait)]
pub trait ActivitySource {
    /// Complete list of remote activity summaries, newest first.
    ///
    /// One finite pass per call; pagination is internal to the source.
    async fn list_summaries(&self) -> Result<Vec<ActivitySummary>, SourceError>;

    /// Full per-activity payload in the requested format.
    async fn fetch_detail(
        &self,
        id: &ActivityId,
        format: FileFormat,
    ) -> Result<Vec<u8>, SourceError>;
}
