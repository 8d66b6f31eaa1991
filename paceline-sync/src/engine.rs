//! Reconciliation fetch loop.
//!
//! ## One run
//!
//! 1. List all remote summaries (newest first, paged inside the source).
//! 2. Drop ids already known locally.
//! 3. Drop non-running sports when `only_run` is set.
//! 4. Fetch each remaining detail sequentially, bounded retry with
//!    exponential backoff on transient failures, and write it atomically
//!    to `<folder>/<id>.<ext>`.
//!
//! A transient failure that exhausts its retries aborts the remaining
//! items but keeps every file already written; the partial progress is
//! returned in the report, never rolled back.

use std::collections::{BTreeSet, HashMap};
use std::future::Future;
use std::path::Path;
use std::time::Duration;

use paceline_core::{ActivityId, ActivitySummary, FileFormat};

use crate::error::{io_err, SyncError};
use crate::source::{ActivitySource, SourceError};

/// Attempts per item, including the first.
pub const MAX_ATTEMPTS: u32 = 3;

const BACKOFF_BASE: Duration = Duration::from_secs(1);

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// A transient failure that exhausted its retries and aborted the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchFailure {
    pub id: ActivityId,
    pub message: String,
}

/// Outcome of one fetch loop, including partial progress on abort.
#[derive(Debug, Default)]
pub struct FetchReport {
    /// Newly fetched ids, in the source's returned order (newest first).
    pub new_ids: Vec<ActivityId>,
    /// Summary metadata for every newly fetched id.
    pub summaries: HashMap<ActivityId, ActivitySummary>,
    /// Ids whose detail vanished between list and fetch; skipped, logged.
    pub skipped_missing: Vec<ActivityId>,
    /// Set when the run aborted early on an exhausted transient failure.
    pub failure: Option<FetchFailure>,
}

impl FetchReport {
    /// id → title for every newly fetched activity.
    pub fn titles(&self) -> HashMap<ActivityId, String> {
        self.summaries
            .iter()
            .map(|(id, s)| (id.clone(), s.title.clone()))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Retry
// ---------------------------------------------------------------------------

/// Run `op` up to [`MAX_ATTEMPTS`] times, sleeping 1s/2s/… between
/// transient failures. Non-transient errors return immediately.
async fn with_retry<T, F, Fut>(what: &str, mut op: F) -> Result<T, SourceError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, SourceError>>,
{
    let mut attempt = 1;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(SourceError::Transient(message)) => {
                if attempt >= MAX_ATTEMPTS {
                    tracing::warn!(%what, attempt, %message, "giving up after transient failures");
                    return Err(SourceError::Transient(message));
                }
                let delay = BACKOFF_BASE * 2u32.pow(attempt - 1);
                tracing::debug!(%what, attempt, ?delay, %message, "transient failure, backing off");
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(other) => return Err(other),
        }
    }
}

// ---------------------------------------------------------------------------
// download_new
// ---------------------------------------------------------------------------

/// Fetch every remote activity not in `known_ids` into `folder`.
///
/// Returns the report even when a transient failure aborts the run early;
/// only authentication rejection, a failed listing, or local I/O failure
/// surface as `Err`.
pub async fn download_new<S: ActivitySource>(
    source: &S,
    known_ids: &BTreeSet<ActivityId>,
    format: FileFormat,
    only_run: bool,
    folder: &Path,
) -> Result<FetchReport, SyncError> {
    let summaries = with_retry("list summaries", || source.list_summaries())
        .await
        .map_err(|err| match err {
            SourceError::Auth(message) => SyncError::Auth(message),
            other => SyncError::List(other.to_string()),
        })?;

    let total = summaries.len();
    let pending: Vec<ActivitySummary> = summaries
        .into_iter()
        .filter(|s| !known_ids.contains(&s.id))
        .filter(|s| !only_run || s.sport.is_running())
        .collect();
    tracing::info!(
        remote = total,
        known = known_ids.len(),
        pending = pending.len(),
        %format,
        "reconciliation planned"
    );

    std::fs::create_dir_all(folder).map_err(|e| io_err(folder, e))?;

    let mut report = FetchReport::default();
    for summary in pending {
        let id = summary.id.clone();
        let what = format!("fetch {id}");
        match with_retry(&what, || source.fetch_detail(&id, format)).await {
            Ok(bytes) => {
                write_activity_file(folder, &id, format, &bytes)?;
                tracing::info!(%id, bytes = bytes.len(), "downloaded");
                report.summaries.insert(id.clone(), summary);
                report.new_ids.push(id);
            }
            Err(SourceError::NotFound(_)) => {
                tracing::warn!(%id, "detail no longer on remote, skipping");
                report.skipped_missing.push(id);
            }
            Err(SourceError::Auth(message)) => return Err(SyncError::Auth(message)),
            Err(SourceError::Transient(message)) => {
                report.failure = Some(FetchFailure { id, message });
                break;
            }
        }
    }
    Ok(report)
}

/// Write detail bytes to `<folder>/<id>.<ext>` via `.part` + rename.
fn write_activity_file(
    folder: &Path,
    id: &ActivityId,
    format: FileFormat,
    bytes: &[u8],
) -> Result<(), SyncError> {
    let path = folder.join(format!("{id}.{}", format.extension()));
    let tmp = folder.join(format!("{id}.{}.part", format.extension()));
    std::fs::write(&tmp, bytes).map_err(|e| io_err(&tmp, e))?;
    if let Err(e) = std::fs::rename(&tmp, &path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(io_err(&path, e));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use crate::scan;
    use crate::testing::{summary, MockSource};

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn fetches_everything_not_known() {
        let tmp = TempDir::new().unwrap();
        let source = MockSource::new(vec![
            summary("3", "running"),
            summary("2", "running"),
            summary("1", "running"),
        ]);
        let known: BTreeSet<ActivityId> = [ActivityId::from("2")].into_iter().collect();

        let report = download_new(&source, &known, FileFormat::Gpx, false, tmp.path())
            .await
            .unwrap();

        assert_eq!(
            report.new_ids,
            vec![ActivityId::from("3"), ActivityId::from("1")]
        );
        assert!(tmp.path().join("3.gpx").exists());
        assert!(tmp.path().join("1.gpx").exists());
        assert!(!tmp.path().join("2.gpx").exists());
        assert!(report.failure.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn known_ids_are_never_fetched() {
        let tmp = TempDir::new().unwrap();
        let source = MockSource::new(vec![summary("1", "running"), summary("2", "running")]);
        let known: BTreeSet<ActivityId> = [ActivityId::from("1"), ActivityId::from("2")]
            .into_iter()
            .collect();

        let report = download_new(&source, &known, FileFormat::Gpx, false, tmp.path())
            .await
            .unwrap();

        assert!(report.new_ids.is_empty());
        assert!(source.fetch_calls().is_empty(), "no fetch_detail for known ids");
    }

    #[tokio::test(start_paused = true)]
    async fn only_run_filters_other_sports() {
        let tmp = TempDir::new().unwrap();
        let source = MockSource::new(vec![
            summary("1", "running"),
            summary("2", "cycling"),
            summary("3", "trail_running"),
            summary("4", "lap_swimming"),
        ]);

        let report = download_new(&source, &BTreeSet::new(), FileFormat::Gpx, true, tmp.path())
            .await
            .unwrap();

        assert_eq!(
            report.new_ids,
            vec![ActivityId::from("1"), ActivityId::from("3")]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn missing_detail_is_skipped_not_fatal() {
        let tmp = TempDir::new().unwrap();
        let source = MockSource::new(vec![
            summary("1", "running"),
            summary("2", "running"),
            summary("3", "running"),
        ])
        .missing("2");

        let report = download_new(&source, &BTreeSet::new(), FileFormat::Gpx, false, tmp.path())
            .await
            .unwrap();

        assert_eq!(
            report.new_ids,
            vec![ActivityId::from("1"), ActivityId::from("3")]
        );
        assert_eq!(report.skipped_missing, vec![ActivityId::from("2")]);
        assert!(report.failure.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn transient_failure_recovers_within_retry_limit() {
        let tmp = TempDir::new().unwrap();
        let source =
            MockSource::new(vec![summary("1", "running")]).transient("1", MAX_ATTEMPTS - 1);

        let report = download_new(&source, &BTreeSet::new(), FileFormat::Gpx, false, tmp.path())
            .await
            .unwrap();

        assert_eq!(report.new_ids, vec![ActivityId::from("1")]);
        assert!(tmp.path().join("1.gpx").exists());
    }

    #[tokio::test(start_paused = true)]
    async fn exhausted_retries_abort_but_preserve_progress() {
        let tmp = TempDir::new().unwrap();
        let source = MockSource::new(vec![
            summary("5", "running"),
            summary("4", "running"),
            summary("3", "running"),
            summary("2", "running"),
            summary("1", "running"),
        ])
        .transient("3", u32::MAX);

        let report = download_new(&source, &BTreeSet::new(), FileFormat::Gpx, false, tmp.path())
            .await
            .unwrap();

        assert_eq!(
            report.new_ids,
            vec![ActivityId::from("5"), ActivityId::from("4")]
        );
        assert!(tmp.path().join("5.gpx").exists());
        assert!(tmp.path().join("4.gpx").exists());
        assert!(!tmp.path().join("3.gpx").exists());
        assert!(!tmp.path().join("2.gpx").exists(), "items after the failure are not fetched");

        let failure = report.failure.expect("failure recorded");
        assert_eq!(failure.id, ActivityId::from("3"));
    }

    #[tokio::test(start_paused = true)]
    async fn auth_rejection_is_fatal() {
        let tmp = TempDir::new().unwrap();
        let source = MockSource::new(vec![summary("1", "running")]).auth_rejected("1");

        let err = download_new(&source, &BTreeSet::new(), FileFormat::Gpx, false, tmp.path())
            .await
            .unwrap_err();
        assert!(matches!(err, SyncError::Auth(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn second_run_over_same_folder_fetches_nothing() {
        let tmp = TempDir::new().unwrap();
        let source = MockSource::new(vec![summary("1", "running"), summary("2", "running")]);

        let first = download_new(&source, &BTreeSet::new(), FileFormat::Gpx, false, tmp.path())
            .await
            .unwrap();
        assert_eq!(first.new_ids.len(), 2);

        let known = scan::known_ids_in(tmp.path(), FileFormat::Gpx).unwrap();
        let second = download_new(&source, &known, FileFormat::Gpx, false, tmp.path())
            .await
            .unwrap();
        assert!(second.new_ids.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn no_part_files_left_behind() {
        let tmp = TempDir::new().unwrap();
        let source = MockSource::new(vec![summary("1", "running")]);
        download_new(&source, &BTreeSet::new(), FileFormat::Gpx, false, tmp.path())
            .await
            .unwrap();
        let leftovers: Vec<_> = std::fs::read_dir(tmp.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".part"))
            .collect();
        assert!(leftovers.is_empty());
    }
}
