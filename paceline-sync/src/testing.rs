//! Shared test doubles for the sync crate.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use chrono::{TimeZone, Utc};

use paceline_core::{ActivityId, ActivitySummary, FileFormat, Sport};

use crate::source::{ActivitySource, SourceError};

/// Summary fixture; start times descend with lexically larger ids so the
/// listing reads newest-first when built in that order.
pub(crate) fn summary(id: &str, sport: &str) -> ActivitySummary {
    let offset = id.bytes().map(u64::from).sum::<u64>() as i64;
    ActivitySummary {
        id: ActivityId::from(id),
        sport: Sport::from(sport),
        title: format!("Activity {id}"),
        start_time: Utc.with_ymd_and_hms(2024, 3, 1, 6, 0, 0).unwrap()
            + chrono::Duration::hours(offset),
        distance_m: 8_000.0,
        duration_s: 2_400.0,
    }
}

/// Scriptable in-memory [`ActivitySource`].
pub(crate) struct MockSource {
    summaries: Vec<ActivitySummary>,
    /// Remaining transient failures per id; `u32::MAX` fails forever.
    transient: Mutex<HashMap<ActivityId, u32>>,
    missing: HashSet<ActivityId>,
    auth_rejected: HashSet<ActivityId>,
    fetch_calls: Mutex<Vec<ActivityId>>,
}

impl MockSource {
    pub(crate) fn new(summaries: Vec<ActivitySummary>) -> Self {
        Self {
            summaries,
            transient: Mutex::new(HashMap::new()),
            missing: HashSet::new(),
            auth_rejected: HashSet::new(),
            fetch_calls: Mutex::new(Vec::new()),
        }
    }

    /// Fail `id` with a transient error `count` times before succeeding.
    pub(crate) fn transient(self, id: &str, count: u32) -> Self {
        self.transient
            .lock()
            .unwrap()
            .insert(ActivityId::from(id), count);
        self
    }

    /// `id` is gone from the remote: every fetch reports not-found.
    pub(crate) fn missing(mut self, id: &str) -> Self {
        self.missing.insert(ActivityId::from(id));
        self
    }

    /// Fetching `id` reports an authentication rejection.
    pub(crate) fn auth_rejected(mut self, id: &str) -> Self {
        self.auth_rejected.insert(ActivityId::from(id));
        self
    }

    /// Every id passed to `fetch_detail`, in call order (retries included).
    pub(crate) fn fetch_calls(&self) -> Vec<ActivityId> {
        self.fetch_calls.lock().unwrap().clone()
    }
}

impl ActivitySource for MockSource {
    async fn list_summaries(&self) -> Result<Vec<ActivitySummary>, SourceError> {
        Ok(self.summaries.clone())
    }

    async fn fetch_detail(
        &self,
        id: &ActivityId,
        format: FileFormat,
    ) -> Result<Vec<u8>, SourceError> {
        self.fetch_calls.lock().unwrap().push(id.clone());

        if self.auth_rejected.contains(id) {
            return Err(SourceError::Auth("token expired".to_owned()));
        }
        if self.missing.contains(id) {
            return Err(SourceError::NotFound(id.clone()));
        }
        let mut transient = self.transient.lock().unwrap();
        if let Some(remaining) = transient.get_mut(id) {
            if *remaining > 0 {
                if *remaining != u32::MAX {
                    *remaining -= 1;
                }
                return Err(SourceError::Transient("connection reset".to_owned()));
            }
        }
        Ok(format!("payload {id} as {format}").into_bytes())
    }
}
