//! Connect REST client — paged summary listing and per-format downloads.
//!
//! Implements [`ActivitySource`] for [`Session`]. The listing endpoint
//! returns newest-first pages; `list_summaries` walks pages until a short
//! page and presents the whole traversal as one logical call.

use chrono::NaiveDateTime;
use reqwest::StatusCode;
use serde::Deserialize;

use paceline_core::{ActivityId, ActivitySummary, FileFormat, Sport};
use paceline_sync::{ActivitySource, SourceError};

use crate::session::Session;

const PAGE_SIZE: usize = 100;
const LIST_PATH: &str = "/activitylist-service/activities/search/activities";

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSummary {
    activity_id: u64,
    #[serde(default)]
    activity_name: Option<String>,
    /// `YYYY-MM-DD HH:MM:SS`, implicitly UTC.
    #[serde(rename = "startTimeGMT")]
    start_time_gmt: String,
    #[serde(default)]
    distance: Option<f64>,
    #[serde(default)]
    duration: Option<f64>,
    activity_type: RawActivityType,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawActivityType {
    type_key: String,
}

fn summary_from_raw(raw: RawSummary) -> Result<ActivitySummary, SourceError> {
    let start_time = NaiveDateTime::parse_from_str(&raw.start_time_gmt, "%Y-%m-%d %H:%M:%S")
        .map_err(|e| {
            SourceError::Transient(format!(
                "unparseable start time '{}' for activity {}: {e}",
                raw.start_time_gmt, raw.activity_id
            ))
        })?
        .and_utc();
    let id = ActivityId::from(raw.activity_id);
    Ok(ActivitySummary {
        title: raw
            .activity_name
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| format!("Activity {id}")),
        id,
        sport: Sport(raw.activity_type.type_key),
        start_time,
        distance_m: raw.distance.unwrap_or(0.0),
        duration_s: raw.duration.unwrap_or(0.0),
    })
}

// ---------------------------------------------------------------------------
// Status / transport mapping
// ---------------------------------------------------------------------------

fn classify_status(status: StatusCode, id: Option<&ActivityId>) -> Option<SourceError> {
    if status.is_success() {
        return None;
    }
    Some(match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            SourceError::Auth(format!("remote returned {status}"))
        }
        StatusCode::NOT_FOUND => match id {
            Some(id) => SourceError::NotFound(id.clone()),
            None => SourceError::Transient(format!("listing returned {status}")),
        },
        other => SourceError::Transient(format!("unexpected status {other}")),
    })
}

fn transport_err(err: reqwest::Error) -> SourceError {
    SourceError::Transient(err.to_string())
}

fn download_path(format: FileFormat, id: &ActivityId) -> String {
    match format {
        FileFormat::Gpx => format!("/download-service/export/gpx/activity/{id}"),
        FileFormat::Tcx => format!("/download-service/export/tcx/activity/{id}"),
        FileFormat::Fit => format!("/download-service/files/activity/{id}"),
    }
}

// ---------------------------------------------------------------------------
// ActivitySource
// ---------------------------------------------------------------------------

impl ActivitySource for Session {
    async fn list_summaries(&self) -> Result<Vec<ActivitySummary>, SourceError> {
        let mut summaries = Vec::new();
        let mut start = 0usize;
        loop {
            let response = self
                .client
                .get(format!("{}{LIST_PATH}", self.base_url))
                .query(&[("start", start.to_string()), ("limit", PAGE_SIZE.to_string())])
                .bearer_auth(&self.token)
                .send()
                .await
                .map_err(transport_err)?;
            if let Some(err) = classify_status(response.status(), None) {
                return Err(err);
            }
            let page: Vec<RawSummary> = response.json().await.map_err(transport_err)?;
            let page_len = page.len();
            tracing::debug!(start, page_len, "listed activity page");
            for raw in page {
                summaries.push(summary_from_raw(raw)?);
            }
            if page_len < PAGE_SIZE {
                return Ok(summaries);
            }
            start += PAGE_SIZE;
        }
    }

    async fn fetch_detail(
        &self,
        id: &ActivityId,
        format: FileFormat,
    ) -> Result<Vec<u8>, SourceError> {
        let response = self
            .client
            .get(format!("{}{}", self.base_url, download_path(format, id)))
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(transport_err)?;
        if let Some(err) = classify_status(response.status(), Some(id)) {
            return Err(err);
        }
        let bytes = response.bytes().await.map_err(transport_err)?;
        Ok(bytes.to_vec())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
