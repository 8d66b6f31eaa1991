//! Domain types for paceline.
//!
//! All path fields use `PathBuf`; never `&str` or `String` for filesystem
//! paths. All persisted types are serializable via serde.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// Opaque identifier naming one remote activity.
///
/// Stable across formats: the same logical activity may be downloaded as
/// gpx, tcx, or fit, but shares one id. Filenames embed it as `<id>.<ext>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActivityId(pub String);

impl fmt::Display for ActivityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for ActivityId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ActivityId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<u64> for ActivityId {
    fn from(n: u64) -> Self {
        Self(n.to_string())
    }
}

/// Raw sport/activity-type key as reported by the remote listing
/// (`running`, `trail_running`, `cycling`, ...). Kept opaque; the only
/// classification the sync path needs is "is this a running variant".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sport(pub String);

impl Sport {
    /// Whether this sport counts as a running variant for `--only-run`.
    ///
    /// Matches the plain `running` key and every `*_running` /
    /// `virtual_run`-style derivative the remote side emits.
    pub fn is_running(&self) -> bool {
        let key = self.0.as_str();
        key == "running" || key.ends_with("_running") || key == "virtual_run"
    }
}

impl fmt::Display for Sport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for Sport {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// File representation requested from the remote source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FileFormat {
    #[default]
    Gpx,
    Tcx,
    Fit,
}

impl FileFormat {
    /// Filename extension for this format.
    pub fn extension(self) -> &'static str {
        match self {
            FileFormat::Gpx => "gpx",
            FileFormat::Tcx => "tcx",
            FileFormat::Fit => "fit",
        }
    }

    /// Per-format output folder name under the data root.
    pub fn folder_name(self) -> &'static str {
        match self {
            FileFormat::Gpx => "GPX_OUT",
            FileFormat::Tcx => "TCX_OUT",
            FileFormat::Fit => "FIT_OUT",
        }
    }

    pub fn all() -> &'static [FileFormat] {
        &[FileFormat::Gpx, FileFormat::Tcx, FileFormat::Fit]
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Remote endpoint family to query.
///
/// Affects the base URL and TLS verification policy only; the China
/// deployment sits behind certificates the default trust store rejects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    #[default]
    Global,
    China,
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Region::Global => write!(f, "global"),
            Region::China => write!(f, "china"),
        }
    }
}

// ---------------------------------------------------------------------------
// Domain structs
// ---------------------------------------------------------------------------

/// Lightweight remote listing entry, without the full detail payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivitySummary {
    pub id: ActivityId,
    pub sport: Sport,
    pub title: String,
    pub start_time: DateTime<Utc>,
    pub distance_m: f64,
    pub duration_s: f64,
}

/// Normalized metadata for one activity in the aggregate collection.
///
/// Created once per newly ingested file; never mutated after merge except
/// by a full re-derivation of the collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityRecord {
    pub id: ActivityId,
    pub title: String,
    pub sport: Sport,
    pub start_time: DateTime<Utc>,
    pub distance_m: f64,
    pub duration_s: f64,
    pub format: FileFormat,
    /// Basename of the per-activity file this record was ingested from.
    pub file_name: String,
    /// Encoded polyline, when the source listing exposes one.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub polyline: Option<String>,
    pub imported_at: DateTime<Utc>,
}

impl ActivityRecord {
    /// Build a record from a remote summary plus the file it landed in.
    pub fn from_summary(summary: &ActivitySummary, format: FileFormat, now: DateTime<Utc>) -> Self {
        Self {
            id: summary.id.clone(),
            title: summary.title.clone(),
            sport: summary.sport.clone(),
            start_time: summary.start_time,
            distance_m: summary.distance_m,
            duration_s: summary.duration_s,
            format,
            file_name: format!("{}.{}", summary.id, format.extension()),
            polyline: None,
            imported_at: now,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
