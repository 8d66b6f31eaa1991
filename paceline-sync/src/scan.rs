//! Local store scanner — derive the downloaded-id set from disk.
//!
//! Truth is re-derived from the filesystem on every run; no separate index
//! is trusted. Pure function of the folder contents.

use std::collections::BTreeSet;
use std::io::ErrorKind;
use std::path::Path;

use paceline_core::{ActivityId, Config, FileFormat};

use crate::error::{io_err, SyncError};

/// Scan `folder` for `<id>.<ext>` files of `format` and return the ids.
///
/// A missing folder is not an error: the caller creates it before writing,
/// so first runs see an empty set. Files whose stem is not a plausible id
/// (empty, or containing non-alphanumeric characters) are ignored.
pub fn known_ids_in(folder: &Path, format: FileFormat) -> Result<BTreeSet<ActivityId>, SyncError> {
    let entries = match std::fs::read_dir(folder) {
        Ok(entries) => entries,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(BTreeSet::new()),
        Err(err) => return Err(io_err(folder, err)),
    };

    let mut ids = BTreeSet::new();
    for entry in entries {
        let entry = entry.map_err(|e| io_err(folder, e))?;
        if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
            continue;
        }
        let path = entry.path();
        if path.extension().and_then(|s| s.to_str()) != Some(format.extension()) {
            continue;
        }
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        if stem.is_empty() || !stem.chars().all(|c| c.is_ascii_alphanumeric()) {
            continue;
        }
        ids.insert(ActivityId::from(stem));
    }
    Ok(ids)
}

/// Known-id set for a sync run targeting `format`.
///
/// For `Fit` the set is the union of the FIT and GPX folder scans: a GPX
/// file for an id means the fit-derived artifact chain already covers it,
/// so no network fetch is needed. No merge applies to other formats.
pub fn known_ids_for_format(
    config: &Config,
    format: FileFormat,
) -> Result<BTreeSet<ActivityId>, SyncError> {
    let mut known = known_ids_in(&config.format_folder(format), format)?;
    if format == FileFormat::Fit {
        known.extend(known_ids_in(
            &config.format_folder(FileFormat::Gpx),
            FileFormat::Gpx,
        )?);
    }
    Ok(known)
}
