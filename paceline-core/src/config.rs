//! Configuration and data-root layout.
//!
//! # Storage layout
//!
//! ```text
//! <data_root>/                 (default: ./data)
//!   GPX_OUT/                   one file per activity, <id>.gpx
//!   TCX_OUT/                   one file per activity, <id>.tcx
//!   FIT_OUT/                   one file per activity, <id>.fit
//!   activities.json            aggregate collection (flat file)
//!   data.db                    aggregate collection (structured store)
//!   synced_files.txt           append-only ledger of ingested filenames
//! ```
//!
//! # Config file
//!
//! An optional `paceline.yaml` overrides the defaults. Search order:
//! `./paceline.yaml`, then `~/.config/paceline/paceline.yaml`. A missing
//! file is not an error; defaults apply.
//!
//! # API pattern
//!
//! Every loading function has an `_at(root, …)` form taking explicit
//! directories; tests always use the `_at` form with `TempDir`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{io_err, CoreError};
use crate::types::FileFormat;

/// Environment variable consulted for the credential secret.
pub const SECRET_ENV: &str = "GARMIN_SECRET";

/// Fallback secret file name, resolved next to the data directory.
pub const SECRET_FILE: &str = "secret.txt";

const CONFIG_FILE: &str = "paceline.yaml";

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// User-facing configuration, merged from `paceline.yaml` over defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Root directory for all downloaded and derived data.
    pub data_dir: PathBuf,
    /// Athlete label shown on rendered posters.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub athlete: Option<String>,
}

/// On-disk shape of `paceline.yaml` — every field optional.
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    data_dir: Option<PathBuf>,
    athlete: Option<String>,
}

impl Config {
    /// Defaults rooted at `cwd`: data under `<cwd>/data`, no athlete label.
    pub fn default_at(cwd: &Path) -> Self {
        Self {
            data_dir: cwd.join("data"),
            athlete: None,
        }
    }

    /// Load configuration, searching `<cwd>/paceline.yaml` then
    /// `<home>/.config/paceline/paceline.yaml`.
    pub fn load_at(cwd: &Path, home: &Path) -> Result<Self, CoreError> {
        let candidates = [
            cwd.join(CONFIG_FILE),
            home.join(".config").join("paceline").join(CONFIG_FILE),
        ];
        for path in &candidates {
            if !path.exists() {
                continue;
            }
            let contents = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
            let file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
                CoreError::ConfigParse {
                    path: path.clone(),
                    source: e,
                }
            })?;
            let defaults = Self::default_at(cwd);
            return Ok(Self {
                data_dir: file.data_dir.unwrap_or(defaults.data_dir),
                athlete: file.athlete,
            });
        }
        Ok(Self::default_at(cwd))
    }

    /// `Config::load_at` convenience wrapper — cwd + `dirs::home_dir()`.
    pub fn load() -> Result<Self, CoreError> {
        let cwd = std::env::current_dir().map_err(|e| io_err(".", e))?;
        let home = dirs::home_dir().ok_or(CoreError::HomeNotFound)?;
        Self::load_at(&cwd, &home)
    }

    // -- path helpers -------------------------------------------------------

    /// `<data_root>/<FORMAT>_OUT/`
    pub fn format_folder(&self, format: FileFormat) -> PathBuf {
        self.data_dir.join(format.folder_name())
    }

    /// `<data_root>/synced_files.txt`
    pub fn ledger_path(&self) -> PathBuf {
        self.data_dir.join("synced_files.txt")
    }

    /// `<data_root>/activities.json`
    pub fn collection_path(&self) -> PathBuf {
        self.data_dir.join("activities.json")
    }

    /// `<data_root>/data.db`
    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join("data.db")
    }

    /// `<data_root>/../secret.txt` — the fallback secret file sits next to
    /// the data directory so it never lands inside a published data tree.
    pub fn secret_file_path(&self) -> PathBuf {
        match self.data_dir.parent() {
            Some(parent) => parent.join(SECRET_FILE),
            None => PathBuf::from(SECRET_FILE),
        }
    }
}

// ---------------------------------------------------------------------------
// Secret resolution
// ---------------------------------------------------------------------------

/// Resolve the credential secret from, in order: the explicit flag value,
/// the environment-provided value, the fallback secret file.
///
/// Blank values are treated as absent at every step. Returns
/// [`CoreError::SecretMissing`] with remediation text when nothing usable
/// is found.
pub fn resolve_secret(
    explicit: Option<&str>,
    env_value: Option<String>,
    fallback_file: &Path,
) -> Result<String, CoreError> {
    if let Some(s) = explicit {
        let s = s.trim();
        if !s.is_empty() {
            return Ok(s.to_owned());
        }
    }
    if let Some(s) = env_value {
        let s = s.trim();
        if !s.is_empty() {
            return Ok(s.to_owned());
        }
    }
    if fallback_file.exists() {
        let contents =
            std::fs::read_to_string(fallback_file).map_err(|e| io_err(fallback_file, e))?;
        let s = contents.trim();
        if !s.is_empty() {
            return Ok(s.to_owned());
        }
    }
    Err(CoreError::SecretMissing)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
