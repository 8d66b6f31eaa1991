//! Poster engine — [`PosterKind`] and [`Renderer`].
//!
//! Templates are baked into the binary at compile time via `include_str!`.

use std::path::{Path, PathBuf};

use tera::Tera;

use paceline_core::{ActivityRecord, Config};

use crate::context;
use crate::dataset;
use crate::error::{io_err, RenderError};
use crate::options::PosterOptions;

const TPLS: &[(&str, &str)] = &[
    ("github.svg.tera", include_str!("templates/github.svg.tera")),
    ("grid.svg.tera", include_str!("templates/grid.svg.tera")),
    ("circular.svg.tera", include_str!("templates/circular.svg.tera")),
    ("month_life.svg.tera", include_str!("templates/month_life.svg.tera")),
];

// ---------------------------------------------------------------------------
// PosterKind
// ---------------------------------------------------------------------------

/// All supported poster visualizations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PosterKind {
    /// Contribution-style daily grid, one row band per year.
    Github,
    /// Twelve mini month calendars per year.
    Grid,
    /// One ring per year, a spoke per active day.
    Circular,
    /// One cell per month across all years.
    MonthOfLife,
}

impl PosterKind {
    pub fn all() -> &'static [PosterKind] {
        &[
            PosterKind::Github,
            PosterKind::Grid,
            PosterKind::Circular,
            PosterKind::MonthOfLife,
        ]
    }

    fn template_name(self) -> &'static str {
        match self {
            PosterKind::Github => "github.svg.tera",
            PosterKind::Grid => "grid.svg.tera",
            PosterKind::Circular => "circular.svg.tera",
            PosterKind::MonthOfLife => "month_life.svg.tera",
        }
    }
}

// ---------------------------------------------------------------------------
// Renderer
// ---------------------------------------------------------------------------

/// Tera-based poster renderer over embedded templates.
pub struct Renderer {
    tera: Tera,
}

impl Renderer {
    pub fn new() -> Result<Self, RenderError> {
        let mut tera = Tera::default();
        tera.add_raw_templates(TPLS.to_vec())?;
        Ok(Self { tera })
    }

    /// Render `kind` over the given records to an SVG string.
    pub fn render(
        &self,
        kind: PosterKind,
        records: &[ActivityRecord],
        options: &PosterOptions,
    ) -> Result<String, RenderError> {
        let ctx = match kind {
            PosterKind::Github => {
                tera::Context::from_serialize(context::github_context(records, options))?
            }
            PosterKind::Grid => {
                tera::Context::from_serialize(context::grid_context(records, options))?
            }
            PosterKind::Circular => {
                tera::Context::from_serialize(context::circular_context(records, options))?
            }
            PosterKind::MonthOfLife => {
                tera::Context::from_serialize(context::month_life_context(records, options))?
            }
        };
        Ok(self.tera.render(kind.template_name(), &ctx)?)
    }

    /// Load the dataset the options select and write the artifact.
    ///
    /// Returns the output path on success. Failures never touch already
    /// downloaded activity data.
    pub fn generate(
        &self,
        config: &Config,
        kind: PosterKind,
        options: &PosterOptions,
    ) -> Result<PathBuf, RenderError> {
        let records = dataset::load_records(config, options)?;
        let svg = self.render(kind, &records, options)?;
        write_artifact(&options.output, &svg)?;
        tracing::info!(
            kind = ?kind,
            records = records.len(),
            output = %options.output.display(),
            "poster written"
        );
        Ok(options.output.clone())
    }
}

/// Write the artifact via `.tmp` + rename.
fn write_artifact(path: &Path, svg: &str) -> Result<(), RenderError> {
    if let Some(dir) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).map_err(|e| io_err(dir, e))?;
    }
    let tmp = PathBuf::from(format!("{}.tmp", path.display()));
    std::fs::write(&tmp, svg).map_err(|e| io_err(&tmp, e))?;
    if let Err(e) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(io_err(path, e));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
