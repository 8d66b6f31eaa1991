//! # paceline-render
//!
//! Tera-based poster generator. Loads the aggregate activity collection
//! (flat file or structured store), filters it, and renders one of four
//! embedded SVG templates: geometry and statistics are computed in Rust,
//! markup lives in the templates.

pub mod context;
pub mod dataset;
pub mod engine;
pub mod error;
pub mod options;

pub use engine::{PosterKind, Renderer};
pub use error::RenderError;
pub use options::{parse_year_range, DataSource, Locale, PosterOptions};
