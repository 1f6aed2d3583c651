//! File input and output artifacts

pub mod export;
pub mod loader;
#[cfg(feature = "plot")]
pub mod plot;

pub use export::{finite_range, write_artifacts, ArtifactPaths};
pub use loader::{load_signal, parse_signal};
#[cfg(feature = "plot")]
pub use plot::{render_figures, FigurePaths};
