//! File-to-artifacts driver
//!
//! Load → transform → regrid → export (→ render), aborting on the first error.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::ccwt::{ccwt, regrid_surface, CcwtOutput, DisplayGrid, LatticeLinearInterpolator};
use crate::config::CcwtConfig;
use crate::error::{CcwtError, Result};
use crate::io::{finite_range, load_signal, write_artifacts, ArtifactPaths};

/// Where and how to write the results of a run
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub input: PathBuf,
    /// Defaults to the input file's directory
    pub output_dir: Option<PathBuf>,
    /// Render PNG figures (needs the `plot` feature)
    pub plot: bool,
}

impl RunOptions {
    pub fn new<P: Into<PathBuf>>(input: P) -> Self {
        Self {
            input: input.into(),
            output_dir: None,
            plot: true,
        }
    }

    /// Input file name without its last extension
    pub fn stem(&self) -> String {
        self.input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "ccwt".to_string())
    }

    pub fn resolved_output_dir(&self) -> PathBuf {
        match &self.output_dir {
            Some(dir) => dir.clone(),
            None => match self.input.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
                _ => PathBuf::from("."),
            },
        }
    }
}

/// Results of a completed run
#[derive(Debug)]
pub struct RunSummary {
    pub output: CcwtOutput,
    pub display: DisplayGrid,
    /// Regridded |CCWT|, shape (nr, nk)
    pub regridded: ndarray::Array2<f64>,
    pub artifacts: ArtifactPaths,
    pub rendered: bool,
}

/// Display mesh from the configuration, defaulting to the computation grid
pub fn display_grid(output: &CcwtOutput, config: &CcwtConfig) -> DisplayGrid {
    let nk = config.display.nk.unwrap_or(output.signal.len());
    let nr = config.display.nr.unwrap_or(output.axis.len());
    DisplayGrid::spanning(&output.signal.k, &output.axis.r, nk, nr)
}

pub fn run(options: &RunOptions, config: &CcwtConfig) -> Result<RunSummary> {
    config.validate()?;

    let raw = load_signal(&options.input, config.skip)?;
    let output = ccwt(&raw, config)?;

    let display = display_grid(&output, config);
    let regridded = regrid_surface(
        &output.magnitude(),
        &output.signal.k,
        &output.axis.r,
        &display,
        &LatticeLinearInterpolator,
    )?;
    debug!(
        rows = regridded.nrows(),
        columns = regridded.ncols(),
        "regridded surface"
    );

    let dir = options.resolved_output_dir();
    create_dir(&dir)?;
    let stem = options.stem();
    let artifacts = ArtifactPaths::new(&dir, &stem);
    write_artifacts(&artifacts, &output, &regridded, &display, config)?;

    let rendered = options.plot && render(&dir, &stem, &output, &regridded, &display, config)?;

    info!(
        stem = %stem,
        na = output.axis.len(),
        nt = output.signal.len(),
        "CCWT complete"
    );

    Ok(RunSummary {
        output,
        display,
        regridded,
        artifacts,
        rendered,
    })
}

/// Upper end of the fixed color scale
pub fn color_scale_max(regridded: &ndarray::Array2<f64>, config: &CcwtConfig) -> f64 {
    config.display.vmax.unwrap_or_else(|| {
        let (_, max) = finite_range(regridded);
        if max > 0.0 && max.is_finite() {
            max
        } else {
            1.0
        }
    })
}

#[cfg(feature = "plot")]
fn render(
    dir: &Path,
    stem: &str,
    output: &CcwtOutput,
    regridded: &ndarray::Array2<f64>,
    display: &DisplayGrid,
    config: &CcwtConfig,
) -> Result<bool> {
    let figures = crate::io::FigurePaths::new(dir, stem);
    let vmax = color_scale_max(regridded, config);
    crate::io::render_figures(&figures, output, regridded, display, vmax)?;
    Ok(true)
}

#[cfg(not(feature = "plot"))]
fn render(
    _dir: &Path,
    _stem: &str,
    _output: &CcwtOutput,
    _regridded: &ndarray::Array2<f64>,
    _display: &DisplayGrid,
    _config: &CcwtConfig,
) -> Result<bool> {
    tracing::warn!("built without the `plot` feature; skipping figures");
    Ok(false)
}

fn create_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).map_err(|source| CcwtError::Export {
        path: dir.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr2;

    #[test]
    fn test_stem_and_output_dir() {
        let options = RunOptions::new("/data/znfoil_k.dat");
        assert_eq!(options.stem(), "znfoil_k");
        assert_eq!(options.resolved_output_dir(), PathBuf::from("/data"));

        let options = RunOptions::new("sample.chi.dat");
        assert_eq!(options.stem(), "sample.chi");
        assert_eq!(options.resolved_output_dir(), PathBuf::from("."));
    }

    #[test]
    fn test_color_scale_max() {
        let surface = arr2(&[[0.0, 2.5], [f64::NAN, 1.0]]);
        assert_eq!(color_scale_max(&surface, &CcwtConfig::default()), 2.5);

        let mut config = CcwtConfig::default();
        config.display.vmax = Some(4.0);
        assert_eq!(color_scale_max(&surface, &config), 4.0);

        let flat = arr2(&[[0.0, 0.0]]);
        assert_eq!(color_scale_max(&flat, &CcwtConfig::default()), 1.0);
    }
}
