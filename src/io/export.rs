//! Numeric output artifacts
//!
//! Plain-text columns and matrices for plotting tools, plus a JSON file with the
//! axes, shapes and configuration of the run.

use ndarray::Array2;
use serde::Serialize;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::ccwt::{CcwtOutput, DisplayGrid};
use crate::config::CcwtConfig;
use crate::error::{CcwtError, Result};

/// Paths of the written artifacts
#[derive(Debug, Clone)]
pub struct ArtifactPaths {
    pub spectrum: PathBuf,
    pub signal: PathBuf,
    pub surface: PathBuf,
    pub metadata: PathBuf,
}

impl ArtifactPaths {
    /// `<dir>/<stem>_{ft,chi,ccwt}.dat` and `<dir>/<stem>_ccwt.json`
    pub fn new(dir: &Path, stem: &str) -> Self {
        Self {
            spectrum: dir.join(format!("{}_ft.dat", stem)),
            signal: dir.join(format!("{}_chi.dat", stem)),
            surface: dir.join(format!("{}_ccwt.dat", stem)),
            metadata: dir.join(format!("{}_ccwt.json", stem)),
        }
    }
}

#[derive(Debug, Serialize)]
struct Metadata<'a> {
    config: &'a CcwtConfig,
    nt: usize,
    padded_len: usize,
    npt: usize,
    na: usize,
    k_step: f64,
    spectrum_peak: f64,
    wavelet_peak: f64,
    surface_shape: [usize; 2],
    surface_min: f64,
    surface_max: f64,
    k: Vec<f64>,
    r: Vec<f64>,
}

/// Finite min and max of a surface (NaN cells are skipped)
pub fn finite_range(values: &Array2<f64>) -> (f64, f64) {
    values
        .iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        })
}

/// Write all numeric artifacts of a run
pub fn write_artifacts(
    paths: &ArtifactPaths,
    output: &CcwtOutput,
    regridded: &Array2<f64>,
    display: &DisplayGrid,
    config: &CcwtConfig,
) -> Result<()> {
    let pseudo_r = output.spectrum.pseudo_r();
    let mut text = String::from("# R (freq * pi)    |FT| (normalized)\n");
    for (r, c) in pseudo_r.iter().zip(output.spectrum.normalized.iter()) {
        let _ = writeln!(text, "{:.8e} {:.8e}", r, c.norm());
    }
    write_file(&paths.spectrum, &text)?;

    let mut text = String::from("# k (1/A)    chi(k)\n");
    for (k, chi) in output.signal.k.iter().zip(output.signal.chi.iter()) {
        let _ = writeln!(text, "{:.8e} {:.8e}", k, chi);
    }
    write_file(&paths.signal, &text)?;

    write_file(&paths.surface, &surface_text(regridded, display))?;

    let (surface_min, surface_max) = finite_range(regridded);
    let metadata = Metadata {
        config,
        nt: output.signal.len(),
        padded_len: output.spectrum.padded_len,
        npt: output.spectrum.len(),
        na: output.axis.len(),
        k_step: output.signal.step,
        spectrum_peak: output.spectrum.peak,
        wavelet_peak: output.bank.peak(),
        surface_shape: [regridded.nrows(), regridded.ncols()],
        surface_min,
        surface_max,
        k: display.x.to_vec(),
        r: display.y.to_vec(),
    };
    let json = serde_json::to_string_pretty(&metadata)
        .map_err(|e| CcwtError::Config(format!("metadata serialization: {}", e)))?;
    write_file(&paths.metadata, &json)?;

    info!(
        dir = %paths.surface.parent().unwrap_or(Path::new(".")).display(),
        "wrote CCWT artifacts"
    );
    Ok(())
}

/// Matrix text: one row per R, one column per k
fn surface_text(surface: &Array2<f64>, display: &DisplayGrid) -> String {
    let mut text = String::new();
    let _ = writeln!(
        text,
        "# |CCWT| rows: R from {} to {} ({} rows); columns: k from {} to {} ({} columns)",
        display.y.iter().next().copied().unwrap_or(f64::NAN),
        display.y.iter().last().copied().unwrap_or(f64::NAN),
        display.y.len(),
        display.x.iter().next().copied().unwrap_or(f64::NAN),
        display.x.iter().last().copied().unwrap_or(f64::NAN),
        display.x.len(),
    );
    for row in surface.rows() {
        let line: Vec<String> = row.iter().map(|v| format!("{:.6e}", v)).collect();
        text.push_str(&line.join(" "));
        text.push('\n');
    }
    text
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    fs::write(path, contents).map_err(|source| CcwtError::Export {
        path: path.to_path_buf(),
        source,
    })
}
