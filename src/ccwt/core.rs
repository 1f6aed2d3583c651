//! Core CCWT algorithm implementation
//!
//! Convolves the signal with every Cauchy filter by multiplication in the frequency
//! domain followed by an inverse FFT, one row per scale.

use ndarray::{s, Array1, Array2};
use num_complex::Complex64;
use rayon::prelude::*;
use tracing::{debug, info};

use super::resample::{resample, RawSignal, TargetGrid, UniformSignal};
use super::spectrum::{spectral_half, SpectralHalf};
use super::utils::{FourierTransformer, RustFftTransformer};
use super::wavelets::{FilterBank, ScaleAxis};
use crate::config::CcwtConfig;
use crate::error::{CcwtError, Result};

/// Wavelet coefficients on the (scale, k) grid
#[derive(Debug, Clone)]
pub struct TransformSurface {
    /// Shape (na, ZF)
    pub coefs: Array2<Complex64>,
    /// Columns that map onto the resampled k grid
    pub nt: usize,
}

impl TransformSurface {
    /// |CCWT| over the first `nt` columns, shape (na, nt)
    pub fn magnitude(&self) -> Array2<f64> {
        let nt = self.nt.min(self.coefs.ncols());
        self.coefs.slice(s![.., ..nt]).mapv(|c| c.norm())
    }

    pub fn num_scales(&self) -> usize {
        self.coefs.nrows()
    }
}

/// Compute one scale row: `ifft(conj(filter) * spectrum, ZF)`
///
/// `spectrum` holds the first `npt` coefficients; the remaining bins up to
/// `padded_len` are zero.
pub fn transform_row(
    filter: &[f64],
    spectrum: &[Complex64],
    padded_len: usize,
    fft: &dyn FourierTransformer,
) -> Array1<Complex64> {
    let product: Vec<Complex64> = filter
        .iter()
        .zip(spectrum.iter())
        .map(|(&f, &x)| Complex64::new(f, 0.0).conj() * x)
        .collect();
    fft.inverse(&product, padded_len)
}

/// Compute all scale rows (parallelized)
///
/// Rows are independent; each worker returns its index so the surface is assembled
/// in scale order. Any non-finite coefficient fails with `NumericDivergence`.
pub fn transform(
    bank: &FilterBank,
    spectrum: &Array1<Complex64>,
    padded_len: usize,
    nt: usize,
    fft: &dyn FourierTransformer,
) -> Result<TransformSurface> {
    if bank.filters.ncols() != spectrum.len() {
        return Err(CcwtError::Config(format!(
            "filter bank has {} frequency bins but the spectrum has {}",
            bank.filters.ncols(),
            spectrum.len()
        )));
    }
    let spectrum = spectrum.to_vec();
    let n_scales = bank.num_scales();

    let rows: Vec<(usize, Array1<Complex64>)> = bank
        .filters
        .outer_iter()
        .enumerate()
        .par_bridge()
        .map(|(i, filter)| {
            let filter = filter.to_vec();
            (i, transform_row(&filter, &spectrum, padded_len, fft))
        })
        .collect();

    let mut coefs = Array2::zeros((n_scales, padded_len));
    for (i, row) in rows {
        coefs.row_mut(i).assign(&row);
    }

    if let Some(((row, column), _)) = coefs
        .indexed_iter()
        .find(|(_, c)| !(c.re.is_finite() && c.im.is_finite()))
    {
        return Err(CcwtError::NumericDivergence { row, column });
    }

    Ok(TransformSurface { coefs, nt })
}

/// Everything the pipeline produced
#[derive(Debug, Clone)]
pub struct CcwtOutput {
    pub signal: UniformSignal,
    pub spectrum: SpectralHalf,
    pub axis: ScaleAxis,
    pub bank: FilterBank,
    pub surface: TransformSurface,
}

impl CcwtOutput {
    /// |CCWT|, shape (na, nt)
    pub fn magnitude(&self) -> Array2<f64> {
        self.surface.magnitude()
    }
}

/// Full CCWT computation with the default FFT backend
///
/// 1. Resample χ(k) onto the uniform grid
/// 2. Zero-padded spectrum
/// 3. Cauchy filter bank over the R axis
/// 4. Per-scale inverse transforms
pub fn ccwt(raw: &RawSignal, config: &CcwtConfig) -> Result<CcwtOutput> {
    // padded_len() is only meaningful for a validated configuration
    config.validate()?;
    let fft = RustFftTransformer::with_sizes(&[config.padded_len()]);
    ccwt_with(raw, config, &fft)
}

/// Full CCWT computation with a caller-supplied FFT backend
pub fn ccwt_with(
    raw: &RawSignal,
    config: &CcwtConfig,
    fft: &dyn FourierTransformer,
) -> Result<CcwtOutput> {
    config.validate()?;

    info!("EXAFS data interpolation...");
    let grid = TargetGrid::from_config(config, raw);
    let signal = resample(raw, &grid, config.extrapolation)?;

    let spectrum = spectral_half(&signal, config.oversampling, fft)?;

    info!("Cauchy wavelet calculation...");
    let axis = ScaleAxis::new(config.order, config.r_min, config.r_max, config.na)?;
    let bank = FilterBank::new(&axis, &spectrum.omega)?;

    info!("Wavelet transform calculation...");
    let surface = transform(
        &bank,
        &spectrum.raw,
        spectrum.padded_len,
        signal.len(),
        fft,
    )?;
    debug!(
        rows = surface.num_scales(),
        columns = surface.coefs.ncols(),
        "assembled transform surface"
    );

    Ok(CcwtOutput {
        signal,
        spectrum,
        axis,
        bank,
        surface,
    })
}
