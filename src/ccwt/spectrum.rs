//! Zero-padded Fourier transform of the resampled signal
//!
//! Only the non-negative frequency half is kept. The raw half feeds the wavelet
//! convolution; the peak-normalized copy exists for display.

use ndarray::Array1;
use num_complex::Complex64;
use std::f64::consts::PI;
use tracing::debug;

use super::resample::UniformSignal;
use super::utils::{to_complex, FourierTransformer};
use crate::error::{CcwtError, Result};

/// Non-negative frequency half of the padded DFT
#[derive(Debug, Clone)]
pub struct SpectralHalf {
    /// First `npt` DFT coefficients, unnormalized
    pub raw: Array1<Complex64>,
    /// `raw` divided by `peak`
    pub normalized: Array1<Complex64>,
    /// `freq[i] = i / (step * ZF)`
    pub freq: Array1<f64>,
    /// `2π * freq`
    pub omega: Array1<f64>,
    /// Largest magnitude over all `ZF` coefficients
    pub peak: f64,
    /// Padded transform length `ZF`
    pub padded_len: usize,
}

impl SpectralHalf {
    /// Number of retained coefficients `npt = ZF / 2`
    pub fn len(&self) -> usize {
        self.raw.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Display axis `freq * π`, read as a pseudo-R distance
    pub fn pseudo_r(&self) -> Array1<f64> {
        self.freq.mapv(|f| f * PI)
    }
}

/// Compute the padded spectrum of `signal` with oversampling factor `z`
///
/// Empty and constant signals are rejected with `DegenerateSignal`, as is any
/// spectrum whose peak magnitude is zero or not finite.
pub fn spectral_half(
    signal: &UniformSignal,
    z: usize,
    fft: &dyn FourierTransformer,
) -> Result<SpectralHalf> {
    if signal.is_empty() {
        return Err(CcwtError::DegenerateSignal(
            "resampled signal is empty".into(),
        ));
    }
    let first = signal.chi[0];
    if signal.chi.iter().all(|&x| x == first) {
        return Err(CcwtError::DegenerateSignal(format!(
            "resampled signal is constant (χ = {})",
            first
        )));
    }
    if z == 0 {
        return Err(CcwtError::Config("oversampling must be at least 1".into()));
    }

    let padded_len = z * signal.len();
    let npt = padded_len / 2;

    let spectrum = fft.forward(&to_complex(&signal.chi), padded_len);

    let peak = spectrum.iter().map(|c| c.norm()).fold(0.0_f64, f64::max);
    if !(peak > 0.0 && peak.is_finite()) {
        return Err(CcwtError::DegenerateSignal(format!(
            "spectrum peak magnitude is {}",
            peak
        )));
    }

    let raw: Array1<Complex64> = spectrum.iter().take(npt).copied().collect();
    let normalized = raw.mapv(|c| c / peak);

    let scale = 1.0 / (signal.step * padded_len as f64);
    let freq = Array1::from_iter((0..npt).map(|i| i as f64 * scale));
    let omega = freq.mapv(|f| 2.0 * PI * f);

    debug!(padded_len, npt, peak, "computed padded spectrum");

    Ok(SpectralHalf {
        raw,
        normalized,
        freq,
        omega,
        peak,
        padded_len,
    })
}
