//! Python FFI bindings for the CCWT
//!
//! Provides Python-callable functions using PyO3.

use numpy::{IntoPyArray, PyArray1, PyArray2, PyReadonlyArray1};
use pyo3::prelude::*;

use super::core::ccwt;
use super::resample::RawSignal;
use crate::config::CcwtConfig;

/// Python-callable CCWT
///
/// # Arguments
/// * `k` - Measured wavenumbers, strictly increasing (1D numpy array)
/// * `chi` - χ(k) at those wavenumbers (1D numpy array)
/// * `order` - Cauchy wavelet order (default: 200)
/// * `r_min`, `r_max` - R-space bounds in Å (default: 0.2, 6.0)
/// * `na` - Number of R-space scales (default: 200)
/// * `k_min`, `k_max` - Resampled k range (default: 3.0, 11.0)
/// * `nt` - Number of resampled points (default: 256)
/// * `oversampling` - Zero-padding factor (default: 8)
///
/// # Returns
/// Tuple of (magnitude, k_axis, r_axis):
/// - magnitude: |CCWT| (2D array, [na, nt])
/// - k_axis: resampled wavenumbers (1D array)
/// - r_axis: R-space distances (1D array)
///
/// # Example (Python)
/// ```python
/// import exafs_ccwt
/// import numpy as np
///
/// k, chi = np.loadtxt("znfoil_k.dat", unpack=True)
/// mag, k_axis, r_axis = exafs_ccwt.ccwt_py(k, chi, order=200)
/// ```
#[pyfunction]
#[pyo3(signature = (k, chi, order=200, r_min=0.2, r_max=6.0, na=200, k_min=3.0, k_max=11.0, nt=256, oversampling=8))]
#[allow(clippy::too_many_arguments)]
pub fn ccwt_py<'py>(
    py: Python<'py>,
    k: PyReadonlyArray1<f64>,
    chi: PyReadonlyArray1<f64>,
    order: usize,
    r_min: f64,
    r_max: f64,
    na: usize,
    k_min: f64,
    k_max: f64,
    nt: usize,
    oversampling: usize,
) -> PyResult<(
    Bound<'py, PyArray2<f64>>,
    Bound<'py, PyArray1<f64>>,
    Bound<'py, PyArray1<f64>>,
)> {
    let k = k.as_array().to_vec();
    let chi = chi.as_array().to_vec();

    let config = CcwtConfig::new()
        .with_order(order)
        .with_r_range(r_min, r_max)
        .with_na(na)
        .with_k_range(k_min, k_max)
        .with_nt(nt)
        .with_oversampling(oversampling);

    // release the GIL while the scale rows run on the rayon pool
    let output = py
        .detach(|| RawSignal::new(k, chi).and_then(|raw| ccwt(&raw, &config)))
        .map_err(|e| {
            pyo3::exceptions::PyValueError::new_err(format!("CCWT error [{}]: {}", e.stage(), e))
        })?;

    let magnitude = output.magnitude().into_pyarray(py);
    let k_axis = output.signal.k.into_pyarray(py);
    let r_axis = output.axis.r.into_pyarray(py);

    Ok((magnitude, k_axis, r_axis))
}
