//! # EXAFS CCWT - Continuous Cauchy wavelet transform of EXAFS spectra
//!
//! Resamples χ(k) onto a uniform grid, filters its zero-padded spectrum with a bank of
//! Cauchy wavelets indexed by R-space distance, and assembles the |CCWT| surface over
//! (k, R) for qualitative inspection of coordination shells.
//!
//! Reference: Muñoz M., Argoul P. and Farges F. (2003), Continuous Cauchy wavelet
//! transform analyses of EXAFS spectra: a qualitative approach. American Mineralogist
//! 88, 694-700.

pub mod ccwt;
pub mod config;
pub mod error;
pub mod io;
pub mod logging;
pub mod pipeline;

pub use ccwt::{ccwt, CcwtOutput, RawSignal};
pub use config::{CcwtConfig, DisplayConfig, ExtrapolationPolicy};
pub use error::{CcwtError, Result};

#[cfg(feature = "python")]
use pyo3::prelude::*;

/// Python module definition
#[cfg(feature = "python")]
#[pymodule]
fn exafs_ccwt(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(ccwt::ccwt_py, m)?)?;
    Ok(())
}
