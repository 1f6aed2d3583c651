//! # CCWT (Continuous Cauchy Wavelet Transform) Module
//!
//! Resampling, zero-padded spectrum, Cauchy filter bank, per-scale inverse
//! transforms and regridding of the resulting k–R surface.

pub mod core;
pub mod regrid;
pub mod resample;
pub mod spectrum;
pub mod utils;
pub mod wavelets;

#[cfg(feature = "python")]
pub mod ffi;

pub use self::core::{ccwt, ccwt_with, transform, CcwtOutput, TransformSurface};
pub use regrid::{regrid_surface, DisplayGrid, LatticeLinearInterpolator, ScatteredInterpolator};
pub use resample::{resample, RawSignal, TargetGrid, UniformSignal};
pub use spectrum::{spectral_half, SpectralHalf};
pub use utils::{FourierTransformer, RustFftTransformer};
pub use wavelets::{FilterBank, ScaleAxis};

#[cfg(feature = "python")]
pub use ffi::ccwt_py;
