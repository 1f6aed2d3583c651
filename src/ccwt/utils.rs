//! FFT helpers for the CCWT
//!
//! `FourierTransformer` is the seam the pipeline uses for forward and inverse transforms;
//! `RustFftTransformer` implements it with cached rustfft plans.

use ndarray::Array1;
use num_complex::Complex64;
use rustfft::{Fft, FftPlanner};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

/// Forward and inverse plans for one length
pub type FftPlans = (Arc<dyn Fft<f64>>, Arc<dyn Fft<f64>>);

/// FFT plan cache, keyed by transform length
pub type FftPlanCache = Arc<HashMap<usize, FftPlans>>;

/// Discrete Fourier transform capability
///
/// Both directions take a target length `n`: shorter input is zero-padded and longer
/// input truncated, as with `numpy.fft.fft(x, n)`. `inverse` is normalized by `1/n`.
pub trait FourierTransformer: Sync {
    fn forward(&self, input: &[Complex64], n: usize) -> Array1<Complex64>;

    fn inverse(&self, input: &[Complex64], n: usize) -> Array1<Complex64>;
}

/// rustfft-backed transformer
///
/// Plans for the lengths given at construction are shared lock-free by every thread;
/// other lengths are planned once on first use and kept behind a mutex. Clones share
/// both caches.
#[derive(Clone)]
pub struct RustFftTransformer {
    cache: FftPlanCache,
    on_demand: Arc<Mutex<HashMap<usize, FftPlans>>>,
}

impl RustFftTransformer {
    pub fn with_sizes(sizes: &[usize]) -> Self {
        let mut planner = FftPlanner::new();
        let mut cache = HashMap::new();
        for &size in sizes {
            let fft = planner.plan_fft_forward(size);
            let ifft = planner.plan_fft_inverse(size);
            cache.insert(size, (fft, ifft));
        }
        Self {
            cache: Arc::new(cache),
            on_demand: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Every length a plan exists for, ascending
    pub fn planned_lengths(&self) -> Vec<usize> {
        let on_demand = self.on_demand.lock().unwrap_or_else(PoisonError::into_inner);
        let mut lengths: Vec<usize> = self.cache.keys().chain(on_demand.keys()).copied().collect();
        lengths.sort_unstable();
        lengths.dedup();
        lengths
    }

    fn plans(&self, n: usize) -> FftPlans {
        if let Some((fft, ifft)) = self.cache.get(&n) {
            return (Arc::clone(fft), Arc::clone(ifft));
        }
        let mut on_demand = self.on_demand.lock().unwrap_or_else(PoisonError::into_inner);
        let (fft, ifft) = on_demand.entry(n).or_insert_with(|| {
            let mut planner = FftPlanner::new();
            (planner.plan_fft_forward(n), planner.plan_fft_inverse(n))
        });
        (Arc::clone(fft), Arc::clone(ifft))
    }
}

impl Default for RustFftTransformer {
    fn default() -> Self {
        Self::with_sizes(&[])
    }
}

impl FourierTransformer for RustFftTransformer {
    fn forward(&self, input: &[Complex64], n: usize) -> Array1<Complex64> {
        let mut buffer = padded(input, n);
        if n > 0 {
            let (fft, _) = self.plans(n);
            fft.process(&mut buffer);
        }
        Array1::from_vec(buffer)
    }

    fn inverse(&self, input: &[Complex64], n: usize) -> Array1<Complex64> {
        let mut buffer = padded(input, n);
        if n > 0 {
            let (_, ifft) = self.plans(n);
            ifft.process(&mut buffer);

            let norm = 1.0 / n as f64;
            for x in &mut buffer {
                *x *= norm;
            }
        }
        Array1::from_vec(buffer)
    }
}

/// Copy `input` into a buffer of exactly `n` samples
fn padded(input: &[Complex64], n: usize) -> Vec<Complex64> {
    let mut buffer: Vec<Complex64> = input.iter().take(n).copied().collect();
    buffer.resize(n, Complex64::new(0.0, 0.0));
    buffer
}

/// Promote a real sequence to complex samples
pub fn to_complex(values: &Array1<f64>) -> Vec<Complex64> {
    values.iter().map(|&x| Complex64::new(x, 0.0)).collect()
}
