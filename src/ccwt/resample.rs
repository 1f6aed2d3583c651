//! EXAFS signal resampling
//!
//! Piecewise-linear interpolation of χ(k) onto the uniform k grid the transform runs on.

use ndarray::Array1;
use tracing::{debug, warn};

use crate::config::{CcwtConfig, ExtrapolationPolicy};
use crate::error::{CcwtError, Result};

/// Measured (k, χ) pairs, k strictly increasing
#[derive(Debug, Clone)]
pub struct RawSignal {
    k: Vec<f64>,
    chi: Vec<f64>,
}

impl RawSignal {
    /// Validate and wrap measured data
    ///
    /// Fails with `NonFiniteInput` on NaN or infinite samples and with `InputOrder`
    /// when k is not strictly increasing.
    pub fn new(k: Vec<f64>, chi: Vec<f64>) -> Result<Self> {
        if k.len() != chi.len() {
            return Err(CcwtError::Config(format!(
                "k has {} values but chi has {}",
                k.len(),
                chi.len()
            )));
        }
        if k.is_empty() {
            return Err(CcwtError::DegenerateSignal(
                "input contains no data points".into(),
            ));
        }
        for (column, values) in [("k", &k), ("chi", &chi)] {
            if let Some(index) = values.iter().position(|v| !v.is_finite()) {
                return Err(CcwtError::NonFiniteInput {
                    column,
                    index,
                    value: values[index],
                });
            }
        }
        for i in 1..k.len() {
            // `!(a > b)` also catches NaN
            if !(k[i] > k[i - 1]) {
                return Err(CcwtError::InputOrder {
                    index: i,
                    previous: k[i - 1],
                    current: k[i],
                });
            }
        }
        Ok(Self { k, chi })
    }

    pub fn k(&self) -> &[f64] {
        &self.k
    }

    pub fn chi(&self) -> &[f64] {
        &self.chi
    }

    pub fn len(&self) -> usize {
        self.k.len()
    }

    pub fn is_empty(&self) -> bool {
        self.k.is_empty()
    }

    /// First and last measured k
    pub fn k_span(&self) -> (f64, f64) {
        (self.k[0], self.k[self.k.len() - 1])
    }

    /// Linear interpolation at `x`, holding the boundary value outside the data
    pub fn interpolate(&self, x: f64) -> f64 {
        let n = self.k.len();
        if x <= self.k[0] {
            return self.chi[0];
        }
        if x >= self.k[n - 1] {
            return self.chi[n - 1];
        }

        // first index with k > x; k[0] <= x < k[n-1] keeps it in 1..n
        let upper = self.k.partition_point(|&k| k <= x);
        let lower = upper - 1;

        let slope = (self.chi[upper] - self.chi[lower]) / (self.k[upper] - self.k[lower]);
        self.chi[lower] + (x - self.k[lower]) * slope
    }
}

/// Uniform resampling target: `nt` points starting at `k_min`, step `(k_max - k_min) / nt`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetGrid {
    pub k_min: f64,
    pub k_max: f64,
    pub nt: usize,
}

impl TargetGrid {
    pub fn new(k_min: f64, k_max: f64, nt: usize) -> Self {
        Self { k_min, k_max, nt }
    }

    /// Resolve the k range from the configuration, or from the data when requested
    pub fn from_config(config: &CcwtConfig, raw: &RawSignal) -> Self {
        if config.k_from_data {
            let (first, last) = raw.k_span();
            Self::new(first, last, config.nt)
        } else {
            Self::new(config.k_min, config.k_max, config.nt)
        }
    }

    pub fn step(&self) -> f64 {
        (self.k_max - self.k_min) / self.nt as f64
    }

    /// Grid abscissae `k_min + i * step` for i in [0, nt)
    pub fn points(&self) -> Array1<f64> {
        let step = self.step();
        Array1::from_iter((0..self.nt).map(|i| self.k_min + i as f64 * step))
    }
}

/// χ(k) on an evenly spaced grid
#[derive(Debug, Clone)]
pub struct UniformSignal {
    pub k: Array1<f64>,
    pub chi: Array1<f64>,
    pub k_min: f64,
    pub k_max: f64,
    pub step: f64,
}

impl UniformSignal {
    pub fn len(&self) -> usize {
        self.chi.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chi.is_empty()
    }
}

/// Resample `raw` onto `grid`
///
/// Samples outside the measured range take the nearest boundary χ value. Under
/// `ExtrapolationPolicy::Reject` such samples are an error instead.
pub fn resample(
    raw: &RawSignal,
    grid: &TargetGrid,
    policy: ExtrapolationPolicy,
) -> Result<UniformSignal> {
    if grid.nt == 0 {
        return Err(CcwtError::Config("nt must be at least 1".into()));
    }
    if !(grid.k_max > grid.k_min) {
        return Err(CcwtError::Config(format!(
            "k_max ({}) must exceed k_min ({})",
            grid.k_max, grid.k_min
        )));
    }

    let k = grid.points();
    let (data_min, data_max) = raw.k_span();
    let last = k[k.len() - 1];

    if grid.k_min < data_min || last > data_max {
        match policy {
            ExtrapolationPolicy::Reject => {
                return Err(CcwtError::Range {
                    k_min: grid.k_min,
                    k_max: grid.k_max,
                    data_min,
                    data_max,
                });
            }
            ExtrapolationPolicy::Clamp => {
                let outside = k.iter().filter(|&&x| x < data_min || x > data_max).count();
                warn!(
                    data_min,
                    data_max,
                    k_min = grid.k_min,
                    k_max = grid.k_max,
                    outside,
                    "target k range exceeds the data; holding boundary values"
                );
            }
        }
    }

    let chi = k.mapv(|x| raw.interpolate(x));
    debug!(nt = grid.nt, step = grid.step(), "resampled EXAFS signal");

    Ok(UniformSignal {
        k,
        chi,
        k_min: grid.k_min,
        k_max: grid.k_max,
        step: grid.step(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn linear_raw() -> RawSignal {
        // k = 3.0, 3.1, ..., 3.9 with χ = k
        let k: Vec<f64> = (0..10).map(|i| 3.0 + 0.1 * i as f64).collect();
        RawSignal::new(k.clone(), k).unwrap()
    }

    #[test]
    fn test_unsorted_input_rejected() {
        let err = RawSignal::new(vec![1.0, 3.0, 2.0], vec![0.0; 3]).unwrap_err();
        match err {
            CcwtError::InputOrder { index, .. } => assert_eq!(index, 2),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_k_rejected() {
        let err = RawSignal::new(vec![1.0, 2.0, 2.0], vec![0.0; 3]).unwrap_err();
        assert!(matches!(err, CcwtError::InputOrder { .. }));
    }

    #[test]
    fn test_empty_and_non_finite_input_rejected() {
        assert!(matches!(
            RawSignal::new(vec![], vec![]),
            Err(CcwtError::DegenerateSignal(_))
        ));

        let err = RawSignal::new(vec![1.0, 2.0], vec![0.5, f64::NAN]).unwrap_err();
        assert!(matches!(
            err,
            CcwtError::NonFiniteInput {
                column: "chi",
                index: 1,
                ..
            }
        ));
        assert_eq!(err.stage(), "resample");

        let err = RawSignal::new(vec![1.0, f64::INFINITY], vec![0.5, 0.1]).unwrap_err();
        assert!(matches!(
            err,
            CcwtError::NonFiniteInput {
                column: "k",
                index: 1,
                ..
            }
        ));
    }

    #[test]
    fn test_short_linear_input_extrapolates_flat() {
        let raw = linear_raw();
        let grid = TargetGrid::new(3.0, 11.0, 256);
        let out = resample(&raw, &grid, ExtrapolationPolicy::Clamp).unwrap();

        assert_eq!(out.len(), 256);
        assert_relative_eq!(out.step, 8.0 / 256.0);

        for (&k, &chi) in out.k.iter().zip(out.chi.iter()) {
            if k <= 3.9 {
                assert_relative_eq!(chi, k, epsilon = 1e-12);
            } else {
                assert_relative_eq!(chi, raw.chi()[9], epsilon = 1e-15);
            }
        }
        assert_eq!(out.chi[255], raw.chi()[9]);
    }

    #[test]
    fn test_reject_policy_refuses_extrapolation() {
        let raw = linear_raw();
        let grid = TargetGrid::new(3.0, 11.0, 256);
        let err = resample(&raw, &grid, ExtrapolationPolicy::Reject).unwrap_err();
        assert!(matches!(err, CcwtError::Range { .. }));
        assert_eq!(err.stage(), "resample");
    }

    #[test]
    fn test_resample_on_own_grid_is_identity() {
        let grid = TargetGrid::new(3.0, 11.0, 64);
        let k = grid.points();
        let chi: Vec<f64> = k.iter().map(|&x| (2.0 * x).sin() * x.powi(2)).collect();
        let raw = RawSignal::new(k.to_vec(), chi.clone()).unwrap();

        let out = resample(&raw, &grid, ExtrapolationPolicy::Reject).unwrap();
        assert_eq!(out.k.to_vec(), k.to_vec());
        assert_eq!(out.chi.to_vec(), chi);
    }

    #[test]
    fn test_grid_from_data() {
        let raw = linear_raw();
        let config = CcwtConfig::new().with_k_from_data(true).with_nt(9);
        let grid = TargetGrid::from_config(&config, &raw);
        assert_eq!(grid.k_min, 3.0);
        assert_relative_eq!(grid.k_max, 3.9, epsilon = 1e-12);

        // the data range is always covered, so rejection never triggers
        let out = resample(&raw, &grid, ExtrapolationPolicy::Reject).unwrap();
        assert_eq!(out.len(), 9);
    }

    #[test]
    fn test_interpolate_midpoints() {
        let raw = RawSignal::new(vec![0.0, 1.0, 3.0], vec![0.0, 2.0, 0.0]).unwrap();
        assert_relative_eq!(raw.interpolate(0.5), 1.0);
        assert_relative_eq!(raw.interpolate(2.0), 1.0);
        assert_eq!(raw.interpolate(1.0), 2.0);
        assert_eq!(raw.interpolate(-4.0), 0.0);
        assert_eq!(raw.interpolate(10.0), 0.0);
    }
}
