//! Cauchy wavelet filter bank
//!
//! The Cauchy wavelet of order `n` has the frequency response
//!
//! ```text
//! psi_hat(x) = 2π / (n-1)! * x^n * e^{-x},   x = a * omega
//! ```
//!
//! For orders around 200 both `x^n` and `(n-1)!` overflow, so the response is
//! evaluated in log space and exponentiated once:
//!
//! ```text
//! psi_hat(x) = exp(ln(2π) - S + n ln(x) - x),   S = sum_{m=1}^{n-1} ln(m)
//! ```
//!
//! Each R-space distance `r` maps to the dilation `a = n / (2r)`.
//!
//! # References
//! - Muñoz, Argoul & Farges (2003), American Mineralogist 88, 694-700

use ndarray::{Array1, Array2};
use rayon::prelude::*;
use std::f64::consts::PI;
use tracing::debug;

use crate::error::{CcwtError, Result};

/// `ln((n-1)!)` as a direct sum of logarithms
pub fn log_factorial_sum(order: usize) -> f64 {
    (1..order).map(|m| (m as f64).ln()).sum()
}

/// Frequency response at `x = a * omega`
///
/// The response at exactly zero frequency is zero by convention, which also keeps
/// `ln(0)` out of the evaluation.
#[inline]
pub fn cauchy_response(x: f64, order: usize, log_norm: f64) -> f64 {
    if x == 0.0 {
        0.0
    } else {
        ((2.0 * PI).ln() - log_norm + order as f64 * x.ln() - x).exp()
    }
}

/// R-space distances and their dilations
#[derive(Debug, Clone)]
pub struct ScaleAxis {
    /// `na` distances, evenly spaced over [r_min, r_max]
    pub r: Array1<f64>,
    /// `a = n / (2r)`, decreasing as `r` grows
    pub dilation: Array1<f64>,
    pub order: usize,
}

impl ScaleAxis {
    pub fn new(order: usize, r_min: f64, r_max: f64, na: usize) -> Result<Self> {
        if order == 0 {
            return Err(CcwtError::InvalidScale(
                "Cauchy order must be at least 1".into(),
            ));
        }
        if na == 0 {
            return Err(CcwtError::InvalidScale(
                "number of R intervals must be at least 1".into(),
            ));
        }
        if !(r_min > 0.0 && r_max > 0.0 && r_min.is_finite() && r_max.is_finite()) {
            return Err(CcwtError::InvalidScale(format!(
                "R bounds must be positive, got [{}, {}]",
                r_min, r_max
            )));
        }
        if na > 1 && r_max <= r_min {
            return Err(CcwtError::InvalidScale(format!(
                "r_max ({}) must exceed r_min ({})",
                r_max, r_min
            )));
        }

        let r = linspace(r_min, r_max, na);
        let dilation = r.mapv(|ri| order as f64 / (2.0 * ri));

        Ok(Self { r, dilation, order })
    }

    pub fn len(&self) -> usize {
        self.r.len()
    }

    pub fn is_empty(&self) -> bool {
        self.r.is_empty()
    }
}

/// Inclusive linear spacing; a single point sits at `start`
fn linspace(start: f64, end: f64, n: usize) -> Array1<f64> {
    if n == 1 {
        return Array1::from_elem(1, start);
    }
    let step = (end - start) / (n - 1) as f64;
    let mut values = Array1::from_iter((0..n).map(|i| start + i as f64 * step));
    values[n - 1] = end;
    values
}

/// Frequency-domain Cauchy filters, one row per scale
#[derive(Debug, Clone)]
pub struct FilterBank {
    /// Shape (na, npt); real and non-negative
    pub filters: Array2<f64>,
    pub order: usize,
    /// `ln((n-1)!)`
    pub log_norm: f64,
}

impl FilterBank {
    /// Build the filters for every scale of `axis` over `omega`
    ///
    /// Rows are independent and computed in parallel.
    pub fn new(axis: &ScaleAxis, omega: &Array1<f64>) -> Result<Self> {
        if axis.is_empty() {
            return Err(CcwtError::InvalidScale("empty scale axis".into()));
        }
        if axis.dilation.iter().any(|a| !(*a > 0.0 && a.is_finite())) {
            return Err(CcwtError::InvalidScale(
                "dilations must be positive and finite".into(),
            ));
        }

        let order = axis.order;
        let log_norm = log_factorial_sum(order);
        let npt = omega.len();
        let na = axis.len();

        let rows: Vec<(usize, Array1<f64>)> = axis
            .dilation
            .iter()
            .enumerate()
            .par_bridge()
            .map(|(i, &a)| {
                let row = omega.mapv(|w| cauchy_response(a * w, order, log_norm));
                (i, row)
            })
            .collect();

        let mut filters = Array2::zeros((na, npt));
        for (i, row) in rows {
            filters.row_mut(i).assign(&row);
        }

        let bank = Self {
            filters,
            order,
            log_norm,
        };
        debug!(
            na,
            npt,
            order,
            peak = bank.peak(),
            "built Cauchy filter bank"
        );
        Ok(bank)
    }

    /// Bank built from a precomputed matrix (rows = scales)
    pub fn from_filters(filters: Array2<f64>, order: usize) -> Self {
        Self {
            filters,
            order,
            log_norm: log_factorial_sum(order),
        }
    }

    pub fn num_scales(&self) -> usize {
        self.filters.nrows()
    }

    /// Analytic maximum of the response, reached at `x = n`
    pub fn peak(&self) -> f64 {
        let n = self.order as f64;
        ((2.0 * PI).ln() + n * n.ln() - n - self.log_norm).exp()
    }

    /// First phase-derivative constant of the Cauchy wavelet, `n + 1`
    pub fn phase_derivative(&self) -> f64 {
        self.order as f64 + 1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    fn omega_axis(npt: usize, step: f64) -> Array1<f64> {
        let padded = 2 * npt;
        Array1::from_iter((0..npt).map(|i| 2.0 * PI * i as f64 / (step * padded as f64)))
    }

    #[test]
    fn test_log_factorial_sum() {
        assert_eq!(log_factorial_sum(1), 0.0);
        assert_eq!(log_factorial_sum(2), 0.0);
        assert_relative_eq!(log_factorial_sum(5), (24.0_f64).ln(), epsilon = 1e-12);
        // large orders stay finite
        assert!(log_factorial_sum(300).is_finite());
    }

    #[test]
    fn test_scale_axis_monotonic() {
        let axis = ScaleAxis::new(200, 0.2, 6.0, 200).unwrap();
        assert_eq!(axis.len(), 200);
        for i in 1..axis.len() {
            assert!(axis.r[i] > axis.r[i - 1]);
            assert!(axis.dilation[i] < axis.dilation[i - 1]);
        }
        assert!(axis.dilation.iter().all(|&a| a > 0.0));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn test_scale_axis_monotonic_for_any_range(
            order in 1usize..=300,
            na in 1usize..300,
            r_min in 0.05f64..5.0,
            span in 0.01f64..10.0,
        ) {
            let axis = ScaleAxis::new(order, r_min, r_min + span, na).unwrap();
            prop_assert_eq!(axis.len(), na);
            prop_assert!(axis.dilation.iter().all(|&a| a > 0.0 && a.is_finite()));
            for i in 1..na {
                prop_assert!(axis.r[i] > axis.r[i - 1]);
                prop_assert!(axis.dilation[i] < axis.dilation[i - 1]);
            }
        }

        #[test]
        fn test_filters_vanish_at_dc_and_stay_below_peak(
            order in 1usize..=300,
            na in 1usize..40,
            r_min in 0.05f64..5.0,
            span in 0.01f64..10.0,
            step in 0.005f64..0.2,
        ) {
            let axis = ScaleAxis::new(order, r_min, r_min + span, na).unwrap();
            let bank = FilterBank::new(&axis, &omega_axis(128, step)).unwrap();
            let peak = bank.peak();
            prop_assert!(peak > 0.0 && peak.is_finite());

            for row in bank.filters.rows() {
                prop_assert_eq!(row[0], 0.0);
                for &v in row.iter() {
                    prop_assert!(v >= 0.0 && v.is_finite());
                    prop_assert!(v / peak <= 1.0 + 1e-9);
                }
            }
        }
    }

    #[test]
    fn test_reference_dilations() {
        let axis = ScaleAxis::new(200, 0.2, 6.0, 200).unwrap();
        assert_relative_eq!(axis.dilation[0], 200.0 / (2.0 * 0.2), epsilon = 1e-9);
        assert_relative_eq!(axis.dilation[199], 200.0 / (2.0 * 6.0), epsilon = 1e-9);
        assert_eq!(axis.r[199], 6.0);
    }

    #[test]
    fn test_invalid_scales() {
        assert!(matches!(
            ScaleAxis::new(0, 0.2, 6.0, 10),
            Err(CcwtError::InvalidScale(_))
        ));
        assert!(matches!(
            ScaleAxis::new(10, 0.0, 6.0, 10),
            Err(CcwtError::InvalidScale(_))
        ));
        assert!(matches!(
            ScaleAxis::new(10, 0.2, 6.0, 0),
            Err(CcwtError::InvalidScale(_))
        ));
    }

    #[test]
    fn test_single_scale_first_order() {
        let axis = ScaleAxis::new(1, 0.5, 0.5, 1).unwrap();
        assert_eq!(axis.len(), 1);
        assert_relative_eq!(axis.dilation[0], 1.0);

        let omega = omega_axis(64, 0.1);
        let bank = FilterBank::new(&axis, &omega).unwrap();
        assert_eq!(bank.filters.shape(), &[1, 64]);
        assert!(bank.filters.iter().all(|v| v.is_finite()));
        // order 1: 2π x e^{-x}
        let x = omega[3];
        assert_relative_eq!(bank.filters[[0, 3]], 2.0 * PI * x * (-x).exp(), epsilon = 1e-12);
    }

    #[test]
    fn test_zero_frequency_and_bounds() {
        let omega = omega_axis(512, 8.0 / 256.0);
        for order in [1, 2, 7, 50, 200, 300] {
            let axis = ScaleAxis::new(order, 0.2, 6.0, 16).unwrap();
            let bank = FilterBank::new(&axis, &omega).unwrap();
            let peak = bank.peak();

            for row in bank.filters.rows() {
                assert_eq!(row[0], 0.0);
                for &v in row.iter() {
                    assert!(v >= 0.0 && v.is_finite());
                    assert!(v / peak <= 1.0 + 1e-9, "order {} exceeds peak", order);
                }
            }
        }
    }

    #[test]
    fn test_peak_matches_direct_formula() {
        // order 5: 2π 5^5 e^{-5} / 4!
        let bank = FilterBank::from_filters(Array2::zeros((1, 1)), 5);
        let expected = 2.0 * PI * 5.0_f64.powi(5) * (-5.0_f64).exp() / 24.0;
        assert_relative_eq!(bank.peak(), expected, epsilon = 1e-12);
        assert_relative_eq!(
            cauchy_response(5.0, 5, log_factorial_sum(5)),
            expected,
            epsilon = 1e-12
        );
        assert_eq!(bank.phase_derivative(), 6.0);
    }
}
