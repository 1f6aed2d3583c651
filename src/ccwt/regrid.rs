//! Regridding of the |CCWT| surface onto a regular (k, R) display mesh
//!
//! Linear interpolation over a triangulation of the source points. Query points
//! outside the convex hull of the sources are NaN.

use ndarray::{Array1, Array2};
use std::cmp::Ordering;
use tracing::debug;

use crate::error::{CcwtError, Result};

/// Regular display mesh: `x` along columns (k), `y` along rows (R)
#[derive(Debug, Clone)]
pub struct DisplayGrid {
    pub x: Array1<f64>,
    pub y: Array1<f64>,
}

impl DisplayGrid {
    pub fn new(x: Array1<f64>, y: Array1<f64>) -> Self {
        Self { x, y }
    }

    /// Evenly spaced mesh spanning both axes, `nx` columns by `ny` rows
    pub fn spanning(x: &Array1<f64>, y: &Array1<f64>, nx: usize, ny: usize) -> Self {
        Self {
            x: span(x, nx),
            y: span(y, ny),
        }
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.y.len(), self.x.len())
    }
}

fn span(axis: &Array1<f64>, n: usize) -> Array1<f64> {
    let lo = axis.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = axis.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if n == 1 || !(hi > lo) {
        return Array1::from_elem(n, lo);
    }
    let step = (hi - lo) / (n - 1) as f64;
    let mut values = Array1::from_iter((0..n).map(|i| lo + i as f64 * step));
    values[n - 1] = hi;
    values
}

/// Scattered-data interpolation capability
pub trait ScatteredInterpolator {
    /// Interpolate `values` given at `points` onto `query`, shape (ny, nx)
    ///
    /// `points.len() != values.len()` is a `ShapeMismatch`.
    fn interpolate(
        &self,
        points: &[(f64, f64)],
        values: &[f64],
        query: &DisplayGrid,
    ) -> Result<Array2<f64>>;
}

/// Piecewise-linear interpolation for sources on a rectilinear lattice
///
/// Each lattice cell is split along its rising diagonal into two triangles; the
/// value is the barycentric combination of the containing triangle's corners.
#[derive(Debug, Clone, Copy, Default)]
pub struct LatticeLinearInterpolator;

impl ScatteredInterpolator for LatticeLinearInterpolator {
    fn interpolate(
        &self,
        points: &[(f64, f64)],
        values: &[f64],
        query: &DisplayGrid,
    ) -> Result<Array2<f64>> {
        if points.len() != values.len() {
            return Err(CcwtError::ShapeMismatch {
                points: points.len(),
                values: values.len(),
            });
        }
        let lattice = Lattice::build(points, values)?;

        let (ny, nx) = query.shape();
        let mut out = Array2::from_elem((ny, nx), f64::NAN);
        for (row, &qy) in query.y.iter().enumerate() {
            for (col, &qx) in query.x.iter().enumerate() {
                out[[row, col]] = lattice.evaluate(qx, qy);
            }
        }
        Ok(out)
    }
}

/// Source values arranged on their sorted distinct coordinates
struct Lattice {
    xs: Vec<f64>,
    ys: Vec<f64>,
    /// Shape (ys.len(), xs.len())
    values: Array2<f64>,
}

impl Lattice {
    fn build(points: &[(f64, f64)], values: &[f64]) -> Result<Self> {
        if points.is_empty() {
            return Err(CcwtError::Layout("no source points".into()));
        }
        if points.iter().any(|(x, y)| !(x.is_finite() && y.is_finite())) {
            return Err(CcwtError::Layout("non-finite source coordinate".into()));
        }

        let xs = distinct(points.iter().map(|p| p.0));
        let ys = distinct(points.iter().map(|p| p.1));
        if xs.len() * ys.len() != points.len() {
            return Err(CcwtError::Layout(format!(
                "{} points over {} distinct x and {} distinct y coordinates",
                points.len(),
                xs.len(),
                ys.len()
            )));
        }

        let mut grid = Array2::from_elem((ys.len(), xs.len()), f64::NAN);
        let mut seen = Array2::from_elem((ys.len(), xs.len()), false);
        for (&(x, y), &v) in points.iter().zip(values.iter()) {
            let ix = xs.binary_search_by(|p| compare(*p, x)).map_err(|_| {
                CcwtError::Layout(format!("x coordinate {} not on the lattice", x))
            })?;
            let iy = ys.binary_search_by(|p| compare(*p, y)).map_err(|_| {
                CcwtError::Layout(format!("y coordinate {} not on the lattice", y))
            })?;
            if seen[[iy, ix]] {
                return Err(CcwtError::Layout(format!(
                    "duplicate source point ({}, {})",
                    x, y
                )));
            }
            seen[[iy, ix]] = true;
            grid[[iy, ix]] = v;
        }

        Ok(Self {
            xs,
            ys,
            values: grid,
        })
    }

    fn evaluate(&self, qx: f64, qy: f64) -> f64 {
        let (Some((ix0, ix1, u)), Some((iy0, iy1, v))) =
            (locate(&self.xs, qx), locate(&self.ys, qy))
        else {
            return f64::NAN;
        };

        let v00 = self.values[[iy0, ix0]];
        let v10 = self.values[[iy0, ix1]];
        let v01 = self.values[[iy1, ix0]];
        let v11 = self.values[[iy1, ix1]];

        if u >= v {
            v00 + u * (v10 - v00) + v * (v11 - v10)
        } else {
            v00 + v * (v01 - v00) + u * (v11 - v01)
        }
    }
}

fn compare(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

fn distinct(values: impl Iterator<Item = f64>) -> Vec<f64> {
    let mut v: Vec<f64> = values.collect();
    v.sort_by(|a, b| compare(*a, *b));
    v.dedup();
    v
}

/// Bracketing indices and fractional position of `q` on a sorted axis
///
/// None outside the axis span. A one-point axis only matches its own coordinate.
fn locate(axis: &[f64], q: f64) -> Option<(usize, usize, f64)> {
    let n = axis.len();
    if !(q >= axis[0] && q <= axis[n - 1]) {
        return None;
    }
    if n == 1 {
        return Some((0, 0, 0.0));
    }
    let i0 = (axis.partition_point(|&x| x <= q) - 1).min(n - 2);
    let i1 = i0 + 1;
    let t = (q - axis[i0]) / (axis[i1] - axis[i0]);
    Some((i0, i1, t))
}

/// Regrid a (rows = R, columns = k) magnitude surface onto `display`
///
/// The surface is flattened row by row against the (k, R) mesh before interpolation.
pub fn regrid_surface(
    magnitude: &Array2<f64>,
    k: &Array1<f64>,
    r: &Array1<f64>,
    display: &DisplayGrid,
    interpolator: &dyn ScatteredInterpolator,
) -> Result<Array2<f64>> {
    let points: Vec<(f64, f64)> = r
        .iter()
        .flat_map(|&ri| k.iter().map(move |&ki| (ki, ri)))
        .collect();
    let values: Vec<f64> = magnitude.iter().copied().collect();

    debug!(points = points.len(), values = values.len(), "regridding surface");
    interpolator.interpolate(&points, &values, display)
}
