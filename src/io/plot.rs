//! PNG rendering of the three CCWT figures
//!
//! Fourier transform magnitude, interpolated EXAFS signal and the |CCWT| map with a
//! jet colormap on a fixed `[0, vmax]` color scale.

use ndarray::Array2;
use plotters::prelude::*;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::ccwt::{CcwtOutput, DisplayGrid};
use crate::error::{CcwtError, Result};

const FIGURE_SIZE: (u32, u32) = (1000, 700);

/// Paths of the rendered figures
#[derive(Debug, Clone)]
pub struct FigurePaths {
    pub spectrum: PathBuf,
    pub signal: PathBuf,
    pub surface: PathBuf,
}

impl FigurePaths {
    pub fn new(dir: &Path, stem: &str) -> Self {
        Self {
            spectrum: dir.join(format!("{}_ft.png", stem)),
            signal: dir.join(format!("{}_chi.png", stem)),
            surface: dir.join(format!("{}_ccwt.png", stem)),
        }
    }
}

fn plot_err<E: std::fmt::Display>(e: E) -> CcwtError {
    CcwtError::Plot(e.to_string())
}

/// Jet colormap for `t` in [0, 1]
pub fn jet(t: f64) -> RGBColor {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
    let channel = |offset: f64| {
        let v = (1.5 - (4.0 * t - offset).abs()).clamp(0.0, 1.0);
        (v * 255.0).round() as u8
    };
    RGBColor(channel(3.0), channel(2.0), channel(1.0))
}

fn bounds(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (lo, hi) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if !(hi > lo) {
        (lo.min(0.0), lo.max(0.0) + 1.0)
    } else {
        (lo, hi)
    }
}

fn line_plot(
    path: &Path,
    title: &str,
    x_desc: &str,
    y_desc: &str,
    points: Vec<(f64, f64)>,
) -> Result<()> {
    let root = BitMapBackend::new(path, FIGURE_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(plot_err)?;

    let (x0, x1) = bounds(points.iter().map(|p| p.0));
    let (y0, y1) = bounds(points.iter().map(|p| p.1));
    let pad = 0.05 * (y1 - y0);

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 30).into_font())
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(x0..x1, (y0 - pad)..(y1 + pad))
        .map_err(plot_err)?;

    chart
        .configure_mesh()
        .x_desc(x_desc)
        .y_desc(y_desc)
        .label_style(("sans-serif", 15))
        .draw()
        .map_err(plot_err)?;

    chart
        .draw_series(LineSeries::new(points, &BLUE))
        .map_err(plot_err)?;

    root.present().map_err(plot_err)?;
    Ok(())
}

/// |TF| against freq·π
pub fn plot_spectrum(path: &Path, output: &CcwtOutput) -> Result<()> {
    let points = output
        .spectrum
        .pseudo_r()
        .iter()
        .zip(output.spectrum.normalized.iter())
        .map(|(&r, c)| (r, c.norm()))
        .collect();
    line_plot(path, "Fourier Transform", "R / Å", "FT Magnitude", points)
}

/// Resampled χ(k)
pub fn plot_signal(path: &Path, output: &CcwtOutput) -> Result<()> {
    let points = output
        .signal
        .k
        .iter()
        .zip(output.signal.chi.iter())
        .map(|(&k, &chi)| (k, chi))
        .collect();
    line_plot(path, "Interpolated EXAFS Data", "k (Å⁻¹)", "χ(k)", points)
}

/// Color map of the regridded |CCWT|, R increasing downward
pub fn plot_surface(
    path: &Path,
    surface: &Array2<f64>,
    display: &DisplayGrid,
    vmax: f64,
) -> Result<()> {
    let root = BitMapBackend::new(path, FIGURE_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(plot_err)?;
    let (main, bar) = root.split_horizontally(880);

    let (k0, k1) = bounds(display.x.iter().copied());
    let (r0, r1) = bounds(display.y.iter().copied());
    let dk = half_step(display.x.as_slice().unwrap_or(&[]));
    let dr = half_step(display.y.as_slice().unwrap_or(&[]));

    let mut chart = ChartBuilder::on(&main)
        .caption("Continuous Cauchy Wavelet Transform", ("sans-serif", 30).into_font())
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d((k0 - dk)..(k1 + dk), -(r1 + dr)..-(r0 - dr))
        .map_err(plot_err)?;

    // R is drawn negated so it increases downward
    chart
        .configure_mesh()
        .disable_mesh()
        .x_desc("k")
        .y_desc("R")
        .y_label_formatter(&|y| format!("{:.1}", -y))
        .label_style(("sans-serif", 15))
        .draw()
        .map_err(plot_err)?;

    let cells = surface.indexed_iter().filter_map(|((j, i), &v)| {
        if !v.is_finite() {
            return None;
        }
        let (k, r) = (display.x[i], display.y[j]);
        Some(Rectangle::new(
            [(k - dk, -(r - dr)), (k + dk, -(r + dr))],
            jet(v / vmax).filled(),
        ))
    });
    chart.draw_series(cells).map_err(plot_err)?;

    let steps = 256;
    let mut colorbar = ChartBuilder::on(&bar)
        .margin_top(70)
        .margin_bottom(70)
        .margin_right(10)
        .y_label_area_size(60)
        .build_cartesian_2d(0.0..1.0, 0.0..vmax)
        .map_err(plot_err)?;
    colorbar
        .configure_mesh()
        .disable_mesh()
        .disable_x_axis()
        .label_style(("sans-serif", 13))
        .draw()
        .map_err(plot_err)?;
    colorbar
        .draw_series((0..steps).map(|s| {
            let lo = vmax * s as f64 / steps as f64;
            let hi = vmax * (s + 1) as f64 / steps as f64;
            Rectangle::new([(0.0, lo), (1.0, hi)], jet(lo / vmax).filled())
        }))
        .map_err(plot_err)?;

    root.present().map_err(plot_err)?;
    Ok(())
}

fn half_step(axis: &[f64]) -> f64 {
    if axis.len() < 2 {
        0.5
    } else {
        0.5 * (axis[axis.len() - 1] - axis[0]).abs() / (axis.len() - 1) as f64
    }
}

/// Render all three figures
pub fn render_figures(
    paths: &FigurePaths,
    output: &CcwtOutput,
    surface: &Array2<f64>,
    display: &DisplayGrid,
    vmax: f64,
) -> Result<()> {
    plot_spectrum(&paths.spectrum, output)?;
    plot_signal(&paths.signal, output)?;
    plot_surface(&paths.surface, surface, display, vmax)?;
    info!(path = %paths.surface.display(), "rendered CCWT figures");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jet_endpoints() {
        let rgb = |c: RGBColor| (c.0, c.1, c.2);
        assert_eq!(rgb(jet(0.0)), (0, 0, 128));
        assert_eq!(rgb(jet(0.5)), (128, 255, 128));
        assert_eq!(rgb(jet(1.0)), (128, 0, 0));
        // out-of-range and NaN saturate
        assert_eq!(rgb(jet(2.0)), rgb(jet(1.0)));
        assert_eq!(rgb(jet(f64::NAN)), rgb(jet(0.0)));
    }

    #[test]
    fn test_bounds_of_flat_series() {
        assert_eq!(bounds([2.0, 2.0].into_iter()), (0.0, 3.0));
        assert_eq!(bounds([1.0, f64::NAN, 4.0].into_iter()), (1.0, 4.0));
    }
}
