//! Run configuration
//!
//! Defaults reproduce the reference analysis (Cauchy order 200, R in [0.2, 6.0] Å with
//! 200 scales, k in [3, 11] Å⁻¹ resampled on 256 points, 8x zero padding).
//! Values can be loaded from a TOML file and then overridden from the command line.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{CcwtError, Result};

/// How to treat target k values outside the measured range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtrapolationPolicy {
    /// Hold the boundary χ value (logged as a warning)
    #[default]
    Clamp,
    /// Refuse a target range the data does not cover
    Reject,
}

impl std::str::FromStr for ExtrapolationPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "clamp" => Ok(ExtrapolationPolicy::Clamp),
            "reject" => Ok(ExtrapolationPolicy::Reject),
            other => Err(format!("unknown extrapolation policy: {}", other)),
        }
    }
}

/// Display mesh and color scale for the regridded surface
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// k columns of the display mesh (None = same as the resampled grid)
    pub nk: Option<usize>,
    /// R rows of the display mesh (None = one per scale)
    pub nr: Option<usize>,
    /// Upper bound of the color scale (None = surface maximum)
    pub vmax: Option<f64>,
}

/// Default resampled k range (Å⁻¹)
pub const DEFAULT_K_RANGE: (f64, f64) = (3.0, 11.0);

/// CCWT analysis parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CcwtConfig {
    /// Cauchy wavelet order `n`
    pub order: usize,
    /// Smallest R-space distance (Å)
    pub r_min: f64,
    /// Largest R-space distance (Å)
    pub r_max: f64,
    /// Number of R-space scales
    pub na: usize,
    /// Leading lines of the input file to skip
    pub skip: usize,
    /// Start of the resampled k range (Å⁻¹)
    pub k_min: f64,
    /// End (exclusive) of the resampled k range (Å⁻¹)
    pub k_max: f64,
    /// Take the k range from the first and last data point instead of `k_min`/`k_max`
    ///
    /// Cannot be combined with a non-default `k_min`/`k_max`.
    pub k_from_data: bool,
    /// Number of resampled points
    pub nt: usize,
    /// Zero-padding factor of the Fourier transform
    pub oversampling: usize,
    pub extrapolation: ExtrapolationPolicy,
    pub display: DisplayConfig,
}

impl Default for CcwtConfig {
    fn default() -> Self {
        Self {
            order: 200,
            r_min: 0.2,
            r_max: 6.0,
            na: 200,
            skip: 0,
            k_min: DEFAULT_K_RANGE.0,
            k_max: DEFAULT_K_RANGE.1,
            k_from_data: false,
            nt: 256,
            oversampling: 8,
            extrapolation: ExtrapolationPolicy::Clamp,
            display: DisplayConfig::default(),
        }
    }
}

impl CcwtConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_order(mut self, order: usize) -> Self {
        self.order = order;
        self
    }

    /// Sets the R-space bounds
    pub fn with_r_range(mut self, r_min: f64, r_max: f64) -> Self {
        self.r_min = r_min;
        self.r_max = r_max;
        self
    }

    pub fn with_na(mut self, na: usize) -> Self {
        self.na = na;
        self
    }

    pub fn with_skip(mut self, skip: usize) -> Self {
        self.skip = skip;
        self
    }

    /// Sets an explicit k range (disables `k_from_data`)
    pub fn with_k_range(mut self, k_min: f64, k_max: f64) -> Self {
        self.k_min = k_min;
        self.k_max = k_max;
        self.k_from_data = false;
        self
    }

    pub fn with_k_from_data(mut self, k_from_data: bool) -> Self {
        self.k_from_data = k_from_data;
        self
    }

    pub fn with_nt(mut self, nt: usize) -> Self {
        self.nt = nt;
        self
    }

    pub fn with_oversampling(mut self, oversampling: usize) -> Self {
        self.oversampling = oversampling;
        self
    }

    pub fn with_extrapolation(mut self, policy: ExtrapolationPolicy) -> Self {
        self.extrapolation = policy;
        self
    }

    pub fn with_display(mut self, display: DisplayConfig) -> Self {
        self.display = display;
        self
    }

    /// Padded transform length `ZF = z * nt`, saturating on overflow
    ///
    /// `validate()` rejects configurations where the product does not fit.
    pub fn padded_len(&self) -> usize {
        self.oversampling.saturating_mul(self.nt)
    }

    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| CcwtError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: CcwtConfig = toml::from_str(&content)
            .map_err(|e| CcwtError::Config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| CcwtError::Config(e.to_string()))
    }

    /// Check the parameters before any computation
    ///
    /// Wavelet order, scale count and R bounds report `InvalidScale`; everything else
    /// reports `Config`.
    pub fn validate(&self) -> Result<()> {
        if self.order == 0 {
            return Err(CcwtError::InvalidScale(
                "Cauchy order must be at least 1".into(),
            ));
        }
        if self.na == 0 {
            return Err(CcwtError::InvalidScale(
                "number of R intervals must be at least 1".into(),
            ));
        }
        if !(self.r_min > 0.0 && self.r_min.is_finite()) {
            return Err(CcwtError::InvalidScale(format!(
                "r_min must be positive, got {}",
                self.r_min
            )));
        }
        if !(self.r_max > 0.0 && self.r_max.is_finite()) {
            return Err(CcwtError::InvalidScale(format!(
                "r_max must be positive, got {}",
                self.r_max
            )));
        }
        if self.na > 1 && self.r_max <= self.r_min {
            return Err(CcwtError::InvalidScale(format!(
                "r_max ({}) must exceed r_min ({}) when na > 1",
                self.r_max, self.r_min
            )));
        }
        if self.nt == 0 {
            return Err(CcwtError::Config("nt must be at least 1".into()));
        }
        if self.oversampling == 0 {
            return Err(CcwtError::Config("oversampling must be at least 1".into()));
        }
        let Some(padded_len) = self.oversampling.checked_mul(self.nt) else {
            return Err(CcwtError::Config(format!(
                "padded transform length {} x {} overflows",
                self.oversampling, self.nt
            )));
        };
        if padded_len < 2 {
            return Err(CcwtError::Config(
                "padded transform length must be at least 2".into(),
            ));
        }
        if self.k_from_data {
            if (self.k_min, self.k_max) != DEFAULT_K_RANGE {
                return Err(CcwtError::Config(format!(
                    "k range [{}, {}] conflicts with k_from_data",
                    self.k_min, self.k_max
                )));
            }
        } else {
            if !(self.k_min.is_finite() && self.k_max.is_finite()) {
                return Err(CcwtError::Config("k range must be finite".into()));
            }
            if self.k_max <= self.k_min {
                return Err(CcwtError::Config(format!(
                    "k_max ({}) must exceed k_min ({})",
                    self.k_max, self.k_min
                )));
            }
        }
        if matches!(self.display.nk, Some(0)) || matches!(self.display.nr, Some(0)) {
            return Err(CcwtError::Config(
                "display mesh dimensions must be at least 1".into(),
            ));
        }
        if let Some(vmax) = self.display.vmax {
            if !(vmax > 0.0 && vmax.is_finite()) {
                return Err(CcwtError::Config(format!(
                    "vmax must be positive, got {}",
                    vmax
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config_valid() {
        let config = CcwtConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.padded_len(), 2048);
    }

    #[test]
    fn test_scale_parameters_rejected() {
        let err = CcwtConfig::new().with_order(0).validate().unwrap_err();
        assert!(matches!(err, CcwtError::InvalidScale(_)));

        let err = CcwtConfig::new().with_na(0).validate().unwrap_err();
        assert!(matches!(err, CcwtError::InvalidScale(_)));

        let err = CcwtConfig::new().with_r_range(0.0, 6.0).validate().unwrap_err();
        assert!(matches!(err, CcwtError::InvalidScale(_)));

        let err = CcwtConfig::new().with_r_range(0.2, -1.0).validate().unwrap_err();
        assert!(matches!(err, CcwtError::InvalidScale(_)));
    }

    #[test]
    fn test_single_scale_single_order_valid() {
        let config = CcwtConfig::new().with_order(1).with_na(1).with_r_range(1.0, 1.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_grid_parameters_rejected() {
        assert!(matches!(
            CcwtConfig::new().with_nt(0).validate(),
            Err(CcwtError::Config(_))
        ));
        assert!(matches!(
            CcwtConfig::new().with_k_range(11.0, 3.0).validate(),
            Err(CcwtError::Config(_))
        ));
        assert!(CcwtConfig::new().with_k_from_data(true).validate().is_ok());
    }

    #[test]
    fn test_explicit_k_range_conflicts_with_k_from_data() {
        let config = CcwtConfig::new()
            .with_k_range(4.0, 10.0)
            .with_k_from_data(true);
        assert!(matches!(config.validate(), Err(CcwtError::Config(_))));

        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "k_from_data = true\nk_max = 12.5").unwrap();
        assert!(matches!(
            CcwtConfig::from_file(file.path()),
            Err(CcwtError::Config(_))
        ));
    }

    #[test]
    fn test_padded_length_overflow_rejected() {
        let config = CcwtConfig::new()
            .with_nt(usize::MAX / 2 + 1)
            .with_oversampling(2);
        assert!(matches!(config.validate(), Err(CcwtError::Config(_))));
        assert_eq!(config.padded_len(), usize::MAX);
    }

    #[test]
    fn test_from_file_partial_toml() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "order = 120\nna = 50\nextrapolation = \"reject\"\n[display]\nvmax = 2.5").unwrap();

        let config = CcwtConfig::from_file(file.path()).unwrap();
        assert_eq!(config.order, 120);
        assert_eq!(config.na, 50);
        assert_eq!(config.extrapolation, ExtrapolationPolicy::Reject);
        assert_eq!(config.display.vmax, Some(2.5));
        // untouched keys keep their defaults
        assert_eq!(config.nt, 256);
        assert_eq!(config.r_max, 6.0);
    }

    #[test]
    fn test_from_file_invalid_values() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "order = 0").unwrap();
        assert!(matches!(
            CcwtConfig::from_file(file.path()),
            Err(CcwtError::InvalidScale(_))
        ));
    }

    #[test]
    fn test_toml_round_trip() {
        let config = CcwtConfig::new().with_order(50).with_k_from_data(true);
        let text = config.to_toml_string().unwrap();
        let parsed: CcwtConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }
}
