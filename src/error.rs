//! Error types for the CCWT pipeline
//!
//! Every error is fatal for the run; `stage()` tells the caller which step failed.

use std::path::PathBuf;

/// CCWT pipeline error
#[derive(Debug, thiserror::Error)]
pub enum CcwtError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("k values must be strictly increasing (k[{index}] = {current} follows {previous})")]
    InputOrder {
        index: usize,
        previous: f64,
        current: f64,
    },

    #[error("{column}[{index}] = {value} is not a finite number")]
    NonFiniteInput {
        column: &'static str,
        index: usize,
        value: f64,
    },

    #[error("target k range [{k_min}, {k_max}] extends beyond the data range [{data_min}, {data_max}]")]
    Range {
        k_min: f64,
        k_max: f64,
        data_min: f64,
        data_max: f64,
    },

    #[error("degenerate signal: {0}")]
    DegenerateSignal(String),

    #[error("invalid scale: {0}")]
    InvalidScale(String),

    #[error("non-finite value in transform row {row}, column {column}")]
    NumericDivergence { row: usize, column: usize },

    #[error("shape mismatch: {points} points but {values} values")]
    ShapeMismatch { points: usize, values: usize },

    #[error("source points do not form a rectilinear lattice: {0}")]
    Layout(String),

    #[error("failed to write {path}: {source}")]
    Export {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("plot rendering failed: {0}")]
    Plot(String),
}

impl CcwtError {
    /// Pipeline stage the error belongs to
    pub fn stage(&self) -> &'static str {
        match self {
            CcwtError::Io { .. } | CcwtError::Parse { .. } => "load",
            CcwtError::Config(_) => "config",
            CcwtError::InputOrder { .. }
            | CcwtError::NonFiniteInput { .. }
            | CcwtError::Range { .. } => "resample",
            CcwtError::DegenerateSignal(_) => "spectrum",
            CcwtError::InvalidScale(_) => "filter-bank",
            CcwtError::NumericDivergence { .. } => "transform",
            CcwtError::ShapeMismatch { .. } | CcwtError::Layout(_) => "regrid",
            CcwtError::Export { .. } | CcwtError::Plot(_) => "export",
        }
    }
}

pub type Result<T> = std::result::Result<T, CcwtError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_names() {
        let err = CcwtError::ShapeMismatch {
            points: 100,
            values: 99,
        };
        assert_eq!(err.stage(), "regrid");
        assert_eq!(err.to_string(), "shape mismatch: 100 points but 99 values");

        assert_eq!(CcwtError::InvalidScale("n = 0".into()).stage(), "filter-bank");
        assert_eq!(
            CcwtError::NumericDivergence { row: 3, column: 7 }.stage(),
            "transform"
        );
    }
}
