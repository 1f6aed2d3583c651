//! Two-column (k, χ) text input
//!
//! Whitespace-delimited columns; `#` starts a comment, blank lines are ignored and a
//! fixed number of leading lines can be skipped. Columns beyond the second are ignored.

use std::fs;
use std::path::Path;
use tracing::info;

use crate::ccwt::RawSignal;
use crate::error::{CcwtError, Result};

/// Read and validate a (k, χ) file
pub fn load_signal<P: AsRef<Path>>(path: P, skip: usize) -> Result<RawSignal> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| CcwtError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let raw = parse_signal(&text, skip)?;
    let (k_first, k_last) = raw.k_span();
    info!(
        path = %path.display(),
        points = raw.len(),
        k_first,
        k_last,
        "loaded EXAFS data"
    );
    Ok(raw)
}

/// Parse (k, χ) rows from text; line numbers in errors are 1-based
pub fn parse_signal(text: &str, skip: usize) -> Result<RawSignal> {
    let mut k = Vec::new();
    let mut chi = Vec::new();

    for (index, line) in text.lines().enumerate().skip(skip) {
        let line_no = index + 1;
        let content = match line.find('#') {
            Some(pos) => &line[..pos],
            None => line,
        };
        let mut fields = content.split_whitespace();
        let Some(first) = fields.next() else {
            continue;
        };
        let second = fields.next().ok_or_else(|| CcwtError::Parse {
            line: line_no,
            message: "expected two columns (k, chi)".into(),
        })?;

        k.push(parse_number(first, line_no)?);
        chi.push(parse_number(second, line_no)?);
    }

    if k.is_empty() {
        return Err(CcwtError::Parse {
            line: 0,
            message: "no data rows found".into(),
        });
    }

    RawSignal::new(k, chi)
}

/// A finite decimal number; `nan` and `inf` spellings are rejected like any other typo
fn parse_number(field: &str, line: usize) -> Result<f64> {
    match field.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(CcwtError::Parse {
            line,
            message: format!("invalid number '{}'", field),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_comments_blank_lines_and_skip() {
        let text = "header line\n# k chi\n\n3.0 0.1\n3.5  -0.2 # inline\n\t4.0\t0.3\t99\n";
        let raw = parse_signal(text, 1).unwrap();
        assert_eq!(raw.k(), &[3.0, 3.5, 4.0]);
        assert_eq!(raw.chi(), &[0.1, -0.2, 0.3]);
    }

    #[test]
    fn test_scientific_notation() {
        let raw = parse_signal("1.0e0 2.5E-3\n2.0 -1e-2\n", 0).unwrap();
        assert_eq!(raw.chi(), &[2.5e-3, -1e-2]);
    }

    #[test]
    fn test_malformed_rows() {
        let err = parse_signal("1.0 2.0\n2.0\n", 0).unwrap_err();
        assert!(matches!(err, CcwtError::Parse { line: 2, .. }));

        let err = parse_signal("1.0 abc\n", 0).unwrap_err();
        assert!(matches!(err, CcwtError::Parse { line: 1, .. }));

        let err = parse_signal("# nothing here\n", 0).unwrap_err();
        assert!(matches!(err, CcwtError::Parse { .. }));
    }

    #[test]
    fn test_non_finite_rows_rejected_with_line() {
        let err = parse_signal("3.0 0.1\n3.5 nan\n4.0 0.2\n", 0).unwrap_err();
        assert!(matches!(err, CcwtError::Parse { line: 2, .. }));
        assert_eq!(err.stage(), "load");

        for row in ["inf 0.1", "3.0 -inf", "3.0 1e400", "NaN 0.0"] {
            let text = format!("# k chi\n{}\n", row);
            assert!(
                matches!(parse_signal(&text, 0), Err(CcwtError::Parse { line: 2, .. })),
                "accepted '{}'",
                row
            );
        }
    }

    #[test]
    fn test_unsorted_file_rejected() {
        let err = parse_signal("3.0 0.0\n2.0 0.0\n", 0).unwrap_err();
        assert!(matches!(err, CcwtError::InputOrder { .. }));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        for i in 0..10 {
            let k = 3.0 + 0.1 * i as f64;
            writeln!(file, "{} {}", k, k).unwrap();
        }
        let raw = load_signal(file.path(), 0).unwrap();
        assert_eq!(raw.len(), 10);
    }

    #[test]
    fn test_missing_file() {
        let err = load_signal("/nonexistent/znfoil_k.dat", 0).unwrap_err();
        assert!(matches!(err, CcwtError::Io { .. }));
        assert_eq!(err.stage(), "load");
    }
}
