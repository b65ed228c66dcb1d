//! Text format for measured poses.
//!
//! Each record occupies one line:
//!
//! ```text
//! id X Y Z RZ RY RX
//! ```
//!
//! Fields are separated by whitespace or by commas (optionally surrounded by
//! whitespace). Angles are written in degrees and stored on [`Point`] in
//! radians. Columns after the seventh are ignored.

use std::num::ParseFloatError;

use log::warn;
use nalgebra::Vector3;
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::geometry::{EulerZyx, Point};

const FIELD_NAMES: [&str; 6] = ["X", "Y", "Z", "RZ", "RY", "RX"];

static SEPARATOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*,\s*|\s+").unwrap());

/// Errors produced while reading pose files.
#[derive(Debug, Error)]
pub enum PoseError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("line {line}: expected 7 fields (id X Y Z RZ RY RX), found {found}")]
    MissingFields { line: usize, found: usize },
    #[error("line {line}: invalid {field} value '{value}': {source}")]
    InvalidNumber {
        line: usize,
        field: &'static str,
        value: String,
        #[source]
        source: ParseFloatError,
    },
    #[error("line {line}: {field} value '{value}' is not finite")]
    NonFinite {
        line: usize,
        field: &'static str,
        value: String,
    },
}

/// A parsed pose together with its identifier column.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PoseRecord {
    pub id: String,
    pub point: Point,
}

impl PoseRecord {
    pub fn new(id: impl Into<String>, point: Point) -> Self {
        Self {
            id: id.into(),
            point,
        }
    }
}

fn split_fields(line: &str) -> Vec<&str> {
    SEPARATOR
        .split(line.trim())
        .filter(|f| !f.is_empty())
        .collect()
}

/// Parses a single non-blank line. `line_no` is 1-based and only used for
/// error messages.
fn parse_line(line: &str, line_no: usize) -> Result<PoseRecord, PoseError> {
    let fields = split_fields(line);
    if fields.len() < 7 {
        return Err(PoseError::MissingFields {
            line: line_no,
            found: fields.len(),
        });
    }
    let mut values = [0.0f64; 6];
    for (i, (raw, name)) in fields[1..7].iter().zip(FIELD_NAMES).enumerate() {
        values[i] = raw.parse::<f64>().map_err(|source| PoseError::InvalidNumber {
            line: line_no,
            field: name,
            value: raw.to_string(),
            source,
        })?;
        if !values[i].is_finite() {
            return Err(PoseError::NonFinite {
                line: line_no,
                field: name,
                value: raw.to_string(),
            });
        }
    }
    let [x, y, z, rz, ry, rx] = values;
    let point = Point::from_orientation(Vector3::new(x, y, z), EulerZyx::from_degrees(rz, ry, rx));
    Ok(PoseRecord::new(fields[0], point))
}

/// Parses pose records, skipping blank and malformed lines.
///
/// Never fails: every rejected line is reported through `log::warn!` and
/// dropped, so empty or unparseable input yields an empty vector.
pub fn parse_records(data: &str) -> Vec<PoseRecord> {
    let mut records = Vec::new();
    for (idx, line) in data.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match parse_line(line, idx + 1) {
            Ok(rec) => records.push(rec),
            Err(e) => warn!("skipping pose line: {e}"),
        }
    }
    records
}

/// Parses pose data into points, dropping the identifier column.
///
/// This is the lenient entry point used by the scripting binding; see
/// [`parse_records`] for how bad lines are handled.
pub fn parse_points(data: &str) -> Vec<Point> {
    parse_records(data).into_iter().map(|r| r.point).collect()
}

/// Parses pose records, failing on the first malformed line.
/// Blank lines are still skipped.
pub fn parse_records_strict(data: &str) -> Result<Vec<PoseRecord>, PoseError> {
    data.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| parse_line(line, idx + 1))
        .collect()
}

/// Reads a pose file strictly.
pub fn read_poses(path: &str) -> Result<Vec<PoseRecord>, PoseError> {
    let contents = super::read_to_string(path).map_err(|source| PoseError::Io {
        path: path.to_string(),
        source,
    })?;
    parse_records_strict(&contents)
}

/// Formats a record as `id x y z rz ry rx` with angles in degrees.
pub fn format_record(record: &PoseRecord) -> String {
    let p = record.point.position;
    let a = record.point.orientation.to_degrees();
    format!(
        "{} {:.6} {:.6} {:.6} {:.6} {:.6} {:.6}",
        record.id, p.x, p.y, p.z, a[0], a[1], a[2]
    )
}

/// Writes records one per line.
pub fn write_records(path: &str, records: &[PoseRecord]) -> std::io::Result<()> {
    let mut out = String::new();
    for rec in records {
        out.push_str(&format_record(rec));
        out.push('\n');
    }
    super::write_string(path, &out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn separators() {
        assert_eq!(split_fields("1 2\t3"), vec!["1", "2", "3"]);
        assert_eq!(split_fields("1, 2 ,3,4"), vec!["1", "2", "3", "4"]);
        assert_eq!(split_fields("  7   8  "), vec!["7", "8"]);
    }

    #[test]
    fn parse_line_reports_field_name() {
        let err = parse_line("0 1 2 3 45 bad 15", 4).unwrap_err();
        match err {
            PoseError::InvalidNumber { line, field, value, .. } => {
                assert_eq!(line, 4);
                assert_eq!(field, "RY");
                assert_eq!(value, "bad");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn non_finite_values_are_rejected() {
        for (text, field) in [("0 nan 1 2 0 0 0", "X"), ("1 1 2 3 10 inf 30", "RY")] {
            match parse_line(text, 2).unwrap_err() {
                PoseError::NonFinite { line, field: f, .. } => {
                    assert_eq!(line, 2);
                    assert_eq!(f, field);
                }
                other => panic!("unexpected error {other:?}"),
            }
        }
        assert!(parse_records_strict("0 nan 1 2 0 0 0\n1 inf 2 3 10 20 30\n").is_err());
        assert_eq!(parse_records("0 -inf 1 2 0 0 0\n1 1 2 3 10 20 30\n").len(), 1);
    }
}
