//! Residual statistics for a calibration solution.

use serde::Serialize;

use crate::calibration::Solution;
use crate::geometry::{log_so3, Transform};

/// Summary statistics of a set of errors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Stats {
    pub mean: f64,
    pub median: f64,
    pub rmse: f64,
    pub p95: f64,
    pub max: f64,
}

/// Translation (length units of the input) and rotation (degrees) statistics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ErrorSummary {
    pub translation: Stats,
    pub rotation: Stats,
}

/// Percentile with linear interpolation between closest ranks.
/// `sorted` must be ascending and non-empty.
fn percentile(sorted: &[f64], p: f64) -> f64 {
    let pos = (p / 100.0) * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let frac = pos - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * frac
}

impl Stats {
    /// Computes the statistics of `values`, or `None` when empty.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let n = values.len() as f64;
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);
        Some(Self {
            mean: values.iter().sum::<f64>() / n,
            median: percentile(&sorted, 50.0),
            rmse: (values.iter().map(|v| v * v).sum::<f64>() / n).sqrt(),
            p95: percentile(&sorted, 95.0),
            max: sorted[sorted.len() - 1],
        })
    }
}

/// Per-pose residual transforms `inv(A X) * (Y B)`.
pub fn residuals(a: &[Transform], b: &[Transform], solution: &Solution) -> Vec<Transform> {
    a.iter()
        .zip(b)
        .map(|(ai, bi)| (*ai * solution.x).inverse() * (solution.y * *bi))
        .collect()
}

/// Translation norms and rotation angles (degrees) of the residuals.
pub fn residual_errors(a: &[Transform], b: &[Transform], solution: &Solution) -> (Vec<f64>, Vec<f64>) {
    residuals(a, b, solution)
        .iter()
        .map(|d| (d.translation.norm(), log_so3(&d.rotation).norm().to_degrees()))
        .unzip()
}

/// Statistics of the residuals, or `None` when there are no poses.
pub fn summarize_errors(a: &[Transform], b: &[Transform], solution: &Solution) -> Option<ErrorSummary> {
    let (t_errs, r_errs) = residual_errors(a, b, solution);
    Some(ErrorSummary {
        translation: Stats::from_values(&t_errs)?,
        rotation: Stats::from_values(&r_errs)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentile_interpolates() {
        let sorted = [1.0, 2.0, 3.0, 4.0];
        assert!((percentile(&sorted, 50.0) - 2.5).abs() < 1e-12);
        assert!((percentile(&sorted, 95.0) - 3.85).abs() < 1e-12);
        assert_eq!(percentile(&[7.0], 95.0), 7.0);
    }

    #[test]
    fn stats_of_known_values() {
        let s = Stats::from_values(&[3.0, 1.0, 2.0, 4.0]).unwrap();
        assert!((s.mean - 2.5).abs() < 1e-12);
        assert!((s.median - 2.5).abs() < 1e-12);
        assert!((s.rmse - (30.0f64 / 4.0).sqrt()).abs() < 1e-12);
        assert_eq!(s.max, 4.0);
    }

    #[test]
    fn empty_has_no_stats() {
        assert!(Stats::from_values(&[]).is_none());
    }
}
