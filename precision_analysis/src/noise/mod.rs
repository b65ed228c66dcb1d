//! Synthetic measurement noise for pose records.
//!
//! Both models are deterministic for a given seed so that precision runs can
//! be repeated.

use nalgebra::Vector3;
use thiserror::Error;

use crate::geometry::{EulerZyx, Point};
use crate::io::PoseRecord;

mod gaussian;
mod perlin;

pub use gaussian::GaussianNoise;
pub use perlin::{PerlinDrift, PerlinNoise};

#[derive(Debug, Error, PartialEq)]
pub enum NoiseError {
    #[error("standard deviation must be finite and non-negative, got {0}")]
    InvalidDeviation(f64),
    #[error("axis correlation must lie in [0, 1), got {0}")]
    InvalidCorrelation(f64),
}

/// A perturbation applied to a sequence of pose records.
pub trait NoiseModel {
    /// Returns perturbed copies of `records`; identifiers are preserved.
    fn apply(&self, records: &[PoseRecord]) -> Vec<PoseRecord>;
}

/// Offsets a record's position and its angles (given in degrees).
pub(crate) fn offset_record(
    record: &PoseRecord,
    position: Vector3<f64>,
    angles_deg: Vector3<f64>,
) -> PoseRecord {
    let deg = record.point.orientation.to_degrees() + angles_deg;
    let orientation = EulerZyx::from_degrees(deg[0], deg[1], deg[2]);
    PoseRecord::new(
        record.id.clone(),
        Point::from_orientation(record.point.position + position, orientation),
    )
}
