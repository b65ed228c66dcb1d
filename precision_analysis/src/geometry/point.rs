//! Position plus orientation value type.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use super::EulerZyx;

/// A measured pose: a 3D position and a Z-Y-X Euler orientation.
///
/// Both fields are plain public values and may be changed freely after
/// construction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub position: Vector3<f64>,
    pub orientation: EulerZyx,
}

impl Point {
    /// Creates a point from a position and `(z, y, x)` angles in radians.
    pub fn new(position: Vector3<f64>, angles: Vector3<f64>) -> Self {
        Self {
            position,
            orientation: EulerZyx::from_vector(angles),
        }
    }

    /// Creates a point from a position and a ready-made orientation.
    pub fn from_orientation(position: Vector3<f64>, orientation: EulerZyx) -> Self {
        Self {
            position,
            orientation,
        }
    }
}
