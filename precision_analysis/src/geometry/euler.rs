//! Z-Y-X Euler angle orientation.

use nalgebra::{Matrix3, Rotation3, Vector3};
use serde::{Deserialize, Serialize};

/// Orientation stored as three Euler angles in radians.
///
/// The rotation is applied about Z, then Y, then X (intrinsic), so the
/// equivalent matrix is `Rz(z) * Ry(y) * Rx(x)`. Angles are kept exactly as
/// given; nothing is wrapped or normalized.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EulerZyx {
    pub z: f64,
    pub y: f64,
    pub x: f64,
}

impl EulerZyx {
    pub fn new(z: f64, y: f64, x: f64) -> Self {
        Self { z, y, x }
    }

    /// Builds the orientation from a vector read as `(z, y, x)`.
    pub fn from_vector(angles: Vector3<f64>) -> Self {
        Self::new(angles[0], angles[1], angles[2])
    }

    /// Builds the orientation from angles given in degrees.
    pub fn from_degrees(z: f64, y: f64, x: f64) -> Self {
        Self::new(z.to_radians(), y.to_radians(), x.to_radians())
    }

    /// Returns the angles as a `(z, y, x)` vector.
    pub fn to_vector(&self) -> Vector3<f64> {
        Vector3::new(self.z, self.y, self.x)
    }

    /// Returns the angles as `(z, y, x)` in degrees.
    pub fn to_degrees(&self) -> Vector3<f64> {
        Vector3::new(self.z.to_degrees(), self.y.to_degrees(), self.x.to_degrees())
    }

    /// Rotation matrix `Rz(z) * Ry(y) * Rx(x)`.
    pub fn to_rotation(&self) -> Matrix3<f64> {
        // nalgebra's roll/pitch/yaw is the same Z-Y-X composition.
        Rotation3::from_euler_angles(self.x, self.y, self.z).into_inner()
    }

    /// Decomposes a rotation matrix back into Z-Y-X angles.
    ///
    /// The result lies in the principal range: `y` in `[-pi/2, pi/2]`,
    /// `z` and `x` in `(-pi, pi]`.
    pub fn from_rotation(rotation: &Matrix3<f64>) -> Self {
        let (x, y, z) = Rotation3::from_matrix_unchecked(*rotation).euler_angles();
        Self::new(z, y, x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn zero_angles_are_identity() {
        let r = EulerZyx::default().to_rotation();
        assert!((r - Matrix3::identity()).norm() < 1e-12);
    }

    #[test]
    fn quarter_turn_about_z() {
        let r = EulerZyx::new(FRAC_PI_2, 0.0, 0.0).to_rotation();
        let expected = Matrix3::new(0.0, -1.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0);
        assert!((r - expected).norm() < 1e-12);
    }

    #[test]
    fn composition_order_is_z_then_y_then_x() {
        let (z, y, x) = (0.5, 0.3, 0.2);
        let rz = Rotation3::from_axis_angle(&Vector3::z_axis(), z);
        let ry = Rotation3::from_axis_angle(&Vector3::y_axis(), y);
        let rx = Rotation3::from_axis_angle(&Vector3::x_axis(), x);
        let expected = (rz * ry * rx).into_inner();
        let r = EulerZyx::new(z, y, x).to_rotation();
        assert!((r - expected).norm() < 1e-12);
    }

    #[test]
    fn rotation_is_orthonormal() {
        let r = EulerZyx::new(0.5, 0.3, 0.2).to_rotation();
        assert!((r * r.transpose() - Matrix3::identity()).norm() < 1e-12);
        assert!((r.determinant() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn degrees_are_converted() {
        let e = EulerZyx::from_degrees(90.0, -45.0, 180.0);
        assert!((e.z - FRAC_PI_2).abs() < 1e-12);
        assert!((e.y + FRAC_PI_2 / 2.0).abs() < 1e-12);
        let back = e.to_degrees();
        assert!((back[2] - 180.0).abs() < 1e-9);
    }
}
