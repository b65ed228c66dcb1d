//! Rigid body transforms and SO(3) helpers.

use std::ops::Mul;

use nalgebra::{Matrix3, Matrix4, Vector3};

use super::Point;

/// Rigid transform `x -> rotation * x + translation`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub rotation: Matrix3<f64>,
    pub translation: Vector3<f64>,
}

impl Transform {
    /// Composes a transform from a rotation matrix and a translation.
    pub fn compose(rotation: Matrix3<f64>, translation: Vector3<f64>) -> Self {
        Self {
            rotation,
            translation,
        }
    }

    pub fn identity() -> Self {
        Self::compose(Matrix3::identity(), Vector3::zeros())
    }

    /// Transform of a measured pose.
    pub fn from_point(point: &Point) -> Self {
        Self::compose(point.orientation.to_rotation(), point.position)
    }

    /// Inverse assuming `rotation` is orthonormal.
    pub fn inverse(&self) -> Self {
        let rt = self.rotation.transpose();
        Self::compose(rt, -(rt * self.translation))
    }

    /// 4x4 homogeneous matrix.
    pub fn to_homogeneous(&self) -> Matrix4<f64> {
        let mut m = Matrix4::identity();
        m.fixed_view_mut::<3, 3>(0, 0).copy_from(&self.rotation);
        m.fixed_view_mut::<3, 1>(0, 3).copy_from(&self.translation);
        m
    }

    /// True when no entry is NaN or infinite.
    pub fn is_finite(&self) -> bool {
        self.rotation.iter().chain(self.translation.iter()).all(|v| v.is_finite())
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Mul for Transform {
    type Output = Transform;

    fn mul(self, rhs: Transform) -> Transform {
        Transform::compose(
            self.rotation * rhs.rotation,
            self.rotation * rhs.translation + self.translation,
        )
    }
}

/// Skew-symmetric matrix such that `hat(w) * v == w.cross(&v)`.
pub fn hat(w: &Vector3<f64>) -> Matrix3<f64> {
    Matrix3::new(0.0, -w.z, w.y, w.z, 0.0, -w.x, -w.y, w.x, 0.0)
}

/// Rotation vector (axis times angle) of a rotation matrix.
pub fn log_so3(r: &Matrix3<f64>) -> Vector3<f64> {
    let cos = ((r.trace() - 1.0) / 2.0).clamp(-1.0, 1.0);
    let theta = cos.acos();
    if theta < 1e-12 {
        return Vector3::zeros();
    }
    let w = Vector3::new(r[(2, 1)] - r[(1, 2)], r[(0, 2)] - r[(2, 0)], r[(1, 0)] - r[(0, 1)])
        / (2.0 * theta.sin());
    w * theta
}
