//! Geometry primitives: measured poses, Euler orientations and rigid transforms.

mod euler;
mod point;
mod transform;

pub use euler::EulerZyx;
pub use point::Point;
pub use transform::{hat, log_so3, Transform};

/// Converts a slice of points into rigid transforms.
pub fn to_transforms(points: &[Point]) -> Vec<Transform> {
    points.iter().map(Transform::from_point).collect()
}
