//! Hand-eye / robot-world calibration solvers for `A_i X = Y B_i`.
//!
//! `A_i` and `B_i` are matching poses measured by two systems (for example a
//! laser tracker and the robot controller). Every solver returns the pair of
//! unknown transforms `X` and `Y`. Methods that only solve `AX = XB` on
//! relative motions recover `Y` afterwards with [`solve_y`].

use std::fmt;
use std::str::FromStr;

use log::{debug, warn};
use nalgebra::{DMatrix, DVector, Dyn, Matrix3, Vector3, SVD};
use thiserror::Error;

use crate::geometry::{log_so3, Transform};

mod daniilidis;
mod li_wang_wu;
mod park_martin;
mod shah;
mod tsai_lenz;

pub use daniilidis::daniilidis;
pub use li_wang_wu::li_wang_wu;
pub use park_martin::park_martin;
pub use shah::shah;
pub use tsai_lenz::tsai_lenz;

/// Relative motions rotating less than this (in either sequence) carry
/// little information about the rotation axis and are filtered out.
pub const MIN_MOTION_ANGLE_DEG: f64 = 2.0;

/// Iteration cap for every SVD and eigen decomposition. Inputs that do not
/// converge within it are reported as degenerate.
pub const MAX_DECOMPOSITION_ITERATIONS: usize = 1000;

/// Failure modes of the calibration solvers.
#[derive(Debug, Error, PartialEq)]
pub enum CalibrationError {
    #[error("pose sequences differ in length ({a} vs {b})")]
    LengthMismatch { a: usize, b: usize },
    #[error("at least {needed} poses are required, got {got}")]
    NotEnoughPoses { needed: usize, got: usize },
    #[error(
        "at least {needed} motion pairs rotating {} degrees or more are required, got {got}",
        MIN_MOTION_ANGLE_DEG
    )]
    NotEnoughMotions { needed: usize, got: usize },
    #[error("degenerate input: {0}")]
    Degenerate(&'static str),
    #[error("unknown method '{0}'")]
    UnknownMethod(String),
}

/// Result of a calibration: the transforms `X` and `Y` of `AX = YB`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Solution {
    pub x: Transform,
    pub y: Transform,
}

/// Available calibration methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Method {
    TsaiLenz,
    ParkMartin,
    Daniilidis,
    LiWangWu,
    Shah,
}

impl Method {
    /// Every method, in reporting order.
    pub const ALL: [Method; 5] = [
        Method::TsaiLenz,
        Method::ParkMartin,
        Method::Daniilidis,
        Method::LiWangWu,
        Method::Shah,
    ];

    /// Canonical command line name.
    pub fn name(&self) -> &'static str {
        match self {
            Method::TsaiLenz => "tsai-lenz",
            Method::ParkMartin => "park-martin",
            Method::Daniilidis => "daniilidis",
            Method::LiWangWu => "li-wang-wu",
            Method::Shah => "shah",
        }
    }

    /// Runs the method on matching pose sequences.
    pub fn solve(&self, a: &[Transform], b: &[Transform]) -> Result<Solution, CalibrationError> {
        debug!("running {} on {} poses", self.name(), a.len());
        match self {
            Method::TsaiLenz => tsai_lenz(a, b),
            Method::ParkMartin => park_martin(a, b),
            Method::Daniilidis => daniilidis(a, b),
            Method::LiWangWu => li_wang_wu(a, b),
            Method::Shah => shah(a, b),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Method {
    type Err = CalibrationError;

    /// Parses a method name or one of its short aliases. Case insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "tsai-lenz" | "tsai" => Ok(Method::TsaiLenz),
            "park-martin" | "park" => Ok(Method::ParkMartin),
            "daniilidis" => Ok(Method::Daniilidis),
            "li-wang-wu" | "li" => Ok(Method::LiWangWu),
            "shah" => Ok(Method::Shah),
            _ => Err(CalibrationError::UnknownMethod(s.to_string())),
        }
    }
}

/// Checks that both sequences match and hold at least `needed` poses.
pub(crate) fn check_inputs(
    a: &[Transform],
    b: &[Transform],
    needed: usize,
) -> Result<(), CalibrationError> {
    if a.len() != b.len() {
        return Err(CalibrationError::LengthMismatch {
            a: a.len(),
            b: b.len(),
        });
    }
    if a.len() < needed {
        return Err(CalibrationError::NotEnoughPoses {
            needed,
            got: a.len(),
        });
    }
    if !a.iter().chain(b).all(Transform::is_finite) {
        return Err(CalibrationError::Degenerate("pose contains non-finite values"));
    }
    Ok(())
}

/// Motions `inv(T_i) * T_{i+1}` between consecutive poses.
pub fn relative_motions(poses: &[Transform]) -> Vec<Transform> {
    poses
        .windows(2)
        .map(|w| w[0].inverse() * w[1])
        .collect()
}

/// Pairs of relative motions usable for `AX = XB`.
///
/// Pairs where either motion rotates less than [`MIN_MOTION_ANGLE_DEG`] are
/// dropped, unless that would drop all of them.
pub fn motion_pairs(a: &[Transform], b: &[Transform]) -> Vec<(Transform, Transform)> {
    let all: Vec<_> = relative_motions(a)
        .into_iter()
        .zip(relative_motions(b))
        .collect();
    let threshold = MIN_MOTION_ANGLE_DEG.to_radians();
    let kept: Vec<_> = all
        .iter()
        .filter(|(ar, br)| {
            log_so3(&ar.rotation).norm() >= threshold && log_so3(&br.rotation).norm() >= threshold
        })
        .copied()
        .collect();
    if kept.is_empty() {
        warn!(
            "no motion pair rotates at least {MIN_MOTION_ANGLE_DEG} degrees, using all {}",
            all.len()
        );
        all
    } else {
        debug!("kept {} of {} motion pairs", kept.len(), all.len());
        kept
    }
}

/// SVD of a dynamic matrix, capped at [`MAX_DECOMPOSITION_ITERATIONS`].
pub(crate) fn bounded_svd(
    m: DMatrix<f64>,
    compute_u: bool,
    compute_v: bool,
) -> Result<SVD<f64, Dyn, Dyn>, CalibrationError> {
    SVD::try_new(m, compute_u, compute_v, f64::EPSILON, MAX_DECOMPOSITION_ITERATIONS)
        .ok_or(CalibrationError::Degenerate("SVD did not converge"))
}

/// Minimum-norm least squares solution of `a * x = b` via SVD.
pub fn least_squares(a: &DMatrix<f64>, b: &DVector<f64>) -> Result<DVector<f64>, CalibrationError> {
    if !a.iter().chain(b.iter()).all(|v| v.is_finite()) {
        return Err(CalibrationError::Degenerate("non-finite coefficients"));
    }
    let svd = bounded_svd(a.clone(), true, true)?;
    let tol = svd.singular_values.max() * 1e-12;
    svd.solve(b, tol).map_err(CalibrationError::Degenerate)
}

/// Nearest rotation matrix to `m` (orthogonal Procrustes), with the
/// determinant forced to `+1`.
pub fn project_to_so3(m: &Matrix3<f64>) -> Result<Matrix3<f64>, CalibrationError> {
    if !m.iter().all(|v| v.is_finite()) {
        return Err(CalibrationError::Degenerate("non-finite rotation estimate"));
    }
    let svd = SVD::try_new(*m, true, true, f64::EPSILON, MAX_DECOMPOSITION_ITERATIONS)
        .ok_or(CalibrationError::Degenerate("SVD did not converge"))?;
    let mut u = svd.u.ok_or(CalibrationError::Degenerate("missing U factor"))?;
    let v_t = svd
        .v_t
        .ok_or(CalibrationError::Degenerate("missing V factor"))?;
    let r = u * v_t;
    if r.determinant() >= 0.0 {
        return Ok(r);
    }
    let weakest = svd.singular_values.imin();
    u.column_mut(weakest).neg_mut();
    Ok(u * v_t)
}

/// Recovers `Y` of `AX = YB` once `X` is known.
pub fn solve_y(a: &[Transform], b: &[Transform], x: &Transform) -> Result<Transform, CalibrationError> {
    if a.is_empty() {
        return Err(CalibrationError::NotEnoughPoses { needed: 1, got: 0 });
    }
    let m = a
        .iter()
        .zip(b)
        .fold(Matrix3::zeros(), |acc, (ai, bi)| {
            acc + ai.rotation * x.rotation * bi.rotation.transpose()
        });
    let ry = project_to_so3(&m)?;
    // The stacked system [I; I; ...] t = d has the mean of d as its solution.
    let sum = a.iter().zip(b).fold(Vector3::zeros(), |acc, (ai, bi)| {
        acc + ai.translation + ai.rotation * x.translation - ry * bi.translation
    });
    Ok(Transform::compose(ry, sum / a.len() as f64))
}

/// Solves `(I - R_A) t = t_A - R t_B` over all motion pairs.
pub(crate) fn solve_translation(
    pairs: &[(Transform, Transform)],
    rotation: &Matrix3<f64>,
) -> Result<Vector3<f64>, CalibrationError> {
    let n = pairs.len();
    let mut c = DMatrix::<f64>::zeros(3 * n, 3);
    let mut d = DVector::<f64>::zeros(3 * n);
    for (i, (ar, br)) in pairs.iter().enumerate() {
        c.fixed_view_mut::<3, 3>(3 * i, 0)
            .copy_from(&(Matrix3::identity() - ar.rotation));
        d.fixed_rows_mut::<3>(3 * i)
            .copy_from(&(ar.translation - rotation * br.translation));
    }
    let t = least_squares(&c, &d)?;
    Ok(Vector3::new(t[0], t[1], t[2]))
}

/// Copies a fixed 3x3 matrix into a dynamic one.
pub(crate) fn dynamic3(m: &Matrix3<f64>) -> DMatrix<f64> {
    DMatrix::from_column_slice(3, 3, m.as_slice())
}
