use nalgebra::{Matrix3, SymmetricEigen};

use super::{
    check_inputs, motion_pairs, project_to_so3, solve_translation, solve_y, CalibrationError,
    Solution, MAX_DECOMPOSITION_ITERATIONS,
};
use crate::geometry::{log_so3, Transform};

/// Park and Martin (1994): closed form rotation `(M^T M)^(-1/2) M^T` on the
/// Lie algebra, translation by linear least squares.
pub fn park_martin(a: &[Transform], b: &[Transform]) -> Result<Solution, CalibrationError> {
    check_inputs(a, b, 3)?;
    let pairs = motion_pairs(a, b);

    let m = pairs.iter().fold(Matrix3::zeros(), |acc, (ar, br)| {
        let alpha = log_so3(&ar.rotation);
        let beta = log_so3(&br.rotation);
        acc + beta * alpha.transpose()
    });

    let mtm = m.transpose() * m;
    let eigen = SymmetricEigen::try_new(mtm, f64::EPSILON, MAX_DECOMPOSITION_ITERATIONS)
        .ok_or(CalibrationError::Degenerate("eigen decomposition did not converge"))?;
    let inv_sqrt = eigen.eigenvalues.map(|w| w.max(1e-15).powf(-0.5));
    let q = eigen.eigenvectors;
    let inv_sqrt = q * Matrix3::from_diagonal(&inv_sqrt) * q.transpose();
    let rotation = project_to_so3(&(inv_sqrt * m.transpose()))?;

    let translation = solve_translation(&pairs, &rotation)?;
    let x = Transform::compose(rotation, translation);
    let y = solve_y(a, b, &x)?;
    Ok(Solution { x, y })
}
