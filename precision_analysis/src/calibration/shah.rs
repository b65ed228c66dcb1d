use nalgebra::{DMatrix, DVector, Matrix3, Vector3};

use super::{
    bounded_svd, check_inputs, dynamic3, least_squares, project_to_so3, CalibrationError, Solution,
};
use crate::geometry::Transform;

/// Rescales `m` to unit determinant (keeping its sign) and projects it onto
/// SO(3).
fn normalize_rotation(m: Matrix3<f64>) -> Result<Matrix3<f64>, CalibrationError> {
    let det = m.determinant();
    if det.abs() < 1e-15 {
        return Err(CalibrationError::Degenerate("singular rotation estimate"));
    }
    project_to_so3(&(m * (det.signum() / det.abs().cbrt())))
}

/// Shah (2013): rotations from the leading singular pair of
/// `sum(R_B kron R_A)`, translations by linear least squares on absolute poses.
pub fn shah(a: &[Transform], b: &[Transform]) -> Result<Solution, CalibrationError> {
    check_inputs(a, b, 2)?;
    let n = a.len();

    // vec(R_Y) = (R_B kron R_A) vec(R_X) for every pose (column-major vec).
    let mut k = DMatrix::<f64>::zeros(9, 9);
    for (ai, bi) in a.iter().zip(b) {
        k += dynamic3(&bi.rotation).kronecker(&dynamic3(&ai.rotation));
    }
    let svd = bounded_svd(k, true, true)?;
    let u = svd.u.ok_or(CalibrationError::Degenerate("missing U factor"))?;
    let v_t = svd.v_t.ok_or(CalibrationError::Degenerate("missing V factor"))?;
    let lead = svd.singular_values.imax();

    let vec_x: Vec<f64> = v_t.row(lead).iter().copied().collect();
    let vec_y: Vec<f64> = u.column(lead).iter().copied().collect();
    let rx = normalize_rotation(Matrix3::from_column_slice(&vec_x))?;
    let ry = normalize_rotation(Matrix3::from_column_slice(&vec_y))?;

    // -R_A t_X + t_Y = t_A - R_Y t_B
    let mut lhs = DMatrix::<f64>::zeros(3 * n, 6);
    let mut rhs = DVector::<f64>::zeros(3 * n);
    for (i, (ai, bi)) in a.iter().zip(b).enumerate() {
        lhs.fixed_view_mut::<3, 3>(3 * i, 0).copy_from(&(-ai.rotation));
        lhs.fixed_view_mut::<3, 3>(3 * i, 3).copy_from(&Matrix3::identity());
        rhs.fixed_rows_mut::<3>(3 * i)
            .copy_from(&(ai.translation - ry * bi.translation));
    }
    let t = least_squares(&lhs, &rhs)?;

    Ok(Solution {
        x: Transform::compose(rx, Vector3::new(t[0], t[1], t[2])),
        y: Transform::compose(ry, Vector3::new(t[3], t[4], t[5])),
    })
}
