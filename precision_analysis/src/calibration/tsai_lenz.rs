use nalgebra::{DMatrix, DVector, Matrix3, Vector3};

use super::{
    check_inputs, least_squares, motion_pairs, solve_translation, solve_y, CalibrationError,
    Solution,
};
use crate::geometry::{hat, log_so3, Transform};

fn unit_or_zero(w: Vector3<f64>) -> Vector3<f64> {
    let n = w.norm();
    if n < 1e-12 {
        Vector3::zeros()
    } else {
        w / n
    }
}

/// Tsai and Lenz (1989): rotation from the modified Rodrigues vector,
/// translation by linear least squares.
pub fn tsai_lenz(a: &[Transform], b: &[Transform]) -> Result<Solution, CalibrationError> {
    check_inputs(a, b, 3)?;
    let pairs = motion_pairs(a, b);
    let n = pairs.len();

    // [a + b]x p = a - b for every pair of unit rotation axes.
    let mut s = DMatrix::<f64>::zeros(3 * n, 3);
    let mut v = DVector::<f64>::zeros(3 * n);
    for (i, (ar, br)) in pairs.iter().enumerate() {
        let ua = unit_or_zero(log_so3(&ar.rotation));
        let ub = unit_or_zero(log_so3(&br.rotation));
        s.fixed_view_mut::<3, 3>(3 * i, 0).copy_from(&hat(&(ua + ub)));
        v.fixed_rows_mut::<3>(3 * i).copy_from(&(ua - ub));
    }
    let p = least_squares(&s, &v)?;
    let p = Vector3::new(p[0], p[1], p[2]);

    let p_norm = p.norm();
    let rotation = if p_norm < 1e-12 {
        Matrix3::identity()
    } else {
        let theta = 2.0 * p_norm.atan();
        let u = p / p_norm;
        let r = Matrix3::identity() * theta.cos()
            + hat(&u) * theta.sin()
            + (u * u.transpose()) * (1.0 - theta.cos());
        // p is the Rodrigues vector of the inverse rotation.
        r.transpose()
    };

    let translation = solve_translation(&pairs, &rotation)?;
    let x = Transform::compose(rotation, translation);
    let y = solve_y(a, b, &x)?;
    Ok(Solution { x, y })
}
