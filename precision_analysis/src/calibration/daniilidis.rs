use nalgebra::{DMatrix, Matrix3, Vector3, Vector4};

use super::{bounded_svd, check_inputs, motion_pairs, solve_y, CalibrationError, Solution};
use crate::geometry::{hat, log_so3, Transform};

/// Unit dual quaternion `(real, dual)`, each stored as `(w, x, y, z)`.
type DualQuaternion = (Vector4<f64>, Vector4<f64>);

fn quat_mul(p: &Vector4<f64>, q: &Vector4<f64>) -> Vector4<f64> {
    let (w1, x1, y1, z1) = (p[0], p[1], p[2], p[3]);
    let (w2, x2, y2, z2) = (q[0], q[1], q[2], q[3]);
    Vector4::new(
        w1 * w2 - x1 * x2 - y1 * y2 - z1 * z2,
        w1 * x2 + x1 * w2 + y1 * z2 - z1 * y2,
        w1 * y2 - x1 * z2 + y1 * w2 + z1 * x2,
        w1 * z2 + x1 * y2 - y1 * x2 + z1 * w2,
    )
}

fn to_dual_quaternion(t: &Transform) -> DualQuaternion {
    let axis_angle = log_so3(&t.rotation);
    let theta = axis_angle.norm();
    let real = if theta < 1e-12 {
        Vector4::new(1.0, 0.0, 0.0, 0.0)
    } else {
        let l = axis_angle / theta;
        let s = (theta / 2.0).sin();
        Vector4::new((theta / 2.0).cos(), s * l.x, s * l.y, s * l.z)
    };
    let tq = Vector4::new(0.0, t.translation.x, t.translation.y, t.translation.z);
    let dual = quat_mul(&tq, &real) * 0.5;
    (real, dual)
}

fn from_dual_quaternion((real, dual): DualQuaternion) -> Transform {
    let norm = real.norm();
    let q = if norm < 1e-12 {
        Vector4::new(1.0, 0.0, 0.0, 0.0)
    } else {
        real / norm
    };
    let (q0, q1, q2, q3) = (q[0], q[1], q[2], q[3]);
    let rotation = Matrix3::new(
        1.0 - 2.0 * q2 * q2 - 2.0 * q3 * q3,
        2.0 * (q1 * q2 - q3 * q0),
        2.0 * (q1 * q3 + q2 * q0),
        2.0 * (q1 * q2 + q3 * q0),
        1.0 - 2.0 * q1 * q1 - 2.0 * q3 * q3,
        2.0 * (q2 * q3 - q1 * q0),
        2.0 * (q1 * q3 - q2 * q0),
        2.0 * (q2 * q3 + q1 * q0),
        1.0 - 2.0 * q1 * q1 - 2.0 * q2 * q2,
    );
    let conj = Vector4::new(q0, -q1, -q2, -q3);
    let tq = quat_mul(&dual, &conj) * 2.0;
    Transform::compose(rotation, Vector3::new(tq[1], tq[2], tq[3]))
}

/// Daniilidis (1999): simultaneous rotation and translation from the null
/// space of the stacked dual quaternion constraints.
pub fn daniilidis(a: &[Transform], b: &[Transform]) -> Result<Solution, CalibrationError> {
    check_inputs(a, b, 3)?;
    let pairs = motion_pairs(a, b);
    let n = pairs.len();
    if n < 2 {
        return Err(CalibrationError::NotEnoughMotions { needed: 2, got: n });
    }

    let mut t = DMatrix::<f64>::zeros(6 * n, 8);
    for (i, (ar, br)) in pairs.iter().enumerate() {
        let (a1, a2) = to_dual_quaternion(ar);
        let (b1, b2) = to_dual_quaternion(br);
        let va1 = a1.fixed_rows::<3>(1).into_owned();
        let vb1 = b1.fixed_rows::<3>(1).into_owned();
        let va2 = a2.fixed_rows::<3>(1).into_owned();
        let vb2 = b2.fixed_rows::<3>(1).into_owned();
        let row = 6 * i;

        t.fixed_view_mut::<3, 1>(row, 0).copy_from(&(va1 - vb1));
        t.fixed_view_mut::<3, 3>(row, 1).copy_from(&hat(&(va1 + vb1)));

        t.fixed_view_mut::<3, 1>(row + 3, 0).copy_from(&(va2 - vb2));
        t.fixed_view_mut::<3, 3>(row + 3, 1).copy_from(&hat(&(va2 + vb2)));
        t.fixed_view_mut::<3, 1>(row + 3, 4).copy_from(&(va1 - vb1));
        t.fixed_view_mut::<3, 3>(row + 3, 5).copy_from(&hat(&(va1 + vb1)));
    }

    let svd = bounded_svd(t, false, true)?;
    let v_t = svd.v_t.ok_or(CalibrationError::Degenerate("missing V factor"))?;
    let mut order: Vec<usize> = (0..svd.singular_values.len()).collect();
    order.sort_by(|&i, &j| svd.singular_values[i].total_cmp(&svd.singular_values[j]));
    // Null space is spanned by the two weakest right singular vectors.
    let v1 = v_t.row(order[1]).transpose();
    let v2 = v_t.row(order[0]).transpose();
    let (u1, w1) = (v1.rows(0, 4), v1.rows(4, 4));
    let (u2, w2) = (v2.rows(0, 4), v2.rows(4, 4));

    // Solve s^2 u1.w1 + s (u1.w2 + u2.w1) + u2.w2 = 0.
    let qa = u1.dot(&w1);
    let qb = u1.dot(&w2) + u2.dot(&w1);
    let qc = u2.dot(&w2);
    let candidates = if qa.abs() < 1e-15 {
        vec![if qb.abs() > 1e-15 { -qc / qb } else { 0.0 }]
    } else {
        let sqrt_disc = (qb * qb - 4.0 * qa * qc).max(0.0).sqrt();
        vec![(-qb + sqrt_disc) / (2.0 * qa), (-qb - sqrt_disc) / (2.0 * qa)]
    };

    // Pick the root that maximizes |s u1 + u2|^2, then scale to a unit
    // real part.
    let (u1u1, u1u2, u2u2) = (u1.dot(&u1), u1.dot(&u2), u2.dot(&u2));
    let (s, best) = candidates
        .into_iter()
        .map(|s| (s, s * s * u1u1 + 2.0 * s * u1u2 + u2u2))
        .fold((0.0, f64::NEG_INFINITY), |acc, c| if c.1 > acc.1 { c } else { acc });
    let l2 = if best <= 1e-18 { 1.0 } else { (1.0 / best).sqrt() };
    let l1 = s * l2;

    let q = v1 * l1 + v2 * l2;
    let real = Vector4::new(q[0], q[1], q[2], q[3]);
    let dual = Vector4::new(q[4], q[5], q[6], q[7]);

    let x = from_dual_quaternion((real, dual));
    let y = solve_y(a, b, &x)?;
    Ok(Solution { x, y })
}
