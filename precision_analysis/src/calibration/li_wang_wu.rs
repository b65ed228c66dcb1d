use nalgebra::{DMatrix, DVector, Matrix3, Vector3};

use super::{check_inputs, dynamic3, least_squares, project_to_so3, CalibrationError, Solution};
use crate::geometry::Transform;

/// Li, Wang and Wu (2010): one linear system in the 24 unknowns
/// `[vec(R_X), vec(R_Y), t_X, t_Y]`, rotations projected onto SO(3) afterwards.
///
/// Rotations are vectorized row by row.
pub fn li_wang_wu(a: &[Transform], b: &[Transform]) -> Result<Solution, CalibrationError> {
    check_inputs(a, b, 2)?;
    let n = a.len();
    let i3 = DMatrix::<f64>::identity(3, 3);

    let mut lhs = DMatrix::<f64>::zeros(12 * n, 24);
    let mut rhs = DVector::<f64>::zeros(12 * n);
    for (i, (ai, bi)) in a.iter().zip(b).enumerate() {
        let ra = dynamic3(&ai.rotation);
        let rb_t = dynamic3(&bi.rotation.transpose());
        let row = 12 * i;

        // R_A R_X - R_Y R_B = 0
        lhs.view_mut((row, 0), (9, 9)).copy_from(&ra.kronecker(&i3));
        lhs.view_mut((row, 9), (9, 9)).copy_from(&(-i3.kronecker(&rb_t)));

        // R_Y t_B - R_A t_X + t_Y = t_A
        let tb_t = DMatrix::from_row_slice(1, 3, bi.translation.as_slice());
        lhs.view_mut((row + 9, 9), (3, 9)).copy_from(&i3.kronecker(&tb_t));
        lhs.view_mut((row + 9, 18), (3, 3)).copy_from(&(-&ra));
        lhs.view_mut((row + 9, 21), (3, 3)).copy_from(&i3);
        rhs.fixed_rows_mut::<3>(row + 9).copy_from(&ai.translation);
    }

    let sol = least_squares(&lhs, &rhs)?;
    let rx = project_to_so3(&Matrix3::from_row_slice(&sol.as_slice()[0..9]))?;
    let ry = project_to_so3(&Matrix3::from_row_slice(&sol.as_slice()[9..18]))?;

    Ok(Solution {
        x: Transform::compose(rx, Vector3::new(sol[18], sol[19], sol[20])),
        y: Transform::compose(ry, Vector3::new(sol[21], sol[22], sol[23])),
    })
}
