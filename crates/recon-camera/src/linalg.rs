use crate::error::{CameraError, CameraResult};

/// The 3x3 identity matrix.
pub const IDENTITY33: [[f64; 3]; 3] = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];

/// Compute the determinant of a 3x3 matrix.
///
/// Example:
///
/// ```
/// use recon_camera::linalg::{determinant33, IDENTITY33};
///
/// assert_eq!(determinant33(&IDENTITY33), 1.0);
/// ```
pub fn determinant33(m: &[[f64; 3]; 3]) -> f64 {
    m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
        - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
        + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0])
}

/// Transpose a 3x3 matrix.
pub fn transpose33(m: &[[f64; 3]; 3]) -> [[f64; 3]; 3] {
    let mut out = [[0.0; 3]; 3];
    for (i, row) in m.iter().enumerate() {
        for (j, val) in row.iter().enumerate() {
            out[j][i] = *val;
        }
    }
    out
}

/// Multiply a 3x3 matrix with a 3-vector.
pub fn mat33_mul_vec3(m: &[[f64; 3]; 3], v: &[f64; 3]) -> [f64; 3] {
    [
        m[0][0] * v[0] + m[0][1] * v[1] + m[0][2] * v[2],
        m[1][0] * v[0] + m[1][1] * v[1] + m[1][2] * v[2],
        m[2][0] * v[0] + m[2][1] * v[1] + m[2][2] * v[2],
    ]
}

/// Euclidean norm of a 3-vector.
#[inline]
pub fn norm3(v: &[f64; 3]) -> f64 {
    (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt()
}

/// Transform a set of points using a rotation and translation.
///
/// Computes `dst = dst_r_src * src + dst_t_src` for every point.
///
/// # Arguments
///
/// * `src_points` - A set of points to be transformed.
/// * `dst_r_src` - A rotation matrix.
/// * `dst_t_src` - A translation vector.
/// * `dst_points` - A pre-allocated buffer of the same size as `src_points`.
///
/// Example:
///
/// ```
/// use recon_camera::linalg::{transform_points, IDENTITY33};
///
/// let src_points = vec![[2.0, 2.0, 2.0], [3.0, 4.0, 5.0]];
/// let mut dst_points = vec![[0.0; 3]; src_points.len()];
/// transform_points(&src_points, &IDENTITY33, &[1.0, 0.0, 0.0], &mut dst_points).unwrap();
/// assert_eq!(dst_points[0], [3.0, 2.0, 2.0]);
/// ```
pub fn transform_points(
    src_points: &[[f64; 3]],
    dst_r_src: &[[f64; 3]; 3],
    dst_t_src: &[f64; 3],
    dst_points: &mut [[f64; 3]],
) -> CameraResult<()> {
    if src_points.len() != dst_points.len() {
        return Err(CameraError::MismatchedLengths(
            src_points.len(),
            dst_points.len(),
        ));
    }

    if src_points.is_empty() {
        return Ok(());
    }

    let dst_r_src_mat = faer::Mat::<f64>::from_fn(3, 3, |i, j| dst_r_src[i][j]);

    {
        // SAFETY: [[f64; 3]] is laid out as a contiguous [f64] of three times the length
        let src_points_slice = unsafe {
            std::slice::from_raw_parts(src_points.as_ptr() as *const f64, src_points.len() * 3)
        };
        // Nx3 row major, one point per row
        let points_in_src = faer::mat::from_row_major_slice(src_points_slice, src_points.len(), 3);

        // SAFETY: same layout argument as above, the buffer is exclusively borrowed
        let dst_points_slice = unsafe {
            std::slice::from_raw_parts_mut(
                dst_points.as_mut_ptr() as *mut f64,
                dst_points.len() * 3,
            )
        };
        // 3xN column major, one point per column
        let mut points_in_dst =
            faer::mat::from_column_major_slice_mut(dst_points_slice, 3, dst_points.len());

        faer::linalg::matmul::matmul(
            points_in_dst.as_mut(),
            dst_r_src_mat.as_ref(),
            points_in_src.transpose(),
            None,
            1.0,
            faer::Parallelism::None,
        );
    }

    for point in dst_points.iter_mut() {
        point[0] += dst_t_src[0];
        point[1] += dst_t_src[1];
        point[2] += dst_t_src[2];
    }

    Ok(())
}
