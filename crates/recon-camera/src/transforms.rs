use crate::error::{CameraError, CameraResult};
use crate::linalg::determinant33;

/// Tolerance on `|det(R)| - 1` for a matrix to be accepted as a rotation.
pub const ROTATION_DET_TOL: f64 = 1e-6;

/// Quaternions with a norm below this value are treated as the zero quaternion.
pub const QUATERNION_NORM_EPS: f64 = 1e-12;

/// The identity quaternion in (w, x, y, z) order.
pub const IDENTITY_QUATERNION: [f64; 4] = [1.0, 0.0, 0.0, 0.0];

/// Check whether a matrix is a proper or improper rotation.
///
/// Returns true iff `|det(m)|` is within [`ROTATION_DET_TOL`] of 1, so
/// reflections (det = -1) pass.
pub fn is_rotation_mat_valid(m: &[[f64; 3]; 3]) -> bool {
    let det = determinant33(m);
    (det - 1.0).abs() <= ROTATION_DET_TOL || (det + 1.0).abs() <= ROTATION_DET_TOL
}

/// Validate a rotation matrix, reporting its determinant on failure.
pub fn check_rotation_mat(m: &[[f64; 3]; 3]) -> CameraResult<()> {
    if is_rotation_mat_valid(m) {
        Ok(())
    } else {
        Err(CameraError::InvalidRotation(determinant33(m)))
    }
}

/// Normalize a (w, x, y, z) quaternion.
///
/// A quaternion with a norm of (almost) zero is replaced by the identity.
///
/// Example:
///
/// ```
/// use recon_camera::transforms::normalize_quaternion;
///
/// assert_eq!(normalize_quaternion(&[0.0; 4]), [1.0, 0.0, 0.0, 0.0]);
/// assert_eq!(normalize_quaternion(&[2.0, 0.0, 0.0, 0.0]), [1.0, 0.0, 0.0, 0.0]);
/// ```
pub fn normalize_quaternion(q: &[f64; 4]) -> [f64; 4] {
    let norm = (q[0] * q[0] + q[1] * q[1] + q[2] * q[2] + q[3] * q[3]).sqrt();
    if norm <= QUATERNION_NORM_EPS {
        return IDENTITY_QUATERNION;
    }
    [q[0] / norm, q[1] / norm, q[2] / norm, q[3] / norm]
}

/// Convert a (w, x, y, z) quaternion to a rotation matrix.
///
/// The quaternion does not need to be normalized.
///
/// # Arguments
///
/// * `q` - The quaternion in (w, x, y, z) order.
///
/// # Returns
///
/// The 3x3 rotation matrix in row-major order.
pub fn quaternion_to_rotation_matrix(q: &[f64; 4]) -> [[f64; 3]; 3] {
    let [w, x, y, z] = normalize_quaternion(q);

    let (ww, xx, yy, zz) = (w * w, x * x, y * y, z * z);
    let (xy, xz, yz) = (x * y, x * z, y * z);
    let (wx, wy, wz) = (w * x, w * y, w * z);

    [
        [ww + xx - yy - zz, 2.0 * (xy - wz), 2.0 * (xz + wy)],
        [2.0 * (xy + wz), ww - xx + yy - zz, 2.0 * (yz - wx)],
        [2.0 * (xz - wy), 2.0 * (yz + wx), ww - xx - yy + zz],
    ]
}

/// Convert a rotation matrix to a (w, x, y, z) quaternion.
///
/// Uses Shepperd's method: the largest of the trace and the three diagonal
/// entries selects which quaternion component is recovered first, so the
/// remaining components are never divided by a value close to zero.
///
/// An improper rotation `R` (det = -1) cannot be expressed as a quaternion;
/// the quaternion of its proper part `-R` is returned instead.
///
/// # Arguments
///
/// * `m` - The 3x3 rotation matrix in row-major order.
///
/// # Returns
///
/// The unit quaternion in (w, x, y, z) order.
pub fn rotation_matrix_to_quaternion(m: &[[f64; 3]; 3]) -> [f64; 4] {
    let m = if determinant33(m) < 0.0 {
        m.map(|row| row.map(|v| -v))
    } else {
        *m
    };

    let (m00, m11, m22) = (m[0][0], m[1][1], m[2][2]);
    let trace = m00 + m11 + m22;

    let q = if trace >= m00 && trace >= m11 && trace >= m22 {
        // s = 4 * w
        let s = 2.0 * (1.0 + trace).sqrt();
        [
            0.25 * s,
            (m[2][1] - m[1][2]) / s,
            (m[0][2] - m[2][0]) / s,
            (m[1][0] - m[0][1]) / s,
        ]
    } else if m00 >= m11 && m00 >= m22 {
        // s = 4 * x
        let s = 2.0 * (1.0 + m00 - m11 - m22).sqrt();
        [
            (m[2][1] - m[1][2]) / s,
            0.25 * s,
            (m[0][1] + m[1][0]) / s,
            (m[0][2] + m[2][0]) / s,
        ]
    } else if m11 >= m22 {
        // s = 4 * y
        let s = 2.0 * (1.0 + m11 - m00 - m22).sqrt();
        [
            (m[0][2] - m[2][0]) / s,
            (m[0][1] + m[1][0]) / s,
            0.25 * s,
            (m[1][2] + m[2][1]) / s,
        ]
    } else {
        // s = 4 * z
        let s = 2.0 * (1.0 + m22 - m00 - m11).sqrt();
        [
            (m[1][0] - m[0][1]) / s,
            (m[0][2] + m[2][0]) / s,
            (m[1][2] + m[2][1]) / s,
            0.25 * s,
        ]
    };

    normalize_quaternion(&q)
}

/// Compute the rotation matrix from an axis and angle.
///
/// # Arguments
///
/// * `axis` - The axis of rotation, normalized internally.
/// * `angle` - The angle of rotation in radians.
///
/// # Returns
///
/// The rotation matrix, or [`CameraError::ZeroAxis`] for a zero axis.
///
/// Example:
///
/// ```
/// use recon_camera::transforms::axis_angle_to_rotation_matrix;
///
/// let rotation = axis_angle_to_rotation_matrix(&[0.0, 0.0, 2.0], 0.0).unwrap();
/// assert_eq!(rotation, [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]]);
/// ```
pub fn axis_angle_to_rotation_matrix(axis: &[f64; 3], angle: f64) -> CameraResult<[[f64; 3]; 3]> {
    let magnitude = (axis[0].powi(2) + axis[1].powi(2) + axis[2].powi(2)).sqrt();
    if magnitude < 1e-10 {
        return Err(CameraError::ZeroAxis);
    }
    let [x, y, z] = axis.map(|v| v / magnitude);

    let (s, c) = angle.sin_cos();
    let t = 1.0 - c;

    Ok([
        [c + x * x * t, x * y * t - z * s, x * z * t + y * s],
        [x * y * t + z * s, c + y * y * t, y * z * t - x * s],
        [x * z * t - y * s, y * z * t + x * s, c + z * z * t],
    ])
}
