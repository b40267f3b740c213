use serde::{Deserialize, Serialize};

use crate::error::CameraResult;
use crate::linalg::{mat33_mul_vec3, transform_points, transpose33, IDENTITY33};
use crate::transforms::{
    check_rotation_mat, quaternion_to_rotation_matrix, rotation_matrix_to_quaternion,
    IDENTITY_QUATERNION,
};

/// Extrinsic pose of a camera.
///
/// The rotation matrix `R` maps world coordinates into the camera frame and
/// `center` is the camera position in world coordinates. The translation
/// `t = -R * center` is derived on demand and the quaternion is refreshed on
/// every rotation change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    rotation: [[f64; 3]; 3],
    // cached (w, x, y, z) form of `rotation`
    quaternion: [f64; 4],
    center: [f64; 3],
}

impl Default for Pose {
    fn default() -> Self {
        Self {
            rotation: IDENTITY33,
            quaternion: IDENTITY_QUATERNION,
            center: [0.0; 3],
        }
    }
}

impl Pose {
    /// Create an identity pose located at the origin.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the rotation as a (w, x, y, z) quaternion.
    pub fn quaternion(&self) -> [f64; 4] {
        self.quaternion
    }

    /// Get the world-to-camera rotation matrix.
    pub fn rotation(&self) -> &[[f64; 3]; 3] {
        &self.rotation
    }

    /// Get the camera center in world coordinates.
    pub fn center(&self) -> [f64; 3] {
        self.center
    }

    /// Get the translation vector `t = -R * center`.
    pub fn translation(&self) -> [f64; 3] {
        mat33_mul_vec3(&self.rotation, &self.center).map(|v| -v)
    }

    /// Set the rotation from a (w, x, y, z) quaternion.
    ///
    /// The quaternion is stored as given; the rotation matrix is computed from
    /// its normalized form.
    pub fn set_quaternion(&mut self, quaternion: [f64; 4]) {
        self.rotation = quaternion_to_rotation_matrix(&quaternion);
        self.quaternion = quaternion;
    }

    /// Set the rotation matrix.
    ///
    /// # Arguments
    ///
    /// * `rotation` - World-to-camera rotation.
    /// * `check_rotation` - Reject matrices whose determinant is not +1 or -1.
    pub fn set_rotation_mat(
        &mut self,
        rotation: [[f64; 3]; 3],
        check_rotation: bool,
    ) -> CameraResult<()> {
        if check_rotation {
            check_rotation_mat(&rotation)?;
        }
        self.quaternion = rotation_matrix_to_quaternion(&rotation);
        self.rotation = rotation;
        Ok(())
    }

    /// Set the camera center, keeping the current rotation.
    pub fn set_center_after_rotation(
        &mut self,
        center: [f64; 3],
        check_rotation: bool,
    ) -> CameraResult<()> {
        if check_rotation {
            check_rotation_mat(&self.rotation)?;
        }
        self.center = center;
        Ok(())
    }

    /// Set the translation vector, keeping the current rotation.
    ///
    /// The center becomes `-R^T * t`, so [`Self::translation`] reads back
    /// `R * R^T * t`. That equals `t` only for an orthogonal `R`; the rotation
    /// check looks at the determinant alone and lets through matrices such as
    /// `diag(2, 0.5, 1)` whose translation does not round-trip.
    pub fn set_translation_after_rotation(
        &mut self,
        translation: [f64; 3],
        check_rotation: bool,
    ) -> CameraResult<()> {
        if check_rotation {
            check_rotation_mat(&self.rotation)?;
        }
        self.center = mat33_mul_vec3(&transpose33(&self.rotation), &translation).map(|v| -v);
        Ok(())
    }

    /// Set the pose from a camera-to-world matrix `[[R^T, center], [0, 1]]`.
    ///
    /// The pose is left untouched when the rotation block is rejected.
    pub fn set_4x4_cam_to_world(
        &mut self,
        cam_to_world: &[[f64; 4]; 4],
        check_rotation: bool,
    ) -> CameraResult<()> {
        let mut rotation_t = [[0.0; 3]; 3];
        for (row_dst, row_src) in rotation_t.iter_mut().zip(cam_to_world.iter()) {
            row_dst.copy_from_slice(&row_src[..3]);
        }
        let center = [cam_to_world[0][3], cam_to_world[1][3], cam_to_world[2][3]];

        self.set_rotation_mat(transpose33(&rotation_t), check_rotation)?;
        self.set_center_after_rotation(center, check_rotation)
    }

    /// Get the camera-to-world matrix `[[R^T, center], [0, 1]]`.
    pub fn cam_to_world_4x4(&self) -> [[f64; 4]; 4] {
        let rotation_t = transpose33(&self.rotation);
        let mut mat = [[0.0; 4]; 4];
        for i in 0..3 {
            mat[i][..3].copy_from_slice(&rotation_t[i]);
            mat[i][3] = self.center[i];
        }
        mat[3][3] = 1.0;
        mat
    }

    /// Transform points from the camera frame into the world frame.
    pub fn cam_to_world_points(&self, points_in_cam: &[[f64; 3]]) -> CameraResult<Vec<[f64; 3]>> {
        let mut points_in_world = vec![[0.0; 3]; points_in_cam.len()];
        transform_points(
            points_in_cam,
            &transpose33(&self.rotation),
            &self.center,
            &mut points_in_world,
        )?;
        Ok(points_in_world)
    }
}
