use std::fmt;
use std::path::{Path, PathBuf};

use crate::depth::{
    unproject_depth_map, DepthMap, DepthMapDecoder, DepthMapSemantic, DepthMapSource,
    UnprojectParams,
};
use crate::error::{CameraError, CameraResult};
use crate::image_paths::{ImageFpType, ImagePaths};
use crate::intrinsics::{Intrinsics, PanoramicType, RadialDistortion};
use crate::pointcloud::PointCloud;
use crate::pose::Pose;

/// Maximum number of characters kept by [`Camera::object_name`].
pub const MAX_OBJECT_NAME_LEN: usize = 40;

/// A camera reconstructed by a structure-from-motion or multi-view stereo
/// pipeline.
///
/// A camera starts with an identity pose at the origin and empty intrinsics.
/// A reconstruction reader fills it through the setters, afterwards it is
/// queried read-only.
///
/// Example:
///
/// ```
/// use recon_camera::{Camera, CameraError};
/// use recon_camera::image_paths::ImageFpType;
/// use recon_camera::intrinsics::{compute_calibration_mat, RadialDistortion};
///
/// let mut camera = Camera::new();
/// camera.set_quaternion([1.0, 0.0, 0.0, 0.0]);
/// camera.set_center_after_rotation([0.0, 0.0, 5.0], true)?;
/// camera.set_calibration(compute_calibration_mat(500.0, 500.0, 250.0), RadialDistortion::none());
/// camera.set_image_size(1000, 500);
/// camera.set_relative_fp("images/0001.jpg", ImageFpType::Relative)?;
/// camera.set_image_dir("/data")?;
///
/// assert_eq!(camera.translation_vec(), [0.0, 0.0, -5.0]);
/// assert_eq!(camera.absolute_fp()?.to_str(), Some("/data/images/0001.jpg"));
/// # Ok::<(), CameraError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Camera {
    /// Unique identifier within a reconstruction.
    pub id: Option<usize>,
    /// Display color of the camera.
    pub color: [u8; 3],
    /// Display normal of the camera.
    pub normal: [f64; 3],
    pose: Pose,
    intrinsics: Intrinsics,
    image_paths: Option<ImagePaths>,
    depth_map_source: Option<DepthMapSource>,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            id: None,
            color: [255, 255, 255],
            normal: [0.0; 3],
            pose: Pose::default(),
            intrinsics: Intrinsics::default(),
            image_paths: None,
            depth_map_source: None,
        }
    }
}

impl Camera {
    /// Create a camera with an identity pose and empty intrinsics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the pose of the camera.
    pub fn pose(&self) -> &Pose {
        &self.pose
    }

    /// Get the intrinsics of the camera.
    pub fn intrinsics(&self) -> &Intrinsics {
        &self.intrinsics
    }

    // --- pose ---

    /// Set the rotation from a (w, x, y, z) quaternion.
    pub fn set_quaternion(&mut self, quaternion: [f64; 4]) {
        self.pose.set_quaternion(quaternion);
    }

    /// Set the world-to-camera rotation matrix.
    pub fn set_rotation_mat(
        &mut self,
        rotation: [[f64; 3]; 3],
        check_rotation: bool,
    ) -> CameraResult<()> {
        self.pose.set_rotation_mat(rotation, check_rotation)
    }

    /// Set the camera center, keeping the current rotation.
    pub fn set_center_after_rotation(
        &mut self,
        center: [f64; 3],
        check_rotation: bool,
    ) -> CameraResult<()> {
        self.pose.set_center_after_rotation(center, check_rotation)
    }

    /// Set the translation vector, keeping the current rotation.
    ///
    /// See [`Pose::set_translation_after_rotation`] for rotations that are
    /// not orthogonal.
    pub fn set_translation_after_rotation(
        &mut self,
        translation: [f64; 3],
        check_rotation: bool,
    ) -> CameraResult<()> {
        self.pose.set_translation_after_rotation(translation, check_rotation)
    }

    /// Set the pose from a camera-to-world matrix.
    pub fn set_4x4_cam_to_world(
        &mut self,
        cam_to_world: &[[f64; 4]; 4],
        check_rotation: bool,
    ) -> CameraResult<()> {
        self.pose.set_4x4_cam_to_world(cam_to_world, check_rotation)
    }

    /// Get the camera-to-world matrix `[[R^T, center], [0, 1]]`.
    pub fn get_4x4_cam_to_world(&self) -> [[f64; 4]; 4] {
        self.pose.cam_to_world_4x4()
    }

    /// Get the rotation as a (w, x, y, z) quaternion.
    pub fn quaternion(&self) -> [f64; 4] {
        self.pose.quaternion()
    }

    /// Get the world-to-camera rotation matrix.
    pub fn rotation_mat(&self) -> &[[f64; 3]; 3] {
        self.pose.rotation()
    }

    /// Get the translation vector `t = -R * center`.
    pub fn translation_vec(&self) -> [f64; 3] {
        self.pose.translation()
    }

    /// Get the camera center in world coordinates.
    pub fn camera_center(&self) -> [f64; 3] {
        self.pose.center()
    }

    // --- intrinsics ---

    /// Set the calibration matrix together with its distortion descriptor.
    pub fn set_calibration(
        &mut self,
        calibration_mat: [[f64; 3]; 3],
        radial_distortion: RadialDistortion,
    ) {
        self.intrinsics.set_calibration(calibration_mat, radial_distortion);
    }

    /// Replace the calibration matrix.
    pub fn set_calibration_mat(&mut self, calibration_mat: [[f64; 3]; 3]) {
        self.intrinsics.set_calibration_mat(calibration_mat);
    }

    /// Get the calibration matrix, requires [`Self::has_intrinsics`].
    pub fn calibration_mat(&self) -> CameraResult<&[[f64; 3]; 3]> {
        self.intrinsics.calibration_mat()
    }

    /// Get the focal length.
    pub fn focal_length(&self) -> f64 {
        self.intrinsics.focal_length()
    }

    /// Check if the focal length is positive.
    pub fn has_focal_length(&self) -> bool {
        self.intrinsics.has_focal_length()
    }

    /// Set the principal point `(cx, cy)`.
    pub fn set_principal_point(&mut self, principal_point: [f64; 2]) {
        self.intrinsics.set_principal_point(principal_point);
    }

    /// Get the principal point `(cx, cy)`, requires [`Self::has_intrinsics`].
    pub fn principal_point(&self) -> CameraResult<[f64; 2]> {
        self.intrinsics.principal_point()
    }

    /// Check that neither principal point coordinate is (close to) zero.
    pub fn is_principal_point_initialized(&self) -> bool {
        self.intrinsics.is_principal_point_initialized()
    }

    /// Check that focal length and principal point are usable.
    pub fn has_intrinsics(&self) -> bool {
        self.intrinsics.has_intrinsics()
    }

    /// Set the image size in pixels.
    pub fn set_image_size(&mut self, width: usize, height: usize) {
        self.intrinsics.set_image_size(width, height);
    }

    /// Get the image width in pixels.
    pub fn width(&self) -> Option<usize> {
        self.intrinsics.width()
    }

    /// Get the image height in pixels.
    pub fn height(&self) -> Option<usize> {
        self.intrinsics.height()
    }

    /// Field of view along the larger image dimension in radians.
    pub fn field_of_view(&self) -> CameraResult<f64> {
        self.intrinsics.field_of_view()
    }

    /// Check if the camera uses a panoramic projection.
    pub fn is_panoramic(&self) -> bool {
        self.intrinsics.is_panoramic()
    }

    /// Set the panoramic projection, `None` for a perspective camera.
    pub fn set_panoramic_type(&mut self, panoramic_type: Option<PanoramicType>) {
        self.intrinsics.set_panoramic_type(panoramic_type);
    }

    /// Get the panoramic projection.
    pub fn panoramic_type(&self) -> Option<PanoramicType> {
        self.intrinsics.panoramic_type()
    }

    // --- image paths ---

    /// Set the stored image path and with it the addressing mode.
    ///
    /// The mode cannot change once set. Setting a path of the same mode again
    /// only replaces the stored path; the image directory and the undistorted
    /// paths are kept. The mode has to be chosen before the other path
    /// setters can be used.
    pub fn set_relative_fp(
        &mut self,
        fp: impl Into<PathBuf>,
        fp_type: ImageFpType,
    ) -> CameraResult<()> {
        let same_mode = self
            .image_paths
            .as_mut()
            .filter(|current| current.fp_type() == fp_type);
        if let Some(current) = same_mode {
            current.set_fp(fp);
            return Ok(());
        }
        self.set_image_paths(ImagePaths::new(fp, fp_type))
    }

    /// Set all image paths at once, replacing the previous ones.
    pub fn set_image_paths(&mut self, image_paths: ImagePaths) -> CameraResult<()> {
        if let Some(current) = &self.image_paths {
            if current.fp_type() != image_paths.fp_type() {
                return Err(CameraError::UnsupportedOperation(format!(
                    "cannot change the image path type from {:?} to {:?}",
                    current.fp_type(),
                    image_paths.fp_type()
                )));
            }
        }
        self.image_paths = Some(image_paths);
        Ok(())
    }

    /// Get the image paths, if any were set.
    pub fn image_paths(&self) -> Option<&ImagePaths> {
        self.image_paths.as_ref()
    }

    fn paths(&self) -> CameraResult<&ImagePaths> {
        self.image_paths
            .as_ref()
            .ok_or(CameraError::MissingField("image_paths"))
    }

    fn paths_mut(&mut self) -> CameraResult<&mut ImagePaths> {
        self.image_paths
            .as_mut()
            .ok_or(CameraError::MissingField("image_paths"))
    }

    /// Get the addressing mode of the image.
    pub fn image_fp_type(&self) -> Option<ImageFpType> {
        self.image_paths.as_ref().map(ImagePaths::fp_type)
    }

    /// Set the image directory.
    pub fn set_image_dir(&mut self, dir: impl Into<PathBuf>) -> CameraResult<()> {
        self.paths_mut()?.set_image_dir(dir)
    }

    /// Set the absolute image path, only available in the absolute mode.
    pub fn set_absolute_fp(&mut self, fp: impl Into<PathBuf>) -> CameraResult<()> {
        self.paths_mut()?.set_absolute_fp(fp)
    }

    /// Set the relative path of the undistorted image.
    pub fn set_undistorted_relative_fp(&mut self, fp: impl Into<PathBuf>) -> CameraResult<()> {
        self.paths_mut()?.set_undistorted_relative_fp(fp)
    }

    /// Set the absolute path of the undistorted image.
    pub fn set_undistorted_absolute_fp(&mut self, fp: impl Into<PathBuf>) -> CameraResult<()> {
        self.paths_mut()?.set_undistorted_absolute_fp(fp)
    }

    /// Get the image path relative to the image directory.
    pub fn relative_fp(&self) -> CameraResult<PathBuf> {
        self.paths()?.relative_fp()
    }

    /// Get the resolved absolute image path.
    pub fn absolute_fp(&self) -> CameraResult<PathBuf> {
        self.paths()?.absolute_fp()
    }

    /// Get the undistorted image path relative to the image directory.
    pub fn undistorted_relative_fp(&self) -> CameraResult<PathBuf> {
        self.paths()?.undistorted_relative_fp()
    }

    /// Get the resolved absolute path of the undistorted image.
    pub fn undistorted_absolute_fp(&self) -> CameraResult<PathBuf> {
        self.paths()?.undistorted_absolute_fp()
    }

    /// Check that the undistorted image can be resolved and exists on disk.
    pub fn has_undistorted_absolute_fp(&self) -> bool {
        self.image_paths
            .as_ref()
            .is_some_and(ImagePaths::has_undistorted_absolute_fp)
    }

    /// Get the file name of the image.
    pub fn file_name(&self) -> CameraResult<PathBuf> {
        self.paths()?.file_name()
    }

    /// Name for scene objects created from this camera.
    ///
    /// The stem of the relative image path, truncated to its last
    /// [`MAX_OBJECT_NAME_LEN`] characters.
    pub fn object_name(&self) -> CameraResult<String> {
        let relative_fp = self.relative_fp()?;
        let stem = relative_fp.with_extension("");
        let stem = stem.to_string_lossy();
        let skip = stem.chars().count().saturating_sub(MAX_OBJECT_NAME_LEN);
        Ok(stem.chars().skip(skip).collect())
    }

    // --- depth map ---

    /// Set the location and semantic of the depth map.
    pub fn set_depth_map(&mut self, path: impl Into<PathBuf>, semantic: DepthMapSemantic) {
        self.depth_map_source = Some(DepthMapSource {
            path: path.into(),
            semantic,
        });
    }

    /// Get the depth map source, if any.
    pub fn depth_map_source(&self) -> Option<&DepthMapSource> {
        self.depth_map_source.as_ref()
    }

    /// Read the depth map through `decoder`.
    ///
    /// Returns `Ok(None)` when no depth map is set or its file does not exist.
    pub fn depth_map(&self, decoder: &impl DepthMapDecoder) -> CameraResult<Option<DepthMap>> {
        let Some(source) = &self.depth_map_source else {
            return Ok(None);
        };
        if !source.path.is_file() {
            log::warn!("depth map {:?} does not exist", source.path);
            return Ok(None);
        }
        decode_depth_map(decoder, &source.path).map(Some)
    }

    /// Unproject the depth map into world coordinates.
    ///
    /// Returns `Ok(None)` when there is no depth map to read. The decoded
    /// depth map must have the size of the camera image.
    pub fn depth_map_world_coords(
        &self,
        decoder: &impl DepthMapDecoder,
        params: &UnprojectParams,
    ) -> CameraResult<Option<PointCloud>> {
        let Some(depth_map) = self.depth_map(decoder)? else {
            return Ok(None);
        };
        let Some(source) = &self.depth_map_source else {
            return Ok(None);
        };

        let (width, height) = self.intrinsics.image_size().ok_or_else(|| {
            CameraError::Precondition("depth map unprojection requires the image size".to_string())
        })?;
        if depth_map.shape() != (height, width) {
            return Err(CameraError::DepthMapShapeMismatch {
                expected: (height, width),
                actual: depth_map.shape(),
            });
        }

        let pinhole = self.intrinsics.pinhole()?;
        unproject_depth_map(
            &depth_map,
            &pinhole,
            &self.get_4x4_cam_to_world(),
            source.semantic,
            params,
        )
        .map(Some)
    }
}

fn decode_depth_map(decoder: &impl DepthMapDecoder, path: &Path) -> CameraResult<DepthMap> {
    decoder
        .decode(path)
        .map_err(|source| CameraError::DepthMapDecode {
            path: path.to_path_buf(),
            source,
        })
}

impl fmt::Display for Camera {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let relative_fp = self
            .relative_fp()
            .map(|fp| fp.display().to_string())
            .unwrap_or_default();
        write!(
            f,
            "Camera: {} {:?} {:?}",
            relative_fp,
            self.camera_center(),
            self.normal
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intrinsics::compute_calibration_mat;

    #[test]
    fn test_default_camera() {
        let camera = Camera::new();
        assert_eq!(camera.color, [255, 255, 255]);
        assert_eq!(camera.quaternion(), [1.0, 0.0, 0.0, 0.0]);
        assert!(!camera.has_intrinsics());
        assert!(camera.image_fp_type().is_none());
        assert!(matches!(
            camera.relative_fp(),
            Err(CameraError::MissingField("image_paths"))
        ));
        assert!(!camera.has_undistorted_absolute_fp());
    }

    #[test]
    fn test_fp_type_cannot_change() -> Result<(), CameraError> {
        let mut camera = Camera::new();
        camera.set_relative_fp("a/b.jpg", ImageFpType::Relative)?;
        camera.set_relative_fp("a/c.jpg", ImageFpType::Relative)?;
        assert_eq!(camera.relative_fp()?, PathBuf::from("a/c.jpg"));
        assert!(matches!(
            camera.set_relative_fp("/a/c.jpg", ImageFpType::Absolute),
            Err(CameraError::UnsupportedOperation(_))
        ));
        assert_eq!(camera.image_fp_type(), Some(ImageFpType::Relative));
        Ok(())
    }

    #[test]
    fn test_reset_relative_fp_keeps_dir_and_undistorted() -> Result<(), CameraError> {
        let mut camera = Camera::new();
        camera.set_relative_fp("a.png", ImageFpType::Relative)?;
        camera.set_image_dir("/data")?;
        camera.set_undistorted_relative_fp("u/a.png")?;

        camera.set_relative_fp("b.png", ImageFpType::Relative)?;
        assert_eq!(camera.relative_fp()?, PathBuf::from("b.png"));
        assert_eq!(camera.absolute_fp()?, PathBuf::from("/data/b.png"));
        assert_eq!(
            camera.undistorted_absolute_fp()?,
            PathBuf::from("/data/u/a.png")
        );

        // replacing the whole value drops the fields set before
        camera.set_image_paths(ImagePaths::new("c.png", ImageFpType::Relative))?;
        assert!(matches!(
            camera.absolute_fp(),
            Err(CameraError::MissingField("image_dir"))
        ));
        Ok(())
    }

    #[test]
    fn test_object_name() -> Result<(), CameraError> {
        let mut camera = Camera::new();
        camera.set_relative_fp("dir/IMG_0042.JPG", ImageFpType::Name)?;
        assert_eq!(camera.object_name()?, "IMG_0042");

        let long_name = format!("{}.png", "x".repeat(30) + &"y".repeat(30));
        let mut camera = Camera::new();
        camera.set_relative_fp(long_name, ImageFpType::Relative)?;
        let name = camera.object_name()?;
        assert_eq!(name.len(), MAX_OBJECT_NAME_LEN);
        assert_eq!(name, "x".repeat(10) + &"y".repeat(30));
        Ok(())
    }

    #[test]
    fn test_display() -> Result<(), CameraError> {
        let mut camera = Camera::new();
        camera.set_relative_fp("img.png", ImageFpType::Relative)?;
        camera.set_center_after_rotation([1.0, 2.0, 3.0], true)?;
        assert_eq!(
            camera.to_string(),
            "Camera: img.png [1.0, 2.0, 3.0] [0.0, 0.0, 0.0]"
        );
        Ok(())
    }

    #[test]
    fn test_depth_map_without_source() -> Result<(), CameraError> {
        let camera = Camera::new();
        let decoder = |_: &Path| -> CameraResult<DepthMap> { DepthMap::new(1, 1, vec![1.0]) };
        assert!(camera.depth_map(&decoder)?.is_none());
        assert!(camera
            .depth_map_world_coords(&decoder, &UnprojectParams::default())?
            .is_none());
        Ok(())
    }

    #[test]
    fn test_depth_map_missing_file_is_soft() -> Result<(), CameraError> {
        let mut camera = Camera::new();
        camera.set_calibration(compute_calibration_mat(1.0, 1.0, 1.0), RadialDistortion::none());
        camera.set_image_size(1, 1);
        camera.set_depth_map("/definitely/not/here.bin", DepthMapSemantic::WrtUnitVectors);
        let decoder = |_: &Path| -> CameraResult<DepthMap> {
            panic!("decoder must not be called for a missing file")
        };
        assert!(camera.depth_map(&decoder)?.is_none());
        Ok(())
    }
}
