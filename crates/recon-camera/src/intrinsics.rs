use serde::{Deserialize, Serialize};

use crate::error::{CameraError, CameraResult};

/// Absolute tolerance below which a principal point coordinate counts as zero.
pub const PRINCIPAL_POINT_ATOL: f64 = 1e-8;

/// Projection model overriding the standard perspective intrinsics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PanoramicType {
    /// Equirectangular (latitude / longitude) panorama.
    Equirectangular,
}

/// Radial distortion coefficients reported by a reconstruction.
///
/// The coefficients are stored as given (e.g. one coefficient for VisualSfM,
/// `k1, k2` for COLMAP radial models); no undistortion is performed here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RadialDistortion {
    /// Radial distortion coefficients, lowest order first.
    pub coefficients: Vec<f64>,
}

impl RadialDistortion {
    /// Distortion descriptor without any coefficient.
    pub fn none() -> Self {
        Self::default()
    }

    /// Create a descriptor from the given coefficients.
    pub fn new(coefficients: Vec<f64>) -> Self {
        Self { coefficients }
    }

    /// Check if any coefficient is non-zero.
    pub fn has_distortion(&self) -> bool {
        self.coefficients.iter().any(|&k| k != 0.0)
    }
}

/// Focal lengths and principal point of a pinhole camera.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PinholeParams {
    /// Focal length in x direction
    pub fx: f64,
    /// Focal length in y direction
    pub fy: f64,
    /// Principal point x coordinate
    pub cx: f64,
    /// Principal point y coordinate
    pub cy: f64,
}

impl PinholeParams {
    /// Create pinhole parameters from a 3x3 calibration matrix.
    pub fn from_matrix(k: &[[f64; 3]; 3]) -> Self {
        Self {
            fx: k[0][0],
            fy: k[1][1],
            cx: k[0][2],
            cy: k[1][2],
        }
    }
}

/// Build the calibration matrix `[[f, 0, cx], [0, f, cy], [0, 0, 1]]`.
///
/// Example:
///
/// ```
/// use recon_camera::intrinsics::compute_calibration_mat;
///
/// let k = compute_calibration_mat(500.0, 320.0, 240.0);
/// assert_eq!(k, [[500.0, 0.0, 320.0], [0.0, 500.0, 240.0], [0.0, 0.0, 1.0]]);
/// ```
pub fn compute_calibration_mat(focal_length: f64, cx: f64, cy: f64) -> [[f64; 3]; 3] {
    [
        [focal_length, 0.0, cx],
        [0.0, focal_length, cy],
        [0.0, 0.0, 1.0],
    ]
}

/// Intrinsic calibration, image size and projection model of a camera.
///
/// A freshly created instance has an all-zero calibration matrix, i.e. no
/// focal length and an uninitialized principal point.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Intrinsics {
    calibration_mat: [[f64; 3]; 3],
    radial_distortion: Option<RadialDistortion>,
    width: Option<usize>,
    height: Option<usize>,
    panoramic_type: Option<PanoramicType>,
}

impl Intrinsics {
    /// Create empty intrinsics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the calibration matrix together with its distortion descriptor.
    pub fn set_calibration(
        &mut self,
        calibration_mat: [[f64; 3]; 3],
        radial_distortion: RadialDistortion,
    ) {
        self.calibration_mat = calibration_mat;
        self.radial_distortion = Some(radial_distortion);
    }

    /// Replace the calibration matrix, leaving the distortion untouched.
    pub fn set_calibration_mat(&mut self, calibration_mat: [[f64; 3]; 3]) {
        self.calibration_mat = calibration_mat;
    }

    /// Get the calibration matrix.
    ///
    /// Fails with [`CameraError::Precondition`] unless [`Self::has_intrinsics`].
    pub fn calibration_mat(&self) -> CameraResult<&[[f64; 3]; 3]> {
        if !self.has_intrinsics() {
            return Err(CameraError::Precondition(format!(
                "calibration matrix needs a positive focal length and an initialized principal point, got {:?}",
                self.calibration_mat
            )));
        }
        Ok(&self.calibration_mat)
    }

    /// Get the calibration matrix without checking it.
    pub fn calibration_mat_unchecked(&self) -> &[[f64; 3]; 3] {
        &self.calibration_mat
    }

    /// Get the distortion descriptor passed with the calibration, if any.
    pub fn radial_distortion(&self) -> Option<&RadialDistortion> {
        self.radial_distortion.as_ref()
    }

    /// Get the focal length `K[0][0]`.
    pub fn focal_length(&self) -> f64 {
        self.calibration_mat[0][0]
    }

    /// Check if the focal length is positive.
    pub fn has_focal_length(&self) -> bool {
        self.focal_length() > 0.0
    }

    /// Set the principal point `(cx, cy)`.
    pub fn set_principal_point(&mut self, principal_point: [f64; 2]) {
        self.calibration_mat[0][2] = principal_point[0];
        self.calibration_mat[1][2] = principal_point[1];
    }

    /// Get the principal point `(cx, cy)`.
    ///
    /// Fails with [`CameraError::Precondition`] unless [`Self::has_intrinsics`].
    pub fn principal_point(&self) -> CameraResult<[f64; 2]> {
        let k = self.calibration_mat()?;
        Ok([k[0][2], k[1][2]])
    }

    /// Check that neither principal point coordinate is (close to) zero.
    pub fn is_principal_point_initialized(&self) -> bool {
        let cx_zero = self.calibration_mat[0][2].abs() <= PRINCIPAL_POINT_ATOL;
        let cy_zero = self.calibration_mat[1][2].abs() <= PRINCIPAL_POINT_ATOL;
        !cx_zero && !cy_zero
    }

    /// Check that both the focal length and the principal point are usable.
    pub fn has_intrinsics(&self) -> bool {
        self.has_focal_length() && self.is_principal_point_initialized()
    }

    /// Get the pinhole parameters of the checked calibration matrix.
    pub fn pinhole(&self) -> CameraResult<PinholeParams> {
        self.calibration_mat().map(PinholeParams::from_matrix)
    }

    /// Set the image size in pixels.
    pub fn set_image_size(&mut self, width: usize, height: usize) {
        self.width = Some(width);
        self.height = Some(height);
    }

    /// Get the image width in pixels.
    pub fn width(&self) -> Option<usize> {
        self.width
    }

    /// Get the image height in pixels.
    pub fn height(&self) -> Option<usize> {
        self.height
    }

    /// Get the image size as `(width, height)` once both are known.
    pub fn image_size(&self) -> Option<(usize, usize)> {
        self.width.zip(self.height)
    }

    /// Compute the field of view along the larger image dimension in radians.
    ///
    /// `fov = 2 * atan(max(width, height) / (2 * f))`
    pub fn field_of_view(&self) -> CameraResult<f64> {
        let (width, height) = self.image_size().ok_or_else(|| {
            CameraError::Precondition("field of view requires the image size".to_string())
        })?;
        if !self.has_focal_length() {
            return Err(CameraError::Precondition(format!(
                "field of view requires a positive focal length, got {}",
                self.focal_length()
            )));
        }
        let extent = width.max(height) as f64;
        Ok(2.0 * (extent / (2.0 * self.focal_length())).atan())
    }

    /// Check if the camera uses a panoramic projection.
    pub fn is_panoramic(&self) -> bool {
        self.panoramic_type.is_some()
    }

    /// Set the panoramic projection, `None` for a perspective camera.
    pub fn set_panoramic_type(&mut self, panoramic_type: Option<PanoramicType>) {
        self.panoramic_type = panoramic_type;
    }

    /// Get the panoramic projection.
    pub fn panoramic_type(&self) -> Option<PanoramicType> {
        self.panoramic_type
    }
}
