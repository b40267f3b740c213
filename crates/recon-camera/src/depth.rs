use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{CameraError, CameraResult};
use crate::intrinsics::PinholeParams;
use crate::linalg::{norm3, transform_points};
use crate::pointcloud::PointCloud;

/// Sparsity value that keeps every valid depth pixel.
pub const FULL_DENSITY: usize = 100;

/// Meaning of the values stored in a depth map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DepthMapSemantic {
    /// Euclidean distance along the unit-normalized viewing ray (e.g. MVE).
    WrtUnitVectors,
    /// Distance along the canonical ray `((x - cx) / fx, (y - cy) / fy, 1)`,
    /// i.e. the z-depth (e.g. COLMAP).
    WrtCanonicalVectors,
}

/// Location and semantic of the depth map belonging to a camera.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepthMapSource {
    /// Path handed to the depth-map decoder.
    pub path: PathBuf,
    /// Meaning of the decoded values.
    pub semantic: DepthMapSemantic,
}

/// A dense depth map stored in row-major order.
#[derive(Debug, Clone, PartialEq)]
pub struct DepthMap {
    width: usize,
    height: usize,
    data: Vec<f64>,
}

impl DepthMap {
    /// Create a depth map from row-major values.
    ///
    /// Fails if `data.len() != width * height`. A size whose product
    /// overflows is reported with `expected == usize::MAX`.
    pub fn new(width: usize, height: usize, data: Vec<f64>) -> CameraResult<Self> {
        let expected = width.checked_mul(height).unwrap_or(usize::MAX);
        if data.len() != expected {
            return Err(CameraError::InvalidDepthMapSize {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Get the width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Get the height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the shape of the depth map as (height, width).
    pub fn shape(&self) -> (usize, usize) {
        (self.height, self.width)
    }

    /// Get the depth value at a specific pixel.
    ///
    /// # Panics
    ///
    /// Panics if `x >= width` or `y >= height`; use [`Self::try_get`] for
    /// unchecked coordinates.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> f64 {
        self.data[y * self.width + x]
    }

    /// Get the depth value at a pixel, `None` outside of the depth map.
    pub fn try_get(&self, x: usize, y: usize) -> Option<f64> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.data[y * self.width + x])
    }

    /// Get the raw row-major values.
    pub fn data(&self) -> &[f64] {
        &self.data
    }
}

/// Reads depth maps from files.
///
/// Implemented for every closure `Fn(&Path) -> Result<DepthMap, E>`, so a
/// decoder can be passed inline:
///
/// ```
/// use std::path::Path;
/// use recon_camera::depth::{DepthMap, DepthMapDecoder};
/// use recon_camera::CameraError;
///
/// let decoder = |_path: &Path| -> Result<DepthMap, CameraError> {
///     DepthMap::new(2, 1, vec![1.0, 2.0])
/// };
/// let depth_map = decoder.decode(Path::new("depth.bin")).unwrap();
/// assert_eq!(depth_map.shape(), (1, 2));
/// ```
pub trait DepthMapDecoder {
    /// Decode the depth map stored at `path`.
    fn decode(&self, path: &Path) -> Result<DepthMap, Box<dyn std::error::Error + Send + Sync>>;
}

impl<F, E> DepthMapDecoder for F
where
    F: Fn(&Path) -> Result<DepthMap, E>,
    E: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    fn decode(&self, path: &Path) -> Result<DepthMap, Box<dyn std::error::Error + Send + Sync>> {
        self(path).map_err(Into::into)
    }
}

/// Parameters of the depth-map unprojection.
#[derive(Debug, Clone)]
pub struct UnprojectParams {
    /// Keep one out of every `sparsity` valid pixels; must be in (0, 100]
    /// where 100 keeps every pixel.
    pub sparsity: usize,
}

impl Default for UnprojectParams {
    fn default() -> Self {
        Self {
            sparsity: FULL_DENSITY,
        }
    }
}

impl UnprojectParams {
    /// Create parameters with the given sparsity.
    pub fn with_sparsity(sparsity: usize) -> CameraResult<Self> {
        let params = Self { sparsity };
        params.step()?;
        Ok(params)
    }

    // step between kept pixels
    fn step(&self) -> CameraResult<usize> {
        match self.sparsity {
            FULL_DENSITY => Ok(1),
            s if s > 0 && s < FULL_DENSITY => Ok(s),
            s => Err(CameraError::InvalidSparsity(s)),
        }
    }
}

/// Unproject a depth map into world coordinates.
///
/// Pixel centers sit at `(x + 0.5, y + 0.5)`. The canonical ray of a pixel is
/// `((x - cx) / -fx, (y - cy) / -fy, 1)`, the negated focal lengths flip the
/// image axes so that the camera looks along its local negative z axis.
/// Pixels with a depth <= 0 are background and dropped. Pixels are visited in
/// reverse raster order, last row and last column first.
///
/// # Arguments
///
/// * `depth_map` - The decoded depth map.
/// * `pinhole` - Focal lengths and principal point of the camera.
/// * `cam_to_world` - The 4x4 camera-to-world matrix.
/// * `semantic` - How the depth values relate to the viewing rays.
/// * `params` - Subsampling parameters.
///
/// # Returns
///
/// The world-space points of the kept pixels.
pub fn unproject_depth_map(
    depth_map: &DepthMap,
    pinhole: &PinholeParams,
    cam_to_world: &[[f64; 4]; 4],
    semantic: DepthMapSemantic,
    params: &UnprojectParams,
) -> CameraResult<PointCloud> {
    let step = params.step()?;

    let fx = -pinhole.fx;
    let fy = -pinhole.fy;

    let (height, width) = depth_map.shape();
    let valid = (0..height)
        .rev()
        .flat_map(|y| (0..width).rev().map(move |x| (x, y)))
        .filter_map(|(x, y)| {
            let depth = depth_map.get(x, y);
            (depth > 0.0).then_some((x, y, depth))
        });

    let points_in_cam = valid
        .step_by(step)
        .map(|(x, y, depth)| {
            let ray = [
                (x as f64 + 0.5 - pinhole.cx) / fx,
                (y as f64 + 0.5 - pinhole.cy) / fy,
                1.0,
            ];
            let scale = match semantic {
                DepthMapSemantic::WrtCanonicalVectors => depth,
                DepthMapSemantic::WrtUnitVectors => depth / norm3(&ray),
            };
            ray.map(|v| v * scale)
        })
        .collect::<Vec<_>>();

    log::debug!(
        "unprojected {} of {} depth pixels (sparsity {})",
        points_in_cam.len(),
        height * width,
        params.sparsity
    );

    let mut rotation = [[0.0; 3]; 3];
    for (row_dst, row_src) in rotation.iter_mut().zip(cam_to_world.iter()) {
        row_dst.copy_from_slice(&row_src[..3]);
    }
    let translation = [cam_to_world[0][3], cam_to_world[1][3], cam_to_world[2][3]];

    let mut points_in_world = vec![[0.0; 3]; points_in_cam.len()];
    transform_points(&points_in_cam, &rotation, &translation, &mut points_in_world)?;

    Ok(PointCloud::new(points_in_world))
}
