#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// The reconstructed camera entity.
pub mod camera;

/// Depth maps and their unprojection into world space.
pub mod depth;

/// Error types shared by the crate.
pub mod error;

/// Image path resolution under the supported addressing modes.
pub mod image_paths;

/// Intrinsic calibration of a camera.
pub mod intrinsics;

/// Linear algebra utilities.
pub mod linalg;

/// Point cloud container.
pub mod pointcloud;

/// Camera pose and camera-to-world transforms.
pub mod pose;

/// Rotation representation conversions.
pub mod transforms;

pub use camera::Camera;
pub use error::{CameraError, CameraResult};
