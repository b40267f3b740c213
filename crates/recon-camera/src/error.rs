use std::path::PathBuf;

/// Error types for camera operations.
///
/// Every variant except [`CameraError::DepthMapDecode`] reports a violated
/// caller contract. Expected absence (a missing depth-map file, a missing
/// undistorted image) is not an error and is reported through `Option` or
/// `bool` return values instead.
#[derive(Debug, thiserror::Error)]
pub enum CameraError {
    /// The matrix is not a (proper or improper) rotation.
    #[error("Invalid rotation matrix: determinant {0} is not close to +1 or -1")]
    InvalidRotation(f64),

    /// A field required by the requested operation was never set.
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// The operation is not available in the current configuration.
    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    /// A precondition of the operation does not hold.
    #[error("Precondition failed: {0}")]
    Precondition(String),

    /// The decoded depth map does not have the size of the camera image.
    #[error("Depth map shape {actual:?} does not match the camera shape {expected:?} (height, width)")]
    DepthMapShapeMismatch {
        /// Camera shape as (height, width).
        expected: (usize, usize),
        /// Depth map shape as (height, width).
        actual: (usize, usize),
    },

    /// The depth buffer length does not match width * height.
    #[error("Depth data length ({actual}) does not match the depth map size ({expected})")]
    InvalidDepthMapSize {
        /// Expected number of values.
        expected: usize,
        /// Actual number of values.
        actual: usize,
    },

    /// The depth map sparsity is outside of (0, 100].
    #[error("Depth map sparsity must be in (0, 100], got {0}")]
    InvalidSparsity(usize),

    /// The injected decoder failed to read the depth map.
    #[error("Failed to decode depth map {path:?}")]
    DepthMapDecode {
        /// Path handed to the decoder.
        path: PathBuf,
        /// Error reported by the decoder.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Source and destination point buffers differ in length.
    #[error("Mismatched point buffer lengths: source ({0}) != destination ({1})")]
    MismatchedLengths(usize, usize),

    /// An axis-angle rotation was requested around a zero vector.
    #[error("Cannot compute a rotation matrix from a zero axis")]
    ZeroAxis,
}

/// Result type for camera operations.
pub type CameraResult<T> = Result<T, CameraError>;
