use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{CameraError, CameraResult};

/// How the image of a camera is addressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ImageFpType {
    /// Only the file name of the stored path is significant.
    Name,
    /// The stored path is relative to the image directory.
    Relative,
    /// The stored path is absolute.
    Absolute,
}

/// Image paths of a camera under one of the three addressing modes.
///
/// The payload of each variant holds exactly the fields its mode needs. The
/// image directory and the undistorted paths are typically filled in after
/// the mode has been chosen, hence they are optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ImagePaths {
    /// Resolve `image_dir / file_name(relative_fp)`.
    Name {
        /// Directory containing the images.
        image_dir: Option<PathBuf>,
        /// Path as stored by the reconstruction.
        relative_fp: PathBuf,
        /// Path of the undistorted image as stored by the reconstruction.
        undistorted_relative_fp: Option<PathBuf>,
    },
    /// Resolve `image_dir / relative_fp`.
    Relative {
        /// Directory containing the images.
        image_dir: Option<PathBuf>,
        /// Path relative to `image_dir`.
        relative_fp: PathBuf,
        /// Path of the undistorted image relative to `image_dir`.
        undistorted_relative_fp: Option<PathBuf>,
    },
    /// Use `absolute_fp` verbatim.
    Absolute {
        /// Absolute image path.
        absolute_fp: PathBuf,
        /// Absolute path of the undistorted image.
        undistorted_absolute_fp: Option<PathBuf>,
    },
}

fn file_name_of(path: &Path) -> CameraResult<PathBuf> {
    path.file_name()
        .map(PathBuf::from)
        .ok_or_else(|| CameraError::Precondition(format!("path {:?} has no file name", path)))
}

fn require<'a>(field: &'a Option<PathBuf>, name: &'static str) -> CameraResult<&'a PathBuf> {
    field.as_ref().ok_or(CameraError::MissingField(name))
}

impl ImagePaths {
    /// Create the paths of a camera from its stored image path.
    ///
    /// For [`ImageFpType::Absolute`] the given path is the absolute image path.
    pub fn new(fp: impl Into<PathBuf>, fp_type: ImageFpType) -> Self {
        let fp = fp.into();
        match fp_type {
            ImageFpType::Name => Self::Name {
                image_dir: None,
                relative_fp: fp,
                undistorted_relative_fp: None,
            },
            ImageFpType::Relative => Self::Relative {
                image_dir: None,
                relative_fp: fp,
                undistorted_relative_fp: None,
            },
            ImageFpType::Absolute => Self::Absolute {
                absolute_fp: fp,
                undistorted_absolute_fp: None,
            },
        }
    }

    /// Get the addressing mode.
    pub fn fp_type(&self) -> ImageFpType {
        match self {
            Self::Name { .. } => ImageFpType::Name,
            Self::Relative { .. } => ImageFpType::Relative,
            Self::Absolute { .. } => ImageFpType::Absolute,
        }
    }

    /// Replace the stored image path, keeping every other field.
    ///
    /// This is the relative path in the name and relative modes and the
    /// absolute path in the absolute mode.
    pub fn set_fp(&mut self, fp: impl Into<PathBuf>) {
        match self {
            Self::Name { relative_fp, .. } | Self::Relative { relative_fp, .. } => {
                *relative_fp = fp.into();
            }
            Self::Absolute { absolute_fp, .. } => *absolute_fp = fp.into(),
        }
    }

    /// Set the image directory used by the name and relative modes.
    pub fn set_image_dir(&mut self, dir: impl Into<PathBuf>) -> CameraResult<()> {
        match self {
            Self::Name { image_dir, .. } | Self::Relative { image_dir, .. } => {
                *image_dir = Some(dir.into());
                Ok(())
            }
            Self::Absolute { .. } => Err(CameraError::UnsupportedOperation(
                "absolute image paths do not use an image directory".to_string(),
            )),
        }
    }

    /// Set the absolute image path of the absolute mode.
    ///
    /// The name and relative modes derive their absolute path from the image
    /// directory and have no field to store it in, so the call fails with
    /// [`CameraError::UnsupportedOperation`] instead of dropping the value.
    pub fn set_absolute_fp(&mut self, fp: impl Into<PathBuf>) -> CameraResult<()> {
        match self {
            Self::Absolute { absolute_fp, .. } => {
                *absolute_fp = fp.into();
                Ok(())
            }
            Self::Name { .. } | Self::Relative { .. } => {
                Err(CameraError::UnsupportedOperation(format!(
                    "{:?} image paths are resolved against the image directory",
                    self.fp_type()
                )))
            }
        }
    }

    /// Set the undistorted image path of the name and relative modes.
    pub fn set_undistorted_relative_fp(&mut self, fp: impl Into<PathBuf>) -> CameraResult<()> {
        match self {
            Self::Name { undistorted_relative_fp, .. }
            | Self::Relative { undistorted_relative_fp, .. } => {
                *undistorted_relative_fp = Some(fp.into());
                Ok(())
            }
            Self::Absolute { .. } => Err(CameraError::UnsupportedOperation(
                "absolute image paths have no relative undistorted path".to_string(),
            )),
        }
    }

    /// Set the undistorted image path of the absolute mode.
    ///
    /// Fails with [`CameraError::UnsupportedOperation`] in the name and
    /// relative modes.
    pub fn set_undistorted_absolute_fp(&mut self, fp: impl Into<PathBuf>) -> CameraResult<()> {
        match self {
            Self::Absolute { undistorted_absolute_fp, .. } => {
                *undistorted_absolute_fp = Some(fp.into());
                Ok(())
            }
            Self::Name { .. } | Self::Relative { .. } => Err(CameraError::UnsupportedOperation(
                format!("{:?} image paths have no absolute undistorted path", self.fp_type()),
            )),
        }
    }

    /// Get the image path relative to the image directory.
    ///
    /// In the absolute mode this is the absolute path.
    pub fn relative_fp(&self) -> CameraResult<PathBuf> {
        match self {
            Self::Name { relative_fp, .. } => file_name_of(relative_fp),
            Self::Relative { relative_fp, .. } => Ok(relative_fp.clone()),
            Self::Absolute { absolute_fp, .. } => Ok(absolute_fp.clone()),
        }
    }

    /// Get the resolved absolute image path.
    pub fn absolute_fp(&self) -> CameraResult<PathBuf> {
        match self {
            Self::Name { image_dir, relative_fp, .. } => {
                Ok(require(image_dir, "image_dir")?.join(file_name_of(relative_fp)?))
            }
            Self::Relative { image_dir, relative_fp, .. } => {
                Ok(require(image_dir, "image_dir")?.join(relative_fp))
            }
            Self::Absolute { absolute_fp, .. } => Ok(absolute_fp.clone()),
        }
    }

    /// Get the undistorted image path relative to the image directory.
    pub fn undistorted_relative_fp(&self) -> CameraResult<PathBuf> {
        match self {
            Self::Name { undistorted_relative_fp, .. } => {
                file_name_of(require(undistorted_relative_fp, "undistorted_relative_fp")?)
            }
            Self::Relative { undistorted_relative_fp, .. } => {
                Ok(require(undistorted_relative_fp, "undistorted_relative_fp")?.clone())
            }
            Self::Absolute { undistorted_absolute_fp, .. } => {
                Ok(require(undistorted_absolute_fp, "undistorted_absolute_fp")?.clone())
            }
        }
    }

    /// Get the resolved absolute path of the undistorted image.
    ///
    /// Not available in the absolute mode.
    pub fn undistorted_absolute_fp(&self) -> CameraResult<PathBuf> {
        match self {
            Self::Name { image_dir, undistorted_relative_fp, .. } => {
                let fp = require(undistorted_relative_fp, "undistorted_relative_fp")?;
                Ok(require(image_dir, "image_dir")?.join(file_name_of(fp)?))
            }
            Self::Relative { image_dir, undistorted_relative_fp, .. } => {
                let fp = require(undistorted_relative_fp, "undistorted_relative_fp")?;
                Ok(require(image_dir, "image_dir")?.join(fp))
            }
            Self::Absolute { .. } => Err(CameraError::UnsupportedOperation(
                "undistorted absolute paths are not resolved for absolute image paths".to_string(),
            )),
        }
    }

    /// Check that the undistorted image can be resolved and exists on disk.
    ///
    /// In the absolute mode the stored undistorted absolute path is checked.
    pub fn has_undistorted_absolute_fp(&self) -> bool {
        let fp = match self {
            Self::Name {
                image_dir: Some(dir),
                undistorted_relative_fp: Some(fp),
                ..
            } => file_name_of(fp).ok().map(|name| dir.join(name)),
            Self::Relative {
                image_dir: Some(dir),
                undistorted_relative_fp: Some(fp),
                ..
            } => Some(dir.join(fp)),
            Self::Absolute {
                undistorted_absolute_fp: Some(fp),
                ..
            } => Some(fp.clone()),
            _ => None,
        };
        fp.is_some_and(|fp| fp.is_file())
    }

    /// Get the file name of the resolved absolute image path.
    pub fn file_name(&self) -> CameraResult<PathBuf> {
        file_name_of(&self.absolute_fp()?)
    }
}
