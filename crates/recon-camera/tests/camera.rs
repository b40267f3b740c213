use std::path::{Path, PathBuf};

use approx::assert_abs_diff_eq;
use recon_camera::depth::{DepthMap, DepthMapSemantic, UnprojectParams};
use recon_camera::image_paths::ImageFpType;
use recon_camera::intrinsics::{compute_calibration_mat, RadialDistortion};
use recon_camera::{Camera, CameraError};

fn assert_vec3_eq(a: &[f64; 3], b: &[f64; 3]) {
    for i in 0..3 {
        assert_abs_diff_eq!(a[i], b[i], epsilon = 1e-9);
    }
}

// Half turn around the z axis.
const ROT_Z_PI: [[f64; 3]; 3] = [[-1.0, 0.0, 0.0], [0.0, -1.0, 0.0], [0.0, 0.0, 1.0]];

#[test]
fn translation_follows_center() -> Result<(), CameraError> {
    let mut camera = Camera::new();
    camera.set_rotation_mat(ROT_Z_PI, true)?;
    camera.set_center_after_rotation([1.0, 2.0, 3.0], true)?;
    assert_vec3_eq(&camera.translation_vec(), &[1.0, 2.0, -3.0]);

    camera.set_translation_after_rotation([1.0, 2.0, -3.0], true)?;
    assert_vec3_eq(&camera.camera_center(), &[1.0, 2.0, 3.0]);
    Ok(())
}

#[test]
fn cam_to_world_round_trip() -> Result<(), CameraError> {
    let mut camera = Camera::new();
    camera.set_quaternion([0.5f64.sqrt(), 0.0, 0.5f64.sqrt(), 0.0]);
    camera.set_center_after_rotation([-4.0, 0.5, 7.0], true)?;
    let cam_to_world = camera.get_4x4_cam_to_world();

    let mut other = Camera::new();
    other.set_4x4_cam_to_world(&cam_to_world, true)?;
    assert_vec3_eq(&other.camera_center(), &camera.camera_center());
    for (a, b) in other.rotation_mat().iter().zip(camera.rotation_mat()) {
        assert_vec3_eq(a, b);
    }
    for (a, b) in other.quaternion().iter().zip(camera.quaternion()) {
        assert_abs_diff_eq!(*a, b, epsilon = 1e-9);
    }
    Ok(())
}

#[test]
fn invalid_rotation_is_rejected() {
    let mut camera = Camera::new();
    let scaled = [[2.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];
    assert!(matches!(
        camera.set_rotation_mat(scaled, true),
        Err(CameraError::InvalidRotation(_))
    ));
    assert!(camera.set_rotation_mat(scaled, false).is_ok());
}

#[test]
fn field_of_view_of_wide_image() -> Result<(), CameraError> {
    let mut camera = Camera::new();
    camera.set_calibration(
        compute_calibration_mat(500.0, 500.0, 250.0),
        RadialDistortion::none(),
    );
    camera.set_image_size(1000, 500);
    assert!(camera.has_intrinsics());
    assert_abs_diff_eq!(
        camera.field_of_view()?,
        std::f64::consts::FRAC_PI_2,
        epsilon = 1e-6
    );
    Ok(())
}

#[test]
fn name_mode_resolves_against_image_dir() -> Result<(), CameraError> {
    let mut camera = Camera::new();
    camera.set_relative_fp("sub/img.png", ImageFpType::Name)?;
    camera.set_image_dir("/data")?;
    assert_eq!(camera.relative_fp()?, PathBuf::from("img.png"));
    assert_eq!(camera.absolute_fp()?, PathBuf::from("/data/img.png"));
    assert_eq!(camera.file_name()?, PathBuf::from("img.png"));
    Ok(())
}

#[test]
fn absolute_mode_paths() -> Result<(), CameraError> {
    let mut camera = Camera::new();
    camera.set_relative_fp("/x/y.png", ImageFpType::Absolute)?;
    assert_eq!(camera.relative_fp()?, PathBuf::from("/x/y.png"));
    assert_eq!(camera.absolute_fp()?, PathBuf::from("/x/y.png"));
    assert!(matches!(
        camera.undistorted_absolute_fp(),
        Err(CameraError::UnsupportedOperation(_))
    ));
    assert!(matches!(
        camera.set_image_dir("/data"),
        Err(CameraError::UnsupportedOperation(_))
    ));
    Ok(())
}

#[test]
fn undistorted_image_existence() -> Result<(), Box<dyn std::error::Error>> {
    let tmp_dir = tempfile::tempdir()?;
    std::fs::create_dir(tmp_dir.path().join("undistorted"))?;
    std::fs::write(tmp_dir.path().join("undistorted/img.png"), b"")?;

    let mut camera = Camera::new();
    camera.set_relative_fp("img.png", ImageFpType::Relative)?;
    camera.set_image_dir(tmp_dir.path())?;
    assert!(!camera.has_undistorted_absolute_fp());

    camera.set_undistorted_relative_fp("undistorted/img.png")?;
    assert!(camera.has_undistorted_absolute_fp());
    assert_eq!(
        camera.undistorted_absolute_fp()?,
        tmp_dir.path().join("undistorted/img.png")
    );
    Ok(())
}

fn pinhole_camera(width: usize, height: usize) -> Camera {
    let mut camera = Camera::new();
    camera.set_calibration(compute_calibration_mat(1.0, 1.0, 1.0), RadialDistortion::none());
    camera.set_image_size(width, height);
    camera
}

#[test]
fn depth_map_world_coords() -> Result<(), Box<dyn std::error::Error>> {
    let tmp_dir = tempfile::tempdir()?;
    let depth_fp = tmp_dir.path().join("depth.bin");
    std::fs::write(&depth_fp, b"")?;

    let mut camera = pinhole_camera(2, 1);
    camera.set_rotation_mat(ROT_Z_PI, true)?;
    camera.set_center_after_rotation([1.0, 2.0, 3.0], true)?;
    camera.set_depth_map(&depth_fp, DepthMapSemantic::WrtCanonicalVectors);

    let decoder = |path: &Path| -> Result<DepthMap, CameraError> {
        assert_eq!(path.file_name().and_then(|n| n.to_str()), Some("depth.bin"));
        DepthMap::new(2, 1, vec![0.0, 2.0])
    };

    let depth_map = camera.depth_map(&decoder)?.ok_or("depth map expected")?;
    assert_eq!(depth_map.shape(), (1, 2));

    let cloud = camera
        .depth_map_world_coords(&decoder, &UnprojectParams::default())?
        .ok_or("point cloud expected")?;
    assert_eq!(cloud.len(), 1);
    // pixel (1, 0) with depth 2: ray (-0.5, 0.5, 1) in camera coordinates
    assert_vec3_eq(&cloud.points()[0], &[2.0, 1.0, 5.0]);
    Ok(())
}

#[test]
fn depth_map_shape_mismatch() -> Result<(), Box<dyn std::error::Error>> {
    let tmp_dir = tempfile::tempdir()?;
    let depth_fp = tmp_dir.path().join("depth.bin");
    std::fs::write(&depth_fp, b"")?;

    let mut camera = pinhole_camera(4, 3);
    camera.set_depth_map(&depth_fp, DepthMapSemantic::WrtUnitVectors);
    let decoder = |_: &Path| DepthMap::new(3, 4, vec![1.0; 12]);

    let result = camera.depth_map_world_coords(&decoder, &UnprojectParams::default());
    assert!(matches!(
        result,
        Err(CameraError::DepthMapShapeMismatch {
            expected: (3, 4),
            actual: (4, 3)
        })
    ));
    Ok(())
}

#[test]
fn depth_map_decode_error_keeps_path() -> Result<(), Box<dyn std::error::Error>> {
    let tmp_dir = tempfile::tempdir()?;
    let depth_fp = tmp_dir.path().join("depth.bin");
    std::fs::write(&depth_fp, b"not a depth map")?;

    let mut camera = pinhole_camera(1, 1);
    camera.set_depth_map(&depth_fp, DepthMapSemantic::WrtUnitVectors);
    let decoder = |_: &Path| -> Result<DepthMap, String> { Err("bad header".to_string()) };

    match camera.depth_map(&decoder) {
        Err(CameraError::DepthMapDecode { path, source }) => {
            assert_eq!(path, depth_fp);
            assert_eq!(source.to_string(), "bad header");
        }
        other => panic!("unexpected result {other:?}"),
    }
    Ok(())
}

#[test]
fn depth_map_world_coords_preconditions() -> Result<(), Box<dyn std::error::Error>> {
    let tmp_dir = tempfile::tempdir()?;
    let depth_fp = tmp_dir.path().join("depth.bin");
    std::fs::write(&depth_fp, b"")?;
    let decoder = |_: &Path| DepthMap::new(2, 2, vec![1.0; 4]);

    // image size never set
    let mut camera = Camera::new();
    camera.set_calibration(compute_calibration_mat(1.0, 1.0, 1.0), RadialDistortion::none());
    camera.set_depth_map(&depth_fp, DepthMapSemantic::WrtCanonicalVectors);
    assert!(matches!(
        camera.depth_map_world_coords(&decoder, &UnprojectParams::default()),
        Err(CameraError::Precondition(_))
    ));

    // matching size but no usable calibration
    let mut camera = Camera::new();
    camera.set_image_size(2, 2);
    camera.set_depth_map(&depth_fp, DepthMapSemantic::WrtCanonicalVectors);
    assert!(!camera.has_intrinsics());
    assert!(matches!(
        camera.depth_map_world_coords(&decoder, &UnprojectParams::default()),
        Err(CameraError::Precondition(_))
    ));
    Ok(())
}
