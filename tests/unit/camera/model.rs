use super::*;

fn project(m: DMat3, d: DVec3) -> (f64, f64) {
    let h = m * d;
    (h.x / h.z, h.y / h.z)
}

#[test]
fn focal_is_aspect_corrected() {
    let res = Resolution::new(200, 100).unwrap();
    let cam = CameraModel::from_pixels(100.0, res, Orientation::default());
    assert_eq!(cam.fx, 0.5);
    assert_eq!(cam.fy, 1.0);
    let (x, y) = project(cam.matrix(), DVec3::new(1.0, 1.0, 4.0));
    assert!((x - 0.125).abs() < 1e-12);
    assert!((y - 0.25).abs() < 1e-12);
}

#[test]
fn skew_shifts_projection() {
    let m = skew_matrix(Vec2::new(0.1, -0.2));
    let (x, y) = project(m, DVec3::new(0.0, 0.0, 2.0));
    assert!((x + 0.1).abs() < 1e-12);
    assert!((y - 0.2).abs() < 1e-12);
}

#[test]
fn roll_quarter_turn_rotates_axes() {
    let m = roll_matrix(std::f64::consts::FRAC_PI_2);
    let v = m * DVec3::new(1.0, 0.0, 1.0);
    assert!(v.abs_diff_eq(DVec3::new(0.0, 1.0, 1.0), 1e-12));
}

#[test]
fn slant_maps_tilted_axis_onto_z() {
    let sl = Vec2::new(0.3, -0.4);
    let m = slant_matrix(sl);
    let axis = DVec3::new(sl.x, sl.y, 1.0).normalize();
    assert!((m * axis).abs_diff_eq(DVec3::Z, 1e-12));
    // rotation: orthonormal with unit determinant
    assert!((m * m.transpose()).abs_diff_eq(DMat3::IDENTITY, 1e-12));
    assert!((m.determinant() - 1.0).abs() < 1e-12);
}

#[test]
fn zero_orientation_is_pure_focal() {
    let res = Resolution::new(64, 64).unwrap();
    let cam = CameraModel::from_pixels(64.0, res, Orientation::default());
    assert!(cam.matrix().abs_diff_eq(DMat3::IDENTITY, 1e-12));
}
