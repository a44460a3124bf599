use super::*;
use crate::test_support::{range, solid_layer};

fn res(w: u32, h: u32) -> Resolution {
    Resolution::new(w, h).unwrap()
}

#[test]
fn depth_range_enforces_ordering() {
    assert!(DepthRange::new(0.1, 0.0).is_ok());
    assert!(DepthRange::new(0.1, 0.1).is_ok());
    assert!(DepthRange::new(0.0, 0.1).is_err());
    assert!(DepthRange::new(0.1, -0.01).is_err());
    assert!(DepthRange::new(f64::NAN, 0.0).is_err());
}

#[test]
fn depth_range_denormalizes_without_rescaling() {
    let r = range(0.1, 0.02);
    assert!((r.denormalize(0.0) - 0.02).abs() < 1e-12);
    assert!((r.denormalize(1.0) - 0.1).abs() < 1e-12);
    assert!((r.span() - 0.08).abs() < 1e-12);
}

#[test]
fn layer_rejects_degenerate_focal() {
    let color = RgbaImage::new(4, 4);
    let depth = DepthImage::new(4, 4);
    assert!(Layer::new(color.clone(), depth.clone(), None, 0.0, range(1.0, 0.0)).is_err());
    assert!(Layer::new(color, depth, None, f64::INFINITY, range(1.0, 0.0)).is_err());
}

#[test]
fn layer_rejects_struct_literal_range_with_bad_order() {
    let bad = DepthRange {
        inv_z_min: 0.0,
        inv_z_max: 1.0,
    };
    let err = Layer::new(RgbaImage::new(2, 2), DepthImage::new(2, 2), None, 2.0, bad);
    assert!(err.is_err());
}

#[test]
fn coverage_falls_back_to_color_alpha() {
    let layer = solid_layer(res(4, 4), [10, 20, 30, 0], 0.5, range(1.0, 0.0));
    assert!(!layer.has_mask());
    assert_eq!(layer.sample_coverage(Point::new(0.5, 0.5)), 0.0);
}

#[test]
fn view_layer_count_is_bounded() {
    let mk = || solid_layer(res(4, 4), [0, 0, 0, 255], 0.5, range(1.0, 0.0));
    assert!(View::new(vec![], DVec3::ZERO, Orientation::default(), 4.0, res(4, 4)).is_err());
    let five: Vec<Layer> = (0..5).map(|_| mk()).collect();
    assert!(View::new(five, DVec3::ZERO, Orientation::default(), 4.0, res(4, 4)).is_ok());
    let six: Vec<Layer> = (0..6).map(|_| mk()).collect();
    assert!(View::new(six, DVec3::ZERO, Orientation::default(), 4.0, res(4, 4)).is_err());
}

#[test]
fn stereo_scene_routes_eyes_to_views() {
    let left = View::from_layer(solid_layer(res(4, 4), [255, 0, 0, 255], 0.5, range(0.2, 0.0)))
        .unwrap();
    let right = View::from_layer(solid_layer(res(4, 4), [0, 0, 255, 255], 0.5, range(0.3, 0.0)))
        .unwrap();
    let scene = LayeredScene::stereo(left, right);
    assert!(scene.is_stereo());
    assert_eq!(
        scene.view_for(Some(Eye::Right)).layers()[0]
            .depth_range()
            .inv_z_min,
        0.3
    );
    assert_eq!(scene.view_for(Some(Eye::Left)).nearest_inv_depth(), 0.2);
    assert_eq!(scene.view_for(None).nearest_inv_depth(), 0.2);
    assert!((scene.nearest_inv_depth() - 0.3).abs() < 1e-12);
}

#[test]
fn from_views_rejects_three_views() {
    let mk = || {
        View::from_layer(solid_layer(res(2, 2), [0, 0, 0, 255], 0.0, range(0.1, 0.0))).unwrap()
    };
    assert!(LayeredScene::from_views(vec![mk(), mk(), mk()]).is_err());
    assert!(!LayeredScene::from_views(vec![mk()]).unwrap().is_stereo());
}
