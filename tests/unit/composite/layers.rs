use super::*;
use crate::camera::model::Orientation;
use crate::foundation::core::{Background, Resolution};
use crate::test_support::{layer_from_fn, range, solid_layer};

fn ray(color: DVec3, alpha: f64, inv_depth: f64) -> RaySample {
    RaySample {
        color,
        alpha,
        inv_depth,
        uv: Point::new(0.5, 0.5),
        refinements: 0,
        edge: false,
    }
}

#[test]
fn first_layer_is_premultiplied() {
    let c = CompositeSample::EMPTY.under(&ray(DVec3::new(1.0, 0.5, 0.0), 0.5, 0.3));
    assert_eq!(c.color, DVec3::new(0.5, 0.25, 0.0));
    assert_eq!(c.alpha, 0.5);
    assert_eq!(c.inv_depth, 0.3);
}

#[test]
fn alpha_is_monotonic_and_saturates() {
    let mut acc = CompositeSample::EMPTY;
    let mut prev = 0.0;
    for a in [0.3, 0.0, 0.7, 0.9, 1.0, 0.4] {
        acc = acc.under(&ray(DVec3::ONE, a, 0.1));
        assert!(acc.alpha >= prev);
        assert!(acc.alpha <= 1.0);
        prev = acc.alpha;
    }
    assert!(acc.is_opaque());
}

#[test]
fn front_most_contributor_owns_depth() {
    let acc = CompositeSample::EMPTY
        .under(&ray(DVec3::ZERO, 0.0, 0.9))
        .under(&ray(DVec3::ONE, 0.4, 0.5))
        .under(&ray(DVec3::ONE, 1.0, 0.2));
    assert_eq!(acc.inv_depth, 0.5);
}

#[test]
fn hidden_layers_do_not_change_color() {
    let front = CompositeSample::EMPTY.under(&ray(DVec3::new(1.0, 0.0, 0.0), 1.0, 0.5));
    let after = front.under(&ray(DVec3::new(0.0, 0.0, 1.0), 1.0, 0.2));
    assert_eq!(front, after);
}

#[test]
fn flatten_fills_remaining_coverage_with_background() {
    let bg = Background {
        rgba: [0, 255, 0, 255],
    };
    assert_eq!(CompositeSample::EMPTY.flatten(bg), DVec3::new(0.0, 1.0, 0.0));

    let half = CompositeSample::EMPTY.under(&ray(DVec3::new(1.0, 0.0, 0.0), 0.5, 0.5));
    let out = half.flatten(bg);
    assert!((out - DVec3::new(0.5, 0.5, 0.0)).length() < 1e-12);
}

#[test]
fn translucent_background_is_weighted_by_its_alpha() {
    let bg = Background {
        rgba: [255, 255, 255, 51],
    };
    let empty = CompositeSample::EMPTY.flatten(bg);
    assert!((empty - DVec3::splat(0.2)).length() < 1e-12);

    let half = CompositeSample::EMPTY.under(&ray(DVec3::new(1.0, 0.0, 0.0), 0.5, 0.5));
    let out = half.flatten(bg);
    assert!((out - DVec3::new(0.6, 0.1, 0.1)).length() < 1e-12);

    let opaque = CompositeSample::EMPTY.under(&ray(DVec3::new(0.0, 0.0, 1.0), 1.0, 0.5));
    assert_eq!(opaque.flatten(bg), DVec3::new(0.0, 0.0, 1.0));
}

#[test]
fn stack_shows_back_layer_through_cut_matte() {
    let r = Resolution::new(32, 32).unwrap();
    let front = layer_from_fn(
        r,
        |_, _| [255, 0, 0, 255],
        |_, _| 0.5,
        Some(&|x, _| if x < 16 { 255 } else { 0 }),
        range(0.1, 0.0),
    );
    let back = solid_layer(r, [0, 0, 255, 255], 0.2, range(0.05, 0.0));
    let view = View::new(vec![front, back], DVec3::ZERO, Orientation::default(), 32.0, r).unwrap();
    let camera = VirtualCamera::from_view(&view, r);
    let stack = LayerStack::new(&view, &camera, 1.0, DVec3::ZERO).unwrap();
    assert_eq!(stack.len(), 2);

    let left = stack.composite(r.pixel_to_plane(8.0, 16.0));
    assert!((left.color - DVec3::new(1.0, 0.0, 0.0)).length() < 1e-9);
    assert!((left.inv_depth - 0.05).abs() < 1e-3);

    let right = stack.composite(r.pixel_to_plane(24.0, 16.0));
    assert!((right.color - DVec3::new(0.0, 0.0, 1.0)).length() < 1e-9);
    assert!((right.inv_depth - 0.01).abs() < 1e-3);
    assert!(right.is_opaque());
}
