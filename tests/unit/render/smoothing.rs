use super::*;

#[test]
fn first_sample_is_taken_as_is() {
    let mut s = PoseSmoother::new(SmoothingOpts::default());
    assert_eq!(s.update(None), None);
    let p = DVec3::new(10.0, -5.0, 600.0);
    assert_eq!(s.update(Some(p)), Some(p));
}

#[test]
fn depth_moves_slower_than_lateral() {
    let mut s = PoseSmoother::new(SmoothingOpts::default());
    s.update(Some(DVec3::ZERO));
    let out = s.update(Some(DVec3::new(10.0, 20.0, 100.0))).unwrap();
    assert_eq!(out, DVec3::new(5.0, 10.0, 10.0));
}

#[test]
fn missing_and_invalid_samples_hold_the_pose() {
    let mut s = PoseSmoother::new(SmoothingOpts::default());
    let p = DVec3::new(1.0, 2.0, 3.0);
    s.update(Some(p));
    assert_eq!(s.update(None), Some(p));
    assert_eq!(s.update(Some(DVec3::new(f64::NAN, 0.0, 0.0))), Some(p));
    s.reset();
    assert_eq!(s.last(), None);
}
