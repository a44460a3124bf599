use super::*;

#[test]
fn colors_quantize_to_opaque_pixels() {
    let res = Resolution::new(2, 1).unwrap();
    let f = FrameRGBA::from_colors(
        res,
        &[DVec3::new(1.0, 0.0, 0.5), DVec3::new(-1.0, 2.0, 0.0)],
        Some(Eye::Left),
    );
    assert_eq!(f.data.len(), 8);
    assert_eq!(f.pixel(0, 0), Some([255, 0, 128, 255]));
    assert_eq!(f.pixel(1, 0), Some([0, 255, 0, 255]));
    assert_eq!(f.pixel(2, 0), None);
    assert_eq!(f.eye, Some(Eye::Left));
}

#[test]
fn converts_to_image() {
    let res = Resolution::new(3, 2).unwrap();
    let f = FrameRGBA::from_colors(res, &[DVec3::splat(0.2); 6], None);
    let img = f.to_image().unwrap();
    assert_eq!(img.dimensions(), (3, 2));
    assert_eq!(img.get_pixel(2, 1).0, [51, 51, 51, 255]);
}

#[test]
fn mismatched_data_is_rejected() {
    let f = FrameRGBA {
        width: 2,
        height: 2,
        data: vec![0; 4],
        eye: None,
    };
    assert!(f.to_image().is_err());
}
