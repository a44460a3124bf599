//! Synthetic layers shared by unit tests.

use image::{GrayImage, Luma, Rgba, RgbaImage};

use crate::foundation::core::Resolution;
use crate::scene::model::{DepthRange, Layer, View};
use crate::scene::sample::DepthImage;

pub(crate) fn range(min: f64, max: f64) -> DepthRange {
    DepthRange::new(min, max).unwrap()
}

pub(crate) fn layer_from_fn(
    res: Resolution,
    color: impl Fn(u32, u32) -> [u8; 4],
    depth: impl Fn(u32, u32) -> f32,
    mask: Option<&dyn Fn(u32, u32) -> u8>,
    depth_range: DepthRange,
) -> Layer {
    let color = RgbaImage::from_fn(res.width, res.height, |x, y| Rgba(color(x, y)));
    let inv_depth = DepthImage::from_fn(res.width, res.height, |x, y| Luma([depth(x, y)]));
    let mask = mask.map(|m| GrayImage::from_fn(res.width, res.height, |x, y| Luma([m(x, y)])));
    Layer::new(
        color,
        inv_depth,
        mask,
        f64::from(res.width),
        depth_range,
    )
    .unwrap()
}

pub(crate) fn solid_layer(
    res: Resolution,
    rgba: [u8; 4],
    depth: f32,
    depth_range: DepthRange,
) -> Layer {
    layer_from_fn(res, |_, _| rgba, |_, _| depth, None, depth_range)
}

pub(crate) fn single_view(layer: Layer) -> View {
    View::from_layer(layer).unwrap()
}
