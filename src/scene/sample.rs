use image::{GrayImage, ImageBuffer, Luma, RgbaImage};

use crate::foundation::core::Point;

/// Single-channel `f32` image holding normalized inverse depth.
pub type DepthImage = ImageBuffer<Luma<f32>, Vec<f32>>;

/// Bilinear taps for `uv` on a `w×h` grid with clamp-to-edge addressing.
///
/// Texel centers sit at `(i + 0.5) / w`.
fn taps(w: u32, h: u32, uv: Point) -> [(u32, u32, f64); 4] {
    let x = uv.x * f64::from(w) - 0.5;
    let y = uv.y * f64::from(h) - 0.5;
    let x0 = x.floor();
    let y0 = y.floor();
    let fx = x - x0;
    let fy = y - y0;

    let max_x = i64::from(w) - 1;
    let max_y = i64::from(h) - 1;
    let cx = |v: f64| (v as i64).clamp(0, max_x) as u32;
    let cy = |v: f64| (v as i64).clamp(0, max_y) as u32;

    [
        (cx(x0), cy(y0), (1.0 - fx) * (1.0 - fy)),
        (cx(x0 + 1.0), cy(y0), fx * (1.0 - fy)),
        (cx(x0), cy(y0 + 1.0), (1.0 - fx) * fy),
        (cx(x0 + 1.0), cy(y0 + 1.0), fx * fy),
    ]
}

/// Straight RGBA in `[0,1]`.
pub(crate) fn sample_rgba(img: &RgbaImage, uv: Point) -> [f64; 4] {
    let mut acc = [0.0f64; 4];
    for (x, y, w) in taps(img.width(), img.height(), uv) {
        let px = img.get_pixel(x, y).0;
        for c in 0..4 {
            acc[c] += w * f64::from(px[c]);
        }
    }
    acc.map(|v| v / 255.0)
}

/// Normalized inverse depth in `[0,1]`.
pub(crate) fn sample_depth(img: &DepthImage, uv: Point) -> f64 {
    taps(img.width(), img.height(), uv)
        .iter()
        .map(|&(x, y, w)| w * f64::from(img.get_pixel(x, y).0[0]))
        .sum()
}

/// Mask coverage in `[0,1]`.
pub(crate) fn sample_gray(img: &GrayImage, uv: Point) -> f64 {
    taps(img.width(), img.height(), uv)
        .iter()
        .map(|&(x, y, w)| w * f64::from(img.get_pixel(x, y).0[0]))
        .sum::<f64>()
        / 255.0
}

#[cfg(test)]
#[path = "../../tests/unit/scene/sample.rs"]
mod tests;
