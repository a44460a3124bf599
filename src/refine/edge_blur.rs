//! Edge-aware blur: a Gaussian whose radius grows with the density of nearby depth/coverage
//! discontinuities, hiding the stair-stepping left by the ray caster at occlusion boundaries.

use crate::foundation::core::{DVec3, Resolution};
use crate::refine::passes::fill_rows;

/// Auxiliary-channel difference that marks a neighbor as lying across an edge.
pub const EDGE_ALPHA_THRESHOLD: f64 = 0.05;

/// Half-width of the edge-count window (7×7).
pub const EDGE_WINDOW_RADIUS: u32 = 3;

/// Blur radius in pixels at full edge proximity.
pub const MAX_EDGE_BLUR_RADIUS_PX: f64 = 2.0;

/// Edge count at which proximity saturates.
const EDGE_COUNT_SATURATION: f64 = 24.0;

/// Proximities below this leave the pixel untouched.
const MIN_PROXIMITY: f64 = 1e-3;

/// Edge proximity of pixel `(x, y)` in `[0,1]`: `min(count / 24, 1)²` where `count` is the number
/// of window neighbors whose auxiliary value differs by more than [`EDGE_ALPHA_THRESHOLD`].
pub fn edge_proximity(aux: &[f64], res: Resolution, x: u32, y: u32) -> f64 {
    let w = res.width as i64;
    let h = res.height as i64;
    let r = i64::from(EDGE_WINDOW_RADIUS);
    let (cx, cy) = (i64::from(x), i64::from(y));
    let center = aux[(cy * w + cx) as usize];

    let mut count = 0u32;
    for ny in (cy - r).max(0)..=(cy + r).min(h - 1) {
        for nx in (cx - r).max(0)..=(cx + r).min(w - 1) {
            if (aux[(ny * w + nx) as usize] - center).abs() > EDGE_ALPHA_THRESHOLD {
                count += 1;
            }
        }
    }
    let p = (f64::from(count) / EDGE_COUNT_SATURATION).min(1.0);
    p * p
}

/// Normalized 1D Gaussian weights for a fractional `radius` (σ = radius / 2).
///
/// The half-width is `ceil(radius)`; a non-positive radius yields the identity kernel.
pub(crate) fn gaussian_kernel(radius: f64) -> Vec<f64> {
    if !radius.is_finite() || radius <= 0.0 {
        return vec![1.0];
    }
    let half = radius.ceil() as i32;
    let sigma = radius * 0.5;
    let denom = 2.0 * sigma * sigma;
    let weights: Vec<f64> = (-half..=half)
        .map(|i| {
            let x = f64::from(i);
            (-x * x / denom).exp()
        })
        .collect();
    let sum: f64 = weights.iter().sum();
    if sum <= 0.0 {
        return vec![1.0];
    }
    weights.into_iter().map(|w| w / sum).collect()
}

fn blur_pixel(color: &[DVec3], res: Resolution, x: u32, y: u32, kernel: &[f64]) -> DVec3 {
    let half = (kernel.len() / 2) as i64;
    let w = res.width as i64;
    let h = res.height as i64;
    let mut acc = DVec3::ZERO;
    for (ky, &wy) in kernel.iter().enumerate() {
        let sy = (i64::from(y) + ky as i64 - half).clamp(0, h - 1);
        for (kx, &wx) in kernel.iter().enumerate() {
            let sx = (i64::from(x) + kx as i64 - half).clamp(0, w - 1);
            acc += color[(sy * w + sx) as usize] * (wx * wy);
        }
    }
    acc
}

/// Blur `color` near discontinuities of `aux`; pixels far from any edge pass through unchanged.
pub fn edge_blur(color: &[DVec3], aux: &[f64], res: Resolution, parallel: bool) -> Vec<DVec3> {
    let mut out = vec![DVec3::ZERO; color.len()];
    fill_rows(&mut out, res.width, parallel, |x, y| {
        let p = edge_proximity(aux, res, x, y);
        if p < MIN_PROXIMITY {
            color[y as usize * res.width as usize + x as usize]
        } else {
            blur_pixel(color, res, x, y, &gaussian_kernel(p * MAX_EDGE_BLUR_RADIUS_PX))
        }
    });
    out
}

#[cfg(test)]
#[path = "../../tests/unit/refine/edge_blur.rs"]
mod tests;
