//! The three refinement passes run for every eye of every frame.
//!
//! 1. primary: cast and composite one ray per pixel, keeping coverage, inverse depth and an
//!    auxiliary edge-detection channel next to the flattened color;
//! 2. multisample: re-cast four rotated-grid subpixel rays where the auxiliary channel jumps;
//! 3. edge blur: see [`crate::refine::edge_blur`].

use rayon::prelude::*;

use crate::composite::layers::{CompositeSample, LayerStack};
use crate::foundation::core::{DVec3, Resolution};
use crate::foundation::error::LdiResult;
use crate::foundation::math::clamp01;
use crate::refine::edge_blur::edge_blur;
use crate::render::frame::FrameRGBA;
use crate::render::params::DrawParams;
use crate::scene::model::View;

/// Auxiliary difference to a 4-neighbor that triggers subpixel re-casting.
pub const MULTISAMPLE_EDGE_THRESHOLD: f64 = 0.02;

/// Rotated-grid subpixel offsets, in pixels from the pixel center.
pub const SUBPIXEL_OFFSETS: [(f64, f64); 4] = [
    (-0.125, -0.375),
    (0.375, -0.125),
    (0.125, 0.375),
    (-0.375, 0.125),
];

/// Per-pixel output of the primary pass, row-major.
#[derive(Clone, Debug, PartialEq)]
pub struct PrimaryBuffers {
    /// Target resolution.
    pub resolution: Resolution,
    /// Straight color flattened onto the background.
    pub color: Vec<DVec3>,
    /// Composite coverage before flattening.
    pub coverage: Vec<f64>,
    /// Inverse depth of the front-most contributing layer.
    pub inv_depth: Vec<f64>,
    /// Edge-detection channel: normalized inverse depth or coverage.
    pub aux: Vec<f64>,
}

/// Evaluate `f(x, y)` into every element of a row-major buffer.
pub(crate) fn fill_rows<T: Send>(
    buf: &mut [T],
    width: u32,
    parallel: bool,
    f: impl Fn(u32, u32) -> T + Sync + Send,
) {
    let row = |(y, dst): (usize, &mut [T])| {
        for (x, px) in dst.iter_mut().enumerate() {
            *px = f(x as u32, y as u32);
        }
    };
    if parallel {
        buf.par_chunks_mut(width as usize).enumerate().for_each(row);
    } else {
        buf.chunks_mut(width as usize).enumerate().for_each(row);
    }
}

/// Pass 1.
///
/// `depth_norm` is the inverse depth mapped to `1.0` in the auxiliary channel when
/// `params.depth_in_alpha` is set.
pub fn primary_pass(stack: &LayerStack<'_>, params: &DrawParams, depth_norm: f64) -> PrimaryBuffers {
    let res = params.camera.resolution;
    let background = params.background;
    let mut samples = vec![CompositeSample::EMPTY; res.pixel_count()];
    fill_rows(&mut samples, res.width, params.parallel, |x, y| {
        stack.composite(res.pixel_to_plane(f64::from(x), f64::from(y)))
    });

    let aux = samples
        .iter()
        .map(|s| {
            if !params.depth_in_alpha {
                s.alpha
            } else if depth_norm > 0.0 {
                clamp01(s.inv_depth / depth_norm)
            } else {
                0.0
            }
        })
        .collect();
    PrimaryBuffers {
        resolution: res,
        color: samples.iter().map(|s| s.flatten(background)).collect(),
        coverage: samples.iter().map(|s| s.alpha).collect(),
        inv_depth: samples.iter().map(|s| s.inv_depth).collect(),
        aux,
    }
}

/// Whether any 4-neighbor of `(x, y)` differs in `aux` by more than
/// [`MULTISAMPLE_EDGE_THRESHOLD`].
pub fn needs_multisample(aux: &[f64], res: Resolution, x: u32, y: u32) -> bool {
    let w = res.width as usize;
    let i = y as usize * w + x as usize;
    let center = aux[i];
    let mut neighbors = [None; 4];
    if x > 0 {
        neighbors[0] = Some(i - 1);
    }
    if x + 1 < res.width {
        neighbors[1] = Some(i + 1);
    }
    if y > 0 {
        neighbors[2] = Some(i - w);
    }
    if y + 1 < res.height {
        neighbors[3] = Some(i + w);
    }
    neighbors
        .into_iter()
        .flatten()
        .any(|n| (aux[n] - center).abs() > MULTISAMPLE_EDGE_THRESHOLD)
}

/// Pass 2. Pixels away from auxiliary discontinuities keep their pass-1 color.
pub fn multisample_pass(
    stack: &LayerStack<'_>,
    params: &DrawParams,
    primary: &PrimaryBuffers,
) -> Vec<DVec3> {
    let res = primary.resolution;
    let background = params.background;
    let mut out = vec![DVec3::ZERO; res.pixel_count()];
    fill_rows(&mut out, res.width, params.parallel, |x, y| {
        let base = primary.color[y as usize * res.width as usize + x as usize];
        if !needs_multisample(&primary.aux, res, x, y) {
            return base;
        }
        let sum = SUBPIXEL_OFFSETS.iter().fold(base, |acc, &(dx, dy)| {
            let s2 = res.pixel_to_plane(f64::from(x) + dx, f64::from(y) + dy);
            acc + stack.composite(s2).flatten(background)
        });
        sum / (SUBPIXEL_OFFSETS.len() + 1) as f64
    });
    out
}

/// Run the passes selected by `params.mode` for one view and return an opaque frame.
#[tracing::instrument(skip_all, fields(eye = ?params.eye, mode = ?params.mode))]
pub fn render_view(view: &View, params: &DrawParams) -> LdiResult<FrameRGBA> {
    params.camera.validate()?;
    let stack = LayerStack::new(
        view,
        &params.camera,
        params.reveal,
        params.background.color(),
    )?;
    let primary = primary_pass(&stack, params, view.nearest_inv_depth());
    let res = primary.resolution;

    let color = if params.mode.multisamples() {
        multisample_pass(&stack, params, &primary)
    } else {
        primary.color.clone()
    };
    let color = if params.mode.blurs_edges() {
        edge_blur(&color, &primary.aux, res, params.parallel)
    } else {
        color
    };
    Ok(FrameRGBA::from_colors(res, &color, params.eye))
}

#[cfg(test)]
#[path = "../../tests/unit/refine/passes.rs"]
mod tests;
