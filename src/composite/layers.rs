//! Front-to-back "over" accumulation of per-layer ray samples.

use crate::camera::virtual_camera::VirtualCamera;
use crate::foundation::core::{Background, DVec3, Point};
use crate::foundation::error::LdiResult;
use crate::foundation::math::clamp01;
use crate::raycast::caster::{LayerProjection, RaySample};
use crate::scene::model::View;

/// Premultiplied accumulation of one output sample.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CompositeSample {
    /// Premultiplied color.
    pub color: DVec3,
    /// Accumulated coverage in `[0,1]`.
    pub alpha: f64,
    /// Inverse depth of the front-most contributing layer; `0.0` when nothing contributed.
    pub inv_depth: f64,
}

impl CompositeSample {
    /// Nothing accumulated yet.
    pub const EMPTY: Self = Self {
        color: DVec3::ZERO,
        alpha: 0.0,
        inv_depth: 0.0,
    };

    /// Place `sample` behind everything accumulated so far.
    pub fn under(self, sample: &RaySample) -> Self {
        let a = clamp01(sample.alpha);
        if a <= 0.0 {
            return self;
        }
        let remaining = 1.0 - self.alpha;
        Self {
            color: self.color + sample.color * (remaining * a),
            alpha: (a + self.alpha * (1.0 - a)).min(1.0),
            inv_depth: if self.alpha > 0.0 {
                self.inv_depth
            } else {
                sample.inv_depth
            },
        }
    }

    /// `true` once nothing behind can contribute.
    pub fn is_opaque(&self) -> bool {
        self.alpha >= 1.0
    }

    /// Opaque color after compositing over `background`.
    pub fn flatten(&self, background: Background) -> DVec3 {
        self.color + background.premultiplied() * (1.0 - clamp01(self.alpha))
    }
}

/// Per-draw projections of every layer of a view, front to back.
#[derive(Clone, Debug)]
pub struct LayerStack<'a> {
    projections: Vec<LayerProjection<'a>>,
}

impl<'a> LayerStack<'a> {
    /// Derive a projection per layer of `view` for `camera`.
    pub fn new(
        view: &'a View,
        camera: &VirtualCamera,
        reveal: f64,
        background: DVec3,
    ) -> LdiResult<Self> {
        let projections = view
            .layers()
            .iter()
            .map(|layer| LayerProjection::new(layer, view, camera, reveal, background))
            .collect::<LdiResult<Vec<_>>>()?;
        Ok(Self { projections })
    }

    /// Number of layers.
    pub fn len(&self) -> usize {
        self.projections.len()
    }

    /// `true` for a stack without layers.
    pub fn is_empty(&self) -> bool {
        self.projections.is_empty()
    }

    /// Cast and composite every layer for centered output coordinate `s2`.
    pub fn composite(&self, s2: Point) -> CompositeSample {
        let mut acc = CompositeSample::EMPTY;
        for proj in &self.projections {
            acc = acc.under(&proj.cast(s2));
            if acc.is_opaque() {
                break;
            }
        }
        acc
    }
}

#[cfg(test)]
#[path = "../../tests/unit/composite/layers.rs"]
mod tests;
