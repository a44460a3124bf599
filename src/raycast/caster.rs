//! Per-layer ray casting in inverse-depth space.
//!
//! For an output coordinate `s2` the caster marches the viewing ray of the virtual camera through
//! the source layer's depth field. The source coordinate is linear in the source inverse depth:
//!
//! ```text
//! a        = P · (s2, 1)                      P = FSKR1 · FSKR2⁻¹
//! s1(invZ) = a.xy / a.z + invZ · (C.xy − C.z · a.xy / a.z)    C = FSKR1 · (C2 − C1)
//! invZ2    = invZ · a.z / (1 − invZ · C.z)
//! ```
//!
//! so `s1` is derived once per ray as a base point plus a slope and evaluated per sample.

use crate::camera::virtual_camera::VirtualCamera;
use crate::foundation::core::{DMat3, DVec3, Point, Vec2};
use crate::foundation::error::{LdiError, LdiResult};
use crate::foundation::math::{clamp01, inverse3};
use crate::scene::model::{DepthRange, Layer, View};

/// Fixed number of march iterations per ray.
pub const RAY_STEPS: u32 = 40;

/// A crossing whose depth jump exceeds this many base steps is a rubber-sheet edge.
pub const EDGE_GRADIENT_FACTOR: f64 = 2.0;

/// Width in source pixels of the confidence fade at the layer border.
///
/// Equal to the half-texel margin, so every texel center inside the layer is fully confident.
pub const BORDER_TAPER_PX: f64 = 0.5;

const TEXEL_CENTER_EPS: f64 = 1e-9;

/// Radius in source pixels of the matte probe used for layered views.
pub const MASK_DILATION_PX: f64 = 1.5;

/// Matte coverage below this counts as cut out.
pub const MASK_OPAQUE_THRESHOLD: f64 = 0.5;

const DIAG: f64 = std::f64::consts::FRAC_1_SQRT_2;
const MATTE_PROBES: [(f64, f64); 9] = [
    (0.0, 0.0),
    (1.0, 0.0),
    (-1.0, 0.0),
    (0.0, 1.0),
    (0.0, -1.0),
    (DIAG, DIAG),
    (DIAG, -DIAG),
    (-DIAG, DIAG),
    (-DIAG, -DIAG),
];

/// Result of casting one ray against one layer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RaySample {
    /// Straight color; the background color on a miss.
    pub color: DVec3,
    /// Coverage/confidence in `[0,1]`.
    pub alpha: f64,
    /// Inverse depth of the hit as seen from the virtual camera (`invZ2`).
    pub inv_depth: f64,
    /// Final source coordinate in `[0,1]²` texture space (may lie outside on a miss).
    pub uv: Point,
    /// Number of bisection refinements performed (never more than [`RAY_STEPS`]).
    pub refinements: u32,
    /// Whether a crossing was rejected as an occlusion edge.
    pub edge: bool,
}

impl RaySample {
    fn miss(background: DVec3, uv: Point, refinements: u32, edge: bool) -> Self {
        Self {
            color: background,
            alpha: 0.0,
            inv_depth: 0.0,
            uv,
            refinements,
            edge,
        }
    }
}

/// Relative projection between a virtual camera and one source layer.
///
/// Built once per draw and shared by every pixel of that draw.
#[derive(Clone, Copy, Debug)]
pub struct LayerProjection<'a> {
    layer: &'a Layer,
    p: DMat3,
    c: DVec3,
    range: DepthRange,
    layered: bool,
    reveal: f64,
    background: DVec3,
}

impl<'a> LayerProjection<'a> {
    /// Derive `P` and `C` for `layer` (owned by `view`) as seen from `camera`.
    ///
    /// `reveal` is the depth-reveal animation parameter in `[0,1]`; `1.0` shows every depth.
    pub fn new(
        layer: &'a Layer,
        view: &View,
        camera: &VirtualCamera,
        reveal: f64,
        background: DVec3,
    ) -> LdiResult<Self> {
        let fskr1 = layer.camera(view.orientation()).matrix();
        let fskr2 = camera.model().matrix();
        let inv2 = inverse3(fskr2)
            .ok_or_else(|| LdiError::setup("virtual camera transform is singular"))?;
        Ok(Self {
            layer,
            p: fskr1 * inv2,
            c: fskr1 * (camera.position - view.position()),
            range: layer.depth_range(),
            layered: view.is_layered(),
            reveal: clamp01(reveal),
            background,
        })
    }

    /// Relative projective map `P`.
    pub fn relative_map(&self) -> DMat3 {
        self.p
    }

    /// Relative translation `C`.
    pub fn relative_translation(&self) -> DVec3 {
        self.c
    }

    /// Cast the ray through centered output coordinate `s2`.
    pub fn cast(&self, s2: Point) -> RaySample {
        let a = self.p * DVec3::new(s2.x, s2.y, 1.0);
        if a.z <= 0.0 || !a.is_finite() {
            return RaySample::miss(self.background, to_uv(s2), 0, false);
        }

        let base = Point::new(a.x / a.z, a.y / a.z);
        let slope = Vec2::new(self.c.x - self.c.z * base.x, self.c.y - self.c.z * base.y);

        // RAY_STEPS samples from inv_z_min down to inv_z_max inclusive.
        let far = self.range.inv_z_max;
        let base_step = self.range.span() / f64::from(RAY_STEPS - 1);
        let edge_threshold = EDGE_GRADIENT_FACTOR * base_step;

        let mut d_inv = base_step;
        // Last position still in front of the surface.
        let mut inv_z = self.range.inv_z_min;
        let mut next = inv_z;
        let mut prev_sample: Option<f64> = None;
        let mut edge = false;
        let mut refinements = 0u32;

        for _ in 0..RAY_STEPS {
            let sampled = self.layer.sample_inv_depth(to_uv(base + slope * next));
            if sampled > next && self.inv_z2(a.z, next) >= 0.0 {
                if let Some(prev) = prev_sample
                    && (sampled - prev).abs() > edge_threshold
                {
                    edge = true;
                }
                d_inv *= 0.5;
                refinements += 1;
            } else {
                inv_z = next;
                prev_sample = Some(sampled);
            }
            next = (inv_z - d_inv).max(far);
        }

        let uv = to_uv(base + slope * inv_z);
        let inv_z2 = self.inv_z2(a.z, inv_z);
        let inside = (0.0..=1.0).contains(&uv.x) && (0.0..=1.0).contains(&uv.y);
        // Zero inverse depth is a surface at infinity; only negative values lie behind the camera.
        if !inside || inv_z2 < 0.0 || self.hidden_by_reveal(inv_z) {
            return RaySample::miss(self.background, uv, refinements, edge);
        }

        let mut alpha = if edge { 0.0 } else { self.border_taper(uv) };
        if self.layered && alpha > 0.0 && !self.matte_is_opaque(uv) {
            alpha = 0.0;
        }

        RaySample {
            color: self.layer.sample_color(uv),
            alpha,
            inv_depth: inv_z2,
            uv,
            refinements,
            edge,
        }
    }

    fn inv_z2(&self, a_z: f64, inv_z: f64) -> f64 {
        let denom = 1.0 - inv_z * self.c.z;
        if denom <= 0.0 {
            return -1.0;
        }
        inv_z * a_z / denom
    }

    /// `t = 1` reveals everything, including surfaces at infinity.
    fn hidden_by_reveal(&self, inv_z: f64) -> bool {
        self.reveal < 1.0 && inv_z <= self.range.inv_z_min * (1.0 - self.reveal)
    }

    /// Full confidence from the outermost texel centers inward, fading to zero at the border.
    fn border_taper(&self, uv: Point) -> f64 {
        let res = self.layer.resolution();
        let w = f64::from(res.width);
        let h = f64::from(res.height);
        let dist_px = (uv.x * w)
            .min((1.0 - uv.x) * w)
            .min(uv.y * h)
            .min((1.0 - uv.y) * h);
        clamp01((dist_px + TEXEL_CENTER_EPS) / BORDER_TAPER_PX)
    }

    /// `false` when any probe around `uv` falls on cut-out matte.
    fn matte_is_opaque(&self, uv: Point) -> bool {
        let res = self.layer.resolution();
        let rx = MASK_DILATION_PX / f64::from(res.width);
        let ry = MASK_DILATION_PX / f64::from(res.height);
        MATTE_PROBES.iter().all(|&(dx, dy)| {
            let probe = Point::new(uv.x + dx * rx, uv.y + dy * ry);
            self.layer.sample_coverage(probe) >= MASK_OPAQUE_THRESHOLD
        })
    }
}

fn to_uv(s: Point) -> Point {
    Point::new(s.x + 0.5, s.y + 0.5)
}

#[cfg(test)]
#[path = "../../tests/unit/raycast/caster.rs"]
mod tests;
