use crate::foundation::core::DVec3;
use crate::foundation::math::smooth_toward;
use crate::render::opts::SmoothingOpts;

/// Exponential smoothing of a tracked head position with separate lateral and depth weights.
#[derive(Clone, Debug)]
pub struct PoseSmoother {
    opts: SmoothingOpts,
    last: Option<DVec3>,
}

impl PoseSmoother {
    pub fn new(opts: SmoothingOpts) -> Self {
        Self { opts, last: None }
    }

    /// Last smoothed position.
    pub fn last(&self) -> Option<DVec3> {
        self.last
    }

    /// Forget history; the next sample is taken as-is.
    pub fn reset(&mut self) {
        self.last = None;
    }

    /// Blend `sample` into the history. A missing sample reuses the last smoothed position.
    pub fn update(&mut self, sample: Option<DVec3>) -> Option<DVec3> {
        let next = match (self.last, sample) {
            (Some(prev), Some(s)) if s.is_finite() => Some(DVec3::new(
                smooth_toward(prev.x, s.x, self.opts.xy_weight),
                smooth_toward(prev.y, s.y, self.opts.xy_weight),
                smooth_toward(prev.z, s.z, self.opts.z_weight),
            )),
            (None, Some(s)) if s.is_finite() => Some(s),
            (prev, _) => {
                if prev.is_some() {
                    tracing::debug!("no usable viewpoint, reusing last smoothed pose");
                }
                prev
            }
        };
        self.last = next;
        next
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/smoothing.rs"]
mod tests;
