//! Frame-time driven selection of the refinement passes.

use std::str::FromStr;

use crate::foundation::error::{LdiError, LdiResult};

/// Which refinement passes run for a frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefineMode {
    /// Primary cast, multisampling and edge blur.
    #[default]
    Full,
    /// Primary cast and edge blur.
    BlurOnly,
    /// Primary cast only.
    Bypass,
}

impl RefineMode {
    fn rank(self) -> u8 {
        match self {
            Self::Bypass => 0,
            Self::BlurOnly => 1,
            Self::Full => 2,
        }
    }

    fn from_rank(rank: u8) -> Self {
        match rank {
            0 => Self::Bypass,
            1 => Self::BlurOnly,
            _ => Self::Full,
        }
    }

    /// One mode cheaper; `Bypass` stays.
    pub fn step_down(self) -> Self {
        Self::from_rank(self.rank().saturating_sub(1))
    }

    /// One mode richer, never above `max`.
    pub fn step_up(self, max: Self) -> Self {
        Self::from_rank((self.rank() + 1).min(max.rank()))
    }

    /// Whether pass 2 runs.
    pub fn multisamples(self) -> bool {
        self == Self::Full
    }

    /// Whether pass 3 runs.
    pub fn blurs_edges(self) -> bool {
        self != Self::Bypass
    }
}

impl FromStr for RefineMode {
    type Err = LdiError;

    fn from_str(s: &str) -> LdiResult<Self> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "full" => Ok(Self::Full),
            "blur_only" | "blur" => Ok(Self::BlurOnly),
            "bypass" | "off" => Ok(Self::Bypass),
            other => Err(LdiError::validation(format!(
                "unknown refine mode '{other}' (expected full, blur_only or bypass)"
            ))),
        }
    }
}

/// Thresholds of the [`QualityController`]. Ratios are relative to `target_frame_ms`.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct QualityOpts {
    /// Frame budget in milliseconds.
    pub target_frame_ms: f64,
    /// Weight of the newest frame in the moving average.
    pub ema_weight: f64,
    /// A single frame slower than this drops straight to `Bypass`.
    pub panic_ratio: f64,
    /// Average above this steps down.
    pub degrade_ratio: f64,
    /// Average below this counts toward stepping up.
    pub upgrade_ratio: f64,
    /// Consecutive fast frames needed to step up.
    pub recovery_frames: u32,
    /// Frames a mode is kept before a gradual step down.
    pub min_hold_frames: u32,
    /// Richest mode the controller may select.
    pub max_mode: RefineMode,
}

impl Default for QualityOpts {
    fn default() -> Self {
        Self {
            target_frame_ms: 1000.0 / 60.0,
            ema_weight: 0.1,
            panic_ratio: 2.0,
            degrade_ratio: 1.1,
            upgrade_ratio: 0.75,
            recovery_frames: 30,
            min_hold_frames: 10,
            max_mode: RefineMode::Full,
        }
    }
}

impl QualityOpts {
    /// Reject thresholds that cannot form a hysteresis band.
    pub fn validate(&self) -> LdiResult<()> {
        if !self.target_frame_ms.is_finite() || self.target_frame_ms <= 0.0 {
            return Err(LdiError::validation("quality target_frame_ms must be > 0"));
        }
        if !(self.ema_weight > 0.0 && self.ema_weight <= 1.0) {
            return Err(LdiError::validation("quality ema_weight must be in (0, 1]"));
        }
        if !(self.upgrade_ratio < self.degrade_ratio && self.degrade_ratio <= self.panic_ratio) {
            return Err(LdiError::validation(
                "quality ratios must satisfy upgrade < degrade <= panic",
            ));
        }
        Ok(())
    }
}

/// Picks a [`RefineMode`] per frame from measured frame times.
#[derive(Clone, Debug)]
pub struct QualityController {
    opts: QualityOpts,
    mode: RefineMode,
    ema_ms: Option<f64>,
    frames_in_mode: u32,
    fast_frames: u32,
}

impl QualityController {
    /// Start at the configured maximum mode.
    pub fn new(opts: QualityOpts) -> Self {
        let mode = opts.max_mode;
        Self {
            opts,
            mode,
            ema_ms: None,
            frames_in_mode: 0,
            fast_frames: 0,
        }
    }

    /// Mode for the next frame.
    pub fn mode(&self) -> RefineMode {
        self.mode
    }

    /// Moving average of observed frame times.
    pub fn average_ms(&self) -> Option<f64> {
        self.ema_ms
    }

    /// Feed the duration of the last frame and return the mode for the next one.
    ///
    /// Non-finite or non-positive durations are ignored.
    pub fn observe(&mut self, frame_ms: f64) -> RefineMode {
        if !frame_ms.is_finite() || frame_ms <= 0.0 {
            return self.mode;
        }
        let o = &self.opts;
        let ema = match self.ema_ms {
            Some(prev) => prev + o.ema_weight * (frame_ms - prev),
            None => frame_ms,
        };
        self.ema_ms = Some(ema);
        self.frames_in_mode = self.frames_in_mode.saturating_add(1);

        let target = o.target_frame_ms;
        if frame_ms > target * o.panic_ratio {
            self.fast_frames = 0;
            if self.mode != RefineMode::Bypass {
                tracing::warn!(frame_ms, target, "frame over panic budget, bypassing refinement");
                self.switch(RefineMode::Bypass);
            }
        } else if ema > target * o.degrade_ratio {
            self.fast_frames = 0;
            if self.frames_in_mode >= o.min_hold_frames && self.mode != RefineMode::Bypass {
                let next = self.mode.step_down();
                tracing::info!(ema_ms = ema, from = ?self.mode, to = ?next, "reducing refinement");
                self.switch(next);
            }
        } else if ema < target * o.upgrade_ratio {
            self.fast_frames += 1;
            if self.fast_frames >= o.recovery_frames && self.mode != o.max_mode {
                let next = self.mode.step_up(o.max_mode);
                tracing::info!(ema_ms = ema, from = ?self.mode, to = ?next, "restoring refinement");
                self.switch(next);
            }
        } else {
            self.fast_frames = 0;
        }
        self.mode
    }

    fn switch(&mut self, mode: RefineMode) {
        self.mode = mode;
        self.frames_in_mode = 0;
        self.fast_frames = 0;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/refine/quality.rs"]
mod tests;
