use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::display::resolver::DisplayOpts;
use crate::foundation::core::{Background, Resolution};
use crate::foundation::error::{LdiError, LdiResult};
use crate::refine::quality::{QualityOpts, RefineMode};

/// Viewpoint smoothing weights; each is the share given to the newest sample.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SmoothingOpts {
    /// Lateral (x, y) weight.
    pub xy_weight: f64,
    /// Depth (z) weight.
    pub z_weight: f64,
}

impl Default for SmoothingOpts {
    fn default() -> Self {
        Self {
            xy_weight: 0.5,
            z_weight: 0.1,
        }
    }
}

/// Renderer configuration, loadable from JSON.
///
/// Every field has a default, so `{}` is a valid configuration.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RenderOpts {
    pub background: Background,
    /// Depth-reveal parameter in `[0,1]`.
    pub reveal: f64,
    /// Detect edges on normalized inverse depth rather than coverage.
    pub depth_in_alpha: bool,
    /// Fixed refinement mode; `None` lets the quality controller choose per frame.
    pub refine_mode: Option<RefineMode>,
    /// Evaluate pixel rows on rayon.
    pub parallel: bool,
    /// Size of a dedicated rayon pool; `None` uses the global pool.
    pub threads: Option<usize>,
    /// Output size for 2D and multi-view frames; `None` uses the view's own resolution.
    pub output: Option<Resolution>,
    pub quality: QualityOpts,
    pub smoothing: SmoothingOpts,
    pub display: DisplayOpts,
}

impl Default for RenderOpts {
    fn default() -> Self {
        Self {
            background: Background::default(),
            reveal: 1.0,
            depth_in_alpha: true,
            refine_mode: None,
            parallel: false,
            threads: None,
            output: None,
            quality: QualityOpts::default(),
            smoothing: SmoothingOpts::default(),
            display: DisplayOpts::default(),
        }
    }
}

impl RenderOpts {
    pub fn from_reader(r: impl std::io::Read) -> LdiResult<Self> {
        serde_json::from_reader(r).map_err(|e| LdiError::serde(format!("render options: {e}")))
    }

    pub fn from_path(path: impl AsRef<Path>) -> LdiResult<Self> {
        let path = path.as_ref();
        let f = File::open(path)
            .map_err(|e| LdiError::asset(format!("open options '{}': {e}", path.display())))?;
        Self::from_reader(BufReader::new(f))
    }

    /// Apply `LDIVIEW_REFINE_MODE` and `LDIVIEW_PARALLEL` from the process environment.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|k| std::env::var(k).ok())
    }

    /// Apply overrides from `lookup`; unparsable values are ignored with a warning.
    pub fn with_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(v) = lookup("LDIVIEW_REFINE_MODE") {
            match v.parse::<RefineMode>() {
                Ok(mode) => self.refine_mode = Some(mode),
                Err(e) => tracing::warn!(value = %v, error = %e, "ignoring LDIVIEW_REFINE_MODE"),
            }
        }
        if let Some(v) = lookup("LDIVIEW_PARALLEL") {
            match v.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => self.parallel = true,
                "0" | "false" | "no" | "off" => self.parallel = false,
                _ => tracing::warn!(value = %v, "ignoring LDIVIEW_PARALLEL"),
            }
        }
        self
    }

    pub fn validate(&self) -> LdiResult<()> {
        if !(0.0..=1.0).contains(&self.reveal) {
            return Err(LdiError::validation(format!(
                "reveal must be in [0, 1], got {}",
                self.reveal
            )));
        }
        if self.threads == Some(0) {
            return Err(LdiError::validation("threads must be >= 1 when set"));
        }
        if let Some(out) = self.output {
            Resolution::new(out.width, out.height)?;
        }
        for (name, w) in [
            ("xy_weight", self.smoothing.xy_weight),
            ("z_weight", self.smoothing.z_weight),
        ] {
            if !(w > 0.0 && w <= 1.0) {
                return Err(LdiError::validation(format!(
                    "smoothing {name} must be in (0, 1], got {w}"
                )));
            }
        }
        self.quality.validate()?;
        self.display.validate()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/opts.rs"]
mod tests;
