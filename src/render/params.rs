use crate::camera::virtual_camera::VirtualCamera;
use crate::foundation::core::{Background, Eye};
use crate::refine::quality::RefineMode;

/// Everything one draw of one eye needs, fixed before the first pixel is cast.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawParams {
    /// Camera the view is synthesized for.
    pub camera: VirtualCamera,
    /// Eye the output belongs to; `None` for 2D and multi-view output.
    pub eye: Option<Eye>,
    /// Fill for uncovered pixels. Its alpha is ignored; output is always opaque.
    pub background: Background,
    /// Depth-reveal parameter in `[0,1]`.
    pub reveal: f64,
    /// Drive edge detection from normalized inverse depth instead of coverage.
    pub depth_in_alpha: bool,
    /// Refinement passes to run.
    pub mode: RefineMode,
    /// Evaluate rows on the rayon pool.
    pub parallel: bool,
}

impl DrawParams {
    /// Defaults for `camera`: full reveal, depth-driven edges, all passes, sequential.
    pub fn new(camera: VirtualCamera) -> Self {
        Self {
            camera,
            eye: None,
            background: Background::default(),
            reveal: 1.0,
            depth_in_alpha: true,
            mode: RefineMode::Full,
            parallel: false,
        }
    }
}
