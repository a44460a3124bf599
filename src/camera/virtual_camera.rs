use crate::camera::model::{CameraModel, Orientation};
use crate::foundation::core::{DVec3, Resolution};
use crate::foundation::error::{LdiError, LdiResult};
use crate::scene::model::View;

/// Per-frame camera that a novel view is synthesized for. Never persisted.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VirtualCamera {
    /// Position `C2` in normalized camera space.
    pub position: DVec3,
    /// Skew, slant and roll of the synthesized frustum.
    pub orientation: Orientation,
    /// Focal length in output pixels.
    pub focal_px: f64,
    /// Output resolution.
    pub resolution: Resolution,
}

impl VirtualCamera {
    /// Camera identical to the view's base camera, rendered at `resolution`.
    ///
    /// The focal is rescaled so the horizontal field of view is preserved.
    pub fn from_view(view: &View, resolution: Resolution) -> Self {
        let scale = f64::from(resolution.width) / f64::from(view.resolution().width);
        Self {
            position: view.position(),
            orientation: view.orientation(),
            focal_px: view.focal_px() * scale,
            resolution,
        }
    }

    /// Same camera moved to `position`.
    pub fn with_position(mut self, position: DVec3) -> Self {
        self.position = position;
        self
    }

    /// Reject foci and positions the camera builder cannot handle.
    pub fn validate(&self) -> LdiResult<()> {
        if !self.focal_px.is_finite() || self.focal_px <= 0.0 {
            return Err(LdiError::validation(format!(
                "virtual camera focal must be > 0, got {}",
                self.focal_px
            )));
        }
        if !self.position.is_finite() {
            return Err(LdiError::validation("virtual camera position must be finite"));
        }
        Resolution::new(self.resolution.width, self.resolution.height)?;
        Ok(())
    }

    /// Pinhole model of this camera.
    pub fn model(&self) -> CameraModel {
        CameraModel::from_pixels(self.focal_px, self.resolution, self.orientation)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/camera/virtual_camera.rs"]
mod tests;
