use image::{GrayImage, RgbaImage};

use crate::camera::model::{CameraModel, Orientation};
use crate::foundation::core::{DVec3, Eye, Point, Resolution};
use crate::foundation::error::{LdiError, LdiResult};
use crate::scene::sample::{DepthImage, sample_depth, sample_gray, sample_rgba};

/// Upper bound on the number of layers a view may carry.
pub const MAX_LAYERS: usize = 5;

/// Inverse-depth range of a layer: `inv_z_min` is the nearest value, `inv_z_max` the farthest.
///
/// Larger inverse depth is nearer. The range is kept exactly as loaded; reprojection math runs
/// directly against it.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DepthRange {
    /// Nearest inverse depth (normalized depth sample `1.0`).
    pub inv_z_min: f64,
    /// Farthest inverse depth (normalized depth sample `0.0`).
    pub inv_z_max: f64,
}

impl DepthRange {
    /// Create a validated range with `inv_z_min >= inv_z_max >= 0`.
    pub fn new(inv_z_min: f64, inv_z_max: f64) -> LdiResult<Self> {
        if !inv_z_min.is_finite() || !inv_z_max.is_finite() {
            return Err(LdiError::validation("depth range must be finite"));
        }
        if inv_z_max < 0.0 {
            return Err(LdiError::validation("depth range inv_z_max must be >= 0"));
        }
        if inv_z_min < inv_z_max {
            return Err(LdiError::validation(format!(
                "depth range requires inv_z_min >= inv_z_max, got {inv_z_min} < {inv_z_max}"
            )));
        }
        Ok(Self {
            inv_z_min,
            inv_z_max,
        })
    }

    /// `inv_z_min - inv_z_max`.
    pub fn span(self) -> f64 {
        self.inv_z_min - self.inv_z_max
    }

    /// Map a normalized depth sample in `[0,1]` to inverse depth.
    pub fn denormalize(self, d: f64) -> f64 {
        self.inv_z_max + d * self.span()
    }
}

/// One color+depth layer of a view. Immutable after construction.
#[derive(Clone, Debug)]
pub struct Layer {
    color: RgbaImage,
    inv_depth: DepthImage,
    mask: Option<GrayImage>,
    focal_px: f64,
    depth_range: DepthRange,
}

impl Layer {
    /// Create a layer from decoded sample sources.
    ///
    /// The depth map and mask may use a different resolution than the color image; they are
    /// sampled in normalized coordinates.
    pub fn new(
        color: RgbaImage,
        inv_depth: DepthImage,
        mask: Option<GrayImage>,
        focal_px: f64,
        depth_range: DepthRange,
    ) -> LdiResult<Self> {
        if color.width() == 0 || color.height() == 0 {
            return Err(LdiError::validation("layer color image must be non-empty"));
        }
        if inv_depth.width() == 0 || inv_depth.height() == 0 {
            return Err(LdiError::validation("layer depth map must be non-empty"));
        }
        if let Some(m) = &mask
            && (m.width() == 0 || m.height() == 0)
        {
            return Err(LdiError::validation("layer mask must be non-empty"));
        }
        if !focal_px.is_finite() || focal_px <= 0.0 {
            return Err(LdiError::validation(format!(
                "layer focal must be > 0, got {focal_px}"
            )));
        }
        // Re-run range validation for ranges built with a struct literal.
        let depth_range = DepthRange::new(depth_range.inv_z_min, depth_range.inv_z_max)?;
        Ok(Self {
            color,
            inv_depth,
            mask,
            focal_px,
            depth_range,
        })
    }

    /// Color image resolution.
    pub fn resolution(&self) -> Resolution {
        Resolution {
            width: self.color.width(),
            height: self.color.height(),
        }
    }

    /// Focal length in pixels of the color image.
    pub fn focal_px(&self) -> f64 {
        self.focal_px
    }

    /// Inverse-depth range.
    pub fn depth_range(&self) -> DepthRange {
        self.depth_range
    }

    /// Whether an explicit occlusion mask was supplied.
    pub fn has_mask(&self) -> bool {
        self.mask.is_some()
    }

    /// Camera of this layer under the owning view's orientation.
    pub fn camera(&self, orientation: Orientation) -> CameraModel {
        CameraModel::from_pixels(self.focal_px, self.resolution(), orientation)
    }

    pub(crate) fn sample_color(&self, uv: Point) -> DVec3 {
        let px = sample_rgba(&self.color, uv);
        DVec3::new(px[0], px[1], px[2])
    }

    /// Inverse depth (denormalized against the layer's range).
    pub(crate) fn sample_inv_depth(&self, uv: Point) -> f64 {
        self.depth_range
            .denormalize(sample_depth(&self.inv_depth, uv))
    }

    /// Matte coverage: the mask when present, the color alpha otherwise.
    pub(crate) fn sample_coverage(&self, uv: Point) -> f64 {
        match &self.mask {
            Some(mask) => sample_gray(mask, uv),
            None => sample_rgba(&self.color, uv)[3],
        }
    }
}

/// A viewpoint of the scene: ordered front-to-back layers plus the base camera.
#[derive(Clone, Debug)]
pub struct View {
    layers: Vec<Layer>,
    position: DVec3,
    orientation: Orientation,
    focal_px: f64,
    resolution: Resolution,
}

impl View {
    /// Create a validated view.
    ///
    /// `position` is `C1` in normalized camera space (one unit = one stereo baseline).
    pub fn new(
        layers: Vec<Layer>,
        position: DVec3,
        orientation: Orientation,
        focal_px: f64,
        resolution: Resolution,
    ) -> LdiResult<Self> {
        if layers.is_empty() {
            return Err(LdiError::validation("view must have at least one layer"));
        }
        if layers.len() > MAX_LAYERS {
            return Err(LdiError::validation(format!(
                "view has {} layers, at most {MAX_LAYERS} are supported",
                layers.len()
            )));
        }
        if !focal_px.is_finite() || focal_px <= 0.0 {
            return Err(LdiError::validation(format!(
                "view focal must be > 0, got {focal_px}"
            )));
        }
        if !position.is_finite() {
            return Err(LdiError::validation("view position must be finite"));
        }
        let resolution = Resolution::new(resolution.width, resolution.height)?;
        Ok(Self {
            layers,
            position,
            orientation,
            focal_px,
            resolution,
        })
    }

    /// Single-layer view whose base camera matches the layer, placed at the origin.
    pub fn from_layer(layer: Layer) -> LdiResult<Self> {
        let focal_px = layer.focal_px();
        let resolution = layer.resolution();
        Self::new(
            vec![layer],
            DVec3::ZERO,
            Orientation::default(),
            focal_px,
            resolution,
        )
    }

    /// Layers in front-to-back order.
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// `true` for layered (LDI) views, `false` for plain depth images.
    pub fn is_layered(&self) -> bool {
        self.layers.len() > 1
    }

    /// Base position `C1`.
    pub fn position(&self) -> DVec3 {
        self.position
    }

    /// Base orientation.
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// View focal length in pixels.
    pub fn focal_px(&self) -> f64 {
        self.focal_px
    }

    /// View resolution.
    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    /// Base camera of the view.
    pub fn base_camera(&self) -> CameraModel {
        CameraModel::from_pixels(self.focal_px, self.resolution, self.orientation)
    }

    /// Nearest inverse depth over all layers.
    pub fn nearest_inv_depth(&self) -> f64 {
        self.layers
            .iter()
            .map(|l| l.depth_range().inv_z_min)
            .fold(0.0, f64::max)
    }
}

/// A mono (one view) or stereo (left/right views) layered source.
#[derive(Clone, Debug)]
pub struct LayeredScene {
    views: Vec<View>,
}

impl LayeredScene {
    /// Scene with a single view shared by every eye.
    pub fn mono(view: View) -> Self {
        Self { views: vec![view] }
    }

    /// Stereo scene; the left view feeds the left eye.
    pub fn stereo(left: View, right: View) -> Self {
        Self {
            views: vec![left, right],
        }
    }

    /// Build from a list of one or two views.
    pub fn from_views(mut views: Vec<View>) -> LdiResult<Self> {
        match views.len() {
            1 => Ok(Self::mono(views.remove(0))),
            2 => {
                let right = views.remove(1);
                let left = views.remove(0);
                Ok(Self::stereo(left, right))
            }
            n => Err(LdiError::validation(format!(
                "scene must have 1 (mono) or 2 (stereo) views, got {n}"
            ))),
        }
    }

    /// All views.
    pub fn views(&self) -> &[View] {
        &self.views
    }

    /// `true` when the source carries separate left/right views.
    pub fn is_stereo(&self) -> bool {
        self.views.len() == 2
    }

    /// View used for `eye`; `None` means the 2D single-viewpoint mode.
    pub fn view_for(&self, eye: Option<Eye>) -> &View {
        match (eye, self.views.as_slice()) {
            (Some(Eye::Right), [_, right]) => right,
            (_, views) => &views[0],
        }
    }

    /// Nearest inverse depth over all views.
    pub fn nearest_inv_depth(&self) -> f64 {
        self.views
            .iter()
            .map(View::nearest_inv_depth)
            .fold(0.0, f64::max)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/model.rs"]
mod tests;
