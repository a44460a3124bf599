use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::camera::model::Orientation;
use crate::foundation::core::{DVec3, Resolution, Vec2};
use crate::foundation::error::{LdiError, LdiResult};
use crate::scene::model::{DepthRange, Layer, LayeredScene, View};

/// JSON description of a mono or stereo layered source.
///
/// Image paths are resolved relative to the manifest's directory.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct ViewManifest {
    /// One view (mono) or two views (left, right).
    pub views: Vec<ViewDef>,
}

/// One view of the manifest.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct ViewDef {
    /// Base camera width in pixels.
    pub width_px: u32,
    /// Base camera height in pixels.
    pub height_px: u32,
    /// Base camera focal length in pixels.
    pub focal_px: f64,
    /// Base position `C1`.
    #[serde(default)]
    pub position: Xyz,
    /// Off-axis skew.
    #[serde(default)]
    pub skew: Xy,
    /// Slant and roll.
    #[serde(default)]
    pub rotation: RotationDef,
    /// Front-to-back layers.
    pub layers: Vec<LayerDef>,
}

/// 3D vector in manifest form.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Xyz {
    /// X.
    pub x: f64,
    /// Y.
    pub y: f64,
    /// Z.
    pub z: f64,
}

/// 2D vector in manifest form.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Xy {
    /// X.
    pub x: f64,
    /// Y.
    pub y: f64,
}

/// Slant (tangents) and roll (degrees).
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RotationDef {
    /// Optical-axis tilt.
    #[serde(default)]
    pub slant: Xy,
    /// Axial roll in degrees.
    #[serde(default)]
    pub roll_degrees: f64,
}

/// One layer of a view.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct LayerDef {
    /// Color image path.
    pub image: PathBuf,
    /// Inverse-depth map and its range.
    pub inv_depth: InvDepthDef,
    /// Optional binary occlusion mask path.
    #[serde(default)]
    pub mask: Option<PathBuf>,
    /// Layer width in pixels.
    pub width_px: u32,
    /// Layer height in pixels.
    pub height_px: u32,
    /// Layer focal length in pixels.
    pub focal_px: f64,
}

/// Inverse-depth map reference.
///
/// `min`/`max` follow depth naming: `min` is the nearest depth, i.e. the largest inverse depth.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct InvDepthDef {
    /// Grayscale image, white = nearest.
    pub image: PathBuf,
    /// Inverse depth at normalized value 1.
    pub min: f64,
    /// Inverse depth at normalized value 0.
    pub max: f64,
}

impl ViewManifest {
    /// Parse a manifest from JSON.
    pub fn from_reader(r: impl std::io::Read) -> LdiResult<Self> {
        serde_json::from_reader(r).map_err(|e| LdiError::serde(format!("view manifest: {e}")))
    }

    /// Read and parse a manifest file.
    pub fn from_path(path: impl AsRef<Path>) -> LdiResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            LdiError::asset(format!("open manifest '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Decode every referenced image and build a validated scene.
    #[tracing::instrument(skip(self), fields(views = self.views.len()))]
    pub fn load(&self, root: &Path) -> LdiResult<LayeredScene> {
        let views = self
            .views
            .iter()
            .enumerate()
            .map(|(vi, def)| load_view(root, vi, def))
            .collect::<LdiResult<Vec<_>>>()?;
        LayeredScene::from_views(views)
    }
}

/// Load a manifest file and all of its images.
pub fn load_scene(path: impl AsRef<Path>) -> LdiResult<LayeredScene> {
    let path = path.as_ref();
    let manifest = ViewManifest::from_path(path)?;
    let root = path.parent().unwrap_or_else(|| Path::new("."));
    manifest.load(root)
}

fn load_view(root: &Path, vi: usize, def: &ViewDef) -> LdiResult<View> {
    let layers = def
        .layers
        .iter()
        .enumerate()
        .map(|(li, l)| {
            load_layer(root, l)
                .map_err(|e| LdiError::asset(format!("view {vi} layer {li}: {e}")))
        })
        .collect::<LdiResult<Vec<_>>>()?;

    let orientation = Orientation {
        skew: Vec2::new(def.skew.x, def.skew.y),
        slant: Vec2::new(def.rotation.slant.x, def.rotation.slant.y),
        roll: def.rotation.roll_degrees.to_radians(),
    };
    View::new(
        layers,
        DVec3::new(def.position.x, def.position.y, def.position.z),
        orientation,
        def.focal_px,
        Resolution::new(def.width_px, def.height_px)?,
    )
}

fn load_layer(root: &Path, def: &LayerDef) -> LdiResult<Layer> {
    let color = open_image(root, &def.image)?.to_rgba8();
    if color.width() != def.width_px || color.height() != def.height_px {
        return Err(LdiError::validation(format!(
            "color image is {}x{}, manifest declares {}x{}",
            color.width(),
            color.height(),
            def.width_px,
            def.height_px
        )));
    }
    let inv_depth = open_image(root, &def.inv_depth.image)?.to_luma32f();
    let mask = match &def.mask {
        Some(p) => Some(open_image(root, p)?.to_luma8()),
        None => None,
    };
    let range = DepthRange::new(def.inv_depth.min, def.inv_depth.max)?;
    Layer::new(color, inv_depth, mask, def.focal_px, range)
}

fn open_image(root: &Path, rel: &Path) -> LdiResult<image::DynamicImage> {
    let path = root.join(rel);
    image::open(&path)
        .map_err(|e| LdiError::asset(format!("decode '{}': {e}", path.display())))
}

#[cfg(test)]
#[path = "../../tests/unit/scene/manifest.rs"]
mod tests;
