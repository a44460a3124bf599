//! ldiview renders novel viewpoints of layered depth images (LDIs).
//!
//! An LDI is a short front-to-back stack of color + inverse-depth layers captured from one base
//! camera (mono) or two (stereo). For every output pixel a ray of the virtual camera is marched
//! through each layer's depth field, the hits are composited front to back, and the result is
//! refined near occlusion edges.
//!
//! # Pipeline overview
//!
//! 1. **Camera**: `focal · skew · roll · slant` transforms for source layers and virtual cameras
//! 2. **Ray cast**: per layer, a fixed 40-step inverse-depth march with bisection refinement
//! 3. **Composite**: premultiplied front-to-back "over" with early exit at full coverage
//! 4. **Refine**: subpixel multisampling and an edge-aware blur, selected by [`RefineMode`]
//! 5. **Display**: stereo frustums resolved into a [`ConvergencePlane`] and per-eye cameras
//!
//! [`RenderDriver`] owns the per-session state and runs the pipeline once per eye per frame.
//!
//! The key design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Misses are not errors**: rays that leave a layer, hit a depth edge or fall on cut matte
//!   resolve to transparent samples; only setup problems return [`LdiError`].
//! - **Immutable inputs**: layers are never modified after load and each draw reads a fixed
//!   [`DrawParams`].
#![forbid(unsafe_code)]

mod camera;
mod composite;
mod display;
mod foundation;
mod raycast;
mod refine;
mod render;
mod scene;

pub use camera::model::{
    CameraModel, Orientation, focal_matrix, roll_matrix, skew_matrix, slant_matrix,
};
pub use camera::virtual_camera::VirtualCamera;
pub use composite::layers::{CompositeSample, LayerStack};
pub use display::frustum::FrustumDescriptor;
pub use display::resolver::{
    ConvergencePlane, DENOM_EPS, DisplayKind, DisplayOpts, EyeSetup, StereoGeometry, classify,
    resolve,
};
pub use foundation::core::{
    Background, DMat3, DMat4, DQuat, DVec3, Eye, Point, Pose, Resolution, Vec2,
};
pub use foundation::error::{LdiError, LdiResult};
pub use raycast::caster::{
    BORDER_TAPER_PX, EDGE_GRADIENT_FACTOR, LayerProjection, MASK_DILATION_PX,
    MASK_OPAQUE_THRESHOLD, RAY_STEPS, RaySample,
};
pub use refine::edge_blur::{
    EDGE_ALPHA_THRESHOLD, EDGE_WINDOW_RADIUS, MAX_EDGE_BLUR_RADIUS_PX, edge_blur, edge_proximity,
};
pub use refine::passes::{
    MULTISAMPLE_EDGE_THRESHOLD, PrimaryBuffers, SUBPIXEL_OFFSETS, multisample_pass,
    needs_multisample, primary_pass, render_view,
};
pub use refine::quality::{QualityController, QualityOpts, RefineMode};
pub use render::driver::{DriverState, RenderDriver, Viewpoint};
pub use render::frame::FrameRGBA;
pub use render::opts::{RenderOpts, SmoothingOpts};
pub use render::params::DrawParams;
pub use render::smoothing::PoseSmoother;
pub use scene::manifest::{
    InvDepthDef, LayerDef, RotationDef, ViewDef, ViewManifest, Xy, Xyz, load_scene,
};
pub use scene::model::{DepthRange, Layer, LayeredScene, MAX_LAYERS, View};
pub use scene::sample::DepthImage;

#[cfg(test)]
#[path = "../tests/unit/support.rs"]
pub(crate) mod test_support;
