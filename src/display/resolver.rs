//! Turns a stereo device's per-eye frustums into the plane the content converges on, and that
//! plane plus a tracked eye into a [`VirtualCamera`].
//!
//! Device space is millimeters with x right, y up and z toward the viewer. Content space has
//! x right, y down, z forward, and one unit equals the interpupillary distance.

use glam::EulerRot;

use crate::camera::model::Orientation;
use crate::camera::virtual_camera::VirtualCamera;
use crate::display::frustum::FrustumDescriptor;
use crate::foundation::core::{DMat4, DQuat, DVec3, Eye, Pose, Resolution, Vec2};
use crate::foundation::error::{LdiError, LdiResult};
use crate::scene::model::{LayeredScene, View};

/// Disparity denominators at or below this are treated as parallel frustums.
pub const DENOM_EPS: f64 = 1e-6;

const FRUSTUM_MATCH_EPS: f64 = 1e-4;

/// Smallest eye-to-plane depth, as a share of the content depth, a camera is built for.
const MIN_EYE_DEPTH_RATIO: f64 = 1e-3;

/// Physical viewing parameters.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct DisplayOpts {
    /// Interpupillary distance; one content unit.
    pub ipd_mm: f64,
    /// Values above 1 pull the convergence plane closer than the nearest content.
    pub focus_factor: f64,
    /// Desktop screen width.
    pub screen_width_mm: f64,
    /// Desktop screen height.
    pub screen_height_mm: f64,
    /// Nominal head distance from the desktop screen.
    pub viewing_distance_mm: f64,
}

impl Default for DisplayOpts {
    fn default() -> Self {
        Self {
            ipd_mm: 63.0,
            focus_factor: 1.0,
            screen_width_mm: 520.0,
            screen_height_mm: 320.0,
            viewing_distance_mm: 600.0,
        }
    }
}

impl DisplayOpts {
    pub fn validate(&self) -> LdiResult<()> {
        for (name, v) in [
            ("ipd_mm", self.ipd_mm),
            ("focus_factor", self.focus_factor),
            ("screen_width_mm", self.screen_width_mm),
            ("screen_height_mm", self.screen_height_mm),
            ("viewing_distance_mm", self.viewing_distance_mm),
        ] {
            if !v.is_finite() || v <= 0.0 {
                return Err(LdiError::validation(format!(
                    "display {name} must be > 0, got {v}"
                )));
            }
        }
        Ok(())
    }

    /// Depth of the convergence plane in content units.
    pub fn content_depth(&self, scene: &LayeredScene) -> LdiResult<f64> {
        let inv_z_min = scene.nearest_inv_depth();
        if !inv_z_min.is_finite() || inv_z_min <= 0.0 {
            return Err(LdiError::setup(
                "scene nearest inverse depth must be > 0 to place the convergence plane",
            ));
        }
        Ok(1.0 / (inv_z_min * self.focus_factor))
    }
}

/// How the two eyes relate to the image surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum DisplayKind {
    /// Per-eye displays fixed to the head; the plane is placed at the content's depth.
    Headset,
    /// One physical surface both eyes look at; the plane is that surface.
    FixedDisplay,
}

/// Pose, projection and target size of one device eye.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EyeSetup {
    pub pose: Pose,
    pub projection: DMat4,
    pub resolution: Resolution,
}

/// Rectangle in device space on which rendered content shows zero parallax.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ConvergencePlane {
    /// Center, millimeters.
    pub position: DVec3,
    /// Plane frame; the plane faces `+z` of this frame.
    pub orientation: DQuat,
    pub width: f64,
    pub height: f64,
    /// Nominal viewer distance from the plane.
    pub distance: f64,
}

impl ConvergencePlane {
    /// The physical desktop screen, centered at the device origin.
    pub fn desktop(opts: &DisplayOpts) -> Self {
        Self {
            position: DVec3::ZERO,
            orientation: DQuat::IDENTITY,
            width: opts.screen_width_mm,
            height: opts.screen_height_mm,
            distance: opts.viewing_distance_mm,
        }
    }

    /// `p` expressed in the plane frame.
    pub fn to_local(&self, p: DVec3) -> DVec3 {
        self.orientation.inverse() * (p - self.position)
    }

    /// Camera for an eye at `eye_mm` (device space) looking through this plane.
    ///
    /// With `Zp` the content depth of the plane and `C2` the camera position:
    /// `C2 = (x / ipd, -y / ipd, Zp·(D - z) / D)` in plane-local coordinates, the frustum is
    /// skewed by `-C2.xy / (Zp - C2.z)` so the plane stays centered, and the focal grows with
    /// `Zp - C2.z` so the plane keeps filling the output.
    pub fn eye_camera(
        &self,
        eye_mm: DVec3,
        view: &View,
        resolution: Resolution,
        ipd_mm: f64,
        content_depth: f64,
    ) -> VirtualCamera {
        let local = self.to_local(eye_mm);
        let position = DVec3::new(
            local.x / ipd_mm,
            -local.y / ipd_mm,
            content_depth * (self.distance - local.z) / self.distance,
        );
        let depth = (content_depth - position.z).max(content_depth * MIN_EYE_DEPTH_RATIO);
        let window_width = self.width / ipd_mm;
        VirtualCamera {
            position,
            orientation: Orientation {
                skew: Vec2::new(-position.x / depth, -position.y / depth),
                ..view.orientation()
            },
            focal_px: f64::from(resolution.width) * depth / window_width,
            resolution,
        }
    }
}

/// Everything a stereo session needs from the device, computed once per session.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StereoGeometry {
    pub kind: DisplayKind,
    pub plane: ConvergencePlane,
    /// Left, right.
    pub frustums: [FrustumDescriptor; 2],
    /// Left, right.
    pub resolutions: [Resolution; 2],
    pub ipd_mm: f64,
    /// Depth of the plane in content units.
    pub content_depth: f64,
}

impl StereoGeometry {
    pub fn resolution(&self, eye: Eye) -> Resolution {
        match eye {
            Eye::Left => self.resolutions[0],
            Eye::Right => self.resolutions[1],
        }
    }

    /// Camera for `eye` at device position `eye_mm`.
    pub fn eye_camera(&self, eye: Eye, eye_mm: DVec3, view: &View) -> VirtualCamera {
        self.plane.eye_camera(
            eye_mm,
            view,
            self.resolution(eye),
            self.ipd_mm,
            self.content_depth,
        )
    }
}

/// Classify a frustum pair by the disparity of their left edges.
pub fn classify(left: &FrustumDescriptor, right: &FrustumDescriptor) -> DisplayKind {
    let den = right.left - left.left;
    if den > DENOM_EPS {
        DisplayKind::FixedDisplay
    } else if left.approx_eq(right, FRUSTUM_MATCH_EPS) || left.mirrors(right, FRUSTUM_MATCH_EPS) {
        DisplayKind::Headset
    } else {
        tracing::warn!(
            ?left,
            ?right,
            den,
            "frustums neither converge nor match, assuming a headset"
        );
        DisplayKind::Headset
    }
}

/// Resolve the convergence plane for a stereo device.
#[tracing::instrument(skip_all)]
pub fn resolve(
    left: &EyeSetup,
    right: &EyeSetup,
    scene: &LayeredScene,
    opts: &DisplayOpts,
) -> LdiResult<StereoGeometry> {
    opts.validate()?;
    let fl = FrustumDescriptor::from_projection(left.projection)?;
    let fr = FrustumDescriptor::from_projection(right.projection)?;
    let content_depth = opts.content_depth(scene)?;

    let kind = classify(&fl, &fr);
    let plane = match kind {
        DisplayKind::Headset => headset_plane(
            &left.pose,
            &right.pose,
            scene.view_for(Some(Eye::Left)),
            opts.ipd_mm * content_depth,
        ),
        DisplayKind::FixedDisplay => fixed_display_plane(&left.pose, &right.pose, &fl, &fr)?,
    };
    tracing::info!(
        ?kind,
        distance_mm = plane.distance,
        width_mm = plane.width,
        height_mm = plane.height,
        "resolved stereo geometry"
    );

    Ok(StereoGeometry {
        kind,
        plane,
        frustums: [fl, fr],
        resolutions: [left.resolution, right.resolution],
        ipd_mm: opts.ipd_mm,
        content_depth,
    })
}

/// Plane `distance` ahead of the eyes, sized to the content's native field of view.
fn headset_plane(left: &Pose, right: &Pose, view: &View, distance: f64) -> ConvergencePlane {
    let mid = left.orientation.slerp(right.orientation, 0.5);
    let (yaw, pitch, _roll) = mid.to_euler(EulerRot::YXZ);
    let orientation = DQuat::from_euler(EulerRot::YXZ, yaw, pitch, 0.0);

    let eyes_mid = (left.position + right.position) * 0.5;
    let res = view.resolution();
    ConvergencePlane {
        position: eyes_mid + orientation * DVec3::new(0.0, 0.0, -distance),
        orientation,
        width: distance * f64::from(res.width) / view.focal_px(),
        height: distance * f64::from(res.height) / view.focal_px(),
        distance,
    }
}

/// Intersect the converging frustums to find the shared surface.
fn fixed_display_plane(
    left: &Pose,
    right: &Pose,
    fl: &FrustumDescriptor,
    fr: &FrustumDescriptor,
) -> LdiResult<ConvergencePlane> {
    let orientation = left.orientation;
    let to_frame = orientation.inverse();
    let pl = to_frame * left.position;
    let pr = to_frame * right.position;
    let baseline = pr.x - pl.x;

    let mut distance = baseline / (fr.left - fl.left);
    let den_right = fl.right - fr.right;
    if den_right > DENOM_EPS {
        distance = 0.5 * (distance + baseline / den_right);
    }
    if !distance.is_finite() || distance <= 0.0 {
        return Err(LdiError::setup(format!(
            "converging frustums give no plane in front of the eyes (distance {distance})"
        )));
    }

    let x_l = 0.5 * ((pl.x - distance * fl.left) + (pr.x - distance * fr.left));
    let x_r = 0.5 * ((pl.x + distance * fl.right) + (pr.x + distance * fr.right));
    let y_t = 0.5 * ((pl.y + distance * fl.up) + (pr.y + distance * fr.up));
    let y_b = 0.5 * ((pl.y - distance * fl.down) + (pr.y - distance * fr.down));
    let z_eye = 0.5 * (pl.z + pr.z);

    let center = DVec3::new(0.5 * (x_l + x_r), 0.5 * (y_t + y_b), z_eye - distance);
    Ok(ConvergencePlane {
        position: orientation * center,
        orientation,
        width: x_r - x_l,
        height: y_t - y_b,
        distance,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/display/resolver.rs"]
mod tests;
