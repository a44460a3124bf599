use crate::foundation::core::{DMat3, DVec3, Resolution, Vec2};
use crate::foundation::math::mat3_from_rows;

/// Frustum orientation components shared by source layers and virtual cameras.
///
/// - `skew`: off-axis shift in tangent units (keeps a focus point fixed while the eye moves)
/// - `slant`: tangent-space tilt of the optical axis
/// - `roll`: rotation about the viewing axis, radians
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Orientation {
    /// Off-axis frustum shift.
    pub skew: Vec2,
    /// Optical-axis tilt as `(tan x, tan y)`.
    pub slant: Vec2,
    /// Axial rotation in radians.
    pub roll: f64,
}

/// Pinhole camera with focal expressed as a fraction of the image extent per axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraModel {
    /// Horizontal focal, `focal_px / width`.
    pub fx: f64,
    /// Vertical focal, `focal_px / height`.
    pub fy: f64,
    /// Skew, slant and roll.
    pub orientation: Orientation,
}

impl CameraModel {
    /// Camera from a focal length in pixels and the image resolution it applies to.
    pub fn from_pixels(focal_px: f64, resolution: Resolution, orientation: Orientation) -> Self {
        Self {
            fx: focal_px / f64::from(resolution.width),
            fy: focal_px / f64::from(resolution.height),
            orientation,
        }
    }

    /// Composed transform `Focal · Skew · Roll · Slant`.
    pub fn matrix(&self) -> DMat3 {
        focal_matrix(self.fx, self.fy)
            * skew_matrix(self.orientation.skew)
            * roll_matrix(self.orientation.roll)
            * slant_matrix(self.orientation.slant)
    }
}

/// Diagonal focal scale.
pub fn focal_matrix(fx: f64, fy: f64) -> DMat3 {
    DMat3::from_diagonal(DVec3::new(fx, fy, 1.0))
}

/// Off-axis shear: a direction `(x, y, z)` projects to `(x/z - sk.x, y/z - sk.y)`.
pub fn skew_matrix(sk: Vec2) -> DMat3 {
    mat3_from_rows([[1.0, 0.0, -sk.x], [0.0, 1.0, -sk.y], [0.0, 0.0, 1.0]])
}

/// Rotation by `theta` radians about the viewing axis.
pub fn roll_matrix(theta: f64) -> DMat3 {
    let (s, c) = theta.sin_cos();
    mat3_from_rows([[c, -s, 0.0], [s, c, 0.0], [0.0, 0.0, 1.0]])
}

/// Tilt taking the axis `(sl.x, sl.y, 1)` onto `+z`.
pub fn slant_matrix(sl: Vec2) -> DMat3 {
    let c = 1.0 / (1.0 + sl.hypot2()).sqrt();
    let a = sl.x * c;
    let b = sl.y * c;
    let k = 1.0 / (1.0 + c);
    mat3_from_rows([
        [1.0 - a * a * k, -a * b * k, -a],
        [-a * b * k, 1.0 - b * b * k, -b],
        [a, b, c],
    ])
}

#[cfg(test)]
#[path = "../../tests/unit/camera/model.rs"]
mod tests;
