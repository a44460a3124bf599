use crate::foundation::error::{LdiError, LdiResult};
use crate::foundation::math::{f64_to_unorm8, unorm8_to_f64};

pub use glam::{DMat3, DMat4, DQuat, DVec3};
pub use kurbo::{Point, Vec2};

/// Pixel dimensions of an image, layer or output target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Resolution {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Resolution {
    /// Create a validated resolution with both extents non-zero.
    pub fn new(width: u32, height: u32) -> LdiResult<Self> {
        if width == 0 || height == 0 {
            return Err(LdiError::validation(format!(
                "resolution must be non-zero, got {width}x{height}"
            )));
        }
        Ok(Self { width, height })
    }

    /// Number of pixels covered.
    pub fn pixel_count(self) -> usize {
        (self.width as usize).saturating_mul(self.height as usize)
    }

    /// Centered image-plane coordinate of a pixel center.
    ///
    /// `[-0.5, 0.5]²` spans the image; y grows downward.
    pub fn pixel_to_plane(self, x: f64, y: f64) -> Point {
        Point::new(
            (x + 0.5) / f64::from(self.width) - 0.5,
            (y + 0.5) / f64::from(self.height) - 0.5,
        )
    }
}

/// Straight-alpha background that every output pixel is flattened onto.
///
/// A translucent background is itself composited over opaque black, so output pixels stay opaque.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Background {
    /// Straight RGBA8.
    pub rgba: [u8; 4],
}

impl Default for Background {
    fn default() -> Self {
        Self {
            rgba: [0, 0, 0, 255],
        }
    }
}

impl Background {
    /// Straight color in `[0,1]`.
    pub fn color(self) -> DVec3 {
        DVec3::new(
            unorm8_to_f64(self.rgba[0]),
            unorm8_to_f64(self.rgba[1]),
            unorm8_to_f64(self.rgba[2]),
        )
    }

    /// Alpha in `[0,1]`.
    pub fn alpha(self) -> f64 {
        unorm8_to_f64(self.rgba[3])
    }

    /// Color scaled by alpha.
    pub fn premultiplied(self) -> DVec3 {
        self.color() * self.alpha()
    }
}

/// Which eye of a stereo pair a buffer or camera belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Eye {
    /// Left eye; uses the left view of stereo sources.
    Left,
    /// Right eye; uses the right view of stereo sources.
    Right,
}

/// Position (millimeters) and orientation of a tracked eye or head.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Pose {
    /// Position in device space (x right, y up, z toward the viewer).
    pub position: DVec3,
    /// Orientation in device space.
    pub orientation: DQuat,
}

impl Pose {
    /// Pose at `position` looking down `-z`.
    pub fn at(position: DVec3) -> Self {
        Self {
            position,
            orientation: DQuat::IDENTITY,
        }
    }
}

/// Quantize a straight `[0,1]` color to opaque RGBA8.
pub(crate) fn color_to_rgba8(c: DVec3) -> [u8; 4] {
    [f64_to_unorm8(c.x), f64_to_unorm8(c.y), f64_to_unorm8(c.z), 255]
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
