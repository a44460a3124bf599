use crate::foundation::core::DMat4;
use crate::foundation::error::{LdiError, LdiResult};

/// Half-angle tangents of one eye's off-axis frustum, each positive when the edge lies outward
/// of the view axis.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FrustumDescriptor {
    pub up: f64,
    pub down: f64,
    pub left: f64,
    pub right: f64,
}

impl FrustumDescriptor {
    /// Frustum with equal tangents on opposite sides.
    pub fn symmetric(horizontal: f64, vertical: f64) -> Self {
        Self {
            up: vertical,
            down: vertical,
            left: horizontal,
            right: horizontal,
        }
    }

    /// Recover the tangents of an OpenGL-style off-axis perspective matrix.
    pub fn from_projection(m: DMat4) -> LdiResult<Self> {
        let m00 = m.x_axis.x;
        let m11 = m.y_axis.y;
        let m20 = m.z_axis.x;
        let m21 = m.z_axis.y;
        if !(m00.is_finite() && m00 > 0.0 && m11.is_finite() && m11 > 0.0) {
            return Err(LdiError::validation(format!(
                "projection scale terms must be finite and > 0, got m00={m00} m11={m11}"
            )));
        }
        if !(m20.is_finite() && m21.is_finite()) {
            return Err(LdiError::validation("projection offset terms must be finite"));
        }
        let f = Self {
            right: (1.0 + m20) / m00,
            left: (1.0 - m20) / m00,
            up: (1.0 + m21) / m11,
            down: (1.0 - m21) / m11,
        };
        if f.left + f.right <= 0.0 || f.up + f.down <= 0.0 {
            return Err(LdiError::validation("projection frustum has no extent"));
        }
        Ok(f)
    }

    /// OpenGL-style projection with clip depth in `[-1, 1]`.
    pub fn to_projection(&self, near: f64, far: f64) -> DMat4 {
        let w = self.left + self.right;
        let h = self.up + self.down;
        DMat4::from_cols_array(&[
            2.0 / w,
            0.0,
            0.0,
            0.0,
            0.0,
            2.0 / h,
            0.0,
            0.0,
            (self.right - self.left) / w,
            (self.up - self.down) / h,
            (far + near) / (near - far),
            -1.0,
            0.0,
            0.0,
            2.0 * far * near / (near - far),
            0.0,
        ])
    }

    /// Same tangents within `eps`.
    pub fn approx_eq(&self, other: &Self, eps: f64) -> bool {
        (self.up - other.up).abs() <= eps
            && (self.down - other.down).abs() <= eps
            && (self.left - other.left).abs() <= eps
            && (self.right - other.right).abs() <= eps
    }

    /// Left/right swapped copy of `other` within `eps`.
    pub fn mirrors(&self, other: &Self, eps: f64) -> bool {
        self.approx_eq(
            &Self {
                left: other.right,
                right: other.left,
                ..*other
            },
            eps,
        )
    }
}

#[cfg(test)]
#[path = "../../tests/unit/display/frustum.rs"]
mod tests;
