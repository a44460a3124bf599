use glam::DMat3;

/// Build a matrix from row-major rows, matching the notation used for camera transforms.
pub(crate) fn mat3_from_rows(rows: [[f64; 3]; 3]) -> DMat3 {
    DMat3::from_cols_array_2d(&rows).transpose()
}

/// Inverse of a 3×3 projective transform, or `None` when it is singular.
pub(crate) fn inverse3(m: DMat3) -> Option<DMat3> {
    let det = m.determinant();
    if !det.is_finite() || det.abs() < 1e-12 {
        return None;
    }
    Some(m.inverse())
}

/// Exponential smoothing step: `weight` is the share given to `next`.
pub(crate) fn smooth_toward(prev: f64, next: f64, weight: f64) -> f64 {
    let w = weight.clamp(0.0, 1.0);
    prev + w * (next - prev)
}

pub(crate) fn clamp01(v: f64) -> f64 {
    if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) }
}

pub(crate) fn unorm8_to_f64(v: u8) -> f64 {
    f64::from(v) / 255.0
}

pub(crate) fn f64_to_unorm8(v: f64) -> u8 {
    (clamp01(v) * 255.0).round() as u8
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
