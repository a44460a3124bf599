use std::path::Path;

use crate::foundation::core::{DVec3, Eye, Resolution, color_to_rgba8};
use crate::foundation::error::{LdiError, LdiResult};

/// One rendered output image: opaque, straight RGBA8, row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
    /// Eye the frame was rendered for; `None` for 2D and multi-view output.
    pub eye: Option<Eye>,
}

impl FrameRGBA {
    /// Quantize straight `[0,1]` colors; alpha is always 255.
    pub fn from_colors(res: Resolution, colors: &[DVec3], eye: Option<Eye>) -> Self {
        let data = colors.iter().flat_map(|&c| color_to_rgba8(c)).collect();
        Self {
            width: res.width,
            height: res.height,
            data,
            eye,
        }
    }

    pub fn resolution(&self) -> Resolution {
        Resolution {
            width: self.width,
            height: self.height,
        }
    }

    /// RGBA of pixel `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        let px = self.data.get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Copy into an [`image::RgbaImage`].
    pub fn to_image(&self) -> LdiResult<image::RgbaImage> {
        image::RgbaImage::from_raw(self.width, self.height, self.data.clone())
            .ok_or_else(|| LdiError::validation("frame data does not match its dimensions"))
    }

    /// Write the frame as a PNG file.
    pub fn save_png(&self, path: impl AsRef<Path>) -> LdiResult<()> {
        let path = path.as_ref();
        image::save_buffer_with_format(
            path,
            &self.data,
            self.width,
            self.height,
            image::ColorType::Rgba8,
            image::ImageFormat::Png,
        )
        .map_err(|e| LdiError::asset(format!("write png '{}': {e}", path.display())))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/frame.rs"]
mod tests;
