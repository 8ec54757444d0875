pub mod decode;
pub mod svg_raster;

use std::sync::Arc;

use crate::foundation::{
    core::MAX_DIM,
    error::{TexError, TexResult},
};

pub use decode::{premultiply_rgba8_in_place, unpremultiply_rgba8_in_place};
pub use svg_raster::{RasterizerOpts, ResvgRasterizer};

/// Square-or-not pixel buffer in premultiplied RGBA8, row-major.
#[derive(Clone, PartialEq, Eq)]
pub struct RasterImage {
    pub width: u32,
    pub height: u32,
    pub rgba8_premul: Arc<Vec<u8>>,
}

impl std::fmt::Debug for RasterImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RasterImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.rgba8_premul.len())
            .finish()
    }
}

pub(crate) fn check_dims(width: u32, height: u32) -> TexResult<()> {
    if width == 0 || height == 0 || width > MAX_DIM || height > MAX_DIM {
        return Err(TexError::rasterization(format!(
            "raster size {width}x{height} out of range (1..={MAX_DIM})"
        )));
    }
    Ok(())
}

impl RasterImage {
    pub fn new(width: u32, height: u32, rgba8_premul: Vec<u8>) -> TexResult<Self> {
        check_dims(width, height)?;
        let expected = width as usize * height as usize * 4;
        if rgba8_premul.len() != expected {
            return Err(TexError::rasterization(format!(
                "pixel buffer has {} bytes, expected {expected} for {width}x{height}",
                rgba8_premul.len()
            )));
        }
        Ok(Self {
            width,
            height,
            rgba8_premul: Arc::new(rgba8_premul),
        })
    }

    pub fn transparent(width: u32, height: u32) -> TexResult<Self> {
        check_dims(width, height)?;
        Self::new(width, height, vec![0; width as usize * height as usize * 4])
    }

    /// Premultiplied RGBA at `(x, y)`, `None` outside the buffer.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        let px = self.rgba8_premul.get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    pub fn is_fully_transparent(&self) -> bool {
        self.rgba8_premul.chunks_exact(4).all(|px| px[3] == 0)
    }
}

/// Turns a standalone SVG document into pixels.
pub trait Rasterizer {
    /// Renders `svg` scaled so its view box fills exactly `width` x `height` pixels.
    fn rasterize(&self, svg: &str, width: u32, height: u32) -> TexResult<RasterImage>;
}
