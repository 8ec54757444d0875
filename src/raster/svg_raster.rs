use super::{RasterImage, Rasterizer, check_dims};
use crate::foundation::{
    core::MAX_DIM,
    error::{TexError, TexResult},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RasterizerOpts {
    /// Largest accepted edge length in pixels.
    pub max_dim: u32,
}

impl Default for RasterizerOpts {
    fn default() -> Self {
        Self { max_dim: MAX_DIM }
    }
}

/// CPU rasterizer: `usvg` parses, `resvg` paints into a `tiny-skia` pixmap.
#[derive(Clone, Debug, Default)]
pub struct ResvgRasterizer {
    opts: RasterizerOpts,
}

impl ResvgRasterizer {
    pub fn new(opts: RasterizerOpts) -> Self {
        Self { opts }
    }

    pub fn opts(&self) -> RasterizerOpts {
        self.opts
    }
}

impl Rasterizer for ResvgRasterizer {
    #[tracing::instrument(skip(self, svg), fields(svg_len = svg.len()))]
    fn rasterize(&self, svg: &str, width: u32, height: u32) -> TexResult<RasterImage> {
        check_dims(width, height)?;
        if width > self.opts.max_dim || height > self.opts.max_dim {
            return Err(TexError::rasterization(format!(
                "raster size too large: {width}x{height} (max {m}x{m})",
                m = self.opts.max_dim
            )));
        }

        let opts = usvg::Options::default();
        let tree = usvg::Tree::from_str(svg, &opts)
            .map_err(|e| TexError::rasterization(format!("parse svg tree: {e}")))?;
        rasterize_tree_to_premul_rgba8(&tree, width, height)
            .and_then(|data| RasterImage::new(width, height, data))
    }
}

pub fn rasterize_tree_to_premul_rgba8(
    tree: &usvg::Tree,
    width: u32,
    height: u32,
) -> TexResult<Vec<u8>> {
    let size = tree.size();
    if !(size.width().is_finite() && size.height().is_finite())
        || size.width() <= 0.0
        || size.height() <= 0.0
    {
        return Err(TexError::rasterization("svg has invalid width/height"));
    }

    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| TexError::rasterization("failed to allocate svg pixmap"))?;

    let sx = (width as f32) / size.width();
    let sy = (height as f32) / size.height();
    let xform = resvg::tiny_skia::Transform::from_scale(sx, sy);

    resvg::render(tree, xform, &mut pixmap.as_mut());
    Ok(pixmap.take())
}
