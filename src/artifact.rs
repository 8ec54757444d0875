//! Per-node compiled output, tagged by domain.

use kurbo::Rect;

use crate::{
    composite,
    foundation::{core::Resolution, core::Rgb, error::TexResult},
    markup::{Definitions, Document, ImageNode, ImageRendering, SvgNode},
    raster::{RasterImage, Rasterizer},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Domain {
    /// Resolution-independent markup.
    Vector,
    /// Frozen to the pixel grid it was baked at.
    Raster,
}

/// Vector markup plus the definitions it references.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Fragment {
    pub nodes: Vec<SvgNode>,
    pub defs: Definitions,
}

impl Fragment {
    pub fn new(nodes: Vec<SvgNode>, defs: Definitions) -> Self {
        Self { nodes, defs }
    }

    pub fn single(node: impl Into<SvgNode>) -> Self {
        Self {
            nodes: vec![node.into()],
            defs: Definitions::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Artifact {
    Vector(Fragment),
    Raster {
        image: RasterImage,
        /// Scaling hint used whenever the bitmap is stretched back onto the canvas.
        rendering: ImageRendering,
    },
}

impl Default for Artifact {
    fn default() -> Self {
        Self::empty()
    }
}

impl Artifact {
    pub fn empty() -> Self {
        Self::Vector(Fragment::default())
    }

    pub fn raster(image: RasterImage) -> Self {
        Self::Raster {
            image,
            rendering: ImageRendering::Smooth,
        }
    }

    pub fn domain(&self) -> Domain {
        match self {
            Self::Vector(_) => Domain::Vector,
            Self::Raster { .. } => Domain::Raster,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Vector(f) if f.is_empty())
    }

    /// Vector view of this artifact. Rasters become a full-canvas `<image>` with no definitions.
    pub fn into_fragment(self, res: Resolution) -> TexResult<Fragment> {
        match self {
            Self::Vector(f) => Ok(f),
            Self::Raster { image, rendering } => {
                Ok(Fragment::single(embed_raster(&image, res, rendering)?))
            }
        }
    }

    /// Wraps the artifact into a standalone document.
    pub fn to_document(&self, res: Resolution, background: Option<Rgb>) -> TexResult<Document> {
        let frag = self.clone().into_fragment(res)?;
        Ok(Document {
            resolution: res,
            defs: frag.defs,
            background,
            content: frag.nodes,
        })
    }

    /// Pixels of this artifact at `size` x `size`, on a transparent canvas.
    pub fn bake(
        &self,
        res: Resolution,
        size: u32,
        rasterizer: &dyn Rasterizer,
    ) -> TexResult<RasterImage> {
        if let Self::Raster { image, .. } = self
            && image.width == size
            && image.height == size
        {
            return Ok(image.clone());
        }
        composite::rasterize_document(&self.to_document(res, None)?, size, size, rasterizer)
    }
}

pub fn embed_raster(
    image: &RasterImage,
    res: Resolution,
    rendering: ImageRendering,
) -> TexResult<SvgNode> {
    let s = res.as_f64();
    Ok(SvgNode::Image(ImageNode {
        rect: Rect::new(0.0, 0.0, s, s),
        href: image.to_data_url()?,
        rendering,
    }))
}
