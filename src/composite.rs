//! Premultiplied RGBA8 compositing, and the bake step for additive groups.
//!
//! resvg has no `plus-lighter` blend and draws it as a plain "over". Before a document
//! is rasterized, every isolated group with additive children is rendered one child
//! at a time, summed here, and replaced by the resulting bitmap.

use crate::{
    artifact::embed_raster,
    foundation::{
        core::Resolution,
        error::{TexError, TexResult},
    },
    markup::{BlendMode, Def, Definitions, Document, Group, ImageRendering, SvgNode},
    raster::{RasterImage, Rasterizer},
};

pub type PremulRgba8 = [u8; 4];

pub fn over(dst: PremulRgba8, src: PremulRgba8) -> PremulRgba8 {
    if src[3] == 0 {
        return dst;
    }
    let inv = 255u16 - u16::from(src[3]);
    let mut out = [0u8; 4];
    for i in 0..4 {
        out[i] = add_sat_u8(src[i], mul_div255(u16::from(dst[i]), inv));
    }
    out
}

/// Channel-wise sum, clamped at 255.
pub fn add(dst: PremulRgba8, src: PremulRgba8) -> PremulRgba8 {
    let mut out = [0u8; 4];
    for i in 0..4 {
        out[i] = add_sat_u8(dst[i], src[i]);
    }
    out
}

pub fn over_in_place(dst: &mut [u8], src: &[u8]) -> TexResult<()> {
    blend_in_place(dst, src, "over_in_place", over)
}

pub fn add_in_place(dst: &mut [u8], src: &[u8]) -> TexResult<()> {
    blend_in_place(dst, src, "add_in_place", add)
}

fn blend_in_place(
    dst: &mut [u8],
    src: &[u8],
    what: &str,
    f: fn(PremulRgba8, PremulRgba8) -> PremulRgba8,
) -> TexResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(TexError::rasterization(format!(
            "{what} expects equal-length rgba8 buffers"
        )));
    }
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let out = f([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]]);
        d.copy_from_slice(&out);
    }
    Ok(())
}

fn mul_div255(x: u16, y: u16) -> u8 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u8
}

fn add_sat_u8(a: u8, b: u8) -> u8 {
    a.saturating_add(b)
}

/// Rasterizes `doc` at `width` x `height`, summing additive groups in pixels first.
pub fn rasterize_document(
    doc: &Document,
    width: u32,
    height: u32,
    rasterizer: &dyn Rasterizer,
) -> TexResult<RasterImage> {
    let masked = doc.defs.iter().any(|d| match d {
        Def::Mask(m) => m.content.iter().any(has_additive),
        _ => false,
    });
    if !masked && !doc.content.iter().any(has_additive) {
        return rasterizer.rasterize(&doc.to_svg_string(), width, height);
    }

    let mut flat = doc.clone();
    // Mask content only references definitions inserted before the mask itself.
    for i in 0..flat.defs.len() {
        let Some(Def::Mask(m)) = flat.defs.get_index(i) else {
            continue;
        };
        if !m.content.iter().any(has_additive) {
            continue;
        }
        let mut content = m.content.clone();
        Layers::new(flat.resolution, &flat.defs, width, height, rasterizer)
            .flatten_all(&mut content)?;
        if let Some(slot) = flat.defs.mask_content_mut(i) {
            *slot = content;
        }
    }
    Layers::new(flat.resolution, &flat.defs, width, height, rasterizer)
        .flatten_all(&mut flat.content)?;

    rasterizer.rasterize(&flat.to_svg_string(), width, height)
}

/// Isolated group whose children only draw normally or additively, at least one additively.
fn is_additive(g: &Group) -> bool {
    let blends = || {
        g.children.iter().map(|c| match c {
            SvgNode::Group(cg) => cg.blend,
            _ => BlendMode::Normal,
        })
    };
    g.isolate
        && blends().any(|b| b == BlendMode::PlusLighter)
        && blends().all(|b| matches!(b, BlendMode::Normal | BlendMode::PlusLighter))
}

fn has_additive(node: &SvgNode) -> bool {
    match node {
        SvgNode::Group(g) => is_additive(g) || g.children.iter().any(has_additive),
        _ => false,
    }
}

/// Renders single nodes against the document's definitions.
struct Layers<'a> {
    res: Resolution,
    defs: &'a Definitions,
    width: u32,
    height: u32,
    rasterizer: &'a dyn Rasterizer,
}

impl<'a> Layers<'a> {
    fn new(
        res: Resolution,
        defs: &'a Definitions,
        width: u32,
        height: u32,
        rasterizer: &'a dyn Rasterizer,
    ) -> Self {
        Self {
            res,
            defs,
            width,
            height,
            rasterizer,
        }
    }

    fn flatten_all(&self, nodes: &mut [SvgNode]) -> TexResult<()> {
        for n in nodes {
            self.flatten(n)?;
        }
        Ok(())
    }

    /// Innermost groups first, so a layer never contains an additive group of its own.
    fn flatten(&self, node: &mut SvgNode) -> TexResult<()> {
        let SvgNode::Group(g) = node else {
            return Ok(());
        };
        self.flatten_all(&mut g.children)?;
        if !is_additive(g) {
            return Ok(());
        }

        let mut acc = vec![0u8; self.width as usize * self.height as usize * 4];
        for child in &g.children {
            let layer = self.render(child)?;
            match child {
                SvgNode::Group(cg) if cg.blend == BlendMode::PlusLighter => {
                    add_in_place(&mut acc, &layer.rgba8_premul)?
                }
                _ => over_in_place(&mut acc, &layer.rgba8_premul)?,
            }
        }
        tracing::debug!(layers = g.children.len(), "additive group baked");

        let sum = RasterImage::new(self.width, self.height, acc)?;
        g.children = vec![embed_raster(&sum, self.res, ImageRendering::Smooth)?];
        Ok(())
    }

    fn render(&self, node: &SvgNode) -> TexResult<RasterImage> {
        let doc = Document {
            resolution: self.res,
            defs: self.defs.clone(),
            background: None,
            content: vec![node.clone()],
        };
        self.rasterizer
            .rasterize(&doc.to_svg_string(), self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        foundation::core::Rgb,
        markup::{Mask, Region, Shape, Style},
        raster::ResvgRasterizer,
    };

    #[test]
    fn over_src_opaque_replaces_dst() {
        assert_eq!(over([10, 20, 30, 255], [1, 2, 3, 255]), [1, 2, 3, 255]);
    }

    #[test]
    fn over_src_alpha_0_is_noop() {
        assert_eq!(over([10, 20, 30, 40], [0, 0, 0, 0]), [10, 20, 30, 40]);
    }

    #[test]
    fn add_clamps_each_channel() {
        assert_eq!(add([200, 0, 10, 255], [100, 255, 5, 255]), [255, 255, 15, 255]);
    }

    #[test]
    fn in_place_rejects_mismatched_buffers() {
        let mut dst = vec![0u8; 8];
        assert!(add_in_place(&mut dst, &[0u8; 4]).is_err());
        assert!(over_in_place(&mut dst[..6], &[0u8; 6]).is_err());
    }

    fn solid(color: Rgb) -> SvgNode {
        Shape::canvas_rect(Resolution::new(16).unwrap(), Style::solid(color)).into()
    }

    fn additive_doc() -> Document {
        let sum = Group::isolated(vec![
            Group::new(vec![solid(Rgb::new(255, 0, 0))]).into(),
            Group::new(vec![solid(Rgb::new(0, 0, 255))])
                .with_blend(BlendMode::PlusLighter)
                .into(),
        ]);
        Document {
            resolution: Resolution::new(16).unwrap(),
            defs: Definitions::new(),
            background: None,
            content: vec![sum.into()],
        }
    }

    #[test]
    fn additive_group_sums_its_children() {
        let r = ResvgRasterizer::default();
        let img = rasterize_document(&additive_doc(), 16, 16, &r).unwrap();
        assert_eq!(img.pixel(8, 8), Some([255, 0, 255, 255]));
    }

    #[test]
    fn additive_group_inside_a_mask_is_summed_too() {
        // Two half-grey layers add up to a fully visible mask.
        let half = |blend| {
            SvgNode::from(Group::new(vec![solid(Rgb::gray(128))]).with_blend(blend))
        };
        let mut doc = additive_doc();
        let mask = Mask {
            id: "sum".to_string(),
            region: Region::user_space(kurbo::Rect::new(0.0, 0.0, 16.0, 16.0)),
            content: vec![
                Group::isolated(vec![
                    half(BlendMode::Normal),
                    half(BlendMode::PlusLighter),
                ])
                .into(),
            ],
        };
        assert!(doc.defs.insert(Def::Mask(mask)));
        doc.content = vec![Group::new(vec![solid(Rgb::WHITE)]).with_mask("sum").into()];

        let r = ResvgRasterizer::default();
        let img = rasterize_document(&doc, 16, 16, &r).unwrap();
        let [.., a] = img.pixel(8, 8).unwrap();
        assert!(a >= 250, "alpha {a}");
    }

    #[test]
    fn documents_without_additive_groups_render_unchanged() {
        let mut doc = additive_doc();
        doc.content = vec![solid(Rgb::new(0, 255, 0))];
        let r = ResvgRasterizer::default();
        let direct = r.rasterize(&doc.to_svg_string(), 16, 16).unwrap();
        assert_eq!(rasterize_document(&doc, 16, 16, &r).unwrap(), direct);
    }
}
