//! Bakes a graph into literal pixels.

use crate::{
    composite,
    eval::{BACKGROUND, Evaluator},
    foundation::{core::Resolution, error::TexResult},
    model::Graph,
    raster::{RasterImage, Rasterizer, ResvgRasterizer},
};

/// Evaluates `graph`, composes the document over the background and rasterizes it at
/// exactly `res` x `res`.
#[tracing::instrument(skip(graph, rasterizer), fields(res = res.get()))]
pub fn export_raster_with(
    graph: &Graph,
    res: Resolution,
    root: Option<&str>,
    rasterizer: &dyn Rasterizer,
) -> TexResult<RasterImage> {
    let doc = Evaluator::new(rasterizer).compile(graph, res, root, Some(BACKGROUND))?;
    let img = composite::rasterize_document(&doc, res.get(), res.get(), rasterizer)?;
    tracing::info!(width = img.width, height = img.height, "export rasterized");
    Ok(img)
}

pub fn export_raster(graph: &Graph, res: Resolution, root: Option<&str>) -> TexResult<RasterImage> {
    export_raster_with(graph, res, root, &ResvgRasterizer::default())
}

pub fn export_png(graph: &Graph, res: Resolution, root: Option<&str>) -> TexResult<Vec<u8>> {
    export_raster(graph, res, root)?.encode_png()
}

/// `data:image/png;base64,...`
pub fn export_data_url(graph: &Graph, res: Resolution, root: Option<&str>) -> TexResult<String> {
    export_raster(graph, res, root)?.to_data_url()
}
