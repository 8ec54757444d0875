//! Pixel-level polar remapping.
//!
//! The input is baked at canvas resolution, then every destination pixel looks up one
//! source pixel (nearest neighbour). Lookups outside the unit square stay transparent.

use std::f64::consts::{FRAC_PI_2, TAU};

use rayon::prelude::*;

use super::OpContext;
use crate::{
    artifact::Artifact,
    foundation::error::TexResult,
    params::{PolarMode, PolarParams},
    raster::RasterImage,
};

/// Source lookup in unit coordinates for the destination pixel centred at `(nx, ny)`.
pub fn source_coord(p: &PolarParams, nx: f64, ny: f64) -> (f64, f64) {
    let dx = nx - 0.5 - p.offset_x;
    let dy = ny - 0.5 - p.offset_y;
    let radius = dx.hypot(dy) * 2.0 * p.radial_scale;
    let angle = ((dy.atan2(dx) + FRAC_PI_2) / TAU * p.angular_scale).rem_euclid(1.0);
    match p.mode {
        PolarMode::RectToPolar => (angle, radius),
        PolarMode::PolarToRect => (radius, angle),
    }
}

pub fn remap(src: &RasterImage, p: &PolarParams) -> TexResult<RasterImage> {
    let (w, h) = (src.width as usize, src.height as usize);
    let (fw, fh) = (src.width as f64, src.height as f64);
    let data = src.rgba8_premul.as_slice();
    let mut out = vec![0u8; w * h * 4];

    out.par_chunks_mut(w * 4).enumerate().for_each(|(y, row)| {
        let ny = (y as f64 + 0.5) / fh;
        for (x, px) in row.chunks_exact_mut(4).enumerate() {
            let nx = (x as f64 + 0.5) / fw;
            let (u, v) = source_coord(p, nx, ny);
            if !((0.0..1.0).contains(&u) && (0.0..1.0).contains(&v)) {
                continue;
            }
            let sx = ((u * fw) as usize).min(w - 1);
            let sy = ((v * fh) as usize).min(h - 1);
            let i = (sy * w + sx) * 4;
            px.copy_from_slice(&data[i..i + 4]);
        }
    });

    RasterImage::new(src.width, src.height, out)
}

pub fn polar(
    p: &PolarParams,
    input: Option<Artifact>,
    ctx: &mut OpContext<'_>,
) -> TexResult<Artifact> {
    let Some(input) = input else {
        return Ok(Artifact::empty());
    };
    let src = input.bake(ctx.res, ctx.res.get(), ctx.rasterizer)?;
    Ok(Artifact::raster(remap(&src, p)?))
}
