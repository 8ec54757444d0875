use kurbo::Affine;

use super::{OpContext, work_region};
use crate::{
    artifact::{Artifact, Fragment},
    foundation::{core::Rgb, error::TexResult},
    markup::{
        Def, Filter, FilterPrimitive, Geometry, Group, ImageRendering, LinearGradient, Mask,
        Paint, Region, Shape, Stop, Style, Units,
    },
    params::{
        FillParams, GlowKind, GlowParams, GradientFadeParams, PixelateParams, SoftBlurParams,
        StrokeParams,
    },
};

const SOURCE: &str = "SourceGraphic";

/// Rewrites every shape's style in place. Rasters pass through untouched.
fn restyle(input: Option<Artifact>, f: &mut impl FnMut(&mut Style)) -> Artifact {
    match input {
        Some(Artifact::Vector(mut frag)) => {
            for n in &mut frag.nodes {
                n.for_each_style_mut(f);
            }
            Artifact::Vector(frag)
        }
        Some(raster @ Artifact::Raster { .. }) => raster,
        None => Artifact::empty(),
    }
}

pub fn fill(p: &FillParams, input: Option<Artifact>) -> TexResult<Artifact> {
    let outline = p.stroke_width > 0.0 || !p.fill_enabled;
    Ok(restyle(input, &mut |st| {
        st.fill = if p.fill_enabled {
            Paint::Color(Rgb::WHITE)
        } else {
            Paint::None
        };
        st.stroke = if outline {
            Paint::Color(Rgb::WHITE)
        } else {
            Paint::None
        };
        st.stroke_width = Some(if p.stroke_width > 0.0 {
            p.stroke_width
        } else {
            1.0
        });
    }))
}

pub fn stroke(p: &StrokeParams, input: Option<Artifact>) -> TexResult<Artifact> {
    Ok(restyle(input, &mut |st| {
        st.stroke = Paint::Color(Rgb::WHITE);
        st.stroke_width = Some(p.width);
        st.stroke_opacity = Some(p.opacity);
    }))
}

fn wrap_with_filter(
    input: Artifact,
    ctx: &mut OpContext<'_>,
    prefix: &str,
    region: Region,
    primitives: Vec<FilterPrimitive>,
) -> TexResult<Artifact> {
    let Fragment { nodes, mut defs } = input.into_fragment(ctx.res)?;
    let id = ctx.fresh_id(prefix);
    defs.insert(Def::Filter(Filter {
        id: id.clone(),
        region,
        primitives,
    }));
    Ok(Fragment::new(vec![Group::new(nodes).with_filter(id).into()], defs).into())
}

/// Two-radius halo under a sharp copy of the source.
pub fn glow(p: &GlowParams, input: Option<Artifact>, ctx: &mut OpContext<'_>) -> TexResult<Artifact> {
    let Some(input) = input else {
        return Ok(Artifact::empty());
    };
    let (wide, tight) = p.blur_radii();
    let k = p.intensity;
    #[rustfmt::skip]
    let amplify = [
        1.0, 0.0, 0.0, 0.0, 0.0,
        0.0, 1.0, 0.0, 0.0, 0.0,
        0.0, 0.0, 1.0, 0.0, 0.0,
        0.0, 0.0, 0.0, k,   0.0,
    ];
    let primitives = vec![
        FilterPrimitive::GaussianBlur {
            input: SOURCE.to_string(),
            std_dev: wide,
            result: "blur1".to_string(),
        },
        FilterPrimitive::GaussianBlur {
            input: SOURCE.to_string(),
            std_dev: tight,
            result: "blur2".to_string(),
        },
        FilterPrimitive::Merge {
            inputs: vec!["blur1".to_string(), "blur2".to_string()],
            result: "blurs".to_string(),
        },
        FilterPrimitive::ColorMatrix {
            input: "blurs".to_string(),
            values: amplify,
            result: "halo".to_string(),
        },
        FilterPrimitive::Merge {
            inputs: vec!["halo".to_string(), SOURCE.to_string()],
            result: "glow".to_string(),
        },
    ];
    let prefix = match p.kind {
        GlowKind::Glow => "glow",
        GlowKind::Neon => "neon",
    };
    wrap_with_filter(
        input,
        ctx,
        prefix,
        Region::bbox(-2.0, -2.0, 5.0, 5.0),
        primitives,
    )
}

pub fn soft_blur(
    p: &SoftBlurParams,
    input: Option<Artifact>,
    ctx: &mut OpContext<'_>,
) -> TexResult<Artifact> {
    let Some(input) = input else {
        return Ok(Artifact::empty());
    };
    wrap_with_filter(
        input,
        ctx,
        "blur",
        Region::bbox(-0.5, -0.5, 2.0, 2.0),
        vec![FilterPrimitive::GaussianBlur {
            input: SOURCE.to_string(),
            std_dev: p.radius,
            result: "blur".to_string(),
        }],
    )
}

/// Masks the input with a white linear ramp from `start` to `end` opacity across the canvas.
pub fn gradient_fade(
    p: &GradientFadeParams,
    input: Option<Artifact>,
    ctx: &mut OpContext<'_>,
) -> TexResult<Artifact> {
    let Some(input) = input else {
        return Ok(Artifact::empty());
    };
    let res = ctx.res;
    let Fragment { nodes, mut defs } = input.into_fragment(res)?;

    let s = res.as_f64();
    let grad_id = ctx.fresh_id("fade_grad");
    defs.insert(Def::LinearGradient(LinearGradient {
        id: grad_id.clone(),
        units: Units::UserSpaceOnUse,
        x1: 0.0,
        y1: s / 2.0,
        x2: s,
        y2: s / 2.0,
        transform: Some(Affine::rotate_about(
            (p.direction - 90.0).to_radians(),
            res.center(),
        )),
        stops: vec![
            Stop {
                offset: 0.0,
                color: Rgb::WHITE,
                opacity: p.start,
            },
            Stop {
                offset: 1.0,
                color: Rgb::WHITE,
                opacity: p.end,
            },
        ],
    }));

    let region = work_region(res);
    let mask_id = ctx.fresh_id("fade_mask");
    defs.insert(Def::Mask(Mask {
        id: mask_id.clone(),
        region,
        content: vec![
            Shape::new(
                Geometry::Rect(region.rect),
                Style {
                    fill: Paint::Url(grad_id),
                    ..Style::white()
                },
            )
            .into(),
        ],
    }));
    Ok(Fragment::new(vec![Group::new(nodes).with_mask(mask_id).into()], defs).into())
}

/// Bakes the input at `ceil(res / pixel_size)` and stretches it back with a hard-edge hint.
///
/// A failed bake degrades to passing the input through.
pub fn pixelate(
    p: &PixelateParams,
    input: Option<Artifact>,
    ctx: &mut OpContext<'_>,
) -> TexResult<Artifact> {
    let Some(input) = input else {
        return Ok(Artifact::empty());
    };
    let res = ctx.res;
    let ps = p.pixel_size.max(1);
    let (size, rendering) = if ps == 1 {
        (res.get(), ImageRendering::Smooth)
    } else {
        (res.get().div_ceil(ps).max(1), ImageRendering::Pixelated)
    };

    match input.bake(res, size, ctx.rasterizer) {
        Ok(image) => Ok(Artifact::Raster { image, rendering }),
        Err(e) => {
            tracing::warn!(error = %e, pixel_size = ps, "pixelate bake failed, passing input through");
            Ok(input)
        }
    }
}
