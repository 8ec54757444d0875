use super::{OpContext, Silhouette, silhouette_mask};
use crate::{
    artifact::{Artifact, Fragment},
    foundation::{
        core::{Resolution, Rgb},
        error::TexResult,
    },
    markup::{BlendMode, Group, Shape, Style},
    params::{AlphaParams, ColorParams, ImageParams, ValueParams},
    raster::RasterImage,
};

/// Solid colour, or a multiply tint over the input's footprint when connected.
///
/// The tint is confined to the input's footprint: pixels the input leaves transparent
/// stay transparent instead of receiving a full-canvas overlay.
pub fn color(
    p: &ColorParams,
    input: Option<Artifact>,
    ctx: &mut OpContext<'_>,
) -> TexResult<Artifact> {
    let swatch = Shape::canvas_rect(
        ctx.res,
        Style {
            fill_opacity: (p.opacity < 1.0).then_some(p.opacity),
            ..Style::solid(p.color)
        },
    );
    let Some(input) = input else {
        return Ok(Fragment::single(swatch).into());
    };

    let Fragment { nodes, mut defs } = input.into_fragment(ctx.res)?;
    let mask = silhouette_mask(ctx, &mut defs, &nodes, Silhouette::White, false);
    let tint = Group::new(vec![swatch.into()])
        .with_mask(mask)
        .with_blend(BlendMode::Multiply);

    let mut children = nodes;
    children.push(tint.into());
    Ok(Fragment::new(vec![Group::isolated(children).into()], defs).into())
}

pub fn value(p: &ValueParams, res: Resolution) -> Fragment {
    let v = (p.value.clamp(0.0, 1.0) * 255.0).floor() as u8;
    Fragment::single(Shape::canvas_rect(res, Style::solid(Rgb::gray(v))))
}

pub fn alpha(p: &AlphaParams, input: Option<Artifact>, res: Resolution) -> TexResult<Artifact> {
    Ok(match input {
        Some(a) => {
            let Fragment { nodes, defs } = a.into_fragment(res)?;
            Fragment::new(vec![Group::new(nodes).with_opacity(p.value).into()], defs).into()
        }
        None => Fragment::single(Shape::canvas_rect(
            res,
            Style {
                fill_opacity: Some(p.value),
                ..Style::white()
            },
        ))
        .into(),
    })
}

/// Decodes the uploaded bitmap. No payload yields an empty artifact.
pub fn image(p: &ImageParams) -> TexResult<Artifact> {
    match &p.payload {
        Some(payload) => Ok(Artifact::raster(RasterImage::from_data_url(payload)?)),
        None => Ok(Artifact::empty()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        artifact::Domain,
        foundation::error::TexError,
        markup::{Def, Paint, SvgNode},
        raster::ResvgRasterizer,
    };

    fn res() -> Resolution {
        Resolution::new(64).unwrap()
    }

    #[test]
    fn color_without_input_is_a_solid_block() {
        let r = ResvgRasterizer::default();
        let mut ctx = OpContext::new(res(), &r);
        let p = ColorParams {
            color: Rgb::new(255, 0, 0),
            opacity: 1.0,
        };
        let Artifact::Vector(f) = color(&p, None, &mut ctx).unwrap() else {
            panic!("expected vector");
        };
        let [SvgNode::Shape(s)] = f.nodes.as_slice() else {
            panic!("expected one shape");
        };
        assert_eq!(s.style.fill, Paint::Color(Rgb::new(255, 0, 0)));
        assert_eq!(s.style.fill_opacity, None);
    }

    #[test]
    fn color_tint_keeps_input_and_adds_masked_multiply() {
        let r = ResvgRasterizer::default();
        let mut ctx = OpContext::new(res(), &r);
        let input = value(&ValueParams { value: 1.0 }, res());
        let Artifact::Vector(f) =
            color(&ColorParams::default(), Some(input.clone().into()), &mut ctx).unwrap()
        else {
            panic!("expected vector");
        };
        let [SvgNode::Group(g)] = f.nodes.as_slice() else {
            panic!("expected isolated group");
        };
        assert!(g.isolate);
        assert_eq!(g.children[0], input.nodes[0]);
        let SvgNode::Group(tint) = &g.children[1] else {
            panic!("expected tint group");
        };
        assert_eq!(tint.blend, BlendMode::Multiply);
        let mask_id = tint.mask.as_deref().unwrap();
        assert!(matches!(f.defs.get(mask_id), Some(Def::Mask(_))));
    }

    #[test]
    fn value_floors_to_byte() {
        let f = value(&ValueParams { value: 0.5 }, res());
        let SvgNode::Shape(s) = &f.nodes[0] else {
            panic!("expected shape");
        };
        assert_eq!(s.style.fill, Paint::Color(Rgb::gray(127)));
    }

    #[test]
    fn alpha_wraps_or_emits_translucent_white() {
        let a = alpha(&AlphaParams { value: 0.25 }, None, res()).unwrap();
        let Artifact::Vector(f) = a else {
            panic!("expected vector");
        };
        let SvgNode::Shape(s) = &f.nodes[0] else {
            panic!("expected shape");
        };
        assert_eq!(s.style.fill_opacity, Some(0.25));

        let wrapped = alpha(
            &AlphaParams { value: 0.5 },
            Some(value(&ValueParams::default(), res()).into()),
            res(),
        )
        .unwrap();
        let Artifact::Vector(f) = wrapped else {
            panic!("expected vector");
        };
        let SvgNode::Group(g) = &f.nodes[0] else {
            panic!("expected group");
        };
        assert_eq!(g.opacity, Some(0.5));
    }

    #[test]
    fn image_without_payload_is_empty() {
        assert!(image(&ImageParams::default()).unwrap().is_empty());
    }

    #[test]
    fn image_decodes_to_raster_domain() {
        let png = RasterImage::new(1, 1, vec![0, 0, 255, 255])
            .unwrap()
            .to_data_url()
            .unwrap();
        let a = image(&ImageParams {
            payload: Some(png),
        })
        .unwrap();
        assert_eq!(a.domain(), Domain::Raster);
    }

    #[test]
    fn undecodable_image_fails() {
        let err = image(&ImageParams {
            payload: Some("not an image".to_string()),
        })
        .unwrap_err();
        assert!(matches!(err, TexError::Rasterization(_)));
    }
}
