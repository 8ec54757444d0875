//! Operator families. Each operator maps typed parameters plus resolved upstream
//! artifacts to a new [`Artifact`].

pub mod filters;
pub mod generators;
pub mod inputs;
pub mod math;
pub mod polar;
pub mod transforms;

use kurbo::Rect;

use crate::{
    artifact::{Artifact, Fragment},
    foundation::{
        core::{Resolution, Rgb},
        error::TexResult,
    },
    markup::{
        ColorMatrix, Def, Definitions, Filter, FilterPrimitive, Geometry, Group, Mask, Region, Shape,
        Style, SvgNode,
    },
    model::{HANDLE_A, HANDLE_B, HANDLE_IN},
    params::OpParams,
    raster::Rasterizer,
};

/// Colour of the output node's placeholder when nothing is wired into it.
pub const PLACEHOLDER_FILL: Rgb = Rgb::gray(0x11);

/// Per-evaluation state shared by every operator call.
pub struct OpContext<'r> {
    pub res: Resolution,
    pub rasterizer: &'r dyn Rasterizer,
    next_id: u32,
}

impl<'r> OpContext<'r> {
    pub fn new(res: Resolution, rasterizer: &'r dyn Rasterizer) -> Self {
        Self {
            res,
            rasterizer,
            next_id: 0,
        }
    }

    /// Document-unique definition id. Deterministic for a given evaluation order.
    pub fn fresh_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}_{}", self.next_id)
    }
}

/// Resolved upstream artifacts, one slot per handle. `None` means unconnected.
#[derive(Clone, Debug, Default)]
pub struct Inputs {
    pub input: Option<Artifact>,
    pub a: Option<Artifact>,
    pub b: Option<Artifact>,
}

impl Inputs {
    pub fn single(a: Artifact) -> Self {
        Self {
            input: Some(a),
            ..Self::default()
        }
    }

    pub fn pair(a: Option<Artifact>, b: Option<Artifact>) -> Self {
        Self { input: None, a, b }
    }

    pub fn set(&mut self, handle: &str, artifact: Artifact) {
        match handle {
            HANDLE_IN => self.input = Some(artifact),
            HANDLE_A => self.a = Some(artifact),
            HANDLE_B => self.b = Some(artifact),
            _ => {}
        }
    }
}

impl From<Fragment> for Artifact {
    fn from(f: Fragment) -> Self {
        Artifact::Vector(f)
    }
}

pub fn apply(
    params: &OpParams,
    upstream: Inputs,
    ctx: &mut OpContext<'_>,
) -> TexResult<Artifact> {
    let Inputs { input, a, b } = upstream;
    Ok(match params {
        OpParams::Rectangle(p) => generators::rectangle(p, ctx.res).into(),
        OpParams::Circle(p) => generators::circle(p, ctx.res).into(),
        OpParams::Polygon(p) => generators::polygon(p, ctx.res).into(),
        OpParams::WavyRing(p) => generators::wavy_ring(p, ctx.res).into(),
        OpParams::Beam(p) => generators::beam(p, ctx).into(),
        OpParams::Gradient(p) => generators::gradient(p, ctx).into(),

        OpParams::Color(p) => inputs::color(p, input, ctx)?,
        OpParams::Value(p) => inputs::value(p, ctx.res).into(),
        OpParams::Alpha(p) => inputs::alpha(p, input, ctx.res)?,
        OpParams::Image(p) => inputs::image(p)?,

        OpParams::Math(op) => math::combine(*op, a, b, ctx)?.into(),

        OpParams::Fill(p) => filters::fill(p, input)?,
        OpParams::Stroke(p) => filters::stroke(p, input)?,
        OpParams::Glow(p) => filters::glow(p, input, ctx)?,
        OpParams::SoftBlur(p) => filters::soft_blur(p, input, ctx)?,
        OpParams::GradientFade(p) => filters::gradient_fade(p, input, ctx)?,
        OpParams::Pixelate(p) => filters::pixelate(p, input, ctx)?,

        OpParams::Translate(p) => transforms::translate(p, input, ctx.res)?,
        OpParams::Rotate(p) => transforms::rotate(p, input, ctx.res)?,
        OpParams::Scale(p) => transforms::scale(p, input, ctx.res)?,
        OpParams::Polar(p) => polar::polar(p, input, ctx)?,

        OpParams::Output => match input {
            Some(a) => a,
            None => Fragment::single(Shape::canvas_rect(ctx.res, Style::solid(PLACEHOLDER_FILL)))
                .into(),
        },
        OpParams::Unknown => Artifact::empty(),
    })
}

/// Region large enough for content pushed well off the canvas by later transforms.
pub(crate) fn work_region(res: Resolution) -> Region {
    let s = res.as_f64();
    Region::user_space(Rect::new(-s, -s, 2.0 * s, 2.0 * s))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Silhouette {
    White,
    Black,
}

impl Silhouette {
    fn filter_id(self) -> &'static str {
        match self {
            Self::White => "silhouette_white",
            Self::Black => "silhouette_black",
        }
    }

    /// Forces RGB to a constant and keeps alpha untouched.
    fn matrix(self) -> ColorMatrix {
        let c = match self {
            Self::White => 1.0,
            Self::Black => 0.0,
        };
        [
            0.0, 0.0, 0.0, 0.0, c, //
            0.0, 0.0, 0.0, 0.0, c, //
            0.0, 0.0, 0.0, 0.0, c, //
            0.0, 0.0, 0.0, 1.0, 0.0,
        ]
    }
}

/// Registers the silhouette filter once per document and returns its id.
pub(crate) fn silhouette_filter(defs: &mut Definitions, res: Resolution, kind: Silhouette) -> String {
    let id = kind.filter_id().to_string();
    defs.insert(Def::Filter(Filter {
        id: id.clone(),
        region: work_region(res),
        primitives: vec![FilterPrimitive::ColorMatrix {
            input: "SourceGraphic".to_string(),
            values: kind.matrix(),
            result: "silhouette".to_string(),
        }],
    }));
    id
}

/// Builds a luminance mask from `nodes`' footprint and returns its id.
///
/// With `backdrop`, the mask starts fully open and the footprint (drawn black) punches
/// a hole; without it, only the footprint (drawn white) is visible.
pub(crate) fn silhouette_mask(
    ctx: &mut OpContext<'_>,
    defs: &mut Definitions,
    nodes: &[SvgNode],
    kind: Silhouette,
    backdrop: bool,
) -> String {
    let filter = silhouette_filter(defs, ctx.res, kind);
    let region = work_region(ctx.res);
    let mut content = Vec::with_capacity(2);
    if backdrop {
        content.push(SvgNode::Shape(Shape::new(
            Geometry::Rect(region.rect),
            Style::white(),
        )));
    }
    content.push(Group::new(nodes.to_vec()).with_filter(filter).into());

    let id = ctx.fresh_id("mask");
    defs.insert(Def::Mask(Mask {
        id: id.clone(),
        region,
        content,
    }));
    id
}
