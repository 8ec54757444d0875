//! Shape generators. All output is a single white-filled shape centred on the canvas.

use kurbo::{Affine, BezPath, Rect};

use super::OpContext;
use crate::{
    artifact::Fragment,
    foundation::core::{Resolution, Rgb},
    markup::{Def, Definitions, Geometry, LinearGradient, Paint, Shape, Stop, Style, Units},
    params::{BeamParams, CircleParams, GradientParams, PolygonParams, RectangleParams, WavyRingParams},
    paths,
};

/// Opacity profile of the beam, top to bottom.
const BEAM_STOPS: [(f64, f64); 3] = [(0.0, 1.0), (0.6, 0.05), (1.0, 0.0)];

fn centred(path: BezPath, res: Resolution, style: Style) -> Fragment {
    let placed = Affine::translate(res.center().to_vec2()) * path;
    Fragment::single(Shape::new(Geometry::Path(placed), style))
}

pub fn rectangle(p: &RectangleParams, res: Resolution) -> Fragment {
    let path = paths::rounded_rect(
        p.width,
        p.height,
        [p.radius_tl, p.radius_tr, p.radius_br, p.radius_bl],
    );
    centred(path, res, Style::white())
}

pub fn circle(p: &CircleParams, res: Resolution) -> Fragment {
    centred(paths::ellipse(p.width / 2.0, p.height / 2.0), res, Style::white())
}

pub fn polygon(p: &PolygonParams, res: Resolution) -> Fragment {
    centred(
        paths::star(p.points, p.outer_radius, p.inner_radius),
        res,
        Style::white(),
    )
}

pub fn wavy_ring(p: &WavyRingParams, res: Resolution) -> Fragment {
    centred(
        paths::wavy_ring(p.radius, p.frequency, p.amplitude),
        res,
        Style::white(),
    )
}

pub fn beam(p: &BeamParams, ctx: &mut OpContext<'_>) -> Fragment {
    let id = ctx.fresh_id("beam");
    let mut frag = centred(
        paths::beam(p.length, p.top_width, p.bottom_width),
        ctx.res,
        Style {
            fill: Paint::Url(id.clone()),
            ..Style::white()
        },
    );
    frag.defs.insert(Def::LinearGradient(LinearGradient {
        id,
        units: Units::ObjectBoundingBox,
        x1: 0.0,
        y1: 0.0,
        x2: 0.0,
        y2: 1.0,
        transform: None,
        stops: BEAM_STOPS
            .iter()
            .map(|&(offset, opacity)| Stop {
                offset,
                color: Rgb::WHITE,
                opacity,
            })
            .collect(),
    }));
    frag
}

/// Gradient axis endpoints in bounding-box units, centred on `(0.5, 0.5)`.
fn gradient_axis(dx: f64, dy: f64) -> (f64, f64, f64, f64) {
    let len = dx.hypot(dy);
    let (ux, uy) = if len > 1e-9 && len.is_finite() {
        (dx / len, dy / len)
    } else {
        (1.0, 0.0)
    };
    (
        0.5 - ux / 2.0,
        0.5 - uy / 2.0,
        0.5 + ux / 2.0,
        0.5 + uy / 2.0,
    )
}

pub fn gradient(p: &GradientParams, ctx: &mut OpContext<'_>) -> Fragment {
    let id = ctx.fresh_id("gradient");
    let (x1, y1, x2, y2) = gradient_axis(p.direction_x, p.direction_y);
    let power = if p.power > 0.0 { p.power } else { 1.0 };
    let stops = p
        .stops()
        .iter()
        .map(|s| Stop {
            offset: s.offset.clamp(0.0, 1.0).powf(power),
            color: s.color,
            opacity: s.opacity,
        })
        .collect();

    let s = ctx.res.as_f64();
    let shape = Shape::new(
        Geometry::Rect(Rect::new(0.0, 0.0, s, s)),
        Style {
            fill: Paint::Url(id.clone()),
            ..Style::white()
        },
    );
    let defs: Definitions = [Def::LinearGradient(LinearGradient {
        id,
        units: Units::ObjectBoundingBox,
        x1,
        y1,
        x2,
        y2,
        transform: None,
        stops,
    })]
    .into_iter()
    .collect();
    Fragment::new(vec![shape.into()], defs)
}
