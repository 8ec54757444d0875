//! Boolean combiners over painted regions.
//!
//! Shape footprints are derived from alpha only (see [`Silhouette`]), so the colour of
//! an input never changes where the other input is clipped.

use super::{OpContext, Silhouette, silhouette_mask};
use crate::{
    artifact::{Artifact, Fragment},
    foundation::error::TexResult,
    markup::{BlendMode, Group},
    params::MathOp,
};

pub fn combine(
    op: MathOp,
    a: Option<Artifact>,
    b: Option<Artifact>,
    ctx: &mut OpContext<'_>,
) -> TexResult<Fragment> {
    let res = ctx.res;
    let Fragment {
        nodes: a_nodes,
        mut defs,
    } = a.unwrap_or_default().into_fragment(res)?;
    let Fragment {
        nodes: b_nodes,
        defs: b_defs,
    } = b.unwrap_or_default().into_fragment(res)?;
    defs.merge(b_defs);

    let children = match op {
        MathOp::Union => vec![
            Group::new(a_nodes).into(),
            Group::new(b_nodes).with_blend(BlendMode::PlusLighter).into(),
        ],
        MathOp::Difference => {
            let hide_b = silhouette_mask(ctx, &mut defs, &b_nodes, Silhouette::Black, true);
            vec![Group::new(a_nodes).with_mask(hide_b).into()]
        }
        MathOp::Intersection => {
            let only_b = silhouette_mask(ctx, &mut defs, &b_nodes, Silhouette::White, false);
            let only_a = silhouette_mask(ctx, &mut defs, &a_nodes, Silhouette::White, false);
            vec![
                Group::new(a_nodes).with_mask(only_b).into(),
                Group::new(b_nodes)
                    .with_mask(only_a)
                    .with_blend(BlendMode::Multiply)
                    .into(),
            ]
        }
        MathOp::Exclusion => vec![
            Group::new(a_nodes).into(),
            Group::new(b_nodes).with_blend(BlendMode::Exclusion).into(),
        ],
    };

    Ok(Fragment::new(vec![Group::isolated(children).into()], defs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        foundation::core::Resolution,
        markup::{Def, Definitions, SvgNode},
        ops::generators,
        params::{BeamParams, CircleParams, RectangleParams},
        raster::ResvgRasterizer,
    };

    fn ids(d: &Definitions) -> Vec<String> {
        d.iter().map(|d| d.id().to_string()).collect()
    }

    #[test]
    fn every_op_wraps_in_an_isolated_group() {
        let r = ResvgRasterizer::default();
        let mut ctx = OpContext::new(Resolution::default(), &r);
        for op in [
            MathOp::Union,
            MathOp::Difference,
            MathOp::Intersection,
            MathOp::Exclusion,
        ] {
            let a = generators::rectangle(&RectangleParams::default(), ctx.res);
            let b = generators::circle(&CircleParams::default(), ctx.res);
            let f = combine(op, Some(a.into()), Some(b.into()), &mut ctx).unwrap();
            let [SvgNode::Group(g)] = f.nodes.as_slice() else {
                panic!("{op:?}: expected a single group");
            };
            assert!(g.isolate, "{op:?}");
        }
    }

    #[test]
    fn shared_input_definitions_are_not_duplicated() {
        let r = ResvgRasterizer::default();
        let mut ctx = OpContext::new(Resolution::default(), &r);
        let beam: Artifact = generators::beam(&BeamParams::default(), &mut ctx).into();
        let f = combine(
            MathOp::Intersection,
            Some(beam.clone()),
            Some(beam),
            &mut ctx,
        )
        .unwrap();
        let ids = ids(&f.defs);
        let mut unique = ids.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(ids.len(), unique.len());
        // beam gradient + white silhouette filter + two masks
        assert_eq!(ids.len(), 4);
        assert!(ids.iter().any(|id| id.starts_with("beam_")));
    }

    #[test]
    fn difference_masks_a_with_black_footprint_over_white() {
        let r = ResvgRasterizer::default();
        let mut ctx = OpContext::new(Resolution::default(), &r);
        let a = generators::rectangle(&RectangleParams::default(), ctx.res);
        let b = generators::circle(&CircleParams::default(), ctx.res);
        let f = combine(MathOp::Difference, Some(a.into()), Some(b.into()), &mut ctx).unwrap();
        assert!(f.defs.contains("silhouette_black"));
        let mask = f
            .defs
            .iter()
            .find_map(|d| match d {
                Def::Mask(m) => Some(m),
                _ => None,
            })
            .unwrap();
        assert_eq!(mask.content.len(), 2);
    }

    #[test]
    fn missing_inputs_are_empty_markup() {
        let r = ResvgRasterizer::default();
        let mut ctx = OpContext::new(Resolution::default(), &r);
        let f = combine(MathOp::Union, None, None, &mut ctx).unwrap();
        let [SvgNode::Group(g)] = f.nodes.as_slice() else {
            panic!("expected group");
        };
        assert!(g.children.iter().all(|c| match c {
            SvgNode::Group(inner) => inner.children.is_empty(),
            _ => false,
        }));
        assert!(f.defs.is_empty());
    }
}
