use kurbo::{Affine, Vec2};

use crate::{
    artifact::{Artifact, Fragment},
    foundation::{core::Resolution, error::TexResult},
    markup::Group,
    params::{RotateParams, ScaleParams, TranslateParams},
};

fn wrap(input: Option<Artifact>, res: Resolution, t: Affine) -> TexResult<Artifact> {
    let Some(input) = input else {
        return Ok(Artifact::empty());
    };
    let Fragment { nodes, defs } = input.into_fragment(res)?;
    Ok(Fragment::new(vec![Group::new(nodes).with_transform(t).into()], defs).into())
}

/// Offsets are fractions of the canvas edge.
pub fn translate(
    p: &TranslateParams,
    input: Option<Artifact>,
    res: Resolution,
) -> TexResult<Artifact> {
    let s = res.as_f64();
    wrap(input, res, Affine::translate(Vec2::new(p.x * s, p.y * s)))
}

/// Clockwise in screen space, about the canvas centre.
pub fn rotate(p: &RotateParams, input: Option<Artifact>, res: Resolution) -> TexResult<Artifact> {
    wrap(
        input,
        res,
        Affine::rotate_about(p.angle_deg.to_radians(), res.center()),
    )
}

pub fn scale(p: &ScaleParams, input: Option<Artifact>, res: Resolution) -> TexResult<Artifact> {
    wrap(input, res, Affine::scale_about(p.factor, res.center()))
}
