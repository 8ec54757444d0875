use std::fmt::Write as _;

use kurbo::{Affine, Rect};

use super::{SvgNode, escape_xml, matrix, num, write_nodes};
use crate::foundation::core::Rgb;

/// Coordinate system of a gradient, filter or mask region.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Units {
    #[default]
    ObjectBoundingBox,
    UserSpaceOnUse,
}

impl Units {
    fn as_str(self) -> &'static str {
        match self {
            Self::ObjectBoundingBox => "objectBoundingBox",
            Self::UserSpaceOnUse => "userSpaceOnUse",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Region {
    pub units: Units,
    pub rect: Rect,
}

impl Region {
    /// Fractions of the element's bounding box, e.g. `-2.0` for `-200%`.
    pub fn bbox(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self {
            units: Units::ObjectBoundingBox,
            rect: Rect::new(x, y, x + w, y + h),
        }
    }

    pub fn user_space(rect: Rect) -> Self {
        Self {
            units: Units::UserSpaceOnUse,
            rect,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Stop {
    pub offset: f64,
    pub color: Rgb,
    pub opacity: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LinearGradient {
    pub id: String,
    pub units: Units,
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    pub transform: Option<Affine>,
    pub stops: Vec<Stop>,
}

/// Row-major 4x5 colour matrix as `feColorMatrix type="matrix"` expects.
pub type ColorMatrix = [f64; 20];

#[derive(Clone, Debug, PartialEq)]
pub enum FilterPrimitive {
    GaussianBlur {
        input: String,
        std_dev: f64,
        result: String,
    },
    ColorMatrix {
        input: String,
        values: ColorMatrix,
        result: String,
    },
    /// Later inputs paint over earlier ones.
    Merge { inputs: Vec<String>, result: String },
}

#[derive(Clone, Debug, PartialEq)]
pub struct Filter {
    pub id: String,
    pub region: Region,
    pub primitives: Vec<FilterPrimitive>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Mask {
    pub id: String,
    pub region: Region,
    pub content: Vec<SvgNode>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Def {
    LinearGradient(LinearGradient),
    Filter(Filter),
    Mask(Mask),
}

impl Def {
    pub fn id(&self) -> &str {
        match self {
            Def::LinearGradient(g) => &g.id,
            Def::Filter(f) => &f.id,
            Def::Mask(m) => &m.id,
        }
    }
}

/// Ordered set of definitions keyed by id. The first entry with a given id wins.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Definitions {
    items: Vec<Def>,
}

impl Definitions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` when an entry with the same id is already present.
    pub fn insert(&mut self, def: Def) -> bool {
        if self.contains(def.id()) {
            return false;
        }
        self.items.push(def);
        true
    }

    pub fn merge(&mut self, other: Definitions) {
        for d in other.items {
            self.insert(d);
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.items.iter().any(|d| d.id() == id)
    }

    pub fn get(&self, id: &str) -> Option<&Def> {
        self.items.iter().find(|d| d.id() == id)
    }

    pub(crate) fn get_index(&self, i: usize) -> Option<&Def> {
        self.items.get(i)
    }

    pub(crate) fn mask_content_mut(&mut self, i: usize) -> Option<&mut Vec<SvgNode>> {
        match self.items.get_mut(i)? {
            Def::Mask(m) => Some(&mut m.content),
            _ => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Def> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl FromIterator<Def> for Definitions {
    fn from_iter<I: IntoIterator<Item = Def>>(iter: I) -> Self {
        let mut d = Definitions::new();
        for def in iter {
            d.insert(def);
        }
        d
    }
}

pub(super) fn write_def(out: &mut String, def: &Def) {
    match def {
        Def::LinearGradient(g) => write_gradient(out, g),
        Def::Filter(f) => write_filter(out, f),
        Def::Mask(m) => write_mask(out, m),
    }
}

fn write_gradient(out: &mut String, g: &LinearGradient) {
    let _ = write!(
        out,
        r#"<linearGradient id="{}" gradientUnits="{}" x1="{}" y1="{}" x2="{}" y2="{}""#,
        escape_xml(&g.id),
        g.units.as_str(),
        num(g.x1),
        num(g.y1),
        num(g.x2),
        num(g.y2)
    );
    if let Some(t) = g.transform {
        let _ = write!(out, r#" gradientTransform="{}""#, matrix(t));
    }
    out.push('>');
    for s in &g.stops {
        let _ = write!(
            out,
            r#"<stop offset="{}" stop-color="{}" stop-opacity="{}"/>"#,
            num(s.offset),
            s.color.to_hex(),
            num(s.opacity)
        );
    }
    out.push_str("</linearGradient>");
}

fn write_region(out: &mut String, prefix: &str, r: &Region) {
    let _ = write!(
        out,
        r#" {prefix}Units="{}" x="{}" y="{}" width="{}" height="{}""#,
        r.units.as_str(),
        num(r.rect.x0),
        num(r.rect.y0),
        num(r.rect.width()),
        num(r.rect.height())
    );
}

fn write_filter(out: &mut String, f: &Filter) {
    let _ = write!(out, r#"<filter id="{}""#, escape_xml(&f.id));
    write_region(out, "filter", &f.region);
    out.push_str(r#" color-interpolation-filters="sRGB">"#);
    for p in &f.primitives {
        match p {
            FilterPrimitive::GaussianBlur {
                input,
                std_dev,
                result,
            } => {
                let _ = write!(
                    out,
                    r#"<feGaussianBlur in="{}" stdDeviation="{}" result="{}"/>"#,
                    escape_xml(input),
                    num(*std_dev),
                    escape_xml(result)
                );
            }
            FilterPrimitive::ColorMatrix {
                input,
                values,
                result,
            } => {
                let v = values.iter().map(|x| num(*x)).collect::<Vec<_>>().join(" ");
                let _ = write!(
                    out,
                    r#"<feColorMatrix in="{}" type="matrix" values="{v}" result="{}"/>"#,
                    escape_xml(input),
                    escape_xml(result)
                );
            }
            FilterPrimitive::Merge { inputs, result } => {
                let _ = write!(out, r#"<feMerge result="{}">"#, escape_xml(result));
                for i in inputs {
                    let _ = write!(out, r#"<feMergeNode in="{}"/>"#, escape_xml(i));
                }
                out.push_str("</feMerge>");
            }
        }
    }
    out.push_str("</filter>");
}

fn write_mask(out: &mut String, m: &Mask) {
    let _ = write!(out, r#"<mask id="{}""#, escape_xml(&m.id));
    write_region(out, "mask", &m.region);
    out.push('>');
    write_nodes(out, &m.content);
    out.push_str("</mask>");
}
