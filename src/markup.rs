//! Typed SVG fragment tree.
//!
//! Operators build and rewrite these nodes structurally; text only appears when a
//! [`Document`] is serialised for output or rasterization.

pub mod defs;

use std::fmt::Write as _;

use kurbo::{Affine, BezPath, Point, Rect};

use crate::foundation::core::{Resolution, Rgb};

pub use defs::{
    ColorMatrix, Def, Definitions, Filter, FilterPrimitive, LinearGradient, Mask, Region, Stop,
    Units,
};

#[derive(Clone, Debug, PartialEq)]
pub enum Paint {
    None,
    Color(Rgb),
    /// Reference to a definition id (gradient).
    Url(String),
}

/// Presentation attributes carried by every shape.
#[derive(Clone, Debug, PartialEq)]
pub struct Style {
    pub fill: Paint,
    pub fill_opacity: Option<f64>,
    pub stroke: Paint,
    pub stroke_width: Option<f64>,
    pub stroke_opacity: Option<f64>,
}

impl Style {
    /// Solid fill, no stroke.
    pub fn solid(color: Rgb) -> Self {
        Self {
            fill: Paint::Color(color),
            fill_opacity: None,
            stroke: Paint::None,
            stroke_width: None,
            stroke_opacity: None,
        }
    }

    /// White is fully visible under a luminance mask.
    pub fn white() -> Self {
        Self::solid(Rgb::WHITE)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Geometry {
    Path(BezPath),
    Rect(Rect),
    Circle { center: Point, r: f64 },
    Ellipse { center: Point, rx: f64, ry: f64 },
    Polygon(Vec<Point>),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Shape {
    pub geometry: Geometry,
    pub style: Style,
}

impl Shape {
    pub fn new(geometry: Geometry, style: Style) -> Self {
        Self { geometry, style }
    }

    /// Axis-aligned rect covering `0..res` in both directions.
    pub fn canvas_rect(res: Resolution, style: Style) -> Self {
        let s = res.as_f64();
        Self::new(Geometry::Rect(Rect::new(0.0, 0.0, s, s)), style)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BlendMode {
    #[default]
    Normal,
    Multiply,
    /// Additive, clamping (linear dodge).
    PlusLighter,
    Exclusion,
}

impl BlendMode {
    pub fn css_name(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Multiply => "multiply",
            Self::PlusLighter => "plus-lighter",
            Self::Exclusion => "exclusion",
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Group {
    pub transform: Option<Affine>,
    pub opacity: Option<f64>,
    /// Filter definition id.
    pub filter: Option<String>,
    /// Mask definition id.
    pub mask: Option<String>,
    pub blend: BlendMode,
    /// Scope blend modes of the children to this group.
    pub isolate: bool,
    pub children: Vec<SvgNode>,
}

impl Group {
    pub fn new(children: Vec<SvgNode>) -> Self {
        Self {
            children,
            ..Self::default()
        }
    }

    pub fn isolated(children: Vec<SvgNode>) -> Self {
        Self {
            isolate: true,
            children,
            ..Self::default()
        }
    }

    pub fn with_transform(mut self, t: Affine) -> Self {
        self.transform = Some(t);
        self
    }

    pub fn with_opacity(mut self, o: f64) -> Self {
        self.opacity = Some(o);
        self
    }

    pub fn with_filter(mut self, id: impl Into<String>) -> Self {
        self.filter = Some(id.into());
        self
    }

    pub fn with_mask(mut self, id: impl Into<String>) -> Self {
        self.mask = Some(id.into());
        self
    }

    pub fn with_blend(mut self, blend: BlendMode) -> Self {
        self.blend = blend;
        self
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ImageRendering {
    #[default]
    Smooth,
    /// Nearest-neighbour scaling hint.
    Pixelated,
}

/// Embedded bitmap stretched to its box without preserving aspect ratio.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageNode {
    pub rect: Rect,
    pub href: String,
    pub rendering: ImageRendering,
}

#[derive(Clone, Debug, PartialEq)]
pub enum SvgNode {
    Shape(Shape),
    Group(Group),
    Image(ImageNode),
}

impl From<Shape> for SvgNode {
    fn from(s: Shape) -> Self {
        Self::Shape(s)
    }
}

impl From<Group> for SvgNode {
    fn from(g: Group) -> Self {
        Self::Group(g)
    }
}

impl From<ImageNode> for SvgNode {
    fn from(i: ImageNode) -> Self {
        Self::Image(i)
    }
}

impl SvgNode {
    /// Visits every shape in this subtree. Images are opaque and never visited.
    pub fn for_each_style_mut(&mut self, f: &mut impl FnMut(&mut Style)) {
        match self {
            SvgNode::Shape(s) => f(&mut s.style),
            SvgNode::Group(g) => {
                for c in &mut g.children {
                    c.for_each_style_mut(f);
                }
            }
            SvgNode::Image(_) => {}
        }
    }
}

/// Standalone SVG document: definitions, optional full-canvas background, content.
#[derive(Clone, Debug, PartialEq)]
pub struct Document {
    pub resolution: Resolution,
    pub defs: Definitions,
    pub background: Option<Rgb>,
    pub content: Vec<SvgNode>,
}

impl Document {
    pub fn to_svg_string(&self) -> String {
        let s = num(self.resolution.as_f64());
        let mut out = String::with_capacity(1024);
        let _ = write!(
            out,
            r#"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink" viewBox="0 0 {s} {s}" width="{s}" height="{s}">"#
        );
        out.push_str("<defs>");
        for d in self.defs.iter() {
            defs::write_def(&mut out, d);
        }
        out.push_str("</defs>");
        if let Some(bg) = self.background {
            let _ = write!(
                out,
                r#"<rect x="0" y="0" width="{s}" height="{s}" fill="{}"/>"#,
                bg.to_hex()
            );
        }
        out.push_str("<g>");
        write_nodes(&mut out, &self.content);
        out.push_str("</g></svg>");
        out
    }
}

pub fn write_nodes(out: &mut String, nodes: &[SvgNode]) {
    for n in nodes {
        write_node(out, n);
    }
}

/// Serialises nodes without a surrounding document.
pub fn nodes_to_string(nodes: &[SvgNode]) -> String {
    let mut out = String::new();
    write_nodes(&mut out, nodes);
    out
}

fn write_node(out: &mut String, node: &SvgNode) {
    match node {
        SvgNode::Shape(s) => write_shape(out, s),
        SvgNode::Group(g) => write_group(out, g),
        SvgNode::Image(i) => write_image(out, i),
    }
}

fn write_shape(out: &mut String, s: &Shape) {
    match &s.geometry {
        Geometry::Path(p) => {
            let _ = write!(out, r#"<path d="{}""#, p.to_svg());
        }
        Geometry::Rect(r) => {
            let _ = write!(
                out,
                r#"<rect x="{}" y="{}" width="{}" height="{}""#,
                num(r.x0),
                num(r.y0),
                num(r.width()),
                num(r.height())
            );
        }
        Geometry::Circle { center, r } => {
            let _ = write!(
                out,
                r#"<circle cx="{}" cy="{}" r="{}""#,
                num(center.x),
                num(center.y),
                num(*r)
            );
        }
        Geometry::Ellipse { center, rx, ry } => {
            let _ = write!(
                out,
                r#"<ellipse cx="{}" cy="{}" rx="{}" ry="{}""#,
                num(center.x),
                num(center.y),
                num(*rx),
                num(*ry)
            );
        }
        Geometry::Polygon(pts) => {
            let points = pts
                .iter()
                .map(|p| format!("{},{}", num(p.x), num(p.y)))
                .collect::<Vec<_>>()
                .join(" ");
            let _ = write!(out, r#"<polygon points="{points}""#);
        }
    }
    write_style(out, &s.style);
    out.push_str("/>");
}

fn write_style(out: &mut String, st: &Style) {
    let _ = write!(out, r#" fill="{}""#, paint(&st.fill));
    if let Some(o) = st.fill_opacity {
        let _ = write!(out, r#" fill-opacity="{}""#, num(o));
    }
    let _ = write!(out, r#" stroke="{}""#, paint(&st.stroke));
    if let Some(w) = st.stroke_width {
        let _ = write!(out, r#" stroke-width="{}""#, num(w));
    }
    if let Some(o) = st.stroke_opacity {
        let _ = write!(out, r#" stroke-opacity="{}""#, num(o));
    }
}

fn write_group(out: &mut String, g: &Group) {
    out.push_str("<g");
    if let Some(t) = g.transform {
        let _ = write!(out, r#" transform="{}""#, matrix(t));
    }
    if let Some(o) = g.opacity {
        let _ = write!(out, r#" opacity="{}""#, num(o));
    }
    if let Some(f) = &g.filter {
        let _ = write!(out, r#" filter="url(#{})""#, escape_xml(f));
    }
    if let Some(m) = &g.mask {
        let _ = write!(out, r#" mask="url(#{})""#, escape_xml(m));
    }
    let mut css = Vec::new();
    if g.blend != BlendMode::Normal {
        css.push(format!("mix-blend-mode:{}", g.blend.css_name()));
    }
    if g.isolate {
        css.push("isolation:isolate".to_string());
    }
    if !css.is_empty() {
        let _ = write!(out, r#" style="{}""#, css.join(";"));
    }
    out.push('>');
    write_nodes(out, &g.children);
    out.push_str("</g>");
}

fn write_image(out: &mut String, i: &ImageNode) {
    let _ = write!(
        out,
        r#"<image x="{}" y="{}" width="{}" height="{}" preserveAspectRatio="none""#,
        num(i.rect.x0),
        num(i.rect.y0),
        num(i.rect.width()),
        num(i.rect.height())
    );
    if i.rendering == ImageRendering::Pixelated {
        out.push_str(r#" image-rendering="optimizeSpeed""#);
    }
    let _ = write!(out, r#" xlink:href="{}"/>"#, escape_xml(&i.href));
}

fn paint(p: &Paint) -> String {
    match p {
        Paint::None => "none".to_string(),
        Paint::Color(c) => c.to_hex(),
        Paint::Url(id) => format!("url(#{})", escape_xml(id)),
    }
}

pub(crate) fn matrix(t: Affine) -> String {
    let [a, b, c, d, e, f] = t.as_coeffs();
    format!(
        "matrix({} {} {} {} {} {})",
        num(a),
        num(b),
        num(c),
        num(d),
        num(e),
        num(f)
    )
}

/// Formats a coordinate; non-finite values collapse to `0`.
pub(crate) fn num(v: f64) -> String {
    if !v.is_finite() {
        return "0".to_string();
    }
    let r = (v * 1e4).round() / 1e4;
    if r == 0.0 { "0".to_string() } else { format!("{r}") }
}

pub(crate) fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}
