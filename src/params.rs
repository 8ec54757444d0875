use crate::{
    foundation::core::Rgb,
    model::{OperatorKind, Params},
};

/// Typed parameter set for every operator, decoded from a node's open parameter bag.
///
/// Decoding never fails: a missing, non-finite or wrong-typed value resolves to the
/// operator's documented default, and unknown keys are ignored.
#[derive(Clone, Debug, PartialEq)]
pub enum OpParams {
    Rectangle(RectangleParams),
    Circle(CircleParams),
    Polygon(PolygonParams),
    WavyRing(WavyRingParams),
    Beam(BeamParams),
    Gradient(GradientParams),
    Color(ColorParams),
    Value(ValueParams),
    Alpha(AlphaParams),
    Image(ImageParams),
    Math(MathOp),
    Fill(FillParams),
    Glow(GlowParams),
    SoftBlur(SoftBlurParams),
    Stroke(StrokeParams),
    GradientFade(GradientFadeParams),
    Pixelate(PixelateParams),
    Translate(TranslateParams),
    Rotate(RotateParams),
    Scale(ScaleParams),
    Polar(PolarParams),
    Output,
    Unknown,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RectangleParams {
    pub width: f64,
    pub height: f64,
    pub radius_tl: f64,
    pub radius_tr: f64,
    pub radius_br: f64,
    pub radius_bl: f64,
}

impl Default for RectangleParams {
    fn default() -> Self {
        Self {
            width: 300.0,
            height: 300.0,
            radius_tl: 0.0,
            radius_tr: 0.0,
            radius_br: 0.0,
            radius_bl: 0.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CircleParams {
    pub width: f64,
    pub height: f64,
}

impl Default for CircleParams {
    fn default() -> Self {
        Self {
            width: 300.0,
            height: 300.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PolygonParams {
    pub points: u32,
    pub outer_radius: f64,
    pub inner_radius: f64,
}

impl Default for PolygonParams {
    fn default() -> Self {
        Self {
            points: 5,
            outer_radius: 100.0,
            inner_radius: 50.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WavyRingParams {
    pub radius: f64,
    pub frequency: f64,
    pub amplitude: f64,
}

impl Default for WavyRingParams {
    fn default() -> Self {
        Self {
            radius: 100.0,
            frequency: 20.0,
            amplitude: 10.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BeamParams {
    pub length: f64,
    pub top_width: f64,
    pub bottom_width: f64,
}

impl Default for BeamParams {
    fn default() -> Self {
        Self {
            length: 250.0,
            top_width: 5.0,
            bottom_width: 100.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GradientStop {
    /// Position along the gradient axis in `[0, 1]`.
    pub offset: f64,
    pub color: Rgb,
    pub opacity: f64,
}

impl GradientStop {
    pub fn new(offset: f64, color: Rgb) -> Self {
        Self {
            offset: offset.clamp(0.0, 1.0),
            color,
            opacity: 1.0,
        }
    }
}

/// Linear gradient generator. `stops` is kept sorted ascending by offset by every mutator.
#[derive(Clone, Debug, PartialEq)]
pub struct GradientParams {
    stops: Vec<GradientStop>,
    pub direction_x: f64,
    pub direction_y: f64,
    /// Exponent applied to each stop offset before emission.
    pub power: f64,
}

impl Default for GradientParams {
    fn default() -> Self {
        Self {
            stops: vec![
                GradientStop::new(0.0, Rgb::BLACK),
                GradientStop::new(1.0, Rgb::WHITE),
            ],
            direction_x: 1.0,
            direction_y: 0.0,
            power: 1.0,
        }
    }
}

impl GradientParams {
    pub fn new(stops: Vec<GradientStop>) -> Self {
        let mut p = Self {
            stops,
            ..Self::default()
        };
        p.sort_stops();
        p
    }

    pub fn stops(&self) -> &[GradientStop] {
        &self.stops
    }

    pub fn insert_stop(&mut self, stop: GradientStop) {
        self.stops.push(GradientStop {
            offset: stop.offset.clamp(0.0, 1.0),
            ..stop
        });
        self.sort_stops();
    }

    pub fn set_stop_offset(&mut self, index: usize, offset: f64) -> bool {
        let Some(stop) = self.stops.get_mut(index) else {
            return false;
        };
        stop.offset = offset.clamp(0.0, 1.0);
        self.sort_stops();
        true
    }

    pub fn remove_stop(&mut self, index: usize) -> Option<GradientStop> {
        (index < self.stops.len()).then(|| self.stops.remove(index))
    }

    fn sort_stops(&mut self) {
        self.stops.sort_by(|a, b| a.offset.total_cmp(&b.offset));
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColorParams {
    pub color: Rgb,
    pub opacity: f64,
}

impl Default for ColorParams {
    fn default() -> Self {
        Self {
            color: Rgb::WHITE,
            opacity: 1.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ValueParams {
    /// Luminance in `[0, 1]`.
    pub value: f64,
}

impl Default for ValueParams {
    fn default() -> Self {
        Self { value: 0.5 }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AlphaParams {
    pub value: f64,
}

impl Default for AlphaParams {
    fn default() -> Self {
        Self { value: 1.0 }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ImageParams {
    /// `data:` URL or bare base64 payload of the uploaded bitmap.
    pub payload: Option<String>,
}

/// CSG-style combiners, named after the geometric operation each one performs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MathOp {
    Union,
    Difference,
    Intersection,
    Exclusion,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FillParams {
    pub fill_enabled: bool,
    pub stroke_width: f64,
}

impl Default for FillParams {
    fn default() -> Self {
        Self {
            fill_enabled: true,
            stroke_width: 0.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GlowKind {
    Glow,
    Neon,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GlowParams {
    pub kind: GlowKind,
    pub radius: f64,
    pub intensity: f64,
}

impl GlowParams {
    pub fn defaults_for(kind: GlowKind) -> Self {
        match kind {
            GlowKind::Glow => Self {
                kind,
                radius: 20.0,
                intensity: 1.5,
            },
            GlowKind::Neon => Self {
                kind,
                radius: 15.0,
                intensity: 2.0,
            },
        }
    }

    /// Standard deviations of the wide and tight blur layers.
    pub fn blur_radii(&self) -> (f64, f64) {
        match self.kind {
            GlowKind::Glow => (10.0 + self.radius, self.radius / 3.0),
            GlowKind::Neon => (self.radius, self.radius / 4.0),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SoftBlurParams {
    pub radius: f64,
}

impl Default for SoftBlurParams {
    fn default() -> Self {
        Self { radius: 5.0 }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StrokeParams {
    pub width: f64,
    pub opacity: f64,
}

impl Default for StrokeParams {
    fn default() -> Self {
        Self {
            width: 1.0,
            opacity: 1.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GradientFadeParams {
    /// Degrees; the left-to-right ramp is rotated by `direction - 90` about the centre.
    pub direction: f64,
    pub start: f64,
    pub end: f64,
}

impl Default for GradientFadeParams {
    fn default() -> Self {
        Self {
            direction: 90.0,
            start: 1.0,
            end: 0.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PixelateParams {
    pub pixel_size: u32,
}

impl Default for PixelateParams {
    fn default() -> Self {
        Self { pixel_size: 8 }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TranslateParams {
    /// Offsets as fractions of the resolution.
    pub x: f64,
    pub y: f64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RotateParams {
    pub angle_deg: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScaleParams {
    pub factor: f64,
}

impl Default for ScaleParams {
    fn default() -> Self {
        Self { factor: 1.0 }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PolarMode {
    /// Rect to polar ("burst").
    #[default]
    RectToPolar,
    /// Polar to rect ("ring").
    PolarToRect,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PolarParams {
    pub mode: PolarMode,
    pub offset_x: f64,
    pub offset_y: f64,
    pub radial_scale: f64,
    pub angular_scale: f64,
}

impl Default for PolarParams {
    fn default() -> Self {
        Self {
            mode: PolarMode::RectToPolar,
            offset_x: 0.0,
            offset_y: 0.0,
            radial_scale: 1.0,
            angular_scale: 1.0,
        }
    }
}

pub fn parse_params(kind: OperatorKind, p: &Params) -> OpParams {
    match kind {
        OperatorKind::Rectangle => {
            let d = RectangleParams::default();
            OpParams::Rectangle(RectangleParams {
                width: non_neg(p, "width", d.width),
                height: non_neg(p, "height", d.height),
                radius_tl: non_neg(p, "rTL", d.radius_tl),
                radius_tr: non_neg(p, "rTR", d.radius_tr),
                radius_br: non_neg(p, "rBR", d.radius_br),
                radius_bl: non_neg(p, "rBL", d.radius_bl),
            })
        }
        OperatorKind::Circle => {
            let d = CircleParams::default();
            OpParams::Circle(CircleParams {
                width: non_neg(p, "width", d.width),
                height: non_neg(p, "height", d.height),
            })
        }
        OperatorKind::Polygon => {
            let d = PolygonParams::default();
            OpParams::Polygon(PolygonParams {
                points: get_f64(p, "points")
                    .map(|v| v.round().clamp(3.0, 1024.0) as u32)
                    .unwrap_or(d.points),
                outer_radius: non_neg(p, "outerRadius", d.outer_radius),
                inner_radius: non_neg(p, "innerRadius", d.inner_radius),
            })
        }
        OperatorKind::WavyRing => {
            let d = WavyRingParams::default();
            OpParams::WavyRing(WavyRingParams {
                radius: non_neg(p, "radius", d.radius),
                frequency: get_f64(p, "frequency").unwrap_or(d.frequency),
                amplitude: get_f64(p, "amplitude").unwrap_or(d.amplitude),
            })
        }
        OperatorKind::Beam => {
            let d = BeamParams::default();
            OpParams::Beam(BeamParams {
                length: non_neg(p, "length", d.length),
                top_width: non_neg(p, "topWidth", d.top_width),
                bottom_width: non_neg(p, "bottomWidth", d.bottom_width),
            })
        }
        OperatorKind::Gradient => OpParams::Gradient(parse_gradient(p)),
        OperatorKind::Color => OpParams::Color(ColorParams {
            color: parse_rgb(p, Rgb::WHITE),
            opacity: unit(p, "opacity")
                .or_else(|| unit(p, "a"))
                .unwrap_or(1.0),
        }),
        OperatorKind::Value => OpParams::Value(ValueParams {
            value: unit(p, "value").unwrap_or(ValueParams::default().value),
        }),
        OperatorKind::Alpha => OpParams::Alpha(AlphaParams {
            value: unit(p, "value").unwrap_or(AlphaParams::default().value),
        }),
        OperatorKind::Image => OpParams::Image(ImageParams {
            payload: get_str(p, "image")
                .filter(|s| !s.trim().is_empty())
                .map(str::to_string),
        }),
        OperatorKind::Add => OpParams::Math(MathOp::Union),
        OperatorKind::Subtract => OpParams::Math(MathOp::Difference),
        OperatorKind::Multiply => OpParams::Math(MathOp::Intersection),
        OperatorKind::Divide => OpParams::Math(MathOp::Exclusion),
        OperatorKind::Fill => {
            let d = FillParams::default();
            OpParams::Fill(FillParams {
                fill_enabled: get_bool(p, "fillEnabled").unwrap_or(d.fill_enabled),
                stroke_width: non_neg(p, "strokeWidth", d.stroke_width),
            })
        }
        OperatorKind::Glow => OpParams::Glow(parse_glow(p, GlowKind::Glow)),
        OperatorKind::Neon => OpParams::Glow(parse_glow(p, GlowKind::Neon)),
        OperatorKind::SoftBlur => OpParams::SoftBlur(SoftBlurParams {
            radius: non_neg(p, "radius", SoftBlurParams::default().radius),
        }),
        OperatorKind::Stroke => {
            let d = StrokeParams::default();
            OpParams::Stroke(StrokeParams {
                width: non_neg(p, "width", d.width),
                opacity: unit(p, "opacity").unwrap_or(d.opacity),
            })
        }
        OperatorKind::GradientFade => {
            let d = GradientFadeParams::default();
            OpParams::GradientFade(GradientFadeParams {
                direction: get_f64(p, "direction").unwrap_or(d.direction),
                start: unit(p, "start").unwrap_or(d.start),
                end: unit(p, "end").unwrap_or(d.end),
            })
        }
        OperatorKind::Pixelate => OpParams::Pixelate(PixelateParams {
            pixel_size: get_f64(p, "pixelSize")
                .map(|v| v.round().clamp(1.0, 4096.0) as u32)
                .unwrap_or(PixelateParams::default().pixel_size),
        }),
        OperatorKind::Translate => OpParams::Translate(TranslateParams {
            x: get_f64(p, "x").unwrap_or(0.0),
            y: get_f64(p, "y").unwrap_or(0.0),
        }),
        OperatorKind::Rotate => OpParams::Rotate(RotateParams {
            angle_deg: get_f64(p, "angle").unwrap_or(0.0),
        }),
        OperatorKind::Scale => OpParams::Scale(ScaleParams {
            factor: get_f64(p, "scale").unwrap_or(1.0),
        }),
        OperatorKind::Polar => {
            let d = PolarParams::default();
            OpParams::Polar(PolarParams {
                mode: match get_str(p, "type").map(|s| s.trim().to_ascii_lowercase()) {
                    Some(s) if matches!(s.as_str(), "polar_to_rect" | "ring") => {
                        PolarMode::PolarToRect
                    }
                    _ => PolarMode::RectToPolar,
                },
                offset_x: get_f64(p, "x").unwrap_or(d.offset_x),
                offset_y: get_f64(p, "y").unwrap_or(d.offset_y),
                radial_scale: get_f64(p, "radialScale").unwrap_or(d.radial_scale),
                angular_scale: get_f64(p, "angularScale").unwrap_or(d.angular_scale),
            })
        }
        OperatorKind::Output => OpParams::Output,
        OperatorKind::Unknown => OpParams::Unknown,
    }
}

fn parse_glow(p: &Params, kind: GlowKind) -> GlowParams {
    let d = GlowParams::defaults_for(kind);
    GlowParams {
        kind,
        radius: non_neg(p, "radius", d.radius),
        intensity: non_neg(p, "intensity", d.intensity),
    }
}

fn parse_gradient(p: &Params) -> GradientParams {
    let d = GradientParams::default();
    let stops = match p.get("stops").and_then(|v| v.as_array()) {
        Some(items) => items
            .iter()
            .filter_map(|v| v.as_object())
            .map(|s| GradientStop {
                offset: unit(s, "offset").unwrap_or(0.0),
                color: parse_rgb(s, Rgb::WHITE),
                opacity: unit(s, "opacity").unwrap_or(1.0),
            })
            .collect::<Vec<_>>(),
        None => d.stops.clone(),
    };
    let mut out = GradientParams::new(if stops.is_empty() { d.stops } else { stops });
    out.direction_x = get_f64(p, "directionX").unwrap_or(d.direction_x);
    out.direction_y = get_f64(p, "directionY").unwrap_or(d.direction_y);
    out.power = get_f64(p, "power")
        .filter(|v| *v > 0.0)
        .unwrap_or(d.power);
    out
}

/// Reads `r`/`g`/`b` either from the bag itself or from a nested `color` object.
fn parse_rgb(p: &Params, default: Rgb) -> Rgb {
    let src = p
        .get("color")
        .and_then(|v| v.as_object())
        .unwrap_or(p);
    let channel = |key: &str, d: u8| {
        get_f64(src, key)
            .map(|v| v.round().clamp(0.0, 255.0) as u8)
            .unwrap_or(d)
    };
    Rgb::new(
        channel("r", default.r),
        channel("g", default.g),
        channel("b", default.b),
    )
}

fn get_f64(p: &Params, key: &str) -> Option<f64> {
    let v = p.get(key)?;
    let n = match v {
        serde_json::Value::Number(n) => n.as_f64()?,
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

fn non_neg(p: &Params, key: &str, default: f64) -> f64 {
    get_f64(p, key).map(|v| v.max(0.0)).unwrap_or(default)
}

fn unit(p: &Params, key: &str) -> Option<f64> {
    get_f64(p, key).map(|v| v.clamp(0.0, 1.0))
}

fn get_bool(p: &Params, key: &str) -> Option<bool> {
    match p.get(key)? {
        serde_json::Value::Bool(b) => Some(*b),
        serde_json::Value::String(s) => match s.trim() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        },
        serde_json::Value::Number(n) => n.as_f64().map(|v| v != 0.0),
        _ => None,
    }
}

fn get_str<'a>(p: &'a Params, key: &str) -> Option<&'a str> {
    p.get(key)?.as_str()
}
