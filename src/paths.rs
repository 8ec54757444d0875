//! Parametric 2D path generators.
//!
//! Every generator returns geometry centred on the origin; callers place it with an
//! [`Affine`](crate::foundation::core::Affine).

use std::f64::consts::{FRAC_PI_2, TAU};

use kurbo::{BezPath, Ellipse, Point, Rect, RoundedRect, RoundedRectRadii, Shape};

/// Flattening tolerance used when converting arcs to cubic segments.
const TOLERANCE: f64 = 0.1;

/// Number of samples around a wavy ring.
pub const WAVY_RING_STEPS: u32 = 360;

/// Rectangle with independent corner radii (top-left, top-right, bottom-right, bottom-left).
///
/// Radii larger than half the shorter side are clamped.
pub fn rounded_rect(width: f64, height: f64, radii: [f64; 4]) -> BezPath {
    let rect = Rect::new(-width / 2.0, -height / 2.0, width / 2.0, height / 2.0);
    let [tl, tr, br, bl] = radii;
    RoundedRect::from_rect(rect, RoundedRectRadii::new(tl, tr, br, bl)).to_path(TOLERANCE)
}

pub fn ellipse(rx: f64, ry: f64) -> BezPath {
    Ellipse::new(Point::ORIGIN, (rx, ry), 0.0).to_path(TOLERANCE)
}

/// Star (or regular polygon when `inner == outer`) with `points` spokes, first spoke at the top.
pub fn star(points: u32, outer: f64, inner: f64) -> BezPath {
    let total = points.max(3) * 2;
    let mut path = BezPath::new();
    for i in 0..total {
        let r = if i % 2 == 0 { outer } else { inner };
        let angle = TAU * f64::from(i) / f64::from(total) - FRAC_PI_2;
        let p = Point::new(r * angle.cos(), r * angle.sin());
        if i == 0 {
            path.move_to(p);
        } else {
            path.line_to(p);
        }
    }
    path.close_path();
    path
}

/// Ring whose radius is perturbed by `amplitude * sin(angle * frequency)`.
pub fn wavy_ring(radius: f64, frequency: f64, amplitude: f64) -> BezPath {
    let mut path = BezPath::new();
    for i in 0..=WAVY_RING_STEPS {
        let angle = f64::from(i) / f64::from(WAVY_RING_STEPS) * TAU;
        let r = radius + (angle * frequency).sin() * amplitude;
        let p = Point::new(r * angle.cos(), r * angle.sin());
        if i == 0 {
            path.move_to(p);
        } else {
            path.line_to(p);
        }
    }
    path.close_path();
    path
}

/// Trapezoid with the narrow edge on top.
pub fn beam(length: f64, top_width: f64, bottom_width: f64) -> BezPath {
    let (hl, ht, hb) = (length / 2.0, top_width / 2.0, bottom_width / 2.0);
    let mut path = BezPath::new();
    path.move_to((-ht, -hl));
    path.line_to((ht, -hl));
    path.line_to((hb, hl));
    path.line_to((-hb, hl));
    path.close_path();
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn rect_bbox_is_centred() {
        let bb = rounded_rect(300.0, 200.0, [0.0; 4]).bounding_box();
        assert!(approx(bb.x0, -150.0) && approx(bb.x1, 150.0));
        assert!(approx(bb.y0, -100.0) && approx(bb.y1, 100.0));
    }

    #[test]
    fn rounded_corners_shrink_area() {
        let sharp = rounded_rect(100.0, 100.0, [0.0; 4]).area().abs();
        let round = rounded_rect(100.0, 100.0, [50.0; 4]).area().abs();
        assert!(approx(sharp, 10_000.0));
        // All corners at half-size radius form a circle of radius 50.
        assert!((round - std::f64::consts::PI * 2500.0).abs() < 5.0);
    }

    #[test]
    fn star_starts_at_top_and_alternates() {
        let path = star(5, 100.0, 50.0);
        let els = path.elements();
        // 10 vertices + close
        assert_eq!(els.len(), 11);
        let kurbo::PathEl::MoveTo(p0) = els[0] else {
            panic!("expected move_to first");
        };
        assert!(approx(p0.x, 0.0) && approx(p0.y, -100.0));
        let kurbo::PathEl::LineTo(p1) = els[1] else {
            panic!("expected line_to");
        };
        assert!(approx(p1.to_vec2().hypot(), 50.0));
    }

    #[test]
    fn star_clamps_point_count() {
        assert_eq!(star(1, 10.0, 5.0).elements().len(), 7);
    }

    #[test]
    fn wavy_ring_samples_fixed_steps() {
        let path = wavy_ring(100.0, 10.0, 10.0);
        assert_eq!(path.elements().len() as u32, WAVY_RING_STEPS + 2);
        let bb = path.bounding_box();
        assert!(bb.x1 <= 110.0 + 1e-9 && bb.x1 >= 90.0);
    }

    #[test]
    fn beam_is_narrow_on_top() {
        let bb = beam(250.0, 5.0, 100.0).bounding_box();
        assert!(approx(bb.y0, -125.0) && approx(bb.y1, 125.0));
        assert!(approx(bb.width(), 100.0));
        assert!(beam(250.0, 5.0, 100.0).contains(Point::new(0.0, -120.0)));
        assert!(!beam(250.0, 5.0, 100.0).contains(Point::new(20.0, -120.0)));
    }
}
