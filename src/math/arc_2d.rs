//! Circular arc utilities used by round joins, round caps and extrapolated joins.
//!
//! Arcs are described by `(center, radius, start_angle, sweep)`; a positive
//! sweep runs counter-clockwise.
use std::f64::consts::{FRAC_PI_2, TAU};

use super::{Point2, Vector2};

/// Evaluates a point on an arc at parameter `t` in `[0, 1]`.
#[must_use]
pub fn arc_point_at(center: &Point2, radius: f64, start_angle: f64, sweep: f64, t: f64) -> Point2 {
    let angle = start_angle + sweep * t;
    Point2::new(center.x + radius * angle.cos(), center.y + radius * angle.sin())
}

/// Sweep angle from `start_angle` to `end_angle` in the requested direction.
///
/// The result lies in `[0, 2π)` for counter-clockwise and `(-2π, 0]` for
/// clockwise travel.
#[must_use]
pub fn sweep_between(start_angle: f64, end_angle: f64, ccw: bool) -> f64 {
    let mut sweep = (end_angle - start_angle) % TAU;
    if ccw {
        if sweep < 0.0 {
            sweep += TAU;
        }
    } else if sweep > 0.0 {
        sweep -= TAU;
    }
    sweep
}

/// Approximates an arc by cubic Bézier pieces of at most a quarter turn.
///
/// Returns `(ctrl1, ctrl2, end)` triples; the first piece starts at the arc's
/// start point.
#[must_use]
pub fn arc_to_cubics(
    center: &Point2,
    radius: f64,
    start_angle: f64,
    sweep: f64,
) -> Vec<(Point2, Point2, Point2)> {
    if sweep.abs() < 1e-12 || radius < 1e-12 {
        return Vec::new();
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let pieces = ((sweep.abs() / FRAC_PI_2).ceil() as usize).max(1);
    #[allow(clippy::cast_precision_loss)]
    let step = sweep / pieces as f64;
    let k = 4.0 / 3.0 * (step / 4.0).tan();

    let mut out = Vec::with_capacity(pieces);
    let mut angle = start_angle;
    for _ in 0..pieces {
        let next = angle + step;
        let p0 = arc_point_at(center, radius, angle, 1.0, 0.0);
        let p3 = arc_point_at(center, radius, next, 1.0, 0.0);
        let t0 = Vector2::new(-angle.sin(), angle.cos()) * (radius * k);
        let t3 = Vector2::new(-next.sin(), next.cos()) * (radius * k);
        out.push((p0 + t0, p3 - t3, p3));
        angle = next;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sweep_direction() {
        assert!((sweep_between(0.0, FRAC_PI_2, true) - FRAC_PI_2).abs() < 1e-12);
        assert!((sweep_between(0.0, FRAC_PI_2, false) + 3.0 * FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn quarter_circle_is_one_piece() {
        let pieces = arc_to_cubics(&Point2::origin(), 1.0, 0.0, FRAC_PI_2);
        assert_eq!(pieces.len(), 1);
        let (c1, c2, end) = pieces[0];
        assert!((end.x).abs() < 1e-12 && (end.y - 1.0).abs() < 1e-12);
        // Classic kappa constant for a quarter circle.
        assert!((c1.y - 0.552_284_749_8).abs() < 1e-6);
        assert!((c2.x - 0.552_284_749_8).abs() < 1e-6);
    }

    #[test]
    fn half_circle_clockwise() {
        use std::f64::consts::PI;
        let pieces = arc_to_cubics(&Point2::origin(), 2.0, 0.0, -PI);
        assert_eq!(pieces.len(), 2);
        let end = pieces[1].2;
        assert!((end.x + 2.0).abs() < 1e-12);
        assert!(end.y.abs() < 1e-12);
        // The midpoint passes through the bottom of the circle.
        assert!((pieces[0].2.y + 2.0).abs() < 1e-12);
    }
}
