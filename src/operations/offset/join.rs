//! Corner joins between consecutive offset pieces.
//!
//! A join connects the end of one offset piece (`start`) to the beginning of
//! the next (`end`). Both lie at distance `|width|` from the shared corner of
//! the source path (`origin`). On the inside of a turn the join just routes
//! through the origin; the self-union run afterwards removes the overlap.
use std::f64::consts::PI;

use crate::geometry::Segment;
use crate::math::arc_2d::{arc_to_cubics, sweep_between};
use crate::math::intersect_2d::{
    circle_circle_intersect_2d, line_circle_intersect_2d, line_line_intersect_2d,
};
use crate::math::polygon_2d::left_normal;
use crate::math::{cross, Point2, Vector2, TOLERANCE};

use super::style::LineJoin;

/// Turns flatter than this (sine of the angle) are treated as smooth.
const SMOOTH_SIN: f64 = 1e-9;

/// Corner data handed to [`outline_join`].
///
/// Curvatures are sampled on the source path: `in_curvature[0]` at the very
/// end of the incoming segment and further entries progressively earlier;
/// `out_curvature[0]` at the very start of the outgoing segment and further
/// entries progressively later.
#[derive(Debug, Clone, Copy)]
pub struct JoinGeometry {
    pub origin: Point2,
    pub start: Point2,
    pub in_tangent: Vector2,
    pub end: Point2,
    pub out_tangent: Vector2,
    pub in_curvature: [f64; 3],
    pub out_curvature: [f64; 3],
}

impl JoinGeometry {
    /// Corner between two straight pieces.
    #[must_use]
    pub fn straight(origin: Point2, in_tangent: Vector2, out_tangent: Vector2, width: f64) -> Self {
        Self {
            origin,
            start: origin + left_normal(in_tangent) * width,
            in_tangent,
            end: origin + left_normal(out_tangent) * width,
            out_tangent,
            in_curvature: [0.0; 3],
            out_curvature: [0.0; 3],
        }
    }

    /// Returns whether the join lies on the outside of the turn for a
    /// signed offset `width`.
    #[must_use]
    pub fn is_outside(&self, width: f64) -> bool {
        cross(&self.in_tangent, &self.out_tangent) * width <= 0.0
    }

    fn is_smooth(&self) -> bool {
        cross(&self.in_tangent, &self.out_tangent).abs() < SMOOTH_SIN
            && self.in_tangent.dot(&self.out_tangent) > 0.0
    }
}

/// Builds the segments joining `geom.start` to `geom.end`.
///
/// `width` is the signed offset distance (positive to the left of travel).
/// The returned segments start at `geom.start`; the last one ends exactly at
/// `geom.end`. An empty result means the two points already coincide.
#[must_use]
pub fn outline_join(geom: &JoinGeometry, width: f64, join: LineJoin, miter_limit: f64) -> Vec<Segment> {
    if (geom.end - geom.start).norm() < TOLERANCE {
        return Vec::new();
    }
    if geom.is_smooth() {
        return vec![Segment::line(geom.end)];
    }
    if !geom.is_outside(width) {
        return vec![Segment::line(geom.origin), Segment::line(geom.end)];
    }
    let limit = miter_limit * width.abs();
    match join {
        LineJoin::Bevel => bevel(geom),
        LineJoin::Round => round(geom, width),
        LineJoin::Miter => miter_point(geom)
            .filter(|tip| (tip - geom.origin).norm() <= limit)
            .map_or_else(|| bevel(geom), |tip| through(geom, tip)),
        LineJoin::MiterClip => miter_clip(geom, limit),
        LineJoin::Extrapolate
        | LineJoin::Extrapolate1
        | LineJoin::Extrapolate2
        | LineJoin::Extrapolate3 => {
            let (k_in, k_out) = sampled_curvatures(geom, join);
            extrapolate(geom, width, k_in, k_out, limit)
                .unwrap_or_else(|| miter_clip(geom, limit))
        }
    }
}

fn bevel(geom: &JoinGeometry) -> Vec<Segment> {
    vec![Segment::line(geom.end)]
}

fn through(geom: &JoinGeometry, tip: Point2) -> Vec<Segment> {
    vec![Segment::line(tip), Segment::line(geom.end)]
}

/// Arc around the origin from `start` to `end` along the outside of the turn.
fn round(geom: &JoinGeometry, width: f64) -> Vec<Segment> {
    let radius = width.abs();
    let u1 = geom.start - geom.origin;
    let u2 = geom.end - geom.origin;
    // Sweep towards the incoming direction so U-turns bulge forward.
    let angle = cross(&u1, &u2).abs().atan2(u1.dot(&u2));
    let sweep = if cross(&u1, &geom.in_tangent) >= 0.0 { angle } else { -angle };
    let mut out: Vec<Segment> = arc_to_cubics(&geom.origin, radius, u1.y.atan2(u1.x), sweep)
        .into_iter()
        .map(|(c1, c2, to)| Segment::cubic(c1, c2, to))
        .collect();
    snap_last(&mut out, geom.end);
    out
}

/// Intersection of the two offset tangent lines ahead of `start`.
fn miter_point(geom: &JoinGeometry) -> Option<Point2> {
    let (s, u) = line_line_intersect_2d(&geom.start, &geom.in_tangent, &geom.end, &geom.out_tangent)?;
    (s >= 0.0 && u <= 0.0).then(|| geom.start + geom.in_tangent * s)
}

/// Miter cut perpendicular to the corner bisector at distance `limit`.
fn miter_clip(geom: &JoinGeometry, limit: f64) -> Vec<Segment> {
    if let Some(tip) = miter_point(geom) {
        if (tip - geom.origin).norm() <= limit {
            return through(geom, tip);
        }
    }
    let bisector = (geom.start - geom.origin) + (geom.end - geom.origin);
    if bisector.norm() < TOLERANCE {
        return bevel(geom);
    }
    let b = bisector.normalize();
    let along_in = geom.in_tangent.dot(&b);
    let along_out = geom.out_tangent.dot(&b);
    if along_in.abs() < TOLERANCE || along_out.abs() < TOLERANCE {
        return bevel(geom);
    }
    let s1 = (limit - (geom.start - geom.origin).dot(&b)) / along_in;
    let s2 = (limit - (geom.end - geom.origin).dot(&b)) / along_out;
    if s1 < 0.0 || s2 > 0.0 {
        return bevel(geom);
    }
    vec![
        Segment::line(geom.start + geom.in_tangent * s1),
        Segment::line(geom.end + geom.out_tangent * s2),
        Segment::line(geom.end),
    ]
}

fn sampled_curvatures(geom: &JoinGeometry, join: LineJoin) -> (f64, f64) {
    let mean = |k: &[f64]| {
        #[allow(clippy::cast_precision_loss)]
        let n = k.len() as f64;
        k.iter().sum::<f64>() / n
    };
    match join {
        LineJoin::Extrapolate1 => (mean(&geom.in_curvature[..2]), mean(&geom.out_curvature[..2])),
        LineJoin::Extrapolate2 => (mean(&geom.in_curvature), mean(&geom.out_curvature)),
        LineJoin::Extrapolate3 => {
            let blended = 0.5 * (geom.in_curvature[0] + geom.out_curvature[0]);
            (blended, blended)
        }
        _ => (geom.in_curvature[0], geom.out_curvature[0]),
    }
}

/// The continuation of one side of the corner: a tangent line or a circle.
#[derive(Debug, Clone, Copy)]
enum Extension {
    Line { anchor: Point2, dir: Vector2 },
    Circle { center: Point2, radius: f64, ccw: bool },
}

impl Extension {
    /// Extension of a source curve with curvature `k` after offsetting it by
    /// `width`, passing through `anchor` with tangent `dir`.
    fn new(anchor: Point2, dir: Vector2, k: f64, width: f64) -> Self {
        let denom = 1.0 - k * width;
        if k.abs() < TOLERANCE || denom.abs() < TOLERANCE {
            return Self::Line { anchor, dir };
        }
        let k_off = k / denom;
        let radius_signed = 1.0 / k_off;
        Self::Circle {
            center: anchor + left_normal(dir) * radius_signed,
            radius: radius_signed.abs(),
            ccw: k_off > 0.0,
        }
    }
}

/// Extends both sides along their circles of curvature and meets them.
///
/// Returns `None` when the extensions do not meet within the miter limit.
fn extrapolate(geom: &JoinGeometry, width: f64, k_in: f64, k_out: f64, limit: f64) -> Option<Vec<Segment>> {
    let first = Extension::new(geom.start, geom.in_tangent, k_in, width);
    let second = Extension::new(geom.end, geom.out_tangent, k_out, width);
    let candidates = meet(&first, &second);

    let tip = candidates
        .into_iter()
        .filter(|p| (p - geom.origin).norm() <= limit)
        .filter(|p| ahead(&first, geom.start, geom.in_tangent, *p, true))
        .filter(|p| ahead(&second, geom.end, geom.out_tangent, *p, false))
        .min_by(|a, b| (a - geom.origin).norm().total_cmp(&(b - geom.origin).norm()))?;

    let mut out = follow(&first, geom.start, tip);
    out.extend(follow(&second, tip, geom.end));
    snap_last(&mut out, geom.end);
    Some(out)
}

fn meet(a: &Extension, b: &Extension) -> Vec<Point2> {
    match (*a, *b) {
        (Extension::Line { anchor: p1, dir: d1 }, Extension::Line { anchor: p2, dir: d2 }) => {
            line_line_intersect_2d(&p1, &d1, &p2, &d2)
                .map(|(s, _)| p1 + d1 * s)
                .into_iter()
                .collect()
        }
        (Extension::Line { anchor, dir }, Extension::Circle { center, radius, .. })
        | (Extension::Circle { center, radius, .. }, Extension::Line { anchor, dir }) => {
            line_circle_intersect_2d(&anchor, &dir, &center, radius)
                .into_iter()
                .map(|s| anchor + dir * s)
                .collect()
        }
        (
            Extension::Circle { center: c1, radius: r1, .. },
            Extension::Circle { center: c2, radius: r2, .. },
        ) => circle_circle_intersect_2d(&c1, r1, &c2, r2),
    }
}

/// Whether `p` is reached by travelling forward from `anchor` (incoming
/// side) or backward into `anchor` (outgoing side) by less than half a turn.
fn ahead(ext: &Extension, anchor: Point2, dir: Vector2, p: Point2, forward: bool) -> bool {
    let sign = if forward { 1.0 } else { -1.0 };
    match *ext {
        Extension::Line { .. } => (p - anchor).dot(&dir) * sign >= -TOLERANCE,
        Extension::Circle { center, ccw, .. } => {
            let (from, to) = if forward { (anchor, p) } else { (p, anchor) };
            arc_sweep(center, from, to, ccw).abs() <= PI
        }
    }
}

fn arc_sweep(center: Point2, from: Point2, to: Point2, ccw: bool) -> f64 {
    let a0 = (from.y - center.y).atan2(from.x - center.x);
    let a1 = (to.y - center.y).atan2(to.x - center.x);
    sweep_between(a0, a1, ccw)
}

fn follow(ext: &Extension, from: Point2, to: Point2) -> Vec<Segment> {
    match *ext {
        Extension::Line { .. } => vec![Segment::line(to)],
        Extension::Circle { center, radius, ccw } => {
            let start_angle = (from.y - center.y).atan2(from.x - center.x);
            let sweep = arc_sweep(center, from, to, ccw);
            let mut out: Vec<Segment> = arc_to_cubics(&center, radius, start_angle, sweep)
                .into_iter()
                .map(|(c1, c2, end)| Segment::cubic(c1, c2, end))
                .collect();
            if out.is_empty() {
                out.push(Segment::line(to));
            }
            snap_last(&mut out, to);
            out
        }
    }
}

/// Replaces the end of the last segment with the exact target point.
fn snap_last(segments: &mut Vec<Segment>, target: Point2) {
    match segments.last_mut() {
        Some(Segment::Line { to } | Segment::Cubic { to, .. }) => *to = target,
        None => segments.push(Segment::line(target)),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn dir(deg: f64) -> Vector2 {
        let r = deg.to_radians();
        Vector2::new(r.cos(), r.sin())
    }

    /// Right turn by `turn` degrees at the origin, offset to the left (outside).
    fn right_turn(turn: f64) -> JoinGeometry {
        JoinGeometry::straight(Point2::origin(), dir(0.0), dir(-turn), 1.0)
    }

    #[test]
    fn bevel_is_single_chord() {
        let geom = right_turn(90.0);
        let out = outline_join(&geom, 1.0, LineJoin::Bevel, 4.0);
        assert_eq!(out, vec![Segment::line(geom.end)]);
    }

    #[test]
    fn miter_reaches_corner_tip() {
        let geom = right_turn(90.0);
        let out = outline_join(&geom, 1.0, LineJoin::Miter, 4.0);
        assert_eq!(out.len(), 2);
        let tip = out[0].end();
        assert!((tip - Point2::new(1.0, 1.0)).norm() < 1e-9);
        assert_eq!(out[1].end(), geom.end);
    }

    #[test]
    fn sharp_miter_falls_back_to_bevel() {
        // A 170 degree turn leaves a 10 degree corner; its spike is far past the limit.
        let geom = right_turn(170.0);
        let out = outline_join(&geom, 1.0, LineJoin::Miter, 1.0);
        assert_eq!(out, vec![Segment::line(geom.end)]);
    }

    #[test]
    fn miter_clip_cuts_at_limit() {
        let geom = right_turn(150.0);
        let out = outline_join(&geom, 1.0, LineJoin::MiterClip, 2.0);
        assert_eq!(out.len(), 3);
        let b = ((geom.start - geom.origin) + (geom.end - geom.origin)).normalize();
        for seg in &out[..2] {
            assert!(((seg.end() - geom.origin).dot(&b) - 2.0).abs() < 1e-9);
        }
    }

    #[test]
    fn round_join_stays_on_circle() {
        let geom = right_turn(90.0);
        let out = outline_join(&geom, 1.0, LineJoin::Round, 4.0);
        assert_eq!(out.len(), 1);
        let mid = out[0].point_at(geom.start, 0.5);
        assert!(((mid - geom.origin).norm() - 1.0).abs() < 1e-3);
        assert_eq!(out[0].end(), geom.end);
    }

    #[test]
    fn inside_corner_routes_through_origin() {
        // Left turn with a left offset is on the inside.
        let geom = JoinGeometry::straight(Point2::origin(), dir(0.0), dir(90.0), 1.0);
        let out = outline_join(&geom, 1.0, LineJoin::Miter, 4.0);
        assert_eq!(out, vec![Segment::line(geom.origin), Segment::line(geom.end)]);
    }

    #[test]
    fn straight_extrapolate_matches_miter() {
        let geom = right_turn(90.0);
        let out = outline_join(&geom, 1.0, LineJoin::Extrapolate, 4.0);
        assert!((out[0].end() - Point2::new(1.0, 1.0)).norm() < 1e-9);
        assert_eq!(out.last().unwrap().end(), geom.end);
    }

    #[test]
    fn extrapolate_past_limit_clips() {
        let geom = right_turn(160.0);
        let out = outline_join(&geom, 1.0, LineJoin::Extrapolate2, 1.5);
        assert_eq!(out.len(), 3);
    }

    #[test]
    fn curved_extrapolate_meets_on_both_circles() {
        let mut geom = right_turn(90.0);
        // Incoming side bends left with radius 4 before the corner.
        geom.in_curvature = [0.25; 3];
        let out = outline_join(&geom, 1.0, LineJoin::Extrapolate1, 4.0);
        assert!(!out.is_empty());
        assert_eq!(out.last().unwrap().end(), geom.end);
        let tip = out[out.len() - 2].end();
        // Tip lies on the outgoing tangent line, behind the end point.
        assert!((tip.x - geom.end.x).abs() < 1e-9);
        assert!(tip.y > geom.end.y);
    }
}
