use tracing::trace;

use crate::error::Result;
use crate::geometry::{Path, Segment};
use crate::math::intersect_2d::{line_line_intersect_2d, segment_segment_intersect_2d};
use crate::math::polygon_2d::left_normal;
use crate::math::{Point2, Vector2, TOLERANCE};

use super::join::{outline_join, JoinGeometry};
use super::style::{auto_tolerance, LineJoin, StrokeStyle};

/// One source segment after offsetting: an offset polyline plus the source
/// data needed to join it to its neighbours.
#[derive(Debug, Clone)]
struct Piece {
    points: Vec<Point2>,
    source_end: Point2,
    start_tangent: Vector2,
    end_tangent: Vector2,
    start_curvature: [f64; 3],
    end_curvature: [f64; 3],
}

impl Piece {
    fn first(&self) -> Point2 {
        self.points[0]
    }

    fn last(&self) -> Point2 {
        self.points[self.points.len() - 1]
    }
}

/// Offsets one side of a path by a signed distance, without cleanup.
///
/// Every segment is moved along its left normal by `distance` (negative
/// distances move right). Cubics are flattened and offset point by point.
/// Corners are joined with the configured [`LineJoin`]; inside corners are
/// trimmed where the neighbouring offset pieces cross.
///
/// The result may self-intersect. A path with fewer than two distinct points
/// yields a path without segments.
#[derive(Debug)]
pub struct HalfOutline<'a> {
    path: &'a Path,
    distance: f64,
    join: LineJoin,
    miter_limit: f64,
    tolerance: f64,
    corner_loops: bool,
}

impl<'a> HalfOutline<'a> {
    /// Creates a new half-outline with bevel joins and automatic tolerance.
    #[must_use]
    pub fn new(path: &'a Path, distance: f64) -> Self {
        Self {
            path,
            distance,
            join: LineJoin::Bevel,
            miter_limit: 4.0,
            tolerance: auto_tolerance(distance),
            corner_loops: false,
        }
    }

    /// Takes join type, miter limit and tolerance from `style`.
    #[must_use]
    pub fn with_style(mut self, style: &StrokeStyle) -> Self {
        self.join = style.join();
        self.miter_limit = style.miter_limit();
        self.tolerance = style.tolerance();
        self
    }

    /// Routes inside corners whose pieces do not cross through the source
    /// corner even on open paths. The loops this leaves are meant to be
    /// removed by a following self-union.
    #[must_use]
    pub fn with_corner_loops(mut self) -> Self {
        self.corner_loops = true;
        self
    }

    /// Executes the offset.
    ///
    /// # Errors
    ///
    /// Returns an error if the path has non-finite coordinates.
    pub fn execute(&self) -> Result<Path> {
        self.path.validate()?;
        let mut pieces = self.pieces();
        if pieces.is_empty() {
            return Ok(Path::new(self.path.start));
        }
        let count = pieces.len();

        let mut connectors = Vec::with_capacity(count);
        for i in 0..count {
            let next = i + 1;
            if next < count {
                connectors.push(self.join(&mut pieces, i, next));
            } else if self.path.closed {
                connectors.push(self.join(&mut pieces, i, 0));
            }
        }

        let mut out = Path::new(pieces[0].first());
        for (i, piece) in pieces.iter().enumerate() {
            for p in &piece.points[1..] {
                out.segments.push(Segment::line(*p));
            }
            if let Some(connector) = connectors.get(i) {
                out.segments.extend(connector.iter().copied());
            }
        }
        if self.path.closed {
            // The last join may have moved the first point; re-anchor on it.
            if let Some(Segment::Line { to } | Segment::Cubic { to, .. }) = out.segments.last_mut() {
                *to = out.start;
            }
            out.closed = true;
        }
        trace!(
            pieces = count,
            segments = out.segments.len(),
            "half outline built"
        );
        Ok(out)
    }

    /// Offsets every non-degenerate source segment.
    fn pieces(&self) -> Vec<Piece> {
        let d = self.distance;
        let mut pieces = Vec::new();
        for (from, seg) in self.path.iter_segments() {
            if seg.is_degenerate(from, TOLERANCE) {
                continue;
            }
            let (Some(t0), Some(t1)) = (seg.unit_tangent(from, 0.0), seg.unit_tangent(from, 1.0))
            else {
                continue;
            };
            let points = match seg {
                Segment::Line { to } => {
                    let n = left_normal(t0) * d;
                    vec![from + n, to + n]
                }
                Segment::Cubic { .. } => {
                    let curve = seg.to_cubic(from);
                    let mut points = vec![from + left_normal(t0) * d];
                    for (t, p) in curve.flatten(self.tolerance) {
                        if let Some(tangent) = curve.unit_tangent(t) {
                            points.push(p + left_normal(tangent) * d);
                        }
                    }
                    points
                }
            };
            if points.len() < 2 {
                continue;
            }
            let k = |t: f64| seg.curvature(from, t);
            pieces.push(Piece {
                points,
                source_end: seg.end(),
                start_tangent: t0,
                end_tangent: t1,
                start_curvature: [k(0.0), k(0.25), k(0.5)],
                end_curvature: [k(1.0), k(0.75), k(0.5)],
            });
        }
        pieces
    }

    /// Joins piece `i` to piece `j`, trimming an inside corner in place when
    /// the two pieces cross, and returns the connecting segments.
    ///
    /// On an open path an inside corner whose pieces do not cross is cut
    /// where the offset lines meet, or bevelled, so the outline never runs
    /// back to the source corner. Closed paths and outlines built
    /// [`with_corner_loops`](Self::with_corner_loops) go through the corner.
    fn join(&self, pieces: &mut [Piece], i: usize, j: usize) -> Vec<Segment> {
        let a = &pieces[i];
        let b = &pieces[j];
        let geom = JoinGeometry {
            origin: a.source_end,
            start: a.last(),
            in_tangent: a.end_tangent,
            end: b.first(),
            out_tangent: b.start_tangent,
            in_curvature: a.end_curvature,
            out_curvature: b.start_curvature,
        };
        if !geom.is_outside(self.distance) && i != j {
            if let Some((ia, jb, x)) = first_crossing(&a.points, &b.points) {
                pieces[i].points.truncate(ia + 1);
                pieces[i].points.push(x);
                pieces[j].points.drain(..=jb);
                pieces[j].points.insert(0, x);
                return Vec::new();
            }
            if !self.path.closed && !self.corner_loops {
                if let Some(x) = swallowed_corner(&pieces[i].points, &pieces[j].points) {
                    let n = pieces[i].points.len();
                    pieces[i].points[n - 1] = x;
                    pieces[j].points = vec![x];
                    return Vec::new();
                }
                return vec![Segment::line(geom.end)];
            }
        }
        outline_join(&geom, self.distance, self.join, self.miter_limit)
    }
}

/// First crossing of the tail of `a` with the head of `b`, scanning `a`
/// backwards from its end: the chord indices and the crossing point.
fn first_crossing(a: &[Point2], b: &[Point2]) -> Option<(usize, usize, Point2)> {
    (0..a.len().saturating_sub(1)).rev().find_map(|ia| {
        (0..b.len().saturating_sub(1)).find_map(|jb| {
            segment_segment_intersect_2d(&a[ia], &a[ia + 1], &b[jb], &b[jb + 1])
                .map(|(x, _, _)| (ia, jb, x))
        })
    })
}

/// Where the last chord of `a` meets the line of `b`, when `b` is a single
/// chord lying entirely before that point.
fn swallowed_corner(a: &[Point2], b: &[Point2]) -> Option<Point2> {
    let (&[.., a0, a1], &[b0, b1]) = (a, b) else {
        return None;
    };
    let (s, u) = line_line_intersect_2d(&a0, &(a1 - a0), &b0, &(b1 - b0))?;
    ((0.0..=1.0).contains(&s) && u >= 1.0).then(|| a0 + (a1 - a0) * s)
}

/// Unit tangents at the start and end of the path, skipping degenerate
/// segments, or `None` when the path has no extent.
#[must_use]
pub(super) fn end_tangents(path: &Path) -> Option<(Vector2, Vector2)> {
    let live: Vec<(Point2, Segment)> = path
        .iter_segments()
        .filter(|(from, seg)| !seg.is_degenerate(*from, TOLERANCE))
        .collect();
    let (first_from, first) = live.first()?;
    let (last_from, last) = live.last()?;
    Some((
        first.unit_tangent(*first_from, 0.0)?,
        last.unit_tangent(*last_from, 1.0)?,
    ))
}
