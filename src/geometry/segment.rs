use crate::math::bezier_2d::CubicBez;
use crate::math::{Point2, Vector2};

/// One piece of a path. The start point is implied by the previous piece
/// (or the path's start point).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Segment {
    /// Straight line to `to`.
    Line { to: Point2 },
    /// Cubic Bézier to `to` with two control points.
    Cubic {
        ctrl1: Point2,
        ctrl2: Point2,
        to: Point2,
    },
}

impl Segment {
    /// Creates a line segment.
    #[must_use]
    pub fn line(to: Point2) -> Self {
        Self::Line { to }
    }

    /// Creates a cubic segment.
    #[must_use]
    pub fn cubic(ctrl1: Point2, ctrl2: Point2, to: Point2) -> Self {
        Self::Cubic { ctrl1, ctrl2, to }
    }

    /// End point of the segment.
    #[must_use]
    pub fn end(&self) -> Point2 {
        match self {
            Self::Line { to } | Self::Cubic { to, .. } => *to,
        }
    }

    #[must_use]
    pub fn is_line(&self) -> bool {
        matches!(self, Self::Line { .. })
    }

    /// The segment as a cubic starting at `from` (lines are degree-elevated).
    #[must_use]
    pub fn to_cubic(&self, from: Point2) -> CubicBez {
        match *self {
            Self::Line { to } => {
                let d = to - from;
                CubicBez::new(from, from + d / 3.0, from + d * (2.0 / 3.0), to)
            }
            Self::Cubic { ctrl1, ctrl2, to } => CubicBez::new(from, ctrl1, ctrl2, to),
        }
    }

    /// Point at parameter `t`.
    #[must_use]
    pub fn point_at(&self, from: Point2, t: f64) -> Point2 {
        match *self {
            Self::Line { to } => from + (to - from) * t,
            Self::Cubic { .. } => self.to_cubic(from).eval(t),
        }
    }

    /// Unit tangent at parameter `t`, or `None` for a zero-length segment.
    #[must_use]
    pub fn unit_tangent(&self, from: Point2, t: f64) -> Option<Vector2> {
        match *self {
            Self::Line { to } => {
                let d = to - from;
                (d.norm() > 1e-12).then(|| d.normalize())
            }
            Self::Cubic { .. } => self.to_cubic(from).unit_tangent(t),
        }
    }

    /// Signed curvature at parameter `t` (zero for lines).
    #[must_use]
    pub fn curvature(&self, from: Point2, t: f64) -> f64 {
        match self {
            Self::Line { .. } => 0.0,
            Self::Cubic { .. } => self.to_cubic(from).curvature(t),
        }
    }

    /// Part of the segment between `t0` and `t1` (reversed when `t0 > t1`).
    #[must_use]
    pub fn subsegment(&self, from: Point2, t0: f64, t1: f64) -> Self {
        match self {
            Self::Line { .. } => Self::line(self.point_at(from, t1)),
            Self::Cubic { .. } => {
                let sub = self.to_cubic(from).subsegment(t0, t1);
                Self::cubic(sub.p1, sub.p2, sub.p3)
            }
        }
    }

    /// The segment traversed backwards, ending at `from`.
    #[must_use]
    pub fn reversed(&self, from: Point2) -> Self {
        match *self {
            Self::Line { .. } => Self::line(from),
            Self::Cubic { ctrl1, ctrl2, .. } => Self::cubic(ctrl2, ctrl1, from),
        }
    }

    /// Contribution of the segment to the enclosed signed area.
    #[must_use]
    pub fn signed_area(&self, from: Point2) -> f64 {
        match *self {
            Self::Line { to } => 0.5 * (from.x * to.y - to.x * from.y),
            Self::Cubic { .. } => self.to_cubic(from).signed_area(),
        }
    }

    /// Returns whether the segment has no extent at all.
    #[must_use]
    pub fn is_degenerate(&self, from: Point2, eps: f64) -> bool {
        match *self {
            Self::Line { to } => (to - from).norm() <= eps,
            Self::Cubic { ctrl1, ctrl2, to } => {
                (to - from).norm() <= eps
                    && (ctrl1 - from).norm() <= eps
                    && (ctrl2 - from).norm() <= eps
            }
        }
    }

    /// Points defining the segment's control hull, excluding the start.
    #[must_use]
    pub fn hull(&self) -> Vec<Point2> {
        match *self {
            Self::Line { to } => vec![to],
            Self::Cubic { ctrl1, ctrl2, to } => vec![ctrl1, ctrl2, to],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_reversal_ends_at_start() {
        let from = Point2::new(1.0, 2.0);
        let seg = Segment::line(Point2::new(3.0, 4.0));
        assert_eq!(seg.reversed(from).end(), from);
    }

    #[test]
    fn cubic_reversal_swaps_controls() {
        let from = Point2::new(0.0, 0.0);
        let seg = Segment::cubic(Point2::new(0.0, 1.0), Point2::new(1.0, 1.0), Point2::new(1.0, 0.0));
        let rev = seg.reversed(from);
        match rev {
            Segment::Cubic { ctrl1, ctrl2, to } => {
                assert_eq!(ctrl1, Point2::new(1.0, 1.0));
                assert_eq!(ctrl2, Point2::new(0.0, 1.0));
                assert_eq!(to, from);
            }
            Segment::Line { .. } => panic!("reversal changed the segment kind"),
        }
    }

    #[test]
    fn elevated_line_evaluates_linearly() {
        let from = Point2::new(0.0, 0.0);
        let seg = Segment::line(Point2::new(3.0, 0.0));
        let cubic = seg.to_cubic(from);
        assert!((cubic.eval(0.5).x - 1.5).abs() < 1e-12);
        assert!((seg.point_at(from, 0.25).x - 0.75).abs() < 1e-12);
    }

    #[test]
    fn zero_length_line_has_no_tangent() {
        let p = Point2::new(1.0, 1.0);
        assert!(Segment::line(p).unit_tangent(p, 0.0).is_none());
        assert!(Segment::line(p).is_degenerate(p, 1e-12));
    }
}
