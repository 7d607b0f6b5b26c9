use std::f64::consts::PI;

use crate::geometry::Segment;
use crate::math::arc_2d::arc_to_cubics;
use crate::math::{cross, Point2, Vector2};

use super::style::LineCap;

/// Builds the cap closing an open stroke at one end of the source path.
///
/// `from` is the end of the offset side arriving at the path end, `to` the
/// start of the opposite side, `origin` the path end point and `tangent` the
/// unit direction pointing out of the path. `half_width` is taken unsigned.
#[must_use]
pub fn outline_cap(
    from: Point2,
    to: Point2,
    origin: Point2,
    tangent: Vector2,
    half_width: f64,
    cap: LineCap,
) -> Vec<Segment> {
    let reach = tangent * half_width.abs();
    match cap {
        LineCap::ButtFlat => vec![Segment::line(to)],
        LineCap::ButtSquare => vec![
            Segment::line(from + reach),
            Segment::line(to + reach),
            Segment::line(to),
        ],
        LineCap::ButtPeak => vec![Segment::line(origin + reach), Segment::line(to)],
        LineCap::ButtRound => {
            let radial = from - origin;
            let sweep = if cross(&radial, &tangent) >= 0.0 { PI } else { -PI };
            let mut out: Vec<Segment> =
                arc_to_cubics(&origin, half_width.abs(), radial.y.atan2(radial.x), sweep)
                    .into_iter()
                    .map(|(c1, c2, end)| Segment::cubic(c1, c2, end))
                    .collect();
            match out.last_mut() {
                Some(Segment::Cubic { to: end, .. } | Segment::Line { to: end }) => *end = to,
                None => out.push(Segment::line(to)),
            }
            out
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Path ending at the origin travelling along +x with half width 1.
    fn cap(kind: LineCap) -> Vec<Segment> {
        outline_cap(
            Point2::new(0.0, 1.0),
            Point2::new(0.0, -1.0),
            Point2::origin(),
            Vector2::new(1.0, 0.0),
            1.0,
            kind,
        )
    }

    #[test]
    fn flat_cap_is_single_line() {
        assert_eq!(cap(LineCap::ButtFlat), vec![Segment::line(Point2::new(0.0, -1.0))]);
    }

    #[test]
    fn square_cap_extends_by_half_width() {
        let out = cap(LineCap::ButtSquare);
        assert_eq!(out.len(), 3);
        assert_eq!(out[0].end(), Point2::new(1.0, 1.0));
        assert_eq!(out[1].end(), Point2::new(1.0, -1.0));
    }

    #[test]
    fn peak_cap_points_along_tangent() {
        let out = cap(LineCap::ButtPeak);
        assert_eq!(out[0].end(), Point2::new(1.0, 0.0));
    }

    #[test]
    fn round_cap_bulges_forward() {
        let out = cap(LineCap::ButtRound);
        assert_eq!(out.len(), 2);
        let tip = out[0].end();
        assert!((tip.x - 1.0).abs() < 1e-12 && tip.y.abs() < 1e-12);
        assert_eq!(out[1].end(), Point2::new(0.0, -1.0));
    }
}
