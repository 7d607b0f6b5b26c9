use tracing::debug;

use crate::config::KernelConfig;
use crate::error::Result;
use crate::geometry::{Path, PathVector};
use crate::math::TOLERANCE;
use crate::operations::boolean::{simplify_execute, FillRule, Operand};

use super::cap::outline_cap;
use super::half_outline::{end_tangents, HalfOutline};
use super::style::StrokeStyle;

/// Offsets a path by the signed distance `style.width()`, with cleanup.
///
/// Closed paths are oriented counter-clockwise first (negating the distance
/// when the path is reversed) and their raw offset is passed through a
/// positive self-union. Corners biting into themselves are removed and loops
/// turned inside out by a collapsing offset are dropped; the result may hold
/// several contours or none. Open paths return their single raw half-outline.
#[derive(Debug)]
pub struct Offset<'a> {
    path: &'a Path,
    style: StrokeStyle,
}

impl<'a> Offset<'a> {
    #[must_use]
    pub fn new(path: &'a Path, style: StrokeStyle) -> Self {
        Self { path, style }
    }

    /// Executes the offset.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is not finite or the cleanup fails.
    pub fn execute(&self, config: &KernelConfig) -> Result<PathVector> {
        self.path.validate()?;
        if self.path.distinct_point_count(TOLERANCE) < 2 {
            return Ok(Vec::new());
        }
        let mut distance = self.style.width();
        let mut source = self.path.clone();
        if source.closed && source.signed_area() < 0.0 {
            source = source.reversed();
            distance = -distance;
        }
        let raw = if distance.abs() < TOLERANCE {
            source
        } else {
            HalfOutline::new(&source, distance)
                .with_style(&self.style)
                .execute()?
        };
        if raw.segments.is_empty() {
            return Ok(Vec::new());
        }
        if !self.path.closed {
            return Ok(vec![raw]);
        }
        let operand = Operand::new(std::slice::from_ref(&raw)).with_fill(FillRule::Positive);
        let result = simplify_execute(operand, config)?;
        debug!(distance, contours = result.len(), "offset finished");
        Ok(result)
    }
}

/// Strokes a path with `style`, producing the filled outline.
///
/// Before cleanup the outline of a closed path is two contours (one per
/// side) and that of an open path a single contour joined by caps.
#[derive(Debug)]
pub struct Outline<'a> {
    path: &'a Path,
    style: StrokeStyle,
}

impl<'a> Outline<'a> {
    #[must_use]
    pub fn new(path: &'a Path, style: StrokeStyle) -> Self {
        Self { path, style }
    }

    /// Builds the raw outline contours without removing self-overlaps.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is not finite.
    pub fn execute_raw(&self) -> Result<PathVector> {
        self.path.validate()?;
        let half = self.style.half_width();
        if half.abs() < TOLERANCE || self.path.distinct_point_count(TOLERANCE) < 2 {
            return Ok(Vec::new());
        }
        let Some((start_tangent, end_tangent)) = end_tangents(self.path) else {
            return Ok(Vec::new());
        };
        let reversed = self.path.reversed();
        let forward = HalfOutline::new(self.path, half)
            .with_style(&self.style)
            .with_corner_loops()
            .execute()?;
        let backward = HalfOutline::new(&reversed, half)
            .with_style(&self.style)
            .with_corner_loops()
            .execute()?;
        if forward.segments.is_empty() || backward.segments.is_empty() {
            return Ok(Vec::new());
        }
        if self.path.closed {
            return Ok(vec![forward, backward]);
        }

        let cap = self.style.cap();
        let mut contour = Path::new(forward.start);
        contour.segments.extend(forward.segments.iter().copied());
        contour.segments.extend(outline_cap(
            forward.end(),
            backward.start,
            self.path.end(),
            end_tangent,
            half,
            cap,
        ));
        contour.segments.extend(backward.segments.iter().copied());
        contour.segments.extend(outline_cap(
            backward.end(),
            forward.start,
            self.path.start,
            -start_tangent,
            half,
            cap,
        ));
        contour.closed = true;
        Ok(vec![contour])
    }

    /// Builds the outline and removes its self-overlaps with a non-zero
    /// self-union.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is not finite or the cleanup fails.
    pub fn execute(&self, config: &KernelConfig) -> Result<PathVector> {
        let raw = self.execute_raw()?;
        if raw.is_empty() {
            return Ok(raw);
        }
        let result = simplify_execute(Operand::new(&raw), config)?;
        debug!(
            width = self.style.width(),
            closed = self.path.closed,
            contours = result.len(),
            "stroke finished"
        );
        Ok(result)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::total_signed_area;
    use crate::math::distance_2d::point_to_segment_dist;
    use crate::math::Point2;
    use crate::operations::offset::{LineCap, LineJoin};

    fn segment() -> Path {
        Path::from_points(&[Point2::new(0.0, 0.0), Point2::new(10.0, 0.0)], false)
    }

    fn square() -> Path {
        Path::rect(Point2::new(0.0, 0.0), Point2::new(10.0, 10.0))
    }

    #[test]
    fn straight_stroke_is_rectangle() {
        let style = StrokeStyle::new(2.0).unwrap();
        let out = Outline::new(&segment(), style)
            .execute(&KernelConfig::default())
            .unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].segments.len(), 4);
        assert!((out[0].signed_area() - 20.0).abs() < 1e-9);
        let (min, max) = out[0].bounding_box().unwrap();
        assert!((min - Point2::new(0.0, -1.0)).norm() < 1e-9);
        assert!((max - Point2::new(10.0, 1.0)).norm() < 1e-9);
    }

    #[test]
    fn square_caps_extend_stroke() {
        let style = StrokeStyle::new(2.0).unwrap().with_cap(LineCap::ButtSquare);
        let out = Outline::new(&segment(), style)
            .execute(&KernelConfig::default())
            .unwrap();
        assert!((total_signed_area(&out) - 24.0).abs() < 1e-9);
    }

    #[test]
    fn round_caps_add_a_circle() {
        let style = StrokeStyle::new(2.0).unwrap().with_cap(LineCap::ButtRound);
        let out = Outline::new(&segment(), style)
            .execute(&KernelConfig::default())
            .unwrap();
        let expected = 20.0 + std::f64::consts::PI;
        assert!((total_signed_area(&out) - expected).abs() < 1e-2);
    }

    #[test]
    fn closed_stroke_has_two_contours() {
        let style = StrokeStyle::new(2.0).unwrap().with_join(LineJoin::Miter);
        let sq = square();
        let outline = Outline::new(&sq, style);
        assert_eq!(outline.execute_raw().unwrap().len(), 2);
        let out = outline.execute(&KernelConfig::default()).unwrap();
        assert_eq!(out.len(), 2);
        // 12x12 outer minus 8x8 hole.
        assert!((total_signed_area(&out) - 80.0).abs() < 1e-9);
    }

    #[test]
    fn open_stroke_has_one_contour() {
        let path = Path::from_points(
            &[Point2::new(0.0, 0.0), Point2::new(10.0, 0.0), Point2::new(10.0, 10.0)],
            false,
        );
        let style = StrokeStyle::new(1.0).unwrap().with_join(LineJoin::Round);
        let outline = Outline::new(&path, style);
        assert_eq!(outline.execute_raw().unwrap().len(), 1);
        assert_eq!(outline.execute(&KernelConfig::default()).unwrap().len(), 1);
    }

    #[test]
    fn degenerate_input_gives_empty_result() {
        let dot = Path::from_points(&[Point2::new(3.0, 3.0), Point2::new(3.0, 3.0)], false);
        let style = StrokeStyle::new(2.0).unwrap();
        assert!(Outline::new(&dot, style)
            .execute(&KernelConfig::default())
            .unwrap()
            .is_empty());
        assert!(Offset::new(&dot, style)
            .execute(&KernelConfig::default())
            .unwrap()
            .is_empty());
    }

    #[test]
    fn offset_grows_and_shrinks_square() {
        let config = KernelConfig::default();
        let outward = StrokeStyle::new(-1.0).unwrap().with_join(LineJoin::Miter);
        let grown = Offset::new(&square(), outward).execute(&config).unwrap();
        assert_eq!(grown.len(), 1);
        assert!((grown[0].signed_area() - 144.0).abs() < 1e-9);

        let inward = StrokeStyle::new(1.0).unwrap().with_join(LineJoin::Miter);
        let back = Offset::new(&grown[0], inward).execute(&config).unwrap();
        assert!((total_signed_area(&back) - 100.0).abs() < 1e-9);
    }

    #[test]
    fn clockwise_input_offsets_to_its_left() {
        let style = StrokeStyle::new(1.0).unwrap().with_join(LineJoin::Miter);
        let out = Offset::new(&square().reversed(), style)
            .execute(&KernelConfig::default())
            .unwrap();
        // Left of a clockwise square is outside.
        assert!((total_signed_area(&out) - 144.0).abs() < 1e-9);
    }

    #[test]
    fn open_offset_stays_off_a_short_inside_leg() {
        let source = [Point2::new(0.0, 0.0), Point2::new(10.0, 0.0), Point2::new(10.0, 0.5)];
        let path = Path::from_points(&source, false);
        let out = Offset::new(&path, StrokeStyle::new(1.0).unwrap())
            .execute(&KernelConfig::default())
            .unwrap();
        assert_eq!(out.len(), 1);
        for q in out[0].to_points(0.01) {
            let d = source
                .windows(2)
                .map(|w| point_to_segment_dist(&q, &w[0], &w[1]))
                .fold(f64::INFINITY, f64::min);
            assert!(d >= 1.0 - 1e-9, "{q:?} is {d} from the path");
        }
    }

    #[test]
    fn collapsed_offset_is_empty() {
        let style = StrokeStyle::new(6.0).unwrap();
        let out = Offset::new(&square(), style)
            .execute(&KernelConfig::default())
            .unwrap();
        assert!(total_signed_area(&out).abs() < 1e-9);
    }
}
