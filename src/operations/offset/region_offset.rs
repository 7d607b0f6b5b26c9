use tracing::debug;

use crate::config::KernelConfig;
use crate::error::Result;
use crate::geometry::{Path, PathVector};
use crate::math::TOLERANCE;
use crate::operations::boolean::{simplify_execute, FillRule, Operand};

use super::half_outline::HalfOutline;
use super::style::StrokeStyle;

/// Grows or shrinks a filled region by the signed distance `style.width()`.
///
/// The region is first rebuilt under its fill rule, which leaves outer
/// boundaries counter-clockwise and holes clockwise. Each contour is then
/// offset to its right (away from the filled side for positive distances)
/// and the pieces are merged with a positive union, dropping loops that
/// turned inside out.
#[derive(Debug)]
pub struct RegionOffset<'a> {
    paths: &'a [Path],
    style: StrokeStyle,
    fill: FillRule,
}

impl<'a> RegionOffset<'a> {
    /// Creates a new region offset reading `paths` with the non-zero rule.
    #[must_use]
    pub fn new(paths: &'a [Path], style: StrokeStyle) -> Self {
        Self {
            paths,
            style,
            fill: FillRule::NonZero,
        }
    }

    /// Sets the fill rule; [`FillRule::Raw`] is read as positive.
    #[must_use]
    pub fn with_fill_rule(mut self, fill: FillRule) -> Self {
        self.fill = if fill == FillRule::Raw {
            FillRule::Positive
        } else {
            fill
        };
        self
    }

    /// Executes the region offset.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not finite or a cleanup pass fails.
    pub fn execute(&self, config: &KernelConfig) -> Result<PathVector> {
        let region = simplify_execute(Operand::new(self.paths).with_fill(self.fill), config)?;
        let distance = self.style.width();
        if distance.abs() < TOLERANCE || region.is_empty() {
            return Ok(region);
        }
        let mut raw = Vec::with_capacity(region.len());
        for contour in &region {
            let offset = HalfOutline::new(contour, -distance)
                .with_style(&self.style)
                .execute()?;
            if !offset.segments.is_empty() {
                raw.push(offset);
            }
        }
        let result = simplify_execute(Operand::new(&raw).with_fill(FillRule::Positive), config)?;
        debug!(
            distance,
            contours_in = region.len(),
            contours_out = result.len(),
            "region offset finished"
        );
        Ok(result)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::total_signed_area;
    use crate::math::Point2;
    use crate::operations::offset::LineJoin;

    fn frame() -> Vec<Path> {
        // 10x10 square with a 4x4 hole, both counter-clockwise as drawn.
        vec![
            Path::rect(Point2::new(0.0, 0.0), Point2::new(10.0, 10.0)),
            Path::rect(Point2::new(3.0, 3.0), Point2::new(7.0, 7.0)),
        ]
    }

    fn miter(distance: f64) -> StrokeStyle {
        StrokeStyle::new(distance).unwrap().with_join(LineJoin::Miter)
    }

    #[test]
    fn growing_closes_hole_partially() {
        let paths = frame();
        let out = RegionOffset::new(&paths, miter(1.0))
            .with_fill_rule(FillRule::EvenOdd)
            .execute(&KernelConfig::default())
            .unwrap();
        // 12x12 outer minus 2x2 hole.
        assert!((total_signed_area(&out) - 140.0).abs() < 1e-9);
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn growing_past_hole_fills_it() {
        let paths = frame();
        let out = RegionOffset::new(&paths, miter(2.5))
            .with_fill_rule(FillRule::EvenOdd)
            .execute(&KernelConfig::default())
            .unwrap();
        assert_eq!(out.len(), 1);
        assert!((total_signed_area(&out) - 225.0).abs() < 1e-9);
    }

    #[test]
    fn shrinking_widens_hole() {
        let paths = frame();
        let out = RegionOffset::new(&paths, miter(-1.0))
            .with_fill_rule(FillRule::EvenOdd)
            .execute(&KernelConfig::default())
            .unwrap();
        // 8x8 outer minus 6x6 hole.
        assert!((total_signed_area(&out) - 28.0).abs() < 1e-9);
    }

    #[test]
    fn zero_distance_only_simplifies() {
        let paths = frame();
        let out = RegionOffset::new(&paths, miter(0.0))
            .execute(&KernelConfig::default())
            .unwrap();
        // Non-zero rule: the hole drawn counter-clockwise is filled.
        assert!((total_signed_area(&out) - 100.0).abs() < 1e-9);
    }
}
