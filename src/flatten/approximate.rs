use tracing::trace;

use super::polyline::{BackData, PolyPoint, PolySubpath, Polyline};
use crate::error::{OperationError, Result};
use crate::geometry::{Path, Segment};
use crate::math::Point2;

/// Converts paths into polylines within a flattening tolerance.
pub struct Approximate<'a> {
    paths: &'a [Path],
    tolerance: f64,
    back_data: bool,
    close_open: bool,
}

impl<'a> Approximate<'a> {
    /// Creates a new approximation of `paths` with back-data enabled.
    #[must_use]
    pub fn new(paths: &'a [Path], tolerance: f64) -> Self {
        Self {
            paths,
            tolerance,
            back_data: true,
            close_open: false,
        }
    }

    /// Enables or disables recording of back-data.
    #[must_use]
    pub fn with_back_data(mut self, back_data: bool) -> Self {
        self.back_data = back_data;
        self
    }

    /// Treats open subpaths as closed by a straight line, as filling does.
    #[must_use]
    pub fn with_close_open(mut self, close_open: bool) -> Self {
        self.close_open = close_open;
        self
    }

    /// Executes the approximation.
    ///
    /// # Errors
    ///
    /// Returns an error if the tolerance is not positive or the input holds
    /// non-finite coordinates.
    pub fn execute(&self) -> Result<Polyline> {
        if !(self.tolerance > 0.0 && self.tolerance.is_finite()) {
            return Err(OperationError::InvalidInput(format!(
                "flattening tolerance must be positive, got {}",
                self.tolerance
            ))
            .into());
        }
        let mut subpaths = Vec::with_capacity(self.paths.len());
        for path in self.paths {
            path.validate()?;
            subpaths.push(self.approximate_path(path));
        }
        let polyline = Polyline { subpaths };
        trace!(edges = polyline.edge_count(), "approximated paths");
        Ok(polyline)
    }

    fn approximate_path(&self, path: &Path) -> PolySubpath {
        let closed = path.closed || self.close_open;
        let back = |piece: usize, t: f64| self.back_data.then_some(BackData { piece, t });
        let mut points = vec![PolyPoint {
            point: path.start,
            back: back(0, 0.0),
        }];

        let mut pieces: Vec<(Point2, Segment)> = path.iter_segments().collect();
        if closed && !path.segments.is_empty() && path.end() != path.start && !path.closed {
            pieces.push((path.end(), Segment::line(path.start)));
        }

        for (piece, (from, seg)) in pieces.into_iter().enumerate() {
            match seg {
                Segment::Line { to } => points.push(PolyPoint {
                    point: to,
                    back: back(piece, 1.0),
                }),
                Segment::Cubic { .. } => {
                    for (t, point) in seg.to_cubic(from).flatten(self.tolerance) {
                        points.push(PolyPoint {
                            point,
                            back: back(piece, t),
                        });
                    }
                }
            }
        }
        PolySubpath { points, closed }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::PathBuilder;

    #[test]
    fn lines_map_one_to_one() {
        let square = Path::rect(Point2::new(0.0, 0.0), Point2::new(1.0, 1.0));
        let poly = Approximate::new(std::slice::from_ref(&square), 0.01)
            .execute()
            .unwrap();
        assert_eq!(poly.subpaths.len(), 1);
        assert_eq!(poly.subpaths[0].points.len(), 5);
        assert_eq!(poly.edge_count(), 4);
        let back = poly.subpaths[0].points[2].back.unwrap();
        assert_eq!(back.piece, 1);
        assert!((back.t - 1.0).abs() < 1e-12);
    }

    #[test]
    fn cubic_vertices_carry_parameters() {
        let mut b = PathBuilder::new();
        b.move_to(Point2::new(0.0, 0.0)).cubic_to(
            Point2::new(0.0, 1.0),
            Point2::new(1.0, 1.0),
            Point2::new(1.0, 0.0),
        );
        let paths = b.build();
        let poly = Approximate::new(&paths, 1e-3).execute().unwrap();
        let points = &poly.subpaths[0].points;
        assert!(points.len() > 4);
        let mut prev = 0.0;
        for p in &points[1..] {
            let back = p.back.unwrap();
            assert_eq!(back.piece, 0);
            assert!(back.t > prev);
            prev = back.t;
        }
    }

    #[test]
    fn back_data_can_be_disabled() {
        let square = Path::rect(Point2::new(0.0, 0.0), Point2::new(1.0, 1.0));
        let poly = Approximate::new(std::slice::from_ref(&square), 0.01)
            .with_back_data(false)
            .execute()
            .unwrap();
        assert!(poly.subpaths[0].points.iter().all(|p| p.back.is_none()));
    }

    #[test]
    fn open_paths_can_be_closed() {
        let open = Path::from_points(
            &[Point2::new(0.0, 0.0), Point2::new(2.0, 0.0), Point2::new(2.0, 2.0)],
            false,
        );
        let poly = Approximate::new(std::slice::from_ref(&open), 0.01)
            .with_close_open(true)
            .execute()
            .unwrap();
        let sp = &poly.subpaths[0];
        assert!(sp.closed);
        assert_eq!(sp.points.len(), 4);
        assert_eq!(sp.points[3].back.unwrap().piece, 2);
    }

    #[test]
    fn rejects_bad_tolerance() {
        assert!(Approximate::new(&[], 0.0).execute().is_err());
    }
}
