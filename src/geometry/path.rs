use super::segment::Segment;
use crate::error::{GeometryError, Result};
use crate::math::Point2;

/// Area below which [`is_path_empty`] treats a path as empty.
pub const EMPTY_AREA_THRESHOLD: f64 = 1e-3;

/// A single subpath: a start point followed by line and cubic segments.
///
/// A closed path's last segment is expected to end at `start`; when it does
/// not, consumers treat the gap as an implicit closing line.
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    pub start: Point2,
    pub segments: Vec<Segment>,
    pub closed: bool,
}

/// An ordered collection of subpaths, the kernel's input and output format.
pub type PathVector = Vec<Path>;

impl Path {
    /// Creates an empty open path at `start`.
    #[must_use]
    pub fn new(start: Point2) -> Self {
        Self {
            start,
            segments: Vec::new(),
            closed: false,
        }
    }

    /// Creates a straight-line path through `points`.
    #[must_use]
    pub fn from_points(points: &[Point2], closed: bool) -> Self {
        let Some(&start) = points.first() else {
            return Self::new(Point2::origin());
        };
        let mut path = Self::new(start);
        for p in &points[1..] {
            path.segments.push(Segment::line(*p));
        }
        if closed {
            path.close();
        }
        path
    }

    /// Creates a closed axis-aligned rectangle, counter-clockwise in y-up space.
    #[must_use]
    pub fn rect(min: Point2, max: Point2) -> Self {
        Self::from_points(
            &[
                min,
                Point2::new(max.x, min.y),
                max,
                Point2::new(min.x, max.y),
            ],
            true,
        )
    }

    /// Appends a line segment.
    pub fn line_to(&mut self, to: Point2) -> &mut Self {
        self.segments.push(Segment::line(to));
        self
    }

    /// Appends a cubic segment.
    pub fn cubic_to(&mut self, ctrl1: Point2, ctrl2: Point2, to: Point2) -> &mut Self {
        self.segments.push(Segment::cubic(ctrl1, ctrl2, to));
        self
    }

    /// Closes the path, adding an explicit line back to the start if needed.
    pub fn close(&mut self) -> &mut Self {
        if self.end() != self.start {
            self.segments.push(Segment::line(self.start));
        }
        self.closed = true;
        self
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// End point of the last segment (the start for an empty path).
    #[must_use]
    pub fn end(&self) -> Point2 {
        self.segments.last().map_or(self.start, Segment::end)
    }

    /// Iterates `(from, segment)` pairs, including the implicit closing line
    /// of a closed path whose last segment does not return to the start.
    pub fn iter_segments(&self) -> impl Iterator<Item = (Point2, Segment)> + '_ {
        let closing = (self.closed && self.end() != self.start && !self.segments.is_empty())
            .then(|| (self.end(), Segment::line(self.start)));
        let mut from = self.start;
        self.segments
            .iter()
            .map(move |seg| {
                let item = (from, *seg);
                from = seg.end();
                item
            })
            .chain(closing)
    }

    /// Number of segments, including an implicit closing line.
    #[must_use]
    pub fn segment_count(&self) -> usize {
        self.iter_segments().count()
    }

    /// Returns the path traversed in the opposite direction.
    #[must_use]
    pub fn reversed(&self) -> Self {
        let pieces: Vec<(Point2, Segment)> = self.iter_segments().collect();
        let start = pieces.last().map_or(self.start, |(_, seg)| seg.end());
        let segments = pieces
            .iter()
            .rev()
            .map(|(from, seg)| seg.reversed(*from))
            .collect();
        Self {
            start,
            segments,
            closed: self.closed,
        }
    }

    /// Signed enclosed area, positive for counter-clockwise paths.
    ///
    /// Open paths are measured as if closed by a straight line.
    #[must_use]
    pub fn signed_area(&self) -> f64 {
        let mut area: f64 = self
            .iter_segments()
            .map(|(from, seg)| seg.signed_area(from))
            .sum();
        if !self.closed {
            area += Segment::line(self.start).signed_area(self.end());
        }
        area
    }

    /// Axis-aligned bounds of the control hull, or `None` for an empty path.
    #[must_use]
    pub fn bounding_box(&self) -> Option<(Point2, Point2)> {
        let mut min = self.start;
        let mut max = self.start;
        for seg in &self.segments {
            for p in seg.hull() {
                min = Point2::new(min.x.min(p.x), min.y.min(p.y));
                max = Point2::new(max.x.max(p.x), max.y.max(p.y));
            }
        }
        (!self.segments.is_empty()).then_some((min, max))
    }

    /// Polyline approximation of the path, including the start point.
    #[must_use]
    pub fn to_points(&self, tolerance: f64) -> Vec<Point2> {
        let mut points = vec![self.start];
        for (from, seg) in self.iter_segments() {
            match seg {
                Segment::Line { to } => points.push(to),
                Segment::Cubic { .. } => points.extend(
                    seg.to_cubic(from)
                        .flatten(tolerance)
                        .into_iter()
                        .map(|(_, p)| p),
                ),
            }
        }
        points
    }

    /// Length of the flattened path.
    #[must_use]
    pub fn length(&self, tolerance: f64) -> f64 {
        self.to_points(tolerance)
            .windows(2)
            .map(|w| (w[1] - w[0]).norm())
            .sum()
    }

    /// Returns whether the enclosed area is below `threshold`.
    #[must_use]
    pub fn is_degenerate(&self, threshold: f64) -> bool {
        self.signed_area().abs() < threshold
    }

    /// Number of distinct consecutive points on the path.
    #[must_use]
    pub fn distinct_point_count(&self, eps: f64) -> usize {
        let mut count = 1;
        let mut last = self.start;
        for seg in &self.segments {
            let end = seg.end();
            if (end - last).norm() > eps || !seg.is_line() && !seg.is_degenerate(last, eps) {
                count += 1;
                last = end;
            }
        }
        count
    }

    /// Rejects NaN or infinite coordinates.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::NonFinite`] for the first offending point.
    pub fn validate(&self) -> Result<()> {
        let check = |p: &Point2| {
            if p.x.is_finite() && p.y.is_finite() {
                Ok(())
            } else {
                Err(GeometryError::NonFinite { x: p.x, y: p.y })
            }
        };
        check(&self.start)?;
        for seg in &self.segments {
            for p in seg.hull() {
                check(&p)?;
            }
        }
        Ok(())
    }
}

/// Returns true if the given path has close to zero area.
#[must_use]
pub fn is_path_empty(path: &Path) -> bool {
    path.is_degenerate(EMPTY_AREA_THRESHOLD)
}

/// Sum of the signed areas of every subpath.
#[must_use]
pub fn total_signed_area(paths: &[Path]) -> f64 {
    paths.iter().map(Path::signed_area).sum()
}

/// Incremental builder for a [`PathVector`] with move/line/cubic/close commands.
#[derive(Debug, Default)]
pub struct PathBuilder {
    paths: PathVector,
    current: Option<Path>,
}

impl PathBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new subpath, finishing the current one as open.
    pub fn move_to(&mut self, p: Point2) -> &mut Self {
        self.flush();
        self.current = Some(Path::new(p));
        self
    }

    /// Adds a line; starts a subpath at the origin if none is open.
    pub fn line_to(&mut self, p: Point2) -> &mut Self {
        self.current
            .get_or_insert_with(|| Path::new(Point2::origin()))
            .line_to(p);
        self
    }

    /// Adds a cubic; starts a subpath at the origin if none is open.
    pub fn cubic_to(&mut self, ctrl1: Point2, ctrl2: Point2, to: Point2) -> &mut Self {
        self.current
            .get_or_insert_with(|| Path::new(Point2::origin()))
            .cubic_to(ctrl1, ctrl2, to);
        self
    }

    /// Closes the current subpath.
    pub fn close(&mut self) -> &mut Self {
        if let Some(mut path) = self.current.take() {
            path.close();
            self.paths.push(path);
        }
        self
    }

    /// Finishes building and returns every subpath with at least one segment.
    #[must_use]
    pub fn build(mut self) -> PathVector {
        self.flush();
        self.paths
    }

    fn flush(&mut self) {
        if let Some(path) = self.current.take() {
            if !path.segments.is_empty() {
                self.paths.push(path);
            }
        }
    }
}
