use crate::math::Point2;

/// Link from a polyline vertex back to the curve it approximates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackData {
    /// Index of the segment within its subpath. An index equal to the
    /// segment count denotes the implicit closing line.
    pub piece: usize,
    /// Curve parameter of the vertex on that segment.
    pub t: f64,
}

/// A polyline vertex.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolyPoint {
    pub point: Point2,
    pub back: Option<BackData>,
}

/// The flattened form of one subpath.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PolySubpath {
    pub points: Vec<PolyPoint>,
    pub closed: bool,
}

/// Origin of a polyline edge: the parameter interval on one source segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeSource {
    pub subpath: usize,
    pub piece: usize,
    pub t0: f64,
    pub t1: f64,
}

/// A straight edge between two consecutive polyline vertices.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolyEdge {
    pub from: Point2,
    pub to: Point2,
    pub source: Option<EdgeSource>,
}

/// Output of the approximator: one [`PolySubpath`] per input subpath.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Polyline {
    pub subpaths: Vec<PolySubpath>,
}

impl PolySubpath {
    /// Iterates the straight edges of the subpath, including the closing edge
    /// of a closed subpath whose last vertex is not its first.
    pub fn edges(&self, subpath: usize) -> impl Iterator<Item = PolyEdge> + '_ {
        let closing = match (self.closed, self.points.first(), self.points.last()) {
            (true, Some(first), Some(last)) if self.points.len() > 1 && first.point != last.point => {
                Some(PolyEdge {
                    from: last.point,
                    to: first.point,
                    source: None,
                })
            }
            _ => None,
        };
        self.points
            .windows(2)
            .map(move |w| PolyEdge {
                from: w[0].point,
                to: w[1].point,
                source: edge_source(subpath, &w[0], &w[1]),
            })
            .chain(closing)
    }
}

fn edge_source(subpath: usize, a: &PolyPoint, b: &PolyPoint) -> Option<EdgeSource> {
    let end = b.back?;
    // A vertex that ends piece k starts piece k + 1 at t = 0.
    let t0 = match a.back {
        Some(start) if start.piece == end.piece => start.t,
        _ => 0.0,
    };
    Some(EdgeSource {
        subpath,
        piece: end.piece,
        t0,
        t1: end.t,
    })
}

impl Polyline {
    /// Total number of straight edges over all subpaths.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.subpaths
            .iter()
            .enumerate()
            .map(|(i, sp)| sp.edges(i).count())
            .sum()
    }

    /// Iterates every edge of every subpath.
    pub fn edges(&self) -> impl Iterator<Item = PolyEdge> + '_ {
        self.subpaths
            .iter()
            .enumerate()
            .flat_map(|(i, sp)| sp.edges(i))
    }

    /// Axis-aligned bounds of all vertices, or `None` when empty.
    #[must_use]
    pub fn bounds(&self) -> Option<(Point2, Point2)> {
        let mut points = self.subpaths.iter().flat_map(|sp| sp.points.iter());
        let first = points.next()?.point;
        Some(points.fold((first, first), |(min, max), p| {
            (
                Point2::new(min.x.min(p.point.x), min.y.min(p.point.y)),
                Point2::new(max.x.max(p.point.x), max.y.max(p.point.y)),
            )
        }))
    }
}
