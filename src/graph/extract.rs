use slotmap::SecondaryMap;

use super::winding::HalfEdge;
use super::{EdgeBackData, EdgeId, Graph, NodeId};
use crate::error::Result;
use crate::geometry::{Path, PathVector, Segment};
use crate::math::{cross, Point2};

/// A maximal run of half-edges that maps onto one output segment.
#[derive(Debug, Clone, Copy)]
enum Run {
    Line {
        from: Point2,
        to: Point2,
    },
    Curve {
        from: Point2,
        to: Point2,
        back: EdgeBackData,
    },
}

impl Run {
    fn start(&self) -> Point2 {
        match self {
            Self::Line { from, .. } | Self::Curve { from, .. } => *from,
        }
    }

    /// Joins `next` onto `self` if both describe the same straight line or
    /// the same stretch of one source curve.
    fn merge(&self, next: &Self) -> Option<Self> {
        match (*self, *next) {
            (Self::Line { from, to }, Self::Line { to: end, .. }) => {
                let d1 = to - from;
                let d2 = end - to;
                let collinear = cross(&d1, &d2).abs() <= 1e-9 * d1.norm() * d2.norm();
                (collinear && d1.dot(&d2) > 0.0).then_some(Self::Line { from, to: end })
            }
            (Self::Curve { from, back: a, .. }, Self::Curve { to, back: b, .. }) => {
                let same = a.operand == b.operand && a.subpath == b.subpath && a.piece == b.piece;
                (same && (a.t1 - b.t0).abs() < 1e-9).then_some(Self::Curve {
                    from,
                    to,
                    back: EdgeBackData { t1: b.t1, ..a },
                })
            }
            _ => None,
        }
    }

    fn to_segment(self, sources: &[PathVector]) -> Segment {
        match self {
            Self::Line { to, .. } => Segment::line(to),
            Self::Curve { to, back, .. } => match source_segment(sources, &back) {
                Some((start, seg @ Segment::Cubic { .. })) => {
                    match seg.subsegment(start, back.t0, back.t1) {
                        Segment::Cubic { ctrl1, ctrl2, .. } => Segment::cubic(ctrl1, ctrl2, to),
                        Segment::Line { .. } => Segment::line(to),
                    }
                }
                _ => Segment::line(to),
            },
        }
    }
}

fn source_segment(sources: &[PathVector], back: &EdgeBackData) -> Option<(Point2, Segment)> {
    sources
        .get(back.operand)?
        .get(back.subpath)?
        .iter_segments()
        .nth(back.piece)
}

/// Follows kept half-edges node to node and turns them into paths.
///
/// Walks start at nodes with more outgoing than incoming kept half-edges, so
/// open chains are traced from their start; the remaining half-edges form
/// closed contours. At a node with several choices the first kept edge
/// clockwise from the arriving edge is taken, which keeps each contour tight
/// around its region.
///
/// Curved stretches are re-fitted from the source paths using each edge's
/// back-data; everything else becomes straight lines, with collinear pieces
/// merged.
///
/// # Errors
///
/// Returns an error if the graph is inconsistent.
pub fn extract_contours(graph: &Graph, kept: &[HalfEdge], sources: &[PathVector]) -> Result<PathVector> {
    let mut direction: SecondaryMap<EdgeId, bool> = SecondaryMap::new();
    let mut balance: SecondaryMap<NodeId, i32> = SecondaryMap::new();
    for h in kept {
        direction.insert(h.edge, h.forward);
        if let Some(entry) = balance.entry(h.origin(graph)?) {
            *entry.or_insert(0) += 1;
        }
        if let Some(entry) = balance.entry(h.dest(graph)?) {
            *entry.or_insert(0) -= 1;
        }
    }

    let mut starts: Vec<HalfEdge> = Vec::with_capacity(kept.len());
    for h in kept {
        if balance.get(h.origin(graph)?).is_some_and(|&b| b > 0) {
            starts.push(*h);
        }
    }
    starts.extend_from_slice(kept);

    let mut used: SecondaryMap<EdgeId, ()> = SecondaryMap::new();
    let mut paths = Vec::new();
    for start in starts {
        if used.contains_key(start.edge) {
            continue;
        }
        used.insert(start.edge, ());
        let origin = start.origin(graph)?;
        let mut chain = vec![start];
        let mut current = start;
        let closed = loop {
            if current.dest(graph)? == origin {
                break true;
            }
            match next_kept(graph, current, &direction, &used)? {
                Some(h) => {
                    used.insert(h.edge, ());
                    chain.push(h);
                    current = h;
                }
                None => break false,
            }
        };
        if let Some(path) = build_path(graph, &chain, closed, sources)? {
            paths.push(path);
        }
    }
    Ok(paths)
}

fn next_kept(
    graph: &Graph,
    arriving: HalfEdge,
    direction: &SecondaryMap<EdgeId, bool>,
    used: &SecondaryMap<EdgeId, ()>,
) -> Result<Option<HalfEdge>> {
    let node = arriving.dest(graph)?;
    let incident = &graph.node(node)?.incident;
    let n = incident.len();
    let Some(i) = incident.iter().position(|&e| e == arriving.edge) else {
        return Ok(None);
    };
    for step in 1..n {
        let e = incident[(i + n - step) % n];
        let Some(&forward) = direction.get(e) else {
            continue;
        };
        if used.contains_key(e) {
            continue;
        }
        let h = HalfEdge { edge: e, forward };
        if h.origin(graph)? == node {
            return Ok(Some(h));
        }
    }
    Ok(None)
}

fn build_path(
    graph: &Graph,
    chain: &[HalfEdge],
    closed: bool,
    sources: &[PathVector],
) -> Result<Option<Path>> {
    let mut runs: Vec<Run> = Vec::with_capacity(chain.len());
    for h in chain {
        let from = graph.node(h.origin(graph)?)?.point;
        let to = graph.node(h.dest(graph)?)?.point;
        let back = graph
            .edge(h.edge)?
            .back
            .map(|b| if h.forward { b } else { b.reversed() });
        let run = match back {
            Some(back)
                if source_segment(sources, &back)
                    .is_some_and(|(_, seg)| !seg.is_line()) =>
            {
                Run::Curve { from, to, back }
            }
            _ => Run::Line { from, to },
        };
        match runs.last().and_then(|last| last.merge(&run)) {
            Some(merged) => {
                if let Some(last) = runs.last_mut() {
                    *last = merged;
                }
            }
            None => runs.push(run),
        }
    }
    if closed && runs.len() > 2 {
        if let (Some(last), Some(first)) = (runs.last(), runs.first()) {
            if let Some(merged) = last.merge(first) {
                runs.pop();
                runs[0] = merged;
            }
        }
    }
    // A lone curve may loop back onto itself; a lone line cannot.
    if closed && matches!(runs.as_slice(), [Run::Line { .. }]) {
        return Ok(None);
    }
    let Some(first) = runs.first() else {
        return Ok(None);
    };
    Ok(Some(Path {
        start: first.start(),
        segments: runs.into_iter().map(|r| r.to_segment(sources)).collect(),
        closed,
    }))
}
