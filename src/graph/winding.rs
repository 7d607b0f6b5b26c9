use std::collections::VecDeque;

use slotmap::SecondaryMap;
use tracing::trace;

use super::{EdgeId, Graph, NodeId};
use crate::error::{OperationError, Result};
use crate::math::Point2;
use crate::operations::components::UnionFind;

/// One direction of traversal of a graph edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HalfEdge {
    pub edge: EdgeId,
    /// `true` when traversed from the edge's start to its end.
    pub forward: bool,
}

impl HalfEdge {
    #[must_use]
    pub fn twin(self) -> Self {
        Self {
            edge: self.edge,
            forward: !self.forward,
        }
    }

    /// Node the half-edge leaves from.
    ///
    /// # Errors
    ///
    /// Returns an error if the edge is missing.
    pub fn origin(self, graph: &Graph) -> Result<NodeId> {
        let e = graph.edge(self.edge)?;
        Ok(if self.forward { e.start } else { e.end })
    }

    /// Node the half-edge arrives at.
    ///
    /// # Errors
    ///
    /// Returns an error if the edge is missing.
    pub fn dest(self, graph: &Graph) -> Result<NodeId> {
        self.twin().origin(graph)
    }

    /// Winding change of operand `k` from the right to the left of the
    /// half-edge.
    ///
    /// # Errors
    ///
    /// Returns an error if the edge is missing.
    pub fn delta(self, graph: &Graph, k: usize) -> Result<i32> {
        let w = graph.edge(self.edge)?.winding.get(k).copied().unwrap_or(0);
        Ok(if self.forward { w } else { -w })
    }

    /// The outgoing half-edge of `edge` at `node`.
    ///
    /// # Errors
    ///
    /// Returns an error if the edge is missing.
    pub fn leaving(graph: &Graph, edge: EdgeId, node: NodeId) -> Result<Self> {
        Ok(Self {
            edge,
            forward: graph.edge(edge)?.start == node,
        })
    }
}

/// The half-edge following `h` around the face on its left: the first edge
/// clockwise from `h`'s twin at the destination node.
///
/// # Errors
///
/// Returns an error if the graph is inconsistent.
pub fn next_around_face(graph: &Graph, h: HalfEdge) -> Result<HalfEdge> {
    let dest = h.dest(graph)?;
    let incident = &graph.node(dest)?.incident;
    let n = incident.len();
    let i = incident
        .iter()
        .position(|&e| e == h.edge)
        .ok_or(OperationError::EntityNotFound("incident edge"))?;
    HalfEdge::leaving(graph, incident[(i + n - 1) % n], dest)
}

/// Faces of a normalized graph with the per-operand winding number of each.
#[derive(Debug)]
pub struct FaceWindings {
    /// Face on the left of the forward and backward half-edge of each edge.
    face_of: SecondaryMap<EdgeId, [usize; 2]>,
    windings: Vec<Vec<i32>>,
}

impl FaceWindings {
    /// Traces every face and propagates winding numbers across edges.
    ///
    /// Each connected part of the graph is anchored by casting a ray to the
    /// left from its leftmost node through the edges of all other parts.
    ///
    /// # Errors
    ///
    /// Returns an error if the graph is inconsistent (a face walk does not
    /// close).
    pub fn compute(graph: &Graph) -> Result<Self> {
        let mut face_of: SecondaryMap<EdgeId, [usize; 2]> = SecondaryMap::new();
        let mut half_edges: Vec<Vec<HalfEdge>> = Vec::new();
        let mut areas = Vec::new();
        let limit = 2 * graph.edge_count() + 1;

        for (id, _) in graph.edges() {
            for forward in [true, false] {
                let start = HalfEdge { edge: id, forward };
                if face_of.get(id).is_some_and(|f| f[usize::from(!forward)] != usize::MAX) {
                    continue;
                }
                let face = half_edges.len();
                let mut members = Vec::new();
                let mut area = 0.0;
                let mut h = start;
                loop {
                    let slot = face_of.entry(h.edge).map(|e| e.or_insert([usize::MAX; 2]));
                    if let Some(slot) = slot {
                        slot[usize::from(!h.forward)] = face;
                    }
                    let a = graph.node(h.origin(graph)?)?.point;
                    let b = graph.node(h.dest(graph)?)?.point;
                    area += 0.5 * (a.x * b.y - b.x * a.y);
                    members.push(h);
                    h = next_around_face(graph, h)?;
                    if h == start {
                        break;
                    }
                    if members.len() > limit {
                        return Err(OperationError::Failed("face walk did not close".into()).into());
                    }
                }
                half_edges.push(members);
                areas.push(area);
            }
        }

        let operands = graph.operand_count();
        let parts = node_components(graph)?;
        let mut part_of: SecondaryMap<NodeId, usize> = SecondaryMap::new();
        for (c, nodes) in parts.iter().enumerate() {
            for &n in nodes {
                part_of.insert(n, c);
            }
        }
        // Outer face of each part: the face with the most negative area.
        let mut outer: Vec<Option<usize>> = vec![None; parts.len()];
        for (face, members) in half_edges.iter().enumerate() {
            let Some(h) = members.first() else { continue };
            let Some(&c) = part_of.get(h.origin(graph)?) else {
                continue;
            };
            if outer[c].is_none_or(|o| areas[face] < areas[o]) {
                outer[c] = Some(face);
            }
        }

        let mut windings: Vec<Option<Vec<i32>>> = vec![None; half_edges.len()];
        for (c, nodes) in parts.iter().enumerate() {
            let Some(outer) = outer[c] else { continue };
            let anchor = leftmost(graph, nodes)?;
            windings[outer] = Some(ray_winding(graph, &part_of, &anchor, c, operands)?);

            let mut queue = VecDeque::from([outer]);
            while let Some(face) = queue.pop_front() {
                let Some(here) = windings[face].clone() else { continue };
                for &h in &half_edges[face] {
                    let Some(&sides) = face_of.get(h.edge) else { continue };
                    let other = sides[usize::from(h.forward)];
                    if other == usize::MAX || windings[other].is_some() {
                        continue;
                    }
                    let mut w = here.clone();
                    for (k, value) in w.iter_mut().enumerate() {
                        *value -= h.delta(graph, k)?;
                    }
                    windings[other] = Some(w);
                    queue.push_back(other);
                }
            }
        }

        trace!(faces = half_edges.len(), "traced faces");
        Ok(Self {
            face_of,
            windings: windings
                .into_iter()
                .map(|w| w.unwrap_or_else(|| vec![0; operands]))
                .collect(),
        })
    }

    #[must_use]
    pub fn face_count(&self) -> usize {
        self.windings.len()
    }

    /// Winding numbers of a face, one per operand.
    #[must_use]
    pub fn winding(&self, face: usize) -> &[i32] {
        self.windings.get(face).map_or(&[], Vec::as_slice)
    }

    /// Winding numbers on the left and right of an edge.
    #[must_use]
    pub fn sides(&self, edge: EdgeId) -> Option<(&[i32], &[i32])> {
        let f = self.face_of.get(edge)?;
        Some((self.winding(f[0]), self.winding(f[1])))
    }
}

/// Groups nodes into connected parts.
fn node_components(graph: &Graph) -> Result<Vec<Vec<NodeId>>> {
    let ids: Vec<NodeId> = graph.nodes().map(|(id, _)| id).collect();
    let mut index: SecondaryMap<NodeId, usize> = SecondaryMap::new();
    for (i, &id) in ids.iter().enumerate() {
        index.insert(id, i);
    }
    let mut uf = UnionFind::new(ids.len());
    for (_, e) in graph.edges() {
        let (Some(&a), Some(&b)) = (index.get(e.start), index.get(e.end)) else {
            return Err(OperationError::EntityNotFound("node").into());
        };
        uf.union(a, b);
    }
    Ok(uf
        .groups()
        .into_iter()
        .map(|members| members.into_iter().map(|i| ids[i]).collect())
        .collect())
}

fn leftmost(graph: &Graph, nodes: &[NodeId]) -> Result<Point2> {
    let mut best: Option<Point2> = None;
    for &n in nodes {
        let p = graph.node(n)?.point;
        if best.is_none_or(|b| p.x < b.x || (p.x == b.x && p.y < b.y)) {
            best = Some(p);
        }
    }
    best.ok_or_else(|| OperationError::EntityNotFound("node").into())
}

/// Winding numbers at `anchor` contributed by edges outside `component`,
/// counted along a ray to the left with a half-open rule on `y`.
fn ray_winding(
    graph: &Graph,
    part_of: &SecondaryMap<NodeId, usize>,
    anchor: &Point2,
    component: usize,
    operands: usize,
) -> Result<Vec<i32>> {
    let mut w = vec![0; operands];
    for (_, e) in graph.edges() {
        if part_of.get(e.start) == Some(&component) {
            continue;
        }
        let a = graph.node(e.start)?.point;
        let b = graph.node(e.end)?.point;
        let downward = b.y <= anchor.y && anchor.y < a.y;
        let upward = a.y <= anchor.y && anchor.y < b.y;
        if !downward && !upward {
            continue;
        }
        let x = a.x + (b.x - a.x) * (anchor.y - a.y) / (b.y - a.y);
        if x >= anchor.x {
            continue;
        }
        for (k, value) in w.iter_mut().enumerate() {
            let delta = e.winding.get(k).copied().unwrap_or(0);
            *value += if downward { delta } else { -delta };
        }
    }
    Ok(w)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn add_loop(g: &mut Graph, pts: &[(f64, f64)], winding: &[i32]) {
        let ids: Vec<_> = pts.iter().map(|&(x, y)| g.add_node(Point2::new(x, y))).collect();
        for i in 0..ids.len() {
            g.add_edge(ids[i], ids[(i + 1) % ids.len()], winding.to_vec(), None)
                .unwrap();
        }
    }

    fn square(x0: f64, y0: f64, size: f64) -> Vec<(f64, f64)> {
        vec![(x0, y0), (x0 + size, y0), (x0 + size, y0 + size), (x0, y0 + size)]
    }

    #[test]
    fn single_square_has_inside_and_outside() {
        let mut g = Graph::new(1);
        add_loop(&mut g, &square(0.0, 0.0, 1.0), &[1]);
        g.sort_incident().unwrap();
        let faces = FaceWindings::compute(&g).unwrap();
        assert_eq!(faces.face_count(), 2);
        for (id, _) in g.edges() {
            let (left, right) = faces.sides(id).unwrap();
            assert_eq!(left, &[1]);
            assert_eq!(right, &[0]);
        }
    }

    #[test]
    fn nested_squares_accumulate() {
        let mut g = Graph::new(2);
        add_loop(&mut g, &square(0.0, 0.0, 4.0), &[1, 0]);
        add_loop(&mut g, &square(1.0, 1.0, 1.0), &[0, 1]);
        g.sort_incident().unwrap();
        let faces = FaceWindings::compute(&g).unwrap();
        let inner_edge = g
            .edges()
            .find(|(_, e)| e.winding == vec![0, 1])
            .map(|(id, _)| id)
            .unwrap();
        let (left, right) = faces.sides(inner_edge).unwrap();
        assert_eq!(left, &[1, 1]);
        assert_eq!(right, &[1, 0]);
    }

    #[test]
    fn reversed_hole_cancels() {
        let mut g = Graph::new(1);
        add_loop(&mut g, &square(0.0, 0.0, 4.0), &[1]);
        let mut hole = square(1.0, 1.0, 1.0);
        hole.reverse();
        add_loop(&mut g, &hole, &[1]);
        g.sort_incident().unwrap();
        let faces = FaceWindings::compute(&g).unwrap();
        let windings: Vec<i32> = (0..faces.face_count()).map(|f| faces.winding(f)[0]).collect();
        // Outer face, ring, hole seen from the hole's outside, hole interior.
        assert_eq!(windings.iter().filter(|&&w| w == 1).count(), 2);
        assert_eq!(windings.iter().filter(|&&w| w == 0).count(), 2);
    }

    #[test]
    fn half_edge_walk_closes() {
        let mut g = Graph::new(1);
        add_loop(&mut g, &square(0.0, 0.0, 1.0), &[1]);
        g.sort_incident().unwrap();
        let (id, _) = g.edges().next().unwrap();
        let start = HalfEdge { edge: id, forward: true };
        let mut h = start;
        for _ in 0..4 {
            h = next_around_face(&g, h).unwrap();
        }
        assert_eq!(h, start);
    }
}
