use std::collections::HashMap;

use tracing::{debug, warn};

use super::extract::extract_contours;
use super::winding::{FaceWindings, HalfEdge};
use super::{EdgeBackData, EdgeId, Graph, NodeId};
use crate::config::KernelConfig;
use crate::error::{OperationError, Result, SweepError};
use crate::flatten::Approximate;
use crate::geometry::{Path, PathVector};
use crate::math::{snap_point, Point2};
use crate::operations::boolean::FillRule;
use crate::sweep::{SplitPoint, SweepPass};

/// Phase of a [`GraphBuilder`]. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuilderState {
    Empty,
    Approximated,
    Sweeping,
    Normalized,
    Resolved,
    Extracted,
    /// The sweep aborted; the builder holds no usable graph.
    Failed,
}

impl BuilderState {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Approximated => "approximated",
            Self::Sweeping => "sweeping",
            Self::Normalized => "normalized",
            Self::Resolved => "resolved",
            Self::Extracted => "extracted",
            Self::Failed => "failed",
        }
    }
}

#[derive(Debug, Clone)]
struct Piece {
    a: Point2,
    b: Point2,
    operand: usize,
    back: Option<EdgeBackData>,
}

/// Builds a normalized planar graph from one or more operands and turns it
/// back into contours.
///
/// The builder runs strictly forward through
/// `Empty → Approximated → Sweeping → Normalized → Resolved → Extracted`;
/// calling a phase out of order is reported as
/// [`OperationError::InvalidState`].
#[derive(Debug)]
pub struct GraphBuilder {
    config: KernelConfig,
    state: BuilderState,
    sources: Vec<PathVector>,
    fills: Vec<FillRule>,
    pieces: Vec<Piece>,
    graph: Graph,
    kept: Vec<HalfEdge>,
    passes: usize,
}

impl GraphBuilder {
    #[must_use]
    pub fn new(config: KernelConfig) -> Self {
        Self {
            config,
            state: BuilderState::Empty,
            sources: Vec::new(),
            fills: Vec::new(),
            pieces: Vec::new(),
            graph: Graph::default(),
            kept: Vec::new(),
            passes: 0,
        }
    }

    #[must_use]
    pub fn state(&self) -> BuilderState {
        self.state
    }

    #[must_use]
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    #[must_use]
    pub fn operand_count(&self) -> usize {
        self.sources.len()
    }

    /// Number of sweep passes the last normalization needed.
    #[must_use]
    pub fn passes(&self) -> usize {
        self.passes
    }

    /// Half-edges selected by the last resolution, inside on their left.
    #[must_use]
    pub fn kept(&self) -> &[HalfEdge] {
        &self.kept
    }

    /// Approximates `paths` and adds them as the next operand.
    ///
    /// Open subpaths are closed by a straight line unless `fill` is
    /// [`FillRule::Raw`]. Returns the operand index.
    ///
    /// # Errors
    ///
    /// Returns an error if the builder is past approximation or the paths
    /// contain non-finite coordinates.
    pub fn add_operand(&mut self, paths: &[Path], fill: FillRule) -> Result<usize> {
        self.require_state(&[BuilderState::Empty, BuilderState::Approximated], "empty or approximated")?;
        let operand = self.sources.len();
        let polyline = Approximate::new(paths, self.config.flatten_tolerance)
            .with_close_open(fill != FillRule::Raw)
            .execute()?;
        self.pieces.extend(polyline.edges().map(|edge| Piece {
            a: edge.from,
            b: edge.to,
            operand,
            back: edge.source.map(|s| EdgeBackData {
                operand,
                subpath: s.subpath,
                piece: s.piece,
                t0: s.t0,
                t1: s.t1,
            }),
        }));
        self.sources.push(paths.to_vec());
        self.fills.push(fill);
        self.state = BuilderState::Approximated;
        Ok(operand)
    }

    /// Sweeps the approximated edges until no two of them cross, then builds
    /// the graph.
    ///
    /// # Errors
    ///
    /// Returns an error if called out of order, if the sweep exhausts its
    /// event capacity, is cancelled, or does not stabilize. Sweep failures
    /// leave the builder [`BuilderState::Failed`].
    pub fn normalize(&mut self) -> Result<()> {
        self.require_state(&[BuilderState::Approximated], "approximated")?;
        self.state = BuilderState::Sweeping;
        match self.run_passes() {
            Ok(graph) => {
                debug!(
                    nodes = graph.node_count(),
                    edges = graph.edge_count(),
                    passes = self.passes,
                    "normalized graph"
                );
                self.graph = graph;
                self.state = BuilderState::Normalized;
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "normalization failed");
                self.state = BuilderState::Failed;
                Err(err)
            }
        }
    }

    /// Keeps the edges whose two sides classify differently.
    ///
    /// Each operand's winding number is mapped through its fill rule, and
    /// `combine` merges the per-operand results into one inside flag.
    ///
    /// # Errors
    ///
    /// Returns an error if called out of order or if the graph is
    /// inconsistent.
    pub fn resolve<F>(&mut self, combine: F) -> Result<()>
    where
        F: Fn(&[bool]) -> bool,
    {
        self.require_state(&[BuilderState::Normalized], "normalized")?;
        let faces = match FaceWindings::compute(&self.graph) {
            Ok(faces) => faces,
            Err(err) => {
                self.state = BuilderState::Failed;
                return Err(err);
            }
        };
        let fills = &self.fills;
        let inside = |winding: &[i32]| {
            let flags: Vec<bool> = fills
                .iter()
                .zip(winding)
                .map(|(fill, &w)| fill.is_inside(w))
                .collect();
            combine(&flags)
        };
        let mut kept = Vec::new();
        for (id, _) in self.graph.edges() {
            let (left, right) = faces
                .sides(id)
                .ok_or(OperationError::EntityNotFound("face"))?;
            let (in_left, in_right) = (inside(left), inside(right));
            if in_left != in_right {
                kept.push(HalfEdge {
                    edge: id,
                    forward: in_left,
                });
            }
        }
        debug!(kept = kept.len(), faces = faces.face_count(), "resolved graph");
        self.kept = kept;
        self.state = BuilderState::Resolved;
        Ok(())
    }

    /// Keeps every edge with a net winding, oriented by its sign, without
    /// classifying faces.
    ///
    /// # Errors
    ///
    /// Returns an error if called out of order.
    pub fn resolve_raw(&mut self) -> Result<()> {
        self.require_state(&[BuilderState::Normalized], "normalized")?;
        self.kept = self
            .graph
            .edges()
            .filter(|(_, e)| !e.flags.degenerate)
            .map(|(id, e)| HalfEdge {
                edge: id,
                forward: e.winding.iter().sum::<i32>() >= 0,
            })
            .collect();
        self.state = BuilderState::Resolved;
        Ok(())
    }

    /// Converts the kept half-edges into contours.
    ///
    /// # Errors
    ///
    /// Returns an error if called out of order or if the graph is
    /// inconsistent.
    pub fn extract(&mut self) -> Result<PathVector> {
        self.require_state(&[BuilderState::Resolved], "resolved")?;
        let paths = extract_contours(&self.graph, &self.kept, &self.sources)?;
        debug!(contours = paths.len(), "extracted contours");
        self.state = BuilderState::Extracted;
        Ok(paths)
    }

    fn require_state(&self, allowed: &[BuilderState], expected: &'static str) -> Result<()> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(OperationError::InvalidState {
                expected,
                found: self.state.name(),
            }
            .into())
        }
    }

    fn run_passes(&mut self) -> Result<Graph> {
        let extent = self
            .pieces
            .iter()
            .flat_map(|p| [p.a.x, p.a.y, p.b.x, p.b.y])
            .fold(0.0_f64, |m, v| m.max(v.abs()));
        let eps = self.config.epsilon_for(extent);
        let mut pieces: Vec<Piece> = self
            .pieces
            .iter()
            .map(|p| Piece {
                a: snap_point(&p.a, eps),
                b: snap_point(&p.b, eps),
                ..p.clone()
            })
            .filter(|p| p.a != p.b)
            .collect();

        for pass in 1..=self.config.max_passes {
            let segments: Vec<(Point2, Point2)> = pieces.iter().map(|p| (p.a, p.b)).collect();
            let report = SweepPass::new(&segments, eps, &self.config).execute()?;
            self.passes = pass;
            if !report.has_splits() {
                return build_graph(&pieces, eps, self.sources.len());
            }
            pieces = split_pieces(pieces, report.splits);
        }
        Err(SweepError::Unstable {
            passes: self.config.max_passes,
        }
        .into())
    }
}

fn split_pieces(pieces: Vec<Piece>, splits: Vec<Vec<SplitPoint>>) -> Vec<Piece> {
    let mut out = Vec::with_capacity(pieces.len());
    for (piece, mut points) in pieces.into_iter().zip(splits) {
        if points.is_empty() {
            out.push(piece);
            continue;
        }
        points.sort_by(|x, y| x.t.total_cmp(&y.t));
        points.push(SplitPoint {
            t: 1.0,
            point: piece.b,
        });
        let mut from = piece.a;
        let mut t_from = 0.0;
        for split in &points {
            if split.point == from {
                continue;
            }
            let back = piece.back.map(|b| EdgeBackData {
                t0: b.t0 + (b.t1 - b.t0) * t_from,
                t1: b.t0 + (b.t1 - b.t0) * split.t,
                ..b
            });
            out.push(Piece {
                a: from,
                b: split.point,
                operand: piece.operand,
                back,
            });
            from = split.point;
            t_from = split.t;
        }
    }
    out
}

#[allow(clippy::cast_possible_truncation)]
fn grid_key(p: &Point2, eps: f64) -> (i64, i64) {
    ((p.x / eps).round() as i64, (p.y / eps).round() as i64)
}

fn build_graph(pieces: &[Piece], eps: f64, operands: usize) -> Result<Graph> {
    let mut graph = Graph::new(operands);
    let mut nodes: HashMap<(i64, i64), NodeId> = HashMap::new();
    let mut edges: HashMap<(NodeId, NodeId), EdgeId> = HashMap::new();
    for piece in pieces {
        let a = *nodes
            .entry(grid_key(&piece.a, eps))
            .or_insert_with(|| graph.add_node(piece.a));
        let b = *nodes
            .entry(grid_key(&piece.b, eps))
            .or_insert_with(|| graph.add_node(piece.b));
        if a == b {
            continue;
        }
        let key = (a.min(b), a.max(b));
        if let Some(&id) = edges.get(&key) {
            let edge = graph.edge_mut(id)?;
            let sign = if edge.start == a { 1 } else { -1 };
            if let Some(w) = edge.winding.get_mut(piece.operand) {
                *w += sign;
            }
            edge.flags.degenerate = edge.winding.iter().all(|&w| w == 0);
        } else {
            let mut winding = vec![0; operands];
            if let Some(w) = winding.get_mut(piece.operand) {
                *w = 1;
            }
            let id = graph.add_edge(a, b, winding, piece.back)?;
            edges.insert(key, id);
        }
    }
    graph.sort_incident()?;
    Ok(graph)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::PathgraphError;

    fn square(x0: f64, y0: f64, size: f64) -> Path {
        Path::rect(Point2::new(x0, y0), Point2::new(x0 + size, y0 + size))
    }

    #[test]
    fn overlapping_squares_are_split() {
        let mut builder = GraphBuilder::new(KernelConfig::default());
        builder
            .add_operand(&[square(0.0, 0.0, 1.0)], FillRule::NonZero)
            .unwrap();
        builder
            .add_operand(&[square(0.5, 0.5, 1.0)], FillRule::NonZero)
            .unwrap();
        builder.normalize().unwrap();
        assert_eq!(builder.state(), BuilderState::Normalized);
        // 8 corners plus 2 crossings; each square edge crossed once is split.
        assert_eq!(builder.graph().node_count(), 10);
        assert_eq!(builder.graph().edge_count(), 12);
        assert!(builder.passes() >= 1);
    }

    #[test]
    fn duplicate_edges_merge_windings() {
        let mut builder = GraphBuilder::new(KernelConfig::default());
        builder
            .add_operand(&[square(0.0, 0.0, 1.0), square(0.0, 0.0, 1.0)], FillRule::NonZero)
            .unwrap();
        builder.normalize().unwrap();
        let graph = builder.graph();
        assert_eq!(graph.edge_count(), 4);
        assert!(graph.edges().all(|(_, e)| e.winding == vec![2]));
    }

    #[test]
    fn opposite_duplicates_cancel() {
        let mut builder = GraphBuilder::new(KernelConfig::default());
        let sq = square(0.0, 0.0, 1.0);
        builder
            .add_operand(&[sq.clone(), sq.reversed()], FillRule::NonZero)
            .unwrap();
        builder.normalize().unwrap();
        assert!(builder.graph().edges().all(|(_, e)| e.flags.degenerate));
        builder.resolve(|inside| inside[0]).unwrap();
        assert!(builder.kept().is_empty());
        assert!(builder.extract().unwrap().is_empty());
    }

    #[test]
    fn out_of_order_calls_are_rejected() {
        let mut builder = GraphBuilder::new(KernelConfig::default());
        let err = builder.normalize().unwrap_err();
        assert!(matches!(
            err,
            PathgraphError::Operation(OperationError::InvalidState { .. })
        ));
        assert!(builder.extract().is_err());
        builder
            .add_operand(&[square(0.0, 0.0, 1.0)], FillRule::NonZero)
            .unwrap();
        builder.normalize().unwrap();
        assert!(builder
            .add_operand(&[square(0.0, 0.0, 1.0)], FillRule::NonZero)
            .is_err());
    }

    #[test]
    fn capacity_failure_moves_to_failed() {
        let config = KernelConfig::default().with_event_capacity(0);
        let mut builder = GraphBuilder::new(config);
        builder
            .add_operand(&[square(0.0, 0.0, 1.0)], FillRule::NonZero)
            .unwrap();
        builder
            .add_operand(&[square(0.5, 0.5, 1.0)], FillRule::NonZero)
            .unwrap();
        assert!(builder.normalize().is_err());
        assert_eq!(builder.state(), BuilderState::Failed);
        assert!(builder.resolve(|inside| inside[0]).is_err());
    }

    #[test]
    fn square_round_trips() {
        let mut builder = GraphBuilder::new(KernelConfig::default());
        builder
            .add_operand(&[square(0.0, 0.0, 2.0)], FillRule::NonZero)
            .unwrap();
        builder.normalize().unwrap();
        builder.resolve(|inside| inside[0]).unwrap();
        let paths = builder.extract().unwrap();
        assert_eq!(paths.len(), 1);
        assert!(paths[0].closed);
        assert_eq!(paths[0].segments.len(), 4);
        assert!((paths[0].signed_area() - 4.0).abs() < 1e-9);
        assert_eq!(builder.state(), BuilderState::Extracted);
    }
}
