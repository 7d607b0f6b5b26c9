//! Directed planar graph produced by sweep normalization.
//!
//! Nodes and edges live in slot-map arenas owned by one [`Graph`], which is
//! created fresh for each top-level operation and dropped as a whole.
mod builder;
mod extract;
mod winding;

pub use builder::{BuilderState, GraphBuilder};
pub use extract::extract_contours;
pub use winding::{FaceWindings, HalfEdge};

use slotmap::SlotMap;

use crate::error::OperationError;
use crate::math::{Point2, Vector2};

slotmap::new_key_type! {
    /// Unique identifier for a node in a [`Graph`].
    pub struct NodeId;
}

slotmap::new_key_type! {
    /// Unique identifier for an edge in a [`Graph`].
    pub struct EdgeId;
}

/// A point of the arrangement and the edges meeting there.
#[derive(Debug, Clone)]
pub struct Node {
    pub point: Point2,
    /// Incident edges, counter-clockwise by outgoing direction once the
    /// graph is normalized.
    pub incident: Vec<EdgeId>,
}

/// Per-edge markers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EdgeFlags {
    /// Every operand's winding delta cancelled out on this edge.
    pub degenerate: bool,
}

/// Where an edge came from on the input paths.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeBackData {
    pub operand: usize,
    pub subpath: usize,
    pub piece: usize,
    /// Parameter on the source segment at the edge's start node.
    pub t0: f64,
    /// Parameter on the source segment at the edge's end node.
    pub t1: f64,
}

impl EdgeBackData {
    /// The same source interval, traversed from end to start.
    #[must_use]
    pub fn reversed(&self) -> Self {
        Self {
            t0: self.t1,
            t1: self.t0,
            ..*self
        }
    }
}

/// A directed edge between two distinct nodes.
///
/// `winding[k]` is how much operand `k`'s winding number grows when crossing
/// the edge from its right side to its left side.
#[derive(Debug, Clone)]
pub struct Edge {
    pub start: NodeId,
    pub end: NodeId,
    pub winding: Vec<i32>,
    pub flags: EdgeFlags,
    pub back: Option<EdgeBackData>,
}

/// Arena of nodes and edges.
#[derive(Debug, Default)]
pub struct Graph {
    nodes: SlotMap<NodeId, Node>,
    edges: SlotMap<EdgeId, Edge>,
    operands: usize,
}

impl Graph {
    /// Creates an empty graph whose edges carry `operands` winding slots.
    #[must_use]
    pub fn new(operands: usize) -> Self {
        Self {
            operands,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn operand_count(&self) -> usize {
        self.operands
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Inserts a node and returns its ID.
    pub fn add_node(&mut self, point: Point2) -> NodeId {
        self.nodes.insert(Node {
            point,
            incident: Vec::new(),
        })
    }

    /// Inserts an edge between two existing nodes and returns its ID.
    ///
    /// # Errors
    ///
    /// Returns an error if either node is missing.
    pub fn add_edge(
        &mut self,
        start: NodeId,
        end: NodeId,
        winding: Vec<i32>,
        back: Option<EdgeBackData>,
    ) -> Result<EdgeId, OperationError> {
        if !self.nodes.contains_key(start) || !self.nodes.contains_key(end) {
            return Err(OperationError::EntityNotFound("node"));
        }
        let degenerate = winding.iter().all(|&w| w == 0);
        let id = self.edges.insert(Edge {
            start,
            end,
            winding,
            flags: EdgeFlags { degenerate },
            back,
        });
        self.node_mut(start)?.incident.push(id);
        self.node_mut(end)?.incident.push(id);
        Ok(id)
    }

    /// Returns the node data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the node is not in the graph.
    pub fn node(&self, id: NodeId) -> Result<&Node, OperationError> {
        self.nodes
            .get(id)
            .ok_or(OperationError::EntityNotFound("node"))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, OperationError> {
        self.nodes
            .get_mut(id)
            .ok_or(OperationError::EntityNotFound("node"))
    }

    /// Returns the edge data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the edge is not in the graph.
    pub fn edge(&self, id: EdgeId) -> Result<&Edge, OperationError> {
        self.edges
            .get(id)
            .ok_or(OperationError::EntityNotFound("edge"))
    }

    /// Returns the mutable edge data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the edge is not in the graph.
    pub fn edge_mut(&mut self, id: EdgeId) -> Result<&mut Edge, OperationError> {
        self.edges
            .get_mut(id)
            .ok_or(OperationError::EntityNotFound("edge"))
    }

    /// All nodes with their ids, in storage order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter()
    }

    /// All edges with their ids, in storage order.
    pub fn edges(&self) -> impl Iterator<Item = (EdgeId, &Edge)> {
        self.edges.iter()
    }

    /// Unit vector pointing away from `node` along `edge`.
    ///
    /// # Errors
    ///
    /// Returns an error if the edge or its nodes are missing.
    pub fn direction_from(&self, edge: EdgeId, node: NodeId) -> Result<Vector2, OperationError> {
        let e = self.edge(edge)?;
        let other = if e.start == node { e.end } else { e.start };
        let d = self.node(other)?.point - self.node(node)?.point;
        Ok(d / d.norm())
    }

    /// Sorts every node's incident edges counter-clockwise by outgoing angle.
    ///
    /// # Errors
    ///
    /// Returns an error if an incident edge is missing.
    pub fn sort_incident(&mut self) -> Result<(), OperationError> {
        let ids: Vec<NodeId> = self.nodes.keys().collect();
        for id in ids {
            let incident = self.node(id)?.incident.clone();
            let mut keyed = Vec::with_capacity(incident.len());
            for e in incident {
                let d = self.direction_from(e, id)?;
                keyed.push((d.y.atan2(d.x), e));
            }
            keyed.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
            self.node_mut(id)?.incident = keyed.into_iter().map(|(_, e)| e).collect();
        }
        Ok(())
    }

    /// Sum of all edges' winding deltas weighted by their signed area
    /// contribution, i.e. the total signed area of operand `k`.
    #[must_use]
    pub fn operand_area(&self, k: usize) -> f64 {
        self.edges
            .values()
            .filter_map(|e| {
                let a = self.nodes.get(e.start)?.point;
                let b = self.nodes.get(e.end)?.point;
                let w = f64::from(*e.winding.get(k)?);
                Some(w * 0.5 * (a.x * b.y - b.x * a.y))
            })
            .sum()
    }
}
