//! Arena graph of polyline edges between grid-snapped nodes
//!
//! Nodes live in an `IndexMap` keyed by their snapped integer coordinates, so
//! a node id is its insertion index and iteration order is deterministic.
//! Edges live in a `Vec` and are tombstoned on removal; ids stay stable for
//! the lifetime of the graph. A node whose last edge goes away stays in the
//! map with an empty edge list, since removing it would shift every later
//! node id; [`Graph::active_nodes`] skips them.

use std::collections::HashSet;

use indexmap::IndexMap;

use crate::error::{GeometryError, Result};
use crate::geometry::{points_length, Point};

pub type NodeId = usize;
pub type EdgeId = usize;

/// Integer grid cell a point snaps to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridKey(i64, i64);

#[derive(Debug, Clone)]
pub struct Node {
    pub point: Point,
    /// Live incident edges; a self-loop is listed twice
    pub edges: Vec<EdgeId>,
    /// First or last point of some input line
    pub terminal: bool,
}

impl Node {
    #[inline]
    pub fn degree(&self) -> usize {
        self.edges.len()
    }
}

#[derive(Debug, Clone)]
pub struct Edge {
    pub from: NodeId,
    pub to: NodeId,
    pub coords: Vec<Point>,
    pub length: f64,
    pub removed: bool,
}

impl Edge {
    #[inline]
    pub fn is_loop(&self) -> bool {
        self.from == self.to
    }

    /// Endpoint opposite `node`
    #[inline]
    pub fn other_end(&self, node: NodeId) -> NodeId {
        if self.from == node {
            self.to
        } else {
            self.from
        }
    }

    /// Direction leaving `node` along this edge
    pub fn direction_from(&self, node: NodeId) -> (f64, f64) {
        let n = self.coords.len();
        let (a, b) = if self.from == node {
            (self.coords[0], self.coords[1])
        } else {
            (self.coords[n - 1], self.coords[n - 2])
        };
        (b.x - a.x, b.y - a.y)
    }
}

pub struct Graph {
    precision: f64,
    nodes: IndexMap<GridKey, Node>,
    edges: Vec<Edge>,
    /// Unordered node pairs of two-point segments already inserted
    segments: HashSet<(NodeId, NodeId)>,
}

impl Graph {
    /// Graph snapping to `precision` cells per unit
    pub fn new(precision: f64) -> Self {
        Self {
            precision,
            nodes: IndexMap::new(),
            edges: Vec::new(),
            segments: HashSet::new(),
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn live_edge_count(&self) -> usize {
        self.edges.iter().filter(|e| !e.removed).count()
    }

    /// Ids of all live edges in creation order
    pub fn live_edges(&self) -> Vec<EdgeId> {
        (0..self.edges.len()).filter(|&e| !self.edges[e].removed).collect()
    }

    #[inline]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    #[inline]
    pub fn edge(&self, id: EdgeId) -> &Edge {
        &self.edges[id]
    }

    pub fn edge_mut(&mut self, id: EdgeId) -> &mut Edge {
        &mut self.edges[id]
    }

    /// Node for the grid cell containing `p`, created on first use
    pub fn node_for(&mut self, p: Point) -> NodeId {
        let key = GridKey(
            (p.x * self.precision).round() as i64,
            (p.y * self.precision).round() as i64,
        );
        let point = Point::new(key.0 as f64 / self.precision, key.1 as f64 / self.precision);
        let entry = self.nodes.entry(key);
        let id = entry.index();
        entry.or_insert_with(|| Node {
            point,
            edges: Vec::new(),
            terminal: false,
        });
        id
    }

    /// Record that an input line starts or ends at `p`
    pub fn mark_terminal(&mut self, p: Point) -> NodeId {
        let id = self.node_for(p);
        self.nodes[id].terminal = true;
        id
    }

    /// Ids of nodes that still have at least one live edge
    pub fn active_nodes(&self) -> Vec<NodeId> {
        self.nodes
            .values()
            .enumerate()
            .filter(|(_, node)| !node.edges.is_empty())
            .map(|(id, _)| id)
            .collect()
    }

    /// Insert a two-point segment unless it is degenerate or already present
    /// in either direction
    pub fn add_segment(&mut self, a: Point, b: Point) -> Option<EdgeId> {
        let from = self.node_for(a);
        let to = self.node_for(b);
        if from == to {
            return None;
        }
        if !self.segments.insert((from.min(to), from.max(to))) {
            return None;
        }
        let coords = vec![self.nodes[from].point, self.nodes[to].point];
        Some(self.add_edge(from, to, coords))
    }

    pub fn add_edge(&mut self, from: NodeId, to: NodeId, coords: Vec<Point>) -> EdgeId {
        let id = self.edges.len();
        let length = points_length(&coords);
        self.edges.push(Edge {
            from,
            to,
            coords,
            length,
            removed: false,
        });
        self.nodes[from].edges.push(id);
        self.nodes[to].edges.push(id);
        id
    }

    pub fn remove_edge(&mut self, id: EdgeId) {
        let edge = &mut self.edges[id];
        if edge.removed {
            return;
        }
        edge.removed = true;
        let (from, to) = (edge.from, edge.to);
        self.nodes[from].edges.retain(|&e| e != id);
        self.nodes[to].edges.retain(|&e| e != id);
    }

    /// Recompute an edge's length after its coordinates changed
    pub fn refresh_length(&mut self, id: EdgeId) {
        let edge = &mut self.edges[id];
        edge.length = points_length(&edge.coords);
    }

    /// Concatenate two edges sharing `node` into a new edge
    ///
    /// Both inputs are removed. Fails when either edge does not end at `node`.
    pub fn join(&mut self, node: NodeId, first: EdgeId, second: EdgeId) -> Result<EdgeId> {
        let a = &self.edges[first];
        let b = &self.edges[second];
        let disconnected = GeometryError::DisconnectedEdges { node, first, second };
        if a.removed || b.removed || first == second {
            return Err(disconnected);
        }

        let (from, to, coords) = if a.to == node && b.from == node {
            (a.from, b.to, concat(a.coords.iter(), b.coords.iter()))
        } else if a.to == node && b.to == node {
            (a.from, b.from, concat(a.coords.iter(), b.coords.iter().rev()))
        } else if a.from == node && b.from == node {
            (a.to, b.to, concat(a.coords.iter().rev(), b.coords.iter()))
        } else if a.from == node && b.to == node {
            (b.from, a.to, concat(b.coords.iter(), a.coords.iter()))
        } else {
            return Err(disconnected);
        };

        self.remove_edge(first);
        self.remove_edge(second);
        Ok(self.add_edge(from, to, coords))
    }
}

/// `head` followed by `tail` without its first (shared) point
fn concat<'a>(
    head: impl Iterator<Item = &'a Point>,
    tail: impl Iterator<Item = &'a Point>,
) -> Vec<Point> {
    head.chain(tail.skip(1)).copied().collect()
}
