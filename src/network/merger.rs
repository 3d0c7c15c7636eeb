//! Line network cleanup
//!
//! Input lines are split into segments, snapped onto a grid and rebuilt as a
//! graph. Degree-2 nodes are dissolved so every output line runs between
//! junctions or dead ends, then the network is cleaned:
//!
//! 1. small loops collapse to their shortest side
//! 2. short dead-end stubs are pruned
//! 3. remaining short edges are dropped
//! 4. optionally, edges are paired into strokes through junctions
//! 5. optionally, edges are simplified and near-duplicates removed
//!
//! Nodes are re-merged after every phase. The first merge rebuilds the input
//! lines and then joins across their endpoints, but leaves the two sides of a
//! cycle as separate edges so loop removal can pick the shorter one.

use std::collections::{HashMap, HashSet};
use std::time::Instant;

use log::{debug, info};
use rstar::{RTree, RTreeObject, AABB};

use crate::error::{GeometryError, Result};
use crate::geometry::{segment_distance_sq, CoordinateBuffer, Geometry, Point, Topology};
use crate::simplify::{douglas_peucker, IndexedMinHeap};

use super::graph::{EdgeId, Graph, NodeId};

/// Upper bound on alternative paths collected per (node, edge) pair
const MAX_LOOP_PATHS: usize = 64;

/// Strokes only continue through junctions straighter than this (cosine of
/// the angle between the two outgoing directions)
const STROKE_MAX_COS: f64 = -0.5;

/// Builder and driver for network cleanup
#[derive(Debug, Clone)]
pub struct NetworkLoopMerger {
    precision: f64,
    min_length: f64,
    loop_min_length: f64,
    stub_min_length: f64,
    tolerance: f64,
    merge_strokes: bool,
    lines: Vec<CoordinateBuffer>,
}

impl Default for NetworkLoopMerger {
    fn default() -> Self {
        Self {
            precision: 16.0,
            min_length: 0.0,
            loop_min_length: 0.0,
            stub_min_length: 0.0,
            tolerance: 0.0,
            merge_strokes: false,
            lines: Vec::new(),
        }
    }
}

impl NetworkLoopMerger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Grid cells per unit used to snap endpoints together
    pub fn with_precision(mut self, precision: f64) -> Self {
        self.precision = precision;
        self
    }

    /// Drop any edge shorter than this after loops and stubs are handled
    pub fn with_min_length(mut self, length: f64) -> Self {
        self.min_length = length;
        self
    }

    /// Collapse loops whose alternative paths are all shorter than this
    pub fn with_loop_min_length(mut self, length: f64) -> Self {
        self.loop_min_length = length;
        self
    }

    /// Prune dead-end edges shorter than this
    pub fn with_stub_min_length(mut self, length: f64) -> Self {
        self.stub_min_length = length;
        self
    }

    /// Simplify merged edges and remove edges duplicated within this distance
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_merge_strokes(mut self, merge_strokes: bool) -> Self {
        self.merge_strokes = merge_strokes;
        self
    }

    /// Collect every line of `geom`; polygon rings are treated as closed lines
    pub fn add(&mut self, geom: &Geometry) {
        geom.for_each_sequence(|coords, _| self.lines.push(coords.clone()));
    }

    pub fn add_line(&mut self, line: CoordinateBuffer) {
        self.lines.push(line);
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Build the network from every added line, clean it and return its edges
    pub fn merge(&self) -> Result<Vec<CoordinateBuffer>> {
        if !(self.precision > 0.0 && self.precision.is_finite()) {
            return Err(GeometryError::InvalidParameter {
                name: "precision",
                value: self.precision.to_string(),
                reason: "must be a positive finite number".to_string(),
            });
        }

        let start = Instant::now();
        let mut graph = self.build();
        debug!(
            "[merge] built {} nodes, {} segments from {} lines",
            graph.node_count(),
            graph.live_edge_count(),
            self.lines.len()
        );

        let merged = merge_all(&mut graph, MergeMode::Interior)? + merge_all(&mut graph, MergeMode::OpenCycles)?;
        debug!("[merge] dissolved {} degree-2 nodes", merged);

        if self.loop_min_length > 0.0 {
            let removed = remove_loops(&mut graph, self.loop_min_length);
            debug!("[merge] removed {} loop edges", removed);
        }
        merge_all(&mut graph, MergeMode::All)?;

        if self.stub_min_length > 0.0 {
            let removed = prune_stubs(&mut graph, self.stub_min_length)?;
            debug!("[merge] pruned {} stubs", removed);
            merge_all(&mut graph, MergeMode::All)?;
        }

        if self.min_length > 0.0 {
            let short: Vec<EdgeId> = graph
                .live_edges()
                .into_iter()
                .filter(|&e| graph.edge(e).length < self.min_length)
                .collect();
            for &e in &short {
                graph.remove_edge(e);
            }
            debug!("[merge] removed {} short edges", short.len());
            merge_all(&mut graph, MergeMode::All)?;
        }

        if self.merge_strokes {
            let joined = merge_strokes(&mut graph)?;
            debug!("[merge] joined {} strokes", joined);
        }

        if self.tolerance > 0.0 {
            simplify_edges(&mut graph, self.tolerance);
            let removed = remove_duplicates(&mut graph, self.tolerance);
            debug!("[merge] removed {} duplicate edges", removed);
            merge_all(&mut graph, MergeMode::All)?;
        }

        let output: Vec<CoordinateBuffer> = graph
            .live_edges()
            .into_iter()
            .map(|e| CoordinateBuffer::from_points(&graph.edge(e).coords))
            .collect();

        info!(
            "[merge] {} lines -> {} lines in {:?}",
            self.lines.len(),
            output.len(),
            start.elapsed()
        );
        Ok(output)
    }

    fn build(&self) -> Graph {
        let mut graph = Graph::new(self.precision);
        for line in &self.lines {
            if let (Some(first), Some(last)) = (line.first(), line.last()) {
                graph.mark_terminal(first);
                graph.mark_terminal(last);
            }
            for i in 1..line.len() {
                graph.add_segment(line.point(i - 1), line.point(i));
            }
        }
        graph
    }
}

/// Which degree-2 nodes [`merge_at`] may dissolve
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MergeMode {
    /// Only nodes inside an input line, which rebuilds the input lines
    Interior,
    /// Any node, except where both edges lead to the same far node
    OpenCycles,
    /// Any node; two edges to the same far node close into a self-loop
    All,
}

/// Dissolve `node` if exactly two distinct non-loop edges meet there and
/// `mode` allows it, returning the joined edge
fn merge_at(graph: &mut Graph, node: NodeId, mode: MergeMode) -> Result<Option<EdgeId>> {
    let n = graph.node(node);
    if n.edges.len() != 2 || n.edges[0] == n.edges[1] {
        return Ok(None);
    }
    if mode == MergeMode::Interior && n.terminal {
        return Ok(None);
    }
    let (first, second) = (n.edges[0], n.edges[1]);
    let (a, b) = (graph.edge(first), graph.edge(second));
    if a.is_loop() || b.is_loop() {
        return Ok(None);
    }
    // keep both sides of a cycle apart until loop removal has compared them
    if mode == MergeMode::OpenCycles && a.other_end(node) == b.other_end(node) {
        return Ok(None);
    }
    graph.join(node, first, second).map(Some)
}

fn merge_all(graph: &mut Graph, mode: MergeMode) -> Result<usize> {
    let mut merged = 0;
    for node in graph.active_nodes() {
        if merge_at(graph, node, mode)?.is_some() {
            merged += 1;
        }
    }
    Ok(merged)
}

/// Path through the graph with its total length
struct Path {
    length: f64,
    edges: Vec<EdgeId>,
}

/// Collapse every loop shorter than `max_length` to its shortest side
fn remove_loops(graph: &mut Graph, max_length: f64) -> usize {
    let mut removed = 0;
    for node in graph.active_nodes() {
        let mut incident = graph.node(node).edges.clone();
        incident.dedup();
        for e in incident {
            let edge = graph.edge(e);
            if edge.removed {
                continue;
            }
            if edge.is_loop() {
                if edge.length < max_length {
                    graph.remove_edge(e);
                    removed += 1;
                }
                continue;
            }

            let target = edge.other_end(node);
            let mut paths = find_paths(graph, node, target, max_length);
            if paths.len() < 2 {
                continue;
            }
            paths.sort_by(|a, b| a.length.total_cmp(&b.length));

            let keep: HashSet<EdgeId> = paths[0].edges.iter().copied().collect();
            for path in &paths[1..] {
                for &other in &path.edges {
                    if !keep.contains(&other) && !graph.edge(other).removed {
                        graph.remove_edge(other);
                        removed += 1;
                    }
                }
            }
        }
    }
    removed
}

/// Every path from `start` to `target` no longer than `max_length`
///
/// Each edge is used at most once per path and each other node visited at
/// most twice; the start is never re-entered and self-loops are never walked.
fn find_paths(graph: &Graph, start: NodeId, target: NodeId, max_length: f64) -> Vec<Path> {
    let mut paths = Vec::new();
    let mut edges = Vec::new();
    let mut visits: HashMap<NodeId, u8> = HashMap::new();
    visits.insert(start, 2);
    walk(graph, start, target, max_length, 0.0, &mut edges, &mut visits, &mut paths);
    paths
}

#[allow(clippy::too_many_arguments)]
fn walk(
    graph: &Graph,
    at: NodeId,
    target: NodeId,
    max_length: f64,
    length: f64,
    edges: &mut Vec<EdgeId>,
    visits: &mut HashMap<NodeId, u8>,
    paths: &mut Vec<Path>,
) {
    if paths.len() >= MAX_LOOP_PATHS {
        return;
    }
    if at == target && !edges.is_empty() {
        paths.push(Path {
            length,
            edges: edges.clone(),
        });
        return;
    }
    for &e in &graph.node(at).edges {
        let edge = graph.edge(e);
        if edge.is_loop() || edges.contains(&e) {
            continue;
        }
        let total = length + edge.length;
        if total > max_length {
            continue;
        }
        let next = edge.other_end(at);
        let count = visits.get(&next).copied().unwrap_or(0);
        if count >= 2 {
            continue;
        }

        edges.push(e);
        visits.insert(next, count + 1);
        walk(graph, next, target, max_length, total, edges, visits, paths);
        visits.insert(next, count);
        edges.pop();
    }
}

/// Whether `e` is a live edge below `max_length` ending at a degree-1 node
fn is_stub(graph: &Graph, e: EdgeId, max_length: f64) -> bool {
    let edge = graph.edge(e);
    if edge.removed || edge.is_loop() || edge.length >= max_length {
        return false;
    }
    graph.node(edge.from).degree() == 1 || graph.node(edge.to).degree() == 1
}

/// Repeatedly remove the shortest dead-end edge below `max_length`
///
/// Candidates sit in a heap keyed by length. A popped edge that is no longer
/// a stub is dropped; after each removal only the edges touching its two
/// ends can change status, so those are queued again.
fn prune_stubs(graph: &mut Graph, max_length: f64) -> Result<usize> {
    let mut heap = IndexedMinHeap::with_capacity(graph.edge_count());
    for e in graph.live_edges() {
        if is_stub(graph, e, max_length) {
            heap.push(e, graph.edge(e).length);
        }
    }

    let mut removed = 0;
    while let Some(stub) = heap.poll() {
        if !is_stub(graph, stub, max_length) {
            continue;
        }
        let (from, to) = (graph.edge(stub).from, graph.edge(stub).to);
        graph.remove_edge(stub);
        removed += 1;

        for node in [from, to] {
            let touched = match merge_at(graph, node, MergeMode::All)? {
                Some(joined) => vec![joined],
                None => graph.node(node).edges.clone(),
            };
            for e in touched {
                if is_stub(graph, e, max_length) {
                    heap.push(e, graph.edge(e).length);
                }
            }
        }
    }
    Ok(removed)
}

/// Join edge pairs that continue straight through junctions
fn merge_strokes(graph: &mut Graph) -> Result<usize> {
    let mut joined = 0;
    for node in graph.active_nodes() {
        if graph.node(node).degree() < 3 {
            continue;
        }
        let mut incident: Vec<EdgeId> = graph
            .node(node)
            .edges
            .iter()
            .copied()
            .filter(|&e| !graph.edge(e).is_loop())
            .collect();
        incident.dedup();

        // (cosine, first, second), straightest first
        let mut pairs = Vec::new();
        for (i, &a) in incident.iter().enumerate() {
            for &b in &incident[i + 1..] {
                let cos = direction_cos(
                    graph.edge(a).direction_from(node),
                    graph.edge(b).direction_from(node),
                );
                if cos <= STROKE_MAX_COS {
                    pairs.push((cos, a, b));
                }
            }
        }
        pairs.sort_by(|x, y| x.0.total_cmp(&y.0));

        let mut used = HashSet::new();
        for (_, a, b) in pairs {
            if used.contains(&a) || used.contains(&b) {
                continue;
            }
            used.insert(a);
            used.insert(b);
            graph.join(node, a, b)?;
            joined += 1;
        }
    }
    Ok(joined)
}

fn direction_cos(a: (f64, f64), b: (f64, f64)) -> f64 {
    let denom = ((a.0 * a.0 + a.1 * a.1) * (b.0 * b.0 + b.1 * b.1)).sqrt();
    if denom == 0.0 {
        return 1.0;
    }
    ((a.0 * b.0 + a.1 * b.1) / denom).clamp(-1.0, 1.0)
}

/// Douglas-Peucker every live edge in place
fn simplify_edges(graph: &mut Graph, tolerance: f64) {
    for e in graph.live_edges() {
        let edge = graph.edge(e);
        let topology = if edge.is_loop() { Topology::Ring } else { Topology::Open };
        let simplified = douglas_peucker(&CoordinateBuffer::from_points(&edge.coords), tolerance, topology);
        graph.edge_mut(e).coords = simplified.to_points();
        graph.refresh_length(e);
    }
}

/// Bounding box of an edge, indexed in an R-tree
struct EdgeBounds {
    id: EdgeId,
    bounds: AABB<[f64; 2]>,
}

impl EdgeBounds {
    fn new(id: EdgeId, coords: &[Point]) -> Self {
        let mut min = [f64::INFINITY; 2];
        let mut max = [f64::NEG_INFINITY; 2];
        for p in coords {
            min = [min[0].min(p.x), min[1].min(p.y)];
            max = [max[0].max(p.x), max[1].max(p.y)];
        }
        Self {
            id,
            bounds: AABB::from_corners(min, max),
        }
    }

    fn expanded(&self, by: f64) -> AABB<[f64; 2]> {
        let (lower, upper) = (self.bounds.lower(), self.bounds.upper());
        AABB::from_corners([lower[0] - by, lower[1] - by], [upper[0] + by, upper[1] + by])
    }
}

impl RTreeObject for EdgeBounds {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        self.bounds
    }
}

/// Remove edges that join the same node pair as an earlier edge and stay
/// within `tolerance` of it
fn remove_duplicates(graph: &mut Graph, tolerance: f64) -> usize {
    let live = graph.live_edges();
    let tree = RTree::bulk_load(
        live.iter()
            .map(|&e| EdgeBounds::new(e, &graph.edge(e).coords))
            .collect(),
    );

    let mut removed = 0;
    for &e in &live {
        if graph.edge(e).removed {
            continue;
        }
        let search = EdgeBounds::new(e, &graph.edge(e).coords).expanded(tolerance);

        let duplicates: Vec<EdgeId> = tree
            .locate_in_envelope_intersecting(&search)
            .map(|candidate| candidate.id)
            .filter(|&c| c > e && !graph.edge(c).removed)
            .filter(|&c| same_ends(graph, e, c) && within(&graph.edge(c).coords, &graph.edge(e).coords, tolerance))
            .collect();
        for c in duplicates {
            graph.remove_edge(c);
            removed += 1;
        }
    }
    removed
}

fn same_ends(graph: &Graph, a: EdgeId, b: EdgeId) -> bool {
    let (a, b) = (graph.edge(a), graph.edge(b));
    (a.from == b.from && a.to == b.to) || (a.from == b.to && a.to == b.from)
}

/// Whether every vertex of `candidate` lies within `tolerance` of `line`
fn within(candidate: &[Point], line: &[Point], tolerance: f64) -> bool {
    let sq_tolerance = tolerance * tolerance;
    candidate.iter().all(|&p| {
        line.windows(2)
            .any(|w| segment_distance_sq(p, w[0], w[1]) <= sq_tolerance)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(points: &[(f64, f64)]) -> Geometry {
        Geometry::LineString(CoordinateBuffer::from(points.to_vec()))
    }

    #[test]
    fn test_collinear_segments_merge() {
        let mut merger = NetworkLoopMerger::new();
        merger.add(&line(&[(0.0, 0.0), (1.0, 0.0)]));
        merger.add(&line(&[(1.0, 0.0), (2.0, 0.0), (3.0, 0.0)]));
        let merged = merger.merge().unwrap();
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].len(), 4);
    }

    #[test]
    fn test_duplicate_traces_collapse() {
        let mut merger = NetworkLoopMerger::new();
        merger.add(&line(&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)]));
        merger.add(&line(&[(2.0, 0.0), (1.0, 0.0), (0.0, 0.0)]));
        let merged = merger.merge().unwrap();
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].len(), 3);
    }

    #[test]
    fn test_junction_splits_lines() {
        let mut merger = NetworkLoopMerger::new();
        merger.add(&line(&[(-5.0, 0.0), (0.0, 0.0), (5.0, 0.0)]));
        merger.add(&line(&[(0.0, 0.0), (0.0, 5.0)]));
        assert_eq!(merger.merge().unwrap().len(), 3);
    }

    #[test]
    fn test_rejects_bad_precision() {
        let merger = NetworkLoopMerger::new().with_precision(0.0);
        assert!(matches!(merger.merge(), Err(GeometryError::InvalidParameter { name: "precision", .. })));
    }

    #[test]
    fn test_small_self_loop_removed() {
        let mut merger = NetworkLoopMerger::new().with_loop_min_length(10.0);
        merger.add(&line(&[(-20.0, 0.0), (0.0, 0.0)]));
        merger.add(&line(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 0.0)]));
        let merged = merger.merge().unwrap();
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].len(), 2);
    }

    #[test]
    fn test_stroke_merge_through_cross() {
        let mut cross = NetworkLoopMerger::new();
        cross.add(&line(&[(-5.0, 0.0), (0.0, 0.0), (5.0, 0.0)]));
        cross.add(&line(&[(0.0, -5.0), (0.0, 0.0), (0.0, 5.0)]));
        assert_eq!(cross.clone().merge().unwrap().len(), 4);

        let strokes = cross.with_merge_strokes(true).merge().unwrap();
        assert_eq!(strokes.len(), 2);
        assert!(strokes.iter().all(|s| s.len() == 3));
    }

    #[test]
    fn test_tolerance_removes_near_duplicates() {
        let mut merger = NetworkLoopMerger::new().with_tolerance(0.5);
        merger.add(&line(&[(-10.0, 0.0), (0.0, 0.0)]));
        merger.add(&line(&[(0.0, 0.0), (10.0, 0.0)]));
        merger.add(&line(&[(0.0, 0.0), (5.0, 0.25), (10.0, 0.0)]));
        merger.add(&line(&[(10.0, 0.0), (20.0, 0.0)]));
        let merged = merger.merge().unwrap();
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].first(), Some(Point::new(-10.0, 0.0)));
        assert_eq!(merged[0].last(), Some(Point::new(20.0, 0.0)));
    }
}
