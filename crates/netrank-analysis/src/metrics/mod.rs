//! Centrality metrics over the undirected simple graph.
//!
//! # Overview
//!
//! Each metric answers a different question about node importance:
//!
//! - **Degree** (`degree`): how many direct ties does a node have?
//! - **Betweenness** (`betweenness`): how often does a node sit on shortest
//!   paths between others (a broker or bridge)?
//! - **Eigenvector** (`eigenvector`): is a node tied to other well-tied
//!   nodes?
//! - **Closeness** (`closeness`): how short are a node's paths to everyone
//!   it can reach?
//!
//! # Weighted Variants
//!
//! Weighted metrics read the [`SimpleGraph`] edge weight as a tie strength.
//! Path-based metrics (betweenness, closeness) walk distances `1/strength`;
//! eigenvector multiplies by strength directly. Edges with a non-positive or
//! non-finite strength do not carry paths.
//!
//! # Usage
//!
//! All metrics return a [`ScoreMap`] in graph node order, which is the
//! network node order, ready for [`crate::rank::rank`].
//!
//! ```rust,ignore
//! use netrank_analysis::graph::SimpleGraph;
//! use netrank_analysis::metrics::{betweenness, closeness, eigenvector};
//!
//! let g = SimpleGraph::from_network(&network, true);
//! let bc = betweenness::betweenness_centrality(&g);
//! let cc = closeness::closeness_centrality(&g);
//! let ev = eigenvector::eigenvector_centrality(&g, 1000, false);
//! ```

use std::cmp::Ordering;

use crate::graph::SimpleGraph;
use crate::rank::ScoreMap;

pub mod betweenness;
pub mod closeness;
pub mod degree;
pub mod eigenvector;

/// Neighbour lists by node position. A self-loop appears once.
pub(crate) struct Adjacency {
    pub neighbors: Vec<Vec<(usize, f64)>>,
}

impl Adjacency {
    pub fn from_graph(g: &SimpleGraph) -> Self {
        let mut neighbors = vec![Vec::new(); g.node_count()];
        for edge in g.graph.raw_edges() {
            let (a, b) = (edge.source().index(), edge.target().index());
            neighbors[a].push((b, edge.weight));
            if a != b {
                neighbors[b].push((a, edge.weight));
            }
        }
        Self { neighbors }
    }

    pub fn len(&self) -> usize {
        self.neighbors.len()
    }
}

/// Zip node-ordered values with the graph's node ids.
pub(crate) fn scores_by_node(g: &SimpleGraph, values: Vec<f64>) -> ScoreMap<String, f64> {
    g.graph
        .node_indices()
        .zip(values)
        .map(|(idx, v)| (g.graph[idx].clone(), v))
        .collect()
}

/// Path length of one edge for weighted path metrics.
pub(crate) fn strength_to_distance(strength: f64) -> Option<f64> {
    (strength.is_finite() && strength > 0.0).then(|| 1.0 / strength)
}

/// Min-heap entry for Dijkstra over `f64` distances.
#[derive(Debug, Clone, Copy)]
pub(crate) struct HeapEntry {
    pub dist: f64,
    pub node: usize,
    pub pred: usize,
}

impl PartialEq for HeapEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for HeapEntry {}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeapEntry {
    // Reversed for BinaryHeap; node breaks ties so pops are deterministic.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .dist
            .total_cmp(&self.dist)
            .then_with(|| other.node.cmp(&self.node))
            .then_with(|| other.pred.cmp(&self.pred))
    }
}

/// Two path lengths count as equal within a relative `1e-12`.
pub(crate) fn same_distance(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-12 * a.abs().max(b.abs()).max(1.0)
}
