//! Closeness centrality with the Wasserman–Faust correction.
//!
//! # Overview
//!
//! Closeness is the inverse of a node's mean distance to the nodes it can
//! reach. On disconnected graphs the plain inverse overrates nodes in small
//! components, so the score is scaled by the share of the graph reached:
//!
//! ```text
//! C(u) = (r - 1) / Σ d(u, v)  ·  (r - 1) / (n - 1)
//! ```
//!
//! where `r` counts the nodes reachable from `u` (including `u`) and `n` is
//! the node count. Isolated nodes score `0`.
//!
//! The weighted variant measures distance as the sum of `1/strength` along
//! the path.

use std::collections::{BinaryHeap, VecDeque};

use tracing::instrument;

use crate::graph::SimpleGraph;
use crate::metrics::{Adjacency, HeapEntry, scores_by_node, strength_to_distance};
use crate::rank::ScoreMap;

/// Closeness on unit-length edges.
#[must_use]
#[instrument(skip(g), fields(nodes = g.node_count()))]
pub fn closeness_centrality(g: &SimpleGraph) -> ScoreMap<String, f64> {
    let adj = Adjacency::from_graph(g);
    let values = (0..adj.len())
        .map(|s| closeness_from(&bfs_distances(&adj, s), adj.len()))
        .collect();
    scores_by_node(g, values)
}

/// Closeness with edge length `1/strength`.
#[must_use]
#[instrument(skip(g), fields(nodes = g.node_count()))]
pub fn weighted_closeness_centrality(g: &SimpleGraph) -> ScoreMap<String, f64> {
    let adj = Adjacency::from_graph(g);
    let values = (0..adj.len())
        .map(|s| closeness_from(&dijkstra_distances(&adj, s), adj.len()))
        .collect();
    scores_by_node(g, values)
}

#[allow(clippy::cast_precision_loss)]
fn closeness_from(distances: &[f64], n: usize) -> f64 {
    let total: f64 = distances.iter().sum();
    let reached = distances.len();
    if total > 0.0 && n > 1 {
        let others = (reached - 1) as f64;
        (others / total) * (others / (n - 1) as f64)
    } else {
        0.0
    }
}

/// Distances to every node reachable from `s` (including `s` at 0).
#[allow(clippy::cast_precision_loss)]
pub(crate) fn bfs_distances(adj: &Adjacency, s: usize) -> Vec<f64> {
    let mut dist: Vec<Option<usize>> = vec![None; adj.len()];
    dist[s] = Some(0);
    let mut out = Vec::new();
    let mut queue = VecDeque::from([s]);
    while let Some(v) = queue.pop_front() {
        let dv = dist[v].unwrap_or_default();
        out.push(dv as f64);
        for &(w, _) in &adj.neighbors[v] {
            if dist[w].is_none() {
                dist[w] = Some(dv + 1);
                queue.push_back(w);
            }
        }
    }
    out
}

/// Weighted distances to every node reachable from `s`.
pub(crate) fn dijkstra_distances(adj: &Adjacency, s: usize) -> Vec<f64> {
    let mut settled = vec![false; adj.len()];
    let mut best: Vec<f64> = vec![f64::INFINITY; adj.len()];
    best[s] = 0.0;
    let mut out = Vec::new();
    let mut heap = BinaryHeap::from([HeapEntry {
        dist: 0.0,
        node: s,
        pred: s,
    }]);

    while let Some(HeapEntry { dist, node: v, .. }) = heap.pop() {
        if settled[v] {
            continue;
        }
        settled[v] = true;
        out.push(dist);
        for &(w, strength) in &adj.neighbors[v] {
            let Some(len) = strength_to_distance(strength) else {
                continue;
            };
            let candidate = dist + len;
            if !settled[w] && candidate < best[w] {
                best[w] = candidate;
                heap.push(HeapEntry {
                    dist: candidate,
                    node: w,
                    pred: v,
                });
            }
        }
    }
    out
}
