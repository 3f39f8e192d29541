//! Betweenness centrality via Brandes' algorithm.
//!
//! # Overview
//!
//! Betweenness centrality measures how often a node lies on shortest paths
//! between other pairs of nodes. High-betweenness nodes are brokers: removing
//! them lengthens or cuts paths between other parts of the network.
//!
//! # Algorithm
//!
//! Brandes (2001):
//!
//! 1. For each source node `s`, compute shortest-path counts and distances
//!    with BFS (unweighted) or Dijkstra (weighted, edge length
//!    `1/strength`).
//! 2. Accumulate dependency scores in reverse discovery order (farthest
//!    nodes first).
//! 3. Sum the dependency scores across all source nodes.
//!
//! Complexity: O(V·E) unweighted, O(V·E + V²·log V) weighted.
//!
//! # Normalization
//!
//! The graph is undirected, so step 3 visits every pair twice. Scores are
//! divided by `(n-1)(n-2)` when `n > 2`, which yields the fraction of all
//! `(n-1)(n-2)/2` pairs a node brokers. The middle of a three-node path
//! scores `1.0`.

use std::collections::{BinaryHeap, VecDeque};

use tracing::instrument;

use crate::graph::SimpleGraph;
use crate::metrics::{Adjacency, HeapEntry, same_distance, scores_by_node, strength_to_distance};
use crate::rank::ScoreMap;

/// Normalized betweenness centrality on unit-length edges.
#[must_use]
#[instrument(skip(g), fields(nodes = g.node_count(), edges = g.edge_count()))]
pub fn betweenness_centrality(g: &SimpleGraph) -> ScoreMap<String, f64> {
    brandes(g, false)
}

/// Normalized betweenness centrality with edge length `1/strength`.
#[must_use]
#[instrument(skip(g), fields(nodes = g.node_count(), edges = g.edge_count()))]
pub fn weighted_betweenness_centrality(g: &SimpleGraph) -> ScoreMap<String, f64> {
    brandes(g, true)
}

/// One single-source shortest-path pass.
struct Sssp {
    /// Nodes in non-decreasing distance order.
    stack: Vec<usize>,
    predecessors: Vec<Vec<usize>>,
    sigma: Vec<f64>,
}

fn brandes(g: &SimpleGraph, weighted: bool) -> ScoreMap<String, f64> {
    let adj = Adjacency::from_graph(g);
    let n = adj.len();
    let mut cb = vec![0.0; n];

    for s in 0..n {
        let sssp = if weighted {
            dijkstra_paths(&adj, s)
        } else {
            bfs_paths(&adj, s)
        };
        accumulate(&sssp, s, &mut cb);
    }

    if n > 2 {
        #[allow(clippy::cast_precision_loss)]
        let scale = 1.0 / ((n - 1) as f64 * (n - 2) as f64);
        for x in &mut cb {
            *x *= scale;
        }
    }

    scores_by_node(g, cb)
}

fn bfs_paths(adj: &Adjacency, s: usize) -> Sssp {
    let n = adj.len();
    let mut stack = Vec::with_capacity(n);
    let mut predecessors: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut sigma = vec![0.0; n];
    let mut dist: Vec<Option<usize>> = vec![None; n];
    sigma[s] = 1.0;
    dist[s] = Some(0);

    let mut queue = VecDeque::from([s]);
    while let Some(v) = queue.pop_front() {
        stack.push(v);
        let dv = dist[v].unwrap_or_default();
        for &(w, _) in &adj.neighbors[v] {
            if dist[w].is_none() {
                dist[w] = Some(dv + 1);
                queue.push_back(w);
            }
            if dist[w] == Some(dv + 1) {
                sigma[w] += sigma[v];
                predecessors[w].push(v);
            }
        }
    }

    Sssp {
        stack,
        predecessors,
        sigma,
    }
}

fn dijkstra_paths(adj: &Adjacency, s: usize) -> Sssp {
    let n = adj.len();
    let mut stack = Vec::with_capacity(n);
    let mut predecessors: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut sigma = vec![0.0; n];
    let mut settled = vec![false; n];
    let mut seen: Vec<Option<f64>> = vec![None; n];
    sigma[s] = 1.0;
    seen[s] = Some(0.0);

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
        stack.push(v);

        for &(w, strength) in &adj.neighbors[v] {
            let Some(len) = strength_to_distance(strength) else {
                continue;
            };
            if settled[w] {
                continue;
            }
            let vw = dist + len;
            match seen[w] {
                Some(best) if same_distance(vw, best) => {
                    sigma[w] += sigma[v];
                    predecessors[w].push(v);
                }
                Some(best) if best < vw => {}
                _ => {
                    seen[w] = Some(vw);
                    sigma[w] = sigma[v];
                    predecessors[w] = vec![v];
                    heap.push(HeapEntry {
                        dist: vw,
                        node: w,
                        pred: v,
                    });
                }
            }
        }
    }

    Sssp {
        stack,
        predecessors,
        sigma,
    }
}

fn accumulate(sssp: &Sssp, s: usize, cb: &mut [f64]) {
    let mut delta = vec![0.0; cb.len()];
    for &w in sssp.stack.iter().rev() {
        for &v in &sssp.predecessors[w] {
            if sssp.sigma[w] > 0.0 {
                delta[v] += (sssp.sigma[v] / sssp.sigma[w]) * (1.0 + delta[w]);
            }
        }
        if w != s {
            cb[w] += delta[w];
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
