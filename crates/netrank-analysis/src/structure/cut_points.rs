//! Articulation points (cut points).
//!
//! # Algorithm
//!
//! Hopcroft–Tarjan low-link DFS, run iteratively so deep chains cannot
//! overflow the call stack. A non-root node `p` is a cut point when some DFS
//! child `c` has `low(c) >= disc(p)`; a root is a cut point when it has more
//! than one DFS child.
//!
//! Self-loops never affect the result.

use tracing::instrument;

use crate::graph::SimpleGraph;
use crate::metrics::Adjacency;

const UNVISITED: usize = usize::MAX;

/// Nodes whose removal increases the number of connected components, in
/// node order.
#[must_use]
#[instrument(skip(g), fields(nodes = g.node_count()))]
pub fn cut_points(g: &SimpleGraph) -> Vec<String> {
    let adj = Adjacency::from_graph(g);
    let n = adj.len();
    let mut disc = vec![UNVISITED; n];
    let mut low = vec![0usize; n];
    let mut is_cut = vec![false; n];
    let mut timer = 0usize;

    for root in 0..n {
        if disc[root] != UNVISITED {
            continue;
        }
        disc[root] = timer;
        low[root] = timer;
        timer += 1;
        let mut root_children = 0usize;

        // (node, parent, next neighbour position)
        let mut stack: Vec<(usize, Option<usize>, usize)> = vec![(root, None, 0)];
        while let Some(top) = stack.last_mut() {
            let (v, parent, i) = *top;
            if let Some(&(w, _)) = adj.neighbors[v].get(i) {
                top.2 += 1;
                if w == v {
                    continue;
                }
                if disc[w] == UNVISITED {
                    disc[w] = timer;
                    low[w] = timer;
                    timer += 1;
                    if v == root {
                        root_children += 1;
                    }
                    stack.push((w, Some(v), 0));
                } else if Some(w) != parent {
                    low[v] = low[v].min(disc[w]);
                }
            } else {
                stack.pop();
                if let Some(p) = parent {
                    low[p] = low[p].min(low[v]);
                    if p != root && low[v] >= disc[p] {
                        is_cut[p] = true;
                    }
                }
            }
        }

        if root_children > 1 {
            is_cut[root] = true;
        }
    }

    g.graph
        .node_indices()
        .filter(|idx| is_cut[idx.index()])
        .map(|idx| g.graph[idx].clone())
        .collect()
}
