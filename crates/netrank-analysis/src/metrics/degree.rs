//! Degree centrality: raw tie counts.
//!
//! Counts edges of the [`SimpleGraph`] incident to each node. Parallel
//! network edges have already been collapsed, so a node tied twice to the
//! same neighbour counts that neighbour once. A self-loop, if the graph was
//! built with them, adds 2.

use tracing::instrument;

use crate::graph::SimpleGraph;
use crate::rank::ScoreMap;

/// Degree of every node, in node order.
#[must_use]
#[instrument(skip(g), fields(nodes = g.node_count()))]
pub fn degree_centrality(g: &SimpleGraph) -> ScoreMap<String, usize> {
    let mut counts = vec![0usize; g.node_count()];
    for edge in g.graph.raw_edges() {
        counts[edge.source().index()] += 1;
        counts[edge.target().index()] += 1;
    }
    g.graph
        .node_indices()
        .map(|idx| (g.graph[idx].clone(), counts[idx.index()]))
        .collect()
}
