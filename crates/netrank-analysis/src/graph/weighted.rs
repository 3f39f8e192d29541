//! Weighted edge aggregate and weighted degree.
//!
//! # Overview
//!
//! A [`WeightedGraph`] collapses a [`MultiGraph`] into a directed simple
//! graph: all parallel edges from `u` to `v` become one edge whose weight is
//! the sum of their weights. `u → v` and `v → u` stay separate edges.
//!
//! # Weighted Degree
//!
//! [`WeightedGraph::weighted_degree`] sums the collapsed weights of every
//! incoming and outgoing edge of a node (the undirected-sum convention), so
//! for edges `A → B (2)` and `A → B (3)` both `A` and `B` score `5`. A
//! self-loop is both incoming and outgoing and counts twice. Nodes without
//! edges score `0`.
//!
//! # Strength and Cost
//!
//! Aggregated weights are strengths. Costs are inverted per edge on the
//! [`MultiGraph`] ([`MultiGraph::inverted`]) before collapsing, since only
//! strengths add up. Weighted degree always sums the raw weights.

use std::collections::HashMap;

use netrank_core::NetworkData;
use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use tracing::{debug, instrument};

use crate::graph::build::MultiGraph;
use crate::rank::ScoreMap;

/// Directed simple graph with summed parallel-edge weights.
#[derive(Debug, Clone)]
pub struct WeightedGraph {
    pub graph: DiGraph<String, f64>,
    pub node_map: HashMap<String, NodeIndex>,
}

impl WeightedGraph {
    /// Collapse parallel `(source, target)` edges by summing their weights.
    #[must_use]
    #[instrument(skip(multi), fields(edges = multi.edge_count()))]
    pub fn from_multigraph(multi: &MultiGraph) -> Self {
        let source = &multi.graph;
        let mut graph = DiGraph::<String, f64>::with_capacity(source.node_count(), source.edge_count());
        for idx in source.node_indices() {
            graph.add_node(source[idx].clone());
        }

        let mut collapsed: HashMap<(NodeIndex, NodeIndex), petgraph::graph::EdgeIndex> =
            HashMap::with_capacity(source.edge_count());
        for edge in source.raw_edges() {
            let key = (edge.source(), edge.target());
            match collapsed.get(&key) {
                Some(&e) => graph[e] += edge.weight,
                None => {
                    let e = graph.add_edge(key.0, key.1, edge.weight);
                    collapsed.insert(key, e);
                }
            }
        }

        debug!(
            parallel = source.edge_count() - graph.edge_count(),
            "collapsed parallel edges"
        );

        Self {
            graph,
            node_map: multi.node_map.clone(),
        }
    }

    /// Build the aggregate straight from network data.
    #[must_use]
    pub fn from_network(network: &NetworkData, weight_column: Option<&str>) -> Self {
        Self::from_multigraph(&MultiGraph::from_network(network, weight_column))
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Collapsed weight of `source → target`, if that edge exists.
    #[must_use]
    pub fn weight(&self, source: &str, target: &str) -> Option<f64> {
        let a = *self.node_map.get(source)?;
        let b = *self.node_map.get(target)?;
        self.graph.find_edge(a, b).map(|e| self.graph[e])
    }

    /// Sum of incoming and outgoing collapsed weights per node, in node
    /// order.
    #[must_use]
    pub fn weighted_degree(&self) -> ScoreMap<String, f64> {
        let g = &self.graph;
        g.node_indices()
            .map(|idx| {
                let out: f64 = g.edges_directed(idx, Direction::Outgoing).map(|e| *e.weight()).sum();
                let inc: f64 = g.edges_directed(idx, Direction::Incoming).map(|e| *e.weight()).sum();
                (g[idx].clone(), out + inc)
            })
            .collect()
    }
}

/// Weighted degree of every node of `network`.
///
/// Edge weights come from `weight_column`, else `weight`, else `1`; parallel
/// edges are summed first. A weight column missing from some or all edges
/// is not an error.
#[must_use]
pub fn aggregate_weighted_degree(
    network: &NetworkData,
    weight_column: Option<&str>,
) -> ScoreMap<String, f64> {
    WeightedGraph::from_network(network, weight_column).weighted_degree()
}
