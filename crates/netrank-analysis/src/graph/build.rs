//! petgraph views of [`NetworkData`].
//!
//! # Overview
//!
//! Analyses never walk [`NetworkData`] directly. They run on one of two
//! views built here:
//!
//! - [`SimpleGraph`]: undirected, at most one edge per node pair. The edge
//!   weight is the summed strength of every network edge between the pair,
//!   in either direction. Unweighted metrics ignore the weight.
//! - [`MultiGraph`]: directed, parallel edges kept, each edge carrying its
//!   resolved weight. Source for the weighted aggregate in
//!   [`crate::graph::weighted`]. Costs become strengths here, one edge at a
//!   time ([`MultiGraph::inverted`]), so parallel cheap routes add up to a
//!   stronger tie.
//!
//! ## Node Order
//!
//! Both views add nodes in network node order, so `NodeIndex::index()` is
//! the node's position in [`NetworkData::nodes`]. Score maps built from a
//! view inherit that order, which is the ranking tie-break.
//!
//! ## Self-loops
//!
//! Centrality requires a loop-free simple graph. [`SimpleGraph::build`]
//! drops self-loops when asked; they otherwise count twice toward degree.

#![allow(clippy::module_name_repetitions)]

use std::collections::HashMap;

use netrank_core::{NetrankError, NetworkData, Result};
use petgraph::graph::{DiGraph, NodeIndex, UnGraph};
use tracing::instrument;

use crate::graph::weighted::WeightedGraph;

// ---------------------------------------------------------------------------
// SimpleGraph
// ---------------------------------------------------------------------------

/// Undirected simple graph with summed edge strengths.
#[derive(Debug, Clone)]
pub struct SimpleGraph {
    pub graph: UnGraph<String, f64>,
    pub node_map: HashMap<String, NodeIndex>,
    /// Self-loops dropped during construction.
    pub removed_self_loops: usize,
}

impl SimpleGraph {
    /// Build the undirected view of `network` with unit edge weights.
    ///
    /// Equivalent to [`SimpleGraph::build`] with no weight column.
    #[must_use]
    pub fn from_network(network: &NetworkData, remove_self_loops: bool) -> Self {
        Self::build(network, None, remove_self_loops)
    }

    /// Build the undirected view of `network`, resolving edge weights from
    /// `weight_column` (see [`netrank_core::EdgeRecord::weight`]).
    #[must_use]
    #[instrument(skip(network), fields(nodes = network.node_count(), edges = network.edge_count()))]
    pub fn build(
        network: &NetworkData,
        weight_column: Option<&str>,
        remove_self_loops: bool,
    ) -> Self {
        Self::from_weighted(
            &WeightedGraph::from_network(network, weight_column),
            remove_self_loops,
        )
    }

    /// Fold a directed weighted aggregate into an undirected simple graph:
    /// `w(u, v) = w(u → v) + w(v → u)`.
    #[must_use]
    pub fn from_weighted(weighted: &WeightedGraph, remove_self_loops: bool) -> Self {
        let source = &weighted.graph;
        let mut graph = UnGraph::<String, f64>::with_capacity(source.node_count(), source.edge_count());
        let mut node_map = HashMap::with_capacity(source.node_count());

        for idx in source.node_indices() {
            let id = source[idx].clone();
            let new_idx = graph.add_node(id.clone());
            node_map.insert(id, new_idx);
        }

        let mut removed_self_loops = 0;
        for edge in source.raw_edges() {
            let (a, b) = (edge.source(), edge.target());
            if a == b && remove_self_loops {
                removed_self_loops += 1;
                continue;
            }
            // Indices line up because nodes were added in the same order.
            let (a, b) = (NodeIndex::new(a.index()), NodeIndex::new(b.index()));
            match graph.find_edge(a, b) {
                Some(e) => graph[e] += edge.weight,
                None => {
                    graph.add_edge(a, b, edge.weight);
                }
            }
        }

        Self {
            graph,
            node_map,
            removed_self_loops,
        }
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    #[must_use]
    pub fn node_index(&self, id: &str) -> Option<NodeIndex> {
        self.node_map.get(id).copied()
    }

    /// Node identifier for an index.
    #[must_use]
    pub fn node_id(&self, idx: NodeIndex) -> Option<&str> {
        self.graph.node_weight(idx).map(String::as_str)
    }
}

// ---------------------------------------------------------------------------
// MultiGraph
// ---------------------------------------------------------------------------

/// Directed multigraph with one petgraph edge per network edge.
#[derive(Debug, Clone)]
pub struct MultiGraph {
    pub graph: DiGraph<String, f64>,
    pub node_map: HashMap<String, NodeIndex>,
    /// Whether the source network was declared directed.
    pub directed: bool,
}

impl MultiGraph {
    /// Build the multigraph view. Every network edge becomes one petgraph
    /// edge weighted by [`netrank_core::EdgeRecord::weight`].
    #[must_use]
    pub fn from_network(network: &NetworkData, weight_column: Option<&str>) -> Self {
        let mut graph = DiGraph::<String, f64>::with_capacity(network.node_count(), network.edge_count());
        let mut node_map = HashMap::with_capacity(network.node_count());

        for id in network.node_ids() {
            let idx = graph.add_node(id.to_string());
            node_map.insert(id.to_string(), idx);
        }

        for edge in network.edges() {
            // NetworkData guarantees both endpoints are nodes.
            if let (Some(&a), Some(&b)) = (node_map.get(&edge.source), node_map.get(&edge.target)) {
                graph.add_edge(a, b, edge.weight(weight_column));
            }
        }

        Self {
            graph,
            node_map,
            directed: network.is_directed(),
        }
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Reinterpret every edge cost as a strength (`c → 1/c`).
    ///
    /// # Errors
    ///
    /// Returns [`NetrankError::InvalidWeight`] for a zero, negative or
    /// non-finite cost.
    pub fn inverted(&self) -> Result<Self> {
        let mut graph = self.graph.clone();
        for e in graph.edge_indices() {
            let c = graph[e];
            if !(c.is_finite() && c > 0.0) {
                let (a, b) = graph.edge_endpoints(e).unwrap_or_default();
                return Err(NetrankError::InvalidWeight {
                    from: graph[a].clone(),
                    to: graph[b].clone(),
                    weight: c,
                    reason: "costs must be positive and finite to be inverted",
                });
            }
            graph[e] = 1.0 / c;
        }
        Ok(Self {
            graph,
            node_map: self.node_map.clone(),
            directed: self.directed,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
