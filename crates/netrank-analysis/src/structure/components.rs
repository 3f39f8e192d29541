//! Connected components and largest-component extraction.

use std::collections::HashSet;

use netrank_core::NetworkData;
use petgraph::unionfind::UnionFind;
use tracing::{debug, instrument};

use crate::graph::SimpleGraph;

/// Connected components as lists of node ids.
///
/// Members are in node order. Components are sorted by size, largest
/// first; equal sizes keep the order of their first member.
#[must_use]
#[instrument(skip(g), fields(nodes = g.node_count()))]
pub fn connected_components(g: &SimpleGraph) -> Vec<Vec<String>> {
    let n = g.node_count();
    let mut uf = UnionFind::<usize>::new(n);
    for edge in g.graph.raw_edges() {
        uf.union(edge.source().index(), edge.target().index());
    }

    // Group by representative, in order of first member.
    let mut slot_of_root: Vec<Option<usize>> = vec![None; n];
    let mut components: Vec<Vec<String>> = Vec::new();
    for idx in g.graph.node_indices() {
        let root = uf.find(idx.index());
        let slot = *slot_of_root[root].get_or_insert_with(|| {
            components.push(Vec::new());
            components.len() - 1
        });
        components[slot].push(g.graph[idx].clone());
    }

    // Stable: ties keep first-member order.
    components.sort_by(|a, b| b.len().cmp(&a.len()));
    components
}

/// Result of splitting a network at its largest component.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentSplit {
    pub largest_component: NetworkData,
    /// Everything outside the largest component; `None` when the network is
    /// connected (or empty).
    pub other_components: Option<NetworkData>,
    pub number_of_components: usize,
    pub is_connected: bool,
}

/// Split `network` into its largest connected component and the rest.
///
/// A connected network is returned unchanged with no other components. An
/// empty network has zero components and is not connected.
#[must_use]
#[instrument(skip(network), fields(nodes = network.node_count()))]
pub fn split_largest_component(network: &NetworkData) -> ComponentSplit {
    let g = SimpleGraph::from_network(network, false);
    let components = connected_components(&g);
    let number_of_components = components.len();

    debug!(number_of_components, "computed connected components");

    if number_of_components <= 1 {
        return ComponentSplit {
            largest_component: network.clone(),
            other_components: None,
            number_of_components,
            is_connected: number_of_components == 1,
        };
    }

    let keep: HashSet<&str> = components[0].iter().map(String::as_str).collect();
    ComponentSplit {
        largest_component: network.subgraph(&keep),
        other_components: Some(network.without_nodes(&keep)),
        number_of_components,
        is_connected: false,
    }
}
