//! Structural summary of a network.
//!
//! Counts and density follow the chosen interpretation: a directed network
//! counts each ordered pair once, an undirected one each unordered pair.
//! Components are always weakly connected, and path statistics (diameter,
//! average shortest path) are measured on the undirected view of the
//! largest component.

use netrank_core::{NetworkData, Table};
use serde::Serialize;
use serde_json::Value;
use tracing::{error, instrument};

use crate::graph::{SimpleGraph, WeightedGraph};
use crate::metrics::Adjacency;
use crate::metrics::closeness::bfs_distances;
use crate::structure::connected_components;

/// Basic structural facts about a network.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetworkInfo {
    pub directed: bool,
    pub nodes: usize,
    /// Distinct node pairs with at least one edge (ordered when directed).
    pub edges: usize,
    pub density: f64,
    pub components: usize,
    pub largest_component_size: usize,
    /// Longest shortest path in the largest component; `None` when empty.
    pub diameter: Option<usize>,
    /// Mean shortest path over ordered pairs of the largest component.
    pub average_path_length: Option<f64>,
}

impl NetworkInfo {
    /// Multi-line human-readable report.
    #[must_use]
    pub fn report(&self) -> String {
        let kind = if self.directed { "Directed" } else { "Undirected" };
        let optional = |v: Option<String>| v.unwrap_or_else(|| "n/a".to_string());
        [
            format!("Graph Type: {kind}"),
            format!("Number of Nodes: {}", self.nodes),
            format!("Number of Edges: {}", self.edges),
            format!("Graph Density Score: {}", self.density),
            format!("Number of Connected Components: {}", self.components),
            format!(
                "Number of nodes in Largest Component: {}",
                self.largest_component_size
            ),
            format!(
                "Network Diameter of Largest Component: {}",
                optional(self.diameter.map(|d| d.to_string()))
            ),
            format!(
                "Average Path Length of Largest Component: {}",
                optional(self.average_path_length.map(|d| d.to_string()))
            ),
        ]
        .join("\n")
    }

    /// Two-column `Property`/`Value` table.
    #[must_use]
    pub fn to_table(&self) -> Table {
        let mut table = Table::new(["Property", "Value"]);
        let rows: [(&str, Value); 8] = [
            ("directed", Value::Bool(self.directed)),
            ("nodes", Value::from(self.nodes)),
            ("edges", Value::from(self.edges)),
            ("density", Value::from(self.density)),
            ("components", Value::from(self.components)),
            ("largest_component_size", Value::from(self.largest_component_size)),
            ("diameter", self.diameter.map_or(Value::Null, Value::from)),
            (
                "average_path_length",
                self.average_path_length.map_or(Value::Null, Value::from),
            ),
        ];
        for (name, value) in rows {
            table
                .push_row(vec![Value::String(name.to_string()), value])
                .unwrap_or_else(|e| {
                    // Two cells per row, matching the header.
                    error!(error = %e, "info row width mismatch");
                });
        }
        table
    }
}

/// Summarize `network`, interpreting it as directed when `directed`.
#[must_use]
#[instrument(skip(network), fields(nodes = network.node_count()))]
pub fn network_info(network: &NetworkData, directed: bool) -> NetworkInfo {
    let simple = SimpleGraph::from_network(network, false);
    let n = simple.node_count();

    let edges = if directed {
        WeightedGraph::from_network(network, None).edge_count()
    } else {
        simple.edge_count()
    };

    #[allow(clippy::cast_precision_loss)]
    let density = if n > 1 {
        let pairs = (n * (n - 1)) as f64;
        let pairs = if directed { pairs } else { pairs / 2.0 };
        edges as f64 / pairs
    } else {
        0.0
    };

    let components = connected_components(&simple);
    let largest_component_size = components.first().map_or(0, Vec::len);
    let (diameter, average_path_length) = components
        .first()
        .map_or((None, None), |largest| path_statistics(&simple, largest));

    NetworkInfo {
        directed,
        nodes: n,
        edges,
        density,
        components: components.len(),
        largest_component_size,
        diameter,
        average_path_length,
    }
}

#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
fn path_statistics(g: &SimpleGraph, members: &[String]) -> (Option<usize>, Option<f64>) {
    let adj = Adjacency::from_graph(g);
    let mut longest = 0.0f64;
    let mut total = 0.0;
    for id in members {
        let Some(idx) = g.node_index(id) else {
            continue;
        };
        for d in bfs_distances(&adj, idx.index()) {
            longest = longest.max(d);
            total += d;
        }
    }
    let r = members.len();
    let average = if r > 1 {
        total / (r * (r - 1)) as f64
    } else {
        0.0
    };
    (Some(longest as usize), Some(average))
}

#[cfg(test)]
mod tests {
    use super::*;
    use netrank_core::Attributes;

    fn network(directed: bool, nodes: &[&str], edges: &[(&str, &str)]) -> NetworkData {
        let mut n = NetworkData::new(directed);
        for id in nodes {
            n.add_node(*id);
        }
        for (a, b) in edges {
            n.add_edge(*a, *b, Attributes::new());
        }
        n
    }

    #[test]
    fn path_with_isolate() {
        let n = network(false, &["solo"], &[("A", "B"), ("B", "C"), ("C", "D")]);
        let info = network_info(&n, false);
        assert_eq!(info.nodes, 5);
        assert_eq!(info.edges, 3);
        assert!((info.density - 0.3).abs() < 1e-12);
        assert_eq!(info.components, 2);
        assert_eq!(info.largest_component_size, 4);
        assert_eq!(info.diameter, Some(3));
        // Path of four: distances 1,2,3,1,1,2 summed twice = 20 over 12 pairs.
        let avg = info.average_path_length.unwrap_or(f64::NAN);
        assert!((avg - 20.0 / 12.0).abs() < 1e-12);
    }

    #[test]
    fn directed_counts_ordered_pairs() {
        let n = network(true, &[], &[("A", "B"), ("B", "A"), ("A", "B")]);
        let directed = network_info(&n, true);
        assert_eq!(directed.edges, 2);
        assert!((directed.density - 1.0).abs() < 1e-12);

        let undirected = network_info(&n, false);
        assert_eq!(undirected.edges, 1);
        assert!((undirected.density - 1.0).abs() < 1e-12);
    }

    #[test]
    fn empty_network() {
        let info = network_info(&NetworkData::new(false), false);
        assert_eq!(info.components, 0);
        assert_eq!(info.diameter, None);
        assert!(info.density.abs() < 1e-12);
    }

    #[test]
    fn report_names_graph_type_and_counts() {
        let info = network_info(&network(true, &[], &[("A", "B")]), true);
        let report = info.report();
        assert!(report.starts_with("Graph Type: Directed"));
        assert!(report.contains("Number of Nodes: 2"));
        assert!(report.contains("Network Diameter of Largest Component: 1"));
    }

    #[test]
    fn table_lists_every_property() {
        let info = network_info(&network(false, &[], &[("A", "B")]), false);
        let table = info.to_table();
        assert_eq!(table.columns(), ["Property", "Value"]);
        assert_eq!(table.num_rows(), 8);
    }
}
