//! Structural operations: cut points and largest-component extraction.

use std::collections::HashSet;

use netrank_analysis::graph::SimpleGraph;
use netrank_analysis::structure::{cut_points, split_largest_component};
use netrank_core::Result;
use serde_json::Value;
use tracing::{info, instrument};

use crate::operation::Operation;
use crate::schema::FieldSpec;
use crate::value::{ValueMap, ValueType};

/// Node attribute marking cut points.
pub const CUT_POINT_ATTRIBUTE: &str = "Cut Point";

const NETWORK_INPUT: [FieldSpec; 1] = [FieldSpec::required(
    "network_data",
    ValueType::Network,
    "The network to analyse.",
)];

// ---------------------------------------------------------------------------
// create.cut_point_list
// ---------------------------------------------------------------------------

const CUT_POINT_OUTPUTS: [FieldSpec; 2] = [
    FieldSpec::required(
        "network_result",
        ValueType::List,
        "Cut points in node order.",
    ),
    FieldSpec::required(
        "cut_network",
        ValueType::Network,
        "The input network with a 'Cut Point' (Yes/No) node attribute.",
    ),
];

/// `create.cut_point_list`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CutPointList;

impl Operation for CutPointList {
    fn name(&self) -> &'static str {
        "create.cut_point_list"
    }

    fn doc(&self) -> &'static str {
        "List the cut points (articulation points) of the network: nodes whose removal \
         splits their component in two or more. Edge direction is ignored."
    }

    fn inputs_schema(&self) -> &'static [FieldSpec] {
        &NETWORK_INPUT
    }

    fn outputs_schema(&self) -> &'static [FieldSpec] {
        &CUT_POINT_OUTPUTS
    }

    #[instrument(skip_all)]
    fn run(&self, inputs: &ValueMap) -> Result<ValueMap> {
        let network = inputs.network("network_data")?;
        let points = cut_points(&SimpleGraph::from_network(network, true));

        let is_cut: HashSet<&str> = points.iter().map(String::as_str).collect();
        let mut annotated = network.clone();
        annotated.set_node_attributes(
            CUT_POINT_ATTRIBUTE,
            network.node_ids().map(|id| {
                let flag = if is_cut.contains(id) { "Yes" } else { "No" };
                (id.to_string(), Value::from(flag))
            }),
        );

        info!(cut_points = points.len(), "found cut points");
        let list: Vec<Value> = points.into_iter().map(Value::String).collect();
        Ok(ValueMap::new()
            .with("network_result", list)
            .with("cut_network", annotated))
    }
}

// ---------------------------------------------------------------------------
// network_data.extract_largest_component
// ---------------------------------------------------------------------------

const COMPONENT_OUTPUTS: [FieldSpec; 4] = [
    FieldSpec::required(
        "largest_component",
        ValueType::Network,
        "The largest connected component.",
    ),
    FieldSpec::optional(
        "other_components",
        ValueType::Network,
        "Every node outside the largest component, with edges among them; unset when \
         the network is connected.",
    ),
    FieldSpec::required(
        "number_of_components",
        ValueType::Integer,
        "Number of connected components.",
    ),
    FieldSpec::required(
        "is_connected",
        ValueType::Boolean,
        "Whether the network has exactly one component.",
    ),
];

/// `network_data.extract_largest_component`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtractLargestComponent;

impl Operation for ExtractLargestComponent {
    fn name(&self) -> &'static str {
        "network_data.extract_largest_component"
    }

    fn doc(&self) -> &'static str {
        "Split the network into its largest connected component and the rest. A \
         connected network is returned as is and 'other_components' is left unset. \
         Directed networks are split by weak connectivity."
    }

    fn inputs_schema(&self) -> &'static [FieldSpec] {
        &NETWORK_INPUT
    }

    fn outputs_schema(&self) -> &'static [FieldSpec] {
        &COMPONENT_OUTPUTS
    }

    #[instrument(skip_all)]
    fn run(&self, inputs: &ValueMap) -> Result<ValueMap> {
        let split = split_largest_component(inputs.network("network_data")?);
        info!(
            components = split.number_of_components,
            largest = split.largest_component.node_count(),
            "extracted largest component"
        );

        let mut outputs = ValueMap::new()
            .with("largest_component", split.largest_component)
            .with(
                "number_of_components",
                i64::try_from(split.number_of_components).unwrap_or(i64::MAX),
            )
            .with("is_connected", split.is_connected);
        if let Some(rest) = split.other_components {
            outputs.insert("other_components", rest);
        }
        Ok(outputs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use netrank_core::{Attributes, NetworkData};
    use serde_json::json;

    /// Two triangles joined by c-d, plus an isolated node.
    fn bowtie() -> NetworkData {
        let mut n = NetworkData::new(false);
        for (a, b) in [("a", "b"), ("b", "c"), ("c", "a"), ("c", "d"), ("d", "e"), ("e", "f"), ("f", "d")] {
            n.add_edge(a, b, Attributes::new());
        }
        n.add_node("lonely");
        n
    }

    #[test]
    fn bridge_ends_are_cut_points() {
        let out = CutPointList
            .execute(ValueMap::new().with("network_data", bowtie()))
            .expect("run");
        assert_eq!(out.list("network_result").expect("list"), [json!("c"), json!("d")]);

        let net = out.network("cut_network").expect("network");
        assert_eq!(net.node("c").expect("c").attributes.get("Cut Point"), Some(&json!("Yes")));
        assert_eq!(net.node("a").expect("a").attributes.get("Cut Point"), Some(&json!("No")));
        assert_eq!(
            net.node("lonely").expect("lonely").attributes.get("Cut Point"),
            Some(&json!("No"))
        );
    }

    #[test]
    fn largest_component_and_rest() {
        let out = ExtractLargestComponent
            .execute(ValueMap::new().with("network_data", bowtie()))
            .expect("run");
        assert_eq!(out.integer("number_of_components").expect("count"), 2);
        assert!(!out.boolean("is_connected").expect("flag"));
        assert_eq!(out.network("largest_component").expect("largest").node_count(), 6);
        let rest = out.network("other_components").expect("rest");
        assert_eq!(rest.node_ids().collect::<Vec<_>>(), ["lonely"]);
        assert_eq!(rest.edge_count(), 0);
    }

    #[test]
    fn connected_network_leaves_rest_unset() {
        let mut n = bowtie();
        n.add_edge("lonely", "a", Attributes::new());
        let out = ExtractLargestComponent
            .execute(ValueMap::new().with("network_data", n.clone()))
            .expect("run");
        assert!(out.boolean("is_connected").expect("flag"));
        assert!(!out.contains("other_components"));
        assert_eq!(out.network("largest_component").expect("largest"), &n);
    }
}
