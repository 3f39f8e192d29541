//! `compute.modularity_group`: greedy modularity communities.

use netrank_analysis::community::greedy_modularity_communities;
use netrank_analysis::graph::SimpleGraph;
use netrank_core::{Result, Table};
use serde_json::Value;
use tracing::{info, instrument};

use crate::config::ModularityConfig;
use crate::operation::Operation;
use crate::schema::{DefaultValue, FieldSpec};
use crate::value::{ValueMap, ValueType};

/// Node attribute holding the community index.
pub const GROUP_ATTRIBUTE: &str = "Modularity_Group";

const INPUTS: [FieldSpec; 3] = [
    FieldSpec::required("network_data", ValueType::Network, "The network to analyse."),
    FieldSpec::optional(
        "cutoff",
        ValueType::Integer,
        "Stop merging once this many communities remain.",
    )
    .with_default(DefaultValue::Integer(1)),
    FieldSpec::optional(
        "best_n",
        ValueType::Integer,
        "Keep merging past the modularity peak until at most this many communities remain.",
    ),
];

const OUTPUTS: [FieldSpec; 2] = [
    FieldSpec::required(
        "modularity_network",
        ValueType::Network,
        "The input network with a 'Modularity_Group' node attribute.",
    ),
    FieldSpec::required(
        "communities",
        ValueType::Table,
        "One row per community: Group, Size, Members.",
    ),
];

/// `compute.modularity_group`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ModularityGroup;

impl Operation for ModularityGroup {
    fn name(&self) -> &'static str {
        "compute.modularity_group"
    }

    fn doc(&self) -> &'static str {
        "Find communities by greedy modularity maximisation (Clauset-Newman-Moore) and \
         assign each node its community index as 'Modularity_Group'. Communities are \
         numbered from 0, largest first. Edge direction, weights and self-loops are \
         ignored."
    }

    fn inputs_schema(&self) -> &'static [FieldSpec] {
        &INPUTS
    }

    fn outputs_schema(&self) -> &'static [FieldSpec] {
        &OUTPUTS
    }

    #[instrument(skip_all)]
    fn run(&self, inputs: &ValueMap) -> Result<ValueMap> {
        let network = inputs.network("network_data")?;
        let config = ModularityConfig::from_inputs(inputs)?;
        let result =
            greedy_modularity_communities(&SimpleGraph::from_network(network, true), config.limits())?;
        info!(
            communities = result.communities.len(),
            modularity = result.modularity,
            "found communities"
        );

        let mut annotated = network.clone();
        annotated.set_node_attributes(
            GROUP_ATTRIBUTE,
            result.assignments().map(|(node, group)| (node, Value::from(group))),
        );

        let mut table = Table::new(["Group", "Size", "Members"]);
        for (group, members) in result.communities.iter().enumerate() {
            table.push_row(vec![
                Value::from(group),
                Value::from(members.len()),
                Value::String(members.join(", ")),
            ])?;
        }

        Ok(ValueMap::new()
            .with("modularity_network", annotated)
            .with("communities", table))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use netrank_core::{Attributes, ErrorCode, NetworkData};
    use serde_json::json;

    fn bridged_triangles() -> NetworkData {
        let mut n = NetworkData::new(false);
        for (a, b) in [("a", "b"), ("b", "c"), ("c", "a"), ("c", "d"), ("d", "e"), ("e", "f"), ("f", "d")] {
            n.add_edge(a, b, Attributes::new());
        }
        n
    }

    #[test]
    fn triangles_become_groups() {
        let out = ModularityGroup
            .execute(ValueMap::new().with("network_data", bridged_triangles()))
            .expect("run");
        let net = out.network("modularity_network").expect("network");
        let group = |id: &str| net.node(id).and_then(|n| n.attributes.get(GROUP_ATTRIBUTE)).cloned();
        assert_eq!(group("a"), Some(json!(0)));
        assert_eq!(group("c"), Some(json!(0)));
        assert_eq!(group("d"), Some(json!(1)));
        assert_eq!(group("f"), Some(json!(1)));

        let table = out.table("communities").expect("table");
        assert_eq!(table.num_rows(), 2);
        assert_eq!(table.rows()[0], vec![json!(0), json!(3), json!("a, b, c")]);
    }

    #[test]
    fn best_n_of_one_merges_everything() {
        let out = ModularityGroup
            .execute(
                ValueMap::new()
                    .with("network_data", bridged_triangles())
                    .with("best_n", 1i64),
            )
            .expect("run");
        assert_eq!(out.table("communities").expect("table").num_rows(), 1);
    }

    #[test]
    fn out_of_range_counts_are_partition_errors() {
        let err = ModularityGroup
            .execute(
                ValueMap::new()
                    .with("network_data", bridged_triangles())
                    .with("cutoff", 7i64),
            )
            .expect_err("cutoff above node count");
        assert_eq!(err.code(), ErrorCode::InvalidPartition);
        assert!(err.to_string().contains("cutoff=7"));
    }
}
