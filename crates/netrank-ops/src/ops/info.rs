//! `get.network_info`: structural summary of a network.

use netrank_analysis::network_info;
use netrank_core::{NetrankError, Result};
use tracing::{info, instrument};

use crate::operation::Operation;
use crate::schema::{DefaultValue, FieldSpec};
use crate::value::{ValueMap, ValueType};

const INPUTS: [FieldSpec; 2] = [
    FieldSpec::required("network_data", ValueType::Network, "The network to summarise."),
    FieldSpec::optional(
        "graph_type",
        ValueType::String,
        "'directed' or 'undirected': how edges are counted.",
    )
    .with_default(DefaultValue::String("undirected")),
];

const OUTPUTS: [FieldSpec; 2] = [
    FieldSpec::required("network_result", ValueType::String, "Human-readable report."),
    FieldSpec::required(
        "network_info",
        ValueType::Table,
        "The same figures as a Property/Value table.",
    ),
];

/// `get.network_info`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NetworkInfoOp;

impl Operation for NetworkInfoOp {
    fn name(&self) -> &'static str {
        "get.network_info"
    }

    fn doc(&self) -> &'static str {
        "Summarise a network: node and edge counts, density, number of connected \
         components, and the size, diameter and average shortest path length of the \
         largest component."
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
        let directed = match inputs.string("graph_type")?.trim().to_ascii_lowercase().as_str() {
            "directed" => true,
            "undirected" => false,
            other => {
                return Err(NetrankError::invalid_input(
                    "graph_type",
                    format!("'{other}' is neither 'directed' nor 'undirected'"),
                ));
            }
        };

        let summary = network_info(network, directed);
        info!(
            nodes = summary.nodes,
            edges = summary.edges,
            components = summary.components,
            "summarised network"
        );
        Ok(ValueMap::new()
            .with("network_result", summary.report())
            .with("network_info", summary.to_table()))
    }
}
