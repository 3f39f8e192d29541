//! Onboarding operations: GML files, SQLite databases and edge tables.

use std::path::Path;

use netrank_core::gml::{DEFAULT_LABEL_ATTRIBUTE, read_gml_path};
use netrank_core::onboard::{OnboardOptions, network_from_tables, read_sqlite_path};
use netrank_core::{NetworkData, Result};
use tracing::{info, instrument};

use crate::operation::Operation;
use crate::schema::{DefaultValue, FieldSpec};
use crate::value::{ValueMap, ValueType};

const NETWORK_OUTPUT: [FieldSpec; 1] = [FieldSpec::required(
    "network_data",
    ValueType::Network,
    "The onboarded network.",
)];

const DIRECTED: FieldSpec = FieldSpec::optional(
    "directed",
    ValueType::Boolean,
    "Whether edges are directed.",
)
.with_default(DefaultValue::Boolean(false));
const LABEL_COLUMN: FieldSpec = FieldSpec::optional(
    "label_column",
    ValueType::String,
    "Node column to use as node identity instead of the id.",
);

fn loaded(network: NetworkData) -> ValueMap {
    info!(
        nodes = network.node_count(),
        edges = network.edge_count(),
        directed = network.is_directed(),
        "onboarded network"
    );
    ValueMap::new().with("network_data", network)
}

// ---------------------------------------------------------------------------
// onboard.gml_file
// ---------------------------------------------------------------------------

const GML_INPUTS: [FieldSpec; 2] = [
    FieldSpec::required("path", ValueType::String, "Path to the GML file."),
    FieldSpec::optional(
        "label",
        ValueType::String,
        "Node attribute holding node identity. Use 'id' when the file has no labels.",
    )
    .with_default(DefaultValue::String(DEFAULT_LABEL_ATTRIBUTE)),
];

/// `onboard.gml_file`.
#[derive(Debug, Clone, Copy, Default)]
pub struct GmlFile;

impl Operation for GmlFile {
    fn name(&self) -> &'static str {
        "onboard.gml_file"
    }

    fn doc(&self) -> &'static str {
        "Read network data from a GML file. Nodes are identified by their 'label' \
         attribute unless 'label' names another attribute (or 'id')."
    }

    fn inputs_schema(&self) -> &'static [FieldSpec] {
        &GML_INPUTS
    }

    fn outputs_schema(&self) -> &'static [FieldSpec] {
        &NETWORK_OUTPUT
    }

    #[instrument(skip_all)]
    fn run(&self, inputs: &ValueMap) -> Result<ValueMap> {
        let path = Path::new(inputs.string("path")?);
        let label = inputs.opt_string("label")?;
        Ok(loaded(read_gml_path(path, label)?))
    }
}

// ---------------------------------------------------------------------------
// onboard.sqlite_file
// ---------------------------------------------------------------------------

const SQLITE_INPUTS: [FieldSpec; 3] = [
    FieldSpec::required(
        "path",
        ValueType::String,
        "Path to a SQLite database with an 'edges' table and an optional 'nodes' table.",
    ),
    DIRECTED,
    LABEL_COLUMN,
];

/// `onboard.sqlite_file`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteFile;

impl Operation for SqliteFile {
    fn name(&self) -> &'static str {
        "onboard.sqlite_file"
    }

    fn doc(&self) -> &'static str {
        "Read network data from a SQLite database. Edges come from 'edges(source, \
         target, ...)', nodes from the optional 'nodes(id, ...)'; extra columns become \
         attributes."
    }

    fn inputs_schema(&self) -> &'static [FieldSpec] {
        &SQLITE_INPUTS
    }

    fn outputs_schema(&self) -> &'static [FieldSpec] {
        &NETWORK_OUTPUT
    }

    #[instrument(skip_all)]
    fn run(&self, inputs: &ValueMap) -> Result<ValueMap> {
        let options = OnboardOptions {
            directed: inputs.boolean("directed")?,
            label_column: inputs.opt_string("label_column")?.map(str::to_string),
            ..OnboardOptions::default()
        };
        let path = Path::new(inputs.string("path")?);
        Ok(loaded(read_sqlite_path(path, &options)?))
    }
}

// ---------------------------------------------------------------------------
// onboard.edge_table
// ---------------------------------------------------------------------------

const EDGE_TABLE_INPUTS: [FieldSpec; 7] = [
    FieldSpec::required("edges", ValueType::Table, "One row per edge."),
    FieldSpec::optional("nodes", ValueType::Table, "One row per node."),
    FieldSpec::optional("source_column", ValueType::String, "Edge column with the source id.")
        .with_default(DefaultValue::String("source")),
    FieldSpec::optional("target_column", ValueType::String, "Edge column with the target id.")
        .with_default(DefaultValue::String("target")),
    FieldSpec::optional("id_column", ValueType::String, "Node column with the node id.")
        .with_default(DefaultValue::String("id")),
    LABEL_COLUMN,
    DIRECTED,
];

/// `onboard.edge_table`.
#[derive(Debug, Clone, Copy, Default)]
pub struct EdgeTable;

impl Operation for EdgeTable {
    fn name(&self) -> &'static str {
        "onboard.edge_table"
    }

    fn doc(&self) -> &'static str {
        "Build network data from an edge table and an optional node table. Edge rows \
         may name nodes the node table does not list; those nodes are added without \
         attributes."
    }

    fn inputs_schema(&self) -> &'static [FieldSpec] {
        &EDGE_TABLE_INPUTS
    }

    fn outputs_schema(&self) -> &'static [FieldSpec] {
        &NETWORK_OUTPUT
    }

    #[instrument(skip_all)]
    fn run(&self, inputs: &ValueMap) -> Result<ValueMap> {
        let options = OnboardOptions {
            directed: inputs.boolean("directed")?,
            id_column: inputs.string("id_column")?.to_string(),
            label_column: inputs.opt_string("label_column")?.map(str::to_string),
            source_column: inputs.string("source_column")?.to_string(),
            target_column: inputs.string("target_column")?.to_string(),
        };
        let network = network_from_tables(inputs.table("edges")?, inputs.opt_table("nodes")?, &options)?;
        Ok(loaded(network))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use netrank_core::{ErrorCode, Table};
    use serde_json::json;

    const GML: &str = r#"graph [
  directed 0
  node [ id 0 label "Alice" ]
  node [ id 1 label "Bob" ]
  node [ id 2 label "Carol" ]
  edge [ source 0 target 1 weight 3 ]
  edge [ source 1 target 2 ]
]"#;

    #[test]
    fn gml_by_label_and_by_id() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("letters.gml");
        std::fs::write(&path, GML).expect("write");
        let path = path.to_string_lossy().into_owned();

        let out = GmlFile
            .execute(ValueMap::new().with("path", path.as_str()))
            .expect("run");
        let net = out.network("network_data").expect("network");
        assert_eq!(net.node_ids().collect::<Vec<_>>(), ["Alice", "Bob", "Carol"]);
        assert_eq!(net.edges()[0].attributes.get("weight"), Some(&json!(3)));

        let out = GmlFile
            .execute(ValueMap::new().with("path", path.as_str()).with("label", "id"))
            .expect("run");
        let net = out.network("network_data").expect("network");
        assert_eq!(net.node_ids().collect::<Vec<_>>(), ["0", "1", "2"]);
    }

    #[test]
    fn missing_gml_file_is_io_error() {
        let err = GmlFile
            .execute(ValueMap::new().with("path", "/nonexistent/letters.gml"))
            .expect_err("missing");
        assert_eq!(err.code(), ErrorCode::IoFailed);
    }

    #[test]
    fn edge_table_with_custom_columns() {
        let mut edges = Table::new(["from", "to", "weight"]);
        edges
            .push_row(vec![json!("a"), json!("b"), json!(2)])
            .expect("row");
        edges
            .push_row(vec![json!("b"), json!("c"), json!(1)])
            .expect("row");
        let mut nodes = Table::new(["id", "city"]);
        nodes.push_row(vec![json!("a"), json!("Trier")]).expect("row");

        let out = EdgeTable
            .execute(
                ValueMap::new()
                    .with("edges", edges)
                    .with("nodes", nodes)
                    .with("source_column", "from")
                    .with("target_column", "to")
                    .with("directed", true),
            )
            .expect("run");
        let net = out.network("network_data").expect("network");
        assert!(net.is_directed());
        assert_eq!(net.node_count(), 3);
        assert_eq!(net.edge_count(), 2);
        assert_eq!(net.node("a").expect("a").attributes.get("city"), Some(&json!("Trier")));
    }

    #[test]
    fn edge_table_without_source_column_fails() {
        let edges = Table::new(["from", "to"]);
        let err = EdgeTable
            .execute(ValueMap::new().with("edges", edges))
            .expect_err("no source column");
        assert!(err.to_string().contains("source"));
    }
}
