use anyhow::{Context, Result, bail};
use clap::Args;
use netrank_core::config::load_project_config;
use netrank_core::gml::read_gml_path;
use netrank_core::onboard::{OnboardOptions, read_sqlite_path};
use netrank_core::{NetrankError, NetworkData, Table};
use netrank_ops::config::project_defaults;
use netrank_ops::{FieldSpec, Operation, Registry, Value, ValueMap, ValueType};
use serde::Serialize;
use serde_json::Map;
use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::output::{
    OutputMode, pretty_kv, pretty_section, render_mode, write_table_pretty, write_table_text,
};

/// Arguments for `nr run`.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Operation name, e.g. `create.degree_rank_list`.
    pub operation: String,

    /// Operation input as KEY=VALUE. Repeat for each input.
    #[arg(short = 'i', long = "input", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub inputs: Vec<(String, String)>,

    /// Write network outputs (.json) and table outputs (.csv) to this directory.
    #[arg(long, value_name = "DIR")]
    pub out_dir: Option<PathBuf>,
}

fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{raw}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing input name in '{raw}'"));
    }
    Ok((key.to_string(), value.to_string()))
}

fn extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default()
}

/// Load a network by file extension.
fn load_network(path: &Path) -> Result<NetworkData> {
    let network = match extension(path).as_str() {
        "json" => NetworkData::read_json_path(path)?,
        "gml" => read_gml_path(path, None)?,
        "sqlite" | "sqlite3" | "db" => read_sqlite_path(path, &OnboardOptions::default())?,
        _ => bail!(
            "cannot load a network from '{}': expected a .json, .gml, .sqlite or .db file",
            path.display()
        ),
    };
    Ok(network)
}

/// Load a table by file extension.
fn load_table(path: &Path) -> Result<Table> {
    let table = match extension(path).as_str() {
        "csv" => Table::read_csv_path(path)?,
        "json" => Table::read_json_path(path)?,
        _ => bail!(
            "cannot load a table from '{}': expected a .csv or .json file",
            path.display()
        ),
    };
    Ok(table)
}

fn load_input(field: &FieldSpec, raw: &str) -> Result<Value> {
    let value = match field.ty {
        ValueType::Network => Value::from(load_network(Path::new(raw))?),
        ValueType::Table => Value::from(load_table(Path::new(raw))?),
        ty => Value::parse_scalar(field.name, ty, raw)?,
    };
    Ok(value)
}

/// Parse command-line inputs against the operation schema, then fill unset
/// inputs from the project config.
fn collect_inputs(
    op: &dyn Operation,
    raw_inputs: &[(String, String)],
    project_root: &Path,
) -> Result<ValueMap> {
    let schema = op.inputs_schema();
    let mut inputs = ValueMap::new();
    for (name, raw) in raw_inputs {
        let Some(field) = schema.iter().find(|f| f.name == name.as_str()) else {
            let known: Vec<&str> = schema.iter().map(|f| f.name).collect();
            return Err(NetrankError::invalid_input(
                name.as_str(),
                format!(
                    "not an input of {} (expected one of: {})",
                    op.name(),
                    known.join(", ")
                ),
            )
            .into());
        };
        if inputs.contains(name) {
            return Err(NetrankError::invalid_input(name.as_str(), "given more than once").into());
        }
        let value = load_input(field, raw).with_context(|| format!("input '{name}'"))?;
        inputs.insert(name.as_str(), value);
    }

    let config = load_project_config(project_root)?;
    for (name, value) in project_defaults(&config).iter() {
        if !inputs.contains(name) && schema.iter().any(|f| f.name == name) {
            debug!(input = name, "using project default");
            inputs.insert(name, value.clone());
        }
    }
    Ok(inputs)
}

/// Write network outputs as JSON and table outputs as CSV.
fn write_outputs(outputs: &ValueMap, dir: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    let mut written = Vec::new();
    for (name, value) in outputs.iter() {
        let path = match value {
            Value::Network(network) => {
                let path = dir.join(format!("{name}.json"));
                network.write_json_path(&path)?;
                path
            }
            Value::Table(table) => {
                let path = dir.join(format!("{name}.csv"));
                table.write_csv_path(&path)?;
                path
            }
            _ => continue,
        };
        debug!(path = %path.display(), "wrote output");
        written.push(path);
    }
    Ok(written)
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum OutputView<'a> {
    Network {
        nodes: usize,
        edges: usize,
        directed: bool,
        content_hash: String,
    },
    Table {
        columns: &'a [String],
        rows: Vec<Map<String, serde_json::Value>>,
        #[serde(skip)]
        table: &'a Table,
    },
    List {
        value: &'a [serde_json::Value],
    },
    String {
        value: &'a str,
    },
    Integer {
        value: i64,
    },
    Boolean {
        value: bool,
    },
}

impl<'a> OutputView<'a> {
    fn of(value: &'a Value) -> Self {
        match value {
            Value::Network(n) => Self::Network {
                nodes: n.node_count(),
                edges: n.edge_count(),
                directed: n.is_directed(),
                content_hash: n.content_hash(),
            },
            Value::Table(t) => Self::Table {
                columns: t.columns(),
                rows: t.to_records(),
                table: t,
            },
            Value::List(items) => Self::List { value: items },
            Value::String(s) => Self::String { value: s },
            Value::Integer(i) => Self::Integer { value: *i },
            Value::Boolean(b) => Self::Boolean { value: *b },
        }
    }
}

#[derive(Debug, Serialize)]
struct RunReport<'a> {
    operation: &'static str,
    outputs: BTreeMap<&'a str, OutputView<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    written: Vec<PathBuf>,
    /// Output names in schema order.
    #[serde(skip)]
    order: Vec<&'static str>,
}

impl<'a> RunReport<'a> {
    fn new(op: &dyn Operation, outputs: &'a ValueMap, written: Vec<PathBuf>) -> Self {
        let order: Vec<&'static str> = op
            .outputs_schema()
            .iter()
            .filter_map(|f| outputs.get(f.name).map(|_| f.name))
            .collect();
        Self {
            operation: op.name(),
            outputs: outputs
                .iter()
                .map(|(name, value)| (name, OutputView::of(value)))
                .collect(),
            written,
            order,
        }
    }

    fn ordered(&self) -> impl Iterator<Item = (&'a str, &OutputView<'a>)> + '_ {
        self.order
            .iter()
            .filter_map(|&name| self.outputs.get(name).map(|view| (name, view)))
    }
}

fn write_text(report: &RunReport<'_>, w: &mut dyn Write) -> io::Result<()> {
    for (name, view) in report.ordered() {
        match view {
            OutputView::Network { nodes, edges, .. } => {
                writeln!(w, "{name}\tnetwork\tnodes={nodes}\tedges={edges}")?;
            }
            OutputView::Table { table, .. } => {
                writeln!(w, "# {name}")?;
                write_table_text(w, table)?;
            }
            OutputView::List { value } => {
                let json = serde_json::to_string(value).map_err(io::Error::other)?;
                writeln!(w, "{name}\t{json}")?;
            }
            OutputView::String { value } if value.contains('\n') => {
                writeln!(w, "# {name}")?;
                writeln!(w, "{value}")?;
            }
            OutputView::String { value } => writeln!(w, "{name}\t{value}")?,
            OutputView::Integer { value } => writeln!(w, "{name}\t{value}")?,
            OutputView::Boolean { value } => writeln!(w, "{name}\t{value}")?,
        }
    }
    for path in &report.written {
        writeln!(w, "wrote\t{}", path.display())?;
    }
    Ok(())
}

fn write_pretty(report: &RunReport<'_>, w: &mut dyn Write) -> io::Result<()> {
    for (name, view) in report.ordered() {
        pretty_section(w, name)?;
        match view {
            OutputView::Network {
                nodes,
                edges,
                directed,
                content_hash,
            } => {
                pretty_kv(w, "nodes", nodes.to_string())?;
                pretty_kv(w, "edges", edges.to_string())?;
                pretty_kv(w, "directed", directed.to_string())?;
                pretty_kv(w, "hash", content_hash)?;
            }
            OutputView::Table { table, .. } => write_table_pretty(w, table)?,
            OutputView::List { value } => {
                for item in *value {
                    writeln!(w, "  {}", netrank_core::table::cell_to_string(item))?;
                }
            }
            OutputView::String { value } => writeln!(w, "{value}")?,
            OutputView::Integer { value } => writeln!(w, "{value}")?,
            OutputView::Boolean { value } => writeln!(w, "{value}")?,
        }
        writeln!(w)?;
    }
    for path in &report.written {
        writeln!(w, "Wrote {}", path.display())?;
    }
    Ok(())
}

/// Run one operation with inputs from the command line.
///
/// # Errors
///
/// Returns an error for an unknown operation, an unreadable input, a
/// failing operation, or an unwritable output directory.
pub fn run_operation(args: &RunArgs, output: OutputMode, project_root: &Path) -> Result<()> {
    let op = Registry::global()?.get(&args.operation)?;
    let inputs = collect_inputs(op, &args.inputs, project_root)?;
    let outputs = op
        .execute(inputs)
        .with_context(|| format!("run {}", op.name()))?;

    let written = match &args.out_dir {
        Some(dir) => write_outputs(&outputs, dir)?,
        None => Vec::new(),
    };
    info!(
        operation = op.name(),
        outputs = outputs.len(),
        written = written.len(),
        "operation complete"
    );

    let report = RunReport::new(op, &outputs, written);
    render_mode(output, &report, write_text, write_pretty)
}
