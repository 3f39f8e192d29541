//! Network onboarding from SQLite databases and edge tables.
//!
//! # SQLite layout
//!
//! ```sql
//! CREATE TABLE nodes (id TEXT PRIMARY KEY, label TEXT, ...);
//! CREATE TABLE edges (source TEXT, target TEXT, ...);
//! ```
//!
//! Extra columns become node or edge attributes; NULL cells are skipped.
//! Rows are read in `rowid` order so repeated imports produce identical
//! networks. The database is opened read-only.
//!
//! # Edge tables
//!
//! An edge [`Table`] needs a source and a target column; all other columns
//! become edge attributes. An optional node table contributes isolated nodes
//! and node attributes.

use std::collections::HashMap;
use std::path::Path;

use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags};
use serde_json::Value;
use tracing::{debug, instrument};

use crate::error::{NetrankError, Result};
use crate::network::{Attributes, NetworkData};
use crate::table::{Table, cell_to_string};

/// Column names used to interpret node and edge rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OnboardOptions {
    pub directed: bool,
    pub id_column: String,
    /// Node attribute used as node identity. `None` keeps the id.
    pub label_column: Option<String>,
    pub source_column: String,
    pub target_column: String,
}

impl Default for OnboardOptions {
    fn default() -> Self {
        Self {
            directed: false,
            id_column: "id".to_string(),
            label_column: None,
            source_column: "source".to_string(),
            target_column: "target".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Shared row handling
// ---------------------------------------------------------------------------

/// Incrementally builds a network from node rows then edge rows.
struct Builder<'o> {
    options: &'o OnboardOptions,
    network: NetworkData,
    id_to_name: HashMap<String, String>,
}

impl<'o> Builder<'o> {
    fn new(options: &'o OnboardOptions) -> Self {
        Self {
            options,
            network: NetworkData::new(options.directed),
            id_to_name: HashMap::new(),
        }
    }

    fn add_node_row(&mut self, row: usize, mut attributes: Attributes) -> Result<()> {
        let opts = self.options;
        let id = attributes
            .remove(&opts.id_column)
            .map(|v| cell_to_string(&v))
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                NetrankError::invalid_input(
                    "nodes",
                    format!("row {row} has no value in column '{}'", opts.id_column),
                )
            })?;

        let name = match opts.label_column.as_deref() {
            Some(label) if label != opts.id_column => attributes
                .remove(label)
                .map(|v| cell_to_string(&v))
                .filter(|s| !s.is_empty())
                .ok_or_else(|| {
                    NetrankError::invalid_input(
                        "nodes",
                        format!("row {row} has no value in label column '{label}'"),
                    )
                })?,
            _ => id.clone(),
        };

        if self.id_to_name.contains_key(&id) {
            return Err(NetrankError::invalid_input(
                "nodes",
                format!("node id '{id}' is duplicated (row {row})"),
            ));
        }
        if self.network.contains_node(&name) {
            return Err(NetrankError::invalid_input(
                "nodes",
                format!("node label '{name}' is duplicated (row {row})"),
            ));
        }

        self.network.add_node(name.clone()).attributes = attributes;
        self.id_to_name.insert(id, name);
        Ok(())
    }

    fn endpoint(&self, row: usize, attributes: &mut Attributes, column: &str) -> Result<String> {
        let raw = attributes
            .remove(column)
            .map(|v| cell_to_string(&v))
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                NetrankError::invalid_input(
                    "edges",
                    format!("row {row} has no value in column '{column}'"),
                )
            })?;
        Ok(self.id_to_name.get(&raw).cloned().unwrap_or(raw))
    }

    fn add_edge_row(&mut self, row: usize, mut attributes: Attributes) -> Result<()> {
        let source = self.endpoint(row, &mut attributes, &self.options.source_column)?;
        let target = self.endpoint(row, &mut attributes, &self.options.target_column)?;
        self.network.add_edge(source, target, attributes);
        Ok(())
    }

    fn finish(self) -> NetworkData {
        debug!(
            nodes = self.network.node_count(),
            edges = self.network.edge_count(),
            "onboarded network"
        );
        self.network
    }
}

// ---------------------------------------------------------------------------
// SQLite
// ---------------------------------------------------------------------------

fn sql_to_json(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::from(i),
        ValueRef::Real(f) => serde_json::Number::from_f64(f).map_or(Value::Null, Value::Number),
        ValueRef::Text(bytes) => Value::String(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(bytes) => Value::String(format!("<blob {} bytes>", bytes.len())),
    }
}

fn table_exists(conn: &Connection, name: &str) -> Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type IN ('table', 'view') AND name = ?1",
        [name],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

/// Read every row of `table` as an attribute map, in rowid order.
fn read_rows(conn: &Connection, table: &str) -> Result<Vec<Attributes>> {
    let mut stmt = conn.prepare(&format!("SELECT * FROM \"{table}\" ORDER BY rowid"))?;
    let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
    let rows = stmt.query_map([], |row| {
        let mut attrs = Attributes::new();
        for (i, name) in columns.iter().enumerate() {
            let value = sql_to_json(row.get_ref(i)?);
            if !value.is_null() {
                attrs.insert(name.clone(), value);
            }
        }
        Ok(attrs)
    })?;
    rows.collect::<rusqlite::Result<Vec<_>>>()
        .map_err(NetrankError::from)
}

/// Load a network from a SQLite database with `nodes` and `edges` tables.
///
/// The `nodes` table is optional; edges may refer to ids it does not list.
///
/// # Errors
///
/// Returns an error if the file cannot be opened, has no `edges` table, or
/// holds rows without the configured id/source/target values.
#[instrument(skip(options), fields(path = %path.display()))]
pub fn read_sqlite_path(path: &Path, options: &OnboardOptions) -> Result<NetworkData> {
    if !path.exists() {
        return Err(NetrankError::io(
            path,
            std::io::Error::new(std::io::ErrorKind::NotFound, "database file not found"),
        ));
    }
    let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)?;

    if !table_exists(&conn, "edges")? {
        return Err(NetrankError::invalid_input(
            "file",
            format!("{} has no 'edges' table", path.display()),
        ));
    }

    let mut builder = Builder::new(options);
    if table_exists(&conn, "nodes")? {
        for (row, attrs) in read_rows(&conn, "nodes")?.into_iter().enumerate() {
            builder.add_node_row(row, attrs)?;
        }
    }
    for (row, attrs) in read_rows(&conn, "edges")?.into_iter().enumerate() {
        builder.add_edge_row(row, attrs)?;
    }
    Ok(builder.finish())
}

// ---------------------------------------------------------------------------
// Tables
// ---------------------------------------------------------------------------

fn table_rows(table: &Table) -> impl Iterator<Item = Attributes> + '_ {
    table.rows().iter().map(|row| {
        table
            .columns()
            .iter()
            .cloned()
            .zip(row.iter().cloned())
            .filter(|(_, v)| !v.is_null())
            .collect()
    })
}

/// Build a network from an edge table and an optional node table.
///
/// # Errors
///
/// Returns an error if a required column is missing, a row lacks an
/// endpoint or id, or node ids/labels are duplicated.
#[instrument(skip_all, fields(edges = edges.num_rows(), nodes = nodes.map(Table::num_rows)))]
pub fn network_from_tables(
    edges: &Table,
    nodes: Option<&Table>,
    options: &OnboardOptions,
) -> Result<NetworkData> {
    edges.require_column(&options.source_column)?;
    edges.require_column(&options.target_column)?;

    let mut builder = Builder::new(options);
    if let Some(nodes) = nodes {
        nodes.require_column(&options.id_column)?;
        if let Some(label) = options.label_column.as_deref() {
            nodes.require_column(label)?;
        }
        for (row, attrs) in table_rows(nodes).enumerate() {
            builder.add_node_row(row, attrs)?;
        }
    }
    for (row, attrs) in table_rows(edges).enumerate() {
        builder.add_edge_row(row, attrs)?;
    }
    Ok(builder.finish())
}
