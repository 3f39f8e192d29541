//! Network data: ordered node and edge records with free-form attributes.
//!
//! # Overview
//!
//! [`NetworkData`] is the exchange format between onboarding (GML, SQLite,
//! edge tables), the graph analyses, and the operation outputs. It keeps
//! nodes and edges exactly as supplied: parallel edges and self-loops are
//! representable, and node order is preserved so downstream results are
//! deterministic.
//!
//! Graph views (simple graph, multigraph, weighted aggregate) are built from
//! it by `netrank-analysis`; analyses write their results back as node
//! attributes via [`NetworkData::set_node_attributes`].
//!
//! # JSON form
//!
//! ```json
//! {
//!   "directed": false,
//!   "nodes": [{"id": "A", "attributes": {"label": "Alice"}}],
//!   "edges": [{"source": "A", "target": "B", "attributes": {"weight": 2}}]
//! }
//! ```

#![allow(clippy::module_name_repetitions)]

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::{NetrankError, Result};

/// Attribute map attached to nodes and edges.
pub type Attributes = BTreeMap<String, Value>;

/// Name of the edge attribute consulted when no weight column is given.
pub const DEFAULT_WEIGHT_ATTRIBUTE: &str = "weight";

/// A node and its attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub id: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: Attributes,
}

/// A (possibly parallel) edge and its attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub source: String,
    pub target: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: Attributes,
}

impl EdgeRecord {
    /// Return `true` if the edge starts and ends at the same node.
    #[must_use]
    pub fn is_self_loop(&self) -> bool {
        self.source == self.target
    }

    /// Resolve this edge's weight.
    ///
    /// Uses the `weight_column` attribute when given and numeric on this
    /// edge, else the `weight` attribute when numeric, else `1.0`. A column
    /// that is absent (or non-numeric) on this edge is not an error.
    #[must_use]
    pub fn weight(&self, weight_column: Option<&str>) -> f64 {
        weight_column
            .and_then(|col| self.attributes.get(col))
            .and_then(numeric)
            .or_else(|| {
                self.attributes
                    .get(DEFAULT_WEIGHT_ATTRIBUTE)
                    .and_then(numeric)
            })
            .unwrap_or(1.0)
    }
}

/// Whether edge weights express connection strength or traversal cost.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeightMeaning {
    /// Larger weight = stronger tie (e.g. number of letters exchanged).
    #[default]
    Strength,
    /// Larger weight = longer distance (e.g. travel time).
    Cost,
}

impl WeightMeaning {
    /// Parse a user-supplied value (`strength`/`cost`, plus the legacy
    /// boolean spelling where `true` means cost).
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "strength" | "false" => Some(Self::Strength),
            "cost" | "distance" | "true" => Some(Self::Cost),
            _ => None,
        }
    }
}

/// Serialized form of [`NetworkData`]; validated on the way in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkRepr {
    #[serde(default)]
    directed: bool,
    #[serde(default)]
    nodes: Vec<NodeRecord>,
    #[serde(default)]
    edges: Vec<EdgeRecord>,
}

/// Nodes and edges of a network, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "NetworkRepr", into = "NetworkRepr")]
pub struct NetworkData {
    directed: bool,
    nodes: Vec<NodeRecord>,
    edges: Vec<EdgeRecord>,
    index: HashMap<String, usize>,
}

impl TryFrom<NetworkRepr> for NetworkData {
    type Error = NetrankError;

    fn try_from(repr: NetworkRepr) -> Result<Self> {
        let mut network = Self::new(repr.directed);
        for node in repr.nodes {
            if network.index.contains_key(&node.id) {
                return Err(NetrankError::invalid_input(
                    "nodes",
                    format!("duplicate node id '{}'", node.id),
                ));
            }
            network.index.insert(node.id.clone(), network.nodes.len());
            network.nodes.push(node);
        }
        for edge in repr.edges {
            network.add_edge(edge.source, edge.target, edge.attributes);
        }
        Ok(network)
    }
}

impl From<NetworkData> for NetworkRepr {
    fn from(network: NetworkData) -> Self {
        Self {
            directed: network.directed,
            nodes: network.nodes,
            edges: network.edges,
        }
    }
}

impl NetworkData {
    /// Create an empty network.
    #[must_use]
    pub fn new(directed: bool) -> Self {
        Self {
            directed,
            nodes: Vec::new(),
            edges: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Whether edges carry direction.
    #[must_use]
    pub const fn is_directed(&self) -> bool {
        self.directed
    }

    #[must_use]
    pub fn nodes(&self) -> &[NodeRecord] {
        &self.nodes
    }

    #[must_use]
    pub fn edges(&self) -> &[EdgeRecord] {
        &self.edges
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Node identifiers in insertion order.
    pub fn node_ids(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(|n| n.id.as_str())
    }

    #[must_use]
    pub fn contains_node(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Position of a node in insertion order.
    #[must_use]
    pub fn node_position(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    #[must_use]
    pub fn node(&self, id: &str) -> Option<&NodeRecord> {
        self.node_position(id).map(|i| &self.nodes[i])
    }

    /// Add a node, or return the existing one with the same id.
    pub fn add_node(&mut self, id: impl Into<String>) -> &mut NodeRecord {
        let id = id.into();
        let pos = match self.index.get(&id) {
            Some(&pos) => pos,
            None => {
                let pos = self.nodes.len();
                self.index.insert(id.clone(), pos);
                self.nodes.push(NodeRecord {
                    id,
                    attributes: Attributes::new(),
                });
                pos
            }
        };
        &mut self.nodes[pos]
    }

    /// Add an edge. Endpoints that are not yet nodes are added.
    pub fn add_edge(
        &mut self,
        source: impl Into<String>,
        target: impl Into<String>,
        attributes: Attributes,
    ) {
        let source = source.into();
        let target = target.into();
        self.add_node(source.clone());
        self.add_node(target.clone());
        self.edges.push(EdgeRecord {
            source,
            target,
            attributes,
        });
    }

    /// Set one attribute on one node.
    ///
    /// # Errors
    ///
    /// Returns [`NetrankError::UnknownNode`] if the node does not exist.
    pub fn set_node_attribute(&mut self, id: &str, key: &str, value: Value) -> Result<()> {
        let pos = self
            .node_position(id)
            .ok_or_else(|| NetrankError::UnknownNode(id.to_string()))?;
        self.nodes[pos].attributes.insert(key.to_string(), value);
        Ok(())
    }

    /// Set `key` on every node named in `values`. Nodes not named are left
    /// untouched; names that are not nodes are ignored.
    pub fn set_node_attributes<K, I>(&mut self, key: &str, values: I)
    where
        K: AsRef<str>,
        I: IntoIterator<Item = (K, Value)>,
    {
        let mut skipped = 0usize;
        for (id, value) in values {
            match self.index.get(id.as_ref()) {
                Some(&pos) => {
                    self.nodes[pos].attributes.insert(key.to_string(), value);
                }
                None => skipped += 1,
            }
        }
        if skipped > 0 {
            debug!(key, skipped, "ignored attribute values for unknown nodes");
        }
    }

    /// Network restricted to `keep`: nodes in the set, and edges with both
    /// endpoints in the set. Order is preserved.
    #[must_use]
    pub fn subgraph(&self, keep: &HashSet<&str>) -> Self {
        let mut out = Self::new(self.directed);
        for node in self.nodes.iter().filter(|n| keep.contains(n.id.as_str())) {
            out.index.insert(node.id.clone(), out.nodes.len());
            out.nodes.push(node.clone());
        }
        out.edges = self
            .edges
            .iter()
            .filter(|e| keep.contains(e.source.as_str()) && keep.contains(e.target.as_str()))
            .cloned()
            .collect();
        out
    }

    /// Network without the nodes in `drop` and without any edge touching
    /// them.
    #[must_use]
    pub fn without_nodes(&self, drop: &HashSet<&str>) -> Self {
        let keep: HashSet<&str> = self
            .node_ids()
            .filter(|id| !drop.contains(id))
            .collect();
        self.subgraph(&keep)
    }

    /// Names of all attributes present on any edge, sorted.
    #[must_use]
    pub fn edge_attribute_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .edges
            .iter()
            .flat_map(|e| e.attributes.keys().map(String::as_str))
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        names.sort_unstable();
        names
    }

    /// BLAKE3 hash of the canonical JSON form.
    ///
    /// Two networks with the same nodes, edges, attributes and order hash
    /// identically.
    #[must_use]
    pub fn content_hash(&self) -> String {
        let repr = NetworkRepr::from(self.clone());
        // Attribute maps are BTreeMaps, so the encoding is canonical.
        let bytes = serde_json::to_vec(&repr).unwrap_or_default();
        format!("blake3:{}", blake3::hash(&bytes).to_hex())
    }

    // -----------------------------------------------------------------------
    // JSON I/O
    // -----------------------------------------------------------------------

    /// Parse network JSON from a reader.
    ///
    /// # Errors
    ///
    /// Returns an error for malformed JSON or duplicate node ids.
    pub fn from_json_reader<R: std::io::Read>(reader: R) -> Result<Self> {
        let repr: NetworkRepr = serde_json::from_reader(reader)?;
        Self::try_from(repr)
    }

    /// Read network JSON from a file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn read_json_path(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path).map_err(|e| NetrankError::io(path, e))?;
        Self::from_json_reader(std::io::BufReader::new(file))
    }

    /// Write pretty-printed network JSON to a file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn write_json_path(&self, path: &Path) -> Result<()> {
        let file = std::fs::File::create(path).map_err(|e| NetrankError::io(path, e))?;
        serde_json::to_writer_pretty(std::io::BufWriter::new(file), self)?;
        Ok(())
    }
}

/// Numeric view of an attribute value. Numeric strings count, so weights
/// read from CSV or GML text still resolve.
#[must_use]
pub fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Bool(_) | Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn attrs(pairs: &[(&str, Value)]) -> Attributes {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn add_edge_creates_missing_nodes_in_order() {
        let mut n = NetworkData::new(false);
        n.add_edge("B", "A", Attributes::new());
        n.add_edge("A", "C", Attributes::new());
        assert_eq!(n.node_ids().collect::<Vec<_>>(), vec!["B", "A", "C"]);
        assert_eq!(n.edge_count(), 2);
    }

    #[test]
    fn parallel_edges_are_kept() {
        let mut n = NetworkData::new(true);
        n.add_edge("A", "B", Attributes::new());
        n.add_edge("A", "B", Attributes::new());
        assert_eq!(n.edge_count(), 2);
        assert_eq!(n.node_count(), 2);
    }

    #[test]
    fn weight_prefers_column_then_weight_then_one() {
        let e = EdgeRecord {
            source: "A".into(),
            target: "B".into(),
            attributes: attrs(&[("letters", json!(4)), ("weight", json!(2.5))]),
        };
        assert!((e.weight(Some("letters")) - 4.0).abs() < f64::EPSILON);
        assert!((e.weight(Some("missing")) - 2.5).abs() < f64::EPSILON);
        assert!((e.weight(None) - 2.5).abs() < f64::EPSILON);

        let bare = EdgeRecord {
            source: "A".into(),
            target: "B".into(),
            attributes: Attributes::new(),
        };
        assert!((bare.weight(Some("letters")) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn non_numeric_weight_falls_through() {
        let e = EdgeRecord {
            source: "A".into(),
            target: "B".into(),
            attributes: attrs(&[("kind", json!("letter")), ("weight", json!("3"))]),
        };
        assert!((e.weight(Some("kind")) - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn weight_meaning_parses_legacy_booleans() {
        assert_eq!(WeightMeaning::parse("cost"), Some(WeightMeaning::Cost));
        assert_eq!(WeightMeaning::parse("TRUE"), Some(WeightMeaning::Cost));
        assert_eq!(WeightMeaning::parse("false"), Some(WeightMeaning::Strength));
        assert_eq!(WeightMeaning::parse("heavy"), None);
    }

    #[test]
    fn json_round_trip_preserves_order_and_attributes() {
        let text = r#"{
            "directed": true,
            "nodes": [{"id": "Z"}, {"id": "A", "attributes": {"label": "Alice"}}],
            "edges": [{"source": "Z", "target": "A", "attributes": {"weight": 2}}]
        }"#;
        let n = NetworkData::from_json_reader(text.as_bytes()).expect("parse");
        assert!(n.is_directed());
        assert_eq!(n.node_ids().collect::<Vec<_>>(), vec!["Z", "A"]);
        assert_eq!(n.node("A").expect("A").attributes["label"], json!("Alice"));

        let encoded = serde_json::to_string(&n).expect("encode");
        let back = NetworkData::from_json_reader(encoded.as_bytes()).expect("reparse");
        assert_eq!(back, n);
        assert_eq!(back.content_hash(), n.content_hash());
    }

    #[test]
    fn duplicate_node_ids_are_rejected() {
        let text = r#"{"nodes": [{"id": "A"}, {"id": "A"}]}"#;
        let err = NetworkData::from_json_reader(text.as_bytes()).expect_err("dup");
        assert!(err.to_string().contains("duplicate node id 'A'"));
    }

    #[test]
    fn subgraph_and_complement_split_edges() {
        let mut n = NetworkData::new(false);
        n.add_edge("A", "B", Attributes::new());
        n.add_edge("C", "D", Attributes::new());
        let keep: HashSet<&str> = ["A", "B"].into_iter().collect();

        let inside = n.subgraph(&keep);
        assert_eq!(inside.node_ids().collect::<Vec<_>>(), vec!["A", "B"]);
        assert_eq!(inside.edge_count(), 1);

        let outside = n.without_nodes(&keep);
        assert_eq!(outside.node_ids().collect::<Vec<_>>(), vec!["C", "D"]);
        assert_eq!(outside.edge_count(), 1);
        assert!(outside.contains_node("C"));
        assert!(!outside.contains_node("A"));
    }

    #[test]
    fn set_node_attributes_ignores_unknown_nodes() {
        let mut n = NetworkData::new(false);
        n.add_node("A");
        n.set_node_attributes("Score", [("A", json!(1.5)), ("ghost", json!(9))]);
        assert_eq!(n.node("A").expect("A").attributes["Score"], json!(1.5));
        assert!(n.set_node_attribute("ghost", "Score", json!(1)).is_err());
    }

    #[test]
    fn content_hash_changes_with_edges() {
        let mut n = NetworkData::new(false);
        n.add_edge("A", "B", Attributes::new());
        let before = n.content_hash();
        n.add_edge("B", "C", Attributes::new());
        assert_ne!(before, n.content_hash());
        assert!(before.starts_with("blake3:"));
    }
}
