//! GML (Graph Modelling Language) reader.
//!
//! # Overview
//!
//! GML is a nested key/value format:
//!
//! ```text
//! graph [
//!   directed 0
//!   node [ id 0 label "Alice" ]
//!   node [ id 1 label "Bob" ]
//!   edge [ source 0 target 1 weight 2.5 ]
//! ]
//! ```
//!
//! [`read_gml`] parses a document into [`NetworkData`]. Node identity is
//! taken from the attribute named by `label` (default `"label"`); pass
//! `Some("id")` or `None` to use the numeric `id` instead. Edge endpoints
//! refer to node `id`s and are mapped to the chosen identity.
//!
//! Parallel edges are only accepted when the graph declares `multigraph 1`.
//! Remaining keys become node and edge attributes; nested lists become JSON
//! objects and repeated keys become arrays.

use std::collections::HashMap;
use std::path::Path;

use serde_json::{Map, Number, Value};
use tracing::{debug, instrument};

use crate::error::{NetrankError, Result};
use crate::network::{Attributes, NetworkData};

/// Default node attribute holding the node identity.
pub const DEFAULT_LABEL_ATTRIBUTE: &str = "label";

const FORMAT: &str = "GML";

// ---------------------------------------------------------------------------
// Tokenizer
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Key(String),
    Int(i64),
    Float(f64),
    Str(String),
    Open,
    Close,
}

struct Lexer<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    line: usize,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars().peekable(),
            line: 1,
        }
    }

    fn error(&self, reason: impl Into<String>) -> NetrankError {
        NetrankError::Parse {
            format: FORMAT,
            line: self.line,
            reason: reason.into(),
        }
    }

    fn skip_trivia(&mut self) {
        while let Some(&c) = self.chars.peek() {
            if c == '\n' {
                self.line += 1;
                self.chars.next();
            } else if c.is_whitespace() {
                self.chars.next();
            } else if c == '#' {
                while let Some(&c) = self.chars.peek() {
                    if c == '\n' {
                        break;
                    }
                    self.chars.next();
                }
            } else {
                break;
            }
        }
    }

    /// Next token and the line it started on.
    fn next_token(&mut self) -> Result<Option<(Token, usize)>> {
        self.skip_trivia();
        let line = self.line;
        let Some(&c) = self.chars.peek() else {
            return Ok(None);
        };

        let token = match c {
            '[' => {
                self.chars.next();
                Token::Open
            }
            ']' => {
                self.chars.next();
                Token::Close
            }
            '"' => {
                self.chars.next();
                Token::Str(self.string()?)
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let mut key = String::new();
                while let Some(&c) = self.chars.peek() {
                    if c.is_ascii_alphanumeric() || c == '_' {
                        key.push(c);
                        self.chars.next();
                    } else {
                        break;
                    }
                }
                match key.as_str() {
                    "INF" => Token::Float(f64::INFINITY),
                    "NAN" => Token::Float(f64::NAN),
                    _ => Token::Key(key),
                }
            }
            c if c.is_ascii_digit() || c == '-' || c == '+' || c == '.' => self.number()?,
            other => return Err(self.error(format!("unexpected character '{other}'"))),
        };

        Ok(Some((token, line)))
    }

    fn string(&mut self) -> Result<String> {
        let mut raw = String::new();
        loop {
            match self.chars.next() {
                Some('"') => return Ok(unescape(&raw)),
                Some(c) => {
                    if c == '\n' {
                        self.line += 1;
                    }
                    raw.push(c);
                }
                None => return Err(self.error("unterminated string")),
            }
        }
    }

    fn number(&mut self) -> Result<Token> {
        let mut raw = String::new();
        while let Some(&c) = self.chars.peek() {
            if c.is_ascii_digit() || matches!(c, '-' | '+' | '.' | 'e' | 'E') {
                raw.push(c);
                self.chars.next();
            } else {
                break;
            }
        }
        // Signed infinities are written `-INF` / `+INF`.
        if (raw == "-" || raw == "+") && self.chars.peek() == Some(&'I') {
            let mut word = String::new();
            while let Some(&c) = self.chars.peek() {
                if c.is_ascii_alphabetic() {
                    word.push(c);
                    self.chars.next();
                } else {
                    break;
                }
            }
            if word == "INF" {
                let inf = if raw == "-" {
                    f64::NEG_INFINITY
                } else {
                    f64::INFINITY
                };
                return Ok(Token::Float(inf));
            }
            return Err(self.error(format!("invalid number '{raw}{word}'")));
        }
        if let Ok(i) = raw.parse::<i64>() {
            return Ok(Token::Int(i));
        }
        raw.parse::<f64>()
            .map(Token::Float)
            .map_err(|_| self.error(format!("invalid number '{raw}'")))
    }
}

/// Decode the XML character entities GML writers use inside strings.
fn unescape(raw: &str) -> String {
    if !raw.contains('&') {
        return raw.to_string();
    }
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(start) = rest.find('&') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        let Some(end) = tail.find(';') else {
            out.push_str(tail);
            return out;
        };
        let entity = &tail[1..end];
        let decoded = match entity {
            "amp" => Some('&'),
            "quot" => Some('"'),
            "lt" => Some('<'),
            "gt" => Some('>'),
            "apos" => Some('\''),
            _ => entity
                .strip_prefix("#x")
                .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                .or_else(|| entity.strip_prefix('#').and_then(|d| d.parse().ok()))
                .and_then(char::from_u32),
        };
        match decoded {
            Some(c) => out.push(c),
            None => out.push_str(&tail[..=end]),
        }
        rest = &tail[end + 1..];
    }
    out.push_str(rest);
    out
}

// ---------------------------------------------------------------------------
// Parser
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
enum GmlValue {
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<(String, GmlValue, usize)>),
}

impl GmlValue {
    fn to_json(&self) -> Value {
        match self {
            Self::Int(i) => Value::from(*i),
            Self::Float(f) => Number::from_f64(*f).map_or(Value::Null, Value::Number),
            Self::Str(s) => Value::String(s.clone()),
            Self::List(items) => {
                let mut map = Map::new();
                for (key, value, _) in items {
                    insert_attribute(&mut map, key, value.to_json());
                }
                Value::Object(map)
            }
        }
    }

    /// Text form used when a value becomes a node identity.
    fn to_identity(&self) -> Option<String> {
        match self {
            Self::Int(i) => Some(i.to_string()),
            Self::Float(f) => Some(f.to_string()),
            Self::Str(s) => Some(s.clone()),
            Self::List(_) => None,
        }
    }
}

fn insert_attribute(map: &mut Map<String, Value>, key: &str, value: Value) {
    match map.get_mut(key) {
        Some(Value::Array(existing)) => existing.push(value),
        Some(existing) => {
            let first = existing.take();
            *existing = Value::Array(vec![first, value]);
        }
        None => {
            map.insert(key.to_string(), value);
        }
    }
}

fn parse_list(lexer: &mut Lexer<'_>, nested: bool) -> Result<Vec<(String, GmlValue, usize)>> {
    let mut items = Vec::new();
    loop {
        let Some((token, line)) = lexer.next_token()? else {
            if nested {
                return Err(lexer.error("unexpected end of input, expected ']'"));
            }
            return Ok(items);
        };

        let key = match token {
            Token::Key(key) => key,
            Token::Close if nested => return Ok(items),
            other => {
                return Err(NetrankError::Parse {
                    format: FORMAT,
                    line,
                    reason: format!("expected a key, found {other:?}"),
                });
            }
        };

        let Some((token, line)) = lexer.next_token()? else {
            return Err(lexer.error(format!("key '{key}' has no value")));
        };
        let value = match token {
            Token::Int(i) => GmlValue::Int(i),
            Token::Float(f) => GmlValue::Float(f),
            Token::Str(s) => GmlValue::Str(s),
            Token::Open => GmlValue::List(parse_list(lexer, true)?),
            other => {
                return Err(NetrankError::Parse {
                    format: FORMAT,
                    line,
                    reason: format!("key '{key}' has invalid value {other:?}"),
                });
            }
        };
        items.push((key, value, line));
    }
}

fn flag(items: &[(String, GmlValue, usize)], key: &str) -> bool {
    items
        .iter()
        .find(|(k, _, _)| k == key)
        .is_some_and(|(_, v, _)| matches!(v, GmlValue::Int(1)))
}

fn take_attr<'v>(
    items: &'v [(String, GmlValue, usize)],
    key: &str,
) -> Option<&'v GmlValue> {
    items.iter().find(|(k, _, _)| k == key).map(|(_, v, _)| v)
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Parse a GML document into [`NetworkData`].
///
/// `label` names the node attribute that holds node identity. `None` or
/// `Some("id")` uses the GML `id`.
///
/// # Errors
///
/// Returns [`NetrankError::Parse`] for syntax errors, a missing `graph`
/// block, nodes without `id` or label attribute, duplicate identities,
/// edges referring to unknown ids, or duplicate edges in a non-multigraph.
#[instrument(skip(input), fields(bytes = input.len()))]
pub fn read_gml(input: &str, label: Option<&str>) -> Result<NetworkData> {
    let mut lexer = Lexer::new(input);
    let top = parse_list(&mut lexer, false)?;

    let mut graphs = top.iter().filter(|(k, _, _)| k == "graph");
    let Some((_, graph, graph_line)) = graphs.next() else {
        return Err(NetrankError::Parse {
            format: FORMAT,
            line: 1,
            reason: "input contains no 'graph' block".to_string(),
        });
    };
    if let Some((_, _, line)) = graphs.next() {
        return Err(NetrankError::Parse {
            format: FORMAT,
            line: *line,
            reason: "input contains more than one 'graph' block".to_string(),
        });
    }
    let GmlValue::List(items) = graph else {
        return Err(NetrankError::Parse {
            format: FORMAT,
            line: *graph_line,
            reason: "'graph' must be a list".to_string(),
        });
    };

    let directed = flag(items, "directed");
    let multigraph = flag(items, "multigraph");
    let label = label.filter(|l| *l != "id");

    let mut network = NetworkData::new(directed);
    let mut id_to_name: HashMap<String, String> = HashMap::new();

    for (position, (_, node, line)) in items.iter().filter(|(k, _, _)| k == "node").enumerate() {
        let parse_err = |reason: String| NetrankError::Parse {
            format: FORMAT,
            line: *line,
            reason,
        };
        let GmlValue::List(fields) = node else {
            return Err(parse_err(format!("node #{position} is not a list")));
        };

        let id = take_attr(fields, "id")
            .and_then(GmlValue::to_identity)
            .ok_or_else(|| parse_err(format!("node #{position} has no 'id' attribute")))?;

        let name = match label {
            Some(key) => take_attr(fields, key)
                .and_then(GmlValue::to_identity)
                .ok_or_else(|| {
                    parse_err(format!("node #{position} has no '{key}' attribute"))
                })?,
            None => id.clone(),
        };

        if id_to_name.contains_key(&id) {
            return Err(parse_err(format!("node id {id} is duplicated")));
        }
        if network.contains_node(&name) {
            return Err(parse_err(format!("node label '{name}' is duplicated")));
        }

        let mut attributes = Map::new();
        for (key, value, _) in fields {
            if key == "id" || Some(key.as_str()) == label {
                continue;
            }
            insert_attribute(&mut attributes, key, value.to_json());
        }
        network.add_node(name.clone()).attributes = attributes.into_iter().collect();
        id_to_name.insert(id, name);
    }

    let mut seen_pairs: std::collections::HashSet<(String, String)> =
        std::collections::HashSet::new();

    for (position, (_, edge, line)) in items.iter().filter(|(k, _, _)| k == "edge").enumerate() {
        let parse_err = |reason: String| NetrankError::Parse {
            format: FORMAT,
            line: *line,
            reason,
        };
        let GmlValue::List(fields) = edge else {
            return Err(parse_err(format!("edge #{position} is not a list")));
        };

        let endpoint = |key: &str| -> Result<String> {
            let id = take_attr(fields, key)
                .and_then(GmlValue::to_identity)
                .ok_or_else(|| parse_err(format!("edge #{position} has no '{key}' attribute")))?;
            id_to_name.get(&id).cloned().ok_or_else(|| {
                parse_err(format!("edge #{position} refers to unknown node id {id}"))
            })
        };
        let source = endpoint("source")?;
        let target = endpoint("target")?;

        if !multigraph {
            let pair = if directed || source <= target {
                (source.clone(), target.clone())
            } else {
                (target.clone(), source.clone())
            };
            if !seen_pairs.insert(pair) {
                return Err(parse_err(format!(
                    "edge #{position} ({source} -> {target}) is duplicated; \
                     declare 'multigraph 1' to allow parallel edges"
                )));
            }
        }

        let mut attributes = Map::new();
        for (key, value, _) in fields {
            if matches!(key.as_str(), "source" | "target" | "key") {
                continue;
            }
            insert_attribute(&mut attributes, key, value.to_json());
        }
        let attributes: Attributes = attributes.into_iter().collect();
        network.add_edge(source, target, attributes);
    }

    debug!(
        nodes = network.node_count(),
        edges = network.edge_count(),
        directed,
        multigraph,
        "parsed GML network"
    );
    Ok(network)
}

/// Read and parse a GML file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not valid GML.
pub fn read_gml_path(path: &Path, label: Option<&str>) -> Result<NetworkData> {
    let text = std::fs::read_to_string(path).map_err(|e| NetrankError::io(path, e))?;
    read_gml(&text, label)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const KARATE_SNIPPET: &str = r#"
Creator "hand written"
graph
[
  directed 0
  node [ id 0 label "Alice" club "Mr. Hi" ]
  node [ id 1 label "Bob" club "Officer" ]
  node [ id 2 label "Carol" ]
  edge [ source 0 target 1 weight 2 ]
  edge [ source 1 target 2 ]
]
"#;

    #[test]
    fn parses_nodes_with_labels_as_identity() {
        let n = read_gml(KARATE_SNIPPET, Some(DEFAULT_LABEL_ATTRIBUTE)).expect("parse");
        assert_eq!(n.node_ids().collect::<Vec<_>>(), vec!["Alice", "Bob", "Carol"]);
        assert!(!n.is_directed());
        let alice = n.node("Alice").expect("Alice");
        assert_eq!(alice.attributes["club"], json!("Mr. Hi"));
        assert!(!alice.attributes.contains_key("label"));
        assert!(!alice.attributes.contains_key("id"));
    }

    #[test]
    fn edges_are_mapped_to_labels() {
        let n = read_gml(KARATE_SNIPPET, Some("label")).expect("parse");
        let edges: Vec<_> = n
            .edges()
            .iter()
            .map(|e| (e.source.as_str(), e.target.as_str()))
            .collect();
        assert_eq!(edges, vec![("Alice", "Bob"), ("Bob", "Carol")]);
        assert_eq!(n.edges()[0].attributes["weight"], json!(2));
    }

    #[test]
    fn id_label_uses_numeric_ids() {
        let n = read_gml(KARATE_SNIPPET, Some("id")).expect("parse");
        assert_eq!(n.node_ids().collect::<Vec<_>>(), vec!["0", "1", "2"]);
        // The label attribute is kept when it is not the identity.
        assert_eq!(n.node("0").expect("0").attributes["label"], json!("Alice"));

        let same = read_gml(KARATE_SNIPPET, None).expect("parse");
        assert_eq!(same, n);
    }

    #[test]
    fn missing_label_attribute_is_error() {
        let doc = "graph [ node [ id 0 ] ]";
        let err = read_gml(doc, Some("label")).expect_err("no label");
        assert!(err.to_string().contains("has no 'label' attribute"));
    }

    #[test]
    fn duplicate_edge_needs_multigraph() {
        let doc = "graph [ node [ id 0 ] node [ id 1 ] edge [ source 0 target 1 ] edge [ source 1 target 0 ] ]";
        let err = read_gml(doc, None).expect_err("duplicate undirected edge");
        assert!(err.to_string().contains("duplicated"));

        let multi = "graph [ multigraph 1 node [ id 0 ] node [ id 1 ] edge [ source 0 target 1 ] edge [ source 1 target 0 ] ]";
        let n = read_gml(multi, None).expect("multigraph allows parallel edges");
        assert_eq!(n.edge_count(), 2);
    }

    #[test]
    fn directed_reverse_edge_is_not_duplicate() {
        let doc = "graph [ directed 1 node [ id 0 ] node [ id 1 ] edge [ source 0 target 1 ] edge [ source 1 target 0 ] ]";
        let n = read_gml(doc, None).expect("distinct directed edges");
        assert!(n.is_directed());
        assert_eq!(n.edge_count(), 2);
    }

    #[test]
    fn unknown_edge_endpoint_reports_line() {
        let doc = "graph [\n node [ id 0 ]\n edge [ source 0 target 7 ]\n]";
        match read_gml(doc, None) {
            Err(NetrankError::Parse { line, reason, .. }) => {
                assert_eq!(line, 3);
                assert!(reason.contains("unknown node id 7"));
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn nested_lists_and_comments() {
        let doc = r#"
# a comment line
graph [
  node [ id 1 label "x" graphics [ x 1.5 y -2.0 ] ]
]"#;
        let n = read_gml(doc, Some("label")).expect("parse");
        assert_eq!(
            n.node("x").expect("x").attributes["graphics"],
            json!({"x": 1.5, "y": -2.0})
        );
    }

    #[test]
    fn entities_are_decoded() {
        let doc = r#"graph [ node [ id 0 label "Tom &amp; Jerry &#233;" ] ]"#;
        let n = read_gml(doc, Some("label")).expect("parse");
        assert!(n.contains_node("Tom & Jerry é"));
    }

    #[test]
    fn unterminated_list_is_error() {
        let err = read_gml("graph [ node [ id 0 ]", None).expect_err("unterminated");
        assert!(err.to_string().contains("expected ']'"));
    }

    #[test]
    fn missing_graph_block_is_error() {
        let err = read_gml("Creator \"me\"", None).expect_err("no graph");
        assert!(err.to_string().contains("no 'graph' block"));
    }
}
