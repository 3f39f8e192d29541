//! Operation values and typed input/output maps.
//!
//! Every operation input and output is a [`Value`]. Payloads are read back
//! through explicit accessors ([`Value::as_network`], [`ValueMap::table`],
//! ...) that fail with a descriptive error naming the field when the value
//! is missing or of the wrong kind.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use netrank_core::{NetrankError, NetworkData, Result, Table};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ValueType
// ---------------------------------------------------------------------------

/// The kinds of value an operation can take or produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    Network,
    Table,
    List,
    String,
    Integer,
    Boolean,
}

/// Error returned when parsing an unknown value type name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownValueType {
    pub raw: String,
}

impl fmt::Display for UnknownValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown value type '{}': expected one of network, table, list, string, \
             integer, boolean",
            self.raw
        )
    }
}

impl std::error::Error for UnknownValueType {}

impl ValueType {
    pub const ALL: [Self; 6] = [
        Self::Network,
        Self::Table,
        Self::List,
        Self::String,
        Self::Integer,
        Self::Boolean,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::Table => "table",
            Self::List => "list",
            Self::String => "string",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ValueType {
    type Err = UnknownValueType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| UnknownValueType { raw: s.to_string() })
    }
}

impl Serialize for ValueType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ValueType {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_str(&s).map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Value
// ---------------------------------------------------------------------------

/// One operation input or output.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Value {
    Network(NetworkData),
    Table(Table),
    /// JSON items; nested lists are allowed.
    List(Vec<serde_json::Value>),
    String(String),
    Integer(i64),
    Boolean(bool),
}

impl Value {
    #[must_use]
    pub const fn value_type(&self) -> ValueType {
        match self {
            Self::Network(_) => ValueType::Network,
            Self::Table(_) => ValueType::Table,
            Self::List(_) => ValueType::List,
            Self::String(_) => ValueType::String,
            Self::Integer(_) => ValueType::Integer,
            Self::Boolean(_) => ValueType::Boolean,
        }
    }

    #[must_use]
    pub const fn as_network(&self) -> Option<&NetworkData> {
        match self {
            Self::Network(n) => Some(n),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_table(&self) -> Option<&Table> {
        match self {
            Self::Table(t) => Some(t),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_list(&self) -> Option<&[serde_json::Value]> {
        match self {
            Self::List(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_boolean(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Parse command-line text into a value of type `ty`.
    ///
    /// Lists are JSON arrays. Network and table values are not parsed from
    /// text; callers load them from files.
    ///
    /// # Errors
    ///
    /// Returns [`NetrankError::InvalidInput`] naming `field` when `raw` does
    /// not parse as `ty`.
    pub fn parse_scalar(field: &str, ty: ValueType, raw: &str) -> Result<Self> {
        match ty {
            ValueType::String => Ok(Self::String(raw.to_string())),
            ValueType::Integer => raw
                .trim()
                .parse::<i64>()
                .map(Self::Integer)
                .map_err(|_| NetrankError::invalid_input(field, format!("'{raw}' is not an integer"))),
            ValueType::Boolean => match raw.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" | "1" => Ok(Self::Boolean(true)),
                "false" | "no" | "0" => Ok(Self::Boolean(false)),
                _ => Err(NetrankError::invalid_input(
                    field,
                    format!("'{raw}' is not a boolean"),
                )),
            },
            ValueType::List => match serde_json::from_str::<serde_json::Value>(raw) {
                Ok(serde_json::Value::Array(items)) => Ok(Self::List(items)),
                _ => Err(NetrankError::invalid_input(
                    field,
                    "expected a JSON array, e.g. [[\"a\"],[\"b\"]]",
                )),
            },
            ValueType::Network | ValueType::Table => Err(NetrankError::invalid_input(
                field,
                format!("a {ty} cannot be given inline; pass a file path"),
            )),
        }
    }
}

impl From<NetworkData> for Value {
    fn from(n: NetworkData) -> Self {
        Self::Network(n)
    }
}

impl From<Table> for Value {
    fn from(t: Table) -> Self {
        Self::Table(t)
    }
}

impl From<Vec<serde_json::Value>> for Value {
    fn from(items: Vec<serde_json::Value>) -> Self {
        Self::List(items)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

// ---------------------------------------------------------------------------
// ValueMap
// ---------------------------------------------------------------------------

/// Named values passed into or returned from an operation.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ValueMap {
    values: BTreeMap<String, Value>,
}

impl ValueMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, returning the previous one under `name`.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.values.insert(name.into(), value.into())
    }

    /// Builder-style [`ValueMap::insert`].
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.values.remove(name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// The value under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`NetrankError::MissingInput`] when absent.
    pub fn require(&self, name: &str) -> Result<&Value> {
        self.values.get(name).ok_or_else(|| NetrankError::MissingInput {
            field: name.to_string(),
        })
    }

    /// Network value under `name`.
    ///
    /// # Errors
    ///
    /// Missing or not a network.
    pub fn network(&self, name: &str) -> Result<&NetworkData> {
        let value = self.require(name)?;
        value
            .as_network()
            .ok_or_else(|| type_error(name, ValueType::Network, value))
    }

    /// Table value under `name`.
    ///
    /// # Errors
    ///
    /// Missing or not a table.
    pub fn table(&self, name: &str) -> Result<&Table> {
        let value = self.require(name)?;
        value
            .as_table()
            .ok_or_else(|| type_error(name, ValueType::Table, value))
    }

    /// List value under `name`.
    ///
    /// # Errors
    ///
    /// Missing or not a list.
    pub fn list(&self, name: &str) -> Result<&[serde_json::Value]> {
        let value = self.require(name)?;
        value
            .as_list()
            .ok_or_else(|| type_error(name, ValueType::List, value))
    }

    /// String value under `name`.
    ///
    /// # Errors
    ///
    /// Missing or not a string.
    pub fn string(&self, name: &str) -> Result<&str> {
        let value = self.require(name)?;
        value
            .as_str()
            .ok_or_else(|| type_error(name, ValueType::String, value))
    }

    /// Integer value under `name`.
    ///
    /// # Errors
    ///
    /// Missing or not an integer.
    pub fn integer(&self, name: &str) -> Result<i64> {
        let value = self.require(name)?;
        value
            .as_integer()
            .ok_or_else(|| type_error(name, ValueType::Integer, value))
    }

    /// Boolean value under `name`.
    ///
    /// # Errors
    ///
    /// Missing or not a boolean.
    pub fn boolean(&self, name: &str) -> Result<bool> {
        let value = self.require(name)?;
        value
            .as_boolean()
            .ok_or_else(|| type_error(name, ValueType::Boolean, value))
    }

    /// Optional table: `None` when absent.
    ///
    /// # Errors
    ///
    /// Present but not a table.
    pub fn opt_table(&self, name: &str) -> Result<Option<&Table>> {
        self.optional(name, |m| m.table(name))
    }

    /// Optional string: `None` when absent.
    ///
    /// # Errors
    ///
    /// Present but not a string.
    pub fn opt_string(&self, name: &str) -> Result<Option<&str>> {
        self.optional(name, |m| m.string(name))
    }

    /// Optional integer: `None` when absent.
    ///
    /// # Errors
    ///
    /// Present but not an integer.
    pub fn opt_integer(&self, name: &str) -> Result<Option<i64>> {
        self.optional(name, |m| m.integer(name))
    }

    /// Optional boolean: `None` when absent.
    ///
    /// # Errors
    ///
    /// Present but not a boolean.
    pub fn opt_boolean(&self, name: &str) -> Result<Option<bool>> {
        self.optional(name, |m| m.boolean(name))
    }

    fn optional<'a, T>(
        &'a self,
        name: &str,
        get: impl FnOnce(&'a Self) -> Result<T>,
    ) -> Result<Option<T>> {
        if self.contains(name) {
            get(self).map(Some)
        } else {
            Ok(None)
        }
    }
}

fn type_error(name: &str, expected: ValueType, actual: &Value) -> NetrankError {
    NetrankError::InputType {
        field: name.to_string(),
        expected: expected.as_str(),
        actual: actual.value_type().as_str(),
    }
}

impl FromIterator<(String, Value)> for ValueMap {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for ValueMap {
    type Item = (String, Value);
    type IntoIter = std::collections::btree_map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}
