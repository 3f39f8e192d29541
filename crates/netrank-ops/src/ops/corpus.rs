//! Corpus table helpers for the topic-modelling dashboard
//! (`playground.tm_dash.*`).
//!
//! Corpus tables hold one row per digitised newspaper page. File names
//! follow the pattern `<publication ref>_<YYYY-MM-DD>_<rest>`, e.g.
//! `sn86069873_1900-01-02_ed-1_seq-1_ocr.txt`.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use netrank_core::table::cell_to_string;
use netrank_core::{NetrankError, Result};
use rand::SeedableRng;
use rand::rngs::StdRng;
use regex::Regex;
use serde_json::Value;
use tracing::{debug, info, instrument};

use crate::config::{DEFAULT_SAMPLE_SIZE, SampleConfig};
use crate::operation::Operation;
use crate::schema::{DefaultValue, FieldSpec};
use crate::value::{ValueMap, ValueType};

const REF_PATTERN: &str = r"(\w+\d+)_\d{4}-\d{2}-\d{2}_";
const DATE_PATTERN: &str = r"_(\d{4}-\d{2}-\d{2})_";

/// Pandas index column dropped from samples.
const INDEX_COLUMN: &str = "__index_level_0__";

const TABLE_INPUT: FieldSpec =
    FieldSpec::required("table_input", ValueType::Table, "The corpus table.");

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| NetrankError::Internal(format!("bad pattern {pattern}: {e}")))
}

// ---------------------------------------------------------------------------
// playground.tm_dash.file_name_metadata
// ---------------------------------------------------------------------------

const METADATA_INPUTS: [FieldSpec; 2] = [
    TABLE_INPUT,
    FieldSpec::required(
        "column_name",
        ValueType::String,
        "Column holding file names.",
    ),
];

const METADATA_OUTPUTS: [FieldSpec; 2] = [
    FieldSpec::required(
        "table_output",
        ValueType::Table,
        "The corpus with 'date' and 'publication' columns, sorted by date.",
    ),
    FieldSpec::required(
        "publications_ref",
        ValueType::List,
        "Distinct publication refs in order of first appearance.",
    ),
];

/// `playground.tm_dash.file_name_metadata`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileNameMetadata;

impl Operation for FileNameMetadata {
    fn name(&self) -> &'static str {
        "playground.tm_dash.file_name_metadata"
    }

    fn doc(&self) -> &'static str {
        "Extract the publication ref and issue date from corpus file names, add them \
         as 'publication' and 'date' columns and sort the rows by date. Fails on the \
         first file name that does not follow '<ref>_<YYYY-MM-DD>_...'."
    }

    fn inputs_schema(&self) -> &'static [FieldSpec] {
        &METADATA_INPUTS
    }

    fn outputs_schema(&self) -> &'static [FieldSpec] {
        &METADATA_OUTPUTS
    }

    #[instrument(skip_all)]
    fn run(&self, inputs: &ValueMap) -> Result<ValueMap> {
        let ref_re = compile(REF_PATTERN)?;
        let date_re = compile(DATE_PATTERN)?;
        let mut table = inputs.table("table_input")?.clone();
        let column = inputs.string("column_name")?;

        let mut refs = Vec::with_capacity(table.num_rows());
        let mut dates = Vec::with_capacity(table.num_rows());
        for cell in table.column(column)? {
            let file = cell_to_string(cell);
            let invalid = || {
                NetrankError::Processing(format!(
                    "Can't process corpus, invalid format for file name: {file}"
                ))
            };
            let publication = ref_re
                .captures(&file)
                .and_then(|c| c.get(1))
                .ok_or_else(invalid)?
                .as_str()
                .to_string();
            let date = date_re
                .captures(&file)
                .and_then(|c| c.get(1))
                .and_then(|m| NaiveDate::parse_from_str(m.as_str(), "%Y-%m-%d").ok())
                .ok_or_else(invalid)?;
            refs.push(publication);
            dates.push(date);
        }

        table.set_column(
            "date",
            dates
                .iter()
                .map(|d| Value::String(d.format("%Y-%m-%d").to_string()))
                .collect(),
        )?;
        table.set_column("publication", refs.iter().cloned().map(Value::String).collect())?;

        let mut order: Vec<usize> = (0..dates.len()).collect();
        order.sort_by_key(|&i| dates[i]);
        table.reorder_rows(&order)?;

        let mut seen = HashSet::new();
        let publications: Vec<Value> = order
            .iter()
            .map(|&i| refs[i].as_str())
            .filter(|r| seen.insert(*r))
            .map(Value::from)
            .collect();

        info!(
            rows = table.num_rows(),
            publications = publications.len(),
            "extracted file name metadata"
        );
        Ok(ValueMap::new()
            .with("table_output", table)
            .with("publications_ref", publications))
    }
}

// ---------------------------------------------------------------------------
// playground.tm_dash.map_column
// ---------------------------------------------------------------------------

const MAP_INPUTS: [FieldSpec; 4] = [
    TABLE_INPUT,
    FieldSpec::required("column_name", ValueType::String, "Column to map."),
    FieldSpec::required(
        "mapping_keys",
        ValueType::List,
        "Two lists of equal length: [[from, ...], [to, ...]].",
    ),
    FieldSpec::required(
        "output_col_name",
        ValueType::String,
        "Column receiving the mapped values.",
    ),
];

const MAP_OUTPUTS: [FieldSpec; 1] = [FieldSpec::required(
    "table_output",
    ValueType::Table,
    "The table with the mapped column.",
)];

/// `playground.tm_dash.map_column`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MapColumn;

impl Operation for MapColumn {
    fn name(&self) -> &'static str {
        "playground.tm_dash.map_column"
    }

    fn doc(&self) -> &'static str {
        "Map the values of one column through a lookup ([[from...], [to...]]) into a \
         new or existing column. Values without a mapping are copied unchanged."
    }

    fn inputs_schema(&self) -> &'static [FieldSpec] {
        &MAP_INPUTS
    }

    fn outputs_schema(&self) -> &'static [FieldSpec] {
        &MAP_OUTPUTS
    }

    #[instrument(skip_all)]
    fn run(&self, inputs: &ValueMap) -> Result<ValueMap> {
        let mut table = inputs.table("table_input")?.clone();
        let column = inputs.string("column_name")?;
        let output = inputs.string("output_col_name")?;
        let lookup = mapping(inputs.list("mapping_keys")?)?;

        let mut mapped_count = 0usize;
        let mapped: Vec<Value> = table
            .column(column)?
            .map(|cell| match lookup.get(&map_key(cell)) {
                Some(to) => {
                    mapped_count += 1;
                    (*to).clone()
                }
                None => cell.clone(),
            })
            .collect();
        table.set_column(output, mapped)?;

        debug!(mapped = mapped_count, rows = table.num_rows(), "mapped column");
        Ok(ValueMap::new().with("table_output", table))
    }
}

/// Lookup keyed by [`map_key`]. The first mapping of a repeated key wins.
fn mapping(keys: &[Value]) -> Result<HashMap<String, &Value>> {
    let invalid = |reason: &str| NetrankError::invalid_input("mapping_keys", reason);
    let [Value::Array(from), Value::Array(to)] = keys else {
        return Err(invalid("expected two lists: [[from, ...], [to, ...]]"));
    };
    if from.len() != to.len() {
        return Err(invalid(&format!(
            "{} keys but {} replacement values",
            from.len(),
            to.len()
        )));
    }
    let mut lookup = HashMap::with_capacity(from.len());
    for (key, value) in from.iter().zip(to) {
        lookup.entry(map_key(key)).or_insert(value);
    }
    Ok(lookup)
}

/// Comparison key for a cell. Numbers compare by value, so `1` and `1.0`
/// match; everything else by its JSON text, so the string `"1"` does not.
fn map_key(value: &Value) -> String {
    match value {
        // Adding 0.0 folds -0.0 into 0.0.
        Value::Number(n) => n.as_f64().map_or_else(|| n.to_string(), |f| (f + 0.0).to_string()),
        other => other.to_string(),
    }
}

// ---------------------------------------------------------------------------
// playground.tm_dash.table_sample
// ---------------------------------------------------------------------------

const SAMPLE_INPUTS: [FieldSpec; 3] = [
    TABLE_INPUT,
    FieldSpec::optional("sample_size", ValueType::Integer, "Number of rows to draw.")
        .with_default(DefaultValue::Integer(DEFAULT_SAMPLE_SIZE)),
    FieldSpec::optional(
        "seed",
        ValueType::Integer,
        "Random seed for a reproducible sample.",
    ),
];

const SAMPLE_OUTPUTS: [FieldSpec; 1] = [FieldSpec::required(
    "table_sample",
    ValueType::Table,
    "The sampled rows in their original order.",
)];

/// `playground.tm_dash.table_sample`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TableSample;

impl Operation for TableSample {
    fn name(&self) -> &'static str {
        "playground.tm_dash.table_sample"
    }

    fn doc(&self) -> &'static str {
        "Draw a random sample of rows without replacement. Tables with no more rows \
         than 'sample_size' are returned whole. Sampled rows keep their original order."
    }

    fn inputs_schema(&self) -> &'static [FieldSpec] {
        &SAMPLE_INPUTS
    }

    fn outputs_schema(&self) -> &'static [FieldSpec] {
        &SAMPLE_OUTPUTS
    }

    #[instrument(skip_all)]
    fn run(&self, inputs: &ValueMap) -> Result<ValueMap> {
        let table = inputs.table("table_input")?;
        let config = SampleConfig::from_inputs(inputs)?;

        let rows = table.num_rows();
        let mut sample = if rows <= config.sample_size {
            table.clone()
        } else {
            let mut rng = match config.seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            let mut picked = rand::seq::index::sample(&mut rng, rows, config.sample_size).into_vec();
            picked.sort_unstable();
            table.take_rows(&picked)
        };
        sample.drop_column(INDEX_COLUMN);

        debug!(rows, sampled = sample.num_rows(), "sampled table");
        Ok(ValueMap::new().with("table_sample", sample))
    }
}

// ---------------------------------------------------------------------------
// playground.tm_dash.add_column
// ---------------------------------------------------------------------------

/// Column (and output) name written by [`AddColumn`].
pub const TOKENS_COLUMN: &str = "preprocessed_tokens";

const ADD_INPUTS: [FieldSpec; 2] = [
    TABLE_INPUT,
    FieldSpec::required(
        "array_input",
        ValueType::List,
        "One value per table row.",
    ),
];

const ADD_OUTPUTS: [FieldSpec; 1] = [FieldSpec::required(
    "preprocessed_tokens",
    ValueType::Table,
    "The table with a 'preprocessed_tokens' column.",
)];

/// `playground.tm_dash.add_column`.
#[derive(Debug, Clone, Copy, Default)]
pub struct AddColumn;

impl Operation for AddColumn {
    fn name(&self) -> &'static str {
        "playground.tm_dash.add_column"
    }

    fn doc(&self) -> &'static str {
        "Append an array as the 'preprocessed_tokens' column. The array must have one \
         entry per row."
    }

    fn inputs_schema(&self) -> &'static [FieldSpec] {
        &ADD_INPUTS
    }

    fn outputs_schema(&self) -> &'static [FieldSpec] {
        &ADD_OUTPUTS
    }

    #[instrument(skip_all)]
    fn run(&self, inputs: &ValueMap) -> Result<ValueMap> {
        let mut table = inputs.table("table_input")?.clone();
        let values = inputs.list("array_input")?;
        if values.len() != table.num_rows() {
            return Err(NetrankError::invalid_input(
                "array_input",
                format!(
                    "has {} entries but the table has {} rows",
                    values.len(),
                    table.num_rows()
                ),
            ));
        }
        table.set_column(TOKENS_COLUMN, values.to_vec())?;
        Ok(ValueMap::new().with(TOKENS_COLUMN, table))
    }
}

// ---------------------------------------------------------------------------
// playground.tm_dash.viz_data_query
// ---------------------------------------------------------------------------

/// Time bucket of the timeline aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryType {
    Day,
    Month,
    Year,
}

impl QueryType {
    pub const ALL: [Self; 3] = [Self::Day, Self::Month, Self::Year];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Month => "month",
            Self::Year => "year",
        }
    }

    /// Aggregation query over table `data`, counting rows per `column`
    /// value and time bucket.
    #[must_use]
    pub fn sql(self, column: &str) -> String {
        match self {
            Self::Month => format!(
                "SELECT strptime(concat(month, '/', year), '%m/%Y') as date, {column} as \
                 publication_name, count FROM (SELECT YEAR(date) as year, MONTH(date) as \
                 month, {column}, count(*) as count FROM data GROUP BY {column}, \
                 YEAR(date), MONTH(date))"
            ),
            Self::Year => format!(
                "SELECT strptime(year, '%Y') as date, {column} as publication_name, count \
                 FROM (SELECT YEAR(date) as year, {column}, count(*) as count FROM data \
                 GROUP BY {column}, YEAR(date))"
            ),
            Self::Day => format!(
                "SELECT strptime(concat('01/', month, '/', year), '%d/%m/%Y') as date, \
                 {column} as publication_name, count FROM (SELECT YEAR(date) as year, \
                 MONTH(date) as month, {column}, count(*) as count FROM data GROUP BY \
                 {column}, YEAR(date), MONTH(date), DAY(date))"
            ),
        }
    }
}

impl fmt::Display for QueryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QueryType {
    type Err = NetrankError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s.trim())
            .ok_or_else(|| {
                NetrankError::invalid_input(
                    "query_type",
                    format!("'{s}' is not one of day, month, year"),
                )
            })
    }
}

const QUERY_INPUTS: [FieldSpec; 2] = [
    FieldSpec::required("query_type", ValueType::String, "One of day, month, year."),
    FieldSpec::required(
        "column",
        ValueType::String,
        "Column to group by, reported as publication_name.",
    ),
];

const QUERY_OUTPUTS: [FieldSpec; 1] = [FieldSpec::required(
    "query",
    ValueType::String,
    "SQL over a table named 'data' with a 'date' column.",
)];

/// `playground.tm_dash.viz_data_query`.
#[derive(Debug, Clone, Copy, Default)]
pub struct VizDataQuery;

impl Operation for VizDataQuery {
    fn name(&self) -> &'static str {
        "playground.tm_dash.viz_data_query"
    }

    fn doc(&self) -> &'static str {
        "Build the SQL that counts corpus rows per publication and day, month or year \
         for the timeline chart."
    }

    fn inputs_schema(&self) -> &'static [FieldSpec] {
        &QUERY_INPUTS
    }

    fn outputs_schema(&self) -> &'static [FieldSpec] {
        &QUERY_OUTPUTS
    }

    fn run(&self, inputs: &ValueMap) -> Result<ValueMap> {
        let query_type: QueryType = inputs.string("query_type")?.parse()?;
        let column = inputs.string("column")?;
        // Interpolated into SQL unquoted.
        let identifier = compile(r"^[A-Za-z_][A-Za-z0-9_]*$")?;
        if !identifier.is_match(column) {
            return Err(NetrankError::invalid_input(
                "column",
                format!("'{column}' is not a plain column identifier"),
            ));
        }
        Ok(ValueMap::new().with("query", query_type.sql(column)))
    }
}
