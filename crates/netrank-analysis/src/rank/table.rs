//! Ranked result tables with left-joined secondary score columns.

use serde_json::Value;

use netrank_core::Table;

use super::{RankedRow, Score, ScoreMap};

/// Column headers of the primary ranking.
pub const RANK_COLUMN: &str = "Rank";
pub const NODE_COLUMN: &str = "Node";
pub const SCORE_COLUMN: &str = "Score";

/// A named column aligned with the primary rows; `Null` where the node had
/// no secondary score.
#[derive(Debug, Clone, PartialEq)]
pub struct SecondaryColumn {
    pub name: String,
    pub values: Vec<Value>,
}

/// Ranked rows plus zero or more secondary columns.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedTable<S> {
    score_column: String,
    rows: Vec<RankedRow<String, S>>,
    secondary: Vec<SecondaryColumn>,
}

impl<S: Score> RankedTable<S> {
    /// Table over `rows` with the default `Score` header.
    #[must_use]
    pub fn new(rows: Vec<RankedRow<String, S>>) -> Self {
        Self::with_score_column(rows, SCORE_COLUMN)
    }

    #[must_use]
    pub fn with_score_column(rows: Vec<RankedRow<String, S>>, score_column: &str) -> Self {
        Self {
            score_column: score_column.to_string(),
            rows,
            secondary: Vec::new(),
        }
    }

    #[must_use]
    pub fn rows(&self) -> &[RankedRow<String, S>] {
        &self.rows
    }

    #[must_use]
    pub fn secondary_columns(&self) -> &[SecondaryColumn] {
        &self.secondary
    }

    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    /// Left-join `scores` by node as a new column named `column_name`.
    ///
    /// Row count and order never change; nodes missing from `scores` get
    /// `Null`.
    #[must_use]
    pub fn merge<T: Score>(mut self, scores: &ScoreMap<String, T>, column_name: &str) -> Self {
        let values = self
            .rows
            .iter()
            .map(|row| scores.get(&row.node).map_or(Value::Null, |s| s.to_value()))
            .collect();
        self.secondary.push(SecondaryColumn {
            name: column_name.to_string(),
            values,
        });
        self
    }

    /// Header names: `Rank`, `Node`, the score column, then secondaries.
    #[must_use]
    pub fn column_names(&self) -> Vec<String> {
        let mut names = vec![
            RANK_COLUMN.to_string(),
            NODE_COLUMN.to_string(),
            self.score_column.clone(),
        ];
        names.extend(self.secondary.iter().map(|c| c.name.clone()));
        names
    }

    /// Convert into a generic [`Table`].
    #[must_use]
    pub fn to_table(&self) -> Table {
        let mut table = Table::new(self.column_names());
        for (i, row) in self.rows.iter().enumerate() {
            let mut cells = vec![
                Value::from(row.rank),
                Value::String(row.node.clone()),
                row.score.to_value(),
            ];
            cells.extend(
                self.secondary
                    .iter()
                    .map(|c| c.values.get(i).cloned().unwrap_or(Value::Null)),
            );
            table.push_row(cells).unwrap_or_else(|e| {
                // Widths come from column_names.
                tracing::error!(error = %e, "ranked row width mismatch");
            });
        }
        table
    }
}

/// Build a ranked table from `primary` and left-join `secondary` as
/// `column_name`.
#[must_use]
pub fn merge_secondary<S: Score, T: Score>(
    primary: Vec<RankedRow<String, S>>,
    secondary: &ScoreMap<String, T>,
    column_name: &str,
) -> RankedTable<S> {
    RankedTable::new(primary).merge(secondary, column_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rank::rank;
    use serde_json::json;

    fn primary() -> Vec<RankedRow<String, usize>> {
        let scores: ScoreMap<String, usize> = [("A", 2), ("B", 3), ("C", 2)]
            .into_iter()
            .map(|(n, s)| (n.to_string(), s))
            .collect();
        rank(&scores)
    }

    #[test]
    fn merge_keeps_rows_and_nulls_missing_nodes() {
        let secondary: ScoreMap<String, f64> =
            [("A".to_string(), 4.5), ("ghost".to_string(), 1.0)].into_iter().collect();
        let table = merge_secondary(primary(), &secondary, "Weighted Score");

        assert_eq!(table.num_rows(), 3);
        let col = &table.secondary_columns()[0];
        assert_eq!(col.name, "Weighted Score");
        // Rows are B, A, C.
        assert_eq!(col.values, vec![Value::Null, json!(4.5), Value::Null]);
    }

    #[test]
    fn to_table_orders_columns() {
        let w: ScoreMap<String, f64> = [("B".to_string(), 1.0)].into_iter().collect();
        let t = RankedTable::new(primary()).merge(&w, "Weighted Score").to_table();
        assert_eq!(t.columns(), ["Rank", "Node", "Score", "Weighted Score"]);
        assert_eq!(t.rows()[0], vec![json!(1), json!("B"), json!(3), json!(1.0)]);
        assert_eq!(t.rows()[2], vec![json!(2), json!("C"), json!(2), Value::Null]);
    }

    #[test]
    fn merge_chains_columns_in_order() {
        let a: ScoreMap<String, f64> = ScoreMap::new();
        let b: ScoreMap<String, i64> = [("C".to_string(), 9)].into_iter().collect();
        let t = RankedTable::with_score_column(primary(), "Degree")
            .merge(&a, "first")
            .merge(&b, "second");
        assert_eq!(t.column_names(), vec!["Rank", "Node", "Degree", "first", "second"]);
        assert_eq!(t.secondary_columns()[1].values[2], json!(9));
    }

    #[test]
    fn empty_primary_gives_header_only_table() {
        let t = RankedTable::<f64>::new(Vec::new()).to_table();
        assert!(t.is_empty());
        assert_eq!(t.num_columns(), 3);
    }
}
