//! Competition ranking of node scores.
//!
//! # Overview
//!
//! [`rank`] turns a [`ScoreMap`] into [`RankedRow`]s ordered by descending
//! score. Tied scores share a rank and the next distinct score jumps by the
//! size of the tie group ("1224" competition ranking):
//!
//! ```text
//! {A: 10, B: 10, C: 5}  ->  (1, A, 10) (1, B, 10) (3, C, 5)
//! ```
//!
//! # Tie-break
//!
//! The sort is stable, so nodes with equal scores keep the order in which
//! they were inserted into the score map. Graph analyses insert nodes in
//! network node order, which makes the output deterministic.
//!
//! # Scores
//!
//! Any primitive integer or float is a [`Score`]. Floats are compared with
//! IEEE 754 total ordering so a stray NaN never panics the sort; NaN sorts
//! above every finite value.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::hash::Hash;

use serde_json::Value;
use tracing::instrument;

pub mod table;

pub use table::{RankedTable, SecondaryColumn, merge_secondary};

// ---------------------------------------------------------------------------
// Score
// ---------------------------------------------------------------------------

/// A numeric score that can be ranked and exported.
pub trait Score: Copy + std::fmt::Debug {
    /// Total order used for sorting.
    fn total_cmp(&self, other: &Self) -> Ordering;

    /// Whether two scores belong to the same tie group.
    fn ties(&self, other: &Self) -> bool {
        self.total_cmp(other) == Ordering::Equal
    }

    /// Lossy conversion for arithmetic and display.
    fn to_f64(self) -> f64;

    /// JSON form for tables and node attributes. Non-finite floats become
    /// `null`.
    fn to_value(self) -> Value;
}

macro_rules! int_score {
    ($($t:ty),*) => {$(
        impl Score for $t {
            fn total_cmp(&self, other: &Self) -> Ordering {
                self.cmp(other)
            }

            #[allow(clippy::cast_precision_loss, clippy::cast_lossless)]
            fn to_f64(self) -> f64 {
                self as f64
            }

            fn to_value(self) -> Value {
                Value::from(self)
            }
        }
    )*};
}

int_score!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl Score for f64 {
    fn total_cmp(&self, other: &Self) -> Ordering {
        Self::total_cmp(self, other)
    }

    // -0.0 and 0.0 tie even though total order separates them.
    #[allow(clippy::float_cmp)]
    fn ties(&self, other: &Self) -> bool {
        self == other || Self::total_cmp(self, other) == Ordering::Equal
    }

    fn to_f64(self) -> f64 {
        self
    }

    fn to_value(self) -> Value {
        serde_json::Number::from_f64(self).map_or(Value::Null, Value::Number)
    }
}

impl Score for f32 {
    fn total_cmp(&self, other: &Self) -> Ordering {
        Self::total_cmp(self, other)
    }

    #[allow(clippy::float_cmp)]
    fn ties(&self, other: &Self) -> bool {
        self == other || Self::total_cmp(self, other) == Ordering::Equal
    }

    fn to_f64(self) -> f64 {
        f64::from(self)
    }

    fn to_value(self) -> Value {
        f64::from(self).to_value()
    }
}

// ---------------------------------------------------------------------------
// ScoreMap
// ---------------------------------------------------------------------------

/// Insertion-ordered mapping from node to score.
///
/// Re-inserting an existing node replaces its score in place.
#[derive(Debug, Clone)]
pub struct ScoreMap<N, S> {
    entries: Vec<(N, S)>,
    index: HashMap<N, usize>,
}

impl<N: PartialEq, S: PartialEq> PartialEq for ScoreMap<N, S> {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl<N, S> Default for ScoreMap<N, S> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<N: Eq + Hash + Clone, S> ScoreMap<N, S> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
        }
    }

    /// Insert or replace a score. Returns the previous score, if any.
    pub fn insert(&mut self, node: N, score: S) -> Option<S> {
        if let Some(&pos) = self.index.get(&node) {
            return Some(std::mem::replace(&mut self.entries[pos].1, score));
        }
        self.index.insert(node.clone(), self.entries.len());
        self.entries.push((node, score));
        None
    }

    #[must_use]
    pub fn get(&self, node: &N) -> Option<&S> {
        self.index.get(node).map(|&pos| &self.entries[pos].1)
    }

    #[must_use]
    pub fn contains(&self, node: &N) -> bool {
        self.index.contains_key(node)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&N, &S)> {
        self.entries.iter().map(|(n, s)| (n, s))
    }

    pub fn keys(&self) -> impl Iterator<Item = &N> {
        self.entries.iter().map(|(n, _)| n)
    }

    /// Apply `f` to every score, keeping node order.
    #[must_use]
    pub fn map_scores<T>(&self, mut f: impl FnMut(&S) -> T) -> ScoreMap<N, T> {
        ScoreMap {
            entries: self.entries.iter().map(|(n, s)| (n.clone(), f(s))).collect(),
            index: self.index.clone(),
        }
    }
}

impl ScoreMap<String, f64> {
    /// Score lookup by string slice.
    #[must_use]
    pub fn score(&self, node: &str) -> Option<f64> {
        self.index.get(node).map(|&pos| self.entries[pos].1)
    }
}

impl<N: Eq + Hash + Clone, S> FromIterator<(N, S)> for ScoreMap<N, S> {
    fn from_iter<I: IntoIterator<Item = (N, S)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (node, score) in iter {
            map.insert(node, score);
        }
        map
    }
}

impl<N, S> IntoIterator for ScoreMap<N, S> {
    type Item = (N, S);
    type IntoIter = std::vec::IntoIter<(N, S)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

// ---------------------------------------------------------------------------
// Ranking
// ---------------------------------------------------------------------------

/// One row of a ranking: `rank` starts at 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedRow<N, S> {
    pub rank: u32,
    pub node: N,
    pub score: S,
}

/// Rank scores by descending value with competition ranking.
///
/// The output has exactly one row per entry of `scores`, ordered by
/// descending score with ties in insertion order. Empty input gives empty
/// output.
#[must_use]
#[instrument(skip(scores), fields(nodes = scores.len()))]
pub fn rank<N, S>(scores: &ScoreMap<N, S>) -> Vec<RankedRow<N, S>>
where
    N: Eq + Hash + Clone,
    S: Score,
{
    let entries = &scores.entries;
    let mut order: Vec<usize> = (0..entries.len()).collect();
    // Stable: equal scores keep insertion order.
    order.sort_by(|&a, &b| entries[b].1.total_cmp(&entries[a].1));

    let mut rows = Vec::with_capacity(order.len());
    let mut current_rank = 0u32;
    let mut previous: Option<S> = None;

    for (position, &i) in order.iter().enumerate() {
        let (node, score) = &entries[i];
        if !previous.is_some_and(|p| p.ties(score)) {
            current_rank = u32::try_from(position + 1).unwrap_or(u32::MAX);
        }
        previous = Some(*score);
        rows.push(RankedRow {
            rank: current_rank,
            node: node.clone(),
            score: *score,
        });
    }

    rows
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
