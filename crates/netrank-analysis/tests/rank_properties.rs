//! Property tests for competition ranking and weighted-degree aggregation.

use netrank_analysis::graph::aggregate_weighted_degree;
use netrank_analysis::rank::merge_secondary;
use netrank_analysis::{ScoreMap, rank};
use netrank_core::{Attributes, NetworkData};
use proptest::prelude::*;
use serde_json::json;

fn score_map(values: &[i64]) -> ScoreMap<String, i64> {
    values
        .iter()
        .enumerate()
        .map(|(i, v)| (format!("n{i}"), *v))
        .collect()
}

fn arb_scores() -> impl Strategy<Value = Vec<i64>> {
    // Narrow range so ties are common.
    prop::collection::vec(-3i64..4, 0..60)
}

fn arb_edges() -> impl Strategy<Value = Vec<(u8, u8, u8)>> {
    prop::collection::vec((0u8..6, 0u8..6, 1u8..10), 0..40)
}

fn network(edges: &[(u8, u8, u8)], with_weights: bool) -> NetworkData {
    let mut n = NetworkData::new(true);
    for (a, b, w) in edges {
        let attrs: Attributes = if with_weights {
            [("letters".to_string(), json!(w))].into_iter().collect()
        } else {
            Attributes::new()
        };
        n.add_edge(format!("p{a}"), format!("p{b}"), attrs);
    }
    n
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(512))]

    #[test]
    fn one_row_per_node(values in arb_scores()) {
        let scores = score_map(&values);
        let rows = rank(&scores);
        prop_assert_eq!(rows.len(), scores.len());
        let mut nodes: Vec<&str> = rows.iter().map(|r| r.node.as_str()).collect();
        nodes.sort_unstable();
        nodes.dedup();
        prop_assert_eq!(nodes.len(), scores.len());
    }

    #[test]
    fn scores_never_increase(values in arb_scores()) {
        let rows = rank(&score_map(&values));
        for pair in rows.windows(2) {
            prop_assert!(pair[0].score >= pair[1].score);
            prop_assert!(pair[0].rank <= pair[1].rank);
        }
    }

    #[test]
    fn ties_share_rank_and_insertion_order(values in arb_scores()) {
        let rows = rank(&score_map(&values));
        for pair in rows.windows(2) {
            if pair[0].score == pair[1].score {
                prop_assert_eq!(pair[0].rank, pair[1].rank);
                let a: usize = pair[0].node[1..].parse().unwrap_or_default();
                let b: usize = pair[1].node[1..].parse().unwrap_or_default();
                prop_assert!(a < b);
            }
        }
    }

    #[test]
    fn rank_is_one_plus_strictly_greater(values in arb_scores()) {
        let rows = rank(&score_map(&values));
        for row in &rows {
            let greater = values.iter().filter(|v| **v > row.score).count();
            prop_assert_eq!(row.rank as usize, greater + 1);
        }
    }

    #[test]
    fn ranking_is_idempotent(values in arb_scores()) {
        let first = rank(&score_map(&values));
        let reranked: ScoreMap<String, i64> =
            first.iter().map(|r| (r.node.clone(), r.score)).collect();
        prop_assert_eq!(rank(&reranked), first);
    }

    #[test]
    fn merge_keeps_every_primary_row(
        values in arb_scores(),
        keep_every in 1usize..4,
    ) {
        let primary = rank(&score_map(&values));
        // Secondary covers only some nodes.
        let secondary: ScoreMap<String, f64> = values
            .iter()
            .enumerate()
            .filter(|(i, _)| i % keep_every == 0)
            .map(|(i, v)| (format!("n{i}"), *v as f64 * 0.5))
            .collect();
        let table = merge_secondary(primary.clone(), &secondary, "Weighted Score").to_table();
        prop_assert_eq!(table.num_rows(), primary.len());
        for (row, ranked) in table.rows().iter().zip(&primary) {
            prop_assert_eq!(row[1].as_str(), Some(ranked.node.as_str()));
            prop_assert_eq!(row[3].is_null(), !secondary.contains(&ranked.node));
        }
    }

    #[test]
    fn weighted_degree_sums_parallel_edges(edges in arb_edges()) {
        let n = network(&edges, true);
        let strengths = aggregate_weighted_degree(&n, Some("letters"));
        for (node, strength) in strengths.iter() {
            let expected: f64 = edges
                .iter()
                .map(|(a, b, w)| {
                    let ends = u8::from(format!("p{a}") == *node) + u8::from(format!("p{b}") == *node);
                    f64::from(ends) * f64::from(*w)
                })
                .sum();
            prop_assert!((strength - expected).abs() < 1e-9, "{node}: {strength} vs {expected}");
        }
    }

    #[test]
    fn unweighted_edges_default_to_one(edges in arb_edges()) {
        let n = network(&edges, false);
        let plain = aggregate_weighted_degree(&n, None);
        let missing_column = aggregate_weighted_degree(&n, Some("letters"));
        prop_assert_eq!(&plain, &missing_column);
        let total: f64 = plain.iter().map(|(_, s)| s).sum();
        #[allow(clippy::cast_precision_loss)]
        let expected = (2 * edges.len()) as f64;
        prop_assert!((total - expected).abs() < 1e-9);
    }
}
