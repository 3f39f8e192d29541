//! Property tests for the corpus table operations.

use netrank_core::Table;
use netrank_ops::{Registry, ValueMap};
use proptest::prelude::*;
use serde_json::{Value, json};

fn table(values: &[u8]) -> Table {
    let mut t = Table::new(["pos", "word"]);
    for (i, v) in values.iter().enumerate() {
        t.push_row(vec![json!(i), json!(format!("w{v}"))]).expect("row");
    }
    t
}

fn positions(t: &Table) -> Vec<u64> {
    t.column("pos")
        .expect("pos")
        .filter_map(Value::as_u64)
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn sample_is_an_ordered_subset(
        values in prop::collection::vec(0u8..10, 0..60),
        size in 0i64..30,
        seed in 0i64..1000,
    ) {
        let out = Registry::global().expect("registry")
            .run(
                "playground.tm_dash.table_sample",
                ValueMap::new()
                    .with("table_input", table(&values))
                    .with("sample_size", size)
                    .with("seed", seed),
            )
            .expect("sample");
        let sample = out.table("table_sample").expect("table");
        let expected = values.len().min(usize::try_from(size).unwrap_or_default());
        prop_assert_eq!(sample.num_rows(), expected);

        let pos = positions(sample);
        prop_assert!(pos.windows(2).all(|w| w[0] < w[1]));
        for row in sample.rows() {
            let i = usize::try_from(row[0].as_u64().unwrap_or_default()).unwrap_or_default();
            prop_assert_eq!(&row[1], &json!(format!("w{}", values[i])));
        }
    }

    #[test]
    fn mapping_keeps_rows_and_unmapped_values(
        values in prop::collection::vec(0u8..10, 0..40),
        mapped in prop::collection::btree_set(0u8..10, 0..10),
    ) {
        let from: Vec<Value> = mapped.iter().map(|v| json!(format!("w{v}"))).collect();
        let to: Vec<Value> = mapped.iter().map(|v| json!(format!("W{v}"))).collect();
        let out = Registry::global().expect("registry")
            .run(
                "playground.tm_dash.map_column",
                ValueMap::new()
                    .with("table_input", table(&values))
                    .with("column_name", "word")
                    .with("output_col_name", "mapped")
                    .with("mapping_keys", vec![Value::Array(from), Value::Array(to)]),
            )
            .expect("map");
        let t = out.table("table_output").expect("table");
        prop_assert_eq!(t.num_rows(), values.len());
        let cells: Vec<&Value> = t.column("mapped").expect("mapped").collect();
        for (v, cell) in values.iter().zip(cells) {
            let expected = if mapped.contains(v) { format!("W{v}") } else { format!("w{v}") };
            prop_assert_eq!(cell, &json!(expected));
        }
    }
}
