use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use netrank_analysis::graph::{SimpleGraph, WeightedGraph};
use netrank_analysis::metrics::betweenness::betweenness_centrality;
use netrank_analysis::rank::RankedTable;
use netrank_analysis::{ScoreMap, rank};
use netrank_core::{Attributes, NetworkData};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::json;

const SIZES: [usize; 3] = [1_000, 10_000, 100_000];

fn scores(n: usize, seed: u64) -> ScoreMap<String, f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    // Coarse scores so tie groups are realistic.
    (0..n)
        .map(|i| (format!("node-{i}"), f64::from(rng.gen_range(0u32..200)) / 10.0))
        .collect()
}

fn random_network(nodes: usize, edges: usize, seed: u64) -> NetworkData {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut n = NetworkData::new(false);
    for i in 0..nodes {
        n.add_node(format!("node-{i}"));
    }
    for _ in 0..edges {
        let a = rng.gen_range(0..nodes);
        let b = rng.gen_range(0..nodes);
        let attrs: Attributes = [("weight".to_string(), json!(rng.gen_range(1u32..5)))]
            .into_iter()
            .collect();
        n.add_edge(format!("node-{a}"), format!("node-{b}"), attrs);
    }
    n
}

fn bench_rank(c: &mut Criterion) {
    let mut group = c.benchmark_group("rank");
    for size in SIZES {
        let map = scores(size, 0x5EED + size as u64);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("competition", size), &map, |b, map| {
            b.iter(|| black_box(rank(map)));
        });
    }
    group.finish();
}

fn bench_ranked_table(c: &mut Criterion) {
    let mut group = c.benchmark_group("ranked_table");
    for size in SIZES {
        let network = random_network(size, size * 3, 0xBEEF + size as u64);
        let weighted = WeightedGraph::from_network(&network, None);
        let strengths = weighted.weighted_degree();
        let degree = netrank_analysis::metrics::degree::degree_centrality(&SimpleGraph::from_weighted(
            &weighted, true,
        ));
        group.bench_with_input(
            BenchmarkId::new("degree_with_weighted", size),
            &(degree, strengths),
            |b, (degree, strengths)| {
                b.iter(|| {
                    black_box(
                        RankedTable::new(rank(degree))
                            .merge(strengths, "Weighted Score")
                            .to_table(),
                    )
                });
            },
        );
    }
    group.finish();
}

fn bench_betweenness(c: &mut Criterion) {
    let mut group = c.benchmark_group("betweenness");
    group.sample_size(10);
    for size in [200usize, 1_000] {
        let g = SimpleGraph::from_network(&random_network(size, size * 4, 0xCAFE), true);
        group.bench_with_input(BenchmarkId::new("brandes", size), &g, |b, g| {
            b.iter(|| black_box(betweenness_centrality(g)));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_rank, bench_ranked_table, bench_betweenness);
criterion_main!(benches);
