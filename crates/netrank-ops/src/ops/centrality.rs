//! Ranked centrality lists: degree, betweenness, eigenvector, closeness.
//!
//! # Overview
//!
//! All four operations share one shape. Edge weights come from
//! `weight_column`. When `weight_meaning` is `cost`, each edge cost `c`
//! becomes a strength `1/c` before parallel edges are summed into a
//! [`WeightedGraph`]; weighted degree skips the inversion and sums the raw
//! weights. Self-loops are dropped from the undirected view the metrics run
//! on. The unweighted
//! score is always ranked; with `weighted` the weighted variant is
//! left-joined as `Weighted Score`.
//!
//! Both scores are also written back onto a copy of the input network as
//! `<Metric> Score` and `Weighted <Metric> Score` node attributes.

use netrank_analysis::graph::{MultiGraph, SimpleGraph, WeightedGraph};
use netrank_analysis::metrics::{betweenness, closeness, degree, eigenvector};
use netrank_analysis::rank::RankedTable;
use netrank_analysis::{Score, ScoreMap, rank};
use netrank_core::{NetrankError, NetworkData, Result, Table, WeightMeaning};
use tracing::{debug, info, instrument, warn};

use crate::config::{CentralityConfig, DEFAULT_ITERATIONS};
use crate::operation::Operation;
use crate::schema::{DefaultValue, FieldSpec};
use crate::value::{ValueMap, ValueType};

/// Header of the secondary column in the result table.
pub const WEIGHTED_SCORE_COLUMN: &str = "Weighted Score";

const NETWORK_DATA: FieldSpec =
    FieldSpec::required("network_data", ValueType::Network, "The network to analyse.");
const WEIGHTED: FieldSpec = FieldSpec::optional(
    "weighted",
    ValueType::Boolean,
    "Also compute the weighted score as a secondary column.",
)
.with_default(DefaultValue::Boolean(false));
const WEIGHT_COLUMN: FieldSpec = FieldSpec::optional(
    "weight_column",
    ValueType::String,
    "Edge attribute holding weights; falls back to 'weight', then 1.",
);
const WEIGHT_MEANING: FieldSpec = FieldSpec::optional(
    "weight_meaning",
    ValueType::String,
    "'strength' (larger is closer) or 'cost' (inverted before use).",
)
.with_default(DefaultValue::String("strength"));
const ITERATIONS: FieldSpec = FieldSpec::optional(
    "iterations",
    ValueType::Integer,
    "Maximum number of power iterations.",
)
.with_default(DefaultValue::Integer(DEFAULT_ITERATIONS));

const INPUTS: [FieldSpec; 4] = [NETWORK_DATA, WEIGHTED, WEIGHT_COLUMN, WEIGHT_MEANING];
const EIGENVECTOR_INPUTS: [FieldSpec; 5] =
    [NETWORK_DATA, WEIGHTED, WEIGHT_COLUMN, WEIGHT_MEANING, ITERATIONS];

const OUTPUTS: [FieldSpec; 2] = [
    FieldSpec::required(
        "network_result",
        ValueType::Table,
        "Nodes ranked by score: Rank, Node, Score (and Weighted Score).",
    ),
    FieldSpec::required(
        "centrality_network",
        ValueType::Network,
        "The input network with score node attributes.",
    ),
];

/// Which centrality a [`RankList`] computes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Degree,
    Betweenness,
    Eigenvector,
    Closeness,
}

impl Metric {
    pub const ALL: [Self; 4] = [
        Self::Degree,
        Self::Betweenness,
        Self::Eigenvector,
        Self::Closeness,
    ];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Degree => "Degree",
            Self::Betweenness => "Betweenness",
            Self::Eigenvector => "Eigenvector",
            Self::Closeness => "Closeness",
        }
    }

    /// Node attribute for the unweighted score.
    #[must_use]
    pub const fn attribute(self) -> &'static str {
        match self {
            Self::Degree => "Degree Score",
            Self::Betweenness => "Betweenness Score",
            Self::Eigenvector => "Eigenvector Score",
            Self::Closeness => "Closeness Score",
        }
    }

    /// Node attribute for the weighted score.
    #[must_use]
    pub const fn weighted_attribute(self) -> &'static str {
        match self {
            Self::Degree => "Weighted Degree Score",
            Self::Betweenness => "Weighted Betweenness Score",
            Self::Eigenvector => "Weighted Eigenvector Score",
            Self::Closeness => "Weighted Closeness Score",
        }
    }
}

/// `create.<metric>_rank_list`.
#[derive(Debug, Clone, Copy)]
pub struct RankList {
    metric: Metric,
}

impl RankList {
    #[must_use]
    pub const fn new(metric: Metric) -> Self {
        Self { metric }
    }
}

impl Operation for RankList {
    fn name(&self) -> &'static str {
        match self.metric {
            Metric::Degree => "create.degree_rank_list",
            Metric::Betweenness => "create.betweenness_rank_list",
            Metric::Eigenvector => "create.eigenvector_rank_list",
            Metric::Closeness => "create.closeness_rank_list",
        }
    }

    fn doc(&self) -> &'static str {
        match self.metric {
            Metric::Degree => {
                "Rank nodes by degree (number of distinct neighbours). With 'weighted', \
                 also report the weighted degree: the sum of summed parallel-edge weights \
                 over incoming and outgoing edges."
            }
            Metric::Betweenness => {
                "Rank nodes by betweenness centrality, the share of shortest paths \
                 passing through each node. Weighted paths treat a weight as a tie \
                 strength, so the distance of an edge is 1/weight."
            }
            Metric::Eigenvector => {
                "Rank nodes by eigenvector centrality: a node scores highly when it is \
                 connected to other high-scoring nodes. Fails when the power iteration \
                 does not converge within 'iterations'."
            }
            Metric::Closeness => {
                "Rank nodes by closeness centrality, the scaled inverse of the average \
                 distance to every reachable node. Weighted distances are 1/weight."
            }
        }
    }

    fn inputs_schema(&self) -> &'static [FieldSpec] {
        match self.metric {
            Metric::Eigenvector => &EIGENVECTOR_INPUTS,
            _ => &INPUTS,
        }
    }

    fn outputs_schema(&self) -> &'static [FieldSpec] {
        &OUTPUTS
    }

    #[instrument(skip_all, fields(metric = self.metric.label()))]
    fn run(&self, inputs: &ValueMap) -> Result<ValueMap> {
        let network = inputs.network("network_data")?;
        let config = CentralityConfig::from_inputs(inputs)?;
        let scored = score(self.metric, network, &config)?;

        let mut annotated = network.clone();
        annotated.set_node_attributes(
            self.metric.attribute(),
            scored.primary.iter().map(|(n, s)| (n.as_str(), s.clone())),
        );
        if let Some(weighted) = &scored.weighted {
            annotated.set_node_attributes(
                self.metric.weighted_attribute(),
                weighted.iter().map(|(n, s)| (n.as_str(), s.to_value())),
            );
        }

        info!(
            metric = self.metric.label(),
            nodes = scored.table.num_rows(),
            weighted = config.weighted,
            "ranked nodes"
        );
        Ok(ValueMap::new()
            .with("network_result", scored.table)
            .with("centrality_network", annotated))
    }
}

/// Primary scores as JSON (for node attributes), the optional weighted
/// scores, and the ranked table.
struct Scored {
    primary: ScoreMap<String, serde_json::Value>,
    weighted: Option<ScoreMap<String, f64>>,
    table: Table,
}

fn score(metric: Metric, network: &NetworkData, config: &CentralityConfig) -> Result<Scored> {
    let mut multi = MultiGraph::from_network(network, config.weight_column.as_deref());
    // Weighted degree sums the raw weights whatever they mean.
    if config.weighted
        && config.weight_meaning == WeightMeaning::Cost
        && metric != Metric::Degree
    {
        multi = multi.inverted()?;
    }
    let aggregate = WeightedGraph::from_multigraph(&multi);
    let simple = SimpleGraph::from_weighted(&aggregate, true);
    if simple.removed_self_loops > 0 {
        debug!(removed = simple.removed_self_loops, "ignoring self-loops");
    }

    match metric {
        Metric::Degree => {
            let weighted = config.weighted.then(|| aggregate.weighted_degree());
            Ok(assemble(&degree::degree_centrality(&simple), weighted))
        }
        Metric::Betweenness => {
            let weighted = config
                .weighted
                .then(|| betweenness::weighted_betweenness_centrality(&simple));
            Ok(assemble(&betweenness::betweenness_centrality(&simple), weighted))
        }
        Metric::Closeness => {
            let weighted = config
                .weighted
                .then(|| closeness::weighted_closeness_centrality(&simple));
            Ok(assemble(&closeness::closeness_centrality(&simple), weighted))
        }
        Metric::Eigenvector => {
            let primary = converged(eigenvector::eigenvector_centrality(
                &simple,
                config.iterations,
                false,
            ))?;
            let weighted = if config.weighted {
                Some(converged(eigenvector::eigenvector_centrality(
                    &simple,
                    config.iterations,
                    true,
                ))?)
            } else {
                None
            };
            Ok(assemble(&primary, weighted))
        }
    }
}

fn converged(result: eigenvector::EigenvectorResult) -> Result<ScoreMap<String, f64>> {
    if result.converged {
        debug!(iterations = result.iterations, "eigenvector converged");
        Ok(result.scores)
    } else {
        warn!(iterations = result.iterations, "eigenvector did not converge");
        Err(NetrankError::NotConverged {
            algorithm: "eigenvector centrality",
            iterations: result.iterations,
        })
    }
}

fn assemble<S: Score>(primary: &ScoreMap<String, S>, weighted: Option<ScoreMap<String, f64>>) -> Scored {
    let mut ranked = RankedTable::new(rank(primary));
    if let Some(weighted) = &weighted {
        ranked = ranked.merge(weighted, WEIGHTED_SCORE_COLUMN);
    }
    Scored {
        primary: primary.map_scores(|s| s.to_value()),
        weighted,
        table: ranked.to_table(),
    }
}
