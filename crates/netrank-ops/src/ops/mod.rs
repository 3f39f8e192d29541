//! Built-in operations.
//!
//! | Name | Type |
//! |------|------|
//! | `create.{degree,betweenness,eigenvector,closeness}_rank_list` | [`centrality::RankList`] |
//! | `create.cut_point_list` | [`structure::CutPointList`] |
//! | `network_data.extract_largest_component` | [`structure::ExtractLargestComponent`] |
//! | `compute.modularity_group` | [`modularity::ModularityGroup`] |
//! | `onboard.{gml_file,sqlite_file,edge_table}` | [`onboarding`] |
//! | `get.network_info` | [`info::NetworkInfoOp`] |
//! | `playground.tm_dash.*` | [`corpus`] |

pub mod centrality;
pub mod corpus;
pub mod info;
pub mod modularity;
pub mod onboarding;
pub mod structure;

use crate::operation::Operation;

/// One instance of every built-in operation.
#[must_use]
pub fn builtins() -> Vec<Box<dyn Operation>> {
    let mut ops: Vec<Box<dyn Operation>> = centrality::Metric::ALL
        .into_iter()
        .map(|metric| Box::new(centrality::RankList::new(metric)) as Box<dyn Operation>)
        .collect();
    ops.extend([
        Box::new(structure::CutPointList) as Box<dyn Operation>,
        Box::new(structure::ExtractLargestComponent),
        Box::new(modularity::ModularityGroup),
        Box::new(onboarding::GmlFile),
        Box::new(onboarding::SqliteFile),
        Box::new(onboarding::EdgeTable),
        Box::new(info::NetworkInfoOp),
        Box::new(corpus::FileNameMetadata),
        Box::new(corpus::MapColumn),
        Box::new(corpus::TableSample),
        Box::new(corpus::AddColumn),
        Box::new(corpus::VizDataQuery),
    ]);
    ops
}
