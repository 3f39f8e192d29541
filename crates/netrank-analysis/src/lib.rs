//! Graph analyses and ranking for netrank networks.
//!
//! # Overview
//!
//! - [`graph`]: petgraph views built from [`netrank_core::NetworkData`].
//! - [`metrics`]: degree, betweenness, closeness and eigenvector centrality.
//! - [`rank`]: competition ranking of score maps and ranked result tables.
//! - [`structure`]: cut points and connected components.
//! - [`community`]: greedy modularity communities.
//! - [`info`]: structural summary of a network.
//!
//! # Conventions
//!
//! - Node order is network node order everywhere. Score maps, component
//!   members and cut point lists all follow it.
//! - Edge weights are tie strengths. Path-based metrics use `1/strength` as
//!   edge length; callers holding costs invert them edge by edge first
//!   ([`graph::MultiGraph::inverted`]).
//! - Analyses are pure functions over borrowed graphs.

pub mod community;
pub mod graph;
pub mod info;
pub mod metrics;
pub mod rank;
pub mod structure;

pub use info::{NetworkInfo, network_info};
pub use rank::{RankedRow, RankedTable, Score, ScoreMap, rank};
