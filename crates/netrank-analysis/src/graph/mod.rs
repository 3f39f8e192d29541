//! Graph views for the analyses.
//!
//! # Overview
//!
//! ```text
//! NetworkData (ordered nodes, parallel edges, attributes)
//!        ↓  build::MultiGraph::from_network(weight_column)
//! MultiGraph (DiGraph, one edge per network edge, resolved weights)
//!        ↓  weighted::WeightedGraph::from_multigraph()
//! WeightedGraph (DiGraph, parallel edges summed)
//!        ↓  build::SimpleGraph::from_weighted(remove_self_loops)
//! SimpleGraph (UnGraph, both directions summed)
//! ```
//!
//! Centrality, structure and community analyses run on [`SimpleGraph`];
//! weighted degree comes straight from [`WeightedGraph`].
//!
//! ## Typical Usage
//!
//! ```rust,ignore
//! use netrank_analysis::graph::{SimpleGraph, WeightedGraph};
//!
//! let weighted = WeightedGraph::from_network(&network, Some("letters"));
//! let strengths = weighted.weighted_degree();
//! let simple = SimpleGraph::from_weighted(&weighted, true);
//! ```

pub mod build;
pub mod weighted;

pub use build::{MultiGraph, SimpleGraph};
pub use weighted::{WeightedGraph, aggregate_weighted_degree};
