//! Community detection.

pub mod modularity;

pub use modularity::{CommunityLimits, CommunityResult, greedy_modularity_communities};
