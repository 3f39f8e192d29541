//! Structural analyses: cut points and connected components.
//!
//! Both work on the undirected [`crate::graph::SimpleGraph`], so components
//! of directed data are weakly connected components.

pub mod components;
pub mod cut_points;

pub use components::{ComponentSplit, connected_components, split_largest_component};
pub use cut_points::cut_points;
