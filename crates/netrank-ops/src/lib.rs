//! netrank-ops: typed operations over networks and tables.
//!
//! # Overview
//!
//! - [`value`]: the closed set of values operations exchange, with typed
//!   accessors.
//! - [`schema`]: input/output field descriptions, input binding and default
//!   filling.
//! - [`config`]: typed per-operation settings parsed from inputs.
//! - [`operation`]: the [`Operation`] trait.
//! - [`registry`]: the immutable name → operation map.
//! - [`ops`]: the built-in operations.
//!
//! # Example
//!
//! ```no_run
//! use netrank_ops::{Registry, ValueMap};
//! use netrank_core::gml::read_gml_path;
//!
//! # fn main() -> netrank_core::Result<()> {
//! let network = read_gml_path("letters.gml".as_ref(), None)?;
//! let outputs = Registry::global()?.run(
//!     "create.degree_rank_list",
//!     ValueMap::new().with("network_data", network).with("weighted", true),
//! )?;
//! println!("{:?}", outputs.table("network_result")?.columns());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod operation;
pub mod ops;
pub mod registry;
pub mod schema;
pub mod value;

pub use operation::Operation;
pub use registry::Registry;
pub use schema::{DefaultValue, FieldSpec};
pub use value::{Value, ValueMap, ValueType};
