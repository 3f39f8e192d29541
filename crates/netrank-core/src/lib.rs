//! netrank-core: data model, onboarding and configuration.
//!
//! # Conventions
//!
//! - **Errors**: library functions return [`error::Result`] with
//!   [`error::NetrankError`]; every variant maps to a stable `E####` code.
//! - **Logging**: use `tracing` macros (`info!`, `warn!`, `debug!`, `trace!`).

pub mod config;
pub mod error;
pub mod gml;
pub mod network;
pub mod onboard;
pub mod table;

pub use error::{ErrorCode, NetrankError, Result};
pub use network::{Attributes, EdgeRecord, NetworkData, NodeRecord, WeightMeaning};
pub use table::Table;
