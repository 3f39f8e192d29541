//! Operation registry.
//!
//! A [`Registry`] maps operation names to implementations. It is assembled
//! once from a list of operations and never changes afterwards; the
//! process-wide instance behind [`Registry::global`] is built on first use
//! from [`crate::ops::builtins`].

use std::collections::BTreeMap;
use std::sync::OnceLock;

use netrank_core::{NetrankError, Result};
use tracing::debug;

use crate::operation::Operation;
use crate::value::ValueMap;

static GLOBAL: OnceLock<Result<Registry, String>> = OnceLock::new();

/// Immutable name → operation map.
pub struct Registry {
    operations: BTreeMap<&'static str, Box<dyn Operation>>,
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("operations", &self.operations.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Registry {
    /// Build a registry from `operations`.
    ///
    /// # Errors
    ///
    /// Returns [`NetrankError::Internal`] if two operations share a name.
    pub fn new(operations: Vec<Box<dyn Operation>>) -> Result<Self> {
        let mut map: BTreeMap<&'static str, Box<dyn Operation>> = BTreeMap::new();
        for op in operations {
            let name = op.name();
            if map.insert(name, op).is_some() {
                return Err(NetrankError::Internal(format!(
                    "operation '{name}' is registered twice"
                )));
            }
        }
        debug!(operations = map.len(), "built operation registry");
        Ok(Self { operations: map })
    }

    /// The process-wide registry of built-in operations.
    ///
    /// # Errors
    ///
    /// Returns [`NetrankError::Internal`] if the built-in table is invalid.
    pub fn global() -> Result<&'static Self> {
        GLOBAL
            .get_or_init(|| Self::new(crate::ops::builtins()).map_err(|e| e.to_string()))
            .as_ref()
            .map_err(|e| NetrankError::Internal(e.clone()))
    }

    /// Look up an operation by name.
    ///
    /// # Errors
    ///
    /// Returns [`NetrankError::UnknownOperation`] for an unregistered name.
    pub fn get(&self, name: &str) -> Result<&dyn Operation> {
        self.operations
            .get(name)
            .map(|op| &**op)
            .ok_or_else(|| NetrankError::UnknownOperation(name.to_string()))
    }

    /// Registered names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.operations.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Operation> {
        self.operations.values().map(|op| &**op)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Look up `name` and execute it with `inputs`.
    ///
    /// # Errors
    ///
    /// Unknown operation, or any error from [`Operation::execute`].
    pub fn run(&self, name: &str, inputs: ValueMap) -> Result<ValueMap> {
        self.get(name)?.execute(inputs)
    }
}
