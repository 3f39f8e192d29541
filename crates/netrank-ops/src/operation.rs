//! The operation interface.

use std::time::Instant;

use netrank_core::Result;
use tracing::{debug, info_span};

use crate::schema::{FieldSpec, bind_inputs, check_outputs};
use crate::value::ValueMap;

/// A named, schema-described transformation from input values to output
/// values.
///
/// Implementations are stateless; [`Operation::run`] must not depend on
/// anything but its inputs.
pub trait Operation: Send + Sync {
    /// Dotted registry name, e.g. `create.degree_rank_list`.
    fn name(&self) -> &'static str;

    /// One-paragraph description.
    fn doc(&self) -> &'static str;

    fn inputs_schema(&self) -> &'static [FieldSpec];

    fn outputs_schema(&self) -> &'static [FieldSpec];

    /// Compute outputs from bound inputs (defaults already filled).
    ///
    /// # Errors
    ///
    /// Any domain error raised by the operation.
    fn run(&self, inputs: &ValueMap) -> Result<ValueMap>;

    /// Bind `inputs` against the input schema, run, and check the outputs
    /// against the output schema.
    ///
    /// # Errors
    ///
    /// Schema violations on either side, or the error from [`Operation::run`].
    fn execute(&self, inputs: ValueMap) -> Result<ValueMap> {
        let span = info_span!("operation", name = self.name());
        let _guard = span.enter();

        let started = Instant::now();
        let bound = bind_inputs(self.inputs_schema(), inputs)?;
        let outputs = self.run(&bound)?;
        check_outputs(self.outputs_schema(), &outputs)?;
        debug!(
            outputs = outputs.len(),
            elapsed_ms = started.elapsed().as_millis(),
            "operation finished"
        );
        Ok(outputs)
    }
}
