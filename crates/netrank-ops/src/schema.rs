//! Input and output schemas.
//!
//! An operation describes each field it reads or writes with a
//! [`FieldSpec`]. [`bind_inputs`] checks caller inputs against the input
//! schema and fills defaults before the operation runs; [`check_outputs`]
//! checks the produced values against the output schema afterwards.

use serde::Serialize;

use netrank_core::{NetrankError, Result};

use crate::value::{Value, ValueMap, ValueType};

/// Default for an optional scalar field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum DefaultValue {
    String(&'static str),
    Integer(i64),
    Boolean(bool),
}

impl DefaultValue {
    #[must_use]
    pub const fn value_type(self) -> ValueType {
        match self {
            Self::String(_) => ValueType::String,
            Self::Integer(_) => ValueType::Integer,
            Self::Boolean(_) => ValueType::Boolean,
        }
    }

    #[must_use]
    pub fn to_value(self) -> Value {
        match self {
            Self::String(s) => Value::from(s),
            Self::Integer(i) => Value::Integer(i),
            Self::Boolean(b) => Value::Boolean(b),
        }
    }
}

/// One named input or output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldSpec {
    pub name: &'static str,
    #[serde(rename = "type")]
    pub ty: ValueType,
    pub doc: &'static str,
    pub optional: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<DefaultValue>,
}

impl FieldSpec {
    #[must_use]
    pub const fn required(name: &'static str, ty: ValueType, doc: &'static str) -> Self {
        Self {
            name,
            ty,
            doc,
            optional: false,
            default: None,
        }
    }

    #[must_use]
    pub const fn optional(name: &'static str, ty: ValueType, doc: &'static str) -> Self {
        Self {
            name,
            ty,
            doc,
            optional: true,
            default: None,
        }
    }

    /// Optional with a default filled in by [`bind_inputs`].
    #[must_use]
    pub const fn with_default(mut self, default: DefaultValue) -> Self {
        self.optional = true;
        self.default = Some(default);
        self
    }
}

/// Validate `inputs` against `schema` and fill defaults.
///
/// # Errors
///
/// - [`NetrankError::InvalidInput`] for a name the schema does not declare.
/// - [`NetrankError::InputType`] for a value of the wrong type.
/// - [`NetrankError::MissingInput`] for an absent required field.
pub fn bind_inputs(schema: &[FieldSpec], mut inputs: ValueMap) -> Result<ValueMap> {
    for (name, value) in inputs.iter() {
        let Some(decl) = schema.iter().find(|f| f.name == name) else {
            let known: Vec<&str> = schema.iter().map(|f| f.name).collect();
            return Err(NetrankError::invalid_input(
                name,
                format!("not an input of this operation (expected one of: {})", known.join(", ")),
            ));
        };
        if value.value_type() != decl.ty {
            return Err(NetrankError::InputType {
                field: name.to_string(),
                expected: decl.ty.as_str(),
                actual: value.value_type().as_str(),
            });
        }
    }

    for decl in schema {
        if inputs.contains(decl.name) {
            continue;
        }
        match decl.default {
            Some(default) => {
                inputs.insert(decl.name, default.to_value());
            }
            None if decl.optional => {}
            None => {
                return Err(NetrankError::MissingInput {
                    field: decl.name.to_string(),
                });
            }
        }
    }

    Ok(inputs)
}

/// Check produced `outputs` against `schema`.
///
/// # Errors
///
/// Returns [`NetrankError::Internal`] for an undeclared, mistyped or
/// missing required output.
pub fn check_outputs(schema: &[FieldSpec], outputs: &ValueMap) -> Result<()> {
    for (name, value) in outputs.iter() {
        match schema.iter().find(|f| f.name == name) {
            Some(decl) if decl.ty == value.value_type() => {}
            Some(decl) => {
                return Err(NetrankError::Internal(format!(
                    "output '{name}' has type {}, declared {}",
                    value.value_type(),
                    decl.ty
                )));
            }
            None => {
                return Err(NetrankError::Internal(format!(
                    "output '{name}' is not declared"
                )));
            }
        }
    }
    if let Some(missing) = schema
        .iter()
        .find(|f| !f.optional && !outputs.contains(f.name))
    {
        return Err(NetrankError::Internal(format!(
            "output '{}' was not produced",
            missing.name
        )));
    }
    Ok(())
}
