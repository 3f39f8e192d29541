use anyhow::Result;
use clap::Args;
use netrank_ops::{DefaultValue, FieldSpec, Operation, Registry};
use serde::Serialize;
use std::io::{self, Write};

use crate::output::{OutputMode, pretty_kv, pretty_section, render_mode};

/// Arguments for `nr describe`.
#[derive(Args, Debug)]
pub struct DescribeArgs {
    /// Operation name, e.g. `create.degree_rank_list`.
    pub operation: String,
}

#[derive(Debug, Serialize)]
struct Description {
    name: &'static str,
    doc: &'static str,
    inputs: &'static [FieldSpec],
    outputs: &'static [FieldSpec],
}

impl Description {
    fn of(op: &dyn Operation) -> Self {
        Self {
            name: op.name(),
            doc: op.doc(),
            inputs: op.inputs_schema(),
            outputs: op.outputs_schema(),
        }
    }
}

/// `required`, `optional`, or `default=<value>`.
fn requirement(field: &FieldSpec) -> String {
    match (field.default, field.optional) {
        (Some(DefaultValue::String(s)), _) => format!("default={s}"),
        (Some(DefaultValue::Integer(i)), _) => format!("default={i}"),
        (Some(DefaultValue::Boolean(b)), _) => format!("default={b}"),
        (None, true) => "optional".to_string(),
        (None, false) => "required".to_string(),
    }
}

/// Show the schema of one operation.
///
/// # Errors
///
/// Returns an error for an unknown operation name or if writing fails.
pub fn run_describe(args: &DescribeArgs, output: OutputMode) -> Result<()> {
    let op = Registry::global()?.get(&args.operation)?;
    render_mode(output, &Description::of(op), write_text, write_pretty)
}

fn write_text(d: &Description, w: &mut dyn Write) -> io::Result<()> {
    writeln!(w, "{}", d.name)?;
    for (direction, fields) in [("input", d.inputs), ("output", d.outputs)] {
        for field in fields {
            writeln!(
                w,
                "{direction}\t{}\t{}\t{}",
                field.name,
                field.ty,
                requirement(field)
            )?;
        }
    }
    Ok(())
}

fn write_pretty(d: &Description, w: &mut dyn Write) -> io::Result<()> {
    pretty_section(w, d.name)?;
    writeln!(w, "{}", d.doc)?;
    for (heading, fields) in [("Inputs", d.inputs), ("Outputs", d.outputs)] {
        writeln!(w)?;
        pretty_section(w, heading)?;
        for field in fields {
            pretty_kv(
                w,
                field.name,
                format!("{} ({}) {}", field.ty, requirement(field), field.doc),
            )?;
        }
    }
    Ok(())
}
