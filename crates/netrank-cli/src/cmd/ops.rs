use anyhow::Result;
use clap::Args;
use netrank_ops::Registry;
use serde::Serialize;
use std::io::{self, Write};

use crate::output::{OutputMode, pretty_section, render_mode};

/// Arguments for `nr ops`.
#[derive(Args, Debug)]
pub struct OpsArgs {
    /// Only list operations whose name starts with this prefix.
    #[arg(long)]
    pub prefix: Option<String>,
}

#[derive(Debug, Serialize)]
struct OperationSummary {
    name: &'static str,
    summary: String,
}

/// First sentence of an operation doc, whitespace-collapsed.
fn summary(doc: &str) -> String {
    let collapsed = doc.split_whitespace().collect::<Vec<_>>().join(" ");
    match collapsed.find(". ") {
        Some(end) => collapsed[..=end].to_string(),
        None => collapsed,
    }
}

fn list(registry: &Registry, prefix: Option<&str>) -> Vec<OperationSummary> {
    registry
        .iter()
        .filter(|op| prefix.is_none_or(|p| op.name().starts_with(p)))
        .map(|op| OperationSummary {
            name: op.name(),
            summary: summary(op.doc()),
        })
        .collect()
}

/// List registered operations.
///
/// # Errors
///
/// Returns an error if the registry cannot be built or writing fails.
pub fn run_ops(args: &OpsArgs, output: OutputMode) -> Result<()> {
    let ops = list(Registry::global()?, args.prefix.as_deref());
    render_mode(
        output,
        &ops,
        |ops, w| {
            for op in ops {
                writeln!(w, "{}\t{}", op.name, op.summary)?;
            }
            Ok(())
        },
        |ops, w| pretty_list(ops, w),
    )
}

fn pretty_list(ops: &[OperationSummary], w: &mut dyn Write) -> io::Result<()> {
    pretty_section(w, &format!("Operations ({})", ops.len()))?;
    let width = ops.iter().map(|op| op.name.len()).max().unwrap_or_default();
    for op in ops {
        writeln!(w, "{:<width$}  {}", op.name, op.summary)?;
    }
    Ok(())
}
