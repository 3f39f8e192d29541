//! Shared output layer for pretty/text/JSON parity across all CLI commands.
//!
//! Every command handler receives an [`OutputMode`] and formats its output
//! accordingly: aligned sections for humans, tab-separated text for pipes,
//! or stable JSON.
//!
//! # Output mode resolution
//!
//! Precedence (highest wins):
//! 1. `--format` / hidden `--json` flag
//! 2. `FORMAT` env var → `"pretty"` | `"text"` | `"json"`
//! 3. `output` in the user config
//! 4. Default: [`OutputMode::Pretty`] if stdout is a TTY; [`OutputMode::Text`] if piped.

use clap::ValueEnum;
use netrank_core::config::resolve_output;
use netrank_core::table::cell_to_string;
use netrank_core::{NetrankError, Table};
use serde::Serialize;
use std::io::{self, Write};

/// Shared width for human pretty separators.
pub const PRETTY_RULE_WIDTH: usize = 72;

/// Write a horizontal separator used by pretty human output.
pub fn pretty_rule(w: &mut dyn Write) -> io::Result<()> {
    writeln!(w, "{:-<width$}", "", width = PRETTY_RULE_WIDTH)
}

/// Write a section heading followed by a separator.
pub fn pretty_section(w: &mut dyn Write, heading: &str) -> io::Result<()> {
    writeln!(w, "{heading}")?;
    pretty_rule(w)
}

/// Render a left-aligned key/value line in human output.
pub fn pretty_kv(w: &mut dyn Write, key: &str, value: impl AsRef<str>) -> io::Result<()> {
    writeln!(w, "{:<16} {}", format!("{key}:"), value.as_ref())
}

/// The three output modes supported by the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputMode {
    /// Human-optimized output (aligned tables, sections).
    Pretty,
    /// Tab-separated text for scripts and pipes.
    Text,
    /// Machine-readable JSON.
    Json,
}

impl OutputMode {
    /// Mode for a canonical name from [`resolve_output`].
    fn from_name(name: &str) -> Self {
        match name {
            "json" => Self::Json,
            "text" => Self::Text,
            _ => Self::Pretty,
        }
    }
}

/// Resolve the output mode from CLI flags, environment, user config and TTY.
pub fn resolve_output_mode(
    format_flag: Option<OutputMode>,
    json_flag: bool,
    user_output: Option<&str>,
) -> OutputMode {
    if let Some(mode) = format_flag {
        return mode;
    }
    OutputMode::from_name(resolve_output(json_flag, user_output))
}

/// Render a serializable value with explicit pretty/text renderers.
pub fn render_mode<T: Serialize>(
    mode: OutputMode,
    value: &T,
    text_fn: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
    pretty_fn: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match mode {
        OutputMode::Json => {
            serde_json::to_writer_pretty(&mut out, value)?;
            writeln!(out)?;
        }
        OutputMode::Text => text_fn(value, &mut out)?,
        OutputMode::Pretty => pretty_fn(value, &mut out)?,
    }
    Ok(())
}

/// Write a table as tab-separated rows with a header line.
pub fn write_table_text(w: &mut dyn Write, table: &Table) -> io::Result<()> {
    writeln!(w, "{}", table.columns().join("\t"))?;
    for row in table.rows() {
        let cells: Vec<String> = row.iter().map(cell_to_string).collect();
        writeln!(w, "{}", cells.join("\t"))?;
    }
    Ok(())
}

/// Write a table with columns padded to their widest cell.
pub fn write_table_pretty(w: &mut dyn Write, table: &Table) -> io::Result<()> {
    let cells: Vec<Vec<String>> = table
        .rows()
        .iter()
        .map(|row| row.iter().map(cell_to_string).collect())
        .collect();
    let mut widths: Vec<usize> = table.columns().iter().map(|c| c.chars().count()).collect();
    for row in &cells {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let line = |w: &mut dyn Write, row: &[String]| -> io::Result<()> {
        let padded: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{cell:<width$}"))
            .collect();
        writeln!(w, "{}", padded.join("  ").trim_end())
    };

    line(w, table.columns())?;
    let rule: Vec<String> = widths.iter().map(|width| "-".repeat(*width)).collect();
    line(w, &rule)?;
    for row in &cells {
        line(w, row)?;
    }
    if cells.is_empty() {
        writeln!(w, "(no rows)")?;
    }
    Ok(())
}

/// A structured error with optional suggestion and error code.
#[derive(Debug, Serialize)]
pub struct CliError {
    /// Human-readable error message.
    pub message: String,
    /// Optional suggestion for how to fix the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    /// Machine-readable error code (e.g. "E2001").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
}

impl CliError {
    /// Create a simple error with just a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            suggestion: None,
            error_code: None,
        }
    }
}

impl From<&NetrankError> for CliError {
    fn from(err: &NetrankError) -> Self {
        Self {
            message: err.to_string(),
            suggestion: err.hint().map(String::from),
            error_code: Some(err.code().code().to_string()),
        }
    }
}

impl From<&anyhow::Error> for CliError {
    /// Keeps the code and hint of a [`NetrankError`] anywhere in the chain,
    /// and the full context chain as the message.
    fn from(err: &anyhow::Error) -> Self {
        let message = format!("{err:#}");
        match err.chain().find_map(|e| e.downcast_ref::<NetrankError>()) {
            Some(domain) => Self {
                message,
                ..Self::from(domain)
            },
            None => Self::new(message),
        }
    }
}

/// Render an error to stderr in the requested format.
pub fn render_error(mode: OutputMode, error: &CliError) -> anyhow::Result<()> {
    let stderr = io::stderr();
    let mut out = stderr.lock();
    match mode {
        OutputMode::Json => {
            let wrapper = serde_json::json!({
                "error": error,
            });
            serde_json::to_writer_pretty(&mut out, &wrapper)?;
            writeln!(out)?;
        }
        OutputMode::Pretty | OutputMode::Text => {
            match &error.error_code {
                Some(code) => writeln!(out, "error[{code}]: {}", error.message)?,
                None => writeln!(out, "error: {}", error.message)?,
            }
            if let Some(ref suggestion) = error.suggestion {
                writeln!(out, "  suggestion: {suggestion}")?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;
    use serde_json::json;

    fn ranked() -> Table {
        let mut t = Table::new(["Rank", "Node", "Degree Score"]);
        t.push_row(vec![json!(1), json!("hub"), json!(3)]).unwrap();
        t.push_row(vec![json!(2), json!("a"), json!(1)]).unwrap();
        t
    }

    #[test]
    fn format_flag_wins() {
        let mode = resolve_output_mode(Some(OutputMode::Text), true, Some("pretty"));
        assert_eq!(mode, OutputMode::Text);
    }

    #[test]
    fn json_flag_selects_json() {
        assert_eq!(resolve_output_mode(None, true, Some("text")), OutputMode::Json);
    }

    #[test]
    fn canonical_names_map_to_modes() {
        assert_eq!(OutputMode::from_name("json"), OutputMode::Json);
        assert_eq!(OutputMode::from_name("text"), OutputMode::Text);
        assert_eq!(OutputMode::from_name("pretty"), OutputMode::Pretty);
    }

    #[test]
    fn text_table_is_tab_separated() {
        let mut buf = Vec::new();
        write_table_text(&mut buf, &ranked()).unwrap();
        let s = String::from_utf8(buf).unwrap();
        assert_eq!(s, "Rank\tNode\tDegree Score\n1\thub\t3\n2\ta\t1\n");
    }

    #[test]
    fn pretty_table_aligns_columns() {
        let mut buf = Vec::new();
        write_table_pretty(&mut buf, &ranked()).unwrap();
        let s = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = s.lines().collect();
        assert_eq!(lines[0], "Rank  Node  Degree Score");
        assert_eq!(lines[1], "----  ----  ------------");
        assert_eq!(lines[2], "1     hub   3");
    }

    #[test]
    fn pretty_table_marks_empty() {
        let mut buf = Vec::new();
        write_table_pretty(&mut buf, &Table::new(["Rank"])).unwrap();
        assert!(String::from_utf8(buf).unwrap().ends_with("(no rows)\n"));
    }

    #[test]
    fn cli_error_keeps_domain_code_through_context() {
        let err: anyhow::Result<()> = Err(NetrankError::MissingInput {
            field: "network_data".into(),
        })
        .context("run create.degree_rank_list");
        let err = err.unwrap_err();
        let cli = CliError::from(&err);
        assert!(cli.message.starts_with("run create.degree_rank_list: "));
        assert!(cli.message.contains("network_data"));
        assert!(cli.error_code.is_some_and(|c| c.starts_with('E')));
    }

    #[test]
    fn cli_error_without_domain_error_has_no_code() {
        let err = anyhow::anyhow!("boom");
        let cli = CliError::from(&err);
        assert_eq!(cli.message, "boom");
        assert!(cli.error_code.is_none());
        assert!(cli.suggestion.is_none());
    }
}
