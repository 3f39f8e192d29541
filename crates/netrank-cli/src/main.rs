#![forbid(unsafe_code)]

mod cmd;
mod output;

use anyhow::Context;
use clap::{CommandFactory, Parser, Subcommand};
use netrank_core::config::load_user_config;
use output::{CliError, OutputMode};
use std::env;
use std::process::ExitCode;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "netrank: centrality ranking and community detection for networks",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format.
    #[arg(long, global = true, value_enum)]
    format: Option<OutputMode>,

    /// Emit JSON output (alias for `--format json`).
    #[arg(long, global = true, hide = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    /// Derive the output mode from flags, `FORMAT` and the user config.
    fn output_mode(&self) -> OutputMode {
        if self.format.is_none() && !self.json {
            match load_user_config() {
                Ok(user) => {
                    return output::resolve_output_mode(None, false, user.output.as_deref());
                }
                Err(err) => debug!(%err, "ignoring unreadable user config"),
            }
        }
        output::resolve_output_mode(self.format, self.json, None)
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Operations",
        about = "List registered operations",
        long_about = "List every registered operation with a one-line summary.",
        after_help = "EXAMPLES:\n    # List operations\n    nr ops\n\n    # Emit machine-readable output\n    nr ops --json"
    )]
    Ops(cmd::ops::OpsArgs),

    #[command(
        next_help_heading = "Operations",
        about = "Show an operation's inputs and outputs",
        long_about = "Show the documentation and input/output schema of one operation.",
        after_help = "EXAMPLES:\n    # Describe the degree ranking\n    nr describe create.degree_rank_list\n\n    # Emit machine-readable output\n    nr describe compute.modularity_group --json"
    )]
    Describe(cmd::describe::DescribeArgs),

    #[command(
        next_help_heading = "Operations",
        about = "Run an operation",
        long_about = "Run an operation. Inputs are given as key=value pairs: networks and \
                      tables as file paths, lists as JSON text, scalars literally. Unset \
                      inputs take project defaults from .netrank/config.toml.",
        after_help = "EXAMPLES:\n    # Rank nodes of a GML network by weighted degree\n    nr run create.degree_rank_list -i network_data=letters.gml -i weighted=true\n\n    # Onboard a SQLite database and save the network\n    nr run onboard.sqlite_file -i path=letters.db -i label_column=label --out-dir out/\n\n    # Emit machine-readable output\n    nr run get.network_info -i network_data=out/network_data.json --json"
    )]
    Run(cmd::run::RunArgs),

    #[command(
        next_help_heading = "Project Maintenance",
        about = "Generate shell completion scripts",
        long_about = "Generate shell completion scripts for supported shells.",
        after_help = "EXAMPLES:\n    # Generate bash completions\n    nr completions bash\n\n    # Generate zsh completions\n    nr completions zsh"
    )]
    Completions(cmd::completions::CompletionsArgs),
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("NETRANK_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose || env::var("DEBUG").is_ok() {
            "netrank=debug,info"
        } else {
            "netrank=info,warn"
        })
    });

    let format = env::var("NETRANK_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn dispatch(cli: &Cli, output: OutputMode) -> anyhow::Result<()> {
    match &cli.command {
        Commands::Ops(args) => cmd::ops::run_ops(args, output),
        Commands::Describe(args) => cmd::describe::run_describe(args, output),
        Commands::Run(args) => {
            let project_root = env::current_dir().context("read current directory")?;
            cmd::run::run_operation(args, output, &project_root)
        }
        Commands::Completions(args) => {
            let mut command = Cli::command();
            cmd::completions::run_completions(args.shell, &mut command, &mut std::io::stdout())
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.verbose {
        info!("Verbose mode enabled");
    }

    let output = cli.output_mode();
    match dispatch(&cli, output) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if let Err(render_err) = output::render_error(output, &CliError::from(&err)) {
                eprintln!("error: {err:#} ({render_err})");
            }
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_flag_sets_output_mode() {
        let cli = Cli::parse_from(["nr", "--json", "ops"]);
        assert!(cli.json);
        assert_eq!(cli.output_mode(), OutputMode::Json);
    }

    #[test]
    fn json_flag_after_subcommand() {
        let cli = Cli::parse_from(["nr", "ops", "--json"]);
        assert_eq!(cli.output_mode(), OutputMode::Json);
    }

    #[test]
    fn format_flag_parses() {
        let cli = Cli::parse_from(["nr", "describe", "get.network_info", "--format", "text"]);
        assert_eq!(cli.format, Some(OutputMode::Text));
        assert_eq!(cli.output_mode(), OutputMode::Text);
    }

    #[test]
    fn unknown_format_is_rejected() {
        assert!(Cli::try_parse_from(["nr", "--format", "yaml", "ops"]).is_err());
    }

    #[test]
    fn run_collects_repeated_inputs() {
        let cli = Cli::parse_from([
            "nr",
            "run",
            "create.degree_rank_list",
            "-i",
            "network_data=letters.gml",
            "--input",
            "weighted=true",
            "--out-dir",
            "out",
        ]);
        let Commands::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.operation, "create.degree_rank_list");
        assert_eq!(args.inputs.len(), 2);
        assert_eq!(args.inputs[1], ("weighted".to_string(), "true".to_string()));
        assert_eq!(args.out_dir.as_deref(), Some(std::path::Path::new("out")));
    }

    #[test]
    fn run_rejects_input_without_equals() {
        assert!(Cli::try_parse_from(["nr", "run", "get.network_info", "-i", "network_data"]).is_err());
    }

    #[test]
    fn completions_subcommand_parses() {
        let cli = Cli::parse_from(["nr", "completions", "bash"]);
        assert!(matches!(
            cli.command,
            Commands::Completions(cmd::completions::CompletionsArgs {
                shell: clap_complete::Shell::Bash,
            })
        ));
    }

    #[test]
    fn verbose_flag_is_global() {
        let cli = Cli::parse_from(["nr", "ops", "-v"]);
        assert!(cli.verbose);
    }
}
