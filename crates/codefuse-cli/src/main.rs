#![forbid(unsafe_code)]

mod cmd;
mod output;

use clap::{Parser, Subcommand};
use output::{OutputMode, resolve_output_mode};
use std::env;
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "codefuse: hybrid lexical + semantic code search",
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
    fn output_mode(&self) -> OutputMode {
        resolve_output_mode(self.format, self.json)
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        about = "Search a source tree",
        long_about = "Search a source tree with ripgrep and rank the matches.\n\n\
                      Results from a semantic index are fused in when one is available.",
        after_help = "EXAMPLES:\n    # Search the current directory\n    codefuse search 'fn main'\n\n\
                      # Search another tree, keep ten keyword matches\n    codefuse search parse_config ../other -k 10\n\n\
                      # Use ripgrep's plain output\n    codefuse search TODO --plain\n\n\
                      # Machine-readable output\n    codefuse search TODO --format json"
    )]
    Search(cmd::search::SearchArgs),

    #[command(
        about = "Show the effective configuration",
        long_about = "Print the configuration resolved from .codefuse.toml and defaults.",
        after_help = "EXAMPLES:\n    # Show config for the current directory\n    codefuse config\n\n\
                      # Emit machine-readable output\n    codefuse config --format json"
    )]
    Config(cmd::config::ConfigArgs),
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("CODEFUSE_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose || env::var("DEBUG").is_ok() {
            "codefuse=debug,info"
        } else {
            "codefuse=info,warn"
        })
    });

    let format = env::var("CODEFUSE_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

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

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let output = cli.output_mode();
    debug!(?output, "resolved output mode");

    match cli.command {
        Commands::Search(ref args) => cmd::search::run_search(args, output),
        Commands::Config(ref args) => cmd::config::run_config(args, output),
    }
}
