#![forbid(unsafe_code)]

mod cmd;
mod output;

use cairn_core::ErrorCode;
use cairn_core::config::resolve_config;
use clap::{CommandFactory, Parser, Subcommand};
use output::{CliError, OutputMode, render_error, resolve_output_mode};
use std::env;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    name = "cairn",
    author,
    version,
    about = "cairn: dependency analysis and build planning for multi-canister projects",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging (ignored when CAIRN_LOG is set).
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON output instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Output format. Overrides `--json`, `FORMAT` and the user config.
    #[arg(long, global = true, value_enum, value_name = "FORMAT")]
    format: Option<OutputMode>,

    /// Project root (default: current directory).
    #[arg(long, global = true, value_name = "DIR")]
    root: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        about = "Analyze the project manifest",
        long_about = "Build the dependency graph, detect cycles and compute the build order and deploy waves.",
        after_help = "EXAMPLES:\n    # Analyze dfx.json in the current directory\n    cairn analyze\n\n    # Fail when the project is not deployable\n    cairn analyze --strict\n\n    # Emit machine-readable output\n    cairn analyze --json"
    )]
    Analyze(cmd::analyze::AnalyzeArgs),

    #[command(
        about = "Print the build order",
        long_about = "Print the deterministic build order. Units on or behind a cycle are left out.",
        after_help = "EXAMPLES:\n    # One unit per line, dependencies first\n    cairn order --format text"
    )]
    Order(cmd::order::OrderArgs),

    #[command(
        about = "List dependency cycles",
        long_about = "List dependency cycles and the edge to remove to break each one.",
        after_help = "EXAMPLES:\n    # Show cycles\n    cairn cycles\n\n    # Emit machine-readable output\n    cairn cycles --json"
    )]
    Cycles(cmd::cycles::CyclesArgs),

    #[command(
        about = "Show deploy waves",
        long_about = "Group buildable units into waves that can be deployed in parallel.",
        after_help = "EXAMPLES:\n    # Show the deploy plan\n    cairn plan"
    )]
    Plan(cmd::plan::PlanArgs),

    #[command(
        about = "Generate shell completion scripts",
        after_help = "EXAMPLES:\n    # Generate bash completions\n    cairn completions bash"
    )]
    Completions(cmd::completions::CompletionsArgs),
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("CAIRN_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose || env::var("DEBUG").is_ok() {
            "cairn=debug,info"
        } else {
            "cairn=info,warn"
        })
    });

    let format = env::var("CAIRN_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    // Logs go to stderr; stdout carries command output only.
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

    if let Commands::Completions(ref args) = cli.command {
        let mut command = Cli::command();
        let mut out = std::io::stdout();
        return cmd::completions::run_completions(args, &mut command, &mut out);
    }

    let project_root = match cli.root {
        Some(ref root) => root.clone(),
        None => env::current_dir()?,
    };

    let config = match resolve_config(&project_root, cli.json) {
        Ok(config) => config,
        Err(err) => {
            let output = resolve_output_mode(cli.format, cli.json);
            render_error(
                output,
                &CliError::from_code(ErrorCode::ConfigParseError, format!("{err:#}")),
            )?;
            return Err(err);
        }
    };
    let output = cli
        .format
        .unwrap_or_else(|| OutputMode::from_resolved(&config.resolved_output));
    debug!(root = %project_root.display(), ?output, "resolved configuration");

    let project = &config.project;
    match cli.command {
        Commands::Analyze(ref args) => {
            cmd::analyze::run_analyze(args, output, &project_root, project)
        }
        Commands::Order(ref args) => cmd::order::run_order(args, output, &project_root, project),
        Commands::Cycles(ref args) => {
            cmd::cycles::run_cycles(args, output, &project_root, project)
        }
        Commands::Plan(ref args) => cmd::plan::run_plan(args, output, &project_root, project),
        Commands::Completions(_) => Ok(()),
    }
}
