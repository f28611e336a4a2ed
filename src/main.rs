//! CLI entry point for strata.

mod cmd;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use cmd::diagram::DiagramArgs;
use cmd::graph::GraphFormat;
use cmd::ui::{Output, OutputMode};
use cmd::GraphArgs;

#[derive(Parser)]
#[command(name = "strata")]
#[command(version)]
#[command(about = "Check module dependencies against architecture rules", long_about = None)]
#[command(
    after_help = "GETTING STARTED:\n    Describe layers and rules in .strata/architecture.md, then run\n    strata check\n\n    Set STRATA_LOG=debug (or pass -v) to trace graph construction."
)]
struct Cli {
    /// Emit JSON instead of human-readable output
    #[arg(long, global = true)]
    json: bool,
    /// Only print errors
    #[arg(long, short, global = true)]
    quiet: bool,
    /// Log debug information to stderr
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate every configured rule and diagram
    Check {
        #[command(flatten)]
        graph: GraphArgs,
    },
    /// Print the dependency graph
    Graph {
        #[command(flatten)]
        graph: GraphArgs,
        /// Output format
        #[arg(long, value_enum, default_value_t = GraphFormat::Text)]
        format: GraphFormat,
        /// Include structural parent/child edges
        #[arg(long)]
        containment: bool,
    },
    /// Show the modules each layer resolves to
    Layers {
        #[command(flatten)]
        graph: GraphArgs,
    },
    /// Check a PlantUML component diagram against the code
    Diagram {
        /// Diagram file
        puml: PathBuf,
        /// Dependency manifest; defaults to the one named in the config
        #[arg(long, value_name = "PATH")]
        manifest: Option<PathBuf>,
        /// Module the diagram's component names are relative to
        #[arg(long, value_name = "MODULE")]
        base_module: Option<String>,
        /// Treat arrows as the only allowed dependencies
        #[arg(long)]
        should_only: bool,
        #[command(flatten)]
        graph: GraphArgs,
    },
    /// Generate shell completion script
    Completions {
        /// Shell to generate completions for (bash, zsh, fish, powershell)
        #[arg(value_enum)]
        shell: Shell,
    },
    /// Show version information
    Version,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.verbose) {
        eprintln!("{:#}", e);
    }

    let output = Output::new(OutputMode::from_flags(cli.json, cli.quiet));
    match run(cli.command, &output) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            output.error(&format!("{:#}", e));
            ExitCode::from(2)
        }
    }
}

/// Logs go to stderr; `STRATA_LOG` takes an `EnvFilter` directive.
fn init_logging(verbose: bool) -> Result<()> {
    let filter = if verbose {
        tracing_subscriber::EnvFilter::try_new("debug")
    } else {
        tracing_subscriber::EnvFilter::try_from_env("STRATA_LOG")
            .or_else(|_| tracing_subscriber::EnvFilter::try_new("warn"))
    }
    .context("Failed to create log filter")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .compact()
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to install logger: {}", e))
}

fn run(command: Commands, output: &Output) -> Result<u8> {
    match command {
        Commands::Check { graph } => exit_code(cmd::check::cmd_check(&graph, output)?),
        Commands::Graph {
            graph,
            format,
            containment,
        } => {
            cmd::graph::cmd_graph(&graph, format, containment, output)?;
            Ok(0)
        }
        Commands::Layers { graph } => {
            cmd::layers::cmd_layers(&graph, output)?;
            Ok(0)
        }
        Commands::Diagram {
            puml,
            manifest,
            base_module,
            should_only,
            graph,
        } => {
            let args = DiagramArgs {
                puml: &puml,
                manifest: manifest.as_deref(),
                base_module: base_module.as_deref(),
                should_only,
            };
            exit_code(cmd::diagram::cmd_diagram(&args, &graph, output)?)
        }
        Commands::Completions { shell } => {
            cmd_completions(shell);
            Ok(0)
        }
        Commands::Version => {
            cmd_version();
            Ok(0)
        }
    }
}

fn exit_code(code: i32) -> Result<u8> {
    u8::try_from(code).with_context(|| format!("Invalid exit code {}", code))
}

/// Generate shell completion script
fn cmd_completions(shell: Shell) {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "strata", &mut io::stdout());
}

fn cmd_version() {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    const GIT_SHA: &str = env!("STRATA_GIT_SHA");
    const BUILD_DATE: &str = env!("STRATA_BUILD_DATE");
    println!("strata {}", VERSION);
    println!("commit: {}", GIT_SHA);
    println!("built: {}", BUILD_DATE);
}
