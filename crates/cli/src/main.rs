//! Ponder CLI: the main entry point.
//!
//! Commands:
//! - `run`    : Solve one goal with the ReAct agent
//! - `tools`  : Show the tool catalogue the model sees
//! - `config` : Print the effective configuration

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(
    name = "ponder",
    about = "Ponder, a ReAct agent that thinks, acts and observes",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    /// Config file (defaults to ~/.ponder/config.toml)
    #[arg(short, long, global = true, env = "PONDER_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the agent on a single goal
    Run(commands::run::RunArgs),

    /// Print the rendered tool catalogue
    Tools,

    /// Print the effective configuration as TOML
    Config {
        /// Print the default template instead
        #[arg(long)]
        default: bool,
    },
}

fn init_tracing(verbose: bool, json: bool) {
    let filter = if verbose { "debug" } else { "info" };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_json);

    match cli.command {
        Commands::Run(args) => {
            let config = commands::load_config(cli.config.as_deref())?;
            commands::run::run(config, args).await?
        }
        Commands::Tools => {
            let config = commands::load_config(cli.config.as_deref())?;
            commands::tools::run(&config)?
        }
        Commands::Config { default } => {
            commands::config_cmd::run(cli.config.as_deref(), default)?
        }
    }

    Ok(())
}
