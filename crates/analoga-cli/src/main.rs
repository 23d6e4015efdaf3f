//! analoga CLI - offline renders and listings for the analoga synth engine.

mod commands;
mod config;
mod error;
mod render;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "analoga")]
#[command(author, version, about = "analoga synth engine CLI", long_about = None)]
struct Cli {
    /// Log engine reconfiguration at debug level
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render notes through the engine to a WAV file
    Render(commands::render::RenderArgs),

    /// List synth models
    Models(commands::models::ModelsArgs),

    /// List console modes
    Consoles(commands::consoles::ConsolesArgs),

    /// List parameters with ranges and defaults
    Params(commands::params::ParamsArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| default_level.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Render(args) => commands::render::run(args),
        Commands::Models(args) => commands::models::run(args),
        Commands::Consoles(args) => commands::consoles::run(args),
        Commands::Params(args) => commands::params::run(args),
    }
}
