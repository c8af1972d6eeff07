//! Unfoldings CLI - offline microsound renderer.

mod commands;

use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "unfoldings")]
#[command(author, version, about = "Microsound unfolding renderer", long_about = None)]
struct Cli {
    /// More log output (repeat for trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render an unfolding to a WAV file
    Render(commands::render::RenderArgs),

    /// List or show factory presets
    Presets(commands::presets::PresetsArgs),

    /// List beauty scenes and the parameters they overwrite
    Scenes(commands::scenes::ScenesArgs),

    /// List the parameter surface
    Params(commands::params::ParamsArgs),

    /// List saved sessions
    Sessions(commands::sessions::SessionsArgs),

    /// Display WAV file information
    Info(commands::info::InfoArgs),
}

fn init_tracing(verbose: u8, quiet: bool) {
    let default = match (quiet, verbose) {
        (true, _) => "warn",
        (false, 0) => "info",
        (false, 1) => "debug",
        (false, _) => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    match cli.command {
        Commands::Render(args) => commands::render::run(args),
        Commands::Presets(args) => commands::presets::run(args),
        Commands::Scenes(args) => commands::scenes::run(args),
        Commands::Params(args) => commands::params::run(args),
        Commands::Sessions(args) => commands::sessions::run(args),
        Commands::Info(args) => commands::info::run(args),
    }
}
