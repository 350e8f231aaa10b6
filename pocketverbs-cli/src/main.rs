//! PocketVerbs CLI: offline WAV renderer and real-time player.

mod audio;
mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "pocketverbs")]
#[command(author, version, about = "Six-algorithm stereo reverb", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process a WAV file and write a 32-bit float stereo WAV
    Render(commands::render::RenderArgs),

    /// Stream a processed WAV file to an output device
    Play(commands::play::PlayArgs),

    /// List output devices
    Devices,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Render(args) => commands::render::run(&args),
        Commands::Play(args) => commands::play::run(&args),
        Commands::Devices => commands::devices::run(),
    }
}
