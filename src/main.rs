//! Audio Extend CLI
//!
//! Command-line interface for the audio-extend augmentation pipeline.

use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use audio_extend::cli::{commands, Cli, Commands};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins over -v
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    debug!("audio-extend v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Extend {
            input,
            output,
            args,
        } => commands::extend(&input, &output, &args),
        Commands::Batch {
            input_dir,
            output_dir,
            recursive,
            args,
        } => commands::batch(&input_dir, &output_dir, recursive, &args),
        Commands::Variants {
            input,
            output_dir,
            count,
            args,
        } => commands::variants(&input, &output_dir, count, &args),
    }
}
