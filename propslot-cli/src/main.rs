//! # propslot CLI
//!
//! Replays the reference property panel and inspects YAML scenes through the
//! property engine.

mod commands;
mod scene;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "propslot")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = commands::DEFAULT_CONFIG)]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay the reference panel: every property kind plus an item list
    Demo {
        /// Number of draw passes to simulate
        #[arg(long, default_value_t = 1)]
        passes: usize,

        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Register the properties of a scene file and print every slot
    Inspect {
        /// Scene file (YAML)
        scene: PathBuf,

        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so --json output stays parseable
    let subscriber = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(if cli.verbose {
                tracing::Level::DEBUG.into()
            } else {
                tracing::Level::INFO.into()
            }),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Demo { passes, json } => commands::run_demo(&cli.config, passes, json),
        Commands::Inspect { scene, json } => commands::inspect_scene(&cli.config, &scene, json),
    }
}
