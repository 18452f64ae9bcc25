//! Candyline CLI - Command-line host for the match-three engine
//!
//! Commands:
//! - play: Play automated turns on one board
//! - bench: Run many independent sessions in parallel
//! - config: Print or write the effective game config

mod autoplay;
mod benchmark;
mod config_cmd;
mod play;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use candyline_core::GameConfig;

#[derive(Parser)]
#[command(name = "candyline")]
#[command(about = "Headless match-three board engine")]
#[command(version)]
struct Cli {
    /// Random seed (overrides the config file)
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Game config JSON file
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play automated turns on one board
    Play(play::PlayArgs),
    /// Benchmark independent sessions in parallel
    Bench(benchmark::BenchmarkArgs),
    /// Print or write the effective config
    Config(config_cmd::ConfigArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = load_config(cli.config.as_deref(), cli.seed)?;

    match cli.command {
        Commands::Play(args) => play::run(args, config),
        Commands::Bench(args) => benchmark::run(args, config),
        Commands::Config(args) => config_cmd::run(args, config),
    }
}

/// Log to stderr so JSON output on stdout stays clean
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Defaults, then the config file, then `--seed`
fn load_config(path: Option<&Path>, seed: Option<u64>) -> Result<GameConfig> {
    let mut config = match path {
        Some(path) => GameConfig::load(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => GameConfig::default(),
    };
    if let Some(seed) = seed {
        config.seed = Some(seed);
    }
    config.validate().context("Invalid config")?;
    Ok(config)
}
