//! Config command - print or write the effective game config
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: write_config(), print_config()

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use candyline_core::GameConfig;

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct ConfigArgs {
    /// Write the config to this file instead of stdout
    #[arg(long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run config command
///
/// The config has already been loaded (defaults, `--config` file and
/// `--seed`) and validated; this only echoes it.
pub fn run(args: ConfigArgs, config: GameConfig) -> Result<()> {
    match &args.output {
        Some(path) => write_config(&config, path),
        None => print_config(&config),
    }
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

fn write_config(config: &GameConfig, path: &Path) -> Result<()> {
    config
        .save(path)
        .with_context(|| format!("Failed to write config: {}", path.display()))?;
    tracing::info!("Wrote config to {}", path.display());
    Ok(())
}

fn print_config(config: &GameConfig) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(config)?);
    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_config_round_trips() {
        let path = std::env::temp_dir().join(format!("candyline-cli-config-{}.json", std::process::id()));
        let config = GameConfig::with_size(7, 9).with_seed(1234);

        run(
            ConfigArgs {
                output: Some(path.clone()),
            },
            config.clone(),
        )
        .unwrap();

        let loaded = GameConfig::load(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded, config);
    }
}
