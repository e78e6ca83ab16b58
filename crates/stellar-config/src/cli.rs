//! Command-line argument parsing for the galaxy server.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Galaxy server command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "stellar-server", about = "Stellar galaxy simulation server")]
pub struct CliArgs {
    /// Generation seed (omit for a different galaxy every run).
    #[arg(long)]
    pub seed: Option<u64>,

    /// Galaxy side length.
    #[arg(long)]
    pub extent: Option<f64>,

    /// Generation zone side length.
    #[arg(long)]
    pub zone_size: Option<f64>,

    /// Extraction tick interval in milliseconds.
    #[arg(long)]
    pub tick_ms: Option<u64>,

    /// Stop after this many ticks instead of running until Ctrl-C.
    #[arg(long)]
    pub ticks: Option<u64>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory.
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(seed) = args.seed {
            self.galaxy.seed = Some(seed);
        }
        if let Some(extent) = args.extent {
            self.galaxy.extent = extent;
        }
        if let Some(zone) = args.zone_size {
            self.galaxy.zone_size = zone;
        }
        if let Some(ms) = args.tick_ms {
            self.simulation.tick_interval_ms = ms;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_override() {
        let mut config = Config::default();
        let args = CliArgs {
            seed: Some(42),
            tick_ms: Some(100),
            ..Default::default()
        };
        config.apply_cli_overrides(&args);
        assert_eq!(config.galaxy.seed, Some(42));
        assert_eq!(config.simulation.tick_interval_ms, 100);
        // Non-overridden fields retain defaults
        assert_eq!(config.galaxy.extent, 100_000.0);
        assert_eq!(config.debug.log_level, "info");
    }

    #[test]
    fn test_cli_no_override() {
        let original = Config::default();
        let mut config = Config::default();
        config.apply_cli_overrides(&CliArgs::default());
        assert_eq!(config, original);
    }

    #[test]
    fn test_cli_parses_flags() {
        let args = CliArgs::try_parse_from([
            "stellar-server",
            "--seed",
            "7",
            "--extent",
            "1000",
            "--ticks",
            "3",
        ])
        .unwrap();
        assert_eq!(args.seed, Some(7));
        assert_eq!(args.extent, Some(1000.0));
        assert_eq!(args.ticks, Some(3));
        assert!(args.config.is_none());
    }
}
