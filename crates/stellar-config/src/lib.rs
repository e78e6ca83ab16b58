//! Configuration system for the Stellar galaxy server.
//!
//! Provides runtime-configurable settings that persist to disk as RON files.
//! Supports CLI overrides via clap, hot-reload detection, and forward/backward
//! compatible serialization.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{Config, DebugConfig, GalaxyConfig, MAX_ZONES_PER_AXIS, NoiseScales, SimulationConfig};
pub use error::ConfigError;
