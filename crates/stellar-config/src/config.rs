//! Configuration structs with sensible defaults and RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Top-level server configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Galaxy generation settings.
    pub galaxy: GalaxyConfig,
    /// Tick and extraction settings.
    pub simulation: SimulationConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Galaxy generation configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GalaxyConfig {
    /// Side length of the square galaxy, in galaxy units.
    pub extent: f64,
    /// Side length of one generation zone.
    pub zone_size: f64,
    /// Upper bound on planets placed in a single zone.
    pub max_planets_per_zone: u32,
    /// Generation seed. `None` draws from OS entropy, so every run differs.
    pub seed: Option<u64>,
    /// Points a quadtree leaf holds before it subdivides.
    pub quadtree_capacity: usize,
    /// Maximum quadtree depth (`None` = the index's built-in cap of 32 levels).
    pub quadtree_max_depth: Option<u32>,
    /// Spatial scale of each noise field.
    pub noise: NoiseScales,
}

/// Coordinate divisors for the generation noise fields.
///
/// Larger values stretch a field over more of the galaxy, so neighbouring
/// zones share more similar values.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NoiseScales {
    /// Planet count per zone.
    pub planet_count: f64,
    /// Planet size class.
    pub planet_size: f64,
    /// Bio potential.
    pub bio: f64,
    /// Mineral potential.
    pub mineral: f64,
    /// Gas potential.
    pub gas: f64,
}

/// Simulation configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimulationConfig {
    /// Interval between extraction ticks in milliseconds.
    pub tick_interval_ms: u64,
    /// Fraction of the boosted extraction factor removed from raw potential each tick.
    pub depletion_factor: f64,
    /// Stop raw potential at zero instead of letting it go negative.
    pub clamp_depleted_potential: bool,
    /// Radius around each owned planet that a player can see.
    pub view_radius: f64,
    /// Random draws tried before scanning for an unclaimed starting planet.
    pub starting_planet_attempts: u32,
    /// Notifications queued for delivery before new ones are dropped.
    pub outbox_capacity: usize,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
    /// Directory for JSON log files in debug builds.
    pub log_dir: Option<PathBuf>,
}

// --- Default implementations ---

impl Default for GalaxyConfig {
    fn default() -> Self {
        Self {
            extent: 100_000.0,
            zone_size: 250.0,
            max_planets_per_zone: 5,
            seed: None,
            quadtree_capacity: 10,
            quadtree_max_depth: None,
            noise: NoiseScales::default(),
        }
    }
}

impl Default for NoiseScales {
    fn default() -> Self {
        Self {
            planet_count: 512.0,
            planet_size: 1024.0,
            bio: 1024.0,
            mineral: 512.0,
            gas: 512.0,
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 1000,
            depletion_factor: 0.001,
            clamp_depleted_potential: true,
            view_radius: 800.0,
            starting_planet_attempts: 64,
            outbox_capacity: 4096,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_dir: None,
        }
    }
}

// --- Validation / persistence ---

const CONFIG_FILE: &str = "config.ron";

/// Largest zone grid side `validate` accepts (`extent / zone_size`, rounded up).
pub const MAX_ZONES_PER_AXIS: f64 = 4096.0;

fn invalid(field: &'static str, reason: &'static str) -> ConfigError {
    ConfigError::Invalid { field, reason }
}

impl Config {
    /// Reject settings the simulation cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let galaxy = &self.galaxy;
        if !(galaxy.extent.is_finite() && galaxy.extent > 0.0) {
            return Err(invalid("galaxy.extent", "must be positive"));
        }
        if !(galaxy.zone_size.is_finite() && galaxy.zone_size > 0.0) {
            return Err(invalid("galaxy.zone_size", "must be positive"));
        }
        if (galaxy.extent / galaxy.zone_size).ceil() > MAX_ZONES_PER_AXIS {
            return Err(invalid("galaxy.zone_size", "too small for the extent"));
        }
        if galaxy.max_planets_per_zone == 0 {
            return Err(invalid("galaxy.max_planets_per_zone", "must be at least 1"));
        }
        if galaxy.quadtree_capacity == 0 {
            return Err(invalid("galaxy.quadtree_capacity", "must be at least 1"));
        }
        let scales = &galaxy.noise;
        if [scales.planet_count, scales.planet_size, scales.bio, scales.mineral, scales.gas]
            .iter()
            .any(|s| !(s.is_finite() && *s > 0.0))
        {
            return Err(invalid("galaxy.noise", "every scale must be positive"));
        }
        let sim = &self.simulation;
        if !(sim.depletion_factor.is_finite() && sim.depletion_factor >= 0.0) {
            return Err(invalid("simulation.depletion_factor", "must be zero or positive"));
        }
        if !(sim.view_radius.is_finite() && sim.view_radius >= 0.0) {
            return Err(invalid("simulation.view_radius", "must be zero or positive"));
        }
        if sim.outbox_capacity == 0 {
            return Err(invalid("simulation.outbox_capacity", "must be at least 1"));
        }
        Ok(())
    }

    /// Read and validate `config.ron` from `config_dir`, writing a default
    /// file first if none exists.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let path = config_dir.join(CONFIG_FILE);
        if !path.exists() {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Wrote default galaxy config to {}", path.display());
            return Ok(config);
        }
        let config = Self::read(&path)?;
        log::info!("Loaded galaxy config from {}", path.display());
        Ok(config)
    }

    /// Write this config to `config_dir/config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);
        let text = ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;
        std::fs::write(config_dir.join(CONFIG_FILE), text).map_err(ConfigError::WriteError)
    }

    /// Re-read the file. `Some` only when it differs from `self`.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let fresh = Self::read(&config_dir.join(CONFIG_FILE))?;
        if fresh == *self {
            return Ok(None);
        }
        log::info!("Galaxy config changed on disk");
        Ok(Some(fresh))
    }

    fn read(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(ConfigError::ReadError)?;
        let config: Config = ron::from_str(&text).map_err(ConfigError::ParseError)?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_serializes() {
        let config = Config::default();
        let ron_str =
            ron::ser::to_string_pretty(&config, ron::ser::PrettyConfig::new().depth_limit(3))
                .unwrap();
        assert!(ron_str.contains("zone_size: 250.0"));
        assert!(ron_str.contains("tick_interval_ms: 1000"));
    }

    #[test]
    fn test_config_roundtrip() {
        let mut config = Config::default();
        config.galaxy.seed = Some(7);
        let ron_str = ron::to_string(&config).unwrap();
        let deserialized: Config = ron::from_str(&ron_str).unwrap();
        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_missing_section_uses_default() {
        let ron_str = "(galaxy: (extent: 5000.0))";
        let config: Config = ron::from_str(ron_str).unwrap();
        assert_eq!(config.galaxy.extent, 5000.0);
        assert_eq!(config.galaxy.zone_size, 250.0);
        assert_eq!(config.simulation, SimulationConfig::default());
    }

    #[test]
    fn test_extra_field_ignored() {
        let result: Result<Config, _> = ron::from_str("(future_setting: true)");
        assert!(result.is_ok());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.galaxy.extent = 2_000.0;
        config.galaxy.seed = Some(99);
        config.simulation.clamp_depleted_potential = false;

        config.save(dir.path()).unwrap();
        let loaded = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, loaded);
    }

    #[test]
    fn test_load_or_create_writes_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, Config::default());
        assert!(dir.path().join("config.ron").exists());
    }

    #[test]
    fn test_reload_detects_changes() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        config.save(dir.path()).unwrap();

        let mut modified = config.clone();
        modified.simulation.tick_interval_ms = 250;
        modified.save(dir.path()).unwrap();

        let result = config.reload(dir.path()).unwrap();
        assert_eq!(result.unwrap().simulation.tick_interval_ms, 250);
    }

    #[test]
    fn test_reload_no_changes() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        config.save(dir.path()).unwrap();

        assert!(config.reload(dir.path()).unwrap().is_none());
    }

    #[test]
    fn test_invalid_ron_produces_error() {
        let result: Result<Config, _> = ron::from_str("{{not valid}}");
        assert!(result.is_err());
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_zone() {
        let mut config = Config::default();
        config.galaxy.zone_size = 0.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid {
                field: "galaxy.zone_size",
                ..
            })
        ));
    }

    #[test]
    fn test_validate_rejects_oversized_zone_grid() {
        let mut config = Config::default();
        config.galaxy.extent = 1e9;
        config.galaxy.zone_size = 1e-3;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid {
                field: "galaxy.zone_size",
                reason: "too small for the extent",
            })
        ));

        config.galaxy.zone_size = 250_000.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_outbox() {
        let mut config = Config::default();
        config.simulation.outbox_capacity = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_negative_depletion() {
        let mut config = Config::default();
        config.simulation.depletion_factor = -0.1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("config.ron"), "(galaxy: (extent: -5.0))").unwrap();
        let result = Config::load_or_create(dir.path());
        assert!(matches!(result, Err(ConfigError::Invalid { field: "galaxy.extent", .. })));
    }
}
