//! Procedural galaxy generation from layered simplex noise.
//!
//! The galaxy square is cut into zones of `zone_size`. A planet-count field
//! sampled at each zone origin decides how many planets the zone gets; each
//! planet lands at a uniform offset inside the zone. Its size class and raw
//! resource potentials come from four more independent fields sampled at the
//! planet's position, each squared and perturbed by a uniform random factor.
//!
//! Noise fields and the perturbation RNG both derive from a single `u64`
//! seed. A configured seed reproduces the galaxy exactly. Without one the
//! seed is drawn from OS entropy and logged so a run can be replayed.

use glam::DVec2;
use noise::{NoiseFn, Simplex};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rustc_hash::FxHashSet;
use stellar_config::{GalaxyConfig, NoiseScales};

use crate::ids::PlanetId;
use crate::planet::Planet;
use crate::resources::Resources;
use crate::size::SizeClass;

// Per-field seed offsets so the five fields are decorrelated.
const COUNT_SEED_OFFSET: u64 = 0x0C0F_FEE0;
const SIZE_SEED_OFFSET: u64 = 0x5123_0001;
const BIO_SEED_OFFSET: u64 = 0xB10_B10;
const MINERAL_SEED_OFFSET: u64 = 0x0A11_0F0E;
const GAS_SEED_OFFSET: u64 = 0x6A5_6A5;

/// Maps a simplex sample from roughly `[-1, 1]` into `[0, 1]`.
fn normalized(field: &Simplex, point: DVec2, scale: f64) -> f64 {
    let n = field.get([point.x / scale, point.y / scale]);
    ((n + 1.0) / 2.0).clamp(0.0, 1.0)
}

fn field(seed: u64, offset: u64) -> Simplex {
    Simplex::new(seed.wrapping_add(offset) as u32)
}

/// Produces the planets of one galaxy.
pub struct GalaxyGenerator {
    seed: u64,
    extent: f64,
    zone_size: f64,
    max_planets_per_zone: u32,
    scales: NoiseScales,
    count_field: Simplex,
    size_field: Simplex,
    bio_field: Simplex,
    mineral_field: Simplex,
    gas_field: Simplex,
    rng: ChaCha8Rng,
    issued: FxHashSet<PlanetId>,
}

impl GalaxyGenerator {
    /// Build a generator for `config`, seeding from OS entropy when no seed is set.
    pub fn new(config: &GalaxyConfig) -> Self {
        let seed = config.seed.unwrap_or_else(rand::random);
        Self {
            seed,
            extent: config.extent,
            zone_size: config.zone_size,
            max_planets_per_zone: config.max_planets_per_zone,
            scales: config.noise.clone(),
            count_field: field(seed, COUNT_SEED_OFFSET),
            size_field: field(seed, SIZE_SEED_OFFSET),
            bio_field: field(seed, BIO_SEED_OFFSET),
            mineral_field: field(seed, MINERAL_SEED_OFFSET),
            gas_field: field(seed, GAS_SEED_OFFSET),
            rng: ChaCha8Rng::seed_from_u64(seed),
            issued: FxHashSet::default(),
        }
    }

    /// The seed actually in use.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Zones along one axis.
    pub fn zones_per_axis(&self) -> u64 {
        if self.zone_size > 0.0 && self.extent > 0.0 {
            (self.extent / self.zone_size).ceil() as u64
        } else {
            0
        }
    }

    /// Generate every zone, row by row.
    pub fn generate(&mut self) -> Vec<Planet> {
        let zones = self.zones_per_axis();
        let mut planets = Vec::new();
        for zx in 0..zones {
            for zy in 0..zones {
                let origin = DVec2::new(zx as f64, zy as f64) * self.zone_size;
                self.generate_zone(origin, &mut planets);
            }
        }
        planets
    }

    /// Planets placed in the zone whose lower-left corner is `origin`.
    pub fn planet_count(&self, origin: DVec2) -> u32 {
        let n = normalized(&self.count_field, origin, self.scales.planet_count);
        ((n * self.max_planets_per_zone as f64).floor() as u32).max(1)
    }

    fn generate_zone(&mut self, origin: DVec2, out: &mut Vec<Planet>) {
        for _ in 0..self.planet_count(origin) {
            let offset = DVec2::new(self.rng.random::<f64>(), self.rng.random::<f64>());
            let position = (origin + offset * self.zone_size).clamp(DVec2::ZERO, DVec2::splat(self.extent));
            let planet = self.generate_planet(position);
            out.push(planet);
        }
    }

    fn generate_planet(&mut self, position: DVec2) -> Planet {
        let id = self.next_id();
        let size = self.size_class(position);
        let resources = self.raw_resources(position, size);
        Planet::new(id, position, size, resources)
    }

    fn size_class(&mut self, position: DVec2) -> SizeClass {
        let n = normalized(&self.size_field, position, self.scales.planet_size);
        let v = n * n * self.rng.random::<f64>();
        SizeClass::from_index((v * SizeClass::ALL.len() as f64).floor() as usize)
    }

    fn raw_resources(&mut self, position: DVec2, size: SizeClass) -> Resources {
        let bio = normalized(&self.bio_field, position, self.scales.bio);
        let mineral = normalized(&self.mineral_field, position, self.scales.mineral);
        let gas = normalized(&self.gas_field, position, self.scales.gas);
        Resources::new(
            bio * bio * self.rng.random::<f64>() * size.value(),
            mineral * mineral * self.rng.random::<f64>() * size.value(),
            gas * gas * self.rng.random::<f64>() * size.value(),
        )
    }

    fn next_id(&mut self) -> PlanetId {
        loop {
            let id = PlanetId(self.rng.random());
            if self.issued.insert(id) {
                return id;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(seed: u64) -> GalaxyConfig {
        GalaxyConfig {
            extent: 2_000.0,
            zone_size: 250.0,
            seed: Some(seed),
            ..GalaxyConfig::default()
        }
    }

    #[test]
    fn test_same_seed_same_galaxy() {
        let a: Vec<_> = GalaxyGenerator::new(&config(42))
            .generate()
            .iter()
            .map(Planet::snapshot)
            .collect();
        let b: Vec<_> = GalaxyGenerator::new(&config(42))
            .generate()
            .iter()
            .map(Planet::snapshot)
            .collect();
        assert!(!a.is_empty());
        assert_eq!(a, b);
    }

    #[test]
    fn test_different_seeds_differ() {
        let a = GalaxyGenerator::new(&config(1)).generate();
        let b = GalaxyGenerator::new(&config(2)).generate();
        let pa: Vec<_> = a.iter().map(|p| p.position).collect();
        let pb: Vec<_> = b.iter().map(|p| p.position).collect();
        assert_ne!(pa, pb);
    }

    #[test]
    fn test_every_zone_gets_at_least_one_planet() {
        let mut generator = GalaxyGenerator::new(&config(7));
        assert_eq!(generator.zones_per_axis(), 8);
        let planets = generator.generate();
        assert!(planets.len() >= 64);
        assert!(planets.len() <= 64 * 5);
    }

    #[test]
    fn test_planets_inside_extent_and_zone() {
        let cfg = GalaxyConfig {
            extent: 1_100.0,
            ..config(3)
        };
        for planet in GalaxyGenerator::new(&cfg).generate() {
            assert!(planet.position.x >= 0.0 && planet.position.x <= 1_100.0);
            assert!(planet.position.y >= 0.0 && planet.position.y <= 1_100.0);
        }
    }

    #[test]
    fn test_resources_bounded_by_size_value() {
        for planet in GalaxyGenerator::new(&config(11)).generate() {
            let raw = planet.resources();
            let cap = planet.size.value();
            for v in [raw.bio, raw.mineral, raw.gas] {
                assert!((0.0..=cap).contains(&v), "{v} outside [0, {cap}]");
            }
            assert!(!planet.is_claimed());
        }
    }

    #[test]
    fn test_ids_unique() {
        let planets = GalaxyGenerator::new(&config(5)).generate();
        let ids: FxHashSet<_> = planets.iter().map(|p| p.id).collect();
        assert_eq!(ids.len(), planets.len());
    }

    #[test]
    fn test_degenerate_extent_generates_nothing() {
        let cfg = GalaxyConfig {
            zone_size: 0.0,
            ..config(5)
        };
        assert!(GalaxyGenerator::new(&cfg).generate().is_empty());
    }

    #[test]
    fn test_unseeded_reports_seed() {
        let cfg = GalaxyConfig {
            seed: None,
            extent: 500.0,
            ..GalaxyConfig::default()
        };
        let generator = GalaxyGenerator::new(&cfg);
        let replay = GalaxyGenerator::new(&GalaxyConfig {
            seed: Some(generator.seed()),
            ..cfg
        });
        assert_eq!(replay.seed(), generator.seed());
    }
}
