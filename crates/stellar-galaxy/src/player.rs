//! Registered players and the planets they own.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::ids::{PlanetId, PlayerId};

/// A registered player. Credentials live with the auth layer, not here.
#[derive(Debug, Clone)]
pub struct Player {
    pub id: PlayerId,
    owned: FxHashSet<PlanetId>,
}

/// Value copy of a player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub id: PlayerId,
    /// Owned planets, sorted by id.
    pub planets: Vec<PlanetId>,
}

impl Player {
    pub fn new(id: PlayerId) -> Self {
        Self {
            id,
            owned: FxHashSet::default(),
        }
    }

    pub fn owns(&self, planet: PlanetId) -> bool {
        self.owned.contains(&planet)
    }

    pub fn owned_planets(&self) -> impl Iterator<Item = PlanetId> + '_ {
        self.owned.iter().copied()
    }

    pub fn planet_count(&self) -> usize {
        self.owned.len()
    }

    /// Only called once the planet's own owner field has been set.
    pub(crate) fn add_planet(&mut self, planet: PlanetId) {
        self.owned.insert(planet);
    }

    pub fn snapshot(&self) -> PlayerSnapshot {
        let mut planets: Vec<_> = self.owned.iter().copied().collect();
        planets.sort_unstable();
        PlayerSnapshot {
            id: self.id.clone(),
            planets,
        }
    }
}
