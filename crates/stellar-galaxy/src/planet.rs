//! Planet state: ownership, the per-tick extraction step and structure building.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::error::GalaxyError;
use crate::ids::{PlanetId, PlayerId};
use crate::observer::Observers;
use crate::resources::{ResourceKind, Resources};
use crate::size::SizeClass;
use crate::structure::{Structure, StructureKind, template_for};

/// A planet and everything that mutates on it.
///
/// A planet is unclaimed until [`claim`](Self::claim) succeeds once; only
/// claimed planets extract. Structure sizes never exceed
/// [`SizeClass::structure_limit`].
#[derive(Debug, Clone)]
pub struct Planet {
    pub id: PlanetId,
    pub position: DVec2,
    pub size: SizeClass,
    owner: Option<PlayerId>,
    /// Raw potentials, depleted by extraction.
    resources: Resources,
    /// Additive bonus multipliers from installed structures.
    bonus: Resources,
    /// Spendable stockpile.
    available: Resources,
    structures: Vec<Structure>,
    pub observers: Observers,
}

/// Value copy of a planet's public attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanetSnapshot {
    pub id: PlanetId,
    pub position: DVec2,
    pub size: SizeClass,
    pub structure_limit: u32,
    pub population_capacity: u32,
    pub owner: Option<PlayerId>,
    pub resources: Resources,
    pub bonus: Resources,
    pub available: Resources,
    pub structures: Vec<StructureKind>,
}

impl Planet {
    /// An unclaimed planet with the given raw potentials.
    pub fn new(id: PlanetId, position: DVec2, size: SizeClass, resources: Resources) -> Self {
        Self {
            id,
            position,
            size,
            owner: None,
            resources,
            bonus: Resources::ZERO,
            available: Resources::ZERO,
            structures: Vec::new(),
            observers: Observers::new(),
        }
    }

    pub fn owner(&self) -> Option<&PlayerId> {
        self.owner.as_ref()
    }

    pub fn is_claimed(&self) -> bool {
        self.owner.is_some()
    }

    pub fn is_owned_by(&self, player: &PlayerId) -> bool {
        self.owner.as_ref() == Some(player)
    }

    pub fn resources(&self) -> Resources {
        self.resources
    }

    pub fn bonus(&self) -> Resources {
        self.bonus
    }

    pub fn available(&self) -> Resources {
        self.available
    }

    pub fn structures(&self) -> &[Structure] {
        &self.structures
    }

    /// Slots taken by installed structures.
    pub fn used_slots(&self) -> u32 {
        self.structures.iter().map(Structure::size).sum()
    }

    /// Slots still free.
    pub fn free_slots(&self) -> u32 {
        self.size.structure_limit().saturating_sub(self.used_slots())
    }

    /// Transfer an unclaimed planet to `player`. Conquest is one-way.
    pub fn claim(&mut self, player: &PlayerId) -> Result<(), GalaxyError> {
        match &self.owner {
            Some(owner) if owner == player => Err(GalaxyError::AlreadyOwnedBySelf(self.id)),
            Some(owner) => Err(GalaxyError::AlreadyOwnedByOther {
                planet: self.id,
                owner: owner.clone(),
            }),
            None => {
                self.owner = Some(player.clone());
                Ok(())
            }
        }
    }

    /// Run one extraction step and return what was banked.
    ///
    /// Unclaimed planets do nothing and return `None`. For each resource the
    /// boosted factor `raw * (1 + bonus)` is scaled by the size class and
    /// added to the stockpile, and `factor * depletion_factor` is taken off
    /// the raw potential. With `clamp` set the raw potential stops at zero.
    pub fn extract(&mut self, depletion_factor: f64, clamp: bool) -> Option<Resources> {
        if !self.is_claimed() {
            return None;
        }

        let scale = self.size.extraction_scale();
        let mut banked = Resources::ZERO;
        for kind in ResourceKind::ALL {
            let factor = self.resources[kind] * (1.0 + self.bonus[kind]);
            let extracted = factor * scale;
            self.available[kind] += extracted;
            banked[kind] = extracted;

            let depleted = self.resources[kind] - factor * depletion_factor;
            self.resources[kind] = if clamp { depleted.max(0.0) } else { depleted };
        }
        Some(banked)
    }

    /// Build and install a structure for `requester`.
    ///
    /// Checks ownership, then free slots, then the stockpile. Nothing changes
    /// unless all three pass.
    pub fn build_structure(
        &mut self,
        requester: &PlayerId,
        kind: StructureKind,
    ) -> Result<(), GalaxyError> {
        if !self.is_owned_by(requester) {
            return Err(GalaxyError::NotOwner {
                planet: self.id,
                player: requester.clone(),
            });
        }

        let template = template_for(kind);
        let free = self.free_slots();
        if template.size > free {
            return Err(GalaxyError::InsufficientCapacity {
                required: template.size,
                available: free,
            });
        }

        if !self.available.covers(&template.cost) {
            return Err(GalaxyError::InsufficientResources {
                required: template.cost,
                available: self.available,
            });
        }

        self.available -= template.cost;
        let mut structure = Structure::new(kind);
        structure.install(self.id, &mut self.bonus);
        self.structures.push(structure);
        Ok(())
    }

    /// Uninstall and detach the structure at `index`. Its cost is not refunded.
    pub fn remove_structure(&mut self, index: usize) -> Option<Structure> {
        if index >= self.structures.len() {
            return None;
        }
        let mut structure = self.structures.remove(index);
        structure.uninstall(&mut self.bonus);
        Some(structure)
    }

    /// Value copy of the public state.
    pub fn snapshot(&self) -> PlanetSnapshot {
        PlanetSnapshot {
            id: self.id,
            position: self.position,
            size: self.size,
            structure_limit: self.size.structure_limit(),
            population_capacity: self.size.population_capacity(),
            owner: self.owner.clone(),
            resources: self.resources,
            bonus: self.bonus,
            available: self.available,
            structures: self.structures.iter().map(|s| s.kind).collect(),
        }
    }

    #[cfg(test)]
    pub(crate) fn set_available(&mut self, available: Resources) {
        self.available = available;
    }
}
