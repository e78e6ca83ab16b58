//! Structure registry: the closed set of buildable structures, their build
//! templates and the bonus effects they apply while installed.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::GalaxyError;
use crate::ids::PlanetId;
use crate::resources::{ResourceKind, Resources};

/// Every structure type that can be built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StructureKind {
    MineralGatherer,
    Housing,
}

impl StructureKind {
    pub const ALL: [StructureKind; 2] = [StructureKind::MineralGatherer, StructureKind::Housing];

    /// Human-facing name, as clients send it.
    pub fn display_name(self) -> &'static str {
        match self {
            StructureKind::MineralGatherer => "Mineral Gatherer",
            StructureKind::Housing => "Housing",
        }
    }

    fn snake_name(self) -> &'static str {
        match self {
            StructureKind::MineralGatherer => "mineral_gatherer",
            StructureKind::Housing => "housing",
        }
    }
}

impl fmt::Display for StructureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for StructureKind {
    type Err = GalaxyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StructureKind::ALL
            .into_iter()
            .find(|kind| s == kind.display_name() || s == kind.snake_name())
            .ok_or_else(|| GalaxyError::UnknownStructureType(s.to_string()))
    }
}

/// What building a structure consumes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StructureTemplate {
    /// Resources deducted once at build time.
    pub cost: Resources,
    /// Structure slots occupied on the planet.
    pub size: u32,
}

/// Build template for `kind`.
pub fn template_for(kind: StructureKind) -> StructureTemplate {
    match kind {
        StructureKind::MineralGatherer => StructureTemplate {
            cost: Resources::new(0.0, 2.0, 1.0),
            size: 1,
        },
        StructureKind::Housing => StructureTemplate {
            cost: Resources::new(0.0, 2.0, 0.0),
            size: 1,
        },
    }
}

/// A fixed additive delta on one bonus multiplier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StructureEffect {
    pub resource: ResourceKind,
    pub delta: f64,
}

impl StructureEffect {
    /// Add the delta to `bonus`.
    pub fn apply(&self, bonus: &mut Resources) {
        bonus[self.resource] += self.delta;
    }

    /// Subtract the delta from `bonus`.
    pub fn revert(&self, bonus: &mut Resources) {
        bonus[self.resource] -= self.delta;
    }
}

/// Installation effect for `kind`.
pub fn effect_for(kind: StructureKind) -> StructureEffect {
    match kind {
        StructureKind::MineralGatherer => StructureEffect {
            resource: ResourceKind::Mineral,
            delta: 0.2,
        },
        StructureKind::Housing => StructureEffect {
            resource: ResourceKind::Bio,
            delta: 0.1,
        },
    }
}

/// One built structure instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Structure {
    pub kind: StructureKind,
    /// Planet this instance is installed on, if any.
    pub planet: Option<PlanetId>,
}

impl Structure {
    /// A fresh, detached instance.
    pub fn new(kind: StructureKind) -> Self {
        Self { kind, planet: None }
    }

    /// Occupied slots.
    pub fn size(&self) -> u32 {
        template_for(self.kind).size
    }

    /// Attach to `planet` and apply the effect to its bonus multipliers.
    ///
    /// Returns `false` and changes nothing if this instance is already attached.
    pub fn install(&mut self, planet: PlanetId, bonus: &mut Resources) -> bool {
        if self.planet.is_some() {
            return false;
        }
        effect_for(self.kind).apply(bonus);
        self.planet = Some(planet);
        true
    }

    /// Exact inverse of [`install`](Self::install).
    ///
    /// Returns `false` and changes nothing if this instance is not attached.
    pub fn uninstall(&mut self, bonus: &mut Resources) -> bool {
        if self.planet.take().is_none() {
            return false;
        }
        effect_for(self.kind).revert(bonus);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_names() {
        assert_eq!("Mineral Gatherer".parse::<StructureKind>(), Ok(StructureKind::MineralGatherer));
        assert_eq!("housing".parse::<StructureKind>(), Ok(StructureKind::Housing));
        assert_eq!(
            "Factory".parse::<StructureKind>(),
            Err(GalaxyError::UnknownStructureType("Factory".into()))
        );
    }

    #[test]
    fn test_templates() {
        let gatherer = template_for(StructureKind::MineralGatherer);
        assert_eq!(gatherer.cost, Resources::new(0.0, 2.0, 1.0));
        assert_eq!(gatherer.size, 1);
        assert_eq!(template_for(StructureKind::Housing).cost, Resources::new(0.0, 2.0, 0.0));
    }

    #[test]
    fn test_install_is_idempotent() {
        let mut bonus = Resources::ZERO;
        let mut gatherer = Structure::new(StructureKind::MineralGatherer);
        assert!(gatherer.install(PlanetId(1), &mut bonus));
        assert!(!gatherer.install(PlanetId(1), &mut bonus));
        assert!((bonus.mineral - 0.2).abs() < 1e-12);
        assert_eq!(gatherer.planet, Some(PlanetId(1)));
    }

    #[test]
    fn test_uninstall_reverses_install() {
        let mut bonus = Resources::new(0.5, 0.5, 0.5);
        let before = bonus;
        let mut housing = Structure::new(StructureKind::Housing);
        assert!(!housing.uninstall(&mut bonus));
        housing.install(PlanetId(3), &mut bonus);
        assert!((bonus.bio - 0.6).abs() < 1e-12);
        assert!(housing.uninstall(&mut bonus));
        assert!((bonus.bio - before.bio).abs() < 1e-12);
        assert_eq!(bonus.mineral, before.mineral);
        assert_eq!(housing.planet, None);
    }
}
