//! Resource types and the per-type amount triple used throughout the simulation.

use std::fmt;
use std::ops::{Add, AddAssign, Index, IndexMut, Sub, SubAssign};

use serde::{Deserialize, Serialize};

/// The three extractable resource types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    /// Organic matter.
    Bio,
    /// Solid ores.
    Mineral,
    /// Atmospheric gases.
    Gas,
}

impl ResourceKind {
    /// All kinds in declaration order.
    pub const ALL: [ResourceKind; 3] = [ResourceKind::Bio, ResourceKind::Mineral, ResourceKind::Gas];
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResourceKind::Bio => "bio",
            ResourceKind::Mineral => "mineral",
            ResourceKind::Gas => "gas",
        };
        f.write_str(name)
    }
}

/// One amount per [`ResourceKind`].
///
/// Used for raw potentials, bonus multipliers, stockpiles and costs alike.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Resources {
    /// Bio amount.
    pub bio: f64,
    /// Mineral amount.
    pub mineral: f64,
    /// Gas amount.
    pub gas: f64,
}

impl Resources {
    /// All zero.
    pub const ZERO: Resources = Resources {
        bio: 0.0,
        mineral: 0.0,
        gas: 0.0,
    };

    /// Build from individual amounts.
    pub const fn new(bio: f64, mineral: f64, gas: f64) -> Self {
        Self { bio, mineral, gas }
    }

    /// Returns `true` if every amount here is at least the matching amount in `cost`.
    pub fn covers(&self, cost: &Resources) -> bool {
        ResourceKind::ALL
            .iter()
            .all(|&kind| self[kind] >= cost[kind])
    }

    /// Apply `f` to every amount.
    pub fn map(self, mut f: impl FnMut(ResourceKind, f64) -> f64) -> Self {
        Self {
            bio: f(ResourceKind::Bio, self.bio),
            mineral: f(ResourceKind::Mineral, self.mineral),
            gas: f(ResourceKind::Gas, self.gas),
        }
    }

    /// Sum of all three amounts.
    pub fn total(&self) -> f64 {
        self.bio + self.mineral + self.gas
    }
}

impl Index<ResourceKind> for Resources {
    type Output = f64;

    fn index(&self, kind: ResourceKind) -> &f64 {
        match kind {
            ResourceKind::Bio => &self.bio,
            ResourceKind::Mineral => &self.mineral,
            ResourceKind::Gas => &self.gas,
        }
    }
}

impl IndexMut<ResourceKind> for Resources {
    fn index_mut(&mut self, kind: ResourceKind) -> &mut f64 {
        match kind {
            ResourceKind::Bio => &mut self.bio,
            ResourceKind::Mineral => &mut self.mineral,
            ResourceKind::Gas => &mut self.gas,
        }
    }
}

impl Add for Resources {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.bio + rhs.bio, self.mineral + rhs.mineral, self.gas + rhs.gas)
    }
}

impl AddAssign for Resources {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for Resources {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.bio - rhs.bio, self.mineral - rhs.mineral, self.gas - rhs.gas)
    }
}

impl SubAssign for Resources {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl fmt::Display for Resources {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "bio {:.2} / mineral {:.2} / gas {:.2}",
            self.bio, self.mineral, self.gas
        )
    }
}
