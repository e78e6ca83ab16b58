//! Rejections surfaced by galaxy operations.

use crate::ids::{PlanetId, PlayerId};
use crate::resources::Resources;

/// Broad category of a [`GalaxyError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A referenced planet or player does not exist.
    NotFound,
    /// Conquest of an owned planet, or a request from a non-owner.
    Ownership,
    /// Not enough free structure slots.
    Capacity,
    /// Stockpile below the requested cost.
    Resources,
    /// An unregistered structure type. Indicates a defect in the caller.
    Configuration,
    /// Nothing left to hand out.
    Exhausted,
}

/// Why a galaxy request was rejected. No variant implies a partial mutation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GalaxyError {
    #[error("planet {0} not found")]
    PlanetNotFound(PlanetId),

    #[error("player {0} not found")]
    PlayerNotFound(PlayerId),

    #[error("player {0} is already registered")]
    PlayerAlreadyRegistered(PlayerId),

    #[error("planet {0} is already owned by the requester")]
    AlreadyOwnedBySelf(PlanetId),

    #[error("planet {planet} is already owned by {owner}")]
    AlreadyOwnedByOther { planet: PlanetId, owner: PlayerId },

    #[error("{player} does not own planet {planet}")]
    NotOwner { planet: PlanetId, player: PlayerId },

    #[error("structure needs {required} slots but only {available} are free")]
    InsufficientCapacity { required: u32, available: u32 },

    #[error("structure costs {required} but only {available} is banked")]
    InsufficientResources {
        required: Resources,
        available: Resources,
    },

    #[error("unknown structure type {0:?}")]
    UnknownStructureType(String),

    #[error("every planet is already owned")]
    NoUnclaimedPlanet,
}

impl GalaxyError {
    /// Category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            GalaxyError::PlanetNotFound(_) | GalaxyError::PlayerNotFound(_) => ErrorKind::NotFound,
            GalaxyError::PlayerAlreadyRegistered(_)
            | GalaxyError::AlreadyOwnedBySelf(_)
            | GalaxyError::AlreadyOwnedByOther { .. }
            | GalaxyError::NotOwner { .. } => ErrorKind::Ownership,
            GalaxyError::InsufficientCapacity { .. } => ErrorKind::Capacity,
            GalaxyError::InsufficientResources { .. } => ErrorKind::Resources,
            GalaxyError::UnknownStructureType(_) => ErrorKind::Configuration,
            GalaxyError::NoUnclaimedPlanet => ErrorKind::Exhausted,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classification() {
        assert_eq!(GalaxyError::PlanetNotFound(PlanetId(1)).kind(), ErrorKind::NotFound);
        assert_eq!(
            GalaxyError::NotOwner {
                planet: PlanetId(1),
                player: PlayerId::new("ann"),
            }
            .kind(),
            ErrorKind::Ownership
        );
        assert_eq!(
            GalaxyError::InsufficientCapacity {
                required: 1,
                available: 0
            }
            .kind(),
            ErrorKind::Capacity
        );
        assert_eq!(
            GalaxyError::UnknownStructureType("Factory".into()).kind(),
            ErrorKind::Configuration
        );
    }

    #[test]
    fn test_messages_name_the_subject() {
        let err = GalaxyError::AlreadyOwnedByOther {
            planet: PlanetId(255),
            owner: PlayerId::new("bob"),
        };
        let msg = err.to_string();
        assert!(msg.contains("00000000000000ff"));
        assert!(msg.contains("bob"));
    }
}
