//! Decoded client requests and their replies.
//!
//! The transport layer decodes a [`Request`] on behalf of an authenticated
//! player and hands it to [`Galaxy::handle`]. Every rejection comes back as a
//! [`GalaxyError`] with no state changed.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::error::GalaxyError;
use crate::galaxy::Galaxy;
use crate::ids::{PlanetId, PlayerId};
use crate::planet::PlanetSnapshot;
use crate::player::PlayerSnapshot;
use crate::resources::Resources;
use crate::structure::StructureKind;

/// Something a player asks the galaxy to do.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Request {
    GetPlanet {
        planet: PlanetId,
    },
    /// Every planet in a circle, regardless of ownership.
    QueryNearby {
        x: f64,
        y: f64,
        radius: f64,
    },
    /// Owned planets in a circle plus whatever they can see.
    NearbyView {
        x: f64,
        y: f64,
        radius: f64,
    },
    Conquer {
        planet: PlanetId,
    },
    BuildStructure {
        planet: PlanetId,
        /// Display or snake_case name, e.g. `"Mineral Gatherer"`.
        structure_type: String,
    },
    Subscribe {
        planet: PlanetId,
        event: String,
    },
    Unsubscribe {
        planet: PlanetId,
        event: String,
    },
    StartingPlanet,
    TotalResources,
    PlayerInfo,
}

/// Successful reply to a [`Request`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum Response {
    Planet(PlanetSnapshot),
    Planets(Vec<PlanetSnapshot>),
    Conquered(PlanetId),
    Built {
        planet: PlanetId,
        structure: StructureKind,
    },
    Subscribed,
    Unsubscribed,
    StartingPlanet(PlanetId),
    Resources(Resources),
    Player(PlayerSnapshot),
}

impl Galaxy {
    /// Execute `request` on behalf of `player`.
    pub fn handle(&self, player: &PlayerId, request: Request) -> Result<Response, GalaxyError> {
        match request {
            Request::GetPlanet { planet } => self.get_planet(planet).map(Response::Planet),
            Request::QueryNearby { x, y, radius } => {
                Ok(Response::Planets(self.query_nearby(DVec2::new(x, y), radius)))
            }
            Request::NearbyView { x, y, radius } => self
                .nearby_view(player, DVec2::new(x, y), radius)
                .map(Response::Planets),
            Request::Conquer { planet } => self.conquer(planet, player).map(Response::Conquered),
            Request::BuildStructure {
                planet,
                structure_type,
            } => {
                let kind = match structure_type.parse::<StructureKind>() {
                    Ok(kind) => kind,
                    Err(e) => {
                        tracing::warn!("{player} requested unknown structure {structure_type:?}");
                        return Err(e);
                    }
                };
                self.build_structure(planet, player, kind)?;
                Ok(Response::Built {
                    planet,
                    structure: kind,
                })
            }
            Request::Subscribe { planet, event } => self
                .subscribe(planet, &event, player)
                .map(|()| Response::Subscribed),
            Request::Unsubscribe { planet, event } => self
                .unsubscribe(planet, &event, player)
                .map(|()| Response::Unsubscribed),
            Request::StartingPlanet => self
                .assign_starting_planet(player)
                .map(Response::StartingPlanet),
            Request::TotalResources => self.total_resources(player).map(Response::Resources),
            Request::PlayerInfo => self.player(player).map(Response::Player),
        }
    }
}
