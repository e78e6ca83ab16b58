//! Galaxy simulation core: planets, structures, players and the shared
//! [`Galaxy`] context that ticks, queries and mutates them.
//!
//! A [`Galaxy`] is generated once from [`stellar_config::Config`]. A periodic
//! driver calls [`Galaxy::tick`] to run extraction on every claimed planet;
//! player requests arrive through [`Galaxy::handle`] or the individual
//! methods. Subscribed players receive [`Notification`]s on the outbox
//! returned by [`Galaxy::notifications`].

pub mod error;
pub mod galaxy;
pub mod generation;
pub mod ids;
pub mod observer;
pub mod planet;
pub mod player;
pub mod request;
pub mod resources;
pub mod size;
pub mod store;
pub mod structure;


pub use error::{ErrorKind, GalaxyError};
pub use galaxy::Galaxy;
pub use generation::GalaxyGenerator;
pub use ids::{PlanetId, PlayerId};
pub use observer::{Notification, NotificationSink, Observers, PlanetEvent};
pub use planet::{Planet, PlanetSnapshot};
pub use player::{Player, PlayerSnapshot};
pub use request::{Request, Response};
pub use resources::{ResourceKind, Resources};
pub use size::SizeClass;
pub use store::{IndexedStore, StoreError};
pub use structure::{Structure, StructureEffect, StructureKind, StructureTemplate, effect_for, template_for};

pub use glam::DVec2;
