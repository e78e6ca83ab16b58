//! The shared simulation context.
//!
//! [`Galaxy`] owns the planet store, the spatial index, the player registry
//! and the notification outbox. It is created once at startup and shared
//! (`Arc<Galaxy>`) between the tick driver and request handlers.
//!
//! Locking: the planet store sits behind a coarse `RwLock`, every planet
//! behind its own `Mutex`, and players in a `DashMap`. Locks are always
//! taken in the order store → planet → player entry, and a player entry is
//! never held while a planet lock is acquired.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard};

use crossbeam_channel::{Receiver, Sender};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use glam::DVec2;
use rand::Rng;
use stellar_config::{Config, SimulationConfig};
use stellar_spatial::{Circle, QuadTree, QuadTreeOptions, Rect};

use crate::error::GalaxyError;
use crate::generation::GalaxyGenerator;
use crate::ids::{PlanetId, PlayerId};
use crate::observer::{Notification, PlanetEvent};
use crate::planet::{Planet, PlanetSnapshot};
use crate::player::{Player, PlayerSnapshot};
use crate::resources::Resources;
use crate::store::IndexedStore;
use crate::structure::StructureKind;

type PlanetHandle = Arc<Mutex<Planet>>;

fn lock(planet: &PlanetHandle) -> MutexGuard<'_, Planet> {
    planet.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Planets, players and the index over them.
pub struct Galaxy {
    planets: RwLock<IndexedStore<PlanetId, PlanetHandle>>,
    index: RwLock<QuadTree<PlanetId>>,
    players: DashMap<PlayerId, Player>,
    settings: SimulationConfig,
    seed: Option<u64>,
    ticks: AtomicU64,
    outbox: Sender<Notification>,
    inbox: Receiver<Notification>,
}

// ---------------------------------------------------------------------------
// Construction
// ---------------------------------------------------------------------------

impl Galaxy {
    /// Generate a fresh galaxy from `config`.
    pub fn generate(config: &Config) -> Self {
        let mut generator = GalaxyGenerator::new(&config.galaxy);
        let seed = generator.seed();
        let planets = generator.generate();
        tracing::info!(
            "Generated {} planets over {} zones per axis (seed {seed})",
            planets.len(),
            generator.zones_per_axis()
        );
        let mut galaxy = Self::with_planets(config, planets);
        galaxy.seed = Some(seed);
        galaxy
    }

    /// Build a galaxy around an existing set of planets.
    ///
    /// Planets outside `[0, extent]²` cannot be indexed and are skipped, as
    /// is any planet whose id was already taken by an earlier one.
    pub fn with_planets(config: &Config, planets: impl IntoIterator<Item = Planet>) -> Self {
        let extent = config.galaxy.extent.max(0.0);
        let mut index = QuadTree::new(
            Rect::new(0.0, 0.0, extent, extent),
            QuadTreeOptions {
                capacity: config.galaxy.quadtree_capacity.max(1),
                max_depth: config.galaxy.quadtree_max_depth,
                ..QuadTreeOptions::default()
            },
        );
        let mut store = IndexedStore::new();

        for planet in planets {
            if store.has_key(&planet.id) {
                tracing::warn!("Skipping duplicate planet {}", planet.id);
                continue;
            }
            if let Err(e) = index.insert(planet.position, planet.id) {
                tracing::warn!("Skipping planet {}: {e}", planet.id);
                continue;
            }
            store.set(planet.id, Arc::new(Mutex::new(planet)));
        }

        let (outbox, inbox) = crossbeam_channel::bounded(config.simulation.outbox_capacity.max(1));
        Self {
            planets: RwLock::new(store),
            index: RwLock::new(index),
            players: DashMap::new(),
            settings: config.simulation.clone(),
            seed: None,
            ticks: AtomicU64::new(0),
            outbox,
            inbox,
        }
    }

    /// Generation seed, when this galaxy was generated.
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    pub fn settings(&self) -> &SimulationConfig {
        &self.settings
    }

    /// Receiving end of the notification outbox.
    ///
    /// The outbox holds at most `simulation.outbox_capacity` notifications;
    /// anything published while it is full is dropped.
    pub fn notifications(&self) -> Receiver<Notification> {
        self.inbox.clone()
    }

    pub fn planet_count(&self) -> usize {
        self.store().len()
    }

    /// Every planet id, sorted.
    pub fn planet_ids(&self) -> Vec<PlanetId> {
        let mut ids: Vec<_> = self.store().keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Ticks run so far.
    pub fn tick_count(&self) -> u64 {
        self.ticks.load(Ordering::Relaxed)
    }

    fn store(&self) -> RwLockReadGuard<'_, IndexedStore<PlanetId, PlanetHandle>> {
        self.planets.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn planet_handle(&self, id: PlanetId) -> Result<PlanetHandle, GalaxyError> {
        self.store()
            .get_by_key(&id)
            .cloned()
            .ok_or(GalaxyError::PlanetNotFound(id))
    }
}

// ---------------------------------------------------------------------------
// Simulation
// ---------------------------------------------------------------------------

impl Galaxy {
    /// Run one extraction step over every claimed planet.
    pub fn tick(&self) {
        let store = self.store();
        let mut extracted = 0usize;
        for handle in store.values() {
            let mut planet = lock(handle);
            let banked = planet.extract(
                self.settings.depletion_factor,
                self.settings.clamp_depleted_potential,
            );
            if banked.is_some() {
                extracted += 1;
                self.publish(&planet, PlanetEvent::ExtractedResources);
            }
        }
        let tick = self.ticks.fetch_add(1, Ordering::Relaxed) + 1;
        tracing::trace!("Tick {tick}: {extracted} planets extracted");
    }

    fn publish(&self, planet: &Planet, event: PlanetEvent) {
        let name = event.as_str();
        let subscribers = planet.observers.observers_of(name).count();
        if subscribers == 0 {
            return;
        }
        let delivered = planet.observers.notify(name, &planet.snapshot(), &self.outbox);
        if delivered < subscribers {
            tracing::warn!(
                "Outbox full, dropped {} of {subscribers} {name} notifications for planet {}",
                subscribers - delivered,
                planet.id
            );
        }
    }
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

impl Galaxy {
    /// Snapshot of one planet.
    pub fn get_planet(&self, id: PlanetId) -> Result<PlanetSnapshot, GalaxyError> {
        let handle = self.planet_handle(id)?;
        let planet = lock(&handle);
        Ok(planet.snapshot())
    }

    /// Snapshots of every planet within `radius` of `center`, boundary included.
    pub fn query_nearby(&self, center: DVec2, radius: f64) -> Vec<PlanetSnapshot> {
        let ids = self.ids_within(center, radius);
        let store = self.store();
        ids.into_iter()
            .filter_map(|id| store.get_by_key(&id).map(|h| lock(h).snapshot()))
            .collect()
    }

    fn ids_within(&self, center: DVec2, radius: f64) -> Vec<PlanetId> {
        let index = self.index.read().unwrap_or_else(PoisonError::into_inner);
        index
            .query(&Circle {
                center,
                radius: radius.max(0.0),
            })
            .into_iter()
            .map(|point| point.data)
            .collect()
    }

    /// What `player` can see of the region around `center`.
    ///
    /// Every planet in the region owned by `player` is included together
    /// with every planet within the configured view radius of it. Sorted by id.
    pub fn nearby_view(
        &self,
        player: &PlayerId,
        center: DVec2,
        radius: f64,
    ) -> Result<Vec<PlanetSnapshot>, GalaxyError> {
        if !self.players.contains_key(player) {
            return Err(GalaxyError::PlayerNotFound(player.clone()));
        }

        let mut visible = BTreeMap::new();
        for snapshot in self.query_nearby(center, radius) {
            if snapshot.owner.as_ref() != Some(player) {
                continue;
            }
            for seen in self.query_nearby(snapshot.position, self.settings.view_radius) {
                visible.entry(seen.id).or_insert(seen);
            }
            visible.insert(snapshot.id, snapshot);
        }
        Ok(visible.into_values().collect())
    }
}

// ---------------------------------------------------------------------------
// Players and conquest
// ---------------------------------------------------------------------------

impl Galaxy {
    /// Register a new player.
    pub fn register_player(&self, id: PlayerId) -> Result<(), GalaxyError> {
        match self.players.entry(id) {
            Entry::Occupied(e) => Err(GalaxyError::PlayerAlreadyRegistered(e.key().clone())),
            Entry::Vacant(e) => {
                let id = e.key().clone();
                tracing::info!("Registered player {id}");
                e.insert(Player::new(id));
                Ok(())
            }
        }
    }

    /// Snapshot of a registered player.
    pub fn player(&self, id: &PlayerId) -> Result<PlayerSnapshot, GalaxyError> {
        self.players
            .get(id)
            .map(|p| p.snapshot())
            .ok_or_else(|| GalaxyError::PlayerNotFound(id.clone()))
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    /// Claim an unowned planet for `player`.
    ///
    /// The planet's owner and the player's owned set change together under
    /// the planet lock.
    pub fn conquer(&self, planet_id: PlanetId, player: &PlayerId) -> Result<PlanetId, GalaxyError> {
        let handle = self.planet_handle(planet_id)?;
        let mut planet = lock(&handle);
        self.claim_locked(&mut planet, player, false)?;
        tracing::debug!("{player} conquered planet {planet_id}");
        Ok(planet_id)
    }

    /// Claim `planet` for `player` while holding the player's entry.
    ///
    /// With `first_only`, a player who already owns a planet keeps what they
    /// have: nothing is claimed and their lowest owned id is returned.
    fn claim_locked(
        &self,
        planet: &mut Planet,
        player: &PlayerId,
        first_only: bool,
    ) -> Result<PlanetId, GalaxyError> {
        let mut entry = self
            .players
            .get_mut(player)
            .ok_or_else(|| GalaxyError::PlayerNotFound(player.clone()))?;
        if first_only && let Some(owned) = entry.owned_planets().min() {
            return Ok(owned);
        }
        planet.claim(player)?;
        entry.add_planet(planet.id);
        Ok(planet.id)
    }

    /// Give `player` a random unowned planet if they own none yet.
    pub fn assign_starting_planet(&self, player: &PlayerId) -> Result<PlanetId, GalaxyError> {
        self.assign_starting_planet_with(player, &mut rand::rng())
    }

    /// [`assign_starting_planet`](Self::assign_starting_planet) drawing from `rng`.
    ///
    /// Tries `starting_planet_attempts` uniform draws from the store, then
    /// falls back to scanning planets in id order.
    pub fn assign_starting_planet_with<R: Rng + ?Sized>(
        &self,
        player: &PlayerId,
        rng: &mut R,
    ) -> Result<PlanetId, GalaxyError> {
        let existing = self.player(player)?;
        if let Some(&first) = existing.planets.first() {
            return Ok(first);
        }

        let store = self.store();
        for _ in 0..self.settings.starting_planet_attempts {
            let Some(handle) = store.get_random_with(rng) else {
                break;
            };
            let mut planet = lock(handle);
            if planet.is_claimed() {
                continue;
            }
            if let Ok(id) = self.claim_locked(&mut planet, player, true) {
                tracing::debug!("{player} starts on planet {id}");
                return Ok(id);
            }
        }

        let mut ids: Vec<_> = store.keys().copied().collect();
        ids.sort_unstable();
        for id in ids {
            let Some(handle) = store.get_by_key(&id) else {
                continue;
            };
            let mut planet = lock(handle);
            if planet.is_claimed() {
                continue;
            }
            if let Ok(id) = self.claim_locked(&mut planet, player, true) {
                tracing::debug!("{player} starts on planet {id} after scan");
                return Ok(id);
            }
        }
        // Another call may have handed this player the last free planet.
        if let Some(&first) = self.player(player)?.planets.first() {
            return Ok(first);
        }
        Err(GalaxyError::NoUnclaimedPlanet)
    }

    /// Sum of the stockpiles across every planet `player` owns.
    pub fn total_resources(&self, player: &PlayerId) -> Result<Resources, GalaxyError> {
        let owned: Vec<_> = self
            .players
            .get(player)
            .map(|p| p.owned_planets().collect())
            .ok_or_else(|| GalaxyError::PlayerNotFound(player.clone()))?;

        let store = self.store();
        let mut total = Resources::ZERO;
        for id in owned {
            if let Some(handle) = store.get_by_key(&id) {
                total += lock(handle).available();
            }
        }
        Ok(total)
    }
}

// ---------------------------------------------------------------------------
// Structures
// ---------------------------------------------------------------------------

impl Galaxy {
    /// Build `kind` on a planet owned by `player`, then notify subscribers.
    pub fn build_structure(
        &self,
        planet_id: PlanetId,
        player: &PlayerId,
        kind: StructureKind,
    ) -> Result<(), GalaxyError> {
        let handle = self.planet_handle(planet_id)?;
        let mut planet = lock(&handle);
        if let Err(e) = planet.build_structure(player, kind) {
            tracing::debug!("Rejected {kind} on {planet_id} for {player}: {e}");
            return Err(e);
        }
        tracing::debug!("{player} built {kind} on planet {planet_id}");
        self.publish(&planet, PlanetEvent::BuiltStructure);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Subscriptions
// ---------------------------------------------------------------------------

impl Galaxy {
    /// Subscribe `player` to `event` on a planet. Repeats are no-ops.
    pub fn subscribe(
        &self,
        planet_id: PlanetId,
        event: &str,
        player: &PlayerId,
    ) -> Result<(), GalaxyError> {
        let handle = self.planet_handle(planet_id)?;
        if lock(&handle).observers.add_observer(event, player.clone()) {
            tracing::debug!("{player} subscribed to {event} on {planet_id}");
        }
        Ok(())
    }

    /// Unsubscribe `player` from `event` on a planet. Unknown subscriptions are no-ops.
    pub fn unsubscribe(
        &self,
        planet_id: PlanetId,
        event: &str,
        player: &PlayerId,
    ) -> Result<(), GalaxyError> {
        let handle = self.planet_handle(planet_id)?;
        if lock(&handle).observers.delete_observer(event, player) {
            tracing::debug!("{player} unsubscribed from {event} on {planet_id}");
        }
        Ok(())
    }

    /// Drop every subscription `player` holds. Returns how many were removed.
    pub fn disconnect(&self, player: &PlayerId) -> usize {
        let store = self.store();
        let removed: usize = store
            .values()
            .map(|handle| lock(handle).observers.remove_player(player))
            .sum();
        tracing::debug!("{player} disconnected, dropped {removed} subscriptions");
        removed
    }
}
