//! Per-planet event subscriptions and targeted fan-out.

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use crate::ids::PlayerId;
use crate::planet::PlanetSnapshot;

/// Events a planet publishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlanetEvent {
    /// A structure finished building.
    BuiltStructure,
    /// A tick moved resources into the stockpile.
    ExtractedResources,
}

impl PlanetEvent {
    /// Wire name clients subscribe with.
    pub fn as_str(self) -> &'static str {
        match self {
            PlanetEvent::BuiltStructure => "planetBuiltStructure",
            PlanetEvent::ExtractedResources => "planetExtractedResources",
        }
    }
}

/// One message addressed to one subscriber.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub recipient: PlayerId,
    pub event: String,
    pub planet: PlanetSnapshot,
}

/// Somewhere notifications can be pushed.
pub trait NotificationSink {
    /// Hand over one notification without blocking. Returns `false` if the
    /// sink is closed or full.
    fn deliver(&self, notification: Notification) -> bool;
}

impl NotificationSink for crossbeam_channel::Sender<Notification> {
    fn deliver(&self, notification: Notification) -> bool {
        self.try_send(notification).is_ok()
    }
}

/// Subscribers of one planet, grouped by event name.
#[derive(Debug, Clone, Default)]
pub struct Observers {
    by_event: FxHashMap<String, FxHashSet<PlayerId>>,
}

impl Observers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe `player` to `event`. Returns `false` if it already was.
    pub fn add_observer(&mut self, event: &str, player: PlayerId) -> bool {
        self.by_event.entry(event.to_string()).or_default().insert(player)
    }

    /// Unsubscribe `player` from `event`. Returns `false` if it was not subscribed.
    pub fn delete_observer(&mut self, event: &str, player: &PlayerId) -> bool {
        let Some(set) = self.by_event.get_mut(event) else {
            return false;
        };
        let removed = set.remove(player);
        if set.is_empty() {
            self.by_event.remove(event);
        }
        removed
    }

    /// Drop `player` from every event. Returns how many subscriptions were removed.
    pub fn remove_player(&mut self, player: &PlayerId) -> usize {
        let mut removed = 0;
        self.by_event.retain(|_, set| {
            if set.remove(player) {
                removed += 1;
            }
            !set.is_empty()
        });
        removed
    }

    /// Subscribers of `event`, in no particular order.
    pub fn observers_of(&self, event: &str) -> impl Iterator<Item = &PlayerId> {
        self.by_event.get(event).into_iter().flatten()
    }

    /// Returns `true` if `player` is subscribed to `event`.
    pub fn is_subscribed(&self, event: &str, player: &PlayerId) -> bool {
        self.by_event.get(event).is_some_and(|set| set.contains(player))
    }

    /// Returns `true` if nobody is subscribed to anything.
    pub fn is_empty(&self) -> bool {
        self.by_event.is_empty()
    }

    /// Send `planet` to every subscriber of `event`. Returns the number delivered.
    pub fn notify<S: NotificationSink + ?Sized>(
        &self,
        event: &str,
        planet: &PlanetSnapshot,
        sink: &S,
    ) -> usize {
        let mut delivered = 0;
        for recipient in self.observers_of(event) {
            let notification = Notification {
                recipient: recipient.clone(),
                event: event.to_string(),
                planet: planet.clone(),
            };
            if sink.deliver(notification) {
                delivered += 1;
            }
        }
        delivered
    }
}
