//! Fixed-interval tick loop and notification outbox drain.

use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::Receiver;
use stellar_galaxy::{Galaxy, Notification};
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

/// Shortest tick period accepted; `tokio::time::interval` rejects zero.
const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Drives [`Galaxy::tick`] on a fixed period.
pub struct TickDriver {
    galaxy: Arc<Galaxy>,
    period: Duration,
    max_ticks: Option<u64>,
}

impl TickDriver {
    pub fn new(galaxy: Arc<Galaxy>, period: Duration, max_ticks: Option<u64>) -> Self {
        Self {
            galaxy,
            period: period.max(MIN_PERIOD),
            max_ticks,
        }
    }

    /// Tick until `shutdown` flips to `true`, its sender goes away, or
    /// `max_ticks` is reached. Returns the number of ticks run.
    ///
    /// The first tick fires one full period after the call.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> u64 {
        let mut interval = tokio::time::interval(self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        interval.tick().await;

        let mut ran = 0u64;
        tracing::info!("Ticking every {:?}", self.period);
        loop {
            if self.max_ticks.is_some_and(|max| ran >= max) {
                tracing::info!("Reached tick limit");
                break;
            }
            tokio::select! {
                _ = interval.tick() => {
                    let galaxy = Arc::clone(&self.galaxy);
                    match tokio::task::spawn_blocking(move || galaxy.tick()).await {
                        Ok(()) => ran += 1,
                        Err(e) => tracing::warn!("Tick {} failed: {e}", ran + 1),
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        tracing::info!("Tick loop shutting down");
                        break;
                    }
                }
            }
        }
        ran
    }
}

/// Log every notification until the outbox closes. Returns how many were seen.
///
/// Stands in for the transport layer, which would route each notification to
/// the recipient's connection.
pub fn drain_outbox(outbox: &Receiver<Notification>) -> usize {
    let mut seen = 0;
    for notification in outbox.iter() {
        tracing::debug!(
            "Notify {} of {} on planet {}",
            notification.recipient,
            notification.event,
            notification.planet.id
        );
        seen += 1;
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;
    use stellar_config::Config;
    use stellar_galaxy::{DVec2, Planet, PlanetEvent, PlanetId, PlayerId, Resources, SizeClass};

    fn galaxy() -> Arc<Galaxy> {
        let mut config = Config::default();
        config.galaxy.extent = 100.0;
        let planet = Planet::new(
            PlanetId(1),
            DVec2::new(50.0, 50.0),
            SizeClass::Standard,
            Resources::new(10.0, 0.0, 0.0),
        );
        Arc::new(Galaxy::with_planets(&config, [planet]))
    }

    #[tokio::test]
    async fn test_runs_until_tick_limit() {
        let galaxy = galaxy();
        let (_tx, rx) = watch::channel(false);
        let driver = TickDriver::new(Arc::clone(&galaxy), Duration::from_millis(1), Some(3));
        assert_eq!(driver.run(rx).await, 3);
        assert_eq!(galaxy.tick_count(), 3);
    }

    #[tokio::test]
    async fn test_stops_on_shutdown_signal() {
        let galaxy = galaxy();
        let (tx, rx) = watch::channel(false);
        let driver = TickDriver::new(galaxy, Duration::from_secs(3600), None);
        tx.send(true).unwrap();
        assert_eq!(driver.run(rx).await, 0);
    }

    #[tokio::test]
    async fn test_zero_period_is_clamped() {
        let (_tx, rx) = watch::channel(false);
        let driver = TickDriver::new(galaxy(), Duration::ZERO, Some(1));
        assert_eq!(driver.run(rx).await, 1);
    }

    #[test]
    fn test_drain_outbox_counts_until_closed() {
        let galaxy = galaxy();
        let ann = PlayerId::new("ann");
        galaxy.register_player(ann.clone()).unwrap();
        galaxy.conquer(PlanetId(1), &ann).unwrap();
        galaxy
            .subscribe(PlanetId(1), PlanetEvent::ExtractedResources.as_str(), &ann)
            .unwrap();
        let outbox = galaxy.notifications();

        galaxy.tick();
        galaxy.tick();
        drop(galaxy);
        assert_eq!(drain_outbox(&outbox), 2);
    }
}
