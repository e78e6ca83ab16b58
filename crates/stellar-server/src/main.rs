//! Headless galaxy server: generates the galaxy and ticks it until Ctrl-C.

mod driver;

use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use stellar_config::{CliArgs, Config};
use stellar_galaxy::Galaxy;
use tokio::sync::watch;

use crate::driver::{TickDriver, drain_outbox};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = CliArgs::parse();

    let mut config = match &args.config {
        Some(dir) => Config::load_or_create(dir)?,
        None => Config::default(),
    };
    config.apply_cli_overrides(&args);
    config.validate()?;

    stellar_log::init_logging(
        config.debug.log_dir.as_deref(),
        cfg!(debug_assertions),
        Some(&config),
    );

    let galaxy = Arc::new(Galaxy::generate(&config));

    let outbox = galaxy.notifications();
    std::thread::Builder::new()
        .name("outbox".into())
        .spawn(move || drain_outbox(&outbox))?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("Ctrl-C received");
                let _ = shutdown_tx.send(true);
            }
            Err(e) => {
                // Keep the sender alive so the loop only stops on --ticks.
                tracing::warn!("Could not listen for Ctrl-C: {e}");
                std::future::pending::<()>().await;
                drop(shutdown_tx);
            }
        }
    });

    let driver = TickDriver::new(
        Arc::clone(&galaxy),
        Duration::from_millis(config.simulation.tick_interval_ms),
        args.ticks,
    );
    let ran = driver.run(shutdown_rx).await;

    tracing::info!(
        "Stopped after {ran} ticks with {} planets and {} players",
        galaxy.planet_count(),
        galaxy.player_count()
    );
    Ok(())
}
