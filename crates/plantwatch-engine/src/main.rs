//! Feed engine binary for plantwatch.
//!
//! This is the main entry point that wires together the fleet
//! simulator, the rule engine, the snapshot store, and the feed API
//! server. It loads configuration, initializes all subsystems, and
//! runs the tick loop until the process is terminated.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `plantwatch.yaml`
//! 2. Initialize structured logging (tracing)
//! 3. Build the machine fleet from the roster
//! 4. Create the snapshot store
//! 5. Start the feed API server on a background task
//! 6. Run the supervised tick loop

mod error;

use std::path::Path;
use std::sync::Arc;

use plantwatch_core::{runner, Fleet, FeedOptions, SimulationConfig, SnapshotStore};
use plantwatch_observer::{spawn_observer, AppState, ServerConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;

/// Application entry point for the feed engine.
///
/// Initializes all subsystems and runs the tick loop. Only an
/// initialization failure (bad config, empty roster, unparseable bind
/// address) terminates the process with an error.
///
/// # Errors
///
/// Returns an error if any initialization step fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration.
    let config = load_config()?;

    // 2. Initialize structured logging. RUST_LOG wins over the config
    //    file when set.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.logging.level.clone())),
        )
        .with_target(true)
        .init();

    info!("plantwatch-engine starting");
    info!(
        machine_count = config.fleet.machines.len(),
        tick_interval_seconds = config.fleet.tick_interval_seconds,
        failure_backoff_seconds = config.fleet.failure_backoff_seconds,
        seed = config.fleet.seed,
        "Configuration loaded"
    );

    // 3. Build the machine fleet.
    let mut fleet = Fleet::from_config(&config).map_err(EngineError::from)?;
    info!(machine_count = fleet.machine_count(), "Fleet initialized");

    // 4. Create the snapshot store.
    let store = Arc::new(SnapshotStore::new());

    // 5. Start the feed API server.
    let server_config = ServerConfig {
        host: config.http.host.clone(),
        port: config.http.port,
    };
    let app_state = Arc::new(AppState::new(
        Arc::clone(&store),
        config.thresholds.clone(),
    ));
    let _observer_handle =
        spawn_observer(server_config, app_state).map_err(EngineError::from)?;
    info!(port = config.http.port, "Feed API server started");

    // 6. Run the tick loop. With no tick bound this only returns when
    //    the runtime shuts down.
    let options = FeedOptions::from_config(&config);
    info!("Entering tick loop");
    let stats = runner::run_feed(&mut fleet, &store, &options).await;

    info!(
        published = stats.published,
        failures = stats.failures,
        "plantwatch-engine shutdown complete"
    );

    Ok(())
}

/// Load the feed configuration from `plantwatch.yaml`.
///
/// Looks for the config file relative to the current working
/// directory and falls back to defaults when it is absent.
fn load_config() -> Result<SimulationConfig, EngineError> {
    let config_path = Path::new("plantwatch.yaml");
    if config_path.exists() {
        let config = SimulationConfig::from_file(config_path)?;
        Ok(config)
    } else {
        Ok(SimulationConfig::default())
    }
}
