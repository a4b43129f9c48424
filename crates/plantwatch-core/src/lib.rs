//! Fleet simulator, rule engine, snapshot store, and tick driver for
//! the plantwatch telemetry feed.
//!
//! # Modules
//!
//! - [`config`] -- YAML configuration loading and typed config structs
//! - [`simulator`] -- per-machine state machine and reading generation
//! - [`rules`] -- pure threshold classifiers (anomalies, risk,
//!   recommendations)
//! - [`history`] -- stateless historical replay for backfill charts
//! - [`store`] -- the current-snapshot store and subscriber registry
//! - [`tick`] -- one tick: simulate, evaluate, assemble a snapshot
//! - [`runner`] -- the supervised tick loop with failure backoff
//!
//! # Concurrency model
//!
//! One driver task owns the [`Fleet`] and is the only writer of
//! simulator state and the [`SnapshotStore`]. Subscribers run on their
//! own tasks and only ever read published [`FleetSnapshot`]s
//! (`Arc`-shared, replaced wholesale each tick), so a slow or
//! disconnecting subscriber can never stall the tick cadence.
//!
//! [`FleetSnapshot`]: plantwatch_types::FleetSnapshot

pub mod config;
pub mod history;
pub mod rules;
pub mod runner;
pub mod simulator;
pub mod store;
pub mod tick;

mod round;

// Re-export primary types for convenience.
pub use config::{AnomalyThresholds, ConfigError, SimulationConfig};
pub use history::{generate_history, HistoryBatch};
pub use runner::{run_feed, FeedOptions, FeedStats};
pub use simulator::MachineSimulator;
pub use store::{FeedSubscription, SnapshotStore};
pub use tick::{Fleet, FleetError, SnapshotSource, TickError};
