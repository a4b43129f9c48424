//! Feed API server for the plantwatch fleet telemetry feed.
//!
//! This crate provides an Axum HTTP server that exposes:
//!
//! - **`WebSocket` endpoint** (`/ws/feed`) pushing every published
//!   [`FleetSnapshot`] via [`tokio::sync::broadcast`], with the current
//!   snapshot replayed immediately on join
//! - **REST endpoints** serving the latest snapshot's readings and
//!   anomalies, plus the synthetic historical replay window
//!
//! # Architecture
//!
//! The observer is strictly a read-side consumer of the core
//! [`SnapshotStore`]: the tick driver publishes, the observer serves.
//! Every `WebSocket` client gets its own bounded queue, so one slow
//! dashboard cannot delay the tick loop or other clients.
//!
//! [`FleetSnapshot`]: plantwatch_types::FleetSnapshot
//! [`SnapshotStore`]: plantwatch_core::SnapshotStore

pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod startup;
pub mod state;
pub mod ws;

// Re-export primary types for convenience.
pub use router::build_router;
pub use server::{start_server, ServerConfig, ServerError};
pub use startup::{spawn_observer, StartupError};
pub use state::AppState;
