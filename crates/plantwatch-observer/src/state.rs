//! Shared application state for the feed API server.
//!
//! [`AppState`] wraps the core [`SnapshotStore`] plus the anomaly
//! thresholds the historical replay endpoint evaluates with. The
//! observer only ever reads: the tick driver is the sole writer of the
//! store, and every REST handler serves from the latest published
//! snapshot so no request can block the tick cycle.

use std::sync::Arc;

use plantwatch_core::{AnomalyThresholds, SnapshotStore};

/// Shared state for the Axum application.
///
/// Wrapped in [`Arc`] and injected via Axum's `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The snapshot store owned by the tick driver, read-only here.
    pub store: Arc<SnapshotStore>,
    /// Anomaly thresholds used by the historical replay endpoint.
    pub thresholds: AnomalyThresholds,
}

impl AppState {
    /// Create application state over an existing store.
    pub const fn new(store: Arc<SnapshotStore>, thresholds: AnomalyThresholds) -> Self {
        Self { store, thresholds }
    }
}
