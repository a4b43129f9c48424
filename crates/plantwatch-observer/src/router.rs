//! Axum router construction for the feed API.
//!
//! Assembles all routes (REST + `WebSocket`) into a single [`Router`]
//! with CORS middleware enabled for cross-origin dashboard access.

use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;
use crate::ws;

/// Build the complete Axum router for the feed server.
///
/// The router includes:
/// - `GET /ws/feed` -- `WebSocket` fleet snapshot stream
/// - `GET /api/machines` -- latest readings
/// - `GET /api/anomalies` -- latest anomalies
/// - `GET /api/historical` -- synthetic replay window
/// - `GET /health` -- liveness check
///
/// CORS is configured to allow any origin for development. In
/// production this should be restricted.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // WebSocket
        .route("/ws/feed", get(ws::ws_feed))
        // REST API
        .route("/api/machines", get(handlers::get_machines))
        .route("/api/anomalies", get(handlers::get_anomalies))
        .route("/api/historical", get(handlers::get_historical))
        .route("/health", get(handlers::health))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
