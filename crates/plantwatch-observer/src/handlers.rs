//! REST API endpoint handlers for the feed server.
//!
//! All handlers read from the latest published snapshot via the shared
//! [`AppState`]; none of them mutates core state.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/api/machines` | Latest snapshot's readings |
//! | `GET` | `/api/anomalies` | Latest snapshot's anomalies |
//! | `GET` | `/api/historical` | Synthetic replay (`?points=N`) |
//! | `GET` | `/health` | Liveness check |

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;

use plantwatch_core::history;

use crate::error::ObserverError;
use crate::state::AppState;

/// Default number of replayed points for `GET /api/historical`.
const DEFAULT_HISTORY_POINTS: usize = 300;

/// Upper bound on replayed points per request.
const MAX_HISTORY_POINTS: usize = 10_000;

/// Query parameters for the `GET /api/historical` endpoint.
#[derive(Debug, serde::Deserialize)]
pub struct HistoricalQuery {
    /// Number of points to synthesize (default 300, max 10000).
    pub points: Option<usize>,
}

// ---------------------------------------------------------------------------
// GET /api/machines -- latest readings
// ---------------------------------------------------------------------------

/// Return the latest snapshot's machine readings.
pub async fn get_machines(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let snapshot = state.store.current().await;
    Json(serde_json::json!({
        "machines": snapshot.machines,
    }))
}

// ---------------------------------------------------------------------------
// GET /api/anomalies -- latest anomalies
// ---------------------------------------------------------------------------

/// Return the latest snapshot's anomalies.
pub async fn get_anomalies(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let snapshot = state.store.current().await;
    Json(serde_json::json!({
        "anomalies": snapshot.anomalies,
    }))
}

// ---------------------------------------------------------------------------
// GET /api/historical -- synthetic replay
// ---------------------------------------------------------------------------

/// Synthesize a historical window for backfill charts.
///
/// Independent of the live loop: every call draws a fresh random
/// window and mutates nothing.
///
/// # Query Parameters
///
/// - `points`: number of points to synthesize (default 300, max 10000).
pub async fn get_historical(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HistoricalQuery>,
) -> Result<impl IntoResponse, ObserverError> {
    let points = params.points.unwrap_or(DEFAULT_HISTORY_POINTS);
    if points == 0 || points > MAX_HISTORY_POINTS {
        return Err(ObserverError::InvalidQuery(format!(
            "points must be between 1 and {MAX_HISTORY_POINTS}, got {points}"
        )));
    }

    let mut rng = rand::rng();
    let batch = history::generate_history(points, &state.thresholds, &mut rng, Utc::now());

    Ok(Json(serde_json::json!({
        "data": batch.data,
        "anomalies": batch.anomalies,
    })))
}

// ---------------------------------------------------------------------------
// GET /health -- liveness
// ---------------------------------------------------------------------------

/// Liveness check.
#[allow(clippy::unused_async)] // axum handlers must be async
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
    }))
}
