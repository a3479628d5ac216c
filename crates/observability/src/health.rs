//! Health-Check-Endpunkt fuer Warenhaus
//!
//! Endpoint: `GET /health`
//! Antwort im ueblichen Umschlag `{status, message, data}` mit Umgebung,
//! Version, Uptime und DB-Verbindungsstatus.

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde::Serialize;
use serde_json::json;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use warenhaus_core::Umgebung;

/// Status des Health-Checks
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
}

/// Geteilter Zustand fuer den Health-Check-Handler
#[derive(Clone)]
pub struct HealthState {
    umgebung: Umgebung,
    start_time: Arc<Instant>,
    db_connected: Arc<AtomicBool>,
}

impl HealthState {
    pub fn neu(umgebung: Umgebung) -> Self {
        Self {
            umgebung,
            start_time: Arc::new(Instant::now()),
            db_connected: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    pub fn db_verbunden(&self) -> bool {
        self.db_connected.load(Ordering::Relaxed)
    }

    /// Wird vom periodischen DB-Check des Servers gesetzt
    pub fn db_status_setzen(&self, verbunden: bool) {
        self.db_connected.store(verbunden, Ordering::Relaxed);
    }

    pub fn status(&self) -> HealthStatus {
        if self.db_verbunden() {
            HealthStatus::Healthy
        } else {
            HealthStatus::Degraded
        }
    }
}

/// Axum-Router fuer den `/health`-Endpunkt
pub fn health_router<S>(state: HealthState) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/health", get(health_handler))
        .with_state(state)
}

/// `GET /health` – 200 auch bei degraded (Probe soll nicht failen)
async fn health_handler(State(state): State<HealthState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({
            "status": "success",
            "message": "running",
            "data": {
                "env": state.umgebung.als_str(),
                "health": state.status(),
                "version": env!("CARGO_PKG_VERSION"),
                "uptimeSeconds": state.uptime_seconds(),
                "dbConnected": state.db_verbunden(),
            }
        })),
    )
}
