//! Axum HTTP-Server fuer Warenhaus

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, OriginalUri};
use axum::http::{HeaderValue, Method};
use axum::middleware;
use axum::Router;
use tower::ServiceBuilder;
use tower_http::cors::{self, CorsLayer};

use warenhaus_observability::{
    health_router, request_timing_layer, timing_middleware, HealthState,
};

use crate::error::ApiError;
use crate::rate_limit::RateLimiter;
use crate::rest::middleware::{diagnose_middleware, rate_limit_middleware};
use crate::rest::{routes::api_router, AppState};

/// Standard-Grenze fuer JSON-Bodies (10 KiB)
pub const STANDARD_JSON_LIMIT: usize = 10 * 1024;

/// REST-Server-Konfiguration
#[derive(Debug, Clone)]
pub struct RestServerKonfig {
    pub bind_addr: SocketAddr,
    /// Erlaubte CORS-Origins. Leer = alle Origins erlaubt (nur fuer Entwicklung).
    pub cors_origins: Vec<String>,
    /// Maximale Groesse eines JSON-Bodies in Bytes
    pub json_limit: usize,
}

impl Default for RestServerKonfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 5000)),
            cors_origins: vec![],
            json_limit: STANDARD_JSON_LIMIT,
        }
    }
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(cors::Any)
}

/// JSON-404 fuer alle unbekannten Pfade
async fn route_nicht_gefunden(OriginalUri(uri): OriginalUri) -> ApiError {
    ApiError::NichtGefunden(format!("Route {uri} not found"))
}

/// JSON-405 fuer bekannte Pfade mit falscher Methode
async fn methode_nicht_erlaubt(methode: Method, OriginalUri(uri): OriginalUri) -> ApiError {
    ApiError::MethodeNichtErlaubt(format!("Method {methode} not allowed for {}", uri.path()))
}

/// Baut die vollstaendige Anwendung inklusive aller Layer
///
/// Reihenfolge von aussen nach innen: Trace, CORS, Timing, Rate Limit,
/// Diagnose, Body-Limit, Router. Trace muss aussen liegen, weil `Cors`
/// einen Response-Body mit `Default` verlangt.
pub fn app(
    state: AppState,
    konfig: &RestServerKonfig,
    rate_limiter: Arc<RateLimiter>,
    health: HealthState,
) -> Router {
    let umgebung = state.umgebung;

    api_router(&state)
        .method_not_allowed_fallback(methode_nicht_erlaubt)
        .fallback(route_nicht_gefunden)
        .with_state(state)
        .merge(health_router(health))
        .layer(DefaultBodyLimit::max(konfig.json_limit))
        .layer(
            ServiceBuilder::new()
                .layer(request_timing_layer())
                .layer(cors_layer(&konfig.cors_origins))
                .layer(middleware::from_fn(timing_middleware))
                .layer(middleware::from_fn_with_state(
                    rate_limiter,
                    rate_limit_middleware,
                ))
                .layer(middleware::from_fn_with_state(
                    umgebung,
                    diagnose_middleware,
                )),
        )
}

/// Axum HTTP-Server fuer Warenhaus
pub struct RestServer {
    konfig: RestServerKonfig,
}

impl RestServer {
    pub fn neu(konfig: RestServerKonfig) -> Self {
        Self { konfig }
    }

    pub fn konfig(&self) -> &RestServerKonfig {
        &self.konfig
    }

    /// Startet den REST-Server und laeuft bis Ctrl-C
    pub async fn starten(self, app: Router) -> std::io::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.konfig.bind_addr).await?;
        tracing::info!(addr = %self.konfig.bind_addr, "REST-Server gestartet");

        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal())
        .await
    }
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutdown-Signal empfangen, Server wird beendet"),
        Err(e) => {
            // Ohne Signal-Handler laeuft der Server weiter
            tracing::error!(fehler = %e, "Signal-Handler konnte nicht registriert werden");
            std::future::pending::<()>().await;
        }
    }
}
