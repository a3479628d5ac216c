//! REST-Interface fuer Warenhaus (/api/...)

pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod server;

use std::sync::Arc;

use axum::extract::FromRequest;
use uuid::Uuid;

use warenhaus_auth::{AuthGate, AuthService, PasswortHasher, TokenService};
use warenhaus_core::Umgebung;
use warenhaus_db::{KontoRepository, ProduktRepository};

use crate::error::{ApiError, ApiResult};
use crate::services::{KontoService, ProduktService};

/// Axum-State fuer alle REST-Handler
#[derive(Clone)]
pub struct AppState {
    pub auth: AuthService,
    pub gate: AuthGate,
    pub konten: KontoService,
    pub produkte: ProduktService,
    pub umgebung: Umgebung,
}

impl AppState {
    pub fn neu(
        konten: Arc<dyn KontoRepository>,
        produkte: Arc<dyn ProduktRepository>,
        hasher: Arc<PasswortHasher>,
        tokens: Arc<TokenService>,
        umgebung: Umgebung,
    ) -> Self {
        Self {
            auth: AuthService::neu(konten.clone(), hasher, tokens.clone()),
            gate: AuthGate::neu(konten.clone(), tokens),
            konten: KontoService::neu(konten.clone()),
            produkte: ProduktService::neu(produkte, konten),
            umgebung,
        }
    }
}

/// JSON-Body, dessen Fehler als API-Umschlag beantwortet werden
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Ungueltige IDs werden wie fehlende Ressourcen behandelt
pub fn id_parsen(id: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(id)
        .map_err(|_| ApiError::NichtGefunden("Resource not found (invalid id).".into()))
}

pub use server::{RestServer, RestServerKonfig};
