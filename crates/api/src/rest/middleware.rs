//! Axum-Middleware fuer Auth, Rate Limiting und Diagnose-Details
//!
//! Reihenfolge im Stack: Rate Limit → (Auth-Gate) → (Admin-Pruefung) → Handler.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::{ConnectInfo, Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Json, Response},
    Extension,
};
use serde_json::json;

use warenhaus_auth::AuthKontext;
use warenhaus_core::Umgebung;

use crate::error::{ApiError, FehlerDetail};
use crate::rate_limit::RateLimiter;
use crate::rest::AppState;

/// Extrahiert den Client-IP aus den Request-Headern
pub fn client_ip(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.split(',').next())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .or_else(|| {
            headers
                .get("x-real-ip")
                .and_then(|v| v.to_str().ok())
                .map(|s| s.trim().to_string())
        })
        .unwrap_or_else(|| "unknown".to_string())
}

/// Client-IP einer Anfrage
///
/// Massgeblich ist die Socket-Adresse. Proxy-Header zaehlen nur mit
/// `proxy_vertrauen`, sonst koennte jeder Client seinen Bucket waehlen.
fn anfrage_ip(req: &Request, proxy_vertrauen: bool) -> String {
    if proxy_vertrauen {
        let ip = client_ip(req.headers());
        if ip != "unknown" {
            return ip;
        }
    }
    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Loest den Bearer-Token auf und haengt den [`AuthKontext`] an die Anfrage
pub async fn authentifizieren(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    let kontext = match state.gate.pruefen(header).await {
        Ok(k) => k,
        Err(e) => {
            tracing::warn!(path = %req.uri().path(), grund = %e, "Anfrage nicht authentifiziert");
            return Err(e.into());
        }
    };

    req.extensions_mut().insert(kontext);
    Ok(next.run(req).await)
}

/// Laesst nur Admins durch; setzt [`authentifizieren`] voraus
pub async fn admin_erforderlich(
    Extension(kontext): Extension<AuthKontext>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if !kontext.konto.role.ist_admin() {
        tracing::warn!(user_id = %kontext.konto.id, "Admin-Route ohne Admin-Rolle");
        return Err(ApiError::Verboten(
            "Access denied. Admin privileges required.".into(),
        ));
    }
    Ok(next.run(req).await)
}

/// Rate Limiting per IP
pub async fn rate_limit_middleware(
    State(limiter): State<Arc<RateLimiter>>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let ip = anfrage_ip(&req, limiter.proxy_vertrauen());

    match limiter.pruefe_ip(&ip) {
        Ok(()) => next.run(req).await,
        Err(retry_after_secs) => {
            tracing::warn!(ip = %ip, retry_after_secs, "Rate-Limit ueberschritten");
            ApiError::ZuVieleAnfragen { retry_after_secs }.into_response()
        }
    }
}

/// Ergaenzt Fehlerantworten ausserhalb von Produktion um `detail`
pub async fn diagnose_middleware(
    State(umgebung): State<Umgebung>,
    req: Request,
    next: Next,
) -> Response {
    let mut response = next.run(req).await;

    let Some(detail) = response.extensions_mut().remove::<FehlerDetail>() else {
        return response;
    };
    if !umgebung.diagnose_erlaubt() {
        return response;
    }

    (
        response.status(),
        Json(json!({
            "status": "error",
            "message": detail.nachricht,
            "detail": detail.detail,
        })),
    )
        .into_response()
}
