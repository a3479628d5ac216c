//! Fehlertypen der REST-API
//!
//! [`ApiError`] ist die einzige Stelle, an der Fehler in HTTP-Status und
//! Antwort-Umschlag uebersetzt werden. Interne Ursachen haengen als
//! [`FehlerDetail`]-Extension an der Antwort; die Diagnose-Middleware macht
//! sie ausserhalb von Produktion sichtbar.

use axum::{
    extract::rejection::JsonRejection,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use warenhaus_auth::AuthError;
use warenhaus_db::DbError;

/// Alle Fehler, die ein Handler zurueckgeben kann
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Unauthentifiziert(String),

    #[error("{0}")]
    Verboten(String),

    #[error("{0}")]
    NichtGefunden(String),

    #[error("{0}")]
    Konflikt(String),

    /// Schema-Fehler der Eingabe (400)
    #[error("{0}")]
    Validierung(String),

    /// Fachlich unverarbeitbare Eingabe (422)
    #[error("{0}")]
    Unverarbeitbar(String),

    #[error("{0}")]
    UngueltigeOperation(String),

    #[error("{0}")]
    MethodeNichtErlaubt(String),

    #[error("Request body too large.")]
    ZuGross,

    #[error("Too many requests, try again later.")]
    ZuVieleAnfragen { retry_after_secs: u64 },

    #[error("Internal Server Error")]
    Intern(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn intern(msg: impl Into<String>) -> Self {
        Self::Intern(msg.into())
    }

    pub fn http_status(&self) -> StatusCode {
        match self {
            Self::Unauthentifiziert(_) => StatusCode::UNAUTHORIZED,
            Self::Verboten(_) => StatusCode::FORBIDDEN,
            Self::NichtGefunden(_) => StatusCode::NOT_FOUND,
            Self::Konflikt(_) => StatusCode::CONFLICT,
            Self::Validierung(_) | Self::UngueltigeOperation(_) => StatusCode::BAD_REQUEST,
            Self::Unverarbeitbar(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::MethodeNichtErlaubt(_) => StatusCode::METHOD_NOT_ALLOWED,
            Self::ZuGross => StatusCode::PAYLOAD_TOO_LARGE,
            Self::ZuVieleAnfragen { .. } => StatusCode::TOO_MANY_REQUESTS,
            Self::Intern(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Interne Fehlerursache, nur ausserhalb von Produktion in der Antwort
#[derive(Debug, Clone)]
pub struct FehlerDetail {
    pub nachricht: String,
    pub detail: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.http_status();
        let nachricht = self.to_string();

        if let Self::Intern(ref ursache) = self {
            tracing::error!(fehler = %ursache, "Interner Fehler bei Anfrage");
        }

        let mut response =
            (status, Json(json!({ "status": "error", "message": nachricht }))).into_response();

        match self {
            Self::Intern(detail) => {
                response
                    .extensions_mut()
                    .insert(FehlerDetail { nachricht, detail });
            }
            Self::ZuVieleAnfragen { retry_after_secs } => {
                response
                    .headers_mut()
                    .insert(header::RETRY_AFTER, HeaderValue::from(retry_after_secs));
            }
            _ => {}
        }

        response
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        if e.ist_unauthentifiziert() {
            return Self::Unauthentifiziert(e.to_string());
        }
        match e {
            AuthError::EmailVergeben => {
                Self::Konflikt("User already exists with this email.".into())
            }
            AuthError::KontoNichtGefunden => Self::NichtGefunden("User not found".into()),
            AuthError::Datenbank(db) => db.into(),
            andere => Self::Intern(andere.to_string()),
        }
    }
}

impl From<DbError> for ApiError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::NichtGefunden(_) => Self::NichtGefunden("Resource not found.".into()),
            DbError::Eindeutigkeit(_) => {
                Self::Konflikt("User already exists with this email.".into())
            }
            DbError::UngueltigeDaten(_) => Self::Validierung("Invalid field value.".into()),
            andere => Self::Intern(andere.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return Self::ZuGross;
        }
        Self::Validierung(rejection.body_text())
    }
}
